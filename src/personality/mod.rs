//! Personality traits that shape rewards and drift with experience
//!
//! Five traits in [0, 1]. Rewards for an action category are scaled by the
//! matching trait, so an aggressive agent values a successful attack more
//! than a cautious one does. Combat events nudge traits by small steps and
//! every step is clamped back into range.
//!
//! Archetypes live in `data/personalities/<name>.toml`.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::combat::decision::ActionCategory;
use crate::core::error::{CombatAiError, Result};
use crate::core::types::clamp01;

/// Archetypes shipped in `data/personalities`
pub const ARCHETYPES: [&str; 5] = ["balanced", "berserker", "guardian", "scout", "support"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trait {
    Aggression,
    Caution,
    Curiosity,
    Sociability,
    Adaptability,
}

/// Something that happened in combat worth adapting to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersonalityEvent {
    /// The opponent has been hostile many times
    HostilePatternObserved,
    /// Three or more threats nearby
    Outnumbered,
    /// No threats at all
    Unthreatened,
    SuccessStreak,
    LevelUp,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonalityModel {
    pub aggression: f32,
    pub caution: f32,
    pub curiosity: f32,
    pub sociability: f32,
    pub adaptability: f32,
}

impl Default for PersonalityModel {
    fn default() -> Self {
        Self {
            aggression: 0.5,
            caution: 0.5,
            curiosity: 0.5,
            sociability: 0.5,
            adaptability: 0.5,
        }
    }
}

impl PersonalityModel {
    pub fn new(
        aggression: f32,
        caution: f32,
        curiosity: f32,
        sociability: f32,
        adaptability: f32,
    ) -> Self {
        let mut model = Self {
            aggression,
            caution,
            curiosity,
            sociability,
            adaptability,
        };
        model.clamp_all();
        model
    }

    pub fn get(&self, t: Trait) -> f32 {
        match t {
            Trait::Aggression => self.aggression,
            Trait::Caution => self.caution,
            Trait::Curiosity => self.curiosity,
            Trait::Sociability => self.sociability,
            Trait::Adaptability => self.adaptability,
        }
    }

    pub fn adjust(&mut self, t: Trait, delta: f32) {
        let value = match t {
            Trait::Aggression => &mut self.aggression,
            Trait::Caution => &mut self.caution,
            Trait::Curiosity => &mut self.curiosity,
            Trait::Sociability => &mut self.sociability,
            Trait::Adaptability => &mut self.adaptability,
        };
        *value = clamp01(*value + delta);
    }

    pub fn clamp_all(&mut self) {
        self.aggression = clamp01(self.aggression);
        self.caution = clamp01(self.caution);
        self.curiosity = clamp01(self.curiosity);
        self.sociability = clamp01(self.sociability);
        self.adaptability = clamp01(self.adaptability);
    }

    /// Trait that weighs rewards for an action category
    pub fn trait_for(category: ActionCategory) -> Option<Trait> {
        match category {
            ActionCategory::Attack => Some(Trait::Aggression),
            ActionCategory::Defend => Some(Trait::Caution),
            ActionCategory::Explore => Some(Trait::Curiosity),
            ActionCategory::Interact => Some(Trait::Sociability),
            ActionCategory::Other => None,
        }
    }

    /// `base * (1 + trait)`; unshaped for categories without a trait
    pub fn shape_reward(&self, base: f32, category: ActionCategory) -> f32 {
        match Self::trait_for(category) {
            Some(t) => base * (1.0 + self.get(t)),
            None => base,
        }
    }

    pub fn apply(&mut self, event: PersonalityEvent) {
        match event {
            PersonalityEvent::HostilePatternObserved => self.adjust(Trait::Caution, 0.1),
            PersonalityEvent::Outnumbered => {
                self.adjust(Trait::Caution, 0.05);
                self.adjust(Trait::Aggression, -0.05);
            }
            PersonalityEvent::Unthreatened => self.adjust(Trait::Curiosity, 0.05),
            PersonalityEvent::SuccessStreak => self.adjust(Trait::Adaptability, 0.05),
            PersonalityEvent::LevelUp => self.adjust(Trait::Adaptability, 0.1),
        }
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let mut model: PersonalityModel = toml::from_str(contents)
            .map_err(|e| CombatAiError::Config(format!("Failed to parse personality TOML: {}", e)))?;
        model.clamp_all();
        Ok(model)
    }
}

/// Load an archetype from `data/personalities/<name>.toml`
pub fn load_personality(name: &str) -> Result<PersonalityModel> {
    load_personality_from(&personality_path(name))
}

pub fn load_personality_from(path: &Path) -> Result<PersonalityModel> {
    let contents = fs::read_to_string(path)?;
    PersonalityModel::from_toml_str(&contents)
}

fn personality_path(name: &str) -> PathBuf {
    PathBuf::from("data/personalities").join(format!("{}.toml", name))
}
