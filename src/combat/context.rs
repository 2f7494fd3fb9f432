//! Strongly-typed per-tick combat observation
//!
//! A `CombatContext` is built fresh by the world snapshot provider every
//! decision tick and never persisted. Optional fields fall back to the
//! documented defaults in [`defaults`] instead of failing.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::core::error::{CombatAiError, Result};
use crate::core::types::{clamp01, EnemyCategory, Element, ResourceId};

/// Values used when the snapshot provider leaves a field empty
pub mod defaults {
    /// Own health/stamina/mana: assume a fresh agent
    pub const OWN_RESOURCE: f32 = 1.0;
    /// Enemy health: assume an unhurt enemy
    pub const ENEMY_HEALTH: f32 = 1.0;
    /// Distance to enemy: mid-range, neither point-blank nor far away
    pub const ENEMY_DISTANCE: f32 = 5.0;
    /// Category used when the enemy is unknown
    pub const ENEMY_CATEGORY: &str = "unknown";
}

/// Coarse emotional state reported by the host simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Emotion {
    Fear,
    Calm,
    Aggressive,
}

/// Something the opposing side did recently
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObservedAction {
    Attack,
    Ambush,
    Taunt,
    Defend,
    Flee,
    Heal,
    Other,
}

impl ObservedAction {
    /// Hostile behaviour makes agents more cautious over time
    pub fn is_hostile(&self) -> bool {
        matches!(
            self,
            ObservedAction::Attack | ObservedAction::Ambush | ObservedAction::Taunt
        )
    }
}

/// Basic (non-tactical) actions available on the low-level Q-learning path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BasicAction {
    Move,
    Attack,
    Defend,
    Heal,
    Retreat,
    Explore,
    Interact,
    Wait,
}

impl BasicAction {
    pub const ALL: [BasicAction; 8] = [
        BasicAction::Move,
        BasicAction::Attack,
        BasicAction::Defend,
        BasicAction::Heal,
        BasicAction::Retreat,
        BasicAction::Explore,
        BasicAction::Interact,
        BasicAction::Wait,
    ];

    /// Position in [`BasicAction::ALL`], used as the Q-table action index
    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn from_index(index: usize) -> Option<BasicAction> {
        Self::ALL.get(index).copied()
    }
}

/// What the agent knows about its current opponent
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnemyView {
    /// Identifier the resolver uses to address the target
    pub id: String,
    /// Category used as the effectiveness ledger key
    pub category: EnemyCategory,
    /// Health fraction in [0, 1]
    pub health: Option<f32>,
    /// Distance in world units
    pub distance: Option<f32>,
    /// Element resistances; negative values mean vulnerability
    #[serde(default)]
    pub resistances: AHashMap<Element, f32>,
}

impl EnemyView {
    pub fn new(id: impl Into<String>, category: impl Into<EnemyCategory>) -> Self {
        Self {
            id: id.into(),
            category: category.into(),
            ..Self::default()
        }
    }

    pub fn with_health(mut self, health: f32) -> Self {
        self.health = Some(health);
        self
    }

    pub fn with_distance(mut self, distance: f32) -> Self {
        self.distance = Some(distance);
        self
    }

    pub fn with_resistance(mut self, element: Element, value: f32) -> Self {
        self.resistances.insert(element, value);
        self
    }

    /// Resistance against an element (0.0 when unknown)
    pub fn resistance(&self, element: Element) -> f32 {
        self.resistances.get(&element).copied().unwrap_or(0.0)
    }

    /// True when the enemy takes extra damage from the element
    pub fn is_vulnerable_to(&self, element: Element) -> bool {
        self.resistance(element) < 0.0
    }
}

/// Everything the decision core may look at during one tick
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CombatContext {
    /// Own health fraction in [0, 1]
    pub own_health: Option<f32>,
    /// Own stamina fraction in [0, 1]
    pub own_stamina: Option<f32>,
    /// Own mana fraction in [0, 1]
    pub own_mana: Option<f32>,
    /// Current opponent; `None` means the agent is out of combat
    pub enemy: Option<EnemyView>,
    pub allies_nearby: u32,
    pub enemies_nearby: u32,
    /// Free-form environment tags ("forest", "night", "rain", ...)
    #[serde(default)]
    pub environment: Vec<String>,
    pub emotion: Option<Emotion>,
    #[serde(default)]
    pub available_weapons: Vec<ResourceId>,
    #[serde(default)]
    pub available_skills: Vec<ResourceId>,
    #[serde(default)]
    pub available_items: Vec<ResourceId>,
    #[serde(default)]
    pub available_combos: Vec<ResourceId>,
    /// Opponent actions since the previous tick
    #[serde(default)]
    pub recent_opponent_actions: Vec<ObservedAction>,
    /// Basic actions off cooldown; `None` means all of them
    pub available_basic_actions: Option<Vec<BasicAction>>,
}

impl CombatContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn health(&self) -> f32 {
        clamp01(self.own_health.unwrap_or(defaults::OWN_RESOURCE))
    }

    pub fn stamina(&self) -> f32 {
        clamp01(self.own_stamina.unwrap_or(defaults::OWN_RESOURCE))
    }

    pub fn mana(&self) -> f32 {
        clamp01(self.own_mana.unwrap_or(defaults::OWN_RESOURCE))
    }

    pub fn enemy_health(&self) -> f32 {
        clamp01(
            self.enemy
                .as_ref()
                .and_then(|e| e.health)
                .unwrap_or(defaults::ENEMY_HEALTH),
        )
    }

    /// Distance to the current enemy; NaN and negative readings count as missing
    pub fn enemy_distance(&self) -> f32 {
        match self.enemy.as_ref().and_then(|e| e.distance) {
            Some(d) if d.is_nan() || d < 0.0 => defaults::ENEMY_DISTANCE,
            Some(d) => d,
            None => defaults::ENEMY_DISTANCE,
        }
    }

    pub fn enemy_category(&self) -> &str {
        self.enemy
            .as_ref()
            .map(|e| e.category.as_str())
            .filter(|c| !c.is_empty())
            .unwrap_or(defaults::ENEMY_CATEGORY)
    }

    /// The current opponent, or `MissingData` when out of combat
    pub fn require_enemy(&self) -> Result<&EnemyView> {
        self.enemy
            .as_ref()
            .ok_or(CombatAiError::MissingData { field: "enemy" })
    }

    /// Basic actions the low-level path may choose from
    pub fn basic_actions(&self) -> Vec<BasicAction> {
        match &self.available_basic_actions {
            Some(actions) => actions.clone(),
            None => BasicAction::ALL.to_vec(),
        }
    }

    pub fn hostile_actions_observed(&self) -> u32 {
        self.recent_opponent_actions
            .iter()
            .filter(|a| a.is_hostile())
            .count() as u32
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.environment.iter().any(|t| t == tag)
    }

    /// Names of optional fields that will fall back to defaults
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.own_health.is_none() {
            missing.push("own_health");
        }
        if self.own_stamina.is_none() {
            missing.push("own_stamina");
        }
        if self.own_mana.is_none() {
            missing.push("own_mana");
        }
        if self.emotion.is_none() {
            missing.push("emotion");
        }
        if let Some(enemy) = &self.enemy {
            if enemy.health.is_none() {
                missing.push("enemy.health");
            }
            if enemy.distance.is_none() {
                missing.push("enemy.distance");
            }
            if enemy.category.is_empty() {
                missing.push("enemy.category");
            }
        }
        missing
    }

    /// Coarse situation label used to key situational item knowledge
    pub fn situation_key(&self) -> &'static str {
        if self.health() < 0.3 {
            "low_health"
        } else if self.stamina() < 0.3 {
            "low_stamina"
        } else if self.enemies_nearby > 2 {
            "outnumbered"
        } else {
            "steady"
        }
    }

    // Builder helpers, mostly for tests and demo scenarios

    pub fn with_health(mut self, health: f32) -> Self {
        self.own_health = Some(health);
        self
    }

    pub fn with_stamina(mut self, stamina: f32) -> Self {
        self.own_stamina = Some(stamina);
        self
    }

    pub fn with_mana(mut self, mana: f32) -> Self {
        self.own_mana = Some(mana);
        self
    }

    pub fn with_enemy(mut self, enemy: EnemyView) -> Self {
        self.enemy = Some(enemy);
        self
    }

    pub fn with_enemies_nearby(mut self, count: u32) -> Self {
        self.enemies_nearby = count;
        self
    }

    pub fn with_allies_nearby(mut self, count: u32) -> Self {
        self.allies_nearby = count;
        self
    }

    pub fn with_emotion(mut self, emotion: Emotion) -> Self {
        self.emotion = Some(emotion);
        self
    }

    pub fn with_weapons<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<ResourceId>,
    {
        self.available_weapons = ids.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_skills<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<ResourceId>,
    {
        self.available_skills = ids.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_items<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<ResourceId>,
    {
        self.available_items = ids.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_combos<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<ResourceId>,
    {
        self.available_combos = ids.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_opponent_actions(mut self, actions: Vec<ObservedAction>) -> Self {
        self.recent_opponent_actions = actions;
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.environment.push(tag.into());
        self
    }
}
