//! Static resource stats supplied by the host game
//!
//! The decision core only reads ids, roles and elements through the
//! [`ResourceCatalog`] trait. `StaticCatalog` is a simple in-memory
//! implementation that can be filled programmatically or loaded from TOML.

use std::fs;
use std::path::Path;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::core::error::{CombatAiError, Result};
use crate::core::types::{Element, ResourceId};

/// Which kind of resource a decision committed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Weapon,
    Skill,
    Item,
    Combo,
}

/// What a skill is for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillRole {
    Damage,
    Heal,
    Support,
    Buff,
    Utility,
}

/// What an item is for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemRole {
    Healing,
    Defensive,
    Buff,
    Offensive,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeaponProfile {
    pub damage: f32,
    #[serde(default)]
    pub element: Option<Element>,
    #[serde(default)]
    pub cooldown: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillProfile {
    pub role: SkillRole,
    #[serde(default)]
    pub damage: f32,
    #[serde(default)]
    pub element: Option<Element>,
    #[serde(default)]
    pub cooldown: f32,
}

impl SkillProfile {
    pub fn is_damaging(&self) -> bool {
        self.role == SkillRole::Damage && self.damage > 0.0
    }

    /// Heal and support skills are what a defensive stance reaches for
    pub fn is_restorative(&self) -> bool {
        matches!(self.role, SkillRole::Heal | SkillRole::Support)
    }

    /// Skills usable on an ally
    pub fn targets_allies(&self) -> bool {
        matches!(self.role, SkillRole::Heal | SkillRole::Support | SkillRole::Buff)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemProfile {
    pub role: ItemRole,
}

impl ItemProfile {
    pub fn is_defensive(&self) -> bool {
        matches!(self.role, ItemRole::Healing | ItemRole::Defensive)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComboProfile {
    pub skills: Vec<ResourceId>,
    #[serde(default)]
    pub damage: f32,
}

/// Read-only lookup of static resource stats
///
/// Implementations must be shareable across the threads evaluating agents.
pub trait ResourceCatalog: Send + Sync {
    fn weapon(&self, id: &str) -> Option<&WeaponProfile>;
    fn skill(&self, id: &str) -> Option<&SkillProfile>;
    fn item(&self, id: &str) -> Option<&ItemProfile>;
    fn combo(&self, id: &str) -> Option<&ComboProfile>;

    /// Element of a skill, if it has one
    fn skill_element(&self, id: &str) -> Option<Element> {
        self.skill(id).and_then(|s| s.element)
    }
}

/// In-memory catalog backed by hash maps
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StaticCatalog {
    #[serde(default)]
    weapons: AHashMap<ResourceId, WeaponProfile>,
    #[serde(default)]
    skills: AHashMap<ResourceId, SkillProfile>,
    #[serde(default)]
    items: AHashMap<ResourceId, ItemProfile>,
    #[serde(default)]
    combos: AHashMap<ResourceId, ComboProfile>,
}

impl StaticCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_weapon(mut self, id: impl Into<ResourceId>, profile: WeaponProfile) -> Self {
        self.weapons.insert(id.into(), profile);
        self
    }

    pub fn with_skill(mut self, id: impl Into<ResourceId>, profile: SkillProfile) -> Self {
        self.skills.insert(id.into(), profile);
        self
    }

    pub fn with_item(mut self, id: impl Into<ResourceId>, profile: ItemProfile) -> Self {
        self.items.insert(id.into(), profile);
        self
    }

    pub fn with_combo(mut self, id: impl Into<ResourceId>, profile: ComboProfile) -> Self {
        self.combos.insert(id.into(), profile);
        self
    }

    pub fn len(&self) -> usize {
        self.weapons.len() + self.skills.len() + self.items.len() + self.combos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Parse a catalog from TOML with `[weapons.<id>]`, `[skills.<id>]`,
    /// `[items.<id>]` and `[combos.<id>]` tables
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents)
            .map_err(|e| CombatAiError::Config(format!("Failed to parse catalog TOML: {}", e)))
    }
}

impl ResourceCatalog for StaticCatalog {
    fn weapon(&self, id: &str) -> Option<&WeaponProfile> {
        self.weapons.get(id)
    }

    fn skill(&self, id: &str) -> Option<&SkillProfile> {
        self.skills.get(id)
    }

    fn item(&self, id: &str) -> Option<&ItemProfile> {
        self.items.get(id)
    }

    fn combo(&self, id: &str) -> Option<&ComboProfile> {
        self.combos.get(id)
    }
}

/// Load a catalog from a TOML file
pub fn load_catalog(path: &Path) -> Result<StaticCatalog> {
    let contents = fs::read_to_string(path)?;
    StaticCatalog::from_toml_str(&contents)
}
