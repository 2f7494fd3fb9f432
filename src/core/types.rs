//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for combat agents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AgentId(pub Uuid);

impl AgentId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for AgentId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for AgentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Discrete state index produced by the state encoder
pub type StateId = u32;

/// Index into an agent's basic action set
pub type ActionIndex = usize;

/// Identifier of a weapon, skill, item or combo as known to the resource catalog
pub type ResourceId = String;

/// Enemy category ("undead", "beast", ...) used as the ledger's second key
pub type EnemyCategory = String;

/// Damage element carried by skills and referenced by enemy resistances
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Element {
    Physical,
    Fire,
    Ice,
    Lightning,
    Poison,
    Holy,
    Dark,
    Cosmic,
}

impl Element {
    pub const ALL: [Element; 8] = [
        Element::Physical,
        Element::Fire,
        Element::Ice,
        Element::Lightning,
        Element::Poison,
        Element::Holy,
        Element::Dark,
        Element::Cosmic,
    ];

    /// Stable lowercase name, used as the Element-namespace ledger key
    pub fn as_str(&self) -> &'static str {
        match self {
            Element::Physical => "physical",
            Element::Fire => "fire",
            Element::Ice => "ice",
            Element::Lightning => "lightning",
            Element::Poison => "poison",
            Element::Holy => "holy",
            Element::Dark => "dark",
            Element::Cosmic => "cosmic",
        }
    }
}

/// Clamp a value into the unit interval, mapping NaN to 0.0
pub fn clamp01(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}
