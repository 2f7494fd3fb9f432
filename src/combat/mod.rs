//! Combat-facing value types and the external interfaces of the core
//!
//! The core never queries the world directly. Hosts implement
//! [`WorldSnapshotProvider`] to build a [`CombatContext`] per tick,
//! [`ResourceCatalog`] to describe their gear and [`CombatResolver`] to
//! apply a [`CombatDecision`] and report the [`CombatOutcome`].

pub mod catalog;
pub mod context;
pub mod decision;
pub mod outcome;

pub use catalog::{
    load_catalog, ComboProfile, ItemProfile, ItemRole, ResourceCatalog, ResourceKind,
    SkillProfile, SkillRole, StaticCatalog, WeaponProfile,
};
pub use context::{BasicAction, CombatContext, Emotion, EnemyView, ObservedAction};
pub use decision::{
    ActionCategory, ActionType, ChosenResource, CombatDecision, DecisionOrigin,
    SituationSnapshot, Target,
};
pub use outcome::{outcome_reward, CombatOutcome};

use crate::core::types::AgentId;

/// Supplies the per-tick observation for an agent
pub trait WorldSnapshotProvider {
    fn snapshot(&self, agent: AgentId) -> CombatContext;
}

/// Applies a decision to the simulation
pub trait CombatResolver {
    /// Returns whether the action succeeded and what it caused
    fn resolve(&mut self, agent: AgentId, decision: &CombatDecision) -> (bool, CombatOutcome);
}
