//! Adaptive Combat - learning combat decisions for autonomous agents

pub mod agent;
pub mod combat;
pub mod core;
pub mod knowledge;
pub mod learning;
pub mod personality;
pub mod tactics;

pub use agent::{AgentProfile, CombatAi, RestoreOutcome, StateBlob};
pub use combat::{CombatContext, CombatDecision, CombatOutcome, ResourceCatalog, StaticCatalog};
pub use core::config::CombatAiConfig;
pub use core::error::{CombatAiError, Result};
