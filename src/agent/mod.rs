//! Agents: learned state, the decision engine and persistence

pub mod brain;
pub mod persistence;
pub mod profile;

pub use brain::CombatAi;
pub use persistence::{load_profile, save_profile};
pub use profile::{
    AgentProfile, HistoryEntry, LearningReport, OpponentPatterns, RestoreOutcome, StateBlob,
    TacticStats, STATE_VERSION,
};
