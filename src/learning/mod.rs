//! Reinforcement learning: state encoding, value tables and outcome feedback

pub mod adaptive;
pub mod feedback;
pub mod q_table;
pub mod state_encoder;
pub mod tactic_table;

pub use adaptive::{AdaptiveRates, PerformanceWindow, RateBounds};
pub use feedback::{FeedbackReport, LearningFeedbackLoop};
pub use q_table::{QEntry, QLearningTable, QTable};
pub use state_encoder::{StateEncoder, StateFeatures};
pub use tactic_table::{TacticEntry, TacticQTable};
