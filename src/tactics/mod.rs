//! Tactical layer: phase classification, tactic selection and execution
//!
//! Each tick the selector scores candidate tactics for the current phase and
//! the matching executor turns the winner into a concrete decision.

pub mod executors;
pub mod metrics;
pub mod phase;
pub mod selector;

use serde::{Deserialize, Serialize};

pub use executors::{execute, executor_for, ElementalOption, TacticEnv, TacticHandler};
pub use metrics::{advantage_ratio, threat_level, SituationMetrics};
pub use phase::{classify_phase, CombatPhase};
pub use selector::{TacticChoice, TacticSelector};

/// High-level combat approach
///
/// Declaration order is the tie-break order during selection.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Tactic {
    Aggressive,
    Defensive,
    ComboChain,
    WeaponSwitch,
    ElementalExploit,
    Support,
    Positional,
    Adaptive,
}

impl Tactic {
    pub const ALL: [Tactic; 8] = [
        Tactic::Aggressive,
        Tactic::Defensive,
        Tactic::ComboChain,
        Tactic::WeaponSwitch,
        Tactic::ElementalExploit,
        Tactic::Support,
        Tactic::Positional,
        Tactic::Adaptive,
    ];

    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn name(&self) -> &'static str {
        match self {
            Tactic::Aggressive => "aggressive",
            Tactic::Defensive => "defensive",
            Tactic::ComboChain => "combo_chain",
            Tactic::WeaponSwitch => "weapon_switch",
            Tactic::ElementalExploit => "elemental_exploit",
            Tactic::Support => "support",
            Tactic::Positional => "positional",
            Tactic::Adaptive => "adaptive",
        }
    }
}

impl std::fmt::Display for Tactic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
