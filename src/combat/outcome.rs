//! Resolution results fed back into learning

use serde::{Deserialize, Serialize};

use crate::combat::context::CombatContext;

/// What happened after the resolver applied a decision
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CombatOutcome {
    pub damage_dealt: f32,
    pub damage_taken: f32,
    pub target_defeated: bool,
    /// Damage the resolver expected before resistances; enables vulnerability discovery
    pub expected_damage: Option<f32>,
    /// Observation after resolution; used as the next state on the low-level path
    pub next_context: Option<Box<CombatContext>>,
}

impl CombatOutcome {
    pub fn new(damage_dealt: f32) -> Self {
        Self {
            damage_dealt,
            ..Self::default()
        }
    }

    pub fn with_damage_taken(mut self, damage: f32) -> Self {
        self.damage_taken = damage;
        self
    }

    pub fn with_expected_damage(mut self, expected: f32) -> Self {
        self.expected_damage = Some(expected);
        self
    }

    pub fn with_next_context(mut self, context: CombatContext) -> Self {
        self.next_context = Some(Box::new(context));
        self
    }

    pub fn defeated(mut self) -> Self {
        self.target_defeated = true;
        self
    }

    /// Damage with NaN and negative readings treated as zero
    pub fn sanitized_damage(&self) -> f32 {
        if self.damage_dealt.is_nan() {
            0.0
        } else {
            self.damage_dealt.max(0.0)
        }
    }
}

/// Reward for a tactical outcome: success bonus plus capped damage bonus
pub fn outcome_reward(success: bool, outcome: &CombatOutcome) -> f32 {
    let base = if success { 1.0 } else { -0.5 };
    base + (outcome.sanitized_damage() / 100.0).min(1.0)
}
