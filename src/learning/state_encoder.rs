//! Compresses a combat observation into a bounded discrete state id
//!
//! Four features are quantized into base-10 digits:
//!
//! | digit | feature                      | buckets                         |
//! |-------|------------------------------|---------------------------------|
//! | 10^0  | own health                   | `floor(health * 10)`, max 9     |
//! | 10^1  | distance to nearest threat   | `floor(distance / 10)`, max 9   |
//! | 10^2  | nearby threat count          | capped at 9                     |
//! | 10^3  | emotional state              | fear 0, calm 5, aggressive 9    |
//!
//! Missing features sit in the neutral bucket 5. An absent enemy or an
//! infinite distance is "as far as it gets" and lands in bucket 9.

use crate::combat::context::{CombatContext, Emotion};
use crate::core::config::CombatAiConfig;
use crate::core::types::StateId;

const NEUTRAL_BUCKET: u32 = 5;
const MAX_BUCKET: u32 = 9;

/// Quantized feature digits before composition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateFeatures {
    pub health: u32,
    pub distance: u32,
    pub threats: u32,
    pub emotion: u32,
}

impl StateFeatures {
    pub fn composite(&self) -> u32 {
        self.health + self.distance * 10 + self.threats * 100 + self.emotion * 1000
    }
}

#[derive(Debug, Clone, Copy)]
pub struct StateEncoder {
    state_space_size: u32,
}

impl StateEncoder {
    pub fn new(state_space_size: u32) -> Self {
        Self {
            state_space_size: state_space_size.max(1),
        }
    }

    pub fn from_config(config: &CombatAiConfig) -> Self {
        Self::new(config.state_space_size)
    }

    pub fn state_space_size(&self) -> u32 {
        self.state_space_size
    }

    /// Encode a context into `[0, state_space_size)`
    pub fn encode(&self, context: &CombatContext) -> StateId {
        Self::features(context).composite() % self.state_space_size
    }

    pub fn features(context: &CombatContext) -> StateFeatures {
        StateFeatures {
            health: health_bucket(context.own_health),
            distance: distance_bucket(context),
            threats: context.enemies_nearby.min(MAX_BUCKET),
            emotion: emotion_bucket(context.emotion),
        }
    }
}

fn health_bucket(health: Option<f32>) -> u32 {
    match health {
        Some(h) if !h.is_nan() => ((h.clamp(0.0, 1.0) * 10.0) as u32).min(MAX_BUCKET),
        _ => NEUTRAL_BUCKET,
    }
}

fn distance_bucket(context: &CombatContext) -> u32 {
    let Some(enemy) = &context.enemy else {
        return MAX_BUCKET;
    };
    match enemy.distance {
        None => NEUTRAL_BUCKET,
        Some(d) if d.is_nan() => NEUTRAL_BUCKET,
        Some(d) if d.is_infinite() => MAX_BUCKET,
        Some(d) => ((d.max(0.0) / 10.0) as u32).min(MAX_BUCKET),
    }
}

fn emotion_bucket(emotion: Option<Emotion>) -> u32 {
    match emotion {
        Some(Emotion::Fear) => 0,
        Some(Emotion::Calm) | None => NEUTRAL_BUCKET,
        Some(Emotion::Aggressive) => MAX_BUCKET,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::context::EnemyView;

    #[test]
    fn test_missing_features_are_neutral() {
        let ctx = CombatContext::new().with_enemy(EnemyView::new("e", "beast"));
        let features = StateEncoder::features(&ctx);
        assert_eq!(features.health, 5);
        assert_eq!(features.distance, 5);
        assert_eq!(features.threats, 0);
        assert_eq!(features.emotion, 5);
    }

    #[test]
    fn test_unbounded_distance_clamps_to_nine() {
        let ctx = CombatContext::new()
            .with_enemy(EnemyView::new("e", "beast").with_distance(f32::INFINITY));
        assert_eq!(StateEncoder::features(&ctx).distance, 9);

        let ctx = CombatContext::new()
            .with_enemy(EnemyView::new("e", "beast").with_distance(4_000.0));
        assert_eq!(StateEncoder::features(&ctx).distance, 9);

        let ctx = CombatContext::new();
        assert_eq!(StateEncoder::features(&ctx).distance, 9);
    }

    #[test]
    fn test_composite_digits() {
        let ctx = CombatContext::new()
            .with_health(0.42)
            .with_enemy(EnemyView::new("e", "beast").with_distance(31.0))
            .with_enemies_nearby(2)
            .with_emotion(Emotion::Aggressive);
        let encoder = StateEncoder::new(10_000);
        assert_eq!(encoder.encode(&ctx), 9_234);
    }

    #[test]
    fn test_full_health_stays_in_bucket_nine() {
        let ctx = CombatContext::new().with_health(1.0);
        assert_eq!(StateEncoder::features(&ctx).health, 9);
    }

    #[test]
    fn test_threat_count_capped() {
        let ctx = CombatContext::new().with_enemies_nearby(40);
        assert_eq!(StateEncoder::features(&ctx).threats, 9);
    }

    #[test]
    fn test_reduced_modulo_table_size() {
        let ctx = CombatContext::new()
            .with_health(0.42)
            .with_enemy(EnemyView::new("e", "beast").with_distance(31.0))
            .with_enemies_nearby(2)
            .with_emotion(Emotion::Aggressive);
        let encoder = StateEncoder::new(100);
        assert_eq!(encoder.encode(&ctx), 34);
    }

    #[test]
    fn test_encoded_state_always_in_range() {
        let encoder = StateEncoder::new(97);
        for health in [0.0, 0.33, 0.77, 1.0] {
            for threats in [0, 3, 12] {
                let ctx = CombatContext::new()
                    .with_health(health)
                    .with_enemies_nearby(threats)
                    .with_emotion(Emotion::Fear);
                assert!(encoder.encode(&ctx) < 97);
            }
        }
    }
}
