//! Situation metrics shared by the selector and the executors

use crate::combat::context::CombatContext;

const CLOSE_RANGE: f32 = 2.0;
const FAR_RANGE: f32 = 10.0;
const MIN_ENEMY_HEALTH: f32 = 1e-3;

/// How endangered the agent is, in [0, 1]
pub fn threat_level(context: &CombatContext) -> f32 {
    let mut threat = 1.0 - context.health();
    threat += (context.enemies_nearby as f32 * 0.1).min(0.3);

    let distance = context.enemy_distance();
    if distance < CLOSE_RANGE {
        threat += 0.3;
    } else if distance > FAR_RANGE {
        threat -= 0.2;
    }

    threat.clamp(0.0, 1.0)
}

/// Own resources over enemy health, in [0.1, 2.0]
pub fn advantage_ratio(context: &CombatContext) -> f32 {
    let own = context.health() + context.stamina() + context.mana();
    let enemy = context.enemy_health().max(MIN_ENEMY_HEALTH);
    (own / enemy).clamp(0.1, 2.0)
}

/// Both metrics for one tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SituationMetrics {
    pub threat: f32,
    pub advantage: f32,
}

impl SituationMetrics {
    pub fn measure(context: &CombatContext) -> Self {
        Self {
            threat: threat_level(context),
            advantage: advantage_ratio(context),
        }
    }
}
