//! Combat phase classification

use serde::{Deserialize, Serialize};

use crate::combat::context::CombatContext;
use crate::core::config::CombatAiConfig;

/// Coarse stage of an engagement, used as the tactic-learning context key
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum CombatPhase {
    Preparation,
    Engagement,
    Adaptation,
    Retreat,
    Recovery,
}

impl CombatPhase {
    pub const ALL: [CombatPhase; 5] = [
        CombatPhase::Preparation,
        CombatPhase::Engagement,
        CombatPhase::Adaptation,
        CombatPhase::Retreat,
        CombatPhase::Recovery,
    ];

    /// Phases where the agent should be disengaging
    pub fn is_disengaging(&self) -> bool {
        matches!(self, CombatPhase::Retreat | CombatPhase::Recovery)
    }
}

/// Classify the current phase; first matching rule wins
///
/// 1. critical health with more than one enemy: Retreat
/// 2. critical health otherwise: Recovery
/// 3. wounded: Adaptation
/// 4. enemy beyond preparation distance: Preparation
/// 5. Engagement
pub fn classify_phase(context: &CombatContext, config: &CombatAiConfig) -> CombatPhase {
    let health = context.health();
    if health < config.critical_health {
        if context.enemies_nearby > 1 {
            CombatPhase::Retreat
        } else {
            CombatPhase::Recovery
        }
    } else if health < config.wounded_health {
        CombatPhase::Adaptation
    } else if context.enemy_distance() > config.preparation_distance {
        CombatPhase::Preparation
    } else {
        CombatPhase::Engagement
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::context::EnemyView;

    fn ctx(health: f32, enemies: u32, distance: f32) -> CombatContext {
        CombatContext::new()
            .with_health(health)
            .with_enemies_nearby(enemies)
            .with_enemy(EnemyView::new("e", "beast").with_distance(distance))
    }

    #[test]
    fn test_phase_rules_in_order() {
        let config = CombatAiConfig::default();
        assert_eq!(classify_phase(&ctx(0.2, 3, 1.0), &config), CombatPhase::Retreat);
        assert_eq!(classify_phase(&ctx(0.2, 1, 1.0), &config), CombatPhase::Recovery);
        assert_eq!(classify_phase(&ctx(0.5, 3, 20.0), &config), CombatPhase::Adaptation);
        assert_eq!(classify_phase(&ctx(0.9, 1, 20.0), &config), CombatPhase::Preparation);
        assert_eq!(classify_phase(&ctx(0.9, 1, 3.0), &config), CombatPhase::Engagement);
    }

    #[test]
    fn test_critical_health_boundary() {
        let config = CombatAiConfig::default();
        assert_eq!(classify_phase(&ctx(0.29, 2, 3.0), &config), CombatPhase::Retreat);
        assert_eq!(classify_phase(&ctx(0.31, 2, 3.0), &config), CombatPhase::Adaptation);
    }

    #[test]
    fn test_distance_exactly_eight_is_engagement() {
        let config = CombatAiConfig::default();
        assert_eq!(classify_phase(&ctx(1.0, 1, 8.0), &config), CombatPhase::Engagement);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let config = CombatAiConfig::default();
        let context = CombatContext::new();
        assert_eq!(classify_phase(&context, &config), CombatPhase::Engagement);
    }
}
