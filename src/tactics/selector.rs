//! Tactic selection
//!
//! Candidates come from the situation (threat, advantage, what the agent
//! carries), then each candidate is scored:
//!
//! ```text
//! score = Q[phase][tactic] + exploration bonus + personality bias + prior
//! ```
//!
//! The highest score wins; ties go to the tactic declared first.
//!
//! Delegating executors (Adaptive, Support, WeaponSwitch, ElementalExploit,
//! Positional) return a decision tagged with the tactic that actually acted.
//! Outcomes are credited to that tag, so `Q[phase][Adaptive]` stays at its
//! initial value and Adaptive competes on the non-learned terms of its score.

use rand::{Rng, RngCore};

use crate::core::config::CombatAiConfig;
use crate::core::error::{CombatAiError, Result};
use crate::learning::tactic_table::TacticQTable;
use crate::personality::PersonalityModel;
use crate::tactics::executors::TacticEnv;
use crate::tactics::Tactic;

const HIGH_THREAT: f32 = 0.7;
const HIGH_ADVANTAGE: f32 = 1.3;
const MAX_PERSONALITY_BIAS: f32 = 0.05;
const ELEMENTAL_PRIOR: f32 = 0.2;
const ELEMENTAL_PRIOR_BONUS_CAP: f32 = 0.3;
const DISENGAGE_PRIOR: f32 = 0.15;

/// Tactics allowed while retreating or recovering
const DISENGAGING: [Tactic; 4] = [
    Tactic::Defensive,
    Tactic::Positional,
    Tactic::Support,
    Tactic::Adaptive,
];

/// Winner plus the full scoreboard, for logging and reports
#[derive(Debug, Clone, PartialEq)]
pub struct TacticChoice {
    pub tactic: Tactic,
    pub score: f32,
    pub scores: Vec<(Tactic, f32)>,
}

#[derive(Debug, Clone, Copy)]
pub struct TacticSelector {
    exploration_bonus_cap: f32,
}

impl TacticSelector {
    pub fn new(exploration_bonus_cap: f32) -> Self {
        Self {
            exploration_bonus_cap: exploration_bonus_cap.max(0.0),
        }
    }

    pub fn from_config(config: &CombatAiConfig) -> Self {
        Self::new(config.exploration_bonus_cap)
    }

    /// Candidate tactics in declaration order
    pub fn candidates(&self, env: &TacticEnv<'_>) -> Vec<Tactic> {
        let mut mask = [false; Tactic::ALL.len()];
        let mut add = |t: Tactic| mask[t.index()] = true;
        let context = env.context;

        if env.metrics.threat > HIGH_THREAT {
            add(Tactic::Defensive);
            add(Tactic::Positional);
            add(Tactic::Support);
        }
        if env.metrics.advantage > HIGH_ADVANTAGE {
            add(Tactic::Aggressive);
            add(Tactic::Positional);
            add(Tactic::ComboChain);
        }
        if context.available_skills.len() > 3 || !context.available_combos.is_empty() {
            add(Tactic::ComboChain);
        }
        if context.available_weapons.len() > 2 {
            add(Tactic::WeaponSwitch);
        }
        if env.elemental_options().iter().any(|o| o.is_opportunity()) {
            add(Tactic::ElementalExploit);
        }
        add(Tactic::Adaptive);

        if env.phase.is_disengaging() {
            add(Tactic::Defensive);
            add(Tactic::Support);
            for tactic in Tactic::ALL {
                if !DISENGAGING.contains(&tactic) {
                    mask[tactic.index()] = false;
                }
            }
        }

        Tactic::ALL
            .into_iter()
            .filter(|t| mask[t.index()])
            .collect()
    }

    /// Situation-driven score boost
    pub fn prior(&self, env: &TacticEnv<'_>, tactic: Tactic) -> f32 {
        match tactic {
            Tactic::ElementalExploit => {
                let best = env
                    .elemental_options()
                    .iter()
                    .filter(|o| o.is_opportunity())
                    .map(|o| o.strength())
                    .fold(None, |acc: Option<f32>, s| Some(acc.map_or(s, |a| a.max(s))));
                match best {
                    Some(strength) => {
                        ELEMENTAL_PRIOR + (strength - 1.0).clamp(0.0, ELEMENTAL_PRIOR_BONUS_CAP)
                    }
                    None => 0.0,
                }
            }
            Tactic::Defensive | Tactic::Support if env.phase.is_disengaging() => DISENGAGE_PRIOR,
            _ => 0.0,
        }
    }

    /// Choose a tactic; draws exploration bonuses from `rng`
    pub fn select(
        &self,
        env: &TacticEnv<'_>,
        table: &TacticQTable,
        exploration_rate: f32,
        rng: &mut dyn RngCore,
    ) -> Result<TacticChoice> {
        let candidates = self.candidates(env);
        let mut scores = Vec::with_capacity(candidates.len());
        let mut best: Option<(Tactic, f32)> = None;

        for tactic in candidates {
            let score = table.get(env.phase, tactic)
                + self.exploration_bonus(exploration_rate, rng)
                + personality_bias(env.personality, tactic)
                + self.prior(env, tactic);
            scores.push((tactic, score));
            if best.map_or(true, |(_, b)| score > b) {
                best = Some((tactic, score));
            }
        }

        let (tactic, score) = best.ok_or(CombatAiError::NoCandidateAction)?;
        Ok(TacticChoice {
            tactic,
            score,
            scores,
        })
    }

    fn exploration_bonus(&self, exploration_rate: f32, rng: &mut dyn RngCore) -> f32 {
        if self.exploration_bonus_cap > 0.0 && rng.gen::<f32>() < exploration_rate {
            rng.gen_range(0.0..self.exploration_bonus_cap)
        } else {
            0.0
        }
    }
}

impl Default for TacticSelector {
    fn default() -> Self {
        Self::new(0.1)
    }
}

/// Small trait-driven nudge, at most 0.05
pub fn personality_bias(personality: &PersonalityModel, tactic: Tactic) -> f32 {
    let trait_value = match tactic {
        Tactic::Aggressive | Tactic::ComboChain => personality.aggression,
        Tactic::Defensive | Tactic::Positional => personality.caution,
        Tactic::Support => personality.sociability,
        Tactic::Adaptive => personality.adaptability,
        Tactic::ElementalExploit | Tactic::WeaponSwitch => personality.curiosity,
    };
    MAX_PERSONALITY_BIAS * trait_value
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::catalog::{SkillProfile, SkillRole, StaticCatalog};
    use crate::combat::context::{CombatContext, EnemyView};
    use crate::core::types::Element;
    use crate::knowledge::{EffectivenessLedger, LedgerNamespace, VulnerabilityTracker};
    use crate::tactics::metrics::SituationMetrics;
    use crate::tactics::phase::{classify_phase, CombatPhase};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn catalog() -> StaticCatalog {
        StaticCatalog::new()
            .with_skill(
                "fireball",
                SkillProfile {
                    role: SkillRole::Damage,
                    damage: 25.0,
                    element: Some(Element::Fire),
                    cooldown: 0.0,
                },
            )
            .with_skill(
                "slash",
                SkillProfile {
                    role: SkillRole::Damage,
                    damage: 10.0,
                    element: None,
                    cooldown: 0.0,
                },
            )
    }

    fn select_for(
        context: &CombatContext,
        ledger: &EffectivenessLedger,
        table: &TacticQTable,
    ) -> TacticChoice {
        let catalog = catalog();
        let vulnerabilities = VulnerabilityTracker::new();
        let personality = PersonalityModel::default();
        let env = TacticEnv {
            context,
            ledger,
            vulnerabilities: &vulnerabilities,
            personality: &personality,
            catalog: &catalog,
            phase: classify_phase(context, &CombatAiConfig::default()),
            metrics: SituationMetrics::measure(context),
        };
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        TacticSelector::default()
            .select(&env, table, 0.2, &mut rng)
            .unwrap()
    }

    #[test]
    fn test_learned_fire_skill_picks_elemental_exploit() {
        let mut ledger = EffectivenessLedger::default();
        for _ in 0..3 {
            ledger.record_outcome(LedgerNamespace::Skill, "fireball", "undead", true, 30.0);
        }
        let context = CombatContext::new()
            .with_health(0.9)
            .with_enemies_nearby(1)
            .with_enemy(EnemyView::new("ghoul-1", "undead").with_distance(4.0))
            .with_skills(["fireball", "slash"]);

        let choice = select_for(&context, &ledger, &TacticQTable::new());
        assert_eq!(choice.tactic, Tactic::ElementalExploit);
    }

    #[test]
    fn test_recovery_never_aggressive() {
        let context = CombatContext::new()
            .with_health(0.2)
            .with_enemies_nearby(0)
            .with_enemy(EnemyView::new("ghoul-1", "undead").with_distance(4.0))
            .with_skills(["fireball", "slash"]);
        let mut table = TacticQTable::new();
        for _ in 0..20 {
            table.update(CombatPhase::Recovery, Tactic::Aggressive, 2.0, 0.2);
        }

        let choice = select_for(&context, &EffectivenessLedger::default(), &table);
        assert!(matches!(choice.tactic, Tactic::Defensive | Tactic::Support));
        assert!(choice.scores.iter().all(|(t, _)| *t != Tactic::Aggressive));
    }

    #[test]
    fn test_candidates_always_include_adaptive() {
        let context = CombatContext::new()
            .with_health(0.9)
            .with_enemy(EnemyView::new("e", "beast").with_distance(4.0).with_health(1.0))
            .with_stamina(0.1)
            .with_mana(0.1);
        let choice = select_for(&context, &EffectivenessLedger::default(), &TacticQTable::new());
        assert_eq!(choice.scores.len(), 1);
        assert_eq!(choice.tactic, Tactic::Adaptive);
    }

    #[test]
    fn test_high_threat_candidates() {
        let catalog = catalog();
        let ledger = EffectivenessLedger::default();
        let vulnerabilities = VulnerabilityTracker::new();
        let personality = PersonalityModel::default();
        let context = CombatContext::new()
            .with_health(0.4)
            .with_stamina(0.2)
            .with_mana(0.2)
            .with_enemies_nearby(3)
            .with_enemy(EnemyView::new("e", "beast").with_distance(1.0))
            .with_weapons(["a", "b", "c"]);
        let env = TacticEnv {
            context: &context,
            ledger: &ledger,
            vulnerabilities: &vulnerabilities,
            personality: &personality,
            catalog: &catalog,
            phase: CombatPhase::Adaptation,
            metrics: SituationMetrics::measure(&context),
        };
        assert_eq!(
            TacticSelector::default().candidates(&env),
            vec![
                Tactic::Defensive,
                Tactic::WeaponSwitch,
                Tactic::Support,
                Tactic::Positional,
                Tactic::Adaptive
            ]
        );
    }

    #[test]
    fn test_learned_values_drive_choice() {
        let context = CombatContext::new()
            .with_health(1.0)
            .with_enemy(EnemyView::new("e", "beast").with_distance(4.0).with_health(0.5));
        let mut table = TacticQTable::new();
        table.update(CombatPhase::Engagement, Tactic::ComboChain, 1.0, 1.0);
        let choice = select_for(&context, &EffectivenessLedger::default(), &table);
        assert_eq!(choice.tactic, Tactic::ComboChain);
    }

    #[test]
    fn test_personality_bias_bounded() {
        let maxed = PersonalityModel::new(1.0, 1.0, 1.0, 1.0, 1.0);
        for tactic in Tactic::ALL {
            assert!(personality_bias(&maxed, tactic) <= 0.05 + 1e-6);
        }
    }

    #[test]
    fn test_same_seed_same_choice() {
        let context = CombatContext::new()
            .with_health(0.8)
            .with_enemy(EnemyView::new("e", "beast").with_distance(4.0).with_health(0.5))
            .with_skills(["fireball", "slash"]);
        let a = select_for(&context, &EffectivenessLedger::default(), &TacticQTable::new());
        let b = select_for(&context, &EffectivenessLedger::default(), &TacticQTable::new());
        assert_eq!(a, b);
    }
}
