//! Learning integration tests
//!
//! Q-value convergence, ledger monotonicity, progression, vulnerability
//! discovery and the bounds that must hold after any sequence of updates.

use std::sync::Arc;
use std::thread;

use adaptive_combat::agent::{AgentProfile, CombatAi};
use adaptive_combat::combat::{
    ActionType, ChosenResource, CombatContext, CombatDecision, CombatOutcome, EnemyView,
    SituationSnapshot, SkillProfile, SkillRole, StaticCatalog,
};
use adaptive_combat::core::config::CombatAiConfig;
use adaptive_combat::core::types::Element;
use adaptive_combat::knowledge::{
    EffectivenessLedger, LedgerNamespace, LedgerView, SharedLedger, VulnerabilityChange,
};
use adaptive_combat::learning::{AdaptiveRates, QLearningTable};
use adaptive_combat::personality::{PersonalityEvent, PersonalityModel};
use adaptive_combat::tactics::{CombatPhase, Tactic};
use proptest::prelude::*;

fn engine() -> CombatAi {
    let catalog = StaticCatalog::new().with_skill(
        "fireball",
        SkillProfile {
            role: SkillRole::Damage,
            damage: 30.0,
            element: Some(Element::Fire),
            cooldown: 3.0,
        },
    );
    CombatAi::new(CombatAiConfig::default(), Arc::new(catalog)).unwrap()
}

fn fireball_at(category: &str) -> CombatDecision {
    CombatDecision::new(ActionType::ElementalSkill, Tactic::ElementalExploit)
        .with_phase(CombatPhase::Engagement)
        .with_resource(ChosenResource::skill("fireball"))
        .with_situation(SituationSnapshot {
            enemy_category: Some(category.to_string()),
            enemies_nearby: 1,
            situation_key: "steady".to_string(),
            ..SituationSnapshot::default()
        })
}

#[test]
fn test_q_value_converges_to_reward_without_discount() {
    let mut table = QLearningTable::new(0.0);
    for _ in 0..2_000 {
        table.update(4, 2, 0.8, 5, &[0, 1, 2], 0.1);
    }
    assert!((table.q_value(4, 2) - 0.8).abs() < 1e-4);
}

#[test]
fn test_ledger_score_rises_with_successes() {
    let mut ledger = EffectivenessLedger::default();
    ledger.record_outcome(LedgerNamespace::Weapon, "axe", "beast", true, 15.0);
    let mut previous = ledger.score(LedgerNamespace::Weapon, "axe", "beast");
    for _ in 0..10 {
        ledger.record_outcome(LedgerNamespace::Weapon, "axe", "beast", true, 15.0);
        let score = ledger.score(LedgerNamespace::Weapon, "axe", "beast");
        assert!(score > previous);
        previous = score;
    }
}

#[test]
fn test_ledger_score_falls_with_failures() {
    let mut ledger = EffectivenessLedger::default();
    ledger.record_outcome(LedgerNamespace::Weapon, "axe", "beast", false, 15.0);
    let mut previous = ledger.score(LedgerNamespace::Weapon, "axe", "beast");
    for _ in 0..10 {
        ledger.record_outcome(LedgerNamespace::Weapon, "axe", "beast", false, 15.0);
        let score = ledger.score(LedgerNamespace::Weapon, "axe", "beast");
        assert!(score < previous);
        previous = score;
    }
}

#[test]
fn test_learning_through_engine_updates_every_table() {
    let ai = engine();
    let mut agent = AgentProfile::with_seed(ai.config(), 12);
    let outcome = CombatOutcome::new(45.0).with_expected_damage(20.0);

    let report = ai.learn(&mut agent, &fireball_at("undead"), true, &outcome);

    assert!((report.reward - 1.45).abs() < 1e-6);
    assert_eq!(
        report.vulnerability,
        Some((Element::Fire, VulnerabilityChange::Discovered))
    );
    assert!(agent.tactic_values().get(CombatPhase::Engagement, Tactic::ElementalExploit) > 0.0);
    assert!(agent.ledger().score(LedgerNamespace::Skill, "fireball", "undead") > 1.0);
    assert!(agent.ledger().score(LedgerNamespace::Element, "fire", "undead") > 1.0);
    assert!(agent.vulnerabilities().is_trusted("undead", Element::Fire));
}

#[test]
fn test_vulnerability_confirmation_and_decay() {
    let ai = engine();
    let mut agent = AgentProfile::with_seed(ai.config(), 12);
    let strong = CombatOutcome::new(40.0).with_expected_damage(20.0);
    let weak = CombatOutcome::new(15.0).with_expected_damage(20.0);

    ai.learn(&mut agent, &fireball_at("undead"), true, &strong);
    let confirmed = ai.learn(&mut agent, &fireball_at("undead"), true, &strong);
    assert_eq!(
        confirmed.vulnerability,
        Some((Element::Fire, VulnerabilityChange::Confirmed))
    );
    let v = *agent.vulnerabilities().get("undead", Element::Fire).unwrap();
    assert!((v.confidence - 0.8).abs() < 1e-6);
    assert_eq!(v.confirmations, 2);

    for _ in 0..3 {
        ai.learn(&mut agent, &fireball_at("undead"), false, &weak);
    }
    let v = *agent.vulnerabilities().get("undead", Element::Fire).unwrap();
    assert!((v.confidence - 0.65).abs() < 1e-5);
    assert!(!agent.vulnerabilities().is_trusted("undead", Element::Fire));
}

#[test]
fn test_mild_surprise_is_not_a_vulnerability() {
    let ai = engine();
    let mut agent = AgentProfile::with_seed(ai.config(), 12);
    let outcome = CombatOutcome::new(29.0).with_expected_damage(20.0);
    let report = ai.learn(&mut agent, &fireball_at("beast"), true, &outcome);
    assert_eq!(
        report.vulnerability,
        Some((Element::Fire, VulnerabilityChange::Unchanged))
    );
    assert!(agent.vulnerabilities().is_empty());
}

#[test]
fn test_level_progression() {
    let ai = engine();
    let mut agent = AgentProfile::with_seed(ai.config(), 1);
    let decision = fireball_at("beast");
    let outcome = CombatOutcome::new(10.0);

    // level 1 needs 100, level 2 needs 200
    for _ in 0..300 {
        ai.learn(&mut agent, &decision, true, &outcome);
    }
    assert_eq!(agent.level(), 3);
    assert_eq!(agent.experience(), 0);
    assert!(agent.personality().adaptability > 0.5);
}

#[test]
fn test_learned_knowledge_changes_future_decisions() {
    let ai = engine();
    let mut agent = AgentProfile::with_seed(ai.config(), 5);
    let context = CombatContext::new()
        .with_health(0.9)
        .with_enemies_nearby(1)
        .with_enemy(EnemyView::new("ghoul-7", "undead").with_distance(4.0))
        .with_skills(["fireball"]);

    for _ in 0..5 {
        ai.learn(
            &mut agent,
            &fireball_at("undead"),
            true,
            &CombatOutcome::new(40.0),
        );
    }
    let decision = ai.decide(&mut agent, &context);
    assert_eq!(decision.tactic, Tactic::ElementalExploit);
    assert_eq!(decision.resource_id(), Some("fireball"));
}

#[test]
fn test_shared_ledger_counts_are_exact_under_contention() {
    let pool = Arc::new(SharedLedger::new(0.3));
    let handles: Vec<_> = (0..8)
        .map(|t| {
            let pool = Arc::clone(&pool);
            thread::spawn(move || {
                for i in 0..500 {
                    let category = if t % 2 == 0 { "undead" } else { "beast" };
                    pool.record_outcome(LedgerNamespace::Skill, "fireball", category, i % 4 == 0, 20.0);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    for category in ["undead", "beast"] {
        let entry = pool
            .entry(LedgerNamespace::Skill, "fireball", category)
            .unwrap();
        assert_eq!(entry.total_count, 2_000);
        assert_eq!(entry.success_count, 500);
    }
}

#[test]
fn test_agents_learning_into_one_pool() {
    let ai = engine();
    let pool = Arc::new(SharedLedger::new(0.3));
    let mut agents: Vec<AgentProfile> = (0..4)
        .map(|i| AgentProfile::with_seed(ai.config(), i).with_shared_ledger(Arc::clone(&pool)))
        .collect();

    thread::scope(|s| {
        for agent in agents.iter_mut() {
            let ai = &ai;
            s.spawn(move || {
                for _ in 0..25 {
                    ai.learn(agent, &fireball_at("undead"), true, &CombatOutcome::new(30.0));
                }
            });
        }
    });

    let entry = pool
        .entry(LedgerNamespace::Skill, "fireball", "undead")
        .unwrap();
    assert_eq!(entry.total_count, 100);
    let element = pool
        .entry(LedgerNamespace::Element, "fire", "undead")
        .unwrap();
    assert_eq!(element.total_count, 100);
}

proptest! {
    #[test]
    fn prop_rates_stay_within_bounds(metrics in proptest::collection::vec(-2.0f32..3.0, 0..200)) {
        let mut rates = AdaptiveRates::default();
        for metric in metrics {
            rates.adapt_to_performance(metric);
            prop_assert!((0.05..=0.2).contains(&rates.learning_rate()));
            prop_assert!((0.05..=0.3).contains(&rates.exploration_rate()));
        }
    }

    #[test]
    fn prop_traits_stay_within_unit_range(
        start in proptest::array::uniform5(0.0f32..=1.0),
        events in proptest::collection::vec(0usize..5, 0..300),
    ) {
        let all = [
            PersonalityEvent::HostilePatternObserved,
            PersonalityEvent::Outnumbered,
            PersonalityEvent::Unthreatened,
            PersonalityEvent::SuccessStreak,
            PersonalityEvent::LevelUp,
        ];
        let mut model = PersonalityModel::new(start[0], start[1], start[2], start[3], start[4]);
        for i in events {
            model.apply(all[i]);
            for value in [
                model.aggression,
                model.caution,
                model.curiosity,
                model.sociability,
                model.adaptability,
            ] {
                prop_assert!((0.0..=1.0).contains(&value));
            }
        }
    }

    #[test]
    fn prop_success_count_never_exceeds_total(
        results in proptest::collection::vec((proptest::bool::ANY, -10.0f32..100.0), 0..100),
    ) {
        let mut ledger = EffectivenessLedger::default();
        for (success, damage) in results {
            ledger.record_outcome(LedgerNamespace::Combo, "shatter", "construct", success, damage);
        }
        if let Some(entry) = ledger.entry(LedgerNamespace::Combo, "shatter", "construct") {
            prop_assert!(entry.success_count <= entry.total_count);
        }
    }
}
