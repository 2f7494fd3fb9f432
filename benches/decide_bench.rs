//! Performance benchmarks for the decision path
//!
//! Run with: cargo bench --bench decide_bench

use std::hint::black_box;
use std::path::Path;
use std::sync::Arc;

use adaptive_combat::agent::{AgentProfile, CombatAi};
use adaptive_combat::combat::{load_catalog, CombatContext, CombatOutcome, EnemyView};
use adaptive_combat::core::config::CombatAiConfig;
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

fn engine() -> CombatAi {
    let catalog = load_catalog(Path::new("data/catalog.toml")).unwrap();
    CombatAi::new(CombatAiConfig::default(), Arc::new(catalog)).unwrap()
}

fn engaged(i: usize) -> CombatContext {
    CombatContext::new()
        .with_health(0.3 + (i % 7) as f32 * 0.1)
        .with_stamina(0.8)
        .with_mana(0.6)
        .with_enemies_nearby((i % 4) as u32)
        .with_enemy(
            EnemyView::new(format!("ghoul-{}", i), "undead")
                .with_health(0.7)
                .with_distance((i % 12) as f32),
        )
        .with_weapons(["iron_sword", "war_hammer", "silver_dagger"])
        .with_skills(["fireball", "frost_lance", "chain_lightning", "smite", "mend"])
        .with_items(["healing_potion", "tower_shield"])
        .with_combos(["fire_storm"])
}

/// Benchmark a single tactical decision
fn bench_decide_tactical(c: &mut Criterion) {
    let ai = engine();
    let mut agent = AgentProfile::with_seed(ai.config(), 1);
    let context = engaged(3);

    c.bench_function("decide_tactical", |b| {
        b.iter(|| ai.decide(&mut agent, black_box(&context)));
    });
}

/// Benchmark the out-of-combat Q-table path
fn bench_decide_low_level(c: &mut Criterion) {
    let ai = engine();
    let mut agent = AgentProfile::with_seed(ai.config(), 1);
    let context = CombatContext::new().with_health(0.6);

    c.bench_function("decide_low_level", |b| {
        b.iter(|| ai.decide(&mut agent, black_box(&context)));
    });
}

/// Benchmark decide + learn for an agent with some history
fn bench_decide_and_learn(c: &mut Criterion) {
    let ai = engine();
    let mut agent = AgentProfile::with_seed(ai.config(), 1);
    let outcome = CombatOutcome::new(25.0).with_expected_damage(20.0);
    for i in 0..200 {
        let decision = ai.decide(&mut agent, &engaged(i));
        ai.learn(&mut agent, &decision, i % 3 != 0, &outcome);
    }
    let context = engaged(5);

    c.bench_function("decide_and_learn", |b| {
        b.iter(|| {
            let decision = ai.decide(&mut agent, black_box(&context));
            ai.learn(&mut agent, &decision, true, &outcome)
        });
    });
}

/// Benchmark parallel decisions across many agents
fn bench_decide_all(c: &mut Criterion) {
    let ai = engine();
    let mut group = c.benchmark_group("decide_all");

    for size in [16usize, 128, 1024] {
        let mut agents: Vec<AgentProfile> = (0..size as u64)
            .map(|i| AgentProfile::with_seed(ai.config(), i))
            .collect();
        let contexts: Vec<CombatContext> = (0..size).map(engaged).collect();

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| ai.decide_all(&mut agents, black_box(&contexts)));
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_decide_tactical,
    bench_decide_low_level,
    bench_decide_and_learn,
    bench_decide_all
);
criterion_main!(benches);
