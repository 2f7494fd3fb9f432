//! Headless Combat Simulation
//!
//! Pits learning agents against a stream of monsters in a toy arena and
//! prints what they learned. Each agent fights in its own duel, so agents
//! run in parallel.

use std::path::PathBuf;
use std::sync::Arc;

use adaptive_combat::agent::{save_profile, AgentProfile, CombatAi};
use adaptive_combat::combat::{
    load_catalog, ActionType, BasicAction, ChosenResource, CombatContext, CombatDecision,
    CombatOutcome, CombatResolver, Emotion, EnemyView, ItemRole, ObservedAction, ResourceCatalog,
    ResourceKind, StaticCatalog, WorldSnapshotProvider,
};
use adaptive_combat::core::config::{load_config, CombatAiConfig};
use adaptive_combat::core::types::{AgentId, Element};
use adaptive_combat::knowledge::SharedLedger;
use adaptive_combat::personality::load_personality;
use clap::Parser;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::Serialize;

/// Headless Combat Simulation - learning agents vs. a monster arena
#[derive(Parser, Debug)]
#[command(name = "combat_sim")]
#[command(about = "Run learning agents through arena fights and report what they learned")]
struct Args {
    /// Number of agents fighting in parallel
    #[arg(long, default_value_t = 8)]
    agents: usize,

    /// Decision rounds per agent
    #[arg(long, default_value_t = 500)]
    rounds: u32,

    /// Random seed for deterministic runs
    #[arg(long)]
    seed: Option<u64>,

    /// Personality archetype (loaded from data/personalities/)
    #[arg(long)]
    personality: Option<String>,

    /// Resource catalog TOML
    #[arg(long, default_value = "data/catalog.toml")]
    catalog: PathBuf,

    /// Engine configuration TOML; defaults when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Pool effectiveness knowledge across all agents
    #[arg(long)]
    shared: bool,

    /// Directory to save agent profiles into after the run
    #[arg(long)]
    save_dir: Option<PathBuf>,

    /// Output format: json or text
    #[arg(long, default_value = "text")]
    format: String,
}

/// Monster categories and the elements that hurt them twice as much
const BESTIARY: [(&str, &[Element]); 4] = [
    ("undead", &[Element::Fire, Element::Holy]),
    ("beast", &[Element::Fire]),
    ("elemental", &[Element::Ice]),
    ("construct", &[Element::Lightning]),
];

const WEAKNESS_MULTIPLIER: f32 = 2.0;
const BASIC_ATTACK_DAMAGE: f32 = 6.0;
const REST_TICKS: u32 = 3;

struct Foe {
    id: String,
    category: &'static str,
    weaknesses: &'static [Element],
    health: f32,
    distance: f32,
}

/// One agent's private fight: world snapshot and resolver in one
struct Duel {
    rng: ChaCha8Rng,
    catalog: Arc<StaticCatalog>,
    health: f32,
    stamina: f32,
    mana: f32,
    foe: Option<Foe>,
    rest_ticks: u32,
    spawned: u32,
    kills: u32,
    deaths: u32,
    last_foe_action: ObservedAction,
    weapons: Vec<String>,
    skills: Vec<String>,
    items: Vec<String>,
    combos: Vec<String>,
}

impl Duel {
    fn new(seed: u64, catalog: Arc<StaticCatalog>) -> Self {
        let mut duel = Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            catalog,
            health: 1.0,
            stamina: 1.0,
            mana: 1.0,
            foe: None,
            rest_ticks: 0,
            spawned: 0,
            kills: 0,
            deaths: 0,
            last_foe_action: ObservedAction::Other,
            weapons: strings(&["iron_sword", "war_hammer", "silver_dagger"]),
            skills: strings(&["fireball", "frost_lance", "chain_lightning", "smite", "mend"]),
            items: strings(&["healing_potion", "tower_shield"]),
            combos: strings(&["fire_storm"]),
        };
        duel.spawn();
        duel
    }

    fn spawn(&mut self) {
        let (category, weaknesses) = BESTIARY[self.rng.gen_range(0..BESTIARY.len())];
        self.spawned += 1;
        self.foe = Some(Foe {
            id: format!("{}-{}", category, self.spawned),
            category,
            weaknesses,
            health: 1.0,
            distance: self.rng.gen_range(3.0..12.0),
        });
        self.last_foe_action = ObservedAction::Taunt;
    }

    fn context(&self) -> CombatContext {
        let emotion = if self.health < 0.3 {
            Emotion::Fear
        } else if self.last_foe_action.is_hostile() {
            Emotion::Aggressive
        } else {
            Emotion::Calm
        };
        let mut context = CombatContext::new()
            .with_health(self.health)
            .with_stamina(self.stamina)
            .with_mana(self.mana)
            .with_emotion(emotion)
            .with_weapons(self.weapons.iter())
            .with_skills(self.skills.iter())
            .with_items(self.items.iter())
            .with_combos(self.combos.iter())
            .with_opponent_actions(vec![self.last_foe_action]);
        if let Some(foe) = &self.foe {
            context = context.with_enemies_nearby(1).with_enemy(
                EnemyView::new(foe.id.clone(), foe.category)
                    .with_health(foe.health)
                    .with_distance(foe.distance),
            );
        }
        context
    }

    /// Raw damage and element of an offensive decision
    fn offense(&self, decision: &CombatDecision) -> Option<(f32, Option<Element>)> {
        let catalog = self.catalog.as_ref();
        match (&decision.action, decision.resource.as_ref()) {
            (ActionType::SkillCombo, Some(ChosenResource { kind: ResourceKind::Combo, id })) => {
                catalog.combo(id).map(|c| (c.damage, None))
            }
            (
                ActionType::SkillAttack
                | ActionType::ElementalSkill
                | ActionType::SkillSequence
                | ActionType::SkillCombo,
                Some(ChosenResource { kind: ResourceKind::Skill, id }),
            ) => {
                let skill = catalog.skill(id)?;
                let follow_up = decision
                    .follow_up
                    .as_deref()
                    .and_then(|f| catalog.skill(f))
                    .map_or(0.0, |s| s.damage * 0.5);
                Some((skill.damage + follow_up, skill.element))
            }
            (ActionType::WeaponAttack, Some(ChosenResource { kind: ResourceKind::Weapon, id })) => {
                catalog.weapon(id).map(|w| (w.damage, w.element))
            }
            (ActionType::BasicAttack | ActionType::Basic(BasicAction::Attack), _)
            | (ActionType::WeaponAttack, None) => Some((BASIC_ATTACK_DAMAGE, None)),
            _ => None,
        }
    }

    fn fight(&mut self, decision: &CombatDecision) -> (bool, CombatOutcome) {
        let mut guarded = false;
        let mut outcome = CombatOutcome::default();
        let mut success = true;

        if let Some((base, element)) = self.offense(decision) {
            let spell = matches!(
                decision.resource.as_ref().map(|r| r.kind),
                Some(ResourceKind::Skill | ResourceKind::Combo)
            );
            if spell && self.mana < 0.1 {
                success = false;
            } else {
                if spell {
                    self.mana = (self.mana - 0.12).max(0.0);
                } else {
                    self.stamina = (self.stamina - 0.06).max(0.0);
                }
                let weak = self
                    .foe
                    .as_ref()
                    .zip(element)
                    .is_some_and(|(foe, e)| foe.weaknesses.contains(&e));
                let multiplier = if weak { WEAKNESS_MULTIPLIER } else { 1.0 };
                success = self.rng.gen_bool(0.85);
                if success {
                    outcome.damage_dealt = base * multiplier * self.rng.gen_range(0.9..1.1);
                }
                if element.is_some() {
                    outcome.expected_damage = Some(base);
                }
            }
        } else {
            match decision.action {
                ActionType::DefensiveSkill | ActionType::Defend => guarded = true,
                ActionType::UseItem => {
                    guarded = true;
                    let healing = decision
                        .resource
                        .as_ref()
                        .and_then(|r| self.catalog.item(&r.id))
                        .is_some_and(|i| i.role == ItemRole::Healing);
                    if healing {
                        self.health = (self.health + 0.3).min(1.0);
                    }
                }
                ActionType::Reposition => {
                    if let Some(foe) = self.foe.as_mut() {
                        foe.distance += 3.0;
                    }
                    guarded = true;
                }
                ActionType::SupportAlly => success = false,
                _ => {}
            }
            if decision.action == ActionType::DefensiveSkill {
                self.health = (self.health + 0.15).min(1.0);
            }
        }

        let Some(foe) = self.foe.as_mut() else {
            return (success, outcome);
        };
        foe.health -= outcome.damage_dealt / 100.0;
        if foe.health <= 0.0 {
            self.kills += 1;
            self.foe = None;
            self.rest_ticks = REST_TICKS;
            self.last_foe_action = ObservedAction::Flee;
            return (true, outcome.defeated());
        }

        foe.distance = (foe.distance - 2.0).max(1.0);
        let mut hit = self.rng.gen_range(4.0..10.0);
        if guarded {
            hit *= 0.4;
        }
        outcome.damage_taken = hit;
        self.health -= hit / 100.0;
        self.last_foe_action = if self.rng.gen_bool(0.7) {
            ObservedAction::Attack
        } else {
            ObservedAction::Taunt
        };
        if self.health <= 0.0 {
            self.deaths += 1;
            self.health = 1.0;
            self.spawn();
        }
        (success, outcome)
    }

    fn rest(&mut self, decision: &CombatDecision) -> (bool, CombatOutcome) {
        let success = match decision.action {
            ActionType::Basic(BasicAction::Heal) => {
                let hurt = self.health < 1.0;
                self.health = (self.health + 0.2).min(1.0);
                hurt
            }
            ActionType::Basic(BasicAction::Explore) => {
                self.rest_ticks = self.rest_ticks.saturating_sub(1);
                true
            }
            ActionType::Basic(BasicAction::Wait | BasicAction::Move) => true,
            _ => false,
        };
        self.rest_ticks = self.rest_ticks.saturating_sub(1);
        if self.rest_ticks == 0 {
            self.spawn();
        }
        (success, CombatOutcome::default())
    }
}

impl WorldSnapshotProvider for Duel {
    fn snapshot(&self, _agent: AgentId) -> CombatContext {
        self.context()
    }
}

impl CombatResolver for Duel {
    fn resolve(&mut self, _agent: AgentId, decision: &CombatDecision) -> (bool, CombatOutcome) {
        self.stamina = (self.stamina + 0.03).min(1.0);
        self.mana = (self.mana + 0.04).min(1.0);
        let (success, outcome) = if self.foe.is_some() {
            self.fight(decision)
        } else {
            self.rest(decision)
        };
        (success, outcome.with_next_context(self.context()))
    }
}

#[derive(Serialize)]
struct AgentSummary {
    id: String,
    level: u32,
    kills: u32,
    deaths: u32,
    win_rate: f32,
    learning_rate: f32,
    exploration_rate: f32,
    favourite_tactic: Option<String>,
    discovered_weaknesses: usize,
    q_entries: usize,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();
    let seed = args.seed.unwrap_or_else(rand::random);

    let config = match &args.config {
        Some(path) => load_config(path).unwrap_or_else(|e| {
            eprintln!("Warning: Failed to load config '{}': {}", path.display(), e);
            eprintln!("Using default config");
            CombatAiConfig::default()
        }),
        None => CombatAiConfig::default(),
    };
    let catalog = Arc::new(load_catalog(&args.catalog).unwrap_or_else(|e| {
        eprintln!("Warning: Failed to load catalog '{}': {}", args.catalog.display(), e);
        eprintln!("Using an empty catalog");
        StaticCatalog::new()
    }));
    let personality = args.personality.as_deref().map(|name| {
        load_personality(name).unwrap_or_else(|e| {
            eprintln!("Warning: Failed to load personality '{}': {}", name, e);
            eprintln!("Using default personality");
            Default::default()
        })
    });

    let catalog_handle: Arc<dyn ResourceCatalog> = catalog.clone();
    let ai = match CombatAi::new(config.clone(), catalog_handle) {
        Ok(ai) => ai,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let pool = args.shared.then(|| Arc::new(SharedLedger::new(config.damage_smoothing)));
    let mut agents: Vec<AgentProfile> = (0..args.agents as u64)
        .map(|i| {
            let mut agent = AgentProfile::with_seed(&config, seed.wrapping_add(i));
            if let Some(p) = personality {
                agent = agent.with_personality(p);
            }
            if let Some(pool) = &pool {
                agent = agent.with_shared_ledger(Arc::clone(pool));
            }
            agent
        })
        .collect();
    let mut duels: Vec<Duel> = (0..args.agents as u64)
        .map(|i| Duel::new(seed.wrapping_add(1_000 + i), Arc::clone(&catalog)))
        .collect();

    tracing::info!(
        "Running {} agents for {} rounds (seed {})",
        agents.len(),
        args.rounds,
        seed
    );

    agents
        .par_iter_mut()
        .zip(duels.par_iter_mut())
        .for_each(|(agent, duel)| {
            for _ in 0..args.rounds {
                let context = duel.snapshot(agent.id());
                let decision = ai.decide(agent, &context);
                let (success, outcome) = duel.resolve(agent.id(), &decision);
                ai.learn(agent, &decision, success, &outcome);
            }
        });

    let summaries: Vec<AgentSummary> = agents
        .iter()
        .zip(&duels)
        .map(|(agent, duel)| {
            let report = agent.report();
            let favourite_tactic = report
                .tactic_stats
                .iter()
                .max_by_key(|(_, stats)| stats.uses)
                .map(|(tactic, _)| tactic.to_string());
            let fights = duel.kills + duel.deaths;
            AgentSummary {
                id: agent.id().to_string(),
                level: report.level,
                kills: duel.kills,
                deaths: duel.deaths,
                win_rate: if fights == 0 {
                    0.0
                } else {
                    duel.kills as f32 / fights as f32
                },
                learning_rate: report.learning_rate,
                exploration_rate: report.exploration_rate,
                favourite_tactic,
                discovered_weaknesses: report.vulnerabilities,
                q_entries: report.q_entries,
            }
        })
        .collect();

    if let Some(dir) = &args.save_dir {
        if let Err(e) = std::fs::create_dir_all(dir) {
            eprintln!("Warning: Failed to create '{}': {}", dir.display(), e);
        }
        for agent in &agents {
            let path = dir.join(format!("{}.json", agent.id()));
            if let Err(e) = save_profile(agent, &path) {
                eprintln!("Warning: Failed to save agent {}: {}", agent.id(), e);
            }
        }
    }

    match args.format.as_str() {
        "json" => print_json(&summaries),
        "text" => print_text(&summaries, seed),
        _ => {
            eprintln!("Unknown format '{}', defaulting to text", args.format);
            print_text(&summaries, seed);
        }
    }
}

fn print_json(summaries: &[AgentSummary]) {
    match serde_json::to_string_pretty(summaries) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Error: Failed to encode results: {}", e),
    }
}

fn print_text(summaries: &[AgentSummary], seed: u64) {
    println!("Combat Simulation");
    println!("=================");
    for s in summaries {
        println!(
            "{}  lvl {:>2}  kills {:>3}  deaths {:>3}  win {:>5.1}%  alpha {:.3}  eps {:.3}  weaknesses {}  tactic {}",
            &s.id[..8],
            s.level,
            s.kills,
            s.deaths,
            s.win_rate * 100.0,
            s.learning_rate,
            s.exploration_rate,
            s.discovered_weaknesses,
            s.favourite_tactic.as_deref().unwrap_or("-")
        );
    }
    println!();
    println!("Seed: {}", seed);
}

fn strings(ids: &[&str]) -> Vec<String> {
    ids.iter().map(|s| s.to_string()).collect()
}
