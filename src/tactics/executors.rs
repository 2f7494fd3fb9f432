//! Tactic executors: one pure handler per tactic
//!
//! Handlers read the environment and return a decision. They never touch
//! the world and never mutate learned state. A handler that finds nothing
//! to do hands over to [`adaptive`], and the delegate's tactic tag is kept
//! on the resulting decision.

use rand::{Rng, RngCore};

use crate::combat::catalog::ResourceCatalog;
use crate::combat::context::CombatContext;
use crate::combat::decision::{ActionType, ChosenResource, CombatDecision, Target};
use crate::core::types::{Element, ResourceId};
use crate::knowledge::ledger::{pick_best, LedgerNamespace, LedgerView, NEUTRAL_SCORE};
use crate::knowledge::vulnerability::VulnerabilityTracker;
use crate::personality::PersonalityModel;
use crate::tactics::metrics::SituationMetrics;
use crate::tactics::phase::CombatPhase;
use crate::tactics::Tactic;

/// Health below which the defensive handler reaches for healing
const HEAL_THRESHOLD: f32 = 0.7;
const CLOSE_RANGE: f32 = 2.0;
const REPOSITION_THREAT: f32 = 0.5;
const ADAPTIVE_DEFENSIVE_THREAT: f32 = 0.6;
const ADAPTIVE_AGGRESSIVE_ADVANTAGE: f32 = 1.2;

/// Everything a handler may read for one tick
pub struct TacticEnv<'a> {
    pub context: &'a CombatContext,
    pub ledger: &'a dyn LedgerView,
    pub vulnerabilities: &'a VulnerabilityTracker,
    pub personality: &'a PersonalityModel,
    pub catalog: &'a dyn ResourceCatalog,
    pub phase: CombatPhase,
    pub metrics: SituationMetrics,
}

impl<'a> TacticEnv<'a> {
    pub fn category(&self) -> &str {
        self.context.enemy_category()
    }

    fn enemy_target(&self) -> Target {
        match &self.context.enemy {
            Some(enemy) => Target::Enemy(enemy.id.clone()),
            None => Target::None,
        }
    }

    fn decision(&self, action: ActionType, tactic: Tactic, confidence: f32) -> CombatDecision {
        CombatDecision::new(action, tactic)
            .with_phase(self.phase)
            .with_priority(confidence)
            .with_confidence(confidence)
    }

    fn skill_score(&self, skill: &str) -> f32 {
        self.ledger.score(LedgerNamespace::Skill, skill, self.category())
    }

    /// Available skills the catalog knows, filtered by role
    fn skills_where<F>(&self, filter: F) -> Vec<ResourceId>
    where
        F: Fn(&crate::combat::catalog::SkillProfile) -> bool,
    {
        self.context
            .available_skills
            .iter()
            .filter(|id| self.catalog.skill(id).is_some_and(&filter))
            .cloned()
            .collect()
    }

    /// Learned score weighted by catalog damage
    fn best_damaging_skill(&self) -> Option<ResourceId> {
        let damaging = self.skills_where(|s| s.is_damaging());
        pick_best(&damaging, |id| {
            let damage = self.catalog.skill(id).map_or(0.0, |s| s.damage);
            self.skill_score(id) * damage
        })
        .map(|(id, _)| id)
    }

    fn best_weapon(&self) -> Option<(ResourceId, f32)> {
        self.ledger.best_item_against(
            LedgerNamespace::Weapon,
            self.category(),
            &self.context.available_weapons,
        )
    }

    /// Elemental skills on hand, with what is known about their element
    pub fn elemental_options(&self) -> Vec<ElementalOption> {
        let category = self.category();
        self.context
            .available_skills
            .iter()
            .filter_map(|skill| {
                let element = self.catalog.skill_element(skill)?;
                let resistance = self
                    .context
                    .enemy
                    .as_ref()
                    .map_or(0.0, |e| e.resistance(element));
                let learned = self
                    .skill_score(skill)
                    .max(self.ledger.score(LedgerNamespace::Element, element.as_str(), category));
                Some(ElementalOption {
                    skill: skill.clone(),
                    element,
                    resistance,
                    learned,
                    trusted_weakness: self.vulnerabilities.is_trusted(category, element),
                })
            })
            .collect()
    }
}

/// An elemental skill and why it might pay off
#[derive(Debug, Clone, PartialEq)]
pub struct ElementalOption {
    pub skill: ResourceId,
    pub element: Element,
    /// Enemy resistance to the element, negative when vulnerable
    pub resistance: f32,
    /// Best of the skill's and the element's ledger score
    pub learned: f32,
    pub trusted_weakness: bool,
}

impl ElementalOption {
    pub fn exploits_resistance(&self) -> bool {
        self.resistance < 0.0
    }

    pub fn is_learned(&self) -> bool {
        self.learned > NEUTRAL_SCORE || self.trusted_weakness
    }

    pub fn is_opportunity(&self) -> bool {
        self.exploits_resistance() || self.is_learned()
    }

    /// 1.0 is "nothing special"; a resistance of -0.5 counts like a 1.5 score
    pub fn strength(&self) -> f32 {
        (1.0 - self.resistance.min(0.0)).max(self.learned)
    }
}

pub type TacticHandler = fn(&TacticEnv<'_>, &mut dyn RngCore) -> CombatDecision;

/// Handlers indexed by [`Tactic::index`]
const HANDLERS: [TacticHandler; 8] = [
    aggressive,
    defensive,
    combo_chain,
    weapon_switch,
    elemental_exploit,
    support,
    positional,
    adaptive,
];

pub fn executor_for(tactic: Tactic) -> TacticHandler {
    HANDLERS[tactic.index()]
}

pub fn execute(tactic: Tactic, env: &TacticEnv<'_>, rng: &mut dyn RngCore) -> CombatDecision {
    executor_for(tactic)(env, rng)
}

pub fn aggressive(env: &TacticEnv<'_>, _rng: &mut dyn RngCore) -> CombatDecision {
    if let Some(skill) = env.best_damaging_skill() {
        return env
            .decision(ActionType::SkillAttack, Tactic::Aggressive, 0.8)
            .with_target(env.enemy_target())
            .with_resource(ChosenResource::skill(skill.clone()))
            .with_rationale(format!("Press the attack with {}", skill))
            .with_expected("High damage");
    }

    if let Some((weapon, score)) = env.best_weapon() {
        return env
            .decision(ActionType::WeaponAttack, Tactic::Aggressive, 0.7)
            .with_target(env.enemy_target())
            .with_resource(ChosenResource::weapon(weapon.clone()))
            .with_rationale(format!("Strike with {} (score {:.2})", weapon, score))
            .with_expected("Solid damage");
    }

    env.decision(ActionType::BasicAttack, Tactic::Aggressive, 0.6)
        .with_target(env.enemy_target())
        .with_rationale("No gear to lean on, attack anyway")
        .with_expected("Some damage")
}

pub fn defensive(env: &TacticEnv<'_>, _rng: &mut dyn RngCore) -> CombatDecision {
    if env.context.health() < HEAL_THRESHOLD {
        let restorative = env.skills_where(|s| s.is_restorative());
        if let Some((skill, _)) = env.ledger.best_item_against(
            LedgerNamespace::Skill,
            env.category(),
            &restorative,
        ) {
            return env
                .decision(ActionType::DefensiveSkill, Tactic::Defensive, 0.8)
                .with_target(Target::SelfTarget)
                .with_resource(ChosenResource::skill(skill.clone()))
                .with_rationale(format!("Recover with {}", skill))
                .with_expected("Health restored");
        }
    }

    let defensive_items: Vec<ResourceId> = env
        .context
        .available_items
        .iter()
        .filter(|id| env.catalog.item(id).is_some_and(|i| i.is_defensive()))
        .cloned()
        .collect();
    let situation = env.context.situation_key();
    if let Some((item, _)) =
        env.ledger
            .best_item_against(LedgerNamespace::Item, situation, &defensive_items)
    {
        return env
            .decision(ActionType::UseItem, Tactic::Defensive, 0.6)
            .with_target(Target::SelfTarget)
            .with_resource(ChosenResource::item(item.clone()))
            .with_rationale(format!("Use {} while {}", item, situation))
            .with_expected("Damage mitigated");
    }

    env.decision(ActionType::Defend, Tactic::Defensive, 0.5)
        .with_target(Target::SelfTarget)
        .with_rationale("Hold a guard")
        .with_expected("Reduced damage taken")
}

pub fn combo_chain(env: &TacticEnv<'_>, rng: &mut dyn RngCore) -> CombatDecision {
    let combos: Vec<ResourceId> = env
        .context
        .available_combos
        .iter()
        .filter(|id| env.catalog.combo(id).is_some())
        .cloned()
        .collect();
    if let Some((combo, _)) =
        env.ledger
            .best_item_against(LedgerNamespace::Combo, env.category(), &combos)
    {
        return env
            .decision(ActionType::SkillCombo, Tactic::ComboChain, 0.9)
            .with_target(env.enemy_target())
            .with_resource(ChosenResource::combo(combo.clone()))
            .with_rationale(format!("Open combo {}", combo))
            .with_expected("Burst damage");
    }

    let mut ranked: Vec<(ResourceId, f32)> = env
        .context
        .available_skills
        .iter()
        .map(|id| (id.clone(), env.skill_score(id)))
        .collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked.dedup_by(|a, b| a.0 == b.0);

    match ranked.as_slice() {
        [(first, _), (second, _), ..] => env
            .decision(ActionType::SkillSequence, Tactic::ComboChain, 0.7)
            .with_target(env.enemy_target())
            .with_resource(ChosenResource::skill(first.clone()))
            .with_follow_up(second.clone())
            .with_rationale(format!("Chain {} into {}", first, second))
            .with_expected("Sustained damage"),
        [(only, _)] => env
            .decision(ActionType::SkillAttack, Tactic::ComboChain, 0.6)
            .with_target(env.enemy_target())
            .with_resource(ChosenResource::skill(only.clone()))
            .with_rationale(format!("Only {} is ready", only))
            .with_expected("Moderate damage"),
        [] => adaptive(env, rng),
    }
}

pub fn weapon_switch(env: &TacticEnv<'_>, rng: &mut dyn RngCore) -> CombatDecision {
    match env.best_weapon() {
        Some((weapon, score)) => env
            .decision(ActionType::WeaponAttack, Tactic::WeaponSwitch, 0.8)
            .with_target(env.enemy_target())
            .with_resource(ChosenResource::weapon(weapon.clone()))
            .with_rationale(format!(
                "Switch to {} against {} (score {:.2})",
                weapon,
                env.category(),
                score
            ))
            .with_expected("Better matchup"),
        None => adaptive(env, rng),
    }
}

pub fn elemental_exploit(env: &TacticEnv<'_>, rng: &mut dyn RngCore) -> CombatDecision {
    let options = env.elemental_options();

    // most negative resistance first, then lowest skill id
    let weakness = options
        .iter()
        .filter(|o| o.exploits_resistance())
        .min_by(|a, b| {
            a.resistance
                .total_cmp(&b.resistance)
                .then_with(|| a.skill.cmp(&b.skill))
        });
    if let Some(option) = weakness {
        return env
            .decision(ActionType::ElementalSkill, Tactic::ElementalExploit, 0.85)
            .with_target(env.enemy_target())
            .with_resource(ChosenResource::skill(option.skill.clone()))
            .with_rationale(format!(
                "{} is weak to {}",
                env.category(),
                option.element.as_str()
            ))
            .with_expected("Amplified elemental damage");
    }

    let learned = options
        .iter()
        .filter(|o| o.is_learned())
        .max_by(|a, b| {
            a.learned
                .total_cmp(&b.learned)
                .then_with(|| b.skill.cmp(&a.skill))
        });
    match learned {
        Some(option) => env
            .decision(ActionType::ElementalSkill, Tactic::ElementalExploit, 0.75)
            .with_target(env.enemy_target())
            .with_resource(ChosenResource::skill(option.skill.clone()))
            .with_rationale(format!(
                "{} has worked against {} before",
                option.element.as_str(),
                env.category()
            ))
            .with_expected("Elevated elemental damage"),
        None => adaptive(env, rng),
    }
}

pub fn support(env: &TacticEnv<'_>, rng: &mut dyn RngCore) -> CombatDecision {
    if env.context.allies_nearby == 0 {
        return adaptive(env, rng);
    }

    let ally_skills = env.skills_where(|s| s.targets_allies());
    let decision = env
        .decision(ActionType::SupportAlly, Tactic::Support, 0.7)
        .with_target(Target::Ally)
        .with_expected("Ally strengthened");
    match env
        .ledger
        .best_item_against(LedgerNamespace::Skill, env.category(), &ally_skills)
    {
        Some((skill, _)) => decision
            .with_resource(ChosenResource::skill(skill.clone()))
            .with_rationale(format!("Cast {} on an ally", skill)),
        None => decision.with_rationale("Cover a nearby ally"),
    }
}

pub fn positional(env: &TacticEnv<'_>, rng: &mut dyn RngCore) -> CombatDecision {
    if env.context.enemy_distance() < CLOSE_RANGE && env.metrics.threat > REPOSITION_THREAT {
        return env
            .decision(ActionType::Reposition, Tactic::Positional, 0.55)
            .with_target(env.enemy_target())
            .with_rationale("Too close under pressure, open distance")
            .with_expected("Fewer incoming hits");
    }
    adaptive(env, rng)
}

pub fn adaptive(env: &TacticEnv<'_>, rng: &mut dyn RngCore) -> CombatDecision {
    if env.phase.is_disengaging() || env.metrics.threat > ADAPTIVE_DEFENSIVE_THREAT {
        defensive(env, rng)
    } else if env.metrics.advantage > ADAPTIVE_AGGRESSIVE_ADVANTAGE {
        aggressive(env, rng)
    } else if rng.gen_bool(0.5) {
        aggressive(env, rng)
    } else {
        defensive(env, rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::catalog::{
        ComboProfile, ItemProfile, ItemRole, SkillProfile, SkillRole, StaticCatalog,
        WeaponProfile,
    };
    use crate::combat::context::EnemyView;
    use crate::knowledge::EffectivenessLedger;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn catalog() -> StaticCatalog {
        StaticCatalog::new()
            .with_weapon(
                "sword",
                WeaponProfile { damage: 10.0, element: None, cooldown: 0.0 },
            )
            .with_weapon(
                "hammer",
                WeaponProfile { damage: 14.0, element: None, cooldown: 0.0 },
            )
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
                "frost_lance",
                SkillProfile {
                    role: SkillRole::Damage,
                    damage: 18.0,
                    element: Some(Element::Ice),
                    cooldown: 0.0,
                },
            )
            .with_skill(
                "mend",
                SkillProfile {
                    role: SkillRole::Heal,
                    damage: 0.0,
                    element: None,
                    cooldown: 0.0,
                },
            )
            .with_item("tower_shield", ItemProfile { role: ItemRole::Defensive })
            .with_item("fire_oil", ItemProfile { role: ItemRole::Offensive })
            .with_combo(
                "fire_storm",
                ComboProfile {
                    skills: vec!["fireball".into(), "frost_lance".into()],
                    damage: 50.0,
                },
            )
    }

    struct Fixture {
        ledger: EffectivenessLedger,
        vulnerabilities: VulnerabilityTracker,
        personality: PersonalityModel,
        catalog: StaticCatalog,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                ledger: EffectivenessLedger::default(),
                vulnerabilities: VulnerabilityTracker::new(),
                personality: PersonalityModel::default(),
                catalog: catalog(),
            }
        }

        fn env<'a>(&'a self, context: &'a CombatContext, phase: CombatPhase) -> TacticEnv<'a> {
            TacticEnv {
                context,
                ledger: &self.ledger,
                vulnerabilities: &self.vulnerabilities,
                personality: &self.personality,
                catalog: &self.catalog,
                phase,
                metrics: SituationMetrics::measure(context),
            }
        }
    }

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(7)
    }

    fn engaged() -> CombatContext {
        CombatContext::new()
            .with_health(0.9)
            .with_enemy(EnemyView::new("ghoul-1", "undead").with_distance(4.0))
            .with_enemies_nearby(1)
    }

    #[test]
    fn test_dispatch_table_matches_tactics() {
        let fixture = Fixture::new();
        let context = engaged().with_weapons(["sword"]);
        let env = fixture.env(&context, CombatPhase::Engagement);
        let decision = execute(Tactic::WeaponSwitch, &env, &mut rng());
        assert_eq!(decision.tactic, Tactic::WeaponSwitch);
    }

    #[test]
    fn test_aggressive_prefers_damaging_skill() {
        let fixture = Fixture::new();
        let context = engaged()
            .with_skills(["mend", "frost_lance", "fireball"])
            .with_weapons(["sword"]);
        let env = fixture.env(&context, CombatPhase::Engagement);
        let decision = aggressive(&env, &mut rng());
        assert_eq!(decision.action, ActionType::SkillAttack);
        assert_eq!(decision.resource_id(), Some("fireball"));
        assert_eq!(decision.confidence, 0.8);
        assert_eq!(decision.target, Target::Enemy("ghoul-1".into()));
    }

    #[test]
    fn test_aggressive_falls_back_to_weapon_then_basic() {
        let fixture = Fixture::new();
        let context = engaged().with_weapons(["sword", "hammer"]);
        let env = fixture.env(&context, CombatPhase::Engagement);
        let decision = aggressive(&env, &mut rng());
        assert_eq!(decision.action, ActionType::WeaponAttack);
        assert_eq!(decision.resource_id(), Some("hammer"));
        assert_eq!(decision.confidence, 0.7);

        let context = engaged();
        let env = fixture.env(&context, CombatPhase::Engagement);
        let decision = aggressive(&env, &mut rng());
        assert_eq!(decision.action, ActionType::BasicAttack);
        assert_eq!(decision.confidence, 0.6);
    }

    #[test]
    fn test_weapon_choice_follows_ledger() {
        let mut fixture = Fixture::new();
        for _ in 0..5 {
            fixture
                .ledger
                .record_outcome(LedgerNamespace::Weapon, "sword", "undead", true, 20.0);
        }
        let context = engaged().with_weapons(["hammer", "sword"]);
        let env = fixture.env(&context, CombatPhase::Engagement);
        let decision = weapon_switch(&env, &mut rng());
        assert_eq!(decision.resource_id(), Some("sword"));
        assert_eq!(decision.confidence, 0.8);
    }

    #[test]
    fn test_defensive_heals_when_hurt() {
        let fixture = Fixture::new();
        let context = engaged().with_health(0.5).with_skills(["fireball", "mend"]);
        let env = fixture.env(&context, CombatPhase::Adaptation);
        let decision = defensive(&env, &mut rng());
        assert_eq!(decision.action, ActionType::DefensiveSkill);
        assert_eq!(decision.resource_id(), Some("mend"));
        assert_eq!(decision.target, Target::SelfTarget);
    }

    #[test]
    fn test_defensive_uses_item_then_guard() {
        let fixture = Fixture::new();
        let context = engaged().with_items(["fire_oil", "tower_shield"]);
        let env = fixture.env(&context, CombatPhase::Engagement);
        let decision = defensive(&env, &mut rng());
        assert_eq!(decision.action, ActionType::UseItem);
        assert_eq!(decision.resource_id(), Some("tower_shield"));
        assert_eq!(decision.confidence, 0.6);

        let context = engaged().with_items(["fire_oil"]);
        let env = fixture.env(&context, CombatPhase::Engagement);
        let decision = defensive(&env, &mut rng());
        assert_eq!(decision.action, ActionType::Defend);
        assert_eq!(decision.confidence, 0.5);
    }

    #[test]
    fn test_combo_chain_tiers() {
        let fixture = Fixture::new();
        let context = engaged()
            .with_combos(["fire_storm"])
            .with_skills(["fireball", "frost_lance"]);
        let env = fixture.env(&context, CombatPhase::Engagement);
        let decision = combo_chain(&env, &mut rng());
        assert_eq!(decision.action, ActionType::SkillCombo);
        assert_eq!(decision.confidence, 0.9);

        let context = engaged().with_skills(["frost_lance", "fireball"]);
        let env = fixture.env(&context, CombatPhase::Engagement);
        let decision = combo_chain(&env, &mut rng());
        assert_eq!(decision.action, ActionType::SkillSequence);
        assert_eq!(decision.resource_id(), Some("fireball"));
        assert_eq!(decision.follow_up.as_deref(), Some("frost_lance"));

        let context = engaged().with_skills(["fireball", "fireball"]);
        let env = fixture.env(&context, CombatPhase::Engagement);
        let decision = combo_chain(&env, &mut rng());
        assert_eq!(decision.action, ActionType::SkillAttack);
        assert_eq!(decision.confidence, 0.6);
    }

    #[test]
    fn test_combo_chain_without_skills_delegates() {
        let fixture = Fixture::new();
        let context = engaged();
        let env = fixture.env(&context, CombatPhase::Engagement);
        let decision = combo_chain(&env, &mut rng());
        assert!(matches!(decision.tactic, Tactic::Aggressive | Tactic::Defensive));
    }

    #[test]
    fn test_elemental_exploit_targets_weakness() {
        let fixture = Fixture::new();
        let context = CombatContext::new()
            .with_health(0.9)
            .with_enemy(
                EnemyView::new("ghoul-1", "undead")
                    .with_distance(4.0)
                    .with_resistance(Element::Fire, -0.5)
                    .with_resistance(Element::Ice, 0.3),
            )
            .with_skills(["frost_lance", "fireball"]);
        let env = fixture.env(&context, CombatPhase::Engagement);
        let decision = elemental_exploit(&env, &mut rng());
        assert_eq!(decision.action, ActionType::ElementalSkill);
        assert_eq!(decision.resource_id(), Some("fireball"));
        assert_eq!(decision.confidence, 0.85);
        assert_eq!(decision.tactic, Tactic::ElementalExploit);
    }

    #[test]
    fn test_elemental_exploit_uses_learned_element() {
        let mut fixture = Fixture::new();
        fixture
            .ledger
            .record_outcome(LedgerNamespace::Element, "ice", "undead", true, 30.0);
        let context = engaged().with_skills(["fireball", "frost_lance"]);
        let env = fixture.env(&context, CombatPhase::Engagement);
        let decision = elemental_exploit(&env, &mut rng());
        assert_eq!(decision.resource_id(), Some("frost_lance"));
        assert_eq!(decision.confidence, 0.75);
    }

    #[test]
    fn test_elemental_exploit_without_knowledge_delegates() {
        let fixture = Fixture::new();
        let context = engaged().with_skills(["fireball"]);
        let env = fixture.env(&context, CombatPhase::Engagement);
        let decision = elemental_exploit(&env, &mut rng());
        assert_ne!(decision.tactic, Tactic::ElementalExploit);
    }

    #[test]
    fn test_support_needs_allies() {
        let fixture = Fixture::new();
        let context = engaged().with_allies_nearby(2).with_skills(["mend"]);
        let env = fixture.env(&context, CombatPhase::Engagement);
        let decision = support(&env, &mut rng());
        assert_eq!(decision.action, ActionType::SupportAlly);
        assert_eq!(decision.target, Target::Ally);
        assert_eq!(decision.resource_id(), Some("mend"));

        let context = engaged().with_skills(["mend"]);
        let env = fixture.env(&context, CombatPhase::Recovery);
        let decision = support(&env, &mut rng());
        assert_eq!(decision.tactic, Tactic::Defensive);
    }

    #[test]
    fn test_positional_repositions_when_crowded() {
        let fixture = Fixture::new();
        let context = CombatContext::new()
            .with_health(0.5)
            .with_enemies_nearby(2)
            .with_enemy(EnemyView::new("ghoul-1", "undead").with_distance(1.0));
        let env = fixture.env(&context, CombatPhase::Adaptation);
        let decision = positional(&env, &mut rng());
        assert_eq!(decision.action, ActionType::Reposition);
        assert_eq!(decision.confidence, 0.55);
    }

    #[test]
    fn test_adaptive_rules() {
        let fixture = Fixture::new();

        let context = engaged().with_health(0.2);
        let env = fixture.env(&context, CombatPhase::Recovery);
        assert_eq!(adaptive(&env, &mut rng()).tactic, Tactic::Defensive);

        let context = CombatContext::new()
            .with_health(1.0)
            .with_enemy(
                EnemyView::new("ghoul-1", "undead")
                    .with_distance(20.0)
                    .with_health(0.3),
            );
        let env = fixture.env(&context, CombatPhase::Preparation);
        assert_eq!(adaptive(&env, &mut rng()).tactic, Tactic::Aggressive);
    }

    #[test]
    fn test_adaptive_coin_flip_is_seeded() {
        let fixture = Fixture::new();
        let context = CombatContext::new()
            .with_health(0.4)
            .with_stamina(0.3)
            .with_mana(0.2)
            .with_enemy(
                EnemyView::new("ghoul-1", "undead")
                    .with_distance(20.0)
                    .with_health(1.0),
            );
        let env = fixture.env(&context, CombatPhase::Adaptation);
        let a = adaptive(&env, &mut ChaCha8Rng::seed_from_u64(3));
        let b = adaptive(&env, &mut ChaCha8Rng::seed_from_u64(3));
        assert_eq!(a, b);
    }
}
