//! Decision values produced by the combat core
//!
//! A `CombatDecision` is the only thing the core hands back to the host.
//! The external resolver applies it; the feedback loop later reads the
//! provenance fields (`phase`, `origin`, `situation`) to credit the outcome.

use serde::{Deserialize, Serialize};

use crate::combat::catalog::ResourceKind;
use crate::combat::context::BasicAction;
use crate::core::types::{clamp01, ActionIndex, EnemyCategory, ResourceId, StateId};
use crate::tactics::{CombatPhase, Tactic};

/// Concrete action the agent intends to perform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    SkillAttack,
    WeaponAttack,
    BasicAttack,
    ElementalSkill,
    SkillCombo,
    SkillSequence,
    DefensiveSkill,
    UseItem,
    Defend,
    SupportAlly,
    Reposition,
    Basic(BasicAction),
    Wait,
}

/// Broad category used to pick the personality trait that shapes rewards
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionCategory {
    Attack,
    Defend,
    Explore,
    Interact,
    Other,
}

impl ActionType {
    pub fn category(&self) -> ActionCategory {
        match self {
            ActionType::SkillAttack
            | ActionType::WeaponAttack
            | ActionType::BasicAttack
            | ActionType::ElementalSkill
            | ActionType::SkillCombo
            | ActionType::SkillSequence
            | ActionType::Basic(BasicAction::Attack) => ActionCategory::Attack,
            ActionType::DefensiveSkill
            | ActionType::UseItem
            | ActionType::Defend
            | ActionType::Reposition
            | ActionType::Basic(BasicAction::Defend) => ActionCategory::Defend,
            ActionType::Basic(BasicAction::Explore) => ActionCategory::Explore,
            ActionType::SupportAlly | ActionType::Basic(BasicAction::Interact) => {
                ActionCategory::Interact
            }
            ActionType::Basic(_) | ActionType::Wait => ActionCategory::Other,
        }
    }
}

/// Who the action is aimed at
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Target {
    Enemy(String),
    SelfTarget,
    Ally,
    None,
}

impl Target {
    pub fn enemy_id(&self) -> Option<&str> {
        match self {
            Target::Enemy(id) => Some(id),
            _ => None,
        }
    }
}

/// Weapon, skill, item or combo the decision commits to
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChosenResource {
    pub kind: ResourceKind,
    pub id: ResourceId,
}

impl ChosenResource {
    pub fn weapon(id: impl Into<ResourceId>) -> Self {
        Self { kind: ResourceKind::Weapon, id: id.into() }
    }

    pub fn skill(id: impl Into<ResourceId>) -> Self {
        Self { kind: ResourceKind::Skill, id: id.into() }
    }

    pub fn item(id: impl Into<ResourceId>) -> Self {
        Self { kind: ResourceKind::Item, id: id.into() }
    }

    pub fn combo(id: impl Into<ResourceId>) -> Self {
        Self { kind: ResourceKind::Combo, id: id.into() }
    }
}

/// Which decision path produced a decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionOrigin {
    /// Phase → tactic → executor pipeline
    Tactical,
    /// Raw Q-table choice over basic actions
    LowLevel { state: StateId, action: ActionIndex },
    /// Safe fallback after an internal failure
    Fallback,
}

/// Facts about the tick a decision was made in, kept for the feedback loop
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SituationSnapshot {
    pub state: StateId,
    pub enemy_category: Option<EnemyCategory>,
    pub enemies_nearby: u32,
    pub hostile_actions_observed: u32,
    pub situation_key: String,
}

/// Immutable output of one decision tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatDecision {
    pub action: ActionType,
    pub target: Target,
    pub resource: Option<ChosenResource>,
    /// Second skill of a chained sequence
    pub follow_up: Option<ResourceId>,
    pub tactic: Tactic,
    pub phase: CombatPhase,
    pub priority: f32,
    /// Always within [0, 1]
    pub confidence: f32,
    pub rationale: String,
    pub expected_outcome: String,
    pub origin: DecisionOrigin,
    pub situation: SituationSnapshot,
}

impl CombatDecision {
    pub fn new(action: ActionType, tactic: Tactic) -> Self {
        Self {
            action,
            target: Target::None,
            resource: None,
            follow_up: None,
            tactic,
            phase: CombatPhase::Engagement,
            priority: 0.5,
            confidence: 0.5,
            rationale: String::new(),
            expected_outcome: String::new(),
            origin: DecisionOrigin::Tactical,
            situation: SituationSnapshot::default(),
        }
    }

    /// Guaranteed safe decision used when nothing else applies
    ///
    /// Agents in combat defend, agents out of combat wait.
    pub fn fallback(in_combat: bool, reason: impl Into<String>) -> Self {
        let (action, target) = if in_combat {
            (ActionType::Defend, Target::SelfTarget)
        } else {
            (ActionType::Wait, Target::None)
        };
        Self {
            origin: DecisionOrigin::Fallback,
            ..Self::new(action, Tactic::Defensive)
                .with_target(target)
                .with_priority(0.1)
                .with_confidence(0.1)
                .with_rationale(reason)
                .with_expected("Hold position until the situation is readable")
        }
    }

    pub fn with_target(mut self, target: Target) -> Self {
        self.target = target;
        self
    }

    pub fn with_resource(mut self, resource: ChosenResource) -> Self {
        self.resource = Some(resource);
        self
    }

    pub fn with_follow_up(mut self, skill: impl Into<ResourceId>) -> Self {
        self.follow_up = Some(skill.into());
        self
    }

    pub fn with_priority(mut self, priority: f32) -> Self {
        self.priority = clamp01(priority);
        self
    }

    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence = clamp01(confidence);
        self
    }

    pub fn with_rationale(mut self, rationale: impl Into<String>) -> Self {
        self.rationale = rationale.into();
        self
    }

    pub fn with_expected(mut self, expected: impl Into<String>) -> Self {
        self.expected_outcome = expected.into();
        self
    }

    pub fn with_phase(mut self, phase: CombatPhase) -> Self {
        self.phase = phase;
        self
    }

    pub fn with_origin(mut self, origin: DecisionOrigin) -> Self {
        self.origin = origin;
        self
    }

    pub fn with_situation(mut self, situation: SituationSnapshot) -> Self {
        self.situation = situation;
        self
    }

    pub fn is_fallback(&self) -> bool {
        self.origin == DecisionOrigin::Fallback
    }

    pub fn resource_id(&self) -> Option<&str> {
        self.resource.as_ref().map(|r| r.id.as_str())
    }
}

impl std::fmt::Display for CombatDecision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:?} -> {:?} (tactic: {:?}, confidence: {:.2})",
            self.action, self.target, self.tactic, self.confidence
        )
    }
}
