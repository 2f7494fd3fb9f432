//! The combat decision engine
//!
//! `CombatAi` holds only immutable configuration and the host's resource
//! catalog. All learned state lives in the `AgentProfile` passed to each call,
//! so one engine serves any number of agents and can be shared across
//! threads.
//!
//! Each decision takes one of two paths:
//!
//! - tactical, when the agent has a hostile target: phase → tactic → executor
//! - low-level, out of combat: the raw Q table picks a basic action
//!
//! Uses rayon to evaluate many agents in parallel.

use std::sync::Arc;

use rayon::prelude::*;

use crate::agent::profile::AgentProfile;
use crate::combat::catalog::ResourceCatalog;
use crate::combat::context::{BasicAction, CombatContext};
use crate::combat::decision::{
    ActionType, CombatDecision, DecisionOrigin, SituationSnapshot, Target,
};
use crate::combat::outcome::CombatOutcome;
use crate::combat::{CombatResolver, WorldSnapshotProvider};
use crate::core::config::CombatAiConfig;
use crate::core::error::{CombatAiError, Result};
use crate::core::types::{clamp01, ActionIndex, StateId};
use crate::learning::feedback::{FeedbackReport, LearningFeedbackLoop};
use crate::learning::state_encoder::StateEncoder;
use crate::tactics::executors::{execute, TacticEnv};
use crate::tactics::metrics::SituationMetrics;
use crate::tactics::phase::classify_phase;
use crate::tactics::selector::TacticSelector;
use crate::tactics::Tactic;

/// Stateless decision engine shared by every agent
pub struct CombatAi {
    config: CombatAiConfig,
    catalog: Arc<dyn ResourceCatalog>,
    encoder: StateEncoder,
    selector: TacticSelector,
    feedback: LearningFeedbackLoop,
}

impl CombatAi {
    /// Build an engine; fails if the config is inconsistent
    pub fn new(config: CombatAiConfig, catalog: Arc<dyn ResourceCatalog>) -> Result<Self> {
        config.validate().map_err(CombatAiError::Config)?;
        Ok(Self {
            encoder: StateEncoder::from_config(&config),
            selector: TacticSelector::from_config(&config),
            feedback: LearningFeedbackLoop::from_config(&config),
            config,
            catalog,
        })
    }

    pub fn config(&self) -> &CombatAiConfig {
        &self.config
    }

    pub fn catalog(&self) -> &dyn ResourceCatalog {
        self.catalog.as_ref()
    }

    pub fn encoder(&self) -> &StateEncoder {
        &self.encoder
    }

    /// Choose what `agent` does this tick
    ///
    /// Never fails: internal errors produce a low-confidence Defend (in
    /// combat) or Wait (out of combat).
    pub fn decide(&self, agent: &mut AgentProfile, context: &CombatContext) -> CombatDecision {
        match self.try_decide(agent, context) {
            Ok(decision) => decision,
            Err(e) => {
                tracing::warn!("Agent {} falling back: {}", agent.id(), e);
                CombatDecision::fallback(context.enemy.is_some(), e.to_string())
                    .with_phase(classify_phase(context, &self.config))
                    .with_situation(self.situation(context))
            }
        }
    }

    /// Feed the resolved outcome of `decision` back into `agent`
    pub fn learn(
        &self,
        agent: &mut AgentProfile,
        decision: &CombatDecision,
        success: bool,
        outcome: &CombatOutcome,
    ) -> FeedbackReport {
        self.feedback.on_outcome(
            agent,
            decision,
            success,
            outcome,
            &self.encoder,
            self.catalog.as_ref(),
        )
    }

    /// Decide for many agents at once
    ///
    /// Agents and contexts are paired by position; extra entries on either
    /// side are ignored.
    pub fn decide_all(
        &self,
        agents: &mut [AgentProfile],
        contexts: &[CombatContext],
    ) -> Vec<CombatDecision> {
        agents
            .par_iter_mut()
            .zip(contexts.par_iter())
            .map(|(agent, context)| self.decide(agent, context))
            .collect()
    }

    /// Full observe → decide → resolve → learn cycle for one agent
    pub fn tick<W, R>(
        &self,
        agent: &mut AgentProfile,
        world: &W,
        resolver: &mut R,
    ) -> (CombatDecision, FeedbackReport)
    where
        W: WorldSnapshotProvider + ?Sized,
        R: CombatResolver + ?Sized,
    {
        let context = world.snapshot(agent.id());
        let decision = self.decide(agent, &context);
        let (success, outcome) = resolver.resolve(agent.id(), &decision);
        let report = self.learn(agent, &decision, success, &outcome);
        (decision, report)
    }

    fn try_decide(&self, agent: &mut AgentProfile, context: &CombatContext) -> Result<CombatDecision> {
        let missing = context.missing_fields();
        if !missing.is_empty() {
            tracing::debug!(
                "Agent {} context missing {:?}, using defaults",
                agent.id(),
                missing
            );
        }

        let situation = self.situation(context);
        match context.enemy {
            Some(_) => self.decide_tactical(agent, context, situation),
            None => self.decide_low_level(agent, context, situation),
        }
    }

    fn decide_tactical(
        &self,
        agent: &mut AgentProfile,
        context: &CombatContext,
        situation: SituationSnapshot,
    ) -> Result<CombatDecision> {
        let phase = classify_phase(context, &self.config);
        let env = TacticEnv {
            context,
            ledger: &agent.ledger,
            vulnerabilities: &agent.vulnerabilities,
            personality: &agent.personality,
            catalog: self.catalog.as_ref(),
            phase,
            metrics: SituationMetrics::measure(context),
        };

        let choice = self.selector.select(
            &env,
            &agent.tactic_values,
            agent.rates.exploration_rate(),
            &mut agent.rng,
        )?;
        tracing::debug!(
            "Agent {} in {:?} chose {} (score {:.3}, {} candidates)",
            agent.id,
            phase,
            choice.tactic,
            choice.score,
            choice.scores.len()
        );

        let decision = execute(choice.tactic, &env, &mut agent.rng);
        Ok(decision
            .with_phase(phase)
            .with_origin(DecisionOrigin::Tactical)
            .with_situation(situation))
    }

    fn decide_low_level(
        &self,
        agent: &mut AgentProfile,
        context: &CombatContext,
        situation: SituationSnapshot,
    ) -> Result<CombatDecision> {
        let state: StateId = situation.state;
        let available: Vec<ActionIndex> = context
            .basic_actions()
            .iter()
            .map(|a| a.index())
            .collect();

        let action = agent
            .q_learning
            .choose_action(state, &available, agent.rates.exploration_rate(), &mut agent.rng)
            .and_then(BasicAction::from_index)
            .ok_or(CombatAiError::NoCandidateAction)?;

        let q = agent.q_learning.q_value(state, action.index());
        let target = match action {
            BasicAction::Defend | BasicAction::Heal => Target::SelfTarget,
            _ => Target::None,
        };
        let confidence = clamp01(0.5 + 0.5 * q.tanh());
        tracing::debug!(
            "Agent {} out of combat chose {:?} in state {} (q {:.3})",
            agent.id,
            action,
            state,
            q
        );

        Ok(CombatDecision::new(ActionType::Basic(action), Tactic::Adaptive)
            .with_target(target)
            .with_priority(confidence)
            .with_confidence(confidence)
            .with_phase(classify_phase(context, &self.config))
            .with_origin(DecisionOrigin::LowLevel {
                state,
                action: action.index(),
            })
            .with_rationale(format!("Learned basic action in state {}", state))
            .with_situation(situation))
    }

    fn situation(&self, context: &CombatContext) -> SituationSnapshot {
        SituationSnapshot {
            state: self.encoder.encode(context),
            enemy_category: context.enemy.as_ref().map(|e| e.category.clone()),
            enemies_nearby: context.enemies_nearby,
            hostile_actions_observed: context.hostile_actions_observed(),
            situation_key: context.situation_key().to_string(),
        }
    }
}
