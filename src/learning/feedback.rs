//! Outcome processing: turns one resolved decision into learning updates
//!
//! Order of updates for every outcome:
//!
//! 1. reward from success and damage
//! 2. tactic bandit update (tactical decisions only)
//! 3. effectiveness ledger and vulnerability discovery
//! 4. personality drift, experience and level-ups
//! 5. Bellman update with the personality-shaped reward (low-level decisions)
//! 6. performance window, adaptive rates, counters and history

use crate::agent::profile::{AgentProfile, HistoryEntry, TacticStats};
use crate::combat::catalog::{ResourceCatalog, ResourceKind};
use crate::combat::context::BasicAction;
use crate::combat::decision::{CombatDecision, DecisionOrigin};
use crate::combat::outcome::{outcome_reward, CombatOutcome};
use crate::core::config::CombatAiConfig;
use crate::core::types::{ActionIndex, Element};
use crate::knowledge::{LedgerNamespace, VulnerabilityChange};
use crate::learning::state_encoder::StateEncoder;
use crate::personality::PersonalityEvent;

/// Hostile actions observed before the agent grows more cautious
const HOSTILE_PATTERN_THRESHOLD: u32 = 10;
const OUTNUMBERED_AT: u32 = 3;
const STREAK_LENGTH: u32 = 3;
const UNKNOWN_CATEGORY: &str = "unknown";

/// What a single outcome changed
#[derive(Debug, Clone, PartialEq)]
pub struct FeedbackReport {
    pub reward: f32,
    /// New tactic value, for tactical decisions
    pub tactic_value: Option<f32>,
    /// New Q-value, for low-level decisions
    pub q_value: Option<f32>,
    pub leveled_up: bool,
    pub vulnerability: Option<(Element, VulnerabilityChange)>,
    pub personality_events: Vec<PersonalityEvent>,
}

#[derive(Debug, Clone, Copy)]
pub struct LearningFeedbackLoop {
    experience_per_level: u32,
    vulnerability_ratio: f32,
}

impl LearningFeedbackLoop {
    pub fn new(experience_per_level: u32, vulnerability_ratio: f32) -> Self {
        Self {
            experience_per_level: experience_per_level.max(1),
            vulnerability_ratio,
        }
    }

    pub fn from_config(config: &CombatAiConfig) -> Self {
        Self::new(config.experience_per_level, config.vulnerability_ratio)
    }

    pub fn on_outcome(
        &self,
        agent: &mut AgentProfile,
        decision: &CombatDecision,
        success: bool,
        outcome: &CombatOutcome,
        encoder: &StateEncoder,
        catalog: &dyn ResourceCatalog,
    ) -> FeedbackReport {
        let reward = outcome_reward(success, outcome);
        let learning_rate = agent.rates.learning_rate();

        let tactic_value = match decision.origin {
            DecisionOrigin::Tactical => Some(agent.tactic_values.update(
                decision.phase,
                decision.tactic,
                reward,
                learning_rate,
            )),
            _ => None,
        };

        let vulnerability = self.record_effectiveness(agent, decision, success, outcome, catalog);

        let mut personality_events = self.personality_events(agent, decision, success);
        let leveled_up = self.gain_experience(agent);
        if leveled_up {
            personality_events.push(PersonalityEvent::LevelUp);
        }
        for event in &personality_events {
            agent.personality.apply(*event);
        }

        let q_value = match decision.origin {
            DecisionOrigin::LowLevel { state, action } => {
                let shaped = agent
                    .personality
                    .shape_reward(reward, decision.action.category());
                let next_state = outcome
                    .next_context
                    .as_deref()
                    .map(|ctx| encoder.encode(ctx))
                    .unwrap_or(state);
                let next_actions: Vec<ActionIndex> =
                    BasicAction::ALL.iter().map(|a| a.index()).collect();
                Some(agent.q_learning.update(
                    state,
                    action,
                    shaped,
                    next_state,
                    &next_actions,
                    learning_rate,
                ))
            }
            _ => None,
        };

        agent.performance.push(reward);
        agent.rates.adapt_to_performance(agent.performance.metric());

        let stats = agent
            .tactic_stats
            .entry(decision.tactic)
            .or_insert_with(TacticStats::default);
        stats.uses += 1;
        if success {
            stats.successes += 1;
        }
        agent.push_history(HistoryEntry {
            tactic: decision.tactic,
            phase: decision.phase,
            action: decision.action,
            success,
            reward,
        });

        tracing::debug!(
            "Agent {} learned from {} ({}): reward {:.2}, alpha {:.3}, epsilon {:.3}",
            agent.id,
            decision.tactic,
            if success { "success" } else { "failure" },
            reward,
            agent.rates.learning_rate(),
            agent.rates.exploration_rate()
        );

        FeedbackReport {
            reward,
            tactic_value,
            q_value,
            leveled_up,
            vulnerability,
            personality_events,
        }
    }

    fn record_effectiveness(
        &self,
        agent: &mut AgentProfile,
        decision: &CombatDecision,
        success: bool,
        outcome: &CombatOutcome,
        catalog: &dyn ResourceCatalog,
    ) -> Option<(Element, VulnerabilityChange)> {
        let resource = decision.resource.as_ref()?;
        let category = decision
            .situation
            .enemy_category
            .as_deref()
            .unwrap_or(UNKNOWN_CATEGORY);
        let damage = outcome.sanitized_damage();
        let namespace = LedgerNamespace::from(resource.kind);

        // Items are judged by the situation they were used in, not the enemy
        let key = match namespace {
            LedgerNamespace::Item => decision.situation.situation_key.as_str(),
            _ => category,
        };
        agent
            .ledger
            .record_outcome(namespace, &resource.id, key, success, damage);

        let element = match resource.kind {
            ResourceKind::Skill => catalog.skill_element(&resource.id),
            ResourceKind::Weapon => catalog.weapon(&resource.id).and_then(|w| w.element),
            _ => None,
        }?;
        if resource.kind == ResourceKind::Skill {
            agent.ledger.record_outcome(
                LedgerNamespace::Element,
                element.as_str(),
                category,
                success,
                damage,
            );
        }

        let expected = outcome.expected_damage?;
        let change = agent.vulnerabilities.observe(
            category,
            element,
            damage,
            expected,
            self.vulnerability_ratio,
        );
        if change == VulnerabilityChange::Discovered {
            tracing::info!(
                "Agent {} discovered {} weakness to {} ({:.1} vs {:.1} expected)",
                agent.id,
                category,
                element.as_str(),
                damage,
                expected
            );
        }
        Some((element, change))
    }

    fn personality_events(
        &self,
        agent: &mut AgentProfile,
        decision: &CombatDecision,
        success: bool,
    ) -> Vec<PersonalityEvent> {
        let mut events = Vec::new();
        let situation = &decision.situation;

        let hostile = situation.hostile_actions_observed;
        agent.patterns.hostile_actions = agent.patterns.hostile_actions.saturating_add(hostile);
        agent.patterns.lifetime_hostile_actions =
            agent.patterns.lifetime_hostile_actions.saturating_add(hostile);
        if agent.patterns.hostile_actions > HOSTILE_PATTERN_THRESHOLD {
            events.push(PersonalityEvent::HostilePatternObserved);
            agent.patterns.hostile_actions = 0;
        }

        if situation.enemies_nearby >= OUTNUMBERED_AT {
            events.push(PersonalityEvent::Outnumbered);
        } else if situation.enemies_nearby == 0 {
            events.push(PersonalityEvent::Unthreatened);
        }

        if success {
            agent.success_streak += 1;
            if agent.success_streak >= STREAK_LENGTH {
                events.push(PersonalityEvent::SuccessStreak);
                agent.success_streak = 0;
            }
        } else {
            agent.success_streak = 0;
        }
        events
    }

    /// One experience per outcome; returns true on level-up
    fn gain_experience(&self, agent: &mut AgentProfile) -> bool {
        agent.experience += 1;
        if agent.experience >= agent.level * self.experience_per_level {
            agent.level += 1;
            agent.experience = 0;
            tracing::info!("Agent {} reached level {}", agent.id, agent.level);
            true
        } else {
            false
        }
    }
}

impl Default for LearningFeedbackLoop {
    fn default() -> Self {
        Self::from_config(&CombatAiConfig::default())
    }
}
