//! Per-agent learned state and its serialized form
//!
//! An `AgentProfile` is created when an agent spawns and owns everything the
//! agent has learned: both Q tables, personality, effectiveness knowledge,
//! adaptive rates, progression and its random number generator. The RNG is
//! saved with the rest so a restored agent replays decisions bit for bit.

use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::combat::decision::ActionType;
use crate::core::config::CombatAiConfig;
use crate::core::error::{CombatAiError, Result};
use crate::core::types::AgentId;
use crate::knowledge::{
    EffectivenessLedger, LedgerHandle, LedgerReport, LedgerSnapshot, SharedLedger,
    VulnerabilityTracker,
};
use crate::learning::adaptive::{AdaptiveRates, PerformanceWindow};
use crate::learning::q_table::{QLearningTable, QTable};
use crate::learning::tactic_table::TacticQTable;
use crate::personality::PersonalityModel;
use crate::tactics::{CombatPhase, Tactic};

/// Current state blob format
pub const STATE_VERSION: u32 = 1;

/// Running counters about the opponents this agent has faced
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct OpponentPatterns {
    /// Hostile actions seen since the last caution increase
    pub hostile_actions: u32,
    /// Hostile actions seen over the agent's lifetime
    pub lifetime_hostile_actions: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TacticStats {
    pub uses: u32,
    pub successes: u32,
}

impl TacticStats {
    pub fn success_rate(&self) -> f32 {
        if self.uses == 0 {
            0.0
        } else {
            self.successes as f32 / self.uses as f32
        }
    }
}

/// One resolved decision
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub tactic: Tactic,
    pub phase: CombatPhase,
    pub action: ActionType,
    pub success: bool,
    pub reward: f32,
}

/// Opaque, versioned JSON form of an agent profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateBlob(String);

impl StateBlob {
    pub fn from_json(json: impl Into<String>) -> Self {
        Self(json.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

/// Result of [`AgentProfile::deserialize`]
#[derive(Debug, Clone, PartialEq)]
pub enum RestoreOutcome {
    Restored,
    /// The blob was unusable and the agent starts over with the same id
    Reset { reason: String },
}

impl RestoreOutcome {
    pub fn is_restored(&self) -> bool {
        matches!(self, RestoreOutcome::Restored)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SavedProfile {
    version: u32,
    id: AgentId,
    level: u32,
    experience: u32,
    personality: PersonalityModel,
    rates: AdaptiveRates,
    discount_factor: f32,
    q_table: QTable,
    tactic_table: TacticQTable,
    ledger: LedgerSnapshot,
    shared_ledger: bool,
    vulnerabilities: VulnerabilityTracker,
    patterns: OpponentPatterns,
    performance: PerformanceWindow,
    success_streak: u32,
    tactic_stats: BTreeMap<Tactic, TacticStats>,
    history: VecDeque<HistoryEntry>,
    rng: ChaCha8Rng,
}

/// Summary of what an agent has learned so far
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LearningReport {
    pub id: AgentId,
    pub level: u32,
    pub experience: u32,
    pub learning_rate: f32,
    pub exploration_rate: f32,
    pub performance: f32,
    pub q_entries: usize,
    pub tactic_entries: usize,
    pub decisions_recorded: usize,
    pub recent_success_rate: f32,
    /// Best learned tactic per phase, for phases with any data
    pub best_tactics: Vec<(CombatPhase, Tactic, f32)>,
    pub tactic_stats: BTreeMap<Tactic, TacticStats>,
    pub ledger: LedgerReport,
    pub vulnerabilities: usize,
    pub personality: PersonalityModel,
}

/// Everything one agent has learned
#[derive(Debug, Clone)]
pub struct AgentProfile {
    pub(crate) id: AgentId,
    pub(crate) config: CombatAiConfig,
    pub(crate) level: u32,
    pub(crate) experience: u32,
    pub(crate) personality: PersonalityModel,
    pub(crate) rates: AdaptiveRates,
    pub(crate) q_learning: QLearningTable,
    pub(crate) tactic_values: TacticQTable,
    pub(crate) ledger: LedgerHandle,
    pub(crate) vulnerabilities: VulnerabilityTracker,
    pub(crate) patterns: OpponentPatterns,
    pub(crate) performance: PerformanceWindow,
    pub(crate) success_streak: u32,
    pub(crate) tactic_stats: BTreeMap<Tactic, TacticStats>,
    pub(crate) history: VecDeque<HistoryEntry>,
    pub(crate) rng: ChaCha8Rng,
}

impl AgentProfile {
    /// Fresh agent seeded from OS entropy
    pub fn new(config: &CombatAiConfig) -> Self {
        Self::build(AgentId::new(), config, ChaCha8Rng::from_entropy())
    }

    /// Fresh agent with a fixed seed for reproducible behaviour
    pub fn with_seed(config: &CombatAiConfig, seed: u64) -> Self {
        Self::build(AgentId::new(), config, ChaCha8Rng::seed_from_u64(seed))
    }

    fn build(id: AgentId, config: &CombatAiConfig, rng: ChaCha8Rng) -> Self {
        Self {
            id,
            config: config.clone(),
            level: 1,
            experience: 0,
            personality: PersonalityModel::default(),
            rates: AdaptiveRates::from_config(config),
            q_learning: QLearningTable::new(config.discount_factor),
            tactic_values: TacticQTable::new(),
            ledger: LedgerHandle::local(config.damage_smoothing),
            vulnerabilities: VulnerabilityTracker::new(),
            patterns: OpponentPatterns::default(),
            performance: PerformanceWindow::new(config.performance_window),
            success_streak: 0,
            tactic_stats: BTreeMap::new(),
            history: VecDeque::with_capacity(config.history_capacity),
            rng,
        }
    }

    pub fn with_id(mut self, id: AgentId) -> Self {
        self.id = id;
        self
    }

    pub fn with_personality(mut self, personality: PersonalityModel) -> Self {
        self.personality = personality;
        self.personality.clamp_all();
        self
    }

    /// Record into a shared pool instead of a private ledger
    pub fn with_shared_ledger(mut self, pool: Arc<SharedLedger>) -> Self {
        self.ledger = LedgerHandle::shared(pool);
        self
    }

    pub fn id(&self) -> AgentId {
        self.id
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn experience(&self) -> u32 {
        self.experience
    }

    pub fn personality(&self) -> &PersonalityModel {
        &self.personality
    }

    pub fn learning_rate(&self) -> f32 {
        self.rates.learning_rate()
    }

    pub fn exploration_rate(&self) -> f32 {
        self.rates.exploration_rate()
    }

    pub fn performance(&self) -> &PerformanceWindow {
        &self.performance
    }

    pub fn q_learning(&self) -> &QLearningTable {
        &self.q_learning
    }

    pub fn tactic_values(&self) -> &TacticQTable {
        &self.tactic_values
    }

    pub fn ledger(&self) -> &LedgerHandle {
        &self.ledger
    }

    pub fn vulnerabilities(&self) -> &VulnerabilityTracker {
        &self.vulnerabilities
    }

    pub fn patterns(&self) -> OpponentPatterns {
        self.patterns
    }

    pub fn success_streak(&self) -> u32 {
        self.success_streak
    }

    pub fn tactic_stats(&self, tactic: Tactic) -> TacticStats {
        self.tactic_stats.get(&tactic).copied().unwrap_or_default()
    }

    pub fn history(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.history.iter()
    }

    /// Versioned JSON snapshot of the whole profile
    pub fn serialize(&self) -> Result<StateBlob> {
        let saved = SavedProfile {
            version: STATE_VERSION,
            id: self.id,
            level: self.level,
            experience: self.experience,
            personality: self.personality,
            rates: self.rates,
            discount_factor: self.q_learning.discount_factor(),
            q_table: self.q_learning.table().clone(),
            tactic_table: self.tactic_values.clone(),
            ledger: self.ledger.snapshot(),
            shared_ledger: self.ledger.is_shared(),
            vulnerabilities: self.vulnerabilities.clone(),
            patterns: self.patterns,
            performance: self.performance.clone(),
            success_streak: self.success_streak,
            tactic_stats: self.tactic_stats.clone(),
            history: self.history.clone(),
            rng: self.rng.clone(),
        };
        Ok(StateBlob(serde_json::to_string(&saved)?))
    }

    /// Restore from a blob, keeping this agent's id on failure
    ///
    /// A corrupt or incompatible blob never propagates: the agent is reset to
    /// a fresh profile and the reason is logged. A shared ledger handle is
    /// kept as is; the blob's ledger snapshot only seeds private ledgers.
    pub fn deserialize(&mut self, blob: &StateBlob) -> RestoreOutcome {
        match self.restore(blob) {
            Ok(()) => RestoreOutcome::Restored,
            Err(e) => {
                tracing::warn!("Agent {} state restore failed, starting fresh: {}", self.id, e);
                let ledger = match &self.ledger {
                    LedgerHandle::Shared(pool) => LedgerHandle::Shared(Arc::clone(pool)),
                    LedgerHandle::Local(_) => LedgerHandle::local(self.config.damage_smoothing),
                };
                let seed = self.id.0.as_u128() as u64;
                *self = Self::build(self.id, &self.config, ChaCha8Rng::seed_from_u64(seed));
                self.ledger = ledger;
                RestoreOutcome::Reset {
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Build a new profile from a blob, failing on any problem
    pub fn from_blob(blob: &StateBlob, config: &CombatAiConfig) -> Result<Self> {
        let mut profile = Self::build(AgentId::new(), config, ChaCha8Rng::seed_from_u64(0));
        profile.restore(blob)?;
        Ok(profile)
    }

    fn restore(&mut self, blob: &StateBlob) -> Result<()> {
        let saved: SavedProfile = serde_json::from_str(blob.as_str())?;
        if saved.version != STATE_VERSION {
            return Err(CombatAiError::VersionMismatch {
                found: saved.version,
                expected: STATE_VERSION,
            });
        }

        let saved_learning = saved.rates.learning_bounds();
        let saved_exploration = saved.rates.exploration_bounds();
        if !saved_learning.is_valid() || !saved_exploration.is_valid() {
            return Err(CombatAiError::InvalidState(format!(
                "rate bounds {:?} / {:?}",
                saved_learning, saved_exploration
            )));
        }
        if !saved.discount_factor.is_finite() {
            return Err(CombatAiError::InvalidState(format!(
                "discount factor {}",
                saved.discount_factor
            )));
        }

        let mut personality = saved.personality;
        personality.clamp_all();
        // bounds always come from the config, never from the blob
        let rates = AdaptiveRates::from_config(&self.config).with_rates(
            saved.rates.learning_rate(),
            saved.rates.exploration_rate(),
        );
        let mut history = saved.history;
        let history_capacity = self.config.history_capacity.max(1);
        while history.len() > history_capacity {
            history.pop_front();
        }

        self.id = saved.id;
        self.level = saved.level.max(1);
        self.experience = saved.experience;
        self.personality = personality;
        self.rates = rates;
        self.q_learning = QLearningTable::from_table(saved.q_table, saved.discount_factor);
        self.tactic_values = saved.tactic_table;
        if !self.ledger.is_shared() {
            self.ledger = LedgerHandle::Local(EffectivenessLedger::from_snapshot(
                &saved.ledger,
                self.config.damage_smoothing,
            ));
        }
        self.vulnerabilities = saved.vulnerabilities;
        self.patterns = saved.patterns;
        self.performance = saved.performance.resized(self.config.performance_window);
        self.success_streak = saved.success_streak;
        self.tactic_stats = saved.tactic_stats;
        self.history = history;
        self.rng = saved.rng;
        Ok(())
    }

    pub fn report(&self) -> LearningReport {
        let best_tactics = CombatPhase::ALL
            .iter()
            .filter_map(|&phase| {
                self.tactic_values
                    .best_for(phase)
                    .map(|(tactic, value)| (phase, tactic, value))
            })
            .collect();
        let recent_success_rate = if self.history.is_empty() {
            0.0
        } else {
            self.history.iter().filter(|h| h.success).count() as f32 / self.history.len() as f32
        };

        LearningReport {
            id: self.id,
            level: self.level,
            experience: self.experience,
            learning_rate: self.rates.learning_rate(),
            exploration_rate: self.rates.exploration_rate(),
            performance: self.performance.metric(),
            q_entries: self.q_learning.table().len(),
            tactic_entries: self.tactic_values.len(),
            decisions_recorded: self.history.len(),
            recent_success_rate,
            best_tactics,
            tactic_stats: self.tactic_stats.clone(),
            ledger: self.ledger.report(),
            vulnerabilities: self.vulnerabilities.len(),
            personality: self.personality,
        }
    }

    pub(crate) fn push_history(&mut self, entry: HistoryEntry) {
        let capacity = self.config.history_capacity.max(1);
        while self.history.len() >= capacity {
            self.history.pop_front();
        }
        self.history.push_back(entry);
    }
}
