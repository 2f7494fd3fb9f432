//! Tabular Q-learning over (state, basic action) pairs

use ahash::AHashMap;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::types::{ActionIndex, StateId};

/// One stored Q-value, the on-disk form of the sparse table
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QEntry {
    pub state: StateId,
    pub action: ActionIndex,
    pub value: f32,
}

/// Sparse Q-value storage; unseen pairs read as 0.0
///
/// Serialized as a sorted entry list since tuple keys are not valid JSON
/// object keys.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<QEntry>", into = "Vec<QEntry>")]
pub struct QTable {
    values: AHashMap<(StateId, ActionIndex), f32>,
}

impl QTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, state: StateId, action: ActionIndex) -> f32 {
        self.values.get(&(state, action)).copied().unwrap_or(0.0)
    }

    pub fn set(&mut self, state: StateId, action: ActionIndex, value: f32) {
        self.values.insert((state, action), value);
    }

    /// Highest value among `actions`; 0.0 when `actions` is empty
    pub fn max_q(&self, state: StateId, actions: &[ActionIndex]) -> f32 {
        actions
            .iter()
            .map(|&a| self.get(state, a))
            .fold(None, |best: Option<f32>, q| Some(best.map_or(q, |b| b.max(q))))
            .unwrap_or(0.0)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Entries ordered by (state, action)
    pub fn entries(&self) -> Vec<QEntry> {
        let mut entries: Vec<QEntry> = self
            .values
            .iter()
            .map(|(&(state, action), &value)| QEntry { state, action, value })
            .collect();
        entries.sort_by_key(|e| (e.state, e.action));
        entries
    }
}

impl From<Vec<QEntry>> for QTable {
    fn from(entries: Vec<QEntry>) -> Self {
        Self {
            values: entries
                .into_iter()
                .filter(|e| e.value.is_finite())
                .map(|e| ((e.state, e.action), e.value))
                .collect(),
        }
    }
}

impl From<QTable> for Vec<QEntry> {
    fn from(table: QTable) -> Self {
        table.entries()
    }
}

/// Epsilon-greedy Q-learning policy with a discount factor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QLearningTable {
    table: QTable,
    discount_factor: f32,
}

impl QLearningTable {
    pub fn new(discount_factor: f32) -> Self {
        Self {
            table: QTable::new(),
            discount_factor: discount_factor.clamp(0.0, 1.0),
        }
    }

    pub fn from_table(table: QTable, discount_factor: f32) -> Self {
        Self {
            table,
            discount_factor: discount_factor.clamp(0.0, 1.0),
        }
    }

    pub fn table(&self) -> &QTable {
        &self.table
    }

    pub fn discount_factor(&self) -> f32 {
        self.discount_factor
    }

    pub fn q_value(&self, state: StateId, action: ActionIndex) -> f32 {
        self.table.get(state, action)
    }

    /// Pick an action among `available`
    ///
    /// With probability `exploration_rate` the pick is uniform; otherwise the
    /// arg-max with ties broken uniformly. `None` only when `available` is empty.
    pub fn choose_action<R: Rng + ?Sized>(
        &self,
        state: StateId,
        available: &[ActionIndex],
        exploration_rate: f32,
        rng: &mut R,
    ) -> Option<ActionIndex> {
        if available.is_empty() {
            return None;
        }

        if rng.gen::<f32>() < exploration_rate {
            return available.choose(rng).copied();
        }

        let best = self.table.max_q(state, available);
        let tied: Vec<ActionIndex> = available
            .iter()
            .copied()
            .filter(|&a| self.table.get(state, a) >= best)
            .collect();
        tied.choose(rng).copied()
    }

    /// Q(s,a) ← Q(s,a) + α[r + γ max_a' Q(s',a') - Q(s,a)]
    ///
    /// Returns the new value.
    pub fn update(
        &mut self,
        state: StateId,
        action: ActionIndex,
        reward: f32,
        next_state: StateId,
        next_actions: &[ActionIndex],
        learning_rate: f32,
    ) -> f32 {
        let current = self.table.get(state, action);
        let reward = if reward.is_finite() { reward } else { 0.0 };
        let td_target = reward + self.discount_factor * self.table.max_q(next_state, next_actions);
        let updated = current + learning_rate * (td_target - current);
        self.table.set(state, action, updated);
        updated
    }
}

impl Default for QLearningTable {
    fn default() -> Self {
        Self::new(0.95)
    }
}
