//! Tactic values per combat phase
//!
//! A contextual bandit: the phase is the context, the tactic is the arm and
//! updates move the value toward the observed reward with no next-state
//! term.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::tactics::{CombatPhase, Tactic};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TacticEntry {
    pub phase: CombatPhase,
    pub tactic: Tactic,
    pub value: f32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<TacticEntry>", into = "Vec<TacticEntry>")]
pub struct TacticQTable {
    values: AHashMap<(CombatPhase, Tactic), f32>,
}

impl TacticQTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, phase: CombatPhase, tactic: Tactic) -> f32 {
        self.values.get(&(phase, tactic)).copied().unwrap_or(0.0)
    }

    /// `Q ← Q + α(r − Q)`; returns the new value
    pub fn update(
        &mut self,
        phase: CombatPhase,
        tactic: Tactic,
        reward: f32,
        learning_rate: f32,
    ) -> f32 {
        let current = self.get(phase, tactic);
        let reward = if reward.is_finite() { reward } else { 0.0 };
        let updated = current + learning_rate * (reward - current);
        self.values.insert((phase, tactic), updated);
        updated
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Highest-valued tactic learned for a phase, if any
    pub fn best_for(&self, phase: CombatPhase) -> Option<(Tactic, f32)> {
        Tactic::ALL
            .iter()
            .filter_map(|&t| self.values.get(&(phase, t)).map(|&v| (t, v)))
            .fold(None, |best, (t, v)| match best {
                Some((_, b)) if b >= v => best,
                _ => Some((t, v)),
            })
    }

    pub fn entries(&self) -> Vec<TacticEntry> {
        let mut entries: Vec<TacticEntry> = self
            .values
            .iter()
            .map(|(&(phase, tactic), &value)| TacticEntry { phase, tactic, value })
            .collect();
        entries.sort_by_key(|e| (e.phase, e.tactic));
        entries
    }
}

impl From<Vec<TacticEntry>> for TacticQTable {
    fn from(entries: Vec<TacticEntry>) -> Self {
        Self {
            values: entries
                .into_iter()
                .filter(|e| e.value.is_finite())
                .map(|e| ((e.phase, e.tactic), e.value))
                .collect(),
        }
    }
}

impl From<TacticQTable> for Vec<TacticEntry> {
    fn from(table: TacticQTable) -> Self {
        table.entries()
    }
}
