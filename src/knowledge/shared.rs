//! Species-wide knowledge pool that many agents record into concurrently

use dashmap::DashMap;

use crate::core::types::{EnemyCategory, ResourceId};
use crate::knowledge::ledger::{
    pick_best, report_from_snapshot, CategoryLedger, EffectivenessEntry, LedgerNamespace,
    LedgerRecord, LedgerReport, LedgerSnapshot, LedgerView, NEUTRAL_SCORE,
};

/// Same contract as [`EffectivenessLedger`](crate::knowledge::EffectivenessLedger)
/// behind `&self`
///
/// Writers lock only the shard holding the enemy category, so agents
/// fighting different categories never contend.
#[derive(Debug)]
pub struct SharedLedger {
    categories: DashMap<EnemyCategory, CategoryLedger>,
    smoothing: f32,
}

impl SharedLedger {
    pub fn new(smoothing: f32) -> Self {
        Self {
            categories: DashMap::new(),
            smoothing: smoothing.clamp(0.0, 1.0),
        }
    }

    pub fn smoothing(&self) -> f32 {
        self.smoothing
    }

    pub fn record_outcome(
        &self,
        namespace: LedgerNamespace,
        item: &str,
        category: &str,
        success: bool,
        damage: f32,
    ) {
        if let Some(mut ledger) = self.categories.get_mut(category) {
            ledger.record(namespace, item, success, damage, self.smoothing);
            return;
        }
        self.categories
            .entry(category.to_string())
            .or_default()
            .record(namespace, item, success, damage, self.smoothing);
    }

    pub fn entry(
        &self,
        namespace: LedgerNamespace,
        item: &str,
        category: &str,
    ) -> Option<EffectivenessEntry> {
        self.categories
            .get(category)
            .and_then(|c| c.entry(namespace, item).copied())
    }

    pub fn len(&self) -> usize {
        self.categories.iter().map(|c| c.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Point-in-time copy, sorted like the local ledger's snapshot
    ///
    /// Categories are copied one shard at a time, so concurrent writers may
    /// land between two categories.
    pub fn snapshot(&self) -> LedgerSnapshot {
        let mut records: Vec<LedgerRecord> = Vec::new();
        for category in self.categories.iter() {
            records.extend(category.value().records(category.key()));
        }
        // records within a category are already in (namespace, item) order
        records.sort_by(|a, b| a.category.cmp(&b.category));
        LedgerSnapshot { records }
    }

    pub fn report(&self) -> LedgerReport {
        let snapshot = self.snapshot();
        report_from_snapshot(&snapshot, |r| self.score(r.namespace, &r.item, &r.category))
    }
}

impl LedgerView for SharedLedger {
    fn score(&self, namespace: LedgerNamespace, item: &str, category: &str) -> f32 {
        self.categories
            .get(category)
            .map_or(NEUTRAL_SCORE, |c| c.score(namespace, item))
    }

    /// Scores every candidate under a single shard read lock
    fn best_item_against(
        &self,
        namespace: LedgerNamespace,
        category: &str,
        candidates: &[ResourceId],
    ) -> Option<(ResourceId, f32)> {
        match self.categories.get(category) {
            Some(ledger) => pick_best(candidates, |item| ledger.score(namespace, item)),
            None => pick_best(candidates, |_| NEUTRAL_SCORE),
        }
    }
}

impl Default for SharedLedger {
    fn default() -> Self {
        Self::new(0.3)
    }
}
