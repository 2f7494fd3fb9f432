//! What an agent has learned about the things it fights with and against

pub mod ledger;
pub mod shared;
pub mod vulnerability;

use std::sync::Arc;

pub use ledger::{
    EffectivenessEntry, EffectivenessLedger, LedgerNamespace, LedgerRecord, LedgerReport,
    LedgerSnapshot, LedgerView, NEUTRAL_SCORE,
};
pub use shared::SharedLedger;
pub use vulnerability::{Vulnerability, VulnerabilityChange, VulnerabilityTracker};

use crate::core::types::ResourceId;

/// Where an agent records effectiveness: its own ledger or a shared pool
#[derive(Debug, Clone)]
pub enum LedgerHandle {
    Local(EffectivenessLedger),
    Shared(Arc<SharedLedger>),
}

impl LedgerHandle {
    pub fn local(smoothing: f32) -> Self {
        LedgerHandle::Local(EffectivenessLedger::new(smoothing))
    }

    pub fn shared(pool: Arc<SharedLedger>) -> Self {
        LedgerHandle::Shared(pool)
    }

    pub fn is_shared(&self) -> bool {
        matches!(self, LedgerHandle::Shared(_))
    }

    pub fn record_outcome(
        &mut self,
        namespace: LedgerNamespace,
        item: &str,
        category: &str,
        success: bool,
        damage: f32,
    ) {
        match self {
            LedgerHandle::Local(ledger) => {
                ledger.record_outcome(namespace, item, category, success, damage)
            }
            LedgerHandle::Shared(pool) => {
                pool.record_outcome(namespace, item, category, success, damage)
            }
        }
    }

    pub fn entry(
        &self,
        namespace: LedgerNamespace,
        item: &str,
        category: &str,
    ) -> Option<EffectivenessEntry> {
        match self {
            LedgerHandle::Local(ledger) => ledger.entry(namespace, item, category),
            LedgerHandle::Shared(pool) => pool.entry(namespace, item, category),
        }
    }

    pub fn snapshot(&self) -> LedgerSnapshot {
        match self {
            LedgerHandle::Local(ledger) => ledger.snapshot(),
            LedgerHandle::Shared(pool) => pool.snapshot(),
        }
    }

    pub fn report(&self) -> LedgerReport {
        match self {
            LedgerHandle::Local(ledger) => ledger.report(),
            LedgerHandle::Shared(pool) => pool.report(),
        }
    }
}

impl LedgerView for LedgerHandle {
    fn score(&self, namespace: LedgerNamespace, item: &str, category: &str) -> f32 {
        match self {
            LedgerHandle::Local(ledger) => ledger.score(namespace, item, category),
            LedgerHandle::Shared(pool) => pool.score(namespace, item, category),
        }
    }

    fn best_item_against(
        &self,
        namespace: LedgerNamespace,
        category: &str,
        candidates: &[ResourceId],
    ) -> Option<(ResourceId, f32)> {
        match self {
            LedgerHandle::Local(ledger) => ledger.best_item_against(namespace, category, candidates),
            LedgerHandle::Shared(pool) => pool.best_item_against(namespace, category, candidates),
        }
    }
}

impl Default for LedgerHandle {
    fn default() -> Self {
        LedgerHandle::Local(EffectivenessLedger::default())
    }
}
