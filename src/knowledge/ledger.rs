//! Effectiveness of weapons, skills, elements, items and combos per enemy category
//!
//! Each entry keeps a success count, a total count and an exponentially
//! smoothed damage average. The score combines a Laplace-smoothed success
//! rate with the entry's damage relative to the other entries of the same
//! namespace and category:
//!
//! ```text
//! score = 2 * (s + 1) / (t + 2) * (0.5 + 0.5 * rel_damage)
//! ```
//!
//! An entry with no data scores exactly 1.0, so "above 1" always means
//! "better than knowing nothing".

use std::collections::BTreeMap;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::combat::catalog::ResourceKind;
use crate::core::types::{EnemyCategory, ResourceId};

/// Score of an entry with no recorded outcomes
pub const NEUTRAL_SCORE: f32 = 1.0;

const MAX_RELATIVE_DAMAGE: f32 = 3.0;

/// Ledger partition
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum LedgerNamespace {
    Weapon,
    Skill,
    Element,
    Item,
    Combo,
}

impl From<ResourceKind> for LedgerNamespace {
    fn from(kind: ResourceKind) -> Self {
        match kind {
            ResourceKind::Weapon => LedgerNamespace::Weapon,
            ResourceKind::Skill => LedgerNamespace::Skill,
            ResourceKind::Item => LedgerNamespace::Item,
            ResourceKind::Combo => LedgerNamespace::Combo,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EffectivenessEntry {
    pub success_count: u32,
    pub total_count: u32,
    pub rolling_damage_avg: f32,
}

impl EffectivenessEntry {
    pub fn record(&mut self, success: bool, damage: f32, smoothing: f32) {
        let damage = if damage.is_finite() { damage.max(0.0) } else { 0.0 };
        if self.total_count == 0 {
            self.rolling_damage_avg = damage;
        } else {
            self.rolling_damage_avg =
                (1.0 - smoothing) * self.rolling_damage_avg + smoothing * damage;
        }
        self.total_count = self.total_count.saturating_add(1);
        if success {
            self.success_count = self.success_count.saturating_add(1);
        }
    }

    pub fn laplace_rate(&self) -> f32 {
        (self.success_count as f32 + 1.0) / (self.total_count as f32 + 2.0)
    }
}

/// All entries of one enemy category, per namespace, in item-id order
///
/// Ordered storage keeps category averages and tie-breaks independent of
/// hash iteration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryLedger {
    books: BTreeMap<LedgerNamespace, BTreeMap<ResourceId, EffectivenessEntry>>,
}

impl CategoryLedger {
    pub fn record(
        &mut self,
        namespace: LedgerNamespace,
        item: &str,
        success: bool,
        damage: f32,
        smoothing: f32,
    ) {
        self.books
            .entry(namespace)
            .or_default()
            .entry(item.to_string())
            .or_default()
            .record(success, damage, smoothing);
    }

    pub fn entry(&self, namespace: LedgerNamespace, item: &str) -> Option<&EffectivenessEntry> {
        self.books.get(&namespace).and_then(|book| book.get(item))
    }

    /// Mean damage across the namespace; 0.0 with no data
    pub fn category_average(&self, namespace: LedgerNamespace) -> f32 {
        let Some(book) = self.books.get(&namespace) else {
            return 0.0;
        };
        let recorded: Vec<f32> = book
            .values()
            .filter(|e| e.total_count > 0)
            .map(|e| e.rolling_damage_avg)
            .collect();
        if recorded.is_empty() {
            0.0
        } else {
            recorded.iter().sum::<f32>() / recorded.len() as f32
        }
    }

    pub fn score(&self, namespace: LedgerNamespace, item: &str) -> f32 {
        let Some(entry) = self.entry(namespace, item).filter(|e| e.total_count > 0) else {
            return NEUTRAL_SCORE;
        };
        let category_avg = self.category_average(namespace);
        let relative = if category_avg > 0.0 {
            (entry.rolling_damage_avg / category_avg).clamp(0.0, MAX_RELATIVE_DAMAGE)
        } else {
            1.0
        };
        2.0 * entry.laplace_rate() * (0.5 + 0.5 * relative)
    }

    pub fn len(&self) -> usize {
        self.books.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn records<'a>(
        &'a self,
        category: &'a str,
    ) -> impl Iterator<Item = LedgerRecord> + 'a {
        self.books.iter().flat_map(move |(&namespace, book)| {
            book.iter().map(move |(item, entry)| LedgerRecord {
                namespace,
                item: item.clone(),
                category: category.to_string(),
                entry: *entry,
            })
        })
    }

    fn insert(&mut self, namespace: LedgerNamespace, item: ResourceId, entry: EffectivenessEntry) {
        self.books.entry(namespace).or_default().insert(item, entry);
    }
}

/// Highest-scoring candidate, ties going to the lowest item id
pub fn pick_best<F>(candidates: &[ResourceId], mut score: F) -> Option<(ResourceId, f32)>
where
    F: FnMut(&str) -> f32,
{
    let mut best: Option<(&ResourceId, f32)> = None;
    for candidate in candidates {
        let s = score(candidate);
        best = match best {
            None => Some((candidate, s)),
            Some((id, b)) if s > b || (s == b && candidate < id) => Some((candidate, s)),
            keep => keep,
        };
    }
    best.map(|(id, s)| (id.clone(), s))
}

/// Read access shared by the local and the concurrent ledger
pub trait LedgerView {
    fn score(&self, namespace: LedgerNamespace, item: &str, category: &str) -> f32;

    fn best_item_against(
        &self,
        namespace: LedgerNamespace,
        category: &str,
        candidates: &[ResourceId],
    ) -> Option<(ResourceId, f32)> {
        pick_best(candidates, |item| self.score(namespace, item, category))
    }
}

/// One flattened ledger entry, the serialized form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerRecord {
    pub namespace: LedgerNamespace,
    pub item: ResourceId,
    pub category: EnemyCategory,
    #[serde(flatten)]
    pub entry: EffectivenessEntry,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub records: Vec<LedgerRecord>,
}

/// Summary numbers for learning reports
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LedgerReport {
    pub entries: usize,
    pub categories: usize,
    pub mean_score: f32,
}

/// Per-agent ledger
#[derive(Debug, Clone, PartialEq)]
pub struct EffectivenessLedger {
    categories: AHashMap<EnemyCategory, CategoryLedger>,
    smoothing: f32,
}

impl EffectivenessLedger {
    pub fn new(smoothing: f32) -> Self {
        Self {
            categories: AHashMap::new(),
            smoothing: smoothing.clamp(0.0, 1.0),
        }
    }

    pub fn smoothing(&self) -> f32 {
        self.smoothing
    }

    pub fn record_outcome(
        &mut self,
        namespace: LedgerNamespace,
        item: &str,
        category: &str,
        success: bool,
        damage: f32,
    ) {
        let smoothing = self.smoothing;
        match self.categories.get_mut(category) {
            Some(ledger) => ledger.record(namespace, item, success, damage, smoothing),
            None => {
                let mut ledger = CategoryLedger::default();
                ledger.record(namespace, item, success, damage, smoothing);
                self.categories.insert(category.to_string(), ledger);
            }
        }
    }

    pub fn entry(
        &self,
        namespace: LedgerNamespace,
        item: &str,
        category: &str,
    ) -> Option<EffectivenessEntry> {
        self.categories
            .get(category)
            .and_then(|c| c.entry(namespace, item))
            .copied()
    }

    pub fn len(&self) -> usize {
        self.categories.values().map(CategoryLedger::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Records sorted by (category, namespace, item)
    pub fn snapshot(&self) -> LedgerSnapshot {
        let mut names: Vec<&EnemyCategory> = self.categories.keys().collect();
        names.sort();
        let records = names
            .into_iter()
            .flat_map(|name| self.categories[name].records(name))
            .collect();
        LedgerSnapshot { records }
    }

    pub fn from_snapshot(snapshot: &LedgerSnapshot, smoothing: f32) -> Self {
        let mut ledger = Self::new(smoothing);
        for record in &snapshot.records {
            if record.entry.success_count > record.entry.total_count {
                continue;
            }
            ledger
                .categories
                .entry(record.category.clone())
                .or_default()
                .insert(record.namespace, record.item.clone(), record.entry);
        }
        ledger
    }

    pub fn report(&self) -> LedgerReport {
        report_from_snapshot(&self.snapshot(), |r| self.score(r.namespace, &r.item, &r.category))
    }
}

impl Default for EffectivenessLedger {
    fn default() -> Self {
        Self::new(0.3)
    }
}

impl LedgerView for EffectivenessLedger {
    fn score(&self, namespace: LedgerNamespace, item: &str, category: &str) -> f32 {
        self.categories
            .get(category)
            .map_or(NEUTRAL_SCORE, |c| c.score(namespace, item))
    }
}

pub(crate) fn report_from_snapshot<F>(snapshot: &LedgerSnapshot, score: F) -> LedgerReport
where
    F: Fn(&LedgerRecord) -> f32,
{
    let entries = snapshot.records.len();
    let mut categories: Vec<&str> = snapshot.records.iter().map(|r| r.category.as_str()).collect();
    categories.dedup();
    let mean_score = if entries == 0 {
        NEUTRAL_SCORE
    } else {
        snapshot.records.iter().map(&score).sum::<f32>() / entries as f32
    };
    LedgerReport {
        entries,
        categories: categories.len(),
        mean_score,
    }
}
