//! Elemental weaknesses discovered from damage surprises
//!
//! When a hit deals far more than the resolver expected, the element used is
//! probably a weakness of that enemy category. Confidence grows with each
//! confirmation and decays when the element underperforms.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::core::types::{clamp01, EnemyCategory, Element};

const INITIAL_CONFIDENCE: f32 = 0.7;
const CONFIRM_STEP: f32 = 0.1;
const WEAKEN_STEP: f32 = 0.05;
const MULTIPLIER_KEEP: f32 = 0.9;

/// Confidence at which a weakness is trusted by tactic selection
pub const TRUSTED_CONFIDENCE: f32 = 0.7;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vulnerability {
    pub multiplier: f32,
    pub confidence: f32,
    pub confirmations: u32,
}

/// What an observation did to the tracker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VulnerabilityChange {
    Discovered,
    Confirmed,
    Weakened,
    Unchanged,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VulnerabilityRecord {
    pub category: EnemyCategory,
    pub element: Element,
    #[serde(flatten)]
    pub vulnerability: Vulnerability,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<VulnerabilityRecord>", into = "Vec<VulnerabilityRecord>")]
pub struct VulnerabilityTracker {
    known: AHashMap<(EnemyCategory, Element), Vulnerability>,
}

impl VulnerabilityTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compare dealt damage against the expectation for `element` vs `category`
    ///
    /// `ratio` is the surprise threshold, 1.5 by default.
    pub fn observe(
        &mut self,
        category: &str,
        element: Element,
        damage: f32,
        expected: f32,
        ratio: f32,
    ) -> VulnerabilityChange {
        if expected.is_nan() || expected <= 0.0 || !damage.is_finite() {
            return VulnerabilityChange::Unchanged;
        }
        let key = (category.to_string(), element);
        let observed = damage / expected;

        if damage > expected * ratio {
            match self.known.get_mut(&key) {
                Some(v) => {
                    v.confidence = (v.confidence + CONFIRM_STEP).min(1.0);
                    v.multiplier =
                        v.multiplier * MULTIPLIER_KEEP + observed * (1.0 - MULTIPLIER_KEEP);
                    v.confirmations += 1;
                    VulnerabilityChange::Confirmed
                }
                None => {
                    self.known.insert(
                        key,
                        Vulnerability {
                            multiplier: observed,
                            confidence: INITIAL_CONFIDENCE,
                            confirmations: 1,
                        },
                    );
                    VulnerabilityChange::Discovered
                }
            }
        } else if damage <= expected {
            match self.known.get_mut(&key) {
                Some(v) => {
                    v.confidence = (v.confidence - WEAKEN_STEP).max(0.0);
                    VulnerabilityChange::Weakened
                }
                None => VulnerabilityChange::Unchanged,
            }
        } else {
            VulnerabilityChange::Unchanged
        }
    }

    pub fn get(&self, category: &str, element: Element) -> Option<&Vulnerability> {
        self.known.get(&(category.to_string(), element))
    }

    /// Weakness trusted enough to plan around
    pub fn is_trusted(&self, category: &str, element: Element) -> bool {
        self.get(category, element)
            .is_some_and(|v| v.confidence >= TRUSTED_CONFIDENCE)
    }

    pub fn len(&self) -> usize {
        self.known.len()
    }

    pub fn is_empty(&self) -> bool {
        self.known.is_empty()
    }

    pub fn records(&self) -> Vec<VulnerabilityRecord> {
        let mut records: Vec<VulnerabilityRecord> = self
            .known
            .iter()
            .map(|((category, element), v)| VulnerabilityRecord {
                category: category.clone(),
                element: *element,
                vulnerability: *v,
            })
            .collect();
        records.sort_by(|a, b| (&a.category, a.element).cmp(&(&b.category, b.element)));
        records
    }
}

impl From<Vec<VulnerabilityRecord>> for VulnerabilityTracker {
    /// Records with a non-positive multiplier are dropped; confidence is clamped
    fn from(records: Vec<VulnerabilityRecord>) -> Self {
        Self {
            known: records
                .into_iter()
                .filter(|r| r.vulnerability.multiplier.is_finite() && r.vulnerability.multiplier > 0.0)
                .map(|r| {
                    let mut v = r.vulnerability;
                    v.confidence = clamp01(v.confidence);
                    ((r.category, r.element), v)
                })
                .collect(),
        }
    }
}

impl From<VulnerabilityTracker> for Vec<VulnerabilityRecord> {
    fn from(tracker: VulnerabilityTracker) -> Self {
        tracker.records()
    }
}
