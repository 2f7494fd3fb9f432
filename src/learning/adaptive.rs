//! Self-adjusting learning and exploration rates
//!
//! Good performance narrows exploration and speeds up learning; poor
//! performance does the opposite. Both rates are clamped into their bounds
//! after every step, including right after deserialization.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::core::config::CombatAiConfig;

/// Metric above which the agent exploits more
pub const GOOD_PERFORMANCE: f32 = 0.7;
/// Metric below which the agent explores more
pub const POOR_PERFORMANCE: f32 = 0.3;

const SHRINK: f32 = 0.95;
const GROW: f32 = 1.05;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RateBounds {
    pub min: f32,
    pub max: f32,
}

impl RateBounds {
    /// Never panics; an inverted range collapses onto `max`
    pub fn clamp(&self, value: f32) -> f32 {
        if value.is_nan() {
            self.min
        } else {
            value.max(self.min).min(self.max)
        }
    }

    pub fn is_valid(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.min <= self.max
    }
}

/// Learning rate α and exploration rate ε with their bounds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdaptiveRates {
    learning_rate: f32,
    exploration_rate: f32,
    learning_bounds: RateBounds,
    exploration_bounds: RateBounds,
}

impl AdaptiveRates {
    pub fn new(
        learning_rate: f32,
        exploration_rate: f32,
        learning_bounds: RateBounds,
        exploration_bounds: RateBounds,
    ) -> Self {
        Self {
            learning_rate: learning_bounds.clamp(learning_rate),
            exploration_rate: exploration_bounds.clamp(exploration_rate),
            learning_bounds,
            exploration_bounds,
        }
    }

    pub fn from_config(config: &CombatAiConfig) -> Self {
        Self::new(
            config.initial_learning_rate,
            config.initial_exploration_rate,
            RateBounds {
                min: config.min_learning_rate,
                max: config.max_learning_rate,
            },
            RateBounds {
                min: config.min_exploration_rate,
                max: config.max_exploration_rate,
            },
        )
    }

    /// Same bounds, different rates; the rates are clamped into the bounds
    pub fn with_rates(mut self, learning_rate: f32, exploration_rate: f32) -> Self {
        self.learning_rate = self.learning_bounds.clamp(learning_rate);
        self.exploration_rate = self.exploration_bounds.clamp(exploration_rate);
        self
    }

    pub fn learning_rate(&self) -> f32 {
        self.learning_rate
    }

    pub fn exploration_rate(&self) -> f32 {
        self.exploration_rate
    }

    pub fn learning_bounds(&self) -> RateBounds {
        self.learning_bounds
    }

    pub fn exploration_bounds(&self) -> RateBounds {
        self.exploration_bounds
    }

    /// Adjust rates from a performance metric in [0, 1]
    pub fn adapt_to_performance(&mut self, metric: f32) {
        if metric > GOOD_PERFORMANCE {
            self.exploration_rate = self.exploration_bounds.clamp(self.exploration_rate * SHRINK);
            self.learning_rate = self.learning_bounds.clamp(self.learning_rate * GROW);
        } else if metric < POOR_PERFORMANCE {
            self.exploration_rate = self.exploration_bounds.clamp(self.exploration_rate * GROW);
            self.learning_rate = self.learning_bounds.clamp(self.learning_rate * SHRINK);
        }
    }

    /// Re-apply bounds, e.g. after loading hand-edited state
    pub fn enforce_bounds(&mut self) {
        self.learning_rate = self.learning_bounds.clamp(self.learning_rate);
        self.exploration_rate = self.exploration_bounds.clamp(self.exploration_rate);
    }
}

impl Default for AdaptiveRates {
    fn default() -> Self {
        Self::from_config(&CombatAiConfig::default())
    }
}

/// Rolling window of recent rewards
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceWindow {
    rewards: VecDeque<f32>,
    capacity: usize,
}

impl PerformanceWindow {
    pub fn new(capacity: usize) -> Self {
        Self {
            rewards: VecDeque::with_capacity(capacity.max(1)),
            capacity: capacity.max(1),
        }
    }

    pub fn push(&mut self, reward: f32) {
        if reward.is_nan() {
            return;
        }
        while self.rewards.len() >= self.capacity {
            self.rewards.pop_front();
        }
        self.rewards.push_back(reward);
    }

    /// Copy of this window with a new capacity, keeping the newest rewards
    pub fn resized(&self, capacity: usize) -> Self {
        let mut window = Self::new(capacity);
        let skip = self.rewards.len().saturating_sub(window.capacity);
        for &reward in self.rewards.iter().skip(skip) {
            window.push(reward);
        }
        window
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.rewards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rewards.is_empty()
    }

    pub fn average(&self) -> Option<f32> {
        if self.rewards.is_empty() {
            None
        } else {
            Some(self.rewards.iter().sum::<f32>() / self.rewards.len() as f32)
        }
    }

    /// Average reward mapped from [-1, 1] onto [0, 1]; 0.5 with no data
    pub fn metric(&self) -> f32 {
        match self.average() {
            Some(avg) => ((avg + 1.0) / 2.0).clamp(0.0, 1.0),
            None => 0.5,
        }
    }
}
