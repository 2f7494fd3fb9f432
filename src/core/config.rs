//! Combat AI configuration with documented constants
//!
//! All magic numbers are collected here with explanations of their purpose
//! and how they interact with each other. Unlike a global config, the
//! struct is handed to `CombatAi` explicitly so several differently-tuned
//! engines can coexist in one process.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::{CombatAiError, Result};

/// Configuration for the learning and decision systems
///
/// Defaults are the tuning the encounter AI ships with.
/// Changing them affects how quickly agents settle into habits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatAiConfig {
    // === STATE ENCODING ===
    /// Number of distinct low-level states (composite id is reduced modulo this)
    ///
    /// The encoder produces four base-10 digits, so 10 000 keeps every
    /// feature distinguishable. Smaller tables alias states together.
    pub state_space_size: u32,

    // === Q-LEARNING ===
    /// Discount factor γ for the Bellman update
    pub discount_factor: f32,

    /// Learning rate α given to freshly spawned agents
    pub initial_learning_rate: f32,
    /// Lower bound of the self-adjusting learning rate
    pub min_learning_rate: f32,
    /// Upper bound of the self-adjusting learning rate
    pub max_learning_rate: f32,

    /// Exploration rate ε given to freshly spawned agents
    pub initial_exploration_rate: f32,
    /// Lower bound of the self-adjusting exploration rate
    pub min_exploration_rate: f32,
    /// Upper bound of the self-adjusting exploration rate
    pub max_exploration_rate: f32,

    /// Number of recent rewards averaged into the performance metric
    ///
    /// At 50, a bad streak needs roughly a dozen outcomes before the
    /// agent starts exploring more aggressively again.
    pub performance_window: usize,

    /// Upper bound (exclusive) of the random bonus added to tactic scores
    /// when the agent explores
    pub exploration_bonus_cap: f32,

    // === EFFECTIVENESS LEDGER ===
    /// Weight of the newest sample in the rolling damage average
    ///
    /// At 0.3 the average mostly reflects the last five or so hits.
    pub damage_smoothing: f32,

    /// Damage above `expected * vulnerability_ratio` counts as an
    /// exploited vulnerability
    pub vulnerability_ratio: f32,

    // === PROGRESSION ===
    /// Experience required per level (level N needs N * this)
    pub experience_per_level: u32,

    /// Maximum decisions remembered in an agent's history
    pub history_capacity: usize,

    // === PHASES ===
    /// Health fraction below which an agent retreats or recovers
    pub critical_health: f32,
    /// Health fraction below which an agent adapts its approach
    pub wounded_health: f32,
    /// Distance beyond which an encounter is still in preparation
    pub preparation_distance: f32,
}

impl Default for CombatAiConfig {
    fn default() -> Self {
        Self {
            state_space_size: 10_000,

            discount_factor: 0.95,
            initial_learning_rate: 0.1,
            min_learning_rate: 0.05,
            max_learning_rate: 0.2,
            initial_exploration_rate: 0.2,
            min_exploration_rate: 0.05,
            max_exploration_rate: 0.3,
            performance_window: 50,
            exploration_bonus_cap: 0.1,

            damage_smoothing: 0.3,
            vulnerability_ratio: 1.5,

            experience_per_level: 100,
            history_capacity: 100,

            critical_health: 0.3,
            wounded_health: 0.6,
            preparation_distance: 8.0,
        }
    }
}

impl CombatAiConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.state_space_size == 0 {
            return Err("state_space_size must be positive".into());
        }

        if !(0.0..=1.0).contains(&self.discount_factor) {
            return Err(format!(
                "discount_factor ({}) must lie in [0, 1]",
                self.discount_factor
            ));
        }

        if self.min_learning_rate > self.max_learning_rate
            || !(self.min_learning_rate..=self.max_learning_rate)
                .contains(&self.initial_learning_rate)
        {
            return Err(format!(
                "initial_learning_rate ({}) must lie in [{}, {}]",
                self.initial_learning_rate, self.min_learning_rate, self.max_learning_rate
            ));
        }

        if self.min_exploration_rate > self.max_exploration_rate
            || !(self.min_exploration_rate..=self.max_exploration_rate)
                .contains(&self.initial_exploration_rate)
        {
            return Err(format!(
                "initial_exploration_rate ({}) must lie in [{}, {}]",
                self.initial_exploration_rate,
                self.min_exploration_rate,
                self.max_exploration_rate
            ));
        }

        if self.critical_health >= self.wounded_health {
            return Err(format!(
                "critical_health ({}) should be < wounded_health ({})",
                self.critical_health, self.wounded_health
            ));
        }

        if self.performance_window == 0 || self.history_capacity == 0 {
            return Err("performance_window and history_capacity must be positive".into());
        }

        if !(0.0..=1.0).contains(&self.damage_smoothing) || self.damage_smoothing == 0.0 {
            return Err("damage_smoothing must lie in (0, 1]".into());
        }

        Ok(())
    }

    /// Parse and validate a config from TOML text
    ///
    /// Missing keys fall back to their defaults.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: CombatAiConfig = toml::from_str(contents)
            .map_err(|e| CombatAiError::Config(format!("Failed to parse config TOML: {}", e)))?;
        config.validate().map_err(CombatAiError::Config)?;
        Ok(config)
    }
}

/// Load config from a TOML file
pub fn load_config(path: &Path) -> Result<CombatAiConfig> {
    let contents = fs::read_to_string(path)?;
    CombatAiConfig::from_toml_str(&contents)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(CombatAiConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rate_bounds_match_shipped_tuning() {
        let config = CombatAiConfig::default();
        assert_eq!(config.min_learning_rate, 0.05);
        assert_eq!(config.max_learning_rate, 0.2);
        assert_eq!(config.min_exploration_rate, 0.05);
        assert_eq!(config.max_exploration_rate, 0.3);
        assert_eq!(config.discount_factor, 0.95);
    }

    #[test]
    fn test_invalid_learning_rate_rejected() {
        let config = CombatAiConfig {
            initial_learning_rate: 0.5,
            ..CombatAiConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_inverted_health_thresholds_rejected() {
        let config = CombatAiConfig {
            critical_health: 0.7,
            ..CombatAiConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = CombatAiConfig::from_toml_str("state_space_size = 100\n").unwrap();
        assert_eq!(config.state_space_size, 100);
        assert_eq!(config.discount_factor, 0.95);
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = CombatAiConfig::from_toml_str("discount_factor = \"high\"").unwrap_err();
        assert!(matches!(err, CombatAiError::Config(_)));
    }

    #[test]
    fn test_load_shipped_config() {
        let config = load_config(Path::new("data/combat_ai.toml")).expect("Should load shipped config");
        assert!(config.validate().is_ok());
    }
}
