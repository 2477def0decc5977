//! Policy thresholds and tunables.
//!
//! Loaded from `~/.fleetmate/config.json` when present. Every field has a
//! built-in default and the file may be partial, so a missing or malformed
//! config never blocks startup.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Tunable thresholds for integration insights and behavior analytics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PolicyConfig {
    /// Expenses above `estimated_cost * cost_overrun_ratio` trigger a cost insight.
    pub cost_overrun_ratio: f64,
    /// Restock threshold for inventory items that carry no `min_stock` of their own.
    pub min_stock_fallback: f64,
    /// How many of a user's most recent actions pattern analysis looks at.
    pub pattern_window: u32,
    /// Minimum occurrences inside the window before a pattern is recorded.
    pub pattern_min_count: u32,
    /// Pattern frequency that must be exceeded before a suggestion is generated.
    pub suggestion_min_frequency: u32,
    /// Days until a generated suggestion expires.
    pub suggestion_ttl_days: i64,
    /// Repetitions of one action type that must be exceeded to flag an
    /// automation opportunity.
    pub automation_min_count: u32,
    /// Module switches inside the analytics window that must be exceeded to
    /// flag workflow fragmentation.
    pub switch_flag_threshold: u32,
    /// Modules used fewer times than this are reported as under-explored.
    pub low_usage_max: u32,
    /// Error-flavored actions that must be exceeded to report a knowledge gap.
    pub error_flag_threshold: u32,
    /// Day span of the behavior analytics window.
    pub analytics_window_days: u32,
    /// IANA timezone used to bucket activity by hour.
    pub timezone: String,
    /// Currency booked on generated finance records.
    pub default_currency: String,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        PolicyConfig {
            cost_overrun_ratio: 1.1,
            min_stock_fallback: 1.0,
            pattern_window: 100,
            pattern_min_count: 5,
            suggestion_min_frequency: 10,
            suggestion_ttl_days: 7,
            automation_min_count: 20,
            switch_flag_threshold: 15,
            low_usage_max: 3,
            error_flag_threshold: 5,
            analytics_window_days: 30,
            timezone: "UTC".to_string(),
            default_currency: "USD".to_string(),
        }
    }
}

/// Path of the optional config file: `~/.fleetmate/config.json`.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".fleetmate").join("config.json"))
}

impl PolicyConfig {
    /// Load the config from disk, falling back to defaults when the file is
    /// missing or unreadable. Unknown fields are ignored; missing fields
    /// take their defaults.
    pub fn load() -> Self {
        let path = match config_path() {
            Some(p) => p,
            None => return Self::default(),
        };
        if !path.exists() {
            return Self::default();
        }
        match std::fs::read_to_string(&path) {
            Ok(content) => Self::from_json(&content),
            Err(e) => {
                log::warn!("Could not read {}: {e}; using default policy", path.display());
                Self::default()
            }
        }
    }

    /// Parse a config document, falling back to defaults on malformed JSON.
    pub fn from_json(content: &str) -> Self {
        match serde_json::from_str(content) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Policy config is not valid JSON ({e}); using defaults");
                Self::default()
            }
        }
    }
}
