//! Detection thresholds used by the analyzers
//!
//! The defaults reproduce the reference scoring behavior. The score tier table
//! in [`crate::scorer`] is intentionally not part of this configuration.

use crate::error::ScoreError;
use serde::{Deserialize, Serialize};

/// Focus loss shorter than this counts as a rapid switch (2 seconds)
pub const RAPID_SWITCH_THRESHOLD_MS: i64 = 2_000;

/// Window within which pastes form a burst (30 seconds)
pub const PASTE_BURST_WINDOW_MS: i64 = 30_000;

/// Minimum number of pastes inside a window to call it a burst
pub const PASTE_BURST_MIN_COUNT: u32 = 3;

/// Focus loss longer than this is "long" (60 seconds)
pub const LONG_FOCUS_LOSS_MS: i64 = 60_000;

/// Insert must exceed this many characters to correlate with a focus loss
pub const LONG_FOCUS_INSERT_MIN_LEN: i64 = 100;

/// Tunable thresholds for the focus and pattern analyzers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    pub rapid_switch_threshold_ms: i64,
    pub paste_burst_window_ms: i64,
    pub paste_burst_min_count: u32,
    pub long_focus_loss_ms: i64,
    pub long_focus_insert_min_len: i64,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            rapid_switch_threshold_ms: RAPID_SWITCH_THRESHOLD_MS,
            paste_burst_window_ms: PASTE_BURST_WINDOW_MS,
            paste_burst_min_count: PASTE_BURST_MIN_COUNT,
            long_focus_loss_ms: LONG_FOCUS_LOSS_MS,
            long_focus_insert_min_len: LONG_FOCUS_INSERT_MIN_LEN,
        }
    }
}

impl AnalyzerConfig {
    /// Parse a (possibly partial) JSON config; missing keys keep their defaults
    pub fn from_json(json: &str) -> Result<Self, ScoreError> {
        let config: AnalyzerConfig = serde_json::from_str(json)
            .map_err(|e| ScoreError::ConfigError(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ScoreError> {
        if self.rapid_switch_threshold_ms <= 0 {
            return Err(ScoreError::ConfigError(
                "rapid_switch_threshold_ms must be positive".to_string(),
            ));
        }
        if self.paste_burst_window_ms <= 0 {
            return Err(ScoreError::ConfigError(
                "paste_burst_window_ms must be positive".to_string(),
            ));
        }
        if self.paste_burst_min_count == 0 {
            return Err(ScoreError::ConfigError(
                "paste_burst_min_count must be at least 1".to_string(),
            ));
        }
        if self.long_focus_loss_ms < 0 {
            return Err(ScoreError::ConfigError(
                "long_focus_loss_ms must not be negative".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = AnalyzerConfig::from_json(r#"{ "paste_burst_window_ms": 10000 }"#).unwrap();

        assert_eq!(config.paste_burst_window_ms, 10_000);
        assert_eq!(config.paste_burst_min_count, PASTE_BURST_MIN_COUNT);
        assert_eq!(config.long_focus_loss_ms, LONG_FOCUS_LOSS_MS);
    }

    #[test]
    fn test_empty_object_is_default() {
        assert_eq!(AnalyzerConfig::from_json("{}").unwrap(), AnalyzerConfig::default());
    }

    #[test]
    fn test_rejects_zero_window() {
        let result = AnalyzerConfig::from_json(r#"{ "paste_burst_window_ms": 0 }"#);
        assert!(matches!(result, Err(ScoreError::ConfigError(_))));
    }

    #[test]
    fn test_rejects_zero_burst_size() {
        let config = AnalyzerConfig {
            paste_burst_min_count: 0,
            ..AnalyzerConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_json() {
        assert!(AnalyzerConfig::from_json("not json").is_err());
    }
}
