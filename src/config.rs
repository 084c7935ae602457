//! Engine configuration
//!
//! All behavioral thresholds live in one read-only value passed explicitly
//! into each analysis call. The engine treats these as constants and never
//! auto-tunes them.

use crate::error::EngineError;
use serde::{Deserialize, Serialize};

/// Behavioral thresholds and window labels for the analysis engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Movement intensity score above which status is "elevated" (0-1)
    pub movement_threshold: f64,
    /// Attention ratio at or above which status is "above_threshold" (0-1)
    pub attention_threshold: f64,
    /// Maximum |yaw| in degrees still considered on-task
    pub on_task_yaw_threshold_deg: f64,
    /// Maximum |pitch| in degrees still considered on-task
    pub on_task_pitch_threshold_deg: f64,
    /// Short analysis window label (seconds)
    pub time_window_short_sec: u32,
    /// Medium analysis window label (seconds); the default for analysis calls
    pub time_window_medium_sec: u32,
    /// Long analysis window label (seconds)
    pub time_window_long_sec: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            movement_threshold: 0.70,
            attention_threshold: 0.60,
            on_task_yaw_threshold_deg: 30.0,
            on_task_pitch_threshold_deg: 20.0,
            time_window_short_sec: 30,
            time_window_medium_sec: 120,
            time_window_long_sec: 300,
        }
    }
}

impl EngineConfig {
    /// Parse a configuration from JSON and validate it
    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that all thresholds are in their documented ranges
    pub fn validate(&self) -> Result<(), EngineError> {
        if !self.movement_threshold.is_finite()
            || self.movement_threshold <= 0.0
            || self.movement_threshold > 1.0
        {
            return Err(EngineError::ConfigError(format!(
                "movement_threshold must be in (0, 1], got {}",
                self.movement_threshold
            )));
        }
        if !self.attention_threshold.is_finite()
            || self.attention_threshold <= 0.0
            || self.attention_threshold > 1.0
        {
            return Err(EngineError::ConfigError(format!(
                "attention_threshold must be in (0, 1], got {}",
                self.attention_threshold
            )));
        }
        if !self.on_task_yaw_threshold_deg.is_finite() || self.on_task_yaw_threshold_deg <= 0.0 {
            return Err(EngineError::ConfigError(format!(
                "on_task_yaw_threshold_deg must be positive, got {}",
                self.on_task_yaw_threshold_deg
            )));
        }
        if !self.on_task_pitch_threshold_deg.is_finite() || self.on_task_pitch_threshold_deg <= 0.0
        {
            return Err(EngineError::ConfigError(format!(
                "on_task_pitch_threshold_deg must be positive, got {}",
                self.on_task_pitch_threshold_deg
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_thresholds() {
        let config = EngineConfig::default();
        assert!((config.movement_threshold - 0.70).abs() < 1e-9);
        assert!((config.attention_threshold - 0.60).abs() < 1e-9);
        assert!((config.on_task_yaw_threshold_deg - 30.0).abs() < 1e-9);
        assert!((config.on_task_pitch_threshold_deg - 20.0).abs() < 1e-9);
        assert_eq!(config.time_window_medium_sec, 120);
    }

    #[test]
    fn test_from_json_partial_override() {
        let config = EngineConfig::from_json(r#"{"movement_threshold": 0.5}"#).unwrap();
        assert!((config.movement_threshold - 0.5).abs() < 1e-9);
        // Unspecified fields fall back to defaults
        assert!((config.attention_threshold - 0.60).abs() < 1e-9);
    }

    #[test]
    fn test_rejects_out_of_range_threshold() {
        let result = EngineConfig::from_json(r#"{"attention_threshold": 1.5}"#);
        assert!(result.is_err());

        let result = EngineConfig::from_json(r#"{"movement_threshold": 0.0}"#);
        assert!(result.is_err());

        let result = EngineConfig::from_json(r#"{"on_task_yaw_threshold_deg": -10.0}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_config_round_trip() {
        let config = EngineConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed = EngineConfig::from_json(&json).unwrap();
        assert_eq!(config, parsed);
    }
}
