//! Pipeline orchestration
//!
//! Public entry points tying the stages together: parse → validate →
//! analyze → encode. The stateless function serves one-shot calls; the
//! processor adds caller-level trend windows so repeated calls for the same
//! subject gain baseline context.

use crate::adapter::parse_sequence;
use crate::attention::AttentionAnalyzer;
use crate::baseline::TrendWindow;
use crate::config::EngineConfig;
use crate::encoder::ReportEncoder;
use crate::error::EngineError;
use crate::movement::MovementAnalyzer;
use crate::types::{AttentionStatus, MovementStatus, PoseFrame};
use serde::{Deserialize, Serialize};

/// Analyze a pose sequence JSON and return an engagement report JSON
/// (stateless, one-shot).
pub fn analyze_to_report(sequence_json: &str, config: &EngineConfig) -> Result<String, EngineError> {
    let frames = parse_sequence(sequence_json)?;

    let movement = MovementAnalyzer::analyze(&frames, config, None);
    let attention = AttentionAnalyzer::analyze(&frames, config, None);

    let encoder = ReportEncoder::new();
    encoder.encode_to_json(subject_of(&frames), &movement, &attention)
}

/// Persistable trend state for a processor
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProcessorState {
    movement_trend: TrendWindow,
    attention_trend: TrendWindow,
}

/// Stateful processor with rolling trend baselines.
///
/// Holds two bounded trend windows (movement score, attention ratio). Once
/// populated, their rolling means are applied as baselines on subsequent
/// calls, so each report carries a deviation from the subject's own recent
/// history. Not internally synchronized; wrap it if shared across threads.
pub struct EngagementProcessor {
    config: EngineConfig,
    encoder: ReportEncoder,
    state: ProcessorState,
}

impl Default for EngagementProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl EngagementProcessor {
    /// Create a processor with the default configuration
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    /// Create a processor with a specific configuration
    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            config,
            encoder: ReportEncoder::new(),
            state: ProcessorState::default(),
        }
    }

    /// Process a pose sequence JSON and return an engagement report JSON.
    ///
    /// Uses the rolling trend means as baselines when available, then folds
    /// the new scores into the trend windows. Empty (`no_data`) results are
    /// neither compared nor recorded.
    pub fn process(&mut self, sequence_json: &str) -> Result<String, EngineError> {
        let movement_baseline = self.state.movement_trend.mean();
        let attention_baseline = self.state.attention_trend.mean();
        self.process_inner(sequence_json, movement_baseline, attention_baseline)
    }

    /// Process with explicit baselines (e.g. classroom averages) instead of
    /// the subject's own trend.
    pub fn process_with_baseline(
        &mut self,
        sequence_json: &str,
        movement_baseline: f64,
        attention_baseline: f64,
    ) -> Result<String, EngineError> {
        self.process_inner(
            sequence_json,
            Some(movement_baseline),
            Some(attention_baseline),
        )
    }

    fn process_inner(
        &mut self,
        sequence_json: &str,
        movement_baseline: Option<f64>,
        attention_baseline: Option<f64>,
    ) -> Result<String, EngineError> {
        let frames = parse_sequence(sequence_json)?;

        let mut movement = MovementAnalyzer::analyze(&frames, &self.config, None);
        let mut attention = AttentionAnalyzer::analyze(&frames, &self.config, None);

        if movement.status != MovementStatus::NoData {
            if let Some(baseline) = movement_baseline {
                movement = MovementAnalyzer::apply_baseline(&movement, baseline);
            }
            self.state.movement_trend.push(movement.intensity_score);
        }

        if attention.status != AttentionStatus::NoData {
            if let Some(baseline) = attention_baseline {
                attention = AttentionAnalyzer::apply_baseline(&attention, baseline);
            }
            self.state.attention_trend.push(attention.attention_ratio);
        }

        self.encoder
            .encode_to_json(subject_of(&frames), &movement, &attention)
    }

    /// Number of analyses currently in the trend windows
    pub fn trend_len(&self) -> usize {
        self.state
            .movement_trend
            .len()
            .max(self.state.attention_trend.len())
    }

    /// Drop all trend history
    pub fn clear_trends(&mut self) {
        self.state.movement_trend.clear();
        self.state.attention_trend.clear();
    }

    /// Serialize trend state for persistence
    pub fn save_state(&self) -> Result<String, EngineError> {
        serde_json::to_string(&self.state)
            .map_err(|e| EngineError::EncodingError(e.to_string()))
    }

    /// Restore trend state saved by [`save_state`](Self::save_state)
    pub fn load_state(&mut self, json: &str) -> Result<(), EngineError> {
        self.state = serde_json::from_str(json)
            .map_err(|e| EngineError::ParseError(e.to_string()))?;
        Ok(())
    }
}

fn subject_of(frames: &[Option<PoseFrame>]) -> u32 {
    frames
        .iter()
        .flatten()
        .next()
        .map(|frame| frame.subject_id)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::forward_frame;
    use crate::types::PoseSequence;

    fn sample_sequence_json() -> String {
        let frames: PoseSequence = (0..10)
            .map(|i| {
                let x = if i < 5 { 0.3 } else { 0.8 };
                let mut frame = forward_frame(i as f64, x, 0.5);
                frame.subject_id = 12;
                Some(frame)
            })
            .collect();
        serde_json::to_string(&frames).unwrap()
    }

    #[test]
    fn test_analyze_to_report_stateless() {
        let json = analyze_to_report(&sample_sequence_json(), &EngineConfig::default()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["subject_id"], 12);
        assert_eq!(value["movement"]["status"], "low");
        assert_eq!(value["attention"]["status"], "above_threshold");
        // Stateless call never has a baseline
        assert!(value["movement"].get("baseline_deviation").is_none());
    }

    #[test]
    fn test_invalid_input_rejected() {
        let result = analyze_to_report("not json", &EngineConfig::default());
        assert!(result.is_err());
    }

    #[test]
    fn test_processor_builds_trend_baseline() {
        let mut processor = EngagementProcessor::new();

        // First call: no trend yet, no deviation
        let first = processor.process(&sample_sequence_json()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&first).unwrap();
        assert!(value["movement"].get("baseline_deviation").is_none());
        assert_eq!(processor.trend_len(), 1);

        // Second call: identical input, so deviation from trend is 0
        let second = processor.process(&sample_sequence_json()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&second).unwrap();
        let deviation = value["movement"]["baseline_deviation"].as_f64().unwrap();
        assert!(deviation.abs() < 1e-9);
        assert_eq!(value["movement"]["status"], "normal");
        assert_eq!(processor.trend_len(), 2);
    }

    #[test]
    fn test_processor_with_explicit_baseline() {
        let mut processor = EngagementProcessor::new();
        let json = processor
            .process_with_baseline(&sample_sequence_json(), 0.2, 0.5)
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        // intensity ~0.556 vs baseline 0.2 -> deviation > 0.2 -> elevated
        assert_eq!(value["movement"]["status"], "elevated");
        // ratio 1.0 vs baseline 0.5 -> above_baseline
        assert_eq!(value["attention"]["status"], "above_baseline");
    }

    #[test]
    fn test_no_data_skips_trend() {
        let mut processor = EngagementProcessor::new();
        let empty: PoseSequence = vec![None, None];
        let json = serde_json::to_string(&empty).unwrap();

        let report = processor.process(&json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&report).unwrap();
        assert_eq!(value["movement"]["status"], "no_data");
        assert_eq!(processor.trend_len(), 0);
    }

    #[test]
    fn test_state_round_trip() {
        let mut processor = EngagementProcessor::new();
        processor.process(&sample_sequence_json()).unwrap();
        processor.process(&sample_sequence_json()).unwrap();

        let saved = processor.save_state().unwrap();

        let mut restored = EngagementProcessor::new();
        restored.load_state(&saved).unwrap();
        assert_eq!(restored.trend_len(), 2);
    }

    #[test]
    fn test_clear_trends() {
        let mut processor = EngagementProcessor::new();
        processor.process(&sample_sequence_json()).unwrap();
        assert_eq!(processor.trend_len(), 1);

        processor.clear_trends();
        assert_eq!(processor.trend_len(), 0);
    }
}
