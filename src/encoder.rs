//! Report encoding
//!
//! Converts full-precision analysis results into presentation records for
//! the reporting/API layer: scores rounded to 3 decimals, displacement
//! metrics to 4, event times to 2, and focus durations rendered as
//! whole-second labels.

use crate::error::EngineError;
use crate::types::{
    AttentionPattern, AttentionResult, AttentionStatus, MovementResult, MovementStatus, Severity,
};
use crate::{ENGINE_VERSION, PRODUCER_NAME};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Producer metadata stamped on every report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportProducer {
    pub name: String,
    pub version: String,
    pub instance_id: String,
}

/// Movement analysis, presentation form
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovementReport {
    pub intensity_score: f64,
    pub threshold: f64,
    pub status: MovementStatus,
    pub significant_movements: u32,
    pub time_window: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub baseline_deviation: Option<f64>,
    pub metrics: MovementMetricsReport,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovementMetricsReport {
    pub average_displacement: f64,
    pub max_displacement: f64,
    pub std_displacement: f64,
    pub movement_velocity: f64,
    pub total_frames: usize,
}

/// Attention analysis, presentation form
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttentionReport {
    pub attention_ratio: f64,
    pub threshold: f64,
    pub status: AttentionStatus,
    pub longest_focus_duration: String,
    pub average_focus_duration: String,
    pub time_window: String,
    pub focus_consistency: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern_classification: Option<AttentionPattern>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub baseline_deviation: Option<f64>,
    pub distraction_analysis: DistractionReport,
    pub metrics: AttentionMetricsReport,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistractionReport {
    pub event_count: u32,
    pub total_distraction_sec: f64,
    pub events: Vec<DistractionEventReport>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistractionEventReport {
    pub start_time: f64,
    pub duration: f64,
    pub severity: Severity,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttentionMetricsReport {
    pub on_task_frames: u32,
    pub off_task_frames: u32,
    pub total_frames: u32,
    pub focus_session_count: u32,
    pub head_movement_variability: f64,
}

/// Complete engagement report for one subject's analyzed sequence
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngagementReport {
    pub producer: ReportProducer,
    pub subject_id: u32,
    pub computed_at_utc: String,
    pub movement: MovementReport,
    pub attention: AttentionReport,
}

/// Report encoder with a stable per-process instance id
pub struct ReportEncoder {
    instance_id: String,
}

impl Default for ReportEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportEncoder {
    /// Create an encoder with a fresh instance id
    pub fn new() -> Self {
        Self {
            instance_id: Uuid::new_v4().to_string(),
        }
    }

    /// Create an encoder with a specific instance id
    pub fn with_instance_id(instance_id: String) -> Self {
        Self { instance_id }
    }

    /// Build an engagement report from both analysis results
    pub fn encode(
        &self,
        subject_id: u32,
        movement: &MovementResult,
        attention: &AttentionResult,
    ) -> EngagementReport {
        EngagementReport {
            producer: ReportProducer {
                name: PRODUCER_NAME.to_string(),
                version: ENGINE_VERSION.to_string(),
                instance_id: self.instance_id.clone(),
            },
            subject_id,
            computed_at_utc: Utc::now().to_rfc3339(),
            movement: encode_movement(movement),
            attention: encode_attention(attention),
        }
    }

    /// Build a report and serialize it to pretty JSON
    pub fn encode_to_json(
        &self,
        subject_id: u32,
        movement: &MovementResult,
        attention: &AttentionResult,
    ) -> Result<String, EngineError> {
        let report = self.encode(subject_id, movement, attention);
        serde_json::to_string_pretty(&report).map_err(EngineError::JsonError)
    }
}

fn encode_movement(result: &MovementResult) -> MovementReport {
    MovementReport {
        intensity_score: round3(result.intensity_score),
        threshold: result.threshold,
        status: result.status,
        significant_movements: result.significant_movements,
        time_window: seconds_label(result.time_window_sec as f64),
        baseline_deviation: result.baseline_deviation.map(round3),
        metrics: MovementMetricsReport {
            average_displacement: round4(result.metrics.average_displacement),
            max_displacement: round4(result.metrics.max_displacement),
            std_displacement: round4(result.metrics.std_displacement),
            movement_velocity: round4(result.metrics.movement_velocity),
            total_frames: result.metrics.total_frames,
        },
    }
}

fn encode_attention(result: &AttentionResult) -> AttentionReport {
    AttentionReport {
        attention_ratio: round3(result.attention_ratio),
        threshold: result.threshold,
        status: result.status,
        longest_focus_duration: seconds_label(result.longest_focus_sec),
        average_focus_duration: seconds_label(result.average_focus_sec),
        time_window: seconds_label(result.time_window_sec as f64),
        focus_consistency: round3(result.focus_consistency),
        pattern_classification: result.pattern,
        baseline_deviation: result.baseline_deviation.map(round3),
        distraction_analysis: DistractionReport {
            event_count: result.distraction.event_count,
            total_distraction_sec: round2(result.distraction.total_distraction_sec),
            events: result
                .distraction
                .events
                .iter()
                .map(|event| DistractionEventReport {
                    start_time: round2(event.start_time),
                    duration: round2(event.duration),
                    severity: event.severity,
                })
                .collect(),
        },
        metrics: AttentionMetricsReport {
            on_task_frames: result.metrics.on_task_frames,
            off_task_frames: result.metrics.off_task_frames,
            total_frames: result.metrics.total_frames,
            focus_session_count: result.metrics.focus_session_count,
            head_movement_variability: round3(result.metrics.head_movement_variability),
        },
    }
}

/// Whole-second duration label, e.g. "9s"
fn seconds_label(seconds: f64) -> String {
    format!("{}s", seconds as i64)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

fn round4(value: f64) -> f64 {
    (value * 10000.0).round() / 10000.0
}
