//! Core types for the Classense engine
//!
//! This module defines the data structures that flow through the analysis
//! pipeline: pose frames in, movement and attention results out.

use serde::{Deserialize, Serialize};

/// Number of keypoints per pose frame (fixed skeletal layout)
pub const KEYPOINT_COUNT: usize = 33;

/// Visibility above which a keypoint counts as visible
pub const VISIBILITY_THRESHOLD: f64 = 0.5;

/// Fixed index assignment for the keypoints the engine reads
pub mod keypoint_index {
    pub const NOSE: usize = 0;
    pub const LEFT_EAR: usize = 7;
    pub const RIGHT_EAR: usize = 8;
    pub const LEFT_SHOULDER: usize = 11;
    pub const RIGHT_SHOULDER: usize = 12;
    pub const LEFT_HIP: usize = 23;
    pub const RIGHT_HIP: usize = 24;
}

/// A tracked anatomical landmark with 2D position and visibility
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Keypoint {
    pub x: f64,
    pub y: f64,
    /// Detection confidence in [0, 1]
    pub visibility: f64,
}

impl Keypoint {
    /// Whether this keypoint is confident enough to use
    pub fn is_visible(&self) -> bool {
        self.visibility > VISIBILITY_THRESHOLD
    }
}

/// One detected pose: a full keypoint set at a single sampled instant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoseFrame {
    /// Exactly [`KEYPOINT_COUNT`] entries, in the fixed layout
    pub keypoints: Vec<Keypoint>,
    /// Seconds, monotonically non-decreasing within a sequence
    pub timestamp: f64,
    pub subject_id: u32,
}

/// A subject's pose sequence; `None` entries mark instants where no pose
/// was detected (gaps, not zero-filled frames)
pub type PoseSequence = Vec<Option<PoseFrame>>;

/// Head orientation derived from nose and ear keypoints, in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeadOrientation {
    /// Positive = head turned right
    pub yaw: f64,
    /// Positive = head tilted up
    pub pitch: f64,
    /// Angle of the ear-to-ear line
    pub roll: f64,
}

/// A contiguous timed span produced by run segmentation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimedRun {
    pub start_time: f64,
    pub end_time: f64,
    pub duration: f64,
}

/// Severity of a distraction event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Brief,
    Prolonged,
}

/// A contiguous off-task run exceeding the minimum event duration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DistractionEvent {
    pub start_time: f64,
    pub duration: f64,
    pub severity: Severity,
}

/// A discrete large-displacement event (standing up, changing seats)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionChange {
    /// Timestamp of the frame the subject moved to
    pub timestamp: f64,
    pub displacement: f64,
    /// Index into the pairwise displacement list
    pub frame_index: usize,
}

/// Fidgeting analysis: frequent small movements
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FidgetingResult {
    pub detected: bool,
    /// Number of small displacements (0 < d < 0.5 × average)
    pub small_movement_count: u32,
    /// Small movements per second; 0 when not detected
    pub frequency_hz: f64,
    /// Small movements as a percentage of all displacements
    pub percent_of_frames: f64,
}

/// Movement analysis status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementStatus {
    Elevated,
    Normal,
    Low,
    NoData,
    AboveBaseline,
    BelowBaseline,
}

/// Displacement statistics backing a movement result
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MovementMetrics {
    pub average_displacement: f64,
    pub max_displacement: f64,
    pub std_displacement: f64,
    /// Total displacement per second of elapsed time
    pub movement_velocity: f64,
    /// Sequence length, including absent entries
    pub total_frames: usize,
}

/// Output of movement intensity analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovementResult {
    /// Normalized intensity in [0, 1]
    pub intensity_score: f64,
    /// The configured threshold the score was judged against
    pub threshold: f64,
    pub status: MovementStatus,
    /// Count of displacements exceeding 2 × average
    pub significant_movements: u32,
    /// Cosmetic window label in seconds (0 for the empty result)
    pub time_window_sec: u32,
    /// Deviation from a caller-supplied baseline, when compared
    #[serde(skip_serializing_if = "Option::is_none")]
    pub baseline_deviation: Option<f64>,
    pub metrics: MovementMetrics,
}

/// Attention analysis status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttentionStatus {
    AboveThreshold,
    Normal,
    BelowThreshold,
    NoData,
    AboveBaseline,
    BelowBaseline,
    SignificantlyBelowBaseline,
}

/// Attention pattern label, evaluated as an ordered decision list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttentionPattern {
    SustainedAttention,
    ModerateAttentionWithBriefDistractions,
    FrequentDistractions,
    InconsistentAttention,
    BelowAverageAttention,
}

/// Frame counts and variability backing an attention result
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AttentionMetrics {
    pub on_task_frames: u32,
    pub off_task_frames: u32,
    /// Frames with resolvable head orientation
    pub total_frames: u32,
    pub focus_session_count: u32,
    /// Head orientation variability in [0, 1]
    pub head_movement_variability: f64,
}

/// Distraction events detected in a sequence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistractionSummary {
    pub event_count: u32,
    pub total_distraction_sec: f64,
    pub events: Vec<DistractionEvent>,
}

/// Output of attention analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttentionResult {
    /// Share of orientation-resolvable frames spent on-task, in [0, 1]
    pub attention_ratio: f64,
    /// The configured threshold the ratio was judged against
    pub threshold: f64,
    pub status: AttentionStatus,
    /// Longest focus session in seconds
    pub longest_focus_sec: f64,
    /// Mean focus session length in seconds
    pub average_focus_sec: f64,
    /// Cosmetic window label in seconds (0 for the empty result)
    pub time_window_sec: u32,
    /// Stability of focus session lengths, in [0, 1]
    pub focus_consistency: f64,
    /// Absent when there was no usable data to classify
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<AttentionPattern>,
    /// Deviation from a caller-supplied baseline, when compared
    #[serde(skip_serializing_if = "Option::is_none")]
    pub baseline_deviation: Option<f64>,
    pub distraction: DistractionSummary,
    pub metrics: AttentionMetrics,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visibility_threshold_is_strict() {
        let kp = Keypoint {
            x: 0.5,
            y: 0.5,
            visibility: 0.5,
        };
        assert!(!kp.is_visible());

        let kp = Keypoint {
            x: 0.5,
            y: 0.5,
            visibility: 0.51,
        };
        assert!(kp.is_visible());
    }

    #[test]
    fn test_status_serialization() {
        let json = serde_json::to_string(&MovementStatus::NoData).unwrap();
        assert_eq!(json, "\"no_data\"");

        let json = serde_json::to_string(&AttentionStatus::SignificantlyBelowBaseline).unwrap();
        assert_eq!(json, "\"significantly_below_baseline\"");

        let json =
            serde_json::to_string(&AttentionPattern::ModerateAttentionWithBriefDistractions)
                .unwrap();
        assert_eq!(json, "\"moderate_attention_with_brief_distractions\"");
    }

    #[test]
    fn test_pose_frame_deserialization_with_gaps() {
        let json = r#"[
            {"timestamp": 0.0, "subject_id": 1, "keypoints": [{"x": 0.1, "y": 0.2, "visibility": 0.9}]},
            null
        ]"#;
        let frames: PoseSequence = serde_json::from_str(json).unwrap();
        assert_eq!(frames.len(), 2);
        assert!(frames[0].is_some());
        assert!(frames[1].is_none());
    }

    #[test]
    fn test_severity_serialization() {
        let json = serde_json::to_string(&Severity::Prolonged).unwrap();
        assert_eq!(json, "\"prolonged\"");
    }
}
