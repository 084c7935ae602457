//! Attention analysis
//!
//! Classifies each frame as on-task or off-task from head orientation, then
//! derives the attention ratio, focus sessions, distraction events, head
//! variability, focus consistency, and an overall pattern label.

use crate::baseline::{classify_deviation, Band};
use crate::config::EngineConfig;
use crate::geometry;
use crate::segmentation::segment_frames;
use crate::stats::{mean, population_std};
use crate::types::{
    AttentionMetrics, AttentionPattern, AttentionResult, AttentionStatus, DistractionEvent,
    DistractionSummary, PoseFrame, Severity, TimedRun,
};

/// Minimum duration for a focus session (seconds)
const FOCUS_MIN_SESSION_SEC: f64 = 1.0;

/// Minimum duration for a distraction event (seconds)
const DISTRACTION_MIN_EVENT_SEC: f64 = 3.0;

/// Distraction events longer than this are labeled prolonged (seconds)
const PROLONGED_DISTRACTION_SEC: f64 = 10.0;

/// Minimum raw sequence length for the distraction scan
const MIN_FRAMES_FOR_DISTRACTIONS: usize = 5;

/// Combined yaw+pitch standard deviation mapping to maximum variability
const VARIABILITY_FULL_SCALE_DEG: f64 = 60.0;

/// Guard for the focus-consistency denominator
const CONSISTENCY_EPSILON: f64 = 0.001;

/// Attention analyzer over gapped pose sequences
pub struct AttentionAnalyzer;

impl AttentionAnalyzer {
    /// Full attention analysis for one subject's sequence.
    ///
    /// Frames whose head orientation cannot be resolved are excluded from
    /// the attention ratio entirely; for run segmentation they count as
    /// off-task. `window_sec` is a cosmetic label only.
    pub fn analyze(
        frames: &[Option<PoseFrame>],
        config: &EngineConfig,
        window_sec: Option<u32>,
    ) -> AttentionResult {
        if frames.len() < 2 {
            return Self::empty_result(config);
        }

        let mut on_task_frames = 0u32;
        let mut off_task_frames = 0u32;
        let mut yaws = Vec::new();
        let mut pitches = Vec::new();

        for frame in frames.iter().flatten() {
            if let Some(orientation) = geometry::head_orientation(frame) {
                yaws.push(orientation.yaw);
                pitches.push(orientation.pitch);
                if Self::on_task(frame, config) {
                    on_task_frames += 1;
                } else {
                    off_task_frames += 1;
                }
            }
        }

        let total_frames = on_task_frames + off_task_frames;
        if total_frames == 0 {
            return Self::empty_result(config);
        }

        let attention_ratio = on_task_frames as f64 / total_frames as f64;

        let focus_sessions = Self::focus_sessions(frames, config);
        let focus_durations: Vec<f64> = focus_sessions.iter().map(|run| run.duration).collect();
        let longest_focus_sec = focus_durations.iter().cloned().fold(0.0f64, f64::max);
        let average_focus_sec = mean(&focus_durations);

        let status = if attention_ratio >= config.attention_threshold {
            AttentionStatus::AboveThreshold
        } else if attention_ratio >= config.attention_threshold * 0.8 {
            AttentionStatus::Normal
        } else {
            AttentionStatus::BelowThreshold
        };

        let head_movement_variability = if yaws.len() < 2 {
            0.0
        } else {
            ((population_std(&yaws) + population_std(&pitches)) / VARIABILITY_FULL_SCALE_DEG)
                .min(1.0)
        };

        let events = Self::distraction_events(frames, config);
        let distraction = DistractionSummary {
            event_count: events.len() as u32,
            total_distraction_sec: events.iter().map(|e| e.duration).sum(),
            events,
        };

        let focus_consistency = if focus_durations.is_empty() {
            0.0
        } else {
            (1.0 - population_std(&focus_durations)
                / (mean(&focus_durations) + CONSISTENCY_EPSILON))
                .clamp(0.0, 1.0)
        };

        let pattern = Some(Self::classify_pattern(
            attention_ratio,
            distraction.event_count,
            focus_consistency,
        ));

        AttentionResult {
            attention_ratio,
            threshold: config.attention_threshold,
            status,
            longest_focus_sec,
            average_focus_sec,
            time_window_sec: window_sec.unwrap_or(config.time_window_medium_sec),
            focus_consistency,
            pattern,
            baseline_deviation: None,
            distraction,
            metrics: AttentionMetrics {
                on_task_frames,
                off_task_frames,
                total_frames,
                focus_session_count: focus_sessions.len() as u32,
                head_movement_variability,
            },
        }
    }

    /// Contiguous on-task runs longer than the focus minimum
    pub fn focus_sessions(frames: &[Option<PoseFrame>], config: &EngineConfig) -> Vec<TimedRun> {
        segment_frames(
            frames,
            |frame| Self::on_task(frame, config),
            FOCUS_MIN_SESSION_SEC,
        )
    }

    /// Contiguous off-task runs longer than the distraction minimum,
    /// labeled by severity
    pub fn distraction_events(
        frames: &[Option<PoseFrame>],
        config: &EngineConfig,
    ) -> Vec<DistractionEvent> {
        if frames.len() < MIN_FRAMES_FOR_DISTRACTIONS {
            return Vec::new();
        }

        segment_frames(
            frames,
            |frame| !Self::on_task(frame, config),
            DISTRACTION_MIN_EVENT_SEC,
        )
        .into_iter()
        .map(|run| DistractionEvent {
            start_time: run.start_time,
            duration: run.duration,
            severity: if run.duration > PROLONGED_DISTRACTION_SEC {
                Severity::Prolonged
            } else {
                Severity::Brief
            },
        })
        .collect()
    }

    /// Re-derive the status of a result against a caller-supplied baseline
    /// (e.g. the classroom average attention ratio).
    pub fn apply_baseline(result: &AttentionResult, baseline_ratio: f64) -> AttentionResult {
        let rules = [
            (
                Band::Below(-0.2),
                AttentionStatus::SignificantlyBelowBaseline,
            ),
            (Band::Below(-0.1), AttentionStatus::BelowBaseline),
            (Band::Above(0.1), AttentionStatus::AboveBaseline),
        ];
        let (deviation, status) = classify_deviation(
            result.attention_ratio,
            baseline_ratio,
            &rules,
            AttentionStatus::Normal,
        );

        AttentionResult {
            status,
            baseline_deviation: Some(deviation),
            ..result.clone()
        }
    }

    /// Ordered decision list, first match wins
    fn classify_pattern(
        attention_ratio: f64,
        distraction_count: u32,
        consistency: f64,
    ) -> AttentionPattern {
        if attention_ratio >= 0.8 && consistency >= 0.7 {
            AttentionPattern::SustainedAttention
        } else if attention_ratio >= 0.6 && distraction_count <= 3 {
            AttentionPattern::ModerateAttentionWithBriefDistractions
        } else if distraction_count > 5 {
            AttentionPattern::FrequentDistractions
        } else if consistency < 0.4 {
            AttentionPattern::InconsistentAttention
        } else {
            AttentionPattern::BelowAverageAttention
        }
    }

    fn on_task(frame: &PoseFrame, config: &EngineConfig) -> bool {
        geometry::is_on_task(
            frame,
            config.on_task_yaw_threshold_deg,
            config.on_task_pitch_threshold_deg,
        )
    }

    /// The defined result for sequences with no resolvable orientation
    fn empty_result(config: &EngineConfig) -> AttentionResult {
        AttentionResult {
            attention_ratio: 0.0,
            threshold: config.attention_threshold,
            status: AttentionStatus::NoData,
            longest_focus_sec: 0.0,
            average_focus_sec: 0.0,
            time_window_sec: 0,
            focus_consistency: 0.0,
            pattern: None,
            baseline_deviation: None,
            distraction: DistractionSummary {
                event_count: 0,
                total_distraction_sec: 0.0,
                events: Vec::new(),
            },
            metrics: AttentionMetrics {
                on_task_frames: 0,
                off_task_frames: 0,
                total_frames: 0,
                focus_session_count: 0,
                head_movement_variability: 0.0,
            },
        }
    }
}
