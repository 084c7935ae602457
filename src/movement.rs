//! Movement intensity analysis
//!
//! Computes frame-to-frame displacement statistics over a pose sequence:
//! intensity score, significant-movement count, velocity, fidgeting and
//! position-change detection, and baseline comparison.

use crate::baseline::{classify_deviation, Band};
use crate::config::EngineConfig;
use crate::geometry;
use crate::stats::{mean, population_std};
use crate::types::{
    FidgetingResult, MovementMetrics, MovementResult, MovementStatus, PoseFrame, PositionChange,
};

/// Displacements above this multiple of the average count as significant
const SIGNIFICANT_MOVEMENT_FACTOR: f64 = 2.0;

/// Displacements above this multiple of the average count as position changes
const POSITION_CHANGE_FACTOR: f64 = 3.0;

/// Small displacements sit below this fraction of the average
const SMALL_MOVEMENT_FACTOR: f64 = 0.5;

/// Fraction of displacements that must be small for fidgeting
const FIDGET_SHARE: f64 = 0.3;

/// Linear scale from average displacement to the intensity score
const INTENSITY_SCALE: f64 = 10.0;

/// Minimum raw sequence length for fidgeting analysis
const MIN_FRAMES_FOR_FIDGETING: usize = 10;

/// Minimum raw sequence length for position-change detection
const MIN_FRAMES_FOR_POSITION_CHANGES: usize = 5;

/// Movement analyzer over gapped pose sequences
pub struct MovementAnalyzer;

impl MovementAnalyzer {
    /// Compute movement intensity for one subject's sequence.
    ///
    /// `window_sec` is a cosmetic label only; it defaults to the configured
    /// medium window and never affects computation. Sequences with fewer
    /// than two usable frames produce the defined empty result.
    pub fn analyze(
        frames: &[Option<PoseFrame>],
        config: &EngineConfig,
        window_sec: Option<u32>,
    ) -> MovementResult {
        if frames.len() < 2 {
            return Self::empty_result(config);
        }

        let displacements = pairwise_displacements(frames);
        if displacements.is_empty() {
            return Self::empty_result(config);
        }

        let values: Vec<f64> = displacements.iter().map(|d| d.value).collect();
        let average = mean(&values);
        let max = values.iter().cloned().fold(0.0f64, f64::max);
        let std = population_std(&values);

        let significant_threshold = average * SIGNIFICANT_MOVEMENT_FACTOR;
        let significant_movements =
            values.iter().filter(|&&d| d > significant_threshold).count() as u32;

        let velocity = match elapsed_seconds(frames) {
            Some(elapsed) if elapsed > 0.0 => values.iter().sum::<f64>() / elapsed,
            _ => 0.0,
        };

        let intensity_score = (average * INTENSITY_SCALE).min(1.0);

        let status = if intensity_score > config.movement_threshold {
            MovementStatus::Elevated
        } else if intensity_score > config.movement_threshold * 0.8 {
            MovementStatus::Normal
        } else {
            MovementStatus::Low
        };

        MovementResult {
            intensity_score,
            threshold: config.movement_threshold,
            status,
            significant_movements,
            time_window_sec: window_sec.unwrap_or(config.time_window_medium_sec),
            baseline_deviation: None,
            metrics: MovementMetrics {
                average_displacement: average,
                max_displacement: max,
                std_displacement: std,
                movement_velocity: velocity,
                total_frames: frames.len(),
            },
        }
    }

    /// Detect fidgeting: a large share of small, repetitive displacements.
    pub fn detect_fidgeting(frames: &[Option<PoseFrame>]) -> FidgetingResult {
        let none = FidgetingResult {
            detected: false,
            small_movement_count: 0,
            frequency_hz: 0.0,
            percent_of_frames: 0.0,
        };

        if frames.len() < MIN_FRAMES_FOR_FIDGETING {
            return none;
        }

        let displacements = pairwise_displacements(frames);
        if displacements.is_empty() {
            return none;
        }

        let values: Vec<f64> = displacements.iter().map(|d| d.value).collect();
        let small_bound = mean(&values) * SMALL_MOVEMENT_FACTOR;
        let small_count = values.iter().filter(|&&d| d > 0.0 && d < small_bound).count();

        let detected = small_count as f64 > values.len() as f64 * FIDGET_SHARE;

        let frequency_hz = if detected {
            match elapsed_seconds(frames) {
                Some(elapsed) if elapsed > 0.0 => small_count as f64 / elapsed,
                _ => 0.0,
            }
        } else {
            0.0
        };

        FidgetingResult {
            detected,
            small_movement_count: small_count as u32,
            frequency_hz,
            percent_of_frames: small_count as f64 / values.len() as f64 * 100.0,
        }
    }

    /// Detect major position changes (standing up, changing seats).
    pub fn detect_position_changes(frames: &[Option<PoseFrame>]) -> Vec<PositionChange> {
        if frames.len() < MIN_FRAMES_FOR_POSITION_CHANGES {
            return Vec::new();
        }

        let displacements = pairwise_displacements(frames);
        if displacements.is_empty() {
            return Vec::new();
        }

        let values: Vec<f64> = displacements.iter().map(|d| d.value).collect();
        let change_threshold = mean(&values) * POSITION_CHANGE_FACTOR;

        displacements
            .iter()
            .enumerate()
            .filter(|(_, d)| d.value > change_threshold)
            .map(|(index, d)| PositionChange {
                timestamp: d.timestamp,
                displacement: d.value,
                frame_index: index,
            })
            .collect()
    }

    /// Re-derive the status of a result against a caller-supplied baseline
    /// (e.g. the classroom average movement score).
    pub fn apply_baseline(result: &MovementResult, baseline_score: f64) -> MovementResult {
        let rules = [
            (Band::Above(0.2), MovementStatus::Elevated),
            (Band::Above(0.1), MovementStatus::AboveBaseline),
            (Band::Below(-0.1), MovementStatus::BelowBaseline),
        ];
        let (deviation, status) = classify_deviation(
            result.intensity_score,
            baseline_score,
            &rules,
            MovementStatus::Normal,
        );

        MovementResult {
            status,
            baseline_deviation: Some(deviation),
            ..result.clone()
        }
    }

    /// The defined result for sequences with no usable movement data
    fn empty_result(config: &EngineConfig) -> MovementResult {
        MovementResult {
            intensity_score: 0.0,
            threshold: config.movement_threshold,
            status: MovementStatus::NoData,
            significant_movements: 0,
            time_window_sec: 0,
            baseline_deviation: None,
            metrics: MovementMetrics {
                average_displacement: 0.0,
                max_displacement: 0.0,
                std_displacement: 0.0,
                movement_velocity: 0.0,
                total_frames: 0,
            },
        }
    }
}

struct Displacement {
    value: f64,
    /// Timestamp of the later frame of the pair
    timestamp: f64,
}

/// Displacements for every consecutive pair of present frames.
///
/// Absent entries break pairs: they contribute no displacement and no time
/// delta. A present frame whose torso center is unresolvable still pairs,
/// contributing a zero displacement (absence is data, not error).
fn pairwise_displacements(frames: &[Option<PoseFrame>]) -> Vec<Displacement> {
    frames
        .windows(2)
        .filter_map(|pair| match (&pair[0], &pair[1]) {
            (Some(a), Some(b)) => Some(Displacement {
                value: geometry::displacement(a, b),
                timestamp: b.timestamp,
            }),
            _ => None,
        })
        .collect()
}

/// Time from the first to the last present frame
fn elapsed_seconds(frames: &[Option<PoseFrame>]) -> Option<f64> {
    let mut present = frames.iter().flatten();
    let first = present.next()?;
    let last = present.last().unwrap_or(first);
    Some(last.timestamp - first.timestamp)
}
