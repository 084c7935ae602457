//! Run segmentation
//!
//! Converts a boolean-valued signal over an ordered timestamped sequence
//! into contiguous timed runs, filtered by minimum duration. Both focus
//! sessions and distraction events are produced by this one algorithm,
//! parameterized by predicate and threshold.

use crate::types::{PoseFrame, TimedRun};

/// Contiguous runs where the sample value is true.
///
/// A run starts at the first true sample and ends at the last true sample
/// before the signal goes false; a run still open at the end of the
/// sequence closes at the final sample's timestamp. Runs with duration
/// less than or equal to `min_duration` are dropped (strict filter).
///
/// Samples must be ordered by non-decreasing timestamp; output runs are
/// non-overlapping and ordered by start time.
pub fn true_runs(samples: &[(f64, bool)], min_duration: f64) -> Vec<TimedRun> {
    let mut runs = Vec::new();
    let mut run_start: Option<f64> = None;
    let mut last_true = 0.0;

    for &(timestamp, active) in samples {
        if active {
            if run_start.is_none() {
                run_start = Some(timestamp);
            }
            last_true = timestamp;
        } else if let Some(start) = run_start.take() {
            push_run(&mut runs, start, last_true, min_duration);
        }
    }

    if let Some(start) = run_start {
        if let Some(&(last_timestamp, _)) = samples.last() {
            push_run(&mut runs, start, last_timestamp, min_duration);
        }
    }

    runs
}

/// Apply a frame predicate over a gapped sequence and segment the result.
///
/// Absent frames contribute no sample; they neither extend nor break a run
/// on their own.
pub fn segment_frames<F>(frames: &[Option<PoseFrame>], predicate: F, min_duration: f64) -> Vec<TimedRun>
where
    F: Fn(&PoseFrame) -> bool,
{
    let samples: Vec<(f64, bool)> = frames
        .iter()
        .flatten()
        .map(|frame| (frame.timestamp, predicate(frame)))
        .collect();
    true_runs(&samples, min_duration)
}

fn push_run(runs: &mut Vec<TimedRun>, start: f64, end: f64, min_duration: f64) {
    let duration = end - start;
    if duration > min_duration {
        runs.push(TimedRun {
            start_time: start,
            end_time: end,
            duration,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn samples(pattern: &[bool]) -> Vec<(f64, bool)> {
        pattern
            .iter()
            .enumerate()
            .map(|(i, &b)| (i as f64, b))
            .collect()
    }

    #[test]
    fn test_two_runs_with_strict_minimum() {
        // [T,T,T,F,F,T,T] at times 0..=6, min_duration 1.0:
        // first run (0, 2) duration 2 kept; trailing run (5, 6) duration 1
        // dropped by the strict filter.
        let runs = true_runs(&samples(&[true, true, true, false, false, true, true]), 1.0);
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].start_time, 0.0);
        assert_eq!(runs[0].end_time, 2.0);
        assert_eq!(runs[0].duration, 2.0);

        // The same trailing run survives a lower threshold
        let runs = true_runs(&samples(&[true, true, true, false, false, true, true]), 0.5);
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[1].start_time, 5.0);
        assert_eq!(runs[1].end_time, 6.0);
        assert_eq!(runs[1].duration, 1.0);
    }

    #[test]
    fn test_open_run_closes_at_last_sample() {
        let runs = true_runs(&samples(&[false, true, true, true]), 1.0);
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].start_time, 1.0);
        assert_eq!(runs[0].end_time, 3.0);
    }

    #[test]
    fn test_all_false_produces_no_runs() {
        assert!(true_runs(&samples(&[false, false, false]), 0.0).is_empty());
    }

    #[test]
    fn test_empty_input() {
        assert!(true_runs(&[], 1.0).is_empty());
    }

    #[test]
    fn test_single_true_sample_is_zero_duration() {
        // One sample opens and closes a run at the same timestamp
        let runs = true_runs(&[(4.0, true)], 0.0);
        assert!(runs.is_empty());
    }

    #[test]
    fn test_runs_are_ordered_and_disjoint() {
        let pattern = [true, true, false, true, true, false, true, true];
        let runs = true_runs(&samples(&pattern), 0.5);
        assert_eq!(runs.len(), 3);
        for pair in runs.windows(2) {
            assert!(pair[0].end_time < pair[1].start_time);
        }
    }

    #[test]
    fn test_deterministic() {
        let input = samples(&[true, false, true, true, false, true]);
        let first = true_runs(&input, 0.5);
        let second = true_runs(&input, 0.5);
        assert_eq!(first, second);
    }

    #[test]
    fn test_segment_frames_skips_gaps() {
        use crate::testutil::forward_frame;

        // Present frames at t = 0, 1, 3, 4 with a gap at t = 2; the gap does
        // not break the run.
        let frames = vec![
            Some(forward_frame(0.0, 0.5, 0.5)),
            Some(forward_frame(1.0, 0.5, 0.5)),
            None,
            Some(forward_frame(3.0, 0.5, 0.5)),
            Some(forward_frame(4.0, 0.5, 0.5)),
        ];
        let runs = segment_frames(&frames, |_| true, 1.0);
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].start_time, 0.0);
        assert_eq!(runs[0].end_time, 4.0);
    }
}
