//! Pose sequence adapter
//!
//! Parses pose sequence JSON and enforces the input contract before any
//! frame reaches the analysis engine: fixed keypoint arity, monotonically
//! non-decreasing timestamps, finite values, one subject per sequence.
//! Everything past this boundary treats absence as data, never as error.

use crate::error::EngineError;
use crate::types::{PoseFrame, PoseSequence, KEYPOINT_COUNT};

/// Parse a pose sequence from JSON and validate the contract.
///
/// The wire format is an array of frames, with `null` entries marking
/// sampled instants where no pose was detected.
pub fn parse_sequence(json: &str) -> Result<PoseSequence, EngineError> {
    let frames: PoseSequence = serde_json::from_str(json)
        .map_err(|e| EngineError::ParseError(format!("Failed to parse pose sequence: {}", e)))?;
    validate_sequence(&frames)?;
    Ok(frames)
}

/// Validate an already-constructed sequence against the input contract.
pub fn validate_sequence(frames: &[Option<PoseFrame>]) -> Result<(), EngineError> {
    let mut previous_timestamp: Option<f64> = None;
    let mut subject_id: Option<u32> = None;

    for (index, frame) in frames.iter().enumerate() {
        let Some(frame) = frame else {
            continue;
        };

        validate_frame(frame, index)?;

        if let Some(previous) = previous_timestamp {
            if frame.timestamp < previous {
                return Err(EngineError::InvalidSequence(format!(
                    "non-monotonic timestamp at frame {}: {} after {}",
                    index, frame.timestamp, previous
                )));
            }
        }
        previous_timestamp = Some(frame.timestamp);

        match subject_id {
            None => subject_id = Some(frame.subject_id),
            Some(expected) if expected != frame.subject_id => {
                return Err(EngineError::InvalidSequence(format!(
                    "mixed subject ids: frame {} has subject {} in a sequence for subject {}",
                    index, frame.subject_id, expected
                )));
            }
            Some(_) => {}
        }
    }

    Ok(())
}

fn validate_frame(frame: &PoseFrame, index: usize) -> Result<(), EngineError> {
    if frame.keypoints.len() != KEYPOINT_COUNT {
        return Err(EngineError::InvalidSequence(format!(
            "frame {} has {} keypoints, expected {}",
            index,
            frame.keypoints.len(),
            KEYPOINT_COUNT
        )));
    }

    if !frame.timestamp.is_finite() {
        return Err(EngineError::InvalidSequence(format!(
            "frame {} has a non-finite timestamp",
            index
        )));
    }

    for (kp_index, kp) in frame.keypoints.iter().enumerate() {
        if !kp.x.is_finite() || !kp.y.is_finite() || !kp.visibility.is_finite() {
            return Err(EngineError::InvalidSequence(format!(
                "frame {} keypoint {} has a non-finite value",
                index, kp_index
            )));
        }
        if !(0.0..=1.0).contains(&kp.visibility) {
            return Err(EngineError::InvalidSequence(format!(
                "frame {} keypoint {} visibility {} outside [0, 1]",
                index, kp_index, kp.visibility
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::forward_frame;
    use pretty_assertions::assert_eq;

    fn sequence_json(frames: &PoseSequence) -> String {
        serde_json::to_string(frames).unwrap()
    }

    #[test]
    fn test_parse_round_trip_with_gaps() {
        let frames: PoseSequence = vec![
            Some(forward_frame(0.0, 0.5, 0.5)),
            None,
            Some(forward_frame(2.0, 0.5, 0.5)),
        ];
        let parsed = parse_sequence(&sequence_json(&frames)).unwrap();
        assert_eq!(parsed, frames);
    }

    #[test]
    fn test_rejects_malformed_json() {
        assert!(parse_sequence("not json").is_err());
        assert!(parse_sequence(r#"{"frames": 1}"#).is_err());
    }

    #[test]
    fn test_rejects_wrong_arity() {
        let mut frame = forward_frame(0.0, 0.5, 0.5);
        frame.keypoints.truncate(17);
        let result = parse_sequence(&sequence_json(&vec![Some(frame)]));
        let err = result.unwrap_err().to_string();
        assert!(err.contains("17 keypoints"));
    }

    #[test]
    fn test_rejects_non_monotonic_timestamps() {
        let frames = vec![
            Some(forward_frame(5.0, 0.5, 0.5)),
            Some(forward_frame(4.0, 0.5, 0.5)),
        ];
        let result = validate_sequence(&frames);
        assert!(result.is_err());
    }

    #[test]
    fn test_equal_timestamps_allowed() {
        // Non-decreasing, not strictly increasing
        let frames = vec![
            Some(forward_frame(1.0, 0.5, 0.5)),
            Some(forward_frame(1.0, 0.5, 0.5)),
        ];
        assert!(validate_sequence(&frames).is_ok());
    }

    #[test]
    fn test_gap_does_not_break_monotonicity_check() {
        let frames = vec![
            Some(forward_frame(0.0, 0.5, 0.5)),
            None,
            Some(forward_frame(1.0, 0.5, 0.5)),
        ];
        assert!(validate_sequence(&frames).is_ok());
    }

    #[test]
    fn test_rejects_mixed_subjects() {
        let mut second = forward_frame(1.0, 0.5, 0.5);
        second.subject_id = 7;
        let frames = vec![Some(forward_frame(0.0, 0.5, 0.5)), Some(second)];
        let result = validate_sequence(&frames);
        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_visibility_out_of_range() {
        let mut frame = forward_frame(0.0, 0.5, 0.5);
        frame.keypoints[3].visibility = 1.2;
        assert!(validate_sequence(&[Some(frame)]).is_err());
    }

    #[test]
    fn test_rejects_non_finite_values() {
        let mut frame = forward_frame(0.0, 0.5, 0.5);
        frame.keypoints[0].x = f64::NAN;
        assert!(validate_sequence(&[Some(frame)]).is_err());

        let mut frame = forward_frame(0.0, 0.5, 0.5);
        frame.timestamp = f64::INFINITY;
        assert!(validate_sequence(&[Some(frame)]).is_err());
    }

    #[test]
    fn test_empty_sequence_is_valid() {
        assert!(validate_sequence(&[]).is_ok());
        assert!(validate_sequence(&[None, None]).is_ok());
    }
}
