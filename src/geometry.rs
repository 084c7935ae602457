//! Pose geometry utilities
//!
//! Derives torso-center position and head-orientation angles from a single
//! keypoint frame. Absent keypoints are data, not errors: every function
//! here returns a defined value when landmarks are missing or occluded.

use crate::types::{keypoint_index, HeadOrientation, Keypoint, PoseFrame};

/// Keypoints averaged into the torso center
const TORSO_KEYPOINTS: [usize; 4] = [
    keypoint_index::LEFT_SHOULDER,
    keypoint_index::RIGHT_SHOULDER,
    keypoint_index::LEFT_HIP,
    keypoint_index::RIGHT_HIP,
];

/// Guard added to near-zero angle denominators
const ANGLE_EPSILON: f64 = 0.001;

/// Fixed reference scale for pitch; a coarse approximation independent of
/// measured head size
const PITCH_REFERENCE_SCALE: f64 = 0.1;

/// Mean (x, y) of the visible shoulder/hip keypoints, the movement proxy
/// for the whole body. `None` when no torso keypoint is visible.
pub fn torso_center(frame: &PoseFrame) -> Option<(f64, f64)> {
    let mut sum_x = 0.0;
    let mut sum_y = 0.0;
    let mut count = 0usize;

    for &index in &TORSO_KEYPOINTS {
        if let Some(kp) = frame.keypoints.get(index) {
            if kp.is_visible() {
                sum_x += kp.x;
                sum_y += kp.y;
                count += 1;
            }
        }
    }

    if count == 0 {
        return None;
    }
    Some((sum_x / count as f64, sum_y / count as f64))
}

/// Euclidean distance between the torso centers of two frames.
/// 0.0 when either center is absent.
pub fn displacement(a: &PoseFrame, b: &PoseFrame) -> f64 {
    match (torso_center(a), torso_center(b)) {
        (Some((ax, ay)), Some((bx, by))) => {
            let dx = bx - ax;
            let dy = by - ay;
            (dx * dx + dy * dy).sqrt()
        }
        _ => 0.0,
    }
}

/// Head orientation estimated from nose and ear keypoints.
///
/// Yaw comes from the nose offset relative to the ear midpoint, normalized
/// by inter-ear distance; pitch from the nose's vertical offset against the
/// fixed reference scale; roll from the angle of the ear-to-ear line.
/// `None` when the nose or either ear is not visible.
pub fn head_orientation(frame: &PoseFrame) -> Option<HeadOrientation> {
    let nose = visible_keypoint(frame, keypoint_index::NOSE)?;
    let left_ear = visible_keypoint(frame, keypoint_index::LEFT_EAR)?;
    let right_ear = visible_keypoint(frame, keypoint_index::RIGHT_EAR)?;

    let ear_dx = right_ear.x - left_ear.x;
    let ear_mid_x = (left_ear.x + right_ear.x) / 2.0;
    let yaw = (nose.x - ear_mid_x)
        .atan2(ear_dx.abs() + ANGLE_EPSILON)
        .to_degrees();

    let ear_mid_y = (left_ear.y + right_ear.y) / 2.0;
    let pitch = (nose.y - ear_mid_y)
        .atan2(PITCH_REFERENCE_SCALE)
        .to_degrees();

    let roll = (right_ear.y - left_ear.y)
        .atan2(ear_dx + ANGLE_EPSILON)
        .to_degrees();

    Some(HeadOrientation { yaw, pitch, roll })
}

/// Whether the head is within the forward-facing tolerance.
/// False, not an error, when the orientation cannot be resolved.
pub fn is_on_task(frame: &PoseFrame, yaw_threshold: f64, pitch_threshold: f64) -> bool {
    match head_orientation(frame) {
        Some(orientation) => {
            orientation.yaw.abs() <= yaw_threshold && orientation.pitch.abs() <= pitch_threshold
        }
        None => false,
    }
}

fn visible_keypoint(frame: &PoseFrame, index: usize) -> Option<&Keypoint> {
    frame.keypoints.get(index).filter(|kp| kp.is_visible())
}
