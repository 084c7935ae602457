//! Shared test fixtures: pose frame builders

use crate::types::{keypoint_index, Keypoint, PoseFrame, KEYPOINT_COUNT};

/// Frame with all keypoints hidden except those explicitly placed
pub(crate) fn frame_with(timestamp: f64, placed: &[(usize, f64, f64, f64)]) -> PoseFrame {
    let mut keypoints = vec![
        Keypoint {
            x: 0.0,
            y: 0.0,
            visibility: 0.0,
        };
        KEYPOINT_COUNT
    ];
    for &(index, x, y, visibility) in placed {
        keypoints[index] = Keypoint { x, y, visibility };
    }
    PoseFrame {
        keypoints,
        timestamp,
        subject_id: 0,
    }
}

/// Frame with a visible torso centered at (x, y) and a forward-facing head
pub(crate) fn forward_frame(timestamp: f64, x: f64, y: f64) -> PoseFrame {
    frame_with(
        timestamp,
        &[
            (keypoint_index::LEFT_SHOULDER, x - 0.1, y - 0.1, 0.9),
            (keypoint_index::RIGHT_SHOULDER, x + 0.1, y - 0.1, 0.9),
            (keypoint_index::LEFT_HIP, x - 0.1, y + 0.1, 0.9),
            (keypoint_index::RIGHT_HIP, x + 0.1, y + 0.1, 0.9),
            (keypoint_index::NOSE, x, y - 0.3, 0.9),
            (keypoint_index::LEFT_EAR, x - 0.05, y - 0.3, 0.9),
            (keypoint_index::RIGHT_EAR, x + 0.05, y - 0.3, 0.9),
        ],
    )
}

/// Frame like [`forward_frame`] but with the head turned well past the
/// default yaw tolerance
pub(crate) fn off_task_frame(timestamp: f64, x: f64, y: f64) -> PoseFrame {
    let mut frame = forward_frame(timestamp, x, y);
    // Push the nose to the right ear: atan2(0.05, 0.101) ~ 26.3 degrees of
    // yaw would still pass, so go past the ear instead (~44.7 degrees).
    frame.keypoints[keypoint_index::NOSE].x = x + 0.1;
    frame
}
