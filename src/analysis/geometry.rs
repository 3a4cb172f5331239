//! Joint angles from 2-D landmark positions.

use super::types::{Landmark, Pose, PoseLandmark};

pub const DEFAULT_ELBOW_ANGLE_DEG: f64 = 90.0;
pub const DEFAULT_SHOULDER_ROTATION_DEG: f64 = 0.0;

/// Angle at vertex `b` formed by `a` and `c`, in degrees within [0, 180].
pub fn joint_angle(a: &Landmark, b: &Landmark, c: &Landmark) -> Option<f64> {
    let radians = (c.y - b.y).atan2(c.x - b.x) - (a.y - b.y).atan2(a.x - b.x);
    let mut angle = radians.abs().to_degrees();
    if angle > 180.0 {
        angle = 360.0 - angle;
    }
    angle.is_finite().then_some(angle)
}

/// Right shoulder-elbow-wrist angle, or 90° when it cannot be computed.
pub fn elbow_angle(pose: &Pose) -> f64 {
    let shoulder = pose.get(PoseLandmark::RightShoulder);
    let elbow = pose.get(PoseLandmark::RightElbow);
    let wrist = pose.get(PoseLandmark::RightWrist);

    match (shoulder, elbow, wrist) {
        (Some(a), Some(b), Some(c)) => joint_angle(a, b, c).unwrap_or(DEFAULT_ELBOW_ANGLE_DEG),
        _ => DEFAULT_ELBOW_ANGLE_DEG,
    }
}

/// Tilt of the shoulder line (right minus left), in signed degrees.
pub fn shoulder_line_angle(left: &Landmark, right: &Landmark) -> Option<f64> {
    let dx = right.x - left.x;
    let dy = right.y - left.y;
    let angle = dy.atan2(dx).to_degrees();
    angle.is_finite().then_some(angle)
}

/// Shoulder rotation proxy, or 0° when a shoulder is missing.
pub fn shoulder_rotation(pose: &Pose) -> f64 {
    match (
        pose.get(PoseLandmark::LeftShoulder),
        pose.get(PoseLandmark::RightShoulder),
    ) {
        (Some(left), Some(right)) => {
            shoulder_line_angle(left, right).unwrap_or(DEFAULT_SHOULDER_ROTATION_DEG)
        }
        _ => DEFAULT_SHOULDER_ROTATION_DEG,
    }
}
