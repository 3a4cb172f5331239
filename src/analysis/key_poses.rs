//! Key phases of a single swing, found from right-wrist speed and elbow bend.

use serde::{Deserialize, Serialize};
use strum_macros::Display;

use super::geometry::joint_angle;
use super::landmarks::frame_interval;
use super::types::{FrameSample, Pose, PoseLandmark};

const PREPARATION_SPEED_RATIO: f64 = 0.1;
const FOLLOW_THROUGH_SPEED_RATIO: f64 = 0.3;
/// Frames before contact searched for the backswing peak.
const BACKSWING_WINDOW: usize = 15;
const CONTACT_OFFSET_WEIGHT: f64 = 3.0;

/// A sampled frame placed on the media timeline.
#[derive(Debug, Clone, PartialEq)]
pub struct TimedPose {
    pub timestamp_ms: f64,
    pub pose: Option<Pose>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum KeyPoseKind {
    Preparation,
    BackswingPeak,
    BallContact,
    FollowThrough,
    Finish,
}

impl KeyPoseKind {
    /// Swing phases in the order they occur.
    pub const SEQUENCE: [KeyPoseKind; 5] = [
        KeyPoseKind::Preparation,
        KeyPoseKind::BackswingPeak,
        KeyPoseKind::BallContact,
        KeyPoseKind::FollowThrough,
        KeyPoseKind::Finish,
    ];

    fn confidence(self) -> f64 {
        match self {
            KeyPoseKind::Preparation => 0.7,
            KeyPoseKind::BackswingPeak => 0.8,
            KeyPoseKind::BallContact => 0.9,
            KeyPoseKind::FollowThrough => 0.75,
            KeyPoseKind::Finish => 0.6,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyPose {
    pub frame_index: usize,
    #[serde(rename = "type")]
    pub kind: KeyPoseKind,
    pub timestamp_ms: f64,
    pub confidence: f64,
}

impl KeyPose {
    fn at(frames: &[TimedPose], frame_index: usize, kind: KeyPoseKind) -> Self {
        Self {
            frame_index,
            kind,
            timestamp_ms: frames[frame_index].timestamp_ms,
            confidence: kind.confidence(),
        }
    }
}

/// Keeps the frames on the sampling grid, in stream order.
pub fn sample_poses<I, E>(frames: I, fps: f64, sample_ms: u32) -> Result<Vec<TimedPose>, E>
where
    I: IntoIterator<Item = Result<FrameSample, E>>,
{
    let interval = frame_interval(sample_ms, fps);
    let mut sampled = Vec::new();
    for frame in frames {
        let frame = frame?;
        if frame.index % interval == 0 {
            sampled.push(TimedPose {
                timestamp_ms: frame.timestamp_ms(fps),
                pose: frame.pose,
            });
        }
    }
    Ok(sampled)
}

/// Right-wrist speed at `index` by central difference, in normalized units
/// per second. Zero at the ends or when any wrist is hidden.
fn wrist_speed(frames: &[TimedPose], index: usize) -> f64 {
    if index == 0 || index + 1 >= frames.len() {
        return 0.0;
    }

    let wrist = |i: usize| {
        frames[i]
            .pose
            .as_ref()
            .and_then(|pose| pose.visible(PoseLandmark::RightWrist))
    };
    let (Some(prev), Some(_), Some(next)) = (wrist(index - 1), wrist(index), wrist(index + 1))
    else {
        return 0.0;
    };

    let dt = (frames[index + 1].timestamp_ms - frames[index - 1].timestamp_ms) / 1000.0;
    if dt == 0.0 {
        return 0.0;
    }
    prev.distance_to(next) / dt
}

/// Elbow angle from visible, non-degenerate arm segments only.
fn visible_elbow_angle(pose: &Pose) -> Option<f64> {
    let shoulder = pose.visible(PoseLandmark::RightShoulder)?;
    let elbow = pose.visible(PoseLandmark::RightElbow)?;
    let wrist = pose.visible(PoseLandmark::RightWrist)?;
    if elbow.distance_to(shoulder) == 0.0 || elbow.distance_to(wrist) == 0.0 {
        return None;
    }
    joint_angle(shoulder, elbow, wrist)
}

/// Finds the swing phases, ordered by frame. Empty when the wrist never moves.
pub fn detect_key_poses(frames: &[TimedPose]) -> Vec<KeyPose> {
    let speeds: Vec<f64> = (0..frames.len()).map(|i| wrist_speed(frames, i)).collect();

    let (contact, peak) = speeds
        .iter()
        .copied()
        .enumerate()
        .fold((0, 0.0), |best, (i, speed)| if speed > best.1 { (i, speed) } else { best });
    if peak <= 0.0 {
        return Vec::new();
    }

    let mut key_poses = vec![KeyPose::at(frames, contact, KeyPoseKind::BallContact)];

    if let Some(i) = speeds[..contact]
        .iter()
        .position(|&s| s < peak * PREPARATION_SPEED_RATIO)
    {
        key_poses.push(KeyPose::at(frames, i, KeyPoseKind::Preparation));
    }

    let window = contact.saturating_sub(BACKSWING_WINDOW)..contact;
    let backswing = window
        .filter_map(|i| {
            let angle = frames[i].pose.as_ref().and_then(visible_elbow_angle)?;
            (angle > 0.0 && angle < 180.0).then_some((i, angle))
        })
        .fold(None, |best: Option<(usize, f64)>, (i, angle)| match best {
            Some((_, min)) if min <= angle => best,
            _ => Some((i, angle)),
        });
    if let Some((i, _)) = backswing {
        key_poses.push(KeyPose::at(frames, i, KeyPoseKind::BackswingPeak));
    }

    if let Some(offset) = speeds[contact + 1..]
        .iter()
        .position(|&s| s < peak * FOLLOW_THROUGH_SPEED_RATIO)
    {
        key_poses.push(KeyPose::at(frames, contact + 1 + offset, KeyPoseKind::FollowThrough));
    }

    key_poses.push(KeyPose::at(frames, frames.len() - 1, KeyPoseKind::Finish));

    key_poses.sort_by_key(|k| k.frame_index);
    key_poses
}

pub(crate) fn find_kind(key_poses: &[KeyPose], kind: KeyPoseKind) -> Option<&KeyPose> {
    key_poses.iter().find(|k| k.kind == kind)
}

/// Weighted mean of the per-phase timestamp differences (user minus
/// reference), in milliseconds. Ball contact counts three times. Zero when
/// no phase appears in both swings.
pub fn time_offset_ms(user: &[KeyPose], reference: &[KeyPose]) -> f64 {
    let (weighted_sum, total_weight) = KeyPoseKind::SEQUENCE
        .iter()
        .filter_map(|&kind| {
            let user_pose = find_kind(user, kind)?;
            let reference_pose = find_kind(reference, kind)?;
            let weight = if kind == KeyPoseKind::BallContact {
                CONTACT_OFFSET_WEIGHT
            } else {
                1.0
            };
            Some((user_pose.timestamp_ms - reference_pose.timestamp_ms, weight))
        })
        .fold((0.0, 0.0), |(sum, total), (offset, weight)| {
            (sum + offset * weight, total + weight)
        });

    if total_weight == 0.0 {
        log::debug!("No key poses matched, using zero offset");
        return 0.0;
    }
    weighted_sum / total_weight
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::types::Landmark;
    use std::convert::Infallible;

    const WRIST_X: [f64; 10] = [0.0, 0.0, 0.0, 0.01, 0.1, 0.5, 0.9, 0.95, 0.96, 0.96];

    fn arm(elbow: (f64, f64), wrist_x: f64) -> Pose {
        let mut landmarks = vec![Landmark::new(0.5, 0.5); 17];
        landmarks[PoseLandmark::RightShoulder as usize] = Landmark::new(0.5, 0.2);
        landmarks[PoseLandmark::RightElbow as usize] = Landmark::new(elbow.0, elbow.1);
        landmarks[PoseLandmark::RightWrist as usize] = Landmark::new(wrist_x, 0.6);
        Pose::new(landmarks)
    }

    /// A forehand sampled every 100 ms with the elbow most bent at frame 3.
    fn swing() -> Vec<TimedPose> {
        WRIST_X
            .iter()
            .enumerate()
            .map(|(i, &x)| {
                let elbow = if i == 3 { (0.2, 0.9) } else { (0.5, 0.4) };
                TimedPose {
                    timestamp_ms: i as f64 * 100.0,
                    pose: Some(arm(elbow, x)),
                }
            })
            .collect()
    }

    fn key(frame_index: usize, kind: KeyPoseKind, timestamp_ms: f64) -> KeyPose {
        KeyPose {
            frame_index,
            kind,
            timestamp_ms,
            confidence: kind.confidence(),
        }
    }

    #[test]
    fn finds_every_phase_in_order() {
        let key_poses = detect_key_poses(&swing());
        let found: Vec<(usize, KeyPoseKind)> =
            key_poses.iter().map(|k| (k.frame_index, k.kind)).collect();
        assert_eq!(
            found,
            vec![
                (0, KeyPoseKind::Preparation),
                (3, KeyPoseKind::BackswingPeak),
                (5, KeyPoseKind::BallContact),
                (7, KeyPoseKind::FollowThrough),
                (9, KeyPoseKind::Finish),
            ]
        );
        assert_eq!(key_poses[2].timestamp_ms, 500.0);
        assert_eq!(key_poses[2].confidence, 0.9);
    }

    #[test]
    fn hidden_wrist_is_ignored() {
        let mut frames = swing();
        if let Some(pose) = frames[5].pose.as_mut() {
            pose.landmarks[PoseLandmark::RightWrist as usize].visibility = Some(0.2);
        }
        let contact = find_kind(&detect_key_poses(&frames), KeyPoseKind::BallContact).copied();
        assert_eq!(contact.map(|k| k.frame_index), Some(3));
    }

    #[test]
    fn still_or_missing_poses_have_no_key_poses() {
        let still: Vec<TimedPose> = (0..5)
            .map(|i| TimedPose {
                timestamp_ms: i as f64 * 100.0,
                pose: Some(arm((0.5, 0.4), 0.3)),
            })
            .collect();
        assert!(detect_key_poses(&still).is_empty());

        let missing: Vec<TimedPose> = (0..5)
            .map(|i| TimedPose {
                timestamp_ms: i as f64 * 100.0,
                pose: None,
            })
            .collect();
        assert!(detect_key_poses(&missing).is_empty());
        assert!(detect_key_poses(&[]).is_empty());
    }

    #[test]
    fn offset_weights_ball_contact() {
        let user = vec![
            key(1, KeyPoseKind::Preparation, 100.0),
            key(5, KeyPoseKind::BallContact, 500.0),
            key(9, KeyPoseKind::Finish, 900.0),
        ];
        let reference = vec![
            key(0, KeyPoseKind::Preparation, 0.0),
            key(2, KeyPoseKind::BallContact, 200.0),
            key(7, KeyPoseKind::Finish, 700.0),
            key(4, KeyPoseKind::FollowThrough, 400.0),
        ];
        assert!((time_offset_ms(&user, &reference) - 240.0).abs() < 1e-9);
        assert_eq!(time_offset_ms(&user, &[]), 0.0);
    }

    #[test]
    fn sampling_keeps_grid_frames() {
        let frames: Vec<Result<FrameSample, Infallible>> = (0..7)
            .map(|index| Ok(FrameSample { index, pose: None }))
            .collect();
        let sampled = sample_poses(frames, 30.0, 100).unwrap();
        let times: Vec<f64> = sampled.iter().map(|p| p.timestamp_ms.round()).collect();
        assert_eq!(times, vec![0.0, 100.0, 200.0]);
    }

    #[test]
    fn kinds_serialize_in_snake_case() {
        let json = serde_json::to_value(key(3, KeyPoseKind::BackswingPeak, 300.0)).unwrap();
        assert_eq!(json["type"], "backswing_peak");
        assert_eq!(json["frameIndex"], 3);
        assert_eq!(KeyPoseKind::FollowThrough.to_string(), "follow_through");
    }
}
