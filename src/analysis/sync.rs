//! Frame-by-frame alignment of a user swing against a reference swing.

use serde::{Deserialize, Serialize};

use super::key_poses::{detect_key_poses, find_kind, time_offset_ms, KeyPose, KeyPoseKind, TimedPose};

/// Reference frame shown alongside a given user frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncMapping {
    pub user_frame: usize,
    pub reference_frame: usize,
}

/// Key poses of both swings and how to line them up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
    pub user_key_poses: Vec<KeyPose>,
    pub reference_key_poses: Vec<KeyPose>,
    pub time_offset_ms: f64,
    pub mapping: Vec<SyncMapping>,
}

pub fn compare_swings(user: &[TimedPose], reference: &[TimedPose]) -> SyncReport {
    let user_key_poses = detect_key_poses(user);
    let reference_key_poses = detect_key_poses(reference);
    log::debug!(
        "Key poses: {} in user swing, {} in reference swing",
        user_key_poses.len(),
        reference_key_poses.len()
    );

    let mapping = movement_sync_mapping(
        &user_key_poses,
        &reference_key_poses,
        user.len(),
        reference.len(),
    );
    let time_offset_ms = time_offset_ms(&user_key_poses, &reference_key_poses);

    SyncReport {
        user_key_poses,
        reference_key_poses,
        time_offset_ms,
        mapping,
    }
}

/// Stretches the reference evenly over the user frames.
pub fn linear_mapping(user_len: usize, reference_len: usize) -> Vec<SyncMapping> {
    if reference_len == 0 {
        return Vec::new();
    }
    let last_reference = reference_len - 1;
    (0..user_len)
        .map(|user_frame| {
            let progress = if user_len > 1 {
                user_frame as f64 / (user_len - 1) as f64
            } else {
                0.0
            };
            let reference_frame = (progress * last_reference as f64).round() as usize;
            SyncMapping {
                user_frame,
                reference_frame: reference_frame.min(last_reference),
            }
        })
        .collect()
}

/// Piecewise-linear mapping between phases both swings share. Falls back to
/// [`linear_mapping`] when no consecutive pair of phases is shared.
pub fn movement_sync_mapping(
    user: &[KeyPose],
    reference: &[KeyPose],
    user_len: usize,
    reference_len: usize,
) -> Vec<SyncMapping> {
    if reference_len == 0 {
        return Vec::new();
    }
    let last_reference = reference_len - 1;

    let segments: Vec<(usize, usize, usize, usize)> = KeyPoseKind::SEQUENCE
        .windows(2)
        .filter_map(|pair| {
            Some((
                find_kind(user, pair[0])?.frame_index,
                find_kind(user, pair[1])?.frame_index,
                find_kind(reference, pair[0])?.frame_index,
                find_kind(reference, pair[1])?.frame_index,
            ))
        })
        .collect();
    if segments.is_empty() {
        return linear_mapping(user_len, reference_len);
    }

    let mut mapping = Vec::new();
    for (user_start, user_end, ref_start, ref_end) in segments {
        if user_end < user_start {
            continue;
        }
        let user_span = user_end - user_start;
        let ref_span = ref_end as f64 - ref_start as f64;
        for step in 0..=user_span {
            let progress = if user_span > 0 {
                step as f64 / user_span as f64
            } else {
                0.0
            };
            let reference_frame = (ref_start as f64 + progress * ref_span).round().max(0.0) as usize;
            mapping.push(SyncMapping {
                user_frame: user_start + step,
                reference_frame: reference_frame.min(last_reference),
            });
        }
    }
    let Some(&last) = mapping.last() else {
        return linear_mapping(user_len, reference_len);
    };

    // Frames before the first phase hold the first reference frame, frames
    // after the last segment advance it by one.
    let first_user_frame = mapping.iter().map(|m| m.user_frame).min().unwrap_or(0);
    mapping.extend((0..first_user_frame).map(|user_frame| SyncMapping {
        user_frame,
        reference_frame: 0,
    }));
    let trailing = (last.reference_frame + 1).min(last_reference);
    mapping.extend((last.user_frame + 1..user_len).map(|user_frame| SyncMapping {
        user_frame,
        reference_frame: trailing,
    }));

    mapping.sort_by_key(|m| m.user_frame);
    mapping.dedup_by_key(|m| m.user_frame);
    mapping
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::types::{Landmark, Pose, PoseLandmark};

    fn key(frame_index: usize, kind: KeyPoseKind) -> KeyPose {
        KeyPose {
            frame_index,
            kind,
            timestamp_ms: frame_index as f64 * 100.0,
            confidence: 1.0,
        }
    }

    fn reference_frames(mapping: &[SyncMapping]) -> Vec<usize> {
        mapping.iter().map(|m| m.reference_frame).collect()
    }

    #[test]
    fn linear_mapping_spreads_evenly() {
        assert_eq!(reference_frames(&linear_mapping(5, 3)), vec![0, 1, 1, 2, 2]);
        assert_eq!(reference_frames(&linear_mapping(1, 3)), vec![0]);
        assert!(linear_mapping(4, 0).is_empty());
    }

    #[test]
    fn maps_each_shared_phase_segment() {
        let user = vec![
            key(0, KeyPoseKind::Preparation),
            key(3, KeyPoseKind::BackswingPeak),
            key(5, KeyPoseKind::BallContact),
            key(7, KeyPoseKind::FollowThrough),
            key(9, KeyPoseKind::Finish),
        ];
        let reference = vec![
            key(0, KeyPoseKind::Preparation),
            key(2, KeyPoseKind::BackswingPeak),
            key(4, KeyPoseKind::BallContact),
            key(8, KeyPoseKind::FollowThrough),
            key(10, KeyPoseKind::Finish),
        ];
        let mapping = movement_sync_mapping(&user, &reference, 12, 11);
        let user_frames: Vec<usize> = mapping.iter().map(|m| m.user_frame).collect();
        assert_eq!(user_frames, (0..12).collect::<Vec<_>>());
        assert_eq!(
            reference_frames(&mapping),
            vec![0, 1, 1, 2, 3, 4, 6, 8, 9, 10, 10, 10]
        );
    }

    #[test]
    fn leading_frames_hold_first_reference_frame() {
        let user = vec![
            key(2, KeyPoseKind::BallContact),
            key(4, KeyPoseKind::FollowThrough),
            key(5, KeyPoseKind::Finish),
        ];
        let reference = vec![
            key(1, KeyPoseKind::BallContact),
            key(3, KeyPoseKind::FollowThrough),
            key(4, KeyPoseKind::Finish),
        ];
        let mapping = movement_sync_mapping(&user, &reference, 6, 5);
        assert_eq!(reference_frames(&mapping), vec![0, 0, 1, 2, 3, 4]);
    }

    #[test]
    fn unmatched_phases_fall_back_to_linear() {
        let user = vec![key(2, KeyPoseKind::BallContact)];
        let reference = vec![key(1, KeyPoseKind::Finish)];
        assert_eq!(
            movement_sync_mapping(&user, &reference, 5, 3),
            linear_mapping(5, 3)
        );
    }

    #[test]
    fn identical_swings_share_phases() {
        let frames: Vec<TimedPose> = [0.0, 0.0, 0.1, 0.5, 0.9, 0.95, 0.95]
            .iter()
            .enumerate()
            .map(|(i, &x)| {
                let mut landmarks = vec![Landmark::new(0.5, 0.5); 17];
                landmarks[PoseLandmark::RightWrist as usize] = Landmark::new(x, 0.6);
                TimedPose {
                    timestamp_ms: i as f64 * 100.0,
                    pose: Some(Pose::new(landmarks)),
                }
            })
            .collect();

        let report = compare_swings(&frames, &frames);
        assert!(!report.user_key_poses.is_empty());
        assert_eq!(report.user_key_poses, report.reference_key_poses);
        assert_eq!(report.time_offset_ms, 0.0);
        // Preparation at frame 0 has no shared successor, so mapping starts
        // at contact (frame 3) and the frames before it hold frame 0.
        assert_eq!(reference_frames(&report.mapping), vec![0, 0, 0, 3, 4, 5, 6]);
    }
}
