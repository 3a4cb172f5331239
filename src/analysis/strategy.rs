use std::fmt;
use std::path::Path;

use super::error::AnalysisError;
use super::fallback::synthesize;
use super::key_poses::{sample_poses, TimedPose};
use super::landmarks::process_frames;
use super::result::AnalysisResult;
use crate::capabilities::Capabilities;
use crate::pose::{PoseCommand, PoseStream};
use crate::video::{VideoProbe, DEFAULT_FPS};

/// How a video gets analyzed, chosen once from the detected capabilities.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisStrategy {
    ModelBacked(PoseCommand),
    SyntheticFallback,
}

impl fmt::Display for AnalysisStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalysisStrategy::ModelBacked(_) => write!(f, "pose model"),
            AnalysisStrategy::SyntheticFallback => write!(f, "fallback"),
        }
    }
}

impl AnalysisStrategy {
    pub fn select(capabilities: &Capabilities) -> Self {
        match &capabilities.pose {
            Some(command) => AnalysisStrategy::ModelBacked(command.clone()),
            None => AnalysisStrategy::SyntheticFallback,
        }
    }

    /// Uploads are never decoded, so the HTTP endpoint always synthesizes.
    pub fn for_uploads(capabilities: &Capabilities) -> Self {
        if capabilities.pose.is_some() {
            log::info!("Pose model available, but uploads are not decoded");
        }
        AnalysisStrategy::SyntheticFallback
    }

    pub fn analyze(
        &self,
        video: &Path,
        sample_ms: u32,
        probe: &VideoProbe,
    ) -> Result<AnalysisResult, AnalysisError> {
        check_sampling(sample_ms)?;

        match self {
            AnalysisStrategy::ModelBacked(command) => analyze_with_pose(command, video, sample_ms),
            AnalysisStrategy::SyntheticFallback => {
                let info = probe.probe(video);
                log::info!(
                    "Synthesizing {:.0} ms of tempo data ({} frames at {} fps)",
                    info.duration_ms,
                    info.frame_count,
                    info.fps
                );
                synthesize(info.duration_ms, sample_ms, info.fps)
            }
        }
    }

    /// Sampled poses of one video, for swing comparison. Needs the pose model.
    pub fn sample_poses(&self, video: &Path, sample_ms: u32) -> Result<Vec<TimedPose>, AnalysisError> {
        check_sampling(sample_ms)?;

        match self {
            AnalysisStrategy::ModelBacked(command) => {
                let (stream, fps) = open_stream(command, video, sample_ms)?;
                let poses = sample_poses(stream, fps, sample_ms)?;
                log::info!("Sampled {} frames from {}", poses.len(), video.display());
                Ok(poses)
            }
            AnalysisStrategy::SyntheticFallback => Err(AnalysisError::PoseModelUnavailable),
        }
    }
}

fn check_sampling(sample_ms: u32) -> Result<(), AnalysisError> {
    if sample_ms == 0 {
        return Err(AnalysisError::InvalidSampling(
            "sample interval must be positive".into(),
        ));
    }
    Ok(())
}

fn open_stream(
    command: &PoseCommand,
    video: &Path,
    sample_ms: u32,
) -> Result<(PoseStream, f64), AnalysisError> {
    let stream = PoseStream::open(command, video, sample_ms)?;
    let fps = if stream.fps() > 0.0 {
        stream.fps()
    } else {
        log::warn!("Pose command reported no frame rate, assuming {}", DEFAULT_FPS);
        DEFAULT_FPS
    };
    if let Some(total) = stream.frame_count() {
        log::debug!("Pose command reports {} frames at {} fps", total, fps);
    }
    Ok((stream, fps))
}

fn analyze_with_pose(
    command: &PoseCommand,
    video: &Path,
    sample_ms: u32,
) -> Result<AnalysisResult, AnalysisError> {
    let (stream, fps) = open_stream(command, video, sample_ms)?;

    let metrics = process_frames(stream, fps, sample_ms)?;
    log::info!(
        "Processed {} frames with a detected pose ({} samples)",
        metrics.frames_used,
        metrics.tempo_series.len()
    );

    Ok(AnalysisResult::from_landmarks(metrics, fps, sample_ms))
}
