//! Per-frame landmark post-processing.
//!
//! Frames are folded one at a time into a [`LandmarkAccumulator`], so the
//! frame source can be a lazy stream that is read exactly once.

use super::geometry::{elbow_angle, shoulder_rotation, DEFAULT_ELBOW_ANGLE_DEG};
use super::types::{FrameSample, Pose, TempoPoint};

const TEMPO_SCALE: f64 = 1000.0;

/// Metric channels extracted from the sampled frames.
#[derive(Debug, Clone, PartialEq)]
pub struct LandmarkMetrics {
    pub elbow_angle_max: f64,
    pub shoulder_rotation_proxy: f64,
    pub tempo_series: Vec<TempoPoint>,
    pub frames_used: u64,
}

/// Number of decoded frames between two samples.
pub fn frame_interval(sample_ms: u32, fps: f64) -> u64 {
    let interval = (sample_ms as f64 / 1000.0 * fps).round();
    if interval.is_finite() && interval >= 1.0 {
        interval as u64
    } else {
        1
    }
}

#[derive(Debug)]
pub struct LandmarkAccumulator {
    fps: f64,
    interval: u64,
    previous: Option<Pose>,
    elbow_angle_max: Option<f64>,
    rotation_sum: f64,
    detected: u64,
    tempo_series: Vec<TempoPoint>,
}

impl LandmarkAccumulator {
    pub fn new(fps: f64, sample_ms: u32) -> Self {
        Self {
            fps,
            interval: frame_interval(sample_ms, fps),
            previous: None,
            elbow_angle_max: None,
            rotation_sum: 0.0,
            detected: 0,
            tempo_series: Vec::new(),
        }
    }

    /// Feeds one decoded frame. Frames off the sampling grid are skipped.
    pub fn push(&mut self, frame: FrameSample) {
        if frame.index % self.interval != 0 {
            return;
        }

        let timestamp_ms = frame.timestamp_ms(self.fps);
        let Some(pose) = frame.pose else {
            self.tempo_series.push(TempoPoint::new(timestamp_ms, 0.0));
            return;
        };

        let angle = elbow_angle(&pose);
        self.elbow_angle_max = Some(match self.elbow_angle_max {
            Some(max) => max.max(angle),
            None => angle,
        });
        self.rotation_sum += shoulder_rotation(&pose);

        let tempo = self
            .previous
            .as_ref()
            .map(|previous| pose.displacement_from(previous) * TEMPO_SCALE)
            .unwrap_or(0.0);
        self.tempo_series.push(TempoPoint::new(timestamp_ms, tempo));

        self.previous = Some(pose);
        self.detected += 1;
    }

    /// Undetected frames contribute nothing to the angle maximum or the
    /// rotation mean, unlike the earlier Python analyzer, which averaged in
    /// its 90 and 0 degree placeholders.
    pub fn finish(self) -> LandmarkMetrics {
        let shoulder_rotation_proxy = if self.detected > 0 {
            self.rotation_sum / self.detected as f64
        } else {
            0.0
        };

        LandmarkMetrics {
            elbow_angle_max: self.elbow_angle_max.unwrap_or(DEFAULT_ELBOW_ANGLE_DEG),
            shoulder_rotation_proxy,
            tempo_series: self.tempo_series,
            frames_used: self.detected,
        }
    }
}

/// Runs the post-processor over a frame stream, stopping at the first error.
pub fn process_frames<I, E>(frames: I, fps: f64, sample_ms: u32) -> Result<LandmarkMetrics, E>
where
    I: IntoIterator<Item = Result<FrameSample, E>>,
{
    let accumulator = frames.into_iter().try_fold(
        LandmarkAccumulator::new(fps, sample_ms),
        |mut acc, frame| {
            acc.push(frame?);
            Ok(acc)
        },
    )?;
    Ok(accumulator.finish())
}
