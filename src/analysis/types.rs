use serde::{Deserialize, Serialize};

/// Minimum detector confidence for a landmark to be trusted.
pub const VISIBILITY_THRESHOLD: f64 = 0.5;

/// A single pose landmark in normalized image coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f64,
    pub y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<f64>,
}

impl Landmark {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            z: None,
            visibility: None,
        }
    }

    /// Landmarks without a visibility score count as visible.
    pub fn is_visible(&self) -> bool {
        self.visibility.map_or(true, |v| v >= VISIBILITY_THRESHOLD)
    }

    pub fn distance_to(&self, other: &Landmark) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Indices into the 33-point BlazePose landmark layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoseLandmark {
    LeftShoulder = 11,
    RightShoulder = 12,
    RightElbow = 14,
    RightWrist = 16,
}

/// All landmarks detected for one person in one frame, ordered by index.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Pose {
    pub landmarks: Vec<Landmark>,
}

impl Pose {
    pub fn new(landmarks: Vec<Landmark>) -> Self {
        Self { landmarks }
    }

    pub fn get(&self, point: PoseLandmark) -> Option<&Landmark> {
        self.landmarks.get(point as usize)
    }

    pub fn visible(&self, point: PoseLandmark) -> Option<&Landmark> {
        self.get(point).filter(|l| l.is_visible())
    }

    /// Summed displacement of every landmark present in both poses.
    pub fn displacement_from(&self, previous: &Pose) -> f64 {
        self.landmarks
            .iter()
            .zip(previous.landmarks.iter())
            .map(|(current, prev)| current.distance_to(prev))
            .sum()
    }
}

/// One decoded frame and the pose found in it, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameSample {
    pub index: u64,
    pub pose: Option<Pose>,
}

impl FrameSample {
    pub fn timestamp_ms(&self, fps: f64) -> f64 {
        self.index as f64 / fps * 1000.0
    }
}

/// Movement intensity at a point in time. Serialized as `[timestampMs, tempo]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "(f64, f64)", into = "(f64, f64)")]
pub struct TempoPoint {
    pub timestamp_ms: f64,
    pub tempo: f64,
}

impl TempoPoint {
    pub fn new(timestamp_ms: f64, tempo: f64) -> Self {
        Self { timestamp_ms, tempo }
    }
}

impl From<(f64, f64)> for TempoPoint {
    fn from((timestamp_ms, tempo): (f64, f64)) -> Self {
        Self { timestamp_ms, tempo }
    }
}

impl From<TempoPoint> for (f64, f64) {
    fn from(point: TempoPoint) -> Self {
        (point.timestamp_ms, point.tempo)
    }
}

pub(crate) fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
