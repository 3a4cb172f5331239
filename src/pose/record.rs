use serde::Deserialize;

use crate::analysis::{FrameSample, Landmark, Pose};

/// One JSON line emitted by the pose command.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PoseRecord {
    Header {
        fps: f64,
        #[serde(default)]
        frame_count: Option<u64>,
    },
    Frame {
        index: u64,
        #[serde(default)]
        landmarks: Option<Vec<Landmark>>,
    },
}

impl PoseRecord {
    pub fn parse(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line)
    }
}

impl From<(u64, Option<Vec<Landmark>>)> for FrameSample {
    fn from((index, landmarks): (u64, Option<Vec<Landmark>>)) -> Self {
        FrameSample {
            index,
            // An empty detection list means no person was found.
            pose: landmarks.filter(|l| !l.is_empty()).map(Pose::new),
        }
    }
}
