use thiserror::Error;

use crate::pose::PoseError;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("invalid sampling: {0}")]
    InvalidSampling(String),
    #[error("no pose model available")]
    PoseModelUnavailable,
    #[error("pose extraction failed: {0}")]
    Pose(#[from] PoseError),
}
