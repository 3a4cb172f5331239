mod error;
mod fallback;
mod geometry;
mod impact;
mod key_poses;
mod landmarks;
mod result;
mod strategy;
mod stroke;
mod sync;
mod types;

pub use error::AnalysisError;
pub use fallback::synthesize;
pub use result::{AnalysisResult, Meta, Metrics, ResultStatus, Summary};
pub use strategy::AnalysisStrategy;
pub use stroke::StrokeGuess;
pub use sync::compare_swings;
pub use types::{FrameSample, Landmark, Pose};
