mod error;
mod probe;

pub use error::ProbeError;
pub use probe::{VideoInfo, VideoProbe, DEFAULT_FPS};
