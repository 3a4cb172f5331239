use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("failed to run ffprobe: {0}")]
    Io(#[from] std::io::Error),
    #[error("ffprobe exited with {status}: {stderr}")]
    Exit { status: String, stderr: String },
    #[error("invalid ffprobe output: {0}")]
    Json(#[from] serde_json::Error),
    #[error("no video stream found")]
    NoVideoStream,
}
