use thiserror::Error;

#[derive(Debug, Error)]
pub enum PoseError {
    #[error("failed to start pose command '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("pose output read error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid pose record on line {line}: {message}")]
    InvalidRecord { line: usize, message: String },
    #[error("pose command produced no header")]
    MissingHeader,
    #[error("pose command exited with status {0}")]
    Exit(String),
}
