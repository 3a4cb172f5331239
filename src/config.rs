use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub web: WebConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub video: VideoConfig,
    #[serde(default)]
    pub pose: Option<PoseConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default = "default_sample_ms")]
    pub sample_ms: u32,
    /// Clip length assumed by the HTTP handler, which never sees a decoded video.
    #[serde(default = "default_http_duration_ms")]
    pub http_duration_ms: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            sample_ms: default_sample_ms(),
            http_duration_ms: default_http_duration_ms(),
        }
    }
}

fn default_sample_ms() -> u32 {
    100
}

fn default_http_duration_ms() -> f64 {
    5000.0
}

#[derive(Debug, Clone, Deserialize)]
pub struct VideoConfig {
    #[serde(default = "default_ffprobe")]
    pub ffprobe: String,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            ffprobe: default_ffprobe(),
        }
    }
}

fn default_ffprobe() -> String {
    "ffprobe".to_string()
}

/// External pose-landmark extractor. `{video}` and `{sample_ms}` in `args`
/// are substituted before spawning.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct PoseConfig {
    pub command: String,
    #[serde(default = "default_pose_args")]
    pub args: Vec<String>,
}

fn default_pose_args() -> Vec<String> {
    ["--video", "{video}", "--sample-ms", "{sample_ms}"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Config {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    pub fn from_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(yaml)?;
        Ok(config)
    }
}
