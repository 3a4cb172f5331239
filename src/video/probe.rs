use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::process::{Command as StdCommand, Stdio};

use super::error::ProbeError;

pub const DEFAULT_FPS: f64 = 30.0;
pub const DEFAULT_FRAME_COUNT: u64 = 150;
pub const DEFAULT_DURATION_MS: f64 = 5000.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VideoInfo {
    pub fps: f64,
    pub frame_count: u64,
    pub duration_ms: f64,
}

impl Default for VideoInfo {
    fn default() -> Self {
        Self {
            fps: DEFAULT_FPS,
            frame_count: DEFAULT_FRAME_COUNT,
            duration_ms: DEFAULT_DURATION_MS,
        }
    }
}

impl VideoInfo {
    pub fn new(fps: f64, frame_count: u64) -> Self {
        let duration_ms = if fps > 0.0 {
            frame_count as f64 / fps * 1000.0
        } else {
            DEFAULT_DURATION_MS
        };
        Self {
            fps,
            frame_count,
            duration_ms,
        }
    }
}

#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    #[serde(default)]
    streams: Vec<FfprobeStream>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    r_frame_rate: Option<String>,
    avg_frame_rate: Option<String>,
    nb_frames: Option<String>,
    duration: Option<String>,
}

/// Parses an ffprobe rational such as `30000/1001`.
fn parse_rate(rate: &str) -> Option<f64> {
    let value = match rate.split_once('/') {
        Some((num, den)) => {
            let num: f64 = num.trim().parse().ok()?;
            let den: f64 = den.trim().parse().ok()?;
            if den == 0.0 {
                return None;
            }
            num / den
        }
        None => rate.trim().parse().ok()?,
    };
    (value.is_finite() && value > 0.0).then_some(value)
}

pub fn parse_ffprobe_json(json: &str) -> Result<VideoInfo, ProbeError> {
    let output: FfprobeOutput = serde_json::from_str(json)?;
    let stream = output
        .streams
        .into_iter()
        .next()
        .ok_or(ProbeError::NoVideoStream)?;

    let fps = stream
        .r_frame_rate
        .as_deref()
        .and_then(parse_rate)
        .or_else(|| stream.avg_frame_rate.as_deref().and_then(parse_rate))
        .unwrap_or(DEFAULT_FPS);

    let frame_count = stream
        .nb_frames
        .as_deref()
        .and_then(|n| n.trim().parse::<u64>().ok())
        .or_else(|| {
            stream
                .duration
                .as_deref()
                .and_then(|d| d.trim().parse::<f64>().ok())
                .filter(|d| d.is_finite() && *d > 0.0)
                .map(|d| (d * fps).round() as u64)
        })
        .unwrap_or(DEFAULT_FRAME_COUNT);

    Ok(VideoInfo::new(fps, frame_count))
}

/// Reads frame rate and frame count through ffprobe.
#[derive(Debug, Clone, Default)]
pub struct VideoProbe {
    ffprobe: Option<PathBuf>,
}

impl VideoProbe {
    pub fn new(ffprobe: Option<PathBuf>) -> Self {
        Self { ffprobe }
    }

    /// Never fails: any probing problem yields [`VideoInfo::default`].
    pub fn probe(&self, video: &Path) -> VideoInfo {
        let Some(program) = &self.ffprobe else {
            log::debug!("No ffprobe available, assuming default video info");
            return VideoInfo::default();
        };

        match run_ffprobe(program, video) {
            Ok(info) => info,
            Err(e) => {
                log::warn!(
                    "Failed to probe {}, using defaults: {}",
                    video.display(),
                    e
                );
                VideoInfo::default()
            }
        }
    }
}

fn run_ffprobe(program: &Path, video: &Path) -> Result<VideoInfo, ProbeError> {
    // output() waits for the child, so it is reaped on every path.
    let output = StdCommand::new(program)
        .args([
            "-v",
            "error",
            "-select_streams",
            "v:0",
            "-show_entries",
            "stream=r_frame_rate,avg_frame_rate,nb_frames,duration",
            "-of",
            "json",
        ])
        .arg(video)
        .stdin(Stdio::null())
        .output()?;

    if !output.status.success() {
        return Err(ProbeError::Exit {
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    parse_ffprobe_json(&String::from_utf8_lossy(&output.stdout))
}
