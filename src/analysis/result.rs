use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::impact::detect_impacts;
use super::landmarks::LandmarkMetrics;
use super::stroke::{classify_stroke, StrokeGuess};
use super::types::{round1, TempoPoint};
use crate::video::DEFAULT_FPS;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ResultStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub summary: Summary,
    pub metrics: Metrics,
    pub meta: Meta,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ResultStatus {
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub stroke_guess: StrokeGuess,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Metrics {
    pub elbow_angle_max: f64,
    pub shoulder_rotation_proxy: f64,
    /// `[timestampMs, tempo]` pairs in chronological order.
    #[schema(value_type = Vec<Vec<f64>>)]
    pub tempo_series: Vec<TempoPoint>,
    pub impact_frames: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Meta {
    pub fps: f64,
    pub sample_ms: u32,
    pub frames_used: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback: Option<bool>,
}

impl AnalysisResult {
    /// Packages post-processed landmark metrics with impacts and a stroke label.
    pub fn from_landmarks(metrics: LandmarkMetrics, fps: f64, sample_ms: u32) -> Self {
        let impact_frames = detect_impacts(&metrics.tempo_series);
        let (stroke_guess, confidence) = classify_stroke(metrics.shoulder_rotation_proxy);

        AnalysisResult {
            status: None,
            error: None,
            summary: Summary {
                stroke_guess,
                confidence,
            },
            metrics: Metrics {
                elbow_angle_max: round1(metrics.elbow_angle_max),
                shoulder_rotation_proxy: round1(metrics.shoulder_rotation_proxy),
                tempo_series: metrics.tempo_series,
                impact_frames,
            },
            meta: Meta {
                fps,
                sample_ms,
                frames_used: metrics.frames_used,
                fallback: None,
            },
        }
    }

    /// Zeroed result carrying an error message, as served over HTTP.
    pub fn error_payload(message: &str, sample_ms: u32) -> Self {
        AnalysisResult {
            status: None,
            error: Some(message.to_string()),
            summary: Summary {
                stroke_guess: StrokeGuess::Unknown,
                confidence: 0.0,
            },
            metrics: Metrics {
                elbow_angle_max: 0.0,
                shoulder_rotation_proxy: 0.0,
                tempo_series: Vec::new(),
                impact_frames: Vec::new(),
            },
            meta: Meta {
                fps: DEFAULT_FPS,
                sample_ms,
                frames_used: 0,
                fallback: None,
            },
        }
    }

    /// Zeroed result with `status: "error"`, as written by the CLI.
    pub fn failed(message: &str, sample_ms: u32) -> Self {
        AnalysisResult {
            status: Some(ResultStatus::Error),
            ..Self::error_payload(message, sample_ms)
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.meta.fallback.unwrap_or(false)
    }
}
