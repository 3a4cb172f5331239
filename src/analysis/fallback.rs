//! Deterministic synthetic analysis used when no pose model is available.

use super::error::AnalysisError;
use super::result::{AnalysisResult, Meta, Metrics, Summary};
use super::stroke::StrokeGuess;
use super::types::{round1, TempoPoint};

const LONG_CLIP_MS: f64 = 4000.0;
const IMPACTS_LONG: [f64; 3] = [800.0, 2200.0, 3600.0];
const IMPACTS_SHORT: [f64; 2] = [800.0, 2200.0];

const FALLBACK_CONFIDENCE: f64 = 0.4;
const FALLBACK_ELBOW_ANGLE_MAX: f64 = 145.0;
const FALLBACK_SHOULDER_ROTATION: f64 = 8.5;

/// Synthetic tempo at `timestamp_ms`: a slow swing with a faster ripple on top.
fn synthetic_tempo(timestamp_ms: f64) -> f64 {
    let t = timestamp_ms / 1000.0;
    let tempo = 20.0 + 30.0 * (t * 2.0).sin() + 10.0 * (t * 8.0).sin();
    round1(tempo.max(0.0))
}

pub fn synthesize_tempo_series(
    duration_ms: f64,
    sample_ms: u32,
) -> Result<Vec<TempoPoint>, AnalysisError> {
    if sample_ms == 0 {
        return Err(AnalysisError::InvalidSampling(
            "sample interval must be positive".into(),
        ));
    }
    if !duration_ms.is_finite() || duration_ms < 0.0 {
        return Err(AnalysisError::InvalidSampling(format!(
            "duration {} ms is not a valid clip length",
            duration_ms
        )));
    }

    let num_samples = (duration_ms / sample_ms as f64).floor() as u64;
    Ok((0..num_samples)
        .map(|i| {
            let timestamp_ms = (i * sample_ms as u64) as f64;
            TempoPoint::new(timestamp_ms, synthetic_tempo(timestamp_ms))
        })
        .collect())
}

pub fn synthetic_impacts(duration_ms: f64) -> Vec<f64> {
    if duration_ms > LONG_CLIP_MS {
        IMPACTS_LONG.to_vec()
    } else {
        IMPACTS_SHORT.to_vec()
    }
}

/// Builds the complete fallback result for a clip of `duration_ms`.
pub fn synthesize(duration_ms: f64, sample_ms: u32, fps: f64) -> Result<AnalysisResult, AnalysisError> {
    let tempo_series = synthesize_tempo_series(duration_ms, sample_ms)?;
    let frames_used = tempo_series.len() as u64;

    Ok(AnalysisResult {
        status: None,
        error: None,
        summary: Summary {
            stroke_guess: StrokeGuess::Forehand,
            confidence: FALLBACK_CONFIDENCE,
        },
        metrics: Metrics {
            elbow_angle_max: FALLBACK_ELBOW_ANGLE_MAX,
            shoulder_rotation_proxy: FALLBACK_SHOULDER_ROTATION,
            tempo_series,
            impact_frames: synthetic_impacts(duration_ms),
        },
        meta: Meta {
            fps,
            sample_ms,
            frames_used,
            fallback: Some(true),
        },
    })
}
