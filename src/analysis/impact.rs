use super::types::TempoPoint;

const MIN_SAMPLES: usize = 3;
const MAX_IMPACTS: usize = 3;

/// Timestamps whose tempo exceeds one standard deviation above the mean.
pub fn detect_impacts(series: &[TempoPoint]) -> Vec<f64> {
    if series.len() < MIN_SAMPLES {
        return Vec::new();
    }

    let n = series.len() as f64;
    let mean = series.iter().map(|p| p.tempo).sum::<f64>() / n;
    let variance = series
        .iter()
        .map(|p| (p.tempo - mean).powi(2))
        .sum::<f64>()
        / n;
    let threshold = mean + variance.sqrt();

    series
        .iter()
        .filter(|p| p.tempo > threshold)
        .map(|p| p.timestamp_ms)
        .take(MAX_IMPACTS)
        .collect()
}
