use axum::{
    extract::State,
    http::{header, HeaderMap},
    Json,
};

use crate::analysis::{synthesize, AnalysisResult};
use crate::video::DEFAULT_FPS;
use crate::web::api::error::{ApiError, ApiResult};
use crate::web::state::AppState;

/// The upload is accepted but never read, so no body size limit applies.
/// The response is always the synthetic analysis for a clip of the
/// configured length.
#[utoipa::path(
    post,
    path = "/api/analyze",
    tag = "analysis",
    request_body(content = String, content_type = "application/octet-stream", description = "Video upload (not decoded)"),
    responses(
        (status = 200, description = "Synthetic swing analysis", body = AnalysisResult),
        (status = 500, description = "Analysis failed; zeroed result with an error message", body = AnalysisResult)
    )
)]
pub async fn analyze(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<AnalysisResult>> {
    let analysis = &state.config.analysis;
    let upload_size = headers
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown");
    log::info!(
        "Analysis request ({} bytes), returning {} analysis",
        upload_size,
        state.strategy
    );

    let result = synthesize(analysis.http_duration_ms, analysis.sample_ms, DEFAULT_FPS)
        .map_err(|e| ApiError::analysis(e, analysis.sample_ms))?;

    Ok(Json(result))
}
