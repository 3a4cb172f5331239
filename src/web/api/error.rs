use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::analysis::{AnalysisError, AnalysisResult};

pub enum ApiError {
    Analysis { error: AnalysisError, sample_ms: u32 },
}

impl ApiError {
    pub fn analysis(error: AnalysisError, sample_ms: u32) -> Self {
        ApiError::Analysis { error, sample_ms }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Analysis { error, sample_ms } => {
                log::error!("Analysis request failed: {}", error);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(AnalysisResult::error_payload(&error.to_string(), sample_ms)),
                )
                    .into_response()
            }
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
