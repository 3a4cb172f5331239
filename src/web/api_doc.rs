use utoipa::OpenApi;

use crate::analysis::{AnalysisResult, Meta, Metrics, ResultStatus, StrokeGuess, Summary};

#[derive(OpenApi)]
#[openapi(
    paths(super::api::analyze::analyze),
    components(schemas(AnalysisResult, Summary, Metrics, Meta, StrokeGuess, ResultStatus)),
    info(
        title = "Swing-O-Mat Analysis API",
        description = "Swing metrics extracted from racket sport videos",
        version = "0.1.0"
    ),
    tags(
        (name = "analysis", description = "Swing analysis")
    )
)]
pub struct ApiDoc;
