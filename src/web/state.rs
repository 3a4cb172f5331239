use std::sync::Arc;

use crate::analysis::AnalysisStrategy;
use crate::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub strategy: AnalysisStrategy,
}

impl AppState {
    pub fn new(config: Config, strategy: AnalysisStrategy) -> Self {
        Self {
            config: Arc::new(config),
            strategy,
        }
    }
}
