use std::sync::Arc;

use crate::analysis::AnalysisPipeline;
use crate::config::Config;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Models, vocabulary and LLM client live inside the pipeline, loaded once per process.
    pub pipeline: Arc<AnalysisPipeline>,
    pub config: Config,
}
