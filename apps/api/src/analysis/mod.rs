// Resume / job description analysis: HTTP handler, orchestration and result model.

pub mod handlers;
pub mod models;
pub mod pipeline;

pub use pipeline::AnalysisPipeline;
