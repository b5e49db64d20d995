use bytes::Bytes;
use serde::Serialize;

use crate::advisor::roadmap::RoadmapArtifact;
use crate::nlp::GapResult;

/// An uploaded resume file.
#[derive(Debug, Clone)]
pub struct ResumeUpload {
    pub filename: String,
    pub bytes: Bytes,
}

/// Response body of `POST /analyze`.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResult {
    pub filename: String,
    /// Similarity as a percentage with two decimals. May be negative.
    pub match_score: f64,
    pub skills_analysis: GapResult,
    pub roadmap: RoadmapArtifact,
    /// Markdown text.
    pub recruiter_feedback: String,
}
