//! Semantic similarity between two documents.

use std::sync::Arc;

use crate::document::Document;
use crate::nlp::{ModelError, TextEmbedder};

#[derive(Clone)]
pub struct SimilarityScorer {
    embedder: Arc<dyn TextEmbedder>,
}

impl SimilarityScorer {
    pub fn new(embedder: Arc<dyn TextEmbedder>) -> Self {
        Self { embedder }
    }

    /// Cosine similarity of the two documents' embeddings, in [-1, 1].
    /// Not clamped.
    pub fn score(&self, a: &Document, b: &Document) -> Result<f64, ModelError> {
        let u = self.embedder.embed(a.text())?;
        let v = self.embedder.embed(b.text())?;
        cosine_similarity(&u, &v)
    }
}

/// `dot(u, v) / (|u| * |v|)`, accumulated in f64. A zero vector scores 0.0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f64, ModelError> {
    if a.len() != b.len() {
        return Err(ModelError::DimensionMismatch(a.len(), b.len()));
    }

    let (mut dot, mut norm_a, mut norm_b) = (0.0_f64, 0.0_f64, 0.0_f64);
    for (&x, &y) in a.iter().zip(b) {
        let (x, y) = (f64::from(x), f64::from(y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return Ok(0.0);
    }
    Ok(dot / (norm_a.sqrt() * norm_b.sqrt()))
}

/// Scales a similarity to a percentage rounded to two decimals.
///
/// Uses `f64::round` (ties away from zero). Negative similarities stay negative.
pub fn to_percentage(score: f64) -> f64 {
    (score * 100.0 * 100.0).round() / 100.0
}
