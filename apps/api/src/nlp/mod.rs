//! NLP engine: skill extraction, semantic similarity and gap analysis.
//!
//! Model-backed pieces sit behind two traits so the pipeline never touches
//! candle directly:
//! - `TextEmbedder`: text → dense sentence vector
//! - `EntityRecognizer`: text → named entities
//!
//! Both production implementations are loaded once per process through
//! `hub::LazyModel` and shared read-only across requests.

use thiserror::Error;

pub mod embeddings;
pub mod entities;
pub mod gap;
pub mod hub;
pub mod similarity;
pub mod skills;
pub mod vocabulary;

pub use embeddings::BertEmbedder;
pub use entities::{BertEntityRecognizer, DisabledRecognizer, Entity};
pub use gap::{analyze_gap, GapResult};
pub use hub::LazyModel;
pub use similarity::{to_percentage, SimilarityScorer};
pub use skills::SkillExtractor;
pub use vocabulary::SkillVocabulary;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Model hub error: {0}")]
    Hub(#[from] hf_hub::api::sync::ApiError),

    #[error("Tensor error: {0}")]
    Candle(#[from] candle_core::Error),

    #[error("Tokenizer error: {0}")]
    Tokenizer(String),

    #[error("Invalid model config: {0}")]
    Config(String),

    #[error("Embedding dimensions don't match: {0} vs {1}")]
    DimensionMismatch(usize, usize),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Maps text to a fixed-dimension sentence embedding.
pub trait TextEmbedder: Send + Sync {
    fn embed(&self, text: &str) -> Result<Vec<f32>, ModelError>;
}

/// Finds named entities in original-case text.
pub trait EntityRecognizer: Send + Sync {
    fn recognize(&self, text: &str) -> Result<Vec<Entity>, ModelError>;
}
