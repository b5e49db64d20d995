//! Document ingestion: uploaded bytes to text, and the immutable `Document`
//! value the analysis stages read from.

pub mod extract;

pub use extract::{ExtractError, FormatExtractor, TextExtractor};

/// Free text plus the lowercase form used for vocabulary matching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    text: String,
    lowercase: String,
}

impl Document {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let lowercase = text.to_lowercase();
        Self { text, lowercase }
    }

    /// Original-case text.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn lowercase(&self) -> &str {
        &self.lowercase
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}
