//! Text extraction by file extension.

use thiserror::Error;
use tracing::debug;

pub const UNSUPPORTED_FORMAT_MESSAGE: &str = "Unsupported file format";
pub const DOCX_NOT_IMPLEMENTED_MESSAGE: &str = "DOCX parsing not yet implemented";

#[derive(Debug, Error)]
pub enum ExtractError {
    /// Extension not recognized, or recognized but without an extractor yet.
    #[error("{0}")]
    Unsupported(String),

    #[error("PDF extraction failed: {0}")]
    Pdf(String),
}

/// Resume formats recognized by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Pdf,
    Docx,
    Unknown,
}

impl DocumentFormat {
    pub fn from_filename(filename: &str) -> Self {
        let lower = filename.to_lowercase();
        if lower.ends_with(".pdf") {
            DocumentFormat::Pdf
        } else if lower.ends_with(".docx") {
            DocumentFormat::Docx
        } else {
            DocumentFormat::Unknown
        }
    }
}

/// Turns uploaded bytes into text. Carried by the pipeline as `Arc<dyn TextExtractor>`.
pub trait TextExtractor: Send + Sync {
    fn extract(&self, bytes: &[u8], filename: &str) -> Result<String, ExtractError>;
}

/// Production extractor: dispatches on the filename extension.
pub struct FormatExtractor;

impl TextExtractor for FormatExtractor {
    fn extract(&self, bytes: &[u8], filename: &str) -> Result<String, ExtractError> {
        extract_text(bytes, filename)
    }
}

/// Extracts plain text from an uploaded resume.
///
/// PDF pages are extracted in order. DOCX is recognized but reported as
/// unsupported until an extractor exists for it.
pub fn extract_text(bytes: &[u8], filename: &str) -> Result<String, ExtractError> {
    match DocumentFormat::from_filename(filename) {
        DocumentFormat::Pdf => {
            debug!("Extracting PDF text from {filename} ({} bytes)", bytes.len());
            pdf_extract::extract_text_from_mem(bytes).map_err(|e| ExtractError::Pdf(e.to_string()))
        }
        DocumentFormat::Docx => Err(ExtractError::Unsupported(
            DOCX_NOT_IMPLEMENTED_MESSAGE.to_string(),
        )),
        DocumentFormat::Unknown => Err(ExtractError::Unsupported(
            UNSUPPORTED_FORMAT_MESSAGE.to_string(),
        )),
    }
}
