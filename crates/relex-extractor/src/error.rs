//! Error types for the Extractor

use thiserror::Error;

/// Errors that can occur during extraction
///
/// Data-quality problems in oracle output (unknown labels, unknown types,
/// dangling entity references, missing decisions) are never errors; they
/// only reduce the number of triples returned.
#[derive(Error, Debug)]
pub enum ExtractorError {
    /// Oracle call failed
    #[error("Oracle error: {0}")]
    Oracle(String),

    /// Oracle call did not finish in time
    #[error("Oracle call timed out after {0}s")]
    Timeout(u64),

    /// Oracle output is not usable structured output
    #[error("Invalid oracle response: {0}")]
    InvalidResponse(String),

    /// Decoded response does not match the schema the call asked for
    #[error("Unexpected response: expected {expected}, got {actual}")]
    UnexpectedResponse {
        /// Schema the call asked for
        expected: &'static str,
        /// Schema the response was decoded as
        actual: &'static str,
    },

    /// Document text exceeds maximum length
    #[error("Text too long: {0} chars (max: {1})")]
    TextTooLong(usize, usize),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON parsing error
    #[error("JSON parse error: {0}")]
    JsonParse(String),
}

impl From<serde_json::Error> for ExtractorError {
    fn from(e: serde_json::Error) -> Self {
        ExtractorError::JsonParse(e.to_string())
    }
}
