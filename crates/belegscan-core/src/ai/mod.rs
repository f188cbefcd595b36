//! AI-assisted receipt number extraction.

mod extractor;

pub use extractor::AiExtractor;

use serde::Serialize;

/// Outcome of a vision-model extraction, stored on the scan state.
///
/// Failures are carried as plain string messages; a failed extraction is
/// never an application error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "status", content = "value")]
pub enum AiExtraction {
    /// Free-text answer from the model.
    Extracted(String),

    /// The call failed; human-readable reason.
    Failed(String),
}

impl AiExtraction {
    /// The extracted text, if the call succeeded.
    pub fn text(&self) -> Option<&str> {
        match self {
            AiExtraction::Extracted(text) => Some(text),
            AiExtraction::Failed(_) => None,
        }
    }
}
