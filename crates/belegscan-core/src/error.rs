//! Error types for the belegscan-core library.
//!
//! Parse failures are deliberately absent here: a payload that does not match
//! the Kassenbeleg format is a domain outcome ([`crate::ParseOutcome`]), not
//! an error.

use thiserror::Error;

/// Main error type for the belegscan library.
#[derive(Error, Debug)]
pub enum BelegError {
    /// QR decoding error.
    #[error("QR error: {0}")]
    Qr(#[from] QrError),

    /// AI extraction error.
    #[error("AI extraction error: {0}")]
    Ai(#[from] AiError),

    /// Image processing error.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to locating and decoding QR symbols.
#[derive(Error, Debug)]
pub enum QrError {
    /// No QR symbol was found in the image.
    #[error("no QR code found in image")]
    NotFound,

    /// A symbol was located but could not be decoded.
    #[error("failed to decode QR symbol: {0}")]
    Decode(String),

    /// Invalid image dimensions or content.
    #[error("invalid image: {0}")]
    InvalidImage(String),
}

/// Errors related to the hosted vision-model call.
#[derive(Error, Debug)]
pub enum AiError {
    /// Transport-level failure (connect, TLS, timeout).
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The API returned a non-success status.
    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },

    /// The API responded with no choices.
    #[error("empty response from vision model")]
    EmptyResponse,

    /// No API credential was provided.
    #[error("missing API credential")]
    MissingCredential,
}

/// Result type for the belegscan library.
pub type Result<T> = std::result::Result<T, BelegError>;
