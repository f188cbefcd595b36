//! Configuration structures for the scan pipeline.

use serde::{Deserialize, Serialize};

/// Environment variable holding the vision-model API key.
///
/// The credential is injected at construction time and never stored in the
/// config file.
pub const API_KEY_ENV: &str = "BELEGSCAN_API_KEY";

/// Main configuration for the belegscan pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BelegConfig {
    /// Scan/decode configuration.
    pub scan: ScanConfig,

    /// AI extraction configuration.
    pub ai: AiConfig,
}

/// QR decoding and parsing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Maximum image dimension (longer side) before decoding; larger images
    /// are downscaled.
    pub max_image_size: u32,

    /// Reject receipts whose VAT block contains non-numeric tokens instead
    /// of propagating NaN components.
    pub strict_numbers: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            max_image_size: 2048,
            strict_numbers: false,
        }
    }
}

/// Vision-model endpoint configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    /// Base URL of an OpenAI-compatible chat-completions endpoint.
    pub base_url: String,

    /// Model name to request.
    pub model: String,

    /// Client-level request timeout in seconds.
    pub request_timeout_secs: u64,

    /// Maximum length of the extracted answer kept by the orchestrator.
    pub max_response_chars: usize,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            request_timeout_secs: 30,
            max_response_chars: 200,
        }
    }
}

impl BelegConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))?;
        std::fs::write(path, content)
    }

    /// Read the API key from the environment, if set.
    pub fn api_key_from_env() -> Option<String> {
        std::env::var(API_KEY_ENV).ok().filter(|k| !k.is_empty())
    }
}
