//! Vision-model client for receipt number extraction.
//!
//! Speaks the OpenAI-compatible chat-completions protocol with an inline
//! base64 image. The endpoint, model, and credential are injected at
//! construction; nothing here reads ambient globals.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::AiError;
use crate::models::config::AiConfig;

const PROMPT: &str = "This is a photo of a German fiscal receipt (Kassenbeleg). \
Find the receipt number (Belegnummer / Bon-Nr.) printed on it and answer with \
that number only. If no receipt number is visible, answer with NONE.";

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f64,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: Vec<ContentPart>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: String,
}

/// Client for the hosted vision model.
#[derive(Debug)]
pub struct AiExtractor {
    client: Client,
    base_url: String,
    model: String,
    api_key: String,
    max_response_chars: usize,
}

impl AiExtractor {
    /// Build an extractor from config plus an injected credential.
    pub fn new(config: &AiConfig, api_key: String) -> Result<Self, AiError> {
        if api_key.is_empty() {
            return Err(AiError::MissingCredential);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key,
            max_response_chars: config.max_response_chars,
        })
    }

    /// Send a base64-encoded image and return the model's free-text answer.
    pub async fn extract_receipt_number(&self, image_base64: &str) -> Result<String, AiError> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user",
                content: vec![
                    ContentPart::Text {
                        text: PROMPT.to_string(),
                    },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl {
                            url: format!("data:image/jpeg;base64,{image_base64}"),
                        },
                    },
                ],
            }],
            max_tokens: 64,
            temperature: 0.0,
        };

        let url = format!("{}/chat/completions", self.base_url);
        debug!(url = %url, model = %self.model, image_b64_len = image_base64.len(), "requesting AI extraction");

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(AiError::Api { status, body });
        }

        let chat_response: ChatResponse = response.json().await?;
        let content = chat_response
            .choices
            .first()
            .map(|c| c.message.content.trim())
            .ok_or(AiError::EmptyResponse)?;

        if content.is_empty() {
            return Err(AiError::EmptyResponse);
        }

        let mut answer = content.to_string();
        if answer.chars().count() > self.max_response_chars {
            answer = answer.chars().take(self.max_response_chars).collect();
        }

        debug!(answer_len = answer.len(), "AI extraction answered");
        Ok(answer)
    }
}
