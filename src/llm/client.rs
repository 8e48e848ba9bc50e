use super::types::*;
use crate::{Error, Result, config::LlmConfig};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, error};

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Handle to a generative model: takes an ordered list of parts, returns the model's text.
#[async_trait]
pub trait ModelClient: Send + Sync {
    async fn generate_content(&self, parts: Vec<Part>) -> Result<String>;
}

/// Gemini REST client for the `generateContent` endpoint.
pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
    timeout: Duration,
}

impl GeminiClient {
    pub fn new(config: LlmConfig) -> Self {
        Self::new_with_client(config, Client::new())
    }

    pub fn new_with_client(config: LlmConfig, client: Client) -> Self {
        let model = config
            .model
            .strip_prefix("models/")
            .unwrap_or(&config.model)
            .to_string();

        let base_url = if config.base_url.is_empty() {
            GEMINI_BASE_URL.to_string()
        } else {
            config.base_url.trim_end_matches('/').to_string()
        };

        Self {
            client,
            api_key: config.api_key,
            model,
            base_url,
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    /// Model ID without the `models/` prefix.
    pub fn model(&self) -> &str {
        &self.model
    }

    fn extract_text(response: GenerateContentResponse) -> Option<String> {
        let content = response.candidates.into_iter().next()?.content?;
        let texts: Vec<String> = content
            .parts
            .into_iter()
            .filter_map(|part| match part {
                WirePart::Text { text } => Some(text),
                _ => None,
            })
            .collect();

        if texts.is_empty() {
            None
        } else {
            Some(texts.concat())
        }
    }
}

#[async_trait]
impl ModelClient for GeminiClient {
    async fn generate_content(&self, parts: Vec<Part>) -> Result<String> {
        debug!(
            "Calling Gemini model {} with {} parts",
            self.model,
            parts.len()
        );

        let request = GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: parts.into_iter().map(WirePart::from).collect(),
            }],
        };

        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );

        let response = self
            .client
            .post(&url)
            .timeout(self.timeout)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                error!("Failed to send request to Gemini: {}", e);
                e
            })?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            error!("Gemini API error (status {}): {}", status, body);
            return Err(Error::llm(format!(
                "Gemini API error (status {}): {}",
                status, body
            )));
        }

        let parsed: GenerateContentResponse = serde_json::from_str(&body).map_err(|e| {
            error!("Failed to parse Gemini response: {}\nBody: {}", e, body);
            Error::llm(format!("Failed to parse Gemini response: {}", e))
        })?;

        let text = Self::extract_text(parsed)
            .ok_or_else(|| Error::llm("No text in Gemini response"))?;

        debug!("Received {} characters from Gemini", text.len());
        Ok(text)
    }
}
