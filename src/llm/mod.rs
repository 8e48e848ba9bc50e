mod client;
mod openai;
mod types;

pub use client::{GeminiClient, ModelClient};
pub use openai::{OpenAiClient, to_user_content};
pub use types::{InlineContent, Part};

use crate::config::{LlmConfig, LlmProvider};
use std::sync::Arc;
use tracing::info;

pub fn create_model_client(config: &LlmConfig) -> Arc<dyn ModelClient> {
    info!(
        "Using {:?} provider with model {}",
        config.provider, config.model
    );

    match config.provider {
        LlmProvider::Gemini => Arc::new(GeminiClient::new(config.clone())),
        LlmProvider::OpenAi => Arc::new(OpenAiClient::new(config.clone())),
    }
}
