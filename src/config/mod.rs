mod types;

pub use types::*;

use crate::{Error, Result};
use std::env;
use std::io::ErrorKind;
use tracing::debug;

/// Loads `config.yaml` (or `CONFIG_PATH`) and layers environment overrides on top.
///
/// A missing file is not an error: the relay runs on defaults plus environment, the way
/// a bare `GEMINI_API_KEY=... genai-relay` deployment expects.
pub async fn load() -> Result<Config> {
    let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.yaml".to_string());

    debug!("Loading configuration from: {}", config_path);

    let config = match tokio::fs::read_to_string(&config_path).await {
        Ok(config_str) => parse(&config_str)?,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!("No configuration file at {}, using defaults", config_path);
            Config::default()
        }
        Err(e) => return Err(e.into()),
    };

    apply_env_overrides(config, |key| env::var(key).ok())
}

pub fn parse(config_str: &str) -> Result<Config> {
    Ok(serde_yaml::from_str(config_str)?)
}

/// Applies `GEMINI_API_KEY`/`OPENAI_API_KEY`, `PORT`, `MODEL` and `UPLOAD_DIR`.
pub fn apply_env_overrides<F>(mut config: Config, lookup: F) -> Result<Config>
where
    F: Fn(&str) -> Option<String>,
{
    let key_var = match config.llm.provider {
        LlmProvider::Gemini => "GEMINI_API_KEY",
        LlmProvider::OpenAi => "OPENAI_API_KEY",
    };
    if let Some(api_key) = lookup(key_var) {
        config.llm.api_key = api_key;
    }

    if let Some(port) = lookup("PORT") {
        config.server.port = port
            .trim()
            .parse()
            .map_err(|_| Error::config(format!("Invalid PORT value: '{}'", port)))?;
    }

    if let Some(model) = lookup("MODEL") {
        config.llm.model = model;
    }

    if let Some(upload_dir) = lookup("UPLOAD_DIR") {
        config.server.upload_dir = upload_dir;
    }

    Ok(config)
}
