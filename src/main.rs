use anyhow::Result;
use genai_relay::{config, server};
use tracing::info;

/// Validates that a log level string is valid
fn validate_log_level(level: &str) -> Result<()> {
    level
        .parse::<tracing_subscriber::filter::LevelFilter>()
        .map_err(|_| {
            anyhow::anyhow!(
                "Invalid log level: '{}'. Valid levels: error, warn, info, debug, trace",
                level
            )
        })?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine; real environment variables still apply.
    dotenvy::dotenv().ok();

    // Load configuration first (before logging setup)
    let config = match config::load().await {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    // RUST_LOG may carry a full filter directive; the config level must be a plain level.
    let env_filter = match tracing_subscriber::EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => {
            if let Err(e) = validate_log_level(&config.server.logs.level) {
                eprintln!("{}", e);
                std::process::exit(1);
            }
            tracing_subscriber::EnvFilter::new(&config.server.logs.level)
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .json()
        .init();

    info!(
        "Starting generative AI relay with log level: {}",
        config.server.logs.level
    );
    info!("Configuration loaded successfully");

    server::run(config).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::validate_log_level;

    #[test]
    fn test_validate_log_level_accepts_known_levels() {
        for level in ["error", "warn", "info", "debug", "trace"] {
            assert!(validate_log_level(level).is_ok());
        }
    }

    #[test]
    fn test_validate_log_level_rejects_garbage() {
        let err = validate_log_level("loud").unwrap_err();
        assert!(err.to_string().contains("Invalid log level"));
    }
}
