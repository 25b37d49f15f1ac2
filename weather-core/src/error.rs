use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while assembling the bot configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    ParseFile {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid value for {key}: '{value}'")]
    InvalidValue { key: &'static str, value: String },

    #[error(
        "Missing required setting {key}.\n\
         Hint: export {key} or run `weather-bot configure`."
    )]
    Missing { key: &'static str },

    #[error("Could not determine platform config directory")]
    NoConfigDir,
}

/// Errors raised while decoding an inbound invocation.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Inbound payload is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invocation event has a non-string `body` field")]
    EventBody,
}
