//! Shared domain types and configuration for repwatch.

pub mod app_config;
pub mod config;
pub mod entities;
pub mod mentions;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use entities::{load_entities, parse_entities, search_terms, EntitiesFile, EntityConfig};
pub use mentions::{
    AlertDraft, AlertSeverity, NewMention, Priority, Reason, ScoredMention, Sentiment, SourceType,
    Trend,
};

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid {kind}: {value}")]
    InvalidValue { kind: &'static str, value: String },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read entities file {path}: {source}")]
    EntitiesFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse entities file: {0}")]
    EntitiesFileParse(#[source] serde_yaml::Error),

    #[error("entities file validation failed: {0}")]
    Validation(String),
}
