use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Logging error: {0}")]
    Logging(#[from] LoggingError),

    #[error("MQTT connection error: {0}")]
    Mqtt(#[from] rumqttc::ConnectionError),

    #[error("MQTT client error: {0}")]
    MqttClient(#[from] rumqttc::ClientError),
}

/// Per-message failures. These never escape the handler; they are logged
/// and the message in question is dropped.
#[derive(Error, Debug)]
pub enum HandleError {
    #[error("invalid payload: {0}")]
    Payload(#[from] serde_json::Error),

    #[error("failed to write icon file: {0}")]
    Icon(#[source] std::io::Error),

    #[error("failed to run notify command: {0}")]
    Notify(#[source] std::io::Error),
}

#[derive(Error, Debug)]
pub enum LoggingError {
    #[error("Failed to create log directory at {path}: {source}")]
    LogDirectoryCreation {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid log level '{level}'. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel { level: String },

    #[error("Failed to initialize logging: {0}")]
    InitializationError(String),
}

// Type aliases for convenience
pub type Result<T> = std::result::Result<T, AppError>;
pub type LoggingResult<T> = std::result::Result<T, LoggingError>;
