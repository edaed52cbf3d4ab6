//! Error types for the configuration editor

/// Errors that can occur in the configuration editor
#[derive(Debug, thiserror::Error)]
pub enum ConfigEditorError {
    #[error("No schema registered for kind '{0}'")]
    SchemaNotFound(String),

    #[error("Invalid navigation token: '{0}'")]
    InvalidToken(String),

    #[error("Stale list response (generation {generation}, current {current})")]
    StaleResponse { generation: u64, current: u64 },

    #[error("No view is displayed")]
    NoActiveView,

    #[error("Schema error: {0}")]
    Schema(String),

    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Request cancelled")]
    Cancelled,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for configuration editor operations
pub type Result<T> = std::result::Result<T, ConfigEditorError>;
