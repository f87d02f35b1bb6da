use thiserror::Error;

/// Main error type for the reconciliation service
#[derive(Error, Debug)]
pub enum ReconcileError {
    /// Cache database errors
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// HTTP request errors
    #[error("HTTP request failed: {0}")]
    HttpRequest(#[from] reqwest::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Upstream XML could not be read
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Provider errors
    #[error("Provider '{provider}' error: {message}")]
    Provider { provider: String, message: String },

    /// Cache errors
    #[error("Cache error: {0}")]
    Cache(String),

    /// Malformed query from the inbound caller
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl ReconcileError {
    /// Short label used when an absorbed failure is logged
    pub fn kind(&self) -> &'static str {
        match self {
            ReconcileError::Database(_) | ReconcileError::Cache(_) => "cache",
            ReconcileError::HttpRequest(_) => "transport",
            ReconcileError::Json(_) | ReconcileError::InvalidQuery(_) => "request",
            ReconcileError::Xml(_) => "parse",
            ReconcileError::Provider { .. } => "provider",
            ReconcileError::Config(_) => "config",
            ReconcileError::Other(_) => "other",
        }
    }
}

impl From<String> for ReconcileError {
    fn from(s: String) -> Self {
        ReconcileError::Other(s)
    }
}

impl From<&str> for ReconcileError {
    fn from(s: &str) -> Self {
        ReconcileError::Other(s.to_string())
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, ReconcileError>;
