use thiserror::Error;

/// Main error type for mechanic-rag
#[derive(Error, Debug)]
pub enum MechanicError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// File system I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Embedding API errors
    #[error("Embedding API error: {0}")]
    Embedding(String),

    /// Persisted index or graph is missing or unreadable
    #[error("Index not built: {0}. Run `build-index` (or `mechanic --rebuild`) first")]
    IndexNotBuilt(String),

    /// Persisted graph exists but cannot be understood
    #[error("Graph format error: {0}")]
    GraphFormat(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Convenient Result type using MechanicError
pub type Result<T> = std::result::Result<T, MechanicError>;
