//! Error types for the cache engine
//!
//! Provides unified error handling using thiserror. A cache miss is never an
//! error; it surfaces as the caller's default value or `None`.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache engine.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Tag or key input that is neither a string nor a sequence of strings
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Import input that is neither a mapping nor parseable snapshot text
    #[error("Invalid snapshot: {0}")]
    InvalidSnapshot(String),

    /// A payload could not be represented in the export format
    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The periodic sweep needs a Tokio runtime to be scheduled on
    #[error("No Tokio runtime available to schedule the sweep")]
    NoRuntime,
}

// == Result Type Alias ==
/// Convenience Result type for the cache engine.
pub type Result<T> = std::result::Result<T, CacheError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CacheError::InvalidArgument("tags must be strings".to_string());
        assert_eq!(err.to_string(), "Invalid argument: tags must be strings");

        let err = CacheError::InvalidSnapshot("expected an object".to_string());
        assert_eq!(err.to_string(), "Invalid snapshot: expected an object");
    }

    #[test]
    fn test_serialization_error_converts() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: CacheError = json_err.into();
        assert!(matches!(err, CacheError::Serialization(_)));
    }
}
