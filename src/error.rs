//! Error types for dropkey.

use thiserror::Error;

/// Common error type for dropkey.
#[derive(Error, Debug)]
pub enum DropkeyError {
    /// A required key argument was missing or empty.
    #[error("{0}")]
    InvalidKey(String),

    /// No stored file matches the given key.
    #[error("{0}")]
    NotFound(String),

    /// Unclassified failure while reading the storage directory.
    #[error("{0}")]
    Storage(String),

    /// Unclassified failure while deleting a stored file.
    #[error("{0}")]
    DeleteFailed(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl DropkeyError {
    /// HTTP status code this error classifies to.
    ///
    /// Classification is sticky: once an error carries a status it is
    /// propagated unchanged and never rewritten by an outer layer.
    pub fn status_code(&self) -> u16 {
        match self {
            DropkeyError::InvalidKey(_) => 400,
            DropkeyError::NotFound(_) => 404,
            DropkeyError::Storage(_)
            | DropkeyError::DeleteFailed(_)
            | DropkeyError::Io(_)
            | DropkeyError::Config(_) => 500,
        }
    }
}

/// Result type alias for dropkey operations.
pub type Result<T> = std::result::Result<T, DropkeyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_key_display() {
        let err = DropkeyError::InvalidKey("Public key is required".to_string());
        assert_eq!(err.to_string(), "Public key is required");
    }

    #[test]
    fn test_not_found_display() {
        let err = DropkeyError::NotFound("File not found".to_string());
        assert_eq!(err.to_string(), "File not found");
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(DropkeyError::InvalidKey(String::new()).status_code(), 400);
        assert_eq!(DropkeyError::NotFound(String::new()).status_code(), 404);
        assert_eq!(DropkeyError::Storage(String::new()).status_code(), 500);
        assert_eq!(DropkeyError::DeleteFailed(String::new()).status_code(), 500);
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: DropkeyError = io_err.into();
        assert!(matches!(err, DropkeyError::Io(_)));
        assert_eq!(err.status_code(), 500);
    }

    #[test]
    fn test_result_alias() {
        fn sample_ok() -> Result<i32> {
            Ok(42)
        }

        fn sample_err() -> Result<i32> {
            Err(DropkeyError::NotFound("file".to_string()))
        }

        assert_eq!(sample_ok().unwrap(), 42);
        assert!(sample_err().is_err());
    }
}
