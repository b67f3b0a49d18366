use thiserror::Error;

/// Top-level error type for the Pingie workspace.
///
/// Subsystem crates keep their own error enums and convert into this one at
/// crate boundaries so that `?` works across them.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PingieError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid credential record: {0}")]
    InvalidRecord(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Entry not found: {0}")]
    EntryNotFound(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<toml::de::Error> for PingieError {
    fn from(err: toml::de::Error) -> Self {
        PingieError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for PingieError {
    fn from(err: toml::ser::Error) -> Self {
        PingieError::Serialization(err.to_string())
    }
}

impl From<serde_json::Error> for PingieError {
    fn from(err: serde_json::Error) -> Self {
        PingieError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for Pingie operations.
pub type Result<T> = std::result::Result<T, PingieError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let cases: Vec<(PingieError, &str)> = vec![
            (
                PingieError::Config("bad key".to_string()),
                "Configuration error: bad key",
            ),
            (
                PingieError::InvalidRecord("device_id is empty".to_string()),
                "Invalid credential record: device_id is empty",
            ),
            (
                PingieError::Storage("lock poisoned".to_string()),
                "Storage error: lock poisoned",
            ),
            (
                PingieError::Transport("timed out".to_string()),
                "Transport error: timed out",
            ),
            (
                PingieError::EntryNotFound("abc".to_string()),
                "Entry not found: abc",
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(error.to_string(), expected);
        }
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err: PingieError = io_err.into();
        assert!(matches!(err, PingieError::Io(_)));
        assert!(err.to_string().starts_with("I/O error:"));
        assert!(err.to_string().contains("access denied"));
    }

    #[test]
    fn test_error_from_toml_de() {
        let err: std::result::Result<toml::Value, _> = toml::from_str("invalid = [[[");
        let err: PingieError = err.unwrap_err().into();
        assert!(matches!(err, PingieError::Config(_)));
    }

    #[test]
    fn test_error_from_serde_json() {
        let err: std::result::Result<serde_json::Value, _> = serde_json::from_str("{ nope }");
        let err: PingieError = err.unwrap_err().into();
        assert!(matches!(err, PingieError::Serialization(_)));
    }

    #[test]
    fn test_result_type_with_question_mark() {
        fn inner() -> Result<String> {
            let io_result: std::result::Result<i32, std::io::Error> = Ok(42);
            let value = io_result?;
            Ok(value.to_string())
        }

        assert_eq!(inner().unwrap(), "42");
    }
}
