//! Error types for the host integration layer.

use pingie_core::{EntryId, PingieError};

#[derive(Debug, thiserror::Error)]
pub enum HostError {
    #[error("Entry not found: {0}")]
    EntryNotFound(EntryId),
    #[error("Service not found: {0}")]
    ServiceNotFound(String),
    #[error("Service name already registered: {0}")]
    ServiceExists(String),
    #[error(transparent)]
    Core(#[from] PingieError),
}

impl HostError {
    pub(crate) fn lock_poisoned(what: &str) -> Self {
        HostError::Core(PingieError::Storage(format!("{} lock poisoned", what)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_error_display() {
        assert_eq!(
            HostError::EntryNotFound(EntryId::from("abc")).to_string(),
            "Entry not found: abc"
        );
        assert_eq!(
            HostError::ServiceNotFound("dans_phone".into()).to_string(),
            "Service not found: dans_phone"
        );
        assert_eq!(
            HostError::ServiceExists("dans_phone".into()).to_string(),
            "Service name already registered: dans_phone"
        );
    }

    #[test]
    fn test_core_error_is_transparent() {
        let err: HostError = PingieError::Config("bad".into()).into();
        assert_eq!(err.to_string(), "Configuration error: bad");
    }

    #[test]
    fn test_lock_poisoned_is_storage_error() {
        let err = HostError::lock_poisoned("credential table");
        assert!(matches!(err, HostError::Core(PingieError::Storage(_))));
        assert!(err.to_string().contains("credential table"));
    }
}
