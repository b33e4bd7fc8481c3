//! Error types for the registry store.

use metadata_registry_core::{CoreError, PublicKey};
use thiserror::Error;

/// Errors that can occur during registry operations.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// No statement is stored for the entity.
    #[error("no such entity: {0}")]
    NotFound(PublicKey),

    /// A submitted statement failed to open or validate.
    #[error("bad signed entity metadata: {0}")]
    InvalidMetadata(#[source] CoreError),

    /// An update did not bump the serial number.
    #[error("updated entity '{id}' metadata must increase serial number (existing: {existing} provided: {provided})")]
    SerialNotIncreased {
        id: PublicKey,
        existing: u64,
        provided: u64,
    },

    /// Stored content fails decoding, verification or size bounds.
    #[error("registry is corrupted: {0}")]
    Corrupt(String),

    /// An update removed an entity present in the prior snapshot.
    #[error("entity statement has been removed: {0}")]
    EntityRemoved(PublicKey),

    /// The registry layout already exists.
    #[error("registry already initialized (or corrupted)")]
    AlreadyInitialized,

    /// I/O error from the backing blob store.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failure to fetch a Git snapshot.
    #[error("git error: {0}")]
    Git(String),
}

impl RegistryError {
    /// Whether this error means the entity is absent.
    pub fn is_not_found(&self) -> bool {
        matches!(self, RegistryError::NotFound(_))
    }

    /// Whether this error means stored content cannot be trusted.
    pub fn is_corrupt(&self) -> bool {
        matches!(self, RegistryError::Corrupt(_))
    }

    /// The message carried by a corruption error, or the full display otherwise.
    pub(crate) fn corrupt_reason(&self) -> String {
        match self {
            RegistryError::Corrupt(reason) => reason.clone(),
            other => other.to_string(),
        }
    }
}

/// Result type for registry operations.
pub type Result<T> = std::result::Result<T, RegistryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_predicates() {
        let id = PublicKey::from_bytes([1u8; 32]);
        assert!(RegistryError::NotFound(id).is_not_found());
        assert!(!RegistryError::NotFound(id).is_corrupt());
        assert!(RegistryError::Corrupt("bad".into()).is_corrupt());
        assert!(!RegistryError::AlreadyInitialized.is_not_found());
    }

    #[test]
    fn test_serial_message() {
        let err = RegistryError::SerialNotIncreased {
            id: PublicKey::from_bytes([0u8; 32]),
            existing: 1,
            provided: 1,
        };
        let msg = err.to_string();
        assert!(msg.contains("existing: 1 provided: 1"));
        assert!(msg.contains(&"00".repeat(32)));
    }

    #[test]
    fn test_corrupt_reason_is_not_nested() {
        assert_eq!(RegistryError::Corrupt("x".into()).corrupt_reason(), "x");
        assert_eq!(
            RegistryError::AlreadyInitialized.corrupt_reason(),
            "registry already initialized (or corrupted)"
        );
    }
}
