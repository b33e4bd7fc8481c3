//! Error types for the metadata registry core.

use thiserror::Error;

use crate::crypto::PublicKey;
use crate::metadata::MetadataField;

/// Field-level validation failures of an entity metadata record.
///
/// Only the first failing check is ever reported.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("unsupported entity metadata version: {0}")]
    UnsupportedVersion(u16),

    #[error("entity {field} too long (length: {len} max: {max})")]
    FieldTooLong {
        field: MetadataField,
        len: usize,
        max: usize,
    },

    #[error("entity {field} is malformed: {reason}")]
    MalformedField { field: MetadataField, reason: String },
}

impl ValidationError {
    /// The offending field, if the failure is tied to one.
    pub fn field(&self) -> Option<MetadataField> {
        match self {
            ValidationError::UnsupportedVersion(_) => None,
            ValidationError::FieldTooLong { field, .. }
            | ValidationError::MalformedField { field, .. } => Some(*field),
        }
    }
}

/// Errors that can occur while signing, opening or (de)serializing statements.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("entity metadata signer does not match expected entity (expected: {expected} got: {actual})")]
    SignerMismatch {
        expected: PublicKey,
        actual: PublicKey,
    },

    #[error("invalid public key")]
    InvalidPublicKey,

    #[error("signature verification failed")]
    SignatureFailed,

    #[error("corrupt payload: {0}")]
    CorruptPayload(String),

    #[error("statement too big (size: {size} max: {max})")]
    StatementTooLarge { size: usize, max: usize },

    #[error("invalid signature context: {0}")]
    InvalidContext(String),

    #[error("invalid entity metadata: {0}")]
    InvalidMetadata(#[from] ValidationError),

    #[error("encoding error: {0}")]
    EncodingError(String),

    #[error("decoding error: {0}")]
    DecodingError(String),
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
