//! # Metadata Registry Core
//!
//! Pure primitives for the metadata registry: entity metadata records, their
//! validation rules, and signed statements.
//!
//! This crate contains no I/O. Everything here is computation over records,
//! signatures and their encodings.
//!
//! ## Key Types
//!
//! - [`EntityMetadata`] - The versioned metadata record published by an entity
//! - [`SignedEntityMetadata`] - A record signed by its owning entity
//! - [`PublicKey`] - Entity identifier and signature verification key
//! - [`Keypair`] - Ed25519 signer used to produce statements
//! - [`SignatureContext`] - Domain separation tag mixed into every signature
//!
//! ## Canonicalization
//!
//! Records are signed over a deterministic CBOR encoding. See [`canonical`].
//! Statements are stored as JSON. See [`signed`].

pub mod canonical;
pub mod crypto;
pub mod error;
pub mod metadata;
pub mod signed;
pub mod validation;

pub use crypto::{Keypair, PublicKey, Signature, SignatureContext, Signer, ENTITY_METADATA_CONTEXT};
pub use error::{CoreError, Result, ValidationError};
pub use metadata::{
    EntityMetadata, MetadataField, ValidationLimits, MAX_ENTITY_EMAIL_LENGTH,
    MAX_ENTITY_KEYBASE_LENGTH, MAX_ENTITY_NAME_LENGTH, MAX_ENTITY_TWITTER_LENGTH,
    MAX_ENTITY_URL_LENGTH, MAX_SUPPORTED_VERSION, MIN_SUPPORTED_VERSION,
};
pub use signed::{SignedEntityMetadata, StatementSignature, MAX_STATEMENT_SIZE};
