//! # Metadata Registry Testkit
//!
//! Testing utilities for the metadata registry.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Case tables**: Named records with their expected validity
//! - **Test vectors**: Signed statements for cross-implementation checks
//! - **Generators**: Proptest strategies for property-based testing
//! - **Fixtures**: Deterministic test entities
//!
//! ## Case Tables
//!
//! ```rust
//! use metadata_registry_testkit::cases::field_semantics;
//!
//! for case in field_semantics() {
//!     case.check().unwrap();
//! }
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use metadata_registry_testkit::generators::valid_metadata;
//!
//! proptest! {
//!     #[test]
//!     fn validates(meta in valid_metadata()) {
//!         prop_assert!(meta.validate_basic().is_ok());
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust
//! use metadata_registry_testkit::fixtures::TestEntity;
//!
//! let alice = TestEntity::new("alice");
//! let statement = alice.statement(1);
//! assert_eq!(statement.public_key(), alice.id());
//! ```
//!
//! The `gen-vectors` binary prints [`all_vectors`] as JSON.

pub mod cases;
pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use cases::EntityMetadataTestCase;
pub use fixtures::{entities, test_signer, TestEntity};
pub use vectors::{all_vectors, EntityMetadataTestVector};
