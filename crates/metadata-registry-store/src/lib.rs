//! # Metadata Registry Store
//!
//! Storage for signed entity metadata statements. Provides a trait-based
//! blob store interface with filesystem and in-memory implementations, the
//! registry providers built on top of it, and the update-integrity check
//! between two registry snapshots.
//!
//! ## Key Types
//!
//! - [`Provider`] - Read-only registry capability (verify, list, get)
//! - [`MutableProvider`] - Adds init and update
//! - [`FsProvider`] - Registry over any [`BlobStore`]
//! - [`GitProvider`] - Read-only registry over a Git snapshot
//! - [`OsBlobStore`] / [`MemoryBlobStore`] - Blob store backends
//!
//! ## Usage
//!
//! ```rust,no_run
//! use metadata_registry_core::{EntityMetadata, Keypair, SignatureContext, SignedEntityMetadata};
//! use metadata_registry_store::{FsProvider, MutableProvider, Provider, RegistryConfig};
//!
//! let registry = FsProvider::open("/srv/registry", RegistryConfig::default());
//! registry.init().unwrap();
//!
//! let keypair = Keypair::generate();
//! let record = EntityMetadata::new(1);
//! let signed = SignedEntityMetadata::sign(&keypair, &SignatureContext::default(), &record).unwrap();
//! registry.update_entity(&signed).unwrap();
//!
//! registry.verify().unwrap();
//! ```
//!
//! ## Layout
//!
//! ```text
//! registry/.placeholder
//! registry/entity/.placeholder
//! registry/entity/<hex public key>.json
//! ```
//!
//! ## Design Notes
//!
//! - **No caching**: every read recomputes from storage
//! - **All or nothing**: one bad statement fails a whole listing
//! - **Serial bumps**: an update must strictly increase the entity's serial

pub mod config;
pub mod error;
pub mod fs;
pub mod git;
pub mod memory;
pub mod provider;
pub mod traits;
pub mod update;

pub use config::RegistryConfig;
pub use error::{RegistryError, Result};
pub use fs::OsBlobStore;
pub use git::{GitConfig, GitProvider, DEFAULT_REPOSITORY_URL};
pub use memory::MemoryBlobStore;
pub use provider::{
    entity_dir, entity_path, FsProvider, MutableProvider, Provider, Snapshot, ENTITY_DIR,
    PLACEHOLDER_FILENAME, REGISTRY_DIR, STATEMENT_EXT,
};
pub use traits::{BlobStore, DirEntry};
pub use update::verify_update;
