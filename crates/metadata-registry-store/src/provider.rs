//! Registry providers: read-only and mutable views over stored statements.

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use metadata_registry_core::{CoreError, EntityMetadata, PublicKey, SignedEntityMetadata};
use tracing::{debug, info, warn};

use crate::config::RegistryConfig;
use crate::error::{RegistryError, Result};
use crate::fs::OsBlobStore;
use crate::memory::MemoryBlobStore;
use crate::traits::BlobStore;
use crate::update::verify_update;

/// Top-level registry directory.
pub const REGISTRY_DIR: &str = "registry";
/// Entity statement directory, under [`REGISTRY_DIR`].
pub const ENTITY_DIR: &str = "entity";
/// Marker file so empty directories survive in Git.
pub const PLACEHOLDER_FILENAME: &str = ".placeholder";
/// Extension of statement files.
pub const STATEMENT_EXT: &str = ".json";

/// A snapshot of every entity in a registry.
pub type Snapshot = BTreeMap<PublicKey, EntityMetadata>;

/// Read-only registry capability.
pub trait Provider: Send + Sync {
    /// Check that every stored statement opens and validates.
    fn verify(&self) -> Result<()> {
        self.get_entities().map(|_| ())
    }

    /// Check that this registry is a valid update of `prior`.
    fn verify_update(&self, prior: &dyn Provider) -> Result<()> {
        verify_update(self, prior)
    }

    /// Load and verify every entity. Any bad statement fails the whole call.
    fn get_entities(&self) -> Result<Snapshot>;

    /// Load and verify a single entity.
    fn get_entity(&self, id: &PublicKey) -> Result<EntityMetadata>;
}

/// Registry capability that can also change the registry.
pub trait MutableProvider: Provider {
    /// The base registry directory, when there is one.
    fn base_dir(&self) -> Option<&Path>;

    /// Create the registry layout. Fails if any part of it already exists.
    fn init(&self) -> Result<()>;

    /// Store a signed statement, replacing an older one for the same entity.
    fn update_entity(&self, signed: &SignedEntityMetadata) -> Result<()>;
}

/// Path of the entity directory relative to the store root.
pub fn entity_dir() -> PathBuf {
    Path::new(REGISTRY_DIR).join(ENTITY_DIR)
}

/// Path of an entity's statement relative to the store root.
pub fn entity_path(id: &PublicKey) -> PathBuf {
    entity_dir().join(format!("{}{}", id.to_hex(), STATEMENT_EXT))
}

/// Registry provider over a blob store.
///
/// Every read recomputes from storage. Updates are serialized per instance.
pub struct FsProvider<B: BlobStore> {
    store: B,
    config: RegistryConfig,
    update_lock: Mutex<()>,
}

impl<B: BlobStore> FsProvider<B> {
    /// Create a provider over `store`.
    pub fn new(store: B, config: RegistryConfig) -> Self {
        Self {
            store,
            config,
            update_lock: Mutex::new(()),
        }
    }

    /// Get the store reference.
    pub fn store(&self) -> &B {
        &self.store
    }

    /// Get the configuration.
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    fn lock_updates(&self) -> Result<std::sync::MutexGuard<'_, ()>> {
        self.update_lock
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "registry update lock poisoned").into())
    }
}

impl FsProvider<OsBlobStore> {
    /// Create a provider for the registry rooted at `path`.
    pub fn open(path: impl Into<PathBuf>, config: RegistryConfig) -> Self {
        Self::new(OsBlobStore::new(path), config)
    }
}

impl FsProvider<MemoryBlobStore> {
    /// Create a provider over an empty in-memory store.
    pub fn in_memory(config: RegistryConfig) -> Self {
        Self::new(MemoryBlobStore::new(), config)
    }
}

impl<B: BlobStore> Provider for FsProvider<B> {
    fn get_entities(&self) -> Result<Snapshot> {
        let dir = entity_dir();
        let entries = self.store.read_dir(&dir).map_err(|e| {
            warn!(error = %e, "failed to read entity directory");
            RegistryError::Corrupt(format!("failed to read entity directory: {e}"))
        })?;

        let max = self.config.max_statement_size;
        let mut results = Snapshot::new();
        for entry in entries {
            let Some(stem) = entry.name.strip_suffix(STATEMENT_EXT) else {
                continue;
            };

            let id = PublicKey::from_hex(stem).map_err(|e| {
                warn!(file = %entry.name, "bad statement filename");
                RegistryError::Corrupt(format!(
                    "entity: bad statement filename '{}': {e}",
                    entry.name
                ))
            })?;

            if entry.size > max as u64 {
                warn!(file = %entry.name, size = entry.size, "statement too big");
                return Err(RegistryError::Corrupt(format!(
                    "entity: statement too big (size: {} max: {max}): {}",
                    entry.size, entry.name
                )));
            }

            let metadata = self.get_entity(&id).map_err(|e| {
                warn!(file = %entry.name, error = %e, "bad entity statement");
                RegistryError::Corrupt(format!(
                    "entity: bad statement '{}': {}",
                    entry.name,
                    e.corrupt_reason()
                ))
            })?;
            results.insert(id, metadata);
        }

        debug!(count = results.len(), "loaded registry snapshot");
        Ok(results)
    }

    fn get_entity(&self, id: &PublicKey) -> Result<EntityMetadata> {
        let path = entity_path(id);
        let max = self.config.max_statement_size;

        let raw = match self.store.read(&path, max) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Err(RegistryError::NotFound(*id)),
            Err(e) => {
                return Err(RegistryError::Corrupt(format!(
                    "failed to open entity metadata: {e}"
                )))
            }
        };

        let signed = SignedEntityMetadata::load(&raw, max)
            .map_err(|e| RegistryError::Corrupt(e.to_string()))?;
        let metadata = signed
            .open_with_limits(&self.config.signature_context, id, &self.config.limits)
            .map_err(|e| RegistryError::Corrupt(e.to_string()))?;

        debug!(entity = %id, serial = metadata.serial, "loaded entity statement");
        Ok(metadata)
    }
}

impl<B: BlobStore> MutableProvider for FsProvider<B> {
    fn base_dir(&self) -> Option<&Path> {
        self.store.base_dir()
    }

    fn init(&self) -> Result<()> {
        let _guard = self.lock_updates()?;

        let paths = [PathBuf::from(REGISTRY_DIR), entity_dir()];
        for path in &paths {
            if self.store.exists(path)? {
                return Err(RegistryError::AlreadyInitialized);
            }
            self.store.create_dir_all(path)?;
            self.store.write(&path.join(PLACEHOLDER_FILENAME), &[])?;
        }

        info!("initialized registry");
        Ok(())
    }

    fn update_entity(&self, signed: &SignedEntityMetadata) -> Result<()> {
        let _guard = self.lock_updates()?;

        let id = signed.public_key();
        let metadata = signed
            .open_with_limits(&self.config.signature_context, &id, &self.config.limits)
            .map_err(RegistryError::InvalidMetadata)?;

        match self.get_entity(&id) {
            Ok(existing) => {
                if metadata.serial <= existing.serial {
                    return Err(RegistryError::SerialNotIncreased {
                        id,
                        existing: existing.serial,
                        provided: metadata.serial,
                    });
                }
            }
            Err(RegistryError::NotFound(_)) => {}
            Err(e) => return Err(e),
        }

        let raw = signed.save().map_err(RegistryError::InvalidMetadata)?;
        let max = self.config.max_statement_size;
        if raw.len() > max {
            return Err(RegistryError::InvalidMetadata(CoreError::StatementTooLarge {
                size: raw.len(),
                max,
            }));
        }

        self.store.write(&entity_path(&id), &raw)?;

        info!(entity = %id, serial = metadata.serial, "updated entity metadata");
        Ok(())
    }
}
