//! Read-only registry served from a Git snapshot.
//!
//! The repository is cloned once, shallow and single-branch, into a
//! temporary directory. The tree is then loaded into memory and the checkout
//! is removed. A fresh provider is needed to observe later commits.

use std::path::Path;
use std::process::Command;

use metadata_registry_core::{EntityMetadata, PublicKey};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::RegistryConfig;
use crate::error::{RegistryError, Result};
use crate::memory::MemoryBlobStore;
use crate::provider::{FsProvider, Provider, Snapshot};

/// The public metadata registry repository.
pub const DEFAULT_REPOSITORY_URL: &str = "https://github.com/oasisprotocol/metadata-registry";

/// Location of a Git-hosted registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitConfig {
    /// Repository URL.
    pub url: String,
    /// Branch to clone.
    pub branch: String,
}

impl GitConfig {
    /// The production branch of the public registry.
    pub fn production() -> Self {
        Self {
            url: DEFAULT_REPOSITORY_URL.to_string(),
            branch: "production".to_string(),
        }
    }

    /// The testing branch of the public registry.
    pub fn testing() -> Self {
        Self {
            url: DEFAULT_REPOSITORY_URL.to_string(),
            branch: "testing".to_string(),
        }
    }
}

impl Default for GitConfig {
    fn default() -> Self {
        Self::production()
    }
}

/// Registry provider over an in-memory Git snapshot.
pub struct GitProvider {
    inner: FsProvider<MemoryBlobStore>,
}

impl GitProvider {
    /// Clone the configured branch and load it.
    pub fn fetch(git: &GitConfig, config: RegistryConfig) -> Result<Self> {
        let checkout = tempfile::tempdir()?;

        info!(url = %git.url, branch = %git.branch, "cloning registry");
        let output = Command::new("git")
            .args(["clone", "--quiet", "--depth", "1", "--single-branch", "--no-tags"])
            .arg("--branch")
            .arg(&git.branch)
            .arg("--")
            .arg(&git.url)
            .arg(checkout.path())
            .output()
            .map_err(|e| RegistryError::Git(format!("failed to run git clone: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(RegistryError::Git(format!(
                "failed to clone repository: {}",
                stderr.trim()
            )));
        }

        Self::from_checkout(checkout.path(), config)
    }

    /// Load an existing checkout. The `.git` directory is skipped.
    pub fn from_checkout(path: &Path, config: RegistryConfig) -> Result<Self> {
        let store = MemoryBlobStore::from_dir(path, &[".git"])?;
        debug!(path = %path.display(), "loaded registry snapshot into memory");
        Ok(Self {
            inner: FsProvider::new(store, config),
        })
    }
}

impl Provider for GitProvider {
    fn get_entities(&self) -> Result<Snapshot> {
        self.inner.get_entities()
    }

    fn get_entity(&self, id: &PublicKey) -> Result<EntityMetadata> {
        self.inner.get_entity(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::MutableProvider;
    use metadata_registry_core::{Keypair, SignatureContext, SignedEntityMetadata, Signer};

    #[test]
    fn test_configs() {
        assert_eq!(GitConfig::default(), GitConfig::production());
        assert_eq!(GitConfig::testing().branch, "testing");
        assert_eq!(GitConfig::production().url, DEFAULT_REPOSITORY_URL);
    }

    #[test]
    fn test_from_checkout() {
        let dir = tempfile::tempdir().unwrap();
        let local = FsProvider::open(dir.path(), RegistryConfig::default());
        local.init().unwrap();

        let kp = Keypair::from_seed(&[9u8; 32]);
        let meta = EntityMetadata {
            twitter: Some("hello_world".into()),
            ..EntityMetadata::new(7)
        };
        let signed = SignedEntityMetadata::sign(&kp, &SignatureContext::default(), &meta).unwrap();
        local.update_entity(&signed).unwrap();
        std::fs::create_dir_all(dir.path().join(".git/objects")).unwrap();

        let git = GitProvider::from_checkout(dir.path(), RegistryConfig::default()).unwrap();
        assert_eq!(git.get_entities().unwrap(), local.get_entities().unwrap());
        assert_eq!(git.get_entity(&kp.public_key()).unwrap(), meta);
        git.verify().unwrap();
        git.verify_update(&local).unwrap();
    }

    #[test]
    fn test_fetch_failure_is_git_error() {
        let missing = tempfile::tempdir().unwrap();
        let cfg = GitConfig {
            url: missing.path().join("no-such-repo").display().to_string(),
            branch: "production".into(),
        };
        assert!(matches!(
            GitProvider::fetch(&cfg, RegistryConfig::default()),
            Err(RegistryError::Git(_))
        ));
    }
}
