//! Registry-level commands: init, verify and list.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use metadata_registry_core::PublicKey;
use metadata_registry_store::{
    FsProvider, GitConfig, GitProvider, MutableProvider, Provider, RegistryConfig,
};
use tracing::info;

/// Where `list` reads entities from.
#[derive(Debug, Clone)]
pub enum Source {
    /// A registry on the local filesystem.
    Local(PathBuf),
    /// A branch of a Git-hosted registry.
    Git { url: String, branch: String },
}

/// Initialize a registry in `dir`.
pub fn init(dir: &Path, config: RegistryConfig, out: &mut impl Write) -> Result<()> {
    let provider = FsProvider::open(dir, config);
    provider.init().context("failed to initialize registry")?;

    let base = provider.base_dir().unwrap_or(dir);
    writeln!(out, "Initialized metadata registry in {}", base.display())?;
    Ok(())
}

/// Verify the registry in `dir`, and optionally that it is a valid update of
/// the registry in `update_from`.
pub fn verify(dir: &Path, update_from: Option<&Path>, config: RegistryConfig) -> Result<()> {
    let provider = FsProvider::open(dir, config.clone());
    provider
        .verify()
        .context("registry integrity verification failed")?;
    info!(path = %dir.display(), "registry integrity verified");

    let Some(src) = update_from else {
        return Ok(());
    };

    info!(src = %src.display(), "verifying update from a previous registry snapshot");
    let prior = FsProvider::open(src, config);
    provider
        .verify_update(&prior)
        .context("update integrity verification failed")?;
    Ok(())
}

/// Print entities from `source`, or only the one named by `id`.
pub fn list(
    source: &Source,
    id: Option<&str>,
    config: RegistryConfig,
    out: &mut impl Write,
) -> Result<()> {
    let provider: Box<dyn Provider> = match source {
        Source::Local(dir) => Box::new(FsProvider::open(dir, config)),
        Source::Git { url, branch } => {
            let git = GitConfig {
                url: url.clone(),
                branch: branch.clone(),
            };
            Box::new(GitProvider::fetch(&git, config).context("failed to fetch registry")?)
        }
    };

    match id {
        Some(id) => {
            let id = PublicKey::from_hex(id.trim()).context("malformed entity id")?;
            let metadata = provider
                .get_entity(&id)
                .with_context(|| format!("failed to get entity {id}"))?;
            writeln!(out, "[{id}]")?;
            metadata.pretty_print("  ", out)?;
        }
        None => {
            let entities = provider
                .get_entities()
                .context("failed to get a list of entities")?;
            for (id, metadata) in &entities {
                writeln!(out, "[{id}]")?;
                metadata.pretty_print("  ", out)?;
                writeln!(out)?;
            }
        }
    }
    Ok(())
}
