//! Entity commands: update and keygen.

use std::fs::{self, OpenOptions};
use std::io::{BufRead, Write};
use std::path::Path;

use anyhow::{bail, Context, Result};
use metadata_registry_core::{EntityMetadata, Keypair, SignedEntityMetadata, Signer};
use metadata_registry_store::{FsProvider, MutableProvider, RegistryConfig};
use tracing::{debug, info};

/// Options for [`update`].
#[derive(Debug, Clone, Default)]
pub struct UpdateOptions {
    /// Sign the record even if it does not validate.
    pub skip_validation: bool,
    /// Do not prompt for confirmation.
    pub assume_yes: bool,
}

fn load_metadata(path: &Path) -> Result<EntityMetadata> {
    let raw = fs::read(path)
        .with_context(|| format!("failed to read entity metadata {}", path.display()))?;
    serde_json::from_slice(&raw)
        .with_context(|| format!("failed to parse entity metadata {}", path.display()))
}

fn load_signer(path: &Path) -> Result<Keypair> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read signer seed {}", path.display()))?;
    Keypair::from_hex_seed(&raw)
        .with_context(|| format!("malformed signer seed in {}", path.display()))
}

fn confirm(input: &mut impl BufRead, out: &mut impl Write) -> Result<bool> {
    write!(out, "\nAre you sure you want to continue? (y)es/(n)o: ")?;
    out.flush()?;

    let mut answer = String::new();
    input
        .read_line(&mut answer)
        .context("failed to read confirmation")?;
    Ok(matches!(
        answer.trim().to_ascii_lowercase().as_str(),
        "y" | "yes"
    ))
}

/// Sign the entity metadata in `file` with the key in `signer` and store it
/// in the registry at `registry_dir`.
pub fn update(
    registry_dir: &Path,
    file: &Path,
    signer: &Path,
    options: &UpdateOptions,
    config: RegistryConfig,
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> Result<()> {
    let metadata = load_metadata(file)?;
    if options.skip_validation {
        debug!("skipping entity metadata validation");
    } else {
        metadata
            .validate_basic_with(&config.limits)
            .context("entity metadata is invalid")?;
    }

    let signer = load_signer(signer)?;

    writeln!(
        out,
        "You are about to sign the following entity metadata descriptor:"
    )?;
    metadata.pretty_print("  ", out)?;

    if !options.assume_yes && !confirm(input, out)? {
        bail!("aborted");
    }

    let signed = SignedEntityMetadata::sign(&signer, &config.signature_context, &metadata)
        .context("failed to sign entity metadata")?;

    let registry = FsProvider::open(registry_dir, config);
    registry
        .update_entity(&signed)
        .context("failed to update entity")?;

    let id = signer.public_key();
    info!(entity = %id, serial = metadata.serial, "entity updated");
    writeln!(out, "Updated entity {id}")?;
    Ok(())
}

/// Generate a fresh signing key and write its hex seed to `seed_file`.
pub fn keygen(seed_file: &Path, out: &mut impl Write) -> Result<()> {
    let keypair = Keypair::generate();

    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options
        .open(seed_file)
        .with_context(|| format!("failed to create seed file {}", seed_file.display()))?;
    writeln!(file, "{}", hex::encode(keypair.seed()))?;
    file.sync_all()?;

    writeln!(out, "Entity ID: {}", keypair.public_key())?;
    Ok(())
}
