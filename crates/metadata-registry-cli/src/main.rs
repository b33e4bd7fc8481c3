//! metadata-registry - manage a filesystem-based entity metadata registry.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use metadata_registry_store::{RegistryConfig, DEFAULT_REPOSITORY_URL};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

mod commands;

/// metadata-registry - entity metadata registry tooling
#[derive(Parser, Debug)]
#[command(name = "metadata-registry")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Registry root directory (defaults to the current directory)
    #[arg(long, global = true)]
    registry_dir: Option<PathBuf>,

    /// Registry configuration file (JSON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Initialize a metadata registry in the registry directory
    Init,

    /// Verify the integrity of the registry
    Verify {
        /// Also verify this registry is a valid update of a previous snapshot
        #[arg(long, value_name = "PATH")]
        update_from: Option<PathBuf>,
    },

    /// List entities in the local registry or a Git snapshot
    List {
        /// Read from the Git-hosted registry instead of the local directory
        #[arg(long)]
        git: bool,

        /// Git branch to read
        #[arg(long, default_value = "production", requires = "git")]
        branch: String,

        /// Git repository URL
        #[arg(long, default_value = DEFAULT_REPOSITORY_URL, requires = "git")]
        url: String,

        /// Only show this entity (hex public key)
        #[arg(long)]
        id: Option<String>,
    },

    /// Entity-related subcommands
    #[command(subcommand)]
    Entity(EntityCommands),
}

#[derive(Subcommand, Debug)]
enum EntityCommands {
    /// Update (or create) an entity in the registry
    Update {
        /// Entity metadata file (JSON)
        file: PathBuf,

        /// File holding the hex-encoded Ed25519 signer seed
        #[arg(long, value_name = "SEED_FILE")]
        signer: PathBuf,

        /// Do not validate the metadata before signing
        #[arg(long)]
        skip_validation: bool,

        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// Generate a new entity signing key
    Keygen {
        /// Where to write the hex-encoded seed; must not exist
        seed_file: PathBuf,
    },
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}

fn load_config(path: Option<&PathBuf>) -> Result<RegistryConfig> {
    let Some(path) = path else {
        return Ok(RegistryConfig::default());
    };
    let raw = std::fs::read(path)
        .with_context(|| format!("failed to read configuration {}", path.display()))?;
    serde_json::from_slice(&raw)
        .with_context(|| format!("failed to parse configuration {}", path.display()))
}

fn run(cli: Cli) -> Result<()> {
    let config = load_config(cli.config.as_ref())?;
    let registry_dir = match cli.registry_dir {
        Some(dir) => dir,
        None => std::env::current_dir().context("failed to get current working directory")?,
    };
    let mut stdout = std::io::stdout().lock();

    match cli.command {
        Commands::Init => commands::registry::init(&registry_dir, config, &mut stdout),
        Commands::Verify { update_from } => {
            commands::registry::verify(&registry_dir, update_from.as_deref(), config)
        }
        Commands::List {
            git,
            branch,
            url,
            id,
        } => {
            let source = if git {
                commands::registry::Source::Git { url, branch }
            } else {
                commands::registry::Source::Local(registry_dir)
            };
            commands::registry::list(&source, id.as_deref(), config, &mut stdout)
        }
        Commands::Entity(EntityCommands::Update {
            file,
            signer,
            skip_validation,
            yes,
        }) => {
            let options = commands::entity::UpdateOptions {
                skip_validation,
                assume_yes: yes,
            };
            let mut stdin = std::io::stdin().lock();
            commands::entity::update(
                &registry_dir,
                &file,
                &signer,
                &options,
                config,
                &mut stdin,
                &mut stdout,
            )
        }
        Commands::Entity(EntityCommands::Keygen { seed_file }) => {
            commands::entity::keygen(&seed_file, &mut stdout)
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}
