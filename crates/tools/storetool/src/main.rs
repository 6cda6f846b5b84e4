use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;
use storage::{LocalStorage, StorageConfig};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "storetool")]
#[command(about = "Inspect and edit Crossworld script storage", long_about = None)]
struct Cli {
    /// Directory holding storage files (overrides storage.toml)
    #[arg(long, global = true)]
    cache_dir: Option<PathBuf>,

    /// Storage config file to use instead of the user config
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Default section for keys without a `section.` prefix
    #[arg(short, long, global = true)]
    section: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print every entry as `section.key=value`
    List {
        /// Storage name (as used by the script)
        name: String,
    },
    /// Print the value of a key
    Get { name: String, key: String },
    /// Set a key to a string value
    Set {
        name: String,
        key: String,
        value: String,
    },
    /// Remove a key
    Erase { name: String, key: String },
    /// Remove every entry
    Clear { name: String },
    /// Print the backing file path
    Path { name: String },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let stdout = std::io::stdout();
    run(cli, &mut stdout.lock())
}

fn load_config(cli: &Cli) -> Result<StorageConfig> {
    let mut config = match &cli.config {
        Some(path) => StorageConfig::load_from(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => StorageConfig::load(),
    };
    if let Some(dir) = &cli.cache_dir {
        config.cache_dir = Some(dir.clone());
    }
    if let Some(section) = &cli.section {
        config.default_section = section.clone();
    }
    Ok(config)
}

fn open(config: &StorageConfig, name: &str) -> Result<LocalStorage> {
    LocalStorage::open_in(config, name, &config.default_section)
        .with_context(|| format!("Failed to open storage '{}'", name))
}

fn run(cli: Cli, out: &mut impl Write) -> Result<()> {
    let config = load_config(&cli)?;

    match cli.command {
        Commands::List { name } => {
            let store = open(&config, &name)?;
            for (section, key, value) in store.entries() {
                if section.is_empty() {
                    writeln!(out, "{}={}", key, value)?;
                } else {
                    writeln!(out, "{}.{}={}", section, key, value)?;
                }
            }
        }
        Commands::Get { name, key } => {
            let store = open(&config, &name)?;
            match store.raw(&key) {
                Some(value) => writeln!(out, "{}", value)?,
                None => anyhow::bail!("Key '{}' not found in '{}'", key, name),
            }
        }
        Commands::Set { name, key, value } => {
            let mut store = open(&config, &name)?;
            store.set_str(&key, &value);
            store.save().context("Failed to save storage")?;
            tracing::info!("Set {} in {}", key, name);
        }
        Commands::Erase { name, key } => {
            let mut store = open(&config, &name)?;
            if !store.erase(&key) {
                writeln!(out, "Key '{}' not present", key)?;
            }
            store.save().context("Failed to save storage")?;
        }
        Commands::Clear { name } => {
            let mut store = open(&config, &name)?;
            store.clear();
            store.save().context("Failed to save storage")?;
        }
        Commands::Path { name } => {
            writeln!(out, "{}", config.path_for(&name).display())?;
        }
    }

    Ok(())
}
