//! Options, configuration and setup shared by every tool.

use anyhow::{Context, Result};
use booklend_importer::ExtractorConfig;
use booklend_store::{FilePersistence, Store};
use clap::Args;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Environment variable naming the data directory.
pub const DATA_DIR_ENV: &str = "BOOKLEND_DATA_DIR";

/// Options every tool accepts.
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Data directory (default: $BOOKLEND_DATA_DIR, then the platform data directory)
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Configuration file (default: <data-dir>/config.json)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Show debug logging
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

impl GlobalArgs {
    /// Resolve the data directory.
    pub fn data_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.data_dir {
            return Ok(dir.clone());
        }
        if let Some(dir) = std::env::var_os(DATA_DIR_ENV).filter(|d| !d.is_empty()) {
            return Ok(PathBuf::from(dir));
        }
        dirs::data_dir()
            .map(|d| d.join("booklend"))
            .context("no data directory; pass --data-dir or set BOOKLEND_DATA_DIR")
    }

    /// Resolve the configuration file path.
    pub fn config_path(&self) -> Result<PathBuf> {
        match &self.config {
            Some(path) => Ok(path.clone()),
            None => Ok(self.data_dir()?.join("config.json")),
        }
    }

    /// Default log filter for the verbosity flags.
    pub const fn log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else if self.verbose {
            "debug"
        } else {
            "warn"
        }
    }
}

/// Tool configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    /// Document extraction service.
    pub extractor: ExtractorConfig,
}

impl Config {
    /// Load a configuration file. A missing file gives the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        match fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content)
                .with_context(|| format!("invalid configuration in {}", path.display())),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no configuration file, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(e).with_context(|| format!("failed to read {}", path.display())),
        }
    }
}

/// Install the stderr log subscriber. `RUST_LOG` overrides the flags.
pub fn init_tracing(args: &GlobalArgs) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(args.log_level()));
    // A second init (e.g. in tests) is harmless.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

/// Open the store in the resolved data directory, logging load warnings.
pub fn open_store(args: &GlobalArgs) -> Result<Store<FilePersistence>> {
    let dir = args.data_dir()?;
    let persistence = FilePersistence::new(&dir)
        .with_context(|| format!("failed to open data directory {}", dir.display()))?;
    let store = Store::open(persistence);
    for warning in store.load_warnings() {
        tracing::warn!("{warning}; using defaults");
    }
    tracing::debug!(dir = %dir.display(), "store opened");
    Ok(store)
}

/// Ask for confirmation on stdin unless `yes` is set.
pub fn confirm(prompt: &str, yes: bool) -> Result<bool> {
    if yes {
        return Ok(true);
    }
    eprint!("{prompt} [y/N] ");
    let mut answer = String::new();
    io::stdin()
        .read_line(&mut answer)
        .context("failed to read confirmation")?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes" | "YES"))
}
