//! CLI argument parsing and execution

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, LevelFilter};

use pkgmirror::{config, defaults, logging, orchestrator};

/// Synchronize APT and file-tree package mirrors from a static configuration
#[derive(Parser, Debug)]
#[command(name = "pkgmirror")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, value_name = "PATH", env = "PKGMIRROR_CONFIG")]
    config: Option<PathBuf>,

    /// Log the commands that would run without executing them
    #[arg(short = 'n', long)]
    noop: bool,
}

impl Cli {
    /// Load the configuration and run every configured mirror
    pub fn execute(self) -> Result<()> {
        logging::init(LevelFilter::Info);

        let config_path = self.config.unwrap_or_else(defaults::config_path);
        if !config_path.exists() {
            anyhow::bail!("Configuration file not found: {}", config_path.display());
        }

        let mut config = config::from_file(&config_path)
            .with_context(|| format!("Failed to load {}", config_path.display()))?;
        info!("Parsed configuration from {}", config_path.display());

        if let Some(level) = config.loglevel {
            logging::set_level(level);
        }
        if self.noop {
            config.noop = true;
        }

        let summary = orchestrator::run(&config)?;
        info!("Sync finished: {}", summary);
        Ok(())
    }
}
