//! # pkgmirror CLI
//!
//! This is the binary entry point for the `pkgmirror` command-line tool.
//!
//! Its primary responsibilities are:
//! - Parsing command-line arguments using `clap`.
//! - Loading the configuration and running a full synchronization pass.
//! - Reporting top-level errors, which exit with status 1.
//!
//! The logic lives in the `pkgmirror` library crate; the binary is a thin
//! wrapper around it.

mod cli;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli.execute()
}
