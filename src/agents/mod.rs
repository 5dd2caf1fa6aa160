//! # Mirror Agents
//!
//! An agent represents one configured mirror. Its only job is to say which
//! external commands must run, and in which order, to bring the local copy up
//! to date. Agents never execute anything themselves; the `runner` module
//! does that.
//!
//! ## Agent Types
//!
//! - **`DebmirrorAgent`**: one `debmirror` invocation for an APT repository.
//! - **`RsyncAgent`**: one `rsync` invocation for an arbitrary file tree.
//! - **`AptlyAgent`**: a short `aptly` workflow (create/update mirrors,
//!   snapshot, merge, publish or switch).

pub mod aptly;
pub mod debmirror;
pub mod rsync;

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::config::Config;

pub use aptly::{AptlyAgent, AptlyInventory};
pub use debmirror::DebmirrorAgent;
pub use rsync::RsyncAgent;

/// A single external command: the program to run and its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: PathBuf,
    pub args: Vec<String>,
}

impl Invocation {
    /// Start an invocation of `program` with no arguments.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Append one argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Build a `std::process::Command` for this invocation.
    pub fn to_command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.args);
        command
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Settings every mirror shares regardless of transport.
#[derive(Debug, Clone, PartialEq)]
pub struct MirrorBase {
    pub name: String,
    pub host: String,
    pub root: String,
    /// Directory holding this mirror's target directory.
    pub basedir: PathBuf,
    pub includes: Vec<String>,
    pub excludes: Vec<String>,
}

impl MirrorBase {
    /// Directory the mirror is synced into: `<basedir>/<name>`.
    pub fn target(&self) -> PathBuf {
        self.basedir.join(&self.name)
    }
}

/// Resolve `<root>/<prefix>`, falling back to the transport default when the
/// mirror does not set its own prefix.
pub fn mirror_basedir(root: &Path, prefix: Option<&str>, default_prefix: &str) -> PathBuf {
    root.join(prefix.unwrap_or(default_prefix))
}

/// Contract shared by all agents.
pub trait MirrorAgent: Send + Sync {
    /// Shared mirror settings.
    fn base(&self) -> &MirrorBase;

    /// Commands to execute, in order, to update the mirror.
    fn calls(&self) -> Vec<Invocation>;

    fn name(&self) -> &str {
        &self.base().name
    }

    fn host(&self) -> &str {
        &self.base().host
    }
}

/// Build the debmirror and rsync agents, debmirror first, each in file order.
///
/// aptly agents are built separately because they need the current aptly
/// state; see [`aptly::build_agents`].
pub fn build_mirror_agents(config: &Config) -> Vec<Box<dyn MirrorAgent>> {
    let mut agents: Vec<Box<dyn MirrorAgent>> = Vec::with_capacity(
        config.mirrors.debmirror.len() + config.mirrors.rsync.len(),
    );

    for entry in &config.mirrors.debmirror {
        agents.push(Box::new(DebmirrorAgent::new(entry, config)));
    }
    for entry in &config.mirrors.rsync {
        agents.push(Box::new(RsyncAgent::new(entry, config)));
    }

    agents
}
