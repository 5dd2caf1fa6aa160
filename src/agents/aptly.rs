//! Agent for APT repositories mirrored with `aptly`.
//!
//! aptly is assumed to be configured centrally already (GPG keys, root
//! directory). Each run of an aptly agent:
//!
//! 1. creates the aptly mirror for every location that does not exist yet,
//!    updates it, and snapshots it as `<location>__<timestamp>`;
//! 2. merges the location snapshots into `<name>-ALL__<timestamp>` when more
//!    than one location is configured;
//! 3. publishes the resulting snapshot, or switches the existing publish of
//!    `<name>` for the distribution over to it.
//!
//! Whether a mirror or publish already exists is decided from an
//! [`AptlyInventory`] taken once before any aptly agent runs.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::error;

use super::{mirror_basedir, Invocation, MirrorAgent, MirrorBase};
use crate::config::{AptlyMirror, Config, MirrorEntry};
use crate::error::{Error, Result};

/// `host` reported for agents that pull from several locations.
const MULTIPLE_HOSTS: &str = "<multiple>";

/// Snapshot timestamp for the current local time, e.g. `2026-10-19_0415`.
pub fn snapshot_timestamp() -> String {
    chrono::Local::now().format("%F_%H%M").to_string()
}

/// Existing aptly mirrors and publishes, as listed by `aptly ... list -raw`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AptlyInventory {
    mirrors: Vec<String>,
    publishes: Vec<String>,
}

impl AptlyInventory {
    /// Build an inventory from already-captured list output lines.
    pub fn from_lines<M, P>(mirrors: M, publishes: P) -> Self
    where
        M: IntoIterator,
        M::Item: Into<String>,
        P: IntoIterator,
        P::Item: Into<String>,
    {
        Self {
            mirrors: mirrors.into_iter().map(Into::into).collect(),
            publishes: publishes.into_iter().map(Into::into).collect(),
        }
    }

    /// Ask aptly for its current mirrors and publishes.
    ///
    /// Returns `Error::ProgramNotFound` when aptly is not installed at
    /// `program`.
    pub fn query(program: &Path) -> Result<Self> {
        let mirrors = list_raw(program, "mirror")?;
        let publishes = list_raw(program, "publish")?;
        Ok(Self { mirrors, publishes })
    }

    /// Whether an aptly mirror with exactly this name exists.
    pub fn has_mirror(&self, name: &str) -> bool {
        self.mirrors.iter().any(|m| m == name)
    }

    /// Whether `name` is already published for `distribution`.
    ///
    /// `aptly publish list -raw` prints one `<prefix> <distribution>` line
    /// per publish.
    pub fn has_publish(&self, name: &str, distribution: &str) -> bool {
        let wanted = format!("{} {}", name, distribution);
        self.publishes.iter().any(|p| *p == wanted)
    }
}

fn list_raw(program: &Path, kind: &str) -> Result<Vec<String>> {
    let invocation = Invocation::new(program).args([kind, "list", "-raw"]);

    let output = invocation
        .to_command()
        .output()
        .map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => Error::ProgramNotFound {
                program: program.to_path_buf(),
            },
            _ => Error::Command {
                command: invocation.to_string(),
                message: e.to_string(),
            },
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::Command {
            command: invocation.to_string(),
            message: format!("{}: {}", output.status, stderr.trim()),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(str::to_string)
        .collect())
}

/// Mirrors one or more remote APT locations into aptly and publishes them.
#[derive(Debug, Clone)]
pub struct AptlyAgent {
    base: MirrorBase,
    program: PathBuf,
    /// `(aptly mirror name, url)` pairs in configuration order.
    locations: Vec<(String, String)>,
    distribution: String,
    architectures: Vec<String>,
    inventory: Arc<AptlyInventory>,
}

impl AptlyAgent {
    pub fn new(
        entry: &MirrorEntry<AptlyMirror>,
        config: &Config,
        inventory: Arc<AptlyInventory>,
    ) -> Self {
        let spec = &entry.spec;
        let locations = spec.resolved_locations(&entry.name);
        let host = if spec.has_multiple_locations() {
            MULTIPLE_HOSTS.to_string()
        } else {
            locations
                .first()
                .map(|(_, url)| url.clone())
                .unwrap_or_default()
        };

        Self {
            base: MirrorBase {
                name: entry.name.clone(),
                host,
                root: "N/A".to_string(),
                basedir: mirror_basedir(
                    &config.basedir,
                    spec.prefix.as_deref(),
                    &config.prefixes.aptly,
                ),
                includes: spec.includes.clone(),
                excludes: spec.excludes.clone(),
            },
            program: config.programs.aptly.clone(),
            locations,
            distribution: spec.distribution.clone(),
            architectures: spec.architectures.clone(),
            inventory,
        }
    }

    /// Commands for a run stamped with `timestamp`.
    pub fn calls_at(&self, timestamp: &str) -> Vec<Invocation> {
        let mut calls = self.update_mirrors(timestamp);
        calls.extend(self.publish_snapshots(timestamp));
        calls
    }

    fn update_mirrors(&self, timestamp: &str) -> Vec<Invocation> {
        let mut calls = Vec::with_capacity(self.locations.len() * 3);

        for (mirror, url) in &self.locations {
            if !self.inventory.has_mirror(mirror) {
                calls.push(self.create_mirror(mirror, url));
            }
            calls.push(self.aptly().args(["mirror", "update", mirror.as_str()]));
            calls.push(self.aptly().args([
                "snapshot",
                "create",
                snapshot_name(mirror, timestamp).as_str(),
                "from",
                "mirror",
                mirror.as_str(),
            ]));
        }

        calls
    }

    fn publish_snapshots(&self, timestamp: &str) -> Vec<Invocation> {
        let mut calls = Vec::with_capacity(2);

        // A lone location is published straight from its own snapshot.
        let snapshot = match self.locations.as_slice() {
            [(mirror, _)] => snapshot_name(mirror, timestamp),
            _ => {
                let merged = snapshot_name(&format!("{}-ALL", self.base.name), timestamp);
                calls.push(
                    self.aptly()
                        .args(["snapshot", "merge", merged.as_str()])
                        .args(
                            self.locations
                                .iter()
                                .map(|(mirror, _)| snapshot_name(mirror, timestamp)),
                        ),
                );
                merged
            }
        };

        let distribution = self.distribution.trim_end_matches('/');
        if self.inventory.has_publish(&self.base.name, distribution) {
            calls.push(self.aptly().args([
                "publish",
                "switch",
                distribution,
                self.base.name.as_str(),
                snapshot.as_str(),
            ]));
        } else {
            calls.push(self.aptly().args([
                "publish",
                "snapshot",
                format!("-distribution={}", distribution).as_str(),
                snapshot.as_str(),
                self.base.name.as_str(),
            ]));
        }

        calls
    }

    fn create_mirror(&self, mirror: &str, url: &str) -> Invocation {
        self.aptly().args([
            "mirror",
            "create",
            format!("-architectures={}", self.architectures.join(",")).as_str(),
            mirror,
            url,
            self.distribution.as_str(),
        ])
    }

    fn aptly(&self) -> Invocation {
        Invocation::new(&self.program)
    }
}

fn snapshot_name(source: &str, timestamp: &str) -> String {
    format!("{}__{}", source, timestamp)
}

impl MirrorAgent for AptlyAgent {
    fn base(&self) -> &MirrorBase {
        &self.base
    }

    fn calls(&self) -> Vec<Invocation> {
        self.calls_at(&snapshot_timestamp())
    }
}

/// Query aptly once and build an agent per configured aptly mirror.
///
/// Returns `Ok(None)` after logging when aptly itself is missing. Any other
/// failure to list the aptly state is an error.
pub fn build_agents(config: &Config) -> Result<Option<Vec<Box<dyn MirrorAgent>>>> {
    if config.mirrors.aptly.is_empty() {
        return Ok(Some(Vec::new()));
    }

    let inventory = match AptlyInventory::query(&config.programs.aptly) {
        Ok(inventory) => Arc::new(inventory),
        Err(Error::ProgramNotFound { program }) => {
            error!(
                "The required program {} was not found, no packages synced",
                program.display()
            );
            return Ok(None);
        }
        Err(e) => return Err(e),
    };

    Ok(Some(
        config
            .mirrors
            .aptly
            .iter()
            .map(|entry| {
                Box::new(AptlyAgent::new(entry, config, Arc::clone(&inventory)))
                    as Box<dyn MirrorAgent>
            })
            .collect(),
    ))
}
