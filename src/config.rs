//! # Configuration Schema and Parsing
//!
//! This module defines the data structures that represent the pkgmirror YAML
//! configuration file and the logic for loading it.
//!
//! ## Layout
//!
//! ```yaml
//! basedir: /srv/mirror
//! logdir: /var/log/pkgmirror
//! loglevel: INFO
//! noop: false
//! debmirror_default_prefix: debian
//! mirrors:
//!   debmirror:
//!     debian:
//!       host: deb.debian.org
//!       root: debian
//!       architectures: [amd64]
//!       dists: [bookworm]
//!       sections: [main]
//!   rsync:
//!     centos:
//!       host: mirror.example.org
//!       root: centos
//!   aptly:
//!     docker:
//!       location: https://download.docker.com/linux/debian
//!       distribution: bookworm
//!       architectures: [amd64]
//! ```
//!
//! ## Parsing
//!
//! The file is first decoded into loosely typed raw structures. Each named
//! mirror is then decoded on its own so that errors can name the mirror at
//! fault, and so that mirrors keep the order in which they appear in the
//! file. The resulting `Config` is immutable for the rest of the run.

use std::path::{Path, PathBuf};

use log::LevelFilter;
use serde::de::{self, DeserializeOwned, Deserializer};
use serde::Deserialize;
use serde_yaml::{Mapping, Value};

use crate::defaults;
use crate::error::{Error, Result};
use crate::logging;

/// Fully loaded configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Root directory under which all mirrors are stored.
    pub basedir: PathBuf,
    /// Directory receiving the per-mirror `.out` and `.err` files.
    pub logdir: PathBuf,
    /// Log level requested by the file, if any.
    pub loglevel: Option<LevelFilter>,
    /// Log commands without executing them.
    pub noop: bool,
    /// Default directories under `basedir`, per transport.
    pub prefixes: Prefixes,
    /// Locations of the external programs.
    pub programs: Programs,
    /// Configured mirrors, per transport.
    pub mirrors: Mirrors,
}

/// Default directory names under `basedir` for each transport.
#[derive(Debug, Clone, PartialEq)]
pub struct Prefixes {
    pub debmirror: String,
    pub rsync: String,
    pub aptly: String,
}

impl Default for Prefixes {
    fn default() -> Self {
        Self {
            debmirror: defaults::DEBMIRROR_PREFIX.to_string(),
            rsync: defaults::RSYNC_PREFIX.to_string(),
            aptly: defaults::APTLY_PREFIX.to_string(),
        }
    }
}

/// Paths to the external programs pkgmirror drives.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Programs {
    #[serde(default = "default_debmirror_program")]
    pub debmirror: PathBuf,
    #[serde(default = "default_rsync_program")]
    pub rsync: PathBuf,
    #[serde(default = "default_aptly_program")]
    pub aptly: PathBuf,
    #[serde(default = "default_hardlink_program")]
    pub hardlink: PathBuf,
}

fn default_debmirror_program() -> PathBuf {
    PathBuf::from(defaults::DEBMIRROR_PROGRAM)
}

fn default_rsync_program() -> PathBuf {
    PathBuf::from(defaults::RSYNC_PROGRAM)
}

fn default_aptly_program() -> PathBuf {
    PathBuf::from(defaults::APTLY_PROGRAM)
}

fn default_hardlink_program() -> PathBuf {
    PathBuf::from(defaults::HARDLINK_PROGRAM)
}

impl Default for Programs {
    fn default() -> Self {
        Self {
            debmirror: default_debmirror_program(),
            rsync: default_rsync_program(),
            aptly: default_aptly_program(),
            hardlink: default_hardlink_program(),
        }
    }
}

/// A mirror definition together with the name it was configured under.
#[derive(Debug, Clone, PartialEq)]
pub struct MirrorEntry<T> {
    pub name: String,
    pub spec: T,
}

/// All configured mirrors, in file order within each transport.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mirrors {
    pub debmirror: Vec<MirrorEntry<DebmirrorMirror>>,
    pub rsync: Vec<MirrorEntry<RsyncMirror>>,
    pub aptly: Vec<MirrorEntry<AptlyMirror>>,
}

impl Mirrors {
    /// Total number of configured mirrors across all transports.
    pub fn len(&self) -> usize {
        self.debmirror.len() + self.rsync.len() + self.aptly.len()
    }

    /// Returns `true` when no mirror is configured at all.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// An APT repository mirrored with debmirror.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DebmirrorMirror {
    /// Remote host serving the repository.
    pub host: String,
    /// Path of the repository on the remote host.
    pub root: String,
    /// Directory under `basedir`; falls back to the transport default.
    #[serde(default)]
    pub prefix: Option<String>,
    #[serde(default)]
    pub includes: Vec<String>,
    #[serde(default)]
    pub excludes: Vec<String>,
    pub architectures: Vec<String>,
    pub dists: Vec<String>,
    pub sections: Vec<String>,
    /// Distributions to fetch debian-installer files for.
    #[serde(default, rename = "di-dists")]
    pub di_dists: Vec<String>,
    /// Skip source packages.
    #[serde(default = "default_true")]
    pub exclude_sources: bool,
}

fn default_true() -> bool {
    true
}

/// A generic file tree mirrored with rsync.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RsyncMirror {
    /// Remote rsync daemon host.
    pub host: String,
    /// Module and path on the rsync daemon.
    pub root: String,
    #[serde(default)]
    pub prefix: Option<String>,
    #[serde(default)]
    pub includes: Vec<String>,
    #[serde(default)]
    pub excludes: Vec<String>,
}

/// An APT repository mirrored, snapshotted and published with aptly.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AptlyMirror {
    /// Single remote location, registered under the mirror's own name.
    #[serde(default)]
    pub location: Option<String>,
    /// Several named remote locations merged into one publish.
    #[serde(default, deserialize_with = "ordered_pairs")]
    pub locations: Option<Vec<(String, String)>>,
    pub distribution: String,
    pub architectures: Vec<String>,
    #[serde(default)]
    pub prefix: Option<String>,
    #[serde(default)]
    pub includes: Vec<String>,
    #[serde(default)]
    pub excludes: Vec<String>,
}

impl AptlyMirror {
    /// Remote locations as `(aptly mirror name, url)` pairs, in file order.
    ///
    /// `locations` wins when both keys are present.
    pub fn resolved_locations(&self, name: &str) -> Vec<(String, String)> {
        match (&self.locations, &self.location) {
            (Some(locations), _) => locations.clone(),
            (None, Some(location)) => vec![(name.to_string(), location.clone())],
            (None, None) => Vec::new(),
        }
    }

    /// Returns `true` when the mirror was configured with a `locations`
    /// mapping rather than a single `location`.
    pub fn has_multiple_locations(&self) -> bool {
        self.locations.is_some()
    }
}

/// Decodes a YAML mapping of scalars into ordered string pairs.
fn ordered_pairs<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<Vec<(String, String)>>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(mapping) = Option::<Mapping>::deserialize(deserializer)? else {
        return Ok(None);
    };

    mapping
        .into_iter()
        .map(|(key, value)| -> std::result::Result<(String, String), D::Error> {
            let key = scalar_to_string(&key).ok_or_else(|| {
                <D::Error as de::Error>::custom("location names must be scalars")
            })?;
            let value = scalar_to_string(&value).ok_or_else(|| {
                <D::Error as de::Error>::custom(format!("location '{}' must be a URL", key))
            })?;
            Ok((key, value))
        })
        .collect::<std::result::Result<Vec<_>, D::Error>>()
        .map(Some)
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    #[serde(default)]
    basedir: Option<PathBuf>,
    #[serde(default)]
    logdir: Option<PathBuf>,
    #[serde(default)]
    loglevel: Option<Value>,
    #[serde(default)]
    noop: Option<bool>,
    #[serde(default)]
    debmirror_default_prefix: Option<String>,
    #[serde(default)]
    rsync_default_prefix: Option<String>,
    #[serde(default)]
    aptly_default_prefix: Option<String>,
    #[serde(default)]
    programs: Option<Programs>,
    #[serde(default)]
    mirrors: Option<RawMirrors>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawMirrors {
    #[serde(default)]
    debmirror: Option<Mapping>,
    #[serde(default)]
    rsync: Option<Mapping>,
    #[serde(default)]
    aptly: Option<Mapping>,
}

/// Parse a YAML string into a `Config`.
pub fn parse(yaml_content: &str) -> Result<Config> {
    let raw: RawConfig = serde_yaml::from_str(yaml_content)?;

    let basedir = raw.basedir.ok_or_else(|| Error::ConfigParse {
        message: "Missing required key 'basedir'".to_string(),
        hint: Some("Set 'basedir' to the directory that holds all mirrors".to_string()),
    })?;
    let logdir = raw.logdir.ok_or_else(|| Error::ConfigParse {
        message: "Missing required key 'logdir'".to_string(),
        hint: Some("Set 'logdir' to a directory for per-mirror output files".to_string()),
    })?;

    let loglevel = match raw.loglevel {
        None | Some(Value::Null) => None,
        Some(value) => {
            let level = scalar_to_string(&value).ok_or_else(|| Error::ConfigParse {
                message: "'loglevel' must be a string".to_string(),
                hint: None,
            })?;
            Some(logging::parse_level(&level)?)
        }
    };

    let mut prefixes = Prefixes::default();
    if let Some(prefix) = raw.debmirror_default_prefix {
        prefixes.debmirror = prefix;
    }
    if let Some(prefix) = raw.rsync_default_prefix {
        prefixes.rsync = prefix;
    }
    if let Some(prefix) = raw.aptly_default_prefix {
        prefixes.aptly = prefix;
    }

    let raw_mirrors = raw.mirrors.unwrap_or_default();
    let mirrors = Mirrors {
        debmirror: decode_section("debmirror", raw_mirrors.debmirror)?,
        rsync: decode_section("rsync", raw_mirrors.rsync)?,
        aptly: decode_section("aptly", raw_mirrors.aptly)?,
    };

    for entry in &mirrors.aptly {
        if entry.spec.resolved_locations(&entry.name).is_empty() {
            return Err(Error::MirrorDefinition {
                transport: "aptly".to_string(),
                name: entry.name.clone(),
                message: "one of 'location' or 'locations' is required".to_string(),
            });
        }
    }

    Ok(Config {
        basedir,
        logdir,
        loglevel,
        noop: raw.noop.unwrap_or(false),
        prefixes,
        programs: raw.programs.unwrap_or_default(),
        mirrors,
    })
}

/// Decode every named mirror of one transport section, keeping file order.
fn decode_section<T: DeserializeOwned>(
    transport: &str,
    section: Option<Mapping>,
) -> Result<Vec<MirrorEntry<T>>> {
    let Some(section) = section else {
        return Ok(Vec::new());
    };

    let mut entries = Vec::with_capacity(section.len());
    for (key, value) in section {
        let name = scalar_to_string(&key).ok_or_else(|| Error::ConfigParse {
            message: format!("Mirror names under '{}' must be scalars", transport),
            hint: None,
        })?;
        let spec = serde_yaml::from_value(value).map_err(|e| Error::MirrorDefinition {
            transport: transport.to_string(),
            name: name.clone(),
            message: e.to_string(),
        })?;
        entries.push(MirrorEntry { name, spec });
    }

    Ok(entries)
}

/// Read and parse a configuration file.
pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Config> {
    let content = std::fs::read_to_string(path).map_err(Error::Io)?;
    parse(&content)
}
