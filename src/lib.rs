//! # pkgmirror Library
//!
//! This library keeps local copies of package repositories up to date by
//! driving existing mirroring tools (`debmirror`, `rsync`, `aptly`) with
//! arguments derived from a static YAML configuration. It is used by the
//! `pkgmirror` command-line tool.
//!
//! ## Quick Example
//!
//! ```
//! use pkgmirror::agents::{self, MirrorAgent};
//! use pkgmirror::config;
//!
//! let config = config::parse(r#"
//! basedir: /srv/mirror
//! logdir: /var/log/pkgmirror
//! mirrors:
//!   rsync:
//!     centos:
//!       host: mirror.example.org
//!       root: centos
//! "#).unwrap();
//!
//! let agents = agents::build_mirror_agents(&config);
//! let calls = agents[0].calls();
//! assert_eq!(calls.len(), 1);
//! assert!(calls[0].to_string().ends_with("mirror.example.org::centos /srv/mirror/rsync/centos/"));
//! ```
//!
//! ## Core Concepts
//!
//! - **Configuration (`config`)**: the YAML schema and its loader.
//! - **Agents (`agents`)**: one per configured mirror, each producing the
//!   ordered list of external commands that update it.
//! - **Runner (`runner`)**: executes an agent's commands with output captured
//!   in per-mirror log files.
//! - **Orchestrator (`orchestrator`)**: runs debmirror/rsync agents two at a
//!   time, aptly agents one at a time, then deduplicates the mirror tree
//!   with `hardlink`.

pub mod agents;
pub mod config;
pub mod defaults;
pub mod error;
pub mod logging;
pub mod orchestrator;
pub mod runner;
