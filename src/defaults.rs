//! Default values for pkgmirror configuration.
//!
//! This module provides centralized default values used by the configuration
//! loader and the agents, ensuring consistency and avoiding duplication.

use std::path::PathBuf;

/// Location of the configuration file when neither `--config` nor
/// `PKGMIRROR_CONFIG` is given.
pub const CONFIG_PATH: &str = "/etc/pkgmirror.yaml";

/// Default path of the `debmirror` executable.
pub const DEBMIRROR_PROGRAM: &str = "/usr/bin/debmirror";

/// Default path of the `rsync` executable.
pub const RSYNC_PROGRAM: &str = "/usr/bin/rsync";

/// Default path of the `aptly` executable.
pub const APTLY_PROGRAM: &str = "/usr/bin/aptly";

/// Default path of the `hardlink` executable.
pub const HARDLINK_PROGRAM: &str = "/usr/bin/hardlink";

/// Directory under `basedir` used by debmirror mirrors without a `prefix`.
pub const DEBMIRROR_PREFIX: &str = "debmirror";

/// Directory under `basedir` used by rsync mirrors without a `prefix`.
pub const RSYNC_PREFIX: &str = "rsync";

/// Directory under `basedir` used by aptly mirrors without a `prefix`.
pub const APTLY_PREFIX: &str = "aptly";

/// Worker count for the debmirror/rsync pass.
pub const MIRROR_POOL_SIZE: usize = 2;

/// Worker count for the aptly pass. aptly keeps a single on-disk database
/// that does not tolerate concurrent writers.
pub const APTLY_POOL_SIZE: usize = 1;

/// Returns the default configuration file path.
pub fn config_path() -> PathBuf {
    PathBuf::from(CONFIG_PATH)
}
