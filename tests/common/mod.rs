//! Shared test utilities for the CLI end-to-end tests.
//!
//! The external mirroring programs are replaced by small shell scripts that
//! append their name and arguments to a record file. aptly stand-ins answer
//! `mirror list -raw` and `publish list -raw` from fixture files so tests can
//! control which aptly mirrors and publishes "already exist".
//!
//! ## Usage
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! let fixture = TestFixture::new().with_mirrors(RSYNC_ONLY);
//! fixture.command().assert().success();
//! assert_eq!(fixture.records().len(), 2);
//! ```

use assert_cmd::cargo::cargo_bin_cmd;
use assert_fs::prelude::*;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    pub use assert_cmd::cargo::cargo_bin_cmd;
    pub use assert_fs::prelude::*;
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::mirrors;
    pub use super::TestFixture;
}

/// Common `mirrors:` sections for testing.
#[allow(dead_code)]
pub mod mirrors {
    /// A single rsync mirror.
    pub const RSYNC_ONLY: &str = r#"
  rsync:
    centos:
      host: mirror.example.org
      root: centos
      excludes: ["*.iso"]
"#;

    /// One mirror per transport; the aptly one merges two locations.
    pub const ALL_TRANSPORTS: &str = r#"
  debmirror:
    debian:
      host: deb.debian.org
      root: debian
      architectures: [amd64, arm64]
      dists: [bookworm, bookworm-updates]
      sections: [main, contrib]
  rsync:
    centos:
      host: mirror.example.org
      root: centos
  aptly:
    puppet:
      locations:
        puppet-products: http://apt.puppetlabs.com
        puppet-deps: http://apt.puppetlabs.com/deps
      distribution: bookworm
      architectures: [amd64]
"#;

    /// A single-location aptly mirror.
    pub const APTLY_SINGLE: &str = r#"
  aptly:
    docker:
      location: https://download.docker.com/linux/debian
      distribution: bookworm
      architectures: [amd64]
"#;
}

/// A temporary directory holding a configuration file, stand-in programs,
/// a mirror root and a log directory.
pub struct TestFixture {
    temp_dir: assert_fs::TempDir,
}

impl TestFixture {
    /// Create a fixture with stand-ins for all four programs installed.
    pub fn new() -> Self {
        let fixture = Self {
            temp_dir: assert_fs::TempDir::new().expect("Failed to create temp directory"),
        };
        for program in ["debmirror", "rsync", "aptly", "hardlink"] {
            fixture.install_program(program);
        }
        fixture
    }

    fn install_program(&self, name: &str) {
        let script = format!(
            r#"#!/bin/sh
echo "{name} $*" >> "{record}"
if [ "$2" = "list" ] && [ "$3" = "-raw" ]; then
    cat "{dir}/aptly-$1-list" 2>/dev/null
    exit 0
fi
echo "stdout from {name}"
echo "stderr from {name}" >&2
"#,
            name = name,
            record = self.record_path().display(),
            dir = self.path().display(),
        );

        let path = self.program_path(name);
        std::fs::create_dir_all(path.parent().unwrap()).expect("Failed to create bin dir");
        std::fs::write(&path, script).expect("Failed to write program");
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))
            .expect("Failed to make program executable");
    }

    /// Remove a stand-in program so that it is reported as missing.
    pub fn without_program(self, name: &str) -> Self {
        std::fs::remove_file(self.program_path(name)).expect("Failed to remove program");
        self
    }

    /// Replace a stand-in with one that records its call and exits 1.
    #[allow(dead_code)]
    pub fn with_failing_program(self, name: &str) -> Self {
        let script = format!(
            "#!/bin/sh\necho \"{name} $*\" >> \"{record}\"\necho \"{name} failed\" >&2\nexit 1\n",
            name = name,
            record = self.record_path().display(),
        );
        std::fs::write(self.program_path(name), script).expect("Failed to write program");
        self
    }

    /// Strip the execute bit from a stand-in so spawning it fails.
    #[allow(dead_code)]
    pub fn with_unexecutable_program(self, name: &str) -> Self {
        std::fs::set_permissions(
            self.program_path(name),
            std::fs::Permissions::from_mode(0o644),
        )
        .expect("Failed to change program permissions");
        self
    }

    /// Lines printed by the aptly stand-in for `aptly mirror list -raw`.
    pub fn with_aptly_mirrors(self, lines: &[&str]) -> Self {
        self.write_lines("aptly-mirror-list", lines);
        self
    }

    /// Lines printed by the aptly stand-in for `aptly publish list -raw`.
    pub fn with_aptly_publishes(self, lines: &[&str]) -> Self {
        self.write_lines("aptly-publish-list", lines);
        self
    }

    fn write_lines(&self, file: &str, lines: &[&str]) {
        let mut content = lines.join("\n");
        content.push('\n');
        self.temp_dir
            .child(file)
            .write_str(&content)
            .expect("Failed to write fixture file");
    }

    /// Write `pkgmirror.yaml` with the given `mirrors:` section and any
    /// extra top-level lines.
    pub fn with_config(self, mirrors: &str, extra: &str) -> Self {
        let yaml = format!(
            "basedir: {base}\nlogdir: {logs}\n{extra}\nprograms:\n  debmirror: {debmirror}\n  rsync: {rsync}\n  aptly: {aptly}\n  hardlink: {hardlink}\nmirrors:{mirrors}",
            base = self.basedir().display(),
            logs = self.logdir().display(),
            extra = extra,
            debmirror = self.program_path("debmirror").display(),
            rsync = self.program_path("rsync").display(),
            aptly = self.program_path("aptly").display(),
            hardlink = self.program_path("hardlink").display(),
            mirrors = mirrors,
        );
        self.temp_dir
            .child("pkgmirror.yaml")
            .write_str(&yaml)
            .expect("Failed to write config file");
        self
    }

    /// Write `pkgmirror.yaml` with the given mirrors and nothing else.
    pub fn with_mirrors(self, mirrors: &str) -> Self {
        self.with_config(mirrors, "")
    }

    /// Command for the pkgmirror binary pointed at this fixture's config.
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = cargo_bin_cmd!("pkgmirror");
        cmd.current_dir(self.path())
            .env_remove("PKGMIRROR_CONFIG")
            .arg("--config")
            .arg(self.config_path());
        cmd
    }

    /// Every recorded program invocation, in the order they were made.
    pub fn records(&self) -> Vec<String> {
        std::fs::read_to_string(self.record_path())
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }

    /// Recorded invocations of one program.
    pub fn records_for(&self, program: &str) -> Vec<String> {
        let prefix = format!("{} ", program);
        self.records()
            .into_iter()
            .filter(|r| r.starts_with(&prefix))
            .collect()
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn config_path(&self) -> PathBuf {
        self.path().join("pkgmirror.yaml")
    }

    pub fn basedir(&self) -> PathBuf {
        self.path().join("mirror")
    }

    pub fn logdir(&self) -> PathBuf {
        self.path().join("logs")
    }

    pub fn program_path(&self, name: &str) -> PathBuf {
        self.path().join("bin").join(name)
    }

    fn record_path(&self) -> PathBuf {
        self.path().join("invocations.log")
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}
