//! Agent for arbitrary file trees mirrored with `rsync`.

use std::path::PathBuf;

use super::{mirror_basedir, Invocation, MirrorAgent, MirrorBase};
use crate::config::{Config, MirrorEntry, RsyncMirror};

/// Mirrors a module from an rsync daemon.
#[derive(Debug, Clone, PartialEq)]
pub struct RsyncAgent {
    base: MirrorBase,
    program: PathBuf,
}

impl RsyncAgent {
    pub fn new(entry: &MirrorEntry<RsyncMirror>, config: &Config) -> Self {
        let spec = &entry.spec;
        Self {
            base: MirrorBase {
                name: entry.name.clone(),
                host: spec.host.clone(),
                root: spec.root.clone(),
                basedir: mirror_basedir(
                    &config.basedir,
                    spec.prefix.as_deref(),
                    &config.prefixes.rsync,
                ),
                includes: spec.includes.clone(),
                excludes: spec.excludes.clone(),
            },
            program: config.programs.rsync.clone(),
        }
    }

    fn core_args() -> [&'static str; 8] {
        [
            "--verbose",
            "--archive",
            "--sparse",
            "--hard-links",
            "--partial",
            "--delete-delay",
            "--delete-excluded",
            "--delay-updates",
        ]
    }

    fn program_args(&self) -> Vec<String> {
        let mut args: Vec<String> = Self::core_args().iter().map(|a| a.to_string()).collect();

        args.extend(self.base.excludes.iter().map(|p| format!("--exclude={}", p)));
        args.extend(self.base.includes.iter().map(|p| format!("--include={}", p)));

        args.push(format!("{}::{}", self.base.host, self.base.root));
        // Trailing slash: sync into the directory, not into a subdirectory of it.
        args.push(format!("{}/", self.base.target().display()));
        args
    }
}

impl MirrorAgent for RsyncAgent {
    fn base(&self) -> &MirrorBase {
        &self.base
    }

    fn calls(&self) -> Vec<Invocation> {
        vec![Invocation::new(&self.program).args(self.program_args())]
    }
}
