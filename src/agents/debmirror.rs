//! Agent for APT repositories mirrored with `debmirror`.

use std::path::PathBuf;

use super::{mirror_basedir, Invocation, MirrorAgent, MirrorBase};
use crate::config::{Config, DebmirrorMirror, MirrorEntry};

/// Mirrors an APT repository over HTTP with a single `debmirror` run.
#[derive(Debug, Clone, PartialEq)]
pub struct DebmirrorAgent {
    base: MirrorBase,
    program: PathBuf,
    architectures: Vec<String>,
    distributions: Vec<String>,
    sections: Vec<String>,
    di_dists: Vec<String>,
    exclude_sources: bool,
}

impl DebmirrorAgent {
    pub fn new(entry: &MirrorEntry<DebmirrorMirror>, config: &Config) -> Self {
        let spec = &entry.spec;
        Self {
            base: MirrorBase {
                name: entry.name.clone(),
                host: spec.host.clone(),
                root: spec.root.clone(),
                basedir: mirror_basedir(
                    &config.basedir,
                    spec.prefix.as_deref(),
                    &config.prefixes.debmirror,
                ),
                includes: spec.includes.clone(),
                excludes: spec.excludes.clone(),
            },
            program: config.programs.debmirror.clone(),
            architectures: spec.architectures.clone(),
            distributions: spec.dists.clone(),
            sections: spec.sections.clone(),
            di_dists: spec.di_dists.clone(),
            exclude_sources: spec.exclude_sources,
        }
    }

    fn core_args() -> [&'static str; 2] {
        ["--verbose", "--method=http"]
    }

    fn program_args(&self) -> Vec<String> {
        let mut args: Vec<String> = Self::core_args().iter().map(|a| a.to_string()).collect();

        args.extend(self.base.excludes.iter().map(|p| format!("--exclude={}", p)));
        args.extend(self.base.includes.iter().map(|p| format!("--include={}", p)));

        args.push(format!("--arch={}", self.architectures.join(",")));
        args.push(format!("--dist={}", self.distributions.join(",")));
        args.push(format!("--section={}", self.sections.join(",")));

        if !self.di_dists.is_empty() {
            args.push(format!("--di-dist={}", self.di_dists.join(",")));
        }
        if self.exclude_sources {
            args.push("--nosource".to_string());
        }

        args.push(format!("--host={}", self.base.host));
        args.push(format!("--root={}", self.base.root));
        args.push(self.base.target().display().to_string());
        args
    }
}

impl MirrorAgent for DebmirrorAgent {
    fn base(&self) -> &MirrorBase {
        &self.base
    }

    fn calls(&self) -> Vec<Invocation> {
        vec![Invocation::new(&self.program).args(self.program_args())]
    }
}
