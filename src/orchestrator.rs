//! # Sync Orchestrator
//!
//! Runs a complete synchronization pass:
//!
//! 1.  **Mirror pass**: debmirror and rsync agents run on a worker pool of
//!     two threads. An agent error stops new agents from starting and
//!     aborts the run once the running ones finish.
//! 2.  **aptly pass**: the aptly state is listed once, then aptly agents run
//!     one at a time. aptly keeps a single database that is not safe for
//!     concurrent writers, so the pool has exactly one thread.
//! 3.  **Deduplication**: `hardlink` replaces identical files under
//!     `basedir` with hard links.

use std::fmt;
use std::path::Path;

use log::{debug, error, info, warn};
use rayon::prelude::*;

use crate::agents::{self, aptly, Invocation, MirrorAgent};
use crate::config::Config;
use crate::defaults;
use crate::error::{Error, Result};
use crate::runner::{self, RunSettings, SyncOutcome};

/// Outcome of one agent within a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentReport {
    pub name: String,
    pub outcome: SyncOutcome,
}

/// Everything that happened during a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Reports in execution-pass order: debmirror/rsync first, then aptly.
    pub agents: Vec<AgentReport>,
    /// Outcome of the hardlink pass.
    pub hardlink: Option<SyncOutcome>,
}

impl RunSummary {
    /// Number of agents that could not run because a program was missing.
    pub fn missing_programs(&self) -> usize {
        self.agents
            .iter()
            .filter(|r| matches!(r.outcome, SyncOutcome::ProgramMissing(_)))
            .count()
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} mirror(s) processed, {} skipped",
            self.agents.len(),
            self.missing_programs()
        )
    }
}

/// Run every configured mirror, then deduplicate the mirror tree.
pub fn run(config: &Config) -> Result<RunSummary> {
    let settings = RunSettings::from(config);
    let mut summary = RunSummary::default();

    let mirrors = agents::build_mirror_agents(config);
    summary
        .agents
        .extend(run_pool(&mirrors, defaults::MIRROR_POOL_SIZE, &settings)?);

    match aptly::build_agents(config)? {
        Some(aptly_agents) => {
            summary
                .agents
                .extend(run_pool(&aptly_agents, defaults::APTLY_POOL_SIZE, &settings)?);
        }
        None => {
            summary
                .agents
                .extend(config.mirrors.aptly.iter().map(|entry| AgentReport {
                    name: entry.name.clone(),
                    outcome: SyncOutcome::ProgramMissing(config.programs.aptly.clone()),
                }));
        }
    }

    summary.hardlink = Some(deduplicate(config)?);
    Ok(summary)
}

/// Run agents on a dedicated pool of `threads` workers.
///
/// Reports come back in agent order. After the first error no further agent
/// is started and that error is returned.
pub fn run_pool(
    agents: &[Box<dyn MirrorAgent>],
    threads: usize,
    settings: &RunSettings,
) -> Result<Vec<AgentReport>> {
    if agents.is_empty() {
        return Ok(Vec::new());
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .thread_name(|i| format!("pkgmirror-{}", i))
        .build()?;

    pool.install(|| {
        agents
            .par_iter()
            .map(|agent| {
                runner::run_agent(agent.as_ref(), settings)
                    .map(|outcome| AgentReport {
                        name: agent.name().to_string(),
                        outcome,
                    })
                    .map_err(|e| {
                        error!("Mirror sync of '{}' failed: {}", agent.name(), e);
                        e
                    })
            })
            .collect()
    })
}

/// Hard-link identical files under `basedir`.
fn deduplicate(config: &Config) -> Result<SyncOutcome> {
    let call = hardlink_invocation(&config.programs.hardlink, &config.basedir);
    debug!("{}", call);

    if config.noop {
        info!(
            "Skipping hardlink pass over {} in noop mode",
            config.basedir.display()
        );
        return Ok(SyncOutcome::DryRun);
    }

    info!("Deduplicating {}", config.basedir.display());
    match runner::execute(&call, None) {
        Ok(status) => {
            if !status.success() {
                warn!("'{}' exited with {}", call, status);
            }
            Ok(SyncOutcome::Completed)
        }
        Err(Error::ProgramNotFound { program }) => {
            error!(
                "The required program {} was not found, no packages synced",
                program.display()
            );
            Ok(SyncOutcome::ProgramMissing(program))
        }
        Err(e) => Err(e),
    }
}

fn hardlink_invocation(program: &Path, basedir: &Path) -> Invocation {
    Invocation::new(program)
        .arg("-fpot")
        .arg(basedir.display().to_string())
}
