//! # Command Runner
//!
//! Executes the invocations produced by a [`MirrorAgent`], one after the
//! other, with the programs' stdout and stderr captured in
//! `<logdir>/<name>.out` and `<logdir>/<name>.err`.
//!
//! A program that does not exist is the only recoverable failure: it is
//! logged, the agent's remaining invocations are skipped, and the run goes
//! on with the next agent. A program that exits unsuccessfully is logged as a
//! warning and does not stop the agent.

use std::fmt;
use std::fs::{self, File};
use std::io::ErrorKind;
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};

use log::{debug, error, info, warn};

use crate::agents::{Invocation, MirrorAgent};
use crate::config::Config;
use crate::error::{Error, Result};

/// Settings the runner needs from the configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSettings {
    pub logdir: PathBuf,
    pub noop: bool,
}

impl From<&Config> for RunSettings {
    fn from(config: &Config) -> Self {
        Self {
            logdir: config.logdir.clone(),
            noop: config.noop,
        }
    }
}

/// What happened to an agent's invocations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Every invocation was executed.
    Completed,
    /// Invocations were logged but not executed.
    DryRun,
    /// The named program was missing; later invocations were skipped.
    ProgramMissing(PathBuf),
}

impl fmt::Display for SyncOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncOutcome::Completed => write!(f, "completed"),
            SyncOutcome::DryRun => write!(f, "dry run"),
            SyncOutcome::ProgramMissing(program) => {
                write!(f, "skipped, {} not found", program.display())
            }
        }
    }
}

/// Performs a full mirror update with the given agent.
pub fn run_agent(agent: &dyn MirrorAgent, settings: &RunSettings) -> Result<SyncOutcome> {
    info!(
        "Syncing repository '{}' hosted at {}",
        agent.name(),
        agent.host()
    );

    fs::create_dir_all(&settings.logdir)?;
    let stdout = File::create(settings.logdir.join(format!("{}.out", agent.name())))?;
    let stderr = File::create(settings.logdir.join(format!("{}.err", agent.name())))?;

    for call in agent.calls() {
        debug!("{}", call);

        if settings.noop {
            continue;
        }

        let output = Output {
            stdout: &stdout,
            stderr: &stderr,
        };
        match execute(&call, Some(output)) {
            Ok(status) if !status.success() => {
                warn!("'{}' for '{}' exited with {}", call, agent.name(), status);
            }
            Ok(_) => {}
            Err(Error::ProgramNotFound { program }) => {
                error!(
                    "The required program {} was not found, no packages synced",
                    program.display()
                );
                return Ok(SyncOutcome::ProgramMissing(program));
            }
            Err(e) => return Err(e),
        }
    }

    Ok(if settings.noop {
        SyncOutcome::DryRun
    } else {
        SyncOutcome::Completed
    })
}

/// Destination files for a child process's output streams.
#[derive(Debug, Clone, Copy)]
pub struct Output<'a> {
    pub stdout: &'a File,
    pub stderr: &'a File,
}

/// Run one invocation to completion.
///
/// Output is inherited from this process unless `output` is given. A missing
/// program is reported as `Error::ProgramNotFound`.
pub fn execute(call: &Invocation, output: Option<Output<'_>>) -> Result<ExitStatus> {
    let mut command = call.to_command();
    if let Some(output) = output {
        command
            .stdout(Stdio::from(output.stdout.try_clone()?))
            .stderr(Stdio::from(output.stderr.try_clone()?));
    }

    command.status().map_err(|e| match e.kind() {
        ErrorKind::NotFound => Error::ProgramNotFound {
            program: call.program.clone(),
        },
        _ => Error::Command {
            command: call.to_string(),
            message: e.to_string(),
        },
    })
}
