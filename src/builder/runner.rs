//! Running toolchain commands.

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::builder::toolchain::CommandSpec;
use crate::util::process::ProcessBuilder;

/// How a command that was started ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolOutcome {
    Success,
    /// Nonzero exit; `None` when the process was killed by a signal
    Failed { code: Option<i32> },
}

impl ToolOutcome {
    pub fn success(&self) -> bool {
        matches!(self, ToolOutcome::Success)
    }

    pub fn code(&self) -> Option<i32> {
        match self {
            ToolOutcome::Success => Some(0),
            ToolOutcome::Failed { code } => *code,
        }
    }
}

/// Executes commands on behalf of the orchestrator.
pub trait CommandRunner {
    /// Run a command to completion.
    ///
    /// `Err` means the process could not be launched; a process that ran and
    /// failed is `Ok(ToolOutcome::Failed { .. })`.
    fn run(&self, command: &CommandSpec) -> Result<ToolOutcome>;
}

/// Runs commands as child processes with inherited stdio.
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    cwd: PathBuf,
}

impl ProcessRunner {
    /// Create a runner whose commands run in `cwd` (the build root).
    pub fn new(cwd: impl AsRef<Path>) -> Self {
        ProcessRunner {
            cwd: cwd.as_ref().to_path_buf(),
        }
    }
}

impl CommandRunner for ProcessRunner {
    fn run(&self, command: &CommandSpec) -> Result<ToolOutcome> {
        let process = ProcessBuilder::new(&command.program)
            .args(&command.args)
            .cwd(&self.cwd);

        tracing::debug!("running `{}`", process.display_command());
        let status = process.status()?;

        Ok(if status.success() {
            ToolOutcome::Success
        } else {
            ToolOutcome::Failed {
                code: status.code(),
            }
        })
    }
}
