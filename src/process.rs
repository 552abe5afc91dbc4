//! External-process invocation behind a capability trait.
//!
//! The pipeline never touches `std::process` directly; it depends on
//! [`ProcessRunner`], which the binary satisfies with [`SystemRunner`] and
//! the integration tests satisfy with a scripted double. Tool stdout and
//! stderr are inherited, so masscan and zgrab2 talk to the operator's
//! terminal themselves; the pipeline only observes success or failure.

use std::path::PathBuf;
use std::process::Command;

use log::debug;
use thiserror::Error;

/// Errors surfaced by a [`ProcessRunner`].
#[derive(Debug, Error)]
pub enum ProcessError {
    /// The program could not be started at all.
    #[error("failed to start {program}: {source}")]
    Spawn {
        /// Program that failed to start.
        program: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The program ran and exited unsuccessfully.
    #[error("{program} exited with {status}")]
    Failed {
        /// Program that failed.
        program: String,
        /// Render of the exit status (code or signal).
        status: String,
    },
}

/// A fully-specified external command: program, arguments, and an optional
/// working directory. No shell is involved, so arguments need no quoting.
#[derive(Debug, Clone)]
pub struct ToolCommand {
    /// Program name or path.
    pub program: String,
    /// Arguments, in order.
    pub args: Vec<String>,
    /// Directory to run in; the current directory when `None`.
    pub cwd: Option<PathBuf>,
}

impl ToolCommand {
    /// Builds a command from anything string-like.
    pub fn new<P, I, S>(program: P, args: I) -> Self
    where
        P: Into<String>,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            cwd: None,
        }
    }

    /// Sets the working directory.
    #[must_use]
    pub fn in_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    /// One-line render for logging.
    #[must_use]
    pub fn render(&self) -> String {
        let mut rendered = self.program.clone();
        for arg in &self.args {
            rendered.push(' ');
            rendered.push_str(arg);
        }
        rendered
    }
}

/// Capability to run an external command to completion.
pub trait ProcessRunner {
    /// Runs the command, blocking until it exits. `Ok(())` iff the exit
    /// status was success.
    fn run(&self, command: &ToolCommand) -> Result<(), ProcessError>;
}

/// The production runner: spawns through [`std::process::Command`] with
/// inherited stdio and blocks for the exit status.
#[derive(Debug, Default)]
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
    fn run(&self, command: &ToolCommand) -> Result<(), ProcessError> {
        debug!("running: {}", command.render());

        let mut process = Command::new(&command.program);
        process.args(&command.args);
        if let Some(cwd) = &command.cwd {
            process.current_dir(cwd);
        }

        let status = process.status().map_err(|source| ProcessError::Spawn {
            program: command.program.clone(),
            source,
        })?;

        if status.success() {
            Ok(())
        } else {
            Err(ProcessError::Failed {
                program: command.program.clone(),
                status: status.to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ProcessRunner, SystemRunner, ToolCommand};

    #[test]
    fn render_joins_program_and_args() {
        let command = ToolCommand::new("masscan", ["-p80,443", "-iL", "list"]);
        assert_eq!(command.render(), "masscan -p80,443 -iL list");
    }

    #[test]
    fn successful_command_is_ok() {
        let command = ToolCommand::new("true", Vec::<String>::new());
        assert!(SystemRunner.run(&command).is_ok());
    }

    #[test]
    fn failing_command_reports_status() {
        let command = ToolCommand::new("false", Vec::<String>::new());
        let err = SystemRunner.run(&command).unwrap_err();
        assert!(err.to_string().contains("false"));
    }

    #[test]
    fn unknown_program_reports_spawn_error() {
        let command = ToolCommand::new("titlescan-no-such-binary", Vec::<String>::new());
        let err = SystemRunner.run(&command).unwrap_err();
        assert!(err.to_string().contains("failed to start"));
    }
}
