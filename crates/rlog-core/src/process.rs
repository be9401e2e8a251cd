//! External command execution.
//!
//! Everything that shells out goes through [`CommandRunner`], so the bump
//! workflow can be driven by a scripted runner in tests.

use std::fmt;
use std::process::Command;

use camino::Utf8Path;
use thiserror::Error;
use tracing::{debug, instrument};

/// Errors from running an external command.
#[derive(Error, Debug)]
pub enum RunError {
    /// The program could not be started.
    #[error("failed to run {program}: {source}")]
    Spawn {
        /// Program name.
        program: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The program exited unsuccessfully.
    #[error("`{command}` exited with {}: {stderr}", status_text(.status))]
    Failed {
        /// The full command line.
        command: String,
        /// Exit code, if the process exited normally.
        status: Option<i32>,
        /// Captured stderr.
        stderr: String,
    },
}

fn status_text(status: &Option<i32>) -> String {
    status.map_or_else(|| "a signal".to_string(), |code| format!("status {code}"))
}

/// Result alias for command execution.
pub type RunResult<T> = Result<T, RunError>;

/// A program and its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Program name or path.
    pub program: String,
    /// Arguments, not including the program.
    pub args: Vec<String>,
}

impl Invocation {
    /// Build an invocation.
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                write!(f, " {arg:?}")?;
            } else {
                write!(f, " {arg}")?;
            }
        }
        Ok(())
    }
}

/// Captured output of a successful command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Output {
    /// Captured stdout.
    pub stdout: String,
    /// Captured stderr.
    pub stderr: String,
}

/// Runs external commands.
pub trait CommandRunner {
    /// Run `invocation` in `cwd`, failing on a non-zero exit.
    fn run(&self, invocation: &Invocation, cwd: &Utf8Path) -> RunResult<Output>;
}

/// Runs commands with [`std::process::Command`], capturing output.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    #[instrument(skip(self), fields(command = %invocation))]
    fn run(&self, invocation: &Invocation, cwd: &Utf8Path) -> RunResult<Output> {
        let output = Command::new(&invocation.program)
            .args(&invocation.args)
            .current_dir(cwd.as_std_path())
            .output()
            .map_err(|source| RunError::Spawn {
                program: invocation.program.clone(),
                source,
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        debug!(status = ?output.status.code(), "command finished");

        if output.status.success() {
            Ok(Output { stdout, stderr })
        } else {
            Err(RunError::Failed {
                command: invocation.to_string(),
                status: output.status.code(),
                stderr,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invocation_display_quotes_spaced_args() {
        let inv = Invocation::new("git", ["commit", "-m", "bump version to v1.2.4"]);
        assert_eq!(
            inv.to_string(),
            r#"git commit -m "bump version to v1.2.4""#
        );
    }

    #[test]
    fn system_runner_captures_stdout() {
        let cwd = Utf8Path::new(".");
        let out = SystemRunner
            .run(&Invocation::new("git", ["--version"]), cwd)
            .expect("git --version");
        assert!(out.stdout.starts_with("git version"));
    }

    #[test]
    fn system_runner_reports_failure() {
        let cwd = Utf8Path::new(".");
        let err = SystemRunner
            .run(&Invocation::new("git", ["not-a-real-subcommand"]), cwd)
            .unwrap_err();
        assert!(matches!(err, RunError::Failed { .. }));
    }

    #[test]
    fn system_runner_reports_missing_program() {
        let cwd = Utf8Path::new(".");
        let err = SystemRunner
            .run(&Invocation::new("definitely-not-a-program-xyz", Vec::<String>::new()), cwd)
            .unwrap_err();
        assert!(matches!(err, RunError::Spawn { .. }));
    }
}
