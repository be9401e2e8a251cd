//! Git operations for the bump workflow.
//!
//! Shells out to `git` for all operations. This ensures we inherit the user's
//! SSH keys, GPG signing, hooks, and other configuration.

use camino::Utf8Path;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::process::{CommandRunner, Invocation, RunError};

/// Errors from git operations.
#[derive(Error, Debug)]
pub enum GitError {
    /// Failed to execute the `git` command.
    #[error("failed to run git: {0}")]
    Exec(#[source] std::io::Error),

    /// `git` returned a non-zero exit code.
    #[error("git {command} failed: {stderr}")]
    Command {
        /// The git subcommand that failed (e.g., "status").
        command: String,
        /// Captured stderr.
        stderr: String,
    },

    /// Not inside a git repository.
    #[error("not a git repository (or any parent up to mount point)")]
    NotARepo,
}

/// Result alias for git operations.
pub type GitResult<T> = Result<T, GitError>;

/// Git commands run in one working tree.
pub struct Git<'a> {
    runner: &'a dyn CommandRunner,
    root: &'a Utf8Path,
}

impl<'a> Git<'a> {
    /// Run git in `root` through `runner`.
    pub fn new(runner: &'a dyn CommandRunner, root: &'a Utf8Path) -> Self {
        Self { runner, root }
    }

    /// Check whether the working tree is clean (no uncommitted changes).
    ///
    /// Untracked files count as changes.
    #[instrument(skip(self))]
    pub fn is_clean(&self) -> GitResult<bool> {
        let output = self.git(&["status", "--porcelain"])?;
        let clean = output.trim().is_empty();
        debug!(clean, "working tree status");
        Ok(clean)
    }

    /// Stage every change in the working tree.
    #[instrument(skip(self))]
    pub fn add_all(&self) -> GitResult<()> {
        self.git(&["add", "--all"]).map(drop)
    }

    /// Commit staged changes.
    #[instrument(skip(self))]
    pub fn commit(&self, message: &str) -> GitResult<()> {
        self.git(&["commit", "-m", message]).map(drop)
    }

    /// Create a tag at HEAD, annotated when `annotation` is given.
    #[instrument(skip(self))]
    pub fn tag(&self, name: &str, annotation: Option<&str>) -> GitResult<()> {
        let result = match annotation {
            Some(message) => self.git(&["tag", "-a", name, "-m", message]),
            None => self.git(&["tag", name]),
        };
        result.map(drop)
    }

    /// Push a ref to a remote.
    #[instrument(skip(self))]
    pub fn push(&self, remote: &str, refspec: &str) -> GitResult<()> {
        self.git(&["push", remote, refspec]).map(drop)
    }

    /// Run a git command and return its stdout.
    fn git(&self, args: &[&str]) -> GitResult<String> {
        match self.runner.run(&invocation(args), self.root) {
            Ok(output) => Ok(output.stdout),
            Err(RunError::Spawn { source, .. }) => Err(GitError::Exec(source)),
            Err(RunError::Failed { stderr, .. }) => {
                // Detect "not a git repo" specifically
                if stderr.contains("not a git repository") {
                    return Err(GitError::NotARepo);
                }
                Err(GitError::Command {
                    command: args.first().unwrap_or(&"").to_string(),
                    stderr,
                })
            }
        }
    }
}

/// Build the git argument list for `args`, as [`Git`] would run it.
pub fn invocation(args: &[&str]) -> Invocation {
    Invocation::new("git", args.iter().copied())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::SystemRunner;
    use tempfile::TempDir;

    fn utf8(tmp: &TempDir) -> &Utf8Path {
        Utf8Path::from_path(tmp.path()).expect("utf-8 temp dir")
    }

    fn init_repo(tmp: &TempDir) {
        let root = utf8(tmp);
        for args in [
            &["init", "--quiet"][..],
            &["config", "user.name", "Test"],
            &["config", "user.email", "test@example.com"],
        ] {
            SystemRunner.run(&invocation(args), root).expect("git setup");
        }
    }

    #[test]
    fn fresh_repo_is_clean_until_a_file_appears() {
        let tmp = TempDir::new().unwrap();
        init_repo(&tmp);
        let git = Git::new(&SystemRunner, utf8(&tmp));

        assert!(git.is_clean().unwrap());
        std::fs::write(tmp.path().join("new.txt"), "x").unwrap();
        assert!(!git.is_clean().unwrap());
    }

    #[test]
    fn add_commit_and_tag() {
        let tmp = TempDir::new().unwrap();
        init_repo(&tmp);
        let git = Git::new(&SystemRunner, utf8(&tmp));

        std::fs::write(tmp.path().join("file.txt"), "x").unwrap();
        git.add_all().unwrap();
        git.commit("first").unwrap();
        assert!(git.is_clean().unwrap());

        git.tag("v0.1.0", None).unwrap();
        git.tag("v0.1.1", Some("annotated")).unwrap();
        let tags = SystemRunner
            .run(&invocation(&["tag", "--list"]), utf8(&tmp))
            .unwrap()
            .stdout;
        assert!(tags.contains("v0.1.0"));
        assert!(tags.contains("v0.1.1"));
    }

    #[test]
    fn git_error_on_bad_command() {
        let tmp = TempDir::new().unwrap();
        let git = Git::new(&SystemRunner, utf8(&tmp));
        let result = git.git(&["not-a-real-subcommand"]);
        assert!(result.is_err());
    }

    #[test]
    fn commit_with_nothing_staged_fails() {
        let tmp = TempDir::new().unwrap();
        init_repo(&tmp);
        let git = Git::new(&SystemRunner, utf8(&tmp));
        assert!(matches!(
            git.commit("empty"),
            Err(GitError::Command { ref command, .. }) if command == "commit"
        ));
    }
}
