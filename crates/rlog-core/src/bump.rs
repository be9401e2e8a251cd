//! Version bump planning and execution.
//!
//! All orchestration logic lives here. The CLI is purely a display layer.
//!
//! # Two-phase workflow
//!
//! 1. **Plan** ([`plan_bump`]): refuse a dirty working tree and resolve the
//!    bump tool's command line.
//! 2. **Execute** ([`BumpPlan::execute`]): run the bump tool, read the new
//!    version, commit, tag, and push, stopping at the first failing step.
//!
//! Steps are not rolled back. A failure reports which steps already applied.

use std::fmt;
use std::str::FromStr;

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, instrument};

use crate::config::BumpConfig;
use crate::git::{self, Git, GitError};
use crate::manifest::{self, ManifestError};
use crate::process::{CommandRunner, Invocation, RunError};

// ──────────────────────────────────────────────
// Errors
// ──────────────────────────────────────────────

/// Errors from bump operations.
#[derive(Error, Debug)]
pub enum BumpError {
    /// Uncommitted or untracked changes are present.
    #[error("working tree is dirty")]
    DirtyTree,

    /// A required program is not on `PATH`.
    #[error("{0} not found on PATH")]
    ToolNotFound(String),

    /// The configured bump tool command is empty.
    #[error("bump tool command is empty")]
    EmptyTool,

    /// Git failed while checking the working tree.
    #[error(transparent)]
    Git(#[from] GitError),

    /// A workflow step failed. Steps in `completed` were already applied.
    #[error("{step} failed ({}): {source}", completed_text(.completed))]
    StepFailed {
        /// The step that failed.
        step: BumpStep,
        /// Steps that finished before the failure.
        completed: Vec<BumpStep>,
        /// What went wrong.
        source: StepFailure,
    },
}

/// Result alias for bump operations.
pub type BumpResult<T> = Result<T, BumpError>;

/// The underlying cause of a failed step.
#[derive(Error, Debug)]
pub enum StepFailure {
    /// The bump tool failed.
    #[error(transparent)]
    Tool(#[from] RunError),

    /// A git command failed.
    #[error(transparent)]
    Git(#[from] GitError),

    /// The new version could not be read.
    #[error(transparent)]
    Manifest(#[from] ManifestError),
}

fn completed_text(completed: &[BumpStep]) -> String {
    if completed.is_empty() {
        return "nothing was changed".to_string();
    }
    let names: Vec<&str> = completed.iter().map(|s| s.as_str()).collect();
    format!("already completed: {}", names.join(", "))
}

// ──────────────────────────────────────────────
// Levels
// ──────────────────────────────────────────────

/// Which part of the version to bump.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum BumpLevel {
    /// 1.2.3 -> 2.0.0
    Major,
    /// 1.2.3 -> 1.3.0
    Minor,
    /// 1.2.3 -> 1.2.4
    Patch,
    /// Alpha pre-release
    Alpha,
    /// Beta pre-release
    Beta,
    /// Development release
    Dev,
    /// Drop pre-release and dev markers
    Final,
    /// Post-release
    Post,
    /// Release candidate
    Rc,
}

impl BumpLevel {
    /// Every level, in help order.
    pub const ALL: [Self; 9] = [
        Self::Major,
        Self::Minor,
        Self::Patch,
        Self::Alpha,
        Self::Beta,
        Self::Dev,
        Self::Final,
        Self::Post,
        Self::Rc,
    ];

    /// The name passed to the bump tool.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Major => "major",
            Self::Minor => "minor",
            Self::Patch => "patch",
            Self::Alpha => "alpha",
            Self::Beta => "beta",
            Self::Dev => "dev",
            Self::Final => "final",
            Self::Post => "post",
            Self::Rc => "rc",
        }
    }
}

impl fmt::Display for BumpLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// A string that is not a [`BumpLevel`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown bump level `{0}` (expected one of major, minor, patch, alpha, beta, dev, final, post, rc)")]
pub struct UnknownBumpLevel(pub String);

impl FromStr for BumpLevel {
    type Err = UnknownBumpLevel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|level| level.as_str() == s)
            .ok_or_else(|| UnknownBumpLevel(s.to_string()))
    }
}

// ──────────────────────────────────────────────
// Steps and events
// ──────────────────────────────────────────────

/// Steps of the bump workflow, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum BumpStep {
    /// Run the bump tool.
    BumpVersion,
    /// Read the new version from the manifest.
    ReadVersion,
    /// Stage everything and commit.
    Commit,
    /// Tag the commit.
    Tag,
    /// Push the branch.
    PushBranch,
    /// Push the tag.
    PushTag,
}

impl BumpStep {
    /// Kebab-case step name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BumpVersion => "bump-version",
            Self::ReadVersion => "read-version",
            Self::Commit => "commit",
            Self::Tag => "tag",
            Self::PushBranch => "push-branch",
            Self::PushTag => "push-tag",
        }
    }
}

impl fmt::Display for BumpStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Progress events emitted by [`BumpPlan::execute`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BumpEvent {
    /// A step is about to run.
    StepStarted {
        /// The step.
        step: BumpStep,
        /// What it is doing, e.g. the command line.
        detail: String,
    },
    /// A step finished.
    StepCompleted {
        /// The step.
        step: BumpStep,
        /// Captured output worth showing, if any.
        output: Option<String>,
    },
}

/// Outcome of a successful bump.
#[derive(Debug, Clone, Serialize)]
pub struct BumpOutcome {
    /// The requested level.
    pub level: BumpLevel,
    /// The version read back from the manifest.
    pub version: String,
    /// The tag that was created and pushed.
    pub tag: String,
    /// The commit message used.
    pub commit_message: String,
    /// Steps that ran, in order.
    pub steps: Vec<BumpStep>,
}

// ──────────────────────────────────────────────
// Planning
// ──────────────────────────────────────────────

/// A bump that passed the dirty-tree check and is ready to run.
#[derive(Debug, Clone)]
pub struct BumpPlan {
    /// The requested level.
    pub level: BumpLevel,
    /// Project root; every command runs here.
    pub root: Utf8PathBuf,
    /// The resolved bump tool command.
    pub tool: Invocation,
    /// Workflow settings.
    pub config: BumpConfig,
}

/// Check the working tree and build a [`BumpPlan`].
///
/// Only `git status` runs here; a dirty tree returns [`BumpError::DirtyTree`].
#[instrument(skip(runner, config))]
pub fn plan_bump(
    runner: &dyn CommandRunner,
    root: &Utf8Path,
    level: BumpLevel,
    config: &BumpConfig,
) -> BumpResult<BumpPlan> {
    if !Git::new(runner, root).is_clean()? {
        info!("refusing to bump a dirty working tree");
        return Err(BumpError::DirtyTree);
    }

    let mut argv = config.tool_command(level).into_iter();
    let program = argv.next().ok_or(BumpError::EmptyTool)?;
    let tool = Invocation::new(program, argv);
    debug!(tool = %tool, "bump planned");

    Ok(BumpPlan {
        level,
        root: root.to_path_buf(),
        tool,
        config: config.clone(),
    })
}

impl BumpPlan {
    /// Resolve the bump tool and `git` on `PATH`.
    pub fn check_tools(&self) -> BumpResult<()> {
        for program in [self.tool.program.as_str(), "git"] {
            which::which(program).map_err(|_| BumpError::ToolNotFound(program.to_string()))?;
        }
        Ok(())
    }

    /// The manifest path under the project root.
    pub fn manifest_path(&self) -> Utf8PathBuf {
        self.root.join(&self.config.manifest)
    }

    /// Each step with the commands it would run, for `--dry-run`.
    ///
    /// The new version is unknown until the tool runs, so it appears as
    /// `<version>`.
    pub fn describe(&self) -> Vec<(BumpStep, String)> {
        let version = "<version>";
        let tag = self.config.tag_for(version);
        let message = self.config.message_for(&tag, version);
        let remote = &self.config.remote;

        vec![
            (BumpStep::BumpVersion, self.tool.to_string()),
            (
                BumpStep::ReadVersion,
                format!("read `{}` from {}", self.config.version_key, self.config.manifest),
            ),
            (
                BumpStep::Commit,
                format!(
                    "{}; {}",
                    git::invocation(&["add", "--all"]),
                    git::invocation(&["commit", "-m", &message])
                ),
            ),
            (BumpStep::Tag, self.tag_invocation(&tag, &message).to_string()),
            (
                BumpStep::PushBranch,
                git::invocation(&["push", remote, &self.config.branch]).to_string(),
            ),
            (BumpStep::PushTag, git::invocation(&["push", remote, &tag]).to_string()),
        ]
    }

    fn tag_invocation(&self, tag: &str, message: &str) -> Invocation {
        if self.config.annotated {
            git::invocation(&["tag", "-a", tag, "-m", message])
        } else {
            git::invocation(&["tag", tag])
        }
    }

    /// Run every step in order.
    ///
    /// Calls `on_event` at step boundaries so the CLI can update progress.
    #[instrument(skip(self, runner, on_event), fields(level = %self.level, root = %self.root))]
    pub fn execute(
        &self,
        runner: &dyn CommandRunner,
        on_event: impl FnMut(BumpEvent),
    ) -> BumpResult<BumpOutcome> {
        let git = Git::new(runner, &self.root);
        let mut steps = Steps {
            completed: Vec::new(),
            on_event,
        };

        steps.run(BumpStep::BumpVersion, self.tool.to_string(), || {
            let output = runner.run(&self.tool, &self.root)?;
            let text = [output.stdout.trim(), output.stderr.trim()]
                .into_iter()
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
                .join("\n");
            Ok::<_, StepFailure>(((), Some(text).filter(|t| !t.is_empty())))
        })?;

        let manifest_path = self.manifest_path();
        let version = steps.run(
            BumpStep::ReadVersion,
            format!("read `{}` from {}", self.config.version_key, self.config.manifest),
            || {
                let version = manifest::read_version(&manifest_path, &self.config.version_key)?;
                Ok::<_, StepFailure>((version.clone(), Some(version)))
            },
        )?;

        let tag = self.config.tag_for(&version);
        let message = self.config.message_for(&tag, &version);

        steps.run(BumpStep::Commit, format!("commit \"{message}\""), || {
            git.add_all()?;
            git.commit(&message)?;
            Ok::<_, StepFailure>(((), None))
        })?;

        steps.run(BumpStep::Tag, format!("tag {tag}"), || {
            let annotation = self.config.annotated.then_some(message.as_str());
            git.tag(&tag, annotation)?;
            Ok::<_, StepFailure>(((), None))
        })?;

        let remote = &self.config.remote;
        let branch = &self.config.branch;
        steps.run(BumpStep::PushBranch, format!("push {remote} {branch}"), || {
            git.push(remote, branch)?;
            Ok::<_, StepFailure>(((), None))
        })?;

        steps.run(BumpStep::PushTag, format!("push {remote} {tag}"), || {
            git.push(remote, &tag)?;
            Ok::<_, StepFailure>(((), None))
        })?;

        info!(%version, %tag, "bump complete");
        Ok(BumpOutcome {
            level: self.level,
            version,
            tag,
            commit_message: message,
            steps: steps.completed,
        })
    }
}

/// Runs steps in order, tracking what has been applied.
struct Steps<F> {
    completed: Vec<BumpStep>,
    on_event: F,
}

impl<F: FnMut(BumpEvent)> Steps<F> {
    fn run<T, E>(
        &mut self,
        step: BumpStep,
        detail: String,
        f: impl FnOnce() -> Result<(T, Option<String>), E>,
    ) -> BumpResult<T>
    where
        E: Into<StepFailure>,
    {
        debug!(%step, %detail, "step started");
        (self.on_event)(BumpEvent::StepStarted { step, detail });

        match f() {
            Ok((value, output)) => {
                self.completed.push(step);
                (self.on_event)(BumpEvent::StepCompleted { step, output });
                Ok(value)
            }
            Err(e) => Err(BumpError::StepFailed {
                step,
                completed: self.completed.clone(),
                source: e.into(),
            }),
        }
    }
}
