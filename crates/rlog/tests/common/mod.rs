//! Shared fixtures for CLI integration tests.
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command as StdCommand;

use assert_cmd::Command;
use tempfile::TempDir;

/// Project config pointing the bump tool at the scripted stand-in.
pub const TOOL_CONFIG: &str = "[bump]\ntool = \"sh bump-tool.sh {level}\"\n";

/// Rewrites the manifest to 1.2.4, like `uv version --bump patch` would.
const BUMP_TOOL: &str = r#"#!/bin/sh
printf '[project]\nname = "demo"\nversion = "1.2.4"\n' > pyproject.toml
echo "demo 1.2.3 => 1.2.4 ($1)"
"#;

const PYPROJECT: &str = "[project]\nname = \"demo\"\nversion = \"1.2.3\"\n";

/// Returns a Command configured to run our binary.
#[allow(deprecated)]
pub fn cmd() -> Command {
    Command::cargo_bin("bump").unwrap()
}

/// A scratch git repository with one commit and a bare `origin`.
pub struct Project {
    tmp: TempDir,
}

impl Project {
    /// Repository configured with [`TOOL_CONFIG`] as `.bump.toml`.
    pub fn new() -> Self {
        Self::with_config(".bump.toml", TOOL_CONFIG)
    }

    /// Repository whose committed project config is `name` with `contents`.
    pub fn with_config(name: &str, contents: &str) -> Self {
        let project = Self::bare_files();
        fs::write(project.work().join(name), contents).unwrap();
        project.commit_all();
        project
    }

    /// Repository with no project config at all.
    pub fn without_config() -> Self {
        let project = Self::bare_files();
        project.commit_all();
        project
    }

    fn bare_files() -> Self {
        let project = Self {
            tmp: TempDir::new().unwrap(),
        };
        fs::create_dir_all(project.home()).unwrap();
        fs::create_dir_all(project.work()).unwrap();

        project.git(project.tmp.path(), &["init", "--quiet", "--bare", "remote.git"]);
        let work = project.work();
        project.git(&work, &["init", "--quiet"]);
        project.git(&work, &["checkout", "--quiet", "-b", "main"]);
        project.git(&work, &["config", "user.name", "Test"]);
        project.git(&work, &["config", "user.email", "test@example.com"]);
        let remote = project.remote();
        project.git(&work, &["remote", "add", "origin", remote.to_str().unwrap()]);

        fs::write(work.join("pyproject.toml"), PYPROJECT).unwrap();
        fs::write(work.join("bump-tool.sh"), BUMP_TOOL).unwrap();
        project
    }

    fn commit_all(&self) {
        let work = self.work();
        self.git(&work, &["add", "--all"]);
        self.git(&work, &["commit", "--quiet", "-m", "initial"]);
    }

    /// Scratch root; parent of the working tree.
    pub fn root(&self) -> &Path {
        self.tmp.path()
    }

    /// The working tree.
    pub fn work(&self) -> PathBuf {
        self.tmp.path().join("work")
    }

    /// The bare remote.
    pub fn remote(&self) -> PathBuf {
        self.tmp.path().join("remote.git")
    }

    fn home(&self) -> PathBuf {
        self.tmp.path().join("home")
    }

    /// Run git in `dir` isolated from the user's global config.
    pub fn git(&self, dir: &Path, args: &[&str]) -> String {
        let output = StdCommand::new("git")
            .args(args)
            .current_dir(dir)
            .env("HOME", self.home())
            .env("XDG_CONFIG_HOME", self.home().join(".config"))
            .env("GIT_CONFIG_NOSYSTEM", "1")
            .output()
            .expect("run git");
        assert!(
            output.status.success(),
            "git {args:?} failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8_lossy(&output.stdout).trim().to_string()
    }

    /// The manifest as it is now.
    pub fn manifest(&self) -> String {
        fs::read_to_string(self.work().join("pyproject.toml")).unwrap()
    }

    /// The binary, run in the working tree with isolated config and logs.
    pub fn bump(&self) -> Command {
        self.bump_in(&self.work())
    }

    /// Like [`bump`](Self::bump), but started in `dir`.
    pub fn bump_in(&self, dir: &Path) -> Command {
        let mut cmd = cmd();
        cmd.env("HOME", self.home())
            .env("XDG_CONFIG_HOME", self.home().join(".config"))
            .env("GIT_CONFIG_NOSYSTEM", "1")
            .env("GIT_CEILING_DIRECTORIES", self.root())
            .env("BUMP_LOG_DIR", self.root().join("logs"))
            .env_remove("RUST_LOG")
            .env_remove("BUMP_LOG_PATH")
            .args(["--color", "never", "-C"])
            .arg(dir);
        cmd
    }
}
