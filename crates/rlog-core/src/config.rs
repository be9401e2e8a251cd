//! Configuration loading and discovery.
//!
//! Sources, lowest precedence first:
//! 1. Built-in defaults
//! 2. User config: `~/.config/bump/config.<ext>`
//! 3. Project config: `.bump.<ext>` or `bump.<ext>` in the search root or any
//!    parent, up to and including the directory that contains `.git`
//! 4. Files added with [`ConfigLoader::with_file`], in order
//!
//! Where `<ext>` is one of `toml`, `yaml`, `yml`, `json`.
//!
//! # Example
//! ```no_run
//! use camino::Utf8PathBuf;
//! use rlog_core::config::ConfigLoader;
//!
//! let cwd = Utf8PathBuf::try_from(std::env::current_dir().unwrap()).unwrap();
//! let config = ConfigLoader::new().with_project_search(&cwd).load().unwrap();
//! println!("remote: {}", config.bump.remote);
//! ```

use camino::{Utf8Path, Utf8PathBuf};
use figment::Figment;
use figment::providers::{Format, Json, Serialized, Toml, Yaml};
use serde::{Deserialize, Serialize};

use crate::bump::BumpLevel;
use crate::error::{ConfigError, ConfigResult};
use crate::level::LogLevel;

/// Supported configuration file extensions (in order of preference).
const CONFIG_EXTENSIONS: &[&str] = &["toml", "yaml", "yml", "json"];

/// Application name for XDG directory lookup and config file names.
const APP_NAME: &str = "bump";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Console threshold, and the default diagnostics filter.
    pub log_level: LogLevel,
    /// Directory for JSONL diagnostics logs (platform default if unset).
    pub log_dir: Option<Utf8PathBuf>,
    /// Bump workflow settings.
    pub bump: BumpConfig,
}

/// Settings for the bump workflow.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct BumpConfig {
    /// Command that bumps the manifest version in place.
    ///
    /// `{level}` is replaced with the bump level; if absent, the level is
    /// appended as the last argument.
    pub tool: String,
    /// Manifest holding the version, relative to the project root.
    pub manifest: Utf8PathBuf,
    /// Dotted key of the version inside the manifest.
    pub version_key: String,
    /// Prepended to the version to form the tag.
    pub tag_prefix: String,
    /// Commit message template; `{tag}` and `{version}` are interpolated.
    pub commit_message: String,
    /// Remote to push to.
    pub remote: String,
    /// Branch to push.
    pub branch: String,
    /// Create an annotated tag instead of a lightweight one.
    pub annotated: bool,
}

impl Default for BumpConfig {
    fn default() -> Self {
        Self {
            tool: "uv version --bump {level}".to_string(),
            manifest: Utf8PathBuf::from("pyproject.toml"),
            version_key: "project.version".to_string(),
            tag_prefix: "v".to_string(),
            commit_message: "bump version to {tag}".to_string(),
            remote: "origin".to_string(),
            branch: "main".to_string(),
            annotated: false,
        }
    }
}

impl BumpConfig {
    /// The bump tool's argv for `level`.
    pub fn tool_command(&self, level: BumpLevel) -> Vec<String> {
        let mut argv: Vec<String> = self
            .tool
            .split_whitespace()
            .map(|part| part.replace("{level}", level.as_str()))
            .collect();
        if !argv.is_empty() && !self.tool.contains("{level}") {
            argv.push(level.as_str().to_string());
        }
        argv
    }

    /// Tag name for `version`.
    pub fn tag_for(&self, version: &str) -> String {
        format!("{}{version}", self.tag_prefix)
    }

    /// Commit message for a release of `version` tagged `tag`.
    pub fn message_for(&self, tag: &str, version: &str) -> String {
        self.commit_message
            .replace("{tag}", tag)
            .replace("{version}", version)
    }
}

/// Builder for loading configuration from multiple sources.
#[derive(Debug)]
pub struct ConfigLoader {
    project_search_root: Option<Utf8PathBuf>,
    include_user_config: bool,
    boundary_marker: Option<String>,
    explicit_files: Vec<Utf8PathBuf>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Loader with user config on and a `.git` boundary.
    pub fn new() -> Self {
        Self {
            project_search_root: None,
            include_user_config: true,
            boundary_marker: Some(".git".to_string()),
            explicit_files: Vec::new(),
        }
    }

    /// Walk up from `path` looking for a project config.
    pub fn with_project_search<P: AsRef<Utf8Path>>(mut self, path: P) -> Self {
        self.project_search_root = Some(path.as_ref().to_path_buf());
        self
    }

    /// Include or skip `~/.config/bump/config.<ext>`.
    pub const fn with_user_config(mut self, include: bool) -> Self {
        self.include_user_config = include;
        self
    }

    /// Search all the way to the filesystem root.
    pub fn without_boundary_marker(mut self) -> Self {
        self.boundary_marker = None;
        self
    }

    /// Add an explicit config file. Later files win.
    pub fn with_file<P: AsRef<Utf8Path>>(mut self, path: P) -> Self {
        self.explicit_files.push(path.as_ref().to_path_buf());
        self
    }

    /// Merge all sources into a [`Config`].
    #[tracing::instrument(skip(self), fields(search_root = ?self.project_search_root))]
    pub fn load(self) -> ConfigResult<Config> {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        if self.include_user_config
            && let Some(user_config) = find_user_config()
        {
            tracing::debug!(path = %user_config, "merging user config");
            figment = merge_file(figment, &user_config);
        }

        if let Some(ref root) = self.project_search_root
            && let Some(project_config) = self.find_project_config(root)
        {
            tracing::debug!(path = %project_config, "merging project config");
            figment = merge_file(figment, &project_config);
        }

        for file in &self.explicit_files {
            if !file.is_file() {
                return Err(ConfigError::Missing(file.clone()));
            }
            figment = merge_file(figment, file);
        }

        let config: Config = figment
            .extract()
            .map_err(|e| ConfigError::Deserialize(Box::new(e)))?;
        tracing::debug!(
            log_level = config.log_level.as_str(),
            manifest = %config.bump.manifest,
            "configuration loaded"
        );
        Ok(config)
    }

    fn find_project_config(&self, start: &Utf8Path) -> Option<Utf8PathBuf> {
        let mut current = Some(start);

        while let Some(dir) = current {
            for ext in CONFIG_EXTENSIONS {
                for name in [format!(".{APP_NAME}.{ext}"), format!("{APP_NAME}.{ext}")] {
                    let candidate = dir.join(name);
                    if candidate.is_file() {
                        return Some(candidate);
                    }
                }
            }

            // The directory holding the marker is the last one searched.
            if let Some(ref marker) = self.boundary_marker
                && dir.join(marker).exists()
            {
                break;
            }

            current = dir.parent();
        }

        None
    }
}

/// The user config directory (`~/.config/bump/` on Linux).
pub fn user_config_dir() -> Option<Utf8PathBuf> {
    let dirs = directories::ProjectDirs::from("", "", APP_NAME)?;
    Utf8PathBuf::from_path_buf(dirs.config_dir().to_path_buf()).ok()
}

fn find_user_config() -> Option<Utf8PathBuf> {
    let dir = user_config_dir()?;
    CONFIG_EXTENSIONS
        .iter()
        .map(|ext| dir.join(format!("config.{ext}")))
        .find(|path| path.is_file())
}

fn merge_file(figment: Figment, path: &Utf8Path) -> Figment {
    match path.extension() {
        Some("yaml" | "yml") => figment.merge(Yaml::file_exact(path.as_str())),
        Some("json") => figment.merge(Json::file_exact(path.as_str())),
        _ => figment.merge(Toml::file_exact(path.as_str())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn utf8(path: std::path::PathBuf) -> Utf8PathBuf {
        Utf8PathBuf::try_from(path).unwrap()
    }

    fn loader() -> ConfigLoader {
        ConfigLoader::new().with_user_config(false)
    }

    #[test]
    fn defaults_match_the_python_workflow() {
        let config = Config::default();
        assert_eq!(config.log_level, LogLevel::Warn);
        assert!(config.log_dir.is_none());
        assert_eq!(config.bump.manifest, "pyproject.toml");
        assert_eq!(config.bump.version_key, "project.version");
        assert_eq!(config.bump.remote, "origin");
        assert_eq!(config.bump.branch, "main");
        assert!(!config.bump.annotated);
    }

    #[test]
    fn loads_defaults_without_files() {
        let config = loader().without_boundary_marker().load().unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn partial_bump_section_keeps_other_defaults() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(
            &path,
            r#"
log_level = "debug"

[bump]
remote = "upstream"
annotated = true
"#,
        )
        .unwrap();

        let config = loader().with_file(utf8(path)).load().unwrap();
        assert_eq!(config.log_level, LogLevel::Debug);
        assert_eq!(config.bump.remote, "upstream");
        assert!(config.bump.annotated);
        assert_eq!(config.bump.branch, "main");
        assert_eq!(config.bump.tag_prefix, "v");
    }

    #[test]
    fn later_file_overrides_earlier() {
        let tmp = TempDir::new().unwrap();
        let base = tmp.path().join("base.toml");
        fs::write(&base, r#"log_level = "info""#).unwrap();
        let over = tmp.path().join("over.yaml");
        fs::write(&over, "log_level: trace\n").unwrap();

        let config = loader()
            .with_file(utf8(base))
            .with_file(utf8(over))
            .load()
            .unwrap();
        assert_eq!(config.log_level, LogLevel::Trace);
    }

    #[test]
    fn discovers_project_config_in_parent() {
        let tmp = TempDir::new().unwrap();
        let deep = tmp.path().join("a").join("b");
        fs::create_dir_all(&deep).unwrap();
        fs::write(tmp.path().join(".bump.toml"), "[bump]\nbranch = \"trunk\"\n").unwrap();

        let config = loader()
            .without_boundary_marker()
            .with_project_search(utf8(deep))
            .load()
            .unwrap();
        assert_eq!(config.bump.branch, "trunk");
    }

    #[test]
    fn boundary_marker_stops_search() {
        let tmp = TempDir::new().unwrap();
        let child = tmp.path().join("child");
        let work = child.join("work");
        fs::create_dir_all(&work).unwrap();
        fs::create_dir(child.join(".git")).unwrap();
        fs::write(tmp.path().join("bump.toml"), r#"log_level = "error""#).unwrap();

        let config = loader().with_project_search(utf8(work)).load().unwrap();
        assert_eq!(config.log_level, LogLevel::Warn);
    }

    #[test]
    fn dotfile_wins_over_plain_name() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(".bump.toml"), r#"log_level = "debug""#).unwrap();
        fs::write(tmp.path().join("bump.toml"), r#"log_level = "error""#).unwrap();

        let config = loader()
            .with_project_search(utf8(tmp.path().to_path_buf()))
            .load()
            .unwrap();
        assert_eq!(config.log_level, LogLevel::Debug);
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let result = loader()
            .with_file(utf8(tmp.path().join("absent.toml")))
            .load();
        assert!(matches!(result, Err(ConfigError::Missing(_))));
    }

    #[test]
    fn invalid_level_is_rejected() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(&path, r#"log_level = "loud""#).unwrap();
        let result = loader().with_file(utf8(path)).load();
        assert!(matches!(result, Err(ConfigError::Deserialize(_))));
    }

    #[test]
    fn tool_command_substitutes_level() {
        let bump = BumpConfig::default();
        assert_eq!(
            bump.tool_command(BumpLevel::Patch),
            vec!["uv", "version", "--bump", "patch"]
        );
    }

    #[test]
    fn tool_command_appends_level_without_placeholder() {
        let bump = BumpConfig {
            tool: "poetry version".to_string(),
            ..BumpConfig::default()
        };
        assert_eq!(
            bump.tool_command(BumpLevel::Minor),
            vec!["poetry", "version", "minor"]
        );
    }

    #[test]
    fn message_and_tag_templates() {
        let bump = BumpConfig::default();
        let tag = bump.tag_for("1.2.4");
        assert_eq!(tag, "v1.2.4");
        assert_eq!(bump.message_for(&tag, "1.2.4"), "bump version to v1.2.4");
    }
}
