//! Reading the version out of a project manifest.
//!
//! The manifest format follows the file extension: `.json` (e.g.
//! `package.json`), `.yaml`/`.yml`, anything else is read as TOML
//! (`pyproject.toml`, `Cargo.toml`).

use camino::{Utf8Path, Utf8PathBuf};
use figment::Figment;
use figment::providers::{Format, Json, Toml, Yaml};
use thiserror::Error;
use tracing::{debug, instrument};

/// Errors from reading a manifest.
#[derive(Error, Debug)]
pub enum ManifestError {
    /// The manifest file does not exist.
    #[error("manifest {0} not found")]
    NotFound(Utf8PathBuf),

    /// The file could not be parsed or has no string at `key`.
    #[error("failed to read `{key}` from {path}: {source}")]
    Read {
        /// Manifest path.
        path: Utf8PathBuf,
        /// Dotted key that was looked up.
        key: String,
        /// Parse or lookup error.
        source: Box<figment::Error>,
    },
}

/// Result alias for manifest operations.
pub type ManifestResult<T> = Result<T, ManifestError>;

/// Read the string at dotted `key` (e.g. `project.version`) from `path`.
#[instrument]
pub fn read_version(path: &Utf8Path, key: &str) -> ManifestResult<String> {
    if !path.is_file() {
        return Err(ManifestError::NotFound(path.to_path_buf()));
    }

    let figment = match path.extension() {
        Some("json") => Figment::from(Json::file_exact(path.as_str())),
        Some("yaml" | "yml") => Figment::from(Yaml::file_exact(path.as_str())),
        _ => Figment::from(Toml::file_exact(path.as_str())),
    };

    let version: String = figment
        .extract_inner(key)
        .map_err(|e| ManifestError::Read {
            path: path.to_path_buf(),
            key: key.to_string(),
            source: Box::new(e),
        })?;
    debug!(%version, "read manifest version");
    Ok(version)
}
