//! YAML document loading with typed errors.
use serde::de::DeserializeOwned;
use std::path::Path;

use crate::error::ConfigError;

/// Read and deserialize a YAML document.
///
/// `kind` names the document in the not-found error (e.g. `"Hosts"`).
///
/// # Errors
///
/// Returns [`ConfigError::NotFound`] if the file does not exist,
/// [`ConfigError::Io`] if it cannot be read, and [`ConfigError::Parse`] if it
/// is not valid YAML for `T`.
pub fn load_document<T: DeserializeOwned>(path: &Path, kind: &'static str) -> Result<T, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound {
            kind,
            path: path.to_path_buf(),
        });
    }
    parse_file(path)
}

/// Like [`load_document`], but a missing file yields `T::default()`.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] or [`ConfigError::Parse`] for unreadable or
/// malformed files.
pub fn load_or_default<T: DeserializeOwned + Default>(path: &Path) -> Result<T, ConfigError> {
    if !path.exists() {
        return Ok(T::default());
    }
    parse_file(path)
}

fn parse_file<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    // An empty document deserializes as YAML null; treat it like `{}`.
    let content = if content.trim().is_empty() {
        "{}"
    } else {
        content.as_str()
    };
    serde_yaml::from_str(content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
