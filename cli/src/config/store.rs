//! Dotted-key lookup over the `conf/` YAML tree.
//!
//! A key such as `packages.base.apt` resolves to the `apt` entry of
//! `conf/packages/base.yaml`; `urls.starship` resolves to the `starship`
//! entry of `conf/urls.yaml`. The first segment names a folder when a
//! directory of that name exists, otherwise it names a file.
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde_yaml::Value;

use crate::error::ConfigError;

/// Lazily loaded, cached view of `conf/*.yaml`.
#[derive(Debug)]
pub struct ConfigStore {
    conf_dir: PathBuf,
    cache: Mutex<HashMap<PathBuf, Option<Value>>>,
}

impl ConfigStore {
    /// Create a store rooted at `conf_dir`. Nothing is read until first lookup.
    #[must_use]
    pub fn new(conf_dir: &Path) -> Self {
        Self {
            conf_dir: conf_dir.to_path_buf(),
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Look up a dotted key.
    ///
    /// Returns `Ok(None)` when the file or any key segment is missing, or when
    /// an intermediate value is not a mapping.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing file exists but is unreadable or not
    /// valid YAML.
    pub fn get(&self, key: &str) -> Result<Option<Value>, ConfigError> {
        let segments: Vec<&str> = key.split('.').filter(|s| !s.is_empty()).collect();
        let Some((file, path)) = self.locate(&segments) else {
            return Ok(None);
        };
        let Some(document) = self.document(&file)? else {
            return Ok(None);
        };

        let mut node = &document;
        for segment in path {
            match node.get(*segment) {
                Some(next) => node = next,
                None => return Ok(None),
            }
        }
        Ok(Some(node.clone()))
    }

    /// Look up a string value. Non-string scalars are rendered as text.
    ///
    /// # Errors
    ///
    /// See [`get`](Self::get).
    pub fn get_str(&self, key: &str) -> Result<Option<String>, ConfigError> {
        Ok(self.get(key)?.and_then(|value| match value {
            Value::String(s) => Some(s),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }))
    }

    /// Look up a list of strings. Missing keys yield an empty list and
    /// non-string items are skipped.
    ///
    /// # Errors
    ///
    /// See [`get`](Self::get).
    pub fn get_list(&self, key: &str) -> Result<Vec<String>, ConfigError> {
        Ok(match self.get(key)? {
            Some(Value::Sequence(items)) => items
                .into_iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        })
    }

    /// Stems of the `*.yaml` files inside `conf/<folder>/`, sorted.
    #[must_use]
    pub fn list_files(&self, folder: &str) -> Vec<String> {
        let Ok(entries) = std::fs::read_dir(self.conf_dir.join(folder)) else {
            return Vec::new();
        };
        let mut stems: Vec<String> = entries
            .filter_map(Result::ok)
            .map(|e| e.path())
            .filter(|p| is_yaml(p))
            .filter_map(|p| p.file_stem().map(|s| s.to_string_lossy().into_owned()))
            .collect();
        stems.sort();
        stems
    }

    /// Split a key into the backing file and the path inside it.
    fn locate<'k>(&self, segments: &'k [&'k str]) -> Option<(PathBuf, &'k [&'k str])> {
        let (first, rest) = segments.split_first()?;
        let folder = self.conf_dir.join(first);
        if folder.is_dir() {
            let (file, path) = rest.split_first()?;
            Some((yaml_path(&folder, file), path))
        } else {
            Some((yaml_path(&self.conf_dir, first), rest))
        }
    }

    fn document(&self, file: &Path) -> Result<Option<Value>, ConfigError> {
        let mut cache = self
            .cache
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if let Some(cached) = cache.get(file) {
            return Ok(cached.clone());
        }
        let loaded = if file.exists() {
            Some(super::yaml_loader::load_document::<Value>(file, "Config")?)
        } else {
            None
        };
        cache.insert(file.to_path_buf(), loaded.clone());
        Ok(loaded)
    }
}

fn yaml_path(dir: &Path, stem: &str) -> PathBuf {
    let yml = dir.join(format!("{stem}.yml"));
    if yml.exists() {
        yml
    } else {
        dir.join(format!("{stem}.yaml"))
    }
}

fn is_yaml(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext == "yaml" || ext == "yml")
}
