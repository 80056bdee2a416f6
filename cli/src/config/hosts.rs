//! Host inventory: presets, per-host module lists and aliases.
//!
//! `conf/hosts.yaml` has the shape:
//!
//! ```yaml
//! presets:
//!   workstation: [base, shell, dev-c]
//! hosts:
//!   atlas:
//!     preset: workstation
//!     aliases: [atlas-wifi]
//!     extra: [apps-docker]
//! ```
use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use super::validation::ValidationWarning;
use crate::error::{ConfigError, HostError};
use crate::exec::Executor;

/// HPC cluster metadata. Hosts carrying this block never use `sudo`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct HpcConfig {
    /// Scratch filesystem root.
    #[serde(default)]
    pub scratch: Option<String>,
    /// Lmod package providing the toolchain.
    #[serde(default)]
    pub lmod_pkg: Option<String>,
    /// Environment modules to load.
    #[serde(default)]
    pub modules: Vec<String>,
}

/// One host entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct HostEntry {
    /// Preset name. Unknown presets contribute no modules.
    #[serde(default)]
    pub preset: String,
    /// Login user on this host, if it differs from `$USER`.
    #[serde(default)]
    pub user: Option<String>,
    /// Other hostnames this machine answers to.
    #[serde(default)]
    pub aliases: Vec<String>,
    /// Modules appended after the preset's modules.
    #[serde(default)]
    pub extra: Vec<String>,
    /// HPC metadata, present only for cluster login nodes.
    #[serde(default)]
    pub hpc: Option<HpcConfig>,
}

impl HostEntry {
    /// Whether this host is an HPC node.
    #[must_use]
    pub const fn is_hpc(&self) -> bool {
        self.hpc.is_some()
    }
}

/// The parsed `hosts.yaml` document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct HostsFile {
    /// Preset name to ordered module list.
    #[serde(default)]
    pub presets: BTreeMap<String, Vec<String>>,
    /// Host name to entry. Iteration order (by name) decides alias ties.
    #[serde(default)]
    pub hosts: BTreeMap<String, HostEntry>,
}

/// A host matched by name or alias, with its module list expanded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedHost {
    /// Canonical host name (the key in `hosts.yaml`).
    pub name: String,
    /// The matched entry.
    pub entry: HostEntry,
    /// Preset modules followed by extras, deduplicated.
    pub modules: Vec<String>,
}

impl HostsFile {
    /// Load `hosts.yaml`.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::FileNotFound`] when the file is absent, or
    /// [`HostError::Config`] when it is unreadable or malformed.
    pub fn load(path: &Path) -> Result<Self, HostError> {
        super::yaml_loader::load_document(path, "Hosts").map_err(|err| match err {
            ConfigError::NotFound { path, .. } => HostError::FileNotFound(path),
            other => HostError::Config(other),
        })
    }

    /// Find a host by exact key, then by alias.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::NotFound`] when nothing matches.
    pub fn find_host(&self, hostname: &str) -> Result<(&str, &HostEntry), HostError> {
        if let Some((name, entry)) = self.hosts.get_key_value(hostname) {
            return Ok((name.as_str(), entry));
        }
        self.hosts
            .iter()
            .find(|(_, entry)| entry.aliases.iter().any(|a| a == hostname))
            .map(|(name, entry)| (name.as_str(), entry))
            .ok_or_else(|| HostError::NotFound(hostname.to_string()))
    }

    /// Expand a host's modules: preset modules, then extras not already listed.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::NotFound`] when the host is unknown.
    pub fn resolve_modules(&self, hostname: &str) -> Result<Vec<String>, HostError> {
        let (_, entry) = self.find_host(hostname)?;
        Ok(self.modules_for(entry))
    }

    /// Resolve a host and expand its module list in one step.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::NotFound`] when the host is unknown.
    pub fn resolve(&self, hostname: &str) -> Result<ResolvedHost, HostError> {
        let (name, entry) = self.find_host(hostname)?;
        Ok(ResolvedHost {
            name: name.to_string(),
            modules: self.modules_for(entry),
            entry: entry.clone(),
        })
    }

    fn modules_for(&self, entry: &HostEntry) -> Vec<String> {
        let preset = self
            .presets
            .get(&entry.preset)
            .map_or(&[][..], Vec::as_slice);
        let mut modules: Vec<String> = Vec::with_capacity(preset.len() + entry.extra.len());
        for module in preset.iter().chain(&entry.extra) {
            if !modules.contains(module) {
                modules.push(module.clone());
            }
        }
        modules
    }

    /// Check cross-references inside the document.
    #[must_use]
    pub fn validate(&self, known_modules: &[&str]) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();
        let unknown_module =
            |m: &String| !known_modules.iter().any(|known| *known == m.as_str());

        for (preset, modules) in &self.presets {
            for module in modules.iter().filter(|m| unknown_module(*m)) {
                warnings.push(ValidationWarning::new(
                    "hosts.yaml",
                    format!("presets.{preset}"),
                    format!("unknown module '{module}'"),
                ));
            }
        }

        let mut alias_owner: BTreeMap<&str, &str> = BTreeMap::new();
        for (name, entry) in &self.hosts {
            if !self.presets.contains_key(&entry.preset) {
                warnings.push(ValidationWarning::new(
                    "hosts.yaml",
                    format!("hosts.{name}"),
                    format!("unknown preset '{}'", entry.preset),
                ));
            }
            for module in entry.extra.iter().filter(|m| unknown_module(*m)) {
                warnings.push(ValidationWarning::new(
                    "hosts.yaml",
                    format!("hosts.{name}"),
                    format!("unknown module '{module}' in extra"),
                ));
            }
            for alias in &entry.aliases {
                if self.hosts.contains_key(alias) {
                    warnings.push(ValidationWarning::new(
                        "hosts.yaml",
                        format!("hosts.{name}"),
                        format!("alias '{alias}' shadows host '{alias}'"),
                    ));
                } else if let Some(owner) = alias_owner.insert(alias.as_str(), name.as_str()) {
                    warnings.push(ValidationWarning::new(
                        "hosts.yaml",
                        format!("hosts.{name}"),
                        format!("alias '{alias}' already claimed by '{owner}'"),
                    ));
                }
            }
        }
        warnings
    }
}

/// Normalise a raw hostname: first dot-separated label, lowercased.
#[must_use]
pub fn short_hostname(raw: &str) -> String {
    raw.trim()
        .split('.')
        .next()
        .unwrap_or_default()
        .to_lowercase()
}

/// The current machine's short hostname.
///
/// Asks `hostname`, falling back to `/etc/hostname` and finally `localhost`.
#[must_use]
pub fn current_hostname(executor: &dyn Executor) -> String {
    let raw = executor
        .run("hostname", &[])
        .map(|r| r.stdout)
        .ok()
        .filter(|s| !s.trim().is_empty())
        .or_else(|| std::fs::read_to_string("/etc/hostname").ok())
        .unwrap_or_default();
    let short = short_hostname(&raw);
    if short.is_empty() {
        "localhost".to_string()
    } else {
        short
    }
}
