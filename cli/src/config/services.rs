//! Service definitions from `conf/services.yaml`.
use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use super::validation::ValidationWarning;
use crate::error::{ConfigError, ServiceError};

/// Label prefix used when the document does not set `label_prefix`.
pub const DEFAULT_LABEL_PREFIX: &str = "dev.hostkit";

const fn default_true() -> bool {
    true
}

/// A service entry as written in YAML.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServiceSpec {
    /// Absolute path of the program to run.
    pub program: String,
    /// Arguments passed after the program.
    #[serde(default)]
    pub args: Vec<String>,
    /// Working directory; `~` is expanded at generation time.
    #[serde(default)]
    pub working_directory: Option<String>,
    /// Environment variables.
    #[serde(default)]
    pub env: BTreeMap<String, String>,
    /// Restart the program whenever it exits.
    #[serde(default)]
    pub keep_alive: bool,
    /// Start as soon as the service is loaded.
    #[serde(default = "default_true")]
    pub run_at_load: bool,
    /// Run periodically every `interval` seconds.
    #[serde(default)]
    pub interval: Option<u64>,
    /// Hosts this service is deployed to.
    #[serde(default)]
    pub hosts: Vec<String>,
    /// Keys hostkit does not know; ignored, but reported by `check`.
    #[serde(flatten)]
    pub unknown: BTreeMap<String, serde_yaml::Value>,
}

/// The parsed `services.yaml` document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ServicesFile {
    /// Reverse-DNS prefix for service labels.
    #[serde(default)]
    pub label_prefix: Option<String>,
    /// Service name to definition.
    #[serde(default)]
    pub services: BTreeMap<String, ServiceSpec>,
}

/// A fully resolved service, ready for artifact generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceDef {
    /// Short name (the key in `services.yaml`).
    pub name: String,
    /// Supervisor label, `<prefix>.<name>`.
    pub label: String,
    /// Program path.
    pub program: String,
    /// Program arguments.
    pub args: Vec<String>,
    /// Working directory, unexpanded.
    pub working_directory: Option<String>,
    /// Environment, sorted by key.
    pub env: BTreeMap<String, String>,
    /// Restart on exit.
    pub keep_alive: bool,
    /// Start on load.
    pub run_at_load: bool,
    /// Period in seconds.
    pub interval: Option<u64>,
    /// Target hosts.
    pub hosts: Vec<String>,
}

impl ServicesFile {
    /// Load `services.yaml`; a missing file means no services.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        super::yaml_loader::load_or_default(path)
    }

    /// The effective label prefix.
    #[must_use]
    pub fn label_prefix(&self) -> &str {
        self.label_prefix.as_deref().unwrap_or(DEFAULT_LABEL_PREFIX)
    }

    fn build(&self, name: &str, spec: &ServiceSpec) -> ServiceDef {
        ServiceDef {
            name: name.to_string(),
            label: format!("{}.{name}", self.label_prefix()),
            program: spec.program.clone(),
            args: spec.args.clone(),
            working_directory: spec.working_directory.clone(),
            env: spec.env.clone(),
            keep_alive: spec.keep_alive,
            run_at_load: spec.run_at_load,
            interval: spec.interval,
            hosts: spec.hosts.clone(),
        }
    }

    /// Every defined service, ordered by name.
    #[must_use]
    pub fn all(&self) -> Vec<ServiceDef> {
        self.services
            .iter()
            .map(|(name, spec)| self.build(name, spec))
            .collect()
    }

    /// Services whose `hosts` list names any of `host_names`, ordered by name.
    #[must_use]
    pub fn for_host(&self, host_names: &[&str]) -> Vec<ServiceDef> {
        self.services
            .iter()
            .filter(|(_, spec)| spec.hosts.iter().any(|h| host_names.contains(&h.as_str())))
            .map(|(name, spec)| self.build(name, spec))
            .collect()
    }

    /// Look up one service by name.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::NotFound`] if no such service is defined.
    pub fn find(&self, name: &str) -> Result<ServiceDef, ServiceError> {
        self.services
            .get(name)
            .map(|spec| self.build(name, spec))
            .ok_or_else(|| ServiceError::NotFound(name.to_string()))
    }

    /// Check service entries against the host inventory.
    #[must_use]
    pub fn validate(&self, known_hosts: &[&str]) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();
        for (name, spec) in &self.services {
            let item = format!("services.{name}");
            if !Path::new(&spec.program).is_absolute() {
                warnings.push(ValidationWarning::new(
                    "services.yaml",
                    &item,
                    format!("program is not an absolute path: {}", spec.program),
                ));
            }
            if spec.hosts.is_empty() {
                warnings.push(ValidationWarning::new(
                    "services.yaml",
                    &item,
                    "no hosts listed; service is never deployed",
                ));
            }
            for host in spec.hosts.iter().filter(|h| !known_hosts.contains(&h.as_str())) {
                warnings.push(ValidationWarning::new(
                    "services.yaml",
                    &item,
                    format!("unknown host '{host}'"),
                ));
            }
            for key in spec.unknown.keys() {
                warnings.push(ValidationWarning::new(
                    "services.yaml",
                    &item,
                    format!("unknown key '{key}' is ignored"),
                ));
            }
            if spec.interval == Some(0) {
                warnings.push(ValidationWarning::new(
                    "services.yaml",
                    &item,
                    "interval must be greater than zero",
                ));
            }
        }
        warnings
    }
}
