//! Domain-specific error types for the provisioning engine.
//!
//! Internal modules return typed errors while command handlers at the CLI
//! boundary convert them to [`anyhow::Error`] via the standard `?` operator.
//!
//! # Error hierarchy
//!
//! ```text
//! ConfigError   YAML documents under conf/
//! HostError     hosts.yaml lookup
//! ModuleError   module registry
//! ServiceError  service definitions and supervisors
//! PlatformError OS / package manager support
//! ```

use std::path::PathBuf;

use thiserror::Error;

/// Errors that arise from reading configuration documents.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A required configuration file does not exist.
    #[error("{kind} file not found: {}", path.display())]
    NotFound {
        /// Human-readable document kind (e.g. `"Hosts"`).
        kind: &'static str,
        /// Path that was looked up.
        path: PathBuf,
    },

    /// The file could not be read.
    #[error("IO error reading config file {}: {source}", path.display())]
    Io {
        /// Path to the file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The file is not valid YAML or does not match the expected shape.
    #[error("Invalid YAML in {}: {source}", path.display())]
    Parse {
        /// Path to the offending file.
        path: PathBuf,
        /// Underlying parse error.
        source: serde_yaml::Error,
    },
}

/// Errors that arise when resolving the current host.
#[derive(Error, Debug)]
pub enum HostError {
    /// `hosts.yaml` does not exist.
    #[error("Hosts file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// `hosts.yaml` exists but cannot be read or parsed.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Neither a host key nor any alias matches.
    #[error("Host '{0}' not found in hosts.yaml")]
    NotFound(String),
}

/// Errors raised by the module registry.
#[derive(Error, Debug)]
pub enum ModuleError {
    /// No module is registered under this name.
    #[error("Unknown module: {0}")]
    Unknown(String),
}

/// Errors raised by the service manager.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// No service with this name is defined in services.yaml.
    #[error("Service '{0}' not found in services.yaml")]
    NotFound(String),
}

/// Errors that arise from platform-specific operations.
#[derive(Error, Debug)]
pub enum PlatformError {
    /// The distro has no supported package manager.
    #[error("No supported package manager for {distro}")]
    NoPackageManager {
        /// Distro name as reported by detection.
        distro: String,
    },
}
