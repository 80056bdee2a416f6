//! Configuration: repository layout, YAML documents and user paths.
pub mod hosts;
pub mod paths;
pub mod services;
pub mod store;
pub mod validation;
mod yaml_loader;

use std::path::{Path, PathBuf};

use paths::Paths;
use store::ConfigStore;

/// Repository-level configuration shared by every command.
#[derive(Debug)]
pub struct Config {
    /// Repository root (contains `conf/` and `dotfiles/`).
    pub root: PathBuf,
    /// Per-user paths.
    pub paths: Paths,
    /// Dotted-key access to `conf/*.yaml`.
    pub store: ConfigStore,
}

impl Config {
    /// Build the configuration for a repository root and home directory.
    #[must_use]
    pub fn new(root: &Path, home: &Path) -> Self {
        let conf = root.join("conf");
        Self {
            root: root.to_path_buf(),
            paths: Paths::from_home(home),
            store: ConfigStore::new(&conf),
        }
    }

    /// `conf/` directory.
    #[must_use]
    pub fn conf_dir(&self) -> PathBuf {
        self.root.join("conf")
    }

    /// `conf/hosts.yaml`.
    #[must_use]
    pub fn hosts_file(&self) -> PathBuf {
        self.conf_dir().join("hosts.yaml")
    }

    /// `conf/services.yaml`.
    #[must_use]
    pub fn services_file(&self) -> PathBuf {
        self.conf_dir().join("services.yaml")
    }

    /// `dotfiles/` source trees.
    #[must_use]
    pub fn dotfiles_dir(&self) -> PathBuf {
        self.root.join("dotfiles")
    }
}
