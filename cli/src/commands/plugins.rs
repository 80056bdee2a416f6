//! Command: list installed zsh plugins.
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context as _, Result};

use super::CommandSetup;
use crate::cli::GlobalOpts;
use crate::logging::{Log, Logger};

/// Run the plugins command.
///
/// # Errors
///
/// Returns an error if the plugin directory exists but cannot be read.
pub fn run(global: &GlobalOpts, log: &Arc<Logger>) -> Result<()> {
    let setup = CommandSetup::init(global, log)?;
    report(&setup.config.paths.zsh_plugins, log.as_ref()).map(|_| ())
}

/// Names of the directories under `dir`, sorted. A missing directory has
/// no plugins.
///
/// # Errors
///
/// Returns an error if `dir` exists but cannot be listed.
pub fn installed_plugins(dir: &Path) -> Result<Vec<String>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut names = Vec::new();
    for entry in std::fs::read_dir(dir).with_context(|| format!("reading {}", dir.display()))? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    names.sort();
    Ok(names)
}

fn report(dir: &Path, log: &dyn Log) -> Result<Vec<String>> {
    let plugins = installed_plugins(dir)?;
    if plugins.is_empty() {
        log.warn("No plugins installed yet");
        log.info(&format!("Plugins are cloned into {}", dir.display()));
        return Ok(plugins);
    }
    log.info("Installed plugins:");
    for name in &plugins {
        log.info(&format!("  - {name}"));
    }
    Ok(plugins)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn lists_directories_sorted() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["zsh-syntax-highlighting", "fzf-tab", "zsh-autosuggestions"] {
            std::fs::create_dir(dir.path().join(name)).unwrap();
        }
        std::fs::write(dir.path().join("README"), "").unwrap();

        assert_eq!(
            installed_plugins(dir.path()).unwrap(),
            vec!["fzf-tab", "zsh-autosuggestions", "zsh-syntax-highlighting"]
        );
    }

    #[test]
    fn missing_directory_has_no_plugins() {
        let dir = tempfile::tempdir().unwrap();
        let log = Logger::with_log_file(None);
        assert!(report(&dir.path().join("plugins"), &log).unwrap().is_empty());
    }
}
