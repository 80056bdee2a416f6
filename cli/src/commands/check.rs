//! Command: validate configuration documents.
use std::sync::Arc;

use anyhow::Result;

use super::CommandSetup;
use crate::cli::GlobalOpts;
use crate::config::Config;
use crate::config::hosts::HostsFile;
use crate::config::services::ServicesFile;
use crate::config::validation::ValidationWarning;
use crate::logging::{Log, Logger};
use crate::modules;

/// Run the check command.
///
/// Warnings are reported but do not fail the command; unreadable or
/// malformed documents do.
///
/// # Errors
///
/// Returns an error if `hosts.yaml` is missing or either document fails to
/// parse.
pub fn run(global: &GlobalOpts, log: &Arc<Logger>) -> Result<()> {
    let setup = CommandSetup::init(global, log)?;
    log.stage("Checking configuration");
    let warnings = validate(&setup.config)?;
    report(&warnings, log.as_ref());
    Ok(())
}

/// Validate `hosts.yaml` against the module registry and `services.yaml`
/// against the host inventory.
///
/// # Errors
///
/// Returns an error if a document cannot be loaded.
pub fn validate(config: &Config) -> Result<Vec<ValidationWarning>> {
    let hosts = HostsFile::load(&config.hosts_file())?;
    let services = ServicesFile::load(&config.services_file())?;

    let mut warnings = hosts.validate(&modules::list_modules());
    let known_hosts: Vec<&str> = hosts.hosts.keys().map(String::as_str).collect();
    warnings.extend(services.validate(&known_hosts));
    Ok(warnings)
}

fn report(warnings: &[ValidationWarning], log: &dyn Log) {
    if warnings.is_empty() {
        log.success("Configuration is valid");
        return;
    }
    for w in warnings {
        log.warn(&format!("  {w}"));
    }
    log.warn(&format!("{} warning(s) found", warnings.len()));
}
