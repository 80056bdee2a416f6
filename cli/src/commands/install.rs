use std::sync::Arc;

use anyhow::{Context as _, Result};

use super::{CommandSetup, Hinted, hostname, run_modules_to_completion};
use crate::cli::{GlobalOpts, InstallOpts, InstallTarget};
use crate::config::hosts::{HostsFile, ResolvedHost};
use crate::logging::{Log, Logger};
use crate::modules::{self, Context, Module};

const HOST_HINT: &str = "Use 'hostkit install all' or 'hostkit install module <name>' instead";

/// Run the install command.
///
/// # Errors
///
/// Returns an error if the host or module cannot be resolved, sudo cannot
/// be activated, or any module fails.
pub fn run(global: &GlobalOpts, opts: &InstallOpts, log: &Arc<Logger>) -> Result<()> {
    if let Some(InstallTarget::List) = opts.target {
        print_modules(log.as_ref());
        return Ok(());
    }

    let setup = CommandSetup::init(global, log)?;
    let ctx = setup.context(global, Arc::clone(log) as Arc<dyn Log>);

    match &opts.target {
        Some(InstallTarget::All) => {
            log.stage("Environment Setup");
            install_modules(modules::all_modules(), &ctx, log, true)
        }
        Some(InstallTarget::Module { name }) => {
            let module = modules::find(name).inspect_err(|_| print_modules(log.as_ref()))?;
            log.stage(&format!("Installing module: {name}"));
            install_modules(&[module], &ctx, log, true)
        }
        Some(InstallTarget::List) | None => {
            let host = resolve_host(global, &ctx)?;
            log.stage(&format!("Host-aware setup: {}", host.name));
            log.info(&format!("Modules: {}", host.modules.join(", ")));

            let selected = select_modules(&host, &ctx)?;
            install_modules(&selected, &ctx, log, !host.entry.is_hpc())
        }
    }
}

/// Log every registered module name.
pub fn print_modules(log: &dyn Log) {
    log.info("Available modules:");
    for name in modules::list_modules() {
        log.info(&format!("  - {name}"));
    }
}

/// Look up the current host in `hosts.yaml`. Failures carry a hint
/// pointing at the host-independent install targets.
fn resolve_host(global: &GlobalOpts, ctx: &Context) -> Result<ResolvedHost> {
    let name = hostname(global, ctx.executor.as_ref());
    ctx.log.debug(&format!("hostname: {name}"));
    HostsFile::load(&ctx.config.hosts_file())
        .and_then(|hosts| hosts.resolve(&name))
        .map_err(|err| Hinted::new(err.into(), HOST_HINT).into())
}

/// Map a host's module names onto registered modules.
///
/// # Errors
///
/// Returns an error naming the first module that is not registered.
pub fn select_modules(host: &ResolvedHost, ctx: &Context) -> Result<Vec<&'static dyn Module>> {
    host.modules
        .iter()
        .map(|name| {
            modules::find(name)
                .with_context(|| format!("host '{}' lists module '{name}'", host.name))
                .inspect_err(|_| print_modules(ctx.log.as_ref()))
        })
        .collect()
}

/// Activate sudo when requested, then run `to_run` to completion.
///
/// Sudo is never requested in dry-run mode.
///
/// # Errors
///
/// Returns an error if `sudo -v` fails or any module fails.
pub fn install_modules(
    to_run: &[&'static dyn Module],
    ctx: &Context,
    log: &Logger,
    activate_sudo: bool,
) -> Result<()> {
    if activate_sudo && !ctx.dry_run {
        log.info("Requesting sudo access");
        ctx.executor
            .run_interactive("sudo", &["-v"])
            .context("activating sudo")?;
    }

    run_modules_to_completion(to_run.iter().copied(), ctx, log)?;

    if !ctx.dry_run {
        log.success("All modules have been installed");
        log.info("You may need to re-login for some changes to take effect");
    }
    Ok(())
}
