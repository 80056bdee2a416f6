use std::sync::Arc;

use anyhow::{Result, bail};

use super::{CommandSetup, host_names, hostname};
use crate::cli::{GlobalOpts, ServicesAction, ServicesOpts};
use crate::config::services::{ServiceDef, ServicesFile};
use crate::logging::{Log, Logger};
use crate::modules::Context;
use crate::services::{Backend, DeployOutcome, ServiceManager, ServiceStatus};

/// Run the services command.
///
/// # Errors
///
/// Returns an error if `services.yaml` is malformed, a named service is not
/// defined for this host, or the supervisor rejects an operation.
pub fn run(global: &GlobalOpts, opts: &ServicesOpts, log: &Arc<Logger>) -> Result<()> {
    let setup = CommandSetup::init(global, log)?;
    let ctx = setup.context(global, Arc::clone(log) as Arc<dyn Log>);
    let host = hostname(global, ctx.executor.as_ref());
    let file = ServicesFile::load(&ctx.config.services_file())?;
    let services = host_services(&ctx, &file, &host);

    match &opts.action {
        None => deploy(&ctx, &host, &services),
        Some(ServicesAction::Status) => status(&ctx, &host, &services).map(|_| ()),
        Some(ServicesAction::Load { name }) => load(&ctx, find(&services, name)?),
        Some(ServicesAction::Unload { name }) => unload(&ctx, find(&services, name)?),
        Some(ServicesAction::Show { name }) => {
            show(&ctx, &file.find(name)?);
            Ok(())
        }
    }
}

/// Services assigned to `host` by its raw or canonical name.
#[must_use]
pub fn host_services(ctx: &Context, file: &ServicesFile, host: &str) -> Vec<ServiceDef> {
    let names = host_names(&ctx.config, host);
    let refs: Vec<&str> = names.iter().map(String::as_str).collect();
    file.for_host(&refs)
}

fn find<'s>(services: &'s [ServiceDef], name: &str) -> Result<&'s ServiceDef> {
    match services.iter().find(|s| s.name == name) {
        Some(svc) => Ok(svc),
        None => bail!("Service '{name}' not found for this host"),
    }
}

fn manager(ctx: &Context) -> ServiceManager<'_> {
    ServiceManager::new(
        Backend::for_os(ctx.platform.os),
        ctx.paths(),
        ctx.executor.as_ref(),
    )
}

/// Install every service for the host, loading those that changed and are
/// not already running.
///
/// # Errors
///
/// Returns an error if a service cannot be installed or loaded.
pub fn deploy(ctx: &Context, host: &str, services: &[ServiceDef]) -> Result<()> {
    if services.is_empty() {
        ctx.log
            .info(&format!("No services defined for host: {host}"));
        return Ok(());
    }

    ctx.log.stage(&format!("Services: {host}"));
    let manager = manager(ctx);
    for svc in services {
        if ctx.dry_run {
            if manager.needs_install(svc)? {
                ctx.log.dry_run(&format!(
                    "would install {} and load it if not running",
                    manager.primary_path(svc).display()
                ));
            } else {
                ctx.log.info(&format!(
                    "Service '{}' unchanged, skipping reload",
                    svc.name
                ));
            }
            continue;
        }

        match manager.deploy(svc)? {
            DeployOutcome::Loaded => ctx.log.success(&format!("Service '{}' loaded", svc.name)),
            DeployOutcome::Updated => ctx.log.info(&format!(
                "Service '{}' updated (already running)",
                svc.name
            )),
            DeployOutcome::Unchanged => ctx.log.info(&format!(
                "Service '{}' unchanged, skipping reload",
                svc.name
            )),
        }
    }

    if !ctx.dry_run {
        ctx.log.success("All services deployed");
    }
    Ok(())
}

/// Print `running`, `stopped` or `not installed` for each service.
///
/// # Errors
///
/// Returns an error if the supervisor cannot be queried.
pub fn status(ctx: &Context, host: &str, services: &[ServiceDef]) -> Result<Vec<ServiceStatus>> {
    if services.is_empty() {
        ctx.log
            .info(&format!("No services defined for host: {host}"));
        return Ok(Vec::new());
    }

    let manager = manager(ctx);
    let mut out = Vec::with_capacity(services.len());
    for svc in services {
        let state = manager.status(svc)?;
        let label = if state.running {
            "\x1b[32mrunning\x1b[0m"
        } else if state.installed {
            "\x1b[33mstopped\x1b[0m"
        } else {
            "\x1b[2mnot installed\x1b[0m"
        };
        ctx.log.info(&format!("{}: {label}", svc.name));
        out.push(state);
    }
    Ok(out)
}

/// Install and start one service.
///
/// # Errors
///
/// Returns an error if installation or loading fails.
pub fn load(ctx: &Context, svc: &ServiceDef) -> Result<()> {
    let manager = manager(ctx);
    if ctx.dry_run {
        ctx.log.dry_run(&format!(
            "would load {} from {}",
            svc.label,
            manager.primary_path(svc).display()
        ));
        return Ok(());
    }
    manager.load(svc)?;
    ctx.log
        .success(&format!("Service '{}' loaded", svc.name));
    Ok(())
}

/// Stop one service and remove its artifacts.
///
/// # Errors
///
/// Returns an error if an artifact cannot be removed.
pub fn unload(ctx: &Context, svc: &ServiceDef) -> Result<()> {
    let manager = manager(ctx);
    if ctx.dry_run {
        ctx.log
            .dry_run(&format!("would unload {} and remove its files", svc.label));
        return Ok(());
    }
    manager.unload(svc)?;
    ctx.log
        .success(&format!("Service '{}' unloaded", svc.name));
    Ok(())
}

/// Print every artifact generated for `svc` with its path.
pub fn show(ctx: &Context, svc: &ServiceDef) {
    for file in manager(ctx).artifacts(svc) {
        ctx.log.stage(&file.path.display().to_string());
        for line in file.content.lines() {
            ctx.log.info(line);
        }
    }
}
