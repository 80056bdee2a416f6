//! Building blocks shared by several modules: package groups, installer
//! scripts and version reports.
use anyhow::{Context as _, Result};

use super::{Context, TaskStats};
use crate::platform::PackageManager;
use crate::resources::package::{PackageResource, batch_install, update_index};
use crate::resources::{Applicable, Resource, ResourceState};

/// Packages configured for one group on the current package manager.
#[derive(Debug)]
pub struct PackageGroup {
    /// Group key under `packages.` (e.g. `dev-node`).
    pub group: &'static str,
    /// Package manager the list was read for.
    pub manager: PackageManager,
    /// Package names, possibly empty.
    pub names: Vec<String>,
}

impl PackageGroup {
    /// Read `packages.<group>.<pm>` for the detected package manager.
    ///
    /// # Errors
    ///
    /// Returns an error if the platform has no package manager or the
    /// package document cannot be read.
    pub fn load(ctx: &Context, group: &'static str) -> Result<Self> {
        let manager = ctx.platform.require_package_manager()?;
        let names = ctx
            .config
            .store
            .get_list(&format!("packages.{group}.{manager}"))?;
        Ok(Self {
            group,
            manager,
            names,
        })
    }

    /// Whether no packages are configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Warn that the group is empty and return the skip reason.
    pub fn skip_reason(&self, ctx: &Context) -> String {
        let reason = format!("no packages defined for {} on {}", self.group, self.manager);
        ctx.log.warn(&format!(
            "No packages defined for {} on {}",
            self.group, self.manager
        ));
        reason
    }

    /// Install the group's packages that are not yet present.
    ///
    /// # Errors
    ///
    /// Returns an error if a query or the batch install fails.
    pub fn install(&self, ctx: &Context, refresh: bool) -> Result<TaskStats> {
        install_packages(ctx, self.manager, &self.names, refresh)
    }
}

/// Install `names`, skipping those already installed.
///
/// The package index is refreshed first when `refresh` is set and at least
/// one package is missing. Missing packages are installed in one batch.
///
/// # Errors
///
/// Returns an error if a query, the index refresh or the install fails.
pub fn install_packages(
    ctx: &Context,
    manager: PackageManager,
    names: &[String],
    refresh: bool,
) -> Result<TaskStats> {
    let executor = ctx.executor.as_ref();
    let mut stats = TaskStats::new();
    let mut missing = Vec::new();
    for name in names {
        let resource = PackageResource::new(name.clone(), manager, executor);
        match resource.current_state()? {
            ResourceState::Correct => stats.already_ok += 1,
            _ => missing.push(resource),
        }
    }

    if missing.is_empty() {
        ctx.log
            .info(&format!("all {} package(s) already installed", names.len()));
        return Ok(stats);
    }
    stats.changed = u32::try_from(missing.len()).unwrap_or(u32::MAX);

    if ctx.dry_run {
        for resource in &missing {
            ctx.log
                .dry_run(&format!("would install: {}", resource.description()));
        }
        return Ok(stats);
    }

    if refresh {
        ctx.log.debug(&format!("refreshing {manager} package index"));
        update_index(manager, executor).context("refreshing package index")?;
    }
    let pending: Vec<&PackageResource<'_>> = missing.iter().collect();
    let list = missing
        .iter()
        .map(|r| r.name.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    ctx.log.info(&format!("installing: {list}"));
    batch_install(&pending).with_context(|| format!("installing {list}"))?;
    Ok(stats)
}

/// Download the installer script at `urls.<url_key>` and run it with `args`.
///
/// Skipped when `tool` is already on `PATH`. Returns whether anything ran.
///
/// # Errors
///
/// Returns an error if the URL is not configured, the download fails or the
/// script exits non-zero.
pub fn run_installer(ctx: &Context, tool: &str, url_key: &str, args: &[&str]) -> Result<bool> {
    if ctx.executor.which(tool) {
        ctx.log.info(&format!("{tool} already installed"));
        return Ok(false);
    }
    let url = ctx.require_str(&format!("urls.{url_key}"))?;
    if ctx.dry_run {
        ctx.log
            .dry_run(&format!("would install {tool} from {url}"));
        return Ok(true);
    }

    ctx.log.info(&format!("installing {tool} from {url}"));
    let script = ctx.downloader.fetch(&url)?;
    let mut sh_args = vec!["-c", script.as_str(), "sh"];
    sh_args.extend_from_slice(args);
    ctx.executor
        .run("sh", &sh_args)
        .with_context(|| format!("running {tool} installer"))?;
    ctx.log.success(&format!("{tool} installed"));
    Ok(true)
}

/// Log the first line of `<program> <args>` as `<label>: <line>`.
///
/// Nothing is reported when the program is absent or in dry-run mode.
///
/// # Errors
///
/// Returns an error if the program exits non-zero.
pub fn report_version(ctx: &Context, label: &str, program: &str, args: &[&str]) -> Result<()> {
    if ctx.dry_run || !ctx.executor.which(program) {
        return Ok(());
    }
    let result = ctx.executor.run(program, args)?;
    let line = result.stdout.lines().next().unwrap_or_default().trim();
    ctx.log.info(&format!("{label}: {line}"));
    Ok(())
}

/// Final result for a module that completed its steps.
#[must_use]
pub const fn finished(ctx: &Context) -> super::TaskResult {
    if ctx.dry_run {
        super::TaskResult::DryRun
    } else {
        super::TaskResult::Ok
    }
}
