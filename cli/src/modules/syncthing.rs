//! Syncthing file synchronisation.
use anyhow::{Context as _, Result};

use super::helpers::{PackageGroup, finished};
use super::{Context, Module, TaskResult};
use crate::platform::PackageManager;

/// Install Syncthing and start it as a user service.
#[derive(Debug)]
pub struct Syncthing;

impl Module for Syncthing {
    fn name(&self) -> &'static str {
        "syncthing"
    }

    fn title(&self) -> &'static str {
        "Syncthing"
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let packages = PackageGroup::load(ctx, "syncthing")?;
        if packages.is_empty() {
            return Ok(TaskResult::Skipped(packages.skip_reason(ctx)));
        }
        packages.install(ctx, false)?;

        let unit = format!("syncthing@{}", ctx.user);
        let (program, args): (&str, Vec<&str>) = if packages.manager == PackageManager::Brew {
            ("brew", vec!["services", "start", "syncthing"])
        } else {
            ("sudo", vec!["systemctl", "enable", "--now", &unit])
        };

        if ctx.dry_run {
            ctx.log
                .dry_run(&format!("would run: {program} {}", args.join(" ")));
            return Ok(TaskResult::DryRun);
        }
        ctx.executor
            .run(program, &args)
            .context("starting syncthing")?;
        ctx.log.success("Syncthing installed and running");
        Ok(finished(ctx))
    }
}
