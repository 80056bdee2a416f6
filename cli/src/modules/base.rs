//! Base system packages.
use anyhow::Result;

use super::helpers::{PackageGroup, finished};
use super::{Context, Module, TaskResult};

/// Refresh the package index and install `packages.base.<pm>`.
#[derive(Debug)]
pub struct Base;

impl Module for Base {
    fn name(&self) -> &'static str {
        "base"
    }

    fn title(&self) -> &'static str {
        "Base System Packages"
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let packages = PackageGroup::load(ctx, "base")?;
        if packages.is_empty() {
            return Ok(TaskResult::Skipped(packages.skip_reason(ctx)));
        }

        let stats = packages.install(ctx, true)?;
        ctx.log.info(&stats.summary(ctx.dry_run));
        if !ctx.dry_run {
            ctx.log.success("Base packages installed");
        }
        Ok(finished(ctx))
    }
}
