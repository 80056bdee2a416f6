//! Language toolchains.
use anyhow::{Context as _, Result};

use super::helpers::{PackageGroup, finished, report_version};
use super::{Context, Module, TaskResult};

/// C/C++ compilers and build tools from `packages.dev-c.<pm>`.
#[derive(Debug)]
pub struct DevC;

impl Module for DevC {
    fn name(&self) -> &'static str {
        "dev-c"
    }

    fn title(&self) -> &'static str {
        "C/C++ Development Environment"
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let packages = PackageGroup::load(ctx, "dev-c")?;
        if packages.is_empty() {
            return Ok(TaskResult::Skipped(packages.skip_reason(ctx)));
        }
        packages.install(ctx, false)?;

        report_version(ctx, "GCC", "gcc", &["--version"])?;
        report_version(ctx, "CMake", "cmake", &["--version"])?;
        Ok(finished(ctx))
    }
}

/// Python interpreters managed by `uv`.
#[derive(Debug)]
pub struct DevPython;

impl Module for DevPython {
    fn name(&self) -> &'static str {
        "dev-python"
    }

    fn title(&self) -> &'static str {
        "Python Development Environment (uv)"
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        if ctx.dry_run {
            ctx.log.dry_run("would run: uv python install");
            return Ok(TaskResult::DryRun);
        }

        ctx.log.info("installing Python via uv");
        ctx.executor
            .run("uv", &["python", "install"])
            .context("installing Python via uv")?;

        let version = ctx.executor.run("uv", &["--version"])?;
        ctx.log.info(&format!("uv: {}", version.stdout.trim()));

        let installed = ctx
            .executor
            .run("uv", &["python", "list", "--only-installed"])?;
        ctx.log.info(&format!(
            "Installed Python versions:\n{}",
            installed.stdout.trim()
        ));
        Ok(TaskResult::Ok)
    }
}

/// Node.js from `packages.dev-node.<pm>`.
#[derive(Debug)]
pub struct DevNode;

impl Module for DevNode {
    fn name(&self) -> &'static str {
        "dev-node"
    }

    fn title(&self) -> &'static str {
        "Node.js Development Environment"
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let packages = PackageGroup::load(ctx, "dev-node")?;
        if packages.is_empty() {
            return Ok(TaskResult::Skipped(packages.skip_reason(ctx)));
        }
        packages.install(ctx, false)?;

        report_version(ctx, "Node.js", "node", &["--version"])?;
        Ok(finished(ctx))
    }
}
