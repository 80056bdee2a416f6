//! User-local shell tooling for hosts without root access.
use anyhow::Result;

use super::helpers::{finished, run_installer};
use super::{Context, Module, TaskResult};
use crate::resources::fs::ensure_dir;

/// Install chezmoi and starship into `~/.local/bin`.
#[derive(Debug)]
pub struct ShellHpc;

impl Module for ShellHpc {
    fn name(&self) -> &'static str {
        "shell-hpc"
    }

    fn title(&self) -> &'static str {
        "Shell Environment (HPC)"
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let local_bin = &ctx.paths().local_bin;
        if ctx.dry_run {
            if !local_bin.is_dir() {
                ctx.log
                    .dry_run(&format!("would create {}", local_bin.display()));
            }
        } else if ensure_dir(local_bin)? {
            ctx.log.debug(&format!("created {}", local_bin.display()));
        }

        let bin = local_bin.display().to_string();
        run_installer(ctx, "chezmoi", "chezmoi", &["-b", &bin])?;
        run_installer(ctx, "starship", "starship", &["-b", &bin, "-y"])?;

        if !ctx.dry_run {
            ctx.log.success("HPC shell environment configured");
        }
        Ok(finished(ctx))
    }
}
