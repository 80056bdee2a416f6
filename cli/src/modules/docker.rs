//! Docker engine or Docker Desktop.
use anyhow::{Context as _, Result};

use super::helpers::PackageGroup;
use super::{Context, Module, TaskResult};

/// Install Docker unless a `docker` binary already exists.
#[derive(Debug)]
pub struct AppsDocker;

impl Module for AppsDocker {
    fn name(&self) -> &'static str {
        "apps-docker"
    }

    fn title(&self) -> &'static str {
        "Docker"
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        if ctx.executor.which("docker") {
            return Ok(TaskResult::Skipped("docker already installed".to_string()));
        }
        if ctx.platform.is_macos() {
            install_macos(ctx)
        } else {
            install_linux(ctx)
        }
    }
}

fn install_macos(ctx: &Context) -> Result<TaskResult> {
    let args = ["install", "--cask", "docker"];
    if ctx.dry_run {
        ctx.log
            .dry_run(&format!("would run: brew {}", args.join(" ")));
        return Ok(TaskResult::DryRun);
    }
    ctx.executor
        .run("brew", &args)
        .context("installing Docker Desktop")?;
    ctx.log
        .success("Docker Desktop installed (open Docker.app to start)");
    Ok(TaskResult::Ok)
}

fn install_linux(ctx: &Context) -> Result<TaskResult> {
    let packages = PackageGroup::load(ctx, "apps")?;
    if packages.is_empty() {
        return Ok(TaskResult::Skipped(packages.skip_reason(ctx)));
    }
    packages.install(ctx, false)?;

    let steps = [
        (
            "adding user to docker group",
            vec!["usermod", "-aG", "docker", ctx.user.as_str()],
        ),
        ("enabling docker service", vec!["systemctl", "enable", "docker"]),
        ("starting docker service", vec!["systemctl", "start", "docker"]),
    ];
    for (step, args) in steps {
        if ctx.dry_run {
            ctx.log
                .dry_run(&format!("would run: sudo {}", args.join(" ")));
            continue;
        }
        ctx.log.info(step);
        ctx.executor
            .run("sudo", &args)
            .with_context(|| step.to_string())?;
    }

    if ctx.dry_run {
        return Ok(TaskResult::DryRun);
    }
    ctx.log
        .success("Docker installed (re-login required for group permissions)");
    Ok(TaskResult::Ok)
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::modules::test_helpers::{ContextBuilder, write_conf};
    use crate::resources::test_helpers::MockExecutor;
    use std::sync::Arc;

    #[test]
    fn existing_docker_is_skipped() {
        let executor = Arc::new(MockExecutor::fail().with_programs(&["docker"]));
        let (ctx, _tmp) = ContextBuilder::linux().executor(executor.clone()).build();
        assert!(matches!(
            AppsDocker.run(&ctx).unwrap(),
            TaskResult::Skipped(reason) if reason == "docker already installed"
        ));
        assert_eq!(executor.call_count(), 0);
    }

    #[test]
    fn macos_installs_cask() {
        let executor = Arc::new(MockExecutor::permissive());
        let (ctx, _tmp) = ContextBuilder::macos().executor(executor.clone()).build();
        AppsDocker.run(&ctx).unwrap();
        assert_eq!(executor.calls(), vec!["brew install --cask docker"]);
    }

    #[test]
    fn linux_installs_and_enables_service() {
        let executor = Arc::new(MockExecutor::permissive());
        let (ctx, tmp) = ContextBuilder::linux().executor(executor.clone()).build();
        write_conf(tmp.path(), "packages/apps.yaml", "apt: [docker.io]\n");

        assert!(matches!(AppsDocker.run(&ctx).unwrap(), TaskResult::Ok));
        assert_eq!(
            executor.calls(),
            vec![
                "dpkg -s docker.io",
                "sudo usermod -aG docker ada",
                "sudo systemctl enable docker",
                "sudo systemctl start docker",
            ]
        );
    }

    #[test]
    fn linux_dry_run_previews_sudo_steps() {
        let executor = Arc::new(MockExecutor::with_responses(vec![(false, String::new())]));
        let (ctx, tmp) = ContextBuilder::linux()
            .dry_run()
            .executor(executor.clone())
            .build();
        write_conf(tmp.path(), "packages/apps.yaml", "apt: [docker.io]\n");

        assert!(matches!(AppsDocker.run(&ctx).unwrap(), TaskResult::DryRun));
        assert_eq!(executor.calls(), vec!["dpkg -s docker.io"]);
    }
}
