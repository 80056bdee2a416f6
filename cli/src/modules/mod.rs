//! Named installation modules and the registry that orders them.
pub mod base;
mod context;
pub mod dev;
pub mod docker;
mod helpers;
mod processing;
pub mod shell;
pub mod shell_hpc;
pub mod syncthing;

pub use context::Context;
pub use processing::{ProcessOpts, TaskResult, TaskStats, process_resources};

use anyhow::Result;

use crate::error::ModuleError;
use crate::logging::Outcome;

/// A named, idempotent installation step.
pub trait Module: Send + Sync {
    /// Registry key used in `hosts.yaml` and on the command line.
    fn name(&self) -> &'static str;

    /// Stage header printed when the module starts.
    fn title(&self) -> &'static str;

    /// Execute the module.
    ///
    /// # Errors
    ///
    /// Returns an error if a package manager, installer or system command
    /// fails, or required configuration is missing.
    fn run(&self, ctx: &Context) -> Result<TaskResult>;
}

static REGISTRY: [&dyn Module; 8] = [
    &base::Base,
    &shell::Shell,
    &shell_hpc::ShellHpc,
    &syncthing::Syncthing,
    &dev::DevC,
    &dev::DevPython,
    &dev::DevNode,
    &docker::AppsDocker,
];

/// Every registered module, in installation order.
#[must_use]
pub fn all_modules() -> &'static [&'static dyn Module] {
    &REGISTRY
}

/// Registered module names, in installation order.
#[must_use]
pub fn list_modules() -> Vec<&'static str> {
    REGISTRY.iter().map(|m| m.name()).collect()
}

/// Look up a module by name.
///
/// # Errors
///
/// Returns [`ModuleError::Unknown`] if no module has that name.
pub fn find(name: &str) -> Result<&'static dyn Module, ModuleError> {
    REGISTRY
        .iter()
        .copied()
        .find(|m| m.name() == name)
        .ok_or_else(|| ModuleError::Unknown(name.to_string()))
}

/// Execute a module, recording the result in the logger.
///
/// Failures are logged and recorded, never propagated, so the remaining
/// modules still run.
pub fn execute(module: &dyn Module, ctx: &Context) {
    ctx.log.stage(module.title());

    match module.run(ctx) {
        Ok(TaskResult::Ok) => {
            ctx.log.record_module(module.name(), Outcome::Ok, None);
        }
        Ok(TaskResult::Skipped(reason)) => {
            ctx.log.info(&format!("skipped: {reason}"));
            ctx.log
                .record_module(module.name(), Outcome::Skipped, Some(&reason));
        }
        Ok(TaskResult::DryRun) => {
            ctx.log.record_module(module.name(), Outcome::DryRun, None);
        }
        Err(e) => {
            ctx.log.error(&format!("{}: {e:#}", module.name()));
            ctx.log
                .record_module(module.name(), Outcome::Failed, Some(&format!("{e:#}")));
        }
    }
}


#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::logging::{Log, Logger};
    use std::sync::Arc;
    use test_helpers::ContextBuilder;

    struct MockModule {
        result: Result<TaskResult, String>,
    }

    impl Module for MockModule {
        fn name(&self) -> &'static str {
            "mock"
        }
        fn title(&self) -> &'static str {
            "Mock Module"
        }
        fn run(&self, _ctx: &Context) -> Result<TaskResult> {
            self.result.clone().map_err(|s| anyhow::anyhow!("{s}"))
        }
    }

    fn run_mock(result: Result<TaskResult, String>) -> Arc<Logger> {
        let log = Arc::new(Logger::with_log_file(None));
        let (ctx, _tmp) = ContextBuilder::linux()
            .log(Arc::clone(&log) as Arc<dyn Log>)
            .build();
        execute(&MockModule { result }, &ctx);
        log
    }

    #[test]
    fn registry_order() {
        assert_eq!(
            list_modules(),
            vec![
                "base",
                "shell",
                "shell-hpc",
                "syncthing",
                "dev-c",
                "dev-python",
                "dev-node",
                "apps-docker"
            ]
        );
    }

    #[test]
    fn registry_titles() {
        let listing = all_modules()
            .iter()
            .map(|m| format!("{}: {}", m.name(), m.title()))
            .collect::<Vec<_>>()
            .join("\n");
        insta::assert_snapshot!("registry", listing);
    }

    #[test]
    fn find_known_module() {
        assert_eq!(find("dev-node").unwrap().title(), "Node.js Development Environment");
    }

    #[test]
    fn find_unknown_module() {
        assert_eq!(
            find("dev-rust").map(|m| m.name()).unwrap_err().to_string(),
            "Unknown module: dev-rust"
        );
    }

    #[test]
    fn execute_records_ok() {
        let log = run_mock(Ok(TaskResult::Ok));
        let entries = log.records();
        assert_eq!(entries[0].module, "mock");
        assert_eq!(entries[0].outcome, Outcome::Ok);
    }

    #[test]
    fn execute_records_skip_reason() {
        let log = run_mock(Ok(TaskResult::Skipped("docker already installed".into())));
        let entries = log.records();
        assert_eq!(entries[0].outcome, Outcome::Skipped);
        assert_eq!(
            entries[0].detail.as_deref(),
            Some("docker already installed")
        );
    }

    #[test]
    fn execute_records_failure_without_propagating() {
        let log = run_mock(Err("apt exploded".to_string()));
        assert_eq!(log.failure_count(), 1);
        assert_eq!(
            log.records()[0].detail.as_deref(),
            Some("apt exploded")
        );
    }

    #[test]
    fn execute_records_dry_run() {
        let log = run_mock(Ok(TaskResult::DryRun));
        assert_eq!(log.records()[0].outcome, Outcome::DryRun);
    }
}
