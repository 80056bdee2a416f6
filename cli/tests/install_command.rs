#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::wildcard_imports,
    clippy::indexing_slicing
)]
//! Integration tests for the `install` command.
//!
//! These tests exercise the module registry, host-aware module selection
//! and the run-to-completion behaviour of [`install_modules`].

mod common;

use std::collections::HashSet;
use std::sync::Arc;

use common::{RecordingExecutor, TestRepoBuilder};
use hostkit_cli::commands::install::{install_modules, select_modules};
use hostkit_cli::config::hosts::HostsFile;
use hostkit_cli::logging::Logger;
use hostkit_cli::modules;
use hostkit_cli::platform::Os;

const HOSTS: &str = "\
presets:
  workstation: [base, shell, dev-python]
  hpc: [shell-hpc]
hosts:
  atlas:
    preset: workstation
    aliases: [atlas-wifi]
    extra: [dev-python, apps-docker]
  kestrel:
    preset: hpc
    hpc:
      scratch: /scratch/ada
";

// ---------------------------------------------------------------------------
// Registry invariants
// ---------------------------------------------------------------------------

#[test]
fn module_names_are_unique_and_titled() {
    let mut seen = HashSet::new();
    for module in modules::all_modules() {
        assert!(
            seen.insert(module.name()),
            "duplicate module name: {}",
            module.name()
        );
        assert!(!module.title().is_empty());
    }
    assert_eq!(seen.len(), 8);
}

#[test]
fn list_matches_registry_order() {
    let names: Vec<&str> = modules::all_modules().iter().map(|m| m.name()).collect();
    assert_eq!(names, modules::list_modules());
    assert_eq!(names.first(), Some(&"base"));
}

// ---------------------------------------------------------------------------
// Host-aware selection
// ---------------------------------------------------------------------------

#[test]
fn alias_selects_preset_then_extras_without_duplicates() {
    let repo = TestRepoBuilder::new().with_conf("hosts.yaml", HOSTS).build();
    let ctx = repo.context(Os::Linux, true, Arc::new(RecordingExecutor::new()));
    let hosts = HostsFile::load(&ctx.config.hosts_file()).unwrap();

    let host = hosts.resolve("atlas-wifi").unwrap();
    let selected: Vec<&str> = select_modules(&host, &ctx)
        .unwrap()
        .iter()
        .map(|m| m.name())
        .collect();
    assert_eq!(selected, vec!["base", "shell", "dev-python", "apps-docker"]);
}

#[test]
fn hpc_host_is_flagged() {
    let repo = TestRepoBuilder::new().with_conf("hosts.yaml", HOSTS).build();
    let hosts = HostsFile::load(&repo.root_path().join("conf/hosts.yaml")).unwrap();
    let host = hosts.resolve("kestrel").unwrap();
    assert!(host.entry.is_hpc());
    assert_eq!(host.modules, vec!["shell-hpc"]);
}

// ---------------------------------------------------------------------------
// Running modules
// ---------------------------------------------------------------------------

#[test]
fn dry_run_runs_no_commands_and_writes_nothing() {
    let repo = TestRepoBuilder::new()
        .with_conf("hosts.yaml", HOSTS)
        .with_conf("packages/base.yaml", "apt: [git, curl]\n")
        .with_conf(
            "urls.yaml",
            "chezmoi: https://get.chezmoi.io\nstarship: https://starship.rs/install.sh\n",
        )
        .build();
    let executor = Arc::new(RecordingExecutor::new());
    let ctx = repo.context(Os::Linux, true, executor.clone());
    let log = Logger::with_log_file(None);

    let to_run = [
        modules::find("shell-hpc").unwrap(),
        modules::find("dev-python").unwrap(),
    ];
    install_modules(&to_run, &ctx, &log, true).unwrap();

    assert!(executor.calls().is_empty());
    assert!(!repo.home().join(".local/bin").exists());
    assert_eq!(log.failure_count(), 0);
}

#[test]
fn failure_is_reported_after_all_modules_run() {
    let repo = TestRepoBuilder::new()
        .with_conf("packages/apps.yaml", "apt: [docker.io]\n")
        .build();
    // sudo -v succeeds, `uv python install` fails
    let executor = Arc::new(RecordingExecutor::with_responses(vec![
        (true, ""),
        (false, ""),
    ]));
    let ctx = repo.context(Os::Linux, false, executor.clone());
    let log = Logger::with_log_file(None);

    let to_run = [
        modules::find("dev-python").unwrap(),
        modules::find("apps-docker").unwrap(),
    ];
    let err = install_modules(&to_run, &ctx, &log, true).unwrap_err();
    assert_eq!(err.to_string(), "1 module(s) failed");

    let calls = executor.calls();
    assert_eq!(calls[0], "sudo -v");
    assert_eq!(calls[1], "uv python install");
    // apps-docker still ran: it installs packages on Linux
    assert!(calls.len() > 2);
}
