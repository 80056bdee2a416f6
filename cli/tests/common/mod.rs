// Shared helpers for integration tests.
//
// Provides a temporary-directory-backed test repository, a recording
// executor, and a fluent builder so each integration test can set up an
// isolated environment without repeating filesystem boilerplate.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::collections::{HashSet, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{Result, bail};

use hostkit_cli::config::Config;
use hostkit_cli::download::Downloader;
use hostkit_cli::exec::{ExecResult, Executor};
use hostkit_cli::logging::{Log, Logger};
use hostkit_cli::modules::Context;
use hostkit_cli::platform::{Distro, Os, Platform};

const UBUNTU: &str = "ID=ubuntu\nID_LIKE=debian\nVERSION_ID=\"24.04\"\nNAME=\"Ubuntu\"\n";

/// Write `content` to `root/<rel>`, creating parent directories.
pub fn write_file(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create parent dir");
    }
    std::fs::write(&path, content).expect("write file");
}

/// Executor that records every command line and answers from a queue.
///
/// Once the queue is empty every command succeeds with empty output.
/// `which` answers from a fixed set of program names.
#[derive(Debug, Default)]
pub struct RecordingExecutor {
    calls: Mutex<Vec<String>>,
    responses: Mutex<VecDeque<(bool, String)>>,
    programs: HashSet<String>,
}

impl RecordingExecutor {
    /// Succeed for every command.
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer the first commands with `responses`, in order.
    pub fn with_responses(responses: Vec<(bool, &str)>) -> Self {
        Self {
            responses: Mutex::new(
                responses
                    .into_iter()
                    .map(|(ok, out)| (ok, out.to_string()))
                    .collect(),
            ),
            ..Self::default()
        }
    }

    /// Report `programs` as present on `PATH`.
    pub fn with_programs(mut self, programs: &[&str]) -> Self {
        self.programs = programs.iter().map(ToString::to_string).collect();
        self
    }

    /// Every recorded command line.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls lock").clone()
    }

    fn next(&self, program: &str, args: &[&str]) -> ExecResult {
        let mut line = program.to_string();
        for arg in args {
            line.push(' ');
            line.push_str(arg);
        }
        self.calls.lock().expect("calls lock").push(line);
        let (success, stdout) = self
            .responses
            .lock()
            .expect("responses lock")
            .pop_front()
            .unwrap_or((true, String::new()));
        ExecResult {
            stdout,
            stderr: String::new(),
            success,
            code: Some(i32::from(!success)),
        }
    }
}

impl Executor for RecordingExecutor {
    fn run(&self, program: &str, args: &[&str]) -> Result<ExecResult> {
        let result = self.next(program, args);
        if !result.success {
            bail!("{program} failed");
        }
        Ok(result)
    }

    fn run_unchecked(&self, program: &str, args: &[&str]) -> Result<ExecResult> {
        Ok(self.next(program, args))
    }

    fn run_interactive(&self, program: &str, args: &[&str]) -> Result<()> {
        self.run(program, args).map(|_| ())
    }

    fn which(&self, program: &str) -> bool {
        self.programs.contains(program)
    }
}

/// Downloader that serves a fixed body and records requested URLs.
#[derive(Debug, Default)]
pub struct FixedDownloader {
    urls: Mutex<Vec<String>>,
}

impl FixedDownloader {
    /// URLs fetched so far.
    pub fn urls(&self) -> Vec<String> {
        self.urls.lock().expect("urls lock").clone()
    }
}

impl Downloader for FixedDownloader {
    fn fetch(&self, url: &str) -> Result<String> {
        self.urls.lock().expect("urls lock").push(url.to_string());
        Ok("#!/bin/sh\nexit 0\n".to_string())
    }
}

/// An isolated test repository backed by a [`tempfile::TempDir`].
///
/// Holds `conf/`, `dotfiles/` and a fake `home/` side by side.
pub struct TestRepo {
    /// Temporary directory containing the repository and home.
    pub root: tempfile::TempDir,
}

impl TestRepo {
    /// Repository root.
    pub fn root_path(&self) -> &Path {
        self.root.path()
    }

    /// Fake home directory.
    pub fn home(&self) -> PathBuf {
        self.root.path().join("home")
    }

    /// Build a module context for `os` over this repository.
    pub fn context(&self, os: Os, dry_run: bool, executor: Arc<dyn Executor>) -> Context {
        let distro = match os {
            Os::Linux => Distro::from_os_release(UBUNTU),
            Os::MacOs => Distro::macos("15.1"),
        };
        let log: Arc<dyn Log> = Arc::new(Logger::with_log_file(None));
        Context {
            config: Arc::new(Config::new(self.root.path(), &self.home())),
            platform: Arc::new(Platform::new(os, distro)),
            log,
            dry_run,
            executor,
            downloader: Arc::new(FixedDownloader::default()),
            user: "ada".to_string(),
            shell: "/bin/bash".to_string(),
        }
    }
}

/// Fluent builder for [`TestRepo`].
pub struct TestRepoBuilder {
    repo: TestRepo,
}

impl TestRepoBuilder {
    /// Begin with an empty `conf/` directory.
    pub fn new() -> Self {
        let root = tempfile::tempdir().expect("create temp dir");
        std::fs::create_dir_all(root.path().join("conf")).expect("create conf dir");
        std::fs::create_dir_all(root.path().join("home")).expect("create home dir");
        Self {
            repo: TestRepo { root },
        }
    }

    /// Write `conf/<rel>`.
    pub fn with_conf(self, rel: &str, content: &str) -> Self {
        write_file(self.repo.root.path(), &format!("conf/{rel}"), content);
        self
    }

    /// Write `dotfiles/<rel>`.
    pub fn with_dotfile(self, rel: &str, content: &str) -> Self {
        write_file(self.repo.root.path(), &format!("dotfiles/{rel}"), content);
        self
    }

    /// Finish building.
    pub fn build(self) -> TestRepo {
        self.repo
    }
}

/// The repository's own `conf/` directory.
pub fn shipped_conf_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../conf")
}
