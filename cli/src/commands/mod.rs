pub mod check;
pub mod completions;
pub mod dotfiles;
pub mod install;
pub mod plugins;
pub mod services;
pub mod version;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context as _, Result};

use crate::cli::GlobalOpts;
use crate::config::Config;
use crate::config::hosts::{HostsFile, current_hostname, short_hostname};
use crate::download::HttpDownloader;
use crate::exec::{Executor, SystemExecutor};
use crate::logging::{Log, Logger};
use crate::modules::{self, Context, Module};
use crate::platform::Platform;

/// Environment variable naming the repository root.
pub const ROOT_ENV: &str = "HOSTKIT_ROOT";

/// Shared state produced by the common command setup sequence.
///
/// Encapsulates platform detection, root discovery and configuration so
/// that each command does not have to repeat the boilerplate.
#[derive(Debug)]
pub struct CommandSetup {
    pub platform: Platform,
    pub config: Config,
}

impl CommandSetup {
    /// Detect the platform, locate the repository and the home directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the root directory cannot be determined or
    /// `$HOME` is unset.
    pub fn init(global: &GlobalOpts, log: &Logger) -> Result<Self> {
        let platform = Platform::detect();
        let root = resolve_root(global)?;
        let home = std::env::var_os("HOME")
            .map(PathBuf::from)
            .context("cannot determine home directory: $HOME is not set")?;

        log.debug(&format!("root: {}", root.display()));
        log.debug(&format!("platform: {}", platform.describe()));
        Ok(Self {
            platform,
            config: Config::new(&root, &home),
        })
    }

    /// Build a module context backed by the real system.
    #[must_use]
    pub fn context(self, global: &GlobalOpts, log: Arc<dyn Log>) -> Context {
        let executor: Arc<dyn Executor> = Arc::new(SystemExecutor);
        let user = current_user(executor.as_ref());
        Context {
            config: Arc::new(self.config),
            platform: Arc::new(self.platform),
            log,
            dry_run: global.dry_run,
            user,
            shell: std::env::var("SHELL").unwrap_or_default(),
            executor,
            downloader: Arc::new(HttpDownloader),
        }
    }
}

/// Login name from `$USER`, falling back to `id -un`.
fn current_user(executor: &dyn Executor) -> String {
    std::env::var("USER")
        .ok()
        .filter(|u| !u.is_empty())
        .or_else(|| {
            executor
                .run("id", &["-un"])
                .ok()
                .map(|r| r.stdout.trim().to_string())
        })
        .unwrap_or_default()
}

/// The hostname to act as: `--host` if given, otherwise the machine's own.
#[must_use]
pub fn hostname(global: &GlobalOpts, executor: &dyn Executor) -> String {
    global
        .host
        .as_deref()
        .map_or_else(|| current_hostname(executor), short_hostname)
}

/// Names a host is known by: the raw hostname plus its canonical
/// `hosts.yaml` key when one matches (directly or via an alias).
#[must_use]
pub fn host_names(config: &Config, hostname: &str) -> Vec<String> {
    let mut names = vec![hostname.to_string()];
    if let Ok(hosts) = HostsFile::load(&config.hosts_file())
        && let Ok((canonical, _)) = hosts.find_host(hostname)
        && canonical != hostname
    {
        names.push(canonical.to_string());
    }
    names
}

/// Resolve the repository root from CLI arguments or auto-detection.
///
/// Order: `--root`, `$HOSTKIT_ROOT`, the directory above the binary, then
/// the current directory. Auto-detected candidates must contain `conf/`.
///
/// # Errors
///
/// Returns an error if no candidate holds a `conf/` directory.
pub fn resolve_root(global: &GlobalOpts) -> Result<PathBuf> {
    if let Some(ref root) = global.root {
        return Ok(root.clone());
    }

    if let Ok(root) = std::env::var(ROOT_ENV) {
        return Ok(PathBuf::from(root));
    }

    if let Ok(exe) = std::env::current_exe()
        && let Some(parent) = exe.parent()
    {
        let candidates = [
            parent.join("../../.."), // cli/target/release/ → repo root
            parent.join(".."),       // bin/ → repo root
        ];
        for candidate in &candidates {
            if is_repo_root(candidate) {
                return dunce::canonicalize(candidate)
                    .with_context(|| format!("resolving {}", candidate.display()));
            }
        }
    }

    let cwd = std::env::current_dir()?;
    if is_repo_root(&cwd) {
        return Ok(cwd);
    }

    anyhow::bail!("cannot determine hostkit root. Use --root or set {ROOT_ENV} env var");
}

fn is_repo_root(path: &Path) -> bool {
    path.join("conf").is_dir()
}

/// Execute every module in order, print the summary, and bail if any
/// module failed.
///
/// # Errors
///
/// Returns an error if one or more modules recorded a failure.
pub fn run_modules_to_completion<'a>(
    to_run: impl IntoIterator<Item = &'a dyn Module>,
    ctx: &Context,
    log: &Logger,
) -> Result<()> {
    for module in to_run {
        modules::execute(module, ctx);
    }

    log.print_summary();

    let count = log.failure_count();
    if count > 0 {
        anyhow::bail!("{count} module(s) failed");
    }
    Ok(())
}

/// An error with a suggestion that is shown after it.
#[derive(Debug)]
pub struct Hinted {
    error: anyhow::Error,
    hint: &'static str,
}

impl Hinted {
    /// Wrap `error` with `hint`.
    #[must_use]
    pub const fn new(error: anyhow::Error, hint: &'static str) -> Self {
        Self { error, hint }
    }

    /// The suggestion.
    #[must_use]
    pub const fn hint(&self) -> &'static str {
        self.hint
    }
}

impl std::fmt::Display for Hinted {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#}", self.error)
    }
}

impl std::error::Error for Hinted {}

/// Log a failed command: the error chain first, then its hint if any.
pub fn report_error(log: &dyn Log, err: &anyhow::Error) {
    log.error(&format!("{err:#}"));
    if let Some(hinted) = err.downcast_ref::<Hinted>() {
        log.info(hinted.hint());
    }
}
