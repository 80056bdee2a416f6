//! User service management on launchd (macOS) and systemd `--user` (Linux).
//!
//! Artifacts are generated from [`ServiceDef`]s and written through
//! [`ServiceFileResource`] so repeated deploys only touch changed files.
pub mod launchd;
pub mod systemd;

use anyhow::{Context as _, Result};
use std::path::PathBuf;

use crate::config::paths::Paths;
use crate::config::services::ServiceDef;
use crate::exec::Executor;
use crate::platform::Os;
use crate::resources::service_file::ServiceFileResource;
use crate::resources::{Applicable, Resource, ResourceChange, fs};

/// Which supervisor manages user services.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// macOS launch agents.
    Launchd,
    /// systemd user units.
    Systemd,
}

impl Backend {
    /// The supervisor native to `os`.
    #[must_use]
    pub const fn for_os(os: Os) -> Self {
        match os {
            Os::MacOs => Self::Launchd,
            Os::Linux => Self::Systemd,
        }
    }
}

/// Installed/running state of one service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ServiceStatus {
    /// The primary artifact exists on disk.
    pub installed: bool,
    /// The supervisor reports the service as loaded/active.
    pub running: bool,
}

/// Outcome of deploying a single service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeployOutcome {
    /// Artifacts changed and the service was (re)loaded.
    Loaded,
    /// Artifacts changed while the service was already running.
    Updated,
    /// Nothing changed.
    Unchanged,
}

/// Generates, installs and drives services for one backend.
pub struct ServiceManager<'a> {
    backend: Backend,
    paths: &'a Paths,
    executor: &'a dyn Executor,
}

impl std::fmt::Debug for ServiceManager<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceManager")
            .field("backend", &self.backend)
            .field("paths", &self.paths)
            .finish_non_exhaustive()
    }
}

impl<'a> ServiceManager<'a> {
    /// Create a manager for `backend`.
    #[must_use]
    pub const fn new(backend: Backend, paths: &'a Paths, executor: &'a dyn Executor) -> Self {
        Self {
            backend,
            paths,
            executor,
        }
    }

    /// The backend in use.
    #[must_use]
    pub const fn backend(&self) -> Backend {
        self.backend
    }

    /// Path of the artifact the supervisor loads (plist, unit or timer).
    #[must_use]
    pub fn primary_path(&self, svc: &ServiceDef) -> PathBuf {
        match self.backend {
            Backend::Launchd => launchd::plist_path(svc, self.paths),
            Backend::Systemd if svc.interval.is_some() => systemd::timer_path(svc, self.paths),
            Backend::Systemd => systemd::unit_path(svc, self.paths),
        }
    }

    /// Every file generated for `svc`, primary artifact last.
    #[must_use]
    pub fn artifacts(&self, svc: &ServiceDef) -> Vec<ServiceFileResource> {
        match self.backend {
            Backend::Launchd => vec![ServiceFileResource::new(
                launchd::plist_path(svc, self.paths),
                launchd::generate_plist(svc, self.paths),
            )],
            Backend::Systemd => {
                let mut files = vec![ServiceFileResource::new(
                    systemd::unit_path(svc, self.paths),
                    systemd::generate_unit(svc, self.paths),
                )];
                if let Some(timer) = systemd::generate_timer(svc) {
                    files.push(ServiceFileResource::new(
                        systemd::timer_path(svc, self.paths),
                        timer,
                    ));
                }
                files
            }
        }
    }

    /// Whether any artifact is missing or differs from what would be written.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing artifact cannot be read.
    pub fn needs_install(&self, svc: &ServiceDef) -> Result<bool> {
        if self.stale_timer(svc).is_some() {
            return Ok(true);
        }
        for file in self.artifacts(svc) {
            if file.needs_change()? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Write the service's artifacts; returns `true` if anything changed.
    ///
    /// # Errors
    ///
    /// Returns an error if a file cannot be written or the systemd daemon
    /// cannot be reloaded.
    pub fn install(&self, svc: &ServiceDef) -> Result<bool> {
        let mut changed = self.retire_stale_timer(svc)?;
        for file in self.artifacts(svc) {
            if file.apply()? == ResourceChange::Applied {
                tracing::debug!("wrote {}", file.description());
                changed = true;
            }
        }
        if changed && self.backend == Backend::Systemd {
            self.systemctl(&["daemon-reload"])?;
        }
        Ok(changed)
    }

    /// Install if needed, then start the service.
    ///
    /// # Errors
    ///
    /// Returns an error if installation fails or the supervisor rejects the
    /// service.
    pub fn load(&self, svc: &ServiceDef) -> Result<()> {
        self.install(svc)?;
        match self.backend {
            Backend::Launchd => {
                let domain = self.gui_domain()?;
                let plist = self.primary_path(svc).display().to_string();
                self.executor
                    .run("launchctl", &["bootstrap", &domain, &plist])
                    .with_context(|| format!("loading {}", svc.label))?;
            }
            Backend::Systemd => {
                let unit = systemd::primary_unit(svc);
                self.systemctl(&["enable", "--now", &unit])
                    .with_context(|| format!("enabling {unit}"))?;
            }
        }
        Ok(())
    }

    /// Stop the service and delete its artifacts.
    ///
    /// Supervisor failures (e.g. the service was never loaded) are ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if an artifact cannot be removed.
    pub fn unload(&self, svc: &ServiceDef) -> Result<()> {
        match self.backend {
            Backend::Launchd => {
                let target = format!("{}/{}", self.gui_domain()?, svc.label);
                let result = self.executor.run_unchecked("launchctl", &["bootout", &target])?;
                if !result.success {
                    tracing::debug!("launchctl bootout {target}: {}", result.stderr.trim());
                }
            }
            Backend::Systemd => {
                let unit = systemd::primary_unit(svc);
                let result = self
                    .executor
                    .run_unchecked("systemctl", &["--user", "disable", "--now", &unit])?;
                if !result.success {
                    tracing::debug!("systemctl disable {unit}: {}", result.stderr.trim());
                }
            }
        }
        self.retire_stale_timer(svc)?;
        for file in self.artifacts(svc) {
            file.remove()?;
        }
        if self.backend == Backend::Systemd {
            self.executor
                .run_unchecked("systemctl", &["--user", "daemon-reload"])?;
        }
        Ok(())
    }

    /// Report whether the service is installed and running. The supervisor
    /// is only asked when the primary artifact exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the supervisor cannot be queried.
    pub fn status(&self, svc: &ServiceDef) -> Result<ServiceStatus> {
        if !self.primary_path(svc).exists() {
            return Ok(ServiceStatus::default());
        }
        let running = match self.backend {
            Backend::Launchd => {
                let target = format!("{}/{}", self.gui_domain()?, svc.label);
                self.executor
                    .run_unchecked("launchctl", &["print", &target])?
                    .success
            }
            Backend::Systemd => {
                let unit = systemd::primary_unit(svc);
                self.executor
                    .run_unchecked("systemctl", &["--user", "is-active", "--quiet", &unit])?
                    .success
            }
        };
        Ok(ServiceStatus {
            installed: true,
            running,
        })
    }

    /// Install `svc` and load it when its artifacts changed and it is not
    /// already running.
    ///
    /// # Errors
    ///
    /// Returns an error if installation or loading fails.
    pub fn deploy(&self, svc: &ServiceDef) -> Result<DeployOutcome> {
        if !self.install(svc)? {
            return Ok(DeployOutcome::Unchanged);
        }
        if self.status(svc)?.running {
            return Ok(DeployOutcome::Updated);
        }
        self.load(svc)?;
        Ok(DeployOutcome::Loaded)
    }

    /// A `.timer` left over from when `svc` was periodic.
    fn stale_timer(&self, svc: &ServiceDef) -> Option<PathBuf> {
        (self.backend == Backend::Systemd && svc.interval.is_none())
            .then(|| systemd::timer_path(svc, self.paths))
            .filter(|path| path.exists())
    }

    /// Disable and delete a stale timer; `true` if there was one.
    fn retire_stale_timer(&self, svc: &ServiceDef) -> Result<bool> {
        let Some(path) = self.stale_timer(svc) else {
            return Ok(false);
        };
        let timer = format!("{}.timer", svc.label);
        let result = self
            .executor
            .run_unchecked("systemctl", &["--user", "disable", "--now", &timer])?;
        if !result.success {
            tracing::debug!("systemctl disable {timer}: {}", result.stderr.trim());
        }
        fs::remove_existing(&path)?;
        tracing::debug!("removed stale {}", path.display());
        Ok(true)
    }

    fn systemctl(&self, args: &[&str]) -> Result<()> {
        let mut full = vec!["--user"];
        full.extend_from_slice(args);
        self.executor.run("systemctl", &full)?;
        Ok(())
    }

    fn gui_domain(&self) -> Result<String> {
        let uid = self
            .executor
            .run("id", &["-u"])
            .context("determining user id")?;
        Ok(format!("gui/{}", uid.stdout.trim()))
    }
}
