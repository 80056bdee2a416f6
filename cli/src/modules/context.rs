use std::path::Path;
use std::sync::Arc;

use crate::config::Config;
use crate::config::paths::Paths;
use crate::download::Downloader;
use crate::exec::Executor;
use crate::logging::Log;
use crate::platform::Platform;

/// Shared context for module execution.
pub struct Context {
    /// Repository configuration and user paths.
    pub config: Arc<Config>,
    /// Detected platform information.
    pub platform: Arc<Platform>,
    /// Logger for output and module recording.
    pub log: Arc<dyn Log>,
    /// Whether to perform a dry run (preview changes without applying).
    pub dry_run: bool,
    /// Command executor (for testing or real system calls).
    pub executor: Arc<dyn Executor>,
    /// Installer script downloads.
    pub downloader: Arc<dyn Downloader>,
    /// Login name of the invoking user.
    pub user: String,
    /// Value of `$SHELL` at startup (empty when unset).
    pub shell: String,
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("config", &self.config)
            .field("platform", &self.platform)
            .field("log", &"<dyn Log>")
            .field("dry_run", &self.dry_run)
            .field("executor", &"<dyn Executor>")
            .field("downloader", &"<dyn Downloader>")
            .field("user", &self.user)
            .field("shell", &self.shell)
            .finish()
    }
}

impl Context {
    /// Per-user paths.
    #[must_use]
    pub fn paths(&self) -> &Paths {
        &self.config.paths
    }

    /// Repository root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.config.root
    }

    /// Create a copy of this context with a different logger.
    #[must_use]
    pub fn with_log(&self, log: Arc<dyn Log>) -> Self {
        Self {
            config: Arc::clone(&self.config),
            platform: Arc::clone(&self.platform),
            log,
            dry_run: self.dry_run,
            executor: Arc::clone(&self.executor),
            downloader: Arc::clone(&self.downloader),
            user: self.user.clone(),
            shell: self.shell.clone(),
        }
    }

    /// Look up a string in `conf/`, failing when it is absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be read or the key is missing.
    pub fn require_str(&self, key: &str) -> anyhow::Result<String> {
        self.config
            .store
            .get_str(key)?
            .ok_or_else(|| anyhow::anyhow!("missing configuration value: {key}"))
    }
}
