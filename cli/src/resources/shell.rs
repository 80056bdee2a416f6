use anyhow::Result;
use std::path::PathBuf;

use super::{Applicable, Resource, ResourceChange, ResourceState};
use crate::exec::Executor;

/// The user's login shell.
pub struct DefaultShellResource<'a> {
    /// Absolute path of the desired shell (e.g. `/usr/bin/zsh`).
    pub shell_path: String,
    /// Value of `$SHELL` when the resource was built.
    pub current_shell: String,
    /// Account to change; `None` changes the invoking user via plain `chsh`.
    pub user: Option<String>,
    /// Registry of permitted login shells.
    pub etc_shells: PathBuf,
    executor: &'a dyn Executor,
}

impl std::fmt::Debug for DefaultShellResource<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DefaultShellResource")
            .field("shell_path", &self.shell_path)
            .field("current_shell", &self.current_shell)
            .field("user", &self.user)
            .finish_non_exhaustive()
    }
}

impl<'a> DefaultShellResource<'a> {
    /// Create a new default shell resource.
    #[must_use]
    pub fn new(
        shell_path: String,
        current_shell: String,
        user: Option<String>,
        executor: &'a dyn Executor,
    ) -> Self {
        Self {
            shell_path,
            current_shell,
            user,
            etc_shells: PathBuf::from("/etc/shells"),
            executor,
        }
    }

    fn is_registered(&self) -> bool {
        std::fs::read_to_string(&self.etc_shells)
            .is_ok_and(|content| content.lines().any(|l| l.trim() == self.shell_path))
    }
}

impl Applicable for DefaultShellResource<'_> {
    fn description(&self) -> String {
        format!("default shell -> {}", self.shell_path)
    }

    fn apply(&self) -> Result<ResourceChange> {
        match &self.user {
            Some(user) => {
                if !self.is_registered() {
                    let line = format!(
                        "echo '{}' >> {}",
                        self.shell_path,
                        self.etc_shells.display()
                    );
                    self.executor.run("sudo", &["sh", "-c", &line])?;
                }
                self.executor
                    .run("sudo", &["chsh", "-s", &self.shell_path, user])?;
            }
            None => {
                self.executor
                    .run_interactive("chsh", &["-s", &self.shell_path])?;
            }
        }
        Ok(ResourceChange::Applied)
    }
}

impl Resource for DefaultShellResource<'_> {
    fn current_state(&self) -> Result<ResourceState> {
        if self.current_shell == self.shell_path {
            Ok(ResourceState::Correct)
        } else if self.current_shell.is_empty() {
            Ok(ResourceState::Missing)
        } else {
            Ok(ResourceState::Incorrect {
                current: self.current_shell.clone(),
            })
        }
    }
}
