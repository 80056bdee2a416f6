//! Links from the home directory into the dotfiles tree (`dotfiles sync --link`).
use anyhow::Result;
use std::path::PathBuf;

use super::{Applicable, Resource, ResourceChange, ResourceState, fs};

/// A symlink at `target` pointing to `source`.
#[derive(Debug, Clone)]
pub struct SymlinkResource {
    /// The file the symlink points to.
    pub source: PathBuf,
    /// Where the symlink is created.
    pub target: PathBuf,
    /// Where to save a regular file found at `target` before replacing it.
    pub backup_dir: Option<PathBuf>,
}

impl SymlinkResource {
    /// Link `target` to `source`, saving any regular file to `backup_dir`.
    #[must_use]
    pub const fn new(source: PathBuf, target: PathBuf, backup_dir: Option<PathBuf>) -> Self {
        Self {
            source,
            target,
            backup_dir,
        }
    }
}

impl Applicable for SymlinkResource {
    fn description(&self) -> String {
        format!("{} -> {}", self.target.display(), self.source.display())
    }

    fn apply(&self) -> Result<ResourceChange> {
        if fs::symlink(&self.source, &self.target, self.backup_dir.as_deref())? {
            Ok(ResourceChange::Applied)
        } else {
            Ok(ResourceChange::AlreadyCorrect)
        }
    }
}

impl Resource for SymlinkResource {
    fn current_state(&self) -> Result<ResourceState> {
        if !self.source.exists() {
            return Ok(ResourceState::Invalid {
                reason: format!("source does not exist: {}", self.source.display()),
            });
        }
        let state = match (self.target.symlink_metadata(), std::fs::read_link(&self.target)) {
            (Err(_), _) => ResourceState::Missing,
            (Ok(meta), _) if meta.is_dir() => ResourceState::Invalid {
                reason: "target is a real directory".to_string(),
            },
            (Ok(_), Ok(existing)) if existing == self.source => ResourceState::Correct,
            (Ok(_), Ok(existing)) => ResourceState::Incorrect {
                current: format!("points to {}", existing.display()),
            },
            (Ok(_), Err(_)) => ResourceState::Incorrect {
                current: "target is a regular file".to_string(),
            },
        };
        Ok(state)
    }
}
