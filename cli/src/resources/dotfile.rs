//! Dotfile copy resource.
use anyhow::Result;
use std::path::PathBuf;

use super::{Applicable, Resource, ResourceChange, ResourceState, fs};

/// `current` value reported for a destination that is a symlink.
pub const SYMLINK_STATE: &str = "symlink (will be replaced)";
/// `current` value reported for a destination whose content differs.
pub const MODIFIED_STATE: &str = "modified";

/// A tracked file deployed by copying it over its destination.
#[derive(Debug, Clone)]
pub struct DotfileResource {
    /// File in the repository's `dotfiles/` tree.
    pub source: PathBuf,
    /// Deployed location under `$HOME`.
    pub target: PathBuf,
    /// Where to save a changed destination before overwriting it.
    pub backup_dir: Option<PathBuf>,
}

impl DotfileResource {
    /// Create a new dotfile resource.
    #[must_use]
    pub const fn new(source: PathBuf, target: PathBuf, backup_dir: Option<PathBuf>) -> Self {
        Self {
            source,
            target,
            backup_dir,
        }
    }
}

impl Applicable for DotfileResource {
    fn description(&self) -> String {
        self.target.display().to_string()
    }

    fn apply(&self) -> Result<ResourceChange> {
        if fs::copy(&self.source, &self.target, self.backup_dir.as_deref())? {
            Ok(ResourceChange::Applied)
        } else {
            Ok(ResourceChange::AlreadyCorrect)
        }
    }
}

impl Resource for DotfileResource {
    fn current_state(&self) -> Result<ResourceState> {
        if !self.source.is_file() {
            return Ok(ResourceState::Invalid {
                reason: format!("source not found: {}", self.source.display()),
            });
        }
        let Ok(meta) = self.target.symlink_metadata() else {
            return Ok(ResourceState::Missing);
        };
        if meta.file_type().is_symlink() {
            return Ok(ResourceState::Incorrect {
                current: SYMLINK_STATE.to_string(),
            });
        }
        if meta.is_dir() {
            return Ok(ResourceState::Invalid {
                reason: "target is a directory".to_string(),
            });
        }
        if fs::files_equal(&self.source, &self.target)? {
            Ok(ResourceState::Correct)
        } else {
            Ok(ResourceState::Incorrect {
                current: MODIFIED_STATE.to_string(),
            })
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    fn fixture() -> (tempfile::TempDir, DotfileResource) {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("src/.zshrc");
        std::fs::create_dir_all(source.parent().unwrap()).unwrap();
        std::fs::write(&source, "export EDITOR=nvim\n").unwrap();
        let resource = DotfileResource::new(
            source,
            dir.path().join("home/.zshrc"),
            Some(dir.path().join("backups")),
        );
        (dir, resource)
    }

    #[test]
    fn missing_then_correct_after_apply() {
        let (_dir, resource) = fixture();
        assert_eq!(resource.current_state().unwrap(), ResourceState::Missing);
        assert_eq!(resource.apply().unwrap(), ResourceChange::Applied);
        assert_eq!(resource.current_state().unwrap(), ResourceState::Correct);
        assert_eq!(resource.apply().unwrap(), ResourceChange::AlreadyCorrect);
    }

    #[test]
    fn modified_destination_is_incorrect_and_backed_up() {
        let (dir, resource) = fixture();
        std::fs::create_dir_all(resource.target.parent().unwrap()).unwrap();
        std::fs::write(&resource.target, "local edits\n").unwrap();
        assert_eq!(
            resource.current_state().unwrap(),
            ResourceState::Incorrect {
                current: MODIFIED_STATE.to_string()
            }
        );
        resource.apply().unwrap();
        assert_eq!(std::fs::read_dir(dir.path().join("backups")).unwrap().count(), 1);
    }

    #[test]
    fn symlinked_destination_is_incorrect() {
        let (_dir, resource) = fixture();
        std::fs::create_dir_all(resource.target.parent().unwrap()).unwrap();
        std::os::unix::fs::symlink(&resource.source, &resource.target).unwrap();
        assert_eq!(
            resource.current_state().unwrap(),
            ResourceState::Incorrect {
                current: SYMLINK_STATE.to_string()
            }
        );
        resource.apply().unwrap();
        assert_eq!(resource.current_state().unwrap(), ResourceState::Correct);
    }

    #[test]
    fn missing_source_is_invalid() {
        let (_dir, resource) = fixture();
        std::fs::remove_file(&resource.source).unwrap();
        assert!(matches!(
            resource.current_state().unwrap(),
            ResourceState::Invalid { .. }
        ));
    }
}
