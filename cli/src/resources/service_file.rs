//! Generated service definition file (launchd plist, systemd unit or timer).
use anyhow::{Context as _, Result};
use std::path::PathBuf;

use super::{Applicable, Resource, ResourceChange, ResourceState, fs};

/// A file whose entire content is generated.
#[derive(Debug, Clone)]
pub struct ServiceFileResource {
    /// Destination path.
    pub path: PathBuf,
    /// Desired content.
    pub content: String,
}

impl ServiceFileResource {
    /// Create a new service file resource.
    #[must_use]
    pub const fn new(path: PathBuf, content: String) -> Self {
        Self { path, content }
    }
}

impl Applicable for ServiceFileResource {
    fn description(&self) -> String {
        self.path.display().to_string()
    }

    fn apply(&self) -> Result<ResourceChange> {
        if self.current_state()? == ResourceState::Correct {
            return Ok(ResourceChange::AlreadyCorrect);
        }
        fs::ensure_parent_dir(&self.path)?;
        std::fs::write(&self.path, &self.content)
            .with_context(|| format!("write {}", self.path.display()))?;
        Ok(ResourceChange::Applied)
    }

    fn remove(&self) -> Result<ResourceChange> {
        if self.path.symlink_metadata().is_err() {
            return Ok(ResourceChange::AlreadyCorrect);
        }
        fs::remove_existing(&self.path)?;
        Ok(ResourceChange::Applied)
    }
}

impl Resource for ServiceFileResource {
    fn current_state(&self) -> Result<ResourceState> {
        if !self.path.exists() {
            return Ok(ResourceState::Missing);
        }
        let existing = std::fs::read_to_string(&self.path)
            .with_context(|| format!("read {}", self.path.display()))?;
        if existing == self.content {
            Ok(ResourceState::Correct)
        } else {
            Ok(ResourceState::Incorrect {
                current: "content differs".to_string(),
            })
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn writes_only_when_content_changes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("agents/x.plist");
        let r = ServiceFileResource::new(path.clone(), "v1".to_string());

        assert_eq!(r.current_state().unwrap(), ResourceState::Missing);
        assert_eq!(r.apply().unwrap(), ResourceChange::Applied);
        assert_eq!(r.apply().unwrap(), ResourceChange::AlreadyCorrect);

        let r2 = ServiceFileResource::new(path.clone(), "v2".to_string());
        assert!(matches!(
            r2.current_state().unwrap(),
            ResourceState::Incorrect { .. }
        ));
        assert_eq!(r2.apply().unwrap(), ResourceChange::Applied);
        assert_eq!(std::fs::read_to_string(path).unwrap(), "v2");
    }

    #[test]
    fn remove_deletes_file() {
        let dir = tempfile::tempdir().unwrap();
        let r = ServiceFileResource::new(dir.path().join("x.service"), "unit".to_string());
        assert_eq!(r.remove().unwrap(), ResourceChange::AlreadyCorrect);
        r.apply().unwrap();
        assert_eq!(r.remove().unwrap(), ResourceChange::Applied);
        assert!(!r.path.exists());
    }
}
