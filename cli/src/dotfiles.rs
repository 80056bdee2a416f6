//! Dotfile trees: source/destination mapping, status, diffs and sync resources.
use anyhow::{Context as _, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::paths::Paths;
use crate::resources::dotfile::{DotfileResource, SYMLINK_STATE};
use crate::resources::symlink::SymlinkResource;
use crate::resources::{Applicable, Resource, ResourceChange, ResourceState};

/// A tracked file and where it is deployed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DotfileMapping {
    /// File under `dotfiles/`.
    pub source: PathBuf,
    /// Deployed location.
    pub target: PathBuf,
}

/// Deployment state of one mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DotfileStatus {
    /// Destination does not exist.
    Missing,
    /// Destination is a symlink and will be replaced by a copy.
    Symlink,
    /// Destination content differs from the source.
    Modified,
    /// Destination matches the source.
    UpToDate,
    /// The mapping cannot be deployed.
    Invalid(String),
}

impl DotfileStatus {
    /// Short reason shown next to pending entries.
    #[must_use]
    pub fn reason(&self) -> &str {
        match self {
            Self::Missing => "missing",
            Self::Symlink => SYMLINK_STATE,
            Self::Modified => "modified",
            Self::UpToDate => "up to date",
            Self::Invalid(reason) => reason,
        }
    }
}

/// The source sub-trees and the directory each one deploys into.
fn trees(paths: &Paths) -> [(&'static str, &Path); 3] {
    [
        ("home", paths.home.as_path()),
        ("config", paths.xdg_config.as_path()),
        ("local", paths.local.as_path()),
    ]
}

/// Every regular file under `dotfiles_dir/{home,config,local}` paired with
/// its destination, sorted by source path. Missing trees are skipped.
///
/// # Errors
///
/// Returns an error if a tree cannot be walked.
pub fn mappings(dotfiles_dir: &Path, paths: &Paths) -> Result<Vec<DotfileMapping>> {
    let mut out = Vec::new();
    for (name, base) in trees(paths) {
        let root = dotfiles_dir.join(name);
        if !root.is_dir() {
            continue;
        }
        for entry in WalkDir::new(&root).sort_by_file_name() {
            let entry = entry.with_context(|| format!("walking {}", root.display()))?;
            // Symlinked sources count as files; symlinked directories are not entered.
            if !entry.path().is_file() {
                continue;
            }
            let rel = entry
                .path()
                .strip_prefix(&root)
                .with_context(|| format!("{} is outside {}", entry.path().display(), root.display()))?;
            out.push(DotfileMapping {
                source: entry.path().to_path_buf(),
                target: base.join(rel),
            });
        }
    }
    out.sort_by(|a, b| a.source.cmp(&b.source));
    Ok(out)
}

/// Classify a mapping against the deployed file.
///
/// # Errors
///
/// Returns an error if either file cannot be read.
pub fn status(mapping: &DotfileMapping) -> Result<DotfileStatus> {
    let resource = DotfileResource::new(mapping.source.clone(), mapping.target.clone(), None);
    Ok(match resource.current_state()? {
        ResourceState::Missing => DotfileStatus::Missing,
        ResourceState::Correct => DotfileStatus::UpToDate,
        ResourceState::Incorrect { current } if current == SYMLINK_STATE => DotfileStatus::Symlink,
        ResourceState::Incorrect { .. } => DotfileStatus::Modified,
        ResourceState::Invalid { reason } => DotfileStatus::Invalid(reason),
    })
}

/// Unified diff from the deployed file (`---`) to the source (`+++`).
///
/// A missing side yields a single explanatory line; non-UTF-8 content
/// yields `None`. Identical files produce an empty diff.
///
/// # Errors
///
/// Returns an error if an existing file cannot be read.
pub fn file_diff(src: &Path, dst: &Path) -> Result<Option<Vec<String>>> {
    if !src.exists() {
        return Ok(Some(vec![format!("Source not found: {}", src.display())]));
    }
    if !dst.exists() {
        return Ok(Some(vec![format!(
            "Destination not found: {}",
            dst.display()
        )]));
    }
    let src_bytes = std::fs::read(src).with_context(|| format!("reading {}", src.display()))?;
    let dst_bytes = std::fs::read(dst).with_context(|| format!("reading {}", dst.display()))?;
    let (Ok(new), Ok(old)) = (String::from_utf8(src_bytes), String::from_utf8(dst_bytes)) else {
        return Ok(None);
    };

    let diff = similar::TextDiff::from_lines(&old, &new);
    let rendered = diff
        .unified_diff()
        .header(&dst.display().to_string(), &src.display().to_string())
        .to_string();
    Ok(Some(rendered.lines().map(str::to_string).collect()))
}

/// How a mapping is deployed during sync.
#[derive(Debug, Clone)]
pub enum SyncResource {
    /// Copy the source over the destination.
    Copy(DotfileResource),
    /// Point the destination at the source.
    Link(SymlinkResource),
}

impl Applicable for SyncResource {
    fn description(&self) -> String {
        match self {
            Self::Copy(r) => r.description(),
            Self::Link(r) => r.description(),
        }
    }

    fn apply(&self) -> Result<ResourceChange> {
        match self {
            Self::Copy(r) => r.apply(),
            Self::Link(r) => r.apply(),
        }
    }
}

impl Resource for SyncResource {
    fn current_state(&self) -> Result<ResourceState> {
        match self {
            Self::Copy(r) => r.current_state(),
            Self::Link(r) => r.current_state(),
        }
    }
}

/// Build the resources that bring every mapping up to date.
///
/// Copies by default; `link` deploys symlinks to the source instead.
/// `backup_dir` is where replaced files are saved (`None` with `--force`).
#[must_use]
pub fn sync_resources(
    mappings: &[DotfileMapping],
    link: bool,
    backup_dir: Option<&Path>,
) -> Vec<SyncResource> {
    let backup = backup_dir.map(Path::to_path_buf);
    mappings
        .iter()
        .map(|m| {
            if link {
                SyncResource::Link(SymlinkResource::new(
                    m.source.clone(),
                    m.target.clone(),
                    backup.clone(),
                ))
            } else {
                SyncResource::Copy(DotfileResource::new(
                    m.source.clone(),
                    m.target.clone(),
                    backup.clone(),
                ))
            }
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn write(path: &Path, content: &str) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    struct Fixture {
        _dir: tempfile::TempDir,
        dotfiles: PathBuf,
        paths: Paths,
    }

    fn fixture() -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let dotfiles = dir.path().join("repo/dotfiles");
        let paths = Paths::from_home(&dir.path().join("home"));
        write(&dotfiles.join("home/.zshenv"), "export ZDOTDIR=~/.config/zsh\n");
        write(&dotfiles.join("config/zsh/.zshrc"), "autoload -U compinit\n");
        write(&dotfiles.join("config/git/config"), "[user]\n");
        Fixture {
            _dir: dir,
            dotfiles,
            paths,
        }
    }

    #[test]
    fn mappings_cover_each_tree_sorted() {
        let fx = fixture();
        let found = mappings(&fx.dotfiles, &fx.paths).unwrap();
        let targets: Vec<PathBuf> = found.into_iter().map(|m| m.target).collect();
        assert_eq!(
            targets,
            vec![
                fx.paths.xdg_config.join("git/config"),
                fx.paths.xdg_config.join("zsh/.zshrc"),
                fx.paths.home.join(".zshenv"),
            ]
        );
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_sources_are_mapped() {
        let fx = fixture();
        let shared = fx.dotfiles.parent().unwrap().join("shared/gitignore");
        write(&shared, "target/\n");
        std::os::unix::fs::symlink(&shared, fx.dotfiles.join("config/git/ignore")).unwrap();

        let found = mappings(&fx.dotfiles, &fx.paths).unwrap();
        assert!(
            found
                .iter()
                .any(|m| m.target == fx.paths.xdg_config.join("git/ignore"))
        );
        assert_eq!(found.len(), 4);
    }

    #[test]
    fn missing_dotfiles_dir_yields_nothing() {
        let fx = fixture();
        assert!(
            mappings(&fx.dotfiles.join("nope"), &fx.paths)
                .unwrap()
                .is_empty()
        );
    }

    #[test]
    fn status_classification() {
        let fx = fixture();
        let all = mappings(&fx.dotfiles, &fx.paths).unwrap();
        let git = &all[0];
        let zshrc = &all[1];
        let zshenv = &all[2];

        write(&git.target, "[user]\n");
        write(&zshrc.target, "# local edit\n");
        std::os::unix::fs::symlink(&zshenv.source, &zshenv.target).unwrap();

        assert_eq!(status(git).unwrap(), DotfileStatus::UpToDate);
        assert_eq!(status(zshrc).unwrap(), DotfileStatus::Modified);
        assert_eq!(status(zshenv).unwrap(), DotfileStatus::Symlink);
        assert_eq!(DotfileStatus::Symlink.reason(), "symlink (will be replaced)");

        std::fs::remove_file(&git.target).unwrap();
        assert_eq!(status(git).unwrap(), DotfileStatus::Missing);
    }

    #[test]
    fn diff_of_modified_file() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src");
        let dst = dir.path().join("dst");
        std::fs::write(&src, "a\nb\n").unwrap();
        std::fs::write(&dst, "a\nc\n").unwrap();

        let lines = file_diff(&src, &dst).unwrap().unwrap();
        assert_eq!(lines[0], format!("--- {}", dst.display()));
        assert_eq!(lines[1], format!("+++ {}", src.display()));
        assert!(lines.contains(&"-c".to_string()));
        assert!(lines.contains(&"+b".to_string()));
    }

    #[test]
    fn diff_of_identical_files_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src");
        let dst = dir.path().join("dst");
        std::fs::write(&src, "same\n").unwrap();
        std::fs::write(&dst, "same\n").unwrap();
        assert_eq!(file_diff(&src, &dst).unwrap(), Some(vec![]));
    }

    #[test]
    fn diff_reports_missing_sides() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src");
        let dst = dir.path().join("dst");
        assert_eq!(
            file_diff(&src, &dst).unwrap(),
            Some(vec![format!("Source not found: {}", src.display())])
        );
        std::fs::write(&src, "x").unwrap();
        assert_eq!(
            file_diff(&src, &dst).unwrap(),
            Some(vec![format!("Destination not found: {}", dst.display())])
        );
    }

    #[test]
    fn diff_of_binary_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src");
        let dst = dir.path().join("dst");
        std::fs::write(&src, [0xff, 0xfe, 0x00]).unwrap();
        std::fs::write(&dst, "text").unwrap();
        assert_eq!(file_diff(&src, &dst).unwrap(), None);
    }

    #[test]
    fn sync_resources_copy_or_link() {
        let fx = fixture();
        let all = mappings(&fx.dotfiles, &fx.paths).unwrap();

        for r in sync_resources(&all, false, None) {
            r.apply().unwrap();
        }
        assert!(all.iter().all(|m| status(m).unwrap() == DotfileStatus::UpToDate));

        let linked = sync_resources(&all, true, Some(&fx.paths.backup_dir));
        for r in &linked {
            assert!(matches!(
                r.current_state().unwrap(),
                ResourceState::Incorrect { .. }
            ));
            r.apply().unwrap();
        }
        assert!(all.iter().all(|m| m.target.is_symlink()));
        assert!(fx.paths.backup_dir.is_dir());
    }
}
