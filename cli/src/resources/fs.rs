//! File-system helpers shared by dotfile and service resources.
use anyhow::{Context as _, Result, bail};
use std::io::Read as _;
use std::path::{Path, PathBuf};

/// Create `path` and its ancestors if missing. Returns `true` if created.
///
/// # Errors
///
/// Returns an error if the directory cannot be created.
pub fn ensure_dir(path: &Path) -> Result<bool> {
    if path.is_dir() {
        return Ok(false);
    }
    std::fs::create_dir_all(path).with_context(|| format!("create dir: {}", path.display()))?;
    Ok(true)
}

/// Ensure the parent directory of `path` exists.
///
/// # Errors
///
/// Returns an error if the directory cannot be created.
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create parent: {}", parent.display()))?;
    }
    Ok(())
}

/// Remove an existing file or symlink at `path`, including broken symlinks.
/// Does nothing if `path` does not exist.
///
/// # Errors
///
/// Returns an error if the path exists but cannot be removed.
pub fn remove_existing(path: &Path) -> Result<()> {
    if path.symlink_metadata().is_ok() {
        std::fs::remove_file(path)
            .with_context(|| format!("remove existing: {}", path.display()))?;
    }
    Ok(())
}

/// Compare two files by size, then by content.
///
/// # Errors
///
/// Returns an error if either file cannot be read.
pub fn files_equal(a: &Path, b: &Path) -> Result<bool> {
    let meta_a = std::fs::metadata(a).with_context(|| format!("stat {}", a.display()))?;
    let meta_b = std::fs::metadata(b).with_context(|| format!("stat {}", b.display()))?;
    if meta_a.len() != meta_b.len() {
        return Ok(false);
    }

    let mut file_a = std::fs::File::open(a).with_context(|| format!("open {}", a.display()))?;
    let mut file_b = std::fs::File::open(b).with_context(|| format!("open {}", b.display()))?;
    let mut buf_a = [0u8; 8192];
    let mut buf_b = [0u8; 8192];
    loop {
        let n = file_a.read(&mut buf_a)?;
        if n == 0 {
            return Ok(true);
        }
        file_b.read_exact(buf_b.get_mut(..n).unwrap_or_default())?;
        if buf_a.get(..n) != buf_b.get(..n) {
            return Ok(false);
        }
    }
}

/// Copy `path` into `backup_dir` as `<name>.<YYYYmmddHHMMSS>`.
///
/// Returns `None` without copying when `path` does not exist or is a
/// symlink.
///
/// # Errors
///
/// Returns an error if the backup directory cannot be created or the copy
/// fails.
pub fn backup(path: &Path, backup_dir: &Path) -> Result<Option<PathBuf>> {
    let is_regular = path
        .symlink_metadata()
        .is_ok_and(|m| !m.file_type().is_symlink());
    if !is_regular {
        return Ok(None);
    }
    let Some(name) = path.file_name() else {
        return Ok(None);
    };

    ensure_dir(backup_dir)?;
    let stamp = chrono::Local::now().format("%Y%m%d%H%M%S");
    let dest = backup_dir.join(format!("{}.{stamp}", name.to_string_lossy()));
    std::fs::copy(path, &dest)
        .with_context(|| format!("backup {} to {}", path.display(), dest.display()))?;
    tracing::info!("backed up: {} -> {}", path.display(), dest.display());
    Ok(Some(dest))
}

/// Copy `src` to `dst`. Returns `false` when `dst` already has identical
/// content.
///
/// An existing, different `dst` is first backed up into `backup_dir` when one
/// is given. Symlinks at `dst` are replaced by a regular file.
///
/// # Errors
///
/// Returns an error if `src` does not exist or any file operation fails.
pub fn copy(src: &Path, dst: &Path, backup_dir: Option<&Path>) -> Result<bool> {
    if !src.is_file() {
        bail!("source not found: {}", src.display());
    }

    let dst_is_link = dst
        .symlink_metadata()
        .is_ok_and(|m| m.file_type().is_symlink());
    if dst_is_link {
        remove_existing(dst)?;
    } else if dst.exists() {
        if files_equal(src, dst)? {
            return Ok(false);
        }
        if let Some(dir) = backup_dir {
            backup(dst, dir)?;
        }
    }

    ensure_parent_dir(dst)?;
    std::fs::copy(src, dst)
        .with_context(|| format!("copy {} to {}", src.display(), dst.display()))?;
    Ok(true)
}

/// Point `dst` at `src`. Returns `false` when it already does.
///
/// A symlink pointing elsewhere is replaced; a regular file is backed up into
/// `backup_dir` (when given) and removed first.
///
/// # Errors
///
/// Returns an error if `src` does not exist, `dst` is a directory, or any file
/// operation fails.
pub fn symlink(src: &Path, dst: &Path, backup_dir: Option<&Path>) -> Result<bool> {
    if !src.exists() {
        bail!("source not found: {}", src.display());
    }

    match dst.symlink_metadata() {
        Ok(meta) if meta.file_type().is_symlink() => {
            if std::fs::read_link(dst).is_ok_and(|current| current == src) {
                return Ok(false);
            }
            remove_existing(dst)?;
        }
        Ok(meta) if meta.is_dir() => {
            bail!("destination is a directory: {}", dst.display());
        }
        Ok(_) => {
            if let Some(dir) = backup_dir {
                backup(dst, dir)?;
            }
            remove_existing(dst)?;
        }
        Err(_) => ensure_parent_dir(dst)?,
    }

    create_symlink(src, dst)?;
    Ok(true)
}

#[cfg(unix)]
fn create_symlink(src: &Path, dst: &Path) -> Result<()> {
    std::os::unix::fs::symlink(src, dst)
        .with_context(|| format!("create link: {} -> {}", dst.display(), src.display()))
}

#[cfg(not(unix))]
fn create_symlink(src: &Path, dst: &Path) -> Result<()> {
    bail!(
        "symlinks are not supported on this platform: {} -> {}",
        dst.display(),
        src.display()
    )
}
