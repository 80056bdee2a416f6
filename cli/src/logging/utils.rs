//! Log file location, ANSI stripping and timestamps.
use std::path::PathBuf;

/// Drop ANSI escape sequences: CSI sequences (`ESC [ ... final`) entirely,
/// and the byte after a bare `ESC`.
pub(super) fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\x1b' {
            out.push(c);
            continue;
        }
        if chars.next() == Some('[') {
            while let Some(inner) = chars.next()
                && !('@'..='~').contains(&inner)
            {}
        }
    }
    out
}

/// Base cache directory: `$XDG_CACHE_HOME`, else `$HOME/.cache`, else
/// `./.cache`. Empty variables count as unset.
fn cache_root(var: impl Fn(&str) -> Option<String>) -> PathBuf {
    let set = |key: &str| var(key).filter(|v| !v.is_empty());
    set("XDG_CACHE_HOME").map_or_else(
        || {
            set("HOME")
                .map_or_else(|| PathBuf::from("."), PathBuf::from)
                .join(".cache")
        },
        PathBuf::from,
    )
}

/// `<cache>/hostkit/<command>.log`, creating the directory. `None` if the
/// directory cannot be created.
pub(super) fn log_file_path(command: &str) -> Option<PathBuf> {
    let dir = cache_root(|key| std::env::var(key).ok()).join("hostkit");
    std::fs::create_dir_all(&dir).ok()?;
    Some(dir.join(format!("{command}.log")))
}

/// Current UTC time formatted with `fmt` (a `chrono` format string).
pub(super) fn utc_now(fmt: &str) -> String {
    chrono::Utc::now().format(fmt).to_string()
}
