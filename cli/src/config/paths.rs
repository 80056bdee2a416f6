//! Well-known per-user directories derived from `$HOME`.
use std::path::{Path, PathBuf};

/// Per-user directory layout.
///
/// XDG locations follow the defaults from the base directory specification;
/// the environment overrides are deliberately ignored so a host's layout is
/// the same in every shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paths {
    /// `$HOME`.
    pub home: PathBuf,
    /// `~/.config`.
    pub xdg_config: PathBuf,
    /// `~/.local/share`.
    pub xdg_data: PathBuf,
    /// `~/.cache`.
    pub xdg_cache: PathBuf,
    /// `~/.local`.
    pub local: PathBuf,
    /// `~/.local/bin`.
    pub local_bin: PathBuf,
    /// `~/.config/zsh`.
    pub zsh_config: PathBuf,
    /// `~/.local/share/zsh`.
    pub zsh_data: PathBuf,
    /// `~/.cache/zsh`.
    pub zsh_cache: PathBuf,
    /// `~/.local/share/zsh/plugins`.
    pub zsh_plugins: PathBuf,
    /// `~/Library/LaunchAgents`.
    pub launch_agents: PathBuf,
    /// `~/Library/Logs`.
    pub mac_logs: PathBuf,
    /// `~/.config/systemd/user`.
    pub systemd_user: PathBuf,
    /// `~/.dotfiles.backup`.
    pub backup_dir: PathBuf,
}

impl Paths {
    /// Derive every location from `home`.
    #[must_use]
    pub fn from_home(home: &Path) -> Self {
        let xdg_config = home.join(".config");
        let local = home.join(".local");
        let xdg_data = local.join("share");
        let xdg_cache = home.join(".cache");
        let zsh_data = xdg_data.join("zsh");
        Self {
            home: home.to_path_buf(),
            local_bin: local.join("bin"),
            zsh_config: xdg_config.join("zsh"),
            zsh_cache: xdg_cache.join("zsh"),
            zsh_plugins: zsh_data.join("plugins"),
            launch_agents: home.join("Library").join("LaunchAgents"),
            mac_logs: home.join("Library").join("Logs"),
            systemd_user: xdg_config.join("systemd").join("user"),
            backup_dir: home.join(".dotfiles.backup"),
            zsh_data,
            xdg_config,
            xdg_data,
            xdg_cache,
            local,
        }
    }

    /// Expand a leading `~` or `~/` against [`home`](Self::home).
    #[must_use]
    pub fn expand_tilde(&self, path: &str) -> PathBuf {
        if path == "~" {
            self.home.clone()
        } else if let Some(rest) = path.strip_prefix("~/") {
            self.home.join(rest)
        } else {
            PathBuf::from(path)
        }
    }

    /// [`expand_tilde`](Self::expand_tilde) for command-line words, which
    /// supervisors pass through verbatim.
    #[must_use]
    pub fn expand_arg(&self, arg: &str) -> String {
        self.expand_tilde(arg).display().to_string()
    }
}
