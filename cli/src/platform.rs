//! Operating system, distro and package manager detection.
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::OnceLock;

use crate::error::PlatformError;
use crate::exec::{Executor, SystemExecutor};

const OS_RELEASE: &str = "/etc/os-release";

/// Detected operating system platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Os {
    /// Any Linux distribution.
    Linux,
    /// macOS.
    MacOs,
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Linux => write!(f, "linux"),
            Self::MacOs => write!(f, "macos"),
        }
    }
}

/// Supported package managers.
///
/// The [`Display`](fmt::Display) form is the key used for per-manager package
/// lists in `conf/packages/*.yaml`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PackageManager {
    /// Debian family.
    Apt,
    /// Homebrew.
    Brew,
    /// Arch family.
    Pacman,
    /// Fedora / RHEL family.
    Dnf,
}

impl fmt::Display for PackageManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Apt => write!(f, "apt"),
            Self::Brew => write!(f, "brew"),
            Self::Pacman => write!(f, "pacman"),
            Self::Dnf => write!(f, "dnf"),
        }
    }
}

/// Distro `ID` values with a known package manager.
const ID_TABLE: &[(&str, PackageManager)] = &[
    ("ubuntu", PackageManager::Apt),
    ("debian", PackageManager::Apt),
    ("linuxmint", PackageManager::Apt),
    ("pop", PackageManager::Apt),
    ("arch", PackageManager::Pacman),
    ("manjaro", PackageManager::Pacman),
    ("endeavouros", PackageManager::Pacman),
    ("fedora", PackageManager::Dnf),
    ("rhel", PackageManager::Dnf),
    ("centos", PackageManager::Dnf),
    ("rocky", PackageManager::Dnf),
    ("almalinux", PackageManager::Dnf),
];

/// `ID_LIKE` tokens consulted when `ID` itself is not in [`ID_TABLE`].
const ID_LIKE_TABLE: &[(&str, PackageManager)] = &[
    ("debian", PackageManager::Apt),
    ("ubuntu", PackageManager::Apt),
    ("arch", PackageManager::Pacman),
    ("fedora", PackageManager::Dnf),
    ("rhel", PackageManager::Dnf),
];

/// Identity of the running distribution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Distro {
    /// Machine-readable id (`ubuntu`, `arch`, `macos`, `unknown`).
    pub id: String,
    /// Space-separated parent distro ids.
    pub id_like: String,
    /// Version string, possibly empty.
    pub version: String,
    /// Human-readable name.
    pub name: String,
    /// Package manager, if the distro is supported.
    pub package_manager: Option<PackageManager>,
}

impl Distro {
    /// Build a distro from the contents of an `os-release` file.
    #[must_use]
    pub fn from_os_release(content: &str) -> Self {
        let fields = parse_os_release(content);
        let get = |key: &str| fields.get(key).cloned().unwrap_or_default();

        let id = fields
            .get("ID")
            .cloned()
            .unwrap_or_else(|| "unknown".to_string());
        let id_like = get("ID_LIKE");
        let name = fields
            .get("PRETTY_NAME")
            .or_else(|| fields.get("NAME"))
            .cloned()
            .unwrap_or_else(|| id.clone());
        let package_manager = lookup_package_manager(&id, &id_like);

        Self {
            version: get("VERSION_ID"),
            id,
            id_like,
            name,
            package_manager,
        }
    }

    /// Distro reported when `/etc/os-release` is absent.
    #[must_use]
    pub fn unknown() -> Self {
        Self {
            id: "unknown".to_string(),
            id_like: String::new(),
            version: String::new(),
            name: "Unknown".to_string(),
            package_manager: None,
        }
    }

    /// macOS with the given product version.
    #[must_use]
    pub fn macos(version: &str) -> Self {
        Self {
            id: "macos".to_string(),
            id_like: "darwin".to_string(),
            version: version.to_string(),
            name: format!("macOS {version}").trim_end().to_string(),
            package_manager: Some(PackageManager::Brew),
        }
    }
}

/// Parse `KEY=VALUE` lines, stripping surrounding double quotes from values.
///
/// Lines without `=` (including blanks and comments) are ignored.
#[must_use]
pub fn parse_os_release(content: &str) -> HashMap<String, String> {
    content
        .lines()
        .filter_map(|line| line.trim().split_once('='))
        .filter(|(key, _)| !key.is_empty() && !key.starts_with('#'))
        .map(|(key, value)| {
            let value = value.trim();
            let value = value
                .strip_prefix('"')
                .and_then(|v| v.strip_suffix('"'))
                .unwrap_or(value);
            (key.to_string(), value.to_string())
        })
        .collect()
}

fn lookup_package_manager(id: &str, id_like: &str) -> Option<PackageManager> {
    let find = |table: &[(&str, PackageManager)], key: &str| {
        table
            .iter()
            .find(|(candidate, _)| *candidate == key)
            .map(|(_, pm)| *pm)
    };
    find(ID_TABLE, id).or_else(|| {
        id_like
            .split_whitespace()
            .find_map(|token| find(ID_LIKE_TABLE, token))
    })
}

/// Platform information for the current system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Platform {
    /// Operating system family.
    pub os: Os,
    /// Distribution details.
    pub distro: Distro,
}

static DETECTED: OnceLock<Platform> = OnceLock::new();

impl Platform {
    /// Detect the current platform.
    ///
    /// Detection runs once per process and logs `Detected: ...` then; later
    /// calls return the cached value silently.
    #[must_use]
    pub fn detect() -> Self {
        DETECTED
            .get_or_init(|| Self::detect_and_report(&SystemExecutor, Path::new(OS_RELEASE)))
            .clone()
    }

    fn detect_and_report(executor: &dyn Executor, os_release: &Path) -> Self {
        let platform = Self::detect_with(executor, os_release);
        tracing::info!("Detected: {}", platform.describe());
        platform
    }

    /// Detect using an explicit executor and `os-release` location.
    #[must_use]
    pub fn detect_with(executor: &dyn Executor, os_release: &Path) -> Self {
        if cfg!(target_os = "macos") {
            let version = executor
                .run("sw_vers", &["-productVersion"])
                .map(|r| r.stdout.trim().to_string())
                .unwrap_or_default();
            return Self::new(Os::MacOs, Distro::macos(&version));
        }

        let distro = std::fs::read_to_string(os_release).map_or_else(
            |_| {
                tracing::warn!("{} not found, distro unknown", os_release.display());
                Distro::unknown()
            },
            |content| Distro::from_os_release(&content),
        );
        Self::new(Os::Linux, distro)
    }

    /// Create a platform with explicit values.
    #[must_use]
    pub const fn new(os: Os, distro: Distro) -> Self {
        Self { os, distro }
    }

    /// Whether this is macOS.
    #[must_use]
    pub fn is_macos(&self) -> bool {
        self.os == Os::MacOs
    }

    /// Whether this is Linux.
    #[must_use]
    pub fn is_linux(&self) -> bool {
        self.os == Os::Linux
    }

    /// The package manager for this platform, if supported.
    #[must_use]
    pub const fn package_manager(&self) -> Option<PackageManager> {
        self.distro.package_manager
    }

    /// The package manager, or an error naming the unsupported distro.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::NoPackageManager`] when detection found none.
    pub fn require_package_manager(&self) -> Result<PackageManager, PlatformError> {
        self.package_manager()
            .ok_or_else(|| PlatformError::NoPackageManager {
                distro: self.distro.name.clone(),
            })
    }

    /// One-line description, e.g. `Ubuntu 24.04 LTS (pkg: apt)`.
    #[must_use]
    pub fn describe(&self) -> String {
        let pm = self
            .package_manager()
            .map_or_else(|| "none".to_string(), |pm| pm.to_string());
        format!("{} (pkg: {pm})", self.distro.name)
    }
}
