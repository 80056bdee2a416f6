//! Package installation resource.
use anyhow::Result;

use super::{Applicable, Resource, ResourceChange, ResourceState};
use crate::exec::Executor;
use crate::platform::PackageManager;

/// A system package that can be checked and installed.
pub struct PackageResource<'a> {
    /// Package name.
    pub name: String,
    /// Package manager to use.
    pub manager: PackageManager,
    executor: &'a dyn Executor,
}

impl std::fmt::Debug for PackageResource<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PackageResource")
            .field("name", &self.name)
            .field("manager", &self.manager)
            .finish_non_exhaustive()
    }
}

impl<'a> PackageResource<'a> {
    /// Create a new package resource.
    #[must_use]
    pub const fn new(name: String, manager: PackageManager, executor: &'a dyn Executor) -> Self {
        Self {
            name,
            manager,
            executor,
        }
    }
}

/// Command that refreshes the package index.
#[must_use]
pub const fn update_command(manager: PackageManager) -> (&'static str, &'static [&'static str]) {
    match manager {
        PackageManager::Apt => ("sudo", &["apt", "update"]),
        PackageManager::Brew => ("brew", &["update"]),
        PackageManager::Pacman => ("sudo", &["pacman", "-Sy"]),
        PackageManager::Dnf => ("sudo", &["dnf", "makecache"]),
    }
}

/// Command prefix that installs packages; names are appended.
#[must_use]
pub const fn install_command(manager: PackageManager) -> (&'static str, &'static [&'static str]) {
    match manager {
        PackageManager::Apt => ("sudo", &["apt", "install", "-y"]),
        PackageManager::Brew => ("brew", &["install"]),
        PackageManager::Pacman => ("sudo", &["pacman", "-S", "--needed", "--noconfirm"]),
        PackageManager::Dnf => ("sudo", &["dnf", "install", "-y"]),
    }
}

/// Command that exits zero when `name` is installed.
fn query_command(manager: PackageManager) -> (&'static str, &'static [&'static str]) {
    match manager {
        PackageManager::Apt => ("dpkg", &["-s"]),
        PackageManager::Brew => ("brew", &["list"]),
        PackageManager::Pacman => ("pacman", &["-Q"]),
        PackageManager::Dnf => ("rpm", &["-q"]),
    }
}

/// Refresh the package index.
///
/// # Errors
///
/// Returns an error if the update command fails.
pub fn update_index(manager: PackageManager, executor: &dyn Executor) -> Result<()> {
    let (program, args) = update_command(manager);
    executor.run(program, args)?;
    Ok(())
}

/// Install every resource in a single package manager invocation.
///
/// All resources must share one manager; the first resource's manager and
/// executor are used. An empty slice is a no-op.
///
/// # Errors
///
/// Returns an error if the install command fails.
pub fn batch_install(resources: &[&PackageResource<'_>]) -> Result<()> {
    let Some(first) = resources.first() else {
        return Ok(());
    };
    let (program, prefix) = install_command(first.manager);
    let mut args: Vec<&str> = prefix.to_vec();
    args.extend(resources.iter().map(|r| r.name.as_str()));
    first.executor.run(program, &args)?;
    Ok(())
}

impl Applicable for PackageResource<'_> {
    fn description(&self) -> String {
        format!("{} ({})", self.name, self.manager)
    }

    fn apply(&self) -> Result<ResourceChange> {
        let (program, prefix) = install_command(self.manager);
        let mut args: Vec<&str> = prefix.to_vec();
        args.push(&self.name);
        self.executor.run(program, &args)?;
        Ok(ResourceChange::Applied)
    }
}

impl Resource for PackageResource<'_> {
    fn current_state(&self) -> Result<ResourceState> {
        let (program, prefix) = query_command(self.manager);
        let mut args: Vec<&str> = prefix.to_vec();
        args.push(&self.name);
        let result = self.executor.run_unchecked(program, &args)?;
        if result.success {
            Ok(ResourceState::Correct)
        } else {
            Ok(ResourceState::Missing)
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::resources::test_helpers::MockExecutor;

    #[test]
    fn description_includes_manager() {
        let executor = MockExecutor::permissive();
        let pkg = PackageResource::new("git".to_string(), PackageManager::Apt, &executor);
        assert_eq!(pkg.description(), "git (apt)");
    }

    #[test]
    fn installed_package_is_correct() {
        let executor = MockExecutor::ok("");
        let pkg = PackageResource::new("git".to_string(), PackageManager::Brew, &executor);
        assert_eq!(pkg.current_state().unwrap(), ResourceState::Correct);
        assert_eq!(executor.calls(), vec!["brew list git"]);
    }

    #[test]
    fn missing_package_is_missing() {
        let executor = MockExecutor::fail();
        let pkg = PackageResource::new("htop".to_string(), PackageManager::Apt, &executor);
        assert_eq!(pkg.current_state().unwrap(), ResourceState::Missing);
        assert_eq!(executor.calls(), vec!["dpkg -s htop"]);
    }

    #[test]
    fn apply_installs_single_package() {
        let executor = MockExecutor::permissive();
        let pkg = PackageResource::new("tree".to_string(), PackageManager::Dnf, &executor);
        assert_eq!(pkg.apply().unwrap(), ResourceChange::Applied);
        assert_eq!(executor.calls(), vec!["sudo dnf install -y tree"]);
    }

    #[test]
    fn batch_install_runs_one_command() {
        let executor = MockExecutor::permissive();
        let a = PackageResource::new("curl".to_string(), PackageManager::Pacman, &executor);
        let b = PackageResource::new("wget".to_string(), PackageManager::Pacman, &executor);
        batch_install(&[&a, &b]).unwrap();
        assert_eq!(
            executor.calls(),
            vec!["sudo pacman -S --needed --noconfirm curl wget"]
        );
    }

    #[test]
    fn batch_install_empty_is_noop() {
        batch_install(&[]).unwrap();
    }

    #[test]
    fn update_commands() {
        let executor = MockExecutor::permissive();
        for pm in [
            PackageManager::Apt,
            PackageManager::Brew,
            PackageManager::Pacman,
            PackageManager::Dnf,
        ] {
            update_index(pm, &executor).unwrap();
        }
        assert_eq!(
            executor.calls(),
            vec![
                "sudo apt update",
                "brew update",
                "sudo pacman -Sy",
                "sudo dnf makecache"
            ]
        );
    }

    #[test]
    fn failed_install_propagates() {
        let executor = MockExecutor::fail();
        let pkg = PackageResource::new("nope".to_string(), PackageManager::Apt, &executor);
        assert!(pkg.apply().is_err());
    }
}
