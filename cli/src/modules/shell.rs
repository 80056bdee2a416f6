//! Interactive shell: zsh, starship and the login shell.
use anyhow::{Result, bail};

use super::helpers::{finished, install_packages, run_installer};
use super::{Context, Module, ProcessOpts, TaskResult, process_resources};
use crate::platform::PackageManager;
use crate::resources::shell::DefaultShellResource;

/// Install zsh and starship and make zsh the login shell.
#[derive(Debug)]
pub struct Shell;

impl Module for Shell {
    fn name(&self) -> &'static str {
        "shell"
    }

    fn title(&self) -> &'static str {
        "Shell Environment"
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        install_zsh(ctx)?;
        install_starship(ctx)?;
        set_default_shell(ctx)?;
        if !ctx.dry_run {
            ctx.log.success("Shell environment configured");
        }
        Ok(finished(ctx))
    }
}

fn install_zsh(ctx: &Context) -> Result<()> {
    if ctx.executor.which("zsh") {
        ctx.log.info("zsh already installed");
        return Ok(());
    }
    let manager = ctx.platform.require_package_manager()?;
    install_packages(ctx, manager, &["zsh".to_string()], false)?;
    Ok(())
}

fn install_starship(ctx: &Context) -> Result<()> {
    if ctx.executor.which("starship") {
        ctx.log.info("starship already installed");
        return Ok(());
    }
    let manager = ctx.platform.require_package_manager()?;
    if manager == PackageManager::Brew {
        install_packages(ctx, manager, &["starship".to_string()], false)?;
    } else {
        run_installer(ctx, "starship", "starship", &["-y"])?;
    }
    Ok(())
}

/// Absolute path of `program` as resolved by the shell, if any.
fn command_path(ctx: &Context, program: &str) -> Result<Option<String>> {
    let result = ctx
        .executor
        .run_unchecked("sh", &["-c", &format!("command -v {program}")])?;
    let path = result.stdout.trim();
    Ok((result.success && !path.is_empty()).then(|| path.to_string()))
}

fn set_default_shell(ctx: &Context) -> Result<()> {
    let Some(zsh) = command_path(ctx, "zsh")? else {
        if ctx.dry_run {
            ctx.log.dry_run("would set default shell to zsh");
            return Ok(());
        }
        bail!("zsh not found in PATH");
    };

    // macOS changes the invoking user interactively; Linux goes through sudo.
    let user = ctx.platform.is_linux().then(|| ctx.user.clone());
    let resource = DefaultShellResource::new(zsh, ctx.shell.clone(), user, ctx.executor.as_ref());
    let stats = process_resources(ctx, [resource], &ProcessOpts::apply_all("set"))?;
    if stats.already_ok > 0 {
        ctx.log.info("Default shell is already zsh");
    } else if !ctx.dry_run {
        ctx.log.success("Default shell set to zsh (re-login required)");
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::modules::test_helpers::{ContextBuilder, write_conf};
    use crate::resources::test_helpers::MockExecutor;
    use std::sync::Arc;

    #[test]
    fn already_configured_does_nothing_else() {
        let executor = Arc::new(
            MockExecutor::with_responses(vec![(true, "/usr/bin/zsh\n".to_string())])
                .with_programs(&["zsh", "starship"]),
        );
        let (ctx, _tmp) = ContextBuilder::linux()
            .executor(executor.clone())
            .shell("/usr/bin/zsh")
            .build();

        assert!(matches!(Shell.run(&ctx).unwrap(), TaskResult::Ok));
        assert_eq!(executor.calls(), vec!["sh -c command -v zsh"]);
    }

    #[test]
    fn linux_installs_starship_from_script_and_changes_shell() {
        let executor = Arc::new(
            MockExecutor::with_responses(vec![
                (true, String::new()),
                (true, "/usr/bin/zsh\n".to_string()),
            ])
            .then_permissive()
            .with_programs(&["zsh"]),
        );
        let (ctx, tmp) = ContextBuilder::linux()
            .executor(executor.clone())
            .shell("/bin/bash")
            .build();
        write_conf(tmp.path(), "urls.yaml", "starship: https://starship.rs/install.sh\n");

        Shell.run(&ctx).unwrap();
        let calls = executor.calls();
        assert!(calls[0].starts_with("sh -c "));
        assert!(calls[0].ends_with(" sh -y"));
        assert_eq!(calls[1], "sh -c command -v zsh");
        assert_eq!(
            calls.last().map(String::as_str),
            Some("sudo chsh -s /usr/bin/zsh ada")
        );
    }

    #[test]
    fn macos_uses_brew_and_plain_chsh() {
        // brew list zsh, brew install zsh, brew list starship, brew install starship
        let executor = Arc::new(
            MockExecutor::with_responses(vec![
                (false, String::new()),
                (true, String::new()),
                (false, String::new()),
                (true, String::new()),
                (true, "/bin/zsh\n".to_string()),
            ])
            .then_permissive(),
        );
        let (ctx, _tmp) = ContextBuilder::macos()
            .executor(executor.clone())
            .shell("/bin/bash")
            .build();

        Shell.run(&ctx).unwrap();
        assert_eq!(
            executor.calls(),
            vec![
                "brew list zsh",
                "brew install zsh",
                "brew list starship",
                "brew install starship",
                "sh -c command -v zsh",
                "chsh -s /bin/zsh",
            ]
        );
    }

    #[test]
    fn missing_zsh_after_install_fails() {
        let executor = Arc::new(
            MockExecutor::with_responses(vec![(false, String::new())])
                .with_programs(&["zsh", "starship"]),
        );
        let (ctx, _tmp) = ContextBuilder::linux().executor(executor).build();
        let err = Shell.run(&ctx).unwrap_err();
        assert_eq!(err.to_string(), "zsh not found in PATH");
    }

    #[test]
    fn dry_run_without_zsh_only_previews() {
        // dpkg -s zsh fails, starship download is previewed, zsh not found
        let executor = Arc::new(MockExecutor::with_responses(vec![
            (false, String::new()),
            (false, String::new()),
        ]));
        let (ctx, tmp) = ContextBuilder::linux()
            .dry_run()
            .executor(executor.clone())
            .build();
        write_conf(tmp.path(), "urls.yaml", "starship: https://starship.rs/install.sh\n");

        assert!(matches!(Shell.run(&ctx).unwrap(), TaskResult::DryRun));
        assert_eq!(executor.calls(), vec!["dpkg -s zsh", "sh -c command -v zsh"]);
    }
}
