use std::sync::Arc;

use anyhow::Result;

use super::CommandSetup;
use crate::cli::{DotfilesAction, DotfilesOpts, GlobalOpts};
use crate::dotfiles::{self, DotfileMapping, DotfileStatus};
use crate::logging::{Log, Logger};
use crate::modules::{Context, ProcessOpts, TaskStats, process_resources};

const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const RESET: &str = "\x1b[0m";

/// Run the dotfiles command.
///
/// # Errors
///
/// Returns an error if the repository cannot be located or a dotfile
/// cannot be read, compared or written.
pub fn run(global: &GlobalOpts, opts: &DotfilesOpts, log: &Arc<Logger>) -> Result<()> {
    let setup = CommandSetup::init(global, log)?;
    let ctx = setup.context(global, Arc::clone(log) as Arc<dyn Log>);

    match opts.action {
        DotfilesAction::Status => status(&ctx).map(|_| ()),
        DotfilesAction::Diff => diff(&ctx).map(|_| ()),
        DotfilesAction::Sync { force, link } => sync(&ctx, force, link).map(|_| ()),
    }
}

fn mappings(ctx: &Context) -> Result<Vec<DotfileMapping>> {
    let found = dotfiles::mappings(&ctx.config.dotfiles_dir(), ctx.paths())?;
    ctx.log
        .debug(&format!("{} tracked dotfile(s)", found.len()));
    Ok(found)
}

/// Print missing, modified and up-to-date sections; returns the number of
/// destinations that would change.
///
/// # Errors
///
/// Returns an error if a mapping cannot be classified.
pub fn status(ctx: &Context) -> Result<usize> {
    let mut missing = Vec::new();
    let mut modified = Vec::new();
    let mut up_to_date = Vec::new();

    for mapping in mappings(ctx)? {
        match dotfiles::status(&mapping)? {
            DotfileStatus::Missing => missing.push(mapping),
            DotfileStatus::UpToDate => up_to_date.push(mapping),
            DotfileStatus::Invalid(reason) => {
                ctx.log
                    .warn(&format!("{}: {reason}", mapping.source.display()));
            }
            other @ (DotfileStatus::Symlink | DotfileStatus::Modified) => {
                modified.push((mapping, other));
            }
        }
    }

    if !missing.is_empty() {
        ctx.log.stage("Missing (will be created)");
        for m in &missing {
            ctx.log
                .info(&format!("{YELLOW}+{RESET} {}", m.target.display()));
        }
    }
    if !modified.is_empty() {
        ctx.log.stage("Modified (will be updated)");
        for (m, state) in &modified {
            ctx.log.info(&format!(
                "{RED}~{RESET} {} ({})",
                m.target.display(),
                state.reason()
            ));
        }
    }
    if !up_to_date.is_empty() {
        ctx.log.stage("Up to date");
        for m in &up_to_date {
            ctx.log
                .info(&format!("{GREEN}✓{RESET} {}", m.target.display()));
        }
    }

    let pending = missing.len() + modified.len();
    if pending == 0 {
        ctx.log.success("All dotfiles are up to date");
    }
    Ok(pending)
}

/// Print a colored diff for every deployed dotfile that differs from its
/// source; returns whether any differed.
///
/// # Errors
///
/// Returns an error if a file cannot be read.
pub fn diff(ctx: &Context) -> Result<bool> {
    let mut has_diff = false;

    for mapping in mappings(ctx)? {
        let dst = mapping.target.display();
        match dotfiles::status(&mapping)? {
            DotfileStatus::Symlink => {
                has_diff = true;
                let target = std::fs::read_link(&mapping.target)?;
                ctx.log.info(&format!(
                    "{YELLOW}{dst}{RESET}: is a symlink -> {}",
                    target.display()
                ));
            }
            DotfileStatus::Modified => {
                has_diff = true;
                match dotfiles::file_diff(&mapping.source, &mapping.target)? {
                    None => {
                        ctx.log
                            .info(&format!("{BOLD}{dst}{RESET}: {DIM}binary file differs{RESET}"));
                    }
                    Some(lines) => {
                        ctx.log.info(&format!("{BOLD}{dst}{RESET}:"));
                        for line in &lines {
                            ctx.log.info(&colorize(line));
                        }
                    }
                }
            }
            DotfileStatus::Missing | DotfileStatus::UpToDate | DotfileStatus::Invalid(_) => {}
        }
    }

    if !has_diff {
        ctx.log.success("No differences found");
    }
    Ok(has_diff)
}

fn colorize(line: &str) -> String {
    if line.starts_with('+') && !line.starts_with("+++") {
        format!("{GREEN}{line}{RESET}")
    } else if line.starts_with('-') && !line.starts_with("---") {
        format!("{RED}{line}{RESET}")
    } else {
        line.to_string()
    }
}

/// Bring every deployed dotfile up to date.
///
/// Replaced files are backed up unless `force` is set; `link` deploys
/// symlinks to the source instead of copies.
///
/// # Errors
///
/// Returns an error if a file cannot be copied, linked or backed up.
pub fn sync(ctx: &Context, force: bool, link: bool) -> Result<TaskStats> {
    let found = mappings(ctx)?;
    let backup_dir = (!force).then_some(ctx.paths().backup_dir.as_path());
    let resources = dotfiles::sync_resources(&found, link, backup_dir);
    let verb = if link { "link" } else { "sync" };
    let stats = process_resources(ctx, resources, &ProcessOpts::apply_all(verb))?;

    if stats.changed == 0 {
        ctx.log.success("All dotfiles already up to date");
    } else if ctx.dry_run {
        ctx.log.info(&stats.summary(true));
    } else {
        ctx.log
            .success(&format!("Synced {} file(s)", stats.changed));
    }
    Ok(stats)
}
