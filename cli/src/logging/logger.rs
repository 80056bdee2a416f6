//! The run logger: forwards output to `tracing` and keeps module outcomes
//! for the closing summary.
use std::path::PathBuf;
use std::sync::Mutex;

use super::subscriber::{DRY_RUN_TARGET, STAGE_TARGET, SUCCESS_TARGET};
use super::types::{Log, ModuleRecord, Outcome, Tally};
use super::utils::log_file_path;

const RESET: &str = "\x1b[0m";

/// Console and file logger for one command invocation.
///
/// Output goes through the global `tracing` subscriber, which mirrors every
/// event (including `debug`) into `$XDG_CACHE_HOME/hostkit/<command>.log`.
#[derive(Debug)]
pub struct Logger {
    records: Mutex<Vec<ModuleRecord>>,
    log_file: Option<PathBuf>,
}

impl Logger {
    /// Logger for `command`; the summary points at its log file.
    ///
    /// The file itself is created by
    /// [`init_subscriber`](super::subscriber::init_subscriber).
    #[must_use]
    pub fn new(command: &str) -> Self {
        Self::with_log_file(log_file_path(command))
    }

    /// Logger whose summary reports `log_file`.
    #[must_use]
    pub const fn with_log_file(log_file: Option<PathBuf>) -> Self {
        Self {
            records: Mutex::new(Vec::new()),
            log_file,
        }
    }

    #[cfg(test)]
    pub const fn log_path(&self) -> Option<&PathBuf> {
        self.log_file.as_ref()
    }

    /// Snapshot of the recorded outcomes.
    #[must_use]
    pub fn records(&self) -> Vec<ModuleRecord> {
        self.records.lock().map_or_else(|_| Vec::new(), |g| g.clone())
    }

    /// Log an error.
    pub fn error(&self, msg: &str) {
        tracing::error!("{msg}");
    }

    /// Log a warning.
    pub fn warn(&self, msg: &str) {
        tracing::warn!("{msg}");
    }

    /// Log a section header.
    pub fn stage(&self, msg: &str) {
        tracing::info!(target: STAGE_TARGET, "{msg}");
    }

    /// Log a completed step.
    pub fn success(&self, msg: &str) {
        tracing::info!(target: SUCCESS_TARGET, "{msg}");
    }

    /// Log a progress line.
    pub fn info(&self, msg: &str) {
        tracing::info!("{msg}");
    }

    /// Log detail for `--verbose` and the log file.
    pub fn debug(&self, msg: &str) {
        tracing::debug!("{msg}");
    }

    /// Log an action skipped by dry-run mode.
    pub fn dry_run(&self, msg: &str) {
        tracing::info!(target: DRY_RUN_TARGET, "{msg}");
    }

    /// Remember how `module` ended.
    pub fn record_module(&self, module: &str, outcome: Outcome, detail: Option<&str>) {
        if let Ok(mut guard) = self.records.lock() {
            guard.push(ModuleRecord {
                module: module.to_string(),
                outcome,
                detail: detail.map(String::from),
            });
        }
    }

    /// Number of modules that failed so far.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        Tally::of(&self.records()).failed
    }

    /// Print one line per recorded module followed by the tally. Prints
    /// nothing when no module ran.
    #[allow(clippy::print_stdout)]
    pub fn print_summary(&self) {
        let records = self.records();
        if records.is_empty() {
            return;
        }

        println!();
        self.stage("Summary");
        for line in summary_lines(&records) {
            self.info(&line);
        }

        println!();
        let tally = Tally::of(&records);
        self.info(&format!(
            "{} modules: \x1b[32m{} ok{RESET}, \x1b[33m{} skipped{RESET}, \x1b[37m{} dry-run{RESET}, \x1b[31m{} failed{RESET}",
            tally.total(),
            tally.ok,
            tally.skipped,
            tally.dry_run,
            tally.failed
        ));
        if let Some(path) = &self.log_file {
            self.info(&format!("\x1b[2mlog: {}{RESET}", path.display()));
        }
    }
}

/// Colored `✓ name (detail)` lines, names padded to a common width.
fn summary_lines(records: &[ModuleRecord]) -> Vec<String> {
    let width = records.iter().map(|r| r.module.len()).max().unwrap_or(0);
    records
        .iter()
        .map(|r| {
            let (icon, color) = r.outcome.marker();
            let line = r.detail.as_ref().map_or_else(
                || r.module.clone(),
                |detail| format!("{:<width$}  ({detail})", r.module),
            );
            format!("{color}{icon} {line}{RESET}")
        })
        .collect()
}

impl Log for Logger {
    fn stage(&self, msg: &str) {
        Self::stage(self, msg);
    }
    fn info(&self, msg: &str) {
        Self::info(self, msg);
    }
    fn success(&self, msg: &str) {
        Self::success(self, msg);
    }
    fn debug(&self, msg: &str) {
        Self::debug(self, msg);
    }
    fn warn(&self, msg: &str) {
        Self::warn(self, msg);
    }
    fn error(&self, msg: &str) {
        Self::error(self, msg);
    }
    fn dry_run(&self, msg: &str) {
        Self::dry_run(self, msg);
    }
    fn record_module(&self, module: &str, outcome: Outcome, detail: Option<&str>) {
        Self::record_module(self, module, outcome, detail);
    }
}
