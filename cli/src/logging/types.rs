//! Module outcomes, the run tally, and the [`Log`] trait.
use std::fmt;

/// How a module run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The module completed and the host is in the desired state.
    Ok,
    /// The module had nothing to do (tool present, no packages for this
    /// manager, ...).
    Skipped,
    /// Dry-run mode; changes were reported, not applied.
    DryRun,
    /// The module returned an error.
    Failed,
}

impl Outcome {
    /// Summary glyph and its ANSI color.
    #[must_use]
    pub const fn marker(self) -> (&'static str, &'static str) {
        match self {
            Self::Ok => ("✓", "\x1b[32m"),
            Self::Skipped => ("○", "\x1b[33m"),
            Self::DryRun => ("~", "\x1b[37m"),
            Self::Failed => ("✗", "\x1b[31m"),
        }
    }
}

/// One module's entry in the end-of-run summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleRecord {
    /// Registry name of the module.
    pub module: String,
    /// How it ended.
    pub outcome: Outcome,
    /// Skip reason or error chain.
    pub detail: Option<String>,
}

/// Outcome counts over a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    /// Modules that completed.
    pub ok: usize,
    /// Modules that had nothing to do.
    pub skipped: usize,
    /// Modules run in dry-run mode.
    pub dry_run: usize,
    /// Modules that failed.
    pub failed: usize,
}

impl Tally {
    /// Count the outcomes in `records`.
    #[must_use]
    pub fn of(records: &[ModuleRecord]) -> Self {
        records.iter().fold(Self::default(), |mut t, r| {
            match r.outcome {
                Outcome::Ok => t.ok += 1,
                Outcome::Skipped => t.skipped += 1,
                Outcome::DryRun => t.dry_run += 1,
                Outcome::Failed => t.failed += 1,
            }
            t
        })
    }

    /// Number of modules counted.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.ok + self.skipped + self.dry_run + self.failed
    }
}

impl fmt::Display for Tally {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} modules: {} ok, {} skipped, {} dry-run, {} failed",
            self.total(),
            self.ok,
            self.skipped,
            self.dry_run,
            self.failed
        )
    }
}

/// Sink for user-facing progress output.
///
/// Modules and commands write through `&dyn Log` so tests can run them
/// without installing a global subscriber.
pub trait Log: Send + Sync {
    /// Section header.
    fn stage(&self, msg: &str);
    /// Plain progress line.
    fn info(&self, msg: &str);
    /// A step that completed.
    fn success(&self, msg: &str);
    /// Detail shown only with `--verbose` (always kept in the log file).
    fn debug(&self, msg: &str);
    /// Something the user should look at.
    fn warn(&self, msg: &str);
    /// A failure.
    fn error(&self, msg: &str);
    /// An action that dry-run mode did not perform.
    fn dry_run(&self, msg: &str);
    /// Remember how a module ended, for the summary.
    fn record_module(&self, module: &str, outcome: Outcome, detail: Option<&str>);
}
