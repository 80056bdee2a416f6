//! The check-then-apply loop shared by modules and commands.

mod apply;

use anyhow::Result;

use super::Context;
use crate::resources::Resource;

/// What a module reports when it returns without error.
#[derive(Debug, Clone)]
pub enum TaskResult {
    /// Module completed successfully.
    Ok,
    /// Module had nothing to do (no packages configured, already installed).
    Skipped(String),
    /// Module ran in dry-run mode.
    DryRun,
}

/// Per-item counters for commands that walk many resources (dotfiles,
/// packages).
///
/// ```
/// use hostkit_cli::modules::TaskStats;
///
/// let stats = TaskStats { changed: 1, already_ok: 2, skipped: 0 };
/// assert_eq!(stats.summary(true), "1 would change, 2 already ok");
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TaskStats {
    /// Applied (or, in dry-run, pending).
    pub changed: u32,
    /// Left alone because they already matched.
    pub already_ok: u32,
    /// Invalid items that were reported and passed over.
    pub skipped: u32,
}

impl TaskStats {
    /// All zeros.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    const fn changed() -> Self {
        Self {
            changed: 1,
            already_ok: 0,
            skipped: 0,
        }
    }

    const fn already_ok() -> Self {
        Self {
            changed: 0,
            already_ok: 1,
            skipped: 0,
        }
    }

    const fn skipped() -> Self {
        Self {
            changed: 0,
            already_ok: 0,
            skipped: 1,
        }
    }

    /// `3 changed, 10 already ok`, with `, N skipped` when any were skipped.
    #[must_use]
    pub fn summary(&self, dry_run: bool) -> String {
        let verb = if dry_run { "would change" } else { "changed" };
        let mut out = format!("{} {verb}, {} already ok", self.changed, self.already_ok);
        if self.skipped > 0 {
            out.push_str(&format!(", {} skipped", self.skipped));
        }
        out
    }
}

impl std::ops::AddAssign for TaskStats {
    fn add_assign(&mut self, other: Self) {
        self.changed += other.changed;
        self.already_ok += other.already_ok;
        self.skipped += other.skipped;
    }
}

/// How [`process_resources`] describes what it does.
///
/// ```
/// use hostkit_cli::modules::ProcessOpts;
///
/// let opts = ProcessOpts::apply_all("sync");
/// assert_eq!(opts.verb, "sync");
/// ```
#[derive(Debug)]
pub struct ProcessOpts<'a> {
    /// Verb for log lines (`sync`, `link`, `set`).
    pub verb: &'a str,
}

impl<'a> ProcessOpts<'a> {
    /// Fix missing and incorrect resources; the first apply error aborts.
    #[must_use]
    pub const fn apply_all(verb: &'a str) -> Self {
        Self { verb }
    }
}

/// Check each resource and apply those that are missing or incorrect.
///
/// Invalid resources are warned about and counted as skipped. In dry-run
/// mode pending changes are logged and counted, never applied.
///
/// # Errors
///
/// Returns an error if a state check fails or a resource cannot be applied.
pub fn process_resources<R: Resource>(
    ctx: &Context,
    resources: impl IntoIterator<Item = R>,
    opts: &ProcessOpts,
) -> Result<TaskStats> {
    let mut stats = TaskStats::new();
    for resource in resources {
        let state = resource.current_state()?;
        stats += apply::process_single(ctx, &resource, state, opts)?;
    }
    Ok(stats)
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::modules::test_helpers::ContextBuilder;
    use crate::resources::{Applicable, ResourceChange, ResourceState};
    use std::cell::Cell;

    struct MockResource {
        state: ResourceState,
        apply_result: Result<ResourceChange, String>,
        applied: Cell<u32>,
    }

    impl MockResource {
        fn new(state: ResourceState) -> Self {
            Self {
                state,
                apply_result: Ok(ResourceChange::Applied),
                applied: Cell::new(0),
            }
        }

        fn failing(state: ResourceState, err: &str) -> Self {
            Self {
                apply_result: Err(err.to_string()),
                ..Self::new(state)
            }
        }
    }

    impl Applicable for MockResource {
        fn description(&self) -> String {
            "mock resource".to_string()
        }

        fn apply(&self) -> Result<ResourceChange> {
            self.applied.set(self.applied.get() + 1);
            self.apply_result
                .clone()
                .map_err(|s| anyhow::anyhow!("{s}"))
        }
    }

    impl Resource for MockResource {
        fn current_state(&self) -> Result<ResourceState> {
            Ok(self.state.clone())
        }
    }

    fn incorrect() -> ResourceState {
        ResourceState::Incorrect {
            current: "modified".to_string(),
        }
    }

    #[test]
    fn stats_summary_with_skipped() {
        let stats = TaskStats {
            changed: 1,
            already_ok: 2,
            skipped: 3,
        };
        assert_eq!(stats.summary(false), "1 changed, 2 already ok, 3 skipped");
    }

    #[test]
    fn mixed_states_are_counted() {
        let (ctx, _tmp) = ContextBuilder::linux().build();
        let resources = vec![
            MockResource::new(ResourceState::Correct),
            MockResource::new(ResourceState::Missing),
            MockResource::new(incorrect()),
            MockResource::new(ResourceState::Invalid {
                reason: "source not found".to_string(),
            }),
        ];
        let stats =
            process_resources(&ctx, resources.iter(), &ProcessOpts::apply_all("sync")).unwrap();
        assert_eq!(
            stats,
            TaskStats {
                changed: 2,
                already_ok: 1,
                skipped: 1
            }
        );
        assert_eq!(resources[0].applied.get(), 0);
        assert_eq!(resources[1].applied.get(), 1);
    }

    #[test]
    fn dry_run_never_applies() {
        let (ctx, _tmp) = ContextBuilder::linux().dry_run().build();
        let resources = vec![MockResource::new(ResourceState::Missing)];
        let stats =
            process_resources(&ctx, resources.iter(), &ProcessOpts::apply_all("sync")).unwrap();
        assert_eq!(stats.changed, 1);
        assert_eq!(resources[0].applied.get(), 0);
    }

    #[test]
    fn apply_error_names_the_resource() {
        let (ctx, _tmp) = ContextBuilder::linux().build();
        let resources = vec![
            MockResource::failing(ResourceState::Missing, "disk full"),
            MockResource::new(ResourceState::Missing),
        ];
        let err = process_resources(&ctx, resources.iter(), &ProcessOpts::apply_all("sync"))
            .unwrap_err();
        assert_eq!(err.to_string(), "failed to sync mock resource");
        assert_eq!(format!("{err:#}"), "failed to sync mock resource: disk full");
        assert_eq!(resources[1].applied.get(), 0);
    }

    #[test]
    fn already_correct_after_apply_counts_as_ok() {
        let (ctx, _tmp) = ContextBuilder::linux().build();
        let mut resource = MockResource::new(incorrect());
        resource.apply_result = Ok(ResourceChange::AlreadyCorrect);
        let stats = process_resources(&ctx, [&resource], &ProcessOpts::apply_all("link")).unwrap();
        assert_eq!(stats.already_ok, 1);
        assert_eq!(stats.changed, 0);
    }
}
