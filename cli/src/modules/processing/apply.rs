//! One resource: decide from its state, then report or apply.
use anyhow::{Context as _, Result};

use super::super::Context;
use super::{ProcessOpts, TaskStats};
use crate::resources::{Resource, ResourceChange, ResourceState};

/// Bring `resource` to its desired state given `state`, returning what
/// happened as a one-item [`TaskStats`].
pub(super) fn process_single<R: Resource>(
    ctx: &Context,
    resource: &R,
    state: ResourceState,
    opts: &ProcessOpts,
) -> Result<TaskStats> {
    let desc = resource.description();
    let verb = opts.verb;
    let preview = match state {
        ResourceState::Correct => {
            ctx.log.debug(&format!("ok: {desc}"));
            return Ok(TaskStats::already_ok());
        }
        ResourceState::Invalid { reason } => {
            ctx.log.warn(&format!("skipping {desc}: {reason}"));
            return Ok(TaskStats::skipped());
        }
        ResourceState::Missing => format!("would {verb}: {desc}"),
        ResourceState::Incorrect { current } => {
            format!("would {verb} {desc} (currently {current})")
        }
    };

    if ctx.dry_run {
        ctx.log.dry_run(&preview);
        return Ok(TaskStats::changed());
    }

    match resource
        .apply()
        .with_context(|| format!("failed to {verb} {desc}"))?
    {
        ResourceChange::Applied => {
            ctx.log.info(&format!("{verb}: {desc}"));
            Ok(TaskStats::changed())
        }
        ResourceChange::AlreadyCorrect => Ok(TaskStats::already_ok()),
    }
}
