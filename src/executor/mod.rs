//! Executor module: the per-entry transfer worker and the pool that runs it

pub mod copy;
pub mod pool;

use crate::diff::{classify, decide};
use crate::types::{Decision, Direction, Outcome, ShadowError, SkipReason, WorkItem};
use crate::Config;
use std::fs;
use tracing::debug;

pub use copy::{copy_with_times, stamp_from, CopyReport};
pub use pool::{ItemObserver, ItemReport, ParallelExecutor, PoolStats, TransferJob};

/// Settings every worker needs, shared read-only across the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TransferContext {
    pub direction: Direction,
    pub dry_run: bool,
    pub verify: bool,
}

impl From<&Config> for TransferContext {
    fn from(config: &Config) -> Self {
        Self {
            direction: config.direction,
            dry_run: config.dry_run,
            verify: config.verify,
        }
    }
}

/// Reconcile one entry with its mirror
///
/// Classifies `(mirror, source)`, applies the direction policy, and copies when
/// called for. `before_copy` runs right before a real copy starts, with
/// `true` when the copy replaces an existing destination. Every failure is
/// scoped to this item; the caller decides what to do with it.
pub fn transfer_one(
    item: &WorkItem,
    ctx: &TransferContext,
    before_copy: impl FnOnce(bool),
) -> Result<Outcome, ShadowError> {
    if !item.is_regular_file() {
        return Ok(Outcome::Skipped(SkipReason::NotRegularFile));
    }

    let source = item.source_path();
    let mirror = item.mirror_path();
    let classification = classify(&mirror, &source)?;

    let overwrite = match decide(classification, ctx.direction) {
        Decision::Skip => {
            return Ok(Outcome::Skipped(SkipReason::NotNeeded(classification)));
        }
        Decision::Copy { overwrite } => overwrite,
    };

    let (from, to) = ctx.direction.endpoints(&source, &mirror);
    debug!(
        "{:?} {} -> {} ({:?})",
        ctx.direction,
        from.display(),
        to.display(),
        classification
    );

    if ctx.dry_run {
        let bytes = fs::metadata(from)
            .map_err(|source| ShadowError::StatFailed {
                path: from.to_path_buf(),
                source,
            })?
            .len();
        return Ok(Outcome::Planned { bytes, overwrite });
    }

    before_copy(overwrite);
    let report = copy_with_times(from, to, ctx.verify)?;

    Ok(Outcome::Transferred {
        bytes: report.bytes,
        overwrote: overwrite,
        stamp: report.stamp,
    })
}
