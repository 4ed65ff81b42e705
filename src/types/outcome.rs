//! Per-item outcomes and the run totals folded from them

use super::{Classification, ShadowError};
use serde::Serialize;

/// Whether access/modification times reached the destination
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StampStatus {
    Applied,

    /// Content was copied but the timestamps were not (reason attached)
    Failed(String),
}

impl StampStatus {
    pub fn is_applied(&self) -> bool {
        matches!(self, StampStatus::Applied)
    }
}

/// Why an entry was left alone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The classification does not call for a copy in this direction
    NotNeeded(Classification),

    /// Directories, symlinks and other special entries are never copied
    NotRegularFile,
}

/// Definitive result of one worker
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Content copied to the destination
    Transferred {
        bytes: u64,
        overwrote: bool,
        stamp: StampStatus,
    },

    /// Dry run: would have copied `bytes`
    Planned { bytes: u64, overwrite: bool },

    Skipped(SkipReason),
}

/// Totals for one run, folded by the coordinator from worker results.
///
/// Every entry lands in exactly one of `transferred`, `planned`, `skipped` or
/// `failed`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunStats {
    /// Entries enumerated and dispatched
    pub entries: usize,
    pub transferred: usize,
    pub planned: usize,
    pub skipped: usize,
    pub failed: usize,
    /// Transfers whose timestamps could not be propagated
    pub stamp_warnings: usize,
    /// Sum of bytes fully written; never decremented
    pub bytes_copied: u64,
    /// Bytes a dry run would have written
    pub bytes_planned: u64,
}

impl RunStats {
    /// Fold one worker result into the totals
    pub fn record(&mut self, result: &Result<Outcome, ShadowError>) {
        self.entries += 1;
        match result {
            Ok(Outcome::Transferred { bytes, stamp, .. }) => {
                self.transferred += 1;
                self.bytes_copied += bytes;
                if !stamp.is_applied() {
                    self.stamp_warnings += 1;
                }
            }
            Ok(Outcome::Planned { bytes, .. }) => {
                self.planned += 1;
                self.bytes_planned += bytes;
            }
            Ok(Outcome::Skipped(_)) => self.skipped += 1,
            Err(_) => self.failed += 1,
        }
    }
}
