//! Classification and Decision - What the classifier found and what to do about it

use serde::Serialize;
use std::path::Path;

/// Which way content flows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Working file -> mirror
    #[default]
    Backup,

    /// Mirror -> working file
    Restore,
}

impl Direction {
    /// `(from, to)` for a transfer in this direction
    pub fn endpoints<'a>(&self, source: &'a Path, mirror: &'a Path) -> (&'a Path, &'a Path) {
        match self {
            Direction::Backup => (source, mirror),
            Direction::Restore => (mirror, source),
        }
    }

    /// Verb used in progress lines ("backing up", "restoring")
    pub fn gerund(&self) -> &'static str {
        match self {
            Direction::Backup => "backing up",
            Direction::Restore => "restoring",
        }
    }

    /// Past tense used in the run summary
    pub fn past_tense(&self) -> &'static str {
        match self {
            Direction::Backup => "backed up",
            Direction::Restore => "restored",
        }
    }
}

/// Outcome of comparing a working file's mtime with its mirror's
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Classification {
    /// Mirror does not exist
    Missing,

    /// Identical modification times
    InSync,

    /// Mirror modified strictly after the working file
    MirrorNewer,

    /// Mirror modified strictly before the working file
    MirrorOlder,
}

/// Action for one regular file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Copy; `overwrite` when an existing destination gets replaced
    Copy { overwrite: bool },

    /// Nothing to do
    Skip,
}
