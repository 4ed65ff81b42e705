//! Core type definitions for shadowbak

mod action;
mod error;
mod item;
mod outcome;

pub use action::{Classification, Decision, Direction};
pub use error::ShadowError;
pub use item::{EntryKind, WorkItem};
pub use outcome::{Outcome, RunStats, SkipReason, StampStatus};
