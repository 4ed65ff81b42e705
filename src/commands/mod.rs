//! Commands

pub mod run;

pub use run::{run, FailureRecord, RunSummary};
