//! Diff engine - Classification and direction policy

mod classify;
mod decide;

pub use classify::{classify, compare_mtimes};
pub use decide::decide;
