//! # shadowbak - Shadow-directory backup and restore
//!
//! Mirrors every regular file of a directory into `<dir>/.backup/<name>.bak`
//! and restores working files from newer mirrors. Whether an entry needs a
//! copy is decided purely by comparing modification times; copies preserve
//! access and modification times so an unchanged file is never copied twice.

// Module declarations
pub mod commands;
pub mod config;
pub mod diff;
pub mod executor;
pub mod hash;
pub mod layout;
pub mod scanner;
pub mod types;
pub mod ui;

// Re-export commonly used types
pub use config::Config;
pub use types::{Classification, Direction, Outcome, RunStats, ShadowError, WorkItem};
