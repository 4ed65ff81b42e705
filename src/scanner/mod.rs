//! Directory listing logic

mod lister;

pub use lister::{list_entries, ExcludeSet};
