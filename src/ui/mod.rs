//! Terminal output

mod progress;

pub use progress::{format_outcome_lines, format_start_line, format_summary, ProgressReporter};
