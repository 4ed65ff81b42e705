//! Progress reporting

use crate::executor::{ItemObserver, ItemReport};
use crate::types::{Direction, Outcome, RunStats, SkipReason, StampStatus, WorkItem};
use indicatif::{HumanBytes, ProgressBar, ProgressStyle};

/// Progress reporter for a backup/restore run
///
/// Per-entry lines go to stdout, per-entry errors to stderr. Both are printed
/// through the bar's `suspend` so the bar (on stderr) is redrawn cleanly.
pub struct ProgressReporter {
    bar: ProgressBar,
    direction: Direction,
    quiet: bool,
}

impl ProgressReporter {
    /// Create a reporter for `total` entries. `quiet` hides both bar and lines.
    pub fn new(total: u64, direction: Direction, quiet: bool) -> Self {
        let bar = if quiet {
            ProgressBar::hidden()
        } else {
            ProgressBar::new(total)
        };
        if let Ok(style) =
            ProgressStyle::with_template("{bar:30.cyan/blue} {pos}/{len} entries | {msg}")
        {
            bar.set_style(style.progress_chars("=>-"));
        }

        Self {
            bar,
            direction,
            quiet,
        }
    }

    /// Finalize and print the summary line.
    pub fn finish(&self, stats: &RunStats) {
        self.bar.finish_and_clear();
        self.print_out(&format_summary(stats, self.direction));
    }

    fn print_out(&self, line: &str) {
        if !self.quiet {
            self.bar.suspend(|| println!("{}", line));
        }
    }

    fn print_err(&self, line: &str) {
        if !self.quiet {
            self.bar.suspend(|| eprintln!("{}", line));
        }
    }
}

impl ItemObserver for ProgressReporter {
    fn copy_starting(&self, worker: usize, item: &WorkItem, overwrite: bool) {
        self.print_out(&format_start_line(worker, item, overwrite, self.direction));
    }

    fn item_finished(&self, report: &ItemReport) {
        match &report.result {
            Ok(outcome) => {
                for line in format_outcome_lines(report.worker, &report.item, outcome, self.direction) {
                    self.print_out(&line);
                }
                if let Outcome::Transferred { bytes, .. } = outcome {
                    self.bar.set_message(format!("{} copied", HumanBytes(*bytes)));
                }
            }
            Err(error) => {
                self.print_err(&format!(
                    "{} ERROR {}: {}",
                    worker_tag(report.worker),
                    report.item.display_name(),
                    error
                ));
            }
        }
        self.bar.inc(1);
    }
}

fn worker_tag(worker: usize) -> String {
    format!("[worker {}]", worker)
}

/// `(from, to)` display names for `item` in `direction`
fn endpoint_names(item: &WorkItem, direction: Direction) -> (String, String) {
    let name = item.display_name();
    let mirror_name = item.mirror_name().to_string_lossy().into_owned();
    match direction {
        Direction::Backup => (name, mirror_name),
        Direction::Restore => (mirror_name, name),
    }
}

/// Line announcing a copy that is about to start
pub fn format_start_line(
    worker: usize,
    item: &WorkItem,
    overwrite: bool,
    direction: Direction,
) -> String {
    let tag = worker_tag(worker);
    if overwrite {
        let (_, to_name) = endpoint_names(item, direction);
        format!("{} WARNING: Overwriting {}", tag, to_name)
    } else {
        format!("{} Backing up {}", tag, item.display_name())
    }
}

/// Progress lines for one successful outcome
pub fn format_outcome_lines(
    worker: usize,
    item: &WorkItem,
    outcome: &Outcome,
    direction: Direction,
) -> Vec<String> {
    let tag = worker_tag(worker);
    let name = item.display_name();
    let (from_name, to_name) = endpoint_names(item, direction);

    match outcome {
        Outcome::Skipped(SkipReason::NotNeeded(_)) => {
            vec![format!("{} {} does not need {}", tag, name, direction.gerund())]
        }
        Outcome::Skipped(SkipReason::NotRegularFile) => {
            vec![format!("{} {} is not a regular file, skipping", tag, name)]
        }
        Outcome::Planned { bytes, overwrite } => {
            let verb = match (overwrite, direction) {
                (true, _) => "overwrite",
                (false, Direction::Backup) => "back up",
                (false, Direction::Restore) => "restore",
            };
            vec![format!("{} Would {} {} ({} bytes)", tag, verb, name, bytes)]
        }
        Outcome::Transferred { bytes, stamp, .. } => {
            let mut lines = Vec::with_capacity(2);
            lines.push(format!(
                "{} Copied {} bytes from {} to {}",
                tag, bytes, from_name, to_name
            ));
            if let StampStatus::Failed(reason) = stamp {
                lines.push(format!(
                    "{} WARNING: could not copy timestamps to {}: {}",
                    tag, to_name, reason
                ));
            }
            lines
        }
    }
}

/// Final summary line
pub fn format_summary(stats: &RunStats, direction: Direction) -> String {
    let mut summary = format!(
        "Successfully {} {} files ({} bytes, {}) | {} entries: {} skipped, {} failed, {} timestamp warnings",
        direction.past_tense(),
        stats.transferred,
        stats.bytes_copied,
        HumanBytes(stats.bytes_copied),
        stats.entries,
        stats.skipped,
        stats.failed,
        stats.stamp_warnings
    );
    if stats.planned > 0 {
        summary.push_str(&format!(
            " | dry run: {} files ({} bytes) would be copied",
            stats.planned, stats.bytes_planned
        ));
    }
    summary
}
