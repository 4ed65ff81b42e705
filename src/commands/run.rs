//! Backup/restore run: enumerate, dispatch, fold, report

use crate::executor::{ItemObserver, ParallelExecutor, TransferContext, TransferJob};
use crate::layout;
use crate::scanner::{list_entries, ExcludeSet};
use crate::types::{Direction, RunStats, ShadowError};
use crate::ui::ProgressReporter;
use crate::Config;
use chrono::{DateTime, Local};
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

/// Result of one completed run
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub direction: Direction,
    pub directory: PathBuf,
    pub started_at: DateTime<Local>,
    pub stats: RunStats,
    pub failures: Vec<FailureRecord>,
}

/// A per-entry failure, in plain English
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailureRecord {
    pub kind: &'static str,
    pub path: PathBuf,
    pub message: String,
    pub suggestion: Option<String>,
}

impl FailureRecord {
    fn new(path: PathBuf, error: &ShadowError) -> Self {
        let (message, suggestion) = humanize_error(error);
        Self {
            kind: error_kind_label(error),
            path,
            message,
            suggestion,
        }
    }
}

/// Run backup or restore over every entry of `config.directory`
///
/// `config` is validated first. Backup mode creates `.backup` (unless
/// dry-running). Entries are dispatched to a pool of `config.jobs` workers;
/// their results are folded here once all of them are joined. Per-entry
/// failures are collected and reported; environment failures abort the run.
pub fn run(config: &Config) -> Result<RunSummary, ShadowError> {
    config.validate()?;
    let started_at = Local::now();

    match config.direction {
        Direction::Backup if !config.dry_run => {
            layout::ensure_backup_dir(&config.directory)?;
        }
        Direction::Restore if !layout::backup_dir(&config.directory).is_dir() => {
            warn!(
                "No backup directory in {}; nothing can be restored",
                config.directory.display()
            );
        }
        _ => {}
    }

    let excludes = ExcludeSet::new(&config.exclude_patterns)?;
    let items = list_entries(&config.directory, &excludes)?;
    info!(
        "{:?} of {} entries in {} with {} worker(s)",
        config.direction,
        items.len(),
        config.directory.display(),
        config.jobs
    );

    let reporter = Arc::new(ProgressReporter::new(
        items.len() as u64,
        config.direction,
        config.json,
    ));
    let observer: Arc<dyn ItemObserver> = Arc::clone(&reporter) as Arc<dyn ItemObserver>;

    let pool = ParallelExecutor::new(
        config.jobs,
        config.jobs.saturating_mul(2),
        TransferContext::from(config),
        Some(observer),
    )?;
    for (index, item) in items.into_iter().enumerate() {
        pool.enqueue(TransferJob { index, item })?;
    }
    let (reports, pool_stats) = pool.close_and_wait()?;
    info!(
        "Pool finished: {} dispatched, {} completed",
        pool_stats.dispatched, pool_stats.completed
    );

    let mut stats = RunStats::default();
    let mut failures = Vec::new();
    for report in reports {
        stats.record(&report.result);
        if let Err(error) = report.result {
            if error.is_fatal() {
                return Err(error);
            }
            failures.push(FailureRecord::new(report.item.source_path(), &error));
        }
    }

    reporter.finish(&stats);
    if !failures.is_empty() && !config.json {
        eprintln!("{}", format_error_summary(&failures));
    }

    Ok(RunSummary {
        direction: config.direction,
        directory: config.directory.clone(),
        started_at,
        stats,
        failures,
    })
}

fn humanize_error(error: &ShadowError) -> (String, Option<String>) {
    match error {
        ShadowError::StatFailed { .. } => (
            "Could not read file metadata".to_string(),
            Some("Check that the file and its .backup mirror are accessible.".to_string()),
        ),
        ShadowError::SourceUnreadable { .. } if error.io_kind() == Some(ErrorKind::PermissionDenied) => (
            "Permission denied while reading file".to_string(),
            Some("Check file permissions or run with a user that has access.".to_string()),
        ),
        ShadowError::SourceUnreadable { .. } => (
            "File to copy could not be opened".to_string(),
            Some("Verify the file still exists and retry.".to_string()),
        ),
        ShadowError::DestinationUnwritable { .. } if error.io_kind() == Some(ErrorKind::NotFound) => (
            "Destination directory does not exist".to_string(),
            Some("Run a backup first so the .backup directory is created.".to_string()),
        ),
        ShadowError::DestinationUnwritable { .. } => (
            "Destination file could not be created".to_string(),
            Some("Check permissions and free space on the destination.".to_string()),
        ),
        ShadowError::TransferInterrupted { .. } => (
            "File transfer was interrupted before completion".to_string(),
            Some("Retry the run and check disk stability.".to_string()),
        ),
        ShadowError::ChecksumMismatch { .. } => (
            "Copied content does not match the original".to_string(),
            Some("Retry the run and inspect disk health.".to_string()),
        ),
        ShadowError::VerifyFailed { .. } => (
            "File could not be re-read for verification".to_string(),
            Some("Retry the run without --verify to isolate the problem.".to_string()),
        ),
        other => (other.to_string(), None),
    }
}

fn error_kind_label(error: &ShadowError) -> &'static str {
    match error {
        ShadowError::StatFailed { .. } => "Stat failed",
        ShadowError::SourceUnreadable { .. } => "Source unreadable",
        ShadowError::DestinationUnwritable { .. } => "Destination unwritable",
        ShadowError::TransferInterrupted { .. } => "Transfer interrupted",
        ShadowError::ChecksumMismatch { .. } | ShadowError::VerifyFailed { .. } => {
            "Verification failed"
        }
        _ => "Error",
    }
}

fn format_error_summary(records: &[FailureRecord]) -> String {
    let mut groups: BTreeMap<&'static str, Vec<&FailureRecord>> = BTreeMap::new();
    for record in records {
        groups.entry(record.kind).or_default().push(record);
    }

    let mut lines = Vec::new();
    lines.push("Error summary:".to_string());
    for (kind, items) in groups {
        lines.push(format!("  {} ({}):", kind, items.len()));
        for record in items.iter().take(3) {
            lines.push(format!("    - {}", record.message));
            lines.push(format!("      Path: {}", record.path.display()));
            if let Some(suggestion) = &record.suggestion {
                lines.push(format!("      Try: {}", suggestion));
            }
        }
        if items.len() > 3 {
            lines.push(format!("    - ... {} more", items.len() - 3));
        }
    }
    lines.join("\n")
}
