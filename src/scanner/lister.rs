//! Single-level directory listing

use crate::layout::{is_part_file, BACKUP_DIR_NAME};
use crate::types::{EntryKind, ShadowError, WorkItem};
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::ffi::OsStr;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// Compiled exclude patterns, matched against entry names
#[derive(Debug, Clone)]
pub struct ExcludeSet {
    set: GlobSet,
}

impl ExcludeSet {
    /// Compile glob patterns; an invalid pattern is a configuration error
    pub fn new(patterns: &[String]) -> Result<Self, ShadowError> {
        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            let glob = Glob::new(pattern).map_err(|e| ShadowError::InvalidPattern {
                pattern: pattern.clone(),
                message: e.to_string(),
            })?;
            builder.add(glob);
        }

        let set = builder.build().map_err(|e| ShadowError::InvalidPattern {
            pattern: patterns.join(", "),
            message: e.to_string(),
        })?;
        Ok(Self { set })
    }

    /// Match nothing
    pub fn empty() -> Self {
        Self {
            set: GlobSet::empty(),
        }
    }

    pub fn is_excluded(&self, name: &OsStr) -> bool {
        self.set.is_match(Path::new(name))
    }
}

impl Default for ExcludeSet {
    fn default() -> Self {
        Self::empty()
    }
}

/// List the entries of `directory` as work items, in listing order
///
/// Does not descend into subdirectories. The `.backup` store is always listed
/// as a non-regular entry, whatever its type. Skipped without a work item:
/// - part files left behind by an interrupted copy
/// - names matching `excludes`
///
/// # Errors
/// * `DirectoryUnreadable` - the directory cannot be opened or read
pub fn list_entries(directory: &Path, excludes: &ExcludeSet) -> Result<Vec<WorkItem>, ShadowError> {
    let unreadable = |source| ShadowError::DirectoryUnreadable {
        path: directory.to_path_buf(),
        source,
    };

    let mut items = Vec::new();
    for entry in fs::read_dir(directory).map_err(unreadable)? {
        let entry = entry.map_err(unreadable)?;
        let name = entry.file_name();

        if name.as_os_str() == OsStr::new(BACKUP_DIR_NAME) {
            items.push(WorkItem::new(directory, name, EntryKind::Other));
            continue;
        }
        if is_part_file(&name) {
            continue;
        }
        if excludes.is_excluded(&name) {
            debug!("Excluded {}", name.to_string_lossy());
            continue;
        }

        let kind = match entry.file_type() {
            Ok(file_type) => EntryKind::from_file_type(&file_type),
            Err(e) => {
                warn!(
                    "Cannot determine type of {}: {}. Treating it as a non-regular entry.",
                    entry.path().display(),
                    e
                );
                EntryKind::Other
            }
        };

        items.push(WorkItem::new(directory, name, kind));
    }

    debug!("Listed {} entries in {}", items.len(), directory.display());
    Ok(items)
}
