//! WorkItem - One directory entry to reconcile

use crate::layout;
use std::ffi::OsString;
use std::fs::FileType;
use std::path::PathBuf;

/// Kind of a listed entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// Regular file, eligible for transfer
    RegularFile,

    /// Directory, symlink, fifo, socket, device...
    Other,
}

impl EntryKind {
    /// Classify by the type the listing reported (symlinks are not followed)
    pub fn from_file_type(file_type: &FileType) -> Self {
        if file_type.is_file() {
            EntryKind::RegularFile
        } else {
            EntryKind::Other
        }
    }
}

/// One filesystem entry to reconcile against its mirror.
///
/// Source and mirror paths are always derived through [`crate::layout`], never
/// stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    /// Base file name, no separators
    pub name: OsString,

    /// Absolute path of the containing directory
    pub directory: PathBuf,

    pub kind: EntryKind,
}

impl WorkItem {
    /// Create a new WorkItem
    pub fn new(directory: impl Into<PathBuf>, name: impl Into<OsString>, kind: EntryKind) -> Self {
        Self {
            name: name.into(),
            directory: directory.into(),
            kind,
        }
    }

    /// `directory/name`
    pub fn source_path(&self) -> PathBuf {
        layout::source_path(&self.directory, &self.name)
    }

    /// `directory/.backup/name.bak`
    pub fn mirror_path(&self) -> PathBuf {
        layout::mirror_path(&self.directory, &self.name)
    }

    /// `name.bak`
    pub fn mirror_name(&self) -> OsString {
        layout::mirror_file_name(&self.name)
    }

    /// Name for display purposes (lossy on non-UTF-8 names)
    pub fn display_name(&self) -> String {
        self.name.to_string_lossy().into_owned()
    }

    pub fn is_regular_file(&self) -> bool {
        self.kind == EntryKind::RegularFile
    }
}
