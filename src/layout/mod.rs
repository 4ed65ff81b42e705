//! Backup store layout
//!
//! Mirrors live at `<directory>/.backup/<name>.bak`. Backup and restore both
//! derive the mirror path from these helpers and nothing else records the
//! mapping, so the convention must not change.

use crate::types::ShadowError;
use std::ffi::{OsStr, OsString};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::info;

/// Name of the shadow directory inside the working directory
pub const BACKUP_DIR_NAME: &str = ".backup";

/// Suffix appended to a working file name to form its mirror name
pub const MIRROR_SUFFIX: &str = ".bak";

/// Suffix of the hidden file a copy is staged in before it replaces the destination
pub const PART_SUFFIX: &str = ".shadowbak-part";

/// `<directory>/.backup`
pub fn backup_dir(directory: &Path) -> PathBuf {
    directory.join(BACKUP_DIR_NAME)
}

/// `<directory>/<name>`
pub fn source_path(directory: &Path, name: &OsStr) -> PathBuf {
    directory.join(name)
}

/// `<name>.bak`
pub fn mirror_file_name(name: &OsStr) -> OsString {
    let mut mirror = name.to_os_string();
    mirror.push(MIRROR_SUFFIX);
    mirror
}

/// `<directory>/.backup/<name>.bak`
pub fn mirror_path(directory: &Path, name: &OsStr) -> PathBuf {
    backup_dir(directory).join(mirror_file_name(name))
}

/// Staging path for a copy into `dest`: `.<file name>.shadowbak-part` next to it
pub fn part_path(dest: &Path) -> PathBuf {
    let mut part = OsString::from(".");
    if let Some(name) = dest.file_name() {
        part.push(name);
    }
    part.push(PART_SUFFIX);
    dest.with_file_name(part)
}

/// Whether a listed name is a staging file left behind by an interrupted copy
pub fn is_part_file(name: &OsStr) -> bool {
    let name = name.to_string_lossy();
    name.starts_with('.') && name.ends_with(PART_SUFFIX)
}

/// Make sure `<directory>/.backup` exists and is a directory.
///
/// Creates it with default permissions when absent. Anything other than a
/// directory already at that path is fatal.
pub fn ensure_backup_dir(directory: &Path) -> Result<PathBuf, ShadowError> {
    let path = backup_dir(directory);

    match fs::metadata(&path) {
        Ok(metadata) if metadata.is_dir() => Ok(path),
        Ok(_) => Err(ShadowError::BackupDirNotDirectory { path }),
        Err(e) if e.kind() == ErrorKind::NotFound => match fs::create_dir(&path) {
            Ok(()) => {
                info!("Created backup directory {}", path.display());
                Ok(path)
            }
            // Lost a race with another process creating it
            Err(e) if e.kind() == ErrorKind::AlreadyExists && path.is_dir() => Ok(path),
            Err(source) => Err(ShadowError::BackupDirCreate { path, source }),
        },
        Err(source) => Err(ShadowError::BackupDirCreate { path, source }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_mirror_path_convention() {
        let path = mirror_path(Path::new("/home/user/docs"), OsStr::new("report.pdf"));
        assert_eq!(path, PathBuf::from("/home/user/docs/.backup/report.pdf.bak"));
    }

    #[test]
    fn test_mirror_name_keeps_existing_extension() {
        assert_eq!(
            mirror_file_name(OsStr::new("archive.tar.gz")),
            OsString::from("archive.tar.gz.bak")
        );
        assert_eq!(
            mirror_file_name(OsStr::new("Makefile")),
            OsString::from("Makefile.bak")
        );
    }

    #[test]
    fn test_part_path_is_hidden_sibling() {
        let part = part_path(Path::new("/w/.backup/a.txt.bak"));
        assert_eq!(part, PathBuf::from("/w/.backup/.a.txt.bak.shadowbak-part"));
        assert!(is_part_file(part.file_name().expect("file name")));
        assert!(!is_part_file(OsStr::new("a.txt")));
        assert!(!is_part_file(OsStr::new("visible.shadowbak-part")));
    }

    #[test]
    fn test_ensure_backup_dir_creates_once() {
        let temp_dir = TempDir::new().expect("create temp dir");

        let created = ensure_backup_dir(temp_dir.path()).expect("create backup dir");
        assert!(created.is_dir());
        assert_eq!(created, temp_dir.path().join(".backup"));

        // Second call is a no-op
        let again = ensure_backup_dir(temp_dir.path()).expect("reuse backup dir");
        assert_eq!(again, created);
    }

    #[test]
    fn test_ensure_backup_dir_rejects_regular_file() {
        let temp_dir = TempDir::new().expect("create temp dir");
        fs::write(temp_dir.path().join(".backup"), b"not a dir").expect("write blocker");

        let result = ensure_backup_dir(temp_dir.path());
        assert!(matches!(
            result,
            Err(ShadowError::BackupDirNotDirectory { .. })
        ));
    }

    #[test]
    fn test_ensure_backup_dir_missing_parent_fails() {
        let temp_dir = TempDir::new().expect("create temp dir");
        let missing = temp_dir.path().join("does-not-exist");

        let result = ensure_backup_dir(&missing);
        assert!(matches!(result, Err(ShadowError::BackupDirCreate { .. })));
    }
}
