//! Entry classification by modification time

use crate::types::{Classification, ShadowError};
use filetime::FileTime;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::debug;

/// Classify a working file against its mirror
///
/// 1. **Source stat**: the working file must exist (the listing guarantees it;
///    a failure here is reported as `StatFailed` for this entry)
/// 2. **Mirror stat**: not found → `Missing`; any other failure → `StatFailed`
/// 3. **Modification time comparison** at full clock resolution, no tolerance
///
/// The result is advisory: nothing is locked, so the filesystem can change
/// right after this returns.
pub fn classify(mirror_path: &Path, source_path: &Path) -> Result<Classification, ShadowError> {
    let source_metadata = fs::metadata(source_path).map_err(|source| ShadowError::StatFailed {
        path: source_path.to_path_buf(),
        source,
    })?;

    let mirror_metadata = match fs::metadata(mirror_path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!("No mirror at {}", mirror_path.display());
            return Ok(Classification::Missing);
        }
        Err(source) => {
            return Err(ShadowError::StatFailed {
                path: mirror_path.to_path_buf(),
                source,
            })
        }
    };

    let classification = compare_mtimes(
        FileTime::from_last_modification_time(&mirror_metadata),
        FileTime::from_last_modification_time(&source_metadata),
    );
    debug!(
        "{} vs {}: {:?}",
        mirror_path.display(),
        source_path.display(),
        classification
    );
    Ok(classification)
}

/// Compare a mirror mtime with a working file mtime
pub fn compare_mtimes(mirror_mtime: FileTime, source_mtime: FileTime) -> Classification {
    match mirror_mtime.cmp(&source_mtime) {
        std::cmp::Ordering::Equal => Classification::InSync,
        std::cmp::Ordering::Greater => Classification::MirrorNewer,
        std::cmp::Ordering::Less => Classification::MirrorOlder,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use filetime::set_file_mtime;
    use std::path::PathBuf;
    use tempfile::TempDir;

    /// Returns `(dir, mirror, source)`; no mirror is written for `None`.
    fn fixture(mirror_mtime: Option<i64>, source_mtime: i64) -> (TempDir, PathBuf, PathBuf) {
        let temp_dir = TempDir::new().expect("create temp dir");
        let source = temp_dir.path().join("a.txt");
        let mirror = temp_dir.path().join("a.txt.bak");

        fs::write(&source, b"working copy").expect("write source");
        set_file_mtime(&source, FileTime::from_unix_time(source_mtime, 0))
            .expect("set source mtime");

        if let Some(mtime) = mirror_mtime {
            fs::write(&mirror, b"mirror copy").expect("write mirror");
            set_file_mtime(&mirror, FileTime::from_unix_time(mtime, 0))
                .expect("set mirror mtime");
        }

        (temp_dir, mirror, source)
    }

    #[test]
    fn test_missing_mirror() {
        let (_dir, mirror, source) = fixture(None, 1_700_000_000);
        assert_eq!(classify(&mirror, &source).expect("classify"), Classification::Missing);
    }

    #[test]
    fn test_equal_mtimes_in_sync() {
        let (_dir, mirror, source) = fixture(Some(1_700_000_000), 1_700_000_000);
        assert_eq!(classify(&mirror, &source).expect("classify"), Classification::InSync);
    }

    #[test]
    fn test_mirror_newer() {
        let (_dir, mirror, source) = fixture(Some(1_700_000_100), 1_700_000_000);
        assert_eq!(
            classify(&mirror, &source).expect("classify"),
            Classification::MirrorNewer
        );
    }

    #[test]
    fn test_mirror_older() {
        let (_dir, mirror, source) = fixture(Some(1_700_000_000), 1_700_000_100);
        assert_eq!(
            classify(&mirror, &source).expect("classify"),
            Classification::MirrorOlder
        );
    }

    #[test]
    fn test_no_tolerance_window() {
        assert_eq!(
            compare_mtimes(
                FileTime::from_unix_time(1_700_000_000, 1),
                FileTime::from_unix_time(1_700_000_000, 0)
            ),
            Classification::MirrorNewer
        );
        assert_eq!(
            compare_mtimes(
                FileTime::from_unix_time(1_700_000_000, 0),
                FileTime::from_unix_time(1_700_000_000, 1)
            ),
            Classification::MirrorOlder
        );
    }

    #[test]
    #[cfg(unix)]
    fn test_non_not_found_stat_failure_is_reported() {
        let temp_dir = TempDir::new().expect("create temp dir");
        let source = temp_dir.path().join("a.txt");
        fs::write(&source, b"data").expect("write source");
        // A regular file where the backup directory should be → ENOTDIR
        fs::write(temp_dir.path().join(".backup"), b"blocker").expect("write blocker");
        let mirror = temp_dir.path().join(".backup/a.txt.bak");

        let result = classify(&mirror, &source);
        assert!(matches!(result, Err(ShadowError::StatFailed { .. })));
    }

    #[test]
    fn test_missing_source_is_stat_failure() {
        let temp_dir = TempDir::new().expect("create temp dir");
        let source = temp_dir.path().join("vanished.txt");
        let mirror = temp_dir.path().join("vanished.txt.bak");

        let result = classify(&mirror, &source);
        assert!(matches!(result, Err(ShadowError::StatFailed { path, .. }) if path == source));
    }
}
