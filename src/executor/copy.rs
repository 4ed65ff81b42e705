//! Atomic file copy with timestamp propagation

use crate::hash::verify_copy;
use crate::layout::part_path;
use crate::types::{ShadowError, StampStatus};
use filetime::FileTime;
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::Path;
use tracing::debug;

/// What a finished copy did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyReport {
    /// Bytes written to the destination
    pub bytes: u64,

    /// Whether access/modification times were carried over
    pub stamp: StampStatus,
}

/// Copy `from` over `to` using the write-then-rename strategy
///
/// 1. Stream `from` into a hidden `.part` sibling of `to`
/// 2. Flush and sync to disk
/// 3. With `verify`, compare blake3 hashes of `from` and the part file
/// 4. Copy permissions, then access/modification times of `from` as they are
///    after the copy (not wall-clock now)
/// 5. Rename over `to`
///
/// A failure in any step but 4 removes the part file and leaves `to` as it
/// was. A failure to set times does not fail the copy; it is reported in
/// [`CopyReport::stamp`].
///
/// # Errors
/// * `SourceUnreadable` - `from` cannot be opened
/// * `DestinationUnwritable` - the part file cannot be created or renamed into place
/// * `TransferInterrupted` - read/write/sync failed part way
/// * `ChecksumMismatch` / `VerifyFailed` - verification rejected the part file
///
/// # Example
/// ```no_run
/// use shadowbak::executor::copy_with_times;
/// use std::path::Path;
///
/// let report = copy_with_times(Path::new("a.txt"), Path::new(".backup/a.txt.bak"), true)?;
/// println!("{} bytes", report.bytes);
/// # Ok::<(), shadowbak::types::ShadowError>(())
/// ```
pub fn copy_with_times(from: &Path, to: &Path, verify: bool) -> Result<CopyReport, ShadowError> {
    // ═══════════════════════════════════════════════════════════
    // STEP 1: Open - source first, so nothing is created for an unreadable source
    // ═══════════════════════════════════════════════════════════
    let mut src_file = File::open(from).map_err(|source| ShadowError::SourceUnreadable {
        path: from.to_path_buf(),
        source,
    })?;

    let part = part_path(to);
    let mut part_file =
        File::create(&part).map_err(|source| ShadowError::DestinationUnwritable {
            path: to.to_path_buf(),
            source,
        })?;

    // ═══════════════════════════════════════════════════════════
    // STEP 2: Copy + flush
    // ═══════════════════════════════════════════════════════════
    let bytes = match stream(&mut src_file, &mut part_file, from, to) {
        Ok(bytes) => bytes,
        Err(e) => {
            drop(part_file);
            discard_part(&part);
            return Err(e);
        }
    };

    // Drop the file handle before rename (required on Windows)
    drop(part_file);
    drop(src_file);

    let stamp = commit_part(from, &part, to, verify)?;
    Ok(CopyReport { bytes, stamp })
}

/// Steps 3-5 of [`copy_with_times`] for a fully written part file.
fn commit_part(from: &Path, part: &Path, to: &Path, verify: bool) -> Result<StampStatus, ShadowError> {
    // ═══════════════════════════════════════════════════════════
    // STEP 3: Verify - before anything can replace `to`
    // ═══════════════════════════════════════════════════════════
    if verify {
        if let Err(e) = verify_copy(from, part) {
            discard_part(part);
            return Err(match e {
                ShadowError::ChecksumMismatch { .. } => ShadowError::ChecksumMismatch {
                    path: to.to_path_buf(),
                },
                other => other,
            });
        }
    }

    // ═══════════════════════════════════════════════════════════
    // STEP 4: Metadata - permissions and times from the source
    // ═══════════════════════════════════════════════════════════
    let stamp = stamp_from(from, part);

    // ═══════════════════════════════════════════════════════════
    // STEP 5: Commit - atomic rename to final destination
    // ═══════════════════════════════════════════════════════════
    if let Err(source) = fs::rename(part, to) {
        discard_part(part);
        return Err(ShadowError::DestinationUnwritable {
            path: to.to_path_buf(),
            source,
        });
    }

    Ok(stamp)
}

/// Carry permissions and access/modification times from `from` to `to`.
///
/// Never fails the caller: problems come back as [`StampStatus::Failed`].
pub fn stamp_from(from: &Path, to: &Path) -> StampStatus {
    let metadata = match fs::metadata(from) {
        Ok(m) => m,
        Err(e) => return StampStatus::Failed(format!("cannot stat {}: {}", from.display(), e)),
    };

    if let Err(e) = fs::set_permissions(to, metadata.permissions()) {
        debug!("Could not copy permissions to {}: {}", to.display(), e);
    }

    let atime = FileTime::from_last_access_time(&metadata);
    let mtime = FileTime::from_last_modification_time(&metadata);
    match filetime::set_file_times(to, atime, mtime) {
        Ok(()) => StampStatus::Applied,
        Err(e) => StampStatus::Failed(e.to_string()),
    }
}

fn stream(src: &mut File, dest: &mut File, from: &Path, to: &Path) -> Result<u64, ShadowError> {
    let mut buffer = vec![0u8; 128 * 1024];
    let mut total_bytes = 0u64;

    loop {
        let bytes_read = match src.read(&mut buffer) {
            Ok(n) => n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(source) => {
                return Err(ShadowError::TransferInterrupted {
                    path: from.to_path_buf(),
                    offset: total_bytes,
                    source,
                })
            }
        };

        if bytes_read == 0 {
            break; // EOF
        }

        dest.write_all(&buffer[0..bytes_read])
            .map_err(|source| ShadowError::TransferInterrupted {
                path: to.to_path_buf(),
                offset: total_bytes,
                source,
            })?;
        total_bytes += bytes_read as u64;
    }

    dest.sync_all()
        .map_err(|source| ShadowError::TransferInterrupted {
            path: to.to_path_buf(),
            offset: total_bytes,
            source,
        })?;

    Ok(total_bytes)
}

fn discard_part(part: &Path) {
    if let Err(e) = fs::remove_file(part) {
        debug!("Could not remove {}: {}", part.display(), e);
    }
}
