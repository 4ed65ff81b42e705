//! Hashing utilities

use crate::types::ShadowError;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// Compute Blake3 hash of a file
///
/// The file is streamed in 64KB chunks.
///
/// # Example
/// ```no_run
/// use shadowbak::hash::compute_hash;
/// use std::path::Path;
///
/// let hash = compute_hash(Path::new("file.txt"))?;
/// # Ok::<(), std::io::Error>(())
/// ```
pub fn compute_hash(file_path: &Path) -> io::Result<[u8; 32]> {
    let mut file = File::open(file_path)?;
    let mut hasher = blake3::Hasher::new();
    let mut buffer = vec![0u8; 64 * 1024];

    loop {
        let bytes_read = file.read(&mut buffer)?;

        if bytes_read == 0 {
            break; // EOF
        }

        hasher.update(&buffer[0..bytes_read]);
    }

    Ok(*hasher.finalize().as_bytes())
}

/// Check that `to` holds exactly the content of `from`
pub fn verify_copy(from: &Path, to: &Path) -> Result<(), ShadowError> {
    let expected = compute_hash(from).map_err(|source| ShadowError::VerifyFailed {
        path: from.to_path_buf(),
        source,
    })?;
    let actual = compute_hash(to).map_err(|source| ShadowError::VerifyFailed {
        path: to.to_path_buf(),
        source,
    })?;

    if expected == actual {
        Ok(())
    } else {
        Err(ShadowError::ChecksumMismatch {
            path: to.to_path_buf(),
        })
    }
}
