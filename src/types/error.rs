//! Error types for shadowbak

use std::path::PathBuf;
use thiserror::Error;

/// Error types for shadowbak operations
#[derive(Debug, Error)]
pub enum ShadowError {
    /// Standard IO error (automatically converted via #[from])
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Exclude glob that does not compile
    #[error("Invalid exclude pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    /// Current working directory could not be determined
    #[error("Failed to get current working directory: {0}")]
    WorkingDirectory(#[source] std::io::Error),

    /// Directory could not be opened or listed
    #[error("Failed to open directory {path}: {source}")]
    DirectoryUnreadable {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Backup store could not be created
    #[error("Failed to create a backup directory {path}: {source}")]
    BackupDirCreate {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Something other than a directory occupies the backup store path
    #[error("Backup path exists but is not a directory: {path}")]
    BackupDirNotDirectory { path: PathBuf },

    /// Worker task panicked, could not be joined, or the queue closed
    #[error("Worker failure: {0}")]
    Worker(String),

    /// stat failed for a reason other than not-found
    #[error("Failed to stat {path}: {source}")]
    StatFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Copy source could not be opened
    #[error("Failed to open source file {path}: {source}")]
    SourceUnreadable {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Copy destination could not be created or replaced
    #[error("Failed to create destination file {path}: {source}")]
    DestinationUnwritable {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Read or write failed part way through a copy
    #[error("Transfer interrupted: {path} at offset {offset} bytes: {source}")]
    TransferInterrupted {
        path: PathBuf,
        offset: u64,
        source: std::io::Error,
    },

    /// Post-copy verification found different content
    #[error("Checksum mismatch: {path}")]
    ChecksumMismatch { path: PathBuf },

    /// Post-copy verification could not read one side
    #[error("Failed to read {path} for verification: {source}")]
    VerifyFailed {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl ShadowError {
    /// Check if this error aborts the whole run.
    ///
    /// Everything that concerns a single entry is recoverable: the coordinator
    /// records it and moves on to the next entry.
    pub fn is_fatal(&self) -> bool {
        !self.is_item_error()
    }

    /// Check if this error is scoped to one entry
    pub fn is_item_error(&self) -> bool {
        matches!(
            self,
            ShadowError::StatFailed { .. }
                | ShadowError::SourceUnreadable { .. }
                | ShadowError::DestinationUnwritable { .. }
                | ShadowError::TransferInterrupted { .. }
                | ShadowError::ChecksumMismatch { .. }
                | ShadowError::VerifyFailed { .. }
        )
    }

    /// Underlying OS error kind, when there is one.
    pub fn io_kind(&self) -> Option<std::io::ErrorKind> {
        match self {
            ShadowError::Io(e) | ShadowError::WorkingDirectory(e) => Some(e.kind()),
            ShadowError::DirectoryUnreadable { source, .. }
            | ShadowError::BackupDirCreate { source, .. }
            | ShadowError::StatFailed { source, .. }
            | ShadowError::SourceUnreadable { source, .. }
            | ShadowError::DestinationUnwritable { source, .. }
            | ShadowError::TransferInterrupted { source, .. }
            | ShadowError::VerifyFailed { source, .. } => Some(source.kind()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Error as IoError, ErrorKind};

    #[test]
    fn test_io_error_automatic_conversion() {
        let io_error = IoError::new(ErrorKind::NotFound, "file not found");
        let error: ShadowError = io_error.into();

        assert!(matches!(error, ShadowError::Io(_)));
        assert!(error.to_string().contains("IO error"));
        assert!(error.is_fatal());
    }

    #[test]
    fn test_item_errors_are_recoverable() {
        let path = PathBuf::from("a.txt");
        let errors = vec![
            ShadowError::StatFailed {
                path: path.clone(),
                source: IoError::new(ErrorKind::Other, "stat"),
            },
            ShadowError::SourceUnreadable {
                path: path.clone(),
                source: IoError::new(ErrorKind::PermissionDenied, "denied"),
            },
            ShadowError::DestinationUnwritable {
                path: path.clone(),
                source: IoError::new(ErrorKind::PermissionDenied, "denied"),
            },
            ShadowError::TransferInterrupted {
                path: path.clone(),
                offset: 10,
                source: IoError::new(ErrorKind::UnexpectedEof, "eof"),
            },
            ShadowError::ChecksumMismatch { path },
        ];

        for error in errors {
            assert!(error.is_item_error(), "{error} should be per-item");
            assert!(!error.is_fatal());
        }
    }

    #[test]
    fn test_environment_errors_are_fatal() {
        let path = PathBuf::from("/work/.backup");
        assert!(ShadowError::BackupDirNotDirectory { path: path.clone() }.is_fatal());
        assert!(ShadowError::BackupDirCreate {
            path: path.clone(),
            source: IoError::new(ErrorKind::PermissionDenied, "denied"),
        }
        .is_fatal());
        assert!(ShadowError::DirectoryUnreadable {
            path,
            source: IoError::new(ErrorKind::NotFound, "gone"),
        }
        .is_fatal());
        assert!(ShadowError::WorkingDirectory(IoError::new(ErrorKind::NotFound, "cwd")).is_fatal());
        assert!(ShadowError::Worker("panicked".to_string()).is_fatal());
    }

    #[test]
    fn test_messages_carry_path_and_os_error() {
        let error = ShadowError::SourceUnreadable {
            path: PathBuf::from("/work/secret.txt"),
            source: IoError::new(ErrorKind::PermissionDenied, "Permission denied"),
        };
        let text = error.to_string();
        assert!(text.contains("Failed to open source file"));
        assert!(text.contains("/work/secret.txt"));
        assert!(text.contains("Permission denied"));
        assert_eq!(error.io_kind(), Some(ErrorKind::PermissionDenied));
    }

    #[test]
    fn test_transfer_interrupted_offset() {
        let error = ShadowError::TransferInterrupted {
            path: PathBuf::from("large_file.bin"),
            offset: 1048576,
            source: IoError::new(ErrorKind::WriteZero, "write zero"),
        };
        assert!(error.to_string().contains("large_file.bin"));
        assert!(error.to_string().contains("1048576"));
    }

    #[test]
    fn test_io_kind_only_for_os_errors() {
        assert_eq!(ShadowError::Config("x".to_string()).io_kind(), None);
        assert_eq!(
            ShadowError::ChecksumMismatch {
                path: PathBuf::from("a.txt.bak")
            }
            .io_kind(),
            None
        );
        assert_eq!(
            ShadowError::DestinationUnwritable {
                path: PathBuf::from("a.txt.bak"),
                source: IoError::new(ErrorKind::NotFound, "gone"),
            }
            .io_kind(),
            Some(ErrorKind::NotFound)
        );
    }

    #[test]
    fn test_result_propagation() {
        fn inner_function() -> Result<(), ShadowError> {
            let _file = std::fs::File::open("/nonexistent/path/file.txt")?;
            Ok(())
        }

        fn outer_function() -> Result<(), ShadowError> {
            inner_function()?;
            Ok(())
        }

        assert!(matches!(outer_function(), Err(ShadowError::Io(_))));
    }
}
