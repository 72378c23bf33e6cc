//! Source-level scan errors.

use std::io;
use std::path::{Path, PathBuf};

/// Why a log source could not be scanned (fully).
///
/// None of these stop the run; the source is reported and skipped.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("Log file not found: {}", .0.display())]
    SourceNotFound(PathBuf),

    #[error("Permission denied: {}", .0.display())]
    PermissionDenied(PathBuf),

    #[error("Failed to read log file {}: {}", .path.display(), .source)]
    OtherIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ScanError {
    /// Classify an I/O error raised while opening or reading `path`.
    pub fn from_io(path: &Path, err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => ScanError::SourceNotFound(path.to_path_buf()),
            io::ErrorKind::PermissionDenied => ScanError::PermissionDenied(path.to_path_buf()),
            _ => ScanError::OtherIo {
                path: path.to_path_buf(),
                source: err,
            },
        }
    }

    /// The source this error is about.
    pub fn path(&self) -> &Path {
        match self {
            ScanError::SourceNotFound(path) | ScanError::PermissionDenied(path) => path,
            ScanError::OtherIo { path, .. } => path,
        }
    }
}
