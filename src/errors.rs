//! Typed error definitions for crossfs.
//! Maps opaque low-level failures to a small closed taxonomy so callers can
//! branch on meaning rather than on raw platform error codes.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, FsError>;

#[derive(Debug, Error)]
pub enum FsError {
    #[error("Path not found: {0}")]
    NotFound(PathBuf),

    #[error("Path already exists: {0}")]
    AlreadyExists(PathBuf),

    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    #[error("Is a directory: {0}")]
    IsADirectory(PathBuf),

    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// Precondition violation raised by the move engine before any mutation.
    /// Not a reflected OS error: the check is a lexical path comparison.
    #[error("Cannot move '{src}' to a subdirectory of itself, '{dest}'")]
    SubdirectoryMove { src: PathBuf, dest: PathBuf },

    #[error("Operation interrupted")]
    Interrupted,

    /// Any backend failure outside the taxonomy, with the failed operation
    /// and path for diagnostics.
    #[error("{op} '{path}': {source}")]
    Io {
        op: &'static str,
        path: PathBuf,
        source: io::Error,
    },
}

impl FsError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, FsError::NotFound(_))
    }

    pub fn is_already_exists(&self) -> bool {
        matches!(self, FsError::AlreadyExists(_))
    }

    /// True for a backend failure that did not map onto the taxonomy.
    pub fn is_unclassified(&self) -> bool {
        matches!(self, FsError::Io { .. })
    }

    /// True when the wrapped OS error indicates a cross-filesystem link
    /// (EXDEV / ERROR_NOT_SAME_DEVICE). Only ever true for `Io` values.
    pub fn is_cross_device(&self) -> bool {
        match self {
            FsError::Io { source, .. } => is_cross_device(source),
            _ => false,
        }
    }
}

/// Classify an `io::Error` produced by `op` on `path`.
pub(crate) fn classify(op: &'static str, path: &Path, e: io::Error) -> FsError {
    match e.kind() {
        io::ErrorKind::NotFound => FsError::NotFound(path.to_path_buf()),
        io::ErrorKind::AlreadyExists => FsError::AlreadyExists(path.to_path_buf()),
        io::ErrorKind::PermissionDenied => FsError::PermissionDenied(path.to_path_buf()),
        _ => {
            // std has no stable ErrorKind for EISDIR/ENOTDIR everywhere, so
            // fall back to raw OS codes like the rename/copy helpers do.
            #[cfg(unix)]
            if let Some(code) = e.raw_os_error() {
                if code == libc::EISDIR {
                    return FsError::IsADirectory(path.to_path_buf());
                }
                if code == libc::ENOTDIR {
                    return FsError::NotADirectory(path.to_path_buf());
                }
            }
            #[cfg(windows)]
            if let Some(code) = e.raw_os_error() {
                // ERROR_DIRECTORY
                if code == 267 {
                    return FsError::NotADirectory(path.to_path_buf());
                }
            }
            FsError::Io {
                op,
                path: path.to_path_buf(),
                source: e,
            }
        }
    }
}

/// Detect EXDEV / ERROR_NOT_SAME_DEVICE on a raw OS error.
/// std::io::ErrorKind has no stable CrossDeviceLink variant, so check codes.
pub(crate) fn is_cross_device(e: &io::Error) -> bool {
    match e.raw_os_error() {
        #[cfg(unix)]
        Some(code) => code == libc::EXDEV,
        #[cfg(windows)]
        Some(code) => code == 17, // ERROR_NOT_SAME_DEVICE
        #[cfg(not(any(unix, windows)))]
        Some(_) => false,
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_maps_common_kinds() {
        let p = Path::new("/x/y");
        let e = classify("stat", p, io::Error::from(io::ErrorKind::NotFound));
        assert!(e.is_not_found());

        let e = classify("mkdir", p, io::Error::from(io::ErrorKind::AlreadyExists));
        assert!(e.is_already_exists());

        let e = classify("open", p, io::Error::from(io::ErrorKind::PermissionDenied));
        assert!(matches!(e, FsError::PermissionDenied(_)));
    }

    #[test]
    fn unclassified_keeps_op_and_path() {
        let e = classify(
            "rename",
            Path::new("/a"),
            io::Error::new(io::ErrorKind::Other, "boom"),
        );
        assert!(e.is_unclassified());
        let msg = e.to_string();
        assert!(msg.contains("rename"), "message was: {msg}");
        assert!(msg.contains("/a"), "message was: {msg}");
    }

    #[cfg(unix)]
    #[test]
    fn exdev_is_cross_device_but_unclassified() {
        let e = classify(
            "rename",
            Path::new("/a"),
            io::Error::from_raw_os_error(libc::EXDEV),
        );
        assert!(e.is_unclassified());
        assert!(e.is_cross_device());
    }

    #[test]
    fn subdirectory_move_message_names_both_paths() {
        let e = FsError::SubdirectoryMove {
            src: PathBuf::from("/tmp/a"),
            dest: PathBuf::from("/tmp/a/b"),
        };
        let msg = e.to_string();
        assert!(msg.contains("/tmp/a"));
        assert!(msg.contains("subdirectory"));
    }
}
