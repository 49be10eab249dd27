//! Metadata snapshot types shared by backends, the walker and the engines.

use std::ffi::OsString;
use std::time::SystemTime;

/// Kind of a filesystem entry. Block/char devices, fifos and sockets all
/// fold into `Other`; the engines refuse to copy those.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    File,
    Dir,
    Symlink,
    Other,
}

/// A point-in-time metadata snapshot. Never auto-refreshed; callers re-stat
/// when they need current data.
///
/// Timestamps and the platform fields are optional because not every
/// platform or backend can provide them.
#[derive(Debug, Clone)]
pub struct FileInfo {
    pub kind: FileKind,
    pub size: u64,
    pub modified: Option<SystemTime>,
    pub accessed: Option<SystemTime>,
    pub created: Option<SystemTime>,
    /// Raw st_mode bits. Unix only.
    pub mode: Option<u32>,
    pub uid: Option<u32>,
    pub gid: Option<u32>,
    pub nlink: Option<u64>,
    /// Device holding the entry. Unix only.
    pub dev: Option<u64>,
    pub ino: Option<u64>,
}

impl FileInfo {
    pub fn is_file(&self) -> bool {
        self.kind == FileKind::File
    }

    pub fn is_dir(&self) -> bool {
        self.kind == FileKind::Dir
    }

    pub fn is_symlink(&self) -> bool {
        self.kind == FileKind::Symlink
    }
}

/// One entry of a directory listing: name and kind, no full metadata.
/// Names stay as `OsString` so non-UTF8 names survive a copy untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: OsString,
    pub kind: FileKind,
}

impl DirEntry {
    pub fn is_file(&self) -> bool {
        self.kind == FileKind::File
    }

    pub fn is_dir(&self) -> bool {
        self.kind == FileKind::Dir
    }

    pub fn is_symlink(&self) -> bool {
        self.kind == FileKind::Symlink
    }
}
