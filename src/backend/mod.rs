//! Pluggable filesystem backends.
//!
//! The [`FileSystem`] trait is the capability contract the copy/move engines
//! and the walker are written against. Engines never call OS functions
//! directly; a backend is injected at the call site, which is what lets the
//! same algorithms run against the real OS or the deterministic in-memory
//! double.

mod memory;
pub(crate) mod nonblocking;
mod os;

pub use memory::MemoryFileSystem;
pub use nonblocking::NonBlockingFs;
pub use os::OsFileSystem;

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::errors::Result;
use crate::info::{DirEntry, FileInfo};

/// Lazy directory listing. Dropping it releases the directory handle, also
/// on early termination.
pub type DirEntries<'a> = Box<dyn Iterator<Item = Result<DirEntry>> + 'a>;

/// Naming controls for temp-path creation.
#[derive(Debug, Clone, Default)]
pub struct TempOptions {
    /// Parent directory; the platform temp dir when unset.
    pub dir: Option<PathBuf>,
    /// Text preceding the random portion of the name.
    pub prefix: Option<String>,
    /// Text following the random portion of the name.
    pub suffix: Option<String>,
}

/// The primitive filesystem capability set.
///
/// Semantics the engines rely on:
/// - `stat` follows symlinks, `lstat` does not.
/// - `copy_file` copies one regular file byte-for-byte and replaces an
///   existing destination file; overwrite *policy* is enforced above it.
/// - `make_dir` with `recursive` creates intermediate directories and
///   tolerates an existing directory leaf; without it, an existing leaf is
///   `AlreadyExists`.
/// - `remove` with `recursive` deletes a whole tree; without it, a
///   non-empty directory fails.
/// - `read_dir` is a single-level, lazy, forward-only listing.
///
/// All operations block; [`NonBlockingFs`] is the suspending adapter.
pub trait FileSystem: Send + Sync {
    fn stat(&self, path: &Path) -> Result<FileInfo>;

    fn lstat(&self, path: &Path) -> Result<FileInfo>;

    fn read_file(&self, path: &Path) -> Result<Vec<u8>>;

    fn write_file(&self, path: &Path, data: &[u8]) -> Result<()>;

    fn copy_file(&self, src: &Path, dest: &Path) -> Result<()>;

    fn make_dir(&self, path: &Path, recursive: bool) -> Result<()>;

    fn remove(&self, path: &Path, recursive: bool) -> Result<()>;

    fn rename(&self, src: &Path, dest: &Path) -> Result<()>;

    fn symlink(&self, target: &Path, link: &Path) -> Result<()>;

    fn read_link(&self, path: &Path) -> Result<PathBuf>;

    fn hard_link(&self, src: &Path, dest: &Path) -> Result<()>;

    /// Reapply access/modification times. Creation time is read-only.
    fn set_file_times(&self, path: &Path, accessed: SystemTime, modified: SystemTime)
    -> Result<()>;

    fn read_dir(&self, path: &Path) -> Result<DirEntries<'_>>;

    fn make_temp_dir(&self, options: &TempOptions) -> Result<PathBuf>;

    fn make_temp_file(&self, options: &TempOptions) -> Result<PathBuf>;
}
