//! Cross-platform filesystem utilities.
//!
//! A uniform capability abstraction over the host file APIs plus composite
//! operations on top of it: recursive copy, safe move, a lazy directory
//! walker and idempotent `ensure` helpers. The composite engines are
//! written against the [`FileSystem`] trait, never against the OS
//! directly, so the same algorithms run on the real filesystem
//! ([`OsFileSystem`]) or on the deterministic in-memory backend
//! ([`MemoryFileSystem`]).
//!
//! Every operation exists in blocking form and, under [`nonblocking`] and
//! [`NonBlockingFs`], in suspending form with identical semantics: the
//! async surface runs the one blocking implementation on the tokio
//! blocking pool.
//!
//! ```no_run
//! use std::path::Path;
//! use crossfs::{copy, move_entry, CopyOptions, MoveOptions, OsFileSystem};
//!
//! fn relocate() -> crossfs::Result<()> {
//!     let fs = OsFileSystem::new();
//!     copy(&fs, Path::new("in"), Path::new("staged"), &CopyOptions::default())?;
//!     move_entry(&fs, Path::new("staged"), Path::new("out"), &MoveOptions { overwrite: true })?;
//!     Ok(())
//! }
//! ```
//!
//! The engines take no locks and spawn no worker threads; callers make
//! sure no concurrent writer touches a subtree while it is being copied
//! or moved.

pub mod backend;
pub mod ensure;
mod errors;
mod info;
mod interrupt;
mod ops;
mod paths;
pub mod walk;

pub use backend::{
    DirEntries, FileSystem, MemoryFileSystem, NonBlockingFs, OsFileSystem, TempOptions,
};
pub use ensure::{empty_dir, ensure_dir, ensure_file, ensure_link, ensure_symlink, exists};
pub use errors::{FsError, Result};
pub use info::{DirEntry, FileInfo, FileKind};
pub use interrupt::Interrupt;
pub use ops::{CopyOptions, MoveOptions, copy, move_entry, nonblocking};
pub use walk::{Walk, WalkEntry, WalkOptions, walk};
