//! Idempotent existence helpers.
//!
//! Thin per-call wrappers with no internal state: each one checks, creates
//! what is missing, and succeeds if the world already looks right. This is
//! the only place an AlreadyExists/NotFound condition is absorbed instead
//! of propagated — and only for the expected kind; a path occupied by the
//! wrong kind of entry still fails.

use std::path::Path;

use tracing::debug;

use crate::backend::FileSystem;
use crate::errors::{FsError, Result};
use crate::info::FileKind;

/// Whether `path` exists (symlinks are not followed, so a dangling link
/// counts as existing).
pub fn exists<F>(fs: &F, path: &Path) -> Result<bool>
where
    F: FileSystem + ?Sized,
{
    match fs.lstat(path) {
        Ok(_) => Ok(true),
        Err(e) if e.is_not_found() => Ok(false),
        Err(e) => Err(e),
    }
}

/// Ensure `path` exists as a directory, creating intermediate directories
/// as needed.
pub fn ensure_dir<F>(fs: &F, path: &Path) -> Result<()>
where
    F: FileSystem + ?Sized,
{
    match fs.lstat(path) {
        Ok(info) if info.kind == FileKind::Dir => Ok(()),
        Ok(_) => Err(FsError::NotADirectory(path.to_path_buf())),
        Err(e) if e.is_not_found() => match fs.make_dir(path, true) {
            Ok(()) => {
                debug!(path = %path.display(), "created directory");
                Ok(())
            }
            // Lost a race to another creator; the directory is there now.
            Err(e) if e.is_already_exists() => Ok(()),
            Err(e) => Err(e),
        },
        Err(e) => Err(e),
    }
}

/// Ensure `path` exists as a regular file, creating it (and its parents)
/// empty when missing.
pub fn ensure_file<F>(fs: &F, path: &Path) -> Result<()>
where
    F: FileSystem + ?Sized,
{
    match fs.lstat(path) {
        Ok(info) if info.kind == FileKind::File => Ok(()),
        Ok(info) if info.kind == FileKind::Dir => {
            Err(FsError::IsADirectory(path.to_path_buf()))
        }
        Ok(_) => Err(FsError::AlreadyExists(path.to_path_buf())),
        Err(e) if e.is_not_found() => {
            if let Some(parent) = path.parent() {
                ensure_dir(fs, parent)?;
            }
            fs.write_file(path, &[])?;
            debug!(path = %path.display(), "created empty file");
            Ok(())
        }
        Err(e) => Err(e),
    }
}

/// Ensure a hard link to `src` exists at `dest`.
pub fn ensure_link<F>(fs: &F, src: &Path, dest: &Path) -> Result<()>
where
    F: FileSystem + ?Sized,
{
    if let Some(parent) = dest.parent() {
        ensure_dir(fs, parent)?;
    }
    match fs.hard_link(src, dest) {
        Ok(()) => Ok(()),
        Err(e) if e.is_already_exists() => Ok(()),
        Err(e) => Err(e),
    }
}

/// Ensure a symlink to `target` exists at `link`. An existing link to the
/// same target is fine; a different target, or a non-link occupant, fails.
pub fn ensure_symlink<F>(fs: &F, target: &Path, link: &Path) -> Result<()>
where
    F: FileSystem + ?Sized,
{
    match fs.lstat(link) {
        Ok(info) if info.kind == FileKind::Symlink => {
            if fs.read_link(link)? == target {
                Ok(())
            } else {
                Err(FsError::AlreadyExists(link.to_path_buf()))
            }
        }
        Ok(_) => Err(FsError::AlreadyExists(link.to_path_buf())),
        Err(e) if e.is_not_found() => {
            if let Some(parent) = link.parent() {
                ensure_dir(fs, parent)?;
            }
            fs.symlink(target, link)
        }
        Err(e) => Err(e),
    }
}

/// Ensure `path` is an existing empty directory: children of an existing
/// directory are removed, a missing directory is created.
pub fn empty_dir<F>(fs: &F, path: &Path) -> Result<()>
where
    F: FileSystem + ?Sized,
{
    match fs.lstat(path) {
        Ok(info) if info.kind == FileKind::Dir => {
            let children: Vec<_> = fs.read_dir(path)?.collect::<Result<_>>()?;
            for child in children {
                let child_path = path.join(&child.name);
                fs.remove(&child_path, child.kind == FileKind::Dir)?;
            }
            Ok(())
        }
        Ok(_) => Err(FsError::NotADirectory(path.to_path_buf())),
        Err(e) if e.is_not_found() => fs.make_dir(path, true),
        Err(e) => Err(e),
    }
}
