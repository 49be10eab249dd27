//! Recursive copy engine.
//!
//! Copies a file, directory tree or symlink from `src` to `dest` through
//! the injected backend. Structure is preserved, symlinks are recreated
//! rather than followed, and the overwrite policy is enforced before any
//! byte is written. A failure on one child aborts the remaining siblings;
//! already-copied siblings stay in place (no rollback).

use std::io;
use std::path::Path;

use tracing::{debug, warn};

use crate::backend::FileSystem;
use crate::errors::{FsError, Result};
use crate::info::{FileInfo, FileKind};
use crate::interrupt::Interrupt;

#[derive(Debug, Clone, Copy, Default)]
pub struct CopyOptions {
    /// Replace an existing destination instead of failing with AlreadyExists.
    pub overwrite: bool,
    /// Reapply source atime/mtime to the destination, best-effort.
    pub preserve_timestamps: bool,
}

/// Copy `src` to `dest`. See the module docs for tree semantics.
pub fn copy<F>(fs: &F, src: &Path, dest: &Path, options: &CopyOptions) -> Result<()>
where
    F: FileSystem + ?Sized,
{
    copy_entry(fs, src, dest, options, None)
}

pub(crate) fn copy_entry<F>(
    fs: &F,
    src: &Path,
    dest: &Path,
    options: &CopyOptions,
    interrupt: Option<&Interrupt>,
) -> Result<()>
where
    F: FileSystem + ?Sized,
{
    if let Some(flag) = interrupt {
        if flag.is_requested() {
            return Err(FsError::Interrupted);
        }
    }

    let info = fs.lstat(src)?;
    match info.kind {
        FileKind::Symlink => copy_symlink(fs, src, dest, options),
        FileKind::File => copy_file(fs, src, dest, &info, options),
        FileKind::Dir => copy_dir(fs, src, dest, &info, options, interrupt),
        FileKind::Other => Err(FsError::Io {
            op: "copy",
            path: src.to_path_buf(),
            source: io::Error::new(
                io::ErrorKind::Unsupported,
                "refusing to copy special file",
            ),
        }),
    }
}

/// Recreate an equivalent link at `dest`; the stored target text is copied
/// verbatim, the linked contents are not.
fn copy_symlink<F>(fs: &F, src: &Path, dest: &Path, options: &CopyOptions) -> Result<()>
where
    F: FileSystem + ?Sized,
{
    let target = fs.read_link(src)?;
    match fs.lstat(dest) {
        Ok(existing) => {
            if !options.overwrite {
                return Err(FsError::AlreadyExists(dest.to_path_buf()));
            }
            fs.remove(dest, existing.is_dir())?;
        }
        Err(e) if e.is_not_found() => {}
        Err(e) => return Err(e),
    }
    fs.symlink(&target, dest)?;
    debug!(src = %src.display(), dest = %dest.display(), "recreated symlink");
    Ok(())
}

fn copy_file<F>(
    fs: &F,
    src: &Path,
    dest: &Path,
    info: &FileInfo,
    options: &CopyOptions,
) -> Result<()>
where
    F: FileSystem + ?Sized,
{
    match fs.lstat(dest) {
        Ok(_) if !options.overwrite => {
            return Err(FsError::AlreadyExists(dest.to_path_buf()));
        }
        Ok(_) => {}
        Err(e) if e.is_not_found() => {}
        Err(e) => return Err(e),
    }
    fs.copy_file(src, dest)?;
    if options.preserve_timestamps {
        apply_times(fs, dest, info);
    }
    debug!(src = %src.display(), dest = %dest.display(), "copied file");
    Ok(())
}

fn copy_dir<F>(
    fs: &F,
    src: &Path,
    dest: &Path,
    info: &FileInfo,
    options: &CopyOptions,
    interrupt: Option<&Interrupt>,
) -> Result<()>
where
    F: FileSystem + ?Sized,
{
    match fs.lstat(dest) {
        Ok(existing) => {
            if !options.overwrite {
                // An existing but empty directory is as good as absent.
                if !(existing.is_dir() && dir_is_empty(fs, dest)?) {
                    return Err(FsError::AlreadyExists(dest.to_path_buf()));
                }
            } else if !existing.is_dir() {
                fs.remove(dest, false)?;
            }
        }
        Err(e) if e.is_not_found() => {}
        Err(e) => return Err(e),
    }

    match fs.make_dir(dest, true) {
        Ok(()) => {}
        Err(e) if e.is_already_exists() => {}
        Err(e) => return Err(e),
    }

    // Single-level listing; recursion handles depth.
    for entry in fs.read_dir(src)? {
        let entry = entry?;
        copy_entry(
            fs,
            &src.join(&entry.name),
            &dest.join(&entry.name),
            options,
            interrupt,
        )?;
    }

    // Applied after the children: child copies bump the parent mtime.
    if options.preserve_timestamps {
        apply_times(fs, dest, info);
    }
    Ok(())
}

fn dir_is_empty<F>(fs: &F, dir: &Path) -> Result<bool>
where
    F: FileSystem + ?Sized,
{
    let mut entries = fs.read_dir(dir)?;
    match entries.next() {
        None => Ok(true),
        Some(Ok(_)) => Ok(false),
        Some(Err(e)) => Err(e),
    }
}

/// Best-effort: a destination that cannot take timestamps should not fail
/// an otherwise completed copy.
fn apply_times<F>(fs: &F, dest: &Path, info: &FileInfo)
where
    F: FileSystem + ?Sized,
{
    if let (Some(accessed), Some(modified)) = (info.accessed, info.modified) {
        if let Err(e) = fs.set_file_times(dest, accessed, modified) {
            warn!(path = %dest.display(), error = %e, "failed to preserve timestamps");
        }
    }
}
