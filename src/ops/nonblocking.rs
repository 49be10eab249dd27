//! Suspending variants of the composite operations.
//!
//! Same engines, run on the tokio blocking pool; the calling task suspends
//! without holding up the scheduler. These variants additionally accept an
//! optional [`Interrupt`]: the flag is checked between per-entry steps, and
//! an abort mid-tree leaves whatever prefix of the destination was already
//! written (documented limitation, no rollback).

use std::path::Path;
use std::sync::Arc;

use crate::backend::{FileSystem, nonblocking::run};
use crate::ensure;
use crate::errors::Result;
use crate::interrupt::Interrupt;

use super::copy::{CopyOptions, copy_entry};
use super::mv::{MoveOptions, move_entry_inner};

pub async fn copy<F>(
    fs: &Arc<F>,
    src: impl AsRef<Path>,
    dest: impl AsRef<Path>,
    options: CopyOptions,
    interrupt: Option<Interrupt>,
) -> Result<()>
where
    F: FileSystem + ?Sized + 'static,
{
    let fs = Arc::clone(fs);
    let src = src.as_ref().to_path_buf();
    let dest = dest.as_ref().to_path_buf();
    run(move || copy_entry(&*fs, &src, &dest, &options, interrupt.as_ref())).await
}

pub async fn move_entry<F>(
    fs: &Arc<F>,
    src: impl AsRef<Path>,
    dest: impl AsRef<Path>,
    options: MoveOptions,
    interrupt: Option<Interrupt>,
) -> Result<()>
where
    F: FileSystem + ?Sized + 'static,
{
    let fs = Arc::clone(fs);
    let src = src.as_ref().to_path_buf();
    let dest = dest.as_ref().to_path_buf();
    run(move || move_entry_inner(&*fs, &src, &dest, &options, interrupt.as_ref())).await
}

pub async fn exists<F>(fs: &Arc<F>, path: impl AsRef<Path>) -> Result<bool>
where
    F: FileSystem + ?Sized + 'static,
{
    let fs = Arc::clone(fs);
    let path = path.as_ref().to_path_buf();
    run(move || ensure::exists(&*fs, &path)).await
}

pub async fn ensure_dir<F>(fs: &Arc<F>, path: impl AsRef<Path>) -> Result<()>
where
    F: FileSystem + ?Sized + 'static,
{
    let fs = Arc::clone(fs);
    let path = path.as_ref().to_path_buf();
    run(move || ensure::ensure_dir(&*fs, &path)).await
}

pub async fn ensure_file<F>(fs: &Arc<F>, path: impl AsRef<Path>) -> Result<()>
where
    F: FileSystem + ?Sized + 'static,
{
    let fs = Arc::clone(fs);
    let path = path.as_ref().to_path_buf();
    run(move || ensure::ensure_file(&*fs, &path)).await
}

pub async fn ensure_link<F>(
    fs: &Arc<F>,
    src: impl AsRef<Path>,
    dest: impl AsRef<Path>,
) -> Result<()>
where
    F: FileSystem + ?Sized + 'static,
{
    let fs = Arc::clone(fs);
    let src = src.as_ref().to_path_buf();
    let dest = dest.as_ref().to_path_buf();
    run(move || ensure::ensure_link(&*fs, &src, &dest)).await
}

pub async fn ensure_symlink<F>(
    fs: &Arc<F>,
    target: impl AsRef<Path>,
    link: impl AsRef<Path>,
) -> Result<()>
where
    F: FileSystem + ?Sized + 'static,
{
    let fs = Arc::clone(fs);
    let target = target.as_ref().to_path_buf();
    let link = link.as_ref().to_path_buf();
    run(move || ensure::ensure_symlink(&*fs, &target, &link)).await
}

pub async fn empty_dir<F>(fs: &Arc<F>, path: impl AsRef<Path>) -> Result<()>
where
    F: FileSystem + ?Sized + 'static,
{
    let fs = Arc::clone(fs);
    let path = path.as_ref().to_path_buf();
    run(move || ensure::empty_dir(&*fs, &path)).await
}
