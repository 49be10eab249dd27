//! Suspending adapter over any blocking backend.
//!
//! Each primitive exists exactly once, in blocking form; the async surface
//! runs it on the tokio blocking pool. The calling task suspends until the
//! result is available without blocking other scheduled tasks, and error
//! behavior is identical to the blocking variant by construction.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use crate::errors::{FsError, Result};
use crate::info::{DirEntry, FileInfo};

use super::{FileSystem, TempOptions};

/// Run a blocking closure on the tokio blocking pool.
pub(crate) async fn run<T>(f: impl FnOnce() -> Result<T> + Send + 'static) -> Result<T>
where
    T: Send + 'static,
{
    match tokio::task::spawn_blocking(f).await {
        Ok(res) => res,
        Err(join) => Err(FsError::Io {
            op: "run blocking task",
            path: PathBuf::new(),
            source: io::Error::other(join),
        }),
    }
}

/// Async view of a [`FileSystem`]. Cheap to clone; all clones share the
/// wrapped backend.
#[derive(Debug)]
pub struct NonBlockingFs<F: ?Sized> {
    inner: Arc<F>,
}

impl<F: ?Sized> Clone for NonBlockingFs<F> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<F: FileSystem> NonBlockingFs<F> {
    pub fn new(inner: F) -> Self {
        Self {
            inner: Arc::new(inner),
        }
    }
}

impl<F: FileSystem + ?Sized + 'static> NonBlockingFs<F> {
    pub fn from_arc(inner: Arc<F>) -> Self {
        Self { inner }
    }

    /// The wrapped blocking backend.
    pub fn blocking(&self) -> &Arc<F> {
        &self.inner
    }

    pub async fn stat(&self, path: impl AsRef<Path>) -> Result<FileInfo> {
        let fs = Arc::clone(&self.inner);
        let path = path.as_ref().to_path_buf();
        run(move || fs.stat(&path)).await
    }

    pub async fn lstat(&self, path: impl AsRef<Path>) -> Result<FileInfo> {
        let fs = Arc::clone(&self.inner);
        let path = path.as_ref().to_path_buf();
        run(move || fs.lstat(&path)).await
    }

    pub async fn read_file(&self, path: impl AsRef<Path>) -> Result<Vec<u8>> {
        let fs = Arc::clone(&self.inner);
        let path = path.as_ref().to_path_buf();
        run(move || fs.read_file(&path)).await
    }

    pub async fn write_file(&self, path: impl AsRef<Path>, data: impl Into<Vec<u8>>) -> Result<()> {
        let fs = Arc::clone(&self.inner);
        let path = path.as_ref().to_path_buf();
        let data = data.into();
        run(move || fs.write_file(&path, &data)).await
    }

    pub async fn copy_file(&self, src: impl AsRef<Path>, dest: impl AsRef<Path>) -> Result<()> {
        let fs = Arc::clone(&self.inner);
        let src = src.as_ref().to_path_buf();
        let dest = dest.as_ref().to_path_buf();
        run(move || fs.copy_file(&src, &dest)).await
    }

    pub async fn make_dir(&self, path: impl AsRef<Path>, recursive: bool) -> Result<()> {
        let fs = Arc::clone(&self.inner);
        let path = path.as_ref().to_path_buf();
        run(move || fs.make_dir(&path, recursive)).await
    }

    pub async fn remove(&self, path: impl AsRef<Path>, recursive: bool) -> Result<()> {
        let fs = Arc::clone(&self.inner);
        let path = path.as_ref().to_path_buf();
        run(move || fs.remove(&path, recursive)).await
    }

    pub async fn rename(&self, src: impl AsRef<Path>, dest: impl AsRef<Path>) -> Result<()> {
        let fs = Arc::clone(&self.inner);
        let src = src.as_ref().to_path_buf();
        let dest = dest.as_ref().to_path_buf();
        run(move || fs.rename(&src, &dest)).await
    }

    pub async fn symlink(&self, target: impl AsRef<Path>, link: impl AsRef<Path>) -> Result<()> {
        let fs = Arc::clone(&self.inner);
        let target = target.as_ref().to_path_buf();
        let link = link.as_ref().to_path_buf();
        run(move || fs.symlink(&target, &link)).await
    }

    pub async fn read_link(&self, path: impl AsRef<Path>) -> Result<PathBuf> {
        let fs = Arc::clone(&self.inner);
        let path = path.as_ref().to_path_buf();
        run(move || fs.read_link(&path)).await
    }

    pub async fn hard_link(&self, src: impl AsRef<Path>, dest: impl AsRef<Path>) -> Result<()> {
        let fs = Arc::clone(&self.inner);
        let src = src.as_ref().to_path_buf();
        let dest = dest.as_ref().to_path_buf();
        run(move || fs.hard_link(&src, &dest)).await
    }

    pub async fn set_file_times(
        &self,
        path: impl AsRef<Path>,
        accessed: SystemTime,
        modified: SystemTime,
    ) -> Result<()> {
        let fs = Arc::clone(&self.inner);
        let path = path.as_ref().to_path_buf();
        run(move || fs.set_file_times(&path, accessed, modified)).await
    }

    /// Whole listing at once: the lazy handle cannot cross the pool
    /// boundary, so the suspending form collects.
    pub async fn read_dir(&self, path: impl AsRef<Path>) -> Result<Vec<DirEntry>> {
        let fs = Arc::clone(&self.inner);
        let path = path.as_ref().to_path_buf();
        run(move || fs.read_dir(&path)?.collect()).await
    }

    pub async fn make_temp_dir(&self, options: TempOptions) -> Result<PathBuf> {
        let fs = Arc::clone(&self.inner);
        run(move || fs.make_temp_dir(&options)).await
    }

    pub async fn make_temp_file(&self, options: TempOptions) -> Result<PathBuf> {
        let fs = Arc::clone(&self.inner);
        run(move || fs.make_temp_file(&options)).await
    }
}
