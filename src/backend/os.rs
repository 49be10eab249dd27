//! Real OS backend: binds the capability set to `std::fs`.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use filetime::FileTime;
use tempfile::Builder;

use crate::errors::{Result, classify};
use crate::info::{DirEntry, FileInfo, FileKind};

use super::{DirEntries, FileSystem, TempOptions};

/// Stateless handle onto the host filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsFileSystem;

impl OsFileSystem {
    pub fn new() -> Self {
        Self
    }
}

fn kind_of(ft: fs::FileType) -> FileKind {
    if ft.is_file() {
        FileKind::File
    } else if ft.is_dir() {
        FileKind::Dir
    } else if ft.is_symlink() {
        FileKind::Symlink
    } else {
        FileKind::Other
    }
}

#[cfg(unix)]
#[allow(clippy::type_complexity)]
fn platform_fields(
    meta: &fs::Metadata,
) -> (
    Option<u32>,
    Option<u32>,
    Option<u32>,
    Option<u64>,
    Option<u64>,
    Option<u64>,
) {
    use std::os::unix::fs::MetadataExt;
    (
        Some(meta.mode()),
        Some(meta.uid()),
        Some(meta.gid()),
        Some(meta.nlink()),
        Some(meta.dev()),
        Some(meta.ino()),
    )
}

#[cfg(not(unix))]
#[allow(clippy::type_complexity)]
fn platform_fields(
    _meta: &fs::Metadata,
) -> (
    Option<u32>,
    Option<u32>,
    Option<u32>,
    Option<u64>,
    Option<u64>,
    Option<u64>,
) {
    (None, None, None, None, None, None)
}

fn info_from(meta: &fs::Metadata) -> FileInfo {
    let (mode, uid, gid, nlink, dev, ino) = platform_fields(meta);
    FileInfo {
        kind: kind_of(meta.file_type()),
        size: meta.len(),
        modified: meta.modified().ok(),
        accessed: meta.accessed().ok(),
        created: meta.created().ok(),
        mode,
        uid,
        gid,
        nlink,
        dev,
        ino,
    }
}

impl FileSystem for OsFileSystem {
    fn stat(&self, path: &Path) -> Result<FileInfo> {
        let meta = fs::metadata(path).map_err(|e| classify("stat", path, e))?;
        Ok(info_from(&meta))
    }

    fn lstat(&self, path: &Path) -> Result<FileInfo> {
        let meta = fs::symlink_metadata(path).map_err(|e| classify("lstat", path, e))?;
        Ok(info_from(&meta))
    }

    fn read_file(&self, path: &Path) -> Result<Vec<u8>> {
        fs::read(path).map_err(|e| classify("read file", path, e))
    }

    fn write_file(&self, path: &Path, data: &[u8]) -> Result<()> {
        fs::write(path, data).map_err(|e| classify("write file", path, e))
    }

    fn copy_file(&self, src: &Path, dest: &Path) -> Result<()> {
        // fs::copy uses the OS-accelerated path where available and
        // replaces an existing destination file; overwrite policy is the
        // engine's job.
        fs::copy(src, dest)
            .map(|_| ())
            .map_err(|e| classify("copy file", dest, e))
    }

    fn make_dir(&self, path: &Path, recursive: bool) -> Result<()> {
        let res = if recursive {
            fs::create_dir_all(path)
        } else {
            fs::create_dir(path)
        };
        res.map_err(|e| classify("create directory", path, e))
    }

    fn remove(&self, path: &Path, recursive: bool) -> Result<()> {
        let meta = fs::symlink_metadata(path).map_err(|e| classify("remove", path, e))?;
        let res = if meta.is_dir() {
            if recursive {
                fs::remove_dir_all(path)
            } else {
                fs::remove_dir(path)
            }
        } else {
            fs::remove_file(path)
        };
        res.map_err(|e| classify("remove", path, e))
    }

    fn rename(&self, src: &Path, dest: &Path) -> Result<()> {
        fs::rename(src, dest).map_err(|e| classify("rename", src, e))
    }

    fn symlink(&self, target: &Path, link: &Path) -> Result<()> {
        #[cfg(unix)]
        {
            std::os::unix::fs::symlink(target, link)
                .map_err(|e| classify("create symlink", link, e))
        }
        #[cfg(windows)]
        {
            // Windows distinguishes file and directory links; probe the
            // target (relative to the link's parent) to pick the variant.
            let resolved = if target.is_absolute() {
                target.to_path_buf()
            } else {
                link.parent()
                    .map(|p| p.join(target))
                    .unwrap_or_else(|| target.to_path_buf())
            };
            let is_dir = fs::metadata(&resolved).map(|m| m.is_dir()).unwrap_or(false);
            let res = if is_dir {
                std::os::windows::fs::symlink_dir(target, link)
            } else {
                std::os::windows::fs::symlink_file(target, link)
            };
            res.map_err(|e| classify("create symlink", link, e))
        }
        #[cfg(not(any(unix, windows)))]
        {
            let _ = target;
            Err(classify(
                "create symlink",
                link,
                std::io::Error::from(std::io::ErrorKind::Unsupported),
            ))
        }
    }

    fn read_link(&self, path: &Path) -> Result<PathBuf> {
        fs::read_link(path).map_err(|e| classify("read link", path, e))
    }

    fn hard_link(&self, src: &Path, dest: &Path) -> Result<()> {
        fs::hard_link(src, dest).map_err(|e| classify("create hard link", dest, e))
    }

    fn set_file_times(
        &self,
        path: &Path,
        accessed: SystemTime,
        modified: SystemTime,
    ) -> Result<()> {
        filetime::set_file_times(
            path,
            FileTime::from_system_time(accessed),
            FileTime::from_system_time(modified),
        )
        .map_err(|e| classify("set file times", path, e))
    }

    fn read_dir(&self, path: &Path) -> Result<DirEntries<'_>> {
        let rd = fs::read_dir(path).map_err(|e| classify("read directory", path, e))?;
        let dir = path.to_path_buf();
        Ok(Box::new(rd.map(move |res| {
            let entry = res.map_err(|e| classify("read directory", &dir, e))?;
            let kind = entry
                .file_type()
                .map(kind_of)
                .map_err(|e| classify("read directory entry", &entry.path(), e))?;
            Ok(DirEntry {
                name: entry.file_name(),
                kind,
            })
        })))
    }

    fn make_temp_dir(&self, options: &TempOptions) -> Result<PathBuf> {
        let parent = options.dir.clone().unwrap_or_else(env::temp_dir);
        let mut builder = Builder::new();
        if let Some(p) = options.prefix.as_deref() {
            builder.prefix(p);
        }
        if let Some(s) = options.suffix.as_deref() {
            builder.suffix(s);
        }
        let dir = builder
            .tempdir_in(&parent)
            .map_err(|e| classify("create temp dir", &parent, e))?;
        Ok(dir.keep())
    }

    fn make_temp_file(&self, options: &TempOptions) -> Result<PathBuf> {
        let parent = options.dir.clone().unwrap_or_else(env::temp_dir);
        let mut builder = Builder::new();
        if let Some(p) = options.prefix.as_deref() {
            builder.prefix(p);
        }
        if let Some(s) = options.suffix.as_deref() {
            builder.suffix(s);
        }
        let file = builder
            .tempfile_in(&parent)
            .map_err(|e| classify("create temp file", &parent, e))?;
        let (_, path) = file
            .keep()
            .map_err(|e| classify("create temp file", &parent, e.error))?;
        Ok(path)
    }
}
