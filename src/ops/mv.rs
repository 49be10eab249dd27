//! Safe move engine.
//!
//! Tries a direct rename first; a cross-device (or otherwise unclassified)
//! rename failure falls back to copy-with-timestamps plus removal of the
//! source. Moving a path onto itself or into its own subtree is rejected
//! before anything is touched.

use std::path::Path;

use tracing::{info, warn};

use crate::backend::FileSystem;
use crate::errors::{FsError, Result};
use crate::interrupt::Interrupt;
use crate::paths;

use super::copy::{CopyOptions, copy_entry};

#[derive(Debug, Clone, Copy, Default)]
pub struct MoveOptions {
    /// Replace an existing destination instead of failing with AlreadyExists.
    pub overwrite: bool,
}

/// Relocate `src` to `dest`. See the module docs for fallback semantics.
pub fn move_entry<F>(fs: &F, src: &Path, dest: &Path, options: &MoveOptions) -> Result<()>
where
    F: FileSystem + ?Sized,
{
    move_entry_inner(fs, src, dest, options, None)
}

pub(crate) fn move_entry_inner<F>(
    fs: &F,
    src: &Path,
    dest: &Path,
    options: &MoveOptions,
    interrupt: Option<&Interrupt>,
) -> Result<()>
where
    F: FileSystem + ?Sized,
{
    // Lexical check, before any filesystem access: once removal starts
    // there is no safe way to unwind a move into the source's own subtree.
    if paths::is_same_or_inside(src, dest) {
        return Err(FsError::SubdirectoryMove {
            src: src.to_path_buf(),
            dest: dest.to_path_buf(),
        });
    }

    if let Some(flag) = interrupt {
        if flag.is_requested() {
            return Err(FsError::Interrupted);
        }
    }

    let src_info = fs.lstat(src)?;

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

    match fs.rename(src, dest) {
        Ok(()) => {
            info!(src = %src.display(), dest = %dest.display(), "renamed");
            Ok(())
        }
        Err(e) if e.is_unclassified() => {
            let hint = if e.is_cross_device() {
                "cross-device link"
            } else {
                "rename not available"
            };
            warn!(src = %src.display(), dest = %dest.display(), error = %e, hint, "falling back to copy and remove");
            let copy_opts = CopyOptions {
                overwrite: true,
                preserve_timestamps: true,
            };
            // A failure in here surfaces as-is: partial destination and
            // intact source are both left in place, since neither can be
            // deleted safely without knowing how far the copy got.
            copy_entry(fs, src, dest, &copy_opts, interrupt)?;
            fs.remove(src, src_info.is_dir())?;
            info!(src = %src.display(), dest = %dest.display(), "copied and removed source");
            Ok(())
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryFileSystem;

    fn fixture() -> MemoryFileSystem {
        let fs = MemoryFileSystem::new();
        fs.make_dir(Path::new("/tmp/a"), true).unwrap();
        fs.write_file(Path::new("/tmp/a/file.txt"), b"hello").unwrap();
        fs
    }

    #[test]
    fn rejects_move_into_own_subtree_before_touching_anything() {
        let fs = fixture();
        for dest in ["/tmp/a", "/tmp/a/b", "/tmp/a/b/../c"] {
            let err = move_entry(
                &fs,
                Path::new("/tmp/a"),
                Path::new(dest),
                &MoveOptions::default(),
            )
            .unwrap_err();
            assert!(
                matches!(err, FsError::SubdirectoryMove { .. }),
                "dest {dest} gave {err}"
            );
        }
        // Nothing was mutated, and the guard fires even for nonexistent src.
        assert_eq!(fs.read_file(Path::new("/tmp/a/file.txt")).unwrap(), b"hello");
        let err = move_entry(
            &fs,
            Path::new("/ghost"),
            Path::new("/ghost/sub"),
            &MoveOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, FsError::SubdirectoryMove { .. }));
    }

    #[test]
    fn same_filesystem_move_renames() {
        let fs = fixture();
        move_entry(
            &fs,
            Path::new("/tmp/a"),
            Path::new("/tmp/b"),
            &MoveOptions::default(),
        )
        .unwrap();
        assert!(fs.lstat(Path::new("/tmp/a")).unwrap_err().is_not_found());
        assert_eq!(fs.read_file(Path::new("/tmp/b/file.txt")).unwrap(), b"hello");
    }

    #[test]
    fn existing_file_destination_needs_overwrite() {
        let fs = fixture();
        fs.write_file(Path::new("/tmp/b"), b"occupied").unwrap();

        let err = move_entry(
            &fs,
            Path::new("/tmp/a"),
            Path::new("/tmp/b"),
            &MoveOptions::default(),
        )
        .unwrap_err();
        assert!(err.is_already_exists());
        // Source untouched.
        assert_eq!(fs.read_file(Path::new("/tmp/a/file.txt")).unwrap(), b"hello");

        move_entry(
            &fs,
            Path::new("/tmp/a"),
            Path::new("/tmp/b"),
            &MoveOptions { overwrite: true },
        )
        .unwrap();
        assert_eq!(fs.read_file(Path::new("/tmp/b/file.txt")).unwrap(), b"hello");
    }

    #[test]
    fn cross_device_move_copies_then_removes_source() {
        let fs = fixture();
        fs.make_dir(Path::new("/tmp/a/nested"), true).unwrap();
        fs.write_file(Path::new("/tmp/a/nested/deep.txt"), b"deep")
            .unwrap();
        fs.simulate_cross_device_rename(true);

        move_entry(
            &fs,
            Path::new("/tmp/a"),
            Path::new("/vol2/a"),
            &MoveOptions::default(),
        )
        .unwrap();

        assert!(fs.lstat(Path::new("/tmp/a")).unwrap_err().is_not_found());
        assert_eq!(fs.read_file(Path::new("/vol2/a/file.txt")).unwrap(), b"hello");
        assert_eq!(
            fs.read_file(Path::new("/vol2/a/nested/deep.txt")).unwrap(),
            b"deep"
        );
    }
}
