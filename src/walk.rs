//! Lazy depth-first directory walker.
//!
//! Produces entries one at a time over any backend. The sequence is
//! forward-only and finite; a fresh call to [`walk`] re-scans the root.
//! Dropping the iterator early releases every open directory handle.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::backend::{DirEntries, FileSystem};
use crate::errors::Result;
use crate::info::FileKind;

#[derive(Debug, Clone)]
pub struct WalkOptions {
    /// Deepest level to descend to; 1 means the root's direct children.
    pub max_depth: usize,
    pub include_files: bool,
    pub include_dirs: bool,
    pub include_symlinks: bool,
    /// Report (and descend through) symlink targets instead of the links.
    pub follow_symlinks: bool,
}

impl Default for WalkOptions {
    fn default() -> Self {
        Self {
            max_depth: usize::MAX,
            include_files: true,
            include_dirs: true,
            include_symlinks: true,
            follow_symlinks: false,
        }
    }
}

/// A directory entry plus its full path from the walk root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkEntry {
    pub path: PathBuf,
    pub name: OsString,
    pub kind: FileKind,
}

/// Walk `root` depth-first. The root itself is the first entry.
pub fn walk<'f, F>(fs: &'f F, root: &Path, options: WalkOptions) -> Walk<'f, F>
where
    F: FileSystem + ?Sized,
{
    Walk {
        fs,
        options,
        start: Some(root.to_path_buf()),
        stack: Vec::new(),
    }
}

struct Frame<'f> {
    dir: PathBuf,
    /// Depth of the entries this frame yields (root children are 1).
    depth: usize,
    entries: DirEntries<'f>,
}

pub struct Walk<'f, F: FileSystem + ?Sized> {
    fs: &'f F,
    options: WalkOptions,
    start: Option<PathBuf>,
    stack: Vec<Frame<'f>>,
}

fn wants(options: &WalkOptions, kind: FileKind) -> bool {
    match kind {
        FileKind::File | FileKind::Other => options.include_files,
        FileKind::Dir => options.include_dirs,
        FileKind::Symlink => options.include_symlinks,
    }
}

impl<'f, F: FileSystem + ?Sized> Walk<'f, F> {
    /// Resolved kind under the symlink policy; dangling targets surface as
    /// errors when following.
    fn effective_kind(&self, path: &Path, kind: FileKind) -> Result<FileKind> {
        if kind == FileKind::Symlink && self.options.follow_symlinks {
            Ok(self.fs.stat(path)?.kind)
        } else {
            Ok(kind)
        }
    }
}

impl<'f, F: FileSystem + ?Sized> Iterator for Walk<'f, F> {
    type Item = Result<WalkEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(root) = self.start.take() {
            let info = match self.fs.lstat(&root) {
                Ok(info) => info,
                Err(e) => return Some(Err(e)),
            };
            let kind = match self.effective_kind(&root, info.kind) {
                Ok(kind) => kind,
                Err(e) => return Some(Err(e)),
            };
            if kind == FileKind::Dir && self.options.max_depth > 0 {
                match self.fs.read_dir(&root) {
                    Ok(entries) => self.stack.push(Frame {
                        dir: root.clone(),
                        depth: 1,
                        entries,
                    }),
                    Err(e) => return Some(Err(e)),
                }
            }
            if wants(&self.options, kind) {
                let name = root
                    .file_name()
                    .map(|n| n.to_os_string())
                    .unwrap_or_else(|| root.as_os_str().to_os_string());
                return Some(Ok(WalkEntry {
                    path: root,
                    name,
                    kind,
                }));
            }
        }

        loop {
            let (dir, depth, entry) = {
                let frame = self.stack.last_mut()?;
                match frame.entries.next() {
                    None => {
                        self.stack.pop();
                        continue;
                    }
                    Some(Err(e)) => return Some(Err(e)),
                    Some(Ok(entry)) => (frame.dir.clone(), frame.depth, entry),
                }
            };

            let path = dir.join(&entry.name);
            let kind = match self.effective_kind(&path, entry.kind) {
                Ok(kind) => kind,
                Err(e) => return Some(Err(e)),
            };

            if kind == FileKind::Dir && depth < self.options.max_depth {
                match self.fs.read_dir(&path) {
                    Ok(entries) => self.stack.push(Frame {
                        dir: path.clone(),
                        depth: depth + 1,
                        entries,
                    }),
                    Err(e) => return Some(Err(e)),
                }
            }

            if wants(&self.options, kind) {
                return Some(Ok(WalkEntry {
                    path,
                    name: entry.name,
                    kind,
                }));
            }
        }
    }
}
