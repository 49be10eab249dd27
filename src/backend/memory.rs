//! Deterministic in-memory backend.
//!
//! Lets the copy/move/walk algorithms run against a synthetic tree without
//! touching a real filesystem. Semantics mirror [`OsFileSystem`] closely
//! enough for the engines: parents must exist, non-recursive remove refuses
//! populated directories, `rename` moves whole subtrees. Use absolute paths;
//! keys are lexically normalized.
//!
//! `simulate_cross_device_rename` makes every `rename` fail with an
//! unclassified error, which is how the move engine's copy+remove fallback
//! is exercised without two real mounts.

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::time::SystemTime;

use crate::errors::{FsError, Result};
use crate::info::{DirEntry, FileInfo, FileKind};
use crate::paths::normalize_lexical;

use super::{DirEntries, FileSystem, TempOptions};

const MAX_LINK_HOPS: usize = 16;

#[derive(Debug, Clone, Copy)]
struct Times {
    accessed: SystemTime,
    modified: SystemTime,
    created: SystemTime,
}

impl Times {
    fn now() -> Self {
        let t = SystemTime::now();
        Self {
            accessed: t,
            modified: t,
            created: t,
        }
    }
}

#[derive(Debug, Clone)]
enum Node {
    File { data: Vec<u8>, times: Times },
    Dir { times: Times },
    Symlink { target: PathBuf },
}

#[derive(Debug)]
struct State {
    nodes: BTreeMap<PathBuf, Node>,
    temp_seq: u64,
    cross_device_renames: bool,
}

/// In-memory filesystem rooted at `/`.
#[derive(Debug)]
pub struct MemoryFileSystem {
    state: Mutex<State>,
}

impl Default for MemoryFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryFileSystem {
    pub fn new() -> Self {
        let mut nodes = BTreeMap::new();
        nodes.insert(PathBuf::from("/"), Node::Dir { times: Times::now() });
        Self {
            state: Mutex::new(State {
                nodes,
                temp_seq: 0,
                cross_device_renames: false,
            }),
        }
    }

    /// When enabled, every `rename` fails with an unclassified error the
    /// way a cross-filesystem rename does on a real OS.
    pub fn simulate_cross_device_rename(&self, enabled: bool) {
        self.state_mut().cross_device_renames = enabled;
    }

    fn state_mut(&self) -> MutexGuard<'_, State> {
        // A poisoned lock only means another test thread panicked; the map
        // itself is still usable.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn too_many_links(path: &Path) -> FsError {
    FsError::Io {
        op: "resolve symlink",
        path: path.to_path_buf(),
        source: io::Error::other("too many levels of symbolic links"),
    }
}

fn not_empty(path: &Path) -> FsError {
    FsError::Io {
        op: "remove",
        path: path.to_path_buf(),
        source: io::Error::other("directory not empty"),
    }
}

fn info_of(node: &Node) -> FileInfo {
    let (kind, size, times) = match node {
        Node::File { data, times } => (FileKind::File, data.len() as u64, Some(*times)),
        Node::Dir { times } => (FileKind::Dir, 0, Some(*times)),
        Node::Symlink { target } => (FileKind::Symlink, target.as_os_str().len() as u64, None),
    };
    FileInfo {
        kind,
        size,
        modified: times.map(|t| t.modified),
        accessed: times.map(|t| t.accessed),
        created: times.map(|t| t.created),
        mode: None,
        uid: None,
        gid: None,
        nlink: None,
        dev: None,
        ino: None,
    }
}

impl State {
    /// Follow symlinks until a non-link key (existing or not) is reached.
    fn resolve(&self, path: &Path) -> Result<PathBuf> {
        let mut cur = normalize_lexical(path);
        for _ in 0..MAX_LINK_HOPS {
            match self.nodes.get(&cur) {
                Some(Node::Symlink { target }) => {
                    cur = if target.is_absolute() {
                        normalize_lexical(target)
                    } else {
                        let base = cur.parent().unwrap_or_else(|| Path::new("/"));
                        normalize_lexical(&base.join(target))
                    };
                }
                _ => return Ok(cur),
            }
        }
        Err(too_many_links(path))
    }

    fn require_parent_dir(&self, key: &Path) -> Result<()> {
        let Some(parent) = key.parent() else {
            return Ok(());
        };
        match self.nodes.get(parent) {
            Some(Node::Dir { .. }) => Ok(()),
            Some(_) => Err(FsError::NotADirectory(parent.to_path_buf())),
            None => Err(FsError::NotFound(parent.to_path_buf())),
        }
    }

    fn has_children(&self, key: &Path) -> bool {
        self.nodes.keys().any(|k| k.parent() == Some(key))
    }

    fn subtree_keys(&self, key: &Path) -> Vec<PathBuf> {
        self.nodes
            .keys()
            .filter(|k| k.starts_with(key))
            .cloned()
            .collect()
    }
}

impl FileSystem for MemoryFileSystem {
    fn stat(&self, path: &Path) -> Result<FileInfo> {
        let st = self.state_mut();
        let key = st.resolve(path)?;
        match st.nodes.get(&key) {
            Some(node) => Ok(info_of(node)),
            None => Err(FsError::NotFound(path.to_path_buf())),
        }
    }

    fn lstat(&self, path: &Path) -> Result<FileInfo> {
        let st = self.state_mut();
        match st.nodes.get(&normalize_lexical(path)) {
            Some(node) => Ok(info_of(node)),
            None => Err(FsError::NotFound(path.to_path_buf())),
        }
    }

    fn read_file(&self, path: &Path) -> Result<Vec<u8>> {
        let st = self.state_mut();
        let key = st.resolve(path)?;
        match st.nodes.get(&key) {
            Some(Node::File { data, .. }) => Ok(data.clone()),
            Some(_) => Err(FsError::IsADirectory(path.to_path_buf())),
            None => Err(FsError::NotFound(path.to_path_buf())),
        }
    }

    fn write_file(&self, path: &Path, data: &[u8]) -> Result<()> {
        let mut st = self.state_mut();
        let key = st.resolve(path)?;
        match st.nodes.get_mut(&key) {
            Some(Node::File {
                data: existing,
                times,
            }) => {
                *existing = data.to_vec();
                times.modified = SystemTime::now();
                Ok(())
            }
            Some(_) => Err(FsError::IsADirectory(path.to_path_buf())),
            None => {
                st.require_parent_dir(&key)?;
                st.nodes.insert(
                    key,
                    Node::File {
                        data: data.to_vec(),
                        times: Times::now(),
                    },
                );
                Ok(())
            }
        }
    }

    fn copy_file(&self, src: &Path, dest: &Path) -> Result<()> {
        let mut st = self.state_mut();
        let src_key = st.resolve(src)?;
        let data = match st.nodes.get(&src_key) {
            Some(Node::File { data, .. }) => data.clone(),
            Some(_) => return Err(FsError::IsADirectory(src.to_path_buf())),
            None => return Err(FsError::NotFound(src.to_path_buf())),
        };
        let dest_key = st.resolve(dest)?;
        if let Some(Node::Dir { .. }) = st.nodes.get(&dest_key) {
            return Err(FsError::IsADirectory(dest.to_path_buf()));
        }
        st.require_parent_dir(&dest_key)?;
        st.nodes.insert(
            dest_key,
            Node::File {
                data,
                times: Times::now(),
            },
        );
        Ok(())
    }

    fn make_dir(&self, path: &Path, recursive: bool) -> Result<()> {
        let mut st = self.state_mut();
        let key = normalize_lexical(path);
        if recursive {
            let ancestors: Vec<PathBuf> = {
                let mut v: Vec<PathBuf> = key.ancestors().map(Path::to_path_buf).collect();
                v.reverse();
                v
            };
            for a in ancestors {
                if a.as_os_str().is_empty() {
                    continue;
                }
                match st.nodes.get(&a) {
                    Some(Node::Dir { .. }) => {}
                    Some(_) if a == key => return Err(FsError::AlreadyExists(a)),
                    Some(_) => return Err(FsError::NotADirectory(a)),
                    None => {
                        st.nodes.insert(a, Node::Dir { times: Times::now() });
                    }
                }
            }
            Ok(())
        } else {
            st.require_parent_dir(&key)?;
            if st.nodes.contains_key(&key) {
                return Err(FsError::AlreadyExists(path.to_path_buf()));
            }
            st.nodes.insert(key, Node::Dir { times: Times::now() });
            Ok(())
        }
    }

    fn remove(&self, path: &Path, recursive: bool) -> Result<()> {
        let mut st = self.state_mut();
        let key = normalize_lexical(path);
        match st.nodes.get(&key) {
            Some(Node::Dir { .. }) => {
                if recursive {
                    for k in st.subtree_keys(&key) {
                        st.nodes.remove(&k);
                    }
                } else {
                    if st.has_children(&key) {
                        return Err(not_empty(path));
                    }
                    st.nodes.remove(&key);
                }
                Ok(())
            }
            Some(_) => {
                st.nodes.remove(&key);
                Ok(())
            }
            None => Err(FsError::NotFound(path.to_path_buf())),
        }
    }

    fn rename(&self, src: &Path, dest: &Path) -> Result<()> {
        let mut st = self.state_mut();
        if st.cross_device_renames {
            return Err(FsError::Io {
                op: "rename",
                path: src.to_path_buf(),
                source: io::Error::other("cross-device link (simulated)"),
            });
        }
        let src_key = normalize_lexical(src);
        if !st.nodes.contains_key(&src_key) {
            return Err(FsError::NotFound(src.to_path_buf()));
        }
        let dest_key = normalize_lexical(dest);
        st.require_parent_dir(&dest_key)?;
        match st.nodes.get(&dest_key) {
            Some(Node::Dir { .. }) => {
                return Err(FsError::AlreadyExists(dest.to_path_buf()));
            }
            Some(_) => {
                st.nodes.remove(&dest_key);
            }
            None => {}
        }
        let moved: Vec<(PathBuf, Node)> = st
            .subtree_keys(&src_key)
            .into_iter()
            .filter_map(|k| {
                let node = st.nodes.remove(&k)?;
                let rel = k.strip_prefix(&src_key).ok()?.to_path_buf();
                let new_key = if rel.as_os_str().is_empty() {
                    dest_key.clone()
                } else {
                    dest_key.join(rel)
                };
                Some((new_key, node))
            })
            .collect();
        for (k, node) in moved {
            st.nodes.insert(k, node);
        }
        Ok(())
    }

    fn symlink(&self, target: &Path, link: &Path) -> Result<()> {
        let mut st = self.state_mut();
        let key = normalize_lexical(link);
        st.require_parent_dir(&key)?;
        if st.nodes.contains_key(&key) {
            return Err(FsError::AlreadyExists(link.to_path_buf()));
        }
        st.nodes.insert(
            key,
            Node::Symlink {
                // Stored verbatim so a copied link points at the same text.
                target: target.to_path_buf(),
            },
        );
        Ok(())
    }

    fn read_link(&self, path: &Path) -> Result<PathBuf> {
        let st = self.state_mut();
        match st.nodes.get(&normalize_lexical(path)) {
            Some(Node::Symlink { target }) => Ok(target.clone()),
            Some(_) => Err(FsError::Io {
                op: "read link",
                path: path.to_path_buf(),
                source: io::Error::other("not a symlink"),
            }),
            None => Err(FsError::NotFound(path.to_path_buf())),
        }
    }

    fn hard_link(&self, src: &Path, dest: &Path) -> Result<()> {
        let mut st = self.state_mut();
        let src_key = st.resolve(src)?;
        let data = match st.nodes.get(&src_key) {
            Some(Node::File { data, .. }) => data.clone(),
            Some(_) => return Err(FsError::IsADirectory(src.to_path_buf())),
            None => return Err(FsError::NotFound(src.to_path_buf())),
        };
        let dest_key = normalize_lexical(dest);
        st.require_parent_dir(&dest_key)?;
        if st.nodes.contains_key(&dest_key) {
            return Err(FsError::AlreadyExists(dest.to_path_buf()));
        }
        // Contents are duplicated; link identity is not modeled.
        st.nodes.insert(
            dest_key,
            Node::File {
                data,
                times: Times::now(),
            },
        );
        Ok(())
    }

    fn set_file_times(
        &self,
        path: &Path,
        accessed: SystemTime,
        modified: SystemTime,
    ) -> Result<()> {
        let mut st = self.state_mut();
        let key = st.resolve(path)?;
        match st.nodes.get_mut(&key) {
            Some(Node::File { times, .. }) | Some(Node::Dir { times }) => {
                times.accessed = accessed;
                times.modified = modified;
                Ok(())
            }
            Some(Node::Symlink { .. }) => Ok(()),
            None => Err(FsError::NotFound(path.to_path_buf())),
        }
    }

    fn read_dir(&self, path: &Path) -> Result<DirEntries<'_>> {
        let st = self.state_mut();
        let key = st.resolve(path)?;
        match st.nodes.get(&key) {
            Some(Node::Dir { .. }) => {}
            Some(_) => return Err(FsError::NotADirectory(path.to_path_buf())),
            None => return Err(FsError::NotFound(path.to_path_buf())),
        }
        let entries: Vec<DirEntry> = st
            .nodes
            .iter()
            .filter(|(k, _)| k.parent() == Some(key.as_path()))
            .map(|(k, node)| DirEntry {
                name: k.file_name().unwrap_or_default().to_os_string(),
                kind: info_of(node).kind,
            })
            .collect();
        Ok(Box::new(entries.into_iter().map(Ok)))
    }

    fn make_temp_dir(&self, options: &TempOptions) -> Result<PathBuf> {
        let path = self.alloc_temp_path(options)?;
        self.make_dir(&path, false)?;
        Ok(path)
    }

    fn make_temp_file(&self, options: &TempOptions) -> Result<PathBuf> {
        let path = self.alloc_temp_path(options)?;
        self.write_file(&path, &[])?;
        Ok(path)
    }
}

impl MemoryFileSystem {
    fn alloc_temp_path(&self, options: &TempOptions) -> Result<PathBuf> {
        let parent = options
            .dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("/tmp"));
        self.make_dir(&parent, true)?;
        let mut st = self.state_mut();
        st.temp_seq += 1;
        let name = format!(
            "{}{:08x}{}",
            options.prefix.as_deref().unwrap_or(""),
            st.temp_seq,
            options.suffix.as_deref().unwrap_or("")
        );
        Ok(normalize_lexical(&parent.join(name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> MemoryFileSystem {
        let fs = MemoryFileSystem::new();
        fs.make_dir(Path::new("/src/sub"), true).unwrap();
        fs.write_file(Path::new("/src/a.txt"), b"alpha").unwrap();
        fs.write_file(Path::new("/src/sub/b.txt"), b"beta").unwrap();
        fs
    }

    #[test]
    fn listing_is_single_level_and_sorted() {
        let fs = fixture();
        let names: Vec<_> = fs
            .read_dir(Path::new("/src"))
            .unwrap()
            .map(|e| e.unwrap().name.to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.txt", "sub"]);
    }

    #[test]
    fn rename_carries_the_subtree() {
        let fs = fixture();
        fs.rename(Path::new("/src"), Path::new("/moved")).unwrap();
        assert!(fs.lstat(Path::new("/src")).unwrap_err().is_not_found());
        assert_eq!(fs.read_file(Path::new("/moved/sub/b.txt")).unwrap(), b"beta");
    }

    #[test]
    fn simulated_cross_device_rename_is_unclassified() {
        let fs = fixture();
        fs.simulate_cross_device_rename(true);
        let err = fs.rename(Path::new("/src"), Path::new("/dst")).unwrap_err();
        assert!(err.is_unclassified());
        // Tree untouched.
        assert_eq!(fs.read_file(Path::new("/src/a.txt")).unwrap(), b"alpha");
    }

    #[test]
    fn stat_follows_symlinks_lstat_does_not() {
        let fs = fixture();
        fs.symlink(Path::new("/src/a.txt"), Path::new("/link"))
            .unwrap();
        assert_eq!(fs.lstat(Path::new("/link")).unwrap().kind, FileKind::Symlink);
        assert_eq!(fs.stat(Path::new("/link")).unwrap().kind, FileKind::File);
        assert_eq!(fs.read_file(Path::new("/link")).unwrap(), b"alpha");
    }

    #[test]
    fn symlink_loop_errors_out() {
        let fs = MemoryFileSystem::new();
        fs.symlink(Path::new("/b"), Path::new("/a")).unwrap();
        fs.symlink(Path::new("/a"), Path::new("/b")).unwrap();
        let err = fs.stat(Path::new("/a")).unwrap_err();
        assert!(err.is_unclassified());
    }

    #[test]
    fn non_recursive_make_dir_needs_parent() {
        let fs = MemoryFileSystem::new();
        let err = fs.make_dir(Path::new("/a/b"), false).unwrap_err();
        assert!(err.is_not_found());
        fs.make_dir(Path::new("/a/b"), true).unwrap();
        let err = fs.make_dir(Path::new("/a/b"), false).unwrap_err();
        assert!(err.is_already_exists());
    }

    #[test]
    fn temp_paths_are_unique_and_created() {
        let fs = MemoryFileSystem::new();
        let opts = TempOptions {
            dir: Some(PathBuf::from("/scratch")),
            prefix: Some("job_".into()),
            suffix: Some(".d".into()),
        };
        let a = fs.make_temp_dir(&opts).unwrap();
        let b = fs.make_temp_dir(&opts).unwrap();
        assert_ne!(a, b);
        assert!(fs.lstat(&a).unwrap().is_dir());
        let name = a.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("job_") && name.ends_with(".d"));
    }
}
