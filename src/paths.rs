//! Lexical path comparison for the move guard.
//! Everything here works on path segments only: no symlink resolution, no
//! filesystem access, so the checks hold for paths that do not exist yet.

use std::path::{Component, Path, PathBuf};

/// Resolve `.` and `..` segment-wise without touching the filesystem.
/// `..` at the root stays at the root; a leading `..` on a relative path is
/// kept, since there is nothing lexical to pop.
pub(crate) fn normalize_lexical(path: &Path) -> PathBuf {
    let mut out: Vec<Component<'_>> = Vec::new();
    for comp in path.components() {
        match comp {
            Component::CurDir => {}
            Component::ParentDir => match out.last() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(comp),
            },
            other => out.push(other),
        }
    }
    out.iter().map(|c| c.as_os_str()).collect()
}

/// True when `dest` is lexically equal to `src` or a descendant of it
/// (`src` followed by a path separator). Component-wise, so `/tmp/ab` is
/// not inside `/tmp/a`.
pub(crate) fn is_same_or_inside(src: &Path, dest: &Path) -> bool {
    let src = normalize_lexical(src);
    let dest = normalize_lexical(dest);
    dest.starts_with(&src)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_resolves_dot_segments() {
        assert_eq!(
            normalize_lexical(Path::new("/tmp/./a/b/../c")),
            PathBuf::from("/tmp/a/c")
        );
        assert_eq!(normalize_lexical(Path::new("/..")), PathBuf::from("/"));
        assert_eq!(normalize_lexical(Path::new("../x")), PathBuf::from("../x"));
    }

    #[test]
    fn inside_detects_self_and_descendants() {
        assert!(is_same_or_inside(Path::new("/tmp/a"), Path::new("/tmp/a")));
        assert!(is_same_or_inside(Path::new("/tmp/a"), Path::new("/tmp/a/b/c")));
        assert!(is_same_or_inside(
            Path::new("/tmp/a"),
            Path::new("/tmp/a/x/../b")
        ));
    }

    #[test]
    fn sibling_with_common_prefix_is_outside() {
        assert!(!is_same_or_inside(Path::new("/tmp/a"), Path::new("/tmp/ab")));
        assert!(!is_same_or_inside(Path::new("/tmp/a"), Path::new("/tmp/b/a")));
        // `..` escapes the source subtree lexically.
        assert!(!is_same_or_inside(
            Path::new("/tmp/a"),
            Path::new("/tmp/a/../b")
        ));
    }
}
