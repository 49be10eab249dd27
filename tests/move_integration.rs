use std::fs;
use std::io::Write;
use std::path::Path;

use crossfs::{FileSystem, FsError, MemoryFileSystem, MoveOptions, OsFileSystem, move_entry};
use tempfile::tempdir;

/// Create a file with the given content and fsync it (reduces test flakiness).
fn write_file(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent dirs");
    }
    let mut f = fs::File::create(path).expect("create file");
    write!(f, "{}", contents).expect("write content");
    f.sync_all().expect("sync file");
}

/// Same-filesystem directory move: source disappears, content arrives.
#[test]
fn move_dir_same_filesystem() -> Result<(), Box<dyn std::error::Error>> {
    let td = tempdir()?;
    let src = td.path().join("a");
    write_file(&src.join("file.txt"), "hello");

    let fs_backend = OsFileSystem::new();
    let dest = td.path().join("b");
    move_entry(&fs_backend, &src, &dest, &MoveOptions::default())?;

    assert!(!src.exists(), "source should be gone");
    assert_eq!(fs::read_to_string(dest.join("file.txt"))?, "hello");
    Ok(())
}

#[test]
fn move_missing_source_is_not_found() {
    let td = tempdir().unwrap();
    let fs_backend = OsFileSystem::new();
    let err = move_entry(
        &fs_backend,
        &td.path().join("ghost"),
        &td.path().join("dest"),
        &MoveOptions::default(),
    )
    .unwrap_err();
    assert!(err.is_not_found());
}

/// Occupied destination without overwrite: fails, source untouched.
#[test]
fn move_refuses_existing_destination_without_overwrite()
-> Result<(), Box<dyn std::error::Error>> {
    let td = tempdir()?;
    let src = td.path().join("a");
    write_file(&src.join("file.txt"), "hello");
    let dest = td.path().join("b");
    write_file(&dest, "occupied");

    let fs_backend = OsFileSystem::new();
    let err = move_entry(&fs_backend, &src, &dest, &MoveOptions::default()).unwrap_err();
    assert!(err.is_already_exists(), "got: {err}");
    assert_eq!(fs::read_to_string(src.join("file.txt"))?, "hello");
    assert_eq!(fs::read_to_string(&dest)?, "occupied");

    move_entry(&fs_backend, &src, &dest, &MoveOptions { overwrite: true })?;
    assert!(!src.exists());
    assert_eq!(fs::read_to_string(dest.join("file.txt"))?, "hello");
    Ok(())
}

/// Moving into the source's own subtree is rejected before anything is
/// mutated, for the source itself and for descendants.
#[test]
fn move_into_own_subtree_is_rejected() -> Result<(), Box<dyn std::error::Error>> {
    let td = tempdir()?;
    let src = td.path().join("a");
    write_file(&src.join("file.txt"), "hello");

    let fs_backend = OsFileSystem::new();
    for dest in [src.clone(), src.join("sub"), src.join("sub/deeper")] {
        let err = move_entry(&fs_backend, &src, &dest, &MoveOptions::default()).unwrap_err();
        assert!(
            matches!(err, FsError::SubdirectoryMove { .. }),
            "dest {} gave {err}",
            dest.display()
        );
    }
    // Source is intact and no destination appeared.
    assert_eq!(fs::read_to_string(src.join("file.txt"))?, "hello");
    assert!(!src.join("sub").exists());
    Ok(())
}

/// Single-file move.
#[test]
fn move_single_file() -> Result<(), Box<dyn std::error::Error>> {
    let td = tempdir()?;
    let src = td.path().join("report.pdf");
    write_file(&src, "pdfdata");

    let fs_backend = OsFileSystem::new();
    let dest = td.path().join("archive").join("report.pdf");
    fs::create_dir_all(dest.parent().unwrap())?;
    move_entry(&fs_backend, &src, &dest, &MoveOptions::default())?;

    assert!(!src.exists());
    assert_eq!(fs::read_to_string(&dest)?, "pdfdata");
    Ok(())
}

/// Fixture-based variant of the file happy path.
#[test]
fn move_file_into_prepared_directory() {
    use assert_fs::prelude::*;

    let temp = assert_fs::TempDir::new().unwrap();
    let src = temp.child("incoming").child("a.txt");
    src.write_str("hello").unwrap();
    let dest_dir = temp.child("completed");
    dest_dir.create_dir_all().unwrap();
    let dest = dest_dir.child("a.txt");

    let fs_backend = OsFileSystem::new();
    move_entry(&fs_backend, src.path(), dest.path(), &MoveOptions::default()).unwrap();

    dest.assert("hello");
    assert!(!src.path().exists());
}

/// Cross-device moves fall back to copy+remove; exercised through the
/// in-memory backend's simulated EXDEV so no second mount is needed.
#[test]
fn cross_device_move_falls_back_to_copy() {
    let mem = MemoryFileSystem::new();
    mem.make_dir(Path::new("/data/set/sub"), true).unwrap();
    mem.write_file(Path::new("/data/set/one.bin"), b"1111").unwrap();
    mem.write_file(Path::new("/data/set/sub/two.bin"), b"2222").unwrap();
    mem.simulate_cross_device_rename(true);

    move_entry(
        &mem,
        Path::new("/data/set"),
        Path::new("/backup/set"),
        &MoveOptions::default(),
    )
    .unwrap();

    assert!(mem.lstat(Path::new("/data/set")).unwrap_err().is_not_found());
    assert_eq!(mem.read_file(Path::new("/backup/set/one.bin")).unwrap(), b"1111");
    assert_eq!(
        mem.read_file(Path::new("/backup/set/sub/two.bin")).unwrap(),
        b"2222"
    );
}
