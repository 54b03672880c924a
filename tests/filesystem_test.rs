//! Tests for the real FileSystem implementation

use std::fs;
use std::io::Write;

use tempfile::TempDir;

use dynsky::infrastructure::traits::{FileSystem, RealFileSystem};

#[test]
fn given_missing_parent_when_create_then_creates_directories() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let target = temp.path().join("a/b/out.txt");
    let fs = RealFileSystem;

    // Act
    {
        let mut writer = fs.create(&target).unwrap();
        writeln!(writer, "0 1").unwrap();
        writer.flush().unwrap();
    }

    // Assert
    assert!(fs.exists(&target));
    assert_eq!(fs.read_to_string(&target).unwrap(), "0 1\n");
}

#[test]
fn given_existing_file_when_create_then_truncates() {
    let temp = TempDir::new().unwrap();
    let target = temp.path().join("out.txt");
    let fs = RealFileSystem;
    fs.write(&target, "stale content\n").unwrap();

    drop(fs.create(&target).unwrap());

    assert_eq!(fs::read_to_string(&target).unwrap(), "");
}

#[test]
fn given_bare_file_name_when_ensure_parent_then_is_noop() {
    let fs = RealFileSystem;

    assert!(fs.ensure_parent(std::path::Path::new("small.out")).is_ok());
}
