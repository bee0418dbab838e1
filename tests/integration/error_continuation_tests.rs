use dupclean::scanner::{
    EntryError, FileHasher, FileReadError, Fingerprint, Hasher, ScanConfig, ScanStrategy, Scanner,
};
use std::fs;
use std::io;
use std::path::Path;
use std::sync::Arc;
use tempfile::tempdir;

/// Deletes `victim` right before it is hashed, like a file vanishing mid-scan.
struct VanishingHasher {
    victim: &'static str,
    inner: Hasher,
}

impl FileHasher for VanishingHasher {
    fn fingerprint(&self, path: &Path) -> Result<(Fingerprint, u64), FileReadError> {
        if path.file_name().is_some_and(|n| n == self.victim) {
            let _ = fs::remove_file(path);
        }
        self.inner.fingerprint(path)
    }
}

/// Refuses to read `locked` with a permission error.
struct LockedHasher {
    locked: &'static str,
}

impl FileHasher for LockedHasher {
    fn fingerprint(&self, path: &Path) -> Result<(Fingerprint, u64), FileReadError> {
        if path.file_name().is_some_and(|n| n == self.locked) {
            return Err(FileReadError::new(
                path,
                io::Error::new(io::ErrorKind::PermissionDenied, "permission denied"),
            ));
        }
        Hasher::new().fingerprint(path)
    }
}

fn hello_world_tree(root: &Path) {
    fs::write(root.join("a.txt"), "hello").unwrap();
    fs::write(root.join("b.txt"), "hello").unwrap();
    fs::write(root.join("c.txt"), "world").unwrap();
}

#[test]
fn test_file_unreadable_mid_scan_is_reported() {
    for strategy in [ScanStrategy::Sequential, ScanStrategy::Concurrent { workers: 3 }] {
        let dir = tempdir().unwrap();
        hello_world_tree(dir.path());

        let mut scanner = Scanner::new(Arc::new(ScanConfig::new(dir.path()))).with_hasher(Arc::new(
            VanishingHasher {
                victim: "b.txt",
                inner: Hasher::new(),
            },
        ));
        let result = scanner.scan_with(strategy).unwrap();

        let mut names: Vec<_> = result
            .records()
            .iter()
            .map(|r| r.path.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        names.sort();
        assert_eq!(names, vec!["a.txt", "c.txt"]);

        assert_eq!(result.errors().len(), 1);
        match &result.errors()[0] {
            EntryError::Read(err) => {
                assert!(err.path.ends_with("b.txt"));
                assert_eq!(err.kind(), io::ErrorKind::NotFound);
            }
            other => panic!("expected a read error, got {other:?}"),
        }
    }
}

#[test]
fn test_permission_error_keeps_path_and_cause() {
    let dir = tempdir().unwrap();
    hello_world_tree(dir.path());

    let mut scanner = Scanner::new(Arc::new(ScanConfig::new(dir.path())))
        .with_hasher(Arc::new(LockedHasher { locked: "c.txt" }));
    let result = scanner.scan().unwrap();

    assert_eq!(result.len(), 2);
    assert!(result.has_errors());
    let message = result.errors()[0].to_string();
    assert!(message.contains("c.txt"));
    assert!(message.contains("permission denied"));
}

#[test]
fn test_duplicates_still_counted_with_errors() {
    let dir = tempdir().unwrap();
    hello_world_tree(dir.path());
    fs::write(dir.path().join("d.txt"), "hello").unwrap();

    let mut scanner = Scanner::new(Arc::new(ScanConfig::new(dir.path())))
        .with_hasher(Arc::new(LockedHasher { locked: "b.txt" }));
    let result = scanner.scan().unwrap();
    let analysis = dupclean::duplicates::analyze_result(result);

    assert_eq!(analysis.duplicate_files, 1);
    assert_eq!(analysis.groups[0].len(), 2);
}

#[cfg(unix)]
#[test]
fn test_unreadable_subdirectory_is_skipped() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempdir().unwrap();
    hello_world_tree(dir.path());
    let locked = dir.path().join("locked");
    fs::create_dir(&locked).unwrap();
    fs::write(locked.join("hidden.txt"), "secret").unwrap();
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

    // Privileged users can still list the directory.
    if fs::read_dir(&locked).is_ok() {
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
        return;
    }

    for strategy in [ScanStrategy::Sequential, ScanStrategy::Concurrent { workers: 2 }] {
        let mut scanner = Scanner::new(Arc::new(ScanConfig::new(dir.path())));
        let result = scanner.scan_with(strategy).unwrap();

        assert_eq!(result.len(), 3);
        assert_eq!(result.errors().len(), 1);
        assert!(matches!(result.errors()[0], EntryError::Walk(_)));
    }

    fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
}

#[cfg(unix)]
#[test]
fn test_unreadable_file_is_reported() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempdir().unwrap();
    hello_world_tree(dir.path());
    let b = dir.path().join("b.txt");
    fs::set_permissions(&b, fs::Permissions::from_mode(0o000)).unwrap();

    if fs::read(&b).is_ok() {
        fs::set_permissions(&b, fs::Permissions::from_mode(0o644)).unwrap();
        return;
    }

    let mut scanner = Scanner::new(Arc::new(ScanConfig::new(dir.path())));
    let result = scanner.scan().unwrap();
    assert_eq!(result.len(), 2);
    assert_eq!(result.errors().len(), 1);
    assert!(result.errors()[0].path().ends_with("b.txt"));

    fs::set_permissions(&b, fs::Permissions::from_mode(0o644)).unwrap();
}
