use dupclean::duplicates::analyze_result;
use dupclean::scanner::{MaxDepth, ScanConfig, ScanError, ScanStrategy, Scanner, WalkError};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::tempdir;

fn scan(config: ScanConfig, strategy: ScanStrategy) -> dupclean::scanner::ScanResult {
    Scanner::new(Arc::new(config))
        .scan_with(strategy)
        .cloned()
        .unwrap()
}

const STRATEGIES: [ScanStrategy; 2] = [
    ScanStrategy::Sequential,
    ScanStrategy::Concurrent { workers: 4 },
];

fn hello_world_tree(root: &Path) {
    fs::write(root.join("a.txt"), "hello").unwrap();
    fs::write(root.join("b.txt"), "hello").unwrap();
    fs::write(root.join("c.txt"), "world").unwrap();
}

#[test]
fn test_scan_empty_directory() {
    let dir = tempdir().unwrap();
    for strategy in STRATEGIES {
        let result = scan(ScanConfig::new(dir.path()), strategy);
        assert!(result.is_empty());
        assert!(!analyze_result(&result).has_duplicates());
    }
}

#[test]
fn test_hello_world_scenario() {
    let dir = tempdir().unwrap();
    hello_world_tree(dir.path());

    for strategy in STRATEGIES {
        let result = scan(ScanConfig::new(dir.path()), strategy);
        assert_eq!(result.len(), 3);

        let fp = |name: &str| {
            result
                .records()
                .iter()
                .find(|r| r.path.ends_with(name))
                .map(|r| r.fingerprint.clone())
                .unwrap()
        };
        assert_eq!(fp("a.txt"), fp("b.txt"));
        assert_ne!(fp("a.txt"), fp("c.txt"));
        assert_eq!(fp("a.txt").as_str(), "5d41402abc4b2a76b9719d911017c592");

        let analysis = analyze_result(&result);
        assert_eq!(analysis.groups.len(), 1);
        assert_eq!(analysis.groups[0].len(), 2);
        assert_eq!(analysis.duplicate_files, 1);
    }
}

#[test]
fn test_exclusion_scenario() {
    let dir = tempdir().unwrap();
    hello_world_tree(dir.path());

    for strategy in STRATEGIES {
        let config = ScanConfig::new(dir.path()).with_excluded_extensions([".txt"]);
        let result = scan(config, strategy);
        assert!(result.is_empty());
    }
}

#[test]
fn test_exclusion_is_case_insensitive() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("photo.JPG"), "x").unwrap();
    fs::write(dir.path().join("photo.jpg.txt"), "x").unwrap();

    let config = ScanConfig::new(dir.path()).with_excluded_extensions(["jpg"]);
    let result = scan(config, ScanStrategy::Sequential);

    assert_eq!(result.len(), 1);
    assert!(result.records()[0].path.ends_with("photo.jpg.txt"));
}

#[test]
fn test_depth_boundary() {
    let dir = tempdir().unwrap();
    // a.txt at depth 1, one/b.txt at depth 2, one/two/c.txt at depth 3
    fs::create_dir_all(dir.path().join("one/two")).unwrap();
    fs::write(dir.path().join("a.txt"), "1").unwrap();
    fs::write(dir.path().join("one/b.txt"), "2").unwrap();
    fs::write(dir.path().join("one/two/c.txt"), "3").unwrap();

    for strategy in STRATEGIES {
        for (max, expected) in [(0, 0), (1, 1), (2, 2), (3, 3), (10, 3)] {
            let config = ScanConfig::new(dir.path()).with_max_depth(MaxDepth::Limited(max));
            assert_eq!(scan(config, strategy).len(), expected, "max depth {max}");
        }
        let unlimited = ScanConfig::new(dir.path()).with_max_depth(MaxDepth::Unlimited);
        assert_eq!(scan(unlimited, strategy).len(), 3);
    }
}

#[test]
fn test_nested_duplicates_across_directories() {
    let dir = tempdir().unwrap();
    fs::create_dir_all(dir.path().join("x/y")).unwrap();
    fs::create_dir_all(dir.path().join("z")).unwrap();
    fs::write(dir.path().join("x/y/report.pdf"), "same bytes").unwrap();
    fs::write(dir.path().join("z/copy of report.pdf"), "same bytes").unwrap();
    fs::write(dir.path().join("readme"), "other").unwrap();

    let result = scan(ScanConfig::new(dir.path()), ScanStrategy::Sequential);
    let analysis = analyze_result(&result);

    assert_eq!(result.len(), 3);
    assert_eq!(analysis.groups.len(), 1);
    assert_eq!(analysis.wasted_space(), 10);
}

#[test]
fn test_no_path_appears_twice() {
    let dir = tempdir().unwrap();
    for i in 0..30 {
        let sub = dir.path().join(format!("d{}", i % 5));
        fs::create_dir_all(&sub).unwrap();
        fs::write(sub.join(format!("f{i}")), format!("{}", i % 7)).unwrap();
    }

    for strategy in STRATEGIES {
        let result = scan(ScanConfig::new(dir.path()), strategy);
        let mut paths = result.sorted_paths();
        let total = paths.len();
        paths.dedup();
        assert_eq!(paths.len(), total);
        assert_eq!(total, 30);
    }
}

#[test]
fn test_missing_root_fails() {
    let dir = tempdir().unwrap();
    let mut scanner = Scanner::new(Arc::new(ScanConfig::new(dir.path().join("absent"))));

    assert!(matches!(
        scanner.scan(),
        Err(ScanError::Walk(WalkError::RootNotFound(_)))
    ));
}

#[test]
fn test_file_root_fails() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("plain.txt");
    fs::write(&file, "x").unwrap();

    let mut scanner = Scanner::new(Arc::new(ScanConfig::new(&file)));
    assert!(matches!(
        scanner.scan(),
        Err(ScanError::Walk(WalkError::RootNotADirectory(_)))
    ));
}

#[test]
fn test_repeated_scans_do_not_accumulate() {
    let dir = tempdir().unwrap();
    hello_world_tree(dir.path());

    let mut scanner = Scanner::new(Arc::new(ScanConfig::new(dir.path())));
    for _ in 0..3 {
        assert_eq!(scanner.scan().unwrap().len(), 3);
    }
    fs::write(dir.path().join("d.txt"), "new").unwrap();
    assert_eq!(scanner.scan().unwrap().len(), 4);
}
