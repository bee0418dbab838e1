use dupclean::duplicates::analyze_result;
use dupclean::scanner::{FileRecord, ScanConfig, ScanStrategy, Scanner};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::tempdir;

fn build_tree(root: &Path) {
    for d in 0..6 {
        let sub = root.join(format!("dir{d}/inner"));
        fs::create_dir_all(&sub).unwrap();
        for f in 0..8 {
            let content = format!("content-{}", (d * 8 + f) % 11);
            fs::write(root.join(format!("dir{d}/f{f}.dat")), &content).unwrap();
            fs::write(sub.join(format!("g{f}.txt")), content.repeat(3)).unwrap();
        }
    }
}

fn record_set(scanner: &mut Scanner, strategy: ScanStrategy) -> HashSet<FileRecord> {
    scanner
        .scan_with(strategy)
        .unwrap()
        .records()
        .iter()
        .cloned()
        .collect()
}

#[test]
fn test_strategies_yield_identical_sets() {
    let dir = tempdir().unwrap();
    build_tree(dir.path());
    let mut scanner = Scanner::new(Arc::new(ScanConfig::new(dir.path())));

    let sequential = record_set(&mut scanner, ScanStrategy::Sequential);
    assert_eq!(sequential.len(), 96);

    for workers in [1, 2, 3, 8, 32] {
        let concurrent = record_set(&mut scanner, ScanStrategy::Concurrent { workers });
        assert_eq!(sequential, concurrent, "workers = {workers}");
    }
}

#[test]
fn test_repeated_concurrent_runs_are_complete() {
    let dir = tempdir().unwrap();
    build_tree(dir.path());
    let mut scanner = Scanner::new(Arc::new(ScanConfig::new(dir.path())));

    let expected = scanner.scan_with(ScanStrategy::Sequential).unwrap().len();
    for _ in 0..20 {
        let result = scanner
            .scan_with(ScanStrategy::Concurrent { workers: 6 })
            .unwrap();
        assert_eq!(result.len(), expected);
    }
}

#[test]
fn test_duplicate_counts_match_between_strategies() {
    let dir = tempdir().unwrap();
    build_tree(dir.path());
    let mut scanner = Scanner::new(Arc::new(ScanConfig::new(dir.path())));

    let seq = analyze_result(scanner.scan_with(ScanStrategy::Sequential).unwrap());
    let con = analyze_result(
        scanner
            .scan_with(ScanStrategy::Concurrent { workers: 4 })
            .unwrap(),
    );

    assert_eq!(seq.duplicate_files, con.duplicate_files);
    assert_eq!(seq.groups.len(), con.groups.len());
    assert_eq!(seq.unique_fingerprints, con.unique_fingerprints);
}

#[test]
fn test_sequential_order_is_stable() {
    let dir = tempdir().unwrap();
    build_tree(dir.path());
    let mut scanner = Scanner::new(Arc::new(ScanConfig::new(dir.path())));

    let first: Vec<_> = scanner
        .scan_with(ScanStrategy::Sequential)
        .unwrap()
        .records()
        .to_vec();
    let second: Vec<_> = scanner
        .scan_with(ScanStrategy::Sequential)
        .unwrap()
        .records()
        .to_vec();
    assert_eq!(first, second);
}

#[test]
fn test_config_selects_strategy() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a"), "a").unwrap();

    let mut sequential = Scanner::new(Arc::new(ScanConfig::new(dir.path()).with_concurrent(false)));
    assert_eq!(
        sequential.scan().unwrap().strategy(),
        ScanStrategy::Sequential
    );

    let mut concurrent = Scanner::new(Arc::new(
        ScanConfig::new(dir.path()).with_concurrent(true).with_max_workers(3),
    ));
    assert_eq!(
        concurrent.scan().unwrap().strategy(),
        ScanStrategy::Concurrent { workers: 3 }
    );
}
