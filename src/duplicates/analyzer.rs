//! Duplicate analysis over a finished scan.
//!
//! Everything here is a pure function of its input: no I/O and no shared
//! state, so analyses may run repeatedly or concurrently over the same
//! records.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use super::groups::DuplicateGroup;
use crate::scanner::{FileRecord, Fingerprint, ScanResult};

/// Outcome of grouping a scan result by fingerprint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DuplicateAnalysis {
    /// Groups with two or more members, in first-occurrence order
    pub groups: Vec<DuplicateGroup>,
    /// Records analyzed
    pub total_files: usize,
    /// Distinct fingerprints
    pub unique_fingerprints: usize,
    /// All members beyond the original, summed over groups
    pub duplicate_files: usize,
}

impl DuplicateAnalysis {
    /// Check if any duplicate group was found.
    #[must_use]
    pub fn has_duplicates(&self) -> bool {
        !self.groups.is_empty()
    }

    /// Bytes reclaimable across all groups.
    #[must_use]
    pub fn wasted_space(&self) -> u64 {
        self.groups.iter().map(DuplicateGroup::wasted_space).sum()
    }

    /// Total members across all groups, originals included.
    #[must_use]
    pub fn files_in_groups(&self) -> usize {
        self.groups.iter().map(DuplicateGroup::len).sum()
    }
}

/// Map each fingerprint to its records, in input order.
///
/// Returns buckets in order of first occurrence, singletons included.
#[must_use]
pub fn group_by_fingerprint(records: &[FileRecord]) -> Vec<(Fingerprint, Vec<FileRecord>)> {
    let mut index: HashMap<&Fingerprint, usize> = HashMap::with_capacity(records.len());
    let mut buckets: Vec<(Fingerprint, Vec<FileRecord>)> = Vec::new();

    for record in records {
        match index.get(&record.fingerprint) {
            Some(&slot) => buckets[slot].1.push(record.clone()),
            None => {
                index.insert(&record.fingerprint, buckets.len());
                buckets.push((record.fingerprint.clone(), vec![record.clone()]));
            }
        }
    }

    buckets
}

/// Partition records into duplicate groups and count them.
///
/// ```
/// use dupclean::duplicates::analyze;
/// use dupclean::scanner::{FileRecord, Fingerprint};
/// use std::path::PathBuf;
///
/// let hello = Fingerprint::from_hex("5d41402abc4b2a76b9719d911017c592").unwrap();
/// let world = Fingerprint::from_hex("7d793037a0760186574b0282f2f435e7").unwrap();
/// let records = vec![
///     FileRecord::new(PathBuf::from("a.txt"), hello.clone(), 5),
///     FileRecord::new(PathBuf::from("b.txt"), hello, 5),
///     FileRecord::new(PathBuf::from("c.txt"), world, 5),
/// ];
///
/// let analysis = analyze(&records);
/// assert_eq!(analysis.groups.len(), 1);
/// assert_eq!(analysis.groups[0].len(), 2);
/// assert_eq!(analysis.duplicate_files, 1);
/// ```
#[must_use]
pub fn analyze(records: &[FileRecord]) -> DuplicateAnalysis {
    let buckets = group_by_fingerprint(records);
    let unique_fingerprints = buckets.len();

    let groups: Vec<DuplicateGroup> = buckets
        .into_iter()
        .filter_map(|(fingerprint, files)| DuplicateGroup::new(fingerprint, files))
        .collect();
    let duplicate_files = groups.iter().map(DuplicateGroup::duplicate_count).sum();

    log::debug!(
        "Analyzed {} records: {} duplicate groups, {} duplicate files",
        records.len(),
        groups.len(),
        duplicate_files
    );

    DuplicateAnalysis {
        groups,
        total_files: records.len(),
        unique_fingerprints,
        duplicate_files,
    }
}

/// Analyze a scan result.
#[must_use]
pub fn analyze_result(result: &ScanResult) -> DuplicateAnalysis {
    analyze(result.records())
}

/// Count all records past the first for each fingerprint.
///
/// Equal to `analyze(records).duplicate_files` without building groups.
#[must_use]
pub fn count_duplicates(records: &[FileRecord]) -> usize {
    let mut seen: HashSet<&Fingerprint> = HashSet::with_capacity(records.len());
    records
        .iter()
        .filter(|r| !seen.insert(&r.fingerprint))
        .count()
}
