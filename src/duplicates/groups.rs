//! Duplicate group type.
//!
//! A [`DuplicateGroup`] is a set of at least two [`FileRecord`]s sharing one
//! fingerprint. The first member, in scan-result order, is the retained
//! "original"; the rest are its duplicates.
//!
//! # Ordering
//!
//! "First" is only meaningful for sequential scans. Under the concurrent
//! strategy records arrive in completion order, so which member is the
//! original is not guaranteed between runs.
//!
//! # Example
//!
//! ```
//! use dupclean::duplicates::DuplicateGroup;
//! use dupclean::scanner::{FileRecord, Fingerprint};
//! use std::path::PathBuf;
//!
//! let fp = Fingerprint::from_hex("5d41402abc4b2a76b9719d911017c592").unwrap();
//! let group = DuplicateGroup::new(
//!     fp.clone(),
//!     vec![
//!         FileRecord::new(PathBuf::from("/a.txt"), fp.clone(), 5),
//!         FileRecord::new(PathBuf::from("/b.txt"), fp, 5),
//!     ],
//! )
//! .unwrap();
//!
//! assert_eq!(group.original().path, PathBuf::from("/a.txt"));
//! assert_eq!(group.duplicate_count(), 1);
//! assert_eq!(group.wasted_space(), 5);
//! ```

use std::path::PathBuf;

use serde::Serialize;

use crate::scanner::{FileRecord, Fingerprint};

/// Files sharing one fingerprint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateGroup {
    /// Shared content fingerprint
    pub fingerprint: Fingerprint,
    /// Members in scan-result order (at least two)
    pub files: Vec<FileRecord>,
}

impl DuplicateGroup {
    /// Create a group from its members.
    ///
    /// Returns `None` unless there are at least two files and every member
    /// carries `fingerprint`.
    #[must_use]
    pub fn new(fingerprint: Fingerprint, files: Vec<FileRecord>) -> Option<Self> {
        if files.len() < 2 || files.iter().any(|f| f.fingerprint != fingerprint) {
            return None;
        }
        Some(Self { fingerprint, files })
    }

    /// The retained member.
    #[must_use]
    pub fn original(&self) -> &FileRecord {
        &self.files[0]
    }

    /// Members other than the original.
    #[must_use]
    pub fn duplicates(&self) -> &[FileRecord] {
        self.files.get(1..).unwrap_or_default()
    }

    /// Number of members beyond the original.
    #[must_use]
    pub fn duplicate_count(&self) -> usize {
        self.files.len().saturating_sub(1)
    }

    /// Number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Always false for a well-formed group.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Size of one copy in bytes.
    #[must_use]
    pub fn size(&self) -> u64 {
        self.files.first().map_or(0, |f| f.size)
    }

    /// Bytes across all members.
    #[must_use]
    pub fn total_size(&self) -> u64 {
        self.files.iter().map(|f| f.size).sum()
    }

    /// Bytes reclaimable by dropping every duplicate.
    #[must_use]
    pub fn wasted_space(&self) -> u64 {
        self.duplicates().iter().map(|f| f.size).sum()
    }

    /// Member paths in order.
    #[must_use]
    pub fn paths(&self) -> Vec<PathBuf> {
        self.files.iter().map(|f| f.path.clone()).collect()
    }
}
