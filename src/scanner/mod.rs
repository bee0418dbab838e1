//! Scanner module for directory traversal and file hashing.
//!
//! This module provides functionality for:
//! - Depth- and extension-filtered directory walking using walkdir
//! - Content fingerprinting (MD5 by default, SHA-256 or BLAKE3 on request)
//! - Sequential or bounded-concurrency hashing passes
//!
//! # Architecture
//!
//! The scanner is divided into submodules:
//! - [`walker`]: Directory traversal and file discovery
//! - [`hasher`]: Whole-file content fingerprinting
//! - [`engine`]: The [`Scanner`] that drives a walk and dispatches hashing
//!
//! # Example
//!
//! ```no_run
//! use dupclean::scanner::{ScanConfig, Scanner};
//! use std::sync::Arc;
//!
//! let config = ScanConfig::new("/home/user/Downloads").with_max_workers(4);
//! let mut scanner = Scanner::new(Arc::new(config));
//!
//! let result = scanner.scan().unwrap();
//! for record in result.records() {
//!     println!("{}  {}", record.fingerprint, record.path.display());
//! }
//! ```

pub mod engine;
pub mod hasher;
pub mod walker;

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Serialize, Serializer};

// Re-export main types
pub use engine::{ScanError, ScanStrategy, Scanner};
pub use hasher::{FileHasher, Fingerprint, HashAlgorithm, Hasher};
pub use walker::{DiscoveredFile, Walker};

/// One scanned file and the fingerprint of its content.
///
/// Records are created once per file during a scan pass and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct FileRecord {
    /// Path of the file as discovered under the scan root
    pub path: PathBuf,
    /// Hex-encoded digest of the full file content
    pub fingerprint: Fingerprint,
    /// Number of bytes that were hashed
    pub size: u64,
}

impl FileRecord {
    /// Create a new FileRecord.
    #[must_use]
    pub fn new(path: PathBuf, fingerprint: Fingerprint, size: u64) -> Self {
        Self {
            path,
            fingerprint,
            size,
        }
    }
}

/// Maximum recursion depth for a scan.
///
/// The root directory is depth 0, its direct children are depth 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MaxDepth {
    /// Traverse without bound.
    #[default]
    Unlimited,
    /// Skip every entry deeper than this depth.
    Limited(usize),
}

impl MaxDepth {
    /// Sentinel used by configuration files for "no limit".
    pub const UNLIMITED_SENTINEL: i64 = -1;

    /// Convert a configured depth into a `MaxDepth`.
    ///
    /// Any negative value means unlimited.
    ///
    /// ```
    /// use dupclean::scanner::MaxDepth;
    ///
    /// assert_eq!(MaxDepth::from_config(-1), MaxDepth::Unlimited);
    /// assert_eq!(MaxDepth::from_config(-7), MaxDepth::Unlimited);
    /// assert_eq!(MaxDepth::from_config(2), MaxDepth::Limited(2));
    /// ```
    #[must_use]
    pub fn from_config(value: i64) -> Self {
        if value <= Self::UNLIMITED_SENTINEL {
            Self::Unlimited
        } else {
            Self::Limited(usize::try_from(value).unwrap_or(usize::MAX))
        }
    }
}

impl fmt::Display for MaxDepth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unlimited => write!(f, "unlimited"),
            Self::Limited(depth) => write!(f, "{depth}"),
        }
    }
}

impl Serialize for MaxDepth {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Unlimited => serializer.serialize_i64(Self::UNLIMITED_SENTINEL),
            Self::Limited(depth) => serializer.serialize_u64(*depth as u64),
        }
    }
}

/// Immutable configuration consumed by the [`Scanner`].
///
/// Built once (usually from [`crate::config::Config`]) and shared behind an
/// `Arc`; the scanner never mutates it.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Root directory to scan.
    pub root: PathBuf,

    /// Maximum recursion depth.
    pub max_depth: MaxDepth,

    /// Extensions to skip, lowercase and without the leading dot.
    pub excluded_extensions: Vec<String>,

    /// Use the concurrent strategy when true.
    pub concurrent: bool,

    /// Upper bound on files being hashed at once. 0 means one per CPU.
    pub max_workers: usize,

    /// Gate for destructive follow-up actions. The scan itself never writes.
    pub dry_run: bool,

    /// Digest used for fingerprints.
    pub algorithm: HashAlgorithm,

    /// Follow symbolic links during traversal.
    /// Warning: May cause infinite loops with symlink cycles.
    pub follow_symlinks: bool,
}

impl ScanConfig {
    /// Create a configuration for `root` with default settings:
    /// unlimited depth, no exclusions, concurrent, one worker per CPU, MD5.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            max_depth: MaxDepth::Unlimited,
            excluded_extensions: Vec::new(),
            concurrent: true,
            max_workers: 0,
            dry_run: false,
            algorithm: HashAlgorithm::default(),
            follow_symlinks: false,
        }
    }

    /// Set the maximum depth.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: MaxDepth) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Set the excluded extensions. Entries are normalised, so `".TXT"`,
    /// `"txt"` and `"Txt"` all exclude `notes.txt`.
    #[must_use]
    pub fn with_excluded_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.excluded_extensions = extensions
            .into_iter()
            .filter_map(|ext| normalize_extension(ext.as_ref()))
            .collect();
        self
    }

    /// Enable or disable the concurrent strategy.
    #[must_use]
    pub fn with_concurrent(mut self, concurrent: bool) -> Self {
        self.concurrent = concurrent;
        self
    }

    /// Set the worker bound for the concurrent strategy.
    #[must_use]
    pub fn with_max_workers(mut self, workers: usize) -> Self {
        self.max_workers = workers;
        self
    }

    /// Set the dry-run flag.
    #[must_use]
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Set the fingerprint algorithm.
    #[must_use]
    pub fn with_algorithm(mut self, algorithm: HashAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Set symlink following.
    #[must_use]
    pub fn with_follow_symlinks(mut self, follow: bool) -> Self {
        self.follow_symlinks = follow;
        self
    }

    /// Worker count with the "0 means one per CPU" rule applied.
    #[must_use]
    pub fn resolved_workers(&self) -> usize {
        if self.max_workers > 0 {
            self.max_workers
        } else {
            std::thread::available_parallelism().map_or(1, std::num::NonZeroUsize::get)
        }
    }

    /// The execution strategy this configuration selects.
    #[must_use]
    pub fn strategy(&self) -> ScanStrategy {
        if self.concurrent {
            ScanStrategy::Concurrent {
                workers: self.resolved_workers(),
            }
        } else {
            ScanStrategy::Sequential
        }
    }

    /// Check whether a path's extension is in the exclusion set.
    #[must_use]
    pub fn is_excluded(&self, path: &Path) -> bool {
        if self.excluded_extensions.is_empty() {
            return false;
        }
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_lowercase)
            .is_some_and(|ext| self.excluded_extensions.contains(&ext))
    }
}

/// Normalise a configured extension: trim, strip leading dots, lowercase.
fn normalize_extension(raw: &str) -> Option<String> {
    let ext = raw.trim().trim_start_matches('.');
    if ext.is_empty() {
        None
    } else {
        Some(ext.to_lowercase())
    }
}

/// The records produced by one scan pass.
///
/// Owned by the [`Scanner`] while the pass runs and handed out read-only
/// afterwards. Under [`ScanStrategy::Concurrent`] the record order is the
/// order in which hashing completed and is not deterministic.
#[derive(Debug, Clone)]
pub struct ScanResult {
    pub(crate) root: PathBuf,
    pub(crate) strategy: ScanStrategy,
    pub(crate) records: Vec<FileRecord>,
    pub(crate) errors: Vec<EntryError>,
    pub(crate) duration: Duration,
}

impl ScanResult {
    /// Root directory that was scanned.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Strategy used for this pass.
    #[must_use]
    pub fn strategy(&self) -> ScanStrategy {
        self.strategy
    }

    /// Records in collection order.
    #[must_use]
    pub fn records(&self) -> &[FileRecord] {
        &self.records
    }

    /// Recoverable errors reported during the pass.
    #[must_use]
    pub fn errors(&self) -> &[EntryError] {
        &self.errors
    }

    /// Wall time of the pass.
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if no file was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Total bytes hashed.
    #[must_use]
    pub fn total_size(&self) -> u64 {
        self.records.iter().map(|r| r.size).sum()
    }

    /// Whether any recoverable error occurred.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Paths of all records, sorted. Useful for comparing strategies.
    #[must_use]
    pub fn sorted_paths(&self) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = self.records.iter().map(|r| r.path.clone()).collect();
        paths.sort();
        paths
    }
}

/// A single file could not be fully read for hashing.
///
/// Scoped to that file: the scan records it and continues.
#[derive(thiserror::Error, Debug)]
#[error("Failed to read {path}: {source}")]
pub struct FileReadError {
    /// File that failed
    pub path: PathBuf,
    /// The underlying I/O error
    #[source]
    pub source: std::io::Error,
}

impl FileReadError {
    /// Create a new read error.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self {
            path: path.into(),
            source,
        }
    }

    /// Kind of the underlying I/O error.
    #[must_use]
    pub fn kind(&self) -> std::io::ErrorKind {
        self.source.kind()
    }
}

/// Traversal could not proceed past a point.
///
/// Root variants are fatal to the scan; [`WalkError::Subtree`] is recorded
/// and the walk continues with siblings.
#[derive(thiserror::Error, Debug)]
pub enum WalkError {
    /// The scan root does not exist.
    #[error("Path not found: {0}")]
    RootNotFound(PathBuf),

    /// The scan root is not a directory.
    #[error("Not a directory: {0}")]
    RootNotADirectory(PathBuf),

    /// The scan root exists but could not be read.
    #[error("Cannot access scan root {path}: {source}")]
    RootAccess {
        /// Root path
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A directory or entry below the root could not be read.
    #[error("Skipping {path}: {source}")]
    Subtree {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl WalkError {
    /// Whether this error aborts the whole scan.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::Subtree { .. })
    }

    /// Path the error refers to.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::RootNotFound(path) | Self::RootNotADirectory(path) => path,
            Self::RootAccess { path, .. } | Self::Subtree { path, .. } => path,
        }
    }
}

/// A recoverable per-entry error collected into the [`ScanResult`].
#[derive(thiserror::Error, Debug)]
pub enum EntryError {
    /// Hashing a file failed.
    #[error(transparent)]
    Read(#[from] FileReadError),

    /// A subtree could not be traversed.
    #[error(transparent)]
    Walk(#[from] WalkError),
}

impl EntryError {
    /// Path the error refers to.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::Read(e) => &e.path,
            Self::Walk(e) => e.path(),
        }
    }
}

// io::Error is not Clone; copies keep the kind and message.
impl Clone for EntryError {
    fn clone(&self) -> Self {
        fn copy_io(e: &std::io::Error) -> std::io::Error {
            std::io::Error::new(e.kind(), e.to_string())
        }
        match self {
            Self::Read(e) => Self::Read(FileReadError::new(e.path.clone(), copy_io(&e.source))),
            Self::Walk(WalkError::Subtree { path, source }) => Self::Walk(WalkError::Subtree {
                path: path.clone(),
                source: copy_io(source),
            }),
            Self::Walk(WalkError::RootAccess { path, source }) => {
                Self::Walk(WalkError::RootAccess {
                    path: path.clone(),
                    source: copy_io(source),
                })
            }
            Self::Walk(WalkError::RootNotFound(path)) => {
                Self::Walk(WalkError::RootNotFound(path.clone()))
            }
            Self::Walk(WalkError::RootNotADirectory(path)) => {
                Self::Walk(WalkError::RootNotADirectory(path.clone()))
            }
        }
    }
}
