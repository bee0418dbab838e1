//! Scan engine: one traversal, two dispatch strategies.
//!
//! # Overview
//!
//! [`Scanner`] walks the configured root with [`Walker`] and hands each
//! discovered file to a dispatcher:
//!
//! - [`ScanStrategy::Sequential`] hashes the file immediately on the calling
//!   thread, so records come out in traversal order.
//! - [`ScanStrategy::Concurrent`] submits the file as a unit of work to a
//!   dedicated rayon pool with `workers` threads. At most `workers` files are
//!   read at any instant. The walk runs on the calling thread and the call
//!   does not return until every submitted unit has completed.
//!
//! Completed units append to a [`RecordSink`], a mutex-guarded append-only
//! collection. Both strategies go through it, so they share every line of
//! filtering and error handling and differ only in where hashing runs.
//!
//! # Example
//!
//! ```no_run
//! use dupclean::scanner::{ScanConfig, ScanStrategy, Scanner};
//! use std::sync::Arc;
//!
//! let mut scanner = Scanner::new(Arc::new(ScanConfig::new(".")));
//!
//! let sequential = scanner.scan_with(ScanStrategy::Sequential).unwrap().len();
//! let concurrent = scanner.scan_with(ScanStrategy::Concurrent { workers: 8 }).unwrap().len();
//! assert_eq!(sequential, concurrent);
//! ```

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

use crate::progress::ProgressCallback;

use super::hasher::{FileHasher, Hasher};
use super::walker::{DiscoveredFile, Walker};
use super::{EntryError, FileRecord, ScanConfig, ScanResult, WalkError};

/// Name of the progress phase reported while hashing.
pub const HASHING_PHASE: &str = "hashing";

/// How hashing work is executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanStrategy {
    /// Hash each file synchronously, in traversal order.
    Sequential,
    /// Hash files on a bounded pool of `workers` threads.
    Concurrent {
        /// Maximum number of files hashed at once (at least 1)
        workers: usize,
    },
}

impl fmt::Display for ScanStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sequential => write!(f, "sequential"),
            Self::Concurrent { workers } => write!(f, "concurrent ({workers} workers)"),
        }
    }
}

/// Errors that abort a scan.
#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    /// The root could not be traversed.
    #[error(transparent)]
    Walk(#[from] WalkError),

    /// The bounded worker pool could not be created.
    #[error("Failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// The scan was cancelled through the shutdown flag.
    #[error("Scan interrupted by user")]
    Interrupted,
}

/// Append-only, thread-safe collection filled during one pass.
///
/// Each append takes the lock once, so no reader sees a partial record and
/// no two appends interleave. The completed counter is advisory.
#[derive(Debug, Default)]
pub struct RecordSink {
    records: Mutex<Vec<FileRecord>>,
    errors: Mutex<Vec<EntryError>>,
    completed: AtomicUsize,
}

impl RecordSink {
    /// Create an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record and return the number of units completed so far.
    pub fn push_record(&self, record: FileRecord) -> usize {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record);
        self.completed.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Append a recoverable error. Hash failures also count as completed units.
    pub fn push_error(&self, error: EntryError) -> usize {
        let counts_as_unit = matches!(error, EntryError::Read(_));
        self.errors
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(error);
        if counts_as_unit {
            self.completed.fetch_add(1, Ordering::SeqCst) + 1
        } else {
            self.completed()
        }
    }

    /// Units completed so far.
    #[must_use]
    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }

    /// Number of records appended so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Check if no record has been appended.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Consume the sink once all writers are done.
    #[must_use]
    pub fn into_parts(self) -> (Vec<FileRecord>, Vec<EntryError>) {
        (
            self.records
                .into_inner()
                .unwrap_or_else(PoisonError::into_inner),
            self.errors
                .into_inner()
                .unwrap_or_else(PoisonError::into_inner),
        )
    }
}

/// Walks a tree and fingerprints every regular file in it.
///
/// The scanner owns the [`ScanResult`] of its latest pass. Every call to
/// [`scan`](Self::scan) discards the previous result before starting.
pub struct Scanner {
    config: Arc<ScanConfig>,
    hasher: Arc<dyn FileHasher>,
    shutdown_flag: Option<Arc<AtomicBool>>,
    progress_callback: Option<Arc<dyn ProgressCallback>>,
    pre_count: bool,
    result: Option<ScanResult>,
}

impl fmt::Debug for Scanner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scanner")
            .field("config", &self.config)
            .field("shutdown_flag", &self.shutdown_flag)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .field("pre_count", &self.pre_count)
            .field("result", &self.result.as_ref().map(ScanResult::len))
            .finish()
    }
}

impl Scanner {
    /// Create a scanner hashing with `config.algorithm`.
    #[must_use]
    pub fn new(config: Arc<ScanConfig>) -> Self {
        let hasher = Hasher::with_algorithm(config.algorithm);
        Self {
            config,
            hasher: Arc::new(hasher),
            shutdown_flag: None,
            progress_callback: None,
            pre_count: false,
            result: None,
        }
    }

    /// Replace the hasher.
    #[must_use]
    pub fn with_hasher(mut self, hasher: Arc<dyn FileHasher>) -> Self {
        self.hasher = hasher;
        self
    }

    /// Set the shutdown flag for cancellation.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Walk the tree once before hashing so progress has a known total.
    ///
    /// Only takes effect when a progress callback is set.
    #[must_use]
    pub fn with_pre_count(mut self, enabled: bool) -> Self {
        self.pre_count = enabled;
        self
    }

    /// The configuration this scanner reads.
    #[must_use]
    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Result of the latest successful pass, if any.
    #[must_use]
    pub fn result(&self) -> Option<&ScanResult> {
        self.result.as_ref()
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }

    /// Scan using the strategy selected by the configuration.
    ///
    /// # Errors
    ///
    /// See [`scan_with`](Self::scan_with).
    pub fn scan(&mut self) -> Result<&ScanResult, ScanError> {
        let strategy = self.config.strategy();
        self.scan_with(strategy)
    }

    /// Scan with an explicit strategy.
    ///
    /// Per-file read errors and unreadable subtrees are recorded in the
    /// result and do not stop the scan.
    ///
    /// # Errors
    ///
    /// - [`ScanError::Walk`] if the root is missing, not a directory, or unreadable
    /// - [`ScanError::ThreadPool`] if the worker pool cannot be created
    /// - [`ScanError::Interrupted`] if the shutdown flag was set
    pub fn scan_with(&mut self, strategy: ScanStrategy) -> Result<&ScanResult, ScanError> {
        self.result = None;
        let result = self.run_pass(strategy)?;
        Ok(self.result.insert(result))
    }

    fn run_pass(&self, strategy: ScanStrategy) -> Result<ScanResult, ScanError> {
        let start = Instant::now();
        let config = Arc::clone(&self.config);
        log::info!("Scanning {} ({})", config.root.display(), strategy);

        if self.is_shutdown_requested() {
            return Err(ScanError::Interrupted);
        }

        let mut walker = Walker::new(&config);
        if let Some(ref flag) = self.shutdown_flag {
            walker = walker.with_shutdown_flag(Arc::clone(flag));
        }
        walker.check_root()?;

        if let Some(ref callback) = self.progress_callback {
            let total = if self.pre_count { walker.count() } else { 0 };
            log::debug!("Progress total: {total}");
            callback.on_phase_start(HASHING_PHASE, total);
            callback.on_message(&format!("Scanning {}", config.root.display()));
        }

        let sink = RecordSink::new();
        let walked = match strategy {
            ScanStrategy::Sequential => {
                self.traverse(&walker, &sink, |file| self.hash_unit(&sink, file))
            }
            ScanStrategy::Concurrent { workers } => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(workers.max(1))
                    .thread_name(|idx| format!("dupclean-hash-{idx}"))
                    .build()?;
                let sink = &sink;
                // The scope joins every spawned unit before returning.
                pool.in_place_scope(|scope| {
                    self.traverse(&walker, sink, |file| {
                        scope.spawn(move |_| self.hash_unit(sink, file));
                    })
                })
            }
        };

        if let Some(ref callback) = self.progress_callback {
            callback.on_phase_end(HASHING_PHASE);
        }

        walked?;
        if self.is_shutdown_requested() {
            log::info!(
                "Scan interrupted after {} completed files",
                sink.completed()
            );
            return Err(ScanError::Interrupted);
        }

        let (records, errors) = sink.into_parts();
        let duration = start.elapsed();
        log::info!(
            "Scan complete: {} files hashed, {} errors in {:.2}s",
            records.len(),
            errors.len(),
            duration.as_secs_f64()
        );

        Ok(ScanResult {
            root: config.root.clone(),
            strategy,
            records,
            errors,
            duration,
        })
    }

    /// Drive the walk, handing each discovered file to `dispatch`.
    ///
    /// Subtree errors go to the sink. A root error stops the walk and is
    /// returned; units already dispatched still run to completion.
    fn traverse<F>(
        &self,
        walker: &Walker<'_>,
        sink: &RecordSink,
        mut dispatch: F,
    ) -> Result<(), WalkError>
    where
        F: FnMut(DiscoveredFile),
    {
        for entry in walker.walk() {
            if self.is_shutdown_requested() {
                break;
            }
            match entry {
                Ok(file) => dispatch(file),
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    sink.push_error(e.into());
                }
            }
        }
        Ok(())
    }

    /// One unit of hashing work.
    fn hash_unit(&self, sink: &RecordSink, file: DiscoveredFile) {
        // Units that have not started when cancellation arrives are dropped.
        if self.is_shutdown_requested() {
            return;
        }

        let display = file.path.display().to_string();
        let (completed, bytes) = match self.hasher.fingerprint(&file.path) {
            Ok((fingerprint, size)) => (
                sink.push_record(FileRecord::new(file.path, fingerprint, size)),
                size,
            ),
            Err(e) => {
                log::warn!("{}", e);
                (sink.push_error(e.into()), 0)
            }
        };

        if let Some(ref callback) = self.progress_callback {
            callback.on_item_completed(bytes);
            callback.on_progress(completed, &display);
        }
    }
}
