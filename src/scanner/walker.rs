//! Directory walker implementation using walkdir.
//!
//! # Overview
//!
//! This module provides the [`Walker`] struct, the single traversal routine
//! shared by both scan strategies. It walks the tree in a deterministic
//! (name-sorted, depth-first) order and yields every regular file that is
//! inside the depth bound and not excluded by extension.
//!
//! # Features
//!
//! - Depth limiting (root = depth 0)
//! - Case-insensitive extension exclusion, applied before any hashing
//! - Symlinks skipped unless following is enabled
//! - Non-fatal subtree errors; fatal root errors
//! - Graceful shutdown via atomic flag
//!
//! # Example
//!
//! ```no_run
//! use dupclean::scanner::{ScanConfig, Walker};
//!
//! let config = ScanConfig::new("/home/user/Downloads").with_excluded_extensions([".tmp"]);
//! let walker = Walker::new(&config);
//! for entry in walker.walk() {
//!     match entry {
//!         Ok(file) => println!("{} (depth {})", file.path.display(), file.depth),
//!         Err(e) => eprintln!("Warning: {}", e),
//!     }
//! }
//! ```

use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use walkdir::WalkDir;

use super::{MaxDepth, ScanConfig, WalkError};

/// A regular file found by the walk, ready to be hashed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredFile {
    /// Path to the file
    pub path: PathBuf,
    /// Depth below the root (direct children are depth 1)
    pub depth: usize,
}

/// Directory walker for file discovery.
#[derive(Debug)]
pub struct Walker<'a> {
    config: &'a ScanConfig,
    shutdown_flag: Option<Arc<AtomicBool>>,
}

impl<'a> Walker<'a> {
    /// Create a walker over `config.root`.
    #[must_use]
    pub fn new(config: &'a ScanConfig) -> Self {
        Self {
            config,
            shutdown_flag: None,
        }
    }

    /// Set the shutdown flag for graceful termination.
    ///
    /// When the flag is set to `true`, the walker stops yielding entries.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }

    /// Check that the root exists and is a directory.
    ///
    /// # Errors
    ///
    /// Returns a fatal [`WalkError`] when the root is missing, not a
    /// directory, or its metadata cannot be read.
    pub fn check_root(&self) -> Result<(), WalkError> {
        let root = &self.config.root;
        match std::fs::metadata(root) {
            Ok(meta) if meta.is_dir() => Ok(()),
            Ok(_) => Err(WalkError::RootNotADirectory(root.clone())),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(WalkError::RootNotFound(root.clone()))
            }
            Err(e) => Err(WalkError::RootAccess {
                path: root.clone(),
                source: e,
            }),
        }
    }

    /// Walk the tree, yielding discovered files.
    ///
    /// Errors below the root are yielded as [`WalkError::Subtree`] and the
    /// walk continues. A failure to read the root itself is yielded as
    /// [`WalkError::RootAccess`]; callers should treat it as fatal.
    pub fn walk(&self) -> impl Iterator<Item = Result<DiscoveredFile, WalkError>> + '_ {
        let mut walk_dir = WalkDir::new(&self.config.root)
            .follow_links(self.config.follow_symlinks)
            .sort_by_file_name();
        if let MaxDepth::Limited(max) = self.config.max_depth {
            walk_dir = walk_dir.max_depth(max);
        }

        walk_dir
            .into_iter()
            .take_while(move |_| {
                let stop = self.is_shutdown_requested();
                if stop {
                    log::debug!("Walker: Shutdown requested, stopping iteration");
                }
                !stop
            })
            .filter_map(move |entry_result| match entry_result {
                Ok(entry) => {
                    let file_type = entry.file_type();

                    if file_type.is_dir() {
                        log::trace!("Entering directory: {}", entry.path().display());
                        return None;
                    }

                    // With follow_links the reported type is the target's.
                    if !file_type.is_file() {
                        log::trace!("Skipping non-regular entry: {}", entry.path().display());
                        return None;
                    }

                    if self.config.is_excluded(entry.path()) {
                        log::trace!("Excluded by extension: {}", entry.path().display());
                        return None;
                    }

                    Some(Ok(DiscoveredFile {
                        depth: entry.depth(),
                        path: entry.into_path(),
                    }))
                }
                Err(e) => Some(Err(self.convert_error(e))),
            })
    }

    /// Count the files a walk would yield, ignoring errors.
    #[must_use]
    pub fn count(&self) -> usize {
        self.walk().filter(Result::is_ok).count()
    }

    fn convert_error(&self, error: walkdir::Error) -> WalkError {
        let depth = error.depth();
        let path = error
            .path()
            .map_or_else(|| self.config.root.clone(), Path::to_path_buf);
        let source = match error.into_io_error() {
            Some(io_error) => io_error,
            // Loop detection when following links.
            None => io::Error::other("filesystem loop detected"),
        };

        if depth == 0 {
            log::error!("Cannot read scan root {}: {}", path.display(), source);
            WalkError::RootAccess { path, source }
        } else {
            match source.kind() {
                io::ErrorKind::PermissionDenied => {
                    log::warn!("Permission denied: {}", path.display());
                }
                io::ErrorKind::NotFound => {
                    log::debug!("Entry vanished during walk: {}", path.display());
                }
                _ => log::warn!("Walker error for {}: {}", path.display(), source),
            }
            WalkError::Subtree { path, source }
        }
    }
}
