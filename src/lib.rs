//! DupClean - duplicate file finder
//!
//! Walks a directory tree, fingerprints every regular file by content, and
//! groups files with identical fingerprints. Hashing runs either on the
//! calling thread or on a bounded worker pool.
//!
//! ```no_run
//! use dupclean::duplicates::analyze_result;
//! use dupclean::scanner::{ScanConfig, Scanner};
//! use std::sync::Arc;
//!
//! let config = ScanConfig::new("/home/user/Downloads").with_max_workers(4);
//! let mut scanner = Scanner::new(Arc::new(config));
//! let result = scanner.scan().unwrap();
//!
//! let analysis = analyze_result(result);
//! println!("{} duplicate files", analysis.duplicate_files);
//! ```

pub mod actions;
pub mod app;
pub mod cli;
pub mod config;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod output;
pub mod progress;
pub mod scanner;
pub mod signal;

pub use app::run_app;
