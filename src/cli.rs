//! Command-line interface definitions.
//!
//! Global options (verbosity, color, error format) come before the `scan`
//! subcommand; scan options override the config file and environment.
//!
//! ```bash
//! # Scan with the default concurrent strategy
//! dupclean scan ~/Downloads
//!
//! # Sequential scan, two levels deep, skipping temp files
//! dupclean scan ~/Downloads --sequential --max-depth 2 --exclude .tmp
//!
//! # Time both strategies against each other
//! dupclean scan ~/Downloads --compare
//!
//! # Machine-readable output
//! dupclean -q scan ~/Downloads --output json
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::config::Config;
use crate::scanner::HashAlgorithm;

/// Duplicate file finder with sequential and bounded-concurrency scanning.
#[derive(Debug, Parser)]
#[command(name = "dupclean")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors and the report
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Print fatal errors as a JSON object on stderr
    #[arg(long, global = true)]
    pub json_errors: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Scan a directory for duplicate files
    Scan(ScanArgs),
}

/// Report format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Colored terminal summary
    #[default]
    Text,
    /// JSON document on stdout
    Json,
    /// One CSV row per duplicate-group member
    Csv,
}

/// Arguments for the scan subcommand.
#[derive(Debug, Default, Args)]
pub struct ScanArgs {
    /// Directory to scan (overrides `source_folder`)
    #[arg(value_name = "PATH")]
    pub path: Option<PathBuf>,

    /// Configuration file (default: ./dupclean.toml, then the user config dir)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Maximum recursion depth; -1 for unlimited
    #[arg(long, value_name = "N", allow_hyphen_values = true)]
    pub max_depth: Option<i64>,

    /// File extension to skip (can be specified multiple times)
    #[arg(short, long = "exclude", value_name = "EXT")]
    pub exclude: Vec<String>,

    /// Hash one file at a time
    #[arg(long, conflicts_with = "concurrent")]
    pub sequential: bool,

    /// Hash files on a bounded worker pool
    #[arg(long)]
    pub concurrent: bool,

    /// Maximum files hashed at once (0 = one per CPU)
    #[arg(short, long, value_name = "N")]
    pub workers: Option<usize>,

    /// Fingerprint algorithm
    #[arg(long, value_enum)]
    pub algorithm: Option<HashAlgorithm>,

    /// Folder duplicates would be relocated to
    #[arg(long, value_name = "DIR")]
    pub backup_folder: Option<PathBuf>,

    /// Never modify the filesystem
    #[arg(long)]
    pub dry_run: bool,

    /// Follow symbolic links during scan
    ///
    /// Warning: May cause infinite loops if symlinks form cycles.
    #[arg(long)]
    pub follow_symlinks: bool,

    /// Report format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,

    /// List every scanned file in the text report
    #[arg(long)]
    pub list_files: bool,

    /// Run both strategies and report the time each took
    #[arg(long)]
    pub compare: bool,
}

impl ScanArgs {
    /// Apply the flags that were given on top of a loaded config.
    #[must_use]
    pub fn apply_to(&self, mut config: Config) -> Config {
        if let Some(ref path) = self.path {
            config.source_folder = Some(path.clone());
        }
        if let Some(depth) = self.max_depth {
            config.max_scan_depth = depth;
        }
        if !self.exclude.is_empty() {
            config.excluded_file_types.extend(self.exclude.iter().cloned());
        }
        if self.sequential {
            config.concurrent_scan = false;
        }
        if self.concurrent {
            config.concurrent_scan = true;
        }
        if let Some(workers) = self.workers {
            config.max_concurrent_scans = i64::try_from(workers).unwrap_or(i64::MAX);
        }
        if let Some(algorithm) = self.algorithm {
            config.hash_algorithm = algorithm;
        }
        if let Some(ref folder) = self.backup_folder {
            config.backup_folder = Some(folder.clone());
        }
        config.dry_run |= self.dry_run;
        config.follow_symlinks |= self.follow_symlinks;
        config
    }
}
