//! JSON output formatter for scan results.
//!
//! Provides machine-readable JSON output for scripting and automation.
//!
//! # Output Schema
//!
//! ```json
//! {
//!   "scan": {
//!     "root": "/data",
//!     "strategy": "concurrent (8 workers)",
//!     "scanned_at": "2024-05-01T12:00:00Z",
//!     "duration_ms": 412
//!   },
//!   "duplicates": [
//!     {
//!       "fingerprint": "5d41402abc4b2a76b9719d911017c592",
//!       "size": 5,
//!       "original": "/data/a.txt",
//!       "files": ["/data/a.txt", "/data/b.txt"]
//!     }
//!   ],
//!   "errors": [
//!     { "path": "/data/locked", "message": "Failed to read /data/locked: Permission denied" }
//!   ],
//!   "summary": {
//!     "total_files": 3,
//!     "total_size": 15,
//!     "duplicate_groups": 1,
//!     "duplicate_files": 1,
//!     "reclaimable_space": 5,
//!     "error_count": 1,
//!     "exit_code": 3,
//!     "exit_code_name": "DC003"
//!   }
//! }
//! ```

use std::io::Write;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::duplicates::{DuplicateAnalysis, DuplicateGroup};
use crate::error::ExitCode;
use crate::scanner::{EntryError, ScanResult};

/// Scan metadata.
#[derive(Debug, Clone, Serialize)]
pub struct JsonScan {
    /// Scanned root folder
    pub root: String,
    /// Strategy description
    pub strategy: String,
    /// When the report was produced
    pub scanned_at: DateTime<Utc>,
    /// Wall time of the scan in milliseconds
    pub duration_ms: u64,
}

/// A single duplicate group in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonDuplicateGroup {
    /// Content fingerprint (lowercase hex)
    pub fingerprint: String,
    /// Size of one copy in bytes
    pub size: u64,
    /// The retained member
    pub original: String,
    /// All members, original first
    pub files: Vec<String>,
}

impl JsonDuplicateGroup {
    /// Create a JSON duplicate group from a DuplicateGroup.
    #[must_use]
    pub fn from_duplicate_group(group: &DuplicateGroup) -> Self {
        Self {
            fingerprint: group.fingerprint.to_string(),
            size: group.size(),
            original: group.original().path.to_string_lossy().into_owned(),
            files: group
                .files
                .iter()
                .map(|f| f.path.to_string_lossy().into_owned())
                .collect(),
        }
    }
}

/// A recoverable error in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonEntryError {
    /// Path that could not be read
    pub path: String,
    /// Error description
    pub message: String,
}

impl From<&EntryError> for JsonEntryError {
    fn from(err: &EntryError) -> Self {
        Self {
            path: err.path().to_string_lossy().into_owned(),
            message: err.to_string(),
        }
    }
}

/// Summary statistics in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonSummary {
    /// Files hashed
    pub total_files: usize,
    /// Bytes hashed
    pub total_size: u64,
    /// Number of duplicate groups
    pub duplicate_groups: usize,
    /// Duplicate files (excluding originals)
    pub duplicate_files: usize,
    /// Bytes occupied by duplicates
    pub reclaimable_space: u64,
    /// Recoverable errors encountered
    pub error_count: usize,
    /// The exit code number
    pub exit_code: i32,
    /// The machine-readable exit code name (e.g., "DC000")
    pub exit_code_name: String,
}

/// Complete JSON output structure.
#[derive(Debug, Clone, Serialize)]
pub struct JsonOutput {
    /// Scan metadata
    pub scan: JsonScan,
    /// Duplicate groups
    pub duplicates: Vec<JsonDuplicateGroup>,
    /// Recoverable errors
    pub errors: Vec<JsonEntryError>,
    /// Summary statistics
    pub summary: JsonSummary,
}

impl JsonOutput {
    /// Build the report for one scan.
    #[must_use]
    pub fn new(result: &ScanResult, analysis: &DuplicateAnalysis, exit_code: ExitCode) -> Self {
        Self {
            scan: JsonScan {
                root: result.root().to_string_lossy().into_owned(),
                strategy: result.strategy().to_string(),
                scanned_at: Utc::now(),
                duration_ms: u64::try_from(result.duration().as_millis()).unwrap_or(u64::MAX),
            },
            duplicates: analysis
                .groups
                .iter()
                .map(JsonDuplicateGroup::from_duplicate_group)
                .collect(),
            errors: result.errors().iter().map(JsonEntryError::from).collect(),
            summary: JsonSummary {
                total_files: result.len(),
                total_size: result.total_size(),
                duplicate_groups: analysis.groups.len(),
                duplicate_files: analysis.duplicate_files,
                reclaimable_space: analysis.wasted_space(),
                error_count: result.errors().len(),
                exit_code: exit_code.as_i32(),
                exit_code_name: exit_code.code_prefix().to_string(),
            },
        }
    }

    /// Override the report timestamp.
    #[must_use]
    pub fn with_scanned_at(mut self, at: DateTime<Utc>) -> Self {
        self.scan.scanned_at = at;
        self
    }

    /// Serialize to compact JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails (unlikely for valid data).
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serialize to pretty-printed JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails (unlikely for valid data).
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write JSON to a writer, followed by a newline.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W, pretty: bool) -> Result<(), JsonOutputError> {
        let json = if pretty {
            self.to_json_pretty()?
        } else {
            self.to_json()?
        };
        writer.write_all(json.as_bytes())?;
        writer.write_all(b"\n")?;
        Ok(())
    }
}

/// Errors that can occur during JSON output.
#[derive(thiserror::Error, Debug)]
pub enum JsonOutputError {
    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error during writing
    #[error("I/O error during JSON generation: {0}")]
    Io(#[from] std::io::Error),
}
