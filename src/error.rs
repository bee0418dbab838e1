//! Process exit codes and structured error output.

use serde::Serialize;

use crate::config::ConfigError;
use crate::scanner::ScanError;

/// Exit codes for the dupclean binary.
///
/// - 0: Success (completed normally, duplicates found)
/// - 1: General error (unexpected failure, fatal walk error)
/// - 2: No duplicates found
/// - 3: Partial success (completed with recoverable per-entry errors)
/// - 4: Configuration error (nothing was scanned)
/// - 130: Interrupted by user (Ctrl+C)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExitCode {
    /// Scan completed and duplicates were found.
    Success = 0,
    /// An unexpected error occurred.
    GeneralError = 1,
    /// Scan completed but no duplicates were found.
    NoDuplicates = 2,
    /// Scan completed but some files or folders could not be read.
    PartialSuccess = 3,
    /// Configuration was invalid.
    ConfigError = 4,
    /// Scan was interrupted by user.
    Interrupted = 130,
}

impl ExitCode {
    /// Get the numeric exit code.
    #[must_use]
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Get the machine-readable code name.
    #[must_use]
    pub fn code_prefix(self) -> &'static str {
        match self {
            Self::Success => "DC000",
            Self::GeneralError => "DC001",
            Self::NoDuplicates => "DC002",
            Self::PartialSuccess => "DC003",
            Self::ConfigError => "DC004",
            Self::Interrupted => "DC130",
        }
    }

    /// Exit code for a completed scan.
    #[must_use]
    pub fn for_outcome(has_duplicates: bool, has_errors: bool) -> Self {
        match (has_errors, has_duplicates) {
            (true, _) => Self::PartialSuccess,
            (false, true) => Self::Success,
            (false, false) => Self::NoDuplicates,
        }
    }

    /// Classify an error that ended the run.
    #[must_use]
    pub fn from_error(err: &anyhow::Error) -> Self {
        if err.downcast_ref::<ConfigError>().is_some() {
            return Self::ConfigError;
        }
        match err.downcast_ref::<ScanError>() {
            Some(ScanError::Interrupted) => Self::Interrupted,
            _ => Self::GeneralError,
        }
    }
}

/// Structured error information for JSON output.
#[derive(Debug, Serialize)]
pub struct StructuredError {
    /// The error code (e.g., "DC001")
    pub code: String,
    /// The exit code number
    pub exit_code: i32,
    /// Human-readable error message
    pub message: String,
    /// Underlying causes, outermost first
    pub causes: Vec<String>,
    /// Whether the operation was interrupted
    pub interrupted: bool,
}

impl StructuredError {
    /// Create a new structured error from an anyhow error and an exit code.
    #[must_use]
    pub fn new(err: &anyhow::Error, exit_code: ExitCode) -> Self {
        Self {
            code: exit_code.code_prefix().to_string(),
            exit_code: exit_code.as_i32(),
            message: err.to_string(),
            causes: err.chain().skip(1).map(ToString::to_string).collect(),
            interrupted: exit_code == ExitCode::Interrupted,
        }
    }
}
