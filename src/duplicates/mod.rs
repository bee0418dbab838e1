//! Duplicate detection module.
//!
//! This module provides functionality for:
//! - Grouping file records by fingerprint
//! - Counting duplicate files (all members of a group but the original)
//! - Duplicate group management

pub mod analyzer;
pub mod groups;

pub use analyzer::{
    analyze, analyze_result, count_duplicates, group_by_fingerprint, DuplicateAnalysis,
};
pub use groups::DuplicateGroup;
