//! Hand-off of duplicate groups to a backup folder.
//!
//! The move itself has no defined contract yet: whether members are moved
//! or copied, and how conflicts are resolved, is undecided. [`PlanOnly`]
//! therefore validates the request, computes the would-be candidates
//! (every non-original member), logs them, and touches nothing.
//! Callers must never assume a relocation took place; check
//! [`RelocatePlan::performed`].

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use serde::Serialize;

use crate::duplicates::DuplicateGroup;

/// Errors that reject a relocation request.
#[derive(thiserror::Error, Debug)]
pub enum RelocateError {
    /// No backup folder was given.
    #[error("backup folder is empty")]
    EmptyBackupFolder,

    /// The backup folder lies inside the scanned tree.
    #[error("backup folder {backup} is inside the scanned folder {source_root}")]
    InsideSource {
        /// Requested backup folder
        backup: PathBuf,
        /// Root of the scan
        source_root: PathBuf,
    },

    /// A path could not be resolved.
    #[error("cannot resolve {path}: {source}")]
    Resolve {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// What a relocation would involve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelocatePlan {
    /// Destination folder
    pub backup_folder: PathBuf,
    /// Non-original members of every group
    pub candidates: Vec<PathBuf>,
    /// Bytes the candidates occupy
    pub bytes: u64,
    /// Whether the request was a dry run
    pub dry_run: bool,
    /// Whether any file was actually moved
    pub performed: bool,
}

impl RelocatePlan {
    /// Number of files that would be relocated.
    #[must_use]
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    /// Check if there is nothing to relocate.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

/// A "relocate duplicates" action.
pub trait RelocateDuplicates {
    /// Relocate the duplicates of `groups` into `backup_folder`.
    ///
    /// # Errors
    ///
    /// Returns [`RelocateError`] if the request is invalid.
    fn relocate(
        &self,
        backup_folder: &Path,
        groups: &[DuplicateGroup],
        dry_run: bool,
    ) -> Result<RelocatePlan, RelocateError>;
}

/// Placeholder relocator: validates and plans, never moves.
#[derive(Debug, Clone)]
pub struct PlanOnly {
    source_root: PathBuf,
}

impl PlanOnly {
    /// Create a relocator for duplicates found under `source_root`.
    #[must_use]
    pub fn new(source_root: impl Into<PathBuf>) -> Self {
        Self {
            source_root: source_root.into(),
        }
    }
}

fn resolve_error(path: &Path, source: io::Error) -> RelocateError {
    RelocateError::Resolve {
        path: path.to_path_buf(),
        source,
    }
}

/// Resolve `path` to a canonical form, following symlinks and `..`.
///
/// The path need not exist. Its nearest existing ancestor is canonicalized
/// and the missing tail is re-applied lexically.
fn resolve(path: &Path) -> Result<PathBuf, RelocateError> {
    let absolute = std::path::absolute(path).map_err(|e| resolve_error(path, e))?;

    let mut existing = absolute.as_path();
    let mut missing = Vec::new();
    let mut resolved = loop {
        match fs::canonicalize(existing) {
            Ok(canonical) => break canonical,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                match (existing.parent(), existing.components().next_back()) {
                    (Some(parent), Some(last)) => {
                        missing.push(last);
                        existing = parent;
                    }
                    _ => return Err(resolve_error(path, e)),
                }
            }
            Err(e) => return Err(resolve_error(path, e)),
        }
    };

    for component in missing.into_iter().rev() {
        match component {
            Component::ParentDir => {
                resolved.pop();
            }
            Component::CurDir => {}
            other => resolved.push(other),
        }
    }
    Ok(resolved)
}

impl RelocateDuplicates for PlanOnly {
    fn relocate(
        &self,
        backup_folder: &Path,
        groups: &[DuplicateGroup],
        dry_run: bool,
    ) -> Result<RelocatePlan, RelocateError> {
        if backup_folder.as_os_str().is_empty() {
            return Err(RelocateError::EmptyBackupFolder);
        }

        let backup = resolve(backup_folder)?;
        let source_root = resolve(&self.source_root)?;
        if backup.starts_with(&source_root) {
            return Err(RelocateError::InsideSource {
                backup,
                source_root,
            });
        }

        let candidates: Vec<PathBuf> = groups
            .iter()
            .flat_map(DuplicateGroup::duplicates)
            .map(|f| f.path.clone())
            .collect();
        let bytes = groups.iter().map(DuplicateGroup::wasted_space).sum();

        for path in &candidates {
            log::debug!("Relocation candidate: {}", path.display());
        }
        log::info!(
            "{} duplicate files would be relocated to {} (no files were moved)",
            candidates.len(),
            backup.display()
        );

        Ok(RelocatePlan {
            backup_folder: backup,
            candidates,
            bytes,
            dry_run,
            performed: false,
        })
    }
}
