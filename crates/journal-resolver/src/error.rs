//! Load error taxonomy for include resolution.

use journal_position::{Position, Range};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// An error encountered while materializing the multi-file workspace view.
///
/// Load errors accumulate; none of them aborts the traversal. Each carries
/// the originating include's range when one exists so editors can surface
/// the problem on the `include` line itself.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum LoadError {
    /// The include path (or glob) matched nothing on disk
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf, range: Range },

    /// The file is already part of the current traversal
    #[error("include cycle detected at {path}")]
    CycleDetected { path: PathBuf, range: Range },

    /// The file parsed with recoverable errors
    #[error("parse error in {path}: {message}")]
    Parse { path: PathBuf, message: String, position: Position, range: Range },

    /// The file could not be read
    #[error("cannot read {path}: {message}")]
    ReadError { path: PathBuf, message: String, range: Range },

    /// The file exceeds the per-file size limit
    #[error("{path} is too large ({size} bytes, limit {limit})")]
    FileTooLarge { path: PathBuf, size: u64, limit: u64, range: Range },

    /// The include path ascends too far out of the workspace
    #[error("refusing path traversal: {path}")]
    PathTraversal { path: PathBuf, range: Range },
}

impl LoadError {
    /// The include range this error should be surfaced at.
    pub fn range(&self) -> Range {
        match self {
            LoadError::FileNotFound { range, .. }
            | LoadError::CycleDetected { range, .. }
            | LoadError::Parse { range, .. }
            | LoadError::ReadError { range, .. }
            | LoadError::FileTooLarge { range, .. }
            | LoadError::PathTraversal { range, .. } => *range,
        }
    }

    /// The path the error is about.
    pub fn path(&self) -> &PathBuf {
        match self {
            LoadError::FileNotFound { path, .. }
            | LoadError::CycleDetected { path, .. }
            | LoadError::Parse { path, .. }
            | LoadError::ReadError { path, .. }
            | LoadError::FileTooLarge { path, .. }
            | LoadError::PathTraversal { path, .. } => path,
        }
    }
}

/// Returned when a cancellation token fires mid-resolve; the caller keeps
/// its previous state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("resolution cancelled")]
pub struct Cancelled;
