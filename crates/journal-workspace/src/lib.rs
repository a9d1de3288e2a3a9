//! Workspace façade for the journal language server.
//!
//! Ties the pipeline together: root discovery finds the primary journal,
//! the resolver materializes the multi-file view, the index aggregates
//! per-file facts, and incremental updates keep everything
//! reachability-closed as the user edits. This crate is the only consumer
//! of the others' mutable surfaces; everything editors read arrives as an
//! immutable snapshot or an owned value.

#![warn(clippy::all)]

mod discovery;
mod workspace;

pub use discovery::{discover_root, discover_root_in};
pub use journal_formatting::{FormatOptions, TextEdit};
pub use journal_index::IndexSnapshot;
pub use journal_resolver::{CancelToken, Cancelled, LoadError};
pub use workspace::{FileAnalysis, Workspace};
