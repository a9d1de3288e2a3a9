//! Incremental workspace index for journal files.
//!
//! Each reachable file contributes a [`FileIndex`] of derived facts;
//! [`WorkspaceIndex`] aggregates them under reference counts so incremental
//! replace and remove are exact, keeps the include graph in both
//! directions, and hands out [`IndexSnapshot`] deep copies for lock-free
//! concurrent reads.

#![warn(clippy::all)]

mod file_index;
mod fingerprint;
mod snapshot;
mod workspace_index;

pub use file_index::{FileIndex, PostingSummary, TransactionEntry};
pub use fingerprint::transaction_fingerprint;
pub use snapshot::IndexSnapshot;
pub use workspace_index::WorkspaceIndex;
