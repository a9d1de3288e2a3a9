//! Reference-counted aggregation of file indexes across a workspace.
//!
//! Core component of the parse → resolve → index → analyze pipeline: every
//! file the resolver reaches contributes one [`FileIndex`] here, and editor
//! features read the merged result. Completion wants all account names in
//! the workspace, not one file; diagnostics want workspace-wide declared
//! sets; duplicate detection wants fingerprints across files. This module
//! is where "per file" becomes "per workspace".
//!
//! # Reference counting
//!
//! For each derived name (account, payee, commodity, tag, tag value) the
//! index keeps a count of how many files currently contribute it. The
//! per-file lists are deduplicated, so each file counts once. Replacing or
//! removing a file decrements its old contributions exactly once; a count
//! reaching zero deletes the entry. Aggregates therefore never contain
//! stale names, without ever rescanning unrelated files.
//!
//! # Determinism
//!
//! Count maps are ordered, so every aggregate list comes out alphabetically
//! sorted no matter the order files were indexed or edited in. The include
//! graph is a pair of path-keyed edge maps; nothing here depends on hash
//! iteration order.
//!
//! # Concurrency
//!
//! All mutation happens under one writer-priority reader-writer lock, held
//! for the full duration of each operation. Readers get an
//! [`IndexSnapshot`] — an independent deep copy that stays valid across any
//! number of later updates and never observes a half-applied one.

use crate::file_index::{FileIndex, TransactionEntry};
use crate::snapshot::IndexSnapshot;
use parking_lot::RwLock;
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::BTreeMap;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Thread-safe workspace index.
#[derive(Default)]
pub struct WorkspaceIndex {
    inner: RwLock<IndexState>,
}

#[derive(Default)]
struct IndexState {
    /// Index data per absolute file path
    files: FxHashMap<PathBuf, FileIndex>,
    /// Insertion order, primary file first; drives template selection
    file_order: Vec<PathBuf>,
    accounts: BTreeMap<String, usize>,
    payees: BTreeMap<String, usize>,
    commodities: BTreeMap<String, usize>,
    tags: BTreeMap<String, usize>,
    tag_values: BTreeMap<String, BTreeMap<String, usize>>,
    /// Include graph, forward and reverse edges by path
    forward: FxHashMap<PathBuf, Vec<PathBuf>>,
    reverse: FxHashMap<PathBuf, FxHashSet<PathBuf>>,
}

impl WorkspaceIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install or replace the index for one file.
    ///
    /// An existing index for `path` has its contributions decremented and
    /// its include edges removed before the new ones go in.
    pub fn set_file_index(&self, path: &Path, file_index: FileIndex) {
        let mut state = self.inner.write();
        if let Some(old) = state.files.remove(path) {
            state.remove_contributions(&old);
            state.remove_edges(path);
        } else {
            state.file_order.push(path.to_path_buf());
        }
        state.add_contributions(&file_index);
        state.add_edges(path, &file_index.includes);
        state.files.insert(path.to_path_buf(), file_index);
        debug!(path = %path.display(), files = state.files.len(), "indexed file");
    }

    /// Drop a file and every contribution it made. Returns false when the
    /// path was not indexed.
    pub fn remove_file(&self, path: &Path) -> bool {
        let mut state = self.inner.write();
        let Some(old) = state.files.remove(path) else { return false };
        state.remove_contributions(&old);
        state.remove_edges(path);
        state.file_order.retain(|p| p != path);
        debug!(path = %path.display(), files = state.files.len(), "removed file");
        true
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.inner.read().files.contains_key(path)
    }

    pub fn file_count(&self) -> usize {
        self.inner.read().files.len()
    }

    /// Paths currently indexed, in insertion order.
    pub fn indexed_paths(&self) -> Vec<PathBuf> {
        self.inner.read().file_order.clone()
    }

    /// The resolved include targets recorded for `path`.
    pub fn include_targets(&self, path: &Path) -> Vec<PathBuf> {
        self.inner.read().forward.get(path).cloned().unwrap_or_default()
    }

    /// True when `path` participates in the workspace rooted at `root`:
    /// it is the root, already indexed, or included by an indexed file.
    pub fn is_in_workspace(&self, path: &Path, root: &Path) -> bool {
        if path == root {
            return true;
        }
        let state = self.inner.read();
        state.files.contains_key(path)
            || state.reverse.get(path).is_some_and(|sources| !sources.is_empty())
    }

    /// Every path reachable from `root` over forward include edges,
    /// including paths that are referenced but not (yet) indexed.
    pub fn reachable_from(&self, root: &Path) -> FxHashSet<PathBuf> {
        let state = self.inner.read();
        let mut seen: FxHashSet<PathBuf> = FxHashSet::default();
        let mut queue: VecDeque<PathBuf> = VecDeque::new();
        seen.insert(root.to_path_buf());
        queue.push_back(root.to_path_buf());
        while let Some(path) = queue.pop_front() {
            if let Some(targets) = state.forward.get(&path) {
                for target in targets {
                    if seen.insert(target.clone()) {
                        queue.push_back(target.clone());
                    }
                }
            }
        }
        seen
    }

    /// An independent deep copy of the aggregate state for readers.
    pub fn snapshot(&self) -> IndexSnapshot {
        let state = self.inner.read();

        let mut fingerprints: BTreeMap<String, Vec<(PathBuf, journal_position::Range)>> =
            BTreeMap::new();
        let mut payee_templates: BTreeMap<String, TransactionEntry> = BTreeMap::new();
        for path in &state.file_order {
            let Some(file_index) = state.files.get(path) else { continue };
            for entry in &file_index.transactions {
                fingerprints
                    .entry(entry.fingerprint.clone())
                    .or_default()
                    .push((path.clone(), entry.range));
                payee_templates.insert(entry.payee.clone(), entry.clone());
            }
        }

        IndexSnapshot::build(
            state.accounts.keys().cloned().collect(),
            state.payees.keys().cloned().collect(),
            state.commodities.keys().cloned().collect(),
            state.tags.keys().cloned().collect(),
            state
                .tag_values
                .iter()
                .map(|(tag, values)| (tag.clone(), values.keys().cloned().collect()))
                .collect(),
            fingerprints,
            payee_templates,
            state.file_order.clone(),
        )
    }
}

impl IndexState {
    fn add_contributions(&mut self, file_index: &FileIndex) {
        for name in &file_index.accounts {
            *self.accounts.entry(name.clone()).or_default() += 1;
        }
        for name in &file_index.payees {
            *self.payees.entry(name.clone()).or_default() += 1;
        }
        for name in &file_index.commodities {
            *self.commodities.entry(name.clone()).or_default() += 1;
        }
        for name in &file_index.tags {
            *self.tags.entry(name.clone()).or_default() += 1;
        }
        for (tag, values) in &file_index.tag_values {
            let counts = self.tag_values.entry(tag.clone()).or_default();
            for value in values {
                *counts.entry(value.clone()).or_default() += 1;
            }
        }
    }

    fn remove_contributions(&mut self, file_index: &FileIndex) {
        for name in &file_index.accounts {
            decrement(&mut self.accounts, name);
        }
        for name in &file_index.payees {
            decrement(&mut self.payees, name);
        }
        for name in &file_index.commodities {
            decrement(&mut self.commodities, name);
        }
        for name in &file_index.tags {
            decrement(&mut self.tags, name);
        }
        for (tag, values) in &file_index.tag_values {
            if let Some(counts) = self.tag_values.get_mut(tag) {
                for value in values {
                    decrement(counts, value);
                }
                if counts.is_empty() {
                    self.tag_values.remove(tag);
                }
            }
        }
    }

    fn add_edges(&mut self, path: &Path, includes: &[PathBuf]) {
        if includes.is_empty() {
            return;
        }
        self.forward.insert(path.to_path_buf(), includes.to_vec());
        for target in includes {
            self.reverse.entry(target.clone()).or_default().insert(path.to_path_buf());
        }
    }

    fn remove_edges(&mut self, path: &Path) {
        if let Some(targets) = self.forward.remove(path) {
            for target in targets {
                if let Some(sources) = self.reverse.get_mut(&target) {
                    sources.remove(path);
                    if sources.is_empty() {
                        self.reverse.remove(&target);
                    }
                }
            }
        }
    }
}

fn decrement(map: &mut BTreeMap<String, usize>, key: &str) {
    if let Some(count) = map.get_mut(key) {
        *count = count.saturating_sub(1);
        if *count == 0 {
            map.remove(key);
        }
    }
}
