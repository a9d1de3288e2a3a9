//! The workspace façade: the one mutable aggregate in the system.

use crate::discovery::discover_root;
use journal_analyzer::{Analysis, DeclarationSets, JournalFacts, analyze_journal};
use journal_formatting::{FormatOptions, FormattingError, TextEdit, format_document};
use journal_index::{FileIndex, IndexSnapshot, WorkspaceIndex};
use journal_parser::ParseError;
use journal_position::LineIndex;
use journal_resolver::{
    CancelToken, Cancelled, IncludeResolver, LoadError, MAX_FILE_SIZE, ParsedFile,
    ResolvedJournal, expand_include, normalize_path,
};
use parking_lot::RwLock;
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// What `analyze` returns for one file: analyzer diagnostics, recoverable
/// parse errors, and the file's derived facts.
#[derive(Debug, Clone)]
pub struct FileAnalysis {
    pub diagnostics: Vec<journal_analyzer::Diagnostic>,
    pub parse_errors: Vec<ParseError>,
    pub facts: JournalFacts,
}

#[derive(Default)]
struct WorkspaceState {
    root: Option<PathBuf>,
    resolved: ResolvedJournal,
    index: WorkspaceIndex,
    /// Unsaved editor buffers, keyed by normalized path
    overlays: FxHashMap<PathBuf, String>,
    /// Reachable paths that failed to load; retried only after a change
    load_failures: FxHashSet<PathBuf>,
    commodity_formats: Option<BTreeMap<String, String>>,
    declared_accounts: Option<FxHashSet<String>>,
    declared_commodities: Option<FxHashSet<String>>,
}

impl WorkspaceState {
    fn invalidate_derived(&mut self) {
        self.commodity_formats = None;
        self.declared_accounts = None;
        self.declared_commodities = None;
    }
}

/// One journal workspace: root journal, the files reachable from it, and
/// every derived view editors ask for.
///
/// # Membership
///
/// A file belongs to the workspace when it is the root, already indexed,
/// or referenced by an indexed file's include. Updates for anything else
/// are ignored — a stray `.journal` in the directory does not leak into
/// completion lists. When an edit changes a file's include set, the
/// reachability closure prunes files that fell out of reach and pulls in
/// newly referenced ones (from their open buffer if one exists, from disk
/// otherwise) until a pass adds nothing.
///
/// # Concurrency
///
/// All mutable state lives behind a single reader-writer lock. Updates
/// hold the write lock for their full duration, so a reader either sees
/// the state before an update or after it, never an interleaving. There
/// is no process-wide state: multiple workspaces in one process do not
/// interfere.
pub struct Workspace {
    directory: PathBuf,
    resolver: IncludeResolver,
    state: RwLock<WorkspaceState>,
}

impl Workspace {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            resolver: IncludeResolver::new(),
            state: RwLock::new(WorkspaceState::default()),
        }
    }

    /// The workspace directory this instance serves.
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// The discovered root journal, if any.
    pub fn root(&self) -> Option<PathBuf> {
        self.state.read().root.clone()
    }

    /// Discover the root journal, resolve every include, and build the
    /// full index. On cancellation the previous state stays live.
    pub fn initialize(&self, cancel: &CancelToken) -> Result<(), Cancelled> {
        let Some(root) = discover_root(&self.directory) else {
            let mut state = self.state.write();
            state.root = None;
            state.resolved = ResolvedJournal::default();
            state.index = WorkspaceIndex::new();
            state.load_failures.clear();
            state.invalidate_derived();
            debug!(directory = %self.directory.display(), "no root journal found");
            return Ok(());
        };

        self.resolver.clear_cache();
        let overlays: FxHashMap<PathBuf, String> = self.state.read().overlays.clone();
        let resolved = match overlays.get(&root) {
            Some(text) => self.resolver.resolve_with_content(&root, text, cancel)?,
            None => self.resolver.resolve(&root, cancel)?,
        };

        // The replacement state is built in full before the swap, so a
        // cancellation anywhere below leaves the previous state live.
        let mut fresh = WorkspaceState {
            root: Some(root.clone()),
            resolved,
            index: WorkspaceIndex::new(),
            overlays,
            load_failures: FxHashSet::default(),
            commodity_formats: None,
            declared_accounts: None,
            declared_commodities: None,
        };
        for (path, journal) in fresh.resolved.all_journals() {
            let includes = expanded_includes(path, journal, cancel)?;
            fresh.index.set_file_index(path, FileIndex::from_journal(journal, includes));
        }

        // Unsaved buffers for member files take precedence over what the
        // resolver read from disk.
        let member_overlays: Vec<(PathBuf, String)> =
            fresh.overlays.iter().map(|(p, t)| (p.clone(), t.clone())).collect();
        for (path, text) in member_overlays {
            if path != root {
                self.update_locked(&mut fresh, &path, &text, cancel)?;
            }
        }

        let mut guard = self.state.write();
        // Buffers opened while the build ran win over the snapshot taken
        // at the start.
        for (path, text) in std::mem::take(&mut guard.overlays) {
            fresh.overlays.insert(path, text);
        }
        *guard = fresh;
        debug!(root = %root.display(), files = guard.index.file_count(), "workspace initialized");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Published contract
    // ------------------------------------------------------------------

    /// `open(uri, text)`: record the buffer and reindex if it is part of
    /// the workspace.
    pub fn open(&self, path: &Path, text: &str) -> bool {
        let path = normalize_path(path);
        let mut state = self.state.write();
        state.overlays.insert(path.clone(), text.to_string());
        self.update_locked_now(&mut state, &path, text)
    }

    /// `change(uri, text)`: same shape as `open`.
    pub fn change(&self, path: &Path, text: &str) -> bool {
        self.open(path, text)
    }

    /// `save(uri)`: the buffer already reflects the saved content; refresh
    /// the resolver's view of the path.
    pub fn save(&self, path: &Path) -> bool {
        let path = normalize_path(path);
        self.resolver.invalidate_file(&path);
        let mut state = self.state.write();
        let Some(text) = state.overlays.get(&path).cloned() else { return false };
        self.update_locked_now(&mut state, &path, &text)
    }

    /// `close(uri)`: drop the overlay and fall back to disk content. A
    /// member file that no longer exists on disk leaves the index, and the
    /// reachability closure prunes whatever it alone kept reachable.
    pub fn close(&self, path: &Path) -> bool {
        let path = normalize_path(path);
        let mut state = self.state.write();
        state.overlays.remove(&path);
        match std::fs::read_to_string(&path) {
            Ok(text) => self.update_locked_now(&mut state, &path, &text),
            Err(_) => {
                let Some(root) = state.root.clone() else { return false };
                if path == root || !state.index.remove_file(&path) {
                    return false;
                }
                state.resolved.replace_journal(&path, None);
                state.invalidate_derived();
                let _ = self.reachability_closure(&mut state, &root, &CancelToken::new());
                true
            }
        }
    }

    /// Incrementally reindex one file. Returns `Ok(false)` when the file
    /// is not part of the workspace (not the root, not indexed, not
    /// referenced by any include), in which case nothing changes.
    ///
    /// The token is polled before any mutation and between file loads in
    /// the reachability closure. A trip before mutation leaves the
    /// workspace untouched; a trip inside the closure stops it early with
    /// the index still consistent, and the next update converges.
    pub fn update_file(
        &self,
        path: &Path,
        content: &str,
        cancel: &CancelToken,
    ) -> Result<bool, Cancelled> {
        let path = normalize_path(path);
        let mut state = self.state.write();
        self.update_locked(&mut state, &path, content, cancel)
    }

    /// A deep snapshot of the aggregated index for concurrent readers.
    pub fn index_snapshot(&self) -> IndexSnapshot {
        self.state.read().index.snapshot()
    }

    /// Load errors accumulated by resolution and closure maintenance.
    pub fn load_errors(&self) -> Vec<LoadError> {
        self.state.read().resolved.errors.clone()
    }

    /// Analyze one file: diagnostics, parse errors, and derived facts.
    ///
    /// Declaration suppression consults the workspace-wide declared sets,
    /// so an `account` directive in the root suppresses warnings in an
    /// included file. Files outside the workspace analyze standalone from
    /// their overlay or disk content.
    pub fn analyze(&self, path: &Path) -> FileAnalysis {
        let path = normalize_path(path);
        let external = DeclarationSets {
            accounts: self.declared_accounts(),
            commodities: self.declared_commodities(),
        };

        let state = self.state.read();
        if let Some(journal) = state.resolved.journal(&path) {
            let Analysis { diagnostics, facts } = analyze_journal(journal, &external);
            return FileAnalysis {
                diagnostics,
                parse_errors: state.resolved.parse_errors(&path).to_vec(),
                facts,
            };
        }

        let content = state
            .overlays
            .get(&path)
            .cloned()
            .or_else(|| std::fs::read_to_string(&path).ok())
            .unwrap_or_default();
        drop(state);
        let outcome = journal_parser::parse(&content);
        let Analysis { diagnostics, facts } = analyze_journal(&outcome.journal, &external);
        FileAnalysis { diagnostics, parse_errors: outcome.errors, facts }
    }

    /// Formatting edits for explicit text, per the published contract.
    pub fn format(
        &self,
        _path: &Path,
        text: &str,
        options: &FormatOptions,
    ) -> Result<Vec<TextEdit>, FormattingError> {
        format_document(text, options)
    }

    /// A byte ↔ UTF-16 translator over the file's current content
    /// (overlay first, then disk).
    pub fn position_map(&self, path: &Path) -> Option<LineIndex> {
        let path = normalize_path(path);
        let state = self.state.read();
        let content = state
            .overlays
            .get(&path)
            .cloned()
            .or_else(|| std::fs::read_to_string(&path).ok())?;
        Some(LineIndex::new(content))
    }

    // ------------------------------------------------------------------
    // Memoized derived views
    // ------------------------------------------------------------------

    /// Commodity symbol → format string, from `commodity`/`D` directives
    /// with first-seen amounts as fallback. Memoized until the next update.
    pub fn commodity_formats(&self) -> BTreeMap<String, String> {
        let mut state = self.state.write();
        if state.commodity_formats.is_none() {
            let mut formats = BTreeMap::new();
            for (_, journal) in state.resolved.all_journals() {
                for directive in &journal.directives {
                    match directive {
                        journal_ast::Directive::Commodity(c) => {
                            if let Some(format) = &c.format {
                                formats.entry(c.symbol.clone()).or_insert_with(|| format.clone());
                            }
                        }
                        journal_ast::Directive::DefaultCommodity(d) => {
                            if let Some(format) = &d.format {
                                formats.entry(d.symbol.clone()).or_insert_with(|| format.clone());
                            }
                        }
                        _ => {}
                    }
                }
                for transaction in &journal.transactions {
                    for posting in &transaction.postings {
                        if let Some(amount) = &posting.amount
                            && amount.has_commodity()
                        {
                            formats
                                .entry(amount.commodity.clone())
                                .or_insert_with(|| amount.to_string());
                        }
                    }
                }
            }
            state.commodity_formats = Some(formats);
        }
        state.commodity_formats.clone().unwrap_or_default()
    }

    /// Accounts declared anywhere in the resolved workspace. Memoized.
    pub fn declared_accounts(&self) -> FxHashSet<String> {
        let mut state = self.state.write();
        if state.declared_accounts.is_none() {
            let set = state
                .resolved
                .all_journals()
                .flat_map(|(_, journal)| journal_analyzer::declared_accounts(journal))
                .collect();
            state.declared_accounts = Some(set);
        }
        state.declared_accounts.clone().unwrap_or_default()
    }

    /// Commodities declared anywhere in the resolved workspace. Memoized.
    pub fn declared_commodities(&self) -> FxHashSet<String> {
        let mut state = self.state.write();
        if state.declared_commodities.is_none() {
            let set = state
                .resolved
                .all_journals()
                .flat_map(|(_, journal)| journal_analyzer::declared_commodities(journal))
                .collect();
            state.declared_commodities = Some(set);
        }
        state.declared_commodities.clone().unwrap_or_default()
    }

    // ------------------------------------------------------------------
    // Incremental update internals
    // ------------------------------------------------------------------

    /// The notification paths (`open`/`change`/`save`/`close`) carry no
    /// cancellation slot; they update with a token that never trips.
    fn update_locked_now(&self, state: &mut WorkspaceState, path: &Path, content: &str) -> bool {
        self.update_locked(state, path, content, &CancelToken::new()).unwrap_or(false)
    }

    fn update_locked(
        &self,
        state: &mut WorkspaceState,
        path: &Path,
        content: &str,
        cancel: &CancelToken,
    ) -> Result<bool, Cancelled> {
        if cancel.is_cancelled() {
            return Err(Cancelled);
        }
        let Some(root) = state.root.clone() else { return Ok(false) };
        if !state.index.is_in_workspace(path, &root) {
            return Ok(false);
        }

        // Everything cancellable happens before the first mutation.
        let outcome = journal_parser::parse(content);
        let includes = expanded_includes(path, &outcome.journal, cancel)?;
        let old_includes = state.index.include_targets(path);

        state.index.set_file_index(path, FileIndex::from_journal(&outcome.journal, includes.clone()));
        state
            .resolved
            .replace_journal(path, Some(ParsedFile { journal: outcome.journal, errors: outcome.errors }));
        self.resolver.invalidate_file(path);
        state.load_failures.remove(path);
        state.invalidate_derived();

        if includes != old_includes {
            self.reachability_closure(state, &root, cancel)?;
        }
        Ok(true)
    }

    /// Recompute the set of files reachable from the root: prune files no
    /// longer reachable, pull in newly reachable ones, repeat until a pass
    /// adds nothing. The token is polled between file loads; a trip stops
    /// the loop with the counts still consistent.
    fn reachability_closure(
        &self,
        state: &mut WorkspaceState,
        root: &Path,
        cancel: &CancelToken,
    ) -> Result<(), Cancelled> {
        loop {
            let reachable = state.index.reachable_from(root);

            for path in state.index.indexed_paths() {
                if !reachable.contains(&path) {
                    state.index.remove_file(&path);
                    state.resolved.replace_journal(&path, None);
                    debug!(path = %path.display(), "pruned unreachable file");
                }
            }

            let mut targets: Vec<PathBuf> = reachable.into_iter().collect();
            targets.sort();
            let mut added = false;
            for path in targets {
                if cancel.is_cancelled() {
                    return Err(Cancelled);
                }
                if path == root
                    || state.index.contains(&path)
                    || state.load_failures.contains(&path)
                {
                    continue;
                }
                let content = match state.overlays.get(&path) {
                    Some(text) => text.clone(),
                    None => match read_within_limit(&path) {
                        Ok(text) => text,
                        Err(error) => {
                            warn!(path = %path.display(), %error, "reachable file failed to load");
                            state.load_failures.insert(path.clone());
                            state.resolved.errors.push(error);
                            continue;
                        }
                    },
                };
                let outcome = journal_parser::parse(&content);
                let includes = expanded_includes(&path, &outcome.journal, cancel)?;
                state
                    .index
                    .set_file_index(&path, FileIndex::from_journal(&outcome.journal, includes));
                state.resolved.replace_journal(
                    &path,
                    Some(ParsedFile { journal: outcome.journal, errors: outcome.errors }),
                );
                debug!(path = %path.display(), "indexed newly reachable file");
                added = true;
            }

            if !added {
                break;
            }
        }
        Ok(())
    }
}

/// All include targets of a journal, glob-expanded relative to its file.
fn expanded_includes(
    path: &Path,
    journal: &journal_ast::Journal,
    cancel: &CancelToken,
) -> Result<Vec<PathBuf>, Cancelled> {
    let mut all = Vec::new();
    for include in &journal.includes {
        let (paths, _) = expand_include(path, include, cancel)?;
        all.extend(paths);
    }
    Ok(all)
}

fn read_within_limit(path: &Path) -> Result<String, LoadError> {
    let range = journal_position::Range::default();
    let metadata = std::fs::metadata(path).map_err(|error| {
        if error.kind() == std::io::ErrorKind::NotFound {
            LoadError::FileNotFound { path: path.to_path_buf(), range }
        } else {
            LoadError::ReadError { path: path.to_path_buf(), message: error.to_string(), range }
        }
    })?;
    if metadata.len() > MAX_FILE_SIZE {
        return Err(LoadError::FileTooLarge {
            path: path.to_path_buf(),
            size: metadata.len(),
            limit: MAX_FILE_SIZE,
            range,
        });
    }
    std::fs::read_to_string(path).map_err(|error| LoadError::ReadError {
        path: path.to_path_buf(),
        message: error.to_string(),
        range,
    })
}
