//! Root journal discovery.
//!
//! Order of precedence:
//!
//! 1. `LEDGER_FILE` environment variable (with `~/` expansion)
//! 2. `HLEDGER_JOURNAL` environment variable
//! 3. `main.journal` in the workspace directory
//! 4. `.hledger.journal` in the workspace directory
//! 5. A workspace scan: among all journal-suffixed files, the
//!    lexicographically smallest one no other journal includes; falling
//!    back to the smallest file overall, then to no root at all.

use journal_resolver::{CancelToken, expand_include, normalize_path};
use rustc_hash::FxHashSet;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Directory names never descended into during the scan.
const EXCLUDED_DIRS: [&str; 6] = [".git", ".hg", ".svn", "node_modules", "vendor", ".cache"];

/// File suffixes that mark a journal.
const JOURNAL_SUFFIXES: [&str; 4] = [".journal", ".j", ".hledger", ".ledger"];

/// Find the root journal for a workspace directory.
pub fn discover_root(directory: &Path) -> Option<PathBuf> {
    for var in ["LEDGER_FILE", "HLEDGER_JOURNAL"] {
        if let Some(path) = env_journal(var) {
            debug!(%var, path = %path.display(), "root from environment");
            return Some(path);
        }
    }
    discover_root_in(directory)
}

/// Steps 3–5: conventional filenames, then the include-graph scan.
pub fn discover_root_in(directory: &Path) -> Option<PathBuf> {
    for name in ["main.journal", ".hledger.journal"] {
        let candidate = directory.join(name);
        if candidate.is_file() {
            return Some(normalize_path(&candidate));
        }
    }

    let files = scan_journal_files(directory);
    if files.is_empty() {
        return None;
    }

    // Build the include graph across every discovered journal; a file
    // nobody includes is a root candidate. The scan itself has no
    // cancellation slot, so the token never trips.
    let never = CancelToken::new();
    let mut included: FxHashSet<PathBuf> = FxHashSet::default();
    for file in &files {
        let Ok(text) = std::fs::read_to_string(file) else { continue };
        let outcome = journal_parser::parse(&text);
        for include in &outcome.journal.includes {
            if let Ok((paths, _)) = expand_include(file, include, &never) {
                included.extend(paths);
            }
        }
    }

    let root = files
        .iter()
        .find(|file| !included.contains(*file))
        .or_else(|| files.first())
        .cloned();
    if let Some(root) = &root {
        debug!(root = %root.display(), candidates = files.len(), "root from workspace scan");
    }
    root
}

/// All journal files under `directory`, sorted lexicographically, with the
/// conventional VCS/tooling directories skipped.
fn scan_journal_files(directory: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(directory)
        .follow_links(false)
        .into_iter()
        .filter_entry(|entry| {
            entry.file_name().to_str().is_none_or(|name| !EXCLUDED_DIRS.contains(&name))
        })
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| {
            entry
                .file_name()
                .to_str()
                .is_some_and(|name| JOURNAL_SUFFIXES.iter().any(|s| name.ends_with(s)))
        })
        .map(|entry| normalize_path(entry.path()))
        .collect();
    files.sort();
    files
}

fn env_journal(var: &str) -> Option<PathBuf> {
    let value = std::env::var_os(var)?;
    let text = value.to_string_lossy();
    let expanded = if let Some(rest) = text.strip_prefix("~/") {
        Path::new(&std::env::var_os("HOME")?).join(rest)
    } else {
        PathBuf::from(text.as_ref())
    };
    expanded.is_file().then(|| normalize_path(&expanded))
}
