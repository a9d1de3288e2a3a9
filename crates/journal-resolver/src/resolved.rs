//! The materialized multi-file workspace view.

use crate::error::LoadError;
use journal_ast::Journal;
use journal_parser::ParseError;
use rustc_hash::FxHashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A parsed file with its recoverable parse errors.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParsedFile {
    pub journal: Journal,
    pub errors: Vec<ParseError>,
}

/// The primary journal plus every journal reachable through includes.
///
/// The primary journal is owned uniquely; included journals are shared
/// with the resolver's cache. `file_order` fixes a deterministic iteration
/// order: files appear in the order the depth-first traversal first loaded
/// them.
#[derive(Debug, Clone, Default)]
pub struct ResolvedJournal {
    pub root_path: PathBuf,
    pub primary: Journal,
    /// Parse errors of the primary journal
    pub primary_errors: Vec<ParseError>,
    files: FxHashMap<PathBuf, Arc<ParsedFile>>,
    file_order: Vec<PathBuf>,
    pub errors: Vec<LoadError>,
}

impl ResolvedJournal {
    pub fn new(root_path: PathBuf, primary: Journal, primary_errors: Vec<ParseError>) -> Self {
        Self {
            root_path,
            primary,
            primary_errors,
            files: FxHashMap::default(),
            file_order: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Record an included file. First insertion fixes its iteration slot.
    pub fn insert_file(&mut self, path: PathBuf, file: Arc<ParsedFile>) {
        if !self.files.contains_key(&path) {
            self.file_order.push(path.clone());
        }
        self.files.insert(path, file);
    }

    /// The journal loaded for `path`: the primary when `path` is the root,
    /// an included file otherwise.
    pub fn journal(&self, path: &Path) -> Option<&Journal> {
        if path == self.root_path {
            return Some(&self.primary);
        }
        self.files.get(path).map(|file| &file.journal)
    }

    /// Recoverable parse errors recorded for `path`.
    pub fn parse_errors(&self, path: &Path) -> &[ParseError] {
        if path == self.root_path {
            return &self.primary_errors;
        }
        self.files.get(path).map(|file| file.errors.as_slice()).unwrap_or(&[])
    }

    /// Included file paths in deterministic first-loaded order.
    pub fn file_order(&self) -> &[PathBuf] {
        &self.file_order
    }

    /// Every journal, primary first, then included files in order.
    pub fn all_journals(&self) -> impl Iterator<Item = (&Path, &Journal)> {
        std::iter::once((self.root_path.as_path(), &self.primary)).chain(
            self.file_order
                .iter()
                .filter_map(|path| self.files.get(path).map(|f| (path.as_path(), &f.journal))),
        )
    }

    /// Replace one file's journal after an edit. `None` removes the entry.
    /// Replacing the root swaps the primary journal.
    pub fn replace_journal(&mut self, path: &Path, file: Option<ParsedFile>) {
        if path == self.root_path {
            if let Some(file) = file {
                self.primary = file.journal;
                self.primary_errors = file.errors;
            }
            return;
        }
        match file {
            Some(file) => self.insert_file(path.to_path_buf(), Arc::new(file)),
            None => {
                self.files.remove(path);
                self.file_order.retain(|p| p != path);
            }
        }
    }
}
