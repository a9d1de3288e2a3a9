//! Depth-first include traversal with caching and limits.

use crate::cancel::CancelToken;
use crate::error::{Cancelled, LoadError};
use crate::resolved::{ParsedFile, ResolvedJournal};
use journal_ast::IncludeDirective;
use journal_position::Range;
use parking_lot::Mutex;
use rustc_hash::{FxHashMap, FxHashSet};
use std::fs;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

/// Per-file size limit.
pub const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;
/// Maximum include nesting depth per traversal.
pub const MAX_INCLUDE_DEPTH: usize = 50;
/// Maximum `..` components an include path may ascend.
pub const MAX_PARENT_COMPONENTS: usize = 5;

/// Resolves `include` directives into a [`ResolvedJournal`].
///
/// The resolver caches parsed files by absolute path; repeated resolves of
/// an unchanged workspace parse nothing. Invalidation is explicit via
/// [`IncludeResolver::invalidate_file`] or [`IncludeResolver::clear_cache`].
///
/// A failed include never aborts its parent: every failure becomes a
/// [`LoadError`] carrying the include's range.
#[derive(Default)]
pub struct IncludeResolver {
    cache: Mutex<FxHashMap<PathBuf, Arc<ParsedFile>>>,
}

impl IncludeResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve a workspace starting at `root`, reading it from disk.
    pub fn resolve(&self, root: &Path, cancel: &CancelToken) -> Result<ResolvedJournal, Cancelled> {
        self.resolve_inner(root, None, cancel)
    }

    /// Resolve a workspace whose root is an unsaved buffer.
    pub fn resolve_with_content(
        &self,
        root: &Path,
        content: &str,
        cancel: &CancelToken,
    ) -> Result<ResolvedJournal, Cancelled> {
        self.resolve_inner(root, Some(content), cancel)
    }

    /// Drop one file from the parse cache.
    pub fn invalidate_file(&self, path: &Path) {
        self.cache.lock().remove(&normalize_path(path));
    }

    /// Drop everything from the parse cache.
    pub fn clear_cache(&self) {
        self.cache.lock().clear();
    }

    fn resolve_inner(
        &self,
        root: &Path,
        content: Option<&str>,
        cancel: &CancelToken,
    ) -> Result<ResolvedJournal, Cancelled> {
        let root = normalize_path(root);
        debug!(root = %root.display(), "resolving workspace");

        let mut resolved = match content {
            Some(text) => {
                let outcome = journal_parser::parse(text);
                ResolvedJournal::new(root.clone(), outcome.journal, outcome.errors)
            }
            None => match read_limited(&root, Range::default()) {
                Ok(text) => {
                    let outcome = journal_parser::parse(&text);
                    ResolvedJournal::new(root.clone(), outcome.journal, outcome.errors)
                }
                Err(error) => {
                    warn!(root = %root.display(), %error, "root journal failed to load");
                    let mut resolved = ResolvedJournal::new(
                        root.clone(),
                        journal_ast::Journal::default(),
                        Vec::new(),
                    );
                    resolved.errors.push(error);
                    return Ok(resolved);
                }
            },
        };

        let mut visited: FxHashSet<PathBuf> = FxHashSet::default();
        visited.insert(root.clone());
        let includes = resolved.primary.includes.clone();
        self.walk(&root, &includes, 1, &mut visited, &mut resolved, cancel)?;
        Ok(resolved)
    }

    fn walk(
        &self,
        file: &Path,
        includes: &[IncludeDirective],
        depth: usize,
        visited: &mut FxHashSet<PathBuf>,
        resolved: &mut ResolvedJournal,
        cancel: &CancelToken,
    ) -> Result<(), Cancelled> {
        if cancel.is_cancelled() {
            return Err(Cancelled);
        }
        if depth > MAX_INCLUDE_DEPTH {
            resolved.errors.push(LoadError::ReadError {
                path: file.to_path_buf(),
                message: format!("include depth exceeds {MAX_INCLUDE_DEPTH}"),
                range: includes.first().map(|i| i.range).unwrap_or_default(),
            });
            return Ok(());
        }

        for include in includes {
            let (paths, errors) = expand_include(file, include, cancel)?;
            resolved.errors.extend(errors);

            for path in paths {
                if !visited.insert(path.clone()) {
                    resolved.errors.push(LoadError::CycleDetected {
                        path: path.clone(),
                        range: include.range,
                    });
                    continue;
                }
                match self.load_cached(&path, include.range) {
                    Ok(parsed) => {
                        for parse_error in &parsed.errors {
                            resolved.errors.push(LoadError::Parse {
                                path: path.clone(),
                                message: parse_error.to_string(),
                                position: parse_error.position(),
                                range: include.range,
                            });
                        }
                        let child_includes = parsed.journal.includes.clone();
                        resolved.insert_file(path.clone(), parsed);
                        self.walk(&path, &child_includes, depth + 1, visited, resolved, cancel)?;
                    }
                    Err(error) => resolved.errors.push(error),
                }
            }
        }
        Ok(())
    }

    /// See [`expand_include`].
    pub fn expand_include(
        &self,
        from_file: &Path,
        include: &IncludeDirective,
        cancel: &CancelToken,
    ) -> Result<(Vec<PathBuf>, Vec<LoadError>), Cancelled> {
        expand_include(from_file, include, cancel)
    }

    fn load_cached(&self, path: &Path, range: Range) -> Result<Arc<ParsedFile>, LoadError> {
        if let Some(hit) = self.cache.lock().get(path) {
            return Ok(Arc::clone(hit));
        }
        let text = read_limited(path, range)?;
        let outcome = journal_parser::parse(&text);
        let parsed = Arc::new(ParsedFile { journal: outcome.journal, errors: outcome.errors });
        self.cache.lock().insert(path.to_path_buf(), Arc::clone(&parsed));
        debug!(path = %path.display(), "parsed and cached include");
        Ok(parsed)
    }
}

/// Expand one include directive relative to the including file.
///
/// Glob patterns (including the `<->` spelling of `**`) expand against
/// the filesystem, sorted lexicographically, the including file excluded.
/// Plain paths get `~/` expansion and the path-traversal check. Errors are
/// reported rather than returned: the successful portion of a
/// partially-bad expansion still loads.
///
/// Glob expansion can walk large directory trees, so the cancellation
/// token is polled between matches; a trip returns `Err(Cancelled)` with
/// nothing expanded.
pub fn expand_include(
    from_file: &Path,
    include: &IncludeDirective,
    cancel: &CancelToken,
) -> Result<(Vec<PathBuf>, Vec<LoadError>), Cancelled> {
    if cancel.is_cancelled() {
        return Err(Cancelled);
    }
    let range = include.range;
    let text = include.path.replace("<->", "**");
    let base_dir = from_file.parent().unwrap_or_else(|| Path::new("."));
    let mut errors = Vec::new();

    if text.contains(['*', '?', '[']) {
        let pattern_path = if Path::new(&text).is_absolute() {
            PathBuf::from(&text)
        } else {
            base_dir.join(&text)
        };
        let pattern = pattern_path.to_string_lossy();
        let mut matches: Vec<PathBuf> = Vec::new();
        match glob::glob(&pattern) {
            Ok(paths) => {
                for entry in paths {
                    if cancel.is_cancelled() {
                        return Err(Cancelled);
                    }
                    let Ok(path) = entry else { continue };
                    if !path.is_file() {
                        continue;
                    }
                    let path = normalize_path(&path);
                    if path != from_file {
                        matches.push(path);
                    }
                }
            }
            Err(error) => {
                errors.push(LoadError::ReadError {
                    path: PathBuf::from(&text),
                    message: format!("bad glob pattern: {error}"),
                    range,
                });
                return Ok((Vec::new(), errors));
            }
        }
        matches.sort();
        if matches.is_empty() {
            errors.push(LoadError::FileNotFound { path: PathBuf::from(&text), range });
        }
        return Ok((matches, errors));
    }

    let expanded = expand_home(&text);
    let path = Path::new(&expanded);
    if path.is_absolute() {
        return Ok((vec![normalize_path(path)], errors));
    }

    if leading_parent_components(path) > MAX_PARENT_COMPONENTS {
        errors.push(LoadError::PathTraversal { path: path.to_path_buf(), range });
        return Ok((Vec::new(), errors));
    }
    Ok((vec![normalize_path(&base_dir.join(path))], errors))
}

/// Read a file, enforcing the size limit first.
fn read_limited(path: &Path, range: Range) -> Result<String, LoadError> {
    let metadata = fs::metadata(path).map_err(|error| {
        if error.kind() == ErrorKind::NotFound {
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
    fs::read_to_string(path).map_err(|error| LoadError::ReadError {
        path: path.to_path_buf(),
        message: error.to_string(),
        range,
    })
}

/// Lexically normalize a path: fold `.` away, resolve `..` against
/// preceding normal components, never touching the filesystem.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    let mut normals = 0usize;
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if normals > 0 {
                    out.pop();
                    normals -= 1;
                } else if !path.has_root() {
                    out.push("..");
                }
            }
            other => {
                if matches!(other, Component::Normal(_)) {
                    normals += 1;
                }
                out.push(other);
            }
        }
    }
    out
}

fn leading_parent_components(path: &Path) -> usize {
    normalize_path(path)
        .components()
        .take_while(|c| matches!(c, Component::ParentDir))
        .count()
}

fn expand_home(text: &str) -> String {
    if let Some(rest) = text.strip_prefix("~/")
        && let Some(home) = std::env::var_os("HOME")
    {
        return Path::new(&home).join(rest).to_string_lossy().into_owned();
    }
    text.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_folds_dots() {
        assert_eq!(normalize_path(Path::new("/a/b/../c/./d")), PathBuf::from("/a/c/d"));
        assert_eq!(normalize_path(Path::new("a/../../b")), PathBuf::from("../b"));
        assert_eq!(normalize_path(Path::new("/../a")), PathBuf::from("/a"));
    }

    #[test]
    fn parent_component_counting() {
        assert_eq!(leading_parent_components(Path::new("../../x")), 2);
        assert_eq!(leading_parent_components(Path::new("a/../b")), 0);
        assert_eq!(leading_parent_components(Path::new("../../../../../../x")), 6);
    }
}
