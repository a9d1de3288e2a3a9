//! Formatting provider for journal files.
//!
//! Produces an ordered list of [`TextEdit`]s that normalize posting
//! indentation, align amounts into a common column per transaction, and
//! trim trailing whitespace. Edits are expressed in UTF-16 wire units,
//! ready for the editor protocol; amounts re-emit their raw lexical form,
//! so formatting never rewrites a number the user typed.
//!
//! Lines carrying parse errors are left untouched — formatting a broken
//! file must not destroy what the parser could not understand.

#![warn(clippy::all)]

use journal_ast::{Posting, Status, VirtualKind};
use journal_position::{LineIndex, WirePosition, WireRange};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

/// Formatting behavior knobs, mirroring the editor's request options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatOptions {
    /// Posting indentation width in spaces; must be at least 1
    pub indent_size: usize,
    /// Align amounts into a per-transaction column
    pub align_amounts: bool,
    /// Lower bound for the alignment column
    pub min_alignment_column: usize,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self { indent_size: 4, align_amounts: true, min_alignment_column: 0 }
    }
}

/// A single replacement, in UTF-16 wire coordinates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextEdit {
    pub range: WireRange,
    pub new_text: String,
}

/// Errors for invalid formatting requests.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormattingError {
    #[error("invalid formatting options: {reason}")]
    InvalidOptions { reason: String },
}

/// Compute formatting edits for a document.
///
/// Returns one whole-line replacement per line that changes, ordered by
/// line. The result is idempotent: applying the edits and formatting again
/// yields nothing.
pub fn format_document(
    text: &str,
    options: &FormatOptions,
) -> Result<Vec<TextEdit>, FormattingError> {
    if options.indent_size == 0 {
        return Err(FormattingError::InvalidOptions {
            reason: "indent_size must be at least 1".to_string(),
        });
    }

    let outcome = journal_parser::parse(text);
    let line_index = LineIndex::new(text.to_string());

    // Lines the parser complained about stay untouched.
    let error_lines: HashSet<u32> =
        outcome.errors.iter().map(|e| e.position().line - 1).collect();

    // Desired content per 0-based line; lines absent from the map only get
    // trailing-whitespace trimming.
    let mut rendered: Vec<(u32, String)> = Vec::new();
    for transaction in &outcome.journal.transactions {
        let alignment = alignment_column(&transaction.postings, options);
        for posting in &transaction.postings {
            let line = posting.range.start.line - 1;
            if error_lines.contains(&line) {
                continue;
            }
            rendered.push((line, render_posting(posting, options, alignment)));
        }
    }
    rendered.sort_by_key(|(line, _)| *line);

    let mut edits = Vec::new();
    let mut rendered_iter = rendered.into_iter().peekable();
    for line in 0..line_index.line_count() {
        let Some(old) = line_index.line_text(line) else { continue };
        let replacement = match rendered_iter.peek() {
            Some((l, _)) if *l as usize == line => {
                let (_, new_line) = rendered_iter.next().unwrap_or_default();
                new_line
            }
            _ => old.trim_end().to_string(),
        };
        if replacement != old {
            let start = WirePosition::new(line as u32, 0);
            let end = WirePosition::new(line as u32, old.encode_utf16().count() as u32);
            edits.push(TextEdit { range: WireRange::new(start, end), new_text: replacement });
        }
    }
    Ok(edits)
}

/// The column (in characters) where amounts start for this transaction:
/// two spaces past the longest posting prefix, but never left of
/// `min_alignment_column`. Completion and inlay features use the same
/// computation to place amounts consistently with the formatter.
pub fn alignment_column(postings: &[Posting], options: &FormatOptions) -> usize {
    let longest = postings
        .iter()
        .filter(|p| p.amount.is_some())
        .map(|p| options.indent_size + posting_prefix(p).chars().count())
        .max()
        .unwrap_or(0);
    (longest + 2).max(options.min_alignment_column)
}

/// Status flag, virtual wrapper, and account name — everything left of the
/// amount.
fn posting_prefix(posting: &Posting) -> String {
    let mut prefix = String::new();
    match posting.status {
        Status::None => {}
        status => {
            prefix.push_str(&status.to_string());
            prefix.push(' ');
        }
    }
    let account = posting.account.as_str();
    match posting.virtual_kind {
        VirtualKind::None => prefix.push_str(account),
        VirtualKind::Balanced => {
            prefix.push('[');
            prefix.push_str(account);
            prefix.push(']');
        }
        VirtualKind::Unbalanced => {
            prefix.push('(');
            prefix.push_str(account);
            prefix.push(')');
        }
    }
    prefix
}

fn render_posting(posting: &Posting, options: &FormatOptions, alignment: usize) -> String {
    let mut line = " ".repeat(options.indent_size);
    line.push_str(&posting_prefix(posting));

    if let Some(amount) = &posting.amount {
        let current = line.chars().count();
        let pad = if options.align_amounts {
            alignment.saturating_sub(current).max(2)
        } else {
            2
        };
        line.push_str(&" ".repeat(pad));
        line.push_str(&amount.to_string());

        if let Some(cost) = &posting.cost {
            line.push_str(if cost.is_total { " @@ " } else { " @ " });
            line.push_str(&cost.amount.to_string());
        }
        if let Some(assertion) = &posting.assertion {
            line.push_str(if assertion.is_strict { " == " } else { " = " });
            line.push_str(&assertion.amount.to_string());
        }
    }

    if let Some(comment) = &posting.comment {
        line.push_str("  ;");
        if !comment.starts_with(' ') {
            line.push(' ');
        }
        line.push_str(comment.trim_end());
    }
    line
}
