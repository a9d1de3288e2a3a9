use crate::{Date, Posting, Tag};
use journal_position::Range;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Transaction or posting status flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Status {
    /// No flag
    #[default]
    None,
    /// `!`
    Pending,
    /// `*`
    Cleared,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::None => Ok(()),
            Status::Pending => f.write_str("!"),
            Status::Cleared => f.write_str("*"),
        }
    }
}

/// A dated entry with its postings.
///
/// The description line may split at `|` into payee and note; when it does
/// not, [`Transaction::payee_or_description`] falls back to the whole
/// description so indexing always has a payee key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub date: Date,
    /// Secondary date after `=`, if any
    pub secondary_date: Option<Date>,
    pub status: Status,
    /// Code written in parentheses after the status
    pub code: Option<String>,
    /// Payee: text before `|`, or empty when the description has no `|`
    pub payee: String,
    /// The full description as written
    pub description: String,
    /// Note: text after `|`, if any
    pub note: Option<String>,
    pub postings: Vec<Posting>,
    /// Tags from the header comment
    pub tags: Vec<Tag>,
    /// Header comment text, `;` stripped
    pub comment: Option<String>,
    pub range: Range,
}

impl Transaction {
    pub fn new(date: Date, description: impl Into<String>) -> Self {
        let description = description.into();
        let (payee, note) = match description.split_once('|') {
            Some((payee, note)) => (payee.trim().to_string(), Some(note.trim().to_string())),
            None => (String::new(), None),
        };
        Self {
            date,
            secondary_date: None,
            status: Status::None,
            code: None,
            payee,
            description,
            note,
            postings: Vec::new(),
            tags: Vec::new(),
            comment: None,
            range: Range::default(),
        }
    }

    /// The explicit payee when the description had one, else the whole
    /// description. This is the key indexing and fingerprinting use.
    pub fn payee_or_description(&self) -> &str {
        if self.payee.is_empty() { self.description.trim() } else { &self.payee }
    }
}
