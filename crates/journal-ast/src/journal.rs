use crate::{Directive, IncludeDirective, Transaction};
use journal_position::Range;
use serde::{Deserialize, Serialize};

/// A standalone (non-inline) comment line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub text: String,
    pub range: Range,
}

/// One parsed journal file.
///
/// Transactions, directives, and comments each preserve source order.
/// `includes` repeats the include directives as a flat list so the resolver
/// can walk them without filtering `directives`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Journal {
    pub transactions: Vec<Transaction>,
    pub directives: Vec<Directive>,
    pub comments: Vec<Comment>,
    pub includes: Vec<IncludeDirective>,
}

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty() && self.directives.is_empty() && self.comments.is_empty()
    }
}
