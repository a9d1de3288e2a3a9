use journal_position::Range;
use serde::{Deserialize, Serialize};

/// A `name:value` tag extracted from a comment.
///
/// `value` is empty for bare `name:` tags. The range covers the literal
/// `name:value` text inside the original comment, so editor features can
/// highlight or rename it in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    pub value: String,
    pub range: Range,
}

impl Tag {
    pub fn new(name: impl Into<String>, value: impl Into<String>, range: Range) -> Self {
        Self { name: name.into(), value: value.into(), range }
    }

    pub fn has_value(&self) -> bool {
        !self.value.is_empty()
    }
}
