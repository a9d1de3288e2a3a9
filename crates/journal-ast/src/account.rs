use serde::{Deserialize, Serialize};
use std::fmt;

/// A colon-segmented account name: `assets:bank:checking`.
///
/// Segments may contain single internal spaces (`expenses:eating out`);
/// the lexer guarantees no segment contains a run of two or more.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AccountName(String);

impl AccountName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The colon-separated segments, in order.
    pub fn parts(&self) -> impl Iterator<Item = &str> {
        self.0.split(':')
    }

    /// Every strict ancestor, nearest first: `a:b:c` → `a:b`, `a`.
    pub fn ancestors(&self) -> impl Iterator<Item = &str> {
        self.0.char_indices().rev().filter_map(|(i, ch)| (ch == ':').then(|| &self.0[..i]))
    }

    /// The immediate parent account, if any.
    pub fn parent(&self) -> Option<&str> {
        self.0.rsplit_once(':').map(|(parent, _)| parent)
    }

    /// True if `self` equals `other` or sits underneath it.
    pub fn is_under(&self, other: &str) -> bool {
        self.0 == other
            || (self.0.len() > other.len()
                && self.0.starts_with(other)
                && self.0.as_bytes()[other.len()] == b':')
    }
}

impl fmt::Display for AccountName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AccountName {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl From<String> for AccountName {
    fn from(name: String) -> Self {
        Self(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parts_split_on_colons() {
        let name = AccountName::from("assets:bank:checking");
        assert_eq!(name.parts().collect::<Vec<_>>(), vec!["assets", "bank", "checking"]);
    }

    #[test]
    fn ancestors_nearest_first() {
        let name = AccountName::from("a:b:c");
        assert_eq!(name.ancestors().collect::<Vec<_>>(), vec!["a:b", "a"]);
        assert_eq!(AccountName::from("solo").ancestors().count(), 0);
    }

    #[test]
    fn is_under_requires_segment_boundary() {
        let name = AccountName::from("expenses:food");
        assert!(name.is_under("expenses"));
        assert!(name.is_under("expenses:food"));
        assert!(!name.is_under("exp"));
        assert!(!name.is_under("expenses:foo"));
    }

    #[test]
    fn parent_of_top_level_is_none() {
        assert_eq!(AccountName::from("assets").parent(), None);
        assert_eq!(AccountName::from("assets:cash").parent(), Some("assets"));
    }
}
