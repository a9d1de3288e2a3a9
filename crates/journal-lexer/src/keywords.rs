//! Directive keyword table.

/// The fixed set of directive keywords recognized at the start of a line.
///
/// Matching is exact and case-sensitive; `Account` or `INCLUDE` fall back to
/// account/text scanning.
static DIRECTIVES: phf::Set<&'static str> = phf::phf_set! {
    "account",
    "alias",
    "apply",
    "assert",
    "bucket",
    "capture",
    "check",
    "comment",
    "commodity",
    "D",
    "decimal-mark",
    "def",
    "define",
    "end",
    "eval",
    "expr",
    "include",
    "payee",
    "P",
    "tag",
    "test",
    "Y",
    "year",
};

/// True if `word` is a directive keyword.
pub fn is_directive(word: &str) -> bool {
    DIRECTIVES.contains(word)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords_match_exactly() {
        assert!(is_directive("account"));
        assert!(is_directive("P"));
        assert!(is_directive("decimal-mark"));
        assert!(is_directive("year"));
    }

    #[test]
    fn matching_is_case_sensitive() {
        assert!(!is_directive("Account"));
        assert!(!is_directive("p"));
        assert!(!is_directive("YEAR"));
    }

    #[test]
    fn non_keywords_fall_through() {
        assert!(!is_directive("accounts"));
        assert!(!is_directive("incl"));
        assert!(!is_directive(""));
    }
}
