//! Tag extraction from comment text.

use journal_ast::Tag;
use journal_position::{Position, Range};

fn is_tag_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'-'
}

/// Extract `name:value` tags from a comment.
///
/// The comment is split on commas; inside each piece the first run of
/// `[A-Za-z0-9_-]+` immediately followed by `:` names a tag, and the rest
/// of the piece is its value (possibly empty). Tag ranges are located in
/// the original comment text, offset from `base`, the position of the
/// comment payload's first character.
pub fn extract_tags(comment: &str, base: Position) -> Vec<Tag> {
    let mut tags = Vec::new();
    let mut piece_start = 0usize;

    for piece in comment.split(',') {
        if let Some(tag) = tag_in_piece(comment, piece_start, piece, base) {
            tags.push(tag);
        }
        piece_start += piece.len() + 1;
    }
    tags
}

fn tag_in_piece(comment: &str, piece_start: usize, piece: &str, base: Position) -> Option<Tag> {
    let bytes = piece.as_bytes();
    let mut i = 0usize;
    while i < bytes.len() {
        // Find a candidate name run.
        if !is_tag_name_byte(bytes[i]) {
            i += 1;
            continue;
        }
        let name_start = i;
        while i < bytes.len() && is_tag_name_byte(bytes[i]) {
            i += 1;
        }
        if i < bytes.len() && bytes[i] == b':' {
            let name = &piece[name_start..i];
            let value_raw = &piece[i + 1..];
            let value = value_raw.trim();
            // The range covers the literal name:value text.
            let lit_start = piece_start + name_start;
            let lit_end = if value.is_empty() {
                piece_start + i + 1
            } else {
                let value_offset = value_raw.len() - value_raw.trim_start().len();
                piece_start + i + 1 + value_offset + value.len()
            };
            let range = range_within(comment, base, lit_start, lit_end);
            return Some(Tag::new(name, value, range));
        }
        // Name run not followed by a colon; keep scanning the piece.
    }
    None
}

/// Positions for a byte span inside a single-line comment.
fn range_within(comment: &str, base: Position, start: usize, end: usize) -> Range {
    let mut start_pos = base;
    start_pos.advance_str(&comment[..start]);
    let mut end_pos = start_pos;
    end_pos.advance_str(&comment[start..end]);
    Range::new(start_pos, end_pos)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(comment: &str) -> Vec<(String, String)> {
        extract_tags(comment, Position::start())
            .into_iter()
            .map(|t| (t.name, t.value))
            .collect()
    }

    #[test]
    fn single_tag_with_value() {
        assert_eq!(names("type:expense"), vec![("type".into(), "expense".into())]);
    }

    #[test]
    fn bare_tag_has_empty_value() {
        assert_eq!(names("reviewed:"), vec![("reviewed".into(), String::new())]);
    }

    #[test]
    fn comma_separates_tags() {
        assert_eq!(
            names(" a:1, b:2, just words"),
            vec![("a".into(), "1".into()), ("b".into(), "2".into())]
        );
    }

    #[test]
    fn words_without_colon_yield_nothing() {
        assert!(names("no tags here").is_empty());
    }

    #[test]
    fn tag_after_leading_words_is_found() {
        assert_eq!(names("paid via date:2024-02-01"), vec![("date".into(), "2024-02-01".into())]);
    }

    #[test]
    fn ranges_point_into_the_comment() {
        let mut base = Position::start();
        base.advance_str("2024-01-15 x ; "); // comment payload starts here
        let tags = extract_tags("k:v", base);
        assert_eq!(tags.len(), 1);
        let range = tags[0].range;
        assert_eq!(range.start.byte, base.byte);
        assert_eq!(range.end.byte, base.byte + 3);
        assert_eq!(range.start.line, 1);
    }

    #[test]
    fn value_trimming_keeps_range_tight() {
        let tags = extract_tags("k:  spaced  ", Position::start());
        assert_eq!(tags[0].value, "spaced");
        // Range ends at the end of the trimmed value.
        assert_eq!(tags[0].range.end.byte, "k:  spaced".len());
    }
}
