//! One-shot UTF-8 ↔ UTF-16 conversions.
//!
//! For repeated lookups over one file, build a [`LineIndex`](crate::LineIndex)
//! instead; these free functions re-scan the text each call and exist for
//! call sites that translate a single position.

/// Byte offset → (0-based line, UTF-16 column). Out-of-range offsets clamp
/// to the end of the text; offsets inside a multi-byte character floor.
pub fn offset_to_utf16(text: &str, offset: usize) -> (u32, u32) {
    let mut offset = offset.min(text.len());
    while offset > 0 && !text.is_char_boundary(offset) {
        offset -= 1;
    }
    let before = &text[..offset];
    let line = before.bytes().filter(|b| *b == b'\n').count();
    let line_start = before.rfind('\n').map(|i| i + 1).unwrap_or(0);
    let column: usize = before[line_start..].chars().map(char::len_utf16).sum();
    (line as u32, column as u32)
}

/// (0-based line, UTF-16 column) → byte offset. Columns past the end of a
/// line clamp to the line end; lines past the end clamp to the text end.
pub fn utf16_to_offset(text: &str, line: u32, column: u32) -> usize {
    let mut start = 0usize;
    for _ in 0..line {
        match text[start..].find('\n') {
            Some(i) => start += i + 1,
            None => return text.len(),
        }
    }
    let line_end = text[start..].find('\n').map(|i| start + i).unwrap_or(text.len());
    let line_text = &text[start..line_end];

    let mut units = 0usize;
    for (byte, ch) in line_text.char_indices() {
        if units >= column as usize {
            return start + byte;
        }
        units += ch.len_utf16();
    }
    line_end
}
