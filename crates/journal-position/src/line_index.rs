//! Line index for efficient byte ↔ UTF-16 position lookups.

use crate::{WirePosition, WireRange};

/// Stores line-start offsets for one file, owning the text.
///
/// Built once per parse and reused for every range conversion the file
/// needs. Lines are 0-based on the wire side; columns are UTF-16 code
/// units, matching the editor protocol's default encoding.
#[derive(Debug, Clone)]
pub struct LineIndex {
    /// Byte offset of each line start
    line_starts: Vec<usize>,
    /// The source text
    text: String,
}

impl LineIndex {
    /// Create a new index from source text.
    pub fn new(text: String) -> Self {
        let mut line_starts = vec![0];
        for (i, b) in text.bytes().enumerate() {
            if b == b'\n' {
                line_starts.push(i + 1);
            }
        }
        Self { line_starts, text }
    }

    /// Number of lines (a trailing newline starts a final empty line).
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// The source text backing this index.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The 0-based line containing `offset`.
    pub fn line_of(&self, offset: usize) -> usize {
        self.line_starts.binary_search(&offset).unwrap_or_else(|i| i.saturating_sub(1))
    }

    /// Text of the 0-based `line`, without its trailing newline.
    pub fn line_text(&self, line: usize) -> Option<&str> {
        let start = *self.line_starts.get(line)?;
        let end = self
            .line_starts
            .get(line + 1)
            .map(|next| next.saturating_sub(1))
            .unwrap_or(self.text.len());
        self.text.get(start..end).map(|s| s.trim_end_matches('\r'))
    }

    /// Convert a byte offset to a wire position (0-based line, UTF-16 column).
    ///
    /// Offsets past the end clamp; offsets inside a multi-byte character
    /// floor to its start.
    pub fn offset_to_wire(&self, offset: usize) -> WirePosition {
        let mut offset = offset.min(self.text.len());
        while offset > 0 && !self.text.is_char_boundary(offset) {
            offset -= 1;
        }
        let line = self.line_of(offset);
        let line_start = self.line_starts[line];
        let column: usize = self.text[line_start..offset].chars().map(char::len_utf16).sum();
        WirePosition { line: line as u32, character: column as u32 }
    }

    /// Convert a wire position back to a byte offset.
    ///
    /// Positions past the end of a line clamp to the line end; positions past
    /// the last line clamp to the end of the text.
    pub fn wire_to_offset(&self, pos: WirePosition) -> usize {
        let line = pos.line as usize;
        if line >= self.line_starts.len() {
            return self.text.len();
        }
        let line_start = self.line_starts[line];
        let line_end = self
            .line_starts
            .get(line + 1)
            .map(|next| next.saturating_sub(1))
            .unwrap_or(self.text.len());
        let line_text = &self.text[line_start..line_end];

        let mut utf16 = 0usize;
        let mut bytes = 0usize;
        for ch in line_text.chars() {
            if utf16 >= pos.character as usize {
                break;
            }
            utf16 += ch.len_utf16();
            bytes += ch.len_utf8();
        }
        line_start + bytes.min(line_text.len())
    }

    /// Convert a byte span to a wire range.
    pub fn span_to_wire(&self, start: usize, end: usize) -> WireRange {
        WireRange { start: self.offset_to_wire(start), end: self.offset_to_wire(end) }
    }
}
