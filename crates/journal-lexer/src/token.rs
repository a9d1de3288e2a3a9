//! Token types and structures for the journal lexer

use journal_position::Position;
use std::sync::Arc;

/// Token types for the journal grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenType {
    /// A date-shaped run of digits and separators: `2024-01-15`, `01/15`, `1.5`
    Date(Arc<str>),
    /// Numeric literal, sign and digit grouping included: `-1.234,56`, `1 000`
    Number(Arc<str>),
    /// A standalone sign before a currency glyph or uppercase commodity
    Sign(char),
    /// Commodity symbol; for quoted commodities this is the unquoted text
    Commodity(Arc<str>),
    /// Colon-segmented account name
    Account(Arc<str>),
    /// Free text: descriptions, single-segment account names, include paths
    Text(Arc<str>),
    /// A directive keyword at the start of a line
    Directive(Arc<str>),
    /// Status flag: `*` or `!`
    Status(char),
    /// Comment payload following `;`, leading space preserved
    Comment(Arc<str>),
    /// Leading whitespace of an indented line
    Indent,
    /// Explicit line terminator
    Newline,
    /// `@` unit cost marker
    At,
    /// `@@` total cost marker
    AtAt,
    /// `=` secondary date or loose balance assertion
    Equal,
    /// `==` strict balance assertion
    EqualEqual,
    /// `|` payee/note separator
    Pipe,
    /// `(`
    LeftParen,
    /// `)`
    RightParen,
    /// `[`
    LeftBracket,
    /// `]`
    RightBracket,
    /// End of input, emitted exactly once
    Eof,
}

/// A token with its lexeme and source positions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// The kind of token
    pub token_type: TokenType,
    /// The text exactly as written
    pub text: Arc<str>,
    /// Start position (inclusive)
    pub start: Position,
    /// End position (exclusive)
    pub end: Position,
}

impl Token {
    pub fn new(token_type: TokenType, text: impl Into<Arc<str>>, start: Position, end: Position) -> Self {
        Self { token_type, text: text.into(), start, end }
    }

    /// Length of the lexeme in bytes.
    pub fn len(&self) -> usize {
        self.end.byte - self.start.byte
    }

    pub fn is_empty(&self) -> bool {
        self.start.byte == self.end.byte
    }
}
