//! Context-aware lexer for plain-text accounting journals.
//!
//! Journal grammar is line-oriented and context-sensitive: the same glyphs
//! mean different things depending on where a line started. `2024-01-15` is
//! a date at column 1 but part of a description elsewhere; `EUR` is a
//! commodity after an amount but an account segment before one; `(` opens a
//! transaction code on a header line and a virtual posting inside one. The
//! lexer resolves these with a small per-line context plus explicit
//! lookahead predicates rather than grammar productions.
//!
//! # Architecture
//!
//! - **Two-state line machine**: the lexer is either at a line start or
//!   inside a line. Leading whitespace becomes an [`TokenType::Indent`]
//!   token; newlines are explicit [`TokenType::Newline`] tokens.
//! - **Line contexts**: the first token of a line (date, directive keyword,
//!   indent) selects how the rest of the line is scanned.
//! - **Tolerance**: the lexer never fails. Unterminated quotes and codes
//!   close at end of line; malformed input degrades to [`TokenType::Text`]
//!   and is the parser's recovery problem.
//!
//! # Usage
//!
//! ```
//! use journal_lexer::{Lexer, TokenType};
//!
//! let mut lexer = Lexer::new("2024-01-15 grocery run\n    expenses:food  $50\n");
//! let kinds: Vec<_> = lexer.by_ref().map(|t| t.token_type).collect();
//! assert!(matches!(kinds[0], TokenType::Date(_)));
//! assert!(matches!(kinds.last(), Some(TokenType::Eof)));
//! ```

#![warn(clippy::all)]

use journal_position::Position;
use std::sync::Arc;

mod keywords;
pub mod token;

pub use keywords::is_directive;
pub use token::{Token, TokenType};

/// Currency glyphs lexed as single-rune commodities.
const CURRENCY_GLYPHS: [char; 6] = ['$', '€', '£', '¥', '₽', '₴'];

/// True for the one-rune commodity symbols.
pub fn is_currency_glyph(ch: char) -> bool {
    CURRENCY_GLYPHS.contains(&ch)
}

/// How the current line is being scanned, decided by its first token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineContext {
    /// No token emitted on this line yet
    Start,
    /// Line began with a date; `prefix` is true until the description starts
    Header { prefix: bool, expect_secondary: bool },
    /// Line began with indentation
    Posting { account_seen: bool },
    /// Line began with a directive keyword
    Directive(DirectiveArgs),
    /// Anything else; scanned as account-or-text
    Other,
}

/// Argument scanning mode for the directive that opened the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DirectiveArgs {
    /// `account` — one account name, then comment
    Account { name_seen: bool },
    /// `commodity` / `D` — amount-shaped arguments
    Amount,
    /// `P` — date, commodity, price amount
    Price { date_seen: bool },
    /// `Y` / `year` — bare number argument
    Plain,
    /// `include` and the rest — remainder of line is opaque text
    Rest,
}

/// Pending scan mode for text between parentheses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParenInner {
    /// Transaction code: one opaque text token until `)` or end of line
    Code,
}

/// Tolerant single-pass journal lexer.
///
/// Produced tokens carry their lexeme and start/end [`Position`]s. The
/// lexer is a finite iterator: it yields [`TokenType::Eof`] exactly once,
/// then `None`.
pub struct Lexer<'a> {
    input: &'a str,
    /// Cached input bytes for faster access
    input_bytes: &'a [u8],
    /// Current byte offset
    position: usize,
    /// Current line/column, kept in lockstep with `position`
    pos: Position,
    at_line_start: bool,
    context: LineContext,
    paren_inner: Option<ParenInner>,
    eof_emitted: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            input_bytes: input.as_bytes(),
            position: 0,
            pos: Position::start(),
            at_line_start: true,
            context: LineContext::Start,
            paren_inner: None,
            eof_emitted: false,
        }
    }

    /// The next token, or `None` once the stream is exhausted.
    pub fn next_token(&mut self) -> Option<Token> {
        loop {
            if self.position >= self.input.len() {
                if self.eof_emitted {
                    return None;
                }
                self.eof_emitted = true;
                return Some(Token::new(TokenType::Eof, "", self.pos, self.pos));
            }

            let b = self.input_bytes[self.position];

            if self.at_line_start {
                if b == b' ' || b == b'\t' {
                    if let Some(token) = self.try_indent() {
                        return Some(token);
                    }
                    continue;
                }
                if b != b'\n' && b != b'\r' {
                    self.at_line_start = false;
                    self.context = LineContext::Start;
                }
            }

            match b {
                b'\n' => return Some(self.consume_newline()),
                b'\r' => {
                    if self.peek_byte(1) == Some(b'\n') {
                        self.bump_to(self.position + 1);
                        continue;
                    }
                    return Some(self.consume_newline());
                }
                b' ' | b'\t' => {
                    self.skip_inline_whitespace();
                    continue;
                }
                b';' => return Some(self.scan_comment()),
                b'@' => return Some(self.scan_repeatable(b'@', TokenType::At, TokenType::AtAt)),
                b'=' => {
                    let token =
                        self.scan_repeatable(b'=', TokenType::Equal, TokenType::EqualEqual);
                    if let LineContext::Header { prefix: true, expect_secondary } =
                        &mut self.context
                        && token.token_type == TokenType::Equal
                    {
                        *expect_secondary = true;
                    }
                    return Some(token);
                }
                b'|' => return Some(self.scan_single(TokenType::Pipe)),
                b'(' => return Some(self.scan_paren_open()),
                b')' => {
                    self.paren_inner = None;
                    // A closed virtual wrapper counts as the account slot.
                    if let LineContext::Posting { account_seen } = &mut self.context {
                        *account_seen = true;
                    }
                    return Some(self.scan_single(TokenType::RightParen));
                }
                b'[' => return Some(self.scan_single(TokenType::LeftBracket)),
                b']' => return Some(self.scan_single(TokenType::RightBracket)),
                b'"' if self.in_amount_context() => {
                    return Some(self.scan_quoted_commodity());
                }
                b'*' | b'!' if self.at_status_position() && self.followed_by_whitespace(1) => {
                    let token = self.scan_single(TokenType::Status(b as char));
                    return Some(token);
                }
                _ => {
                    if let Some(token) = self.scan_in_context() {
                        return Some(token);
                    }
                    // Nothing matched; consume one char as text so the
                    // stream always makes progress.
                    return Some(self.scan_fallback_char());
                }
            }
        }
    }

    // ------------------------------------------------------------------
    // Context dispatch
    // ------------------------------------------------------------------

    fn scan_in_context(&mut self) -> Option<Token> {
        if self.paren_inner == Some(ParenInner::Code) {
            return Some(self.scan_code_text());
        }

        let b = self.input_bytes[self.position];
        match self.context {
            LineContext::Start => self.scan_line_first(),
            LineContext::Header { prefix, expect_secondary } => {
                if prefix && expect_secondary && b.is_ascii_digit() {
                    let token = self.scan_date();
                    self.context =
                        LineContext::Header { prefix: true, expect_secondary: false };
                    return Some(token);
                }
                self.context = LineContext::Header { prefix: false, expect_secondary: false };
                Some(self.scan_description())
            }
            LineContext::Posting { account_seen } => {
                if account_seen {
                    self.scan_amount_piece()
                } else {
                    let token = self.scan_account_or_text()?;
                    self.context = LineContext::Posting { account_seen: true };
                    Some(token)
                }
            }
            LineContext::Directive(args) => self.scan_directive_args(args),
            LineContext::Other => {
                if b.is_ascii_digit() || b == b'+' || b == b'-' {
                    self.scan_amount_piece()
                } else {
                    Some(self.scan_description())
                }
            }
        }
    }

    /// First token of a non-indented line: date, number, directive keyword,
    /// or account/text fallback.
    fn scan_line_first(&mut self) -> Option<Token> {
        let b = self.input_bytes[self.position];
        if b.is_ascii_digit() {
            if self.looks_like_date(self.position) {
                let token = self.scan_date();
                self.context = LineContext::Header { prefix: true, expect_secondary: false };
                return Some(token);
            }
            self.context = LineContext::Other;
            return Some(self.scan_number());
        }

        if let Some(token) = self.try_directive_keyword() {
            return Some(token);
        }

        self.context = LineContext::Other;
        self.scan_account_or_text()
    }

    fn scan_directive_args(&mut self, args: DirectiveArgs) -> Option<Token> {
        let b = self.input_bytes[self.position];
        match args {
            DirectiveArgs::Rest => Some(self.scan_rest_of_line()),
            DirectiveArgs::Account { name_seen } => {
                if name_seen {
                    Some(self.scan_rest_of_line())
                } else {
                    let token = self.scan_account_or_text()?;
                    self.context =
                        LineContext::Directive(DirectiveArgs::Account { name_seen: true });
                    Some(token)
                }
            }
            DirectiveArgs::Amount => self.scan_amount_piece(),
            DirectiveArgs::Price { date_seen } => {
                if !date_seen && b.is_ascii_digit() {
                    let token = self.scan_date();
                    self.context =
                        LineContext::Directive(DirectiveArgs::Price { date_seen: true });
                    return Some(token);
                }
                self.scan_amount_piece()
            }
            DirectiveArgs::Plain => {
                if b.is_ascii_digit() || b == b'+' || b == b'-' {
                    Some(self.scan_number())
                } else {
                    Some(self.scan_description())
                }
            }
        }
    }

    /// A number, sign, or commodity word inside an amount region.
    fn scan_amount_piece(&mut self) -> Option<Token> {
        let b = self.input_bytes[self.position];
        if b.is_ascii_digit() {
            return Some(self.scan_number());
        }
        if b == b'+' || b == b'-' {
            return Some(self.scan_sign_or_number());
        }
        let ch = self.current_char()?;
        if ch.is_alphabetic() || is_currency_glyph(ch) {
            return Some(self.scan_commodity_word());
        }
        None
    }

    // ------------------------------------------------------------------
    // Scanners
    // ------------------------------------------------------------------

    fn try_indent(&mut self) -> Option<Token> {
        let bytes = self.input_bytes;
        let mut end = self.position;
        while end < bytes.len() && (bytes[end] == b' ' || bytes[end] == b'\t') {
            end += 1;
        }
        if end >= bytes.len() || bytes[end] == b'\n' || bytes[end] == b'\r' {
            // Whitespace-only line: no indent token, let the newline handle it.
            self.bump_to(end);
            return None;
        }
        self.at_line_start = false;
        self.context = LineContext::Posting { account_seen: false };
        Some(self.emit_to(end, |_| TokenType::Indent))
    }

    fn consume_newline(&mut self) -> Token {
        let token = self.emit_to(self.position + 1, |_| TokenType::Newline);
        self.at_line_start = true;
        self.context = LineContext::Start;
        self.paren_inner = None;
        token
    }

    fn skip_inline_whitespace(&mut self) {
        let bytes = self.input_bytes;
        let mut end = self.position;
        while end < bytes.len() && (bytes[end] == b' ' || bytes[end] == b'\t') {
            end += 1;
        }
        self.bump_to(end);
    }

    /// `;` through end of line. The payload keeps its leading space.
    fn scan_comment(&mut self) -> Token {
        let start_state = self.pos;
        let payload_start = self.position + 1;
        let end = self.find_line_end(payload_start);
        let payload = Arc::<str>::from(&self.input[payload_start..end]);
        let text = &self.input[self.position..end];
        let token_text: Arc<str> = Arc::from(text);
        self.bump_to(end);
        Token::new(TokenType::Comment(payload), token_text, start_state, self.pos)
    }

    /// `@`/`@@` or `=`/`==`.
    fn scan_repeatable(&mut self, byte: u8, single: TokenType, double: TokenType) -> Token {
        let end = if self.peek_byte(1) == Some(byte) { self.position + 2 } else { self.position + 1 };
        let kind = if end - self.position == 2 { double } else { single };
        self.emit_to(end, |_| kind.clone())
    }

    fn scan_single(&mut self, kind: TokenType) -> Token {
        self.emit_to(self.position + 1, |_| kind.clone())
    }

    /// `(` opens a virtual posting when the enclosed text contains `:`
    /// before the matching `)` or end of line; otherwise it opens a
    /// transaction code and the inner text is opaque.
    fn scan_paren_open(&mut self) -> Token {
        if !self.paren_opens_virtual(self.position) {
            self.paren_inner = Some(ParenInner::Code);
        }
        self.scan_single(TokenType::LeftParen)
    }

    fn paren_opens_virtual(&self, open: usize) -> bool {
        let bytes = self.input_bytes;
        let mut i = open + 1;
        while i < bytes.len() {
            match bytes[i] {
                b':' => return true,
                b')' | b'\n' | b'\r' => return false,
                _ => i += 1,
            }
        }
        false
    }

    /// Opaque text between a code `(` and its `)` or end of line.
    fn scan_code_text(&mut self) -> Token {
        self.paren_inner = None;
        let bytes = self.input_bytes;
        let mut end = self.position;
        while end < bytes.len() && bytes[end] != b')' && bytes[end] != b'\n' && bytes[end] != b'\r'
        {
            end += 1;
        }
        self.emit_to(end, |text| TokenType::Text(Arc::from(text)))
    }

    /// A quoted commodity: spaces allowed, closes gracefully at end of line.
    fn scan_quoted_commodity(&mut self) -> Token {
        let bytes = self.input_bytes;
        let mut end = self.position + 1;
        while end < bytes.len() && bytes[end] != b'"' && bytes[end] != b'\n' && bytes[end] != b'\r'
        {
            end += 1;
        }
        let inner: Arc<str> = Arc::from(&self.input[self.position + 1..end]);
        if end < bytes.len() && bytes[end] == b'"' {
            end += 1;
        }
        self.emit_to(end, move |_| TokenType::Commodity(inner.clone()))
    }

    /// A run of digits and date separators. Validation happens in the parser.
    fn scan_date(&mut self) -> Token {
        let bytes = self.input_bytes;
        let mut end = self.position;
        while end < bytes.len() {
            let b = bytes[end];
            if b.is_ascii_digit() {
                end += 1;
            } else if matches!(b, b'-' | b'/' | b'.')
                && end + 1 < bytes.len()
                && bytes[end + 1].is_ascii_digit()
            {
                end += 1;
            } else {
                break;
            }
        }
        self.emit_to(end, |text| TokenType::Date(Arc::from(text)))
    }

    /// True when a digit run at `start` continues into a date separator
    /// followed by another digit. `2024` alone is a number; `1.5` is a
    /// (partial) date.
    fn looks_like_date(&self, start: usize) -> bool {
        let bytes = self.input_bytes;
        let mut i = start;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        i > start
            && i < bytes.len()
            && matches!(bytes[i], b'-' | b'/' | b'.')
            && i + 1 < bytes.len()
            && bytes[i + 1].is_ascii_digit()
    }

    /// A `+`/`-` that is its own token only when the next non-space glyph is
    /// a currency symbol or an uppercase commodity; otherwise the sign
    /// belongs to the number that follows.
    fn scan_sign_or_number(&mut self) -> Token {
        match self.peek_nonspace_char(self.position + 1) {
            Some(ch) if is_currency_glyph(ch) || ch.is_uppercase() => {
                let sign = self.input_bytes[self.position] as char;
                self.scan_single(TokenType::Sign(sign))
            }
            Some(ch) if ch.is_ascii_digit() => self.scan_number(),
            _ => {
                let sign = self.input_bytes[self.position] as char;
                self.scan_single(TokenType::Sign(sign))
            }
        }
    }

    /// A numeric literal: optional sign, digit groups separated by `.`, `,`,
    /// or single spaces between digits, and scientific notation when a digit
    /// follows the exponent marker.
    fn scan_number(&mut self) -> Token {
        let bytes = self.input_bytes;
        let mut end = self.position;
        if end < bytes.len() && (bytes[end] == b'+' || bytes[end] == b'-') {
            end += 1;
        }
        loop {
            while end < bytes.len() && bytes[end].is_ascii_digit() {
                end += 1;
            }
            if end >= bytes.len() {
                break;
            }
            let b = bytes[end];
            let next_is_digit = end + 1 < bytes.len() && bytes[end + 1].is_ascii_digit();
            match b {
                b'.' | b',' | b' ' if next_is_digit => end += 1,
                b'e' | b'E' => {
                    // Consume the exponent only when digits follow it.
                    let mut j = end + 1;
                    if j < bytes.len() && (bytes[j] == b'+' || bytes[j] == b'-') {
                        j += 1;
                    }
                    if j < bytes.len() && bytes[j].is_ascii_digit() {
                        while j < bytes.len() && bytes[j].is_ascii_digit() {
                            j += 1;
                        }
                        end = j;
                    }
                    break;
                }
                _ => break,
            }
        }
        self.emit_to(end, |text| TokenType::Number(Arc::from(text)))
    }

    /// An account-shaped run: single internal spaces allowed, terminated by
    /// two consecutive spaces, tab, newline, `;`, `@`, `=`, brackets, or
    /// parentheses. Yields [`TokenType::Account`] when the result contains a
    /// colon, [`TokenType::Text`] otherwise.
    fn scan_account_or_text(&mut self) -> Option<Token> {
        let bytes = self.input_bytes;
        let start = self.position;
        let mut end = start;
        while end < bytes.len() {
            match bytes[end] {
                b'\n' | b'\r' | b'\t' | b';' | b'@' | b'=' | b'[' | b']' | b'(' | b')'
                | b'"' => break,
                b' ' => {
                    if matches!(bytes.get(end + 1), Some(b' ') | None) {
                        break;
                    }
                    end += 1;
                }
                _ => end += 1,
            }
        }
        // Trailing single space before a terminator is not part of the name.
        let mut trimmed = end;
        while trimmed > start && bytes[trimmed - 1] == b' ' {
            trimmed -= 1;
        }
        if trimmed == start {
            return None;
        }
        Some(self.emit_to(trimmed, |text| {
            if text.contains(':') {
                TokenType::Account(Arc::from(text))
            } else {
                TokenType::Text(Arc::from(text))
            }
        }))
    }

    /// An unquoted commodity word: a run of letters. Symbols with digits or
    /// spaces need quotes, so `USD50` splits into commodity and number.
    fn scan_commodity_word(&mut self) -> Token {
        let first = self.current_char().unwrap_or('\0');
        if is_currency_glyph(first) {
            let end = self.position + first.len_utf8();
            let sym: Arc<str> = Arc::from(&self.input[self.position..end]);
            return self.emit_to(end, move |_| TokenType::Commodity(sym.clone()));
        }
        let mut end = self.position;
        for (i, ch) in self.input[self.position..].char_indices() {
            if ch.is_alphabetic() {
                end = self.position + i + ch.len_utf8();
            } else {
                break;
            }
        }
        self.emit_to(end, |text| TokenType::Commodity(Arc::from(text)))
    }

    /// Description or note text: runs to `;`, `|`, or end of line, trailing
    /// whitespace excluded.
    fn scan_description(&mut self) -> Token {
        let bytes = self.input_bytes;
        let start = self.position;
        let mut end = start;
        while end < bytes.len() && !matches!(bytes[end], b'\n' | b'\r' | b';' | b'|') {
            end += 1;
        }
        let mut trimmed = end;
        while trimmed > start && (bytes[trimmed - 1] == b' ' || bytes[trimmed - 1] == b'\t') {
            trimmed -= 1;
        }
        self.emit_to(trimmed, |text| TokenType::Text(Arc::from(text)))
    }

    /// Remainder of the line as one trimmed text token (include paths).
    fn scan_rest_of_line(&mut self) -> Token {
        let bytes = self.input_bytes;
        let start = self.position;
        let mut end = self.find_line_end(start);
        while end > start && (bytes[end - 1] == b' ' || bytes[end - 1] == b'\t') {
            end -= 1;
        }
        self.emit_to(end, |text| TokenType::Text(Arc::from(text)))
    }

    fn scan_fallback_char(&mut self) -> Token {
        let ch = self.current_char().unwrap_or('\0');
        let end = self.position + ch.len_utf8().max(1);
        self.emit_to(end.min(self.input.len()), |text| TokenType::Text(Arc::from(text)))
    }

    /// Directive keywords are exact, case-sensitive matches followed by
    /// whitespace or end of line.
    fn try_directive_keyword(&mut self) -> Option<Token> {
        let bytes = self.input_bytes;
        let mut end = self.position;
        while end < bytes.len() && (bytes[end].is_ascii_alphabetic() || bytes[end] == b'-') {
            end += 1;
        }
        let word = &self.input[self.position..end];
        if !is_directive(word) {
            return None;
        }
        if end < bytes.len() && !matches!(bytes[end], b' ' | b'\t' | b'\n' | b'\r') {
            return None;
        }
        self.context = LineContext::Directive(match word {
            "account" => DirectiveArgs::Account { name_seen: false },
            "commodity" | "D" => DirectiveArgs::Amount,
            "P" => DirectiveArgs::Price { date_seen: false },
            "Y" | "year" => DirectiveArgs::Plain,
            _ => DirectiveArgs::Rest,
        });
        Some(self.emit_to(end, |text| TokenType::Directive(Arc::from(text))))
    }

    // ------------------------------------------------------------------
    // Cursor helpers
    // ------------------------------------------------------------------

    fn in_amount_context(&self) -> bool {
        matches!(
            self.context,
            LineContext::Posting { account_seen: true }
                | LineContext::Directive(DirectiveArgs::Amount)
                | LineContext::Directive(DirectiveArgs::Price { .. })
                | LineContext::Other
        )
    }

    fn at_status_position(&self) -> bool {
        matches!(
            self.context,
            LineContext::Header { prefix: true, .. }
                | LineContext::Posting { account_seen: false }
        )
    }

    fn followed_by_whitespace(&self, offset: usize) -> bool {
        matches!(self.peek_byte(offset), None | Some(b' ' | b'\t' | b'\n' | b'\r'))
    }

    fn current_char(&self) -> Option<char> {
        self.input[self.position..].chars().next()
    }

    fn peek_byte(&self, offset: usize) -> Option<u8> {
        self.input_bytes.get(self.position + offset).copied()
    }

    fn peek_nonspace_char(&self, mut from: usize) -> Option<char> {
        let bytes = self.input_bytes;
        while from < bytes.len() && (bytes[from] == b' ' || bytes[from] == b'\t') {
            from += 1;
        }
        self.input.get(from..)?.chars().next()
    }

    fn find_line_end(&self, from: usize) -> usize {
        match memchr::memchr2(b'\n', b'\r', &self.input_bytes[from..]) {
            Some(i) => from + i,
            None => self.input.len(),
        }
    }

    /// Advance the byte cursor and line/column tracker together.
    fn bump_to(&mut self, byte_end: usize) {
        debug_assert!(byte_end >= self.position);
        self.pos.advance_str(&self.input[self.position..byte_end]);
        self.position = byte_end;
    }

    /// Emit a token covering `position..byte_end`, advancing the cursor.
    fn emit_to(&mut self, byte_end: usize, kind: impl FnOnce(&str) -> TokenType) -> Token {
        let start = self.pos;
        let text = &self.input[self.position..byte_end];
        let token_type = kind(text);
        let token_text: Arc<str> = Arc::from(text);
        self.bump_to(byte_end);
        Token::new(token_type, token_text, start, self.pos)
    }
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        self.next_token()
    }
}
