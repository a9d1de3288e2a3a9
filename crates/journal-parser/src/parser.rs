//! Recursive-descent journal parser with per-line error recovery.

use crate::error::ParseError;
use crate::numbers::parse_quantity;
use crate::tags::extract_tags;
use journal_ast::{
    AccountDirective, Amount, BalanceAssertion, Comment, CommodityDirective, CommodityPosition,
    Cost, Date, DefaultCommodityDirective, Directive, IncludeDirective, Journal, Posting,
    PriceDirective, Status, Tag, Transaction, VirtualKind, YearDirective,
};
use journal_lexer::{Lexer, Token, TokenType};
use journal_position::{Position, Range};
use std::collections::BTreeMap;

/// The result of a parse: a journal plus every error recovered from.
///
/// Parsing never fails outright. A line the parser cannot make sense of
/// contributes one error and is skipped; everything parseable around it
/// lands in the journal.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseOutcome {
    pub journal: Journal,
    pub errors: Vec<ParseError>,
}

/// Parse journal text.
pub fn parse(input: &str) -> ParseOutcome {
    Parser::new(input).run()
}

/// Recursive-descent parser over the token stream.
///
/// Recovery discipline: on any unexpected token, record one error carrying
/// its position, then skip to the next newline and continue.
pub struct Parser<'a> {
    input: &'a str,
    tokens: Vec<Token>,
    cursor: usize,
    /// Default year for partial dates, set by `Y`/`year` directives
    default_year: Option<i32>,
    errors: Vec<ParseError>,
}

impl<'a> Parser<'a> {
    pub fn new(input: &'a str) -> Self {
        let tokens: Vec<Token> = Lexer::new(input).collect();
        Self { input, tokens, cursor: 0, default_year: None, errors: Vec::new() }
    }

    /// Run the parse to completion.
    pub fn run(mut self) -> ParseOutcome {
        let mut journal = Journal::new();

        loop {
            match self.kind().clone() {
                TokenType::Eof => break,
                TokenType::Newline => {
                    self.advance();
                }
                TokenType::Comment(text) => {
                    let token = self.advance();
                    journal.comments.push(Comment {
                        text: text.to_string(),
                        range: Range::new(token.start, token.end),
                    });
                    self.expect_line_end();
                }
                TokenType::Indent => {
                    // Indented content outside any transaction: tolerate
                    // comment lines, reject the rest.
                    self.advance();
                    if let TokenType::Comment(text) = self.kind().clone() {
                        let token = self.advance();
                        journal.comments.push(Comment {
                            text: text.to_string(),
                            range: Range::new(token.start, token.end),
                        });
                        self.expect_line_end();
                    } else {
                        self.unexpected_here();
                        self.skip_to_line_end();
                    }
                }
                TokenType::Date(_) => {
                    if let Some(transaction) = self.parse_transaction() {
                        journal.transactions.push(transaction);
                    }
                }
                TokenType::Directive(keyword) => {
                    self.parse_directive(&keyword, &mut journal);
                }
                _ => {
                    self.unexpected_here();
                    self.skip_to_line_end();
                }
            }
        }

        ParseOutcome { journal, errors: self.errors }
    }

    // ------------------------------------------------------------------
    // Transactions
    // ------------------------------------------------------------------

    fn parse_transaction(&mut self) -> Option<Transaction> {
        let date_token = self.advance();
        let date = match self.parse_date_token(&date_token) {
            Ok(date) => date,
            Err(error) => {
                self.errors.push(error);
                self.skip_to_line_end();
                return None;
            }
        };
        let start = date_token.start;
        let mut end = date_token.end;

        let mut secondary_date = None;
        if self.kind() == &TokenType::Equal {
            self.advance();
            if let TokenType::Date(_) = self.kind() {
                let token = self.advance();
                match self.parse_date_token(&token) {
                    Ok(date) => secondary_date = Some(date),
                    Err(error) => self.errors.push(error),
                }
                end = token.end;
            } else {
                self.expected("secondary date after '='");
            }
        }

        let mut status = Status::None;
        if let TokenType::Status(flag) = self.kind() {
            status = status_from_flag(*flag);
            end = self.advance().end;
        }

        let mut code = None;
        if self.kind() == &TokenType::LeftParen {
            self.advance();
            if let TokenType::Text(text) = self.kind().clone() {
                code = Some(text.to_string());
                end = self.advance().end;
            }
            if self.kind() == &TokenType::RightParen {
                end = self.advance().end;
            } else {
                self.expected("')' closing the transaction code");
            }
        }

        let mut payee = String::new();
        let mut description = String::new();
        let mut note = None;
        let mut description_start = None;
        if let TokenType::Text(text) = self.kind().clone() {
            description = text.to_string();
            let token = self.advance();
            description_start = Some(token.start.byte);
            end = token.end;
        }
        if self.kind() == &TokenType::Pipe {
            let pipe = self.advance();
            payee = description.trim().to_string();
            let mut literal_end = pipe.end.byte;
            let note_text = match self.kind().clone() {
                TokenType::Text(text) => {
                    let token = self.advance();
                    literal_end = token.end.byte;
                    end = token.end;
                    text.to_string()
                }
                _ => String::new(),
            };
            // The description keeps the source text exactly as written,
            // pipe spacing included; only payee and note are trimmed.
            let literal_start = description_start.unwrap_or(pipe.start.byte);
            description = self.input[literal_start..literal_end].to_string();
            note = Some(note_text);
        }

        let (comment, mut tags) = self.take_inline_comment(&mut end);
        self.expect_line_end();

        let mut postings = Vec::new();
        let mut extra_comment: Option<String> = None;
        while self.kind() == &TokenType::Indent {
            if let TokenType::Comment(_) = self.peek_kind(1) {
                // Indented comment line belongs to the transaction.
                self.advance();
                if let TokenType::Comment(text) = self.kind().clone() {
                    let token = self.advance();
                    let mut base = token.start;
                    base.advance(';');
                    tags.extend(extract_tags(&text, base));
                    end = token.end;
                    match &mut extra_comment {
                        Some(existing) => {
                            existing.push('\n');
                            existing.push_str(text.trim());
                        }
                        None => extra_comment = Some(text.trim().to_string()),
                    }
                }
                self.expect_line_end();
                continue;
            }
            if let Some(posting) = self.parse_posting() {
                end = posting.range.end;
                postings.push(posting);
            }
        }

        let comment = match (comment, extra_comment) {
            (Some(inline), Some(extra)) => Some(format!("{inline}\n{extra}")),
            (Some(inline), None) => Some(inline),
            (None, Some(extra)) => Some(extra),
            (None, None) => None,
        };

        Some(Transaction {
            date,
            secondary_date,
            status,
            code,
            payee,
            description,
            note,
            postings,
            tags,
            comment,
            range: Range::new(start, end),
        })
    }

    fn parse_posting(&mut self) -> Option<Posting> {
        self.advance(); // indent
        let start = self.current().start;
        let mut end = start;

        let mut status = Status::None;
        if let TokenType::Status(flag) = self.kind() {
            status = status_from_flag(*flag);
            end = self.advance().end;
        }

        let (virtual_kind, closer) = match self.kind() {
            TokenType::LeftBracket => {
                self.advance();
                (VirtualKind::Balanced, Some(TokenType::RightBracket))
            }
            TokenType::LeftParen => {
                self.advance();
                (VirtualKind::Unbalanced, Some(TokenType::RightParen))
            }
            _ => (VirtualKind::None, None),
        };

        let account = match self.kind().clone() {
            TokenType::Account(name) | TokenType::Text(name) => {
                end = self.advance().end;
                name.to_string()
            }
            _ => {
                self.expected("account name");
                self.skip_to_line_end();
                return None;
            }
        };

        if let Some(closer) = closer {
            if self.kind() == &closer {
                end = self.advance().end;
            } else {
                self.expected("closing bracket for virtual posting");
            }
        }

        let amount = self.parse_amount_opt(&mut end);

        let mut cost = None;
        if matches!(self.kind(), TokenType::At | TokenType::AtAt) {
            let is_total = self.kind() == &TokenType::AtAt;
            self.advance();
            match self.parse_amount_opt(&mut end) {
                Some(cost_amount) => cost = Some(Cost { amount: cost_amount, is_total }),
                None => self.expected("cost amount after '@'"),
            }
        }

        let mut assertion = None;
        if matches!(self.kind(), TokenType::Equal | TokenType::EqualEqual) {
            let is_strict = self.kind() == &TokenType::EqualEqual;
            self.advance();
            match self.parse_amount_opt(&mut end) {
                Some(asserted) => {
                    assertion = Some(BalanceAssertion { amount: asserted, is_strict });
                }
                None => self.expected("amount after balance assertion"),
            }
        }

        let (comment, tags) = self.take_inline_comment(&mut end);
        self.expect_line_end();

        Some(Posting {
            status,
            account: account.into(),
            amount,
            cost,
            assertion,
            virtual_kind,
            comment,
            tags,
            range: Range::new(start, end),
        })
    }

    /// Parse an amount in any accepted shape, or `None` when the next token
    /// cannot start one.
    fn parse_amount_opt(&mut self, end: &mut Position) -> Option<Amount> {
        match self.kind().clone() {
            TokenType::Sign(sign) => {
                self.advance();
                match self.kind().clone() {
                    TokenType::Commodity(commodity) => {
                        self.advance();
                        let raw = match self.kind().clone() {
                            TokenType::Number(number) => {
                                *end = self.advance().end;
                                format!("{sign}{number}")
                            }
                            _ => {
                                self.expected("number after commodity");
                                return None;
                            }
                        };
                        self.build_amount(raw, commodity.to_string(), CommodityPosition::Left, true)
                    }
                    TokenType::Number(number) => {
                        *end = self.advance().end;
                        self.build_amount(
                            format!("{sign}{number}"),
                            String::new(),
                            CommodityPosition::Right,
                            false,
                        )
                    }
                    _ => {
                        self.expected("amount after sign");
                        None
                    }
                }
            }
            TokenType::Commodity(commodity) => {
                self.advance();
                match self.kind().clone() {
                    TokenType::Number(number) => {
                        *end = self.advance().end;
                        self.build_amount(
                            number.to_string(),
                            commodity.to_string(),
                            CommodityPosition::Left,
                            false,
                        )
                    }
                    _ => {
                        self.expected("number after commodity");
                        None
                    }
                }
            }
            TokenType::Number(number) => {
                *end = self.advance().end;
                match self.kind().clone() {
                    TokenType::Commodity(commodity) => {
                        *end = self.advance().end;
                        self.build_amount(
                            number.to_string(),
                            commodity.to_string(),
                            CommodityPosition::Right,
                            false,
                        )
                    }
                    _ => self.build_amount(
                        number.to_string(),
                        String::new(),
                        CommodityPosition::Right,
                        false,
                    ),
                }
            }
            _ => None,
        }
    }

    fn build_amount(
        &mut self,
        raw: String,
        commodity: String,
        position: CommodityPosition,
        sign_before_commodity: bool,
    ) -> Option<Amount> {
        let at = self.previous_position();
        match parse_quantity(&raw, at) {
            Ok(quantity) => Some(Amount {
                quantity,
                raw_quantity: raw,
                commodity,
                position,
                sign_before_commodity,
            }),
            Err(error) => {
                self.errors.push(error);
                None
            }
        }
    }

    // ------------------------------------------------------------------
    // Directives
    // ------------------------------------------------------------------

    fn parse_directive(&mut self, keyword: &str, journal: &mut Journal) {
        match keyword {
            "account" => self.parse_account_directive(journal),
            "commodity" => self.parse_commodity_directive(journal),
            "include" => self.parse_include_directive(journal),
            "P" => self.parse_price_directive(journal),
            "Y" | "year" => self.parse_year_directive(journal),
            "D" => self.parse_default_commodity_directive(journal),
            "comment" => self.skip_comment_block(),
            _ => {
                // Recognized keyword with no structural meaning here;
                // consume the line without complaint.
                self.advance();
                self.skip_to_line_end();
            }
        }
    }

    fn parse_account_directive(&mut self, journal: &mut Journal) {
        let keyword = self.advance();
        let start = keyword.start;
        let mut end = keyword.end;

        let name = match self.kind().clone() {
            TokenType::Account(name) | TokenType::Text(name) => {
                end = self.advance().end;
                name.to_string()
            }
            _ => {
                self.expected("account name");
                self.skip_to_line_end();
                return;
            }
        };

        let (comment, tags) = self.take_inline_comment(&mut end);
        self.expect_line_end();

        let mut sub_directives = BTreeMap::new();
        while self.kind() == &TokenType::Indent {
            self.advance();
            if let Some((key, value, line_end)) = self.take_sub_directive_line() {
                sub_directives.insert(key, value);
                end = line_end;
            }
        }

        journal.directives.push(Directive::Account(AccountDirective {
            name,
            sub_directives,
            tags,
            comment,
            range: Range::new(start, end),
        }));
    }

    fn parse_commodity_directive(&mut self, journal: &mut Journal) {
        let keyword = self.advance();
        let start = keyword.start;
        let mut end = keyword.end;

        // Three accepted argument shapes: SYMBOL, SYMBOL NUMBER, NUMBER SYMBOL.
        let args_start = self.current().start.byte;
        let mut symbol = None;
        let mut saw_number = false;
        loop {
            match self.kind().clone() {
                TokenType::Commodity(sym) if symbol.is_none() => {
                    end = self.advance().end;
                    symbol = Some(sym.to_string());
                }
                TokenType::Number(_) | TokenType::Sign(_) if !saw_number => {
                    saw_number = true;
                    end = self.advance().end;
                }
                _ => break,
            }
        }
        let Some(symbol) = symbol else {
            self.expected("commodity symbol");
            self.skip_to_line_end();
            return;
        };
        // The format string is the argument text exactly as written.
        let mut format = saw_number
            .then(|| self.input[args_start..end.byte].trim().to_string());

        let (_, _) = self.take_inline_comment(&mut end);
        self.expect_line_end();

        let mut sub_directives = BTreeMap::new();
        while self.kind() == &TokenType::Indent {
            self.advance();
            if let Some((key, value, line_end)) = self.take_sub_directive_line() {
                if key == "format" && !value.is_empty() {
                    format = Some(value.clone());
                }
                sub_directives.insert(key, value);
                end = line_end;
            }
        }

        journal.directives.push(Directive::Commodity(CommodityDirective {
            symbol,
            format,
            sub_directives,
            range: Range::new(start, end),
        }));
    }

    fn parse_include_directive(&mut self, journal: &mut Journal) {
        let keyword = self.advance();
        let start = keyword.start;
        let mut end = keyword.end;

        let path = match self.kind().clone() {
            TokenType::Text(path) if !path.trim().is_empty() => {
                end = self.advance().end;
                path.trim().to_string()
            }
            _ => {
                self.expected("include path");
                self.skip_to_line_end();
                return;
            }
        };
        self.expect_line_end();

        let include = IncludeDirective { path, range: Range::new(start, end) };
        journal.includes.push(include.clone());
        journal.directives.push(Directive::Include(include));
    }

    fn parse_price_directive(&mut self, journal: &mut Journal) {
        let keyword = self.advance();
        let start = keyword.start;
        let mut end = keyword.end;

        let date = match self.kind().clone() {
            TokenType::Date(_) => {
                let token = self.advance();
                end = token.end;
                match self.parse_date_token(&token) {
                    Ok(date) => date,
                    Err(error) => {
                        self.errors.push(error);
                        self.skip_to_line_end();
                        return;
                    }
                }
            }
            _ => {
                self.expected("price date");
                self.skip_to_line_end();
                return;
            }
        };

        let commodity = match self.kind().clone() {
            TokenType::Commodity(sym) => {
                end = self.advance().end;
                sym.to_string()
            }
            _ => {
                self.expected("commodity in price directive");
                self.skip_to_line_end();
                return;
            }
        };

        let Some(price) = self.parse_amount_opt(&mut end) else {
            self.expected("price amount");
            self.skip_to_line_end();
            return;
        };
        self.expect_line_end();

        journal.directives.push(Directive::Price(PriceDirective {
            date,
            commodity,
            price,
            range: Range::new(start, end),
        }));
    }

    fn parse_year_directive(&mut self, journal: &mut Journal) {
        let keyword = self.advance();
        let start = keyword.start;

        match self.kind().clone() {
            TokenType::Number(text) => {
                let token = self.advance();
                match text.parse::<i32>() {
                    Ok(year) if (1..=9999).contains(&year) => {
                        self.default_year = Some(year);
                        journal.directives.push(Directive::Year(YearDirective {
                            year,
                            range: Range::new(start, token.end),
                        }));
                    }
                    _ => self.errors.push(ParseError::InvalidYear {
                        text: text.to_string(),
                        position: token.start,
                    }),
                }
            }
            _ => self.expected("year"),
        }
        self.expect_line_end();
    }

    fn parse_default_commodity_directive(&mut self, journal: &mut Journal) {
        let keyword = self.advance();
        let start = keyword.start;
        let mut end = keyword.end;

        let args_start = self.current().start.byte;
        match self.parse_amount_opt(&mut end) {
            Some(amount) if amount.has_commodity() => {
                let format = self.input[args_start..end.byte].trim().to_string();
                journal.directives.push(Directive::DefaultCommodity(DefaultCommodityDirective {
                    symbol: amount.commodity,
                    format: Some(format),
                    range: Range::new(start, end),
                }));
            }
            _ => self.expected("default commodity amount"),
        }
        self.expect_line_end();
    }

    /// `comment` opens a block that runs until a line starting with `end`.
    fn skip_comment_block(&mut self) {
        self.advance();
        self.skip_to_line_end();
        loop {
            match self.kind() {
                TokenType::Eof => break,
                TokenType::Directive(keyword) if &**keyword == "end" => {
                    self.skip_to_line_end();
                    break;
                }
                _ => self.skip_to_line_end(),
            }
        }
    }

    // ------------------------------------------------------------------
    // Shared pieces
    // ------------------------------------------------------------------

    /// Decompose a date token into components. Out-of-range values pass
    /// through; only shape problems are errors.
    fn parse_date_token(&mut self, token: &Token) -> Result<Date, ParseError> {
        let text = &*token.text;
        let position = token.start;
        let invalid = |reason: &str| ParseError::InvalidDate {
            text: text.to_string(),
            reason: reason.to_string(),
            position,
        };

        let separator = text
            .chars()
            .find(|c| matches!(c, '-' | '/' | '.'))
            .ok_or_else(|| invalid("missing separator"))?;
        if text.chars().any(|c| matches!(c, '-' | '/' | '.') && c != separator) {
            return Err(invalid("mixed separators"));
        }

        let parts: Vec<&str> = text.split(separator).collect();
        let component = |part: &str| part.parse::<u32>().map_err(|_| invalid("bad component"));
        match parts.as_slice() {
            [year, month, day] => Ok(Date::new(
                year.parse::<i32>().map_err(|_| invalid("bad year"))?,
                component(month)?,
                component(day)?,
            )),
            [month, day] => {
                let year = self.default_year.ok_or(ParseError::MissingYear {
                    text: text.to_string(),
                    position,
                })?;
                Ok(Date::new(year, component(month)?, component(day)?))
            }
            _ => Err(invalid("expected two or three components")),
        }
    }

    /// An optional trailing comment; returns its text and extracted tags.
    fn take_inline_comment(&mut self, end: &mut Position) -> (Option<String>, Vec<Tag>) {
        if let TokenType::Comment(text) = self.kind().clone() {
            let token = self.advance();
            *end = token.end;
            let mut base = token.start;
            base.advance(';');
            let tags = extract_tags(&text, base);
            (Some(text.to_string()), tags)
        } else {
            (None, Vec::new())
        }
    }

    /// Consume one indented sub-directive line: `key rest-of-line`.
    fn take_sub_directive_line(&mut self) -> Option<(String, String, Position)> {
        let mut pieces: Vec<String> = Vec::new();
        let mut end = self.current().start;
        while !matches!(self.kind(), TokenType::Newline | TokenType::Eof) {
            let token = self.advance();
            end = token.end;
            if !matches!(token.token_type, TokenType::Comment(_)) {
                pieces.push(token.text.to_string());
            }
        }
        self.expect_line_end();
        let joined = pieces.join(" ");
        let trimmed = joined.trim();
        if trimmed.is_empty() {
            return None;
        }
        match trimmed.split_once(' ') {
            Some((key, rest)) => Some((key.to_string(), rest.trim().to_string(), end)),
            None => Some((trimmed.to_string(), String::new(), end)),
        }
    }

    // ------------------------------------------------------------------
    // Cursor
    // ------------------------------------------------------------------

    fn current(&self) -> &Token {
        &self.tokens[self.cursor.min(self.tokens.len() - 1)]
    }

    fn kind(&self) -> &TokenType {
        &self.current().token_type
    }

    fn peek_kind(&self, offset: usize) -> &TokenType {
        let idx = (self.cursor + offset).min(self.tokens.len() - 1);
        &self.tokens[idx].token_type
    }

    fn advance(&mut self) -> Token {
        let token = self.current().clone();
        if self.cursor + 1 < self.tokens.len() {
            self.cursor += 1;
        }
        token
    }

    fn previous_position(&self) -> Position {
        if self.cursor == 0 {
            return Position::start();
        }
        self.tokens[self.cursor - 1].start
    }

    fn at_line_boundary(&self) -> bool {
        matches!(self.kind(), TokenType::Newline | TokenType::Eof)
    }

    /// Skip forward through the next newline.
    fn skip_to_line_end(&mut self) {
        while !self.at_line_boundary() {
            self.advance();
        }
        if self.kind() == &TokenType::Newline {
            self.advance();
        }
    }

    /// Require a line boundary; report and recover otherwise.
    fn expect_line_end(&mut self) {
        if self.at_line_boundary() {
            if self.kind() == &TokenType::Newline {
                self.advance();
            }
            return;
        }
        self.unexpected_here();
        self.skip_to_line_end();
    }

    fn unexpected_here(&mut self) {
        let token = self.current();
        self.errors.push(ParseError::UnexpectedToken {
            found: token.text.to_string(),
            position: token.start,
        });
    }

    fn expected(&mut self, what: &str) {
        let position = self.current().start;
        self.errors.push(ParseError::Expected { expected: what.to_string(), position });
    }
}

fn status_from_flag(flag: char) -> Status {
    match flag {
        '!' => Status::Pending,
        _ => Status::Cleared,
    }
}
