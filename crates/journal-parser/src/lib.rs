//! Recovering parser for plain-text accounting journals.
//!
//! Turns journal text into a [`journal_ast::Journal`] plus a list of
//! [`ParseError`]s. Parsing is total: malformed lines are recorded and
//! skipped, never fatal, so a file with errors still contributes every
//! entity that did parse.
//!
//! The crate also owns two pieces of shared journal smarts:
//!
//! - [`normalize_number`]: the deterministic, locale-free rules that decide
//!   whether `1.234` is one thousand two hundred thirty-four or a decimal.
//! - [`extract_tags`]: `name:value` tag extraction from comment text with
//!   source-accurate ranges.
//!
//! # Usage
//!
//! ```
//! let outcome = journal_parser::parse("2024-01-15 coffee\n    expenses:food  $4\n    assets:cash\n");
//! assert!(outcome.errors.is_empty());
//! assert_eq!(outcome.journal.transactions.len(), 1);
//! ```

#![warn(clippy::all)]

mod error;
mod numbers;
mod parser;
mod tags;

pub use error::ParseError;
pub use numbers::{normalize_number, parse_quantity};
pub use parser::{ParseOutcome, Parser, parse};
pub use tags::extract_tags;
