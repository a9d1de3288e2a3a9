//! Error types for the journal parser

use journal_position::Position;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced during parsing.
///
/// Every error is recoverable: the parser records it and skips to the next
/// line, so a parse always yields a journal plus zero or more of these.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum ParseError {
    /// A token that no production could start with
    #[error("unexpected '{found}' at {position}")]
    UnexpectedToken { found: String, position: Position },

    /// A specific token was required and something else appeared
    #[error("expected {expected} at {position}")]
    Expected { expected: String, position: Position },

    /// A date whose shape could not be decomposed into components
    #[error("invalid date '{text}' at {position}: {reason}")]
    InvalidDate { text: String, reason: String, position: Position },

    /// A partial date with no preceding year directive
    #[error("partial date '{text}' at {position} requires a year directive")]
    MissingYear { text: String, position: Position },

    /// A numeric literal the normalizer could not make sense of
    #[error("invalid number '{text}' at {position}")]
    InvalidNumber { text: String, position: Position },

    /// A year directive outside 1..=9999
    #[error("invalid year '{text}' at {position}")]
    InvalidYear { text: String, position: Position },
}

impl ParseError {
    /// The position where the error occurred.
    pub fn position(&self) -> Position {
        match self {
            ParseError::UnexpectedToken { position, .. }
            | ParseError::Expected { position, .. }
            | ParseError::InvalidDate { position, .. }
            | ParseError::MissingYear { position, .. }
            | ParseError::InvalidNumber { position, .. }
            | ParseError::InvalidYear { position, .. } => *position,
        }
    }
}
