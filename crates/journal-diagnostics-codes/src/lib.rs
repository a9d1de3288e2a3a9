//! Stable diagnostic codes and severity levels for journal analysis.
//!
//! These codes are the public names of analyzer findings: editors key
//! quick-fixes and suppression settings off them, so the strings are
//! stable and documented here as the single source of truth.
//!
//! | Code                   | Severity | Meaning                                        |
//! |------------------------|----------|------------------------------------------------|
//! | `UNBALANCED`           | error    | Real postings do not sum to zero per commodity |
//! | `MULTIPLE_INFERRED`    | error    | More than one posting omits its amount         |
//! | `UNDECLARED_ACCOUNT`   | warning  | Posting uses an account never declared         |
//! | `UNDECLARED_COMMODITY` | warning  | Amount uses a commodity never declared         |
//!
//! # Example
//!
//! ```
//! use journal_diagnostics_codes::{DiagnosticCode, DiagnosticSeverity};
//!
//! let code = DiagnosticCode::Unbalanced;
//! assert_eq!(code.as_str(), "UNBALANCED");
//! assert_eq!(code.severity(), DiagnosticSeverity::Error);
//! ```

#![warn(clippy::all)]

use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity level of a diagnostic.
///
/// Maps to the editor protocol's severity values (1=Error, 2=Warning).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum DiagnosticSeverity {
    /// A problem in the journal's bookkeeping itself.
    Error = 1,
    /// Advisory; the journal is usable as written.
    Warning = 2,
}

impl DiagnosticSeverity {
    /// The protocol numeric value for this severity.
    pub fn to_wire_value(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for DiagnosticSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticSeverity::Error => write!(f, "error"),
            DiagnosticSeverity::Warning => write!(f, "warning"),
        }
    }
}

/// Stable code identifying one kind of analyzer finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiagnosticCode {
    /// Transaction's real postings do not balance
    Unbalanced,
    /// More than one posting in a transaction has no amount
    MultipleInferred,
    /// Account used but not declared by any `account` directive
    UndeclaredAccount,
    /// Commodity used but not declared by any `commodity` directive
    UndeclaredCommodity,
}

impl DiagnosticCode {
    /// The stable string form of this code.
    pub fn as_str(self) -> &'static str {
        match self {
            DiagnosticCode::Unbalanced => "UNBALANCED",
            DiagnosticCode::MultipleInferred => "MULTIPLE_INFERRED",
            DiagnosticCode::UndeclaredAccount => "UNDECLARED_ACCOUNT",
            DiagnosticCode::UndeclaredCommodity => "UNDECLARED_COMMODITY",
        }
    }

    /// The severity this code always carries.
    pub fn severity(self) -> DiagnosticSeverity {
        match self {
            DiagnosticCode::Unbalanced | DiagnosticCode::MultipleInferred => {
                DiagnosticSeverity::Error
            }
            DiagnosticCode::UndeclaredAccount | DiagnosticCode::UndeclaredCommodity => {
                DiagnosticSeverity::Warning
            }
        }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable_strings() {
        assert_eq!(DiagnosticCode::Unbalanced.as_str(), "UNBALANCED");
        assert_eq!(DiagnosticCode::MultipleInferred.as_str(), "MULTIPLE_INFERRED");
        assert_eq!(DiagnosticCode::UndeclaredAccount.as_str(), "UNDECLARED_ACCOUNT");
        assert_eq!(DiagnosticCode::UndeclaredCommodity.as_str(), "UNDECLARED_COMMODITY");
    }

    #[test]
    fn balance_codes_are_errors_declaration_codes_warnings() {
        assert_eq!(DiagnosticCode::Unbalanced.severity(), DiagnosticSeverity::Error);
        assert_eq!(DiagnosticCode::MultipleInferred.severity(), DiagnosticSeverity::Error);
        assert_eq!(DiagnosticCode::UndeclaredAccount.severity(), DiagnosticSeverity::Warning);
        assert_eq!(DiagnosticCode::UndeclaredCommodity.severity(), DiagnosticSeverity::Warning);
    }

    #[test]
    fn wire_values_match_protocol() {
        assert_eq!(DiagnosticSeverity::Error.to_wire_value(), 1);
        assert_eq!(DiagnosticSeverity::Warning.to_wire_value(), 2);
    }
}
