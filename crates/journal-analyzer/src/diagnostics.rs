use journal_diagnostics_codes::{DiagnosticCode, DiagnosticSeverity};
use journal_position::Range;
use serde::{Deserialize, Serialize};

/// One analyzer finding, anchored to the offending range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub code: DiagnosticCode,
    pub severity: DiagnosticSeverity,
    pub message: String,
    pub range: Range,
}

impl Diagnostic {
    /// Build a diagnostic; the severity comes from the code.
    pub fn new(code: DiagnosticCode, message: impl Into<String>, range: Range) -> Self {
        Self { code, severity: code.severity(), message: message.into(), range }
    }
}
