//! Per-journal analysis: balance checking and declaration diagnostics.
//!
//! The analyzer walks a parsed [`journal_ast::Journal`] and produces the
//! derived facts the index aggregates (accounts, payees, commodities, tags)
//! plus diagnostics:
//!
//! - every transaction is balance-checked per commodity, honoring costs,
//!   virtual postings, and a single inferred posting;
//! - postings on accounts no `account` directive declares, and amounts in
//!   commodities no `commodity` directive declares, draw warnings once any
//!   declarations exist to compare against.
//!
//! Nothing here reads files or holds locks; callers hand in a journal and
//! get a value back.

#![warn(clippy::all)]

mod analyzer;
mod balance;
mod collect;
mod diagnostics;

pub use analyzer::{Analysis, DeclarationSets, analyze_journal, declared_accounts, declared_commodities};
pub use balance::{BalanceOutcome, check_balance};
pub use collect::{JournalFacts, collect_facts};
pub use diagnostics::Diagnostic;
