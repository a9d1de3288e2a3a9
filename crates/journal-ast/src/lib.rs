//! Data model for plain-text double-entry accounting journals.
//!
//! These types are produced by the parser and flow through the whole
//! pipeline: the include resolver aggregates [`Journal`]s into a multi-file
//! view, the workspace index derives per-file facts from them, and the
//! analyzer walks [`Transaction`]s for balance and declaration diagnostics.
//!
//! Two modeling decisions matter downstream:
//!
//! - [`Amount`] always carries both the normalized [`Decimal`] quantity and
//!   the raw lexical form it was written in, so edits and completions can
//!   re-emit the user's own spelling.
//! - [`Date`] components are stored as parsed, even when out of range
//!   (month 13 survives). Validity is a diagnostic concern, not a parse
//!   concern.
//!
//! [`Decimal`]: rust_decimal::Decimal

#![warn(clippy::all)]

mod account;
mod amount;
mod date;
mod directive;
mod journal;
mod posting;
mod tag;
mod transaction;

pub use account::AccountName;
pub use amount::{Amount, BalanceAssertion, CommodityPosition, Cost};
pub use date::Date;
pub use directive::{
    AccountDirective, CommodityDirective, DefaultCommodityDirective, Directive, IncludeDirective,
    PriceDirective, YearDirective,
};
pub use journal::{Comment, Journal};
pub use posting::{Posting, VirtualKind};
pub use tag::Tag;
pub use transaction::{Status, Transaction};
