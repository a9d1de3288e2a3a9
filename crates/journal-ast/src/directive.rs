use crate::{Amount, Date, Tag};
use journal_position::Range;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A top-level non-transaction declaration.
///
/// Modeled as a sum type so consumers match exhaustively; a new directive
/// kind is a compile error at every use site rather than a silent fall-through.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Directive {
    /// `account NAME` with optional sub-directive lines
    Account(AccountDirective),
    /// `commodity ...` declaration with format
    Commodity(CommodityDirective),
    /// `P DATE COMMODITY AMOUNT` market price
    Price(PriceDirective),
    /// `Y YEAR` / `year YEAR` default year for partial dates
    Year(YearDirective),
    /// `D AMOUNT` default commodity and format
    DefaultCommodity(DefaultCommodityDirective),
    /// `include PATH`
    Include(IncludeDirective),
}

impl Directive {
    pub fn range(&self) -> Range {
        match self {
            Directive::Account(d) => d.range,
            Directive::Commodity(d) => d.range,
            Directive::Price(d) => d.range,
            Directive::Year(d) => d.range,
            Directive::DefaultCommodity(d) => d.range,
            Directive::Include(d) => d.range,
        }
    }
}

/// `account NAME [; comment]` plus indented `key rest-of-line` sub-directives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountDirective {
    pub name: String,
    /// Indented sub-directive lines, keyed by their first word
    pub sub_directives: BTreeMap<String, String>,
    pub tags: Vec<Tag>,
    pub comment: Option<String>,
    pub range: Range,
}

/// A commodity declaration. `format` preserves the example amount exactly
/// as written (`commodity 1.000,00 EUR` keeps `1.000,00 EUR`); a `format`
/// sub-directive overrides it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommodityDirective {
    pub symbol: String,
    pub format: Option<String>,
    pub sub_directives: BTreeMap<String, String>,
    pub range: Range,
}

/// `P 2024-01-15 USD 0.92 EUR`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceDirective {
    pub date: Date,
    pub commodity: String,
    pub price: Amount,
    pub range: Range,
}

/// Sets the default year used to complete partial dates that follow it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearDirective {
    pub year: i32,
    pub range: Range,
}

/// `D $1,000.00` — default commodity with its display format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefaultCommodityDirective {
    pub symbol: String,
    pub format: Option<String>,
    pub range: Range,
}

/// `include PATH`, where PATH may contain glob wildcards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncludeDirective {
    pub path: String,
    pub range: Range,
}
