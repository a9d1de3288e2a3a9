use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Where the commodity symbol sits relative to the number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CommodityPosition {
    /// `$50` — symbol before the number
    Left,
    /// `50 EUR` — symbol after the number
    #[default]
    Right,
}

/// A quantity of some commodity, as written in the journal.
///
/// Carries both the normalized [`Decimal`] and the raw lexical form
/// (`"1.234.567,89"` stays `"1.234.567,89"`), so a formatter or completion
/// can re-emit exactly what the user typed. An empty `commodity` means a
/// bare number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Amount {
    /// Normalized quantity
    pub quantity: Decimal,
    /// Quantity exactly as written, sign included
    pub raw_quantity: String,
    /// Commodity symbol; empty when the amount has none
    pub commodity: String,
    /// Display side of the commodity symbol
    pub position: CommodityPosition,
    /// True when the sign was written before the commodity (`-$5`)
    pub sign_before_commodity: bool,
}

impl Amount {
    /// A bare number with no commodity.
    pub fn number(quantity: Decimal, raw_quantity: impl Into<String>) -> Self {
        Self {
            quantity,
            raw_quantity: raw_quantity.into(),
            commodity: String::new(),
            position: CommodityPosition::Right,
            sign_before_commodity: false,
        }
    }

    pub fn has_commodity(&self) -> bool {
        !self.commodity.is_empty()
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.commodity.is_empty() {
            return write!(f, "{}", self.raw_quantity);
        }
        match self.position {
            CommodityPosition::Left => {
                if self.sign_before_commodity && self.quantity.is_sign_negative() {
                    // Sign was written ahead of the symbol: -$5
                    write!(f, "-{}{}", self.commodity, self.raw_quantity.trim_start_matches('-'))
                } else {
                    write!(f, "{}{}", self.commodity, self.raw_quantity)
                }
            }
            CommodityPosition::Right => write!(f, "{} {}", self.raw_quantity, self.commodity),
        }
    }
}

/// A posting's cost annotation: `@ AMOUNT` (per unit) or `@@ AMOUNT` (total).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cost {
    pub amount: Amount,
    /// True for `@@`
    pub is_total: bool,
}

/// A posting's balance assertion: `= AMOUNT` (loose) or `== AMOUNT` (strict).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceAssertion {
    pub amount: Amount,
    /// True for `==`
    pub is_strict: bool,
}
