//! Multi-commodity transaction balance checking.

use journal_ast::{Posting, Transaction};
use rust_decimal::Decimal;
use std::collections::BTreeMap;

/// Result of balance-checking one transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BalanceOutcome {
    /// Real postings sum to zero in every commodity, or one inferred
    /// posting absorbs the remainder. `inferred` is the index of that
    /// posting in the transaction's posting list, when present.
    Balanced { inferred: Option<usize> },
    /// Sums are non-zero with no posting left to absorb them. Differences
    /// are absolute values, keyed by commodity, sorted by commodity.
    Unbalanced { differences: Vec<(String, Decimal)> },
    /// More than one posting omitted its amount.
    MultipleInferred { count: usize },
}

/// Check that a transaction's real postings balance.
///
/// Only real postings participate: ordinary ones and `[bracketed]`
/// balanced-virtual ones. `(parenthesized)` unbalanced-virtual postings are
/// ignored entirely, so a transaction containing only those is trivially
/// balanced.
///
/// A posting with a cost contributes in the cost's commodity: per-unit
/// costs (`@`) multiply by the posting quantity's magnitude, total costs
/// (`@@`) contribute as-is; either way the sign follows the posting.
pub fn check_balance(transaction: &Transaction) -> BalanceOutcome {
    let real: Vec<(usize, &Posting)> = transaction
        .postings
        .iter()
        .enumerate()
        .filter(|(_, p)| p.is_real())
        .collect();

    let inferred: Vec<usize> =
        real.iter().filter(|(_, p)| p.is_inferred()).map(|(i, _)| *i).collect();
    if inferred.len() > 1 {
        return BalanceOutcome::MultipleInferred { count: inferred.len() };
    }

    let mut sums: BTreeMap<String, Decimal> = BTreeMap::new();
    for (_, posting) in &real {
        let Some(amount) = &posting.amount else { continue };
        let (commodity, quantity) = match &posting.cost {
            Some(cost) => {
                let quantity = if cost.is_total {
                    cost.amount.quantity
                } else {
                    cost.amount.quantity * amount.quantity.abs()
                };
                let signed = if amount.quantity.is_sign_negative() { -quantity } else { quantity };
                (cost.amount.commodity.clone(), signed)
            }
            None => (amount.commodity.clone(), amount.quantity),
        };
        *sums.entry(commodity).or_default() += quantity;
    }

    if let Some(&idx) = inferred.first() {
        // A single inferred posting absorbs whatever remains, in however
        // many commodities.
        return BalanceOutcome::Balanced { inferred: Some(idx) };
    }

    let differences: Vec<(String, Decimal)> = sums
        .into_iter()
        .filter(|(_, sum)| !sum.is_zero())
        .map(|(commodity, sum)| (commodity, sum.abs()))
        .collect();

    if differences.is_empty() {
        BalanceOutcome::Balanced { inferred: None }
    } else {
        BalanceOutcome::Unbalanced { differences }
    }
}
