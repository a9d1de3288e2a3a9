//! Per-file derived facts.

use crate::fingerprint::transaction_fingerprint;
use journal_analyzer::collect_facts;
use journal_ast::{Date, Journal};
use journal_position::Range;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// A posting reduced to what completion templates and fingerprints need.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostingSummary {
    pub account: String,
    /// `raw-quantity[ commodity]` as written, absent for inferred postings
    pub amount: Option<String>,
}

/// One transaction's identity inside the index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionEntry {
    pub fingerprint: String,
    pub date: Date,
    pub payee: String,
    pub postings: Vec<PostingSummary>,
    pub range: Range,
}

/// Everything the workspace index keeps about one file.
///
/// Built from a parse result; owned exclusively by the workspace index.
/// The flat name lists are sorted and deduplicated so each contributes to
/// a workspace-level reference count exactly once.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FileIndex {
    pub accounts: Vec<String>,
    pub payees: Vec<String>,
    pub commodities: Vec<String>,
    pub tags: Vec<String>,
    pub tag_values: BTreeMap<String, Vec<String>>,
    /// Transactions in source order
    pub transactions: Vec<TransactionEntry>,
    /// Resolved include targets, absolute paths
    pub includes: Vec<PathBuf>,
}

impl FileIndex {
    /// Derive a file index from a parsed journal. `includes` carries the
    /// already-resolved include targets (glob patterns expanded).
    pub fn from_journal(journal: &Journal, includes: Vec<PathBuf>) -> Self {
        let facts = collect_facts(journal);
        let transactions = journal
            .transactions
            .iter()
            .map(|txn| TransactionEntry {
                fingerprint: transaction_fingerprint(txn),
                date: txn.date,
                payee: txn.payee_or_description().to_string(),
                postings: txn
                    .postings
                    .iter()
                    .map(|p| PostingSummary {
                        account: p.account.as_str().to_string(),
                        amount: p.amount.as_ref().map(|a| {
                            if a.has_commodity() {
                                format!("{} {}", a.raw_quantity, a.commodity)
                            } else {
                                a.raw_quantity.clone()
                            }
                        }),
                    })
                    .collect(),
                range: txn.range,
            })
            .collect();

        Self {
            accounts: facts.accounts,
            payees: facts.payees,
            commodities: facts.commodities,
            tags: facts.tags,
            tag_values: facts.tag_values,
            transactions,
            includes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use journal_parser::parse;
    use pretty_assertions::assert_eq;

    #[test]
    fn file_index_carries_facts_and_entries() {
        let outcome = parse(
            "2024-01-15 Acme\n    expenses:food  $50\n    assets:cash\n\
             2024-01-16 Zed\n    expenses:rent  $900\n    assets:cash\n",
        );
        let fi = FileIndex::from_journal(&outcome.journal, vec![PathBuf::from("/a/b.journal")]);
        assert_eq!(fi.accounts, vec!["assets:cash", "expenses:food", "expenses:rent"]);
        assert_eq!(fi.payees, vec!["Acme", "Zed"]);
        assert_eq!(fi.transactions.len(), 2);
        assert_eq!(fi.transactions[0].postings[0].amount.as_deref(), Some("50 $"));
        assert_eq!(fi.transactions[0].postings[1].amount, None);
        assert_eq!(fi.includes, vec![PathBuf::from("/a/b.journal")]);
    }
}
