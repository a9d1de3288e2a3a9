//! Immutable deep-copy snapshots of the workspace index.

use crate::file_index::TransactionEntry;
use journal_position::Range;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// A value-semantics view of the aggregated index.
///
/// Snapshots own every byte they expose: once taken, they are unaffected by
/// further index mutation and safe to hand to any number of concurrent
/// readers, or to hold across updates.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct IndexSnapshot {
    accounts: Vec<String>,
    payees: Vec<String>,
    commodities: Vec<String>,
    tags: Vec<String>,
    tag_values: BTreeMap<String, Vec<String>>,
    /// Account hierarchy: parent prefix → direct children (full names).
    /// The empty-string key holds top-level accounts.
    account_children: BTreeMap<String, Vec<String>>,
    /// Fingerprint → every (file, range) carrying a matching transaction
    fingerprints: BTreeMap<String, Vec<(PathBuf, Range)>>,
    payee_templates: BTreeMap<String, TransactionEntry>,
    file_order: Vec<PathBuf>,
}

impl IndexSnapshot {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn build(
        accounts: Vec<String>,
        payees: Vec<String>,
        commodities: Vec<String>,
        tags: Vec<String>,
        tag_values: BTreeMap<String, Vec<String>>,
        fingerprints: BTreeMap<String, Vec<(PathBuf, Range)>>,
        payee_templates: BTreeMap<String, TransactionEntry>,
        file_order: Vec<PathBuf>,
    ) -> Self {
        let account_children = build_account_children(&accounts);
        Self {
            accounts,
            payees,
            commodities,
            tags,
            tag_values,
            account_children,
            fingerprints,
            payee_templates,
            file_order,
        }
    }

    /// All account names, sorted.
    pub fn accounts(&self) -> &[String] {
        &self.accounts
    }

    /// All payees, sorted.
    pub fn payees(&self) -> &[String] {
        &self.payees
    }

    /// All commodity symbols, sorted.
    pub fn commodities(&self) -> &[String] {
        &self.commodities
    }

    /// All tag names, sorted.
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Sorted distinct values recorded for a tag.
    pub fn tag_values(&self, tag: &str) -> &[String] {
        self.tag_values.get(tag).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Direct children of an account prefix; pass `""` for top level.
    pub fn account_children(&self, prefix: &str) -> &[String] {
        self.account_children.get(prefix).map(Vec::as_slice).unwrap_or(&[])
    }

    /// How many indexed transactions share this fingerprint.
    pub fn duplicate_count(&self, fingerprint: &str) -> usize {
        self.fingerprints.get(fingerprint).map(Vec::len).unwrap_or(0)
    }

    /// Every location carrying a transaction with this fingerprint.
    pub fn find_duplicates(&self, fingerprint: &str) -> &[(PathBuf, Range)] {
        self.fingerprints.get(fingerprint).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The most recent transaction entry for a payee, in file insertion
    /// order, for completion templates.
    pub fn payee_template(&self, payee: &str) -> Option<&TransactionEntry> {
        self.payee_templates.get(payee)
    }

    /// Indexed files, primary first.
    pub fn file_order(&self) -> &[PathBuf] {
        &self.file_order
    }
}

/// Derive the parent → children map from the sorted account list. Interior
/// prefixes that are never posted to still appear as parents, so
/// `expenses:` completes even when only `expenses:food:lunch` exists.
fn build_account_children(accounts: &[String]) -> BTreeMap<String, Vec<String>> {
    let mut children: BTreeMap<String, std::collections::BTreeSet<String>> = BTreeMap::new();
    for account in accounts {
        let mut parent = String::new();
        let mut prefix = String::new();
        for segment in account.split(':') {
            if !prefix.is_empty() {
                prefix.push(':');
            }
            prefix.push_str(segment);
            children.entry(parent.clone()).or_default().insert(prefix.clone());
            parent = prefix.clone();
        }
    }
    children
        .into_iter()
        .map(|(parent, set)| (parent, set.into_iter().collect()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn account_children_cover_interior_prefixes() {
        let children = build_account_children(&[
            "assets:bank:checking".to_string(),
            "assets:cash".to_string(),
            "expenses:food".to_string(),
        ]);
        assert_eq!(children[""], vec!["assets", "expenses"]);
        assert_eq!(children["assets"], vec!["assets:bank", "assets:cash"]);
        assert_eq!(children["assets:bank"], vec!["assets:bank:checking"]);
        assert_eq!(children["expenses"], vec!["expenses:food"]);
    }

    #[test]
    fn missing_lookups_return_empty() {
        let snap = IndexSnapshot::default();
        assert!(snap.accounts().is_empty());
        assert!(snap.tag_values("none").is_empty());
        assert!(snap.account_children("none").is_empty());
        assert_eq!(snap.duplicate_count("x"), 0);
    }
}
