//! Entity collectors shared by the analyzer and the workspace index.

use journal_ast::{Directive, Journal, Posting, Tag};
use std::collections::BTreeMap;
use std::collections::BTreeSet;

/// Derived per-journal facts, deterministically sorted.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct JournalFacts {
    pub accounts: Vec<String>,
    pub payees: Vec<String>,
    pub commodities: Vec<String>,
    pub tags: Vec<String>,
    /// Tag name → sorted distinct values seen for it
    pub tag_values: BTreeMap<String, Vec<String>>,
}

/// Collect accounts, payees, commodities, tags, and tag values from one
/// journal. Every list is sorted and deduplicated so downstream aggregation
/// is order-insensitive.
pub fn collect_facts(journal: &Journal) -> JournalFacts {
    let mut accounts = BTreeSet::new();
    let mut payees = BTreeSet::new();
    let mut commodities = BTreeSet::new();
    let mut tag_values: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();

    let mut record_tags = |tags: &[Tag]| {
        for tag in tags {
            let values = tag_values.entry(tag.name.clone()).or_default();
            if !tag.value.is_empty() {
                values.insert(tag.value.clone());
            }
        }
    };

    let mut record_posting = |posting: &Posting, commodities: &mut BTreeSet<String>| {
        if let Some(amount) = &posting.amount
            && amount.has_commodity()
        {
            commodities.insert(amount.commodity.clone());
        }
        if let Some(cost) = &posting.cost
            && cost.amount.has_commodity()
        {
            commodities.insert(cost.amount.commodity.clone());
        }
        if let Some(assertion) = &posting.assertion
            && assertion.amount.has_commodity()
        {
            commodities.insert(assertion.amount.commodity.clone());
        }
    };

    for transaction in &journal.transactions {
        let payee = transaction.payee_or_description();
        if !payee.is_empty() {
            payees.insert(payee.to_string());
        }
        record_tags(&transaction.tags);
        for posting in &transaction.postings {
            accounts.insert(posting.account.as_str().to_string());
            record_posting(posting, &mut commodities);
            record_tags(&posting.tags);
        }
    }

    for directive in &journal.directives {
        match directive {
            Directive::Account(account) => {
                accounts.insert(account.name.clone());
                record_tags(&account.tags);
            }
            Directive::Commodity(commodity) => {
                commodities.insert(commodity.symbol.clone());
            }
            Directive::DefaultCommodity(default) => {
                commodities.insert(default.symbol.clone());
            }
            Directive::Price(price) => {
                commodities.insert(price.commodity.clone());
                if price.price.has_commodity() {
                    commodities.insert(price.price.commodity.clone());
                }
            }
            Directive::Year(_) | Directive::Include(_) => {}
        }
    }

    JournalFacts {
        accounts: accounts.into_iter().collect(),
        payees: payees.into_iter().collect(),
        commodities: commodities.into_iter().collect(),
        tags: tag_values.keys().cloned().collect(),
        tag_values: tag_values
            .into_iter()
            .map(|(name, values)| (name, values.into_iter().collect()))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use journal_parser::parse;
    use pretty_assertions::assert_eq;

    #[test]
    fn collects_all_categories() {
        let outcome = parse(
            "account equity:opening\n\
             commodity EUR\n\
             2024-01-15 Acme | note ; trip:paris\n    expenses:food  $50 ; meal:lunch\n    assets:cash\n",
        );
        let facts = collect_facts(&outcome.journal);
        assert_eq!(facts.accounts, vec!["assets:cash", "equity:opening", "expenses:food"]);
        assert_eq!(facts.payees, vec!["Acme"]);
        assert_eq!(facts.commodities, vec!["$", "EUR"]);
        assert_eq!(facts.tags, vec!["meal", "trip"]);
        assert_eq!(facts.tag_values["trip"], vec!["paris"]);
    }

    #[test]
    fn cost_and_assertion_commodities_count() {
        let outcome = parse("2024-01-15 x\n    a:b  10 AAPL @ $150 == 1500 USD\n    c:d\n");
        let facts = collect_facts(&outcome.journal);
        assert_eq!(facts.commodities, vec!["$", "AAPL", "USD"]);
    }

    #[test]
    fn empty_tag_values_keep_tag_name() {
        let outcome = parse("2024-01-15 x ; reviewed:\n");
        let facts = collect_facts(&outcome.journal);
        assert_eq!(facts.tags, vec!["reviewed"]);
        assert!(facts.tag_values["reviewed"].is_empty());
    }

    #[test]
    fn collection_is_sorted_and_deduplicated() {
        let outcome = parse(
            "2024-01-15 zeta\n    b:b  $1\n    a:a\n2024-01-16 alpha\n    b:b  $2\n    a:a\n",
        );
        let facts = collect_facts(&outcome.journal);
        assert_eq!(facts.accounts, vec!["a:a", "b:b"]);
        assert_eq!(facts.payees, vec!["alpha", "zeta"]);
    }
}
