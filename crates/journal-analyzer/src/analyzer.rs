//! The per-journal analysis pipeline.

use crate::balance::{BalanceOutcome, check_balance};
use crate::collect::{JournalFacts, collect_facts};
use crate::diagnostics::Diagnostic;
use journal_ast::{Directive, Journal, Posting};
use journal_diagnostics_codes::DiagnosticCode;
use rustc_hash::FxHashSet;

/// Declaration sets supplied from outside the journal under analysis,
/// typically aggregated across the whole workspace. Declarations found in
/// the journal itself are merged in automatically.
#[derive(Debug, Clone, Default)]
pub struct DeclarationSets {
    pub accounts: FxHashSet<String>,
    pub commodities: FxHashSet<String>,
}

/// Everything the analyzer produces for one journal.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub diagnostics: Vec<Diagnostic>,
    pub facts: JournalFacts,
}

/// Account names declared by `account` directives in this journal.
pub fn declared_accounts(journal: &Journal) -> FxHashSet<String> {
    journal
        .directives
        .iter()
        .filter_map(|d| match d {
            Directive::Account(account) => Some(account.name.clone()),
            _ => None,
        })
        .collect()
}

/// Commodity symbols declared by `commodity` or `D` directives.
pub fn declared_commodities(journal: &Journal) -> FxHashSet<String> {
    journal
        .directives
        .iter()
        .filter_map(|d| match d {
            Directive::Commodity(commodity) => Some(commodity.symbol.clone()),
            Directive::DefaultCommodity(default) => Some(default.symbol.clone()),
            _ => None,
        })
        .collect()
}

/// Analyze one journal: collect facts, balance-check every transaction,
/// and warn on undeclared accounts and commodities.
///
/// Declaration warnings only fire when there is something to compare
/// against: with no account declaration anywhere (journal or `external`),
/// every account is fine; likewise for commodities. A declared ancestor
/// suppresses its subaccounts, so `account expenses` covers
/// `expenses:food:lunch`.
pub fn analyze_journal(journal: &Journal, external: &DeclarationSets) -> Analysis {
    let facts = collect_facts(journal);
    let mut diagnostics = Vec::new();

    let mut accounts = declared_accounts(journal);
    accounts.extend(external.accounts.iter().cloned());
    let mut commodities = declared_commodities(journal);
    commodities.extend(external.commodities.iter().cloned());

    for transaction in &journal.transactions {
        match check_balance(transaction) {
            BalanceOutcome::Balanced { .. } => {}
            BalanceOutcome::Unbalanced { differences } => {
                let detail: Vec<String> = differences
                    .iter()
                    .map(|(commodity, diff)| {
                        if commodity.is_empty() {
                            format!("{diff}")
                        } else {
                            format!("{commodity} {diff}")
                        }
                    })
                    .collect();
                diagnostics.push(Diagnostic::new(
                    DiagnosticCode::Unbalanced,
                    format!("transaction does not balance: off by {}", detail.join(", ")),
                    transaction.range,
                ));
            }
            BalanceOutcome::MultipleInferred { count } => {
                diagnostics.push(Diagnostic::new(
                    DiagnosticCode::MultipleInferred,
                    format!("{count} postings with no amount; at most one can be inferred"),
                    transaction.range,
                ));
            }
        }

        for posting in &transaction.postings {
            if !accounts.is_empty() && !is_account_declared(posting, &accounts) {
                diagnostics.push(Diagnostic::new(
                    DiagnosticCode::UndeclaredAccount,
                    format!("undeclared account '{}'", posting.account),
                    posting.range,
                ));
            }
            if !commodities.is_empty() {
                for commodity in posting_commodities(posting) {
                    if !commodities.contains(commodity) {
                        diagnostics.push(Diagnostic::new(
                            DiagnosticCode::UndeclaredCommodity,
                            format!("undeclared commodity '{commodity}'"),
                            posting.range,
                        ));
                    }
                }
            }
        }
    }

    Analysis { diagnostics, facts }
}

/// Declared directly, or under a declared ancestor.
fn is_account_declared(posting: &Posting, declared: &FxHashSet<String>) -> bool {
    if declared.contains(posting.account.as_str()) {
        return true;
    }
    posting.account.ancestors().any(|ancestor| declared.contains(ancestor))
}

/// Distinct commodities this posting mentions: amount, cost, assertion.
fn posting_commodities(posting: &Posting) -> impl Iterator<Item = &str> {
    let mut seen: Vec<&str> = Vec::new();
    if let Some(amount) = &posting.amount {
        let symbol = amount.commodity.as_str();
        if !symbol.is_empty() && !seen.contains(&symbol) {
            seen.push(symbol);
        }
    }
    if let Some(cost) = &posting.cost {
        let symbol = cost.amount.commodity.as_str();
        if !symbol.is_empty() && !seen.contains(&symbol) {
            seen.push(symbol);
        }
    }
    if let Some(assertion) = &posting.assertion {
        let symbol = assertion.amount.commodity.as_str();
        if !symbol.is_empty() && !seen.contains(&symbol) {
            seen.push(symbol);
        }
    }
    seen.into_iter()
}

#[cfg(test)]
mod tests {
    use super::*;
    use journal_parser::parse;

    fn analyze(input: &str) -> Analysis {
        let outcome = parse(input);
        assert!(outcome.errors.is_empty(), "parse errors: {:?}", outcome.errors);
        analyze_journal(&outcome.journal, &DeclarationSets::default())
    }

    fn codes(analysis: &Analysis) -> Vec<&'static str> {
        analysis.diagnostics.iter().map(|d| d.code.as_str()).collect()
    }

    #[test]
    fn balanced_transaction_is_clean() {
        let analysis = analyze("2024-01-15 test\n    expenses:food  $50\n    assets:cash  $-50\n");
        assert!(analysis.diagnostics.is_empty());
        assert_eq!(analysis.facts.accounts, vec!["assets:cash", "expenses:food"]);
        assert_eq!(analysis.facts.commodities, vec!["$"]);
    }

    #[test]
    fn unbalanced_mentions_commodity_and_difference() {
        let analysis = analyze("2024-01-15 test\n    expenses:food  $50\n    assets:cash  $-40\n");
        assert_eq!(codes(&analysis), vec!["UNBALANCED"]);
        let message = &analysis.diagnostics[0].message;
        assert!(message.contains('$'), "message: {message}");
        assert!(message.contains("10"), "message: {message}");
    }

    #[test]
    fn multiple_inferred_is_an_error() {
        let analysis = analyze("2024-01-15 x\n    a:b  $5\n    c:d\n    e:f\n");
        assert_eq!(codes(&analysis), vec!["MULTIPLE_INFERRED"]);
    }

    #[test]
    fn no_declarations_means_no_warnings() {
        let analysis = analyze("2024-01-15 x\n    whatever:account  $1\n    other:account  $-1\n");
        assert!(analysis.diagnostics.is_empty());
    }

    #[test]
    fn declared_parent_suppresses_subaccount() {
        let analysis = analyze(
            "account expenses\n2024-01-15 x\n    expenses:food  $1\n    assets:cash  $-1\n",
        );
        assert_eq!(codes(&analysis), vec!["UNDECLARED_ACCOUNT"]);
        assert!(analysis.diagnostics[0].message.contains("assets:cash"));
    }

    #[test]
    fn external_declarations_suppress() {
        let outcome = parse("account x\n2024-01-15 t\n    a:b  $1\n    c:d  $-1\n");
        let mut external = DeclarationSets::default();
        external.accounts.insert("a:b".to_string());
        external.accounts.insert("c:d".to_string());
        let analysis = analyze_journal(&outcome.journal, &external);
        assert!(analysis.diagnostics.is_empty());
    }

    #[test]
    fn undeclared_commodity_checks_costs_and_assertions() {
        let analysis = analyze(
            "commodity USD\n2024-01-15 x\n    a:b  10 USD @ 9 EUR\n    c:d  -90 GBP == 0 GBP\n",
        );
        let commodity_warnings: Vec<&str> = analysis
            .diagnostics
            .iter()
            .filter(|d| d.code == DiagnosticCode::UndeclaredCommodity)
            .map(|d| d.message.as_str())
            .collect();
        assert_eq!(commodity_warnings.len(), 2, "warnings: {commodity_warnings:?}");
        assert!(commodity_warnings[0].contains("EUR"));
        assert!(commodity_warnings[1].contains("GBP"));
    }

    #[test]
    fn default_commodity_counts_as_declared() {
        let analysis = analyze("D $1000.00\n2024-01-15 x\n    a:b  $5\n    c:d  $-5\n");
        assert!(
            !codes(&analysis).contains(&"UNDECLARED_COMMODITY"),
            "diagnostics: {:?}",
            analysis.diagnostics
        );
    }

    #[test]
    fn bare_numbers_never_warn() {
        let analysis = analyze("commodity USD\n2024-01-15 x\n    a:b  5\n    c:d  -5\n");
        assert!(!codes(&analysis).contains(&"UNDECLARED_COMMODITY"));
    }
}
