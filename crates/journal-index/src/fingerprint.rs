//! Canonical transaction fingerprints for duplicate detection.

use journal_ast::Transaction;

/// Compute the canonical fingerprint of a transaction:
/// `YYYY-MM-DD | payee-or-description | key1;key2;...` with posting keys
/// sorted, so posting order and whitespace width differences inside
/// postings never perturb the result.
///
/// A posting key is the account alone when the amount is absent, otherwise
/// `account|raw-quantity[ commodity]`.
pub fn transaction_fingerprint(transaction: &Transaction) -> String {
    let mut keys: Vec<String> = transaction.postings.iter().map(posting_key).collect();
    keys.sort();
    format!(
        "{} | {} | {}",
        transaction.date,
        transaction.payee_or_description(),
        keys.join(";")
    )
}

fn posting_key(posting: &journal_ast::Posting) -> String {
    match &posting.amount {
        None => posting.account.as_str().to_string(),
        Some(amount) => {
            if amount.has_commodity() {
                format!("{}|{} {}", posting.account, amount.raw_quantity, amount.commodity)
            } else {
                format!("{}|{}", posting.account, amount.raw_quantity)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use journal_parser::parse;

    fn fingerprint_of(input: &str) -> String {
        let outcome = parse(input);
        assert!(outcome.errors.is_empty(), "parse errors: {:?}", outcome.errors);
        transaction_fingerprint(&outcome.journal.transactions[0])
    }

    #[test]
    fn fingerprint_shape() {
        let fp = fingerprint_of("2024-01-15 test\n    expenses:food  $50\n    assets:cash\n");
        assert_eq!(fp, "2024-01-15 | test | assets:cash;expenses:food|50 $");
    }

    #[test]
    fn stable_under_posting_reordering() {
        let a = fingerprint_of("2024-01-15 t\n    a:a  $1\n    b:b  $-1\n");
        let b = fingerprint_of("2024-01-15 t\n    b:b  $-1\n    a:a  $1\n");
        assert_eq!(a, b);
    }

    #[test]
    fn stable_under_whitespace_width() {
        let narrow = fingerprint_of("2024-01-15 t\n    a:a  $1\n    b:b\n");
        let wide = fingerprint_of("2024-01-15 t\n        a:a      $1\n        b:b\n");
        assert_eq!(narrow, wide);
    }

    #[test]
    fn payee_split_uses_payee() {
        let piped = fingerprint_of("2024-01-15 Acme | note\n    a:a  $1\n    b:b\n");
        assert!(piped.contains("| Acme |"), "fingerprint: {piped}");
    }

    #[test]
    fn different_amounts_differ() {
        let one = fingerprint_of("2024-01-15 t\n    a:a  $1\n    b:b\n");
        let two = fingerprint_of("2024-01-15 t\n    a:a  $2\n    b:b\n");
        assert_ne!(one, two);
    }
}
