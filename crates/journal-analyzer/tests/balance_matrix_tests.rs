//! Balance checker matrix across amount shapes, costs, and virtuals.

use journal_analyzer::{BalanceOutcome, check_balance};
use journal_parser::parse;

fn outcome(input: &str) -> BalanceOutcome {
    let parsed = parse(input);
    assert!(parsed.errors.is_empty(), "parse errors: {:?}", parsed.errors);
    check_balance(&parsed.journal.transactions[0])
}

fn is_balanced(input: &str) -> bool {
    matches!(outcome(input), BalanceOutcome::Balanced { .. })
}

#[test]
fn balanced_shapes() {
    let cases = [
        // plain pair
        "2024-01-15 a\n    x:a  $10\n    x:b  $-10\n",
        // sign written before the commodity
        "2024-01-15 b\n    x:a  $10\n    x:b  -$10\n",
        // commodity on the right
        "2024-01-15 c\n    x:a  10 EUR\n    x:b  -10 EUR\n",
        // grouping differences between the two sides
        "2024-01-15 d\n    x:a  1,000.00 USD\n    x:b  -1000 USD\n",
        // three-way split
        "2024-01-15 e\n    x:a  $6\n    x:b  $4\n    x:c  $-10\n",
        // inferred remainder
        "2024-01-15 f\n    x:a  $10\n    x:b\n",
        // inferred remainder across two commodities
        "2024-01-15 g\n    x:a  10 EUR\n    x:b  5 USD\n    x:c\n",
        // per-unit cost
        "2024-01-15 h\n    x:a  2 AAPL @ $5\n    x:b  $-10\n",
        // total cost
        "2024-01-15 i\n    x:a  2 AAPL @@ $10\n    x:b  $-10\n",
        // negative quantity with per-unit cost
        "2024-01-15 j\n    x:a  -2 AAPL @ $5\n    x:b  $10\n",
        // unbalanced virtual riding along
        "2024-01-15 k\n    (x:v)  $99\n    x:a  $1\n    x:b  $-1\n",
        // balanced virtual pair
        "2024-01-15 l\n    [x:a]  $3\n    [x:b]  $-3\n",
        // assertions never affect balancing
        "2024-01-15 m\n    x:a  $5 = $100\n    x:b  $-5 == $-200\n",
        // zero postings
        "2024-01-15 n\n",
        // bare numbers with no commodity
        "2024-01-15 o\n    x:a  5\n    x:b  -5\n",
    ];
    for case in cases {
        assert!(is_balanced(case), "expected balanced: {case:?}");
    }
}

#[test]
fn unbalanced_shapes() {
    let cases = [
        "2024-01-15 a\n    x:a  $10\n    x:b  $-9\n",
        "2024-01-15 b\n    x:a  10 EUR\n    x:b  -10 USD\n",
        "2024-01-15 c\n    x:a  2 AAPL @ $5\n    x:b  $-11\n",
        "2024-01-15 d\n    [x:a]  $3\n    [x:b]  $-2\n",
        "2024-01-15 e\n    x:a  $1\n",
    ];
    for case in cases {
        assert!(
            matches!(outcome(case), BalanceOutcome::Unbalanced { .. }),
            "expected unbalanced: {case:?}"
        );
    }
}

#[test]
fn difference_values_are_absolute_and_per_commodity() {
    let result = outcome(
        "2024-01-15 x\n    x:a  10 EUR\n    x:b  -4 EUR\n    x:c  -3 USD\n    x:d  3 USD\n    x:e  -1 GBP\n",
    );
    let BalanceOutcome::Unbalanced { differences } = result else {
        panic!("expected unbalanced, got {result:?}");
    };
    // USD nets to zero and is absent; EUR and GBP report absolute values.
    assert_eq!(differences.len(), 2);
    assert_eq!(differences[0].0, "EUR");
    assert_eq!(differences[0].1.to_string(), "6");
    assert_eq!(differences[1].0, "GBP");
    assert_eq!(differences[1].1.to_string(), "1");
}

#[test]
fn more_than_one_inferred_is_its_own_outcome() {
    let result = outcome("2024-01-15 x\n    x:a  $1\n    x:b\n    x:c\n    x:d\n");
    assert_eq!(result, BalanceOutcome::MultipleInferred { count: 3 });
}

#[test]
fn inferred_index_points_into_posting_list() {
    let result = outcome("2024-01-15 x\n    x:a  $1\n    (x:v)  $9\n    x:b\n");
    assert_eq!(result, BalanceOutcome::Balanced { inferred: Some(2) });
}

#[test]
fn virtual_unbalanced_inferred_does_not_count() {
    // The parenthesized posting has no amount but is not real, so it is
    // not an inferred slot.
    let result = outcome("2024-01-15 x\n    x:a  $1\n    x:b  $-1\n    (x:v)\n");
    assert_eq!(result, BalanceOutcome::Balanced { inferred: None });
}
