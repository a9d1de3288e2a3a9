use journal_ast::{CommodityPosition, Directive, Status, VirtualKind};
use journal_parser::parse;
use pretty_assertions::assert_eq;

#[test]
fn simple_transaction_parses() {
    let outcome = parse("2024-01-15 test\n    expenses:food  $50\n    assets:cash  $-50\n");
    assert!(outcome.errors.is_empty(), "errors: {:?}", outcome.errors);
    let txn = &outcome.journal.transactions[0];
    assert_eq!(txn.date.to_string(), "2024-01-15");
    assert_eq!(txn.description, "test");
    assert_eq!(txn.postings.len(), 2);

    let food = &txn.postings[0];
    assert_eq!(food.account.as_str(), "expenses:food");
    let amount = food.amount.as_ref().unwrap();
    assert_eq!(amount.quantity.to_string(), "50");
    assert_eq!(amount.commodity, "$");
    assert_eq!(amount.position, CommodityPosition::Left);

    let cash = &txn.postings[1];
    assert_eq!(cash.amount.as_ref().unwrap().quantity.to_string(), "-50");
}

#[test]
fn payee_note_split_on_pipe() {
    let outcome = parse("2024-01-15 Acme Corp | invoice 42\n    a:b  $1\n    c:d\n");
    let txn = &outcome.journal.transactions[0];
    assert_eq!(txn.payee, "Acme Corp");
    assert_eq!(txn.note.as_deref(), Some("invoice 42"));
    assert_eq!(txn.payee_or_description(), "Acme Corp");
}

#[test]
fn description_keeps_pipe_text_as_written() {
    let outcome = parse("2024-01-15 Acme|note\n");
    let txn = &outcome.journal.transactions[0];
    assert_eq!(txn.description, "Acme|note");
    assert_eq!(txn.payee, "Acme");
    assert_eq!(txn.note.as_deref(), Some("note"));

    let outcome = parse("2024-01-15 Acme  |  invoice 42\n");
    let txn = &outcome.journal.transactions[0];
    assert_eq!(txn.description, "Acme  |  invoice 42");
    assert_eq!(txn.payee, "Acme");
    assert_eq!(txn.note.as_deref(), Some("invoice 42"));
}

#[test]
fn payee_defaults_to_description() {
    let outcome = parse("2024-01-15 just groceries\n");
    let txn = &outcome.journal.transactions[0];
    assert_eq!(txn.payee, "");
    assert_eq!(txn.payee_or_description(), "just groceries");
}

#[test]
fn status_code_and_secondary_date() {
    let outcome = parse("2024-01-15=2024-01-17 * (A1) shipped\n    a:b  $1\n    c:d\n");
    let txn = &outcome.journal.transactions[0];
    assert_eq!(txn.status, Status::Cleared);
    assert_eq!(txn.code.as_deref(), Some("A1"));
    assert_eq!(txn.secondary_date.unwrap().to_string(), "2024-01-17");
}

#[test]
fn european_number_normalizes() {
    let outcome = parse("2024-01-15 x\n    a:b  1.234.567,89 EUR\n    c:d\n");
    let amount = outcome.journal.transactions[0].postings[0].amount.as_ref().unwrap();
    assert_eq!(amount.quantity.to_string(), "1234567.89");
    assert_eq!(amount.raw_quantity, "1.234.567,89");
    assert_eq!(amount.commodity, "EUR");
    assert_eq!(amount.position, CommodityPosition::Right);
}

#[test]
fn amount_shapes_agree() {
    // Every accepted surface shape of "-50 dollars".
    let lines = ["-$50", "$-50", "-50 USD"];
    for line in lines {
        let input = format!("2024-01-15 x\n    a:b  {line}\n    c:d\n");
        let outcome = parse(&input);
        let amount = outcome.journal.transactions[0].postings[0].amount.as_ref().unwrap();
        assert_eq!(amount.quantity.to_string(), "-50", "shape {line}");
    }
}

#[test]
fn raw_quantity_round_trips() {
    // Re-parsing the raw form yields the same quantity and commodity.
    let input = "2024-01-15 x\n    a:b  1 234,56 EUR\n    c:d\n";
    let outcome = parse(input);
    let first = outcome.journal.transactions[0].postings[0].amount.clone().unwrap();

    let reparse = format!("2024-01-15 x\n    a:b  {} EUR\n    c:d\n", first.raw_quantity);
    let outcome2 = parse(&reparse);
    let second = outcome2.journal.transactions[0].postings[0].amount.clone().unwrap();
    assert_eq!(first.quantity, second.quantity);
    assert_eq!(first.commodity, second.commodity);
}

#[test]
fn cost_and_assertion_attach() {
    let outcome = parse("2024-01-15 buy\n    assets:stocks  10 AAPL @ $150 = $1500\n    assets:cash\n");
    let posting = &outcome.journal.transactions[0].postings[0];
    let cost = posting.cost.as_ref().unwrap();
    assert!(!cost.is_total);
    assert_eq!(cost.amount.quantity.to_string(), "150");
    let assertion = posting.assertion.as_ref().unwrap();
    assert!(!assertion.is_strict);
    assert_eq!(assertion.amount.quantity.to_string(), "1500");
}

#[test]
fn total_cost_and_strict_assertion() {
    let outcome = parse("2024-01-15 buy\n    a:b  10 AAPL @@ $1500 == $1500\n    c:d\n");
    let posting = &outcome.journal.transactions[0].postings[0];
    assert!(posting.cost.as_ref().unwrap().is_total);
    assert!(posting.assertion.as_ref().unwrap().is_strict);
}

#[test]
fn virtual_postings_parse() {
    let outcome = parse(
        "2024-01-15 x\n    [assets:budget:food]  $50\n    (assets:tracking)  $1\n    a:b  $-50\n",
    );
    let postings = &outcome.journal.transactions[0].postings;
    assert_eq!(postings[0].virtual_kind, VirtualKind::Balanced);
    assert_eq!(postings[0].account.as_str(), "assets:budget:food");
    assert_eq!(postings[1].virtual_kind, VirtualKind::Unbalanced);
    assert_eq!(postings[2].virtual_kind, VirtualKind::None);
}

#[test]
fn zero_postings_accepted() {
    let outcome = parse("2024-01-15 placeholder\n");
    assert!(outcome.errors.is_empty());
    assert!(outcome.journal.transactions[0].postings.is_empty());
}

#[test]
fn inferred_posting_has_no_amount() {
    let outcome = parse(
        "2024-01-01 opening\n    assets:bank  1000 RUB\n    assets:cash  100 USD\n    equity:opening\n",
    );
    let postings = &outcome.journal.transactions[0].postings;
    assert!(postings[2].amount.is_none());
}

#[test]
fn tags_extracted_from_comments() {
    let outcome = parse("2024-01-15 x ; trip:paris, reviewed:\n    a:b  $1 ; split:half\n    c:d\n");
    let txn = &outcome.journal.transactions[0];
    let tag_names: Vec<&str> = txn.tags.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(tag_names, vec!["trip", "reviewed"]);
    assert_eq!(txn.tags[0].value, "paris");
    assert_eq!(txn.postings[0].tags[0].name, "split");
}

#[test]
fn partial_date_needs_year_directive() {
    let without = parse("01/15 x\n");
    assert_eq!(without.errors.len(), 1);
    assert!(without.journal.transactions.is_empty());

    let with = parse("Y 2024\n01/15 x\n");
    assert!(with.errors.is_empty(), "errors: {:?}", with.errors);
    assert_eq!(with.journal.transactions[0].date.to_string(), "2024-01-15");
}

#[test]
fn out_of_range_date_components_survive() {
    let outcome = parse("2024-13-32 notionally fine\n");
    assert!(outcome.errors.is_empty());
    let date = outcome.journal.transactions[0].date;
    assert_eq!((date.month, date.day), (13, 32));
}

#[test]
fn account_directive_with_subdirectives() {
    let outcome = parse("account expenses:food ; type:E\n    note groceries and dining\n");
    let Directive::Account(account) = &outcome.journal.directives[0] else {
        panic!("expected account directive");
    };
    assert_eq!(account.name, "expenses:food");
    assert_eq!(account.tags[0].name, "type");
    assert_eq!(account.sub_directives["note"], "groceries and dining");
}

#[test]
fn commodity_directive_shapes() {
    let outcome = parse("commodity USD\ncommodity 1.000,00 EUR\ncommodity CAD 1000.00\n");
    let symbols: Vec<_> = outcome
        .journal
        .directives
        .iter()
        .filter_map(|d| match d {
            Directive::Commodity(c) => Some((c.symbol.clone(), c.format.clone())),
            _ => None,
        })
        .collect();
    assert_eq!(symbols[0], ("USD".to_string(), None));
    assert_eq!(symbols[1], ("EUR".to_string(), Some("1.000,00 EUR".to_string())));
    assert_eq!(symbols[2], ("CAD".to_string(), Some("CAD 1000.00".to_string())));
}

#[test]
fn commodity_format_subdirective_overrides() {
    let outcome = parse("commodity EUR\n    format 1.000,00 EUR\n");
    let Directive::Commodity(c) = &outcome.journal.directives[0] else {
        panic!("expected commodity directive");
    };
    assert_eq!(c.format.as_deref(), Some("1.000,00 EUR"));
}

#[test]
fn price_directive_parses() {
    let outcome = parse("P 2024-01-15 USD 0.92 EUR\n");
    let Directive::Price(p) = &outcome.journal.directives[0] else {
        panic!("expected price directive");
    };
    assert_eq!(p.commodity, "USD");
    assert_eq!(p.price.quantity.to_string(), "0.92");
    assert_eq!(p.price.commodity, "EUR");
}

#[test]
fn include_recorded_in_both_lists() {
    let outcome = parse("include books/*.journal\n");
    assert_eq!(outcome.journal.includes[0].path, "books/*.journal");
    assert!(matches!(outcome.journal.directives[0], Directive::Include(_)));
}

#[test]
fn default_commodity_directive() {
    let outcome = parse("D $1,000.00\n");
    let Directive::DefaultCommodity(d) = &outcome.journal.directives[0] else {
        panic!("expected default commodity directive");
    };
    assert_eq!(d.symbol, "$");
    assert_eq!(d.format.as_deref(), Some("$1,000.00"));
}

#[test]
fn comment_block_is_skipped() {
    let outcome = parse("comment\nthis is not journal syntax ((\nend comment\n2024-01-15 x\n");
    assert!(outcome.errors.is_empty(), "errors: {:?}", outcome.errors);
    assert_eq!(outcome.journal.transactions.len(), 1);
}

#[test]
fn bad_line_recovers_to_next_entry() {
    let outcome = parse("@@@ nonsense\n2024-01-15 fine\n    a:b  $1\n    c:d\n");
    assert!(!outcome.errors.is_empty());
    assert_eq!(outcome.journal.transactions.len(), 1);
    assert_eq!(outcome.journal.transactions[0].description, "fine");
}

#[test]
fn missing_posting_amount_never_aborts() {
    let outcome = parse("2024-01-15 x\n    a:b  @ $5\n    c:d  $1\n");
    // A cost with no preceding amount is odd but not fatal.
    assert_eq!(outcome.journal.transactions.len(), 1);
    assert_eq!(outcome.journal.transactions[0].postings.len(), 2);
    assert!(outcome.journal.transactions[0].postings[0].amount.is_none());
}

#[test]
fn quoted_commodity_parses() {
    let outcome = parse("2024-01-15 x\n    a:b  5 \"NT Dollar\"\n    c:d\n");
    let amount = outcome.journal.transactions[0].postings[0].amount.as_ref().unwrap();
    assert_eq!(amount.commodity, "NT Dollar");
}

#[test]
fn transaction_range_covers_postings() {
    let input = "2024-01-15 x\n    a:b  $1\n    c:d  $-1\n";
    let outcome = parse(input);
    let txn = &outcome.journal.transactions[0];
    assert_eq!(txn.range.start.byte, 0);
    assert_eq!(txn.range.end.line, 3);
}
