use journal_lexer::{Lexer, TokenType};

#[test]
fn lexer_emits_eof_once() {
    // Empty input
    let mut lx = Lexer::new("");
    let t1 = lx.next_token().unwrap();
    assert!(matches!(t1.token_type, TokenType::Eof), "First token should be EOF");
    assert!(lx.next_token().is_none(), "After EOF, should return None");

    // Whitespace-only input
    let mut lx = Lexer::new("   ");
    let t1 = lx.next_token().unwrap();
    assert!(matches!(t1.token_type, TokenType::Eof), "Whitespace-only input goes to EOF");
    assert!(lx.next_token().is_none());

    // With actual tokens
    let mut lx = Lexer::new("2024-01-15 x");
    let mut eofs = 0;
    while let Some(t) = lx.next_token() {
        if matches!(t.token_type, TokenType::Eof) {
            eofs += 1;
        }
    }
    assert_eq!(eofs, 1);
}

#[test]
fn tokens_cover_their_lexemes() {
    let input = "2024-01-15 * Acme | note ; k:v\n    expenses:food  $50 @ 1.2 EUR\n";
    for token in Lexer::new(input) {
        if matches!(token.token_type, TokenType::Eof) {
            continue;
        }
        let slice = &input[token.start.byte..token.end.byte];
        assert_eq!(
            &*token.text, slice,
            "token text must equal the covered slice for {:?}",
            token.token_type
        );
    }
}

#[test]
fn offsets_are_monotonic() {
    let input = "account a:b\ncommodity 1.000,00 EUR\nP 2024-01-15 USD 0.92 EUR\n";
    let mut last_end = 0;
    for token in Lexer::new(input) {
        assert!(token.start.byte >= last_end || matches!(token.token_type, TokenType::Eof));
        assert!(token.end.byte >= token.start.byte);
        last_end = token.end.byte;
    }
}

#[test]
fn malformed_input_never_fails() {
    // The lexer must produce a finite token stream for arbitrary garbage.
    let inputs = [
        ")))((([[",
        "=== @@@ |||",
        "\"unterminated",
        "2024-13-45=99/99 !!!",
        "    \t  \t mixed \t indent",
        "includeinclude",
        "-",
        "+",
    ];
    for input in inputs {
        let tokens: Vec<_> = Lexer::new(input).collect();
        assert!(
            matches!(tokens.last().map(|t| &t.token_type), Some(TokenType::Eof)),
            "stream for {input:?} must end with EOF"
        );
    }
}

#[test]
fn directive_set_is_case_sensitive() {
    let toks: Vec<_> = Lexer::new("Account foo\n").map(|t| t.token_type).collect();
    assert!(
        !toks.iter().any(|t| matches!(t, TokenType::Directive(_))),
        "capitalized Account is not a directive"
    );

    let toks: Vec<_> = Lexer::new("year 2024\n").map(|t| t.token_type).collect();
    assert!(matches!(&toks[0], TokenType::Directive(d) if &**d == "year"));
    assert!(matches!(&toks[1], TokenType::Number(n) if &**n == "2024"));
}

#[test]
fn amount_shape_tokens() {
    // All amount shapes from the grammar produce commodity + number pairs.
    let cases: &[(&str, usize, usize)] = &[
        // (posting line, expected commodity tokens, expected number tokens)
        ("    a:b  $50", 1, 1),
        ("    a:b  50 USD", 1, 1),
        ("    a:b  -$50", 1, 1),
        ("    a:b  $-50", 1, 1),
        ("    a:b  USD50", 1, 1),
        ("    a:b  -50", 0, 1),
    ];
    for (line, commodities, numbers) in cases {
        let input = format!("2024-01-15 x\n{line}\n");
        let toks: Vec<_> = Lexer::new(&input).map(|t| t.token_type).collect();
        let c = toks.iter().filter(|t| matches!(t, TokenType::Commodity(_))).count();
        let n = toks.iter().filter(|t| matches!(t, TokenType::Number(_))).count();
        assert_eq!((c, n), (*commodities, *numbers), "line: {line}");
    }
}
