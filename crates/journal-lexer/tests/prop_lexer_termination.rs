//! Property tests: the lexer terminates and stays within bounds on
//! arbitrary input.

use journal_lexer::{Lexer, TokenType};
use proptest::prelude::*;

proptest! {
    #[test]
    fn lexer_terminates_on_arbitrary_input(input in ".*") {
        let mut count = 0usize;
        for _ in Lexer::new(&input) {
            count += 1;
            // A token stream can never exceed one token per byte plus
            // structural tokens; anything bigger means a progress bug.
            prop_assert!(count <= input.len() * 2 + 16);
        }
    }

    #[test]
    fn token_spans_are_in_bounds(input in ".*") {
        for token in Lexer::new(&input) {
            prop_assert!(token.start.byte <= token.end.byte);
            prop_assert!(token.end.byte <= input.len());
            if !matches!(token.token_type, TokenType::Eof) {
                prop_assert_eq!(&*token.text, &input[token.start.byte..token.end.byte]);
            }
        }
    }

    #[test]
    fn journal_shaped_input_terminates(
        date in "[0-9]{4}-[0-9]{2}-[0-9]{2}",
        desc in "[a-z ]{0,20}",
        account in "[a-z]+(:[a-z]+){0,3}",
        qty in "-?[0-9]{1,7}",
    ) {
        let input = format!("{date} {desc}\n    {account}  ${qty}\n");
        let tokens: Vec<_> = Lexer::new(&input).collect();
        prop_assert!(matches!(tokens.last().map(|t| &t.token_type), Some(TokenType::Eof)));
        prop_assert!(tokens.iter().any(|t| matches!(t.token_type, TokenType::Date(_))));
    }
}
