//! Edge case and property tests for minicc-lex

#[cfg(test)]
mod tests {
    use crate::{Scanner, Token, TokenKind};
    use proptest::prelude::*;

    fn lex_all(source: &str) -> Vec<Token> {
        let mut scanner = Scanner::new(source);
        let mut tokens = Vec::new();
        loop {
            let (token, _) = scanner.next_token();
            if token.kind == TokenKind::Eof {
                break;
            }
            tokens.push(token);
        }
        tokens
    }

    #[test]
    fn empty_source() {
        assert!(lex_all("").is_empty());
    }

    #[test]
    fn whitespace_only_source() {
        assert!(lex_all(" \t\r\n \x0b\x0c ").is_empty());
    }

    #[test]
    fn single_char_ident() {
        let t = lex_all("x");
        assert_eq!(t, vec![Token::new(TokenKind::Id, "x")]);
    }

    #[test]
    fn long_identifier() {
        let name = "a".repeat(10_000);
        let t = lex_all(&name);
        assert_eq!(t.len(), 1);
        assert_eq!(t[0].text, name);
    }

    #[test]
    fn long_whitespace_run_does_not_blow_the_stack() {
        let source = format!("a{}b", " ".repeat(100_000));
        let t = lex_all(&source);
        assert_eq!(t.len(), 2);
    }

    #[test]
    fn keyword_prefix_is_still_an_ident() {
        let t = lex_all("iff intx breaker");
        for token in &t {
            assert_eq!(token.kind, TokenKind::Id);
        }
    }

    #[test]
    fn adjacent_symbols_split_correctly() {
        let t = lex_all("a[i]=b;");
        let texts: Vec<_> = t.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["a", "[", "i", "]", "=", "b", ";"]);
    }

    #[test]
    fn nul_byte_acts_as_end_of_input() {
        let t = lex_all("ab\0cd");
        assert_eq!(t, vec![Token::new(TokenKind::Id, "ab")]);
    }

    proptest! {
        /// Tokenisation totality: the scanner terminates on any ASCII
        /// input and ends in EOF, whatever mix of tokens and errors the
        /// input contains.
        #[test]
        fn scanning_always_terminates(source in "[ -~\t\n]{0,200}") {
            let mut scanner = Scanner::new(&source);
            // An upper bound well above one token per input byte; running
            // past it would mean the scanner stopped consuming input.
            let mut budget = source.len() + 8;
            loop {
                let (token, _) = scanner.next_token();
                if token.kind == TokenKind::Eof {
                    break;
                }
                budget -= 1;
                prop_assert!(budget > 0, "scanner failed to make progress");
            }
        }

        /// Token/error disjointness: every consumed character lands in at
        /// most one logged token or one reported error, so the total
        /// recorded text never exceeds the input.
        #[test]
        fn tokens_and_errors_cover_input_at_most_once(source in "[ -~]{0,120}") {
            let mut scanner = Scanner::new(&source);
            while scanner.next_token().0.kind != TokenKind::Eof {}
            let token_len: usize = scanner.logged_tokens().iter().map(|t| t.text.len()).sum();
            // Truncated unclosed-comment lexemes under-count, never over.
            let error_len: usize = scanner
                .errors()
                .iter()
                .map(|e| e.lexeme.trim_end_matches("...").len())
                .sum();
            prop_assert!(token_len + error_len <= source.len());
        }

        /// Keywords are never misclassified, identifiers never collide
        /// with the reserved words.
        #[test]
        fn keywords_roundtrip(idx in 0usize..8) {
            let kw = crate::KEYWORDS[idx];
            let t = lex_all(kw);
            prop_assert_eq!(t.len(), 1);
            prop_assert_eq!(t[0].kind, TokenKind::Keyword);
        }
    }
}
