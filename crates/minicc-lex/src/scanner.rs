//! The scanner: drives the DFA over the character stream.

use indexmap::IndexSet;
use minicc_util::{LexicalCategory, LexicalError};

use crate::dfa::{Accept, Dfa, StateKind, EOF_BYTE};
use crate::{Token, TokenKind, KEYWORDS};

/// A token as recorded for the `tokens.txt` listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggedToken {
    pub kind: TokenKind,
    pub text: String,
    pub line: u32,
}

/// Everything the scanner accumulated besides the token stream itself.
#[derive(Debug)]
pub struct LexArtifacts {
    /// Parser-visible tokens, in textual order.
    pub tokens: Vec<LoggedToken>,
    /// Symbol table in insertion order, keywords first.
    pub symbols: Vec<String>,
    /// Lexical errors in textual order.
    pub errors: Vec<LexicalError>,
}

/// Demand-driven tokenizer over an in-memory source buffer.
///
/// One call to [`Scanner::next_token`] produces one parser-visible token;
/// comments and whitespace are consumed silently along the way. The scanner
/// holds at most one character of pushback.
pub struct Scanner<'src> {
    dfa: Dfa,
    src: &'src [u8],
    pos: usize,
    exhausted: bool,
    pushback: Option<u8>,
    line: u32,
    symbols: IndexSet<String>,
    log: Vec<LoggedToken>,
    errors: Vec<LexicalError>,
}

impl<'src> Scanner<'src> {
    pub fn new(source: &'src str) -> Self {
        let mut symbols = IndexSet::new();
        for kw in KEYWORDS {
            symbols.insert(kw.to_string());
        }
        Self {
            dfa: Dfa::minic(),
            src: source.as_bytes(),
            pos: 0,
            exhausted: false,
            pushback: None,
            line: 1,
            symbols,
            log: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Current line number (1-based).
    pub fn line(&self) -> u32 {
        self.line
    }

    pub fn errors(&self) -> &[LexicalError] {
        &self.errors
    }

    pub fn logged_tokens(&self) -> &[LoggedToken] {
        &self.log
    }

    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.symbols.iter().map(String::as_str)
    }

    pub fn into_artifacts(self) -> LexArtifacts {
        LexArtifacts {
            tokens: self.log,
            symbols: self.symbols.into_iter().collect(),
            errors: self.errors,
        }
    }

    /// Produces the next parser-visible token and the line it starts on.
    ///
    /// Lexical errors encountered along the way are recorded and scanning
    /// resumes from the following character. Once the input is exhausted,
    /// every further call yields EOF.
    pub fn next_token(&mut self) -> (Token, u32) {
        loop {
            let (token, line) = self.scan_token();
            match token.kind {
                TokenKind::Eof => return (token, line),
                TokenKind::Id => {
                    self.symbols.insert(token.text.clone());
                    self.record(&token, line);
                    return (token, line);
                }
                TokenKind::Num | TokenKind::Keyword | TokenKind::Symbol => {
                    self.record(&token, line);
                    return (token, line);
                }
            }
        }
    }

    fn record(&mut self, token: &Token, line: u32) {
        self.log.push(LoggedToken {
            kind: token.kind,
            text: token.text.clone(),
            line,
        });
    }

    /// One run of the DFA from its start state: yields a token or, after
    /// error recovery, keeps scanning within the same call. Comments and
    /// whitespace are swallowed here and never surface.
    fn scan_token(&mut self) -> (Token, u32) {
        'token: loop {
            let line = self.line;
            let mut state = Dfa::START;
            let mut lexeme: Vec<u8> = Vec::new();

            while !self.exhausted || self.pushback.is_some() {
                let byte = self.read_byte();
                lexeme.push(byte);

                match self.dfa.next(state, byte) {
                    None => {
                        // No transition: the consumed run is invalid input.
                        self.report(line, LexicalCategory::InvalidInput, &lexeme);
                        state = Dfa::START;
                        lexeme.clear();
                    }
                    Some(next) => match self.dfa.kind(next) {
                        StateKind::Intermediate => state = next,
                        StateKind::Error { category, pushback } => {
                            if pushback {
                                self.pushback = lexeme.pop();
                            }
                            self.report(line, category, &lexeme);
                            state = Dfa::START;
                            lexeme.clear();
                        }
                        StateKind::Accept(accept) => {
                            match self.accept(accept, lexeme) {
                                Some(token) => return (token, line),
                                // Comment or whitespace: restart on the
                                // line the scanner has reached by now.
                                None => continue 'token,
                            }
                        }
                    },
                }
            }

            return (Token::eof(), line);
        }
    }

    fn accept(&mut self, accept: Accept, mut lexeme: Vec<u8>) -> Option<Token> {
        match accept {
            Accept::Symbol => Some(Token::new(TokenKind::Symbol, ascii(&lexeme))),
            Accept::SymbolPushback => {
                self.pushback = lexeme.pop();
                Some(Token::new(TokenKind::Symbol, ascii(&lexeme)))
            }
            Accept::IdentOrKeyword => {
                self.pushback = lexeme.pop();
                let text = ascii(&lexeme);
                let kind = if KEYWORDS.contains(&text.as_str()) {
                    TokenKind::Keyword
                } else {
                    TokenKind::Id
                };
                Some(Token::new(kind, text))
            }
            Accept::Number => {
                self.pushback = lexeme.pop();
                Some(Token::new(TokenKind::Num, ascii(&lexeme)))
            }
            Accept::Comment | Accept::Whitespace => None,
            Accept::Eof => Some(Token::eof()),
        }
    }

    /// Reads one byte, honouring the pushback slot. A NUL byte or the end
    /// of the buffer both produce the EOF sentinel.
    fn read_byte(&mut self) -> u8 {
        if let Some(byte) = self.pushback.take() {
            return byte;
        }
        let byte = self.src.get(self.pos).copied().unwrap_or(EOF_BYTE);
        if byte == EOF_BYTE {
            self.exhausted = true;
            return EOF_BYTE;
        }
        self.pos += 1;
        if byte == b'\n' {
            self.line += 1;
        }
        byte
    }

    fn report(&mut self, line: u32, category: LexicalCategory, lexeme: &[u8]) {
        let mut text: String = lexeme
            .iter()
            .filter(|&&b| b != EOF_BYTE)
            .map(|&b| b as char)
            .collect();
        if category == LexicalCategory::UnclosedComment && text.len() > 7 {
            text.truncate(7);
            text.push_str("...");
        }
        self.errors.push(LexicalError {
            line,
            lexeme: text,
            category,
        });
    }
}

fn ascii(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens_of(src: &str) -> Vec<(TokenKind, String, u32)> {
        let mut scanner = Scanner::new(src);
        let mut out = Vec::new();
        loop {
            let (token, line) = scanner.next_token();
            if token.kind == TokenKind::Eof {
                return out;
            }
            out.push((token.kind, token.text, line));
        }
    }

    fn errors_of(src: &str) -> Vec<LexicalError> {
        let mut scanner = Scanner::new(src);
        while scanner.next_token().0.kind != TokenKind::Eof {}
        scanner.errors().to_vec()
    }

    #[test]
    fn keywords_and_identifiers() {
        let toks = tokens_of("int counter; if endif");
        assert_eq!(
            toks,
            vec![
                (TokenKind::Keyword, "int".into(), 1),
                (TokenKind::Id, "counter".into(), 1),
                (TokenKind::Symbol, ";".into(), 1),
                (TokenKind::Keyword, "if".into(), 1),
                (TokenKind::Keyword, "endif".into(), 1),
            ]
        );
    }

    #[test]
    fn equality_and_assignment_disambiguate() {
        let toks = tokens_of("a==b=c");
        let texts: Vec<_> = toks.iter().map(|(_, t, _)| t.as_str()).collect();
        assert_eq!(texts, vec!["a", "==", "b", "=", "c"]);
    }

    #[test]
    fn line_numbers_follow_newlines() {
        let toks = tokens_of("a\nb\n\nc");
        let lines: Vec<_> = toks.iter().map(|(_, _, l)| *l).collect();
        assert_eq!(lines, vec![1, 2, 4]);
    }

    #[test]
    fn token_line_is_where_it_starts() {
        // The identifier's trailing lookahead is the newline; the token
        // still reports the line its first character was consumed on.
        let toks = tokens_of("abc\ndef");
        assert_eq!(toks[0].2, 1);
        assert_eq!(toks[1].2, 2);
    }

    #[test]
    fn comments_are_discarded() {
        let toks = tokens_of("a /* ignore\nme */ b");
        let texts: Vec<_> = toks.iter().map(|(_, t, _)| t.as_str()).collect();
        assert_eq!(texts, vec!["a", "b"]);
        // 'b' follows the newline inside the comment.
        assert_eq!(toks[1].2, 2);
    }

    #[test]
    fn invalid_number_consumes_whole_run() {
        let errors = errors_of("123abc ;");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].lexeme, "123abc");
        assert_eq!(errors[0].category, LexicalCategory::InvalidNumber);

        let toks = tokens_of("123abc ;");
        assert_eq!(toks, vec![(TokenKind::Symbol, ";".into(), 1)]);
    }

    #[test]
    fn invalid_input_reports_consumed_run() {
        let errors = errors_of("x = @y");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].lexeme, "@");
        assert_eq!(errors[0].category, LexicalCategory::InvalidInput);
    }

    #[test]
    fn equal_then_invalid_reports_both_characters() {
        let errors = errors_of("a =! b");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].lexeme, "=!");
        assert_eq!(errors[0].category, LexicalCategory::InvalidInput);
    }

    #[test]
    fn unmatched_comment_close() {
        let errors = errors_of("a */ b");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].lexeme, "*/");
        assert_eq!(errors[0].category, LexicalCategory::UnmatchedComment);
    }

    #[test]
    fn unclosed_comment_truncates_long_lexeme() {
        let errors = errors_of("/* this comment never ends");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].lexeme, "/* this...");
        assert_eq!(errors[0].category, LexicalCategory::UnclosedComment);

        let errors = errors_of("/*ab");
        assert_eq!(errors[0].lexeme, "/*ab");
    }

    #[test]
    fn symbol_table_keeps_insertion_order_and_dedupes() {
        let mut scanner = Scanner::new("alpha beta alpha gamma");
        while scanner.next_token().0.kind != TokenKind::Eof {}
        let symbols: Vec<_> = scanner.symbols().collect();
        assert_eq!(
            symbols,
            vec![
                "if", "else", "void", "int", "for", "break", "return", "endif", "alpha", "beta",
                "gamma",
            ]
        );
    }

    #[test]
    fn eof_repeats_after_exhaustion() {
        let mut scanner = Scanner::new("x");
        assert_eq!(scanner.next_token().0.kind, TokenKind::Id);
        assert_eq!(scanner.next_token().0.kind, TokenKind::Eof);
        assert_eq!(scanner.next_token().0.kind, TokenKind::Eof);
        assert_eq!(scanner.next_token().0.kind, TokenKind::Eof);
    }

    #[test]
    fn star_symbol_vs_unmatched_close() {
        let toks = tokens_of("a * b");
        let texts: Vec<_> = toks.iter().map(|(_, t, _)| t.as_str()).collect();
        assert_eq!(texts, vec!["a", "*", "b"]);
    }
}
