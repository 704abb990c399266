//! Static state/transition description of the lexical automaton.
//!
//! States are intermediate (have outgoing transitions), accepting (yield a
//! token, possibly pushing the last character back), or error states
//! (classify the consumed lexeme into a lexical-error category). A missing
//! transition is itself meaningful: the scanner reports the consumed lexeme
//! as invalid input.

use minicc_util::LexicalCategory;

/// Sentinel fed to the automaton when the input runs out. Distinct from
/// every byte of real source; 7-bit ASCII programs never contain NUL.
pub const EOF_BYTE: u8 = 0;

pub type StateId = usize;

/// How an accepting state turns the consumed lexeme into a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Accept {
    /// SYMBOL covering the whole lexeme (single-character symbols, `==`).
    Symbol,
    /// SYMBOL recognised by overshoot; the lookahead is pushed back.
    SymbolPushback,
    /// ID, or KEYWORD when the lexeme is reserved; lookahead pushed back.
    IdentOrKeyword,
    /// NUM; lookahead pushed back.
    Number,
    /// A complete `/* ... */` comment, discarded.
    Comment,
    /// A single whitespace character, discarded.
    Whitespace,
    /// End of input.
    Eof,
}

/// Role of a state in the automaton.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateKind {
    Intermediate,
    Accept(Accept),
    /// Classified lexical error. With `pushback` the final character is
    /// returned to the input and excluded from the reported lexeme.
    Error {
        category: LexicalCategory,
        pushback: bool,
    },
}

const NO_EDGE: u16 = u16::MAX;

/// Character classes of the source alphabet.
const WHITESPACE: &[u8] = b" \t\n\r\x0C\x0B";
const SYMBOLS: &[u8] = b"/;:,[](){}+-*=<";
const SYMBOLS_NO_EQUAL: &[u8] = b"/;:,[](){}+-*<";
const SYMBOLS_NO_SLASH: &[u8] = b";:,[](){}+-*=<";

fn digits() -> impl Iterator<Item = u8> {
    b'0'..=b'9'
}

fn letters() -> impl Iterator<Item = u8> {
    (b'a'..=b'z').chain(b'A'..=b'Z')
}

fn alnum() -> impl Iterator<Item = u8> {
    digits().chain(letters())
}

/// Table-driven deterministic finite automaton.
pub struct Dfa {
    kinds: Vec<StateKind>,
    rows: Vec<[u16; 256]>,
}

impl Dfa {
    pub const START: StateId = 0;

    pub fn kind(&self, state: StateId) -> StateKind {
        self.kinds[state]
    }

    /// Transition on one input byte; `None` means the lexeme so far is
    /// invalid input.
    pub fn next(&self, state: StateId, input: u8) -> Option<StateId> {
        match self.rows[state][input as usize] {
            NO_EDGE => None,
            target => Some(target as StateId),
        }
    }

    /// Builds the MiniC automaton.
    pub fn minic() -> Self {
        let mut b = Builder::default();

        let start = b.state(StateKind::Intermediate);
        debug_assert_eq!(start, Self::START);

        // Single-symbol tokens, no lookahead needed.
        for sym in [
            b';', b':', b',', b'[', b']', b'(', b')', b'{', b'}', b'+', b'-',
        ] {
            let accept = b.state(StateKind::Accept(Accept::Symbol));
            b.edge(start, [sym], accept);
        }

        // '*': a symbol unless it opens an unmatched comment close.
        let star = b.state(StateKind::Intermediate);
        b.edge(start, [b'*'], star);
        let star_symbol = b.state(StateKind::Accept(Accept::SymbolPushback));
        b.edges(star, alnum().chain(WHITESPACE.iter().copied()), star_symbol);
        b.edges(star, SYMBOLS_NO_SLASH.iter().copied(), star_symbol);
        let unmatched = b.state(StateKind::Error {
            category: LexicalCategory::UnmatchedComment,
            pushback: false,
        });
        b.edge(star, [b'/'], unmatched);

        // '=' / '=='.
        let equal = b.state(StateKind::Intermediate);
        b.edge(start, [b'='], equal);
        let assign = b.state(StateKind::Accept(Accept::SymbolPushback));
        b.edges(equal, alnum().chain(WHITESPACE.iter().copied()), assign);
        b.edges(equal, SYMBOLS_NO_EQUAL.iter().copied(), assign);
        let double_equal = b.state(StateKind::Accept(Accept::Symbol));
        b.edge(equal, [b'='], double_equal);

        // '<'.
        let less = b.state(StateKind::Accept(Accept::Symbol));
        b.edge(start, [b'<'], less);

        // Identifiers and keywords: LETTER (LETTER|DIGIT)*.
        let ident = b.state(StateKind::Intermediate);
        b.edges(start, letters(), ident);
        b.edges(ident, alnum(), ident);
        let ident_done = b.state(StateKind::Accept(Accept::IdentOrKeyword));
        b.edges(
            ident,
            WHITESPACE.iter().copied().chain([EOF_BYTE]),
            ident_done,
        );
        b.edges(ident, SYMBOLS.iter().copied(), ident_done);

        // Numbers: DIGIT+; a trailing letter run makes the lexeme an
        // invalid number (the whole run is reported, lookahead pushed back).
        let number = b.state(StateKind::Intermediate);
        b.edges(start, digits(), number);
        b.edges(number, digits(), number);
        let number_done = b.state(StateKind::Accept(Accept::Number));
        b.edges(
            number,
            WHITESPACE.iter().copied().chain([EOF_BYTE]),
            number_done,
        );
        b.edges(number, SYMBOLS.iter().copied(), number_done);
        let bad_number = b.state(StateKind::Intermediate);
        b.edges(number, letters(), bad_number);
        b.edges(bad_number, alnum(), bad_number);
        let bad_number_done = b.state(StateKind::Error {
            category: LexicalCategory::InvalidNumber,
            pushback: true,
        });
        b.edges(
            bad_number,
            WHITESPACE.iter().copied().chain([EOF_BYTE]),
            bad_number_done,
        );
        b.edges(bad_number, SYMBOLS.iter().copied(), bad_number_done);

        // Comments. '/' must open '/*'; the language has no division, so a
        // lone '/' falls off the table and is reported as invalid input.
        let slash = b.state(StateKind::Intermediate);
        b.edge(start, [b'/'], slash);
        let body = b.state(StateKind::Intermediate);
        b.edge(slash, [b'*'], body);
        let closing = b.state(StateKind::Intermediate);
        b.edge(body, [b'*'], closing);
        b.edges(body, (1u8..=255).filter(|&c| c != b'*'), body);
        let comment_done = b.state(StateKind::Accept(Accept::Comment));
        b.edge(closing, [b'/'], comment_done);
        b.edge(closing, [b'*'], closing);
        b.edges(closing, (1u8..=255).filter(|&c| c != b'*' && c != b'/'), body);
        let unclosed = b.state(StateKind::Error {
            category: LexicalCategory::UnclosedComment,
            pushback: false,
        });
        b.edge(body, [EOF_BYTE], unclosed);
        b.edge(closing, [EOF_BYTE], unclosed);

        // Whitespace, one character at a time.
        let whitespace = b.state(StateKind::Accept(Accept::Whitespace));
        b.edges(start, WHITESPACE.iter().copied(), whitespace);

        // End of input.
        let eof = b.state(StateKind::Accept(Accept::Eof));
        b.edge(start, [EOF_BYTE], eof);

        b.finish()
    }
}

#[derive(Default)]
struct Builder {
    kinds: Vec<StateKind>,
    rows: Vec<[u16; 256]>,
}

impl Builder {
    fn state(&mut self, kind: StateKind) -> StateId {
        self.kinds.push(kind);
        self.rows.push([NO_EDGE; 256]);
        self.kinds.len() - 1
    }

    fn edge(&mut self, from: StateId, inputs: impl IntoIterator<Item = u8>, to: StateId) {
        self.edges(from, inputs, to);
    }

    fn edges(&mut self, from: StateId, inputs: impl IntoIterator<Item = u8>, to: StateId) {
        for input in inputs {
            let cell = &mut self.rows[from][input as usize];
            assert_eq!(
                *cell, NO_EDGE,
                "duplicate transition from state {from} on {input:#04x}"
            );
            *cell = to as u16;
        }
    }

    fn finish(self) -> Dfa {
        Dfa {
            kinds: self.kinds,
            rows: self.rows,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(dfa: &Dfa, input: &[u8]) -> (StateId, usize) {
        let mut state = Dfa::START;
        for (i, &byte) in input.iter().enumerate() {
            match dfa.next(state, byte) {
                Some(next) => match dfa.kind(next) {
                    StateKind::Intermediate => state = next,
                    _ => return (next, i + 1),
                },
                None => panic!("no transition from {state} on {byte:#04x}"),
            }
        }
        (state, input.len())
    }

    #[test]
    fn single_symbols_accept_immediately() {
        let dfa = Dfa::minic();
        for sym in b";:,[](){}+-<" {
            let (state, consumed) = run(&dfa, &[*sym]);
            assert!(matches!(dfa.kind(state), StateKind::Accept(Accept::Symbol)));
            assert_eq!(consumed, 1);
        }
    }

    #[test]
    fn double_equal_needs_no_pushback() {
        let dfa = Dfa::minic();
        let (state, _) = run(&dfa, b"==");
        assert!(matches!(dfa.kind(state), StateKind::Accept(Accept::Symbol)));
    }

    #[test]
    fn assignment_pushes_lookahead_back() {
        let dfa = Dfa::minic();
        let (state, _) = run(&dfa, b"=x");
        assert!(matches!(
            dfa.kind(state),
            StateKind::Accept(Accept::SymbolPushback)
        ));
    }

    #[test]
    fn identifier_ends_on_symbol() {
        let dfa = Dfa::minic();
        let (state, consumed) = run(&dfa, b"abc123;");
        assert!(matches!(
            dfa.kind(state),
            StateKind::Accept(Accept::IdentOrKeyword)
        ));
        assert_eq!(consumed, 7);
    }

    #[test]
    fn number_trailed_by_letters_is_invalid() {
        let dfa = Dfa::minic();
        let (state, consumed) = run(&dfa, b"123abc ");
        assert!(matches!(
            dfa.kind(state),
            StateKind::Error {
                category: LexicalCategory::InvalidNumber,
                pushback: true
            }
        ));
        assert_eq!(consumed, 7);
    }

    #[test]
    fn unmatched_comment_close() {
        let dfa = Dfa::minic();
        let (state, _) = run(&dfa, b"*/");
        assert!(matches!(
            dfa.kind(state),
            StateKind::Error {
                category: LexicalCategory::UnmatchedComment,
                ..
            }
        ));
    }

    #[test]
    fn comment_with_interior_stars_closes() {
        let dfa = Dfa::minic();
        let (state, consumed) = run(&dfa, b"/* a ** b ***/");
        assert!(matches!(dfa.kind(state), StateKind::Accept(Accept::Comment)));
        assert_eq!(consumed, 14);
    }

    #[test]
    fn comment_hitting_eof_is_unclosed() {
        let dfa = Dfa::minic();
        let (state, _) = run(&dfa, &[b'/', b'*', b'x', EOF_BYTE]);
        assert!(matches!(
            dfa.kind(state),
            StateKind::Error {
                category: LexicalCategory::UnclosedComment,
                ..
            }
        ));
    }

    #[test]
    fn lone_slash_has_no_transition() {
        let dfa = Dfa::minic();
        let mid = dfa.next(Dfa::START, b'/').unwrap();
        assert!(matches!(dfa.kind(mid), StateKind::Intermediate));
        assert_eq!(dfa.next(mid, b'x'), None);
    }
}
