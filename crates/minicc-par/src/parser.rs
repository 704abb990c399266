//! The predictive recursive-descent driver.
//!
//! One conceptual procedure per nonterminal: select the unique rule whose
//! PREDICT set contains the lookahead, then walk its right-hand side —
//! recursing on nonterminals, matching terminals, dispatching action
//! symbols to the sink. Recovery is per-procedure panic mode; an
//! unexpected end of input unwinds the whole parse, keeping the partial
//! tree and every error recorded so far.

use minicc_util::{SyntaxError, SyntaxErrorKind};
use rustc_hash::FxHashMap;

use minicc_lex::{Scanner, Token, TokenKind};

use crate::grammar::{ActionSink, GrammarSymbol, NonTerminal, Rule, Terminal};
use crate::sets::GrammarSets;
use crate::tables;
use crate::tree::{NodeId, ParseTree};

/// What a finished parse leaves behind.
pub struct ParseOutcome {
    pub tree: ParseTree,
    pub root: NodeId,
    pub errors: Vec<SyntaxError>,
}

/// Unwinds every active procedure after an unexpected EOF.
struct Aborted;

pub struct Parser<'a, 'src, S: ActionSink> {
    scanner: &'a mut Scanner<'src>,
    sink: &'a mut S,
    rules: Vec<Rule>,
    sets: GrammarSets,
    by_lhs: FxHashMap<NonTerminal, Vec<usize>>,
    tree: ParseTree,
    errors: Vec<SyntaxError>,
    lookahead: Token,
    line: u32,
    last_lexeme: String,
}

impl<'a, 'src, S: ActionSink> Parser<'a, 'src, S> {
    pub fn new(scanner: &'a mut Scanner<'src>, sink: &'a mut S) -> Self {
        let rules = tables::grammar();
        let sets = GrammarSets::compute(&rules);
        let mut by_lhs: FxHashMap<NonTerminal, Vec<usize>> = FxHashMap::default();
        for (index, rule) in rules.iter().enumerate() {
            by_lhs.entry(rule.lhs).or_default().push(index);
        }

        let (lookahead, line) = scanner.next_token();
        Self {
            scanner,
            sink,
            rules,
            sets,
            by_lhs,
            tree: ParseTree::new(),
            errors: Vec::new(),
            lookahead,
            line,
            last_lexeme: String::new(),
        }
    }

    /// Runs the parse to completion and returns the tree and error log.
    pub fn parse(mut self) -> ParseOutcome {
        let start = self.rules[0].lhs;
        let completed = self.procedure(start, None).is_ok();

        let root = if self.tree.is_empty() {
            // Degenerate input: not even the start symbol's rule fired.
            self.tree.node(start.to_string())
        } else {
            NodeId::ROOT
        };

        if completed {
            let eof = self.tree.node("$");
            self.tree.attach(root, eof);
        }

        ParseOutcome {
            tree: self.tree,
            root,
            errors: self.errors,
        }
    }

    /// The procedure for nonterminal `nt`. Attaches the node it builds to
    /// `parent` as soon as the node exists, so aborted parses keep their
    /// partial subtrees.
    fn procedure(&mut self, nt: NonTerminal, parent: Option<NodeId>) -> Result<(), Aborted> {
        loop {
            let la = Terminal::classify(&self.lookahead);

            if let Some(rule_index) = self.select_rule(nt, la) {
                let node = self.tree.node(nt.to_string());
                if let Some(parent) = parent {
                    self.tree.attach(parent, node);
                }
                return self.walk_rhs(rule_index, node);
            }

            // Panic-mode recovery.
            if self.sets.follow[&nt].contains(&la) {
                self.report(SyntaxErrorKind::Missing(nt.to_string()));
                return Ok(());
            }
            if la == Terminal::Eof {
                self.report(SyntaxErrorKind::UnexpectedEof);
                return Err(Aborted);
            }
            self.report(SyntaxErrorKind::Illegal(la.to_string()));
            self.advance();
        }
    }

    fn walk_rhs(&mut self, rule_index: usize, node: NodeId) -> Result<(), Aborted> {
        let rhs = self.rules[rule_index].rhs.clone();
        for symbol in rhs {
            match symbol {
                GrammarSymbol::Nonterminal(child) => self.procedure(child, Some(node))?,
                GrammarSymbol::Terminal(Terminal::Epsilon) => {
                    let leaf = self.tree.node("epsilon");
                    self.tree.attach(node, leaf);
                }
                GrammarSymbol::Terminal(expected) => self.match_terminal(expected, node),
                GrammarSymbol::Action(action) => {
                    self.sink.dispatch(action, self.line, &self.last_lexeme);
                }
            }
        }
        Ok(())
    }

    /// Consumes the lookahead when it matches `expected`; otherwise reports
    /// `missing` and leaves the input untouched.
    fn match_terminal(&mut self, expected: Terminal, parent: NodeId) {
        if Terminal::classify(&self.lookahead) == expected {
            let leaf = self.tree.node(self.leaf_label());
            self.tree.attach(parent, leaf);
            self.last_lexeme.clear();
            self.last_lexeme.push_str(&self.lookahead.text);
            self.advance();
        } else {
            self.report(SyntaxErrorKind::Missing(expected.to_string()));
        }
    }

    fn leaf_label(&self) -> String {
        if self.lookahead.kind == TokenKind::Eof {
            "$".to_string()
        } else {
            self.lookahead.to_string()
        }
    }

    fn select_rule(&self, nt: NonTerminal, la: Terminal) -> Option<usize> {
        self.by_lhs[&nt]
            .iter()
            .copied()
            .find(|&index| self.sets.predict[index].contains(&la))
    }

    fn advance(&mut self) {
        let (token, line) = self.scanner.next_token();
        self.lookahead = token;
        self.line = line;
    }

    fn report(&mut self, kind: SyntaxErrorKind) {
        self.errors.push(SyntaxError {
            line: self.line,
            kind,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::NoopSink;

    fn parse(source: &str) -> ParseOutcome {
        let mut scanner = Scanner::new(source);
        let mut sink = NoopSink;
        Parser::new(&mut scanner, &mut sink).parse()
    }

    #[test]
    fn empty_program_parses() {
        let outcome = parse("");
        assert!(outcome.errors.is_empty());
        assert_eq!(
            outcome.tree.render(outcome.root),
            "Program\n\
             ├── Declaration-list\n\
             │   └── epsilon\n\
             └── $\n"
        );
    }

    #[test]
    fn minimal_main_parses_cleanly() {
        let outcome = parse("void main(void){ }");
        assert!(outcome.errors.is_empty(), "{:?}", outcome.errors);
        let rendered = outcome.tree.render(outcome.root);
        assert!(rendered.contains("(KEYWORD, void)"));
        assert!(rendered.contains("(ID, main)"));
        assert!(rendered.contains("Fun-declaration-prime"));
        assert!(rendered.ends_with("└── $\n"));
    }

    #[test]
    fn every_consumed_terminal_becomes_exactly_one_leaf() {
        let source = "void main(void){ int x; x = x + 1; output(x); }";
        let outcome = parse(source);
        assert!(outcome.errors.is_empty(), "{:?}", outcome.errors);

        let rendered = outcome.tree.render(outcome.root);
        let mut scanner = Scanner::new(source);
        loop {
            let (token, _) = scanner.next_token();
            if token.kind == TokenKind::Eof {
                break;
            }
            let leaf = token.to_string();
            let count = rendered
                .lines()
                .filter(|l| l.ends_with(leaf.as_str()))
                .count();
            assert!(count >= 1, "leaf {leaf} not rendered");
        }
    }

    #[test]
    fn missing_semicolon_is_reported_and_parsing_continues() {
        let outcome = parse("void main(void){ int x\nx = 1; }");
        let messages: Vec<_> = outcome.errors.iter().map(|e| e.to_string()).collect();
        assert!(
            messages.iter().any(|m| m.contains("missing ;")),
            "{messages:?}"
        );
    }

    #[test]
    fn illegal_token_is_consumed() {
        let outcome = parse("void main(void){ int x; } int");
        let messages: Vec<_> = outcome.errors.iter().map(|e| e.to_string()).collect();
        // Trailing `int` opens a declaration that never finishes; the
        // parser must reach EOF without looping.
        assert!(!messages.is_empty());
    }

    #[test]
    fn unexpected_eof_aborts_with_partial_tree() {
        let outcome = parse("void main(void){ int x;");
        let messages: Vec<_> = outcome.errors.iter().map(|e| e.to_string()).collect();
        assert!(
            messages.iter().any(|m| m.contains("Unexpected EOF")),
            "{messages:?}"
        );
        // Aborted parses do not gain the final `$` leaf.
        let rendered = outcome.tree.render(outcome.root);
        assert!(!rendered.contains("└── $\n"));
        assert!(rendered.starts_with("Program\n"));
    }

    #[test]
    fn if_requires_endif() {
        let outcome = parse("void main(void){ int x; if (x == 1) x = 2; endif }");
        assert!(outcome.errors.is_empty(), "{:?}", outcome.errors);
    }

    #[test]
    fn for_loop_parses() {
        let outcome = parse("void main(void){ int i; for (i = 0; i < 10; i = i + 1) { output(i); } }");
        assert!(outcome.errors.is_empty(), "{:?}", outcome.errors);
    }
}
