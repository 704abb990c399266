//! FIRST/FOLLOW/PREDICT computation.
//!
//! The standard iterative fixpoint: each pass re-derives every set from the
//! rules and repeats while anything grew. Semantic-action symbols are
//! filtered out up front; the computation never sees them.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::grammar::{GrammarSymbol, NonTerminal, Rule, Terminal};

type TerminalSet = FxHashSet<Terminal>;

/// Terminal or nonterminal; right-hand sides with actions stripped.
#[derive(Debug, Clone, Copy)]
enum Sym {
    T(Terminal),
    N(NonTerminal),
}

/// The three set families driving the predictive parser.
pub struct GrammarSets {
    pub first: FxHashMap<NonTerminal, TerminalSet>,
    pub follow: FxHashMap<NonTerminal, TerminalSet>,
    /// Indexed by rule position in the grammar table.
    pub predict: Vec<TerminalSet>,
}

impl GrammarSets {
    pub fn compute(rules: &[Rule]) -> Self {
        let stripped: Vec<(NonTerminal, Vec<Sym>)> = rules
            .iter()
            .map(|rule| {
                let rhs = rule
                    .rhs
                    .iter()
                    .filter_map(|sym| match sym {
                        GrammarSymbol::Terminal(t) => Some(Sym::T(*t)),
                        GrammarSymbol::Nonterminal(n) => Some(Sym::N(*n)),
                        GrammarSymbol::Action(_) => None,
                    })
                    .collect();
                (rule.lhs, rhs)
            })
            .collect();

        let mut sets = Self {
            first: stripped.iter().map(|(lhs, _)| (*lhs, TerminalSet::default())).collect(),
            follow: stripped.iter().map(|(lhs, _)| (*lhs, TerminalSet::default())).collect(),
            predict: Vec::new(),
        };
        sets.compute_first(&stripped);
        sets.compute_follow(&stripped);
        sets.compute_predict(&stripped);
        sets
    }

    /// FIRST of a symbol string: initial terminals of `items`, extended
    /// with `additional` when the whole string derives epsilon.
    fn collect(&self, initial: &TerminalSet, items: &[Sym], additional: &TerminalSet) -> TerminalSet {
        let mut result = initial.clone();
        let mut epsilon = false;

        for (index, item) in items.iter().enumerate() {
            match item {
                Sym::N(nt) => {
                    let first = &self.first[nt];
                    result.extend(first.iter().copied().filter(|t| *t != Terminal::Epsilon));
                    if first.contains(&Terminal::Epsilon) {
                        if index + 1 < items.len() {
                            continue;
                        }
                        epsilon = true;
                    }
                }
                Sym::T(t) => {
                    result.insert(*t);
                }
            }
            break;
        }

        if epsilon {
            result.extend(additional.iter().copied());
        }
        result
    }

    fn compute_first(&mut self, rules: &[(NonTerminal, Vec<Sym>)]) {
        let epsilon: TerminalSet = [Terminal::Epsilon].into_iter().collect();
        let mut changed = true;
        while changed {
            changed = false;
            for (lhs, rhs) in rules {
                let current = self.first[lhs].clone();
                let grown = self.collect(&current, rhs, &epsilon);
                if grown.len() != self.first[lhs].len() {
                    self.first.insert(*lhs, grown);
                    changed = true;
                }
            }
        }
    }

    fn compute_follow(&mut self, rules: &[(NonTerminal, Vec<Sym>)]) {
        let start = rules[0].0;
        if let Some(follow) = self.follow.get_mut(&start) {
            follow.insert(Terminal::Eof);
        }

        let mut changed = true;
        while changed {
            changed = false;
            for (lhs, rhs) in rules {
                for (index, item) in rhs.iter().enumerate() {
                    let Sym::N(nt) = item else { continue };

                    let grown = if index + 1 < rhs.len() {
                        self.collect(&self.follow[nt], &rhs[index + 1..], &self.follow[lhs])
                    } else {
                        let mut grown = self.follow[nt].clone();
                        grown.extend(self.follow[lhs].iter().copied());
                        grown
                    };

                    if grown.len() != self.follow[nt].len() {
                        self.follow.insert(*nt, grown);
                        changed = true;
                    }
                }
            }
        }
    }

    fn compute_predict(&mut self, rules: &[(NonTerminal, Vec<Sym>)]) {
        for (lhs, rhs) in rules {
            let set = match rhs.first() {
                Some(Sym::N(_)) => self.collect(&TerminalSet::default(), rhs, &self.follow[lhs]),
                Some(Sym::T(Terminal::Epsilon)) => self.follow[lhs].clone(),
                Some(Sym::T(t)) => [*t].into_iter().collect(),
                None => self.follow[lhs].clone(),
            };
            self.predict.push(set);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::grammar;

    fn sets() -> (Vec<Rule>, GrammarSets) {
        let rules = grammar();
        let sets = GrammarSets::compute(&rules);
        (rules, sets)
    }

    #[test]
    fn first_of_type_specifier() {
        let (_, sets) = sets();
        let first = &sets.first[&NonTerminal::TypeSpecifier];
        assert_eq!(first.len(), 2);
        assert!(first.contains(&Terminal::Int));
        assert!(first.contains(&Terminal::Void));
    }

    #[test]
    fn program_is_nullable() {
        let (_, sets) = sets();
        assert!(sets.first[&NonTerminal::Program].contains(&Terminal::Epsilon));
    }

    #[test]
    fn follow_of_start_contains_eof() {
        let (_, sets) = sets();
        assert!(sets.follow[&NonTerminal::Program].contains(&Terminal::Eof));
        // Actions are invisible: no set ever contains them, and no follow
        // set contains epsilon.
        for follow in sets.follow.values() {
            assert!(!follow.contains(&Terminal::Epsilon));
        }
    }

    #[test]
    fn follow_of_expression_has_statement_delimiters() {
        let (_, sets) = sets();
        let follow = &sets.follow[&NonTerminal::Expression];
        for expected in [
            Terminal::Semicolon,
            Terminal::ParenClose,
            Terminal::BracketClose,
            Terminal::Comma,
        ] {
            assert!(follow.contains(&expected), "missing {expected}");
        }
    }

    #[test]
    fn predict_selects_else_branches() {
        let (rules, sets) = sets();
        let endif_rule = rules
            .iter()
            .position(|r| {
                r.lhs == NonTerminal::ElseStmt
                    && matches!(r.rhs.first(), Some(GrammarSymbol::Terminal(Terminal::Endif)))
            })
            .unwrap();
        assert_eq!(sets.predict[endif_rule].len(), 1);
        assert!(sets.predict[endif_rule].contains(&Terminal::Endif));
    }

    #[test]
    fn predict_of_epsilon_rule_is_follow() {
        let (rules, sets) = sets();
        let eps_rule = rules
            .iter()
            .position(|r| {
                r.lhs == NonTerminal::DeclarationList
                    && matches!(r.rhs.first(), Some(GrammarSymbol::Terminal(Terminal::Epsilon)))
            })
            .unwrap();
        assert_eq!(sets.predict[eps_rule], sets.follow[&NonTerminal::DeclarationList]);
    }

    #[test]
    fn grammar_is_ll1() {
        // For every nonterminal, the predict sets of its alternatives are
        // pairwise disjoint, so rule selection is never ambiguous.
        let (rules, sets) = sets();
        for (i, a) in rules.iter().enumerate() {
            for (j, b) in rules.iter().enumerate().skip(i + 1) {
                if a.lhs != b.lhs {
                    continue;
                }
                let overlap: Vec<_> = sets.predict[i].intersection(&sets.predict[j]).collect();
                assert!(
                    overlap.is_empty(),
                    "rules {i} and {j} for {} overlap on {overlap:?}",
                    a.lhs
                );
            }
        }
    }
}
