//! The MiniC production rules, with semantic-action symbols embedded at the
//! points where the code generator must run.
//!
//! Rule order matters: the first rule's left-hand side is the start symbol,
//! and PREDICT sets are indexed by position in this table.

use crate::grammar::{GrammarSymbol, NonTerminal, Rule, SemanticAction, Terminal};

fn t(terminal: Terminal) -> GrammarSymbol {
    GrammarSymbol::Terminal(terminal)
}

fn n(nonterminal: NonTerminal) -> GrammarSymbol {
    GrammarSymbol::Nonterminal(nonterminal)
}

fn a(action: SemanticAction) -> GrammarSymbol {
    GrammarSymbol::Action(action)
}

/// Builds the grammar table.
pub fn grammar() -> Vec<Rule> {
    use NonTerminal as N;
    use SemanticAction as A;
    use Terminal as T;

    vec![
        Rule::new(N::Program, vec![n(N::DeclarationList)]),
        Rule::new(N::DeclarationList, vec![n(N::Declaration), n(N::DeclarationList)]),
        Rule::new(N::DeclarationList, vec![t(T::Epsilon)]),
        Rule::new(N::Declaration, vec![n(N::DeclarationInitial), n(N::DeclarationPrime)]),
        Rule::new(
            N::DeclarationInitial,
            vec![a(A::BeginDeclaration), n(N::TypeSpecifier), t(T::Id), a(A::AssignName)],
        ),
        Rule::new(
            N::DeclarationPrime,
            vec![a(A::DeclarationRoleFunction), n(N::FunDeclarationPrime)],
        ),
        Rule::new(N::DeclarationPrime, vec![n(N::VarDeclarationPrime)]),
        Rule::new(
            N::VarDeclarationPrime,
            vec![a(A::DeclarationRoleVariable), t(T::Semicolon)],
        ),
        Rule::new(
            N::VarDeclarationPrime,
            vec![
                t(T::BracketOpen),
                t(T::Num),
                a(A::Pnum),
                t(T::BracketClose),
                a(A::DeclarationRoleArray),
                t(T::Semicolon),
            ],
        ),
        Rule::new(
            N::FunDeclarationPrime,
            vec![
                t(T::ParenOpen),
                n(N::Params),
                t(T::ParenClose),
                a(A::BeginFunctionStatement),
                n(N::CompoundStmt),
                a(A::FunctionReturnJump),
                a(A::EndFunctionStatement),
            ],
        ),
        Rule::new(N::TypeSpecifier, vec![t(T::Int), a(A::TypeSpecifierInt)]),
        Rule::new(N::TypeSpecifier, vec![t(T::Void), a(A::TypeSpecifierVoid)]),
        Rule::new(
            N::Params,
            vec![
                a(A::BeginDeclaration),
                t(T::Int),
                a(A::TypeSpecifierInt),
                t(T::Id),
                a(A::AssignName),
                n(N::ParamPrime),
                n(N::ParamList),
            ],
        ),
        Rule::new(N::Params, vec![t(T::Void)]),
        Rule::new(N::ParamList, vec![t(T::Comma), n(N::Param), n(N::ParamList)]),
        Rule::new(N::ParamList, vec![t(T::Epsilon)]),
        Rule::new(N::Param, vec![n(N::DeclarationInitial), n(N::ParamPrime)]),
        Rule::new(
            N::ParamPrime,
            vec![a(A::ParamRoleArray), t(T::BracketOpen), t(T::BracketClose)],
        ),
        Rule::new(N::ParamPrime, vec![t(T::Epsilon), a(A::ParamRoleInt)]),
        Rule::new(
            N::CompoundStmt,
            vec![
                a(A::ScopeEnter),
                t(T::BraceOpen),
                n(N::DeclarationList),
                n(N::StatementList),
                t(T::BraceClose),
                a(A::ScopeExit),
            ],
        ),
        Rule::new(N::StatementList, vec![n(N::Statement), n(N::StatementList)]),
        Rule::new(N::StatementList, vec![t(T::Epsilon)]),
        Rule::new(N::Statement, vec![n(N::ExpressionStmt)]),
        Rule::new(N::Statement, vec![n(N::CompoundStmt)]),
        Rule::new(N::Statement, vec![n(N::SelectionStmt)]),
        Rule::new(N::Statement, vec![n(N::IterationStmt)]),
        Rule::new(N::Statement, vec![n(N::ReturnStmt)]),
        Rule::new(
            N::ExpressionStmt,
            vec![n(N::Expression), t(T::Semicolon), a(A::Pop)],
        ),
        Rule::new(
            N::ExpressionStmt,
            vec![a(A::CheckBreakJpSave), t(T::Break), t(T::Semicolon)],
        ),
        Rule::new(N::ExpressionStmt, vec![t(T::Semicolon), a(A::Pop)]),
        Rule::new(
            N::SelectionStmt,
            vec![
                t(T::If),
                t(T::ParenOpen),
                n(N::Expression),
                t(T::ParenClose),
                a(A::Save),
                n(N::Statement),
                n(N::ElseStmt),
            ],
        ),
        Rule::new(N::ElseStmt, vec![t(T::Endif), a(A::Jpf)]),
        Rule::new(
            N::ElseStmt,
            vec![t(T::Else), a(A::JpfSave), n(N::Statement), t(T::Endif), a(A::Jp)],
        ),
        Rule::new(
            N::IterationStmt,
            vec![
                t(T::For),
                t(T::ParenOpen),
                n(N::Expression),
                t(T::Semicolon),
                a(A::Label),
                n(N::Expression),
                t(T::Semicolon),
                a(A::SaveJump),
                n(N::Expression),
                t(T::ParenClose),
                a(A::JumpFill),
                n(N::Statement),
                a(A::For),
            ],
        ),
        Rule::new(
            N::ReturnStmt,
            vec![t(T::Return), n(N::ReturnStmtPrime), a(A::FunctionReturnJump)],
        ),
        Rule::new(N::ReturnStmtPrime, vec![t(T::Semicolon)]),
        Rule::new(
            N::ReturnStmtPrime,
            vec![n(N::Expression), a(A::FunctionReturnValue), t(T::Semicolon)],
        ),
        Rule::new(N::Expression, vec![n(N::SimpleExpressionZegond)]),
        Rule::new(N::Expression, vec![t(T::Id), a(A::Pid), n(N::B)]),
        Rule::new(N::B, vec![t(T::Assign), n(N::Expression), a(A::PidAssign)]),
        Rule::new(
            N::B,
            vec![
                t(T::BracketOpen),
                n(N::Expression),
                t(T::BracketClose),
                a(A::IndexArrayPop),
                n(N::H),
            ],
        ),
        Rule::new(N::B, vec![n(N::SimpleExpressionPrime)]),
        Rule::new(N::H, vec![t(T::Assign), n(N::Expression), a(A::PidAssign)]),
        Rule::new(N::H, vec![n(N::G), n(N::D), n(N::C)]),
        Rule::new(
            N::SimpleExpressionZegond,
            vec![n(N::AdditiveExpressionZegond), n(N::C)],
        ),
        Rule::new(
            N::SimpleExpressionPrime,
            vec![n(N::AdditiveExpressionPrime), n(N::C)],
        ),
        Rule::new(N::C, vec![n(N::Relop), n(N::AdditiveExpression), a(A::DoRelop)]),
        Rule::new(N::C, vec![t(T::Epsilon)]),
        Rule::new(N::Relop, vec![t(T::Less), a(A::PushRelopGreater)]),
        Rule::new(N::Relop, vec![t(T::DoubleEqual), a(A::PushRelopEqual)]),
        Rule::new(N::AdditiveExpression, vec![n(N::Term), n(N::D)]),
        Rule::new(N::AdditiveExpressionPrime, vec![n(N::TermPrime), n(N::D)]),
        Rule::new(N::AdditiveExpressionZegond, vec![n(N::TermZegond), n(N::D)]),
        Rule::new(
            N::D,
            vec![n(N::Addop), n(N::Term), a(A::DoAddop), n(N::D)],
        ),
        Rule::new(N::D, vec![t(T::Epsilon)]),
        Rule::new(N::Addop, vec![t(T::Plus), a(A::PushPlus)]),
        Rule::new(N::Addop, vec![t(T::Minus), a(A::PushMinus)]),
        Rule::new(N::Term, vec![n(N::SignedFactor), n(N::G)]),
        Rule::new(N::TermPrime, vec![n(N::SignedFactorPrime), n(N::G)]),
        Rule::new(N::TermZegond, vec![n(N::SignedFactorZegond), n(N::G)]),
        Rule::new(
            N::G,
            vec![t(T::Star), n(N::SignedFactor), a(A::DoMultiply), n(N::G)],
        ),
        Rule::new(N::G, vec![t(T::Epsilon)]),
        Rule::new(N::SignedFactor, vec![t(T::Plus), n(N::Factor)]),
        Rule::new(
            N::SignedFactor,
            vec![t(T::Minus), n(N::Factor), a(A::NegateSsTop)],
        ),
        Rule::new(N::SignedFactor, vec![n(N::Factor)]),
        Rule::new(N::SignedFactorPrime, vec![n(N::FactorPrime)]),
        Rule::new(N::SignedFactorZegond, vec![t(T::Plus), n(N::Factor)]),
        Rule::new(
            N::SignedFactorZegond,
            vec![t(T::Minus), n(N::Factor), a(A::NegateSsTop)],
        ),
        Rule::new(N::SignedFactorZegond, vec![n(N::FactorZegond)]),
        Rule::new(
            N::Factor,
            vec![t(T::ParenOpen), n(N::Expression), t(T::ParenClose)],
        ),
        Rule::new(N::Factor, vec![t(T::Id), a(A::Pid), n(N::VarCallPrime)]),
        Rule::new(N::Factor, vec![t(T::Num), a(A::Pnum)]),
        Rule::new(
            N::VarCallPrime,
            vec![
                a(A::BeginFunctionCall),
                t(T::ParenOpen),
                n(N::Args),
                t(T::ParenClose),
                a(A::EndFunctionCall),
            ],
        ),
        Rule::new(N::VarCallPrime, vec![n(N::VarPrime)]),
        Rule::new(
            N::VarPrime,
            vec![
                t(T::BracketOpen),
                n(N::Expression),
                t(T::BracketClose),
                a(A::IndexArrayPop),
            ],
        ),
        Rule::new(N::VarPrime, vec![t(T::Epsilon)]),
        Rule::new(
            N::FactorPrime,
            vec![
                a(A::BeginFunctionCall),
                t(T::ParenOpen),
                n(N::Args),
                t(T::ParenClose),
                a(A::EndFunctionCall),
            ],
        ),
        Rule::new(N::FactorPrime, vec![t(T::Epsilon)]),
        Rule::new(
            N::FactorZegond,
            vec![t(T::ParenOpen), n(N::Expression), t(T::ParenClose)],
        ),
        Rule::new(N::FactorZegond, vec![t(T::Num), a(A::Pnum)]),
        Rule::new(N::Args, vec![n(N::ArgList)]),
        Rule::new(N::Args, vec![t(T::Epsilon)]),
        Rule::new(N::ArgList, vec![n(N::Expression), n(N::ArgListPrime)]),
        Rule::new(
            N::ArgListPrime,
            vec![t(T::Comma), n(N::Expression), n(N::ArgListPrime)],
        ),
        Rule::new(N::ArgListPrime, vec![t(T::Epsilon)]),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_symbol_is_program() {
        let rules = grammar();
        assert_eq!(rules[0].lhs, NonTerminal::Program);
    }

    #[test]
    fn every_nonterminal_has_a_rule() {
        let rules = grammar();
        for rule in &rules {
            for sym in &rule.rhs {
                if let GrammarSymbol::Nonterminal(nt) = sym {
                    assert!(
                        rules.iter().any(|r| r.lhs == *nt),
                        "no production for {nt}"
                    );
                }
            }
        }
    }

    #[test]
    fn epsilon_appears_only_alone() {
        // EPSILON is a marker for an empty right-hand side; it never mixes
        // with other grammar symbols (actions aside).
        for rule in grammar() {
            let grammar_syms: Vec<_> = rule
                .rhs
                .iter()
                .filter(|s| !matches!(s, GrammarSymbol::Action(_)))
                .collect();
            if grammar_syms
                .iter()
                .any(|s| matches!(s, GrammarSymbol::Terminal(Terminal::Epsilon)))
            {
                assert_eq!(grammar_syms.len(), 1, "epsilon mixed into {}", rule.lhs);
            }
        }
    }
}
