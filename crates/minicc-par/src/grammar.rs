//! Grammar vocabulary: terminals, nonterminals and semantic-action symbols.
//!
//! Terminal display forms are the exact strings used in syntax-error
//! messages and parse-tree leaves, so `to_string` here is load-bearing.

use std::fmt;

use minicc_lex::{Token, TokenKind};

/// Terminal symbols, including the `EPSILON` pseudo-terminal and `$`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Terminal {
    Epsilon,
    Eof,
    ParenOpen,
    ParenClose,
    Plus,
    Minus,
    Star,
    Assign,
    DoubleEqual,
    Less,
    Int,
    Id,
    Num,
    Semicolon,
    /// Tokenised by the scanner but used by no production; always routed
    /// through error recovery as an illegal token.
    Colon,
    BracketOpen,
    BracketClose,
    BraceOpen,
    BraceClose,
    Void,
    Comma,
    Break,
    If,
    Endif,
    Else,
    For,
    Return,
}

impl Terminal {
    /// Maps a scanner token to its grammar terminal.
    pub fn classify(token: &Token) -> Terminal {
        match token.kind {
            TokenKind::Num => Terminal::Num,
            TokenKind::Id => Terminal::Id,
            TokenKind::Eof => Terminal::Eof,
            TokenKind::Keyword => match token.text.as_str() {
                "if" => Terminal::If,
                "else" => Terminal::Else,
                "void" => Terminal::Void,
                "int" => Terminal::Int,
                "for" => Terminal::For,
                "break" => Terminal::Break,
                "return" => Terminal::Return,
                "endif" => Terminal::Endif,
                other => unreachable!("scanner produced unknown keyword {other:?}"),
            },
            TokenKind::Symbol => match token.text.as_str() {
                "(" => Terminal::ParenOpen,
                ")" => Terminal::ParenClose,
                "+" => Terminal::Plus,
                "-" => Terminal::Minus,
                "*" => Terminal::Star,
                "=" => Terminal::Assign,
                "==" => Terminal::DoubleEqual,
                "<" => Terminal::Less,
                ";" => Terminal::Semicolon,
                "[" => Terminal::BracketOpen,
                "]" => Terminal::BracketClose,
                "{" => Terminal::BraceOpen,
                "}" => Terminal::BraceClose,
                "," => Terminal::Comma,
                ":" => Terminal::Colon,
                other => unreachable!("scanner produced unknown symbol {other:?}"),
            },
        }
    }
}

impl fmt::Display for Terminal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Terminal::Epsilon => "EPSILON",
            Terminal::Eof => "$",
            Terminal::ParenOpen => "(",
            Terminal::ParenClose => ")",
            Terminal::Plus => "+",
            Terminal::Minus => "-",
            Terminal::Star => "*",
            Terminal::Assign => "=",
            Terminal::DoubleEqual => "==",
            Terminal::Less => "<",
            Terminal::Int => "int",
            Terminal::Id => "ID",
            Terminal::Num => "NUM",
            Terminal::Semicolon => ";",
            Terminal::Colon => ":",
            Terminal::BracketOpen => "[",
            Terminal::BracketClose => "]",
            Terminal::BraceOpen => "{",
            Terminal::BraceClose => "}",
            Terminal::Void => "void",
            Terminal::Comma => ",",
            Terminal::Break => "break",
            Terminal::If => "if",
            Terminal::Endif => "endif",
            Terminal::Else => "else",
            Terminal::For => "for",
            Terminal::Return => "return",
        })
    }
}

/// Nonterminal symbols of the MiniC grammar. Display forms match the names
/// used in the parse-tree rendering and in `missing ...` messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NonTerminal {
    Program,
    DeclarationList,
    Declaration,
    DeclarationInitial,
    DeclarationPrime,
    VarDeclarationPrime,
    FunDeclarationPrime,
    TypeSpecifier,
    Params,
    ParamList,
    Param,
    ParamPrime,
    CompoundStmt,
    StatementList,
    Statement,
    ExpressionStmt,
    SelectionStmt,
    ElseStmt,
    IterationStmt,
    ReturnStmt,
    ReturnStmtPrime,
    Expression,
    B,
    H,
    SimpleExpressionZegond,
    SimpleExpressionPrime,
    C,
    Relop,
    AdditiveExpression,
    AdditiveExpressionPrime,
    AdditiveExpressionZegond,
    D,
    Addop,
    Term,
    TermPrime,
    TermZegond,
    G,
    SignedFactor,
    SignedFactorPrime,
    SignedFactorZegond,
    Factor,
    VarCallPrime,
    VarPrime,
    FactorPrime,
    FactorZegond,
    Args,
    ArgList,
    ArgListPrime,
}

impl fmt::Display for NonTerminal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            NonTerminal::Program => "Program",
            NonTerminal::DeclarationList => "Declaration-list",
            NonTerminal::Declaration => "Declaration",
            NonTerminal::DeclarationInitial => "Declaration-initial",
            NonTerminal::DeclarationPrime => "Declaration-prime",
            NonTerminal::VarDeclarationPrime => "Var-declaration-prime",
            NonTerminal::FunDeclarationPrime => "Fun-declaration-prime",
            NonTerminal::TypeSpecifier => "Type-specifier",
            NonTerminal::Params => "Params",
            NonTerminal::ParamList => "Param-list",
            NonTerminal::Param => "Param",
            NonTerminal::ParamPrime => "Param-prime",
            NonTerminal::CompoundStmt => "Compound-stmt",
            NonTerminal::StatementList => "Statement-list",
            NonTerminal::Statement => "Statement",
            NonTerminal::ExpressionStmt => "Expression-stmt",
            NonTerminal::SelectionStmt => "Selection-stmt",
            NonTerminal::ElseStmt => "Else-stmt",
            NonTerminal::IterationStmt => "Iteration-stmt",
            NonTerminal::ReturnStmt => "Return-stmt",
            NonTerminal::ReturnStmtPrime => "Return-stmt-prime",
            NonTerminal::Expression => "Expression",
            NonTerminal::B => "B",
            NonTerminal::H => "H",
            NonTerminal::SimpleExpressionZegond => "Simple-expression-zegond",
            NonTerminal::SimpleExpressionPrime => "Simple-expression-prime",
            NonTerminal::C => "C",
            NonTerminal::Relop => "Relop",
            NonTerminal::AdditiveExpression => "Additive-expression",
            NonTerminal::AdditiveExpressionPrime => "Additive-expression-prime",
            NonTerminal::AdditiveExpressionZegond => "Additive-expression-zegond",
            NonTerminal::D => "D",
            NonTerminal::Addop => "Addop",
            NonTerminal::Term => "Term",
            NonTerminal::TermPrime => "Term-prime",
            NonTerminal::TermZegond => "Term-zegond",
            NonTerminal::G => "G",
            NonTerminal::SignedFactor => "Signed-factor",
            NonTerminal::SignedFactorPrime => "Signed-factor-prime",
            NonTerminal::SignedFactorZegond => "Signed-factor-zegond",
            NonTerminal::Factor => "Factor",
            NonTerminal::VarCallPrime => "Var-call-prime",
            NonTerminal::VarPrime => "Var-prime",
            NonTerminal::FactorPrime => "Factor-prime",
            NonTerminal::FactorZegond => "Factor-zegond",
            NonTerminal::Args => "Args",
            NonTerminal::ArgList => "Arg-list",
            NonTerminal::ArgListPrime => "Arg-list-prime",
        })
    }
}

/// Semantic-action symbols embedded in grammar right-hand sides.
///
/// Invisible to set computation and terminal matching; each occurrence is
/// forwarded to the code generator through [`ActionSink`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SemanticAction {
    ScopeEnter,
    ScopeExit,
    TypeSpecifierInt,
    TypeSpecifierVoid,
    BeginDeclaration,
    AssignName,
    DeclarationRoleFunction,
    DeclarationRoleVariable,
    DeclarationRoleArray,
    BeginFunctionStatement,
    EndFunctionStatement,
    ParamRoleInt,
    ParamRoleArray,
    FunctionReturnValue,
    FunctionReturnJump,
    CheckBreakJpSave,
    BeginFunctionCall,
    EndFunctionCall,
    Pop,
    Save,
    Label,
    Jpf,
    JpfSave,
    Jp,
    SaveJump,
    JumpFill,
    For,
    IndexArrayPop,
    Pid,
    Pnum,
    PushPlus,
    PushMinus,
    NegateSsTop,
    DoAddop,
    PushRelopGreater,
    PushRelopEqual,
    DoRelop,
    PidAssign,
    DoMultiply,
}

/// One symbol of a production right-hand side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrammarSymbol {
    Terminal(Terminal),
    Nonterminal(NonTerminal),
    Action(SemanticAction),
}

/// A production rule.
#[derive(Debug, Clone)]
pub struct Rule {
    pub lhs: NonTerminal,
    pub rhs: Vec<GrammarSymbol>,
}

impl Rule {
    pub fn new(lhs: NonTerminal, rhs: Vec<GrammarSymbol>) -> Self {
        Self { lhs, rhs }
    }
}

/// Receiver for semantic actions dispatched during parsing.
///
/// `line` is the current lookahead line; `lexeme` is the text of the most
/// recently matched terminal (the identifier for PID/AssignName, the
/// number for PNUM).
pub trait ActionSink {
    fn dispatch(&mut self, action: SemanticAction, line: u32, lexeme: &str);
}

/// Sink that ignores every action; parsing-only callers and tests use it.
#[derive(Debug, Default)]
pub struct NoopSink;

impl ActionSink for NoopSink {
    fn dispatch(&mut self, _action: SemanticAction, _line: u32, _lexeme: &str) {}
}
