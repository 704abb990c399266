//! Error records for the three front-end error categories.
//!
//! Each record's `Display` impl is the exact line written to the
//! corresponding report file; the writers add no formatting of their own.

use std::fmt;

use thiserror::Error;

/// Classification of a lexical error, as printed in `lexical_errors.txt`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LexicalCategory {
    InvalidInput,
    UnclosedComment,
    UnmatchedComment,
    InvalidNumber,
}

impl fmt::Display for LexicalCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LexicalCategory::InvalidInput => "Invalid input",
            LexicalCategory::UnclosedComment => "Unclosed comment",
            LexicalCategory::UnmatchedComment => "Unmatched comment",
            LexicalCategory::InvalidNumber => "Invalid number",
        };
        f.write_str(s)
    }
}

/// A single lexical error. Displays as the listing entry `(lexeme, Category)`;
/// the line prefix comes from the framed writer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("({lexeme}, {category})")]
pub struct LexicalError {
    pub line: u32,
    pub lexeme: String,
    pub category: LexicalCategory,
}

/// What went wrong at a syntax-error site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyntaxErrorKind {
    /// An expected terminal or nonterminal was absent.
    Missing(String),
    /// The lookahead cannot start anything in the current context.
    Illegal(String),
    /// Input ended while a construct was still open.
    UnexpectedEof,
}

impl fmt::Display for SyntaxErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyntaxErrorKind::Missing(what) => write!(f, "missing {what}"),
            SyntaxErrorKind::Illegal(what) => write!(f, "illegal {what}"),
            SyntaxErrorKind::UnexpectedEof => f.write_str("Unexpected EOF"),
        }
    }
}

/// A syntax error as reported by panic-mode recovery.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("#{line} : syntax error, {kind}")]
pub struct SyntaxError {
    pub line: u32,
    pub kind: SyntaxErrorKind,
}

/// Operand classification used in semantic type-mismatch messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Int,
    Array,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ValueKind::Int => "int",
            ValueKind::Array => "array",
        })
    }
}

/// A semantic error recorded during code generation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("#{line} : Semantic Error! {message}")]
pub struct SemanticError {
    pub line: u32,
    pub message: String,
}

impl SemanticError {
    pub fn undefined(line: u32, name: &str) -> Self {
        Self {
            line,
            message: format!("'{name}' is not defined."),
        }
    }

    pub fn illegal_void(line: u32, name: &str) -> Self {
        Self {
            line,
            message: format!("Illegal type of void for '{name}'."),
        }
    }

    pub fn arg_count_mismatch(line: u32, func: &str) -> Self {
        Self {
            line,
            message: format!("Mismatch in numbers of arguments of '{func}'."),
        }
    }

    /// `index` is 1-based, counting arguments left to right.
    pub fn arg_type_mismatch(
        line: u32,
        index: usize,
        func: &str,
        expected: ValueKind,
        got: ValueKind,
    ) -> Self {
        Self {
            line,
            message: format!(
                "Mismatch in type of argument {index} of '{func}'. \
                 Expected '{expected}' but got '{got}' instead."
            ),
        }
    }

    pub fn operand_mismatch(line: u32, got: ValueKind, expected: ValueKind) -> Self {
        Self {
            line,
            message: format!("Type mismatch in operands, Got {got} instead of {expected}."),
        }
    }

    pub fn break_outside_for(line: u32) -> Self {
        Self {
            line,
            message: "No 'for' found for 'break'.".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lexical_entry_format() {
        let err = LexicalError {
            line: 3,
            lexeme: "123abc".to_string(),
            category: LexicalCategory::InvalidNumber,
        };
        assert_eq!(err.to_string(), "(123abc, Invalid number)");
    }

    #[test]
    fn syntax_error_format() {
        let err = SyntaxError {
            line: 7,
            kind: SyntaxErrorKind::Missing(";".to_string()),
        };
        assert_eq!(err.to_string(), "#7 : syntax error, missing ;");

        let err = SyntaxError {
            line: 9,
            kind: SyntaxErrorKind::UnexpectedEof,
        };
        assert_eq!(err.to_string(), "#9 : syntax error, Unexpected EOF");
    }

    #[test]
    fn semantic_error_messages() {
        assert_eq!(
            SemanticError::undefined(1, "q").to_string(),
            "#1 : Semantic Error! 'q' is not defined."
        );
        assert_eq!(
            SemanticError::arg_type_mismatch(4, 2, "f", ValueKind::Int, ValueKind::Array)
                .to_string(),
            "#4 : Semantic Error! Mismatch in type of argument 2 of 'f'. \
             Expected 'int' but got 'array' instead."
        );
        assert_eq!(
            SemanticError::break_outside_for(12).to_string(),
            "#12 : Semantic Error! No 'for' found for 'break'."
        );
    }
}
