//! minicc-util - Shared diagnostics and output framing
//!
//! The front-end reports three disjoint error categories (lexical, syntax,
//! semantic), each with its own report format and its own output file. This
//! crate owns the record types for all three, plus the line-grouped writer
//! framing shared by the token and lexical-error listings.

pub mod diagnostics;
pub mod line_writer;

pub use diagnostics::{
    LexicalCategory, LexicalError, SemanticError, SyntaxError, SyntaxErrorKind, ValueKind,
};
pub use line_writer::LineFramedWriter;
