//! minicc-par - Predictive Parser
//!
//! An LL(1) grammar with semantic-action symbols woven into the right-hand
//! sides, FIRST/FOLLOW/PREDICT sets computed by fixpoint at startup, a
//! recursive-descent driver with panic-mode recovery, and an arena-backed
//! parse tree.
//!
//! The parser pulls tokens lazily from the scanner and pushes semantic
//! actions into an [`ActionSink`]; it knows nothing about code generation
//! beyond that trait.

pub mod grammar;
pub mod parser;
pub mod sets;
pub mod tables;
pub mod tree;

pub use grammar::{ActionSink, GrammarSymbol, NonTerminal, NoopSink, Rule, SemanticAction, Terminal};
pub use parser::{ParseOutcome, Parser};
pub use sets::GrammarSets;
pub use tree::{NodeId, ParseTree};
