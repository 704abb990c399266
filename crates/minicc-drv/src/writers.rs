//! The report-file writers.
//!
//! Formats here are contracts: the token and error listings group entries
//! under `N.\t` line prefixes, the symbol table is numbered from 1, and
//! the generated-code listing preserves program-block index gaps as blank
//! lines. Each writer owns its file for the duration of the write and
//! flushes before release.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use minicc_gen::CodeGen;
use minicc_lex::LexArtifacts;
use minicc_par::ParseOutcome;
use minicc_util::LineFramedWriter;

pub const TOKENS_FILE: &str = "tokens.txt";
pub const LEXICAL_ERRORS_FILE: &str = "lexical_errors.txt";
pub const SYMBOL_TABLE_FILE: &str = "symbol_table.txt";
pub const PARSE_TREE_FILE: &str = "parse_tree.txt";
pub const SYNTAX_ERRORS_FILE: &str = "syntax_errors.txt";
pub const SEMANTIC_ERRORS_FILE: &str = "semantic_errors.txt";
pub const OUTPUT_FILE: &str = "output.txt";

/// Writes all seven report files into `dir`.
pub fn write_all(
    dir: &Path,
    lex: &LexArtifacts,
    outcome: &ParseOutcome,
    codegen: &CodeGen,
) -> io::Result<()> {
    write_tokens(&dir.join(TOKENS_FILE), lex)?;
    write_lexical_errors(&dir.join(LEXICAL_ERRORS_FILE), lex)?;
    write_symbol_table(&dir.join(SYMBOL_TABLE_FILE), lex)?;
    write_parse_tree(&dir.join(PARSE_TREE_FILE), outcome)?;
    write_syntax_errors(&dir.join(SYNTAX_ERRORS_FILE), outcome)?;
    write_semantic_errors(&dir.join(SEMANTIC_ERRORS_FILE), codegen)?;
    write_output(&dir.join(OUTPUT_FILE), codegen)?;
    Ok(())
}

fn write_tokens(path: &Path, lex: &LexArtifacts) -> io::Result<()> {
    let mut writer = LineFramedWriter::new(BufWriter::new(File::create(path)?));
    for token in &lex.tokens {
        writer.entry(token.line, &format!("({}, {}) ", token.kind, token.text))?;
    }
    writer.finish("\n")?;
    Ok(())
}

fn write_lexical_errors(path: &Path, lex: &LexArtifacts) -> io::Result<()> {
    let mut writer = LineFramedWriter::new(BufWriter::new(File::create(path)?));
    for error in &lex.errors {
        writer.entry(error.line, &format!("{error} "))?;
    }
    let tail = if writer.is_empty() {
        "There is no lexical error."
    } else {
        "\n"
    };
    writer.finish(tail)?;
    Ok(())
}

fn write_symbol_table(path: &Path, lex: &LexArtifacts) -> io::Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    for (position, symbol) in lex.symbols.iter().enumerate() {
        writeln!(out, "{}.\t{symbol}", position + 1)?;
    }
    out.flush()
}

fn write_parse_tree(path: &Path, outcome: &ParseOutcome) -> io::Result<()> {
    fs::write(path, outcome.tree.render(outcome.root))
}

fn write_syntax_errors(path: &Path, outcome: &ParseOutcome) -> io::Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    if outcome.errors.is_empty() {
        write!(out, "There is no syntax error.")?;
    } else {
        for error in &outcome.errors {
            writeln!(out, "{error}")?;
        }
    }
    out.flush()
}

fn write_semantic_errors(path: &Path, codegen: &CodeGen) -> io::Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    if codegen.errors().is_empty() {
        writeln!(out, "The input program is semantically correct.")?;
    } else {
        for error in codegen.errors() {
            writeln!(out, "{error}")?;
        }
    }
    out.flush()
}

/// The generated-code listing. Suppressed entirely when any semantic
/// error exists; otherwise one `index\tinstruction` line per filled slot,
/// with blank lines standing in for reserved-but-unfilled indices.
fn write_output(path: &Path, codegen: &CodeGen) -> io::Result<()> {
    if codegen.has_errors() {
        return fs::write(path, "The code has not been generated.\n");
    }

    let mut out = String::new();
    let mut last: i64 = -1;
    for (index, instr) in codegen.program().lines() {
        for _ in 0..(index as i64 - last - 1) {
            out.push('\n');
        }
        out.push_str(&format!("{index}\t{instr}\n"));
        last = index as i64;
    }
    fs::write(path, out)
}
