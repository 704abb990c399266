//! minicc-drv - Compiler Driver
//!
//! Entry point and orchestrator: parses the command line, reads the source
//! file, runs scanner → parser → code generator (the parser pulls tokens
//! lazily and pushes semantic actions into the generator), and writes the
//! seven report files.
//!
//! Exit is non-zero only for operational failures (unreadable input,
//! unwritable output directory). Lexical, syntax and semantic errors in
//! the source are results, not failures: they land in their report files
//! and the driver exits 0.

pub mod writers;

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser as ClapParser;
use tracing::{debug, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use minicc_gen::CodeGen;
use minicc_lex::Scanner;
use minicc_par::Parser;

/// MiniC front-end: scanner, predictive parser and three-address code
/// generator.
#[derive(Debug, ClapParser)]
#[command(name = "minicc")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Compile MiniC source to abstract-machine code", long_about = None)]
pub struct Args {
    /// MiniC source file
    #[arg(default_value = "input.txt")]
    pub input: PathBuf,

    /// Directory the report files are written into
    #[arg(short, long, default_value = ".")]
    pub outdir: PathBuf,

    /// Enable verbose output
    #[arg(short, long, env = "MINICC_VERBOSE")]
    pub verbose: bool,
}

/// CLI entry point: parse arguments, set up logging, compile.
pub fn run() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose)?;
    Session::new(args)?.run()
}

fn init_logging(verbose: bool) -> Result<()> {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    let subscriber = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    tracing_subscriber::registry()
        .with(filter)
        .with(subscriber)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to initialize logging: {e}"))?;

    Ok(())
}

/// One compiler invocation: the source text and the output directory.
pub struct Session {
    source: String,
    outdir: PathBuf,
}

impl Session {
    pub fn new(args: Args) -> Result<Self> {
        let source = fs::read_to_string(&args.input)
            .with_context(|| format!("reading {}", args.input.display()))?;
        Ok(Self {
            source,
            outdir: args.outdir,
        })
    }

    /// Builds a session directly from a source string; test harnesses use
    /// this to skip the filesystem on the input side.
    pub fn from_source(source: impl Into<String>, outdir: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            outdir: outdir.into(),
        }
    }

    /// Runs the pipeline and writes every report file.
    pub fn run(self) -> Result<()> {
        debug!("scanning and parsing {} bytes", self.source.len());

        let mut scanner = Scanner::new(&self.source);
        let mut codegen = CodeGen::new();
        let outcome = Parser::new(&mut scanner, &mut codegen).parse();
        let lex = scanner.into_artifacts();

        info!(
            tokens = lex.tokens.len(),
            lexical_errors = lex.errors.len(),
            syntax_errors = outcome.errors.len(),
            semantic_errors = codegen.errors().len(),
            "front-end finished"
        );

        fs::create_dir_all(&self.outdir)
            .with_context(|| format!("creating {}", self.outdir.display()))?;
        writers::write_all(&self.outdir, &lex, &outcome, &codegen)
            .with_context(|| format!("writing reports into {}", self.outdir.display()))?;
        Ok(())
    }
}
