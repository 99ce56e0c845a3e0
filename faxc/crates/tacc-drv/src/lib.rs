//! Command-line driver: source in, three-address code out.
//!
//! Mirrors the reference driver's contract (read all of stdin, write the TAC
//! listing to stdout) while adding the file-argument and `-o` conveniences a
//! real CLI carries. Translation itself lives entirely in `tacc-par`/`tacc-ir`;
//! this crate only wires input/output and logging around `Parser::compile`.

use std::fs;
use std::io::{Read, Write};
use std::path::PathBuf;

use clap::Parser as ClapParser;
use tracing::{debug, info};

use tacc_par::Parser;
use tacc_util::Result;

/// Translate a dragon-book source file into three-address code.
#[derive(ClapParser, Debug)]
#[command(name = "tacc", author, version = env!("CARGO_PKG_VERSION"), about, long_about = None)]
pub struct Cli {
    /// Source file to compile. Reads standard input when omitted.
    pub input: Option<PathBuf>,

    /// Where to write the generated TAC listing. Writes standard output when omitted.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Enable verbose (debug-level) logging of the lex/parse/generate pipeline.
    #[arg(short, long, global = true, env = "TACC_VERBOSE")]
    pub verbose: bool,
}

/// Installs a `tracing` subscriber whose level follows `--verbose`/`RUST_LOG`.
pub fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();
}

/// Parses and translates `source`, returning the rendered TAC listing.
pub fn compile_source(source: &str) -> Result<String> {
    debug!(bytes = source.len(), "lexing and parsing source");
    let mut parser = Parser::new(source.as_bytes())?;
    let tac = parser.compile()?;
    debug!(bytes = tac.len(), "generated three-address code");
    Ok(tac)
}

/// Runs the driver end to end: read the input named by `cli`, translate it,
/// and write the result to the output named by `cli`.
pub fn run(cli: &Cli) -> Result<()> {
    let source = match &cli.input {
        Some(path) => {
            info!(path = %path.display(), "reading source from file");
            fs::read_to_string(path)?
        }
        None => {
            info!("reading source from stdin");
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };

    let tac = compile_source(&source)?;

    match &cli.output {
        Some(path) => {
            info!(path = %path.display(), "writing three-address code to file");
            fs::write(path, &tac)?;
        }
        None => {
            let mut stdout = std::io::stdout();
            stdout.write_all(tac.as_bytes())?;
            stdout.flush()?;
        }
    }

    Ok(())
}
