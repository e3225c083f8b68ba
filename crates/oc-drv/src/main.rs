//! The `oc` command-line compiler.
//!
//! Parses arguments, initializes logging, runs a [`Session`], and maps
//! the outcome onto process exit codes: 0 on success (including the
//! interactive prompt's fall-through), 1 on any failure.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use oc_drv::{Emit, Options, Session, DEFAULT_INPUT, DEFAULT_OUTPUT_DIR};

/// Compiler for the O language targeting the JVM via Jasmin.
#[derive(Parser, Debug)]
#[command(name = "oc")]
#[command(author = "O Language Team")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Compiler for the O language targeting the JVM via Jasmin", long_about = None)]
struct Cli {
    /// Source file to compile
    input: Option<PathBuf>,

    /// Directory for the generated .j files
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Prompt for the input source instead of reading the file directly
    #[arg(long)]
    interactive: bool,

    /// Suppress the token/AST/class-table dumps
    #[arg(short, long)]
    quiet: bool,

    /// Stop after lexing and print the token stream
    #[arg(long, conflicts_with = "emit_ast")]
    emit_tokens: bool,

    /// Stop after parsing and print the AST
    #[arg(long)]
    emit_ast: bool,

    /// Enable verbose (debug) logging
    #[arg(short, long, env = "OC_VERBOSE")]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let emit = if cli.emit_tokens {
        Emit::Tokens
    } else if cli.emit_ast {
        Emit::Ast
    } else {
        Emit::Classes
    };

    let options = Options {
        input: cli.input.unwrap_or_else(|| PathBuf::from(DEFAULT_INPUT)),
        output_dir: cli
            .output_dir
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR)),
        interactive: cli.interactive,
        quiet: cli.quiet,
        emit,
    };

    match run(options) {
        Ok(code) => ExitCode::from(code as u8),
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::from(1)
        },
    }
}

fn run(options: Options) -> anyhow::Result<i32> {
    let input = options.input.clone();
    let code = Session::new(options)
        .run()
        .with_context(|| format!("failed to compile {}", input.display()))?;
    Ok(code)
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    let layer = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    // A second init in the same process (tests) is harmless.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(layer)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["oc"]);
        assert!(cli.input.is_none());
        assert!(!cli.interactive);
        assert!(!cli.quiet);
        assert!(!cli.verbose);
    }

    #[test]
    fn test_cli_input_path() {
        let cli = Cli::parse_from(["oc", "demo.o"]);
        assert_eq!(cli.input, Some(PathBuf::from("demo.o")));
    }

    #[test]
    fn test_cli_output_dir() {
        let cli = Cli::parse_from(["oc", "-o", "classes"]);
        assert_eq!(cli.output_dir, Some(PathBuf::from("classes")));
    }

    #[test]
    fn test_cli_flags() {
        let cli = Cli::parse_from(["oc", "--interactive", "--quiet", "--verbose"]);
        assert!(cli.interactive);
        assert!(cli.quiet);
        assert!(cli.verbose);
    }

    #[test]
    fn test_cli_emit_tokens() {
        let cli = Cli::parse_from(["oc", "--emit-tokens"]);
        assert!(cli.emit_tokens);
        assert!(!cli.emit_ast);
    }
}
