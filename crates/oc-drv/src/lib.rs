//! oc-drv - Compiler driver for the O language.
//!
//! The driver owns everything outside the core pipeline: choosing and
//! reading the input source, orchestrating the phases in order (lex →
//! parse → analyze → generate), printing the diagnostic dumps, and
//! writing one `.j` file per class. Class files are buffered in memory
//! and flushed only after every class generated, so a failure never
//! leaves partial output behind.

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use oc_gen::{ClassFile, CodeGenerator};
use oc_lex::TokenKind;
use oc_util::{CompileError, Result};
use tracing::debug;

/// Source file compiled when no path is given on the command line.
pub const DEFAULT_INPUT: &str = "program.o";

/// Directory the `.j` files are written into.
pub const DEFAULT_OUTPUT_DIR: &str = "out";

/// How far the pipeline runs before stopping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Emit {
    /// Stop after lexing and print the token stream.
    Tokens,
    /// Stop after parsing and print the AST.
    Ast,
    /// Run the full pipeline and produce class files.
    #[default]
    Classes,
}

/// Driver configuration.
#[derive(Debug, Clone)]
pub struct Options {
    pub input: PathBuf,
    pub output_dir: PathBuf,
    /// Prompt for the input source instead of reading the file directly.
    pub interactive: bool,
    /// Suppress the token/AST/class-table dumps.
    pub quiet: bool,
    pub emit: Emit,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            input: PathBuf::from(DEFAULT_INPUT),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            interactive: false,
            quiet: true,
            emit: Emit::Classes,
        }
    }
}

/// A compilation session: one driver invocation.
pub struct Session {
    options: Options,
}

impl Session {
    pub fn new(options: Options) -> Self {
        Self { options }
    }

    /// Runs the session and returns the process exit code.
    ///
    /// The interactive prompt's fall-through path (an unrecognized
    /// choice) exits 0 with a hint; every compilation failure is an
    /// error the caller maps to exit code 1.
    pub fn run(&self) -> Result<i32> {
        let Some(source) = self.read_source()? else {
            return Ok(0);
        };

        let class_files = compile(&source, &self.options)?;
        if self.options.emit != Emit::Classes {
            return Ok(0);
        }

        write_class_files(&self.options.output_dir, &class_files)?;
        Ok(0)
    }

    /// Reads the input source, or `None` when the interactive prompt
    /// falls through.
    fn read_source(&self) -> Result<Option<String>> {
        if !self.options.interactive {
            return Ok(Some(read_source_file(&self.options.input)?));
        }

        println!("Choose input source: [1] File, [2] Console");
        io::stdout().flush()?;

        let mut choice = String::new();
        io::stdin().lock().read_line(&mut choice)?;

        match choice.trim() {
            "1" => Ok(Some(read_source_file(&self.options.input)?)),
            "2" => Ok(Some(read_console_source()?)),
            _ => {
                println!("Unrecognized choice; enter 1 or 2 next time.");
                Ok(None)
            },
        }
    }
}

/// Reads and BOM-strips a source file.
pub fn read_source_file(path: &Path) -> Result<String> {
    let text = std::fs::read_to_string(path)?;
    Ok(strip_bom(&text).to_string())
}

/// Reads stdin lines until an empty line, joined with newlines.
pub fn read_console_source() -> Result<String> {
    let stdin = io::stdin();
    let mut lines = Vec::new();
    for line in stdin.lock().lines() {
        let line = line?;
        if line.is_empty() {
            break;
        }
        lines.push(line);
    }
    Ok(lines.join("\n"))
}

/// Strips a leading byte-order mark, if present.
pub fn strip_bom(source: &str) -> &str {
    source.strip_prefix('\u{feff}').unwrap_or(source)
}

/// Runs the pipeline over source text, printing dumps along the way.
///
/// This is the library entry point the driver binary and the tests
/// share; it performs no file IO.
pub fn compile(source: &str, options: &Options) -> Result<Vec<ClassFile>> {
    debug!("lexing {} bytes", source.len());
    let tokens = oc_lex::tokenize(source);
    debug!("lexed {} tokens", tokens.len());

    if !options.quiet {
        println!("== tokens ==");
        for token in &tokens {
            println!("{:>4}  {:<10}  {}", token.line, token.kind.to_string(), token.text);
        }
    }

    // Error tokens are fatal here: the parser would only trip over them
    // with a less precise message.
    if let Some(bad) = tokens.iter().find(|t| t.kind == TokenKind::Error) {
        return Err(CompileError::Lex {
            line: bad.line,
            message: bad
                .error
                .clone()
                .unwrap_or_else(|| format!("invalid token '{}'", bad.text)),
        });
    }

    if options.emit == Emit::Tokens {
        return Ok(Vec::new());
    }

    debug!("parsing");
    let program = oc_par::parse(tokens)?;
    debug!("parsed {} classes", program.classes.len());

    if !options.quiet {
        println!("== ast ==");
        println!("{:#?}", program);
    }

    if options.emit == Emit::Ast {
        return Ok(Vec::new());
    }

    debug!("analyzing");
    let analysis = oc_sem::analyze(program)?;

    if !options.quiet {
        println!("== class table ==");
        println!("{:#?}", analysis.table);
        println!("== optimized ast ==");
        println!("{:#?}", analysis.program);
    }

    debug!("generating code for {} classes", analysis.table.len());
    let mut generator = CodeGenerator::new(&analysis.table);
    let class_files = generator.generate(&analysis.program)?;
    debug!("generated {} class files", class_files.len());

    Ok(class_files)
}

/// Writes every buffered class file into the output directory,
/// creating the directory if needed.
pub fn write_class_files(output_dir: &Path, class_files: &[ClassFile]) -> Result<()> {
    std::fs::create_dir_all(output_dir)?;
    for class_file in class_files {
        let path = output_dir.join(format!("{}.j", class_file.name));
        std::fs::write(&path, &class_file.text)?;
    }
    Ok(())
}
