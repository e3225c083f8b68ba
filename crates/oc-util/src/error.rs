//! Error types shared across all compiler phases.
//!
//! Every phase reports failure through [`CompileError`]; the first error
//! aborts the compilation and is surfaced by the driver.

use thiserror::Error;

/// Error type covering every failure the compiler can report.
#[derive(Debug, Error)]
pub enum CompileError {
    /// An invalid character sequence in the source text.
    #[error("lexical error at line {line}: {message}")]
    Lex { line: u32, message: String },

    /// An unexpected token or malformed construct.
    #[error("syntax error at line {line}: {message}")]
    Syntax { line: u32, message: String },

    /// A violation found during semantic analysis.
    #[error("semantic error: {0}")]
    Semantic(String),

    /// A condition the code generator cannot lower.
    #[error("code generation error: {0}")]
    Codegen(String),

    /// A failure reading the input or writing class files.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CompileError {
    /// Create a semantic error from any displayable message.
    pub fn semantic(message: impl Into<String>) -> Self {
        CompileError::Semantic(message.into())
    }

    /// Create a code-generation error from any displayable message.
    pub fn codegen(message: impl Into<String>) -> Self {
        CompileError::Codegen(message.into())
    }

    /// Create a syntax error at the given line.
    pub fn syntax(line: u32, message: impl Into<String>) -> Self {
        CompileError::Syntax {
            line,
            message: message.into(),
        }
    }
}

/// Result type alias used throughout the compiler.
pub type Result<T> = std::result::Result<T, CompileError>;
