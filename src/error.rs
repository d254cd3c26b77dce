//! Centralised error hierarchy for the **Tox interpreter**.
//!
//! All subsystems (scanner, parser, runtime, CLI) convert their internal
//! failure modes into one of the variants defined here.  This enables a
//! uniform `Result<T>` alias throughout the crate and ergonomic inter‑operation
//! with `anyhow` in the binary, while still preserving the source line.
//!
//! The module **does not** print diagnostics itself.

use std::io;
use thiserror::Error;

use log::info;

/// Canonical error type used throughout the interpreter.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LoxError {
    /// Lexical (scanner) error with source line information.
    #[error("[line {line}] Error: {message}")]
    Lex {
        /// Human‑readable description.
        message: String,

        /// 1‑based line where the error occurred.
        line: usize,
    },

    /// Every lexical error found while scanning one source, in scan order.
    #[error("{}", join_lines(.0))]
    Scan(Vec<LoxError>),

    /// Syntactic (parser) error.
    #[error("[line {line}] Error: {message}")]
    Parse { message: String, line: usize },

    /// Runtime evaluation error.
    #[error("[line {line}] Error: {message}")]
    Runtime { message: String, line: usize },

    /// Wrapper around `std::io::Error` (transparent).  Enables `?` on I/O ops.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// UTF‑8 decoding failure when ingesting external text.
    #[error(transparent)]
    Utf8(#[from] std::string::FromUtf8Error),
}

fn join_lines(errors: &[LoxError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

impl LoxError {
    /// Helper constructor for the **scanner**.
    pub fn lex<S: Into<String>>(line: usize, msg: S) -> Self {
        let message: String = msg.into();

        info!("Creating Lex error: line={}, msg={}", line, message);

        LoxError::Lex { message, line }
    }

    /// Helper constructor for the **parser**.
    pub fn parse<S: Into<String>>(line: usize, msg: S) -> Self {
        let message: String = msg.into();

        info!("Creating Parse error: line={}, msg={}", line, message);

        LoxError::Parse { message, line }
    }

    /// Helper constructor for the **interpreter**.
    pub fn runtime<S: Into<String>>(line: usize, msg: S) -> Self {
        let message: String = msg.into();

        info!("Creating Runtime error: line={}, msg={}", line, message);

        LoxError::Runtime { message, line }
    }

    /// Read or assignment of a name that no scope up the chain declares.
    pub fn undefined_variable(name: &str, line: usize) -> Self {
        Self::runtime(line, format!("Undefined variable '{}'.", name))
    }

    /// The source line this error is reported against, if it has one.
    pub fn line(&self) -> Option<usize> {
        match self {
            LoxError::Lex { line, .. }
            | LoxError::Parse { line, .. }
            | LoxError::Runtime { line, .. } => Some(*line),
            LoxError::Scan(errors) => errors.first().and_then(LoxError::line),
            LoxError::Io(_) | LoxError::Utf8(_) => None,
        }
    }

    /// `true` for failures detected before anything executed
    /// (the CLI maps these to exit code 65).
    pub fn is_static(&self) -> bool {
        matches!(
            self,
            LoxError::Lex { .. } | LoxError::Scan(_) | LoxError::Parse { .. }
        )
    }
}

/// Crate‑wide `Result` alias.
pub type Result<T> = std::result::Result<T, LoxError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_batch_reports_every_error_and_first_line() {
        let err = LoxError::Scan(vec![
            LoxError::lex(2, "Unexpected character: $"),
            LoxError::lex(4, "Unexpected character: #"),
        ]);

        assert_eq!(err.line(), Some(2));
        assert_eq!(
            err.to_string(),
            "[line 2] Error: Unexpected character: $\n[line 4] Error: Unexpected character: #"
        );
        assert!(err.is_static());
    }

    #[test]
    fn undefined_variable_names_the_variable() {
        let err = LoxError::undefined_variable("answer", 7);

        assert_eq!(err.to_string(), "[line 7] Error: Undefined variable 'answer'.");
        assert!(!err.is_static());
    }
}
