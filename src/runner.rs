//! Glue between a source string and the interpreter: lex, parse, execute.

use std::io::Write;

use log::info;

use crate::error::Result;
use crate::interpreter::Interpreter;
use crate::parser::Parser;
use crate::scanner::tokenize;
use crate::value::Value;

/// Run a whole program.  Nothing executes unless the entire source lexes
/// and parses.
pub fn run_source<W: Write>(source: &str, interpreter: &mut Interpreter<W>) -> Result<()> {
    let tokens = tokenize(source)?;
    let statements = Parser::new(&tokens).parse()?;

    info!("Running {} statement(s)", statements.len());

    interpreter.interpret(&statements)
}

/// Parse `source` as exactly one expression and evaluate it.
pub fn evaluate_source<W: Write>(source: &str, interpreter: &mut Interpreter<W>) -> Result<Value> {
    let tokens = tokenize(source)?;
    let expr = Parser::new(&tokens).parse_expression()?;

    interpreter.evaluate(&expr)
}

/// Parse `source` as exactly one expression and return its canonical form.
pub fn print_expression(source: &str) -> Result<String> {
    let tokens = tokenize(source)?;
    let expr = Parser::new(&tokens).parse_expression()?;

    Ok(expr.to_string())
}

/// What one line of interactive input turned out to be.
#[derive(Debug, Clone, PartialEq)]
pub enum LineOutcome {
    /// A bare expression; its value is echoed.
    Value(Value),
    /// One or more statements, already executed.
    Executed,
}

/// Interpret one REPL line: a bare expression if it parses as one,
/// otherwise a program.
pub fn run_line<W: Write>(line: &str, interpreter: &mut Interpreter<W>) -> Result<LineOutcome> {
    let tokens = tokenize(line)?;

    if let Ok(expr) = Parser::new(&tokens).parse_expression() {
        return Ok(LineOutcome::Value(interpreter.evaluate(&expr)?));
    }

    let statements = Parser::new(&tokens).parse()?;
    interpreter.interpret(&statements)?;

    Ok(LineOutcome::Executed)
}
