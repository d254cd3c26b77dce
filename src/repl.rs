//! Interactive read‑eval‑print loop.
//!
//! A single interpreter lives for the whole session, so bindings made on one
//! line are visible on the next.  Errors are reported and the loop carries on.

use std::io::{self, BufRead, Write};

use log::{debug, info};

use crate::interpreter::Interpreter;
use crate::runner::{run_line, LineOutcome};

pub const PROMPT: &str = "tox> ";

/// Run the loop on the process's stdin / stdout / stderr.
pub fn start() -> io::Result<()> {
    let stdin = io::stdin();
    run(stdin.lock(), io::stdout(), io::stderr())
}

/// Run the loop over arbitrary streams until `input` is exhausted.
pub fn run<R: BufRead, W: Write, E: Write>(mut input: R, out: W, mut err: E) -> io::Result<()> {
    info!("REPL session started");

    let mut interpreter = Interpreter::with_output(out);
    let mut line = String::new();

    loop {
        write!(interpreter.output_mut(), "{}", PROMPT)?;
        interpreter.output_mut().flush()?;

        line.clear();
        if input.read_line(&mut line)? == 0 {
            writeln!(interpreter.output_mut())?;
            break;
        }

        let source = line.trim_end();
        if source.is_empty() {
            continue;
        }

        match run_line(source, &mut interpreter) {
            Ok(LineOutcome::Value(value)) => writeln!(interpreter.output_mut(), "{}", value)?,
            Ok(LineOutcome::Executed) => {}
            Err(e) => {
                debug!("REPL line failed: {}", e);
                writeln!(err, "{}", e)?;
            }
        }
    }

    info!("REPL session ended");

    Ok(())
}
