use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser as ClapParser;
use clap::Subcommand;
use env_logger::Builder;
use log::{debug, info};

use tox::error::LoxError;
use tox::interpreter::Interpreter;
use tox::repl;
use tox::runner::{evaluate_source, print_expression, run_source};
use tox::scanner::Scanner;
use tox::token::Token;

/// Exit status for lexical and syntax errors.
const EXIT_STATIC_ERROR: i32 = 65;

/// Exit status for runtime errors.
const EXIT_RUNTIME_ERROR: i32 = 70;

#[derive(ClapParser, Debug)]
#[command(version, about = "Tox language interpreter", long_about = None)]
pub struct Cli {
    /// Starts the interactive prompt when omitted
    #[command(subcommand)]
    commands: Option<Commands>,

    /// Enable logging to a file
    #[arg(long, global = true)]
    log: bool,

    /// Log file used with --log
    #[arg(long, global = true, default_value = "app.log")]
    log_file: PathBuf,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Tokenizes input from a file, printing each token
    Tokenize {
        filename: PathBuf,

        /// Print the token list as JSON
        #[arg(long)]
        json: bool,
    },

    /// Parses input from a file as a single expression and prints its canonical form
    Parse { filename: PathBuf },

    /// Evaluates input from a file as a single expression and prints the result
    Evaluate { filename: PathBuf },

    /// Runs input from a file as a Tox program
    Run { filename: PathBuf },

    /// Starts the interactive prompt
    Repl,
}

/// Reads the contents of a file into a String
fn read_file(filename: &PathBuf) -> Result<String> {
    info!("Reading file: {:?}", filename);
    let file = File::open(filename).context(format!("Failed to open file {:?}", filename))?;
    let mut reader = BufReader::new(file);
    let mut buf = Vec::new();

    let bytes = reader
        .read_to_end(&mut buf)
        .context(format!("Failed to read file {:?}", filename))?;

    info!("Read {} bytes from {:?}", bytes, filename);

    let source = String::from_utf8(buf)
        .map_err(LoxError::from)
        .context(format!("File {:?} is not valid UTF-8", filename))?;

    Ok(source)
}

fn init_logger(path: &PathBuf) -> Result<()> {
    let log_file = File::create(path).context(format!("Failed to create {:?}", path))?;

    // `[module:line] - message`, crate prefix stripped; RUST_LOG overrides the level
    Builder::new()
        .format(|buf, record| {
            let module = record
                .module_path()
                .unwrap_or("<unnamed>")
                .strip_prefix("tox::")
                .unwrap_or(record.module_path().unwrap_or("<unnamed>"));
            writeln!(
                buf,
                "[{}:{}] - {}",
                module,
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .filter(None, log::LevelFilter::Debug)
        .parse_env("RUST_LOG")
        .init();

    info!("Logger initialized, writing to {:?}", path);
    Ok(())
}

/// Print `error` and exit with the status matching its kind.
fn fail(error: LoxError) -> ! {
    debug!("Exiting on error: {:?}", error);
    eprintln!("{}", error);

    let code = if error.is_static() {
        EXIT_STATIC_ERROR
    } else {
        EXIT_RUNTIME_ERROR
    };

    std::process::exit(code);
}

fn tokenize(filename: &PathBuf, json: bool) -> Result<()> {
    let source = read_file(filename)?;
    let mut tokens: Vec<Token<'_>> = Vec::new();
    let mut tokenized = true;

    for token in Scanner::new(&source) {
        match token {
            Ok(token) => {
                if !json {
                    println!("{}", token);
                }
                tokens.push(token);
            }

            Err(e) => {
                tokenized = false;
                eprintln!("{}", e);
            }
        }
    }

    if json {
        let rendered = serde_json::to_string_pretty(&tokens).context("Failed to encode tokens")?;
        println!("{}", rendered);
    }

    if !tokenized {
        debug!("Tokenization failed, exiting with code {}", EXIT_STATIC_ERROR);
        std::process::exit(EXIT_STATIC_ERROR);
    }

    info!("Tokenization completed successfully");
    Ok(())
}

fn main() -> Result<()> {
    let args: Cli = Cli::parse();

    if args.log {
        init_logger(&args.log_file)?;
    } else {
        env_logger::Builder::new()
            .filter_level(log::LevelFilter::Off)
            .init();
    }

    info!("CLI arguments: {:?}", args);

    match args.commands {
        Some(Commands::Tokenize { filename, json }) => tokenize(&filename, json)?,

        Some(Commands::Parse { filename }) => {
            let source = read_file(&filename)?;

            match print_expression(&source) {
                Ok(printed) => println!("{}", printed),
                Err(e) => fail(e),
            }
        }

        Some(Commands::Evaluate { filename }) => {
            let source = read_file(&filename)?;
            let mut interpreter = Interpreter::new();

            match evaluate_source(&source, &mut interpreter) {
                Ok(value) => println!("{}", value),
                Err(e) => fail(e),
            }
        }

        Some(Commands::Run { filename }) => {
            let source = read_file(&filename)?;
            let mut interpreter = Interpreter::new();

            if let Err(e) = run_source(&source, &mut interpreter) {
                fail(e);
            }

            info!("Program executed successfully");
        }

        Some(Commands::Repl) | None => {
            repl::start().context("REPL I/O failed")?;
        }
    }

    Ok(())
}
