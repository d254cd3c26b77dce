pub mod ast_printer;
pub mod binding;
pub mod environment;
pub mod error;
pub mod expr;
pub mod interpreter;
pub mod parser;
pub mod repl;
pub mod runner;
pub mod scanner;
pub mod stmt;
pub mod token;
pub mod value;
