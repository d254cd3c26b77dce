use std::cell::RefCell;
use std::cmp::Ordering;
use std::io::{self, Write};
use std::rc::Rc;

use log::{debug, info};

use crate::environment::Environment;
use crate::error::{LoxError, Result};
use crate::expr::Expr;
use crate::stmt::Stmt;
use crate::token::{Token, TokenType};
use crate::value::Value;

/// Tree‑walking evaluator.
///
/// Holds the current scope frame and the sink `print` writes to.  One
/// instance can run many programs in sequence (the REPL does this); global
/// bindings persist between runs.
pub struct Interpreter<W: Write = io::Stdout> {
    environment: Rc<RefCell<Environment>>,
    out: W,
}

impl Interpreter<io::Stdout> {
    /// Interpreter printing to standard output.
    pub fn new() -> Self {
        Self::with_output(io::stdout())
    }
}

impl Default for Interpreter<io::Stdout> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write> Interpreter<W> {
    pub fn with_output(out: W) -> Self {
        info!("Initializing Interpreter");

        Self {
            environment: Rc::new(RefCell::new(Environment::new())),
            out,
        }
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    pub fn output_mut(&mut self) -> &mut W {
        &mut self.out
    }

    pub fn into_output(self) -> W {
        self.out
    }

    /// Number of frames in the active scope chain, the global one included.
    pub fn scope_depth(&self) -> usize {
        let mut depth = 1;
        let mut frame = Rc::clone(&self.environment);

        loop {
            let parent = match frame.borrow().enclosing() {
                Some(parent) => Rc::clone(parent),
                None => break,
            };
            frame = parent;
            depth += 1;
        }

        depth
    }

    /// Interprets a list of statements (a "program").
    pub fn interpret(&mut self, statements: &[Stmt<'_>]) -> Result<()> {
        debug!("Interpreting {} statements", statements.len());

        for stmt in statements {
            self.execute(stmt)?;
        }

        info!("Interpretation completed successfully");

        Ok(())
    }

    /// Executes a single statement.
    pub fn execute(&mut self, stmt: &Stmt<'_>) -> Result<()> {
        match stmt {
            Stmt::Expression(expr) => {
                debug!("Evaluating expression statement");
                self.evaluate(expr)?;
            }

            Stmt::Print(expr) => {
                let value = self.evaluate(expr)?;
                writeln!(self.out, "{}", value)?;
                debug!("Printed value: {}", value);
            }

            Stmt::Var { name, initializer } => {
                let value = match initializer {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };

                self.environment.borrow_mut().define(name.lexeme, value);
            }

            Stmt::Block(statements) => {
                let frame = Environment::with_enclosing(Rc::clone(&self.environment));
                self.execute_block(statements, frame)?;
            }

            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                if self.evaluate(condition)?.is_truthy() {
                    debug!("Condition is truthy; executing then branch");
                    self.execute(then_branch)?;
                } else if let Some(else_stmt) = else_branch {
                    debug!("Condition is falsy; executing else branch");
                    self.execute(else_stmt)?;
                }
            }

            Stmt::While { condition, body } => {
                debug!("Entering while loop");

                while self.evaluate(condition)?.is_truthy() {
                    self.execute(body)?;
                }

                debug!("Exited while loop");
            }
        }

        Ok(())
    }

    /// Run `statements` inside `frame`.  The previous environment is put
    /// back whether the block finishes or fails.
    fn execute_block(&mut self, statements: &[Stmt<'_>], frame: Environment) -> Result<()> {
        debug!("Entering block with {} statements", statements.len());

        let previous = std::mem::replace(&mut self.environment, Rc::new(RefCell::new(frame)));

        let result = statements.iter().try_for_each(|stmt| self.execute(stmt));

        self.environment = previous;

        debug!("Exited block (ok: {})", result.is_ok());

        result
    }

    /// Evaluates an expression and returns a Value.
    pub fn evaluate(&mut self, expr: &Expr<'_>) -> Result<Value> {
        let value = match expr {
            Expr::Literal(literal) => Value::from(literal),

            Expr::Variable(name) => self.environment.borrow().get(name.lexeme, name.line)?,

            Expr::Unary { operator, right } => self.evaluate_unary(operator, right)?,

            Expr::Binary {
                left,
                operator,
                right,
            } => self.evaluate_binary(left, operator, right)?,

            Expr::Assign { name, value, .. } => {
                let value = self.evaluate(value)?;
                self.environment
                    .borrow_mut()
                    .assign(name.lexeme, value.clone(), name.line)?;
                value
            }
        };

        debug!("Expression evaluated to: {}", value);

        Ok(value)
    }

    fn evaluate_unary(&mut self, op: &Token<'_>, right: &Expr<'_>) -> Result<Value> {
        let right_val = self.evaluate(right)?;

        match op.token_type {
            TokenType::MINUS => Ok(Value::Number(-right_val.to_number())),
            TokenType::BANG => Ok(Value::Bool(!right_val.is_truthy())),
            _ => Err(LoxError::runtime(
                op.line,
                format!("Invalid unary operator '{}'.", op.lexeme),
            )),
        }
    }

    /// Both operands are always evaluated, `and` / `or` included.
    fn evaluate_binary(&mut self, left: &Expr<'_>, op: &Token<'_>, right: &Expr<'_>) -> Result<Value> {
        let left_val = self.evaluate(left)?;
        let right_val = self.evaluate(right)?;

        debug!(
            "Binary '{}' on {} and {}",
            op.lexeme, left_val, right_val
        );

        let value = match op.token_type {
            TokenType::PLUS => match (&left_val, &right_val) {
                (Value::String(a), Value::String(b)) => Value::String(format!("{}{}", a, b)),
                _ => Value::Number(left_val.to_number() + right_val.to_number()),
            },
            TokenType::MINUS => Value::Number(left_val.to_number() - right_val.to_number()),
            TokenType::STAR => Value::Number(left_val.to_number() * right_val.to_number()),
            // IEEE semantics: x / 0 is ±inf or NaN, never an error.
            TokenType::SLASH => Value::Number(left_val.to_number() / right_val.to_number()),

            TokenType::GREATER => Value::Bool(matches!(
                left_val.compare(&right_val),
                Some(Ordering::Greater)
            )),
            TokenType::GREATER_EQUAL => Value::Bool(matches!(
                left_val.compare(&right_val),
                Some(Ordering::Greater | Ordering::Equal)
            )),
            TokenType::LESS => Value::Bool(matches!(
                left_val.compare(&right_val),
                Some(Ordering::Less)
            )),
            TokenType::LESS_EQUAL => Value::Bool(matches!(
                left_val.compare(&right_val),
                Some(Ordering::Less | Ordering::Equal)
            )),

            TokenType::EQUAL_EQUAL => Value::Bool(left_val.is_equal(&right_val)),
            TokenType::BANG_EQUAL => Value::Bool(!left_val.is_equal(&right_val)),

            TokenType::AND => {
                if left_val.is_truthy() {
                    right_val
                } else {
                    left_val
                }
            }
            TokenType::OR => {
                if left_val.is_truthy() {
                    left_val
                } else {
                    right_val
                }
            }

            _ => {
                return Err(LoxError::runtime(
                    op.line,
                    format!("Invalid binary operator '{}'.", op.lexeme),
                ));
            }
        };

        Ok(value)
    }
}
