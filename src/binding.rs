//! The **binding‑power expression engine**.
//!
//! Expressions are parsed without recursion.  Three stacks cooperate:
//!
//! | stack           | contents                                                     |
//! |-----------------|--------------------------------------------------------------|
//! | `completed`     | fully resolved expressions, most recent on top               |
//! | `pending`       | operators still waiting for their right‑hand operand          |
//! | `pending_power` | effective power of each pending operator (same length)       |
//!
//! A fourth stack, `power_history`, records every power set so far (seeded
//! with two `1` sentinels) and is only used to compare the power of the
//! operator being read against the one read before it:
//!
//! * **greater** ‑ the new operator captures the top of `completed` as its
//!   left operand;
//! * **equal or lower** ‑ every pending operator whose power is `>=` the new
//!   one is first completed with the top of `completed` (left‑to‑right for
//!   equal precedence), and the result becomes the left operand.
//!
//! Parentheses do not produce nodes.  They change `depth`, and every
//! operator's effective power is `base + DEPTH_STEP * depth`, so anything
//! inside a deeper group outranks everything outside it.
//!
//! Once the token stream can no longer continue the expression, a final
//! drain completes all pending operators regardless of power.
//!
//! # Base powers
//!
//! | operators              | base |
//! |------------------------|-----:|
//! | `!` `-` (prefix)       | 7    |
//! | `*` `/`                | 6    |
//! | `+` `-`                | 5    |
//! | `<` `<=` `>` `>=`      | 4    |
//! | `==` `!=`              | 3    |
//! | `and` `or`             | 2    |
//! | `=`                    | 1    |
//!
//! Assignment is only accepted while nothing is pending at its own depth
//! (so `a = b = 1` and `a + b = 1` are rejected, `a + (b = 1)` is not).  It
//! therefore sits below everything else of its depth, and the lowest power
//! lets it take the whole right‑hand side (`x = x + 1` assigns `x + 1`).

use crate::error::{LoxError, Result};
use crate::expr::Expr;
use crate::token::{LiteralValue, Token, TokenType};

use log::debug;

pub const ASSIGNMENT_POWER: u32 = 1;
pub const LOGICAL_POWER: u32 = 2;
pub const EQUALITY_POWER: u32 = 3;
pub const RELATIONAL_POWER: u32 = 4;
pub const ADDITIVE_POWER: u32 = 5;
pub const MULTIPLICATIVE_POWER: u32 = 6;
pub const UNARY_POWER: u32 = 7;

/// Power added per level of parenthesis nesting.  Must exceed the spread of
/// the base table so the weakest operator one level down still beats the
/// strongest one outside.
pub const DEPTH_STEP: u32 = UNARY_POWER + 1;

const SENTINEL_POWER: u32 = 1;

/// Base power of an infix operator, `None` for everything else.
pub const fn infix_power(tt: TokenType) -> Option<u32> {
    match tt {
        TokenType::STAR | TokenType::SLASH => Some(MULTIPLICATIVE_POWER),
        TokenType::PLUS | TokenType::MINUS => Some(ADDITIVE_POWER),
        TokenType::LESS
        | TokenType::LESS_EQUAL
        | TokenType::GREATER
        | TokenType::GREATER_EQUAL => Some(RELATIONAL_POWER),
        TokenType::EQUAL_EQUAL | TokenType::BANG_EQUAL => Some(EQUALITY_POWER),
        TokenType::AND | TokenType::OR => Some(LOGICAL_POWER),
        _ => None,
    }
}

/// An operator node whose right‑hand operand has not been read yet.
#[derive(Debug, Clone, PartialEq)]
enum PendingOp<'a> {
    Unary {
        operator: &'a Token<'a>,
    },
    Binary {
        left: Box<Expr<'a>>,
        operator: &'a Token<'a>,
    },
    Assign {
        name: &'a Token<'a>,
        operator: &'a Token<'a>,
    },
}

impl<'a> PendingOp<'a> {
    fn complete(self, right: Expr<'a>) -> Expr<'a> {
        let right = Box::new(right);

        match self {
            PendingOp::Unary { operator } => Expr::Unary { operator, right },
            PendingOp::Binary { left, operator } => Expr::Binary {
                left,
                operator,
                right,
            },
            PendingOp::Assign { name, operator } => Expr::Assign {
                name,
                operator,
                value: right,
            },
        }
    }
}

/// Working state for parsing one expression.
///
/// Feed tokens with [`accept`](Self::accept) until it returns `false`, then
/// call [`finish`](Self::finish) with the token that stopped it.
#[derive(Debug)]
pub struct BindingState<'a> {
    completed: Vec<Expr<'a>>,
    pending: Vec<PendingOp<'a>>,
    pending_power: Vec<u32>,
    power_history: Vec<u32>,
    depth: u32,
}

impl<'a> Default for BindingState<'a> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> BindingState<'a> {
    pub fn new() -> Self {
        Self {
            completed: Vec::new(),
            pending: Vec::new(),
            pending_power: Vec::new(),
            power_history: vec![SENTINEL_POWER, SENTINEL_POWER],
            depth: 0,
        }
    }

    /// Current parenthesis nesting.
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Number of operators waiting for a right operand.
    pub fn pending_len(&self) -> usize {
        debug_assert_eq!(self.pending.len(), self.pending_power.len());
        self.pending.len()
    }

    /// Number of resolved expressions on the stack.
    pub fn completed_len(&self) -> usize {
        self.completed.len()
    }

    /// `pending` and `pending_power` always move together.
    pub fn stacks_aligned(&self) -> bool {
        self.pending.len() == self.pending_power.len()
    }

    /// Try to extend the expression with `token`.
    ///
    /// `Ok(true)` means the token was consumed; `Ok(false)` means the token
    /// cannot continue this expression and was left alone.
    pub fn accept(&mut self, token: &'a Token<'a>) -> Result<bool> {
        let expecting_operand: bool = self.completed.is_empty();

        match token.token_type {
            TokenType::NUMBER
            | TokenType::STRING
            | TokenType::TRUE
            | TokenType::FALSE
            | TokenType::NIL
            | TokenType::IDENTIFIER => {
                if !expecting_operand {
                    return Ok(false);
                }

                self.completed.push(leaf(token));
            }

            TokenType::LEFT_PAREN => {
                if !expecting_operand {
                    return Ok(false);
                }

                self.depth += 1;
            }

            TokenType::RIGHT_PAREN => {
                if self.depth == 0 {
                    return Ok(false); // unmatched closer belongs to the caller
                }

                if expecting_operand {
                    return Err(LoxError::parse(token.line, "Expected expression."));
                }

                self.depth -= 1;
            }

            TokenType::EQUAL => self.assignment(token)?,

            TokenType::BANG if expecting_operand => self.unary(token),

            TokenType::MINUS if expecting_operand => self.unary(token),

            tt => match infix_power(tt) {
                Some(_) if expecting_operand => {
                    return Err(LoxError::parse(token.line, "Expected expression."));
                }

                Some(base) => self.binary(token, base)?,

                None => return Ok(false),
            },
        }

        debug!(
            "Accepted '{}': completed={}, pending={}, depth={}",
            token.lexeme,
            self.completed.len(),
            self.pending.len(),
            self.depth
        );

        Ok(true)
    }

    /// Drain every pending operator and return the single root expression.
    /// `stop` is the token that ended the expression; its line is used for
    /// diagnostics.
    pub fn finish(mut self, stop: &Token<'a>) -> Result<Expr<'a>> {
        if self.depth > 0 {
            return Err(LoxError::parse(
                stop.line,
                "Expected ')' after expression.",
            ));
        }

        while let Some(op) = self.pending.pop() {
            self.pending_power.pop();

            let right: Expr<'a> = self
                .completed
                .pop()
                .ok_or_else(|| LoxError::parse(stop.line, "Expected expression."))?;

            self.completed.push(op.complete(right));
        }

        let root = self
            .completed
            .pop()
            .ok_or_else(|| LoxError::parse(stop.line, "Expected expression."))?;

        debug_assert!(self.completed.is_empty());

        Ok(root)
    }

    // ───────────────────────── operator handling ─────────────────────────

    fn set_power(&mut self, base: u32) -> u32 {
        let power: u32 = base + DEPTH_STEP * self.depth;
        self.power_history.push(power);
        power
    }

    /// Power recorded before the most recent `set_power`.
    fn previous_power(&self) -> u32 {
        let len = self.power_history.len();
        self.power_history[len - 2]
    }

    fn push_pending(&mut self, op: PendingOp<'a>, power: u32) {
        self.pending.push(op);
        self.pending_power.push(power);
    }

    fn unary(&mut self, operator: &'a Token<'a>) {
        let power = self.set_power(UNARY_POWER);
        self.push_pending(PendingOp::Unary { operator }, power);
    }

    fn binary(&mut self, operator: &'a Token<'a>, base: u32) -> Result<()> {
        let power = self.set_power(base);

        if power <= self.previous_power() {
            self.resolve(power, operator.line)?;
        }

        let left: Expr<'a> = self
            .completed
            .pop()
            .ok_or_else(|| LoxError::parse(operator.line, "Expected expression."))?;

        self.push_pending(
            PendingOp::Binary {
                left: Box::new(left),
                operator,
            },
            power,
        );

        Ok(())
    }

    fn assignment(&mut self, operator: &'a Token<'a>) -> Result<()> {
        // Pending powers only grow towards the top, so checking the top is
        // enough to know whether anything is pending at this depth or deeper.
        let floor: u32 = ASSIGNMENT_POWER + DEPTH_STEP * self.depth;
        if self.pending_power.last().is_some_and(|&top| top >= floor) {
            return Err(LoxError::parse(operator.line, "Invalid assignment target."));
        }

        let name: &'a Token<'a> = match self.completed.pop() {
            Some(Expr::Variable(name)) => name,
            _ => {
                return Err(LoxError::parse(operator.line, "Invalid assignment target."));
            }
        };

        let power = self.set_power(ASSIGNMENT_POWER);
        self.push_pending(PendingOp::Assign { name, operator }, power);

        Ok(())
    }

    /// Complete pending operators whose power is `>= power`, stopping at the
    /// first weaker one.
    fn resolve(&mut self, power: u32, line: usize) -> Result<()> {
        while let Some(&top) = self.pending_power.last() {
            if top < power {
                break;
            }

            self.pending_power.pop();

            let op = match self.pending.pop() {
                Some(op) => op,
                None => break,
            };

            let right: Expr<'a> = self
                .completed
                .pop()
                .ok_or_else(|| LoxError::parse(line, "Expected expression."))?;

            self.completed.push(op.complete(right));
        }

        Ok(())
    }
}

fn leaf<'a>(token: &'a Token<'a>) -> Expr<'a> {
    match token.token_type {
        TokenType::IDENTIFIER => Expr::Variable(token),
        TokenType::NIL => Expr::Literal(LiteralValue::Nil),
        _ => Expr::Literal(token.literal.clone().unwrap_or(LiteralValue::Nil)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast_printer::AstPrinter;
    use crate::scanner::tokenize;

    /// Run the engine over `tokens`, checking stack alignment after every step.
    fn parse<'a>(tokens: &'a [Token<'a>]) -> Result<Expr<'a>> {
        let mut state = BindingState::new();
        let mut i = 0;

        while state.accept(&tokens[i])? {
            assert!(state.stacks_aligned());
            assert!(state.completed_len() <= 1);
            i += 1;
        }

        state.finish(&tokens[i])
    }

    fn printed(source: &str) -> String {
        let tokens = tokenize(source).unwrap();
        AstPrinter::print(&parse(&tokens).unwrap())
    }

    #[test]
    fn precedence_and_associativity() {
        assert_eq!(printed("2 + 2 * 5"), "(2 + (2 * 5))");
        assert_eq!(printed("2 * 5 - 2"), "((2 * 5) - 2)");
        assert_eq!(printed("1 + 2 + 3"), "((1 + 2) + 3)");
        assert_eq!(printed("5 > 4 == 3 < 4"), "((5 > 4) == (3 < 4))");
        assert_eq!(printed("a or b and c"), "((a or b) and c)");
    }

    #[test]
    fn parentheses_outrank_everything_outside() {
        assert_eq!(printed("1 + (2 + 3) + 4"), "((1 + (2 + 3)) + 4)");
        assert_eq!(printed("(a and b) * 2"), "((a and b) * 2)");
        assert_eq!(printed("((1))"), "1");
        assert_eq!(printed("-(5 + 5)"), "(- (5 + 5))");
    }

    #[test]
    fn prefix_chains() {
        assert_eq!(printed("1 - - - - - 1"), "(1 - (- (- (- (- 1)))))");
        assert_eq!(printed("-32 * 2"), "((- 32) * 2)");
        assert_eq!(printed("!true == true"), "((! true) == true)");
    }

    #[test]
    fn assignment_takes_whole_right_side() {
        assert_eq!(printed("x = x + 1"), "(x = (x + 1))");
        assert_eq!(printed("(x = 3) + 1"), "((x = 3) + 1)");
        assert_eq!(printed("ok or (n = n + 1)"), "(ok or (n = (n + 1)))");
    }

    #[test]
    fn power_history_starts_with_sentinels() {
        let state = BindingState::new();

        assert_eq!(state.power_history, vec![1, 1]);
        assert_eq!(state.pending_len(), 0);
        assert_eq!(state.depth(), 0);
    }

    #[test]
    fn depth_scales_power() {
        let tokens = tokenize("(1 +").unwrap();
        let mut state = BindingState::new();

        assert!(state.accept(&tokens[0]).unwrap());
        assert!(state.accept(&tokens[1]).unwrap());
        assert!(state.accept(&tokens[2]).unwrap());

        assert_eq!(state.depth(), 1);
        assert_eq!(state.pending_power, vec![ADDITIVE_POWER + DEPTH_STEP]);
    }

    #[test]
    fn stops_without_consuming_foreign_tokens() {
        let tokens = tokenize("1 + 2; 3").unwrap();
        let mut state = BindingState::new();
        let mut consumed = 0;

        while state.accept(&tokens[consumed]).unwrap() {
            consumed += 1;
        }

        assert_eq!(consumed, 3);
        assert_eq!(tokens[consumed].token_type, TokenType::SEMICOLON);
    }

    #[test]
    fn malformed_expressions() {
        for source in ["", "1 +", "* 2", "(1", "()", "(1 +)", "x = ", "1 = 2", "a + b = c", "(a + b) = c", "a = b = c"] {
            let tokens = tokenize(source).unwrap();
            assert!(parse(&tokens).is_err(), "{source:?} should not parse");
        }
    }
}
