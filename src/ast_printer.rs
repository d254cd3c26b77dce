use std::fmt;

use crate::expr::Expr;
use crate::token::LiteralValue;

/// Converts an expression to its canonical, fully parenthesised infix form.
///
/// Every operator node is wrapped in parentheses, so the output parses back
/// into a tree of the same shape.
pub struct AstPrinter;

impl AstPrinter {
    pub fn print(expr: &Expr<'_>) -> String {
        match expr {
            // ── literals ────────────────────────────────────────────────
            Expr::Literal(lit) => match lit {
                LiteralValue::Bool(b) => b.to_string(),

                LiteralValue::Nil => "nil".into(),

                LiteralValue::Str(s) => format!("\"{}\"", s),

                LiteralValue::Number(n) => n.to_string(),
            },

            Expr::Variable(name) => name.lexeme.into(),

            // ── unary operator ──────────────────────────────────────────
            Expr::Unary { operator, right } => {
                format!("({} {})", operator.lexeme, Self::print(right))
            }

            // ── binary operator ─────────────────────────────────────────
            Expr::Binary {
                left,
                operator,
                right,
            } => format!(
                "({} {} {})",
                Self::print(left),
                operator.lexeme,
                Self::print(right)
            ),

            Expr::Assign {
                name,
                operator,
                value,
            } => format!("({} {} {})", name.lexeme, operator.lexeme, Self::print(value)),
        }
    }
}

impl fmt::Display for Expr<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&AstPrinter::print(self))
    }
}
