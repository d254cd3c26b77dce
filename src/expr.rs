use crate::token::{LiteralValue, Token};

/// **Abstract‑Syntax‑Tree node** for every kind of *expression* in Tox.
///
/// The lifetime `'a` ties nodes back to the token slice they were parsed
/// from.  Parenthesised groups leave no node behind: nesting is already
/// encoded in the shape of the tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr<'a> {
    /// A literal constant: number, string, `true`, `false`, or `nil`.
    Literal(LiteralValue),

    /// Variable access, resolved by lexeme at runtime.
    Variable(&'a Token<'a>),

    /// Prefix operator expression: `!ready`, `-42`.
    Unary {
        operator: &'a Token<'a>,
        right: Box<Expr<'a>>,
    },

    /// Infix operator expression, including `and` / `or`.
    Binary {
        left: Box<Expr<'a>>,
        operator: &'a Token<'a>,
        right: Box<Expr<'a>>,
    },

    /// `name = value`.  Evaluates to the assigned value.
    Assign {
        name: &'a Token<'a>,
        operator: &'a Token<'a>,
        value: Box<Expr<'a>>,
    },
}

impl<'a> Expr<'a> {
    /// Best line to report against for this node, if any token is attached.
    pub fn line(&self) -> Option<usize> {
        match self {
            Expr::Literal(_) => None,
            Expr::Variable(token) => Some(token.line),
            Expr::Unary { operator, .. } => Some(operator.line),
            Expr::Binary { operator, .. } => Some(operator.line),
            Expr::Assign { name, .. } => Some(name.line),
        }
    }
}
