/*!
Recursive‑descent statement parser.

Statements are parsed top‑down; every expression position is handed to the
binding‑power engine in [`crate::binding`], which reads tokens until one can
no longer continue the expression and leaves that token for the statement
rules to consume.

There is no error recovery: the first error aborts the parse.

Grammar (EBNF)
--------------

```text
program        → declaration* EOF ;
declaration    → varDecl | statement ;
varDecl        → "var" IDENT ( "=" expression )? ";" ;
statement      → exprStmt | printStmt | whileStmt | ifStmt | block ;
exprStmt       → expression ";" ;
printStmt      → "print" expression ";" ;
whileStmt      → "while" "(" expression ")" statement ;
ifStmt         → "if" "(" expression ")" statement ( "else" statement )? ;
block          → "{" declaration* "}" ;
```

Diagnostics go through `log`: `info!` when a parse starts and ends,
`debug!` on each grammar branch and on every failed `consume`.
*/

use crate::binding::BindingState;
use crate::error::{LoxError, Result};
use crate::expr::Expr;
use crate::stmt::Stmt;
use crate::token::{Token, TokenType};

use log::{debug, info};

/// Top‑level parser over an immutable slice of tokens.  The slice must end
/// with an `EOF` token, as produced by the scanner.
pub struct Parser<'a> {
    tokens: &'a [Token<'a>],
    current: usize,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: &'a [Token<'a>]) -> Self {
        info!("Parser created with {} tokens", tokens.len());

        Self { tokens, current: 0 }
    }

    // ───────────────────────── public API ─────────────────────────

    /// Parse an entire program and return its statement list.
    pub fn parse(&mut self) -> Result<Vec<Stmt<'a>>> {
        info!("Beginning parse phase");

        let mut statements: Vec<Stmt<'a>> = Vec::new();

        while !self.is_at_end() {
            statements.push(self.declaration()?);
        }

        info!("Parsed {} statement(s)", statements.len());

        Ok(statements)
    }

    /// Parse exactly one expression spanning the whole input.
    pub fn parse_expression(&mut self) -> Result<Expr<'a>> {
        info!("Beginning single expression parse");

        let expr: Expr<'a> = self.expression()?;

        if !self.is_at_end() {
            let token = self.peek();
            return Err(LoxError::parse(
                token.line,
                format!("Unexpected '{}' after expression.", token.lexeme),
            ));
        }

        Ok(expr)
    }

    // ──────────────────────── declaration rules ───────────────────

    fn declaration(&mut self) -> Result<Stmt<'a>> {
        debug!("Entering declaration at line {}", self.peek().line);

        if self.matches(TokenType::VAR) {
            self.var_declaration()
        } else {
            self.statement()
        }
    }

    fn var_declaration(&mut self) -> Result<Stmt<'a>> {
        let name: &'a Token<'a> = self.consume(TokenType::IDENTIFIER, "Expected variable name.")?;

        let initializer: Option<Expr<'a>> = if self.matches(TokenType::EQUAL) {
            Some(self.expression()?)
        } else {
            None
        };

        self.consume(
            TokenType::SEMICOLON,
            "Expected ';' after variable declaration.",
        )?;

        Ok(Stmt::Var { name, initializer })
    }

    // ───────────────────────── statement rules ────────────────────

    fn statement(&mut self) -> Result<Stmt<'a>> {
        debug!("Entering statement: {}", self.peek().token_type);

        let token: &'a Token<'a> = self.peek();

        match token.token_type {
            tt if tt.is_reserved() => Err(LoxError::parse(
                token.line,
                format!("'{}' is a reserved word and is not supported.", token.lexeme),
            )),

            TokenType::IF => {
                self.advance();
                self.if_statement()
            }

            TokenType::WHILE => {
                self.advance();
                self.while_statement()
            }

            TokenType::PRINT => {
                self.advance();
                self.print_statement()
            }

            TokenType::LEFT_BRACE => {
                self.advance();
                Ok(Stmt::Block(self.block()?))
            }

            _ => self.expression_statement(),
        }
    }

    fn print_statement(&mut self) -> Result<Stmt<'a>> {
        let value: Expr<'a> = self.expression()?;

        self.consume(TokenType::SEMICOLON, "Expected ';' after value.")?;

        Ok(Stmt::Print(value))
    }

    fn expression_statement(&mut self) -> Result<Stmt<'a>> {
        let expr: Expr<'a> = self.expression()?;

        self.consume(TokenType::SEMICOLON, "Expected ';' after expression.")?;

        Ok(Stmt::Expression(expr))
    }

    fn if_statement(&mut self) -> Result<Stmt<'a>> {
        self.consume(TokenType::LEFT_PAREN, "Expected '(' after 'if'.")?;
        let condition: Expr<'a> = self.expression()?;
        self.consume(TokenType::RIGHT_PAREN, "Expected ')' after if condition.")?;

        let then_branch: Box<Stmt<'a>> = Box::new(self.statement()?);
        let else_branch: Option<Box<Stmt<'a>>> = if self.matches(TokenType::ELSE) {
            Some(Box::new(self.statement()?))
        } else {
            None
        };

        Ok(Stmt::If {
            condition,
            then_branch,
            else_branch,
        })
    }

    fn while_statement(&mut self) -> Result<Stmt<'a>> {
        self.consume(TokenType::LEFT_PAREN, "Expected '(' after 'while'.")?;
        let condition: Expr<'a> = self.expression()?;
        self.consume(TokenType::RIGHT_PAREN, "Expected ')' after condition.")?;
        let body: Box<Stmt<'a>> = Box::new(self.statement()?);

        Ok(Stmt::While { condition, body })
    }

    fn block(&mut self) -> Result<Vec<Stmt<'a>>> {
        let mut statements: Vec<Stmt<'a>> = Vec::new();

        while !self.check(TokenType::RIGHT_BRACE) && !self.is_at_end() {
            statements.push(self.declaration()?);
        }

        self.consume(TokenType::RIGHT_BRACE, "Expected '}' after block.")?;

        Ok(statements)
    }

    // ─────────────────────── expression (binding power) ───────────

    fn expression(&mut self) -> Result<Expr<'a>> {
        let mut state: BindingState<'a> = BindingState::new();

        while state.accept(self.peek())? {
            self.advance();
        }

        state.finish(self.peek())
    }

    // ────────────────────── utility helpers ───────────────────────

    #[inline(always)]
    fn matches(&mut self, ttype: TokenType) -> bool {
        if self.check(ttype) {
            self.advance();

            return true;
        }

        false
    }

    #[inline(always)]
    fn consume(&mut self, ttype: TokenType, message: &str) -> Result<&'a Token<'a>> {
        if self.check(ttype) {
            return Ok(self.advance());
        }

        debug!(
            "Expected {} but found '{}' on line {}",
            ttype,
            self.peek().lexeme,
            self.peek().line
        );

        Err(LoxError::parse(self.peek().line, message))
    }

    #[inline(always)]
    fn check(&self, ttype: TokenType) -> bool {
        if self.is_at_end() {
            return false;
        }

        self.peek().token_type == ttype
    }

    #[inline(always)]
    fn advance(&mut self) -> &'a Token<'a> {
        if !self.is_at_end() {
            self.current += 1;
        }

        self.previous()
    }

    #[inline(always)]
    fn is_at_end(&self) -> bool {
        matches!(self.peek().token_type, TokenType::EOF)
    }

    #[inline(always)]
    fn peek(&self) -> &'a Token<'a> {
        &self.tokens[self.current]
    }

    #[inline(always)]
    fn previous(&self) -> &'a Token<'a> {
        &self.tokens[self.current - 1]
    }
}
