use log::debug;
use serde::Serialize;
use std::fmt;

/// The different kinds of tokens recognized by the Tox scanner.
///
/// Kinds are plain tags; any literal payload lives on [`Token::literal`].
#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TokenType {
    // Single‑character punctuation.
    LEFT_PAREN,
    RIGHT_PAREN,
    LEFT_BRACE,
    RIGHT_BRACE,
    COMMA,
    DOT,
    MINUS,
    PLUS,
    SEMICOLON,
    SLASH,
    STAR,

    // One or two character operators.
    BANG,
    BANG_EQUAL,
    EQUAL,
    EQUAL_EQUAL,
    GREATER,
    GREATER_EQUAL,
    LESS,
    LESS_EQUAL,

    /// A user‑defined identifier
    IDENTIFIER,

    /// A string literal, contents carried without quotes
    STRING,

    /// A numeric literal
    NUMBER,

    // Keywords.
    AND,
    CLASS,
    ELSE,
    FALSE,
    FUN,
    FOR,
    IF,
    NIL,
    OR,
    PRINT,
    RETURN,
    SUPER,
    THIS,
    TRUE,
    VAR,
    WHILE,

    /// End‑of‑file marker
    EOF,
}

impl TokenType {
    /// Keywords that are lexed but have no statement or expression form.
    pub const fn is_reserved(self) -> bool {
        matches!(
            self,
            TokenType::CLASS
                | TokenType::FUN
                | TokenType::FOR
                | TokenType::RETURN
                | TokenType::SUPER
                | TokenType::THIS
        )
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Variant names are already the upper‑case listing names.
        fmt::Debug::fmt(self, f)
    }
}

/// A literal constant, either attached to a token by the scanner or held by
/// an [`Expr::Literal`](crate::expr::Expr::Literal) leaf.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum LiteralValue {
    /// Numeric literal ‑ stored as IEEE‑754 `f64`.
    Number(f64),

    /// String literal without surrounding quotes.
    Str(String),

    /// `true` / `false`.
    Bool(bool),

    /// The `nil` literal.
    Nil,
}

impl fmt::Display for LiteralValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // 1234 → "1234", 12.23 → "12.23"
            LiteralValue::Number(n) => {
                if n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
                    let mut buf: itoa::Buffer = itoa::Buffer::new();
                    f.write_str(buf.format(*n as i64))
                } else {
                    write!(f, "{}", n)
                }
            }
            LiteralValue::Str(s) => f.write_str(s),
            LiteralValue::Bool(b) => write!(f, "{}", b),
            LiteralValue::Nil => f.write_str("nil"),
        }
    }
}

/// A scanned token, including its kind, the original lexeme, the optional
/// literal value and the line number where it was found.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Token<'a> {
    /// The category of this token.
    pub token_type: TokenType,

    /// The exact substring from the source that produced this token.
    pub lexeme: &'a str,

    /// Value carried by number, string and boolean tokens.
    pub literal: Option<LiteralValue>,

    /// 1‑based line number in the source.
    pub line: usize,
}

impl<'a> Token<'a> {
    /// Lexeme of the synthetic end‑of‑input token.
    pub const EOF_LEXEME: &'static str = "\0";

    pub fn new(
        token_type: TokenType,
        lexeme: &'a str,
        literal: Option<LiteralValue>,
        line: usize,
    ) -> Self {
        debug!(
            "Creating new token: type={:?}, lexeme={}, line={}",
            token_type, lexeme, line
        );

        Self {
            token_type,
            lexeme,
            literal,
            line,
        }
    }

    /// The terminating token every scan ends with.
    pub fn eof(line: usize) -> Self {
        Self::new(TokenType::EOF, Self::EOF_LEXEME, None, line)
    }
}

impl<'a> fmt::Display for Token<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<Token type={} lexeme={}", self.token_type, self.lexeme)?;

        if let Some(literal) = &self.literal {
            write!(f, " literal={}", literal)?;
        }

        f.write_str(" />")
    }
}
