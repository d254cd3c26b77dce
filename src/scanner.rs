//! Module `scanner` implements a one‑pass, streaming lexer for the Tox language.
//!
//! It transforms a source string into a sequence of `Token<'a>`s, skipping whitespace
//! and comments, and emitting exactly one `EOF` token (lexeme `"\0"`) at the end.
//! Designed as a `FusedIterator`, it can be chained safely with other iterator adapters.
//!
//! # Public API
//!
//! - `Scanner::new(src: &'a str) -> Scanner<'a>`
//!   Create a new lexer over the input.
//!
//! - `impl Iterator for Scanner<'a>`
//!   Yields `Result<Token<'a>, LoxError>` on each `.next()`.  A lexical error is reported
//!   once and scanning resumes with the following character.
//!
//! - `Scanner::scan_all` / [`tokenize`]
//!   Drain the scanner into a token vector, or a single `LoxError::Scan` listing every
//!   lexical error in source order.
//!
//! # Token Recognition (`scan_token`)
//!
//! - Single‑character tokens: `(`, `)`, `{`, `}`, `,`, `.`, `-`, `+`, `;`, `*`.
//! - Two‑character operators: `!=`, `==`, `<=`, `>=`.
//! - Comments: `//` to end of line, `/* … */` block comments.  An unterminated block
//!   comment silently runs to the end of input.
//! - String literals: `"` … `"`, allowing multi‑line and reporting unterminated errors.
//! - Numeric literals: integer and optional fractional part.
//! - Identifiers/keywords: alphanumeric/_ sequences, resolved via a perfect‑hash `KEYWORDS` map.
//!
//! Comment skipping uses `memchr` for newline and `*/` searches.
//!
//! # Example
//!
//! ```rust
//! use tox::scanner::Scanner;
//!
//! let scanner = Scanner::new("print 123; // example");
//! for result in scanner {
//!     match result {
//!         Ok(token) => println!("{}", token),
//!         Err(err) => eprintln!("{}", err),
//!     }
//! }
//! ```

use crate::error::{LoxError, Result};
use crate::token::{LiteralValue, Token, TokenType};
use log::{debug, info};
use memchr::{memchr, memchr_iter, memmem};
use phf::phf_map;
use std::iter::FusedIterator;

// ─────────────────────────────────────────────────────────────────────────────
// Static keyword map (compile‑time perfect hash)
// ─────────────────────────────────────────────────────────────────────────────

static KEYWORDS: phf::Map<&'static [u8], TokenType> = phf_map! {
    b"and"    => TokenType::AND,
    b"class"  => TokenType::CLASS,
    b"else"   => TokenType::ELSE,
    b"false"  => TokenType::FALSE,
    b"fun"    => TokenType::FUN,
    b"for"    => TokenType::FOR,
    b"if"     => TokenType::IF,
    b"nil"    => TokenType::NIL,
    b"or"     => TokenType::OR,
    b"print"  => TokenType::PRINT,
    b"return" => TokenType::RETURN,
    b"super"  => TokenType::SUPER,
    b"this"   => TokenType::THIS,
    b"true"   => TokenType::TRUE,
    b"var"    => TokenType::VAR,
    b"while"  => TokenType::WHILE,
};

/// Convenience wrapper: scan `source` completely.
pub fn tokenize(source: &str) -> Result<Vec<Token<'_>>> {
    Scanner::new(source).scan_all()
}

/// A single pass **scanner / lexer** that converts source text into a
/// sequence of [`Token`]s.  The lifetime `'a` ties every emitted token's
/// `lexeme` slice back to the original source.
pub struct Scanner<'a> {
    source: &'a str,
    src: &'a [u8],       // byte view of `source`
    start: usize,        // index of the *first* byte of the current lexeme
    curr: usize,         // index *one past* the last byte examined
    line: usize,         // 1‑based line counter (\n increments)
    pending: Option<(TokenType, Option<LiteralValue>)>, // recognised token waiting to be emitted
}

impl<'a> Scanner<'a> {
    /// Create a new lexer over `source`.
    #[inline]
    pub fn new(source: &'a str) -> Self {
        info!("Scanner created over {} bytes", source.len());

        Self {
            source,
            src: source.as_bytes(),
            start: 0,
            curr: 0,
            line: 1,
            pending: None,
        }
    }

    /// Drain the scanner.  Every lexical error is kept; if there was at least
    /// one, they are returned together instead of the tokens.
    pub fn scan_all(self) -> Result<Vec<Token<'a>>> {
        let mut tokens: Vec<Token<'a>> = Vec::new();
        let mut errors: Vec<LoxError> = Vec::new();

        for item in self {
            match item {
                Ok(token) => tokens.push(token),
                Err(e) => errors.push(e),
            }
        }

        if errors.is_empty() {
            info!("Scanned {} tokens", tokens.len());
            Ok(tokens)
        } else {
            info!("Scanning failed with {} error(s)", errors.len());
            Err(LoxError::Scan(errors))
        }
    }

    // ───────────────────────────── primitive helpers ────────────────────────

    #[inline(always)]
    const fn len(&self) -> usize {
        self.src.len()
    }

    #[inline(always)]
    fn is_at_end(&self) -> bool {
        self.curr >= self.len()
    }

    /// Advance one byte and return it.  Callers guard with [`is_at_end`].
    #[inline(always)]
    fn advance(&mut self) -> u8 {
        let b = self.src[self.curr];
        self.curr += 1;
        b
    }

    /// Peek at the current byte without consuming it.  Returns `0` past EOF.
    #[inline(always)]
    fn peek(&self) -> u8 {
        if self.is_at_end() {
            0
        } else {
            self.src[self.curr]
        }
    }

    #[inline(always)]
    fn peek_next(&self) -> u8 {
        if self.curr + 1 >= self.len() {
            0
        } else {
            self.src[self.curr + 1]
        }
    }

    #[inline(always)]
    fn match_byte(&mut self, expected: u8) -> bool {
        if !self.is_at_end() && self.peek() == expected {
            self.advance();
            true
        } else {
            false
        }
    }

    #[inline(always)]
    fn emit(&mut self, tt: TokenType) {
        self.pending = Some((tt, None));
    }

    #[inline(always)]
    fn emit_or_equal(&mut self, with_equal: TokenType, alone: TokenType) {
        let tt = if self.match_byte(b'=') { with_equal } else { alone };
        self.emit(tt);
    }

    // ───────────────────────────── core lexing ─────────────────────────────

    /// Scan a *single* token starting at `self.curr`.  Whitespace and comments
    /// return `Ok(())` with `pending = None`.
    fn scan_token(&mut self) -> Result<()> {
        let b = self.advance();

        match b {
            b'(' => self.emit(TokenType::LEFT_PAREN),
            b')' => self.emit(TokenType::RIGHT_PAREN),
            b'{' => self.emit(TokenType::LEFT_BRACE),
            b'}' => self.emit(TokenType::RIGHT_BRACE),
            b',' => self.emit(TokenType::COMMA),
            b'.' => self.emit(TokenType::DOT),
            b'-' => self.emit(TokenType::MINUS),
            b'+' => self.emit(TokenType::PLUS),
            b';' => self.emit(TokenType::SEMICOLON),
            b'*' => self.emit(TokenType::STAR),

            b'!' => self.emit_or_equal(TokenType::BANG_EQUAL, TokenType::BANG),
            b'=' => self.emit_or_equal(TokenType::EQUAL_EQUAL, TokenType::EQUAL),
            b'<' => self.emit_or_equal(TokenType::LESS_EQUAL, TokenType::LESS),
            b'>' => self.emit_or_equal(TokenType::GREATER_EQUAL, TokenType::GREATER),

            b' ' | b'\r' | b'\t' => {}

            b'\n' => self.line += 1,

            b'/' => {
                if self.match_byte(b'/') {
                    self.skip_line_comment();
                } else if self.match_byte(b'*') {
                    self.skip_block_comment();
                } else {
                    self.emit(TokenType::SLASH);
                }
            }

            b'"' => return self.parse_string(),

            b'0'..=b'9' => self.parse_number(),

            b'a'..=b'z' | b'A'..=b'Z' | b'_' => self.parse_identifier(),

            _ => {
                // Report the whole character once, even when it spans several bytes.
                let ch: char = self.source[self.start..]
                    .chars()
                    .next()
                    .unwrap_or(char::REPLACEMENT_CHARACTER);
                self.curr = self.start + ch.len_utf8();

                return Err(LoxError::lex(
                    self.line,
                    format!("Unexpected character: {}", ch),
                ));
            }
        }

        Ok(())
    }

    /// `//` comment: fast‑forward to the next newline (left for `scan_token`
    /// so the line counter sees it), or to EOF.
    fn skip_line_comment(&mut self) {
        match memchr(b'\n', &self.src[self.curr..]) {
            Some(pos) => self.curr += pos,
            None => self.curr = self.len(),
        }
    }

    /// `/* … */` comment.  Newlines inside still count; a missing closer
    /// consumes the rest of the input without an error.
    fn skip_block_comment(&mut self) {
        let rest: &[u8] = &self.src[self.curr..];

        let (body_len, skip) = match memmem::find(rest, b"*/") {
            Some(pos) => (pos, pos + 2),
            None => {
                debug!("Unterminated block comment starting on line {}", self.line);
                (rest.len(), rest.len())
            }
        };

        self.line += memchr_iter(b'\n', &rest[..body_len]).count();
        self.curr += skip;
    }

    /// String body up to the closing quote.  Newlines are allowed and
    /// counted; running out of input is an error on the line reached.
    fn parse_string(&mut self) -> Result<()> {
        while !self.is_at_end() && self.peek() != b'"' {
            if self.advance() == b'\n' {
                self.line += 1;
            }
        }

        if self.is_at_end() {
            return Err(LoxError::lex(self.line, "Unterminated string."));
        }

        self.advance(); // closing quote

        let s: &str = &self.source[self.start + 1..self.curr - 1];
        self.pending = Some((TokenType::STRING, Some(LiteralValue::Str(s.to_owned()))));

        Ok(())
    }

    /// Digits, then optionally `.` and more digits.  A trailing `.` is left
    /// for the next token (`12.` is NUMBER, DOT).
    fn parse_number(&mut self) {
        while self.peek().is_ascii_digit() {
            self.advance();
        }

        if self.peek() == b'.' && self.peek_next().is_ascii_digit() {
            self.advance(); // "."

            while self.peek().is_ascii_digit() {
                self.advance();
            }
        }

        let n: f64 = self.source[self.start..self.curr]
            .parse::<f64>()
            .unwrap_or(f64::NAN); // digits only, never hit
        self.pending = Some((TokenType::NUMBER, Some(LiteralValue::Number(n))));
    }

    /// Identifier or keyword.
    fn parse_identifier(&mut self) {
        while {
            let c: u8 = self.peek();
            c.is_ascii_alphanumeric() || c == b'_'
        } {
            self.advance();
        }

        let slice: &[u8] = &self.src[self.start..self.curr];

        let tt: TokenType = KEYWORDS
            .get(slice)
            .copied()
            .unwrap_or(TokenType::IDENTIFIER);

        let literal: Option<LiteralValue> = match tt {
            TokenType::TRUE => Some(LiteralValue::Bool(true)),
            TokenType::FALSE => Some(LiteralValue::Bool(false)),
            _ => None,
        };

        self.pending = Some((tt, literal));
    }
}

// ───────────────────────── Iterator implementation ─────────────────────────

impl<'a> Iterator for Scanner<'a> {
    type Item = Result<Token<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        while self.curr <= self.len() {
            // Emit exactly one EOF then terminate.
            if self.curr == self.len() {
                self.curr += 1;
                return Some(Ok(Token::eof(self.line)));
            }

            self.start = self.curr;
            self.pending = None;

            if let Err(e) = self.scan_token() {
                return Some(Err(e));
            }

            if let Some((tt, literal)) = self.pending.take() {
                let lexeme: &'a str = &self.source[self.start..self.curr];
                debug!("Scanned token ({:?}) on line {}", tt, self.line);

                return Some(Ok(Token::new(tt, lexeme, literal, self.line)));
            }
            // whitespace / comment → keep going
        }

        None
    }
}

impl<'a> FusedIterator for Scanner<'a> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multi_byte_unexpected_character_is_reported_once() {
        let results: Vec<_> = Scanner::new("1 é 2").collect();
        let errors: Vec<_> = results.iter().filter(|r| r.is_err()).collect();

        assert_eq!(errors.len(), 1);
        assert_eq!(results.len(), 4); // 1, error, 2, EOF
    }

    #[test]
    fn block_comment_counts_newlines() {
        let tokens = tokenize("/* one\ntwo\n*/ x").unwrap();

        assert_eq!(tokens[0].token_type, TokenType::IDENTIFIER);
        assert_eq!(tokens[0].line, 3);
    }
}
