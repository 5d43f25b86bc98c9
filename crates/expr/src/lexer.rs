//! Tokenizer for the expression language.

use alloc::string::String;
use alloc::vec::Vec;
use tabpipe_core::{Error, Result};

/// Token kinds.
#[derive(Clone, Debug, PartialEq)]
pub enum TokenKind {
    Int(i64),
    Float(f64),
    Str(String),
    Ident(String),
    /// `#`, `#acc` or `#index`; holds the suffix after `#`.
    Pointer(String),
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Comma,
    Dot,
    Semicolon,
    Question,
    Colon,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Bang,
    Assign,
    EqEq,
    NotEq,
    Lt,
    Le,
    Gt,
    Ge,
    AndAnd,
    OrOr,
    Eof,
}

/// A token and the byte offset where it starts.
#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub pos: usize,
}

struct Lexer<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.input[self.pos..].chars().nth(offset)
    }

    fn advance(&mut self) {
        if let Some(c) = self.peek() {
            self.pos += c.len_utf8();
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn next_token(&mut self) -> Result<Token> {
        self.skip_whitespace();
        let start = self.pos;
        let c = match self.peek() {
            Some(c) => c,
            None => {
                return Ok(Token {
                    kind: TokenKind::Eof,
                    pos: start,
                })
            }
        };

        let kind = match c {
            '0'..='9' => self.number()?,
            '\'' | '"' => self.string(c)?,
            '#' => {
                self.advance();
                let name = self.word();
                match name.as_str() {
                    "" | "acc" | "index" => TokenKind::Pointer(name),
                    _ => return Err(Error::compile("unknown pointer", start)),
                }
            }
            c if c == '_' || c.is_alphabetic() => TokenKind::Ident(self.word()),
            _ => {
                self.advance();
                let next = self.peek();
                let (kind, two) = match (c, next) {
                    ('=', Some('=')) => (TokenKind::EqEq, true),
                    ('!', Some('=')) => (TokenKind::NotEq, true),
                    ('<', Some('=')) => (TokenKind::Le, true),
                    ('>', Some('=')) => (TokenKind::Ge, true),
                    ('&', Some('&')) => (TokenKind::AndAnd, true),
                    ('|', Some('|')) => (TokenKind::OrOr, true),
                    ('=', _) => (TokenKind::Assign, false),
                    ('!', _) => (TokenKind::Bang, false),
                    ('<', _) => (TokenKind::Lt, false),
                    ('>', _) => (TokenKind::Gt, false),
                    ('(', _) => (TokenKind::LParen, false),
                    (')', _) => (TokenKind::RParen, false),
                    ('[', _) => (TokenKind::LBracket, false),
                    (']', _) => (TokenKind::RBracket, false),
                    ('{', _) => (TokenKind::LBrace, false),
                    ('}', _) => (TokenKind::RBrace, false),
                    (',', _) => (TokenKind::Comma, false),
                    ('.', _) => (TokenKind::Dot, false),
                    (';', _) => (TokenKind::Semicolon, false),
                    ('?', _) => (TokenKind::Question, false),
                    (':', _) => (TokenKind::Colon, false),
                    ('+', _) => (TokenKind::Plus, false),
                    ('-', _) => (TokenKind::Minus, false),
                    ('*', _) => (TokenKind::Star, false),
                    ('/', _) => (TokenKind::Slash, false),
                    ('%', _) => (TokenKind::Percent, false),
                    _ => {
                        return Err(Error::compile(
                            alloc::format!("unexpected character '{}'", c),
                            start,
                        ))
                    }
                };
                if two {
                    self.advance();
                }
                kind
            }
        };

        Ok(Token { kind, pos: start })
    }

    fn word(&mut self) -> String {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c == '_' || c.is_alphanumeric() {
                self.advance();
            } else {
                break;
            }
        }
        String::from(&self.input[start..self.pos])
    }

    fn digits(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() || c == '_' {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn number(&mut self) -> Result<TokenKind> {
        let start = self.pos;
        let mut is_float = false;
        self.digits();

        // `1.5` is a float, `1.abs()` is a member call on an integer.
        if self.peek() == Some('.') && self.peek_at(1).map_or(false, |c| c.is_ascii_digit()) {
            is_float = true;
            self.advance();
            self.digits();
        }
        if matches!(self.peek(), Some('e') | Some('E')) {
            let sign = matches!(self.peek_at(1), Some('+') | Some('-'));
            let digit_at = if sign { 2 } else { 1 };
            if self.peek_at(digit_at).map_or(false, |c| c.is_ascii_digit()) {
                is_float = true;
                for _ in 0..digit_at {
                    self.advance();
                }
                self.digits();
            }
        }

        let text: String = self.input[start..self.pos]
            .chars()
            .filter(|c| *c != '_')
            .collect();
        if is_float {
            text.parse::<f64>()
                .map(TokenKind::Float)
                .map_err(|_| Error::compile("invalid float literal", start))
        } else {
            text.parse::<i64>()
                .map(TokenKind::Int)
                .map_err(|_| Error::compile("integer literal out of range", start))
        }
    }

    fn string(&mut self, quote: char) -> Result<TokenKind> {
        let start = self.pos;
        self.advance();
        let mut out = String::new();
        loop {
            match self.peek() {
                None => return Err(Error::compile("unterminated string", start)),
                Some(c) if c == quote => {
                    self.advance();
                    return Ok(TokenKind::Str(out));
                }
                Some('\\') => {
                    self.advance();
                    let escaped = match self.peek() {
                        Some('n') => '\n',
                        Some('t') => '\t',
                        Some('r') => '\r',
                        Some('\\') => '\\',
                        Some('\'') => '\'',
                        Some('"') => '"',
                        _ => return Err(Error::compile("invalid escape sequence", self.pos)),
                    };
                    out.push(escaped);
                    self.advance();
                }
                Some(c) => {
                    out.push(c);
                    self.advance();
                }
            }
        }
    }
}

/// Splits an expression into tokens. The last token is always `Eof`.
pub fn tokenize(input: &str) -> Result<Vec<Token>> {
    let mut lexer = Lexer::new(input);
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next_token()?;
        let done = token.kind == TokenKind::Eof;
        tokens.push(token);
        if done {
            return Ok(tokens);
        }
    }
}
