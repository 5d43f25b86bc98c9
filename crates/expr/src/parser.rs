//! Recursive-descent parser for the expression language.
//!
//! Precedence, lowest first:
//!
//! - `let name = value; body`
//! - `cond ? a : b`
//! - `||`, `or`
//! - `&&`, `and`
//! - `==`, `!=`
//! - `<`, `<=`, `>`, `>=`, `in`, `not in`
//! - `+`, `-`
//! - `*`, `/`, `%`
//! - unary `!`, `not`, `-`, `+`
//! - postfix `[index]`, `.name(args)`

use crate::ast::{BinaryOp, Callee, Expr, Node, Pointer, UnaryOp};
use crate::lexer::{tokenize, Token, TokenKind};
use crate::REGISTRY_NAME;
use alloc::boxed::Box;
use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use tabpipe_core::{Error, Result, Value};

/// Deepest expression tree the parser accepts. Evaluation, checking and
/// identifier collection all recurse over the tree, so the bound keeps them
/// off the end of the stack.
pub const MAX_DEPTH: usize = 128;

/// Parses an expression into an AST.
pub fn parse(input: &str) -> Result<Node> {
    let tokens = tokenize(input)?;
    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
    };
    let node = parser.parse_expression()?;
    let end = parser.peek();
    if end.kind != TokenKind::Eof {
        return Err(Error::compile("unexpected token after expression", end.pos));
    }
    Ok(node)
}

/// Parser state.
struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    /// Height of the tree above the node being parsed.
    depth: usize,
}

impl Parser {
    fn peek(&self) -> &Token {
        // `tokenize` always ends with Eof, and `advance` never moves past it.
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn peek_kind_at(&self, offset: usize) -> &TokenKind {
        let index = (self.pos + offset).min(self.tokens.len() - 1);
        &self.tokens[index].kind
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if token.kind != TokenKind::Eof {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if &self.peek().kind == kind {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> Result<Token> {
        if self.peek().kind == kind {
            Ok(self.advance())
        } else {
            Err(Error::compile(format!("expected {}", what), self.peek().pos))
        }
    }

    fn is_keyword(&self, keyword: &str) -> bool {
        matches!(&self.peek().kind, TokenKind::Ident(name) if name == keyword)
    }

    fn expect_ident(&mut self, what: &str) -> Result<(String, usize)> {
        let token = self.advance();
        match token.kind {
            TokenKind::Ident(name) if !is_reserved_word(&name) => Ok((name, token.pos)),
            _ => Err(Error::compile(format!("expected {}", what), token.pos)),
        }
    }

    fn enter(&mut self) -> Result<()> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(Error::compile("expression nested too deeply", self.peek().pos));
        }
        Ok(())
    }

    fn leave(&mut self, levels: usize) {
        self.depth -= levels;
    }

    fn parse_expression(&mut self) -> Result<Node> {
        self.enter()?;
        let node = self.parse_let()?;
        self.leave(1);
        Ok(node)
    }

    fn parse_let(&mut self) -> Result<Node> {
        if self.is_keyword("let") {
            let start = self.advance().pos;
            let (name, _) = self.expect_ident("variable name after let")?;
            self.expect(TokenKind::Assign, "'=' in let binding")?;
            let value = self.parse_conditional()?;
            self.expect(TokenKind::Semicolon, "';' after let binding")?;
            let body = self.parse_expression()?;
            return Ok(Node::new(
                Expr::Let {
                    name,
                    value: Box::new(value),
                    body: Box::new(body),
                },
                start,
            ));
        }
        self.parse_conditional()
    }

    fn parse_conditional(&mut self) -> Result<Node> {
        let cond = self.parse_or()?;
        if self.eat(&TokenKind::Question) {
            let then = self.parse_expression()?;
            self.expect(TokenKind::Colon, "':' in conditional")?;
            let otherwise = self.parse_conditional()?;
            let pos = cond.pos;
            return Ok(Node::new(
                Expr::Conditional {
                    cond: Box::new(cond),
                    then: Box::new(then),
                    otherwise: Box::new(otherwise),
                },
                pos,
            ));
        }
        Ok(cond)
    }

    fn parse_or(&mut self) -> Result<Node> {
        let mut left = self.parse_and()?;
        let mut levels = 0;
        while self.eat(&TokenKind::OrOr) || self.eat_keyword("or") {
            self.enter()?;
            levels += 1;
            let right = self.parse_and()?;
            left = binary(BinaryOp::Or, left, right);
        }
        self.leave(levels);
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Node> {
        let mut left = self.parse_equality()?;
        let mut levels = 0;
        while self.eat(&TokenKind::AndAnd) || self.eat_keyword("and") {
            self.enter()?;
            levels += 1;
            let right = self.parse_equality()?;
            left = binary(BinaryOp::And, left, right);
        }
        self.leave(levels);
        Ok(left)
    }

    fn parse_equality(&mut self) -> Result<Node> {
        let mut left = self.parse_relational()?;
        let mut levels = 0;
        loop {
            let op = match self.peek().kind {
                TokenKind::EqEq => BinaryOp::Eq,
                TokenKind::NotEq => BinaryOp::Ne,
                _ => {
                    self.leave(levels);
                    return Ok(left);
                }
            };
            self.advance();
            self.enter()?;
            levels += 1;
            let right = self.parse_relational()?;
            left = binary(op, left, right);
        }
    }

    fn parse_relational(&mut self) -> Result<Node> {
        let mut left = self.parse_additive()?;
        let mut levels = 0;
        loop {
            let (op, width) = match &self.peek().kind {
                TokenKind::Lt => (BinaryOp::Lt, 1),
                TokenKind::Le => (BinaryOp::Le, 1),
                TokenKind::Gt => (BinaryOp::Gt, 1),
                TokenKind::Ge => (BinaryOp::Ge, 1),
                TokenKind::Ident(w) if w == "in" => (BinaryOp::In, 1),
                TokenKind::Ident(w)
                    if w == "not"
                        && matches!(self.peek_kind_at(1), TokenKind::Ident(n) if n == "in") =>
                {
                    (BinaryOp::NotIn, 2)
                }
                _ => {
                    self.leave(levels);
                    return Ok(left);
                }
            };
            for _ in 0..width {
                self.advance();
            }
            self.enter()?;
            levels += 1;
            let right = self.parse_additive()?;
            left = binary(op, left, right);
        }
    }

    fn parse_additive(&mut self) -> Result<Node> {
        let mut left = self.parse_multiplicative()?;
        let mut levels = 0;
        loop {
            let op = match self.peek().kind {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Sub,
                _ => {
                    self.leave(levels);
                    return Ok(left);
                }
            };
            self.advance();
            self.enter()?;
            levels += 1;
            let right = self.parse_multiplicative()?;
            left = binary(op, left, right);
        }
    }

    fn parse_multiplicative(&mut self) -> Result<Node> {
        let mut left = self.parse_unary()?;
        let mut levels = 0;
        loop {
            let op = match self.peek().kind {
                TokenKind::Star => BinaryOp::Mul,
                TokenKind::Slash => BinaryOp::Div,
                TokenKind::Percent => BinaryOp::Mod,
                _ => {
                    self.leave(levels);
                    return Ok(left);
                }
            };
            self.advance();
            self.enter()?;
            levels += 1;
            let right = self.parse_unary()?;
            left = binary(op, left, right);
        }
    }

    fn parse_unary(&mut self) -> Result<Node> {
        let pos = self.peek().pos;
        let op = match &self.peek().kind {
            TokenKind::Bang => Some(UnaryOp::Not),
            TokenKind::Minus => Some(UnaryOp::Neg),
            TokenKind::Plus => Some(UnaryOp::Plus),
            TokenKind::Ident(w) if w == "not" => Some(UnaryOp::Not),
            _ => None,
        };
        match op {
            Some(op) => {
                self.advance();
                self.enter()?;
                let operand = self.parse_unary()?;
                self.leave(1);
                Ok(Node::new(
                    Expr::Unary {
                        op,
                        operand: Box::new(operand),
                    },
                    pos,
                ))
            }
            None => self.parse_postfix(),
        }
    }

    fn parse_postfix(&mut self) -> Result<Node> {
        let mut node = self.parse_primary()?;
        let mut levels = 0;
        loop {
            match self.peek().kind {
                TokenKind::LBracket => {
                    self.advance();
                    self.enter()?;
                    levels += 1;
                    let index = self.parse_expression()?;
                    self.expect(TokenKind::RBracket, "']'")?;
                    let pos = node.pos;
                    node = Node::new(
                        Expr::Index {
                            target: Box::new(node),
                            index: Box::new(index),
                        },
                        pos,
                    );
                }
                TokenKind::Dot => {
                    self.advance();
                    self.enter()?;
                    levels += 1;
                    let (name, name_pos) = self.expect_ident("method name after '.'")?;
                    if self.peek().kind != TokenKind::LParen {
                        return Err(Error::compile("member access must be a call", name_pos));
                    }
                    let mut args = Vec::with_capacity(1);
                    let pos = node.pos;
                    args.push(node);
                    args.extend(self.parse_args()?);
                    node = Node::new(
                        Expr::Call {
                            callee: Callee::Name(name),
                            args,
                        },
                        pos,
                    );
                }
                _ => {
                    self.leave(levels);
                    return Ok(node);
                }
            }
        }
    }

    fn parse_args(&mut self) -> Result<Vec<Node>> {
        self.expect(TokenKind::LParen, "'('")?;
        let mut args = Vec::new();
        if self.eat(&TokenKind::RParen) {
            return Ok(args);
        }
        loop {
            args.push(self.parse_expression()?);
            if self.eat(&TokenKind::Comma) {
                continue;
            }
            self.expect(TokenKind::RParen, "',' or ')' in argument list")?;
            return Ok(args);
        }
    }

    fn parse_primary(&mut self) -> Result<Node> {
        let token = self.advance();
        let pos = token.pos;
        let expr = match token.kind {
            TokenKind::Int(v) => Expr::Literal(Value::Int64(v)),
            TokenKind::Float(v) => Expr::Literal(Value::Float64(v)),
            TokenKind::Str(s) => Expr::Literal(Value::String(s)),
            TokenKind::Pointer(p) => Expr::Pointer(match p.as_str() {
                "acc" => Pointer::Acc,
                "index" => Pointer::Index,
                _ => Pointer::Element,
            }),
            TokenKind::LParen => {
                let inner = self.parse_expression()?;
                self.expect(TokenKind::RParen, "')'")?;
                return Ok(inner);
            }
            TokenKind::LBracket => {
                let mut items = Vec::new();
                if !self.eat(&TokenKind::RBracket) {
                    loop {
                        items.push(self.parse_expression()?);
                        if self.eat(&TokenKind::Comma) {
                            // trailing comma
                            if self.eat(&TokenKind::RBracket) {
                                break;
                            }
                            continue;
                        }
                        self.expect(TokenKind::RBracket, "',' or ']' in list")?;
                        break;
                    }
                }
                Expr::List(items)
            }
            TokenKind::LBrace => {
                let body = self.parse_expression()?;
                self.expect(TokenKind::RBrace, "'}'")?;
                Expr::Closure(Box::new(body))
            }
            TokenKind::Ident(name) => match name.as_str() {
                "true" => Expr::Literal(Value::Boolean(true)),
                "false" => Expr::Literal(Value::Boolean(false)),
                "nil" | "null" => Expr::Literal(Value::Null),
                REGISTRY_NAME if self.peek().kind == TokenKind::Dot => {
                    self.advance();
                    let (fname, fpos) = self.expect_ident("function name after 'functions.'")?;
                    if self.peek().kind != TokenKind::LParen {
                        return Err(Error::compile("registry functions must be called", fpos));
                    }
                    let args = self.parse_args()?;
                    Expr::Call {
                        callee: Callee::Registry(fname),
                        args,
                    }
                }
                _ if is_reserved_word(&name) => {
                    return Err(Error::compile(format!("unexpected '{}'", name), pos))
                }
                _ if self.peek().kind == TokenKind::LParen => {
                    let args = self.parse_args()?;
                    Expr::Call {
                        callee: Callee::Name(name),
                        args,
                    }
                }
                _ => Expr::Ident(name),
            },
            TokenKind::Eof => return Err(Error::compile("unexpected end of expression", pos)),
            _ => return Err(Error::compile("unexpected token", pos)),
        };
        Ok(Node::new(expr, pos))
    }

    fn eat_keyword(&mut self, keyword: &str) -> bool {
        if self.is_keyword(keyword) {
            self.advance();
            true
        } else {
            false
        }
    }
}

fn binary(op: BinaryOp, left: Node, right: Node) -> Node {
    let pos = left.pos;
    Node::new(
        Expr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        },
        pos,
    )
}

fn is_reserved_word(name: &str) -> bool {
    matches!(
        name,
        "let" | "and" | "or" | "not" | "in" | "true" | "false" | "nil" | "null"
    )
}
