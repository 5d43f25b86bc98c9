//! Expression AST definitions.

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use tabpipe_core::Value;

/// Binary operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinaryOp {
    // Comparison
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    // Logical
    And,
    Or,
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    // Membership
    In,
    NotIn,
}

impl BinaryOp {
    /// Returns the operator as written in source.
    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::In => "in",
            BinaryOp::NotIn => "not in",
        }
    }
}

/// Unary operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
    Neg,
    Plus,
}

/// Closure pointers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Pointer {
    /// `#`: the current element.
    Element,
    /// `#acc`: the accumulator inside `reduce`.
    Acc,
    /// `#index`: the index of the current element.
    Index,
}

/// Call target.
#[derive(Clone, Debug, PartialEq)]
pub enum Callee {
    /// `name(args)`: a builtin, or a registry function when no builtin has the name.
    Name(String),
    /// `functions.name(args)`: always a registry function.
    Registry(String),
}

impl Callee {
    /// Returns the called name.
    pub fn name(&self) -> &str {
        match self {
            Callee::Name(n) | Callee::Registry(n) => n,
        }
    }
}

/// Expression nodes.
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Literal(Value),
    Ident(String),
    Pointer(Pointer),
    List(Vec<Node>),
    Unary {
        op: UnaryOp,
        operand: Box<Node>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Node>,
        right: Box<Node>,
    },
    Conditional {
        cond: Box<Node>,
        then: Box<Node>,
        otherwise: Box<Node>,
    },
    Index {
        target: Box<Node>,
        index: Box<Node>,
    },
    /// Function call. `x.f(a)` is parsed as `f(x, a)`.
    Call {
        callee: Callee,
        args: Vec<Node>,
    },
    Let {
        name: String,
        value: Box<Node>,
        body: Box<Node>,
    },
    /// `{ body }`: an explicitly braced predicate argument.
    Closure(Box<Node>),
}

/// An expression and the byte offset where it starts in the source.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    pub expr: Expr,
    pub pos: usize,
}

impl Node {
    /// Creates a new node.
    pub fn new(expr: Expr, pos: usize) -> Self {
        Self { expr, pos }
    }

    /// Returns the body of a braced closure, or the node itself.
    pub fn closure_body(&self) -> &Node {
        match &self.expr {
            Expr::Closure(body) => body,
            _ => self,
        }
    }

    /// Visits child nodes in evaluation order.
    pub fn children(&self) -> Vec<&Node> {
        match &self.expr {
            Expr::Literal(_) | Expr::Ident(_) | Expr::Pointer(_) => Vec::new(),
            Expr::List(items) => items.iter().collect(),
            Expr::Unary { operand, .. } => alloc::vec![&**operand],
            Expr::Binary { left, right, .. } => alloc::vec![&**left, &**right],
            Expr::Conditional {
                cond,
                then,
                otherwise,
            } => alloc::vec![&**cond, &**then, &**otherwise],
            Expr::Index { target, index } => alloc::vec![&**target, &**index],
            Expr::Call { args, .. } => args.iter().collect(),
            Expr::Let { value, body, .. } => alloc::vec![&**value, &**body],
            Expr::Closure(body) => alloc::vec![&**body],
        }
    }

    /// Collects free identifier references in post-order: children before
    /// their parent, left to right, `let` value before body. Names bound by
    /// an enclosing `let` are not free and are skipped.
    pub fn free_identifiers(&self) -> Vec<String> {
        let mut out = Vec::new();
        let mut bound = Vec::new();
        collect_identifiers(self, &mut bound, &mut out);
        out
    }
}

fn collect_identifiers(node: &Node, bound: &mut Vec<String>, out: &mut Vec<String>) {
    match &node.expr {
        Expr::Ident(name) => {
            if !bound.iter().any(|b| b == name) {
                out.push(name.clone());
            }
        }
        Expr::Let { name, value, body } => {
            collect_identifiers(value, bound, out);
            bound.push(name.clone());
            collect_identifiers(body, bound, out);
            bound.pop();
        }
        _ => {
            for child in node.children() {
                collect_identifiers(child, bound, out);
            }
        }
    }
}
