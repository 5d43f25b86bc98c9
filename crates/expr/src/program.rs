//! Compiled expressions.

use crate::ast::{Callee, Expr, Node, Pointer};
use crate::builtins::Builtin;
use crate::env::Environment;
use crate::eval::Interpreter;
use crate::parser::parse;
use crate::REGISTRY_NAME;
use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use tabpipe_core::{Error, Result, Value};

/// A parsed and name-checked expression, ready to run against any
/// environment that binds the same names.
#[derive(Clone, Debug, PartialEq)]
pub struct Program {
    source: String,
    root: Node,
}

impl Program {
    /// Parses an expression without checking names.
    pub fn parse(source: &str) -> Result<Self> {
        Ok(Self {
            source: String::from(source),
            root: parse(source)?,
        })
    }

    /// Parses an expression and checks it against an environment: every
    /// free identifier must be bound, every called function must resolve,
    /// and builtin argument counts must match.
    pub fn compile(source: &str, env: &dyn Environment) -> Result<Self> {
        let program = Self::parse(source)?;
        program.check(env)?;
        Ok(program)
    }

    /// Runs the name checks of `compile` against another environment.
    pub fn check(&self, env: &dyn Environment) -> Result<()> {
        let mut checker = Checker {
            env,
            locals: Vec::new(),
            predicates: Vec::new(),
        };
        checker.check(&self.root)
    }

    /// Evaluates the program.
    pub fn run(&self, env: &dyn Environment) -> Result<Value> {
        Interpreter::new(env).eval(&self.root)
    }

    /// Returns the free identifiers in post-order. Names bound by `let` are
    /// excluded, and so is the registry name.
    pub fn identifiers(&self) -> Vec<String> {
        self.root
            .free_identifiers()
            .into_iter()
            .filter(|name| name != REGISTRY_NAME)
            .collect()
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Returns the root of the syntax tree.
    pub fn ast(&self) -> &Node {
        &self.root
    }
}

struct Checker<'e> {
    env: &'e dyn Environment,
    locals: Vec<String>,
    /// Enclosing predicate builtins, innermost last.
    predicates: Vec<Builtin>,
}

impl<'e> Checker<'e> {
    fn check(&mut self, node: &Node) -> Result<()> {
        match &node.expr {
            Expr::Ident(name) => {
                if name == REGISTRY_NAME {
                    return Err(Error::compile(
                        "functions can only be used as functions.name(...)",
                        node.pos,
                    ));
                }
                if !self.locals.iter().any(|l| l == name) && !self.env.contains(name) {
                    return Err(Error::compile(format!("unknown name {}", name), node.pos));
                }
                Ok(())
            }
            Expr::Pointer(p) => match (self.predicates.last(), p) {
                (None, _) => Err(Error::compile(
                    "pointer used outside of a predicate",
                    node.pos,
                )),
                (Some(b), Pointer::Acc) if *b != Builtin::Reduce => {
                    Err(Error::compile("#acc is only available in reduce", node.pos))
                }
                _ => Ok(()),
            },
            Expr::Let { name, value, body } => {
                self.check(value)?;
                self.locals.push(name.clone());
                let result = self.check(body);
                self.locals.pop();
                result
            }
            Expr::Closure(_) => Err(Error::compile(
                "closure used outside of a predicate argument",
                node.pos,
            )),
            Expr::Call { callee, args } => self.check_call(callee, args, node.pos),
            _ => {
                for child in node.children() {
                    self.check(child)?;
                }
                Ok(())
            }
        }
    }

    fn check_call(&mut self, callee: &Callee, args: &[Node], pos: usize) -> Result<()> {
        let builtin = match callee {
            Callee::Name(name) => Builtin::lookup(name),
            Callee::Registry(_) => None,
        };

        match builtin {
            Some(b) => {
                b.check_arity(args.len())
                    .map_err(|message| Error::compile(message, pos))?;
                for (i, arg) in args.iter().enumerate() {
                    if b.is_predicate() && i == 1 {
                        self.predicates.push(b);
                        let result = self.check(arg.closure_body());
                        self.predicates.pop();
                        result?;
                    } else {
                        self.check(arg)?;
                    }
                }
                Ok(())
            }
            None => {
                let name = callee.name();
                if !self.env.functions().contains(name) {
                    return Err(Error::compile(format!("unknown function {}", name), pos));
                }
                for arg in args {
                    self.check(arg)?;
                }
                Ok(())
            }
        }
    }
}
