//! Tree-walking evaluator.

use crate::ast::{BinaryOp, Callee, Expr, Node, Pointer, UnaryOp};
use crate::builtins::{self, Builtin};
use crate::env::Environment;
use crate::ops::{self, expect_list, truthy};
use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use tabpipe_core::{Error, Result, Value};

/// Pointer bindings of one predicate iteration.
struct Frame {
    element: Value,
    index: usize,
    acc: Option<Value>,
}

pub(crate) struct Interpreter<'e> {
    env: &'e dyn Environment,
    locals: Vec<(String, Value)>,
    frames: Vec<Frame>,
}

impl<'e> Interpreter<'e> {
    pub(crate) fn new(env: &'e dyn Environment) -> Self {
        Self {
            env,
            locals: Vec::new(),
            frames: Vec::new(),
        }
    }

    pub(crate) fn eval(&mut self, node: &Node) -> Result<Value> {
        match &node.expr {
            Expr::Literal(v) => Ok(v.clone()),
            Expr::Ident(name) => self.lookup(name),
            Expr::Pointer(p) => self.pointer(*p),
            Expr::List(items) => {
                let mut values = Vec::with_capacity(items.len());
                for item in items {
                    values.push(self.eval(item)?);
                }
                Ok(Value::List(values))
            }
            Expr::Unary { op, operand } => {
                let value = self.eval(operand)?;
                unary(*op, value)
            }
            Expr::Binary { op, left, right } => self.binary(*op, left, right),
            Expr::Conditional {
                cond,
                then,
                otherwise,
            } => {
                let c = self.eval(cond)?;
                if truthy(&c, "conditional")? {
                    self.eval(then)
                } else {
                    self.eval(otherwise)
                }
            }
            Expr::Index { target, index } => {
                let target = self.eval(target)?;
                let index = self.eval(index)?;
                index_value(target, &index)
            }
            Expr::Call { callee, args } => self.call(callee, args),
            Expr::Let { name, value, body } => {
                let value = self.eval(value)?;
                self.locals.push((name.clone(), value));
                let result = self.eval(body);
                self.locals.pop();
                result
            }
            Expr::Closure(_) => Err(Error::eval("closure used outside of a predicate")),
        }
    }

    fn lookup(&self, name: &str) -> Result<Value> {
        if let Some((_, v)) = self.locals.iter().rev().find(|(n, _)| n == name) {
            return Ok(v.clone());
        }
        self.env
            .resolve(name)
            .ok_or_else(|| Error::eval(format!("unknown name {}", name)))
    }

    fn pointer(&self, pointer: Pointer) -> Result<Value> {
        let frame = self
            .frames
            .last()
            .ok_or_else(|| Error::eval("pointer used outside of a predicate"))?;
        match pointer {
            Pointer::Element => Ok(frame.element.clone()),
            Pointer::Index => Ok(Value::Int64(frame.index as i64)),
            Pointer::Acc => frame
                .acc
                .clone()
                .ok_or_else(|| Error::eval("#acc used outside of reduce")),
        }
    }

    fn binary(&mut self, op: BinaryOp, left: &Node, right: &Node) -> Result<Value> {
        match op {
            BinaryOp::And | BinaryOp::Or => {
                let l = self.eval(left)?;
                let l = truthy(&l, op.symbol())?;
                // short-circuit
                if (op == BinaryOp::And) != l {
                    return Ok(Value::Boolean(l));
                }
                let r = self.eval(right)?;
                Ok(Value::Boolean(truthy(&r, op.symbol())?))
            }
            _ => {
                let l = self.eval(left)?;
                let r = self.eval(right)?;
                ops::binary(op, l, r)
            }
        }
    }

    fn call(&mut self, callee: &Callee, args: &[Node]) -> Result<Value> {
        if let Callee::Name(name) = callee {
            if let Some(builtin) = Builtin::lookup(name) {
                if builtin.is_predicate() {
                    return self.predicate(builtin, args);
                }
                let values = self.eval_args(args)?;
                return builtins::apply(builtin, &values);
            }
        }

        let name = callee.name();
        let f = self
            .env
            .functions()
            .get(name)
            .cloned()
            .ok_or_else(|| Error::eval(format!("unknown function {}", name)))?;
        let values = self.eval_args(args)?;
        f(&values).map_err(|e| {
            if e.is_expression_error() {
                e
            } else {
                Error::eval(format!("{}: {}", name, e))
            }
        })
    }

    fn eval_args(&mut self, args: &[Node]) -> Result<Vec<Value>> {
        let mut values = Vec::with_capacity(args.len());
        for arg in args {
            values.push(self.eval(arg)?);
        }
        Ok(values)
    }

    fn predicate(&mut self, builtin: Builtin, args: &[Node]) -> Result<Value> {
        builtin.check_arity(args.len()).map_err(Error::eval)?;
        let name = builtin.name();
        let list = self.eval(&args[0])?;
        let items = expect_list(&list, name)?;
        let body = args[1].closure_body();

        match builtin {
            Builtin::Map => {
                let mut out = Vec::with_capacity(items.len());
                for (i, item) in items.iter().enumerate() {
                    out.push(self.iterate(body, item, i, None)?);
                }
                Ok(Value::List(out))
            }
            Builtin::Filter => {
                let mut out = Vec::new();
                for (i, item) in items.iter().enumerate() {
                    if self.test(body, item, i, name)? {
                        out.push(item.clone());
                    }
                }
                Ok(Value::List(out))
            }
            Builtin::All => {
                for (i, item) in items.iter().enumerate() {
                    if !self.test(body, item, i, name)? {
                        return Ok(Value::Boolean(false));
                    }
                }
                Ok(Value::Boolean(true))
            }
            Builtin::Any | Builtin::None => {
                let mut found = false;
                for (i, item) in items.iter().enumerate() {
                    if self.test(body, item, i, name)? {
                        found = true;
                        break;
                    }
                }
                Ok(Value::Boolean(found == (builtin == Builtin::Any)))
            }
            Builtin::Count => {
                let mut n = 0i64;
                for (i, item) in items.iter().enumerate() {
                    if self.test(body, item, i, name)? {
                        n += 1;
                    }
                }
                Ok(Value::Int64(n))
            }
            Builtin::Reduce => {
                let (mut acc, start) = match args.get(2) {
                    Some(initial) => (self.eval(initial)?, 0),
                    None => match items.first() {
                        Some(first) => (first.clone(), 1),
                        None => {
                            return Err(Error::eval("reduce of empty list with no initial value"))
                        }
                    },
                };
                for (i, item) in items.iter().enumerate().skip(start) {
                    acc = self.iterate(body, item, i, Some(acc))?;
                }
                Ok(acc)
            }
            _ => Err(Error::eval(format!("{} is not a predicate builtin", name))),
        }
    }

    fn iterate(
        &mut self,
        body: &Node,
        element: &Value,
        index: usize,
        acc: Option<Value>,
    ) -> Result<Value> {
        self.frames.push(Frame {
            element: element.clone(),
            index,
            acc,
        });
        let result = self.eval(body);
        self.frames.pop();
        result
    }

    fn test(&mut self, body: &Node, element: &Value, index: usize, name: &str) -> Result<bool> {
        let v = self.iterate(body, element, index, None)?;
        truthy(&v, name)
    }
}

fn unary(op: UnaryOp, value: Value) -> Result<Value> {
    match (op, &value) {
        (UnaryOp::Not, Value::Boolean(b)) => Ok(Value::Boolean(!b)),
        (UnaryOp::Neg, Value::Int64(v)) => v
            .checked_neg()
            .map(Value::Int64)
            .ok_or_else(|| Error::eval("integer overflow in negation")),
        (UnaryOp::Neg, Value::Float64(v)) => Ok(Value::Float64(-v)),
        (UnaryOp::Plus, Value::Int64(_)) | (UnaryOp::Plus, Value::Float64(_)) => Ok(value.clone()),
        _ => Err(Error::eval(format!(
            "unary operator not defined on {}",
            value.type_name()
        ))),
    }
}

fn index_value(target: Value, index: &Value) -> Result<Value> {
    let i = index
        .as_i64()
        .ok_or_else(|| Error::eval(format!("index must be an int, got {}", index.type_name())))?;
    let resolve = |len: usize| -> Result<usize> {
        let pos = if i < 0 { len as i64 + i } else { i };
        if pos < 0 || pos as usize >= len {
            return Err(Error::eval(format!("index {} out of range (len {})", i, len)));
        }
        Ok(pos as usize)
    };
    match target {
        Value::List(mut items) => {
            let pos = resolve(items.len())?;
            Ok(items.swap_remove(pos))
        }
        Value::String(s) => {
            let chars: Vec<char> = s.chars().collect();
            let pos = resolve(chars.len())?;
            Ok(Value::String(String::from(chars[pos])))
        }
        other => Err(Error::eval(format!("cannot index {}", other.type_name()))),
    }
}
