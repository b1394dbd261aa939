//! Expression trees and their evaluator
//!
//! An expression is the Excel-formula-like structure schema nodes use to
//! compute values: a JSON scalar is itself, a string with a register sigil is
//! a path lookup, and an array applies the operation named by its head to the
//! evaluated tail. Expressions are compiled from raw JSON once, at build
//! time, into an explicit tagged tree; malformed shapes are construction
//! errors rather than invocation surprises.

pub mod builtins;

use crate::error::{Error, Result};
use crate::registers::{Register, RegisterPath, Registers};
use serde_json::Value;
use std::fmt;

/// Nesting depth past which evaluation logs a diagnostic
const DEEP_NESTING_WARN: usize = 64;

/// A compiled expression tree
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A JSON value returned unchanged
    Literal(Value),
    /// A register path resolved against the environment
    Ref(RegisterPath),
    /// An operation applied to evaluated arguments
    Apply { op: OpRef, args: Vec<Expr> },
}

/// The operation selector at the head of an application
#[derive(Debug, Clone, PartialEq)]
pub enum OpRef {
    /// A built-in operator, looked up in the fixed vocabulary at evaluation
    Name(String),
    /// A plugin reachable through register 1
    Plugin(RegisterPath),
}

impl fmt::Display for OpRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OpRef::Name(name) => write!(f, "{}", name),
            OpRef::Plugin(path) => write!(f, "{}", path),
        }
    }
}

impl Expr {
    /// Compile a raw JSON expression tree.
    ///
    /// Strings carrying a register sigil become references; arrays become
    /// applications, except that a one-element array is the parenthesized
    /// inner expression (so `["$0.rec"]` is a lookup, not a call). Every
    /// other value is a literal. An empty array, a non-string operation
    /// selector, and a `$0` selector are schema errors.
    pub fn compile(value: &Value) -> Result<Expr> {
        match value {
            Value::String(text) if RegisterPath::is_reference(text) => {
                Ok(Expr::Ref(RegisterPath::parse(text)?))
            }
            Value::Array(items) => match items.as_slice() {
                [] => Err(Error::schema("expression must not be empty")),
                [inner] => Expr::compile(inner),
                [head, tail @ ..] => {
                    let op = compile_op(head)?;
                    let args = tail.iter().map(Expr::compile).collect::<Result<Vec<_>>>()?;
                    Ok(Expr::Apply { op, args })
                }
            },
            other => Ok(Expr::Literal(other.clone())),
        }
    }

    /// Evaluate this expression against an environment.
    ///
    /// Evaluation is strictly eager and depth-first, left to right across
    /// argument positions, so side-effecting plugins observe a deterministic
    /// call order.
    pub fn eval(&self, env: &Registers) -> Result<Value> {
        self.eval_at(env, 0)
    }

    fn eval_at(&self, env: &Registers, depth: usize) -> Result<Value> {
        if depth == DEEP_NESTING_WARN {
            log::warn!("expression nesting exceeds {} levels", DEEP_NESTING_WARN);
        }
        match self {
            Expr::Literal(value) => Ok(value.clone()),
            Expr::Ref(path) => env.resolve_path(path),
            Expr::Apply { op, args } => {
                let mut values = Vec::with_capacity(args.len());
                for arg in args {
                    values.push(arg.eval_at(env, depth + 1)?);
                }
                match op {
                    OpRef::Name(name) => builtins::apply(name, &values),
                    OpRef::Plugin(path) => {
                        let plugin = env.resolve_plugin(path)?;
                        plugin(&values).map_err(|cause| Error::Evaluation {
                            message: format!("plugin `{}` failed", path),
                            source: Some(cause),
                        })
                    }
                }
            }
        }
    }
}

/// Compile the head of an application into an operation selector
fn compile_op(head: &Value) -> Result<OpRef> {
    match head {
        Value::String(name) if RegisterPath::is_reference(name) => {
            let path = RegisterPath::parse(name)?;
            match path.register {
                Register::Plugins => Ok(OpRef::Plugin(path)),
                Register::Context => Err(Error::schema(format!(
                    "`{}` cannot be applied: operations come from built-ins or register 1",
                    path
                ))),
            }
        }
        Value::String(name) => Ok(OpRef::Name(name.clone())),
        other => Err(Error::schema(format!(
            "operation selector must be a string, got {}",
            other
        ))),
    }
}

/// Truthiness for `if` gates and logical operators: `null`, `false`, `0`,
/// `""`, `[]`, and `{}` are falsy; everything else is truthy.
pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(entries) => !entries.is_empty(),
    }
}
