//! Built-in operator vocabulary
//!
//! The fixed operation set expressions can apply without any plugin:
//!
//! - comparison: `eq`, `ne` (deep equality, numeric values compared by
//!   value), `lt`, `le`, `gt`, `ge` (two numbers or two strings)
//! - arithmetic: `add`, `sub`, `mul`, `mod` (integer when both operands are
//!   integers, float otherwise), `div` (always float), `neg`
//! - logic: `and`, `or` (variadic, truthiness in, JSON bool out), `not`
//! - branch: `if` (exactly three arguments; evaluation is eager, the
//!   untaken branch has already been evaluated)
//! - string: `concat` (variadic, all-strings or all-arrays), `str`,
//!   `upper`, `lower`
//! - collection: `getitem`, `len`, `keys`, `contains`, `range`
//!
//! Operators never coerce beyond what is documented here; an argument of the
//! wrong type or count is an evaluation error.

use crate::error::{Error, Result};
use crate::expr::truthy;
use serde_json::{Number, Value};
use std::cmp::Ordering;

/// Apply a built-in operator to evaluated argument values
pub fn apply(name: &str, args: &[Value]) -> Result<Value> {
    match name {
        "eq" => binary(name, args).map(|(a, b)| Value::Bool(values_equal(a, b))),
        "ne" => binary(name, args).map(|(a, b)| Value::Bool(!values_equal(a, b))),
        "lt" => compare(name, args, Ordering::is_lt),
        "le" => compare(name, args, Ordering::is_le),
        "gt" => compare(name, args, Ordering::is_gt),
        "ge" => compare(name, args, Ordering::is_ge),

        "add" => arith(name, args, i64::checked_add, |a, b| a + b),
        "sub" => arith(name, args, i64::checked_sub, |a, b| a - b),
        "mul" => arith(name, args, i64::checked_mul, |a, b| a * b),
        "mod" => modulo(name, args),
        "div" => divide(name, args),
        "neg" => negate(name, args),

        "and" => variadic(name, args).map(|values| Value::Bool(values.iter().all(truthy))),
        "or" => variadic(name, args).map(|values| Value::Bool(values.iter().any(truthy))),
        "not" => {
            arity(name, args, 1)?;
            Ok(Value::Bool(!truthy(&args[0])))
        }
        "if" => {
            arity(name, args, 3)?;
            let branch = if truthy(&args[0]) { &args[1] } else { &args[2] };
            Ok(branch.clone())
        }

        "concat" => concat(name, args),
        "str" => {
            arity(name, args, 1)?;
            Ok(Value::String(stringify(&args[0])))
        }
        "upper" => text(name, args).map(|s| Value::String(s.to_uppercase())),
        "lower" => text(name, args).map(|s| Value::String(s.to_lowercase())),

        "getitem" => getitem(name, args),
        "len" => length(name, args),
        "keys" => keys(name, args),
        "contains" => contains(name, args),
        "range" => range(name, args),

        _ => Err(Error::UnknownOperation {
            name: name.to_string(),
        }),
    }
}

/// Equality with numeric values compared by value, so `1` equals `1.0`
fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        _ => a == b,
    }
}

fn arity(op: &str, args: &[Value], expected: usize) -> Result<()> {
    if args.len() == expected {
        Ok(())
    } else {
        Err(Error::evaluation(format!(
            "`{}` expects {} argument(s), got {}",
            op,
            expected,
            args.len()
        )))
    }
}

fn binary<'a>(op: &str, args: &'a [Value]) -> Result<(&'a Value, &'a Value)> {
    arity(op, args, 2)?;
    Ok((&args[0], &args[1]))
}

fn variadic<'a>(op: &str, args: &'a [Value]) -> Result<&'a [Value]> {
    if args.len() < 2 {
        return Err(Error::evaluation(format!(
            "`{}` expects at least 2 arguments, got {}",
            op,
            args.len()
        )));
    }
    Ok(args)
}

fn text<'a>(op: &str, args: &'a [Value]) -> Result<&'a str> {
    arity(op, args, 1)?;
    args[0]
        .as_str()
        .ok_or_else(|| Error::evaluation(format!("`{}` expects a string, got {}", op, args[0])))
}

/// A JSON number, integer-preserving
enum Num {
    Int(i64),
    Float(f64),
}

fn number(op: &str, value: &Value) -> Result<Num> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Num::Int(i))
            } else if let Some(f) = n.as_f64() {
                Ok(Num::Float(f))
            } else {
                Err(Error::evaluation(format!(
                    "`{}` cannot represent {} as a number",
                    op, n
                )))
            }
        }
        other => Err(Error::evaluation(format!(
            "`{}` expects a number, got {}",
            op, other
        ))),
    }
}

fn float_value(op: &str, result: f64) -> Result<Value> {
    Number::from_f64(result)
        .map(Value::Number)
        .ok_or_else(|| Error::evaluation(format!("`{}` produced a non-finite number", op)))
}

/// Integer arithmetic when both operands are integers, float otherwise
fn arith(
    op: &str,
    args: &[Value],
    int_op: fn(i64, i64) -> Option<i64>,
    float_op: fn(f64, f64) -> f64,
) -> Result<Value> {
    let (a, b) = binary(op, args)?;
    match (number(op, a)?, number(op, b)?) {
        (Num::Int(x), Num::Int(y)) => int_op(x, y)
            .map(Value::from)
            .ok_or_else(|| Error::evaluation(format!("`{}` overflowed on {} and {}", op, x, y))),
        (x, y) => float_value(op, float_op(as_f64(x), as_f64(y))),
    }
}

fn as_f64(num: Num) -> f64 {
    match num {
        Num::Int(i) => i as f64,
        Num::Float(f) => f,
    }
}

fn divide(op: &str, args: &[Value]) -> Result<Value> {
    let (a, b) = binary(op, args)?;
    let denominator = as_f64(number(op, b)?);
    if denominator == 0.0 {
        return Err(Error::evaluation("`div` by zero"));
    }
    float_value(op, as_f64(number(op, a)?) / denominator)
}

fn modulo(op: &str, args: &[Value]) -> Result<Value> {
    let (a, b) = binary(op, args)?;
    match (number(op, a)?, number(op, b)?) {
        (Num::Int(_), Num::Int(0)) => Err(Error::evaluation("`mod` by zero")),
        (Num::Int(x), Num::Int(y)) => x
            .checked_rem(y)
            .map(Value::from)
            .ok_or_else(|| Error::evaluation(format!("`{}` overflowed on {} and {}", op, x, y))),
        (x, y) => {
            let denominator = as_f64(y);
            if denominator == 0.0 {
                return Err(Error::evaluation("`mod` by zero"));
            }
            float_value(op, as_f64(x) % denominator)
        }
    }
}

fn negate(op: &str, args: &[Value]) -> Result<Value> {
    arity(op, args, 1)?;
    match number(op, &args[0])? {
        Num::Int(i) => i
            .checked_neg()
            .map(Value::from)
            .ok_or_else(|| Error::evaluation(format!("`{}` overflowed on {}", op, i))),
        Num::Float(f) => float_value(op, -f),
    }
}

/// Ordering on two numbers or two strings
fn compare(op: &str, args: &[Value], test: fn(Ordering) -> bool) -> Result<Value> {
    let (a, b) = binary(op, args)?;
    let ordering = match (a, b) {
        (Value::Number(_), Value::Number(_)) => {
            let x = as_f64(number(op, a)?);
            let y = as_f64(number(op, b)?);
            x.partial_cmp(&y).ok_or_else(|| {
                Error::evaluation(format!("`{}` cannot order {} and {}", op, a, b))
            })?
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        _ => {
            return Err(Error::evaluation(format!(
                "`{}` expects two numbers or two strings, got {} and {}",
                op, a, b
            )))
        }
    };
    Ok(Value::Bool(test(ordering)))
}

/// Variadic concatenation of all-strings or all-arrays
fn concat(op: &str, args: &[Value]) -> Result<Value> {
    let values = variadic(op, args)?;
    match &values[0] {
        Value::String(_) => {
            let mut out = String::new();
            for value in values {
                out.push_str(value.as_str().ok_or_else(|| {
                    Error::evaluation(format!("`{}` expects all strings, got {}", op, value))
                })?);
            }
            Ok(Value::String(out))
        }
        Value::Array(_) => {
            let mut out = Vec::new();
            for value in values {
                out.extend_from_slice(value.as_array().ok_or_else(|| {
                    Error::evaluation(format!("`{}` expects all arrays, got {}", op, value))
                })?);
            }
            Ok(Value::Array(out))
        }
        other => Err(Error::evaluation(format!(
            "`{}` works on strings or arrays, got {}",
            op, other
        ))),
    }
}

/// Scalars stringify verbatim, composites as compact JSON
fn stringify(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => "null".to_string(),
        Value::Bool(flag) => flag.to_string(),
        Value::Number(number) => number.to_string(),
        composite => composite.to_string(),
    }
}

fn getitem(op: &str, args: &[Value]) -> Result<Value> {
    let (container, key) = binary(op, args)?;
    match (container, key) {
        (Value::Object(entries), Value::String(name)) => entries
            .get(name)
            .cloned()
            .ok_or_else(|| Error::evaluation(format!("`{}`: no key `{}`", op, name))),
        (Value::Array(items), Value::Number(_)) => {
            let index = signed_index(op, key, items.len())?;
            items
                .get(index)
                .cloned()
                .ok_or_else(|| {
                    Error::evaluation(format!(
                        "`{}`: index {} out of bounds for length {}",
                        op,
                        key,
                        items.len()
                    ))
                })
        }
        (Value::String(text), Value::Number(_)) => {
            let chars: Vec<char> = text.chars().collect();
            let index = signed_index(op, key, chars.len())?;
            chars
                .get(index)
                .map(|ch| Value::String(ch.to_string()))
                .ok_or_else(|| {
                    Error::evaluation(format!(
                        "`{}`: index {} out of bounds for length {}",
                        op,
                        key,
                        chars.len()
                    ))
                })
        }
        _ => Err(Error::evaluation(format!(
            "`{}` expects object+key, array+index, or string+index, got {} and {}",
            op, container, key
        ))),
    }
}

/// Negative indices count from the end
fn signed_index(op: &str, key: &Value, len: usize) -> Result<usize> {
    let raw = key
        .as_i64()
        .ok_or_else(|| Error::evaluation(format!("`{}` expects an integer index, got {}", op, key)))?;
    let resolved = if raw < 0 { raw + len as i64 } else { raw };
    usize::try_from(resolved).map_err(|_| {
        Error::evaluation(format!(
            "`{}`: index {} out of bounds for length {}",
            op, raw, len
        ))
    })
}

fn length(op: &str, args: &[Value]) -> Result<Value> {
    arity(op, args, 1)?;
    let len = match &args[0] {
        Value::String(text) => text.chars().count(),
        Value::Array(items) => items.len(),
        Value::Object(entries) => entries.len(),
        other => {
            return Err(Error::evaluation(format!(
                "`{}` expects a string, array, or object, got {}",
                op, other
            )))
        }
    };
    Ok(Value::from(len))
}

fn keys(op: &str, args: &[Value]) -> Result<Value> {
    arity(op, args, 1)?;
    match &args[0] {
        Value::Object(entries) => Ok(Value::Array(
            entries.keys().map(|key| Value::String(key.clone())).collect(),
        )),
        other => Err(Error::evaluation(format!(
            "`{}` expects an object, got {}",
            op, other
        ))),
    }
}

fn contains(op: &str, args: &[Value]) -> Result<Value> {
    let (haystack, needle) = binary(op, args)?;
    let found = match (haystack, needle) {
        (Value::String(text), Value::String(sub)) => text.contains(sub.as_str()),
        (Value::Array(items), _) => items.iter().any(|item| values_equal(item, needle)),
        (Value::Object(entries), Value::String(key)) => entries.contains_key(key),
        _ => {
            return Err(Error::evaluation(format!(
                "`{}` expects string+string, array+value, or object+key, got {} and {}",
                op, haystack, needle
            )))
        }
    };
    Ok(Value::Bool(found))
}

/// `range(end)` or `range(start, end)`, half-open over integers
fn range(op: &str, args: &[Value]) -> Result<Value> {
    let (start, end) = match args.len() {
        1 => (0, integer(op, &args[0])?),
        2 => (integer(op, &args[0])?, integer(op, &args[1])?),
        n => {
            return Err(Error::evaluation(format!(
                "`{}` expects 1 or 2 arguments, got {}",
                op, n
            )))
        }
    };
    Ok(Value::Array((start..end).map(Value::from).collect()))
}

fn integer(op: &str, value: &Value) -> Result<i64> {
    value
        .as_i64()
        .ok_or_else(|| Error::evaluation(format!("`{}` expects an integer, got {}", op, value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn call(name: &str, args: &[Value]) -> Result<Value> {
        apply(name, args)
    }

    #[test]
    fn test_comparisons() {
        assert_eq!(call("lt", &[json!(10), json!(11)]).unwrap(), json!(true));
        assert_eq!(call("ge", &[json!(2), json!(2)]).unwrap(), json!(true));
        assert_eq!(call("lt", &[json!("a"), json!("b")]).unwrap(), json!(true));
        assert_eq!(call("eq", &[json!(1), json!(1.0)]).unwrap(), json!(true));
        assert_eq!(
            call("ne", &[json!({"a": 1}), json!({"a": 2})]).unwrap(),
            json!(true)
        );
        assert!(call("lt", &[json!(1), json!("a")]).is_err());
    }

    #[test]
    fn test_arithmetic_preserves_integers() {
        assert_eq!(call("add", &[json!(2), json!(3)]).unwrap(), json!(5));
        assert_eq!(call("mul", &[json!(2), json!(2.5)]).unwrap(), json!(5.0));
        assert_eq!(call("sub", &[json!(1), json!(3)]).unwrap(), json!(-2));
        assert_eq!(call("mod", &[json!(7), json!(3)]).unwrap(), json!(1));
        assert_eq!(call("neg", &[json!(4)]).unwrap(), json!(-4));
    }

    #[test]
    fn test_div_is_float() {
        assert_eq!(call("div", &[json!(7), json!(2)]).unwrap(), json!(3.5));
        assert!(call("div", &[json!(1), json!(0)]).is_err());
        assert!(call("mod", &[json!(1), json!(0)]).is_err());
    }

    #[test]
    fn test_overflow_is_an_error() {
        let err = call("add", &[json!(i64::MAX), json!(1)]).unwrap_err();
        assert!(matches!(err, Error::Evaluation { .. }));
    }

    #[test]
    fn test_logic() {
        assert_eq!(call("and", &[json!(1), json!("x")]).unwrap(), json!(true));
        assert_eq!(call("and", &[json!(1), json!("")]).unwrap(), json!(false));
        assert_eq!(call("or", &[json!(0), json!([])]).unwrap(), json!(false));
        assert_eq!(call("or", &[json!(0), json!(2), json!(0)]).unwrap(), json!(true));
        assert_eq!(call("not", &[json!(null)]).unwrap(), json!(true));
    }

    #[test]
    fn test_ternary() {
        assert_eq!(
            call("if", &[json!(true), json!("left"), json!("right")]).unwrap(),
            json!("left")
        );
        assert_eq!(
            call("if", &[json!(0), json!("left"), json!("right")]).unwrap(),
            json!("right")
        );
        assert!(call("if", &[json!(true), json!(1)]).is_err());
    }

    #[test]
    fn test_strings() {
        assert_eq!(
            call("concat", &[json!("id_"), json!("0")]).unwrap(),
            json!("id_0")
        );
        assert_eq!(
            call("concat", &[json!([1]), json!([2, 3])]).unwrap(),
            json!([1, 2, 3])
        );
        assert!(call("concat", &[json!("a"), json!(1)]).is_err());
        assert_eq!(call("str", &[json!(12)]).unwrap(), json!("12"));
        assert_eq!(call("str", &[json!("x")]).unwrap(), json!("x"));
        assert_eq!(call("str", &[json!([1, 2])]).unwrap(), json!("[1,2]"));
        assert_eq!(call("upper", &[json!("ab")]).unwrap(), json!("AB"));
        assert_eq!(call("lower", &[json!("AB")]).unwrap(), json!("ab"));
    }

    #[test]
    fn test_getitem() {
        assert_eq!(
            call("getitem", &[json!({"a": 1}), json!("a")]).unwrap(),
            json!(1)
        );
        assert_eq!(
            call("getitem", &[json!([10, 20]), json!(1)]).unwrap(),
            json!(20)
        );
        assert_eq!(
            call("getitem", &[json!([10, 20]), json!(-1)]).unwrap(),
            json!(20)
        );
        assert_eq!(
            call("getitem", &[json!("abc"), json!(0)]).unwrap(),
            json!("a")
        );
        assert!(call("getitem", &[json!({"a": 1}), json!("b")]).is_err());
        assert!(call("getitem", &[json!([1]), json!(5)]).is_err());
    }

    #[test]
    fn test_collections() {
        assert_eq!(call("len", &[json!("abc")]).unwrap(), json!(3));
        assert_eq!(call("len", &[json!([1, 2])]).unwrap(), json!(2));
        assert_eq!(call("keys", &[json!({"a": 1, "b": 2})]).unwrap(), json!(["a", "b"]));
        assert_eq!(
            call("contains", &[json!([1, 2]), json!(2.0)]).unwrap(),
            json!(true)
        );
        assert_eq!(
            call("contains", &[json!("hello"), json!("ell")]).unwrap(),
            json!(true)
        );
        assert_eq!(
            call("contains", &[json!({"a": 1}), json!("b")]).unwrap(),
            json!(false)
        );
    }

    #[test]
    fn test_range() {
        assert_eq!(call("range", &[json!(3)]).unwrap(), json!([0, 1, 2]));
        assert_eq!(call("range", &[json!(1), json!(3)]).unwrap(), json!([1, 2]));
        assert_eq!(call("range", &[json!(3), json!(1)]).unwrap(), json!([]));
    }

    #[test]
    fn test_unknown_operation() {
        let err = call("frobnicate", &[]).unwrap_err();
        assert!(matches!(err, Error::UnknownOperation { .. }));
    }
}
