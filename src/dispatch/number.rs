//! Integer and float arithmetic.
//!
//! Integer division and modulo floor toward negative infinity, so that
//! `-7 / 2` is `-4` and `-7 % 2` is `1`. Mixing an integer with a float
//! produces a float.
use snafu::location;

use crate::{
    dispatch::{arg_values, check_args, compare_op, ret, Arity},
    s_read, ChainError, ChainFloat, ChainInteger, RefType, Result, Value,
};

use Arity::*;

pub(super) const INTEGER_METHODS: &[(&str, Arity)] = &[
    ("<", Variadic),
    ("<=", Variadic),
    (">", Variadic),
    (">=", Variadic),
    ("+", Variadic),
    ("-", Variadic),
    ("*", Variadic),
    ("/", Variadic),
    ("%", Variadic),
    ("abs", Nullary),
    ("zero?", Nullary),
    ("to_i", Nullary),
    ("to_f", Nullary),
    ("succ", Nullary),
    ("pred", Nullary),
    ("even?", Nullary),
    ("odd?", Nullary),
];

pub(super) const FLOAT_METHODS: &[(&str, Arity)] = &[
    ("<", Variadic),
    ("<=", Variadic),
    (">", Variadic),
    (">=", Variadic),
    ("+", Variadic),
    ("-", Variadic),
    ("*", Variadic),
    ("/", Variadic),
    ("%", Variadic),
    ("abs", Nullary),
    ("zero?", Nullary),
    ("to_i", Nullary),
    ("to_f", Nullary),
    ("round", Nullary),
    ("floor", Nullary),
    ("ceil", Nullary),
];

pub(super) fn send(
    receiver: &RefType<Value>,
    method: &str,
    args: &[RefType<Value>],
) -> Result<RefType<Value>> {
    let args = arg_values(args);
    let this = s_read!(receiver).clone();

    match method {
        "<" | "<=" | ">" | ">=" => {
            check_args(method, &args, 1, 1)?;
            ret(compare_op(&this, method, &args[0])?)
        }
        "+" | "-" | "*" | "/" | "%" => {
            check_args(method, &args, 1, 1)?;
            ret(arithmetic(&this, method, &args[0])?)
        }
        _ => match this {
            Value::Integer(num) => integer(num, method),
            Value::Float(num) => float(num, method),
            _ => Err(super::no_such_method(&this, method)),
        },
    }
}

fn integer(num: ChainInteger, method: &str) -> Result<RefType<Value>> {
    let checked = |result: Option<ChainInteger>| {
        result.ok_or_else(|| overflow(format!("{num}.{method}")))
    };

    match method {
        "abs" => ret(checked(num.checked_abs())?),
        "zero?" => ret(num == 0),
        "to_i" => ret(num),
        "to_f" => ret(num as ChainFloat),
        "succ" => ret(checked(num.checked_add(1))?),
        "pred" => ret(checked(num.checked_sub(1))?),
        "even?" => ret(num % 2 == 0),
        "odd?" => ret(num % 2 != 0),
        _ => Err(super::no_such_method(&Value::Integer(num), method)),
    }
}

fn float(num: ChainFloat, method: &str) -> Result<RefType<Value>> {
    match method {
        "abs" => ret(num.abs()),
        "zero?" => ret(num == 0.0),
        "to_i" | "round" | "floor" | "ceil" => {
            let rounded = match method {
                "round" => num.round(),
                "floor" => num.floor(),
                "ceil" => num.ceil(),
                _ => num.trunc(),
            };
            let value = Value::Float(rounded);
            ret(ChainInteger::try_from(&value)?)
        }
        "to_f" => ret(num),
        _ => Err(super::no_such_method(&Value::Float(num), method)),
    }
}

fn arithmetic(lhs: &Value, op: &str, rhs: &Value) -> Result<Value> {
    match (lhs, rhs) {
        (Value::Integer(a), Value::Integer(b)) => integer_op(*a, op, *b),
        (Value::Integer(_), Value::Float(_))
        | (Value::Float(_), Value::Integer(_))
        | (Value::Float(_), Value::Float(_)) => {
            let a = ChainFloat::try_from(lhs)?;
            let b = ChainFloat::try_from(rhs)?;
            Ok(Value::Float(float_op(a, op, b)))
        }
        _ => Err(ChainError::Conversion {
            src: rhs.inspect(),
            dst: lhs.kind().to_string(),
        }),
    }
}

fn integer_op(a: ChainInteger, op: &str, b: ChainInteger) -> Result<Value> {
    let result = match op {
        "+" => a.checked_add(b),
        "-" => a.checked_sub(b),
        "*" => a.checked_mul(b),
        "/" | "%" if b == 0 => {
            return Err(ChainError::DivideByZero {
                location: location!(),
            })
        }
        // Floored, so the remainder takes the sign of the divisor.
        "/" => a.checked_div(b).map(|quotient| {
            if a % b != 0 && ((a < 0) != (b < 0)) {
                quotient - 1
            } else {
                quotient
            }
        }),
        "%" => {
            let remainder = a.wrapping_rem(b);
            Some(if remainder != 0 && ((remainder < 0) != (b < 0)) {
                remainder + b
            } else {
                remainder
            })
        }
        _ => unreachable!(),
    };

    result
        .map(Value::Integer)
        .ok_or_else(|| overflow(format!("{a} {op} {b}")))
}

fn overflow(operation: String) -> ChainError {
    ChainError::Overflow {
        operation,
        location: location!(),
    }
}

fn float_op(a: ChainFloat, op: &str, b: ChainFloat) -> ChainFloat {
    match op {
        "+" => a + b,
        "-" => a - b,
        "*" => a * b,
        "/" => a / b,
        "%" => a - b * (a / b).floor(),
        _ => unreachable!(),
    }
}
