//! `nil`, booleans and kinds.
use crate::{
    dispatch::{arg_values, check_args, ret, truthy, Arity},
    s_read, RefType, Result, Value,
};

use Arity::*;

pub(super) const EMPTY_METHODS: &[(&str, Arity)] = &[("to_a", Nullary), ("to_i", Nullary)];

pub(super) const BOOLEAN_METHODS: &[(&str, Arity)] =
    &[("&", Variadic), ("|", Variadic), ("^", Variadic)];

pub(super) const KIND_METHODS: &[(&str, Arity)] = &[("name", Nullary), ("superclass", Nullary)];

pub(super) fn send(
    receiver: &RefType<Value>,
    method: &str,
    args: &[RefType<Value>],
) -> Result<RefType<Value>> {
    let args = arg_values(args);
    let this = s_read!(receiver).clone();

    match (&this, method) {
        (Value::Empty, "to_a") => ret(Vec::<Value>::new()),
        (Value::Empty, "to_i") => ret(0),
        (Value::Boolean(bool_), "&" | "|" | "^") => {
            check_args(method, &args, 1, 1)?;
            let other = truthy(&args[0]);
            ret(match method {
                "&" => *bool_ && other,
                "|" => *bool_ || other,
                _ => *bool_ ^ other,
            })
        }
        (Value::Kind(kind), "name") => ret(kind.name()),
        (Value::Kind(kind), "superclass") => ret(kind.superkind()),
        _ => Err(super::no_such_method(&this, method)),
    }
}
