//! Methods every value has.
use std::{cmp::Ordering, sync::Arc};

use crate::{
    dispatch::{arg_values, check_args, ret, Arity},
    keywords::CHAINED,
    s_read, Kind, RefType, Result, Value,
};

use Arity::*;

pub(super) const METHODS: &[(&str, Arity)] = &[
    ("==", Variadic),
    ("!=", Variadic),
    ("eql?", Variadic),
    ("equal?", Variadic),
    ("<=>", Variadic),
    ("class", Nullary),
    ("inspect", Nullary),
    ("to_s", Nullary),
    ("instance_of?", Variadic),
    ("is_a?", Variadic),
    ("kind_of?", Variadic),
    ("nil?", Nullary),
    (CHAINED, Nullary),
    ("dup", Nullary),
    ("respond_to?", Variadic),
];

pub(super) fn send(
    receiver: &RefType<Value>,
    method: &str,
    args: &[RefType<Value>],
) -> Result<RefType<Value>> {
    if method == "equal?" {
        check_args(method, args, 1, 1)?;
        return ret(Arc::ptr_eq(receiver, &args[0]));
    }

    let args = arg_values(args);
    let this = s_read!(receiver);

    match method {
        "==" => {
            check_args(method, &args, 1, 1)?;
            ret(*this == args[0])
        }
        "!=" => {
            check_args(method, &args, 1, 1)?;
            ret(*this != args[0])
        }
        "eql?" => {
            check_args(method, &args, 1, 1)?;
            ret(this.eql(&args[0]))
        }
        "<=>" => {
            check_args(method, &args, 1, 1)?;
            ret(match this.compare(&args[0]) {
                Some(Ordering::Less) => Value::Integer(-1),
                Some(Ordering::Equal) => Value::Integer(0),
                Some(Ordering::Greater) => Value::Integer(1),
                None => Value::Empty,
            })
        }
        "class" => ret(this.kind()),
        "inspect" => ret(this.inspect()),
        "to_s" => ret(this.to_string()),
        "instance_of?" => {
            check_args(method, &args, 1, 1)?;
            let kind = Kind::try_from(&args[0])?;
            ret(this.kind() == kind)
        }
        "is_a?" | "kind_of?" => {
            check_args(method, &args, 1, 1)?;
            let kind = Kind::try_from(&args[0])?;
            ret(this.kind().is_a(kind))
        }
        "nil?" => ret(this.is_empty_value()),
        CHAINED => ret(false),
        "dup" => ret(this.clone()),
        "respond_to?" => {
            check_args(method, &args, 1, 1)?;
            let name = String::try_from(&args[0])?;
            ret(this.responds_to(&name))
        }
        _ => Err(super::no_such_method(&this, method)),
    }
}
