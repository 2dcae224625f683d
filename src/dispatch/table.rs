//! Table methods
use snafu::location;

use crate::{
    dispatch::{arg_values, check_args, dig, integer_arg, ret, Arity},
    keywords::{INDEX, INDEX_SET},
    new_ref, s_read, s_write, ChainError, Key, RefType, Result, Table, Value,
};

use Arity::*;

pub(super) const METHODS: &[(&str, Arity)] = &[
    (INDEX, Variadic),
    (INDEX_SET, Variadic),
    ("store", Variadic),
    ("fetch", Variadic),
    ("dig", Variadic),
    ("key?", Variadic),
    ("has_key?", Variadic),
    ("include?", Variadic),
    ("member?", Variadic),
    ("keys", Nullary),
    ("values", Nullary),
    ("size", Nullary),
    ("length", Nullary),
    ("empty?", Nullary),
    ("delete", Variadic),
    ("merge", Variadic),
    ("update", Variadic),
    ("merge!", Variadic),
    ("to_a", Nullary),
    ("first", Variadic),
    ("clear", Nullary),
];

pub(super) fn send(
    receiver: &RefType<Value>,
    method: &str,
    args: &[RefType<Value>],
) -> Result<RefType<Value>> {
    match method {
        INDEX_SET | "store" => {
            check_args(method, args, 2, 2)?;
            let key = Key::try_from(&*s_read!(args[0]))?;
            let mut this = s_write!(receiver);
            entries_mut(&mut this)?.insert(key, args[1].clone());
            Ok(args[1].clone())
        }
        "delete" => {
            check_args(method, args, 1, 1)?;
            let key = Key::try_from(&*s_read!(args[0])).ok();
            let mut this = s_write!(receiver);
            let table = entries_mut(&mut this)?;
            Ok(key.and_then(|k| table.remove(&k)).unwrap_or_else(nil))
        }
        "update" | "merge!" => {
            let mut others = Vec::new();
            for arg in args {
                others.push(table_arg(&s_read!(arg))?);
            }
            let mut this = s_write!(receiver);
            let table = entries_mut(&mut this)?;
            for other in others {
                for (k, v) in other.iter() {
                    table.insert(k.clone(), v.clone());
                }
            }
            Ok(receiver.clone())
        }
        "clear" => {
            let mut this = s_write!(receiver);
            entries_mut(&mut this)?.clear();
            Ok(receiver.clone())
        }
        "dig" => dig(receiver, args),
        _ => {
            let values = arg_values(args);
            let this = s_read!(receiver);
            let Value::Table(table) = &*this else {
                return Err(super::no_such_method(&this, method));
            };
            query(table, method, &values)
        }
    }
}

fn query(table: &Table, method: &str, args: &[Value]) -> Result<RefType<Value>> {
    match method {
        INDEX => {
            check_args(method, args, 1, 1)?;
            Ok(lookup(table, &args[0]).unwrap_or_else(nil))
        }
        "fetch" => {
            check_args(method, args, 1, 2)?;
            match (lookup(table, &args[0]), args.get(1)) {
                (Some(found), _) => Ok(found),
                (None, Some(default)) => ret(default.clone()),
                (None, None) => Err(ChainError::KeyNotFound {
                    key: args[0].inspect(),
                    location: location!(),
                }),
            }
        }
        "key?" | "has_key?" | "include?" | "member?" => {
            check_args(method, args, 1, 1)?;
            ret(lookup(table, &args[0]).is_some())
        }
        "keys" => ret(table.keys().cloned().map(Value::from).collect::<Vec<_>>()),
        "values" => ret(Value::Vector(table.values().cloned().collect())),
        "size" | "length" => ret(table.len()),
        "empty?" => ret(table.is_empty()),
        "merge" => {
            let mut merged = table.clone();
            for other in args {
                for (k, v) in table_arg(other)?.iter() {
                    merged.insert(k.clone(), v.clone());
                }
            }
            ret(merged)
        }
        "to_a" => ret(Value::Vector(pairs(table, table.len()))),
        "first" => {
            check_args(method, args, 0, 1)?;
            match args.first() {
                None => Ok(pairs(table, 1).pop().unwrap_or_else(nil)),
                Some(count) => {
                    let count = integer_arg(count)?.max(0) as usize;
                    ret(Value::Vector(pairs(table, count)))
                }
            }
        }
        _ => Err(super::no_such_method(&Value::Table(table.clone()), method)),
    }
}

fn nil() -> RefType<Value> {
    new_ref!(Value, Value::Empty)
}

fn lookup(table: &Table, key: &Value) -> Option<RefType<Value>> {
    let key = Key::try_from(key).ok()?;
    table.get(&key).cloned()
}

fn entries_mut(value: &mut Value) -> Result<&mut Table> {
    match value {
        Value::Table(table) => Ok(table),
        value => Err(ChainError::Conversion {
            src: value.inspect(),
            dst: "Table".to_owned(),
        }),
    }
}

fn table_arg(arg: &Value) -> Result<Table> {
    match arg {
        Value::Table(table) => Ok(table.clone()),
        arg => Err(ChainError::Conversion {
            src: arg.inspect(),
            dst: "Table".to_owned(),
        }),
    }
}

/// `[key, value]` pairs for the first `count` entries.
fn pairs(table: &Table, count: usize) -> Vec<RefType<Value>> {
    table
        .iter()
        .take(count)
        .map(|(k, v)| {
            new_ref!(
                Value,
                Value::Vector(vec![new_ref!(Value, Value::from(k.clone())), v.clone()])
            )
        })
        .collect()
}
