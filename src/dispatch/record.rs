//! Record methods
//!
//! A record answers to its member names as getters and to `<member>=` as
//! setters. Members shadow the built in methods below.
use snafu::location;

use crate::{
    dispatch::{arg_values, check_args, dig, lookup, normalize_index, ret, Arity},
    keywords::{INDEX, INDEX_SET},
    new_ref, s_read, s_write, ChainError, Key, Record, RefType, Result, Table, Value,
};

use Arity::*;

const METHODS: &[(&str, Arity)] = &[
    (INDEX, Variadic),
    (INDEX_SET, Variadic),
    ("members", Nullary),
    ("to_h", Nullary),
    ("to_a", Nullary),
    ("values", Nullary),
    ("size", Nullary),
    ("length", Nullary),
    ("dig", Variadic),
];

pub(super) fn arity(record: &Record, method: &str) -> Option<Arity> {
    if record.has_member(method) {
        return Some(Nullary);
    }

    if let Some(member) = setter(method) {
        if record.has_member(member) {
            return Some(Variadic);
        }
    }

    lookup(METHODS, method)
}

fn setter(method: &str) -> Option<&str> {
    method
        .strip_suffix('=')
        .filter(|stem| !stem.is_empty() && !stem.ends_with(&['=', '!', '<', '>', '['][..]))
}

pub(super) fn send(
    receiver: &RefType<Value>,
    method: &str,
    args: &[RefType<Value>],
) -> Result<RefType<Value>> {
    // Writes don't snapshot the argument; the record stores its reference.
    let member_set = {
        let this = s_read!(receiver);
        let Value::Record(record) = &*this else {
            return Err(super::no_such_method(&this, method));
        };

        if let Some(member) = record.get_member(method) {
            return Ok(member.clone());
        }

        setter(method)
            .filter(|m| record.has_member(m))
            .map(str::to_owned)
    };

    if member_set.is_some() || method == INDEX_SET {
        let (slot, value) = match member_set {
            Some(member) => {
                check_args(method, args, 1, 1)?;
                (Slot::Name(member), &args[0])
            }
            None => {
                check_args(method, args, 2, 2)?;
                (slot(&s_read!(args[0]))?, &args[1])
            }
        };

        let mut this = s_write!(receiver);
        if let Value::Record(record) = &mut *this {
            store(record, slot, value.clone())?;
        }
        return Ok(value.clone());
    }

    if method == "dig" {
        return dig(receiver, args);
    }

    let args = arg_values(args);
    let this = s_read!(receiver);
    let Value::Record(record) = &*this else {
        return Err(super::no_such_method(&this, method));
    };

    match method {
        INDEX => {
            check_args(method, &args, 1, 1)?;
            match slot(&args[0])? {
                Slot::Name(name) => match record.get_member(&name) {
                    Some(member) => Ok(member.clone()),
                    None => Err(no_such_member(record, &name)),
                },
                Slot::Position(index) => match normalize_index(index, record.len()) {
                    Some(pos) => Ok(record.at(pos).cloned().unwrap_or_else(nil)),
                    None => Ok(nil()),
                },
            }
        }
        "members" => ret(record.members().cloned().map(Value::from).collect::<Vec<_>>()),
        "to_h" => {
            let mut table = Table::new();
            for (name, value) in record.iter() {
                table.insert(Key::Symbol(name.clone()), value.clone());
            }
            ret(table)
        }
        "to_a" | "values" => ret(Value::Vector(record.iter().map(|(_, v)| v.clone()).collect())),
        "size" | "length" => ret(record.len()),
        _ => Err(super::no_such_method(&this, method)),
    }
}

enum Slot {
    Name(String),
    Position(i64),
}

fn slot(key: &Value) -> Result<Slot> {
    match key {
        Value::Symbol(sym) => Ok(Slot::Name(sym.as_str().to_owned())),
        Value::String(str_) => Ok(Slot::Name(str_.to_owned())),
        Value::Integer(index) => Ok(Slot::Position(*index)),
        key => Err(ChainError::Conversion {
            src: key.inspect(),
            dst: "a member name or position".to_owned(),
        }),
    }
}

fn store(record: &mut Record, slot: Slot, value: RefType<Value>) -> Result<()> {
    match slot {
        Slot::Name(name) => record
            .set_member(&name, value)
            .map(|_| ())
            .ok_or_else(|| no_such_member(record, &name)),
        Slot::Position(index) => {
            let pos = normalize_index(index, record.len()).ok_or_else(|| {
                ChainError::IndexOutOfBounds {
                    index,
                    len: record.len(),
                    receiver: Value::Record(record.clone()).inspect(),
                    location: location!(),
                }
            })?;
            record.set_at(pos, value);
            Ok(())
        }
    }
}

fn no_such_member(record: &Record, name: &str) -> ChainError {
    ChainError::NoSuchMember {
        member: name.to_owned(),
        record: record.type_name().to_owned(),
        location: location!(),
    }
}

fn nil() -> RefType<Value> {
    new_ref!(Value, Value::Empty)
}
