//! Every value's own operations
//!
//! Values answer to named methods, the way a dynamic language object would.
//! Each kind has a method table; the methods in [`object`] are shared by all
//! kinds. [`send`] is the single entry point: it checks that the receiver
//! responds to the method, checks the argument count for methods that take
//! none, and hands off to the kind's implementation.
//!
//! Receivers and arguments are [`RefType`]s. Methods that hand back an
//! element of a container hand back the element's own reference, and methods
//! that store an argument store the argument's reference.
use snafu::location;

use crate::{
    debug, new_ref, s_read, ChainError, ChainInteger, Kind, RefType, Result, Value,
};

mod number;
mod object;
mod record;
mod scalar;
mod table;
mod text;
mod vector;

/// How many arguments a method takes
///
/// `Nullary` methods take none at all. `Variadic` methods take a list, and
/// check its length themselves.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Arity {
    Nullary,
    Variadic,
}

/// The largest string (in bytes) or vector a method will grow.
pub(crate) const MAX_LENGTH: usize = 1 << 28;

type MethodTable = &'static [(&'static str, Arity)];

fn lookup(table: MethodTable, method: &str) -> Option<Arity> {
    table
        .iter()
        .find(|(name, _)| *name == method)
        .map(|(_, arity)| *arity)
}

impl Value {
    /// The arity of the receiver's own method, if it has one
    ///
    /// Kind specific methods (and record members) shadow the shared object
    /// methods.
    pub fn arity(&self, method: &str) -> Option<Arity> {
        let own = match self {
            Self::Boolean(_) => lookup(scalar::BOOLEAN_METHODS, method),
            Self::Empty => lookup(scalar::EMPTY_METHODS, method),
            Self::Float(_) => lookup(number::FLOAT_METHODS, method),
            Self::Integer(_) => lookup(number::INTEGER_METHODS, method),
            Self::Kind(_) => lookup(scalar::KIND_METHODS, method),
            Self::Record(record) => record::arity(record, method),
            Self::String(_) => lookup(text::STRING_METHODS, method),
            Self::Symbol(_) => lookup(text::SYMBOL_METHODS, method),
            Self::Table(_) => lookup(table::METHODS, method),
            Self::Vector(_) => lookup(vector::METHODS, method),
        };

        own.or_else(|| lookup(object::METHODS, method))
    }

    pub fn responds_to(&self, method: &str) -> bool {
        self.arity(method).is_some()
    }

    /// Is `key` something this value can look up?
    ///
    /// Tables answer for their keys, vectors for their indices (negative ones
    /// count from the end), and records for their member names and positions.
    /// Nothing else holds keys.
    pub fn has_key(&self, key: &Value) -> bool {
        match (self, key) {
            (Self::Table(table), key) => match crate::Key::try_from(key) {
                Ok(key) => table.contains_key(&key),
                Err(_) => false,
            },
            (Self::Vector(vec), Self::Integer(index)) => normalize_index(*index, vec.len()).is_some(),
            (Self::Record(record), Self::Symbol(sym)) => record.has_member(sym.as_str()),
            (Self::Record(record), Self::String(str_)) => record.has_member(str_),
            (Self::Record(record), Self::Integer(index)) => {
                normalize_index(*index, record.len()).is_some()
            }
            _ => false,
        }
    }
}

/// Invoke `method` on `receiver`
///
/// Fails with [`ChainError::NoSuchMethod`] if the receiver does not have the
/// method, and with [`ChainError::WrongNumberOfArguments`] if a method that
/// takes no arguments is given some.
pub fn send(
    receiver: &RefType<Value>,
    method: &str,
    args: &[RefType<Value>],
) -> Result<RefType<Value>> {
    let (kind, own, arity) = {
        let value = s_read!(receiver);
        (value.kind(), own_method(&value, method), value.arity(method))
    };

    let Some(arity) = arity else {
        return Err(no_such_method(&s_read!(receiver), method));
    };

    if arity == Arity::Nullary && !args.is_empty() {
        return Err(ChainError::WrongNumberOfArguments {
            method: method.to_owned(),
            expected: 0,
            got: args.len(),
        });
    }

    debug!("dispatch", "{kind}#{method} with {} argument(s)", args.len());

    if !own {
        return object::send(receiver, method, args);
    }

    match kind {
        Kind::True | Kind::False | Kind::Empty | Kind::Kind => {
            scalar::send(receiver, method, args)
        }
        Kind::Integer | Kind::Float => number::send(receiver, method, args),
        Kind::String | Kind::Symbol => text::send(receiver, method, args),
        Kind::Vector => vector::send(receiver, method, args),
        Kind::Table => table::send(receiver, method, args),
        Kind::Record => record::send(receiver, method, args),
        Kind::Numeric | Kind::Object => Err(no_such_method(&s_read!(receiver), method)),
    }
}

/// Does the receiver's own kind define the method (as opposed to the shared
/// object methods)?
fn own_method(value: &Value, method: &str) -> bool {
    let table = match value {
        Value::Boolean(_) => scalar::BOOLEAN_METHODS,
        Value::Empty => scalar::EMPTY_METHODS,
        Value::Float(_) => number::FLOAT_METHODS,
        Value::Integer(_) => number::INTEGER_METHODS,
        Value::Kind(_) => scalar::KIND_METHODS,
        Value::String(_) => text::STRING_METHODS,
        Value::Symbol(_) => text::SYMBOL_METHODS,
        Value::Table(_) => table::METHODS,
        Value::Vector(_) => vector::METHODS,
        Value::Record(record) => return record::arity(record, method).is_some(),
    };

    lookup(table, method).is_some()
}

pub(crate) fn no_such_method(receiver: &Value, method: &str) -> ChainError {
    ChainError::NoSuchMethod {
        method: method.to_owned(),
        receiver: receiver.inspect(),
        location: location!(),
    }
}

fn check_args<T>(method: &str, args: &[T], min: usize, max: usize) -> Result<()> {
    if args.len() < min {
        Err(ChainError::WrongNumberOfArguments {
            method: method.to_owned(),
            expected: min,
            got: args.len(),
        })
    } else if args.len() > max {
        Err(ChainError::WrongNumberOfArguments {
            method: method.to_owned(),
            expected: max,
            got: args.len(),
        })
    } else {
        Ok(())
    }
}

/// Snapshot the argument values before any receiver lock is taken.
fn arg_values(args: &[RefType<Value>]) -> Vec<Value> {
    args.iter().map(|a| s_read!(a).clone()).collect()
}

fn integer_arg(arg: &Value) -> Result<ChainInteger> {
    ChainInteger::try_from(arg)
}

fn ret<V: Into<Value>>(value: V) -> Result<RefType<Value>> {
    Ok(new_ref!(Value, value.into()))
}

/// Resolve a possibly negative index against a length.
fn normalize_index(index: ChainInteger, len: usize) -> Option<usize> {
    let len = len as ChainInteger;
    let index = if index < 0 { index + len } else { index };
    if (0..len).contains(&index) {
        Some(index as usize)
    } else {
        None
    }
}

/// `< <= > >=` for anything with an ordering.
fn compare_op(this: &Value, method: &str, other: &Value) -> Result<bool> {
    let Some(ordering) = this.compare(other) else {
        return Err(ChainError::Comparison {
            left: this.inspect(),
            right: other.inspect(),
        });
    };

    Ok(match method {
        "<" => ordering.is_lt(),
        "<=" => ordering.is_le(),
        ">" => ordering.is_gt(),
        ">=" => ordering.is_ge(),
        _ => unreachable!(),
    })
}

fn truthy(value: &Value) -> bool {
    !matches!(value, Value::Empty | Value::Boolean(false))
}

/// `dig` for every container: `[]` with the first key, then `dig` on the
/// result with the rest, stopping early at `nil`.
fn dig(receiver: &RefType<Value>, args: &[RefType<Value>]) -> Result<RefType<Value>> {
    check_args("dig", args, 1, usize::MAX)?;

    let found = send(receiver, crate::keywords::INDEX, &args[..1])?;
    let rest = &args[1..];
    if rest.is_empty() || s_read!(found).is_empty_value() {
        return Ok(found);
    }

    let digs = s_read!(found).responds_to("dig");
    if digs {
        send(&found, "dig", rest)
    } else {
        Err(ChainError::Conversion {
            src: s_read!(found).inspect(),
            dst: "a value that can `dig`".to_owned(),
        })
    }
}
