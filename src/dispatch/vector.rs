//! Vector methods
//!
//! Indices may be negative, counting back from the end. Reading past either
//! end is `nil`; writing past the end pads the gap with `nil`.
use std::{cmp::Ordering, sync::Arc};

use snafu::location;

use crate::{
    dispatch::{
        arg_values, check_args, dig, integer_arg, normalize_index, ret, Arity, MAX_LENGTH,
    },
    keywords::{INDEX, INDEX_SET},
    new_ref, s_read, s_write, ChainError, ChainInteger, RefType, Result, Value,
};

use Arity::*;

pub(super) const METHODS: &[(&str, Arity)] = &[
    (INDEX, Variadic),
    (INDEX_SET, Variadic),
    ("at", Variadic),
    ("fetch", Variadic),
    ("dig", Variadic),
    ("<<", Variadic),
    ("push", Variadic),
    ("pop", Nullary),
    ("shift", Nullary),
    ("unshift", Variadic),
    ("+", Variadic),
    ("concat", Variadic),
    ("first", Variadic),
    ("last", Variadic),
    ("size", Nullary),
    ("length", Nullary),
    ("empty?", Nullary),
    ("include?", Variadic),
    ("index", Variadic),
    ("reverse", Nullary),
    ("compact", Nullary),
    ("flatten", Nullary),
    ("join", Variadic),
    ("clear", Nullary),
    ("delete_at", Variadic),
    ("count", Variadic),
    ("to_a", Nullary),
    ("sort", Nullary),
    ("uniq", Nullary),
];

pub(super) fn send(
    receiver: &RefType<Value>,
    method: &str,
    args: &[RefType<Value>],
) -> Result<RefType<Value>> {
    match method {
        // Mutators first: they store argument references, and must not hold
        // a lock on an argument while the receiver is locked for writing.
        INDEX_SET => {
            check_args(method, args, 2, 2)?;
            let index = integer_arg(&s_read!(args[0]))?;
            let mut this = s_write!(receiver);
            let vec = elements_mut(&mut this)?;
            store(vec, index, args[1].clone())?;
            Ok(args[1].clone())
        }
        "<<" | "push" => {
            if method == "<<" {
                check_args(method, args, 1, 1)?;
            }
            let mut this = s_write!(receiver);
            elements_mut(&mut this)?.extend(args.iter().cloned());
            Ok(receiver.clone())
        }
        "unshift" => {
            let mut this = s_write!(receiver);
            let vec = elements_mut(&mut this)?;
            vec.splice(0..0, args.iter().cloned());
            Ok(receiver.clone())
        }
        "concat" => {
            let mut others = Vec::new();
            for arg in args {
                others.extend(vector_arg(&s_read!(arg))?);
            }
            let mut this = s_write!(receiver);
            elements_mut(&mut this)?.extend(others);
            Ok(receiver.clone())
        }
        "pop" | "shift" | "clear" | "delete_at" => {
            let index = match method {
                "delete_at" => {
                    check_args(method, args, 1, 1)?;
                    Some(integer_arg(&s_read!(args[0]))?)
                }
                _ => None,
            };
            let mut this = s_write!(receiver);
            let vec = elements_mut(&mut this)?;
            match method {
                "pop" => Ok(vec.pop().unwrap_or_else(nil)),
                "shift" if vec.is_empty() => Ok(nil()),
                "shift" => Ok(vec.remove(0)),
                "clear" => {
                    vec.clear();
                    Ok(receiver.clone())
                }
                _ => match index.and_then(|i| normalize_index(i, vec.len())) {
                    Some(i) => Ok(vec.remove(i)),
                    None => Ok(nil()),
                },
            }
        }
        "to_a" => Ok(receiver.clone()),
        "dig" => dig(receiver, args),
        _ => {
            let values = arg_values(args);
            let this = s_read!(receiver);
            let Value::Vector(vec) = &*this else {
                return Err(super::no_such_method(&this, method));
            };
            query(vec, method, &values)
        }
    }
}

/// The methods that leave the receiver alone.
fn query(vec: &[RefType<Value>], method: &str, args: &[Value]) -> Result<RefType<Value>> {
    match method {
        INDEX => {
            check_args(method, args, 1, 2)?;
            let index = integer_arg(&args[0])?;
            match args.get(1) {
                None => Ok(element(vec, index)),
                Some(len) => ret(slice(vec, index, integer_arg(len)?)),
            }
        }
        "at" => {
            check_args(method, args, 1, 1)?;
            Ok(element(vec, integer_arg(&args[0])?))
        }
        "fetch" => {
            check_args(method, args, 1, 2)?;
            let index = integer_arg(&args[0])?;
            match normalize_index(index, vec.len()) {
                Some(i) => Ok(vec[i].clone()),
                None => match args.get(1) {
                    Some(default) => ret(default.clone()),
                    None => Err(ChainError::IndexOutOfBounds {
                        index,
                        len: vec.len(),
                        receiver: Value::Vector(vec.to_vec()).inspect(),
                        location: location!(),
                    }),
                },
            }
        }
        "+" => {
            check_args(method, args, 1, 1)?;
            let mut result = vec.to_vec();
            result.extend(vector_arg(&args[0])?);
            ret(Value::Vector(result))
        }
        "first" | "last" => {
            check_args(method, args, 0, 1)?;
            match args.first() {
                None => Ok(if method == "first" {
                    vec.first().cloned().unwrap_or_else(nil)
                } else {
                    vec.last().cloned().unwrap_or_else(nil)
                }),
                Some(count) => {
                    let count = integer_arg(count)?;
                    if count < 0 {
                        return Err(ChainError::Conversion {
                            src: count.to_string(),
                            dst: "a non-negative count".to_owned(),
                        });
                    }
                    let count = (count as usize).min(vec.len());
                    let taken = if method == "first" {
                        vec[..count].to_vec()
                    } else {
                        vec[vec.len() - count..].to_vec()
                    };
                    ret(Value::Vector(taken))
                }
            }
        }
        "size" | "length" => ret(vec.len()),
        "empty?" => ret(vec.is_empty()),
        "include?" => {
            check_args(method, args, 1, 1)?;
            ret(vec.iter().any(|v| *s_read!(v) == args[0]))
        }
        "index" => {
            check_args(method, args, 1, 1)?;
            ret(vec.iter().position(|v| *s_read!(v) == args[0]))
        }
        "count" => {
            check_args(method, args, 0, 1)?;
            match args.first() {
                None => ret(vec.len()),
                Some(needle) => ret(vec.iter().filter(|v| *s_read!(v) == *needle).count()),
            }
        }
        "reverse" => ret(Value::Vector(vec.iter().rev().cloned().collect())),
        "compact" => ret(Value::Vector(
            vec.iter()
                .filter(|v| !s_read!(v).is_empty_value())
                .cloned()
                .collect(),
        )),
        "flatten" => {
            let mut flat = Vec::new();
            flatten(vec, &mut flat);
            ret(Value::Vector(flat))
        }
        "join" => {
            check_args(method, args, 0, 1)?;
            let separator = match args.first() {
                None | Some(Value::Empty) => String::new(),
                Some(sep) => String::try_from(sep)?,
            };
            ret(join(vec, &separator))
        }
        "sort" => {
            let mut failure = None;
            let mut sorted = vec.to_vec();
            sorted.sort_by(|a, b| {
                if Arc::ptr_eq(a, b) {
                    return Ordering::Equal;
                }
                let (a, b) = (s_read!(a), s_read!(b));
                a.compare(&b).unwrap_or_else(|| {
                    failure.get_or_insert_with(|| ChainError::Comparison {
                        left: a.inspect(),
                        right: b.inspect(),
                    });
                    Ordering::Equal
                })
            });
            match failure {
                Some(error) => Err(error),
                None => ret(Value::Vector(sorted)),
            }
        }
        "uniq" => {
            let mut unique: Vec<RefType<Value>> = Vec::new();
            for v in vec {
                if !unique.iter().any(|u| s_read!(u).eql(&s_read!(v))) {
                    unique.push(v.clone());
                }
            }
            ret(Value::Vector(unique))
        }
        _ => Err(super::no_such_method(
            &Value::Vector(vec.to_vec()),
            method,
        )),
    }
}

fn nil() -> RefType<Value> {
    new_ref!(Value, Value::Empty)
}

fn elements_mut(value: &mut Value) -> Result<&mut Vec<RefType<Value>>> {
    match value {
        Value::Vector(vec) => Ok(vec),
        value => Err(ChainError::Conversion {
            src: value.inspect(),
            dst: "Vector".to_owned(),
        }),
    }
}

fn vector_arg(arg: &Value) -> Result<Vec<RefType<Value>>> {
    match arg {
        Value::Vector(vec) => Ok(vec.clone()),
        arg => Err(ChainError::Conversion {
            src: arg.inspect(),
            dst: "Vector".to_owned(),
        }),
    }
}

fn element(vec: &[RefType<Value>], index: ChainInteger) -> RefType<Value> {
    match normalize_index(index, vec.len()) {
        Some(i) => vec[i].clone(),
        None => nil(),
    }
}

/// `[start, length]`: `nil` when `start` is past the end, and an empty vector
/// when it is exactly at the end.
fn slice(vec: &[RefType<Value>], start: ChainInteger, len: ChainInteger) -> Value {
    let size = vec.len() as ChainInteger;
    let start = if start < 0 { start + size } else { start };
    if start < 0 || start > size || len < 0 {
        return Value::Empty;
    }

    let end = start.saturating_add(len).min(size);
    Value::Vector(vec[start as usize..end as usize].to_vec())
}

fn store(vec: &mut Vec<RefType<Value>>, index: ChainInteger, value: RefType<Value>) -> Result<()> {
    let len = vec.len();
    let position = if index < 0 {
        normalize_index(index, len).ok_or_else(|| ChainError::IndexOutOfBounds {
            index,
            len,
            receiver: Value::Vector(vec.clone()).inspect(),
            location: location!(),
        })?
    } else {
        usize::try_from(index).unwrap_or(usize::MAX)
    };

    if position >= len {
        let grown = position
            .checked_add(1)
            .filter(|grown| *grown <= MAX_LENGTH)
            .and_then(|grown| vec.try_reserve(grown - len).ok());
        if grown.is_none() {
            return Err(ChainError::IndexOutOfBounds {
                index,
                len,
                receiver: Value::Vector(vec.clone()).inspect(),
                location: location!(),
            });
        }
        vec.resize_with(position, nil);
        vec.push(value);
    } else {
        vec[position] = value;
    }

    Ok(())
}

fn flatten(vec: &[RefType<Value>], into: &mut Vec<RefType<Value>>) {
    for v in vec {
        let nested = match &*s_read!(v) {
            Value::Vector(inner) => Some(inner.clone()),
            _ => None,
        };
        match nested {
            Some(inner) => flatten(&inner, into),
            None => into.push(v.clone()),
        }
    }
}

fn join(vec: &[RefType<Value>], separator: &str) -> String {
    vec.iter()
        .map(|v| match &*s_read!(v) {
            Value::Vector(inner) => join(inner, separator),
            value => value.to_string(),
        })
        .collect::<Vec<_>>()
        .join(separator)
}

#[cfg(test)]
mod test {
    use std::sync::Arc;

    use crate::{dispatch::send, new_ref, s_read, ChainError, RefType, Value};

    fn value<V: Into<Value>>(value: V) -> RefType<Value> {
        new_ref!(Value, value.into())
    }

    fn call(receiver: &RefType<Value>, method: &str, args: &[Value]) -> crate::Result<Value> {
        let args: Vec<_> = args.iter().cloned().map(value).collect();
        let result = send(receiver, method, &args)?;
        let result = s_read!(result).clone();
        Ok(result)
    }

    #[test]
    fn index_hands_back_the_element_itself() {
        let _ = env_logger::builder().is_test(true).try_init();
        color_backtrace::install();

        let vec = value(vec![Value::from(vec![1]), Value::from(2)]);
        let first = send(&vec, "[]", &[value(0)]).unwrap();
        let this = s_read!(vec);
        let Value::Vector(elements) = &*this else {
            unreachable!()
        };
        assert!(Arc::ptr_eq(&first, &elements[0]));
    }

    #[test]
    fn slices() {
        let vec = value(vec![1, 2, 3, 4, 5]);
        assert_eq!(
            call(&vec, "[]", &[1.into(), 3.into()]).unwrap(),
            Value::from(vec![2, 3, 4])
        );
        assert_eq!(
            call(&vec, "[]", &[(-2).into(), 5.into()]).unwrap(),
            Value::from(vec![4, 5])
        );
        assert_eq!(
            call(&vec, "[]", &[5.into(), 1.into()]).unwrap(),
            Value::Vector(vec![])
        );
        assert_eq!(call(&vec, "[]", &[6.into(), 1.into()]).unwrap(), Value::Empty);
        assert_eq!(call(&vec, "[]", &[9.into()]).unwrap(), Value::Empty);
        assert_eq!(call(&vec, "[]", &[(-1).into()]).unwrap(), Value::from(5));
    }

    #[test]
    fn sparse_assignment_pads_with_nil() {
        let vec = value(vec![1]);
        call(&vec, "[]=", &[3.into(), 10.into()]).unwrap();
        assert_eq!(
            *s_read!(vec),
            Value::from(vec![Value::from(1), Value::Empty, Value::Empty, Value::from(10)])
        );

        assert!(matches!(
            call(&vec, "[]=", &[(-9).into(), 0.into()]),
            Err(ChainError::IndexOutOfBounds { .. })
        ));
    }

    #[test]
    fn index_too_big_to_pad() {
        let _ = env_logger::builder().is_test(true).try_init();

        let vec = value(vec![1]);
        for index in [i64::MAX, 1 << 40] {
            assert!(matches!(
                call(&vec, "[]=", &[index.into(), 0.into()]),
                Err(ChainError::IndexOutOfBounds { .. })
            ));
        }
        assert_eq!(*s_read!(vec), Value::from(vec![1]));
    }

    #[test]
    fn string_index_is_a_conversion_error() {
        let vec = value(vec![1]);
        assert!(matches!(
            call(&vec, "[]", &["a".into()]),
            Err(ChainError::Conversion { .. })
        ));
    }

    #[test]
    fn push_returns_the_receiver() {
        let vec = value(Vec::<Value>::new());
        let result = send(&vec, "<<", &[value(1)]).unwrap();
        assert!(Arc::ptr_eq(&result, &vec));
        send(&vec, "push", &[value(2), value(3)]).unwrap();
        send(&vec, "unshift", &[value(0)]).unwrap();
        assert_eq!(*s_read!(vec), Value::from(vec![0, 1, 2, 3]));

        assert_eq!(call(&vec, "pop", &[]).unwrap(), Value::from(3));
        assert_eq!(call(&vec, "shift", &[]).unwrap(), Value::from(0));
        assert_eq!(*s_read!(vec), Value::from(vec![1, 2]));
    }

    #[test]
    fn concat_with_itself() {
        let vec = value(vec![1, 2]);
        send(&vec, "concat", &[vec.clone()]).unwrap();
        assert_eq!(*s_read!(vec), Value::from(vec![1, 2, 1, 2]));
    }

    #[test]
    fn queries() {
        let vec = value(vec![
            Value::from(3),
            Value::Empty,
            Value::from(vec![1, 2]),
            Value::from(3),
        ]);
        assert_eq!(call(&vec, "compact", &[]).unwrap().to_string(), "[3, [1, 2], 3]");
        assert_eq!(call(&vec, "flatten", &[]).unwrap().to_string(), "[3, nil, 1, 2, 3]");
        assert_eq!(call(&vec, "join", &["-".into()]).unwrap(), Value::from("3--1-2-3"));
        assert_eq!(call(&vec, "count", &[3.into()]).unwrap(), Value::from(2));
        assert_eq!(call(&vec, "index", &[Value::Empty]).unwrap(), Value::from(1));
        assert_eq!(call(&vec, "uniq", &[]).unwrap().to_string(), "[3, nil, [1, 2]]");
        assert_eq!(call(&vec, "last", &[2.into()]).unwrap().to_string(), "[[1, 2], 3]");
        assert!(matches!(
            call(&vec, "fetch", &[10.into()]),
            Err(ChainError::IndexOutOfBounds { .. })
        ));
        assert_eq!(call(&vec, "fetch", &[10.into(), "x".into()]).unwrap(), Value::from("x"));
    }

    #[test]
    fn sort_needs_comparable_elements() {
        let vec = value(vec![3, 1, 2]);
        assert_eq!(call(&vec, "sort", &[]).unwrap(), Value::from(vec![1, 2, 3]));

        let mixed = value(vec![Value::from(1), Value::from("a")]);
        assert!(matches!(
            call(&mixed, "sort", &[]),
            Err(ChainError::Comparison { .. })
        ));
    }
}
