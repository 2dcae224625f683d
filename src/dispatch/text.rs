//! Strings and symbols.
//!
//! Sizes, reversal and `chars` count grapheme clusters, not bytes.
use snafu::location;
use unicode_segmentation::UnicodeSegmentation;

use crate::{
    dispatch::{arg_values, check_args, compare_op, integer_arg, ret, Arity, MAX_LENGTH},
    s_read, ChainError, ChainFloat, ChainInteger, RefType, Result, Symbol, Value,
};

use Arity::*;

pub(super) const STRING_METHODS: &[(&str, Arity)] = &[
    ("<", Variadic),
    ("<=", Variadic),
    (">", Variadic),
    (">=", Variadic),
    ("+", Variadic),
    ("*", Variadic),
    ("size", Nullary),
    ("length", Nullary),
    ("empty?", Nullary),
    ("upcase", Nullary),
    ("downcase", Nullary),
    ("reverse", Nullary),
    ("include?", Variadic),
    ("start_with?", Variadic),
    ("end_with?", Variadic),
    ("strip", Nullary),
    ("chars", Nullary),
    ("split", Variadic),
    ("to_str", Nullary),
    ("to_sym", Nullary),
    ("to_i", Nullary),
    ("to_f", Nullary),
];

pub(super) const SYMBOL_METHODS: &[(&str, Arity)] = &[
    ("<", Variadic),
    ("<=", Variadic),
    (">", Variadic),
    (">=", Variadic),
    ("size", Nullary),
    ("length", Nullary),
    ("empty?", Nullary),
    ("to_sym", Nullary),
    ("upcase", Nullary),
    ("downcase", Nullary),
];

pub(super) fn send(
    receiver: &RefType<Value>,
    method: &str,
    args: &[RefType<Value>],
) -> Result<RefType<Value>> {
    let args = arg_values(args);
    let this = s_read!(receiver).clone();

    if let "<" | "<=" | ">" | ">=" = method {
        check_args(method, &args, 1, 1)?;
        return ret(compare_op(&this, method, &args[0])?);
    }

    match this {
        Value::String(ref str_) => string(str_, method, &args),
        Value::Symbol(ref sym) => symbol(sym, method),
        _ => Err(super::no_such_method(&this, method)),
    }
}

fn string(str_: &str, method: &str, args: &[Value]) -> Result<RefType<Value>> {
    match method {
        "+" => {
            check_args(method, args, 1, 1)?;
            match &args[0] {
                Value::String(other) => ret(format!("{str_}{other}")),
                other => Err(ChainError::Conversion {
                    src: other.inspect(),
                    dst: "String".to_owned(),
                }),
            }
        }
        "*" => {
            check_args(method, args, 1, 1)?;
            let count = integer_arg(&args[0])?;
            if count < 0 {
                return Err(ChainError::Conversion {
                    src: args[0].inspect(),
                    dst: "a non-negative count".to_owned(),
                });
            }
            let length = usize::try_from(count)
                .ok()
                .and_then(|count| str_.len().checked_mul(count))
                .filter(|length| *length <= MAX_LENGTH);
            if length.is_none() {
                return Err(ChainError::Overflow {
                    operation: format!("{} * {count}", Value::from(str_).inspect()),
                    location: location!(),
                });
            }
            ret(str_.repeat(count as usize))
        }
        "size" | "length" => ret(str_.graphemes(true).count()),
        "empty?" => ret(str_.is_empty()),
        "upcase" => ret(str_.to_uppercase()),
        "downcase" => ret(str_.to_lowercase()),
        "reverse" => ret(str_.graphemes(true).rev().collect::<String>()),
        "include?" | "start_with?" | "end_with?" => {
            check_args(method, args, 1, 1)?;
            let needle = string_arg(&args[0])?;
            ret(match method {
                "include?" => str_.contains(needle),
                "start_with?" => str_.starts_with(needle),
                _ => str_.ends_with(needle),
            })
        }
        "strip" => ret(str_.trim()),
        "chars" => ret(str_.graphemes(true).map(Value::from).collect::<Vec<_>>()),
        "split" => {
            check_args(method, args, 0, 1)?;
            let mut parts: Vec<&str> = match args.first() {
                None | Some(Value::Empty) => str_.split_whitespace().collect(),
                Some(sep) => {
                    let sep = string_arg(sep)?;
                    if sep == " " {
                        str_.split_whitespace().collect()
                    } else if sep.is_empty() {
                        str_.graphemes(true).collect()
                    } else {
                        str_.split(sep).collect()
                    }
                }
            };
            while parts.last() == Some(&"") {
                parts.pop();
            }
            ret(parts)
        }
        "to_str" => ret(str_),
        "to_sym" => ret(Symbol::new(str_)),
        "to_i" => ret(leading_integer(str_)),
        "to_f" => ret(leading_float(str_)),
        _ => Err(super::no_such_method(&Value::from(str_), method)),
    }
}

fn symbol(sym: &Symbol, method: &str) -> Result<RefType<Value>> {
    match method {
        "size" | "length" => ret(sym.as_str().graphemes(true).count()),
        "empty?" => ret(sym.as_str().is_empty()),
        "to_sym" => ret(sym.clone()),
        "upcase" => ret(Symbol::new(sym.as_str().to_uppercase())),
        "downcase" => ret(Symbol::new(sym.as_str().to_lowercase())),
        _ => Err(super::no_such_method(&Value::from(sym.clone()), method)),
    }
}

fn string_arg(arg: &Value) -> Result<&str> {
    match arg {
        Value::String(str_) => Ok(str_),
        _ => Err(ChainError::Conversion {
            src: arg.inspect(),
            dst: "String".to_owned(),
        }),
    }
}

/// The integer at the front of the string, or zero.
fn leading_integer(str_: &str) -> ChainInteger {
    let str_ = str_.trim_start();
    let end = str_
        .char_indices()
        .take_while(|(i, c)| c.is_ascii_digit() || (*i == 0 && (*c == '-' || *c == '+')))
        .map(|(i, c)| i + c.len_utf8())
        .last()
        .unwrap_or(0);

    str_[..end].parse().unwrap_or(0)
}

/// The float at the front of the string, or zero.
fn leading_float(str_: &str) -> ChainFloat {
    let str_ = str_.trim_start();
    let mut seen_dot = false;
    let end = str_
        .char_indices()
        .take_while(|(i, c)| match c {
            '-' | '+' => *i == 0,
            '.' if !seen_dot => {
                seen_dot = true;
                true
            }
            c => c.is_ascii_digit(),
        })
        .map(|(i, c)| i + c.len_utf8())
        .last()
        .unwrap_or(0);

    let mut number = &str_[..end];
    while !number.is_empty() && number.parse::<ChainFloat>().is_err() {
        number = &number[..number.len() - 1];
    }

    number.parse().unwrap_or(0.0)
}

#[cfg(test)]
mod test {
    use crate::{dispatch::send, new_ref, s_read, sym, ChainError, RefType, Value};

    fn value<V: Into<Value>>(value: V) -> RefType<Value> {
        new_ref!(Value, value.into())
    }

    fn call(receiver: impl Into<Value>, method: &str, args: &[Value]) -> crate::Result<Value> {
        let args: Vec<_> = args.iter().cloned().map(value).collect();
        let result = send(&value(receiver), method, &args)?;
        let result = s_read!(result).clone();
        Ok(result)
    }

    #[test]
    fn graphemes_count_once() {
        let _ = env_logger::builder().is_test(true).try_init();
        color_backtrace::install();

        let family = "a\u{1F468}\u{200D}\u{1F469}\u{200D}\u{1F467}b";
        assert_eq!(call(family, "size", &[]).unwrap(), Value::from(3));
        assert_eq!(
            call("noe\u{0308}l", "reverse", &[]).unwrap(),
            Value::from("le\u{0308}on")
        );
    }

    #[test]
    fn concatenation_needs_a_string() {
        assert_eq!(
            call("ab", "+", &["cd".into()]).unwrap(),
            Value::from("abcd")
        );
        assert!(matches!(
            call("ab", "+", &[1.into()]),
            Err(ChainError::Conversion { .. })
        ));
        assert_eq!(call("ab", "*", &[3.into()]).unwrap(), Value::from("ababab"));
        assert_eq!(call("", "*", &[i64::MAX.into()]).unwrap(), Value::from(""));
    }

    #[test]
    fn huge_repetition_is_an_error() {
        let _ = env_logger::builder().is_test(true).try_init();

        for count in [i64::MAX, 1 << 40] {
            assert!(matches!(
                call("ab", "*", &[count.into()]),
                Err(ChainError::Overflow { .. })
            ));
        }
    }

    #[test]
    fn split_drops_trailing_empties() {
        assert_eq!(
            call(" a  b c ", "split", &[]).unwrap(),
            Value::from(vec!["a", "b", "c"])
        );
        assert_eq!(
            call("a,b,,", "split", &[",".into()]).unwrap(),
            Value::from(vec!["a", "b"])
        );
    }

    #[test]
    fn numeric_prefixes() {
        assert_eq!(call("42abc", "to_i", &[]).unwrap(), Value::from(42));
        assert_eq!(call("  -7", "to_i", &[]).unwrap(), Value::from(-7));
        assert_eq!(call("abc", "to_i", &[]).unwrap(), Value::from(0));
        assert_eq!(call("2.5x", "to_f", &[]).unwrap(), Value::from(2.5));
        assert_eq!(call("1.", "to_f", &[]).unwrap(), Value::from(1.0));
    }

    #[test]
    fn symbols() {
        assert_eq!(call("abc", "to_sym", &[]).unwrap(), Value::from(sym("abc")));
        assert_eq!(call(sym("abc"), "upcase", &[]).unwrap(), Value::from(sym("ABC")));
        assert_eq!(call(sym("abc"), "length", &[]).unwrap(), Value::from(3));
        assert!(matches!(
            call(sym("abc"), "split", &[]),
            Err(ChainError::NoSuchMethod { .. })
        ));
    }
}
