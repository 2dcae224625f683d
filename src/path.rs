//! Chain paths
//!
//! A chain path is the text form of a member chain: `a.H3[1].deeper`, or
//! `items.push(1, "two").size`. Each step names a member, optionally with
//! arguments in parentheses; `[args]` is shorthand for the `[]` member.
//!
//! Member names are identifiers (which may end in `?`, `!` or `=`), integers
//! such as `-1` or `007`, or operators like `[]=` and `<<`. Arguments are
//! literals: integers, floats, `"strings"`, `:symbols`, `nil`, `true`,
//! `false`, and `[vectors]` of the same.
use std::fmt;

use chumsky::prelude::*;

use crate::{
    chain::Link, debug, error::ChainError, keywords::INDEX, new_ref, ChainFloat, ChainInteger,
    Result, Span, Symbol, Value,
};

pub type Spanned<T> = (T, Span);

/// One member access in a path.
#[derive(Clone, Debug, PartialEq)]
pub struct Step {
    pub name: String,
    pub args: Vec<Value>,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.args.is_empty() {
            write!(f, ".{}", self.name)
        } else {
            let args = self
                .args
                .iter()
                .map(Value::inspect)
                .collect::<Vec<_>>()
                .join(", ");
            write!(f, ".{}({args})", self.name)
        }
    }
}

/// Parse a path into its steps.
pub fn parse(src: &str) -> Result<Vec<Spanned<Step>>> {
    parser().parse(src).map_err(|errs| {
        let (message, span) = match errs.into_iter().next() {
            Some(e) => (e.to_string(), e.span()),
            None => ("empty path".to_owned(), 0..src.len()),
        };

        ChainError::Path {
            src: src.to_owned(),
            message,
            span,
        }
    })
}

/// Walk `src` starting at `link`.
pub fn evaluate(link: &Link, src: &str) -> Result<Link> {
    let steps = parse(src)?;

    let mut current = link.clone();
    for (step, span) in steps {
        debug!("path", "{step} at {span:?}");
        let args = step
            .args
            .into_iter()
            .map(|arg| new_ref!(Value, arg))
            .collect::<Vec<_>>();
        current = current.send(&step.name, &args)?;
    }

    Ok(current)
}

fn parser() -> impl Parser<char, Vec<Spanned<Step>>, Error = Simple<char>> {
    let args = literal().separated_by(just(',')).allow_trailing();

    let call = name()
        .then(args.clone().delimited_by(just('('), just(')')).or_not())
        .map(|(name, args)| Step {
            name,
            args: args.unwrap_or_default(),
        });

    let index = args
        .delimited_by(just('['), just(']'))
        .map(|args| Step {
            name: INDEX.to_owned(),
            args,
        });

    let member = just('.').ignore_then(call.clone());

    let first = call.or(member.clone()).or(index.clone());
    let step = member.or(index);

    first
        .map_with_span(|step, span| (step, span))
        .then(step.map_with_span(|step, span| (step, span)).repeated())
        .map(|(first, mut rest)| {
            rest.insert(0, first);
            rest
        })
        .then_ignore(end())
}

fn name() -> impl Parser<char, String, Error = Simple<char>> + Clone {
    let ident = text::ident()
        .then(one_of("?!=").or_not())
        .map(|(ident, suffix): (String, Option<char>)| match suffix {
            Some(c) => format!("{ident}{c}"),
            None => ident,
        });

    let integer = just('-')
        .or_not()
        .then(text::digits(10))
        .then(just('=').or_not())
        .map(|((sign, digits), setter): ((Option<char>, String), Option<char>)| {
            let mut name = String::new();
            name.extend(sign);
            name.push_str(&digits);
            name.extend(setter);
            name
        });

    let operator = choice((
        just("[]="),
        just("[]"),
        just("<=>"),
        just("<<"),
        just("<="),
        just(">="),
        just("=="),
        just("!="),
        just("<"),
        just(">"),
        just("+"),
        just("-"),
        just("*"),
        just("/"),
        just("%"),
        just("&"),
        just("|"),
        just("^"),
    ))
    .map(|op: &str| op.to_owned());

    ident.or(integer).or(operator).labelled("member name")
}

fn literal() -> impl Parser<char, Value, Error = Simple<char>> + Clone {
    recursive(|literal| {
        let digits = just('-')
            .or_not()
            .then(text::digits(10))
            .map(|(sign, digits): (Option<char>, String)| {
                let mut number = String::new();
                number.extend(sign);
                number.push_str(&digits);
                number
            });

        let float = digits
            .clone()
            .then_ignore(just('.'))
            .then(text::digits(10))
            .try_map(|(int, frac), span| {
                format!("{int}.{frac}")
                    .parse::<ChainFloat>()
                    .map(Value::Float)
                    .map_err(|e| Simple::custom(span, e.to_string()))
            });

        let int = digits.try_map(|int, span| {
            int.parse::<ChainInteger>()
                .map(Value::Integer)
                .map_err(|e| Simple::custom(span, e.to_string()))
        });

        let escape = just('\\').ignore_then(one_of("\\\"nt").map(|c| match c {
            'n' => '\n',
            't' => '\t',
            c => c,
        }));

        let string = just('"')
            .ignore_then(
                filter(|c: &char| *c != '\\' && *c != '"')
                    .or(escape)
                    .repeated(),
            )
            .then_ignore(just('"'))
            .collect::<String>();

        let symbol = just(':')
            .ignore_then(string.clone().or(name()))
            .map(|name| Value::Symbol(Symbol::new(name)));

        let keyword = text::ident().try_map(|ident: String, span| match ident.as_str() {
            "nil" => Ok(Value::Empty),
            "true" => Ok(Value::Boolean(true)),
            "false" => Ok(Value::Boolean(false)),
            _ => Err(Simple::custom(span, format!("unknown literal `{ident}`"))),
        });

        let vector = literal
            .separated_by(just(','))
            .allow_trailing()
            .delimited_by(just('['), just(']'))
            .map(Value::from);

        choice((
            float,
            int,
            string.map(Value::String),
            symbol,
            keyword,
            vector,
        ))
        .padded()
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{sym, Chain, Table};

    fn names(src: &str) -> Vec<String> {
        parse(src)
            .unwrap()
            .into_iter()
            .map(|(step, _)| step.name)
            .collect()
    }

    #[test]
    fn member_names() {
        let _ = env_logger::builder().is_test(true).try_init();
        color_backtrace::install();

        assert_eq!(names("a.H3.deeper"), ["a", "H3", "deeper"]);
        assert_eq!(names("items.empty?.!=(true)"), ["items", "empty?", "!="]);
        assert_eq!(names("v.-1.007.9=(10)"), ["v", "-1", "007", "9="]);
        assert_eq!(names(".a[1]"), ["a", "[]"]);
        assert_eq!(names("[0].x=(1)"), ["[]", "x="]);
    }

    #[test]
    fn arguments() {
        let steps = parse(r#"a.call(1, -2.5, "s\"q", :sym, :"odd sym", nil, true, [1, [2]],)"#)
            .unwrap();
        let (step, span) = &steps[1];
        assert_eq!(step.name, "call");
        assert_eq!(span.start, 1);
        assert_eq!(
            step.args,
            [
                Value::from(1),
                Value::from(-2.5),
                Value::from("s\"q"),
                Value::from(sym("sym")),
                Value::from(sym("odd sym")),
                Value::Empty,
                Value::from(true),
                Value::from(vec![Value::from(1), Value::from(vec![2])]),
            ]
        );
    }

    #[test]
    fn slices() {
        let steps = parse("v[1, 3]").unwrap();
        assert_eq!(steps[1].0.to_string(), ".[](1, 3)");
    }

    #[test]
    fn errors_carry_a_span() {
        match parse("a..b") {
            Err(ChainError::Path { span, src, .. }) => {
                assert_eq!(src, "a..b");
                assert!((1..=2).contains(&span.start));
            }
            other => panic!("expected a path error, got {other:?}"),
        }

        assert!(matches!(parse("a(bogus)"), Err(ChainError::Path { .. })));
        assert!(matches!(parse(""), Err(ChainError::Path { .. })));
    }

    #[test]
    fn evaluation_follows_the_chain() {
        let data = Table::new()
            .with(
                sym("a"),
                Table::new().with("H3", vec![Value::Empty, Value::from(Table::new().with("deeper", "x"))]),
            )
            .into_value();
        let link = Link::from(Chain::new(data).unwrap());

        let found = evaluate(&link, "a.H3[1].deeper").unwrap();
        assert!(!found.is_chained());
        assert_eq!(found, Value::from("x"));

        let size = evaluate(&link, "a.H3.push(1, 2).size").unwrap();
        assert_eq!(size, Value::from(4));

        let upcased = evaluate(&link, "a.H3.1.deeper.upcase").unwrap();
        assert_eq!(upcased, Value::from("X"));
    }
}
