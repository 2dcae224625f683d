use std::{fmt, io};

use ansi_term::Colour;
use ariadne::{Color, Label, Report, ReportKind, Source};
use snafu::{prelude::*, Location};

use crate::{value::Kind, Span};

const ERR_CLR: Colour = Colour::Red;
const OK_CLR: Colour = Colour::Green;
const POP_CLR: Colour = Colour::Yellow;
const OTH_CLR: Colour = Colour::Cyan;

pub type Result<T, E = ChainError> = std::result::Result<T, E>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ChainError {
    #[snafu(display("\n{}: could not convert `{}` to `{}`", ERR_CLR.bold().paint("error"), src, dst))]
    Conversion { src: String, dst: String },
    #[snafu(display("\n{}: comparison of `{}` with `{}` failed", ERR_CLR.bold().paint("error"), POP_CLR.paint(left), POP_CLR.paint(right)))]
    Comparison { left: String, right: String },
    #[snafu(display("\n{}: could not load configuration", ERR_CLR.bold().paint("error")))]
    Config { source: serde_json::Error },
    #[snafu(display("\n{}: could not parse JSON document", ERR_CLR.bold().paint("error")))]
    Document { source: serde_json::Error },
    #[snafu(display("\n{}: divided by 0", ERR_CLR.bold().paint("error")))]
    DivideByZero { location: Location },
    /// A value of an excluded kind was handed to the chain constructor.
    #[snafu(display("\n{}: cannot wrap `{}` instance; `{}` is on the exclusion list", ERR_CLR.bold().paint("error"), OTH_CLR.paint(kind.to_string()), OTH_CLR.paint(kind.to_string())))]
    Exclusion { kind: Kind },
    #[snafu(display("\n{}: index {} outside of `{}` (length {})", ERR_CLR.bold().paint("error"), POP_CLR.paint(index.to_string()), receiver, len))]
    IndexOutOfBounds {
        index: i64,
        len: usize,
        receiver: String,
        location: Location,
    },
    #[snafu(display("\n{}: error with input/output `{}`.", ERR_CLR.bold().paint("error"), OTH_CLR.paint(message)))]
    IO { message: String, source: io::Error },
    #[snafu(display("\n{}: key not found: `{}`", ERR_CLR.bold().paint("error"), POP_CLR.paint(key)))]
    KeyNotFound { key: String, location: Location },
    #[snafu(display("\n{}: no such method `{}` for `{}`.", ERR_CLR.bold().paint("error"), OTH_CLR.paint(method), receiver))]
    NoSuchMethod {
        method: String,
        receiver: String,
        location: Location,
    },
    #[snafu(display("\n{}: no member `{}` in record `{}`", ERR_CLR.bold().paint("error"), OTH_CLR.paint(member), POP_CLR.paint(record)))]
    NoSuchMember {
        member: String,
        record: String,
        location: Location,
    },
    /// An integer result, or a new string or vector, too large to represent.
    #[snafu(display("\n{}: `{}` overflowed", ERR_CLR.bold().paint("error"), OTH_CLR.paint(operation)))]
    Overflow {
        operation: String,
        location: Location,
    },
    /// A chain path did not parse.
    #[snafu(display("\n{}: invalid chain path `{}`: {}", ERR_CLR.bold().paint("error"), POP_CLR.paint(src), message))]
    Path {
        src: String,
        message: String,
        span: Span,
    },
    #[snafu(display("\n{}: wrong number of arguments for `{}`. Expected `{}`, found `{}`.", ERR_CLR.bold().paint("error"), OTH_CLR.paint(method), OK_CLR.paint(expected.to_string()), ERR_CLR.bold().paint(got.to_string())))]
    WrongNumberOfArguments {
        method: String,
        expected: usize,
        got: usize,
    },
}

/// Pretty printer for [`ChainError`].
///
/// Path errors are drawn against the path source with ariadne. The second
/// field asks for the "uber" report, which adds the crate source location
/// that raised the error, where there is one.
pub struct ChainErrorReporter<'a>(pub &'a ChainError, pub bool);

impl fmt::Display for ChainErrorReporter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let is_uber = self.1;
        let file_name = "path";

        let mut std_err = Vec::new();

        match &self.0 {
            ChainError::Path { src, message, span } => {
                Report::build(ReportKind::Error, file_name, span.start)
                    .with_message("invalid chain path")
                    .with_label(
                        Label::new((file_name, span.to_owned()))
                            .with_message(message)
                            .with_color(Color::Red),
                    )
                    .finish()
                    .write((file_name, Source::from(src)), &mut std_err)
                    .map_err(|_| fmt::Error)?;
                write!(f, "{}", String::from_utf8_lossy(&std_err))
            }
            ChainError::DivideByZero { location }
            | ChainError::IndexOutOfBounds { location, .. }
            | ChainError::KeyNotFound { location, .. }
            | ChainError::NoSuchMethod { location, .. }
            | ChainError::NoSuchMember { location, .. }
            | ChainError::Overflow { location, .. }
                if is_uber =>
            {
                write!(
                    f,
                    "{}\n  --> {}:{}:{}",
                    self.0,
                    OTH_CLR.paint(location.file.to_string()),
                    POP_CLR.paint(format!("{}", location.line)),
                    OK_CLR.paint(format!("{}", location.column)),
                )
            }
            _ => write!(f, "{}", self.0),
        }
    }
}
