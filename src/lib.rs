//! Uniform method-chain access to nested dynamic data.
//!
//! A [`Chain`] wraps a [`Value`] of unknown shape and resolves member names
//! against it, so that `data.a.H3.deeper` reads the same whether each step is
//! a method, a table key, a record member, or a vector index.
//!
//! ```
//! use chained::{Chain, Table, Value};
//!
//! let data = Table::new()
//!     .with("a", Table::new().with("h1", "hv1"))
//!     .into_value();
//! let chain = Chain::new(data).unwrap();
//!
//! let a = chain.get("a").unwrap();
//! assert!(a.is_chained());
//!
//! let h1 = a.get("h1").unwrap();
//! assert!(!h1.is_chained());
//! assert_eq!(h1, Value::from("hv1"));
//! ```
use std::ops;

pub mod chain;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod path;
pub mod value;
pub mod version;

pub use chain::{is_chained, Chain, Link};
pub use config::ChainConfig;
pub use dispatch::Arity;
pub use error::{ChainError, ChainErrorReporter, Result};
pub use value::{sym, Key, Kind, Record, Symbol, Table, Value};

pub type ChainInteger = i64;
pub type ChainFloat = f64;

/// A shared, lockable reference to a value.
///
/// Elements of vectors, tables and records are held behind one of these so
/// that unwrapping a chain hands back the very value the structure holds.
pub type RefType<T> = std::sync::Arc<parking_lot::RwLock<T>>;

pub trait NewRef<T> {
    fn new_ref(value: T) -> RefType<T>;
}

impl<T> NewRef<T> for RefType<T> {
    fn new_ref(value: T) -> RefType<T> {
        std::sync::Arc::new(parking_lot::RwLock::new(value))
    }
}

// Macros to abstract the underlying read/write operations.
#[macro_export]
macro_rules! s_read {
    ($arg:expr) => {
        $arg.read()
    };
}

#[macro_export]
macro_rules! s_write {
    ($arg:expr) => {
        $arg.write()
    };
}

#[macro_export]
macro_rules! new_ref {
    ($type:ty, $value:expr) => {
        <$crate::RefType<$type> as $crate::NewRef<$type>>::new_ref($value)
    };
}

pub type Span = ops::Range<usize>;

/// Member names with meaning to the chain itself.
mod keywords {
    pub(crate) const CHAINED: &str = "chained?";
    pub(crate) const UNCHAINED: &str = "unchained";
    pub(crate) const INDEX: &str = "[]";
    pub(crate) const INDEX_SET: &str = "[]=";
}

macro_rules! function {
    () => {{
        fn f() {}
        fn type_name_of<T>(_: T) -> &'static str {
            std::any::type_name::<T>()
        }
        let name = type_name_of(f);
        name.strip_suffix("::f").unwrap_or(name)
    }};
}
pub(crate) use function;

macro_rules! debug {
    ($target:literal, $($arg:tt)*) => {
        log::debug!(
            target: $target,
            "{}: {}\n  --> {}:{}:{}",
            ansi_term::Colour::Cyan.dimmed().italic().paint($crate::function!()),
            format_args!($($arg)*),
            file!(),
            line!(),
            column!()
        );
    };
}
pub(crate) use debug;

macro_rules! warning {
    ($target:literal, $($arg:tt)*) => {
        log::warn!(
            target: $target,
            "{}: {}\n  --> {}:{}:{}",
            ansi_term::Colour::Yellow.dimmed().italic().paint($crate::function!()),
            format_args!($($arg)*),
            file!(),
            line!(),
            column!()
        );
    };
}
pub(crate) use warning;
