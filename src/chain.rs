//! The chain proxy
//!
//! A [`Chain`] stands in for the value it wraps. Asking it for a member runs
//! through the following, in order:
//!
//! 1. Its own members: `chained?`, `unchained`, and the passthrough methods
//!    it picked up when it was built. These answer raw.
//! 2. The contents' own method of that name. The answer is wrapped.
//! 3. A lookup with `[]`, if the contents can do that. The key is the name as
//!    a symbol, as a string, or as an integer, whichever the contents holds
//!    first. A name ending in `=` stores with `[]=` instead. The answer is
//!    wrapped.
//! 4. Failing all that, the call goes to the contents anyway, and whatever it
//!    says (usually an error) comes back as is.
//!
//! Wrapped answers whose kind is excluded come back raw after all.
use std::{cmp::Ordering, fmt};

use serde::{Serialize, Serializer};

use crate::{
    config::{self, ChainConfig},
    debug,
    dispatch::{self, Arity},
    error::ChainError,
    keywords::{CHAINED, INDEX, INDEX_SET, UNCHAINED},
    new_ref, s_read, ChainInteger, RefType, Result, Symbol, Value,
};

/// A wrapped value
#[derive(Clone)]
pub struct Chain {
    contents: RefType<Value>,
    forwarders: Vec<(String, Arity)>,
}

/// The outcome of asking a chain (or a raw value) for a member.
#[derive(Clone, Debug)]
pub enum Link {
    Chained(Chain),
    Raw(RefType<Value>),
}

/// Is this link a chain?
pub fn is_chained(link: &Link) -> bool {
    link.is_chained()
}

impl Chain {
    /// Wrap a fresh value, honouring the exclusions.
    pub fn new<V: Into<Value>>(value: V) -> Result<Self> {
        Self::wrap(new_ref!(Value, value.into()), true)
    }

    /// Wrap an existing reference
    ///
    /// With `honour_exclusions`, contents of an excluded kind are refused
    /// with [`ChainError::Exclusion`].
    pub fn wrap(contents: RefType<Value>, honour_exclusions: bool) -> Result<Self> {
        Self::wrap_with(contents, honour_exclusions, &config::current())
    }

    fn wrap_with(
        contents: RefType<Value>,
        honour_exclusions: bool,
        config: &ChainConfig,
    ) -> Result<Self> {
        let forwarders = {
            let value = s_read!(contents);
            let kind = value.kind();
            if honour_exclusions && config.is_excluded(kind) {
                return Err(ChainError::Exclusion { kind });
            }

            config
                .passthrough_methods()
                .iter()
                .filter_map(|name| value.arity(name).map(|arity| (name.to_owned(), arity)))
                .collect()
        };

        Ok(Self {
            contents,
            forwarders,
        })
    }

    pub fn is_chained(&self) -> bool {
        true
    }

    /// The wrapped reference itself.
    pub fn unchained(&self) -> RefType<Value> {
        self.contents.clone()
    }

    /// The names this chain forwards to its contents as its own.
    pub fn forwarders(&self) -> impl Iterator<Item = &str> {
        self.forwarders.iter().map(|(name, _)| name.as_str())
    }

    /// Resolve `name` with `args`.
    pub fn send(&self, name: &str, args: &[RefType<Value>]) -> Result<Link> {
        // Self-defined
        match name {
            CHAINED => {
                check_nullary(name, args)?;
                return Ok(Link::Raw(new_ref!(Value, Value::Boolean(true))));
            }
            UNCHAINED => {
                check_nullary(name, args)?;
                return Ok(Link::Raw(self.unchained()));
            }
            _ => {}
        }

        if let Some((_, arity)) = self.forwarders.iter().find(|(n, _)| n == name) {
            if *arity == Arity::Nullary {
                check_nullary(name, args)?;
            }
            debug!("chain", "`{name}` is a passthrough");
            return dispatch::send(&self.contents, name, args).map(Link::Raw);
        }

        let config = config::current();
        let (direct, lookup) = {
            let value = s_read!(self.contents);
            (value.responds_to(name), value.responds_to(INDEX))
        };

        // Direct forwarding
        if direct {
            debug!("chain", "`{name}` is a method of the contents");
            let result = dispatch::send(&self.contents, name, args)?;
            return rewrap(result, &config);
        }

        // Container lookup
        if lookup {
            let (method, stem) = match setter_stem(name) {
                Some(stem) => (INDEX_SET, stem),
                None => (INDEX, name),
            };
            let key = self.key_for(stem);
            debug!("chain", "`{name}` is `{method}` with key {}", key.inspect());

            let mut lookup_args = Vec::with_capacity(args.len() + 1);
            lookup_args.push(new_ref!(Value, key));
            lookup_args.extend(args.iter().cloned());

            let result = dispatch::send(&self.contents, method, &lookup_args)?;
            return rewrap(result, &config);
        }

        // Unresolvable
        debug!("chain", "`{name}` is unresolved; forwarding as is");
        dispatch::send(&self.contents, name, args).map(Link::Raw)
    }

    /// The first of the candidate keys for `name` that the contents holds,
    /// or the last candidate if it holds none.
    fn key_for(&self, name: &str) -> Value {
        let mut candidates = vec![Value::Symbol(Symbol::new(name)), Value::from(name)];
        if let Ok(index) = name.parse::<ChainInteger>() {
            if index.to_string() == name {
                candidates.push(Value::Integer(index));
            }
        }

        let value = s_read!(self.contents);
        let found = candidates.iter().position(|key| value.has_key(key));
        let pos = found.unwrap_or(candidates.len() - 1);
        candidates.swap_remove(pos)
    }

    /// A member with no arguments.
    pub fn get(&self, name: &str) -> Result<Link> {
        self.send(name, &[])
    }

    /// A member with arguments
    ///
    /// ```
    /// use chained::{Chain, Value};
    ///
    /// let chain = Chain::new(vec![1, 2, 3, 4, 5]).unwrap();
    /// let slice = chain.call("[]", [1, 3]).unwrap();
    /// assert!(slice.is_chained());
    /// assert_eq!(slice, Value::from(vec![2, 3, 4]));
    /// ```
    pub fn call<I, V>(&self, name: &str, args: I) -> Result<Link>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.send(name, &refs(args))
    }

    pub fn index<K: Into<Value>>(&self, key: K) -> Result<Link> {
        self.send(INDEX, &[new_ref!(Value, key.into())])
    }

    pub fn assign<K: Into<Value>, V: Into<Value>>(&self, key: K, value: V) -> Result<Link> {
        self.send(
            INDEX_SET,
            &[new_ref!(Value, key.into()), new_ref!(Value, value.into())],
        )
    }

    pub fn inspect(&self) -> String {
        s_read!(self.contents).inspect()
    }
}

fn rewrap(result: RefType<Value>, config: &ChainConfig) -> Result<Link> {
    let kind = s_read!(result).kind();
    if config.is_excluded(kind) {
        debug!("chain", "{kind} is excluded; unwrapped");
        Ok(Link::Raw(result))
    } else {
        Chain::wrap_with(result, false, config).map(Link::Chained)
    }
}

/// `name=` with a non-empty name.
fn setter_stem(name: &str) -> Option<&str> {
    name.strip_suffix('=').filter(|stem| !stem.is_empty())
}

fn check_nullary(name: &str, args: &[RefType<Value>]) -> Result<()> {
    if args.is_empty() {
        Ok(())
    } else {
        Err(ChainError::WrongNumberOfArguments {
            method: name.to_owned(),
            expected: 0,
            got: args.len(),
        })
    }
}

fn refs<I, V>(args: I) -> Vec<RefType<Value>>
where
    I: IntoIterator<Item = V>,
    V: Into<Value>,
{
    args.into_iter().map(|a| new_ref!(Value, a.into())).collect()
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", s_read!(self.contents))
    }
}

impl fmt::Debug for Chain {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.inspect())
    }
}

impl PartialEq<Value> for Chain {
    fn eq(&self, other: &Value) -> bool {
        *s_read!(self.contents) == *other
    }
}

impl PartialEq for Chain {
    fn eq(&self, other: &Self) -> bool {
        std::sync::Arc::ptr_eq(&self.contents, &other.contents)
            || *s_read!(self.contents) == *s_read!(other.contents)
    }
}

impl PartialOrd<Value> for Chain {
    fn partial_cmp(&self, other: &Value) -> Option<Ordering> {
        s_read!(self.contents).compare(other)
    }
}

impl Serialize for Chain {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        s_read!(self.contents).serialize(serializer)
    }
}

impl Link {
    pub fn is_chained(&self) -> bool {
        matches!(self, Self::Chained(_))
    }

    /// The value behind the link, chained or not.
    pub fn unchained(&self) -> RefType<Value> {
        match self {
            Self::Chained(chain) => chain.unchained(),
            Self::Raw(value) => value.clone(),
        }
    }

    /// A copy of the value behind the link.
    pub fn value(&self) -> Value {
        s_read!(self.unchained()).clone()
    }

    pub fn chain(&self) -> Option<&Chain> {
        match self {
            Self::Chained(chain) => Some(chain),
            Self::Raw(_) => None,
        }
    }

    /// Keep going
    ///
    /// Chains resolve as usual. Raw values only answer to their own methods.
    pub fn send(&self, name: &str, args: &[RefType<Value>]) -> Result<Link> {
        match self {
            Self::Chained(chain) => chain.send(name, args),
            Self::Raw(value) => dispatch::send(value, name, args).map(Link::Raw),
        }
    }

    pub fn get(&self, name: &str) -> Result<Link> {
        self.send(name, &[])
    }

    pub fn call<I, V>(&self, name: &str, args: I) -> Result<Link>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.send(name, &refs(args))
    }

    pub fn index<K: Into<Value>>(&self, key: K) -> Result<Link> {
        self.send(INDEX, &[new_ref!(Value, key.into())])
    }

    pub fn assign<K: Into<Value>, V: Into<Value>>(&self, key: K, value: V) -> Result<Link> {
        self.send(
            INDEX_SET,
            &[new_ref!(Value, key.into()), new_ref!(Value, value.into())],
        )
    }

    pub fn inspect(&self) -> String {
        s_read!(self.unchained()).inspect()
    }
}

impl From<Chain> for Link {
    fn from(chain: Chain) -> Self {
        Self::Chained(chain)
    }
}

impl fmt::Display for Link {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Chained(chain) => write!(f, "{chain}"),
            Self::Raw(value) => write!(f, "{}", s_read!(value)),
        }
    }
}

impl PartialEq<Value> for Link {
    fn eq(&self, other: &Value) -> bool {
        *s_read!(self.unchained()) == *other
    }
}

impl PartialOrd<Value> for Link {
    fn partial_cmp(&self, other: &Value) -> Option<Ordering> {
        s_read!(self.unchained()).compare(other)
    }
}

impl Serialize for Link {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        s_read!(self.unchained()).serialize(serializer)
    }
}
