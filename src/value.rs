use std::{cmp::Ordering, fmt};

use serde::{
    ser::{SerializeMap, SerializeSeq},
    Deserialize, Serialize, Serializer,
};
use smartstring::alias::String as SmartString;

use crate::{new_ref, s_read, ChainError, ChainFloat, ChainInteger, RefType};

mod record;
mod table;

pub use record::Record;
pub use table::Table;

/// The kind of a value
///
/// This is what exclusion lists are made of, and what `class`, `is_a?` and
/// friends talk about. `Numeric` and `Object` are never the kind of an
/// actual value; they only exist so that kind queries have somewhere to go.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Kind {
    Empty,
    True,
    False,
    Integer,
    Float,
    String,
    Symbol,
    Vector,
    Table,
    Record,
    Kind,
    Numeric,
    Object,
}

impl Kind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Empty => "Empty",
            Self::True => "True",
            Self::False => "False",
            Self::Integer => "Integer",
            Self::Float => "Float",
            Self::String => "String",
            Self::Symbol => "Symbol",
            Self::Vector => "Vector",
            Self::Table => "Table",
            Self::Record => "Record",
            Self::Kind => "Kind",
            Self::Numeric => "Numeric",
            Self::Object => "Object",
        }
    }

    pub fn superkind(&self) -> Option<Kind> {
        match self {
            Self::Object => None,
            Self::Integer | Self::Float => Some(Self::Numeric),
            _ => Some(Self::Object),
        }
    }

    /// True if `other` is this kind or one of its ancestors.
    pub fn is_a(&self, other: Kind) -> bool {
        let mut kind = Some(*self);
        while let Some(k) = kind {
            if k == other {
                return true;
            }
            kind = k.superkind();
        }

        false
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// An interned-ish name
///
/// Symbols and strings are different things: a table may hold both `:a` and
/// `"a"` as distinct keys.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
pub struct Symbol(SmartString);

impl Symbol {
    pub fn new<S: AsRef<str>>(name: S) -> Self {
        Self(SmartString::from(name.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn inspect(&self) -> String {
        const OPERATORS: &[&str] = &[
            "[]", "[]=", "<<", "+", "-", "*", "/", "%", "==", "!=", "<", "<=", ">", ">=", "<=>",
            "!", "&", "|", "^",
        ];

        let name = self.as_str();
        let mut chars = name.chars();
        let plain = match chars.next() {
            Some(c) if c.is_alphabetic() || c == '_' => {
                let rest = chars.as_str();
                let rest = rest
                    .strip_suffix(|c| c == '?' || c == '!' || c == '=')
                    .unwrap_or(rest);
                rest.chars().all(|c| c.is_alphanumeric() || c == '_')
            }
            _ => OPERATORS.contains(&name),
        };

        if plain {
            format!(":{name}")
        } else {
            format!(":{name:?}")
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Symbol {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Shorthand for [`Symbol::new`].
pub fn sym<S: AsRef<str>>(name: S) -> Symbol {
    Symbol::new(name)
}

/// A table key
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    Empty,
    Boolean(bool),
    Integer(ChainInteger),
    String(String),
    Symbol(Symbol),
}

impl Key {
    pub fn inspect(&self) -> String {
        Value::from(self.clone()).inspect()
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Empty => Ok(()),
            Self::Boolean(bool_) => write!(f, "{bool_}"),
            Self::Integer(num) => write!(f, "{num}"),
            Self::String(str_) => write!(f, "{str_}"),
            Self::Symbol(sym) => write!(f, "{sym}"),
        }
    }
}

impl From<&str> for Key {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<String> for Key {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<Symbol> for Key {
    fn from(value: Symbol) -> Self {
        Self::Symbol(value)
    }
}

impl From<ChainInteger> for Key {
    fn from(value: ChainInteger) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for Key {
    fn from(value: i32) -> Self {
        Self::Integer(value as ChainInteger)
    }
}

impl From<bool> for Key {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl TryFrom<&Value> for Key {
    type Error = ChainError;

    fn try_from(value: &Value) -> Result<Self, <Key as TryFrom<&Value>>::Error> {
        match value {
            Value::Empty => Ok(Self::Empty),
            Value::Boolean(bool_) => Ok(Self::Boolean(*bool_)),
            Value::Integer(num) => Ok(Self::Integer(*num)),
            Value::String(str_) => Ok(Self::String(str_.to_owned())),
            Value::Symbol(sym) => Ok(Self::Symbol(sym.to_owned())),
            _ => Err(ChainError::Conversion {
                src: value.inspect(),
                dst: "Key".to_owned(),
            }),
        }
    }
}

/// This is a value
///
/// The dynamic data that chains walk over. Container elements live behind
/// [`RefType`]s, so a value pulled out of a container is the same value the
/// container holds, and writes through it are seen by the container.
#[derive(Clone, Debug)]
pub enum Value {
    Boolean(bool),
    Empty,
    Float(ChainFloat),
    Integer(ChainInteger),
    Kind(Kind),
    Record(Record),
    String(String),
    Symbol(Symbol),
    Table(Table),
    Vector(Vec<RefType<Self>>),
}

impl Value {
    pub fn kind(&self) -> Kind {
        match self {
            Self::Boolean(true) => Kind::True,
            Self::Boolean(false) => Kind::False,
            Self::Empty => Kind::Empty,
            Self::Float(_) => Kind::Float,
            Self::Integer(_) => Kind::Integer,
            Self::Kind(_) => Kind::Kind,
            Self::Record(_) => Kind::Record,
            Self::String(_) => Kind::String,
            Self::Symbol(_) => Kind::Symbol,
            Self::Table(_) => Kind::Table,
            Self::Vector(_) => Kind::Vector,
        }
    }

    pub fn is_empty_value(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// The developer-facing form of the value
    ///
    /// Strings are quoted, symbols carry their colon, and containers show
    /// their elements the same way.
    pub fn inspect(&self) -> String {
        match self {
            Self::Empty => "nil".to_owned(),
            Self::String(str_) => format!("{str_:?}"),
            Self::Symbol(sym) => sym.inspect(),
            Self::Vector(vec) => {
                let elements = vec
                    .iter()
                    .map(|v| s_read!(v).inspect())
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("[{elements}]")
            }
            Self::Table(table) => {
                let entries = table
                    .iter()
                    .map(|(k, v)| format!("{}=>{}", k.inspect(), s_read!(v).inspect()))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("{{{entries}}}")
            }
            Self::Record(record) => {
                let members = record
                    .iter()
                    .map(|(k, v)| format!("{k}={}", s_read!(v).inspect()))
                    .collect::<Vec<_>>()
                    .join(", ");
                if members.is_empty() {
                    format!("#<record {}>", record.type_name())
                } else {
                    format!("#<record {} {members}>", record.type_name())
                }
            }
            _ => self.to_string(),
        }
    }

    /// Strict equality: same kind, and equal all the way down.
    ///
    /// Unlike `==`, `1` is not `eql?` to `1.0`.
    pub fn eql(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Vector(a), Self::Vector(b)) => {
                a.len() == b.len()
                    && a.iter().zip(b.iter()).all(|(a, b)| {
                        std::sync::Arc::ptr_eq(a, b) || s_read!(a).eql(&s_read!(b))
                    })
            }
            (Self::Table(a), Self::Table(b)) => {
                a.len() == b.len()
                    && a.iter().all(|(k, v)| match b.get(k) {
                        Some(w) => std::sync::Arc::ptr_eq(v, w) || s_read!(v).eql(&s_read!(w)),
                        None => false,
                    })
            }
            (a, b) => a.kind() == b.kind() && a == b,
        }
    }

    /// Three way comparison
    ///
    /// Numbers compare across integer and float, strings and symbols compare
    /// lexically, and vectors compare element by element. Anything else is
    /// only comparable to something it is equal to.
    pub fn compare(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Integer(a), Self::Integer(b)) => Some(a.cmp(b)),
            (Self::Integer(a), Self::Float(b)) => (*a as ChainFloat).partial_cmp(b),
            (Self::Float(a), Self::Integer(b)) => a.partial_cmp(&(*b as ChainFloat)),
            (Self::Float(a), Self::Float(b)) => a.partial_cmp(b),
            (Self::String(a), Self::String(b)) => Some(a.cmp(b)),
            (Self::Symbol(a), Self::Symbol(b)) => Some(a.cmp(b)),
            (Self::Vector(a), Self::Vector(b)) => {
                for (a, b) in a.iter().zip(b.iter()) {
                    match s_read!(a).compare(&s_read!(b))? {
                        Ordering::Equal => continue,
                        ordering => return Some(ordering),
                    }
                }
                Some(a.len().cmp(&b.len()))
            }
            (a, b) if a == b => Some(Ordering::Equal),
            _ => None,
        }
    }

    /// Deep copy with every string table key turned into a symbol.
    pub fn symbolize_keys(&self) -> Self {
        match self {
            Self::Table(table) => {
                let mut result = Table::new();
                for (k, v) in table.iter() {
                    let key = match k {
                        Key::String(str_) => Key::Symbol(Symbol::new(str_)),
                        key => key.clone(),
                    };
                    result.insert(key, new_ref!(Value, s_read!(v).symbolize_keys()));
                }
                Self::Table(result)
            }
            Self::Vector(vec) => Self::Vector(
                vec.iter()
                    .map(|v| new_ref!(Value, s_read!(v).symbolize_keys()))
                    .collect(),
            ),
            value => value.clone(),
        }
    }
}

/// The user-facing form: strings without quotes, `nil` as nothing.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Boolean(bool_) => write!(f, "{bool_}"),
            Self::Empty => Ok(()),
            Self::Float(num) => write!(f, "{num:?}"),
            Self::Integer(num) => write!(f, "{num}"),
            Self::Kind(kind) => write!(f, "{kind}"),
            Self::String(str_) => write!(f, "{str_}"),
            Self::Symbol(sym) => write!(f, "{sym}"),
            Self::Record(_) | Self::Table(_) | Self::Vector(_) => write!(f, "{}", self.inspect()),
        }
    }
}

/// Equal operator for Value
///
/// This is `==`: integers and floats compare by numeric value, containers
/// compare element-wise, and tables ignore insertion order.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Boolean(a), Self::Boolean(b)) => a == b,
            (Self::Empty, Self::Empty) => true,
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::Float(a), Self::Integer(b)) => *a == *b as ChainFloat,
            (Self::Integer(a), Self::Integer(b)) => a == b,
            (Self::Integer(a), Self::Float(b)) => *a as ChainFloat == *b,
            (Self::Kind(a), Self::Kind(b)) => a == b,
            (Self::Record(a), Self::Record(b)) => a == b,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Symbol(a), Self::Symbol(b)) => a == b,
            (Self::Table(a), Self::Table(b)) => a == b,
            (Self::Vector(a), Self::Vector(b)) => {
                a.len() == b.len()
                    && a.iter().zip(b.iter()).all(|(a, b)| {
                        std::sync::Arc::ptr_eq(a, b) || *s_read!(a) == *s_read!(b)
                    })
            }
            _ => false,
        }
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.compare(other)
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Self::Boolean(bool_) => serializer.serialize_bool(*bool_),
            Self::Empty => serializer.serialize_unit(),
            Self::Float(num) => serializer.serialize_f64(*num),
            Self::Integer(num) => serializer.serialize_i64(*num),
            Self::Kind(kind) => serializer.serialize_str(kind.name()),
            Self::String(str_) => serializer.serialize_str(str_),
            Self::Symbol(sym) => serializer.serialize_str(sym.as_str()),
            Self::Vector(vec) => {
                let mut seq = serializer.serialize_seq(Some(vec.len()))?;
                for v in vec {
                    seq.serialize_element(&*s_read!(v))?;
                }
                seq.end()
            }
            Self::Table(table) => {
                let mut map = serializer.serialize_map(Some(table.len()))?;
                for (k, v) in table.iter() {
                    map.serialize_entry(&k.to_string(), &*s_read!(v))?;
                }
                map.end()
            }
            Self::Record(record) => {
                let mut map = serializer.serialize_map(Some(record.len()))?;
                for (k, v) in record.iter() {
                    map.serialize_entry(k.as_str(), &*s_read!(v))?;
                }
                map.end()
            }
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Empty,
            serde_json::Value::Bool(bool_) => Self::Boolean(bool_),
            serde_json::Value::Number(num) => match num.as_i64() {
                Some(num) => Self::Integer(num),
                None => Self::Float(num.as_f64().unwrap_or(ChainFloat::NAN)),
            },
            serde_json::Value::String(str_) => Self::String(str_),
            serde_json::Value::Array(vec) => Self::Vector(
                vec.into_iter()
                    .map(|v| new_ref!(Value, v.into()))
                    .collect(),
            ),
            serde_json::Value::Object(map) => {
                let mut table = Table::new();
                for (k, v) in map {
                    table.insert(Key::String(k), new_ref!(Value, v.into()));
                }
                Self::Table(table)
            }
        }
    }
}

impl From<Key> for Value {
    fn from(value: Key) -> Self {
        match value {
            Key::Empty => Self::Empty,
            Key::Boolean(bool_) => Self::Boolean(bool_),
            Key::Integer(num) => Self::Integer(num),
            Key::String(str_) => Self::String(str_),
            Key::Symbol(sym) => Self::Symbol(sym),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Self::Empty
    }
}

impl From<usize> for Value {
    fn from(value: usize) -> Self {
        Self::Integer(value as ChainInteger)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Integer(value as ChainInteger)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<Symbol> for Value {
    fn from(value: Symbol) -> Self {
        Self::Symbol(value)
    }
}

impl From<Kind> for Value {
    fn from(value: Kind) -> Self {
        Self::Kind(value)
    }
}

impl From<Table> for Value {
    fn from(value: Table) -> Self {
        Self::Table(value)
    }
}

impl From<Record> for Value {
    fn from(value: Record) -> Self {
        Self::Record(value)
    }
}

impl<T> From<Option<T>> for Value
where
    T: Into<Value>,
{
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => value.into(),
            None => Self::Empty,
        }
    }
}

impl<T> From<Vec<T>> for Value
where
    T: Into<Value>,
{
    fn from(value: Vec<T>) -> Self {
        let value = value
            .into_iter()
            .map(|v| new_ref!(Value, v.into()))
            .collect();
        Self::Vector(value)
    }
}

impl TryFrom<&Value> for ChainInteger {
    type Error = ChainError;

    fn try_from(value: &Value) -> Result<Self, <ChainInteger as TryFrom<&Value>>::Error> {
        match value {
            Value::Float(num) if num.is_finite() => Ok(*num as ChainInteger),
            Value::Integer(num) => Ok(*num),
            _ => Err(ChainError::Conversion {
                src: value.inspect(),
                dst: "Integer".to_owned(),
            }),
        }
    }
}

impl TryFrom<&Value> for ChainFloat {
    type Error = ChainError;

    fn try_from(value: &Value) -> Result<Self, <ChainFloat as TryFrom<&Value>>::Error> {
        match value {
            Value::Float(num) => Ok(*num),
            Value::Integer(num) => Ok(*num as ChainFloat),
            _ => Err(ChainError::Conversion {
                src: value.inspect(),
                dst: "Float".to_owned(),
            }),
        }
    }
}

impl TryFrom<&Value> for String {
    type Error = ChainError;

    fn try_from(value: &Value) -> Result<Self, <String as TryFrom<&Value>>::Error> {
        match value {
            Value::String(str_) => Ok(str_.to_owned()),
            Value::Symbol(sym) => Ok(sym.as_str().to_owned()),
            _ => Err(ChainError::Conversion {
                src: value.inspect(),
                dst: "String".to_owned(),
            }),
        }
    }
}

impl TryFrom<&Value> for Kind {
    type Error = ChainError;

    fn try_from(value: &Value) -> Result<Self, <Kind as TryFrom<&Value>>::Error> {
        match value {
            Value::Kind(kind) => Ok(*kind),
            _ => Err(ChainError::Conversion {
                src: value.inspect(),
                dst: "Kind".to_owned(),
            }),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn json_objects_keep_their_order() {
        let _ = env_logger::builder().is_test(true).try_init();

        let json: serde_json::Value = serde_json::from_str(r#"{"b": 1, "a": 2, "c": 3}"#).unwrap();
        let Value::Table(table) = Value::from(json) else {
            panic!("expected a table");
        };
        let keys: Vec<_> = table.keys().map(Key::inspect).collect();
        assert_eq!(keys, [r#""b""#, r#""a""#, r#""c""#]);
    }

    #[test]
    fn inspect_forms() {
        let _ = env_logger::builder().is_test(true).try_init();
        color_backtrace::install();

        let table = Table::new()
            .with("A", "a string")
            .with(sym("a"), vec![Value::from(1), Value::Empty, Value::from(2.0)]);

        assert_eq!(
            Value::from(table).inspect(),
            r#"{"A"=>"a string", :a=>[1, nil, 2.0]}"#
        );
        assert_eq!(Value::from(sym("deeper")).inspect(), ":deeper");
        assert_eq!(Value::from(sym("two words")).inspect(), r#":"two words""#);
        assert_eq!(Value::from(sym("empty?")).inspect(), ":empty?");
        assert_eq!(Value::from(sym("[]=")).inspect(), ":[]=");
        assert_eq!(Value::Empty.to_string(), "");
        assert_eq!(Value::from("hv1").to_string(), "hv1");
    }

    #[test]
    fn equality_is_numeric_but_eql_is_strict() {
        let _ = env_logger::builder().is_test(true).try_init();

        let one = Value::from(1);
        let one_f = Value::from(1.0);
        assert_eq!(one, one_f);
        assert!(!one.eql(&one_f));
        assert!(one.eql(&Value::from(1)));

        let a = Value::from(vec![1, 2]);
        let b = Value::from(vec![Value::from(1.0), Value::from(2)]);
        assert_eq!(a, b);
        assert!(!a.eql(&b));
    }

    #[test]
    fn tables_ignore_order_for_equality() {
        let a = Table::new().with("x", 1).with("y", 2);
        let b = Table::new().with("y", 2).with("x", 1);
        assert_eq!(Value::from(a), Value::from(b));
    }

    #[test]
    fn symbol_and_string_keys_are_distinct() {
        let table = Table::new().with("a", "string").with(sym("a"), "symbol");
        assert_eq!(table.len(), 2);
        assert_eq!(
            *s_read!(table.get(&Key::Symbol(sym("a"))).unwrap()),
            Value::from("symbol")
        );
    }

    #[test]
    fn compare_mixed() {
        assert_eq!(
            Value::from(1).compare(&Value::from(2.5)),
            Some(Ordering::Less)
        );
        assert_eq!(
            Value::from(vec![1, 2]).compare(&Value::from(vec![1, 3])),
            Some(Ordering::Less)
        );
        assert_eq!(Value::from("a").compare(&Value::from(1)), None);
        assert_eq!(Value::Empty.compare(&Value::Empty), Some(Ordering::Equal));
    }

    #[test]
    fn kinds_have_ancestors() {
        assert!(Kind::Integer.is_a(Kind::Numeric));
        assert!(Kind::Integer.is_a(Kind::Object));
        assert!(!Kind::String.is_a(Kind::Numeric));
        assert_eq!(Value::from(true).kind(), Kind::True);
        assert_eq!(Value::from(false).kind(), Kind::False);
    }

    #[test]
    fn from_json() {
        let json: serde_json::Value =
            serde_json::from_str(r#"{"a": [1, 2.5, null, true], "b": {"c": "d"}}"#).unwrap();
        let value = Value::from(json);
        assert_eq!(
            value.inspect(),
            r#"{"a"=>[1, 2.5, nil, true], "b"=>{"c"=>"d"}}"#
        );
        assert_eq!(
            value.symbolize_keys().inspect(),
            r#"{:a=>[1, 2.5, nil, true], :b=>{:c=>"d"}}"#
        );
        assert_eq!(
            serde_json::to_string(&value).unwrap(),
            r#"{"a":[1,2.5,null,true],"b":{"c":"d"}}"#
        );
    }
}
