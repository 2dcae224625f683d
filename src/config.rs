//! Process wide chain configuration
//!
//! Two lists govern every chain: the passthrough methods, which a chain
//! forwards to its contents as its own, and the exclusions, the kinds of
//! value that never stay wrapped. Both live behind one lock, and chains take
//! a [`current`] snapshot whenever they need them. A snapshot is shared, not
//! copied; changing the configuration swaps in a new one.
use std::{fs, path::Path, sync::Arc};

use lazy_static::lazy_static;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use snafu::prelude::*;

use crate::{
    error::{ConfigSnafu, IOSnafu},
    warning, Kind, Result,
};

pub const DEFAULT_PASSTHROUGH_METHODS: &[&str] = &[
    "<",
    "<=",
    "==",
    "eql?",
    ">",
    ">=",
    "<=>",
    "class",
    "inspect",
    "instance_of?",
    "is_a?",
    "kind_of?",
    "to_s",
    "to_str",
];

pub const DEFAULT_EXCLUSIONS: &[Kind] = &[
    Kind::Empty,
    Kind::Integer,
    Kind::String,
    Kind::Symbol,
    Kind::True,
    Kind::False,
];

lazy_static! {
    static ref CONFIG: RwLock<Arc<ChainConfig>> = RwLock::new(Arc::new(ChainConfig::default()));
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq, Serialize)]
#[serde(default)]
pub struct ChainConfig {
    /// Methods a chain forwards straight to its contents
    ///
    /// Results come back unwrapped.
    passthrough_methods: Vec<String>,
    /// Kinds that are never left wrapped
    exclusions: Vec<Kind>,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            passthrough_methods: DEFAULT_PASSTHROUGH_METHODS
                .iter()
                .map(|m| m.to_string())
                .collect(),
            exclusions: DEFAULT_EXCLUSIONS.to_vec(),
        }
    }
}

impl ChainConfig {
    pub fn new<M, S, E>(passthrough_methods: M, exclusions: E) -> Self
    where
        M: IntoIterator<Item = S>,
        S: Into<String>,
        E: IntoIterator<Item = Kind>,
    {
        let mut config = Self {
            passthrough_methods: Vec::new(),
            exclusions: Vec::new(),
        };
        config.set_passthrough_methods(passthrough_methods);
        config.set_exclusions(exclusions);
        config
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json).context(ConfigSnafu)?;
        Ok(Self::new(config.passthrough_methods, config.exclusions))
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).context(IOSnafu {
            message: path.display().to_string(),
        })?;
        Self::from_json(&json)
    }

    pub fn passthrough_methods(&self) -> &[String] {
        &self.passthrough_methods
    }

    pub fn exclusions(&self) -> &[Kind] {
        &self.exclusions
    }

    pub fn is_excluded(&self, kind: Kind) -> bool {
        self.exclusions.contains(&kind)
    }

    /// Replace the passthrough methods, dropping duplicates but keeping
    /// first-seen order.
    pub fn set_passthrough_methods<M, S>(&mut self, methods: M)
    where
        M: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.passthrough_methods.clear();
        for method in methods {
            let method = method.into();
            if self.passthrough_methods.contains(&method) {
                warning!("config", "duplicate passthrough method `{method}` ignored");
            } else {
                self.passthrough_methods.push(method);
            }
        }
    }

    pub fn set_exclusions<E: IntoIterator<Item = Kind>>(&mut self, exclusions: E) {
        self.exclusions.clear();
        for kind in exclusions {
            if !self.exclusions.contains(&kind) {
                self.exclusions.push(kind);
            }
        }
    }
}

/// A snapshot of the configuration.
pub fn current() -> Arc<ChainConfig> {
    CONFIG.read().clone()
}

/// Replace the whole configuration at once.
pub fn install(config: ChainConfig) {
    *CONFIG.write() = Arc::new(config);
}

/// Put the documented defaults back.
pub fn reset() {
    install(ChainConfig::default());
}

pub fn passthrough_methods() -> Vec<String> {
    CONFIG.read().passthrough_methods.clone()
}

pub fn set_passthrough_methods<M, S>(methods: M)
where
    M: IntoIterator<Item = S>,
    S: Into<String>,
{
    Arc::make_mut(&mut *CONFIG.write()).set_passthrough_methods(methods);
}

pub fn exclusions() -> Vec<Kind> {
    CONFIG.read().exclusions.clone()
}

pub fn set_exclusions<E: IntoIterator<Item = Kind>>(exclusions: E) {
    Arc::make_mut(&mut *CONFIG.write()).set_exclusions(exclusions);
}

pub fn is_excluded(kind: Kind) -> bool {
    CONFIG.read().is_excluded(kind)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn setters_keep_first_seen_order() {
        let _ = env_logger::builder().is_test(true).try_init();
        color_backtrace::install();

        let mut config = ChainConfig::default();
        config.set_passthrough_methods(["size", "==", "size", "keys", "=="]);
        assert_eq!(config.passthrough_methods(), ["size", "==", "keys"]);

        config.set_exclusions([Kind::Float, Kind::Empty, Kind::Float]);
        assert_eq!(config.exclusions(), [Kind::Float, Kind::Empty]);
        assert!(config.is_excluded(Kind::Float));
        assert!(!config.is_excluded(Kind::Integer));
    }

    #[test]
    fn json_fills_in_defaults() {
        let config = ChainConfig::from_json(r#"{"exclusions": ["float", "float"]}"#).unwrap();
        assert_eq!(config.exclusions(), [Kind::Float]);
        assert_eq!(
            config.passthrough_methods().len(),
            DEFAULT_PASSTHROUGH_METHODS.len()
        );

        let config = ChainConfig::from_json(r#"{"passthrough_methods": ["a", "a"]}"#).unwrap();
        assert_eq!(config.passthrough_methods(), ["a"]);
    }

    #[test]
    fn bad_json_is_a_config_error() {
        let result = ChainConfig::from_json(r#"{"exclusions": ["widget"]}"#);
        assert!(matches!(result, Err(crate::ChainError::Config { .. })));

        let result = ChainConfig::from_path("/no/such/config.json");
        assert!(matches!(result, Err(crate::ChainError::IO { .. })));
    }
}
