//! Version information
use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{error::ChainError, Result};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const BUILD_TIME: &str = include!(concat!(env!("OUT_DIR"), "/timestamp.txt"));

/// A `major.minor.patch` version
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl FromStr for Version {
    type Err = ChainError;

    fn from_str(src: &str) -> Result<Self> {
        let conversion = || ChainError::Conversion {
            src: src.to_owned(),
            dst: "Version".to_owned(),
        };

        let mut parts = src.trim().splitn(3, '.').map(|part| part.parse::<u32>());
        let mut next = || parts.next().ok_or_else(conversion)?.map_err(|_| conversion());

        Ok(Self {
            major: next()?,
            minor: next()?,
            patch: next()?,
        })
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// This crate's version.
pub fn version() -> Result<Version> {
    VERSION.parse()
}
