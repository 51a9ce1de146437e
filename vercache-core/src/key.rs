//! Versioned cache key derivation.
//!
//! Every logical key is qualified as `{prefix}:{version}:{logical_key}`
//! before it reaches the store. Bumping the version moves all readers to a
//! fresh namespace without touching the entries written under the old one.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Key prefix used when none is configured.
pub const DEFAULT_KEY_PREFIX: &str = "cache";

/// Version used when none is configured.
pub const DEFAULT_VERSION: i64 = 1;

/// Namespace discriminator embedded in every cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Version {
    Number(i64),
    Label(String),
}

impl Default for Version {
    fn default() -> Self {
        Version::Number(DEFAULT_VERSION)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Version::Number(n) => write!(f, "{}", n),
            Version::Label(label) => f.write_str(label),
        }
    }
}

impl FromStr for Version {
    type Err = std::convert::Infallible;

    /// Integers parse as `Number`, anything else is kept as a `Label`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.parse::<i64>() {
            Ok(n) => Version::Number(n),
            Err(_) => Version::Label(s.to_string()),
        })
    }
}

impl From<i64> for Version {
    fn from(n: i64) -> Self {
        Version::Number(n)
    }
}

impl From<i32> for Version {
    fn from(n: i32) -> Self {
        Version::Number(n.into())
    }
}

impl From<u32> for Version {
    fn from(n: u32) -> Self {
        Version::Number(n.into())
    }
}

impl From<&str> for Version {
    fn from(label: &str) -> Self {
        Version::Label(label.to_string())
    }
}

impl From<String> for Version {
    fn from(label: String) -> Self {
        Version::Label(label)
    }
}

/// Immutable prefix and default version of a cache facade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyScheme {
    prefix: String,
    version: Version,
}

impl Default for KeyScheme {
    fn default() -> Self {
        Self::new(DEFAULT_KEY_PREFIX, Version::default())
    }
}

impl KeyScheme {
    pub fn new(prefix: impl Into<String>, version: impl Into<Version>) -> Self {
        Self {
            prefix: prefix.into(),
            version: version.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// The version applied when a call does not override it.
    pub fn version(&self) -> &Version {
        &self.version
    }

    /// Qualify a logical key as `{prefix}:{version}:{key}`.
    ///
    /// The logical key is copied verbatim, so glob metacharacters in a
    /// pattern survive into the store key.
    pub fn make_key(&self, key: &str, version: Option<&Version>) -> String {
        let version = version.unwrap_or(&self.version);
        format!("{}:{}:{}", self.prefix, version, key)
    }

    /// Qualify a batch of logical keys, preserving order.
    pub fn make_keys<I, K>(&self, keys: I, version: Option<&Version>) -> Vec<String>
    where
        I: IntoIterator<Item = K>,
        K: AsRef<str>,
    {
        keys.into_iter()
            .map(|key| self.make_key(key.as_ref(), version))
            .collect()
    }
}
