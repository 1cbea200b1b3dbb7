use std::collections::HashMap;
use std::convert::Infallible;
use std::env;
use std::ffi::{OsStr, OsString};
use std::fmt;
use std::str::FromStr;

/// A single KEY=VALUE environment entry
///
/// Keys and values are raw OS strings so variables that are not UTF-8 pass
/// through to the child untouched.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EnvPair {
    pub key: OsString,
    pub value: OsString,
}

impl EnvPair {
    pub fn new(key: impl Into<OsString>, value: impl Into<OsString>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

impl fmt::Display for EnvPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}={}",
            self.key.to_string_lossy(),
            self.value.to_string_lossy()
        )
    }
}

/// Splits on the first `=` only, so values may themselves contain `=`.
/// An entry without `=` is a key with an empty value.
impl FromStr for EnvPair {
    type Err = Infallible;

    fn from_str(entry: &str) -> Result<Self, Self::Err> {
        Ok(match entry.split_once('=') {
            Some((key, value)) => EnvPair::new(key, value),
            None => EnvPair::new(entry, ""),
        })
    }
}

/// Snapshot of the current process environment
pub fn ambient() -> Vec<EnvPair> {
    env::vars_os()
        .map(|(key, value)| EnvPair { key, value })
        .collect()
}

/// Build the child environment
///
/// Unless `pristine` is set, the ambient entries are laid down first. The
/// extracted entries are then overlaid, so a remote parameter always wins
/// over an ambient variable with the same key. The returned order is
/// unspecified.
pub fn compose(pristine: bool, ambient: &[EnvPair], extracted: &[EnvPair]) -> Vec<EnvPair> {
    let mut merged: HashMap<&OsStr, &OsStr> = HashMap::new();

    if !pristine {
        for pair in ambient {
            merged.insert(&pair.key, &pair.value);
        }
    }

    for pair in extracted {
        merged.insert(&pair.key, &pair.value);
    }

    merged
        .into_iter()
        .map(|(key, value)| EnvPair::new(key, value))
        .collect()
}
