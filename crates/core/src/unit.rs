// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Application units: the things a master spawns one worker for.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Key naming one configured application unit.
///
/// Passed to workers as `-appkey=<key>` and used to look the unit up again
/// in the worker's own copy of the config.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnitKey(String);

impl UnitKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for UnitKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for UnitKey {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for UnitKey {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl PartialEq<str> for UnitKey {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for UnitKey {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl std::borrow::Borrow<str> for UnitKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// One configured application unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitConfig {
    pub key: UnitKey,
    /// Listen address for the unit's worker (e.g. `127.0.0.1:8080`)
    pub addr: String,
}

impl UnitConfig {
    pub fn new(key: impl Into<UnitKey>, addr: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            addr: addr.into(),
        }
    }
}

#[cfg(test)]
#[path = "unit_tests.rs"]
mod tests;
