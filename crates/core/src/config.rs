// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Application configuration loaded from a TOML file.
//!
//! ```toml
//! restart = "on-failure"
//! grace_ms = 3000
//!
//! [[app]]
//! key = "web"
//! addr = "127.0.0.1:8080"
//! ```

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::{RestartPolicy, UnitConfig};

/// Config file name looked up next to the executable when `-conf` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "warden.toml";

const DEFAULT_GRACE_MS: u64 = 3000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {0}: {1}")]
    Read(PathBuf, #[source] std::io::Error),
    #[error("failed to parse config {0}: {1}")]
    Parse(PathBuf, #[source] toml::de::Error),
    #[error("config {0} declares no [[app]] units")]
    NoUnits(PathBuf),
    #[error("config {0}: unit key must not be empty")]
    EmptyKey(PathBuf),
    #[error("config {0}: duplicate unit key {1:?}")]
    DuplicateKey(PathBuf, String),
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    #[serde(default)]
    restart: RestartPolicy,
    #[serde(default = "default_grace_ms")]
    grace_ms: u64,
    #[serde(default)]
    shutdown_timeout_ms: u64,
    #[serde(default, rename = "app")]
    units: Vec<UnitConfig>,
}

fn default_grace_ms() -> u64 {
    DEFAULT_GRACE_MS
}

/// Loaded configuration plus the path it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    path: PathBuf,
    pub restart: RestartPolicy,
    pub grace: Duration,
    /// Deadline for draining in-flight connections on worker shutdown
    pub shutdown_timeout: Option<Duration>,
    units: Vec<UnitConfig>,
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::Read(path.to_owned(), e))?;
        Self::parse(&content, path)
    }

    pub fn parse(content: &str, path: &Path) -> Result<Self, ConfigError> {
        let raw: RawConfig =
            toml::from_str(content).map_err(|e| ConfigError::Parse(path.to_owned(), e))?;

        if raw.units.is_empty() {
            return Err(ConfigError::NoUnits(path.to_owned()));
        }
        let mut seen = HashSet::new();
        for unit in &raw.units {
            if unit.key.is_empty() {
                return Err(ConfigError::EmptyKey(path.to_owned()));
            }
            if !seen.insert(unit.key.as_str()) {
                return Err(ConfigError::DuplicateKey(
                    path.to_owned(),
                    unit.key.to_string(),
                ));
            }
        }

        Ok(Self {
            path: path.to_owned(),
            restart: raw.restart,
            grace: Duration::from_millis(raw.grace_ms),
            shutdown_timeout: (raw.shutdown_timeout_ms > 0)
                .then(|| Duration::from_millis(raw.shutdown_timeout_ms)),
            units: raw.units,
        })
    }

    /// Configured units in declaration order.
    pub fn units(&self) -> &[UnitConfig] {
        &self.units
    }

    pub fn unit(&self, key: &str) -> Option<&UnitConfig> {
        self.units.iter().find(|u| u.key == key)
    }

    /// Path this configuration was loaded from.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Resolve the `-conf` flag to an absolute path.
///
/// Empty falls back to [`DEFAULT_CONFIG_FILE`] in `exe_dir`; relative paths
/// are taken against `cwd`.
pub fn resolve_config_path(conf: &str, exe_dir: &Path, cwd: &Path) -> PathBuf {
    if conf.is_empty() {
        return exe_dir.join(DEFAULT_CONFIG_FILE);
    }
    let path = Path::new(conf);
    if path.is_absolute() {
        path.to_owned()
    } else {
        cwd.join(path)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
