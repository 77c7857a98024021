// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the daemon crate.

use std::path::PathBuf;
use std::time::Duration;

/// Filter directive variable read by the log subscriber.
pub const LOG_FILTER_VAR: &str = "WARDEN_LOG";

const DEFAULT_POLL: Duration = Duration::from_millis(30);

/// Directory holding `.pid`/`.mgr`/`.log` files instead of the executable's own directory.
pub fn state_dir() -> Option<PathBuf> {
    std::env::var("WARDEN_STATE_DIR")
        .ok()
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
}

/// Grace window override, taking precedence over the config file
pub fn grace_override() -> Option<Duration> {
    std::env::var("WARDEN_GRACE_MS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
}

/// How often liveness is polled while waiting for signalled processes.
pub fn poll_interval() -> Duration {
    std::env::var("WARDEN_POLL_MS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .filter(|ms| *ms > 0)
        .map(Duration::from_millis)
        .unwrap_or(DEFAULT_POLL)
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
