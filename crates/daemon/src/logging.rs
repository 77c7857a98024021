// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Log file setup for long-lived processes.

use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::WorkerGuard;

use crate::env::LOG_FILTER_VAR;

/// Startup marker prefix written to the log before anything else.
/// Full format: "--- warden: starting (pid: 12345, role: master) ---"
pub const STARTUP_MARKER_PREFIX: &str = "--- warden: starting (pid: ";

/// Rotate once the log grows past this size.
pub const MAX_LOG_SIZE: u64 = 10 * 1024 * 1024;

const MAX_ROTATIONS: u32 = 3;

/// Which kind of process is writing to the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Master,
    Worker,
    Service,
    Foreground,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Role::Master => "master",
            Role::Worker => "worker",
            Role::Service => "service",
            Role::Foreground => "foreground",
        };
        f.write_str(s)
    }
}

/// Rotate (master roles only), write the startup marker, and install the
/// global subscriber. Keep the guard alive until exit so buffered lines flush.
pub fn init(log_path: &Path, role: Role, develop: bool) -> std::io::Result<WorkerGuard> {
    if let Some(parent) = log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    if matches!(role, Role::Master | Role::Service) {
        rotate_log_if_needed(log_path);
    }
    write_startup_marker(log_path, role)?;
    setup_logging(log_path, develop)
}

/// Append the startup marker line to the log.
pub fn write_startup_marker(log_path: &Path, role: Role) -> std::io::Result<()> {
    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)?;
    writeln!(
        file,
        "{}{}, role: {}) ---",
        STARTUP_MARKER_PREFIX,
        std::process::id(),
        role
    )
}

/// Move `warden.log` to `warden.log.1`, shifting older rotations up and
/// dropping the oldest, once the log exceeds [`MAX_LOG_SIZE`].
pub fn rotate_log_if_needed(log_path: &Path) {
    let Ok(meta) = std::fs::metadata(log_path) else {
        return;
    };
    if meta.len() <= MAX_LOG_SIZE {
        return;
    }
    for i in (1..MAX_ROTATIONS).rev() {
        let from = rotated(log_path, i);
        if from.exists() {
            let _ = std::fs::rename(&from, rotated(log_path, i + 1));
        }
    }
    let _ = std::fs::rename(log_path, rotated(log_path, 1));
}

fn rotated(log_path: &Path, n: u32) -> PathBuf {
    let mut s = log_path.as_os_str().to_owned();
    s.push(format!(".{}", n));
    PathBuf::from(s)
}

fn setup_logging(log_path: &Path, develop: bool) -> std::io::Result<WorkerGuard> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let dir = log_path.parent().unwrap_or_else(|| Path::new("."));
    let file_name = log_path.file_name().ok_or_else(|| {
        std::io::Error::new(std::io::ErrorKind::InvalidInput, "log path has no file name")
    })?;
    let file_appender = tracing_appender::rolling::never(dir, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let default_level = if develop { "debug" } else { "info" };
    let filter = EnvFilter::try_from_env(LOG_FILTER_VAR)
        .unwrap_or_else(|_| EnvFilter::new(default_level));
    let stderr = develop.then(|| fmt::layer().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_ansi(false).with_writer(non_blocking))
        .with(stderr)
        .try_init()
        .map_err(std::io::Error::other)?;

    Ok(guard)
}

#[cfg(test)]
#[path = "logging_tests.rs"]
mod tests;
