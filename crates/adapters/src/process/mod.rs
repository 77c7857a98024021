// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Launching copies of the running executable

mod exec;

pub use exec::ExecLauncher;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeLauncher, LaunchCall};

use std::path::PathBuf;
use thiserror::Error;
use tokio::process::Child;

/// Errors from launching a process
#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("started {0} but it has no pid")]
    NoPid(PathBuf),
}

/// Fully spelled-out process launch: what to run, with which arguments,
/// from which directory.
///
/// Standard output and error are inherited from the launching process;
/// standard input is closed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchSpec {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub dir: PathBuf,
}

impl LaunchSpec {
    pub fn new(program: impl Into<PathBuf>, dir: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            dir: dir.into(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Value of the first `-<name>=...` argument, if any.
    pub fn flag_value(&self, name: &str) -> Option<&str> {
        let prefix = format!("-{}=", name);
        self.args
            .iter()
            .find_map(|a| a.strip_prefix(prefix.as_str()))
    }

    pub fn has_flag(&self, name: &str) -> bool {
        let flag = format!("-{}", name);
        self.args.iter().any(|a| *a == flag)
    }
}

/// Adapter for starting child processes without waiting on them
pub trait ProcessLauncher: Clone + Send + Sync + 'static {
    fn launch(&self, spec: &LaunchSpec) -> Result<Child, LaunchError>;
}

#[cfg(test)]
#[path = "spec_tests.rs"]
mod tests;
