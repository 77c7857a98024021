// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Sending signals to processes by pid

mod unix;

pub use unix::NixSignaller;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeSignaller;

use thiserror::Error;

/// Errors from signalling a pid
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SignalError {
    #[error("invalid pid {0}")]
    InvalidPid(u32),
    #[error("no such process: {0}")]
    NoSuchProcess(u32),
    #[error("failed to signal {pid}: {reason}")]
    Failed { pid: u32, reason: String },
}

/// Adapter for interrupting processes the caller does not own a handle to
pub trait Signaller: Clone + Send + Sync + 'static {
    /// Ask the process to shut down gracefully (SIGINT)
    fn interrupt(&self, pid: u32) -> Result<(), SignalError>;

    /// Whether a process with this pid exists
    fn is_alive(&self, pid: u32) -> bool;
}
