// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! OS service manager adapters

mod systemd;

pub use systemd::SystemdManager;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeServiceManager, ServiceCall};

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Errors from service manager operations
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("invalid service name {0:?}")]
    InvalidName(String),
    #[error("service {0} is already installed")]
    AlreadyInstalled(String),
    #[error("service {0} is not installed")]
    NotInstalled(String),
    #[error("{0}")]
    CommandFailed(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Lifecycle hooks the service manager drives while the service runs
#[async_trait]
pub trait ServiceCallbacks: Send + Sync + 'static {
    /// Service is starting
    async fn on_start(&self);
    /// Service should begin its work; must return promptly
    async fn on_run(&self);
    /// Service manager requested stop
    async fn on_stop(&self);
}

/// Adapter for registering with and running under the OS service manager
#[async_trait]
pub trait ServiceManager: Send + Sync + 'static {
    /// Register `name` to run the current executable with `args` at boot
    async fn install(
        &self,
        name: &str,
        description: &str,
        args: &[String],
    ) -> Result<String, ServiceError>;

    /// Unregister `name`
    async fn remove(&self, name: &str) -> Result<String, ServiceError>;

    /// Run under the service manager until it asks us to stop
    async fn run(&self, callbacks: Arc<dyn ServiceCallbacks>) -> Result<String, ServiceError>;
}

/// Validate a service name against a safe pattern.
/// Rejects names that could be used for argument or path injection.
pub(crate) fn validate_name(name: &str) -> Result<(), ServiceError> {
    let valid = !name.is_empty()
        && name.len() <= 256
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "@.-_".contains(c))
        && !name.starts_with('.');
    if valid {
        Ok(())
    } else {
        Err(ServiceError::InvalidName(name.to_string()))
    }
}
