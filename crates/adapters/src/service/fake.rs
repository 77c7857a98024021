// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake service manager for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{ServiceCallbacks, ServiceError, ServiceManager};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Notify;

/// Recorded service manager call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceCall {
    Install {
        name: String,
        description: String,
        args: Vec<String>,
    },
    Remove {
        name: String,
    },
    Run,
}

#[derive(Default)]
struct FakeServiceState {
    installed: HashSet<String>,
    calls: Vec<ServiceCall>,
    fail_next: Option<String>,
}

/// In-memory service manager.
///
/// `run` invokes `on_start` and `on_run`, then waits for
/// [`FakeServiceManager::request_stop`] before invoking `on_stop`.
#[derive(Clone, Default)]
pub struct FakeServiceManager {
    inner: Arc<Mutex<FakeServiceState>>,
    stop: Arc<Notify>,
}

impl FakeServiceManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<ServiceCall> {
        self.inner.lock().calls.clone()
    }

    pub fn is_installed(&self, name: &str) -> bool {
        self.inner.lock().installed.contains(name)
    }

    /// Make the next install/remove fail with `reason`
    pub fn fail_next(&self, reason: &str) {
        self.inner.lock().fail_next = Some(reason.to_string());
    }

    /// Simulate the service manager asking the service to stop
    pub fn request_stop(&self) {
        self.stop.notify_one();
    }
}

#[async_trait]
impl ServiceManager for FakeServiceManager {
    async fn install(
        &self,
        name: &str,
        description: &str,
        args: &[String],
    ) -> Result<String, ServiceError> {
        let mut inner = self.inner.lock();
        inner.calls.push(ServiceCall::Install {
            name: name.to_string(),
            description: description.to_string(),
            args: args.to_vec(),
        });
        if let Some(reason) = inner.fail_next.take() {
            return Err(ServiceError::CommandFailed(reason));
        }
        if !inner.installed.insert(name.to_string()) {
            return Err(ServiceError::AlreadyInstalled(name.to_string()));
        }
        Ok(format!("installed {}", name))
    }

    async fn remove(&self, name: &str) -> Result<String, ServiceError> {
        let mut inner = self.inner.lock();
        inner.calls.push(ServiceCall::Remove {
            name: name.to_string(),
        });
        if let Some(reason) = inner.fail_next.take() {
            return Err(ServiceError::CommandFailed(reason));
        }
        if !inner.installed.remove(name) {
            return Err(ServiceError::NotInstalled(name.to_string()));
        }
        Ok(format!("removed {}", name))
    }

    async fn run(&self, callbacks: Arc<dyn ServiceCallbacks>) -> Result<String, ServiceError> {
        self.inner.lock().calls.push(ServiceCall::Run);
        callbacks.on_start().await;
        callbacks.on_run().await;
        self.stop.notified().await;
        callbacks.on_stop().await;
        Ok("stopped".to_string())
    }
}
