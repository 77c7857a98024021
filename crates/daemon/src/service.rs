// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Running the master under the OS service manager, and the
//! `-install`/`-uninstall` commands that register it there.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use warden_adapters::{ProcessLauncher, ServiceCallbacks, ServiceManager, Signaller};

use crate::context::Context;
use crate::supervisor::Supervisor;

/// Drives a [`Supervisor`] from service manager callbacks.
pub struct ServiceBridge<L, S> {
    supervisor: Supervisor<L, S>,
    monitor: Mutex<Option<JoinHandle<()>>>,
}

impl<L: ProcessLauncher, S: Signaller> ServiceBridge<L, S> {
    pub fn new(supervisor: Supervisor<L, S>) -> Self {
        Self {
            supervisor,
            monitor: Mutex::new(None),
        }
    }

    pub fn supervisor(&self) -> &Supervisor<L, S> {
        &self.supervisor
    }
}

#[async_trait]
impl<L: ProcessLauncher, S: Signaller> ServiceCallbacks for ServiceBridge<L, S> {
    async fn on_start(&self) {
        tracing::debug!("service starting");
    }

    async fn on_run(&self) {
        self.supervisor.register_instance();
        for err in self.supervisor.spawn_all() {
            tracing::error!(error = %err, "worker not started");
        }
        let supervisor = self.supervisor.clone();
        let handle = tokio::spawn(async move { supervisor.monitor().await });
        *self.monitor.lock() = Some(handle);
    }

    async fn on_stop(&self) {
        self.supervisor.service_stop().await;
        let handle = self.monitor.lock().take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                tracing::warn!(error = %e, "monitor task failed");
            }
        }
    }
}

/// Service name: the `-name` flag, else the executable stem.
pub fn service_name(flag: &str, ctx: &Context) -> String {
    if flag.is_empty() {
        ctx.app_name()
    } else {
        flag.to_string()
    }
}

/// Arguments the service manager starts the executable with.
pub fn install_args(conf: &str) -> Vec<String> {
    vec![
        "-service".to_string(),
        "-force".to_string(),
        format!("-conf={}", conf),
    ]
}

/// Register `name`; returns the line to show the operator.
pub async fn install<M: ServiceManager + ?Sized>(manager: &M, name: &str, conf: &str) -> String {
    let description = format!("{} service", name);
    match manager.install(name, &description, &install_args(conf)).await {
        Ok(status) => {
            tracing::info!(name, status = %status, "service installed");
            "install success".to_string()
        }
        Err(e) => format!("install failed,{}", e),
    }
}

/// Unregister `name`; returns the line to show the operator.
pub async fn uninstall<M: ServiceManager + ?Sized>(manager: &M, name: &str) -> String {
    match manager.remove(name).await {
        Ok(status) => {
            tracing::info!(name, status = %status, "service removed");
            "uninstall success".to_string()
        }
        Err(e) => format!("uninstall failed,{}", e),
    }
}

/// Host the master under the service manager until it asks us to stop.
pub async fn run<M, L, S>(manager: &M, bridge: Arc<ServiceBridge<L, S>>)
where
    M: ServiceManager + ?Sized,
    L: ProcessLauncher,
    S: Signaller,
{
    match manager.run(bridge).await {
        Ok(status) => tracing::info!(status = %status, "service finished"),
        Err(e) => tracing::error!(error = %e, "service failed"),
    }
}

#[cfg(test)]
#[path = "service_tests.rs"]
mod tests;
