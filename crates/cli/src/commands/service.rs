// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `-service`, `-install` and `-uninstall`

use std::sync::Arc;

use anyhow::Result;
use warden_adapters::SystemdManager;
use warden_daemon::service::{self, service_name};
use warden_daemon::{logging, Context, Role, ServiceBridge};

/// Host the master under the service manager.
pub async fn service(ctx: Context, name: &str) -> Result<()> {
    let _guard = logging::init(&ctx.log_path(), Role::Service, ctx.develop)?;
    let name = service_name(name, &ctx);
    let manager = SystemdManager::new(ctx.exe.clone());
    let supervisor = super::supervisor(ctx)?;
    tracing::info!(
        name = %name,
        conf = %supervisor.context().conf.display(),
        master_pid = std::process::id(),
        "service starting"
    );
    service::run(&manager, Arc::new(ServiceBridge::new(supervisor))).await;
    Ok(())
}

/// Register the service; the outcome is printed and the exit is clean either way.
pub async fn install(ctx: &Context, name: &str, conf: &str) -> Result<()> {
    let name = service_name(name, ctx);
    let manager = SystemdManager::new(ctx.exe.clone());
    println!("{}", service::install(&manager, &name, conf).await);
    Ok(())
}

pub async fn uninstall(ctx: &Context, name: &str) -> Result<()> {
    let name = service_name(name, ctx);
    let manager = SystemdManager::new(ctx.exe.clone());
    println!("{}", service::uninstall(&manager, &name).await);
    Ok(())
}
