// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Mode implementations

pub mod master;
pub mod serve;
pub mod service;

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use warden_adapters::{ExecLauncher, NixSignaller, TracedLauncher, TracedSignaller};
use warden_core::{resolve_config_path, AppConfig};
use warden_daemon::{Context, Supervisor};

use crate::dispatch::{Invocation, Mode};

/// Supervisor wired to real processes and signals.
pub type LiveSupervisor = Supervisor<TracedLauncher<ExecLauncher>, TracedSignaller<NixSignaller>>;

pub async fn run(inv: Invocation) -> Result<()> {
    let ctx = context(&inv)?;
    match inv.mode {
        Mode::Start => master::start(ctx).await,
        Mode::Master => master::master(ctx).await,
        Mode::Stop => master::stop(ctx).await,
        Mode::Reload => master::reload(ctx).await,
        Mode::Service => service::service(ctx, &inv.name).await,
        Mode::Install => service::install(&ctx, &inv.name, &inv.conf).await,
        Mode::Uninstall => service::uninstall(&ctx, &inv.name).await,
        Mode::Daemon => serve::daemon(ctx, &inv.pipe, inv.parent_pid).await,
        Mode::Foreground => serve::foreground(ctx).await,
    }
}

/// Build the invocation context: executable, absolute config path, flags.
pub fn context(inv: &Invocation) -> Result<Context> {
    let exe = std::env::current_exe().context("cannot locate the running executable")?;
    let cwd = std::env::current_dir().context("cannot read the current directory")?;
    let mut ctx = Context::new(exe, PathBuf::new())
        .with_app_key(inv.app_key.clone())
        .with_master(inv.master)
        .with_force(inv.force)
        .with_develop(inv.develop);
    ctx.conf = resolve_config_path(&inv.conf, &ctx.exe_dir(), &cwd);
    Ok(ctx)
}

pub fn load_config(ctx: &Context) -> Result<AppConfig> {
    Ok(AppConfig::load(&ctx.conf)?)
}

pub fn supervisor(ctx: Context) -> Result<LiveSupervisor> {
    let config = load_config(&ctx)?;
    Ok(Supervisor::new(
        ctx,
        config,
        TracedLauncher::new(ExecLauncher::new()),
        TracedSignaller::new(NixSignaller::new()),
    ))
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
