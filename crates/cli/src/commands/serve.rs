// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `-daemon` workers and the foreground server

use anyhow::Result;
use warden_daemon::{
    logging, resolve_unit, Context, Role, StatusDispatch, WorkerRuntime, FATAL_EXIT_CODE,
};

use crate::exit_error::ExitError;

/// Serve the unit named by `-appkey` on behalf of the master `master_pid`.
pub async fn daemon(ctx: Context, pipe: &str, master_pid: i64) -> Result<()> {
    let _guard = logging::init(&ctx.log_path(), Role::Worker, ctx.develop)?;
    tracing::info!(appkey = %ctx.app_key, pipe, master_pid, "worker starting");
    serve(&ctx, Role::Worker).await
}

/// Serve one unit in this process, without a master.
pub async fn foreground(ctx: Context) -> Result<()> {
    let _guard = logging::init(&ctx.log_path(), Role::Foreground, ctx.develop)?;
    serve(&ctx, Role::Foreground).await
}

async fn serve(ctx: &Context, role: Role) -> Result<()> {
    match run_unit(ctx).await {
        Ok(()) => Ok(()),
        Err(e) => {
            tracing::error!(role = %role, error = %e, "worker failed");
            Err(ExitError::new(FATAL_EXIT_CODE, e.to_string()).into())
        }
    }
}

async fn run_unit(ctx: &Context) -> Result<()> {
    let config = super::load_config(ctx)?;
    let unit = resolve_unit(&config, &ctx.app_key)?;
    let dispatch = StatusDispatch::new(&unit.key);
    let summary = WorkerRuntime::new(unit, dispatch)
        .with_shutdown_timeout(config.shutdown_timeout)
        .run()
        .await?;
    tracing::debug!(accepted = summary.accepted, "worker finished");
    Ok(())
}
