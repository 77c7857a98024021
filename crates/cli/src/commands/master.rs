// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `-start`, `-master`, `-stop` and `-reload`

use anyhow::Result;
use warden_daemon::{logging, Context, Role, SignalReport, StartOutcome};

/// Detach a background master and return.
pub async fn start(ctx: Context) -> Result<()> {
    let supervisor = super::supervisor(ctx)?;
    if let StartOutcome::Detached(pid) = supervisor.start().await? {
        tracing::debug!(pid, "master detached");
    }
    Ok(())
}

/// Supervise every configured unit until the workers are gone.
pub async fn master(ctx: Context) -> Result<()> {
    let _guard = logging::init(&ctx.log_path(), Role::Master, ctx.develop)?;
    let supervisor = match super::supervisor(ctx) {
        Ok(supervisor) => supervisor,
        Err(e) => {
            tracing::error!(error = %e, "master not started");
            return Err(e);
        }
    };
    println!(
        "start={},master pid={}",
        supervisor.context().conf.display(),
        std::process::id()
    );

    let listener = supervisor.spawn_signal_listener()?;
    let outcome = supervisor.start().await;
    listener.abort();
    outcome?;
    Ok(())
}

pub async fn stop(ctx: Context) -> Result<()> {
    let supervisor = super::supervisor(ctx)?;
    let report = supervisor
        .stop(std::io::stdin().lock(), std::io::stdout())
        .await;
    println!("{}", summary("stopped", &report));
    Ok(())
}

/// Interrupt the recorded workers, then detach a fresh master.
pub async fn reload(ctx: Context) -> Result<()> {
    let supervisor = super::supervisor(ctx)?;
    let outcome = supervisor.reload().await?;
    if let StartOutcome::Detached(pid) = outcome {
        println!("reloaded, master pid={}", pid);
    }
    Ok(())
}

/// One line describing what signalling the recorded workers achieved.
pub fn summary(verb: &str, report: &SignalReport) -> String {
    if report.signalled.is_empty() && report.failed.is_empty() {
        return "no running workers".to_string();
    }
    let mut line = format!("{} {} worker(s)", verb, report.signalled.len());
    if !report.failed.is_empty() {
        let pids: Vec<String> = report.failed.iter().map(|(pid, _)| pid.to_string()).collect();
        line.push_str(&format!(", not signalled: {}", pids.join(",")));
    }
    if !report.signalled.is_empty() && !report.exited {
        line.push_str(", some still running after grace period");
    }
    line
}

#[cfg(test)]
#[path = "master_tests.rs"]
mod tests;
