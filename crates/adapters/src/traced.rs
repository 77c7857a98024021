// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced adapter wrappers for consistent observability

use crate::process::{LaunchError, LaunchSpec, ProcessLauncher};
use crate::signal::{SignalError, Signaller};
use tokio::process::Child;

/// Wrapper that adds tracing to any ProcessLauncher
#[derive(Clone)]
pub struct TracedLauncher<L> {
    inner: L,
}

impl<L> TracedLauncher<L> {
    pub fn new(inner: L) -> Self {
        Self { inner }
    }
}

impl<L: ProcessLauncher> ProcessLauncher for TracedLauncher<L> {
    fn launch(&self, spec: &LaunchSpec) -> Result<Child, LaunchError> {
        let span = tracing::info_span!(
            "process.launch",
            program = %spec.program.display(),
            appkey = spec.flag_value("appkey").unwrap_or(""),
        );
        let _guard = span.enter();
        tracing::debug!(args = ?spec.args, dir = %spec.dir.display(), "starting");
        let start = std::time::Instant::now();
        let result = self.inner.launch(spec);
        let elapsed_ms = start.elapsed().as_millis() as u64;
        match &result {
            Ok(child) => tracing::info!(pid = ?child.id(), elapsed_ms, "process launched"),
            Err(e) => tracing::error!(elapsed_ms, error = %e, "launch failed"),
        }
        result
    }
}

/// Wrapper that adds tracing to any Signaller
#[derive(Clone)]
pub struct TracedSignaller<S> {
    inner: S,
}

impl<S> TracedSignaller<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }
}

impl<S: Signaller> Signaller for TracedSignaller<S> {
    fn interrupt(&self, pid: u32) -> Result<(), SignalError> {
        let result = self.inner.interrupt(pid);
        tracing::info_span!("signal.interrupt", pid).in_scope(|| match &result {
            Ok(()) => tracing::info!("interrupted"),
            Err(SignalError::NoSuchProcess(_)) => tracing::debug!("already gone"),
            Err(e) => tracing::warn!(error = %e, "interrupt failed"),
        });
        result
    }

    fn is_alive(&self, pid: u32) -> bool {
        let alive = self.inner.is_alive(pid);
        tracing::trace!(pid, alive, "checked");
        alive
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;
