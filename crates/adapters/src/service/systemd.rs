// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! systemd-backed service manager

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tokio::signal::unix::{signal, SignalKind};

use super::{validate_name, ServiceCallbacks, ServiceError, ServiceManager};

/// Default limit on a single `systemctl` call.
pub const SYSTEMCTL_TIMEOUT: Duration = Duration::from_secs(30);

/// Installs `<name>.service` unit files and drives `systemctl`.
#[derive(Debug, Clone)]
pub struct SystemdManager {
    unit_dir: PathBuf,
    systemctl: PathBuf,
    exe: PathBuf,
    timeout: Duration,
}

impl SystemdManager {
    /// Manager for `exe`, using `WARDEN_SYSTEMD_DIR` / `WARDEN_SYSTEMCTL`
    /// overrides when set.
    pub fn new(exe: impl Into<PathBuf>) -> Self {
        Self::with_paths(exe, crate::env::systemd_dir(), crate::env::systemctl())
    }

    pub fn with_paths(
        exe: impl Into<PathBuf>,
        unit_dir: impl Into<PathBuf>,
        systemctl: impl Into<PathBuf>,
    ) -> Self {
        Self {
            unit_dir: unit_dir.into(),
            systemctl: systemctl.into(),
            exe: exe.into(),
            timeout: SYSTEMCTL_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn unit_path(&self, name: &str) -> PathBuf {
        self.unit_dir.join(format!("{}.service", name))
    }

    /// Run `systemctl <args>`, killing it if it outlives the timeout.
    async fn systemctl(&self, args: &[&str]) -> Result<(), ServiceError> {
        let description = format!("systemctl {}", args.join(" "));
        let mut cmd = Command::new(&self.systemctl);
        cmd.args(args).kill_on_drop(true);
        let output = match tokio::time::timeout(self.timeout, cmd.output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                return Err(ServiceError::CommandFailed(format!(
                    "{} failed: {}",
                    description, e
                )))
            }
            Err(_) => {
                return Err(ServiceError::CommandFailed(format!(
                    "{} timed out after {}ms",
                    description,
                    self.timeout.as_millis()
                )))
            }
        };
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ServiceError::CommandFailed(format!(
                "{} exited with {}: {}",
                description,
                output.status,
                stderr.trim()
            )));
        }
        Ok(())
    }
}

/// Render the unit file for running `exe` with `args`.
pub(crate) fn render_unit(exe: &Path, description: &str, args: &[String]) -> String {
    let mut exec_start = quote_arg(&exe.display().to_string());
    for arg in args {
        exec_start.push(' ');
        exec_start.push_str(&quote_arg(arg));
    }
    let working_dir = exe
        .parent()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "/".to_string());

    format!(
        "[Unit]\n\
         Description={description}\n\
         After=network.target\n\
         \n\
         [Service]\n\
         Type=simple\n\
         ExecStart={exec_start}\n\
         WorkingDirectory={working_dir}\n\
         Restart=on-failure\n\
         \n\
         [Install]\n\
         WantedBy=multi-user.target\n"
    )
}

/// Quote an ExecStart argument when it contains whitespace or quotes.
fn quote_arg(arg: &str) -> String {
    if arg.is_empty() || arg.chars().any(|c| c.is_whitespace() || c == '"' || c == '\\') {
        let escaped = arg.replace('\\', "\\\\").replace('"', "\\\"");
        format!("\"{}\"", escaped)
    } else {
        arg.to_string()
    }
}

#[async_trait]
impl ServiceManager for SystemdManager {
    async fn install(
        &self,
        name: &str,
        description: &str,
        args: &[String],
    ) -> Result<String, ServiceError> {
        validate_name(name)?;
        let unit_path = self.unit_path(name);
        if unit_path.exists() {
            return Err(ServiceError::AlreadyInstalled(name.to_string()));
        }

        std::fs::create_dir_all(&self.unit_dir)?;
        std::fs::write(&unit_path, render_unit(&self.exe, description, args))?;
        tracing::info!(unit = %unit_path.display(), "wrote unit file");

        let unit = format!("{}.service", name);
        if let Err(e) = self.systemctl(&["daemon-reload"]).await {
            let _ = std::fs::remove_file(&unit_path);
            return Err(e);
        }
        if let Err(e) = self.systemctl(&["enable", &unit]).await {
            let _ = std::fs::remove_file(&unit_path);
            return Err(e);
        }
        Ok(format!("installed {}", unit_path.display()))
    }

    async fn remove(&self, name: &str) -> Result<String, ServiceError> {
        validate_name(name)?;
        let unit_path = self.unit_path(name);
        if !unit_path.exists() {
            return Err(ServiceError::NotInstalled(name.to_string()));
        }

        let unit = format!("{}.service", name);
        if let Err(e) = self.systemctl(&["disable", &unit]).await {
            tracing::warn!(error = %e, unit, "disable failed, removing unit file anyway");
        }
        std::fs::remove_file(&unit_path)?;
        self.systemctl(&["daemon-reload"]).await?;
        Ok(format!("removed {}", unit_path.display()))
    }

    async fn run(&self, callbacks: Arc<dyn ServiceCallbacks>) -> Result<String, ServiceError> {
        let mut sigterm = signal(SignalKind::terminate())?;
        let mut sigint = signal(SignalKind::interrupt())?;

        callbacks.on_start().await;
        callbacks.on_run().await;

        let received = tokio::select! {
            _ = sigterm.recv() => "SIGTERM",
            _ = sigint.recv() => "SIGINT",
        };
        tracing::info!(signal = received, "service stop requested");

        callbacks.on_stop().await;
        Ok(format!("Service exited on {}", received))
    }
}

#[cfg(test)]
#[path = "systemd_tests.rs"]
mod tests;
