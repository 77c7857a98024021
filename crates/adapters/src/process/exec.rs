// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Launcher backed by `tokio::process::Command`

use std::process::Stdio;

use tokio::process::{Child, Command};

use super::{LaunchError, LaunchSpec, ProcessLauncher};

#[derive(Clone, Default)]
pub struct ExecLauncher;

impl ExecLauncher {
    pub fn new() -> Self {
        Self
    }
}

impl ProcessLauncher for ExecLauncher {
    fn launch(&self, spec: &LaunchSpec) -> Result<Child, LaunchError> {
        let child = Command::new(&spec.program)
            .args(&spec.args)
            .current_dir(&spec.dir)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|source| LaunchError::Spawn {
                program: spec.program.clone(),
                source,
            })?;
        if child.id().is_none() {
            return Err(LaunchError::NoPid(spec.program.clone()));
        }
        Ok(child)
    }
}

#[cfg(test)]
#[path = "exec_tests.rs"]
mod tests;
