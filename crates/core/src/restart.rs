// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! What the master does when a worker exits while it is still running.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RestartPolicy {
    /// Exited workers stay down
    #[default]
    Never,
    /// Respawn unless the worker exited with code 0
    OnFailure,
    /// Respawn on every exit
    Always,
}

impl RestartPolicy {
    /// `exit_code` is `None` when the worker was killed by a signal.
    pub fn should_restart(self, exit_code: Option<i32>) -> bool {
        match self {
            RestartPolicy::Never => false,
            RestartPolicy::OnFailure => exit_code != Some(0),
            RestartPolicy::Always => true,
        }
    }
}

impl std::fmt::Display for RestartPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RestartPolicy::Never => "never",
            RestartPolicy::OnFailure => "on-failure",
            RestartPolicy::Always => "always",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
#[path = "restart_tests.rs"]
mod tests;
