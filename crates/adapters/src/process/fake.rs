// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake launcher for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{LaunchError, LaunchSpec, ProcessLauncher};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::process::{Child, Command};

/// Recorded launch call
#[derive(Debug, Clone)]
pub struct LaunchCall {
    pub spec: LaunchSpec,
    /// Pid of the stand-in process, `None` when the launch was made to fail
    pub pid: Option<u32>,
}

struct FakeLauncherState {
    calls: Vec<LaunchCall>,
    scripts: HashMap<String, String>,
    failing: HashSet<String>,
    default_script: String,
}

/// Runs `sh -c <script>` in place of the real executable.
///
/// Launches are keyed by their first `-appkey=` value; a launch without one
/// (the detached master) uses the key `""`.
#[derive(Clone)]
pub struct FakeLauncher {
    inner: Arc<Mutex<FakeLauncherState>>,
}

impl Default for FakeLauncher {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(FakeLauncherState {
                calls: Vec::new(),
                scripts: HashMap::new(),
                failing: HashSet::new(),
                default_script: "exit 0".to_string(),
            })),
        }
    }
}

impl FakeLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script run for launches with the given key
    pub fn script(&self, key: &str, script: &str) {
        self.inner
            .lock()
            .scripts
            .insert(key.to_string(), script.to_string());
    }

    /// Script run for keys without a specific script
    pub fn default_script(&self, script: &str) {
        self.inner.lock().default_script = script.to_string();
    }

    /// Make launches with the given key fail
    pub fn fail(&self, key: &str) {
        self.inner.lock().failing.insert(key.to_string());
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<LaunchCall> {
        self.inner.lock().calls.clone()
    }

    /// Recorded launches for one key
    pub fn calls_for(&self, key: &str) -> Vec<LaunchCall> {
        self.calls()
            .into_iter()
            .filter(|c| c.spec.flag_value("appkey").unwrap_or("") == key)
            .collect()
    }
}

impl ProcessLauncher for FakeLauncher {
    fn launch(&self, spec: &LaunchSpec) -> Result<Child, LaunchError> {
        let key = spec.flag_value("appkey").unwrap_or("").to_string();
        let mut inner = self.inner.lock();

        if inner.failing.contains(&key) {
            inner.calls.push(LaunchCall {
                spec: spec.clone(),
                pid: None,
            });
            return Err(LaunchError::Spawn {
                program: spec.program.clone(),
                source: std::io::Error::other("injected launch failure"),
            });
        }

        let script = inner
            .scripts
            .get(&key)
            .cloned()
            .unwrap_or_else(|| inner.default_script.clone());
        let child = Command::new("sh")
            .arg("-c")
            .arg(&script)
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| LaunchError::Spawn {
                program: spec.program.clone(),
                source,
            })?;
        inner.calls.push(LaunchCall {
            spec: spec.clone(),
            pid: child.id(),
        });
        Ok(child)
    }
}
