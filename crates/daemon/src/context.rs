// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-invocation context: which executable, which config, and where the
//! shared state files live.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Everything an invocation needs to find its peers.
///
/// State files share a base path: the executable itself, or
/// `$WARDEN_STATE_DIR/<exe stem>` when that variable is set.
#[derive(Debug, Clone)]
pub struct Context {
    pub exe: PathBuf,
    /// Absolute path of the config file in use
    pub conf: PathBuf,
    /// App key given on the command line, forwarded to workers
    pub app_key: String,
    /// This invocation is the master (it spawns workers instead of detaching)
    pub master: bool,
    /// Ignore prior instance registry contents
    pub force: bool,
    pub develop: bool,
    base: PathBuf,
}

impl Context {
    pub fn new(exe: impl Into<PathBuf>, conf: impl Into<PathBuf>) -> Self {
        let exe = exe.into();
        let base = file_base(&exe, crate::env::state_dir().as_deref());
        Self {
            exe,
            conf: conf.into(),
            app_key: String::new(),
            master: false,
            force: false,
            develop: false,
            base,
        }
    }

    /// Keep state files under `dir` regardless of the environment.
    pub fn with_state_dir(mut self, dir: &Path) -> Self {
        self.base = file_base(&self.exe, Some(dir));
        self
    }

    pub fn with_app_key(mut self, key: impl Into<String>) -> Self {
        self.app_key = key.into();
        self
    }

    pub fn with_master(mut self, master: bool) -> Self {
        self.master = master;
        self
    }

    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    pub fn with_develop(mut self, develop: bool) -> Self {
        self.develop = develop;
        self
    }

    /// Directory containing the executable; children run from here.
    pub fn exe_dir(&self) -> PathBuf {
        match self.exe.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_owned(),
            _ => PathBuf::from("."),
        }
    }

    /// Executable file name without its extension.
    pub fn app_name(&self) -> String {
        self.exe
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    pub fn pid_path(&self) -> PathBuf {
        with_suffix(&self.base, "pid")
    }

    pub fn mgr_path(&self) -> PathBuf {
        with_suffix(&self.base, "mgr")
    }

    pub fn log_path(&self) -> PathBuf {
        with_suffix(&self.base, "log")
    }
}

fn file_base(exe: &Path, state_dir: Option<&Path>) -> PathBuf {
    match state_dir {
        Some(dir) => {
            let stem = exe
                .file_stem()
                .map(|s| s.to_owned())
                .unwrap_or_else(|| OsString::from("warden"));
            dir.join(stem)
        }
        None => exe.to_owned(),
    }
}

// Appends rather than replacing an extension: `app.exe` -> `app.exe.pid`.
fn with_suffix(base: &Path, ext: &str) -> PathBuf {
    let mut s = base.as_os_str().to_owned();
    s.push(".");
    s.push(ext);
    PathBuf::from(s)
}

#[cfg(test)]
#[path = "context_tests.rs"]
mod tests;
