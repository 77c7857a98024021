//! Test helpers for behavioral specifications.
//!
//! Provides a small DSL for running the warden binary against an isolated
//! config and state directory.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, dead_code)]

use std::cell::Cell;
use std::net::TcpListener;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Output, Stdio};

use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;

// Short grace and poll windows keep stop/reload specs fast.
const WARDEN_GRACE_MS: &str = "2000";
const WARDEN_POLL_MS: &str = "10";

// Spec polling timeouts
pub const SPEC_POLL_INTERVAL_MS: u64 = 10;
pub const SPEC_WAIT_MAX_MS: u64 = 5000;

/// Returns the path to a binary, checking llvm-cov target directory first.
/// Falls back to resolving relative to the test binary itself when
/// CARGO_MANIFEST_DIR points at a stale target directory.
fn binary_path(name: &str) -> PathBuf {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));

    let llvm_cov_path = manifest_dir.join("target/llvm-cov-target/debug").join(name);
    if llvm_cov_path.exists() {
        return llvm_cov_path;
    }

    let standard = manifest_dir.join("target/debug").join(name);
    if standard.exists() {
        return standard;
    }

    // The test binary lives at target/debug/deps/specs-<hash>.
    if let Ok(exe) = std::env::current_exe() {
        if let Some(debug_dir) = exe.parent().and_then(|d| d.parent()) {
            let fallback = debug_dir.join(name);
            if fallback.exists() {
                return fallback;
            }
        }
    }

    standard
}

pub fn warden_binary() -> PathBuf {
    binary_path("warden")
}

/// Create a CLI builder for warden invocations
pub fn cli() -> CliBuilder {
    CliBuilder::new()
}

/// High-level CLI builder for fluent test assertions
pub struct CliBuilder {
    args: Vec<String>,
    dir: Option<PathBuf>,
    envs: Vec<(String, String)>,
    stdin: Option<String>,
}

impl CliBuilder {
    fn new() -> Self {
        Self {
            args: Vec::new(),
            dir: None,
            envs: vec![
                ("WARDEN_GRACE_MS".into(), WARDEN_GRACE_MS.into()),
                ("WARDEN_POLL_MS".into(), WARDEN_POLL_MS.into()),
            ],
            stdin: None,
        }
    }

    pub fn args(mut self, args: &[&str]) -> Self {
        self.args.extend(args.iter().map(|s| s.to_string()));
        self
    }

    pub fn pwd(mut self, path: impl Into<PathBuf>) -> Self {
        self.dir = Some(path.into());
        self
    }

    pub fn env(mut self, key: &str, value: impl AsRef<Path>) -> Self {
        self.envs.push((
            key.to_string(),
            value.as_ref().to_string_lossy().to_string(),
        ));
        self
    }

    /// Feed `input` on stdin (the instance prompt of `-stop`)
    pub fn stdin(mut self, input: &str) -> Self {
        self.stdin = Some(input.to_string());
        self
    }

    /// Build the command without running it
    pub fn command(self) -> Command {
        let mut cmd = Command::new(warden_binary());
        cmd.args(&self.args);
        if let Some(dir) = self.dir {
            cmd.current_dir(dir);
        }
        // Keep the caller's overrides out of the specs.
        for var in ["WARDEN_STATE_DIR", "WARDEN_LOG", "WARDEN_SYSTEMD_DIR", "WARDEN_SYSTEMCTL"] {
            cmd.env_remove(var);
        }
        for (key, value) in self.envs {
            cmd.env(key, value);
        }
        cmd
    }

    fn assert(self) -> assert_cmd::assert::Assert {
        let stdin = self.stdin.clone();
        let mut cmd = assert_cmd::Command::from_std(self.command());
        if let Some(input) = stdin {
            cmd.write_stdin(input);
        }
        cmd.assert()
    }

    /// Run and expect success (exit code 0)
    pub fn passes(self) -> RunAssert {
        let output = self.assert().success().get_output().clone();
        RunAssert { output }
    }

    /// Run and expect the given exit code
    pub fn exits_with(self, code: i32) -> RunAssert {
        let output = self.assert().code(code).get_output().clone();
        RunAssert { output }
    }

    /// Run with all output discarded.
    ///
    /// Needed for `-start`: the detached master inherits stdout, so
    /// capturing it would block until the master exits.
    pub fn status(self) -> ExitStatus {
        let mut cmd = self.command();
        cmd.stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        cmd.status().expect("command should run")
    }
}

/// Result of a CLI run for chaining assertions
pub struct RunAssert {
    output: Output,
}

impl RunAssert {
    pub fn stdout(&self) -> String {
        String::from_utf8_lossy(&self.output.stdout).into_owned()
    }

    pub fn stderr(&self) -> String {
        String::from_utf8_lossy(&self.output.stderr).into_owned()
    }

    /// Assert stdout equals expected exactly (with diff on failure).
    pub fn stdout_eq(self, expected: &str) -> Self {
        let stdout = self.stdout();
        similar_asserts::assert_eq!(stdout, expected);
        self
    }

    pub fn stdout_has(self, expected: &str) -> Self {
        let stdout = self.stdout();
        assert!(
            stdout.contains(expected),
            "stdout does not contain '{}'\nstdout: {}",
            expected,
            stdout
        );
        self
    }

    pub fn stderr_has(self, expected: &str) -> Self {
        let stderr = self.stderr();
        assert!(
            stderr.contains(expected),
            "stderr does not contain '{}'\nstderr: {}",
            expected,
            stderr
        );
        self
    }

    pub fn stderr_lacks(self, unexpected: &str) -> Self {
        let stderr = self.stderr();
        assert!(
            !stderr.contains(unexpected),
            "stderr should not contain '{}'\nstderr: {}",
            unexpected,
            stderr
        );
        self
    }
}

// =============================================================================
// Polling
// =============================================================================

/// Poll a condition until it returns true or timeout is reached.
pub fn wait_for<F>(timeout_ms: u64, mut condition: F) -> bool
where
    F: FnMut() -> bool,
{
    let start = std::time::Instant::now();
    let timeout = std::time::Duration::from_millis(timeout_ms);
    let poll_interval = std::time::Duration::from_millis(SPEC_POLL_INTERVAL_MS);

    while start.elapsed() < timeout {
        if condition() {
            return true;
        }
        std::thread::sleep(poll_interval);
    }
    false
}

pub fn is_alive(pid: u32) -> bool {
    kill(Pid::from_raw(pid as i32), None).is_ok()
}

/// A loopback address nothing is listening on right now.
pub fn free_addr() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().to_string()
}

// =============================================================================
// Project
// =============================================================================

/// Config directory plus an isolated `WARDEN_STATE_DIR`.
pub struct Project {
    dir: tempfile::TempDir,
    state_dir: tempfile::TempDir,
    /// A master was started and must be torn down on drop
    started: Cell<bool>,
}

impl Project {
    pub fn empty() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
            state_dir: tempfile::tempdir().unwrap(),
            started: Cell::new(false),
        }
    }

    /// Project with a `warden.toml` declaring one unit per `(key, addr)`.
    pub fn with_units(units: &[(&str, &str)]) -> Self {
        let project = Self::empty();
        let mut config = String::from("restart = \"never\"\n");
        for (key, addr) in units {
            config.push_str(&format!("\n[[app]]\nkey = \"{}\"\naddr = \"{}\"\n", key, addr));
        }
        project.file("warden.toml", &config);
        project
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn file(&self, path: impl AsRef<Path>, content: &str) {
        let full_path = self.dir.path().join(path.as_ref());
        if let Some(parent) = full_path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(full_path, content).unwrap();
    }

    pub fn conf_path(&self) -> PathBuf {
        self.path().join("warden.toml")
    }

    pub fn conf_flag(&self) -> String {
        format!("-conf={}", self.conf_path().display())
    }

    pub fn state_path(&self) -> &Path {
        self.state_dir.path()
    }

    pub fn pid_path(&self) -> PathBuf {
        self.state_path().join("warden.pid")
    }

    pub fn mgr_path(&self) -> PathBuf {
        self.state_path().join("warden.mgr")
    }

    pub fn log(&self) -> String {
        std::fs::read_to_string(self.state_path().join("warden.log"))
            .unwrap_or_else(|_| "(no log)".to_string())
    }

    /// Run warden in this project's context
    pub fn warden(&self) -> CliBuilder {
        cli()
            .pwd(self.path())
            .env("WARDEN_STATE_DIR", self.state_path())
    }

    /// Detach a master for this project's config.
    pub fn start(&self) -> ExitStatus {
        self.started.set(true);
        self.warden().args(&["-start", &self.conf_flag()]).status()
    }

    /// Wait until the pid file lists `count` workers; returns them.
    pub fn wait_for_workers(&self, count: usize) -> Vec<u32> {
        let mut workers = Vec::new();
        let ready = wait_for(SPEC_WAIT_MAX_MS, || match self.pid_record() {
            Some((_, pids)) if pids.len() == count => {
                workers = pids;
                true
            }
            _ => false,
        });
        assert!(ready, "workers never recorded\nlog: {}", self.log());
        workers
    }

    /// `(master, workers)` from the pid file, if it parses.
    pub fn pid_record(&self) -> Option<(u32, Vec<u32>)> {
        let content = std::fs::read_to_string(self.pid_path()).ok()?;
        let (master, rest) = content.trim().split_once('|')?;
        let (_pipe, workers) = rest.split_once(':')?;
        let workers = workers
            .split(',')
            .filter(|s| !s.is_empty())
            .map(|s| s.parse().ok())
            .collect::<Option<Vec<u32>>>()?;
        Some((master.parse().ok()?, workers))
    }
}

impl Drop for Project {
    fn drop(&mut self) {
        if !self.started.get() {
            return;
        }
        // Never leave a master or its workers behind.
        if let Some((master, workers)) = self.pid_record() {
            let _ = kill(Pid::from_raw(master as i32), Signal::SIGTERM);
            for pid in workers {
                let _ = kill(Pid::from_raw(pid as i32), Signal::SIGINT);
            }
        }
    }
}
