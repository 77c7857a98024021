// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process supervision: launching workers, watching them exit, and fanning
//! interrupts out to the pids a previous invocation recorded.
//!
//! The same [`Supervisor`] serves both sides of the pid file. Inside the
//! master it owns the [`MasterState`] and is the only writer of the pid
//! file. In a short-lived `-stop`/`-reload` invocation it only reads the
//! record and signals what it finds there.

use std::io::{BufRead, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use thiserror::Error;
use tokio::process::Child;
use tokio::sync::{mpsc, Notify};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use warden_adapters::{LaunchError, LaunchSpec, ProcessLauncher, SignalError, Signaller};
use warden_core::{AppConfig, MasterPhase, PidRecord, UnitConfig, UnitKey};
use warden_storage::{InstanceRegistry, PidFileStore};

use crate::context::Context;
use crate::master::MasterState;
use crate::registry::{UnitStatus, WorkUnit};
use crate::signals::Termination;

#[derive(Debug, Error)]
pub enum SupervisorError {
    #[error("failed to start worker {key}: {source}")]
    Spawn {
        key: UnitKey,
        #[source]
        source: LaunchError,
    },
    #[error("failed to start master: {0}")]
    Detach(#[source] LaunchError),
    #[error("not starting worker {0}: master is shutting down")]
    ShuttingDown(UnitKey),
}

/// What [`Supervisor::start`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    /// A master was launched in the background with this pid
    Detached(u32),
    /// This process was the master and every worker has finished
    Finished,
}

/// Outcome of interrupting a set of pids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignalReport {
    pub signalled: Vec<u32>,
    pub failed: Vec<(u32, SignalError)>,
    /// Every signalled pid was gone before the grace window ran out
    pub exited: bool,
}

#[derive(Debug)]
struct WorkerExit {
    slot: usize,
    key: UnitKey,
    code: Option<i32>,
}

#[derive(Clone)]
pub struct Supervisor<L, S> {
    ctx: Arc<Context>,
    config: Arc<AppConfig>,
    launcher: L,
    signaller: S,
    pid_file: PidFileStore,
    instances: InstanceRegistry,
    state: Arc<Mutex<MasterState>>,
    draining: Arc<Notify>,
    shutdown_started: Arc<AtomicBool>,
    cleaned_up: Arc<AtomicBool>,
    grace: Duration,
    poll: Duration,
}

impl<L: ProcessLauncher, S: Signaller> Supervisor<L, S> {
    pub fn new(ctx: Context, config: AppConfig, launcher: L, signaller: S) -> Self {
        let grace = crate::env::grace_override().unwrap_or(config.grace);
        Self {
            pid_file: PidFileStore::new(ctx.pid_path()),
            instances: InstanceRegistry::new(ctx.mgr_path(), ctx.force),
            state: Arc::new(Mutex::new(MasterState::new(std::process::id()))),
            ctx: Arc::new(ctx),
            config: Arc::new(config),
            launcher,
            signaller,
            draining: Arc::new(Notify::new()),
            shutdown_started: Arc::new(AtomicBool::new(false)),
            cleaned_up: Arc::new(AtomicBool::new(false)),
            grace,
            poll: crate::env::poll_interval(),
        }
    }

    pub fn with_grace(mut self, grace: Duration) -> Self {
        self.grace = grace;
        self
    }

    pub fn with_poll_interval(mut self, poll: Duration) -> Self {
        self.poll = poll;
        self
    }

    pub fn context(&self) -> &Context {
        &self.ctx
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn pid_file(&self) -> &PidFileStore {
        &self.pid_file
    }

    pub fn phase(&self) -> MasterPhase {
        self.state.lock().phase
    }

    pub fn is_running(&self) -> bool {
        self.state.lock().running
    }

    pub fn unit_statuses(&self) -> Vec<UnitStatus> {
        self.state.lock().units.statuses()
    }

    /// Detach a background master, or, when this process is the master,
    /// spawn every unit and supervise until they have all exited.
    pub async fn start(&self) -> Result<StartOutcome, SupervisorError> {
        if !self.ctx.master {
            return self.detach().map(StartOutcome::Detached);
        }
        self.register_instance();
        for err in self.spawn_all() {
            match err {
                SupervisorError::ShuttingDown(_) => tracing::info!(error = %err, "worker not started"),
                _ => tracing::error!(error = %err, "worker not started"),
            }
        }
        self.monitor().await;
        Ok(StartOutcome::Finished)
    }

    /// Relaunch this executable as `-master -start`.
    pub fn master_spec(&self) -> LaunchSpec {
        LaunchSpec::new(self.ctx.exe.clone(), self.ctx.exe_dir())
            .arg("-master")
            .arg("-start")
            .arg(format!("-conf={}", self.ctx.conf.display()))
    }

    /// Launch arguments for the worker serving `key`.
    pub fn worker_spec(&self, key: &UnitKey) -> LaunchSpec {
        worker_spec(&self.ctx, &self.state.lock(), key)
    }

    fn detach(&self) -> Result<u32, SupervisorError> {
        let spec = self.master_spec();
        let child = self
            .launcher
            .launch(&spec)
            .map_err(SupervisorError::Detach)?;
        let pid = child
            .id()
            .ok_or_else(|| SupervisorError::Detach(LaunchError::NoPid(spec.program.clone())))?;
        tracing::info!(pid, conf = %self.ctx.conf.display(), "master detached");
        Ok(pid)
    }

    /// Add this config to the instance registry.
    pub fn register_instance(&self) {
        let entry = self.ctx.conf.display().to_string();
        match self.instances.append(&entry) {
            Ok(true) => tracing::info!(conf = %entry, "registered instance"),
            Ok(false) => tracing::debug!(conf = %entry, "instance already registered"),
            Err(e) => tracing::warn!(error = %e, "failed to register instance"),
        }
    }

    /// Spawn one worker per configured unit.
    ///
    /// Failed launches are returned and leave their slot not running;
    /// the remaining units are still attempted.
    pub fn spawn_all(&self) -> Vec<SupervisorError> {
        {
            let mut state = self.state.lock();
            if !state.advance(MasterPhase::Spawning) {
                return Vec::new();
            }
            state.running = true;
            tracing::info!(
                master_pid = state.pid,
                conf = %self.ctx.conf.display(),
                units = self.config.units().len(),
                "starting workers"
            );
        }
        self.config
            .units()
            .iter()
            .filter_map(|unit| self.spawn_worker(unit).err())
            .collect()
    }

    /// Launch the worker for `unit`, record it and rewrite the pid file.
    ///
    /// Refused once shutdown has begun, so no worker outlives the interrupt.
    pub fn spawn_worker(&self, unit: &UnitConfig) -> Result<u32, SupervisorError> {
        let mut state = self.state.lock();
        if !accepts_workers(&state) {
            return Err(SupervisorError::ShuttingDown(unit.key.clone()));
        }
        let spec = worker_spec(&self.ctx, &state, &unit.key);
        let launched = self.launcher.launch(&spec).and_then(|child| match child.id() {
            Some(pid) => Ok((pid, child)),
            None => Err(LaunchError::NoPid(spec.program.clone())),
        });
        let result = match launched {
            Ok((pid, child)) => {
                state.units.push(WorkUnit::started(unit.key.clone(), child));
                tracing::info!(key = %unit.key, pid, "worker started");
                Ok(pid)
            }
            Err(source) => {
                state.units.push(WorkUnit::failed(unit.key.clone()));
                Err(SupervisorError::Spawn {
                    key: unit.key.clone(),
                    source,
                })
            }
        };
        self.persist(&state);
        result
    }

    /// Wait for every tracked worker to exit, then clean up.
    ///
    /// Exits are handled in the order they arrive. Once shutdown has begun,
    /// stragglers get one grace window before monitoring gives up on them.
    pub async fn monitor(&self) {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut outstanding = 0usize;
        {
            let mut state = self.state.lock();
            state.advance(MasterPhase::Monitoring);
            let keys: Vec<UnitKey> = state.units.iter().map(|u| u.key.clone()).collect();
            for (slot, key) in keys.into_iter().enumerate() {
                if let Some(child) = state.units.take_child(slot) {
                    spawn_wait(tx.clone(), slot, key, child);
                    outstanding += 1;
                }
            }
        }

        let mut deadline: Option<Instant> = None;
        while outstanding > 0 {
            let exit = match deadline {
                Some(at) => match tokio::time::timeout_at(at, rx.recv()).await {
                    Ok(exit) => exit,
                    Err(_) => {
                        tracing::warn!(outstanding, "workers still running after grace window");
                        break;
                    }
                },
                None => tokio::select! {
                    exit = rx.recv() => exit,
                    _ = self.draining.notified() => {
                        deadline = Some(Instant::now() + self.grace);
                        continue;
                    }
                },
            };
            let Some(exit) = exit else {
                break;
            };
            outstanding -= 1;
            if self.record_exit(&exit) {
                if let Some(child) = self.respawn(exit.slot) {
                    spawn_wait(tx.clone(), exit.slot, exit.key, child);
                    outstanding += 1;
                }
            }
        }
        self.cleanup();
    }

    /// Mark the slot exited and persist. Returns whether to respawn it.
    fn record_exit(&self, exit: &WorkerExit) -> bool {
        let mut state = self.state.lock();
        if state.units.mark_exited(exit.slot) {
            tracing::info!(key = %exit.key, code = ?exit.code, "worker exited");
        }
        self.persist(&state);
        state.running && self.config.restart.should_restart(exit.code)
    }

    fn respawn(&self, slot: usize) -> Option<Child> {
        let mut state = self.state.lock();
        let key = state.units.get(slot)?.key.clone();
        if !accepts_workers(&state) {
            tracing::debug!(key = %key, "not restarting worker during shutdown");
            return None;
        }
        let spec = worker_spec(&self.ctx, &state, &key);
        match self.launcher.launch(&spec) {
            Ok(child) => {
                tracing::info!(
                    key = %key,
                    pid = ?child.id(),
                    policy = %self.config.restart,
                    "worker restarted"
                );
                state.units.restart(slot, child);
                self.persist(&state);
                state.units.take_child(slot)
            }
            Err(e) => {
                tracing::error!(key = %key, error = %e, "worker restart failed");
                None
            }
        }
    }

    /// Shut down from inside the master: interrupt running workers, wait
    /// for them within the grace window, then clean up.
    ///
    /// The signal listener and the service manager both land here; only the
    /// first caller does any work.
    pub async fn service_stop(&self) -> SignalReport {
        if self.shutdown_started.swap(true, Ordering::SeqCst) {
            return SignalReport::default();
        }
        let pids = {
            let mut state = self.state.lock();
            state.running = false;
            state.advance(MasterPhase::Draining);
            state.units.running_pids()
        };
        self.draining.notify_one();
        tracing::info!(workers = pids.len(), "stopping workers");
        let report = self.interrupt_and_wait(&pids).await;
        self.cleanup();
        report
    }

    /// Run the shutdown path when this process receives SIGINT or SIGTERM.
    pub fn spawn_signal_listener(&self) -> std::io::Result<JoinHandle<()>> {
        let mut signals = Termination::install()?;
        let supervisor = self.clone();
        Ok(tokio::spawn(async move {
            let signal = signals.recv().await;
            tracing::info!(signal, "received signal, shutting down");
            supervisor.service_stop().await;
        }))
    }

    /// `-stop`: choose the registered instance being stopped, then interrupt
    /// every worker in the pid file and wait for them within the grace window.
    pub async fn stop<R: BufRead, W: Write>(&self, input: R, output: W) -> SignalReport {
        match self.instances.select_and_remove(input, output) {
            Ok(Some(conf)) => tracing::info!(conf = %conf, "stopping instance"),
            Ok(None) => {}
            Err(e) => tracing::warn!(error = %e, "instance selection failed"),
        }
        let record = self.read_record();
        self.interrupt_and_wait(&record.workers).await
    }

    /// `-reload`: interrupt the recorded workers, wait for them, then
    /// start a fresh master generation.
    pub async fn reload(&self) -> Result<StartOutcome, SupervisorError> {
        let record = self.read_record();
        let report = self.interrupt_and_wait(&record.workers).await;
        if !report.exited {
            tracing::warn!(pids = ?report.signalled, "previous workers still running");
        }
        self.start().await
    }

    /// Current pid record; unreadable files count as empty.
    pub fn read_record(&self) -> PidRecord {
        match self.pid_file.read() {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(error = %e, "ignoring unreadable pid file");
                PidRecord::default()
            }
        }
    }

    /// Interrupt each pid; failures are recorded and the rest still tried.
    pub fn interrupt_all(&self, pids: &[u32]) -> SignalReport {
        let mut report = SignalReport::default();
        for &pid in pids {
            match self.signaller.interrupt(pid) {
                Ok(()) => report.signalled.push(pid),
                Err(e) => {
                    tracing::warn!(pid, error = %e, "interrupt failed");
                    report.failed.push((pid, e));
                }
            }
        }
        report
    }

    /// Poll until none of `pids` is alive, or the grace window ends.
    pub async fn wait_for_exit(&self, pids: &[u32]) -> bool {
        let deadline = Instant::now() + self.grace;
        loop {
            if pids.iter().all(|&pid| !self.signaller.is_alive(pid)) {
                return true;
            }
            if Instant::now() >= deadline {
                return false;
            }
            tokio::time::sleep(self.poll).await;
        }
    }

    async fn interrupt_and_wait(&self, pids: &[u32]) -> SignalReport {
        let mut report = self.interrupt_all(pids);
        report.exited = self.wait_for_exit(&report.signalled).await;
        report
    }

    /// Final teardown; only the first call has any effect.
    ///
    /// The pid file is removed only while it still names this master, so a
    /// newer generation started by `-reload` keeps its record.
    pub fn cleanup(&self) {
        let mut state = self.state.lock();
        if self.cleaned_up.swap(true, Ordering::SeqCst) {
            return;
        }
        state.running = false;
        state.advance(MasterPhase::Draining);
        state.advance(MasterPhase::Stopped);
        match self.pid_file.remove_if_owner(state.pid) {
            Ok(true) => tracing::debug!(path = %self.pid_file.path().display(), "removed pid file"),
            Ok(false) => {}
            Err(e) => tracing::warn!(error = %e, "failed to remove pid file"),
        }
        tracing::info!(master_pid = state.pid, "master stopped");
    }

    // Called with the state lock held so writes are serialised with cleanup.
    fn persist(&self, state: &MasterState) {
        if self.cleaned_up.load(Ordering::SeqCst) {
            return;
        }
        if let Err(e) = self.pid_file.write(&state.pid_record()) {
            tracing::warn!(error = %e, "failed to write pid file");
        }
    }
}

fn accepts_workers(state: &MasterState) -> bool {
    state.running && matches!(state.phase, MasterPhase::Spawning | MasterPhase::Monitoring)
}

fn worker_spec(ctx: &Context, state: &MasterState, key: &UnitKey) -> LaunchSpec {
    LaunchSpec::new(ctx.exe.clone(), ctx.exe_dir())
        .arg("-daemon")
        .arg(format!("-appkey={}", key))
        .arg(format!("-pipe={}", state.pipe))
        .arg(format!("-pid={}", state.pid))
        .arg(format!("-appkey={}", ctx.app_key))
        .arg(format!("-conf={}", ctx.conf.display()))
}

fn spawn_wait(tx: mpsc::UnboundedSender<WorkerExit>, slot: usize, key: UnitKey, mut child: Child) {
    tokio::spawn(async move {
        let code = match child.wait().await {
            Ok(status) => status.code(),
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "failed to wait for worker");
                None
            }
        };
        let _ = tx.send(WorkerExit { slot, key, code });
    });
}

#[cfg(test)]
#[path = "supervisor_tests.rs"]
mod tests;
