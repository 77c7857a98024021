// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! State owned by the master process.

use warden_core::{MasterPhase, PidRecord};

use crate::registry::WorkerRegistry;

#[derive(Debug)]
pub struct MasterState {
    pub pid: u32,
    /// Correlation token handed to every worker; derived from `pid`
    pub pipe: String,
    pub phase: MasterPhase,
    /// Cleared once shutdown begins; worker exits after that are expected
    pub running: bool,
    pub units: WorkerRegistry,
}

impl MasterState {
    pub fn new(pid: u32) -> Self {
        Self {
            pid,
            pipe: pid.to_string(),
            phase: MasterPhase::Idle,
            running: false,
            units: WorkerRegistry::new(),
        }
    }

    /// Move to `next` if the transition is legal.
    pub fn advance(&mut self, next: MasterPhase) -> bool {
        if self.phase == next {
            return true;
        }
        if !self.phase.can_advance_to(next) {
            tracing::debug!(from = %self.phase, to = %next, "ignoring phase transition");
            return false;
        }
        tracing::debug!(from = %self.phase, to = %next, "master phase");
        self.phase = next;
        true
    }

    /// Record to persist: this master plus workers currently running.
    pub fn pid_record(&self) -> PidRecord {
        PidRecord::new(self.pid, self.pipe.clone(), self.units.running_pids())
    }
}

#[cfg(test)]
#[path = "master_tests.rs"]
mod tests;
