// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory table of the workers a master has launched.

use tokio::process::Child;
use warden_core::UnitKey;

/// One slot per configured unit.
///
/// The process handle stays here from spawn until the monitor moves it into
/// a wait task.
#[derive(Debug)]
pub struct WorkUnit {
    pub key: UnitKey,
    pub pid: Option<u32>,
    pub running: bool,
    /// Exits observed for this slot across restarts
    pub exit_count: u32,
    child: Option<Child>,
}

impl WorkUnit {
    pub fn started(key: UnitKey, child: Child) -> Self {
        Self {
            key,
            pid: child.id(),
            running: true,
            exit_count: 0,
            child: Some(child),
        }
    }

    /// Slot for a unit whose launch failed; never signalled.
    pub fn failed(key: UnitKey) -> Self {
        Self {
            key,
            pid: None,
            running: false,
            exit_count: 0,
            child: None,
        }
    }

    pub fn status(&self) -> UnitStatus {
        UnitStatus {
            key: self.key.clone(),
            pid: self.pid,
            running: self.running,
            exit_count: self.exit_count,
        }
    }
}

/// Copy of a slot's bookkeeping without the process handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitStatus {
    pub key: UnitKey,
    pub pid: Option<u32>,
    pub running: bool,
    pub exit_count: u32,
}

#[derive(Debug, Default)]
pub struct WorkerRegistry {
    units: Vec<WorkUnit>,
}

impl WorkerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a slot, returning its index.
    pub fn push(&mut self, unit: WorkUnit) -> usize {
        self.units.push(unit);
        self.units.len() - 1
    }

    pub fn get(&self, slot: usize) -> Option<&WorkUnit> {
        self.units.get(slot)
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &WorkUnit> {
        self.units.iter()
    }

    pub fn statuses(&self) -> Vec<UnitStatus> {
        self.units.iter().map(WorkUnit::status).collect()
    }

    /// Pids of slots still marked running, in slot order.
    pub fn running_pids(&self) -> Vec<u32> {
        self.units
            .iter()
            .filter(|u| u.running)
            .filter_map(|u| u.pid)
            .collect()
    }

    pub fn take_child(&mut self, slot: usize) -> Option<Child> {
        self.units.get_mut(slot).and_then(|u| u.child.take())
    }

    /// Record an exit. Returns false if the slot was already not running.
    pub fn mark_exited(&mut self, slot: usize) -> bool {
        let Some(unit) = self.units.get_mut(slot) else {
            return false;
        };
        if !unit.running {
            return false;
        }
        unit.running = false;
        unit.exit_count += 1;
        true
    }

    /// Put a freshly launched process into an existing slot.
    pub fn restart(&mut self, slot: usize, child: Child) -> bool {
        let Some(unit) = self.units.get_mut(slot) else {
            return false;
        };
        unit.pid = child.id();
        unit.running = true;
        unit.child = Some(child);
        true
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
