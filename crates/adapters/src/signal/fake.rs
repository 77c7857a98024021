// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake signaller for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{SignalError, Signaller};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;

#[derive(Default)]
struct FakeSignallerState {
    alive: HashSet<u32>,
    stubborn: HashSet<u32>,
    interrupts: Vec<u32>,
}

/// Records interrupts against a simulated process table.
///
/// An interrupted pid disappears from the table unless marked stubborn;
/// interrupting an unknown pid fails with `NoSuchProcess`.
#[derive(Clone, Default)]
pub struct FakeSignaller {
    inner: Arc<Mutex<FakeSignallerState>>,
}

impl FakeSignaller {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_alive(pids: &[u32]) -> Self {
        let s = Self::new();
        s.inner.lock().alive.extend(pids.iter().copied());
        s
    }

    /// Keep `pid` alive after it is interrupted
    pub fn stubborn(&self, pid: u32) {
        let mut inner = self.inner.lock();
        inner.alive.insert(pid);
        inner.stubborn.insert(pid);
    }

    /// Every interrupt attempt, in order, including failed ones
    pub fn interrupts(&self) -> Vec<u32> {
        self.inner.lock().interrupts.clone()
    }
}

impl Signaller for FakeSignaller {
    fn interrupt(&self, pid: u32) -> Result<(), SignalError> {
        let mut inner = self.inner.lock();
        inner.interrupts.push(pid);
        if !inner.alive.contains(&pid) {
            return Err(SignalError::NoSuchProcess(pid));
        }
        if !inner.stubborn.contains(&pid) {
            inner.alive.remove(&pid);
        }
        Ok(())
    }

    fn is_alive(&self, pid: u32) -> bool {
        self.inner.lock().alive.contains(&pid)
    }
}
