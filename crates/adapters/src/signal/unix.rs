// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use nix::errno::Errno;
use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;

use super::{SignalError, Signaller};

/// Signaller using `kill(2)`
#[derive(Clone, Default)]
pub struct NixSignaller;

impl NixSignaller {
    pub fn new() -> Self {
        Self
    }
}

fn to_pid(pid: u32) -> Result<Pid, SignalError> {
    match i32::try_from(pid) {
        Ok(raw) if raw > 0 => Ok(Pid::from_raw(raw)),
        _ => Err(SignalError::InvalidPid(pid)),
    }
}

impl Signaller for NixSignaller {
    fn interrupt(&self, pid: u32) -> Result<(), SignalError> {
        match kill(to_pid(pid)?, Signal::SIGINT) {
            Ok(()) => Ok(()),
            Err(Errno::ESRCH) => Err(SignalError::NoSuchProcess(pid)),
            Err(e) => Err(SignalError::Failed {
                pid,
                reason: e.to_string(),
            }),
        }
    }

    fn is_alive(&self, pid: u32) -> bool {
        let Ok(pid) = to_pid(pid) else {
            return false;
        };
        match kill(pid, None::<Signal>) {
            Ok(()) => true,
            Err(Errno::EPERM) => true,
            Err(_) => false,
        }
    }
}

#[cfg(test)]
#[path = "unix_tests.rs"]
mod tests;
