// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Master process lifecycle phases.

use std::fmt;

/// `Idle → Spawning → Monitoring → Draining → Stopped`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MasterPhase {
    #[default]
    Idle,
    Spawning,
    Monitoring,
    Draining,
    Stopped,
}

impl MasterPhase {
    /// Whether moving from `self` to `next` is a legal transition.
    ///
    /// Draining may be entered from any live phase (a termination signal
    /// can arrive mid-spawn).
    pub fn can_advance_to(self, next: MasterPhase) -> bool {
        use MasterPhase::*;
        matches!(
            (self, next),
            (Idle, Spawning)
                | (Spawning, Monitoring)
                | (Idle | Spawning | Monitoring, Draining)
                | (Draining, Stopped)
        )
    }
}

impl fmt::Display for MasterPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MasterPhase::Idle => "idle",
            MasterPhase::Spawning => "spawning",
            MasterPhase::Monitoring => "monitoring",
            MasterPhase::Draining => "draining",
            MasterPhase::Stopped => "stopped",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
#[path = "phase_tests.rs"]
mod tests;
