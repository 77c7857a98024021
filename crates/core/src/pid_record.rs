// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Persisted pid record shared between the master and later invocations.
//!
//! Wire format: `<masterPid>|<pipe>:<workerPid>,<workerPid>,...`

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PidRecordError {
    #[error("missing ':' separator in pid record")]
    MissingWorkers,
    #[error("missing '|' separator in pid record")]
    MissingPipe,
    #[error("invalid master pid: {0:?}")]
    InvalidMasterPid(String),
}

/// Master pid, pipe token, and the pids of currently running workers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PidRecord {
    pub master_pid: u32,
    pub pipe: String,
    pub workers: Vec<u32>,
}

impl PidRecord {
    pub fn new(master_pid: u32, pipe: impl Into<String>, workers: Vec<u32>) -> Self {
        Self {
            master_pid,
            pipe: pipe.into(),
            workers,
        }
    }

    /// True for the record returned when no pid file exists.
    pub fn is_empty(&self) -> bool {
        self.master_pid == 0 && self.workers.is_empty()
    }
}

impl fmt::Display for PidRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}:", self.master_pid, self.pipe)?;
        for (i, pid) in self.workers.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}", pid)?;
        }
        Ok(())
    }
}

impl FromStr for PidRecord {
    type Err = PidRecordError;

    /// Worker entries that are not valid pids are skipped.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (head, tail) = s
            .trim()
            .split_once(':')
            .ok_or(PidRecordError::MissingWorkers)?;
        let (master, pipe) = head.split_once('|').ok_or(PidRecordError::MissingPipe)?;
        let master_pid = master
            .trim()
            .parse::<u32>()
            .map_err(|_| PidRecordError::InvalidMasterPid(master.to_string()))?;
        let workers = tail
            .split(',')
            .filter_map(|p| p.trim().parse::<u32>().ok())
            .filter(|&p| p > 0)
            .collect();

        Ok(Self {
            master_pid,
            pipe: pipe.trim().to_string(),
            workers,
        })
    }
}

#[cfg(test)]
#[path = "pid_record_tests.rs"]
mod tests;
