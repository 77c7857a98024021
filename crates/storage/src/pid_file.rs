// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pid file: where the master tells later invocations who to signal.

use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use thiserror::Error;
use warden_core::{PidRecord, PidRecordError};

#[derive(Debug, Error)]
pub enum PidFileError {
    #[error("pid file {0}: {1}")]
    Io(PathBuf, #[source] std::io::Error),
    #[error("pid file {0} is corrupt: {1}")]
    Corrupt(PathBuf, #[source] PidRecordError),
}

#[derive(Debug, Clone)]
pub struct PidFileStore {
    path: PathBuf,
}

impl PidFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Truncate and rewrite the pid file with `record`.
    pub fn write(&self, record: &PidRecord) -> Result<(), PidFileError> {
        // Open without truncating so a reader holding the shared lock never
        // sees the file emptied underneath it.
        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&self.path)
            .map_err(|e| self.io(e))?;
        file.lock_exclusive().map_err(|e| self.io(e))?;
        file.set_len(0).map_err(|e| self.io(e))?;
        file.write_all(record.to_string().as_bytes())
            .map_err(|e| self.io(e))?;
        file.sync_all().map_err(|e| self.io(e))?;
        Ok(())
    }

    /// Read the record; a missing or empty file yields an empty record.
    pub fn read(&self) -> Result<PidRecord, PidFileError> {
        let Some(mut file) = self.open_existing()? else {
            return Ok(PidRecord::default());
        };
        file.lock_shared().map_err(|e| self.io(e))?;
        let mut content = String::new();
        file.read_to_string(&mut content)
            .map_err(|e| self.io(e))?;
        if content.trim().is_empty() {
            return Ok(PidRecord::default());
        }
        content
            .parse()
            .map_err(|e| PidFileError::Corrupt(self.path.clone(), e))
    }

    /// Delete the pid file. Missing is not an error.
    pub fn remove(&self) -> Result<(), PidFileError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.io(e)),
        }
    }

    /// Delete the pid file only if it still belongs to `master_pid`.
    ///
    /// A reload starts a new master generation that rewrites the file while
    /// the old master is still draining; the old one must not delete it.
    /// Unreadable records are treated as stale and removed.
    pub fn remove_if_owner(&self, master_pid: u32) -> Result<bool, PidFileError> {
        let Some(mut file) = self.open_existing()? else {
            return Ok(false);
        };
        file.lock_exclusive().map_err(|e| self.io(e))?;
        let mut content = String::new();
        file.read_to_string(&mut content)
            .map_err(|e| self.io(e))?;
        let owner = content
            .parse::<PidRecord>()
            .map(|r| r.master_pid)
            .unwrap_or(master_pid);
        if owner != master_pid {
            tracing::debug!(
                path = %self.path.display(),
                owner,
                master_pid,
                "pid file owned by another master, leaving it"
            );
            return Ok(false);
        }
        self.remove()?;
        Ok(true)
    }

    fn open_existing(&self) -> Result<Option<File>, PidFileError> {
        match OpenOptions::new().read(true).open(&self.path) {
            Ok(f) => Ok(Some(f)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(self.io(e)),
        }
    }

    fn io(&self, e: std::io::Error) -> PidFileError {
        PidFileError::Io(self.path.clone(), e)
    }
}

#[cfg(test)]
#[path = "pid_file_tests.rs"]
mod tests;
