// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Instance registry: config paths of instances that are currently running.

use std::fs::OpenOptions;
use std::io::{BufRead, ErrorKind, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("instance registry {0}: {1}")]
    Io(PathBuf, #[source] std::io::Error),
    #[error("no instance selected")]
    NoSelection,
}

/// Newline-delimited list of config paths, one per running instance.
///
/// With `force` set, prior contents are ignored: listing yields nothing and
/// the next append truncates the file before writing.
#[derive(Debug, Clone)]
pub struct InstanceRegistry {
    path: PathBuf,
    force: bool,
}

impl InstanceRegistry {
    pub fn new(path: impl Into<PathBuf>, force: bool) -> Self {
        Self {
            path: path.into(),
            force,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Registered paths, blank lines dropped. Missing file yields nothing.
    pub fn list(&self) -> Result<Vec<String>, RegistryError> {
        if self.force {
            return Ok(Vec::new());
        }
        match std::fs::read_to_string(&self.path) {
            Ok(content) => Ok(content
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(String::from)
                .collect()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(self.io(e)),
        }
    }

    /// Register `entry`. Returns false when it was already present.
    pub fn append(&self, entry: &str) -> Result<bool, RegistryError> {
        if self.list()?.iter().any(|e| e == entry) {
            return Ok(false);
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(!self.force)
            .write(true)
            .truncate(false)
            .open(&self.path)
            .map_err(|e| self.io(e))?;
        file.lock_exclusive().map_err(|e| self.io(e))?;
        if self.force {
            file.set_len(0).map_err(|e| self.io(e))?;
        }
        writeln!(file, "{}", entry).map_err(|e| self.io(e))?;
        file.sync_all().map_err(|e| self.io(e))?;
        Ok(true)
    }

    /// Rewrite the registry so it contains exactly `entries`.
    pub fn sync(&self, entries: &[String]) -> Result<(), RegistryError> {
        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&self.path)
            .map_err(|e| self.io(e))?;
        file.lock_exclusive().map_err(|e| self.io(e))?;
        file.set_len(0).map_err(|e| self.io(e))?;
        let mut content = String::new();
        for entry in entries {
            content.push_str(entry);
            content.push('\n');
        }
        file.write_all(content.as_bytes())
            .map_err(|e| self.io(e))?;
        file.sync_all().map_err(|e| self.io(e))?;
        Ok(())
    }

    /// Drop `entry` from the registry. Returns false when it was absent.
    pub fn remove(&self, entry: &str) -> Result<bool, RegistryError> {
        let mut entries = self.list()?;
        let before = entries.len();
        entries.retain(|e| e != entry);
        if entries.len() == before {
            return Ok(false);
        }
        self.sync(&entries)?;
        Ok(true)
    }

    /// Pick one registered instance and remove it from the registry.
    ///
    /// With several entries the operator is shown a 1-based list on `output`
    /// and asked for a number on `input` until a valid one is given. A single
    /// entry is chosen without prompting; an empty registry yields `None`.
    pub fn select_and_remove<R: BufRead, W: Write>(
        &self,
        mut input: R,
        mut output: W,
    ) -> Result<Option<String>, RegistryError> {
        let mut entries = self.list()?;
        let chosen = match entries.len() {
            0 => return Ok(None),
            1 => 0,
            n => {
                let prompt = |out: &mut W, msg: &str| -> std::io::Result<()> {
                    write!(out, "{}", msg)?;
                    out.flush()
                };
                let mut listing = String::from("Registered instances:\n");
                for (i, entry) in entries.iter().enumerate() {
                    listing.push_str(&format!("    {}: {}\n", i + 1, entry));
                }
                listing.push_str("Select instance number: ");
                prompt(&mut output, &listing).map_err(|e| self.io(e))?;
                loop {
                    let mut line = String::new();
                    let read = input.read_line(&mut line).map_err(|e| self.io(e))?;
                    if read == 0 {
                        return Err(RegistryError::NoSelection);
                    }
                    match line.trim().parse::<usize>() {
                        Ok(pos) if (1..=n).contains(&pos) => break pos - 1,
                        _ => prompt(&mut output, "Enter a valid instance number: ")
                            .map_err(|e| self.io(e))?,
                    }
                }
            }
        };
        let selected = entries.remove(chosen);
        self.sync(&entries)?;
        Ok(Some(selected))
    }

    fn io(&self, e: std::io::Error) -> RegistryError {
        RegistryError::Io(self.path.clone(), e)
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
