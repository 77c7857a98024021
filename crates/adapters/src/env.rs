// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the adapters crate.

use std::path::PathBuf;

/// Directory systemd unit files are written to (default: /etc/systemd/system).
pub fn systemd_dir() -> PathBuf {
    std::env::var("WARDEN_SYSTEMD_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/etc/systemd/system"))
}

/// systemctl binary (default: `systemctl` on PATH).
pub fn systemctl() -> PathBuf {
    std::env::var("WARDEN_SYSTEMCTL")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("systemctl"))
}
