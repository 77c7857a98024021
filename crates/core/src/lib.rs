// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! warden-core: Shared types for the warden launcher

pub mod config;
pub mod phase;
pub mod pid_record;
pub mod restart;
pub mod unit;

pub use config::{resolve_config_path, AppConfig, ConfigError, DEFAULT_CONFIG_FILE};
pub use phase::MasterPhase;
pub use pid_record::{PidRecord, PidRecordError};
pub use restart::RestartPolicy;
pub use unit::{UnitConfig, UnitKey};
