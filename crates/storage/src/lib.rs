// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! On-disk state shared between invocations of the launcher.
//!
//! Both files are written under an fs2 advisory lock so a `-stop` reading
//! the pid file never observes a half-written record.

mod pid_file;
mod registry;

pub use pid_file::{PidFileError, PidFileStore};
pub use registry::{InstanceRegistry, RegistryError};
