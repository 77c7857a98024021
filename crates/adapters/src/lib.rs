// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
// Enable coverage(off) attribute for excluding test infrastructure
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Adapters for OS interaction: spawning processes, signalling pids,
//! and registering with the service manager.

mod env;
pub mod process;
pub mod service;
pub mod signal;
pub mod traced;

pub use process::{ExecLauncher, LaunchError, LaunchSpec, ProcessLauncher};
pub use service::{ServiceCallbacks, ServiceError, ServiceManager, SystemdManager};
pub use signal::{NixSignaller, SignalError, Signaller};
pub use traced::{TracedLauncher, TracedSignaller};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use process::{FakeLauncher, LaunchCall};
#[cfg(any(test, feature = "test-support"))]
pub use service::{FakeServiceManager, ServiceCall};
#[cfg(any(test, feature = "test-support"))]
pub use signal::FakeSignaller;
