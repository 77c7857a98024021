// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! warden-daemon: the long-lived side of the launcher.
//!
//! A master [`Supervisor`] spawns one worker process per configured unit and
//! records their pids so later `-stop`/`-reload` invocations can signal them.
//! Each worker runs a [`WorkerRuntime`] serving its unit's address.

pub mod context;
mod env;
pub mod logging;
pub mod master;
pub mod registry;
pub mod service;
mod signals;
pub mod supervisor;
pub mod worker;

pub use context::Context;
pub use logging::Role;
pub use master::MasterState;
pub use registry::{UnitStatus, WorkUnit, WorkerRegistry};
pub use service::ServiceBridge;
pub use supervisor::{SignalReport, StartOutcome, Supervisor, SupervisorError};
pub use worker::{
    resolve_unit, Dispatch, ServeSummary, StatusDispatch, WorkerError, WorkerRuntime,
    FATAL_EXIT_CODE,
};
