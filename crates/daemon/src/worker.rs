// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worker runtime: what a `-daemon` (or foreground) process does with its
//! unit. Bind the unit's address, hand each accepted connection to a
//! [`Dispatch`], and drain in-flight connections on SIGINT/SIGTERM.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};
use warden_core::{AppConfig, UnitConfig, UnitKey};

use crate::signals::Termination;

/// Exit code for a worker that cannot listen or serve.
pub const FATAL_EXIT_CODE: i32 = 222;

const ACCEPT_BACKOFF_MIN: Duration = Duration::from_millis(5);
const ACCEPT_BACKOFF_MAX: Duration = Duration::from_secs(1);

/// Pause after the `failures`-th consecutive accept error (EMFILE and the
/// like), doubling up to one second.
pub fn accept_backoff(failures: u32) -> Duration {
    let factor = 1u32 << failures.saturating_sub(1).min(10);
    ACCEPT_BACKOFF_MIN.saturating_mul(factor).min(ACCEPT_BACKOFF_MAX)
}

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("unit {0:?} is not configured")]
    UnknownUnit(String),
    #[error("listen error on {addr}: {source}")]
    Listen {
        addr: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to install signal handlers: {0}")]
    Signal(#[source] std::io::Error),
}

/// Handles one accepted connection.
#[async_trait]
pub trait Dispatch: Send + Sync + 'static {
    async fn handle(&self, stream: TcpStream, peer: SocketAddr) -> std::io::Result<()>;
}

/// Answers every connection with `<unit key> <worker pid>` and closes it.
#[derive(Debug, Clone)]
pub struct StatusDispatch {
    line: String,
}

impl StatusDispatch {
    pub fn new(key: &UnitKey) -> Self {
        Self {
            line: format!("{} {}\n", key, std::process::id()),
        }
    }
}

#[async_trait]
impl Dispatch for StatusDispatch {
    async fn handle(&self, mut stream: TcpStream, _peer: SocketAddr) -> std::io::Result<()> {
        stream.write_all(self.line.as_bytes()).await?;
        stream.shutdown().await
    }
}

/// Pick the unit a worker serves: `key`, or the first unit when `key` is empty.
pub fn resolve_unit(config: &AppConfig, key: &str) -> Result<UnitConfig, WorkerError> {
    let unit = if key.is_empty() {
        config.units().first()
    } else {
        config.unit(key)
    };
    unit.cloned()
        .ok_or_else(|| WorkerError::UnknownUnit(key.to_string()))
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ServeSummary {
    pub accepted: u64,
    /// Connections cut off by the shutdown deadline
    pub abandoned: usize,
}

pub struct WorkerRuntime<D> {
    unit: UnitConfig,
    dispatch: Arc<D>,
    shutdown_timeout: Option<Duration>,
}

impl<D: Dispatch> WorkerRuntime<D> {
    pub fn new(unit: UnitConfig, dispatch: D) -> Self {
        Self {
            unit,
            dispatch: Arc::new(dispatch),
            shutdown_timeout: None,
        }
    }

    /// Bound the connection drain on shutdown; `None` waits for all of them.
    pub fn with_shutdown_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.shutdown_timeout = timeout;
        self
    }

    pub fn unit(&self) -> &UnitConfig {
        &self.unit
    }

    /// Bind and immediately release the address, failing fast when it is taken.
    pub fn probe(&self) -> Result<(), WorkerError> {
        std::net::TcpListener::bind(&self.unit.addr)
            .map(drop)
            .map_err(|source| self.listen_error(source))
    }

    pub async fn bind(&self) -> Result<TcpListener, WorkerError> {
        TcpListener::bind(&self.unit.addr)
            .await
            .map_err(|source| self.listen_error(source))
    }

    /// Serve until SIGINT/SIGTERM, printing `start` once listening and
    /// `finish` once drained.
    pub async fn run(self) -> Result<ServeSummary, WorkerError> {
        self.probe()?;
        let mut signals = Termination::install().map_err(WorkerError::Signal)?;
        let listener = self.bind().await?;
        info!(key = %self.unit.key, addr = %self.unit.addr, "worker listening");
        println!("start");

        let summary = self
            .serve(listener, async move {
                let signal = signals.recv().await;
                info!(signal, "shutting down");
            })
            .await;

        println!("finish");
        info!(
            accepted = summary.accepted,
            abandoned = summary.abandoned,
            "finish"
        );
        Ok(summary)
    }

    /// Accept connections until `shutdown` resolves, then stop accepting and
    /// drain the ones in flight.
    pub async fn serve<F>(&self, listener: TcpListener, shutdown: F) -> ServeSummary
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let mut connections = JoinSet::new();
        let mut accepted = 0u64;
        let mut accept_failures = 0u32;

        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                result = listener.accept() => match result {
                    Ok((stream, peer)) => {
                        accept_failures = 0;
                        accepted += 1;
                        let dispatch = Arc::clone(&self.dispatch);
                        connections.spawn(async move {
                            if let Err(e) = dispatch.handle(stream, peer).await {
                                debug!(%peer, error = %e, "connection error");
                            }
                        });
                    }
                    Err(e) => {
                        accept_failures = accept_failures.saturating_add(1);
                        let pause = accept_backoff(accept_failures);
                        error!(error = %e, pause_ms = pause.as_millis() as u64, "accept error");
                        tokio::select! {
                            _ = &mut shutdown => break,
                            _ = tokio::time::sleep(pause) => {}
                        }
                    }
                },
                Some(_) = connections.join_next(), if !connections.is_empty() => {}
            }
        }

        drop(listener);
        let abandoned = self.drain(&mut connections).await;
        ServeSummary {
            accepted,
            abandoned,
        }
    }

    async fn drain(&self, connections: &mut JoinSet<()>) -> usize {
        if !connections.is_empty() {
            info!(in_flight = connections.len(), "draining connections");
        }
        let Some(timeout) = self.shutdown_timeout else {
            while connections.join_next().await.is_some() {}
            return 0;
        };
        let all_done = async { while connections.join_next().await.is_some() {} };
        if tokio::time::timeout(timeout, all_done).await.is_ok() {
            return 0;
        }
        let left = connections.len();
        warn!(left, "shutdown deadline passed, aborting connections");
        connections.abort_all();
        while connections.join_next().await.is_some() {}
        left
    }

    fn listen_error(&self, source: std::io::Error) -> WorkerError {
        WorkerError::Listen {
            addr: self.unit.addr.clone(),
            source,
        }
    }
}

#[cfg(test)]
#[path = "worker_tests.rs"]
mod tests;
