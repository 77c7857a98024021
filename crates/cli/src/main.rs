// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! warden - self-managing application launcher

mod commands;
mod dispatch;
mod exit_error;

use anyhow::Result;

use crate::dispatch::{Parsed, USAGE};
use crate::exit_error::ExitError;

/// Exit code for unknown or malformed flags.
const USAGE_EXIT_CODE: i32 = 2;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        let code = e
            .downcast_ref::<exit_error::ExitError>()
            .map_or(1, |c| c.code);
        let msg = format_error(&e);
        if !msg.is_empty() {
            eprintln!("Error: {}", msg);
        }
        std::process::exit(code);
    }
}

/// Format an anyhow error, deduplicating the chain.
///
/// If the top-level Display already contains the source error text, we skip
/// the "Caused by" chain to avoid noisy duplicate output (common when
/// thiserror variants use `#[error("... {0}")]` with `#[from]`).
/// Otherwise we render the full chain so context isn't lost.
fn format_error(err: &anyhow::Error) -> String {
    let top = err.to_string();

    let chain_redundant = err
        .chain()
        .skip(1)
        .all(|cause| top.contains(&cause.to_string()));

    if chain_redundant {
        return top;
    }

    let mut buf = top;
    for (i, cause) in err.chain().skip(1).enumerate() {
        buf.push_str(&format!("\n\nCaused by:\n    {}: {}", i, cause));
    }
    buf
}

async fn run() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let invocation = match dispatch::parse(&args) {
        Ok(Parsed::Run(invocation)) => invocation,
        Ok(Parsed::Help) => {
            print!("{}", USAGE);
            return Ok(());
        }
        Err(e) => {
            let message = e.kind().as_str().unwrap_or("invalid arguments");
            eprintln!("{}\n\n{}", first_line(&e.to_string(), message), USAGE);
            return Err(ExitError::new(USAGE_EXIT_CODE, String::new()).into());
        }
    };
    commands::run(invocation).await
}

fn first_line<'a>(text: &'a str, fallback: &'a str) -> &'a str {
    text.lines().find(|l| !l.trim().is_empty()).unwrap_or(fallback)
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
