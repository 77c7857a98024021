// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[derive(Debug, thiserror::Error)]
#[error("failed to read config /etc/app.toml: {0}")]
struct Wrapped(#[source] std::io::Error);

#[test]
fn redundant_chain_is_collapsed() {
    let io = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
    let err = anyhow::Error::new(Wrapped(io));
    assert_eq!(
        format_error(&err),
        "failed to read config /etc/app.toml: no such file"
    );
}

#[test]
fn distinct_causes_are_listed() {
    let err = anyhow::anyhow!("root cause").context("starting master");
    let text = format_error(&err);
    assert!(text.starts_with("starting master"));
    assert!(text.contains("Caused by:\n    0: root cause"));
}

#[test]
fn exit_error_code_is_recoverable() {
    let err: anyhow::Error = ExitError::new(222, "listen error").into();
    let code = err.downcast_ref::<ExitError>().map_or(1, |c| c.code);
    assert_eq!(code, 222);
    assert_eq!(format_error(&err), "listen error");
}

#[test]
fn first_line_skips_blank_lines() {
    assert_eq!(first_line("\n\nerror: bad\nmore", "x"), "error: bad");
    assert_eq!(first_line("", "fallback"), "fallback");
}
