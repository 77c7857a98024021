//! Usage output specs

use crate::prelude::*;

#[test]
fn dash_h_prints_usage_and_exits_zero() {
    cli().args(&["-h"]).passes().stdout_has("Usage: warden");
}

#[test]
fn dash_help_prints_usage() {
    cli().args(&["-help"]).passes().stdout_has("Usage: warden");
}

#[test]
fn double_dash_help_prints_usage() {
    cli().args(&["--help"]).passes().stdout_has("Usage: warden");
}

#[test]
fn bare_help_word_prints_usage() {
    cli().args(&["help"]).passes().stdout_has("Usage: warden");
    cli().args(&["h"]).passes().stdout_has("Usage: warden");
}

#[test]
fn help_wins_over_mode_flags() {
    // Would otherwise try to signal a running master.
    cli()
        .args(&["-stop", "-h"])
        .passes()
        .stdout_has("-stop")
        .stdout_has("-reload");
}
