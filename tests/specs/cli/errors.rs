//! Error handling specs: usage errors, unreadable config, fatal listen errors

use crate::prelude::*;

#[test]
fn unknown_flag_exits_two_with_usage() {
    cli()
        .args(&["-bogus"])
        .exits_with(2)
        .stderr_has("unexpected argument")
        .stderr_has("Usage: warden");
}

#[test]
fn non_numeric_pid_is_a_usage_error() {
    cli()
        .args(&["-daemon", "-pid=abc"])
        .exits_with(2)
        .stderr_has("Usage: warden");
}

#[test]
fn start_with_missing_config_fails() {
    let project = Project::empty();
    project
        .warden()
        .args(&["-start", &project.conf_flag()])
        .exits_with(1)
        .stderr_has("failed to read config");
    assert!(!project.pid_path().exists());
}

#[test]
fn config_without_units_is_rejected() {
    let project = Project::empty();
    project.file("warden.toml", "restart = \"never\"\n");
    project
        .warden()
        .args(&["-start", &project.conf_flag()])
        .exits_with(1)
        .stderr_has("declares no [[app]] units");
}

#[test]
fn worker_exits_222_when_address_is_taken() {
    let taken = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = taken.local_addr().unwrap().to_string();
    let project = Project::with_units(&[("web", &addr)]);
    project
        .warden()
        .args(&["-daemon", "-appkey=web", &project.conf_flag()])
        .exits_with(222)
        .stderr_has(&format!("listen error on {}", addr));
}

#[test]
fn worker_exits_222_for_unknown_unit() {
    let addr = free_addr();
    let project = Project::with_units(&[("web", &addr)]);
    project
        .warden()
        .args(&["-daemon", "-appkey=missing", &project.conf_flag()])
        .exits_with(222)
        .stderr_has("missing");
}

#[test]
fn relative_conf_resolves_against_current_directory() {
    let project = Project::empty();
    let expected = std::fs::canonicalize(project.path())
        .unwrap()
        .join("nested/app.toml");
    project
        .warden()
        .args(&["-start", "-conf=nested/app.toml"])
        .exits_with(1)
        .stderr_has(&expected.display().to_string());
}
