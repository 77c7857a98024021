//! `-install` / `-uninstall` against a scratch unit directory
//!
//! `WARDEN_SYSTEMCTL` points at `true`/`false` so nothing touches the host's
//! service manager.

use crate::prelude::*;

fn service_env(project: &Project, systemctl: &str) -> CliBuilder {
    project
        .warden()
        .env("WARDEN_SYSTEMD_DIR", project.state_path().join("units"))
        .env("WARDEN_SYSTEMCTL", systemctl)
}

#[test]
fn install_then_uninstall() {
    let project = Project::empty();
    let unit = project.state_path().join("units/svc.service");

    service_env(&project, "true")
        .args(&["-install", "-name=svc", "-conf=app.toml"])
        .passes()
        .stdout_eq("install success\n");

    let content = std::fs::read_to_string(&unit).unwrap();
    assert!(content.contains("Description=svc service"), "{}", content);
    assert!(content.contains(" -service -force -conf=app.toml"), "{}", content);

    service_env(&project, "true")
        .args(&["-uninstall", "-name=svc"])
        .passes()
        .stdout_eq("uninstall success\n");
    assert!(!unit.exists());
}

#[test]
fn name_alone_installs() {
    let project = Project::empty();
    service_env(&project, "true")
        .args(&["-name=svc"])
        .passes()
        .stdout_eq("install success\n");
    assert!(project.state_path().join("units/svc.service").exists());
}

#[test]
fn install_failure_is_reported_and_exits_cleanly() {
    let project = Project::empty();
    service_env(&project, "false")
        .args(&["-install", "-name=svc"])
        .passes()
        .stdout_has("install failed,")
        .stderr_lacks("Error:");
    assert!(!project.state_path().join("units/svc.service").exists());
}

#[test]
fn uninstall_of_unknown_service_is_reported() {
    let project = Project::empty();
    service_env(&project, "true")
        .args(&["-uninstall", "-name=ghost"])
        .passes()
        .stdout_eq("uninstall failed,service ghost is not installed\n");
}

#[test]
fn install_never_starts_workers() {
    let project = Project::empty();
    service_env(&project, "true")
        .args(&["-install", "-daemon", "-name=svc"])
        .passes()
        .stdout_eq("install success\n");
    assert!(!project.pid_path().exists());
}
