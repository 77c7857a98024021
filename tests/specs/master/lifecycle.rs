//! Start, serve, reload and stop a real master

use std::io::Read;
use std::net::TcpStream;

use serial_test::serial;

use crate::prelude::*;

/// What a worker answers on its unit address: `<key> <pid>`.
fn ask(addr: &str) -> Option<(String, u32)> {
    let mut stream = TcpStream::connect(addr).ok()?;
    let mut reply = String::new();
    stream.read_to_string(&mut reply).ok()?;
    let (key, pid) = reply.trim().split_once(' ')?;
    Some((key.to_string(), pid.parse().ok()?))
}

fn wait_for_reply(addr: &str) -> (String, u32) {
    let mut reply = None;
    let ok = wait_for(SPEC_WAIT_MAX_MS, || {
        reply = ask(addr);
        reply.is_some()
    });
    assert!(ok, "no worker answered on {}", addr);
    reply.unwrap()
}

#[test]
#[serial]
fn start_spawns_one_worker_per_unit() {
    let (web, api) = (free_addr(), free_addr());
    let project = Project::with_units(&[("web", &web), ("api", &api)]);

    assert!(project.start().success());
    let workers = project.wait_for_workers(2);

    let (key, pid) = wait_for_reply(&web);
    assert_eq!(key, "web");
    assert!(workers.contains(&pid));
    let (key, pid) = wait_for_reply(&api);
    assert_eq!(key, "api");
    assert!(workers.contains(&pid));

    let registered = std::fs::read_to_string(project.mgr_path()).unwrap();
    assert_eq!(registered.trim(), project.conf_path().display().to_string());
}

#[test]
#[serial]
fn stop_ends_workers_and_master_cleans_up() {
    let web = free_addr();
    let project = Project::with_units(&[("web", &web)]);

    assert!(project.start().success());
    let workers = project.wait_for_workers(1);
    let (master, _) = project.pid_record().unwrap();
    wait_for_reply(&web);

    project
        .warden()
        .args(&["-stop", &project.conf_flag()])
        .passes()
        .stdout_has("stopped 1 worker(s)");

    assert!(wait_for(SPEC_WAIT_MAX_MS, || !is_alive(workers[0])));
    assert!(
        wait_for(SPEC_WAIT_MAX_MS, || !project.pid_path().exists()),
        "master left its pid file\nlog: {}",
        project.log()
    );
    assert!(wait_for(SPEC_WAIT_MAX_MS, || !is_alive(master)));
    let registered = std::fs::read_to_string(project.mgr_path()).unwrap_or_default();
    assert!(registered.trim().is_empty(), "instance still registered: {}", registered);
}

#[test]
#[serial]
fn reload_replaces_the_workers() {
    let web = free_addr();
    let project = Project::with_units(&[("web", &web)]);

    assert!(project.start().success());
    let old = project.wait_for_workers(1);
    let (old_master, _) = project.pid_record().unwrap();
    wait_for_reply(&web);

    let status = project
        .warden()
        .args(&["-reload", &project.conf_flag()])
        .status();
    assert!(status.success());

    let replaced = wait_for(SPEC_WAIT_MAX_MS, || {
        matches!(project.pid_record(), Some((master, pids))
            if master != old_master && pids.len() == 1 && pids[0] != old[0])
    });
    assert!(replaced, "no new generation recorded\nlog: {}", project.log());
    assert!(wait_for(SPEC_WAIT_MAX_MS, || !is_alive(old[0])));

    let (_, pid) = wait_for_reply(&web);
    assert_ne!(pid, old[0]);
}

#[test]
#[serial]
fn master_logs_its_startup_marker() {
    let web = free_addr();
    let project = Project::with_units(&[("web", &web)]);

    assert!(project.start().success());
    project.wait_for_workers(1);
    wait_for_reply(&web);

    let log = project.log();
    assert!(log.contains("--- warden: starting (pid: "), "log: {}", log);
    assert!(log.contains("role: master) ---"), "log: {}", log);
    assert!(log.contains("role: worker) ---"), "log: {}", log);
}
