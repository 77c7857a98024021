//! `-stop` against a hand-written pid file
//!
//! Workers here are plain `sleep` processes owned by the test, so the specs
//! exercise only the signalling path, not a real master.

use std::os::unix::process::ExitStatusExt;
use std::process::{Command, ExitStatus};
use std::thread::JoinHandle;

use crate::prelude::*;

/// A long sleep reaped on a background thread so it never lingers as a zombie.
fn sleeper() -> (u32, JoinHandle<ExitStatus>) {
    let mut child = Command::new("sleep").arg("30").spawn().unwrap();
    let pid = child.id();
    (pid, std::thread::spawn(move || child.wait().unwrap()))
}

/// Pid of a process that has already exited.
fn dead_pid() -> u32 {
    let mut child = Command::new("true").spawn().unwrap();
    let pid = child.id();
    child.wait().unwrap();
    pid
}

fn project() -> Project {
    let addr = free_addr();
    Project::with_units(&[("web", &addr)])
}

#[test]
fn stop_interrupts_every_recorded_worker() {
    let project = project();
    let (a, wait_a) = sleeper();
    let (b, wait_b) = sleeper();
    std::fs::write(project.pid_path(), format!("1234|abc:{},{}", a, b)).unwrap();

    project
        .warden()
        .args(&["-stop", &project.conf_flag()])
        .passes()
        .stdout_has("stopped 2 worker(s)");

    assert_eq!(wait_a.join().unwrap().signal(), Some(libc_sigint()));
    assert_eq!(wait_b.join().unwrap().signal(), Some(libc_sigint()));
}

#[test]
fn stale_pid_is_reported_and_the_rest_still_signalled() {
    let project = project();
    let stale = dead_pid();
    let (live, wait_live) = sleeper();
    std::fs::write(project.pid_path(), format!("1234|abc:{},{}", stale, live)).unwrap();

    project
        .warden()
        .args(&["-stop", &project.conf_flag()])
        .passes()
        .stdout_has(&format!("stopped 1 worker(s), not signalled: {}", stale));

    assert_eq!(wait_live.join().unwrap().signal(), Some(libc_sigint()));
}

#[test]
fn stop_without_pid_file_is_a_no_op() {
    let project = project();
    project
        .warden()
        .args(&["-stop", &project.conf_flag()])
        .passes()
        .stdout_has("no running workers");
}

#[test]
fn stop_prompts_for_the_instance_when_several_are_registered() {
    let project = project();
    std::fs::write(project.mgr_path(), "/srv/a/warden.toml\n/srv/b/warden.toml\n").unwrap();

    project
        .warden()
        .args(&["-stop", &project.conf_flag()])
        .stdin("9\n2\n")
        .passes()
        .stdout_has("    1: /srv/a/warden.toml")
        .stdout_has("    2: /srv/b/warden.toml")
        .stdout_has("Enter a valid instance number: ");

    let remaining = std::fs::read_to_string(project.mgr_path()).unwrap();
    assert_eq!(remaining.trim(), "/srv/a/warden.toml");
}

fn libc_sigint() -> i32 {
    nix::sys::signal::Signal::SIGINT as i32
}
