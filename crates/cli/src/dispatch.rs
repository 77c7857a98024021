// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Command-line flags and mode resolution.
//!
//! Every invocation of the binary re-enters here. Flags use the single-dash
//! long form (`-conf=x`, `-conf x`); they are rewritten to clap's double-dash
//! form before parsing so both spellings are accepted.

use clap::{ArgAction, Parser};

/// Usage text shown for `-h`, `-help`, `h`, `help` and unknown flags.
pub const USAGE: &str = "\
Usage: warden [flags]

With no flags, starts a background master that supervises one worker
per configured app unit.

Flags:
  -start              start a background master (default with no flags)
  -stop               interrupt the running workers and unregister the instance
  -reload             interrupt the running workers and start a new master
  -install            install as an OS service (implied by -name)
  -uninstall          remove the OS service
  -service            run under the OS service manager
  -name <name>        service name (default: executable name)
  -conf <path>        config file (default: warden.toml next to the executable)
  -force              ignore previously registered instances
  -develop            serve in the foreground with debug logging on stderr
  -h, -help           show this help

Internal flags:
  -master             this process supervises the workers
  -daemon             this process serves one app unit
  -appkey <key>       app unit to serve
  -pipe <token>       master correlation token
  -pid <pid>          master pid
";

/// Flags that take a value; the token after them is never rewritten.
const VALUE_FLAGS: [&str; 5] = ["name", "conf", "appkey", "pipe", "pid"];

#[derive(Debug, Default, Parser)]
#[command(
    name = "warden",
    no_binary_name = true,
    disable_help_flag = true,
    disable_version_flag = true
)]
pub struct Flags {
    #[arg(long)]
    pub develop: bool,
    #[arg(long)]
    pub start: bool,
    #[arg(long)]
    pub stop: bool,
    #[arg(long)]
    pub reload: bool,
    #[arg(long)]
    pub daemon: bool,
    #[arg(long)]
    pub uninstall: bool,
    #[arg(long)]
    pub force: bool,
    #[arg(long)]
    pub install: bool,
    #[arg(long)]
    pub service: bool,
    #[arg(long)]
    pub master: bool,
    #[arg(long, default_value = "", allow_hyphen_values = true)]
    pub name: String,
    #[arg(long, default_value = "", allow_hyphen_values = true)]
    pub conf: String,
    /// Repeatable: workers get their unit key first, then the master's own
    #[arg(long, action = ArgAction::Append, allow_hyphen_values = true)]
    pub appkey: Vec<String>,
    #[arg(long, default_value = "", allow_hyphen_values = true)]
    pub pipe: String,
    #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
    pub pid: i64,
    /// Trailing positional arguments are accepted and ignored
    #[arg(hide = true)]
    pub rest: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Detach a background master
    Start,
    /// Supervise workers in this process
    Master,
    Service,
    Stop,
    Reload,
    /// Serve one unit as a worker of a master
    Daemon,
    Install,
    Uninstall,
    /// Serve one unit in this process without a master
    Foreground,
}

/// A fully resolved invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub mode: Mode,
    pub name: String,
    pub conf: String,
    /// First non-empty `-appkey`
    pub app_key: String,
    pub pipe: String,
    pub parent_pid: i64,
    pub master: bool,
    pub force: bool,
    pub develop: bool,
}

#[derive(Debug)]
pub enum Parsed {
    Help,
    Run(Invocation),
}

/// Parse the arguments after the program name.
pub fn parse(args: &[String]) -> Result<Parsed, clap::Error> {
    if wants_help(args) {
        return Ok(Parsed::Help);
    }
    let flags = Flags::try_parse_from(normalize_args(args))?;
    Ok(Parsed::Run(resolve(flags, args.is_empty())))
}

fn wants_help(args: &[String]) -> bool {
    if let [only] = args {
        if only == "h" || only == "help" {
            return true;
        }
    }
    args.iter()
        .any(|a| matches!(a.as_str(), "-h" | "-help" | "--h" | "--help"))
}

/// Rewrite `-flag` and `-flag=value` to their `--` forms.
pub fn normalize_args(args: &[String]) -> Vec<String> {
    let mut out = Vec::with_capacity(args.len());
    let mut value_next = false;
    for arg in args {
        if value_next {
            value_next = false;
            out.push(arg.clone());
            continue;
        }
        let arg = match arg.strip_prefix('-') {
            Some(rest) if !rest.is_empty() && !rest.starts_with('-') => format!("--{}", rest),
            _ => arg.clone(),
        };
        if let Some(name) = arg.strip_prefix("--") {
            value_next = VALUE_FLAGS.contains(&name);
        }
        out.push(arg);
    }
    out
}

/// Apply the flag precedence rules and pick exactly one mode.
pub fn resolve(mut flags: Flags, no_args: bool) -> Invocation {
    if no_args {
        flags.start = true;
    }
    // `-uninstall -name=x` names the service to remove.
    if !flags.name.is_empty() && !flags.uninstall {
        flags.install = true;
    }
    if flags.install {
        flags.daemon = false;
    }
    if flags.develop
        || flags.stop
        || flags.reload
        || flags.daemon
        || flags.install
        || flags.uninstall
        || flags.service
    {
        flags.start = false;
    }
    if flags.service {
        flags.master = true;
    }

    let mode = if flags.start {
        if flags.master {
            Mode::Master
        } else {
            Mode::Start
        }
    } else if flags.service {
        Mode::Service
    } else if flags.stop {
        Mode::Stop
    } else if flags.reload {
        Mode::Reload
    } else if flags.daemon {
        Mode::Daemon
    } else if flags.install {
        Mode::Install
    } else if flags.uninstall {
        Mode::Uninstall
    } else {
        Mode::Foreground
    };

    Invocation {
        mode,
        app_key: flags
            .appkey
            .into_iter()
            .find(|k| !k.is_empty())
            .unwrap_or_default(),
        name: flags.name,
        conf: flags.conf,
        pipe: flags.pipe,
        parent_pid: flags.pid,
        master: flags.master,
        force: flags.force,
        develop: flags.develop,
    }
}

#[cfg(test)]
#[path = "dispatch_tests.rs"]
mod tests;
