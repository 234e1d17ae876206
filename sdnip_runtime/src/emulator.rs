// SDN-IP Lab: Configuration compiler and traffic playback for SDN-IP demos
// Copyright (C) 2021  Tibor Schneider
//
// This program is free software; you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation; either version 2 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along
// with this program; if not, write to the Free Software Foundation, Inc.,
// 51 Franklin Street, Fifth Floor, Boston, MA 02110-1301 USA.


//! # External systems
//!
//! The runtime never talks to the emulator, the routing daemons or the emulated hosts directly.
//! Instead, it uses the traits of this module. The adapters in this module implement them by
//! spawning local processes.

use crate::Error;

use sdnip::command::HostCommand;
use sdnip::emulation::{DaemonSpec, EmulationPlan};

use log::*;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

/// Placeholder in the command prefix of [`ProcessExecutor`], replaced by the host name.
pub const HOST_PLACEHOLDER: &str = "{host}";

/// Brings the emulated network up and down.
pub trait Emulator {
    /// Start the emulated network described by `plan`.
    fn start(&mut self, plan: &EmulationPlan) -> Result<(), Error>;

    /// Tear down the emulated network.
    fn stop(&mut self) -> Result<(), Error>;
}

/// Starts and stops the routing daemons.
pub trait DaemonLauncher {
    /// Start the daemon in the background.
    fn start(&mut self, daemon: &DaemonSpec) -> Result<(), Error>;

    /// Stop a daemon which was started before.
    fn stop(&mut self, daemon: &DaemonSpec) -> Result<(), Error>;
}

/// Executes commands on the emulated hosts. It is shared between the threads of the dispatcher.
pub trait HostExecutor: Send + Sync + fmt::Debug {
    /// Execute the command on `host` and block until it is done. A non-zero exit status is an
    /// error.
    fn run(&self, host: &str, command: &HostCommand) -> Result<(), Error>;

    /// Start the command on `host` in the background.
    fn spawn(&self, host: &str, command: &HostCommand) -> Result<(), Error>;

    /// Stop all commands started with [`HostExecutor::spawn`].
    fn stop_all(&self) -> Result<(), Error> {
        Ok(())
    }
}

/// Executes host commands as local processes, prefixed with a command which enters the host,
/// like `ip netns exec {host}`.
#[derive(Debug)]
pub struct ProcessExecutor {
    prefix: Vec<String>,
    background: Mutex<Vec<(String, Child)>>,
}

impl ProcessExecutor {
    /// Create an executor with the given prefix. Every occurrence of [`HOST_PLACEHOLDER`] is
    /// replaced by the host name.
    pub fn new<I, S>(prefix: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { prefix: prefix.into_iter().map(|s| s.into()).collect(), background: Mutex::default() }
    }

    /// Enter the host through its network namespace, named after the host.
    pub fn netns() -> Self {
        Self::new(vec!["ip", "netns", "exec", HOST_PLACEHOLDER])
    }

    /// Execute all commands directly on the local machine, ignoring the host.
    pub fn local() -> Self {
        Self::new(Vec::<String>::new())
    }

    /// Command line executed for `command` on `host`
    pub fn argv(&self, host: &str, command: &HostCommand) -> Vec<String> {
        self.prefix
            .iter()
            .map(|p| p.replace(HOST_PLACEHOLDER, host))
            .chain(command.argv().into_iter().map(|a| a.to_string()))
            .collect()
    }

    fn command(&self, host: &str, command: &HostCommand) -> Command {
        let argv = self.argv(host, command);
        let mut cmd = match argv.split_first() {
            Some((program, args)) => {
                let mut cmd = Command::new(program);
                cmd.args(args);
                cmd
            }
            None => Command::new(&command.program),
        };
        cmd.stdin(Stdio::null()).stdout(Stdio::null()).stderr(Stdio::null());
        cmd
    }
}

impl HostExecutor for ProcessExecutor {
    fn run(&self, host: &str, command: &HostCommand) -> Result<(), Error> {
        trace!("[{}] {}", host, command);
        let status = self.command(host, command).status()?;
        if status.success() {
            Ok(())
        } else {
            Err(Error::CommandFailed(format!("{} on {}", command, host), status.to_string()))
        }
    }

    fn spawn(&self, host: &str, command: &HostCommand) -> Result<(), Error> {
        trace!("[{}] {} &", host, command);
        let child = self.command(host, command).spawn()?;
        let name = format!("{} on {}", command, host);
        self.background.lock().map_err(|_| poisoned())?.push((name, child));
        Ok(())
    }

    fn stop_all(&self) -> Result<(), Error> {
        let children: Vec<(String, Child)> =
            self.background.lock().map_err(|_| poisoned())?.drain(..).collect();
        debug!("Stopping {} background commands", children.len());
        let mut first_err: Option<Error> = None;
        for (name, mut child) in children {
            if let Ok(Some(status)) = child.try_wait() {
                debug!("{} already exited with {}", name, status);
                continue;
            }
            if let Err(e) = child.kill().and_then(|_| child.wait().map(|_| ())) {
                warn!("Cannot stop {}: {}", name, e);
                first_err.get_or_insert(e.into());
            }
        }
        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl Drop for ProcessExecutor {
    fn drop(&mut self) {
        if let Err(e) = self.stop_all() {
            warn!("Cannot stop the background commands: {}", e);
        }
    }
}

fn poisoned() -> Error {
    Error::IoError(std::io::Error::new(std::io::ErrorKind::Other, "lock poisoned"))
}

/// Starts the daemons through a [`HostExecutor`]. Daemons of routers living in their own
/// namespace are executed on the router, all others on the `root` executor. A daemon is stopped
/// by killing the process in its pid file.
#[derive(Debug, Clone)]
pub struct ExecutorDaemonLauncher {
    namespaced: Arc<dyn HostExecutor>,
    root: Arc<dyn HostExecutor>,
}

impl ExecutorDaemonLauncher {
    /// Create a new launcher
    pub fn new(namespaced: Arc<dyn HostExecutor>, root: Arc<dyn HostExecutor>) -> Self {
        Self { namespaced, root }
    }

    fn executor(&self, daemon: &DaemonSpec) -> &dyn HostExecutor {
        if daemon.in_namespace {
            self.namespaced.as_ref()
        } else {
            self.root.as_ref()
        }
    }

    /// Command starting the daemon. The daemon forks itself into the background.
    pub fn start_command(daemon: &DaemonSpec) -> HostCommand {
        HostCommand::new(daemon.program.display().to_string()).args(daemon.args())
    }

    /// Command stopping the daemon
    pub fn stop_command(daemon: &DaemonSpec) -> HostCommand {
        HostCommand::new("pkill").arg("-F").arg(daemon.pid_file.display())
    }
}

impl DaemonLauncher for ExecutorDaemonLauncher {
    fn start(&mut self, daemon: &DaemonSpec) -> Result<(), Error> {
        debug!("Starting {} on {}", daemon.kind.binary(), daemon.router);
        self.executor(daemon).run(&daemon.router, &Self::start_command(daemon))
    }

    fn stop(&mut self, daemon: &DaemonSpec) -> Result<(), Error> {
        debug!("Stopping {} on {}", daemon.kind.binary(), daemon.router);
        self.executor(daemon).run(&daemon.router, &Self::stop_command(daemon))
    }
}

/// Runs an external emulator script. The plan is written as JSON to `plan_file`, and the script
/// is started with the path of that file as its last argument. The network lives as long as the
/// script is running.
#[derive(Debug)]
pub struct CommandEmulator {
    command: HostCommand,
    plan_file: PathBuf,
    startup_delay: Duration,
    child: Option<Child>,
}

impl CommandEmulator {
    /// Create a new emulator. After starting the script, the emulator waits for `startup_delay`
    /// before the network is considered to be up.
    pub fn new(command: HostCommand, plan_file: impl AsRef<Path>, startup_delay: Duration) -> Self {
        Self { command, plan_file: plan_file.as_ref().to_path_buf(), startup_delay, child: None }
    }

    /// Returns true if the script is running
    pub fn is_running(&mut self) -> bool {
        matches!(self.child.as_mut().map(|c| c.try_wait()), Some(Ok(None)))
    }
}

impl Emulator for CommandEmulator {
    fn start(&mut self, plan: &EmulationPlan) -> Result<(), Error> {
        if self.child.is_some() {
            return Ok(());
        }
        fs::write(&self.plan_file, serde_json::to_string_pretty(plan)?)?;
        debug!("Wrote the emulation plan to {}", self.plan_file.display());

        trace!("{} {}", self.command, self.plan_file.display());
        let mut child = Command::new(&self.command.program)
            .args(&self.command.args)
            .arg(&self.plan_file)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::inherit())
            .spawn()?;

        thread::sleep(self.startup_delay);
        if let Some(status) = child.try_wait()? {
            return Err(Error::EmulatorExited(status.to_string()));
        }
        info!(
            "Emulated network is up: {} switches, {} routers, {} hosts",
            plan.switches.len(),
            plan.routers.len(),
            plan.hosts.len()
        );
        self.child = Some(child);
        Ok(())
    }

    fn stop(&mut self) -> Result<(), Error> {
        match self.child.take() {
            Some(mut child) => {
                if let Some(status) = child.try_wait()? {
                    warn!("The emulator already exited with {}", status);
                    return Ok(());
                }
                child.kill()?;
                child.wait()?;
                Ok(())
            }
            None => Err(Error::EmulatorNotRunning),
        }
    }
}

impl Drop for CommandEmulator {
    fn drop(&mut self) {
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}
