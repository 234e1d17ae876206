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


use sdnip::command::HostCommand;
use sdnip::compiler::compile;
use sdnip::example_topologies::abilene;
use sdnip::intents::IntentExpectation;
use sdnip::settings::Settings;
use sdnip::topology::Topology;
use sdnip::traffic::TrafficTool;
use sdnip::Stopper;
use sdnip_runtime::bundle::{receive_bundle, send_bundle, ExperimentBundle};
use sdnip_runtime::emulator::{CommandEmulator, ExecutorDaemonLauncher, ProcessExecutor};
use sdnip_runtime::poller::{wait_for_intents, RetryPolicy, WaitOutcome};
use sdnip_runtime::trigger::send_trigger;
use sdnip_runtime::{run_experiment, Testbed};

use onos::OnosClient;

use clap::{Parser, Subcommand};
use log::*;
use std::error::Error;
use std::net::Ipv4Addr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// File to which the emulation plan is written, inside the configuration directory
const PLAN_FILE: &str = "emulation-plan.json";

fn main() {
    // run clap
    let args = CommandLineArguments::parse();

    // initialize the env logger
    pretty_env_logger::init();

    if let Err(e) = execute(args) {
        error!("{}", e);
        std::process::exit(1);
    }
}

fn execute(args: CommandLineArguments) -> Result<(), Box<dyn Error>> {
    let settings = args.settings()?;

    match args.cmd {
        MainCommand::Compile { output_dir, topology } => {
            let topology = match topology {
                Some(file) => Topology::from_file(file)?,
                None => abilene(),
            };
            let artifacts = compile(&topology, &settings)?;
            artifacts.write_to(&output_dir)?;
            info!(
                "Wrote the configuration of {} routers to {}",
                artifacts.router_configs.len(),
                output_dir.display()
            );
        }
        MainCommand::ExpectedIntents { config_dir } => {
            let expectation = IntentExpectation::from_config_dir(config_dir)?;
            println!("{}", expectation.count());
        }
        MainCommand::Wait { config_dir } => {
            let expected = IntentExpectation::from_config_dir(config_dir)?.count();
            let controller = controller(&settings)?;
            let outcome = wait_for_intents(
                || controller.intent_count(),
                expected,
                &RetryPolicy::from(&settings.sync),
                &Stopper::new(),
            );
            match outcome {
                WaitOutcome::Reached(n) => info!("Controller has installed {} intents", n),
                WaitOutcome::TimedOut { last } => {
                    return Err(sdnip_runtime::Error::IntentTimeout { expected, last }.into())
                }
                WaitOutcome::Cancelled => return Err(sdnip_runtime::Error::Cancelled.into()),
            }
        }
        MainCommand::Trigger { host } => {
            send_trigger((host, settings.sync.trigger_port))?;
            info!("Sent the trigger to {}:{}", host, settings.sync.trigger_port);
        }
        MainCommand::SendBundle { host, bundle } => {
            let bundle = ExperimentBundle::from_file(bundle)?;
            send_bundle((host, settings.sync.bundle_port), &bundle)?;
            info!("Sent the experiment bundle to {}:{}", host, settings.sync.bundle_port);
        }
        MainCommand::Run { config_dir, bundle, emulator, startup_delay, local } => {
            let bundle = match bundle {
                Some(file) => ExperimentBundle::from_file(file)?,
                None => receive_bundle((Ipv4Addr::UNSPECIFIED, settings.sync.bundle_port))?,
            };

            let executor: Arc<ProcessExecutor> =
                Arc::new(if local { ProcessExecutor::local() } else { ProcessExecutor::netns() });
            let root = Arc::new(ProcessExecutor::local());
            let emulator = match emulator.split_first() {
                Some((program, args)) => HostCommand::new(program.as_str()).args(args),
                None => return Err("The emulator command must not be empty".into()),
            };

            let mut testbed = Testbed {
                emulator: CommandEmulator::new(
                    emulator,
                    config_dir.join(PLAN_FILE),
                    Duration::from_secs(startup_delay),
                ),
                daemons: ExecutorDaemonLauncher::new(executor.clone(), root),
                executor,
                controller: controller(&settings)?,
            };

            let report =
                run_experiment(&mut testbed, &bundle, &settings, &config_dir, &Stopper::new())?;
            for demand in report.demands.iter().filter(|d| !d.is_success()) {
                warn!(
                    "Demand {} -> {}: {} of {} steps, {} failed{}",
                    demand.source,
                    demand.destination,
                    demand.steps_run,
                    demand.steps_total,
                    demand.failures.len(),
                    if demand.cancelled { ", cancelled" } else { "" }
                );
            }
            info!(
                "Experiment done ({} intents, {} demands)",
                report.expected_intents,
                report.demands.len()
            );
        }
    }

    Ok(())
}

fn controller(settings: &Settings) -> Result<OnosClient, onos::Error> {
    OnosClient::new(
        &settings.controller.rest_host,
        settings.controller.rest_port,
        &settings.controller.username,
        &settings.controller.password,
    )
}

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct CommandLineArguments {
    /// TOML file with the settings. Missing values fall back to their defaults.
    #[arg(short, long, global = true)]
    settings: Option<PathBuf>,
    /// Address of the controller REST API
    #[arg(long, global = true)]
    controller: Option<String>,
    /// Port of the controller REST API
    #[arg(long, global = true)]
    controller_port: Option<u16>,
    /// Tool used to generate the traffic (iperf3, iperf2 or ditg)
    #[arg(long, global = true)]
    tool: Option<TrafficTool>,
    /// Give up waiting for the intents after this many seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,
    /// Action to perform
    #[command(subcommand)]
    cmd: MainCommand,
}

impl CommandLineArguments {
    /// Read the settings file, and apply the overrides of the command line.
    fn settings(&self) -> Result<Settings, sdnip::Error> {
        let mut settings = match self.settings.as_ref() {
            Some(file) => Settings::from_file(file)?,
            None => Settings::default(),
        };
        if let Some(host) = self.controller.as_ref() {
            settings.controller.rest_host = host.clone();
        }
        if let Some(port) = self.controller_port {
            settings.controller.rest_port = port;
        }
        if let Some(tool) = self.tool {
            settings.sync.traffic_tool = tool;
        }
        if let Some(timeout) = self.timeout {
            settings.sync.poll_timeout_s = Some(timeout);
        }
        Ok(settings)
    }
}

#[derive(Subcommand, Debug)]
enum MainCommand {
    /// Generate the router, speaker and controller configuration
    #[command(name = "compile")]
    Compile {
        /// Directory to write the configuration to. It is removed first.
        #[arg(short, long, default_value = "configs")]
        output_dir: PathBuf,
        /// JSON file with a list of links `[source, target, capacity]`. Uses Abilene if not set.
        #[arg(short, long)]
        topology: Option<PathBuf>,
    },
    /// Print the number of intents the controller installs for the configuration
    #[command(name = "expected-intents")]
    ExpectedIntents {
        /// Directory containing the generated configuration
        #[arg(short, long, default_value = "configs")]
        config_dir: PathBuf,
    },
    /// Wait until the controller has installed all intents
    #[command(name = "wait")]
    Wait {
        /// Directory containing the generated configuration
        #[arg(short, long, default_value = "configs")]
        config_dir: PathBuf,
    },
    /// Send the trigger which starts the traffic
    #[command(name = "trigger")]
    Trigger {
        /// Host running the experiment
        #[arg(default_value = "127.0.0.1")]
        host: Ipv4Addr,
    },
    /// Send an experiment bundle to a waiting experiment
    #[command(name = "send-bundle")]
    SendBundle {
        /// Host running the experiment
        #[arg(long, default_value = "127.0.0.1")]
        host: Ipv4Addr,
        /// JSON file containing the bundle
        bundle: PathBuf,
    },
    /// Run the whole experiment on the emulated network
    #[command(name = "run")]
    Run {
        /// Directory for the configuration
        #[arg(short, long, default_value = "configs")]
        config_dir: PathBuf,
        /// JSON file containing the bundle. If not set, wait for the bundle on the bundle port.
        #[arg(short, long)]
        bundle: Option<PathBuf>,
        /// Seconds to wait after starting the emulator
        #[arg(long, default_value_t = 10)]
        startup_delay: u64,
        /// Execute the host commands on the local machine instead of the host namespaces
        #[arg(long)]
        local: bool,
        /// Command starting the emulator, after `--`. The path of the emulation plan is appended.
        #[arg(last = true, required = true)]
        emulator: Vec<String>,
    },
}
