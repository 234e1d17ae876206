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


//! # Runtime System
//!
//! This library drives an SDN-IP experiment on an emulated network. It starts the emulated
//! network and the routing daemons, waits until the controller has installed all intents, and
//! plays back the traffic matrix once the operator sends the trigger.
//!
//! The external systems are only accessed through the traits in [`emulator`]:
//!
//! - [`Emulator`](emulator::Emulator) brings the emulated network up and down,
//! - [`DaemonLauncher`](emulator::DaemonLauncher) starts and stops zebra and bgpd,
//! - [`HostExecutor`](emulator::HostExecutor) executes commands on the emulated hosts.
//!
//! The traffic is played back by [`dispatch`](dispatch::dispatch), running every demand in its
//! own thread.

#![deny(missing_docs, missing_debug_implementations)]

pub mod bundle;
pub mod dispatch;
pub mod emulator;
pub mod poller;
pub mod trigger;

use bundle::ExperimentBundle;
use dispatch::{dispatch, host_names, start_receivers, DemandReport};
use emulator::{DaemonLauncher, Emulator, HostExecutor};
use poller::{wait_for_intents, RetryPolicy, WaitOutcome};
use trigger::TriggerListener;

use sdnip::compiler::{compile, NetworkConfig, NETWORK_CONFIG_FILE};
use sdnip::emulation::{DaemonSpec, EmulationPlan};
use sdnip::example_topologies::abilene;
use sdnip::intents::IntentExpectation;
use sdnip::settings::Settings;
use sdnip::Stopper;

use onos::OnosClient;

use log::*;
use std::net::Ipv4Addr;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Runtime error
#[derive(Debug, Error)]
pub enum Error {
    /// Error of the configuration compiler or the schedule builder
    #[error("{0}")]
    SdnipError(#[from] sdnip::Error),
    /// Error while talking to the controller
    #[error("Controller error: {0}")]
    OnosError(#[from] onos::Error),
    /// I/O error, including socket errors
    #[error("I/O Error: {0}")]
    IoError(#[from] std::io::Error),
    /// The experiment bundle cannot be parsed or serialized
    #[error("Invalid experiment bundle: {0}")]
    BundleError(#[from] serde_json::Error),
    /// An external command returned a non-zero exit status
    #[error("Command `{0}` failed: {1}")]
    CommandFailed(String, String),
    /// The emulator process exited while the network should be running
    #[error("The emulator exited unexpectedly: {0}")]
    EmulatorExited(String),
    /// The emulator is not running
    #[error("The emulator is not running")]
    EmulatorNotRunning,
    /// The controller did not install all intents in time
    #[error("Timeout while waiting for {expected} intents (last count: {last:?})")]
    IntentTimeout {
        /// Number of expected intents
        expected: usize,
        /// Last number reported by the controller
        last: Option<usize>,
    },
    /// The experiment was cancelled
    #[error("The experiment was cancelled")]
    Cancelled,
}

/// External systems needed to run an experiment
#[derive(Debug)]
pub struct Testbed<E, D> {
    /// Network emulator
    pub emulator: E,
    /// Routing daemon launcher
    pub daemons: D,
    /// Executes commands on the emulated hosts
    pub executor: Arc<dyn HostExecutor>,
    /// REST client of the controller
    pub controller: OnosClient,
}

/// Summary of a finished experiment
#[derive(Debug, Clone)]
pub struct ExperimentReport {
    /// Number of intents the controller had to install
    pub expected_intents: usize,
    /// Outcome of every demand
    pub demands: Vec<DemandReport>,
}

impl ExperimentReport {
    /// Returns true if every step of every demand was executed successfully.
    pub fn is_success(&self) -> bool {
        self.demands.iter().all(|d| d.is_success())
    }
}

/// # Run an experiment
///
/// This function executes the following steps:
///
/// 1. Build the traffic schedule from the bundle, before anything is written or started.
/// 2. Choose the topology. The Abilene network is compiled into `conf_dir`. The alternate
///    (tutorial) topology expects its configuration to be present in `conf_dir` already.
/// 3. Start the emulated network and all routing daemons, and upload the network configuration
///    to the controller.
/// 4. Start the traffic receivers on every host.
/// 5. Wait until the controller has installed all expected intents.
/// 6. Wait for the trigger on the trigger port, or until the experiment is cancelled.
/// 7. Play back the traffic matrix, and wait until all demands are done or the experiment is
///    cancelled.
///
/// Afterwards, the daemons and the emulated network are stopped, even if one of the steps failed.
pub fn run_experiment<E, D>(
    testbed: &mut Testbed<E, D>,
    bundle: &ExperimentBundle,
    settings: &Settings,
    conf_dir: impl AsRef<Path>,
    stopper: &Stopper,
) -> Result<ExperimentReport, Error>
where
    E: Emulator,
    D: DaemonLauncher,
{
    let conf_dir = conf_dir.as_ref();

    let schedule = bundle.schedule()?;
    info!(
        "Scheduled {} demands, running for {} seconds",
        schedule.len(),
        schedule.total_duration().as_secs()
    );

    let (plan, network_config) = if bundle.use_alternate_topology {
        info!("Using the SDN-IP tutorial topology with the configuration in {}", conf_dir.display());
        let plan = EmulationPlan::sdnip_tutorial(settings, conf_dir)?;
        let network_config = NetworkConfig::from_file(conf_dir.join(NETWORK_CONFIG_FILE))?;
        (plan, network_config)
    } else {
        info!("Compiling the Abilene network into {}", conf_dir.display());
        let topology = abilene();
        let artifacts = compile(&topology, settings)?;
        artifacts.write_to(conf_dir)?;
        let plan = EmulationPlan::from_topology(&topology, settings, conf_dir)?;
        (plan, artifacts.network_config)
    };

    info!("Starting the emulated network");
    testbed.emulator.start(&plan)?;

    let daemons = plan.daemons(&settings.quagga);
    let mut started: Vec<&DaemonSpec> = Vec::with_capacity(daemons.len());
    let result = (|| -> Result<ExperimentReport, Error> {
        for daemon in daemons.iter() {
            testbed.daemons.start(daemon)?;
            started.push(daemon);
        }
        info!("Started {} routing daemons", started.len());

        testbed.controller.upload_network_config(&network_config)?;
        info!("Uploaded the network configuration");

        let receivers =
            start_receivers(&plan, settings.sync.traffic_tool, testbed.executor.as_ref())?;
        info!("Started {} traffic receivers", receivers);

        let expected = IntentExpectation::from_config_dir(conf_dir)?.count();
        info!("Expecting {} intents", expected);

        let policy = RetryPolicy::from(&settings.sync);
        let controller = &testbed.controller;
        match wait_for_intents(|| controller.intent_count(), expected, &policy, stopper) {
            WaitOutcome::Reached(_) => {}
            WaitOutcome::TimedOut { last } => return Err(Error::IntentTimeout { expected, last }),
            WaitOutcome::Cancelled => return Err(Error::Cancelled),
        }

        let trigger_addr = (Ipv4Addr::UNSPECIFIED, settings.sync.trigger_port);
        let listener = TriggerListener::bind(trigger_addr)?;
        if listener.wait_unless_stopped(stopper)?.is_none() {
            return Err(Error::Cancelled);
        }

        info!("Starting the traffic");
        let handle = dispatch(
            &schedule,
            settings.sync.traffic_tool,
            &host_names(&plan),
            testbed.executor.clone(),
            stopper.clone(),
        );
        let demands = handle.join();
        info!(
            "Traffic done: {} of {} demands succeeded",
            demands.iter().filter(|d| d.is_success()).count(),
            demands.len()
        );

        Ok(ExperimentReport { expected_intents: expected, demands })
    })();

    info!("Stopping the experiment");
    for daemon in started.iter().rev() {
        if let Err(e) = testbed.daemons.stop(daemon) {
            warn!("Cannot stop {} on {}: {}", daemon.kind.binary(), daemon.router, e);
        }
    }
    if let Err(e) = testbed.executor.stop_all() {
        warn!("Cannot stop the background commands: {}", e);
    }
    if let Err(e) = testbed.emulator.stop() {
        warn!("Cannot stop the emulated network: {}", e);
    }

    result
}
