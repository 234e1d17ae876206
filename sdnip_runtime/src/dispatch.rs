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


//! # Traffic playback
//!
//! Every demand of the schedule runs in its own thread, executing its steps one after the other
//! on the source host. Demands of the same source run concurrently.

use crate::emulator::HostExecutor;
use crate::Error;

use sdnip::emulation::EmulationPlan;
use sdnip::traffic::{DemandSchedule, Schedule, TrafficTool};
use sdnip::Stopper;

use log::*;
use std::collections::BTreeMap;
use std::net::Ipv4Addr;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Outcome of a single demand
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemandReport {
    /// Source host
    pub source: Ipv4Addr,
    /// Destination host
    pub destination: Ipv4Addr,
    /// Number of steps that were executed, including failed ones
    pub steps_run: usize,
    /// Total number of steps
    pub steps_total: usize,
    /// Error message of every failed step
    pub failures: Vec<String>,
    /// The demand was stopped before all steps were executed
    pub cancelled: bool,
}

impl DemandReport {
    fn new(demand: &DemandSchedule) -> Self {
        Self {
            source: demand.source,
            destination: demand.destination,
            steps_run: 0,
            steps_total: demand.steps.len(),
            failures: Vec::new(),
            cancelled: false,
        }
    }

    /// Returns true if all steps were executed without any error.
    pub fn is_success(&self) -> bool {
        !self.cancelled && self.failures.is_empty() && self.steps_run == self.steps_total
    }
}

/// Handle to the running demands
#[derive(Debug)]
pub struct DispatchHandle {
    stopper: Stopper,
    jobs: Vec<(DemandReport, JoinHandle<DemandReport>)>,
}

impl DispatchHandle {
    /// Number of dispatched demands
    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    /// Returns true if no demand was dispatched
    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Stop all demands. Steps which are already running are not interrupted, but no new step
    /// is started.
    pub fn stop(&self) {
        self.stopper.send_stop();
    }

    /// Wait until all demands are done, and return their outcome in the order of the schedule.
    pub fn join(self) -> Vec<DemandReport> {
        self.jobs
            .into_iter()
            .map(|(mut initial, job)| match job.join() {
                Ok(report) => report,
                Err(_) => {
                    error!("Thread of demand {} -> {} panicked", initial.source, initial.destination);
                    initial.failures.push("thread panicked".to_string());
                    initial
                }
            })
            .collect()
    }
}

/// Names of all hosts in the plan, by their address
pub fn host_names(plan: &EmulationPlan) -> BTreeMap<Ipv4Addr, String> {
    plan.hosts.iter().map(|h| (h.addr.addr(), h.name.clone())).collect()
}

/// Start the traffic receivers on every host of the plan, in the background. Returns the number
/// of started receivers.
pub fn start_receivers(
    plan: &EmulationPlan,
    tool: TrafficTool,
    executor: &dyn HostExecutor,
) -> Result<usize, Error> {
    let addrs = plan.host_addrs();
    let mut started = 0;
    for host in plan.hosts.iter() {
        for cmd in tool.receiver_commands(host.addr.addr(), &addrs) {
            executor.spawn(&host.name, &cmd)?;
            started += 1;
        }
    }
    Ok(started)
}

/// Start all demands of the schedule. Each demand gets its own thread. The stopper is checked
/// before every step.
pub fn dispatch(
    schedule: &Schedule,
    tool: TrafficTool,
    hosts: &BTreeMap<Ipv4Addr, String>,
    executor: Arc<dyn HostExecutor>,
    stopper: Stopper,
) -> DispatchHandle {
    let jobs = schedule
        .demands()
        .map(|demand| {
            let initial = DemandReport::new(demand);
            let host = hosts.get(&demand.source).cloned();
            let demand = demand.clone();
            let executor = executor.clone();
            let stopper = stopper.clone();
            let job = thread::spawn(move || run_demand(demand, host, tool, executor, stopper));
            (initial, job)
        })
        .collect();
    DispatchHandle { stopper, jobs }
}

fn run_demand(
    demand: DemandSchedule,
    host: Option<String>,
    tool: TrafficTool,
    executor: Arc<dyn HostExecutor>,
    stopper: Stopper,
) -> DemandReport {
    let mut report = DemandReport::new(&demand);
    let host = match host {
        Some(h) => h,
        None => {
            error!("No host has the address {}", demand.source);
            report.failures.push(format!("unknown source host {}", demand.source));
            return report;
        }
    };

    for step in demand.steps.iter() {
        if stopper.is_stop() {
            debug!("Demand {} -> {} cancelled", demand.source, demand.destination);
            report.cancelled = true;
            break;
        }
        let cmd = tool.client_command(demand.source, step);
        if let Err(e) = executor.run(&host, &cmd) {
            warn!("[{}] {}: {}", host, cmd, e);
            report.failures.push(e.to_string());
        }
        report.steps_run += 1;
    }
    report
}
