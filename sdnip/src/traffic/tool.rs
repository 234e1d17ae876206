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

//! Traffic generators, and how their commands are rendered.

use super::TrafficStep;
use crate::command::HostCommand;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

/// Receivers listen on `BASE_PORT + <source host number>`.
pub const BASE_PORT: u16 = 5000;

/// Payload size of every D-ITG packet, in bytes
pub const DITG_PACKET_SIZE: u32 = 512;

/// Tool used to generate the traffic.
///
/// - `iperf3` has a configurable TCP bandwidth, but a server accepts only one client at a time.
///   Hence, every destination runs one server for every possible source.
/// - `iperf` (version 2) can only limit UDP traffic, and accepts concurrent clients.
/// - `D-ITG` sends UDP with a given packet rate, and a single receiver accepts all senders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TrafficTool {
    /// `iperf3`, TCP
    Iperf3,
    /// `iperf`, UDP
    Iperf2,
    /// `ITGSend` and `ITGRecv`, UDP
    Ditg,
}

/// Port on which the destination listens for traffic of the given source. The host number is the
/// third octet of the host address (`192.168.<n>.1`).
pub fn port_for(source: Ipv4Addr) -> u16 {
    BASE_PORT + source.octets()[2] as u16
}

impl TrafficTool {
    /// Command generating the traffic of a single step, executed on the source host.
    pub fn client_command(&self, source: Ipv4Addr, step: &TrafficStep) -> HostCommand {
        let secs = step.duration.as_secs();
        match self {
            Self::Iperf3 => HostCommand::new("iperf3")
                .arg("-c")
                .arg(step.destination)
                .arg("-b")
                .arg(format!("{}M", step.bandwidth))
                .arg("-p")
                .arg(port_for(source))
                .arg("-t")
                .arg(secs)
                .arg("-V"),
            Self::Iperf2 => HostCommand::new("iperf")
                .arg("-u")
                .arg("-c")
                .arg(step.destination)
                .arg("-b")
                .arg(format!("{}M", step.bandwidth))
                .arg("-p")
                .arg(port_for(source))
                .arg("-t")
                .arg(secs)
                .arg("-V"),
            Self::Ditg => HostCommand::new("ITGSend")
                .args(&["-T", "UDP", "-a"])
                .arg(step.destination)
                .arg("-C")
                .arg(ditg_packet_rate(step.bandwidth))
                .arg("-c")
                .arg(DITG_PACKET_SIZE)
                .arg("-t")
                .arg(secs),
        }
    }

    /// Commands starting the receivers on the destination host, one for every other host that
    /// might send traffic. D-ITG needs only a single receiver.
    pub fn receiver_commands(
        &self,
        destination: Ipv4Addr,
        hosts: &[Ipv4Addr],
    ) -> Vec<HostCommand> {
        let sources = hosts.iter().filter(|h| **h != destination);
        match self {
            Self::Iperf3 => sources
                .map(|s| HostCommand::new("iperf3").arg("-s").arg("-p").arg(port_for(*s)))
                .collect(),
            Self::Iperf2 => sources
                .map(|s| HostCommand::new("iperf").args(&["-u", "-s", "-p"]).arg(port_for(*s)))
                .collect(),
            Self::Ditg => vec![HostCommand::new("ITGRecv")],
        }
    }
}

/// Packets per second needed for the bandwidth (in Mbit/s), rounded up.
fn ditg_packet_rate(bandwidth: f64) -> u64 {
    (bandwidth * 1e6 / 8.0 / DITG_PACKET_SIZE as f64).floor() as u64 + 1
}

impl fmt::Display for TrafficTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Iperf3 => write!(f, "iperf3"),
            Self::Iperf2 => write!(f, "iperf2"),
            Self::Ditg => write!(f, "ditg"),
        }
    }
}

impl FromStr for TrafficTool {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "iperf3" => Ok(Self::Iperf3),
            "iperf2" | "iperf" => Ok(Self::Iperf2),
            "ditg" | "d-itg" => Ok(Self::Ditg),
            _ => Err(format!("Unknown traffic tool: {}", s)),
        }
    }
}
