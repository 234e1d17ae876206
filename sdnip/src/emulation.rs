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

//! # Emulation Plan
//!
//! Serializable description of the emulated network: switches, routers running quagga, hosts
//! behind every router, the internal BGP speaker, and all links between them. The plan is handed
//! to an emulator, which builds the network. It also describes the routing daemons that must run
//! on every router.

use crate::addressing::{dpid, AddressPlan, ReservedIndex, Substitute};
use crate::compiler::{router_config_file, SPEAKER_CONFIG_FILE, ZEBRA_CONFIG_FILE};
use crate::settings::{QuaggaSettings, Settings};
use crate::topology::Topology;
use crate::Error;

use ipnet::Ipv4Net;
use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;
use std::path::{Path, PathBuf};

/// Name of the internal speaker in the emulated network
pub const SPEAKER_NAME: &str = "bgp";

/// The SDN-IP tutorial maps router `r2` to `10.0.9.0/24`.
pub const TUTORIAL_RESERVED_INDICES: &[ReservedIndex] =
    &[ReservedIndex { index: 2, substitute: Substitute::Fixed(9) }];

/// An OpenFlow switch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Switch {
    /// Name of the switch, `s<i>`
    pub name: String,
    /// Datapath ID, as 16 hex digits
    pub dpid: String,
}

/// Interface of a router
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interface {
    /// Interface name, like `r1-eth0`
    pub name: String,
    /// MAC address to set, if any
    pub mac: Option<String>,
    /// Addresses of the interface
    pub addrs: Vec<Ipv4Net>,
}

/// A router running zebra and bgpd
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Router {
    /// Name of the router
    pub name: String,
    /// Interfaces of the router
    pub interfaces: Vec<Interface>,
    /// Default route
    pub default_route: Option<Ipv4Addr>,
    /// bgpd configuration file
    pub bgpd_config: PathBuf,
    /// zebra configuration file
    pub zebra_config: PathBuf,
    /// Whether the router lives in its own network namespace
    pub in_namespace: bool,
}

/// An end host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Host {
    /// Name of the host, `h<i>`
    pub name: String,
    /// Address of the host
    pub addr: Ipv4Net,
    /// Default gateway
    pub gateway: Ipv4Addr,
}

/// Link between two nodes of the emulated network
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Link {
    /// First endpoint
    pub a: String,
    /// Second endpoint
    pub b: String,
}

impl Link {
    fn new(a: impl Into<String>, b: impl Into<String>) -> Self {
        Self { a: a.into(), b: b.into() }
    }
}

/// Complete description of the emulated network
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmulationPlan {
    /// All switches
    pub switches: Vec<Switch>,
    /// All routers
    pub routers: Vec<Router>,
    /// All hosts
    pub hosts: Vec<Host>,
    /// The internal BGP speaker
    pub speaker: Router,
    /// All links
    pub links: Vec<Link>,
}

/// Kind of routing daemon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DaemonKind {
    /// Kernel routing table manager
    Zebra,
    /// BGP daemon
    Bgpd,
}

impl DaemonKind {
    /// Name of the binary
    pub fn binary(&self) -> &'static str {
        match self {
            Self::Zebra => "zebra",
            Self::Bgpd => "bgpd",
        }
    }
}

/// A routing daemon to start on a router
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaemonSpec {
    /// Router on which the daemon runs
    pub router: String,
    /// Kind of daemon
    pub kind: DaemonKind,
    /// Path to the binary
    pub program: PathBuf,
    /// Configuration file
    pub config: PathBuf,
    /// zebra API socket, shared by both daemons of a router
    pub api_socket: PathBuf,
    /// File in which the daemon writes its pid
    pub pid_file: PathBuf,
    /// Whether the router lives in its own network namespace
    pub in_namespace: bool,
}

impl DaemonSpec {
    /// Arguments to start the daemon in the background.
    pub fn args(&self) -> Vec<String> {
        vec![
            "-d".to_string(),
            "-f".to_string(),
            self.config.display().to_string(),
            "-z".to_string(),
            self.api_socket.display().to_string(),
            "-i".to_string(),
            self.pid_file.display().to_string(),
        ]
    }
}

fn switch(index: usize) -> Switch {
    Switch { name: format!("s{}", index), dpid: format!("{:016x}", dpid(index)) }
}

fn speaker(peering: Vec<Ipv4Net>, settings: &Settings, conf_dir: &Path) -> Router {
    Router {
        name: SPEAKER_NAME.to_string(),
        interfaces: vec![Interface {
            name: format!("{}-eth0", SPEAKER_NAME),
            mac: Some(settings.speaker.mac.clone()),
            addrs: peering,
        }],
        default_route: None,
        bgpd_config: conf_dir.join(SPEAKER_CONFIG_FILE),
        zebra_config: conf_dir.join(ZEBRA_CONFIG_FILE),
        in_namespace: false,
    }
}

impl EmulationPlan {
    /// Emulated network of a compiled topology. Every node `i` gets a switch `s<i>`, a router
    /// `r<i>` and a host `h<i>`. The switches are connected according to the undirected edges of
    /// the topology, and the speaker is attached to the speaker switch.
    pub fn from_topology(
        topology: &Topology,
        settings: &Settings,
        conf_dir: impl AsRef<Path>,
    ) -> Result<Self, Error> {
        let conf_dir = conf_dir.as_ref();
        let plan = AddressPlan::from_topology(topology, &settings.reserved)?;
        let mut result = Self {
            switches: plan.nodes().iter().map(|n| switch(n.index())).collect(),
            routers: Vec::new(),
            hosts: Vec::new(),
            speaker: speaker(
                plan.nodes().iter().map(|n| n.peering_net()).collect(),
                settings,
                conf_dir,
            ),
            links: Vec::new(),
        };

        for n in plan.nodes() {
            let name = n.hostname();
            let host = format!("h{}", n.index());
            result.routers.push(Router {
                interfaces: vec![
                    Interface {
                        name: format!("{}-eth0", name),
                        mac: Some(n.router_mac()),
                        addrs: vec![n.router_net()],
                    },
                    Interface {
                        name: format!("{}-eth1", name),
                        mac: None,
                        addrs: vec![gateway_net(n.gateway())],
                    },
                ],
                default_route: Some(n.peering_addr()),
                bgpd_config: conf_dir.join(router_config_file(n.index())),
                zebra_config: conf_dir.join(ZEBRA_CONFIG_FILE),
                in_namespace: true,
                name: name.clone(),
            });
            result.hosts.push(Host { name: host.clone(), addr: n.host_net(), gateway: n.gateway() });
            result.links.push(Link::new(name.clone(), format!("s{}", n.index())));
            result.links.push(Link::new(name, host));
        }

        result.links.push(Link::new(SPEAKER_NAME, format!("s{}", settings.speaker.switch)));

        for (a, b) in topology.undirected_edges() {
            // both endpoints are part of the topology
            if let (Some(x), Some(y)) = (topology.index_of(&a), topology.index_of(&b)) {
                result.links.push(Link::new(format!("s{}", x), format!("s{}", y)));
            }
        }

        Ok(result)
    }

    /// The hand-wired topology of the SDN-IP tutorial: 5 routers and 6 switches. Router `r5` is
    /// attached to the same switch as `r1`, and `r1` has a second host `h10`. The configuration
    /// files are not generated, but taken from `conf_dir`.
    pub fn sdnip_tutorial(settings: &Settings, conf_dir: impl AsRef<Path>) -> Result<Self, Error> {
        let conf_dir = conf_dir.as_ref();
        let names: Vec<String> = (1..=5).map(|i| format!("r{}", i)).collect();
        let plan = AddressPlan::new(&names, TUTORIAL_RESERVED_INDICES)?;
        let attachment = [1, 2, 5, 6, 1];

        let mut result = Self {
            switches: (1..=6).map(switch).collect(),
            routers: Vec::new(),
            hosts: Vec::new(),
            speaker: speaker(
                plan.nodes().iter().map(|n| n.peering_net()).collect(),
                settings,
                conf_dir,
            ),
            links: Vec::new(),
        };

        for (n, sw) in plan.nodes().iter().zip(attachment.iter()) {
            let name = n.hostname();
            let host = format!("h{}", n.index());
            let mut interfaces = vec![
                Interface {
                    name: format!("{}-eth0", name),
                    mac: Some(n.router_mac()),
                    addrs: vec![n.router_net()],
                },
                Interface {
                    name: format!("{}-eth1", name),
                    mac: None,
                    addrs: vec![gateway_net(n.gateway())],
                },
            ];
            result.links.push(Link::new(name.clone(), format!("s{}", sw)));
            result.links.push(Link::new(name.clone(), host.clone()));
            result.hosts.push(Host { name: host, addr: n.host_net(), gateway: n.gateway() });

            if n.index() == 1 {
                let extra = Ipv4Addr::new(192, 168, 10, 254);
                interfaces.push(Interface {
                    name: format!("{}-eth2", name),
                    mac: None,
                    addrs: vec![gateway_net(extra)],
                });
                result.hosts.push(Host {
                    name: "h10".to_string(),
                    addr: Ipv4Net::new(Ipv4Addr::new(192, 168, 10, 1), 24)
                        .unwrap_or_else(|_| Ipv4Net::from(Ipv4Addr::new(192, 168, 10, 1))),
                    gateway: extra,
                });
                result.links.push(Link::new(name.clone(), "h10"));
            }

            result.routers.push(Router {
                interfaces,
                default_route: None,
                bgpd_config: conf_dir.join(router_config_file(n.index())),
                zebra_config: conf_dir.join(ZEBRA_CONFIG_FILE),
                in_namespace: true,
                name,
            });
        }

        result.links.push(Link::new(SPEAKER_NAME, format!("s{}", settings.speaker.switch)));
        for (a, b) in &[(1, 2), (1, 3), (2, 4), (3, 4), (3, 5), (4, 6), (5, 6)] {
            result.links.push(Link::new(format!("s{}", a), format!("s{}", b)));
        }

        Ok(result)
    }

    /// Host with the given address
    pub fn host_by_addr(&self, addr: Ipv4Addr) -> Option<&Host> {
        self.hosts.iter().find(|h| h.addr.addr() == addr)
    }

    /// Addresses of all hosts
    pub fn host_addrs(&self) -> Vec<Ipv4Addr> {
        self.hosts.iter().map(|h| h.addr.addr()).collect()
    }

    /// Routing daemons to start: zebra before bgpd, for every router and for the speaker.
    pub fn daemons(&self, quagga: &QuaggaSettings) -> Vec<DaemonSpec> {
        self.routers
            .iter()
            .chain(std::iter::once(&self.speaker))
            .flat_map(|r| {
                vec![DaemonKind::Zebra, DaemonKind::Bgpd].into_iter().map(move |kind| DaemonSpec {
                    router: r.name.clone(),
                    kind,
                    program: quagga.bin_dir.join(kind.binary()),
                    config: match kind {
                        DaemonKind::Zebra => r.zebra_config.clone(),
                        DaemonKind::Bgpd => r.bgpd_config.clone(),
                    },
                    api_socket: quagga.run_dir.join(format!("zebra{}.api", r.name)),
                    pid_file: quagga.run_dir.join(format!("{}{}.pid", kind.binary(), r.name)),
                    in_namespace: r.in_namespace,
                })
            })
            .collect()
    }
}

fn gateway_net(gateway: Ipv4Addr) -> Ipv4Net {
    Ipv4Net::new(gateway, 24).unwrap_or_else(|_| Ipv4Net::from(gateway))
}
