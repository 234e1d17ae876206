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

//! # Controller network configuration
//!
//! Typed representation of `network-cfg.json`, which is uploaded to the controller. It describes
//! the interfaces of the internal speaker on every access switch, and the BGP speaker application
//! with its expected peers.

use crate::addressing::{connect_point, dpid, NodeAddresses};
use crate::settings::Settings;
use crate::Error;

use ipnet::Ipv4Net;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::net::Ipv4Addr;
use std::path::Path;

/// Name of the router application in the controller
pub const ROUTER_APP: &str = "org.onosproject.router";
/// Name of the OpenFlow flow rule provider in the controller
pub const FLOW_PROVIDER_APP: &str = "org.onosproject.provider.of.flow.impl.OpenFlowRuleProvider";

/// Content of `network-cfg.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Interfaces, keyed by the switch port identifier
    pub ports: BTreeMap<String, PortConfig>,
    /// Application configuration
    pub apps: AppsConfig,
}

/// Interfaces configured on a switch port
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortConfig {
    /// All interfaces on the port
    pub interfaces: Vec<InterfaceConfig>,
}

/// Single interface of the internal speaker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceConfig {
    /// Name of the interface
    pub name: String,
    /// Addresses of the interface
    pub ips: Vec<Ipv4Net>,
    /// MAC address of the interface
    pub mac: String,
}

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppsConfig {
    /// Router application
    #[serde(rename = "org.onosproject.router")]
    pub router: RouterApp,
    /// Flow rule provider
    #[serde(
        rename = "org.onosproject.provider.of.flow.impl.OpenFlowRuleProvider",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub flow_provider: Option<FlowProviderApp>,
}

/// Configuration of the router application
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouterApp {
    /// BGP part of the router application
    pub bgp: BgpApp,
}

/// All BGP speakers known to the router application
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BgpApp {
    /// BGP speakers
    #[serde(rename = "bgpSpeakers")]
    pub bgp_speakers: Vec<BgpSpeaker>,
}

/// A BGP speaker, which peers with all routers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BgpSpeaker {
    /// Name of the speaker
    pub name: String,
    /// Switch port to which the speaker is attached
    #[serde(rename = "connectPoint")]
    pub connect_point: String,
    /// Addresses of all peers
    pub peers: Vec<Ipv4Addr>,
}

/// Configuration of the OpenFlow flow rule provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowProviderApp {
    /// Flow statistics polling interval in seconds
    #[serde(rename = "flowPollFrequency")]
    pub flow_poll_frequency: u32,
}

impl NetworkConfig {
    /// Build the network configuration for all nodes.
    pub fn new(nodes: &[NodeAddresses], settings: &Settings) -> Self {
        let ports = nodes
            .iter()
            .map(|n| {
                let iface = InterfaceConfig {
                    name: format!("sw{}-1", n.index()),
                    ips: vec![n.peering_net()],
                    mac: settings.speaker.mac.clone(),
                };
                (n.access_point(), PortConfig { interfaces: vec![iface] })
            })
            .collect();
        let speaker = BgpSpeaker {
            name: settings.speaker.name.clone(),
            connect_point: connect_point(dpid(settings.speaker.switch), settings.speaker.port),
            peers: nodes.iter().map(|n| n.router_id()).collect(),
        };
        Self {
            ports,
            apps: AppsConfig {
                router: RouterApp { bgp: BgpApp { bgp_speakers: vec![speaker] } },
                flow_provider: Some(FlowProviderApp {
                    flow_poll_frequency: settings.controller.flow_poll_frequency,
                }),
            },
        }
    }

    /// Parse the network configuration from a JSON string.
    pub fn from_json(s: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(s)?)
    }

    /// Read the network configuration from a file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| Error::MalformedConfig(path.display().to_string(), e.to_string()))
    }

    /// Render the configuration as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, Error> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Peers of the first BGP speaker, or `None` if no speaker is configured.
    pub fn peers(&self) -> Option<&[Ipv4Addr]> {
        self.apps.router.bgp.bgp_speakers.first().map(|s| s.peers.as_slice())
    }
}
