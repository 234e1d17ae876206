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

//! GUI hints (`gui.json`), telling the controller GUI where the routers and the speaker are.

use crate::addressing::{connect_point, dpid, NodeAddresses};
use crate::settings::Settings;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// Content of `gui.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuiDocument {
    /// All annotated hosts
    pub hosts: Vec<GuiHost>,
}

/// A host shown in the GUI
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuiHost {
    /// MAC address
    pub mac: String,
    /// VLAN, `-1` if untagged
    pub vlan: i32,
    /// Switch port where the host is located
    pub location: String,
    /// Address (or comma separated list of addresses)
    pub ip: String,
    /// Annotations
    pub annotations: GuiAnnotations,
}

/// Annotations of a GUI host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuiAnnotations {
    /// Kind of the host
    #[serde(rename = "type")]
    pub kind: String,
}

impl GuiDocument {
    /// One entry for each router, followed by one entry for the internal speaker.
    pub fn new(nodes: &[NodeAddresses], settings: &Settings) -> Self {
        let mut hosts: Vec<GuiHost> = nodes
            .iter()
            .map(|n| GuiHost {
                mac: n.host_mac(),
                vlan: -1,
                location: n.access_point(),
                ip: n.router_id().to_string(),
                annotations: GuiAnnotations { kind: "router".to_string() },
            })
            .collect();
        hosts.push(GuiHost {
            mac: settings.speaker.mac.clone(),
            vlan: -1,
            location: connect_point(dpid(settings.speaker.switch), settings.speaker.port),
            ip: nodes.iter().map(|n| n.peering_addr()).join(", "),
            annotations: GuiAnnotations { kind: "bgpSpeaker".to_string() },
        });
        Self { hosts }
    }
}
