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

//! Quagga configuration files for the routers, the internal speaker and zebra.

use crate::addressing::NodeAddresses;
use crate::settings::{BgpSettings, Settings};

/// Configuration of the bgpd daemon of a single router. The router has a single multihop eBGP
/// session towards the internal speaker, and advertises the network of its host.
pub fn router_config(node: &NodeAddresses, bgp: &BgpSettings) -> String {
    let peer = node.peering_addr();
    let lines = vec![
        format!("! BGP configuration for {}", node.hostname()),
        "!".to_string(),
        format!("hostname {}", node.hostname()),
        format!("password {}", bgp.password),
        "!".to_string(),
        format!("router bgp {}", node.as_number(bgp.base_as)),
        format!("  bgp router-id {}", node.router_id()),
        format!("  timers bgp {} {}", bgp.keepalive, bgp.hold),
        format!("  neighbor {} remote-as {}", peer, bgp.base_as),
        format!("  neighbor {} ebgp-multihop", peer),
        format!("  neighbor {} timers connect {}", peer, bgp.connect_timer),
        format!("  neighbor {} advertisement-interval {}", peer, bgp.advertisement_interval),
        format!("  network {}", node.host_prefix()),
        "!".to_string(),
        "log stdout".to_string(),
    ];
    lines.join("\n")
}

/// Configuration of the internal speaker. It mirrors the session of every router, and has one
/// additional session towards the BGP endpoint of the controller.
pub fn speaker_config(nodes: &[NodeAddresses], settings: &Settings) -> String {
    let bgp = &settings.bgp;
    let controller = settings.controller.bgp_peer;
    let mut lines = vec![
        "!".to_string(),
        "hostname bgp".to_string(),
        format!("password {}", bgp.password),
        "!".to_string(),
        "!".to_string(),
        format!("router bgp {}", bgp.base_as),
        format!("  bgp router-id {}", settings.speaker.router_id),
        format!("  timers bgp {} {}", bgp.keepalive, bgp.hold),
    ];
    for node in nodes {
        let peer = node.router_id();
        lines.push("  !".to_string());
        lines.push(format!("  neighbor {} remote-as {}", peer, node.as_number(bgp.base_as)));
        lines.push(format!("  neighbor {} ebgp-multihop", peer));
        lines.push(format!("  neighbor {} timers connect {}", peer, bgp.connect_timer));
        lines.push(format!(
            "  neighbor {} advertisement-interval {}",
            peer, bgp.advertisement_interval
        ));
    }
    lines.push("  ! ONOS".to_string());
    lines.push(format!("  neighbor {} remote-as {}", controller, bgp.base_as));
    lines.push(format!("  neighbor {} port {}", controller, settings.controller.bgp_port));
    lines.push(format!("  neighbor {} timers connect {}", controller, bgp.connect_timer));
    lines.push("!".to_string());
    lines.push("log stdout".to_string());
    lines.join("\n")
}

/// Configuration of zebra, which is the same for every router.
pub fn zebra_config(bgp: &BgpSettings) -> String {
    vec![
        "! Configuration for zebra (NB: it is the same for all routers)".to_string(),
        "!".to_string(),
        "hostname zebra".to_string(),
        format!("password {}", bgp.password),
        "log stdout".to_string(),
    ]
    .join("\n")
}
