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

//! # ONOS Types

use ipnet::Ipv4Net;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Clone)]
pub(crate) struct IntentsResponse {
    pub intents: Vec<Intent>,
}

/// Generic response of the SDN-IP extension, wrapping the payload in `response`
#[derive(Debug, Deserialize, Clone)]
pub(crate) struct SdnIpResponse<T> {
    pub response: T,
}

/// Intent installed in the controller
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct Intent {
    /// ID of the intent
    pub id: String,
    /// Key of the intent
    #[serde(default)]
    pub key: Option<String>,
    /// Type of the intent, like `MultiPointToSinglePointIntent`
    #[serde(rename = "type")]
    pub kind: String,
    /// Application which created the intent
    #[serde(rename = "appId", default)]
    pub app_id: Option<String>,
    /// Installation state, like `INSTALLED`
    #[serde(default)]
    pub state: Option<String>,
}

/// Traffic sample measured by the SDN-IP application
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct TrafficSample {
    /// Unix timestamp of the sample
    pub timestamp: u64,
    /// Demand, written as `<source prefix>=<destination prefix>`
    pub demand: String,
    /// Number of bytes transferred
    pub bytes: u64,
}

impl TrafficSample {
    /// Parse the source and destination prefix of the demand.
    pub fn prefixes(&self) -> Option<(Ipv4Net, Ipv4Net)> {
        let mut parts = self.demand.splitn(2, '=');
        let src = parts.next()?.trim().parse().ok()?;
        let dst = parts.next()?.trim().parse().ok()?;
        Some((src, dst))
    }
}

/// Prefixes announced by the router behind a switch port
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct AnnouncedPrefixes {
    /// Switch port, like `of:00000000000000a1/1`
    #[serde(rename = "CP")]
    pub connect_point: String,
    /// Announced prefixes
    #[serde(rename = "IpPrefixList")]
    pub prefixes: Vec<Ipv4Net>,
}

/// A path through the network, with its share of the demand
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct RoutingPath {
    /// Sequence of device IDs, like `of:00000000000000a1`
    pub path: Vec<String>,
    /// Fraction of the demand routed along this path
    pub weight: f64,
}

/// Paths used for a single demand
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Route {
    /// Source and destination prefix
    pub demand: [Ipv4Net; 2],
    /// All paths of the demand
    pub paths: Vec<RoutingPath>,
}

/// A complete routing configuration, which can later be applied by its ID
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct RoutingConfiguration {
    /// ID of the routing configuration
    #[serde(rename = "r_ID")]
    pub id: u32,
    /// Routes of the configuration
    #[serde(rename = "r_config")]
    pub routes: Vec<Route>,
}

#[derive(Debug, Serialize, Clone)]
pub(crate) struct AddRoutingRequest<'a> {
    pub routing_list: &'a [RoutingConfiguration],
}

#[derive(Debug, Serialize, Clone)]
pub(crate) struct ApplyRoutingRequest {
    #[serde(rename = "r_ID")]
    pub id: u32,
}
