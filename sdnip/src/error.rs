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

//! Module containing all error types

use std::net::Ipv4Addr;
use thiserror::Error;

/// Main error type
#[derive(Debug, Error)]
pub enum Error {
    /// The topology does not contain any node
    #[error("The topology must contain at least one node")]
    EmptyTopology,
    /// An edge references a node which is not part of the topology
    #[error("Edge references the unknown node {0}")]
    UnknownNode(String),
    /// A node index cannot be represented in the address scheme
    #[error("Node {0} is mapped to address index {1}, which does not fit into an IPv4 octet")]
    AddressOverflow(usize, usize),
    /// Two nodes are mapped onto the same address index
    #[error("Nodes {0} and {1} are both mapped to address index {2}")]
    AddressCollision(usize, usize, usize),
    /// The network configuration does not contain any BGP speaker
    #[error("The network configuration does not contain any BGP speaker")]
    MissingPeers,
    /// A configuration file exists, but does not have the expected content.
    #[error("Malformed configuration {0}: {1}")]
    MalformedConfig(String, String),
    /// A demand of the traffic matrix cannot be scheduled
    #[error("Invalid demand {0} -> {1}: {2}")]
    InvalidDemand(Ipv4Addr, Ipv4Addr, String),
    /// The aggregation interval must be positive
    #[error("The aggregation interval must be larger than zero")]
    InvalidInterval,
    /// Error while reading or writing files
    #[error("I/O Error: {0}")]
    IoError(#[from] std::io::Error),
    /// Error while reading or writing JSON documents
    #[error("JSON Error: {0}")]
    JsonError(#[from] serde_json::Error),
    /// Cannot parse the settings file
    #[error("Cannot parse the settings: {0}")]
    SettingsError(#[from] toml::de::Error),
}
