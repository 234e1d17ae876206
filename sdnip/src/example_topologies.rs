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

//! # Example Topologies
//!
//! Backbone topologies which are used in the tutorials.

use crate::topology::{CapacityMap, Topology};

/// Capacity of every Abilene link, in bits per second
pub const ABILENE_LINK_CAPACITY: f64 = 10e9;

const ABILENE_LINKS: &[(&str, &str)] = &[
    ("ATLA", "HSTN"),
    ("ATLA", "IPLS"),
    ("ATLA", "WASH"),
    ("CHIN", "IPLS"),
    ("CHIN", "NYCM"),
    ("DNVR", "KSCY"),
    ("DNVR", "SNVA"),
    ("DNVR", "STTL"),
    ("HSTN", "ATLA"),
    ("HSTN", "KSCY"),
    ("HSTN", "LOSA"),
    ("IPLS", "ATLA"),
    ("IPLS", "CHIN"),
    ("IPLS", "KSCY"),
    ("KSCY", "DNVR"),
    ("KSCY", "HSTN"),
    ("KSCY", "IPLS"),
    ("LOSA", "HSTN"),
    ("LOSA", "SNVA"),
    ("NYCM", "CHIN"),
    ("NYCM", "WASH"),
    ("SNVA", "DNVR"),
    ("SNVA", "LOSA"),
    ("SNVA", "STTL"),
    ("STTL", "DNVR"),
    ("STTL", "SNVA"),
    ("WASH", "ATLA"),
    ("WASH", "NYCM"),
];

/// Directional capacity mapping of the [Abilene](http://topology-zoo.org/dataset.html)
/// backbone. Every physical link is listed in both directions.
pub fn abilene_capacities() -> CapacityMap {
    ABILENE_LINKS
        .iter()
        .map(|(a, b)| ((a.to_string(), b.to_string()), ABILENE_LINK_CAPACITY))
        .collect()
}

/// # Abilene Network
///
/// 11 nodes (`ATLA`, `CHIN`, `DNVR`, `HSTN`, `IPLS`, `KSCY`, `LOSA`, `NYCM`, `SNVA`, `STTL`,
/// `WASH`) connected by 14 physical links of 10 Gbit/s.
pub fn abilene() -> Topology {
    let edges = abilene_capacities();
    let nodes: Vec<String> =
        ABILENE_LINKS.iter().flat_map(|(a, b)| vec![a.to_string(), b.to_string()]).collect();
    // every endpoint is part of the node set, so this cannot fail
    Topology::new(nodes, edges).unwrap_or_else(|e| unreachable!("{}", e))
}
