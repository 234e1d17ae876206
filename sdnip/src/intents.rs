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

//! # Expected Intents
//!
//! Before the traffic starts, all BGP announcements must be installed as intents in the
//! controller. The number of intents expected for a deployment is derived from the generated
//! configuration:
//!
//! - every peer causes [`INTENTS_PER_PEER`] intents (2 directions, 3 sessions each), and
//! - every pair of prefixes advertised by two distinct peers causes one intent.

use crate::compiler::NetworkConfig;
use crate::compiler::NETWORK_CONFIG_FILE;
use crate::Error;

use lazy_static::lazy_static;
use log::*;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Intents installed for every peering interface
pub const INTENTS_PER_PEER: usize = 2 * 3;

lazy_static! {
    static ref NETWORK_LINE: Regex = Regex::new(r"^\s*network\s+\S+").unwrap();
    static ref ROUTER_CONFIG_FILE: Regex = Regex::new(r"^quagga.*\.conf$").unwrap();
}

/// Compute the number of expected intents from the number of peers, and the number of prefixes
/// advertised by every peer.
pub fn expected_intent_count(peers: usize, prefixes_per_peer: &[usize]) -> usize {
    let total: usize = prefixes_per_peer.iter().sum();
    let flows: usize = prefixes_per_peer.iter().map(|p| p * (total - p)).sum();
    peers * INTENTS_PER_PEER + flows
}

/// Number of active `network` statements in a bgpd configuration. Commented lines (starting with
/// `!`) are ignored.
pub fn count_networks(config: &str) -> usize {
    config.lines().filter(|l| NETWORK_LINE.is_match(l)).count()
}

/// Everything needed to compute the expected number of intents
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntentExpectation {
    /// Number of peers of the BGP speaker
    pub peers: usize,
    /// Number of advertised prefixes, for every router advertising at least one
    pub prefixes_per_peer: Vec<usize>,
}

impl IntentExpectation {
    /// Build the expectation from the content of the network configuration and the bgpd
    /// configurations.
    pub fn new<'a, I>(network_config: &NetworkConfig, router_configs: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let peers = network_config
            .peers()
            .ok_or(Error::MissingPeers)?
            .len();
        let prefixes_per_peer =
            router_configs.into_iter().map(count_networks).filter(|p| *p > 0).collect();
        Ok(Self { peers, prefixes_per_peer })
    }

    /// Read `network-cfg.json` and all `quagga*.conf` files in `dir`. Missing or malformed
    /// files are an error.
    pub fn from_config_dir(dir: impl AsRef<Path>) -> Result<Self, Error> {
        let dir = dir.as_ref();
        let network_config = NetworkConfig::from_file(dir.join(NETWORK_CONFIG_FILE))?;

        let mut files = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            let is_router_config = path
                .file_name()
                .and_then(|n| n.to_str())
                .map(|n| ROUTER_CONFIG_FILE.is_match(n))
                .unwrap_or(false);
            if is_router_config && path.is_file() {
                files.push(path);
            }
        }
        files.sort();

        let configs = files.iter().map(fs::read_to_string).collect::<Result<Vec<_>, _>>()?;
        let expectation = Self::new(&network_config, configs.iter().map(|c| c.as_str()))?;
        debug!(
            "{} peers, prefixes per peer: {:?} (from {} files in {})",
            expectation.peers,
            expectation.prefixes_per_peer,
            files.len(),
            dir.display()
        );
        Ok(expectation)
    }

    /// Expected number of intents
    pub fn count(&self) -> usize {
        expected_intent_count(self.peers, &self.prefixes_per_peer)
    }
}
