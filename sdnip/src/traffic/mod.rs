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

//! # Traffic Matrix
//!
//! A [`DemandMatrix`] maps every `(source, destination)` host pair to a time series of bandwidth
//! values in Mbit/s, one value per aggregation interval. The matrix is turned into a
//! [`Schedule`] of discrete steps, which the [`TrafficTool`] renders into commands.

mod schedule;
mod tool;

pub use schedule::{build_schedule, DemandSchedule, Schedule, TrafficStep, LAST_BUCKET_FACTOR};
pub use tool::{port_for, TrafficTool, BASE_PORT, DITG_PACKET_SIZE};

use crate::Error;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::net::Ipv4Addr;

/// Bandwidth in Mbit/s
pub type Bandwidth = f64;

/// A single demand, as it is transferred between processes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Demand {
    /// Address of the source host
    pub src: Ipv4Addr,
    /// Address of the destination host
    pub dst: Ipv4Addr,
    /// Bandwidth for every aggregation interval, in time order
    pub bandwidths: Vec<Bandwidth>,
}

/// Mapping from host pairs to their bandwidth time series.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "Vec<Demand>", into = "Vec<Demand>")]
pub struct DemandMatrix {
    demands: BTreeMap<(Ipv4Addr, Ipv4Addr), Vec<Bandwidth>>,
}

impl DemandMatrix {
    /// Create an empty matrix
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the time series of a host pair, returning the old one if it was present.
    pub fn insert(
        &mut self,
        src: Ipv4Addr,
        dst: Ipv4Addr,
        bandwidths: Vec<Bandwidth>,
    ) -> Option<Vec<Bandwidth>> {
        self.demands.insert((src, dst), bandwidths)
    }

    /// Time series of a host pair
    pub fn get(&self, src: Ipv4Addr, dst: Ipv4Addr) -> Option<&[Bandwidth]> {
        self.demands.get(&(src, dst)).map(|b| b.as_slice())
    }

    /// Iterate over all demands, ordered by source and destination.
    pub fn iter(&self) -> impl Iterator<Item = (Ipv4Addr, Ipv4Addr, &[Bandwidth])> {
        self.demands.iter().map(|((s, d), b)| (*s, *d, b.as_slice()))
    }

    /// Number of demands
    pub fn len(&self) -> usize {
        self.demands.len()
    }

    /// Returns true if there is no demand
    pub fn is_empty(&self) -> bool {
        self.demands.is_empty()
    }

    /// All hosts appearing in the matrix, either as source or as destination
    pub fn hosts(&self) -> Vec<Ipv4Addr> {
        let mut hosts: Vec<Ipv4Addr> = self.demands.keys().flat_map(|(s, d)| vec![*s, *d]).collect();
        hosts.sort();
        hosts.dedup();
        hosts
    }

    /// Lengthen the run by repeating every time series once: `[a, b]` becomes `[a, b, a, b]`.
    pub fn doubled(&self) -> Self {
        let demands = self
            .demands
            .iter()
            .map(|(k, b)| (*k, b.iter().chain(b.iter()).copied().collect()))
            .collect();
        Self { demands }
    }

    /// Check that every demand can be scheduled: the time series is not empty, every bandwidth
    /// is a finite, non-negative number, and source and destination differ.
    pub fn validate(&self) -> Result<(), Error> {
        for ((src, dst), bws) in self.demands.iter() {
            let invalid = |reason: &str| Error::InvalidDemand(*src, *dst, reason.to_string());
            if src == dst {
                return Err(invalid("source and destination are the same host"));
            }
            if bws.is_empty() {
                return Err(invalid("empty time series"));
            }
            if bws.iter().any(|b| !b.is_finite() || *b < 0.0) {
                return Err(invalid("bandwidth must be a finite, non-negative number"));
            }
        }
        Ok(())
    }
}

impl From<Vec<Demand>> for DemandMatrix {
    fn from(demands: Vec<Demand>) -> Self {
        Self { demands: demands.into_iter().map(|d| ((d.src, d.dst), d.bandwidths)).collect() }
    }
}

impl From<DemandMatrix> for Vec<Demand> {
    fn from(m: DemandMatrix) -> Self {
        m.demands.into_iter().map(|((src, dst), bandwidths)| Demand { src, dst, bandwidths }).collect()
    }
}
