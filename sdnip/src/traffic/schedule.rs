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

//! Schedule of traffic steps, derived from a demand matrix.

use super::{Bandwidth, DemandMatrix};
use crate::Error;

use std::collections::BTreeMap;
use std::convert::TryFrom;
use std::net::Ipv4Addr;
use std::time::Duration;

/// The last bucket of every demand runs this many aggregation intervals, such that the last
/// measurement is not cut off by the reporting window.
pub const LAST_BUCKET_FACTOR: u32 = 3;

/// Traffic with a constant bandwidth towards a single destination.
#[derive(Debug, Clone, PartialEq)]
pub struct TrafficStep {
    /// Address of the destination host
    pub destination: Ipv4Addr,
    /// Bandwidth in Mbit/s
    pub bandwidth: Bandwidth,
    /// How long the traffic is generated
    pub duration: Duration,
}

/// All steps of a single demand. The steps must be executed in order.
#[derive(Debug, Clone, PartialEq)]
pub struct DemandSchedule {
    /// Address of the source host
    pub source: Ipv4Addr,
    /// Address of the destination host
    pub destination: Ipv4Addr,
    /// Ordered steps
    pub steps: Vec<TrafficStep>,
}

impl DemandSchedule {
    /// Sum of the duration of all steps
    pub fn total_duration(&self) -> Duration {
        self.steps.iter().fold(Duration::default(), |acc, s| acc.saturating_add(s.duration))
    }
}

/// Schedule of all demands, grouped by their source host. Demands of the same source run
/// concurrently to each other.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Schedule {
    hosts: BTreeMap<Ipv4Addr, Vec<DemandSchedule>>,
}

impl Schedule {
    /// Demands originating at the given host
    pub fn host(&self, source: Ipv4Addr) -> Option<&[DemandSchedule]> {
        self.hosts.get(&source).map(|d| d.as_slice())
    }

    /// All source hosts, in order
    pub fn sources(&self) -> impl Iterator<Item = Ipv4Addr> + '_ {
        self.hosts.keys().copied()
    }

    /// All demands of all hosts
    pub fn demands(&self) -> impl Iterator<Item = &DemandSchedule> {
        self.hosts.values().flatten()
    }

    /// Number of demands
    pub fn len(&self) -> usize {
        self.hosts.values().map(|d| d.len()).sum()
    }

    /// Returns true if there is no demand
    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }

    /// Time until the last demand is done, when all demands start at the same time
    pub fn total_duration(&self) -> Duration {
        self.demands().map(|d| d.total_duration()).max().unwrap_or_default()
    }
}

/// Build the schedule for the demand matrix. Every bucket lasts one `aggregation_interval`,
/// except the last one of every demand, which lasts [`LAST_BUCKET_FACTOR`] intervals.
pub fn build_schedule(
    matrix: &DemandMatrix,
    aggregation_interval: Duration,
) -> Result<Schedule, Error> {
    if aggregation_interval == Duration::default() {
        return Err(Error::InvalidInterval);
    }
    matrix.validate()?;

    let mut hosts: BTreeMap<Ipv4Addr, Vec<DemandSchedule>> = BTreeMap::new();
    for (source, destination, bandwidths) in matrix.iter() {
        let last = bandwidths.len() - 1;
        let last_duration = u32::try_from(last)
            .ok()
            .and_then(|n| aggregation_interval.checked_mul(n))
            .zip(aggregation_interval.checked_mul(LAST_BUCKET_FACTOR))
            .filter(|(rest, last)| rest.checked_add(*last).is_some())
            .map(|(_, last)| last)
            .ok_or_else(|| {
                Error::InvalidDemand(
                    source,
                    destination,
                    "total duration of the demand overflows".to_string(),
                )
            })?;
        let steps = bandwidths
            .iter()
            .enumerate()
            .map(|(i, bw)| TrafficStep {
                destination,
                bandwidth: *bw,
                duration: if i == last { last_duration } else { aggregation_interval },
            })
            .collect();
        hosts.entry(source).or_default().push(DemandSchedule { source, destination, steps });
    }

    Ok(Schedule { hosts })
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    fn h(x: u8) -> Ipv4Addr {
        Ipv4Addr::new(192, 168, x, 1)
    }

    #[test]
    fn single_bucket() {
        let mut m = DemandMatrix::new();
        m.insert(h(1), h(2), vec![4.0]);
        let s = build_schedule(&m, Duration::from_secs(10)).unwrap();
        let d = &s.host(h(1)).unwrap()[0];
        assert_eq!(d.steps.len(), 1);
        assert_eq!(d.total_duration(), Duration::from_secs(30));
    }

    #[test]
    fn zero_interval() {
        let mut m = DemandMatrix::new();
        m.insert(h(1), h(2), vec![4.0]);
        assert!(matches!(build_schedule(&m, Duration::default()), Err(Error::InvalidInterval)));
    }

    #[test]
    fn empty_matrix() {
        let s = build_schedule(&DemandMatrix::new(), Duration::from_secs(1)).unwrap();
        assert!(s.is_empty());
        assert_eq!(s.total_duration(), Duration::default());
    }
}
