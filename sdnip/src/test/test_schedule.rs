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

use crate::traffic::*;

use pretty_assertions::assert_eq;
use std::net::Ipv4Addr;
use std::time::Duration;

fn h(x: u8) -> Ipv4Addr {
    Ipv4Addr::new(192, 168, x, 1)
}

#[test]
fn schedule_duration() {
    let mut m = DemandMatrix::new();
    m.insert(h(1), h(2), vec![5.0, 5.0, 5.0]);
    let s = build_schedule(&m, Duration::from_secs(10)).unwrap();
    let d = &s.host(h(1)).unwrap()[0];
    assert_eq!(
        d.steps.iter().map(|s| s.duration.as_secs()).collect::<Vec<_>>(),
        vec![10, 10, 30]
    );
    assert_eq!(d.total_duration(), Duration::from_secs(50));
}

#[test]
fn huge_interval_is_rejected() {
    let mut m = DemandMatrix::new();
    m.insert(h(1), h(2), vec![5.0, 5.0]);
    assert!(matches!(
        build_schedule(&m, Duration::from_secs(u64::MAX / 2)),
        Err(crate::Error::InvalidDemand(_, _, _))
    ));

    // the last bucket alone fits, but not together with the others
    let mut m = DemandMatrix::new();
    m.insert(h(1), h(2), vec![1.0; 4]);
    assert!(matches!(
        build_schedule(&m, Duration::from_secs(u64::MAX / 5)),
        Err(crate::Error::InvalidDemand(_, _, _))
    ));

    let mut m = DemandMatrix::new();
    m.insert(h(1), h(2), vec![1.0]);
    let s = build_schedule(&m, Duration::from_secs(u64::MAX / 4)).unwrap();
    assert_eq!(s.total_duration(), Duration::from_secs(u64::MAX / 4 * 3));
}

#[test]
fn duration_formula() {
    let interval = Duration::from_secs(7);
    for n in 1..20u32 {
        let mut m = DemandMatrix::new();
        m.insert(h(3), h(4), vec![1.0; n as usize]);
        let s = build_schedule(&m, interval).unwrap();
        assert_eq!(s.total_duration(), interval * (n - 1) + interval * 3);
    }
}

#[test]
fn order_is_preserved() {
    let mut m = DemandMatrix::new();
    m.insert(h(1), h(2), vec![13.0, 26.0, 31.0, 24.0]);
    let s = build_schedule(&m, Duration::from_secs(10)).unwrap();
    let d = &s.host(h(1)).unwrap()[0];
    assert_eq!(d.steps.iter().map(|s| s.bandwidth).collect::<Vec<_>>(), vec![13.0, 26.0, 31.0, 24.0]);
    assert!(d.steps.iter().all(|s| s.destination == h(2)));
}

#[test]
fn demands_grouped_by_source() {
    let mut m = DemandMatrix::new();
    m.insert(h(8), h(5), vec![5.0, 4.0]);
    m.insert(h(8), h(9), vec![2.0]);
    m.insert(h(9), h(6), vec![2.0, 2.0, 2.0]);
    let s = build_schedule(&m, Duration::from_secs(10)).unwrap();
    assert_eq!(s.len(), 3);
    assert_eq!(s.sources().collect::<Vec<_>>(), vec![h(8), h(9)]);
    let from_8 = s.host(h(8)).unwrap();
    assert_eq!(from_8.len(), 2);
    assert_eq!(from_8[0].destination, h(5));
    assert_eq!(from_8[1].destination, h(9));
    assert_eq!(s.total_duration(), Duration::from_secs(50));
}

#[test]
fn doubled_schedule() {
    let mut m = DemandMatrix::new();
    m.insert(h(1), h(2), vec![1.0, 2.0]);
    let d = m.doubled();
    assert_eq!(d.get(h(1), h(2)).unwrap(), &[1.0, 2.0, 1.0, 2.0]);
    let s = build_schedule(&d, Duration::from_secs(10)).unwrap();
    let steps = &s.host(h(1)).unwrap()[0].steps;
    assert_eq!(steps.iter().map(|s| s.bandwidth).collect::<Vec<_>>(), vec![1.0, 2.0, 1.0, 2.0]);
    assert_eq!(s.total_duration(), Duration::from_secs(60));
}
