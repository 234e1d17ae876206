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


use pretty_assertions::assert_eq;
use sdnip::traffic::DemandMatrix;
use sdnip_runtime::bundle::{send_bundle, BundleListener, ExperimentBundle};
use sdnip_runtime::trigger::{send_trigger, TriggerListener};
use sdnip_runtime::Error;

use std::io::Write;
use std::net::{Ipv4Addr, TcpStream};
use std::thread;

fn h(x: u8) -> Ipv4Addr {
    Ipv4Addr::new(192, 168, x, 1)
}

fn example_bundle() -> ExperimentBundle {
    let mut demand_matrix = DemandMatrix::new();
    demand_matrix.insert(h(1), h(2), vec![10.0, 20.0, 5.5]);
    demand_matrix.insert(h(3), h(1), vec![1.0]);
    ExperimentBundle {
        demand_matrix,
        use_alternate_topology: true,
        aggregation_interval: 5,
        variant: 2,
    }
}

#[test]
fn trigger_from_other_thread() {
    let listener = TriggerListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let waiter = thread::spawn(move || listener.wait());
    send_trigger(addr).unwrap();
    let sender = waiter.join().unwrap().unwrap();
    assert_eq!(sender.ip(), Ipv4Addr::LOCALHOST);
}

#[test]
fn bundle_transfer() {
    let listener = BundleListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let receiver = thread::spawn(move || listener.receive());
    send_bundle(addr, &example_bundle()).unwrap();
    let received = receiver.join().unwrap().unwrap();
    assert_eq!(received, example_bundle());
    assert_eq!(received.matrix().get(h(3), h(1)), Some(&[1.0, 1.0][..]));
}

#[test]
fn bundle_in_chunks() {
    let listener = BundleListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let receiver = thread::spawn(move || listener.receive());
    let data = example_bundle().to_json().unwrap();
    let (first, second) = data.split_at(data.len() / 2);
    let mut stream = TcpStream::connect(addr).unwrap();
    stream.write_all(first.as_bytes()).unwrap();
    stream.flush().unwrap();
    thread::sleep(std::time::Duration::from_millis(20));
    stream.write_all(second.as_bytes()).unwrap();
    drop(stream);
    assert_eq!(receiver.join().unwrap().unwrap(), example_bundle());
}

#[test]
fn malformed_bundle() {
    let listener = BundleListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let receiver = thread::spawn(move || listener.receive());
    let mut stream = TcpStream::connect(addr).unwrap();
    stream.write_all(b"{\"demandMatrix\": 42}").unwrap();
    drop(stream);
    assert!(matches!(receiver.join().unwrap(), Err(Error::BundleError(_))));
}

#[test]
fn bundle_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bundle.json");
    std::fs::write(&path, example_bundle().to_json().unwrap()).unwrap();
    assert_eq!(ExperimentBundle::from_file(&path).unwrap(), example_bundle());
    assert!(matches!(
        ExperimentBundle::from_file(dir.path().join("missing.json")),
        Err(Error::IoError(_))
    ));
}
