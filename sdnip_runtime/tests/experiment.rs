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


mod common;

use common::*;
use onos::OnosClient;
use pretty_assertions::assert_eq;
use sdnip::compiler::{NETWORK_CONFIG_FILE, SPEAKER_CONFIG_FILE};
use sdnip::settings::Settings;
use sdnip::traffic::DemandMatrix;
use sdnip::Stopper;
use sdnip_runtime::bundle::ExperimentBundle;
use sdnip_runtime::{run_experiment, Error, Testbed};

use std::net::Ipv4Addr;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

/// 11 peers with one prefix each: 11 * 6 + 11 * 10
const ABILENE_INTENTS: usize = 176;

fn h(x: u8) -> Ipv4Addr {
    Ipv4Addr::new(192, 168, x, 1)
}

fn bundle() -> ExperimentBundle {
    let mut demand_matrix = DemandMatrix::new();
    demand_matrix.insert(h(1), h(2), vec![1.0, 2.0]);
    demand_matrix.insert(h(11), h(1), vec![3.0]);
    ExperimentBundle {
        demand_matrix,
        use_alternate_topology: false,
        aggregation_interval: 1,
        variant: 0,
    }
}

fn settings(controller_port: u16, trigger_port: u16) -> Settings {
    let mut settings = Settings::default();
    settings.controller.rest_host = "127.0.0.1".to_string();
    settings.controller.rest_port = controller_port;
    settings.sync.poll_interval_ms = 10;
    settings.sync.trigger_port = trigger_port;
    settings
}

fn testbed(port: u16) -> Testbed<FakeEmulator, FakeDaemons> {
    Testbed {
        emulator: FakeEmulator::default(),
        daemons: FakeDaemons::default(),
        executor: Arc::new(RecordingExecutor::new(Duration::from_millis(1))),
        controller: OnosClient::new("127.0.0.1", port, "onos", "rocks").unwrap(),
    }
}

#[test]
fn abilene_experiment() {
    let (port, requests) = fake_controller(|method, path| match (method, path) {
        ("GET", "/onos/v1/intents") => (200, intents_body(ABILENE_INTENTS)),
        ("POST", "/onos/v1/network/configuration") => (200, String::new()),
        _ => (404, String::new()),
    });
    let trigger_port = free_udp_port();
    let settings = settings(port, trigger_port);
    let dir = tempfile::tempdir().unwrap();
    let conf_dir = dir.path().join("configs");

    let executor = Arc::new(RecordingExecutor::new(Duration::from_millis(1)));
    let mut testbed = testbed(port);
    testbed.executor = executor.clone();

    let triggered = keep_triggering(trigger_port);
    let report =
        run_experiment(&mut testbed, &bundle(), &settings, &conf_dir, &Stopper::new()).unwrap();
    triggered.store(true, Ordering::SeqCst);

    assert_eq!(report.expected_intents, ABILENE_INTENTS);
    assert!(report.is_success());
    assert_eq!(report.demands.len(), 2);

    // configuration was written
    assert!(conf_dir.join(NETWORK_CONFIG_FILE).is_file());
    assert!(conf_dir.join(SPEAKER_CONFIG_FILE).is_file());
    assert!(conf_dir.join("quagga11.conf").is_file());

    // emulator and daemons were started and stopped again
    let plan = testbed.emulator.started.as_ref().unwrap();
    assert_eq!(plan.routers.len(), 11);
    assert!(testbed.emulator.stopped);
    assert!(testbed.daemons.running.is_empty());
    assert_eq!(testbed.daemons.stopped.len(), 2 * 12);
    assert_eq!(testbed.daemons.stopped.last().unwrap().router, "r1");
    assert!(executor.stopped());

    // traffic was generated on the right hosts
    assert_eq!(executor.foreground_on("h1").len(), 2);
    assert_eq!(
        executor.foreground_on("h11")[0].command.to_string(),
        "iperf3 -c 192.168.1.1 -b 3M -p 5011 -t 3 -V"
    );

    // network configuration was uploaded before polling the intents
    let recorded: Vec<Recorded> = requests.try_iter().collect();
    assert_eq!(recorded[0].method, "POST");
    assert_eq!(recorded[0].path, "/onos/v1/network/configuration");
    assert!(recorded[0].body.contains("bgpSpeakers"));
    assert!(recorded[1..].iter().all(|r| r.path == "/onos/v1/intents"));
}

#[test]
fn intent_timeout_tears_down() {
    let (port, _requests) = fake_controller(|method, _| match method {
        "GET" => (200, intents_body(3)),
        _ => (200, String::new()),
    });
    let mut settings = settings(port, free_udp_port());
    settings.sync.poll_timeout_s = Some(0);
    let dir = tempfile::tempdir().unwrap();

    let mut testbed = testbed(port);
    let result = run_experiment(&mut testbed, &bundle(), &settings, dir.path(), &Stopper::new());
    assert!(matches!(
        result,
        Err(Error::IntentTimeout { expected: ABILENE_INTENTS, last: Some(3) })
    ));
    assert!(testbed.emulator.stopped);
    assert!(testbed.daemons.running.is_empty());
}

#[test]
fn upload_failure_tears_down() {
    let (port, _requests) = fake_controller(|_, _| (500, "{\"message\": \"boom\"}".to_string()));
    let settings = settings(port, free_udp_port());
    let dir = tempfile::tempdir().unwrap();

    let mut testbed = testbed(port);
    let result = run_experiment(&mut testbed, &bundle(), &settings, dir.path(), &Stopper::new());
    assert!(matches!(result, Err(Error::OnosError(_))));
    assert!(testbed.emulator.stopped);
    assert_eq!(testbed.daemons.stopped.len(), 2 * 12);
}

#[test]
fn cancelled_while_waiting() {
    let (port, _requests) = fake_controller(|_, _| (200, intents_body(0)));
    let settings = settings(port, free_udp_port());
    let dir = tempfile::tempdir().unwrap();
    let stopper = Stopper::new();
    stopper.send_stop();

    let mut testbed = testbed(port);
    let result = run_experiment(&mut testbed, &bundle(), &settings, dir.path(), &stopper);
    assert!(matches!(result, Err(Error::Cancelled)));
    assert!(testbed.emulator.stopped);
}

#[test]
fn invalid_bundle_starts_nothing() {
    let mut b = bundle();
    b.demand_matrix.insert(h(2), h(2), vec![1.0]);
    let dir = tempfile::tempdir().unwrap();
    let mut testbed = testbed(1);
    let result = run_experiment(&mut testbed, &b, &settings(1, 1), dir.path(), &Stopper::new());
    assert!(matches!(result, Err(Error::SdnipError(sdnip::Error::InvalidDemand(_, _, _)))));
    assert!(testbed.emulator.started.is_none());
    assert!(testbed.daemons.stopped.is_empty());
}

#[test]
fn invalid_bundle_keeps_configuration() {
    let dir = tempfile::tempdir().unwrap();
    let notes = dir.path().join("notes.txt");
    std::fs::write(&notes, "keep me").unwrap();

    let mut b = bundle();
    b.demand_matrix.insert(h(2), h(2), vec![1.0]);
    let mut testbed = testbed(1);
    let result = run_experiment(&mut testbed, &b, &settings(1, 1), dir.path(), &Stopper::new());
    assert!(matches!(result, Err(Error::SdnipError(sdnip::Error::InvalidDemand(_, _, _)))));

    let mut b = bundle();
    b.aggregation_interval = u64::MAX / 2;
    let mut testbed = crate::testbed(1);
    let result = run_experiment(&mut testbed, &b, &settings(1, 1), dir.path(), &Stopper::new());
    assert!(matches!(result, Err(Error::SdnipError(sdnip::Error::InvalidDemand(_, _, _)))));
    assert!(testbed.emulator.started.is_none());

    assert_eq!(std::fs::read_to_string(&notes).unwrap(), "keep me");
    assert!(!dir.path().join(NETWORK_CONFIG_FILE).exists());
}

#[test]
fn cancelled_while_waiting_for_trigger() {
    let (port, _requests) = fake_controller(|method, path| match (method, path) {
        ("GET", "/onos/v1/intents") => (200, intents_body(ABILENE_INTENTS)),
        ("POST", "/onos/v1/network/configuration") => (200, String::new()),
        _ => (404, String::new()),
    });
    let settings = settings(port, free_udp_port());
    let dir = tempfile::tempdir().unwrap();
    let stopper = Stopper::new();
    let remote = stopper.clone();
    let timer = std::thread::spawn(move || {
        std::thread::sleep(Duration::from_millis(500));
        remote.send_stop();
    });

    let mut testbed = testbed(port);
    let result = run_experiment(&mut testbed, &bundle(), &settings, dir.path(), &stopper);
    timer.join().unwrap();
    assert!(matches!(result, Err(Error::Cancelled)));
    assert!(testbed.emulator.stopped);
    assert!(dir.path().join(NETWORK_CONFIG_FILE).exists());
}
