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


#![allow(dead_code)]

use sdnip::command::HostCommand;
use sdnip::emulation::{DaemonSpec, EmulationPlan};
use sdnip_runtime::emulator::{DaemonLauncher, Emulator, HostExecutor};
use sdnip_runtime::Error;

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{channel, Receiver};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

/// `onos:rocks`, base64 encoded
const AUTH: &str = "Basic b25vczpyb2Nrcw==";

#[derive(Debug, Clone)]
pub struct Executed {
    pub host: String,
    pub command: HostCommand,
    pub background: bool,
    pub start: Instant,
    pub end: Instant,
}

impl Executed {
    pub fn overlaps(&self, other: &Executed) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// Executor which only records the commands. Every foreground command takes `delay`.
#[derive(Debug, Default)]
pub struct RecordingExecutor {
    pub delay: Duration,
    pub failing_program: Option<String>,
    log: Mutex<Vec<Executed>>,
    stopped: AtomicBool,
}

impl RecordingExecutor {
    pub fn new(delay: Duration) -> Self {
        Self { delay, ..Default::default() }
    }

    pub fn failing(delay: Duration, program: &str) -> Self {
        Self { delay, failing_program: Some(program.to_string()), ..Default::default() }
    }

    pub fn log(&self) -> Vec<Executed> {
        self.log.lock().unwrap().clone()
    }

    pub fn foreground_on(&self, host: &str) -> Vec<Executed> {
        self.log().into_iter().filter(|e| !e.background && e.host == host).collect()
    }

    pub fn stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }
}

impl HostExecutor for RecordingExecutor {
    fn run(&self, host: &str, command: &HostCommand) -> Result<(), Error> {
        let start = Instant::now();
        thread::sleep(self.delay);
        let end = Instant::now();
        self.log.lock().unwrap().push(Executed {
            host: host.to_string(),
            command: command.clone(),
            background: false,
            start,
            end,
        });
        if self.failing_program.as_deref() == Some(command.program.as_str()) {
            return Err(Error::CommandFailed(command.to_string(), "exit status: 1".to_string()));
        }
        Ok(())
    }

    fn spawn(&self, host: &str, command: &HostCommand) -> Result<(), Error> {
        let now = Instant::now();
        self.log.lock().unwrap().push(Executed {
            host: host.to_string(),
            command: command.clone(),
            background: true,
            start: now,
            end: now,
        });
        Ok(())
    }

    fn stop_all(&self) -> Result<(), Error> {
        self.stopped.store(true, Ordering::SeqCst);
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct FakeEmulator {
    pub started: Option<EmulationPlan>,
    pub stopped: bool,
}

impl Emulator for FakeEmulator {
    fn start(&mut self, plan: &EmulationPlan) -> Result<(), Error> {
        self.started = Some(plan.clone());
        Ok(())
    }

    fn stop(&mut self) -> Result<(), Error> {
        self.stopped = true;
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct FakeDaemons {
    pub running: Vec<DaemonSpec>,
    pub stopped: Vec<DaemonSpec>,
}

impl DaemonLauncher for FakeDaemons {
    fn start(&mut self, daemon: &DaemonSpec) -> Result<(), Error> {
        self.running.push(daemon.clone());
        Ok(())
    }

    fn stop(&mut self, daemon: &DaemonSpec) -> Result<(), Error> {
        self.running.retain(|d| d != daemon);
        self.stopped.push(daemon.clone());
        Ok(())
    }
}

#[derive(Debug)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub body: String,
}

/// JSON body of `GET /intents` with `n` intents
pub fn intents_body(n: usize) -> String {
    let intents: Vec<String> = (0..n)
        .map(|i| {
            format!(
                r#"{{"type": "MultiPointToSinglePointIntent", "id": "0x{:x}", "appId": "org.onosproject.sdnip", "state": "INSTALLED"}}"#,
                i
            )
        })
        .collect();
    format!(r#"{{"intents": [{}]}}"#, intents.join(", "))
}

/// Minimal HTTP server answering every authenticated request with `handler(method, path)`.
/// Every authenticated request is sent to the returned channel.
pub fn fake_controller<F>(handler: F) -> (u16, Receiver<Recorded>)
where
    F: Fn(&str, &str) -> (u16, String) + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    let (tx, rx) = channel();
    thread::spawn(move || {
        for stream in listener.incoming() {
            let mut stream = match stream {
                Ok(s) => s,
                Err(_) => break,
            };
            let (head, body) = read_request(&mut stream);
            let mut lines = head.lines();
            let mut request_line = lines.next().unwrap_or_default().split_whitespace();
            let method = request_line.next().unwrap_or_default().to_string();
            let path = request_line.next().unwrap_or_default().to_string();
            let authorized = lines.any(|l| {
                let l = l.to_lowercase();
                l.starts_with("authorization:") && l.contains(&AUTH.to_lowercase())
            });
            if !authorized {
                respond(&mut stream, 401, "", "WWW-Authenticate: Basic realm=\"onos\"\r\n");
                continue;
            }
            let (status, response) = handler(&method, &path);
            respond(&mut stream, status, &response, "");
            // the receiver may be gone, but the server keeps answering
            let _ = tx.send(Recorded { method, path, body });
        }
    });
    (port, rx)
}

fn read_request(stream: &mut TcpStream) -> (String, String) {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    let header_end = loop {
        let n = stream.read(&mut chunk).unwrap_or(0);
        if n == 0 {
            break buf.len();
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };
    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let content_length: usize = head
        .lines()
        .filter_map(|l| {
            let l = l.to_lowercase();
            l.strip_prefix("content-length:").map(|v| v.trim().parse().unwrap_or(0))
        })
        .next()
        .unwrap_or(0);
    while buf.len() < header_end + content_length {
        let n = stream.read(&mut chunk).unwrap_or(0);
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }
    let body = String::from_utf8_lossy(&buf[header_end..]).to_string();
    (head, body)
}

fn respond(stream: &mut TcpStream, status: u16, body: &str, extra_headers: &str) {
    let response = format!(
        "HTTP/1.1 {} X\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n{}\r\n{}",
        status,
        body.len(),
        extra_headers,
        body
    );
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.flush();
}

/// Keep sending triggers to `port` on localhost until the returned flag is set.
pub fn keep_triggering(port: u16) -> Arc<AtomicBool> {
    let done = Arc::new(AtomicBool::new(false));
    let flag = done.clone();
    thread::spawn(move || {
        for _ in 0..600 {
            if flag.load(Ordering::SeqCst) {
                break;
            }
            let _ = sdnip_runtime::trigger::send_trigger(("127.0.0.1", port));
            thread::sleep(Duration::from_millis(50));
        }
    });
    done
}

/// A UDP port which is currently free on localhost
pub fn free_udp_port() -> u16 {
    std::net::UdpSocket::bind("127.0.0.1:0").unwrap().local_addr().unwrap().port()
}
