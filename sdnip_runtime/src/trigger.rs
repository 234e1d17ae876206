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


//! One-shot UDP trigger, used to start the traffic on all hosts at the same time.

use crate::Error;

use sdnip::Stopper;

use log::*;
use std::io::ErrorKind;
use std::net::{Ipv4Addr, SocketAddr, ToSocketAddrs, UdpSocket};
use std::time::Duration;

/// Payload of the datagram sent by [`send_trigger`]. The receiver accepts any payload.
pub const TRIGGER_PAYLOAD: &[u8] = b"start";

/// Granularity with which the stopper is checked while waiting for the trigger
const STOP_CHECK_INTERVAL_MS: u64 = 100;

/// Socket waiting for a single trigger datagram
#[derive(Debug)]
pub struct TriggerListener {
    socket: UdpSocket,
}

impl TriggerListener {
    /// Bind the socket. Datagrams arriving after this call are not lost, even if
    /// [`TriggerListener::wait`] is called later.
    pub fn bind(addr: impl ToSocketAddrs) -> Result<Self, Error> {
        Ok(Self { socket: UdpSocket::bind(addr)? })
    }

    /// Address the socket is bound to
    pub fn local_addr(&self) -> Result<SocketAddr, Error> {
        Ok(self.socket.local_addr()?)
    }

    /// Block until one datagram is received, and return its sender.
    pub fn wait(self) -> Result<SocketAddr, Error> {
        info!("Ready! Send the magic UDP packet on port {}", self.local_addr()?.port());
        let mut buf = [0u8; 1500];
        let (len, sender) = self.socket.recv_from(&mut buf)?;
        info!("Received the trigger from {} ({} bytes)", sender, len);
        Ok(sender)
    }

    /// Block until one datagram is received, or until the stopper is triggered. Returns `None`
    /// if the wait was cancelled.
    pub fn wait_unless_stopped(self, stopper: &Stopper) -> Result<Option<SocketAddr>, Error> {
        info!("Ready! Send the magic UDP packet on port {}", self.local_addr()?.port());
        self.socket.set_read_timeout(Some(Duration::from_millis(STOP_CHECK_INTERVAL_MS)))?;
        let mut buf = [0u8; 1500];
        loop {
            if stopper.is_stop() {
                info!("Stopped waiting for the trigger");
                return Ok(None);
            }
            match self.socket.recv_from(&mut buf) {
                Ok((len, sender)) => {
                    info!("Received the trigger from {} ({} bytes)", sender, len);
                    return Ok(Some(sender));
                }
                Err(e) if e.kind() == ErrorKind::WouldBlock || e.kind() == ErrorKind::TimedOut => {}
                Err(e) => return Err(e.into()),
            }
        }
    }
}

/// Block until a single datagram arrives at `addr`.
pub fn await_trigger(addr: impl ToSocketAddrs) -> Result<SocketAddr, Error> {
    TriggerListener::bind(addr)?.wait()
}

/// Send the trigger datagram to `addr`.
pub fn send_trigger(addr: impl ToSocketAddrs) -> Result<(), Error> {
    let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0))?;
    let sent = socket.send_to(TRIGGER_PAYLOAD, addr)?;
    debug!("Sent the trigger ({} bytes)", sent);
    Ok(())
}
