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


//! Experiment bundle, sent once by the remote controller process before the network is built.
//!
//! The bundle is a JSON document, written to a single TCP connection. The receiver reads until the
//! sender closes the connection.

use crate::Error;

use sdnip::traffic::{build_schedule, DemandMatrix, Schedule};

use log::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{Read, Write};
use std::net::{Shutdown, SocketAddr, TcpListener, TcpStream, ToSocketAddrs};
use std::path::Path;
use std::time::Duration;

/// Variants whose traffic matrix is played twice in a row
pub const DOUBLED_VARIANTS: &[u32] = &[1, 2];

/// Everything needed to run an experiment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExperimentBundle {
    /// Traffic matrix to play back
    pub demand_matrix: DemandMatrix,
    /// Use the SDN-IP tutorial topology instead of Abilene
    #[serde(default)]
    pub use_alternate_topology: bool,
    /// Length of a single bucket of the traffic matrix, in seconds
    pub aggregation_interval: u64,
    /// Experiment variant
    #[serde(default)]
    pub variant: u32,
}

impl ExperimentBundle {
    /// Traffic matrix after applying the variant
    pub fn matrix(&self) -> DemandMatrix {
        if DOUBLED_VARIANTS.contains(&self.variant) {
            self.demand_matrix.doubled()
        } else {
            self.demand_matrix.clone()
        }
    }

    /// Length of a single bucket
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.aggregation_interval)
    }

    /// Build the traffic schedule of the bundle
    pub fn schedule(&self) -> Result<Schedule, Error> {
        Ok(build_schedule(&self.matrix(), self.interval())?)
    }

    /// Parse a bundle
    pub fn from_json(s: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(s)?)
    }

    /// Serialize the bundle
    pub fn to_json(&self) -> Result<String, Error> {
        Ok(serde_json::to_string(self)?)
    }

    /// Read a bundle from a file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, Error> {
        Self::from_json(&fs::read_to_string(path)?)
    }
}

/// Socket waiting for a single experiment bundle
#[derive(Debug)]
pub struct BundleListener {
    listener: TcpListener,
}

impl BundleListener {
    /// Bind the socket
    pub fn bind(addr: impl ToSocketAddrs) -> Result<Self, Error> {
        Ok(Self { listener: TcpListener::bind(addr)? })
    }

    /// Address the socket is bound to
    pub fn local_addr(&self) -> Result<SocketAddr, Error> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept a single connection and read the bundle from it.
    pub fn receive(self) -> Result<ExperimentBundle, Error> {
        info!("Waiting for the experiment bundle on port {}", self.local_addr()?.port());
        let (mut stream, peer) = self.listener.accept()?;
        let mut data = String::new();
        stream.read_to_string(&mut data)?;
        debug!("Received {} bytes from {}", data.len(), peer);
        let bundle = ExperimentBundle::from_json(&data)?;
        info!(
            "Received the experiment bundle: {} demands, interval {}s, variant {}",
            bundle.demand_matrix.len(),
            bundle.aggregation_interval,
            bundle.variant
        );
        Ok(bundle)
    }
}

/// Block until a bundle is received on `addr`.
pub fn receive_bundle(addr: impl ToSocketAddrs) -> Result<ExperimentBundle, Error> {
    BundleListener::bind(addr)?.receive()
}

/// Send the bundle to `addr`, and close the connection.
pub fn send_bundle(addr: impl ToSocketAddrs, bundle: &ExperimentBundle) -> Result<(), Error> {
    let data = bundle.to_json()?;
    let mut stream = TcpStream::connect(addr)?;
    stream.write_all(data.as_bytes())?;
    stream.flush()?;
    stream.shutdown(Shutdown::Write)?;
    debug!("Sent the experiment bundle ({} bytes)", data.len());
    Ok(())
}
