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

//! # ONOS REST API
//!
//! This is a very simple crate to interact with the REST API of the ONOS controller: reading the
//! installed intents, uploading the network configuration, and using the traffic engineering
//! extension of the SDN-IP application.
//!
//! ```no_run
//! use onos::OnosClient;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = OnosClient::new("localhost", 8181, "onos", "rocks")?;
//!
//!     // count the installed intents
//!     let count = client.intent_count()?;
//!     println!("{} intents installed", count);
//!
//!     // read the traffic matrix measured by the controller
//!     for sample in client.traffic_matrix()? {
//!         println!("{}: {} bytes", sample.demand, sample.bytes);
//!     }
//!     Ok(())
//! }
//! ```
#![deny(missing_docs)]

mod client;
mod types;
pub use client::OnosClient;
pub use types::*;

use thiserror::Error;

/// # ONOS Error type
#[derive(Debug, Error)]
pub enum Error {
    /// Error during handling of the HTTP request
    #[error("HTTP Error: {0}")]
    HttpError(#[from] isahc::Error),
    /// Cannot build the HTTP request
    #[error("Invalid HTTP request: {0}")]
    RequestError(#[from] isahc::http::Error),
    /// Cannot deserialize the response
    #[error("Cannot parse JSON response: {0}")]
    JsonError(#[from] serde_json::error::Error),
    /// IO Error
    #[error("IO Error: {0}")]
    IoError(#[from] std::io::Error),
    /// HTTP Response Error
    #[error("HTTP Response Error: {0}. Message:\n{1}")]
    ResponseError(u16, String),
    /// The SDN-IP application rejected a routing configuration
    #[error("Routing configuration rejected: {0}")]
    RoutingRejected(String),
}

/// ONOS Result type
type Result<T> = core::result::Result<T, Error>;
