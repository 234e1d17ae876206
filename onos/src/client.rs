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

//! # ONOS Client

use crate::types::*;
use crate::{Error, Result};

use isahc::auth::{Authentication, Credentials};
use isahc::http::{Request, Response};
use isahc::prelude::*;
use isahc::{Body, HttpClient};
use log::*;
use serde::Serialize;
use std::time::Duration;

/// Timeout of a single request, if not configured otherwise
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// # ONOS Client Handle
///
/// Every request is authenticated with HTTP basic authentication. Creating the client does not
/// contact the controller, which might not be running yet.
#[derive(Debug, Clone)]
pub struct OnosClient {
    address: String,
    client: HttpClient,
}

impl OnosClient {
    /// Create a new client for the controller at `host:port`.
    pub fn new(
        host: impl AsRef<str>,
        port: u16,
        username: impl AsRef<str>,
        password: impl AsRef<str>,
    ) -> Result<Self> {
        Self::with_timeout(host, port, username, password, DEFAULT_REQUEST_TIMEOUT)
    }

    /// Create a new client, where every request fails after `timeout`.
    pub fn with_timeout(
        host: impl AsRef<str>,
        port: u16,
        username: impl AsRef<str>,
        password: impl AsRef<str>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = HttpClient::builder()
            .authentication(Authentication::basic())
            .credentials(Credentials::new(username.as_ref(), password.as_ref()))
            .timeout(timeout)
            .proxy(None::<isahc::http::Uri>)
            .build()?;
        Ok(Self { address: format!("http://{}:{}/onos/v1", host.as_ref(), port), client })
    }

    /// Base address of the REST API
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Returns all intents currently known to the controller
    pub fn intents(&self) -> Result<Vec<Intent>> {
        let r: IntentsResponse = serde_json::from_str(&self.request_get("intents")?)?;
        Ok(r.intents)
    }

    /// Returns the number of intents currently known to the controller
    pub fn intent_count(&self) -> Result<usize> {
        Ok(self.intents()?.len())
    }

    /// Upload a network configuration (the content of `network-cfg.json`)
    pub fn upload_network_config<T: Serialize>(&self, config: &T) -> Result<()> {
        self.request_post("network/configuration", serde_json::to_string(config)?)?;
        Ok(())
    }

    /// Returns the traffic matrix measured by the SDN-IP application
    pub fn traffic_matrix(&self) -> Result<Vec<TrafficSample>> {
        let r: SdnIpResponse<Vec<TrafficSample>> =
            serde_json::from_str(&self.request_get("sdnip/get_tm")?)?;
        Ok(r.response)
    }

    /// Returns the prefixes announced at every switch port
    pub fn announced_prefixes(&self) -> Result<Vec<AnnouncedPrefixes>> {
        let r: SdnIpResponse<Vec<AnnouncedPrefixes>> =
            serde_json::from_str(&self.request_get("sdnip/get_announced_prefix_from_cp")?)?;
        Ok(r.response)
    }

    /// Store routing configurations in the SDN-IP application, without applying them.
    pub fn add_routing(&self, configs: &[RoutingConfiguration]) -> Result<()> {
        let body = serde_json::to_string(&AddRoutingRequest { routing_list: configs })?;
        let r: SdnIpResponse<String> =
            serde_json::from_str(&self.request_post("sdnip/add_routing", body)?)?;
        if r.response == "OK" {
            Ok(())
        } else {
            Err(Error::RoutingRejected(r.response))
        }
    }

    /// Apply a previously added routing configuration. Returns the outcome reported by the
    /// application.
    pub fn apply_routing(&self, id: u32) -> Result<String> {
        let body = serde_json::to_string(&ApplyRoutingRequest { id })?;
        let r: SdnIpResponse<String> =
            serde_json::from_str(&self.request_post("sdnip/apply_routing", body)?)?;
        Ok(r.response)
    }

    fn request_get(&self, key: impl AsRef<str>) -> Result<String> {
        let addr = format!("{}/{}", self.address, key.as_ref());
        trace!("GET  {}", addr);
        self.handle_response(self.client.get(addr.as_str())?)
    }

    fn request_post(&self, key: impl AsRef<str>, data: String) -> Result<String> {
        let addr = format!("{}/{}", self.address, key.as_ref());
        trace!("POST {} {}", addr, data);
        let request = Request::post(addr.as_str())
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
            .body(data)?;
        self.handle_response(self.client.send(request)?)
    }

    fn handle_response(&self, mut response: Response<Body>) -> Result<String> {
        let status = response.status();
        if !status.is_success() {
            return Err(Error::ResponseError(status.as_u16(), response.text()?));
        }
        Ok(response.text()?)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn address() {
        let client = OnosClient::new("10.10.10.1", 8181, "onos", "rocks").unwrap();
        assert_eq!(client.address(), "http://10.10.10.1:8181/onos/v1");
    }

    #[test]
    fn live_intents() {
        let client = OnosClient::new("localhost", 8181, "onos", "rocks").unwrap();
        let intents = match client.intents() {
            Ok(i) => i,
            Err(_) => return, // skip the test
        };
        assert_eq!(intents.len(), client.intent_count().unwrap());
    }
}
