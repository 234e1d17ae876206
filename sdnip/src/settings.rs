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

//! # Settings
//!
//! All constants of a deployment are collected in a single [`Settings`] structure, which is passed
//! explicitly to the compiler and to the synchronizer. The defaults match the SDN-IP tutorial
//! setup. Settings can be read from a TOML file, where every missing key falls back to its
//! default:
//!
//! ```toml
//! [bgp]
//! password = "sdnip"
//!
//! [controller]
//! rest_host = "192.168.56.1"
//!
//! [[reserved]]
//! index = 2
//! substitute = "after_last"
//! ```

use crate::addressing::{ReservedIndex, DEFAULT_RESERVED_INDICES};
use crate::traffic::TrafficTool;
use crate::Error;

use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Explicit configuration of the whole tool chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Parameters of the BGP sessions and routing daemons
    pub bgp: BgpSettings,
    /// Parameters of the internal BGP speaker
    pub speaker: SpeakerSettings,
    /// Parameters of the SDN controller
    pub controller: ControllerSettings,
    /// Address indices which must not be used, together with their substitute
    pub reserved: Vec<ReservedIndex>,
    /// Parameters of the traffic playback
    pub sync: SyncSettings,
    /// Location of the quagga binaries and runtime files
    pub quagga: QuaggaSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bgp: BgpSettings::default(),
            speaker: SpeakerSettings::default(),
            controller: ControllerSettings::default(),
            reserved: DEFAULT_RESERVED_INDICES.to_vec(),
            sync: SyncSettings::default(),
            quagga: QuaggaSettings::default(),
        }
    }
}

impl Settings {
    /// Parse the settings from a TOML string.
    pub fn from_toml(s: &str) -> Result<Self, Error> {
        Ok(toml::from_str(s)?)
    }

    /// Read the settings from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, Error> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }
}

/// BGP session parameters, shared by every router and the internal speaker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BgpSettings {
    /// AS number of the internal speaker. Router `i` gets `base_as + i`.
    pub base_as: u32,
    /// Password written into every daemon configuration
    pub password: String,
    /// BGP keepalive timer in seconds
    pub keepalive: u32,
    /// BGP hold timer in seconds
    pub hold: u32,
    /// Connect retry timer in seconds
    pub connect_timer: u32,
    /// Minimum advertisement interval in seconds
    pub advertisement_interval: u32,
}

impl Default for BgpSettings {
    fn default() -> Self {
        Self {
            base_as: 65000,
            password: "sdnip".to_string(),
            keepalive: 3,
            hold: 9,
            connect_timer: 5,
            advertisement_interval: 5,
        }
    }
}

/// The internal BGP speaker collects all sessions and forwards them to the controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeakerSettings {
    /// Name of the speaker in the controller configuration
    pub name: String,
    /// Router ID of the speaker
    pub router_id: Ipv4Addr,
    /// MAC address of the speaker interface
    pub mac: String,
    /// Index of the switch to which the speaker is attached
    pub switch: usize,
    /// Switch port of the speaker
    pub port: u32,
}

impl Default for SpeakerSettings {
    fn default() -> Self {
        Self {
            name: "speaker1".to_string(),
            router_id: Ipv4Addr::new(10, 10, 10, 20),
            mac: "00:00:00:00:00:01".to_string(),
            switch: 3,
            port: 2,
        }
    }
}

/// Connection parameters of the SDN controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerSettings {
    /// Address of the BGP endpoint of the controller
    pub bgp_peer: Ipv4Addr,
    /// TCP port of the BGP endpoint of the controller
    pub bgp_port: u16,
    /// Host name of the REST API
    pub rest_host: String,
    /// Port of the REST API
    pub rest_port: u16,
    /// User name for HTTP basic authentication
    pub username: String,
    /// Password for HTTP basic authentication
    pub password: String,
    /// Interval in seconds at which the controller polls flow statistics
    pub flow_poll_frequency: u32,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            bgp_peer: Ipv4Addr::new(10, 10, 10, 1),
            bgp_port: 2000,
            rest_host: "localhost".to_string(),
            rest_port: 8181,
            username: "onos".to_string(),
            password: "rocks".to_string(),
            flow_poll_frequency: 5,
        }
    }
}

/// Parameters of the traffic playback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncSettings {
    /// Interval between two polls of the intent count, in milliseconds
    pub poll_interval_ms: u64,
    /// Give up waiting for the intents after this many seconds. Wait forever if not set.
    pub poll_timeout_s: Option<u64>,
    /// UDP port on which the trigger datagram is received
    pub trigger_port: u16,
    /// TCP port on which the experiment bundle is received
    pub bundle_port: u16,
    /// Tool used to generate the traffic
    pub traffic_tool: TrafficTool,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            poll_interval_ms: 1000,
            poll_timeout_s: None,
            trigger_port: 12345,
            bundle_port: 12346,
            traffic_tool: TrafficTool::Iperf3,
        }
    }
}

impl SyncSettings {
    /// Interval between two polls
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Maximum time to wait for the intents
    pub fn poll_timeout(&self) -> Option<Duration> {
        self.poll_timeout_s.map(Duration::from_secs)
    }
}

/// Location of the routing daemon binaries and their runtime files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuaggaSettings {
    /// Directory containing `zebra` and `bgpd`
    pub bin_dir: PathBuf,
    /// Directory for the API sockets and pid files. Must be owned by the quagga user.
    pub run_dir: PathBuf,
}

impl Default for QuaggaSettings {
    fn default() -> Self {
        Self { bin_dir: PathBuf::from("/usr/lib/quagga"), run_dir: PathBuf::from("/var/run/quagga") }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::addressing::Substitute;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_file_gives_defaults() {
        assert_eq!(Settings::from_toml("").unwrap(), Settings::default());
    }

    #[test]
    fn partial_override() {
        let s = Settings::from_toml(
            r#"
            [bgp]
            password = "secret"

            [controller]
            rest_port = 8080

            [sync]
            poll_timeout_s = 600
            traffic_tool = "ditg"

            [[reserved]]
            index = 2
            substitute = { fixed = 9 }
            "#,
        )
        .unwrap();
        assert_eq!(s.bgp.password, "secret");
        assert_eq!(s.bgp.base_as, 65000);
        assert_eq!(s.controller.rest_port, 8080);
        assert_eq!(s.controller.username, "onos");
        assert_eq!(s.sync.poll_timeout(), Some(Duration::from_secs(600)));
        assert_eq!(s.sync.traffic_tool, TrafficTool::Ditg);
        assert_eq!(s.reserved, vec![ReservedIndex { index: 2, substitute: Substitute::Fixed(9) }]);
    }

    #[test]
    fn malformed_settings() {
        assert!(matches!(Settings::from_toml("[bgp]\nhold = \"x\""), Err(Error::SettingsError(_))));
    }
}
