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

//! # Configuration Compiler
//!
//! Transforms a [`Topology`] into the configuration files of the tutorial:
//!
//! - `quagga<i>.conf`: bgpd configuration of router `r<i>`
//! - `quagga-sdn.conf`: bgpd configuration of the internal speaker
//! - `zebra.conf`: zebra configuration, shared by all routers
//! - `network-cfg.json`: network configuration uploaded to the controller
//! - `gui.json`: hints for the controller GUI
//!
//! The compiler is a pure function of the topology and the [`Settings`]. Compiling the same input
//! twice yields byte-identical files. Writing the files replaces the output directory.

mod gui;
mod netcfg;
mod quagga;

pub use gui::{GuiAnnotations, GuiDocument, GuiHost};
pub use netcfg::{
    AppsConfig, BgpApp, BgpSpeaker, FlowProviderApp, InterfaceConfig, NetworkConfig, PortConfig,
    RouterApp, FLOW_PROVIDER_APP, ROUTER_APP,
};
pub use quagga::{router_config, speaker_config, zebra_config};

use crate::addressing::AddressPlan;
use crate::settings::Settings;
use crate::topology::Topology;
use crate::Error;

use log::*;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// File name of the internal speaker configuration
pub const SPEAKER_CONFIG_FILE: &str = "quagga-sdn.conf";
/// File name of the zebra configuration
pub const ZEBRA_CONFIG_FILE: &str = "zebra.conf";
/// File name of the controller network configuration
pub const NETWORK_CONFIG_FILE: &str = "network-cfg.json";
/// File name of the GUI hints
pub const GUI_CONFIG_FILE: &str = "gui.json";

/// File name of the bgpd configuration of router `r<index>`
pub fn router_config_file(index: usize) -> String {
    format!("quagga{}.conf", index)
}

/// All artifacts generated for a topology.
#[derive(Debug, Clone, PartialEq)]
pub struct Artifacts {
    /// Address plan used to generate the artifacts
    pub plan: AddressPlan,
    /// bgpd configuration for every router, keyed by the node index
    pub router_configs: BTreeMap<usize, String>,
    /// bgpd configuration of the internal speaker
    pub speaker_config: String,
    /// zebra configuration
    pub zebra_config: String,
    /// Network configuration for the controller
    pub network_config: NetworkConfig,
    /// GUI hints
    pub gui: GuiDocument,
}

/// Compile the topology into the configuration artifacts.
pub fn compile(topology: &Topology, settings: &Settings) -> Result<Artifacts, Error> {
    let plan = AddressPlan::from_topology(topology, &settings.reserved)?;
    let nodes = plan.nodes();

    let router_configs =
        nodes.iter().map(|n| (n.index(), router_config(n, &settings.bgp))).collect();
    let speaker_config = speaker_config(nodes, settings);
    let zebra_config = zebra_config(&settings.bgp);
    let network_config = NetworkConfig::new(nodes, settings);
    let gui = GuiDocument::new(nodes, settings);

    Ok(Artifacts { plan, router_configs, speaker_config, zebra_config, network_config, gui })
}

impl Artifacts {
    /// Render all artifacts, keyed by their file name.
    pub fn files(&self) -> Result<BTreeMap<String, String>, Error> {
        let mut files: BTreeMap<String, String> = self
            .router_configs
            .iter()
            .map(|(i, conf)| (router_config_file(*i), conf.clone()))
            .collect();
        files.insert(SPEAKER_CONFIG_FILE.to_string(), self.speaker_config.clone());
        files.insert(ZEBRA_CONFIG_FILE.to_string(), self.zebra_config.clone());
        files.insert(NETWORK_CONFIG_FILE.to_string(), self.network_config.to_json()?);
        files.insert(GUI_CONFIG_FILE.to_string(), serde_json::to_string_pretty(&self.gui)?);
        Ok(files)
    }

    /// Write all artifacts into `dir`. Any existing content of `dir` is removed first.
    pub fn write_to(&self, dir: impl AsRef<Path>) -> Result<(), Error> {
        let dir = dir.as_ref();
        let files = self.files()?;
        if dir.exists() {
            debug!("Removing old configuration in {}", dir.display());
            fs::remove_dir_all(dir)?;
        }
        fs::create_dir_all(dir)?;
        for (name, content) in files.iter() {
            debug!("Generating {}", name);
            fs::write(dir.join(name), content)?;
        }
        info!("Generated {} configuration files in {}", files.len(), dir.display());
        Ok(())
    }
}
