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

#![deny(missing_docs)]

//! # SDN-IP Lab
//!
//! This library contains the deterministic core of the SDN-IP tutorials: it compiles a backbone
//! topology into the configuration of the routing daemons and of the SDN controller, and it turns
//! a traffic matrix into a schedule of traffic generator invocations.
//!
//! ## Structure
//!
//! - **[`Topology`](topology::Topology)**: Sorted node set with a directional capacity mapping.
//!   See [`example_topologies`] for the Abilene backbone.
//!
//! - **[`AddressPlan`](addressing::AddressPlan)**: Maps node indices to address indices, using an
//!   explicit set of [reserved indices](addressing::ReservedIndex), and derives all addresses
//!   from them.
//!
//! - **[`compile`](compiler::compile)**: Generates the bgpd configuration of every router and of
//!   the internal speaker, the zebra configuration, the network configuration of the controller,
//!   and the GUI hints.
//!
//! - **[`EmulationPlan`](emulation::EmulationPlan)**: Description of the emulated network, and
//!   the routing daemons to run in it.
//!
//! - **[`IntentExpectation`](intents::IntentExpectation)**: Number of intents the controller
//!   installs once all BGP announcements are received.
//!
//! - **[`DemandMatrix`](traffic::DemandMatrix)**: Traffic matrix, which is turned into a
//!   [`Schedule`](traffic::Schedule) of traffic steps.
//!
//! - **[`Settings`](settings::Settings)**: All constants of a deployment.
//!
//! ## Usage
//!
//! ```
//! use sdnip::compiler::compile;
//! use sdnip::example_topologies::abilene;
//! use sdnip::intents::IntentExpectation;
//! use sdnip::settings::Settings;
//! use sdnip::Error;
//!
//! fn main() -> Result<(), Error> {
//!     let settings = Settings::default();
//!     let artifacts = compile(&abilene(), &settings)?;
//!     # let dir = std::env::temp_dir().join("sdnip-doc-configs");
//!     artifacts.write_to(&dir)?;
//!
//!     let expected = IntentExpectation::from_config_dir(&dir)?.count();
//!     println!("Waiting for {} intents", expected);
//!     # std::fs::remove_dir_all(&dir)?;
//!     Ok(())
//! }
//! ```

pub mod addressing;
pub mod command;
pub mod compiler;
pub mod emulation;
mod error;
pub mod example_topologies;
pub mod intents;
pub mod settings;
pub mod topology;
pub mod traffic;

// test modules
mod test;

pub use error::Error;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Stopper, to check when to stop, or to send the stop command
#[derive(Clone, Debug, Default)]
pub struct Stopper {
    b: Arc<AtomicBool>,
}

impl Stopper {
    /// Create a new stopper
    pub fn new() -> Self {
        Self::default()
    }

    /// Send the stop command to every clone of this stopper.
    pub fn send_stop(&self) {
        self.b.store(true, Ordering::SeqCst);
    }

    /// Checks if the stop flag is set.
    pub fn is_stop(&self) -> bool {
        self.b.load(Ordering::SeqCst)
    }
}
