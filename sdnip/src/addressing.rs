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

//! # Address Plan
//!
//! Every node of the topology is identified by its 1-based index `i` in the sorted node list. The
//! index is mapped to an *address index* `a = addr(i)`, which is used for all addresses on the
//! peering network. Usually, `addr(i) = i`. Indices which collide with some reserved interface of
//! the deployment are declared as [`ReservedIndex`] and replaced by their [`Substitute`].
//!
//! ## IP Convention
//!
//! - **Router** `r<i>`
//!   - Router ID and peering interface: `10.0.a.1/24`
//!   - MAC address of the peering interface: `0a:00:00:00:<a>:01`
//!   - AS number: `base_as + i`
//!   - Interface towards the host: `192.168.i.254/24`
//!   - Advertised network: `192.168.i.0/24`
//! - **Host** `h<i>`: `192.168.i.1/24`, with gateway `192.168.i.254`
//! - **Internal BGP speaker**: one interface address `10.0.a.101/24` for every router
//! - **Switch** `s<i>`: datapath ID `0xa0 + i`

use crate::topology::Topology;
use crate::Error;

use ipnet::Ipv4Net;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::net::Ipv4Addr;

/// Offset added to the node index to get the datapath ID of its switch
pub const DPID_BASE: u64 = 0xa0;

/// Address index 2 would collide with the host-only interface of the VM running the tutorial
/// (`10.0.2.0/24`). It is moved past the last node.
pub const DEFAULT_RESERVED_INDICES: &[ReservedIndex] =
    &[ReservedIndex { index: 2, substitute: Substitute::AfterLast }];

/// Replacement for a reserved address index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Substitute {
    /// Use the first index after the last node, `N + 1`
    AfterLast,
    /// Use a fixed index
    Fixed(usize),
}

impl Substitute {
    /// Resolve the substitute for a topology with `num_nodes` nodes.
    pub fn resolve(&self, num_nodes: usize) -> usize {
        match self {
            Self::AfterLast => num_nodes + 1,
            Self::Fixed(x) => *x,
        }
    }
}

/// Node index that must not be used as address index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReservedIndex {
    /// 1-based node index which is reserved
    pub index: usize,
    /// Address index used instead
    pub substitute: Substitute,
}

/// Mapping from node index to address index, for all nodes of a topology.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressPlan {
    nodes: Vec<NodeAddresses>,
}

impl AddressPlan {
    /// Create the address plan for the given (already sorted) node names. The node at position
    /// `k` gets index `k + 1`. Fails if an index does not fit into an address octet, or if two
    /// nodes end up with the same address index.
    pub fn new<S: AsRef<str>>(names: &[S], reserved: &[ReservedIndex]) -> Result<Self, Error> {
        if names.is_empty() {
            return Err(Error::EmptyTopology);
        }
        let num_nodes = names.len();
        let mut used: HashMap<u8, usize> = HashMap::new();
        let mut nodes = Vec::with_capacity(num_nodes);

        for (k, name) in names.iter().enumerate() {
            let index = k + 1;
            let addr = reserved
                .iter()
                .find(|r| r.index == index)
                .map(|r| r.substitute.resolve(num_nodes))
                .unwrap_or(index);
            let octet = octet(index).ok_or(Error::AddressOverflow(index, index))?;
            let addr_octet = octet_nonzero(addr).ok_or(Error::AddressOverflow(index, addr))?;
            if let Some(other) = used.insert(addr_octet, index) {
                return Err(Error::AddressCollision(other, index, addr));
            }
            nodes.push(NodeAddresses {
                index,
                name: name.as_ref().to_string(),
                octet,
                addr: addr_octet,
            });
        }

        Ok(Self { nodes })
    }

    /// Create the address plan for all nodes of the topology.
    pub fn from_topology(topology: &Topology, reserved: &[ReservedIndex]) -> Result<Self, Error> {
        Self::new(topology.nodes(), reserved)
    }

    /// Address index of the node with the 1-based index `index`
    pub fn addr(&self, index: usize) -> Option<usize> {
        self.node(index).map(|n| n.addr())
    }

    /// Addresses of the node with the 1-based index `index`
    pub fn node(&self, index: usize) -> Option<&NodeAddresses> {
        index.checked_sub(1).and_then(|k| self.nodes.get(k))
    }

    /// Addresses of all nodes, ordered by their index
    pub fn nodes(&self) -> &[NodeAddresses] {
        &self.nodes
    }

    /// Number of nodes in the plan
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if the plan contains no node. Plans are never constructed empty.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

fn octet(x: usize) -> Option<u8> {
    if x <= u8::MAX as usize {
        Some(x as u8)
    } else {
        None
    }
}

fn octet_nonzero(x: usize) -> Option<u8> {
    octet(x).filter(|o| *o != 0)
}

/// All addresses derived from the index of a single node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeAddresses {
    index: usize,
    name: String,
    octet: u8,
    addr: u8,
}

impl NodeAddresses {
    /// 1-based index of the node
    pub fn index(&self) -> usize {
        self.index
    }

    /// Name of the node in the topology
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Address index of the node
    pub fn addr(&self) -> usize {
        self.addr as usize
    }

    /// Host name of the router, `r<i>`
    pub fn hostname(&self) -> String {
        format!("r{}", self.index)
    }

    /// AS number of the router
    pub fn as_number(&self, base_as: u32) -> u32 {
        base_as + self.index as u32
    }

    /// Router ID, which is also the address of the peering interface, `10.0.a.1`
    pub fn router_id(&self) -> Ipv4Addr {
        Ipv4Addr::new(10, 0, self.addr, 1)
    }

    /// Peering interface of the router, `10.0.a.1/24`
    pub fn router_net(&self) -> Ipv4Net {
        net(self.router_id())
    }

    /// Address of the internal speaker on the peering network of this router, `10.0.a.101`
    pub fn peering_addr(&self) -> Ipv4Addr {
        Ipv4Addr::new(10, 0, self.addr, 101)
    }

    /// Interface of the internal speaker on the peering network of this router, `10.0.a.101/24`
    pub fn peering_net(&self) -> Ipv4Net {
        net(self.peering_addr())
    }

    /// MAC address of the router peering interface
    pub fn router_mac(&self) -> String {
        format!("0a:00:00:00:{:02X}:01", self.addr)
    }

    /// MAC address announced for the router in the GUI hints
    pub fn host_mac(&self) -> String {
        format!("00:00:00:00:{:02X}:01", self.index)
    }

    /// Datapath ID of the switch the router is attached to
    pub fn dpid(&self) -> u64 {
        dpid(self.index)
    }

    /// Switch port the router is connected to, `of:<dpid>/1`
    pub fn access_point(&self) -> String {
        connect_point(self.dpid(), 1)
    }

    /// Network advertised by the router, `192.168.i.0/24`
    pub fn host_prefix(&self) -> Ipv4Net {
        net(Ipv4Addr::new(192, 168, self.octet, 0))
    }

    /// Address of the host behind the router, `192.168.i.1/24`
    pub fn host_net(&self) -> Ipv4Net {
        net(Ipv4Addr::new(192, 168, self.octet, 1))
    }

    /// Address of the router towards its host, `192.168.i.254`, used as default gateway
    pub fn gateway(&self) -> Ipv4Addr {
        Ipv4Addr::new(192, 168, self.octet, 254)
    }
}

/// Datapath ID of the switch with the given index
pub fn dpid(index: usize) -> u64 {
    DPID_BASE + index as u64
}

/// Render a switch port identifier, as used by the controller: `of:<16 hex digits>/<port>`
pub fn connect_point(dpid: u64, port: u32) -> String {
    format!("of:{:016x}/{}", dpid, port)
}

fn net(addr: Ipv4Addr) -> Ipv4Net {
    // a prefix length of 24 is always valid
    Ipv4Net::new(addr, 24).unwrap_or_else(|_| Ipv4Net::from(addr))
}
