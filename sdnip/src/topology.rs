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

//! # Topology Graph
//!
//! A backbone topology is given as a set of named nodes and a directional capacity mapping. The
//! mapping often lists both directions of a physical link. Nodes are always kept in
//! lexicographic order, which defines their 1-based index.

use crate::Error;

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

/// Capacity of a link, in bits per second
pub type Capacity = f64;

/// Directional capacity mapping from `(source, target)` to the link capacity.
pub type CapacityMap = BTreeMap<(String, String), Capacity>;

/// Undirected link, where the endpoints are sorted lexicographically.
pub type UndirectedEdge = (String, String);

/// Static topology, with sorted nodes and directional edges.
#[derive(Debug, Clone, PartialEq)]
pub struct Topology {
    nodes: Vec<String>,
    edges: CapacityMap,
}

impl Topology {
    /// Create a new topology. Duplicate node names are merged. Fails if there is no node, or if
    /// an edge references a node which is not part of `nodes`.
    pub fn new<I, S>(nodes: I, edges: CapacityMap) -> Result<Self, Error>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let nodes: BTreeSet<String> = nodes.into_iter().map(|n| n.into()).collect();
        if nodes.is_empty() {
            return Err(Error::EmptyTopology);
        }
        for (a, b) in edges.keys() {
            for n in &[a, b] {
                if !nodes.contains(*n) {
                    return Err(Error::UnknownNode(n.to_string()));
                }
            }
        }
        Ok(Self { nodes: nodes.into_iter().collect(), edges })
    }

    /// Create a topology whose node set is exactly the union of all edge endpoints.
    pub fn from_capacities(edges: CapacityMap) -> Result<Self, Error> {
        let nodes: BTreeSet<String> =
            edges.keys().flat_map(|(a, b)| vec![a.clone(), b.clone()]).collect();
        Self::new(nodes, edges)
    }

    /// Parse a JSON list of directed links, each written as `[source, target, capacity]`.
    pub fn from_json(s: &str) -> Result<Self, Error> {
        let links: Vec<(String, String, Capacity)> = serde_json::from_str(s)?;
        Self::from_capacities(links.into_iter().map(|(a, b, c)| ((a, b), c)).collect())
    }

    /// Read a JSON list of directed links from a file. See [`Topology::from_json`].
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, Error> {
        Self::from_json(&fs::read_to_string(path)?)
    }

    /// Sorted node names. The node at position `k` has index `k + 1`.
    pub fn nodes(&self) -> &[String] {
        &self.nodes
    }

    /// Directional capacity mapping
    pub fn edges(&self) -> &CapacityMap {
        &self.edges
    }

    /// Number of nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Topologies are never empty, but clippy wants this method.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// 1-based index of the node with the given name
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.nodes.binary_search_by(|n| n.as_str().cmp(name)).ok().map(|k| k + 1)
    }

    /// Physical links of the topology, see [`undirected_edges`].
    pub fn undirected_edges(&self) -> BTreeSet<UndirectedEdge> {
        undirected_edges(self.edges.keys())
    }
}

/// Canonicalize a set of directional edges: every pair is sorted, and pairs appearing in both
/// directions are merged into a single undirected edge.
pub fn undirected_edges<'a, I>(edges: I) -> BTreeSet<UndirectedEdge>
where
    I: IntoIterator<Item = &'a (String, String)>,
{
    edges
        .into_iter()
        .map(|(a, b)| if a <= b { (a.clone(), b.clone()) } else { (b.clone(), a.clone()) })
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;
    use maplit::btreemap;
    use pretty_assertions::assert_eq;

    fn e(a: &str, b: &str) -> (String, String) {
        (a.to_string(), b.to_string())
    }

    #[test]
    fn link_list() {
        let t = Topology::from_json(r#"[["B", "A", 1e9], ["A", "B", 1e9], ["B", "C", 2e9]]"#)
            .unwrap();
        assert_eq!(t.nodes(), &["A", "B", "C"]);
        assert_eq!(t.edges().get(&e("B", "C")), Some(&2e9));
        assert!(matches!(Topology::from_json("[]"), Err(Error::EmptyTopology)));
        assert!(matches!(Topology::from_json("{}"), Err(Error::JsonError(_))));
    }

    #[test]
    fn nodes_are_sorted() {
        let t = Topology::new(vec!["C", "A", "B", "A"], CapacityMap::new()).unwrap();
        assert_eq!(t.nodes(), &["A", "B", "C"]);
        assert_eq!(t.index_of("A"), Some(1));
        assert_eq!(t.index_of("C"), Some(3));
        assert_eq!(t.index_of("D"), None);
    }

    #[test]
    fn unknown_node() {
        let edges = btreemap! { e("A", "X") => 1e9 };
        match Topology::new(vec!["A", "B"], edges) {
            Err(Error::UnknownNode(n)) => assert_eq!(n, "X"),
            r => panic!("unexpected result: {:?}", r),
        }
    }

    #[test]
    fn empty_topology() {
        assert!(matches!(
            Topology::new(Vec::<String>::new(), CapacityMap::new()),
            Err(Error::EmptyTopology)
        ));
        assert!(matches!(Topology::from_capacities(CapacityMap::new()), Err(Error::EmptyTopology)));
    }

    #[test]
    fn from_capacities() {
        let t = Topology::from_capacities(btreemap! {
            e("B", "C") => 1e9,
            e("A", "B") => 1e9,
        })
        .unwrap();
        assert_eq!(t.nodes(), &["A", "B", "C"]);
    }

    #[test]
    fn canonical_edges() {
        let edges = btreemap! {
            e("B", "A") => 1e9,
            e("A", "B") => 1e9,
            e("C", "B") => 1e9,
        };
        let u = undirected_edges(edges.keys());
        assert_eq!(u.into_iter().collect::<Vec<_>>(), vec![e("A", "B"), e("B", "C")]);
    }
}
