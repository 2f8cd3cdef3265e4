use std::collections::HashMap;

use petgraph::algo::is_cyclic_undirected;
use petgraph::graph::{EdgeIndex, NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};

/// One of the two horizontal half-planes of the layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// Left of the centre line, owned by the first branch root.
    A,
    /// Right of the centre line, owned by the second branch root.
    B,
}

impl Side {
    /// Horizontal direction children move in, away from the centre line.
    pub fn sign(self) -> f32 {
        match self {
            Side::A => -1.0,
            Side::B => 1.0,
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim() {
            "a" | "A" => Some(Self::A),
            "b" | "B" => Some(Self::B),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeRole {
    Root,
    Branch,
    Descendant,
}

/// The three distinguished node ids a layout is computed against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Roles {
    pub root: String,
    pub branch_a: String,
    pub branch_b: String,
}

impl Roles {
    pub fn new(root: &str, branch_a: &str, branch_b: &str) -> Self {
        Self {
            root: root.to_string(),
            branch_a: branch_a.to_string(),
            branch_b: branch_b.to_string(),
        }
    }

    pub fn branch(&self, side: Side) -> &str {
        match side {
            Side::A => &self.branch_a,
            Side::B => &self.branch_b,
        }
    }

    pub fn role_of(&self, id: &str) -> NodeRole {
        if id == self.root {
            NodeRole::Root
        } else if id == self.branch_a || id == self.branch_b {
            NodeRole::Branch
        } else {
            NodeRole::Descendant
        }
    }
}

impl Default for Roles {
    fn default() -> Self {
        Self::new("CA", "01", "02")
    }
}

/// Undirected hierarchy graph keyed by string ids.
///
/// Neighbour enumeration follows edge insertion order, so the order links were
/// listed in the source table is the order siblings are laid out in.
#[derive(Debug, Clone)]
pub struct Hierarchy {
    graph: UnGraph<String, ()>,
    index: HashMap<String, NodeIndex>,
}

impl Hierarchy {
    pub fn new() -> Self {
        Self {
            graph: UnGraph::new_undirected(),
            index: HashMap::new(),
        }
    }

    pub fn ensure_node(&mut self, id: &str) -> NodeIndex {
        if let Some(idx) = self.index.get(id) {
            return *idx;
        }
        let idx = self.graph.add_node(id.to_string());
        self.index.insert(id.to_string(), idx);
        idx
    }

    /// Link two nodes, creating them if needed. Self-links are dropped and a
    /// repeated link is stored once. Returns whether a new edge was added.
    pub fn add_edge(&mut self, from: &str, to: &str) -> bool {
        let a = self.ensure_node(from);
        if from == to {
            return false;
        }
        let b = self.ensure_node(to);
        if self.graph.find_edge(a, b).is_some() {
            return false;
        }
        self.graph.add_edge(a, b, ());
        true
    }

    /// The stored copy of `id`, borrowed from the hierarchy.
    pub fn id(&self, id: &str) -> Option<&str> {
        self.index.get(id).map(|idx| self.graph[*idx].as_str())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Node ids in insertion order.
    pub fn node_ids(&self) -> impl Iterator<Item = &str> {
        self.graph.node_indices().map(|idx| self.graph[idx].as_str())
    }

    pub fn neighbors(&self, id: &str) -> Vec<&str> {
        let Some(&idx) = self.index.get(id) else {
            return Vec::new();
        };
        let mut links: Vec<(EdgeIndex, NodeIndex)> = self
            .graph
            .edges(idx)
            .map(|edge| {
                let other = if edge.source() == idx {
                    edge.target()
                } else {
                    edge.source()
                };
                (edge.id(), other)
            })
            .collect();
        links.sort_by_key(|(edge, _)| *edge);
        links
            .into_iter()
            .map(|(_, other)| self.graph[other].as_str())
            .collect()
    }

    pub fn are_adjacent(&self, a: &str, b: &str) -> bool {
        match (self.index.get(a), self.index.get(b)) {
            (Some(&a), Some(&b)) => self.graph.find_edge(a, b).is_some(),
            _ => false,
        }
    }

    /// Edge endpoints in insertion order.
    pub fn edges(&self) -> Vec<(&str, &str)> {
        self.graph
            .edge_references()
            .map(|edge| {
                (
                    self.graph[edge.source()].as_str(),
                    self.graph[edge.target()].as_str(),
                )
            })
            .collect()
    }

    pub fn has_cycle(&self) -> bool {
        is_cyclic_undirected(&self.graph)
    }
}

impl Default for Hierarchy {
    fn default() -> Self {
        Self::new()
    }
}
