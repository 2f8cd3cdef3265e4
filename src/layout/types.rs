use std::collections::BTreeMap;

use serde::Serialize;

use crate::ir::{NodeRole, Side};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NodePosition {
    pub x: f32,
    pub y: f32,
}

/// Horizontal extent allotted to each side's widest row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CanvasSize {
    pub a: f32,
    pub b: f32,
}

impl CanvasSize {
    pub fn for_side(&self, side: Side) -> f32 {
        match side {
            Side::A => self.a,
            Side::B => self.b,
        }
    }
}

/// Closed horizontal interval a node's subtree is laid out in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Span {
    pub min: f32,
    pub max: f32,
}

impl Span {
    pub fn width(&self) -> f32 {
        self.max - self.min
    }

    pub fn center(&self) -> f32 {
        (self.min + self.max) / 2.0
    }

    pub fn contains(&self, x: f32) -> bool {
        x >= self.min - f32::EPSILON && x <= self.max + f32::EPSILON
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NodeLayout {
    pub id: String,
    pub x: f32,
    pub y: f32,
    pub level: usize,
    pub role: NodeRole,
    /// `None` for the root.
    pub side: Option<Side>,
    /// `None` for the root.
    pub span: Option<Span>,
    pub parent: Option<String>,
}

impl NodeLayout {
    pub fn position(&self) -> NodePosition {
        NodePosition {
            x: self.x,
            y: self.y,
        }
    }
}

/// Parent-to-child link between two laid out nodes.
#[derive(Debug, Clone, Serialize)]
pub struct EdgeLayout {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct HierarchyLayout {
    pub canvas: CanvasSize,
    /// Widest row on side A and side B.
    pub row_widths: (usize, usize),
    pub nodes: BTreeMap<String, NodeLayout>,
    pub edges: Vec<EdgeLayout>,
}

impl HierarchyLayout {
    pub fn position(&self, id: &str) -> Option<NodePosition> {
        self.nodes.get(id).map(NodeLayout::position)
    }

    pub fn positions(&self) -> BTreeMap<String, NodePosition> {
        self.nodes
            .iter()
            .map(|(id, node)| (id.clone(), node.position()))
            .collect()
    }

    /// Children of `id` in layout order.
    pub fn children(&self, id: &str) -> Vec<&NodeLayout> {
        self.edges
            .iter()
            .filter(|edge| edge.from == id)
            .filter_map(|edge| self.nodes.get(&edge.to))
            .collect()
    }

    pub fn depth(&self) -> usize {
        self.nodes.values().map(|node| node.level + 1).max().unwrap_or(0)
    }

    /// Vertical extent of all nodes as `(min_y, max_y)`.
    pub fn y_bounds(&self) -> (f32, f32) {
        let mut min_y = f32::MAX;
        let mut max_y = f32::MIN;
        for node in self.nodes.values() {
            min_y = min_y.min(node.y);
            max_y = max_y.max(node.y);
        }
        if min_y > max_y { (0.0, 0.0) } else { (min_y, max_y) }
    }
}
