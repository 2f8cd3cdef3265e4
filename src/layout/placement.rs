use std::collections::{BTreeMap, VecDeque};

use crate::config::LayoutConfig;
use crate::ir::{Hierarchy, NodeRole, Roles, Side};

use super::levels::Levels;
use super::sides::Sides;
use super::{CanvasSize, EdgeLayout, NodeLayout, Span};

/// Widest row (level 1 and below) on side A and side B.
pub(super) fn row_widths(levels: &Levels, sides: &Sides) -> (usize, usize) {
    let mut widest = (0usize, 0usize);
    for level in 1..levels.depth() {
        let (mut a, mut b) = (0usize, 0usize);
        for node in levels.nodes_at(level) {
            match sides.side_of(node) {
                Some(Side::A) => a += 1,
                Some(Side::B) => b += 1,
                None => {}
            }
        }
        widest.0 = widest.0.max(a);
        widest.1 = widest.1.max(b);
    }
    widest
}

/// The slot shared by a side's level-1 nodes, anchored at the centre line.
fn side_span(side: Side, canvas: f32, config: &LayoutConfig) -> Span {
    let extent = canvas * config.side_span_ratio;
    match side {
        Side::A => Span {
            min: -extent,
            max: 0.0,
        },
        Side::B => Span {
            min: 0.0,
            max: extent,
        },
    }
}

/// Slots of a side's level-1 nodes.
///
/// The branch root owns the whole side span unless tie-assigned nodes share
/// its level. Those sit outward of the branch root: the branch root keeps the
/// part of the side span between the centre line and its pinned x, and the
/// extras split the band from the pinned x to the canvas edge.
fn top_slots(side: Side, canvas: f32, extras: usize, config: &LayoutConfig) -> (Span, Vec<Span>) {
    let span = side_span(side, canvas, config);
    if extras == 0 {
        return (span, Vec::new());
    }
    let offset = config.branch_offset_x;
    let inner = span.width().min(offset);
    let outer = canvas.max(offset);
    let (own, band) = match side {
        Side::A => (
            Span { min: -inner, max: 0.0 },
            Span { min: -outer, max: -offset },
        ),
        Side::B => (
            Span { min: 0.0, max: inner },
            Span { min: offset, max: outer },
        ),
    };
    (own, partition(band, side, extras))
}

/// Split `span` into `count` equal slots, first slot at the edge nearest the
/// centre line.
fn partition(span: Span, side: Side, count: usize) -> Vec<Span> {
    if count == 0 {
        return Vec::new();
    }
    let step = span.width() / count as f32;
    (0..count)
        .map(|idx| {
            let near = idx as f32 * step;
            match side {
                Side::A => Span {
                    min: span.max - near - step,
                    max: span.max - near,
                },
                Side::B => Span {
                    min: span.min + near,
                    max: span.min + near + step,
                },
            }
        })
        .collect()
}

pub(super) struct Placement {
    pub nodes: BTreeMap<String, NodeLayout>,
    pub edges: Vec<EdgeLayout>,
}

impl Placement {
    fn place(&mut self, node: NodeLayout) {
        if let Some(parent) = &node.parent {
            self.edges.push(EdgeLayout {
                from: parent.clone(),
                to: node.id.clone(),
            });
        }
        self.nodes.insert(node.id.clone(), node);
    }
}

pub(super) fn assign_positions(
    tree: &Hierarchy,
    roles: &Roles,
    levels: &Levels,
    sides: &Sides,
    canvas: CanvasSize,
    config: &LayoutConfig,
) -> Placement {
    let mut placement = Placement {
        nodes: BTreeMap::new(),
        edges: Vec::with_capacity(tree.edge_count()),
    };
    placement.place(NodeLayout {
        id: roles.root.clone(),
        x: 0.0,
        y: config.root_y,
        level: 0,
        role: NodeRole::Root,
        side: None,
        span: None,
        parent: None,
    });

    let mut queue: VecDeque<(&str, Side, Span)> = VecDeque::new();
    for side in [Side::A, Side::B] {
        let branch = roles.branch(side);
        let extras: Vec<&str> = levels
            .nodes_at(1)
            .iter()
            .map(String::as_str)
            .filter(|id| *id != branch && sides.side_of(id) == Some(side))
            .collect();
        let (branch_span, extra_slots) =
            top_slots(side, canvas.for_side(side), extras.len(), config);

        placement.place(NodeLayout {
            id: branch.to_string(),
            x: side.sign() * config.branch_offset_x,
            y: config.branch_y,
            level: 1,
            role: NodeRole::Branch,
            side: Some(side),
            span: Some(branch_span),
            parent: Some(roles.root.clone()),
        });
        queue.push_back((branch, side, branch_span));

        for (node, slot) in extras.into_iter().zip(extra_slots) {
            placement.place(NodeLayout {
                id: node.to_string(),
                x: slot.center(),
                y: config.branch_y,
                level: 1,
                role: roles.role_of(node),
                side: Some(side),
                span: Some(slot),
                parent: Some(roles.root.clone()),
            });
            queue.push_back((node, side, slot));
        }
    }

    while let Some((node, side, span)) = queue.pop_front() {
        let Some(level) = levels.level_of(node) else {
            continue;
        };
        let children: Vec<&str> = tree
            .neighbors(node)
            .into_iter()
            .filter(|child| levels.level_of(child) == Some(level + 1))
            .collect();
        if children.is_empty() {
            continue;
        }
        tracing::trace!(node, children = children.len(), ?span, "splitting span");
        let slots = partition(span, side, children.len());
        for (child, slot) in children.into_iter().zip(slots) {
            placement.place(NodeLayout {
                id: child.to_string(),
                x: slot.center(),
                y: config.level_y(level + 1),
                level: level + 1,
                role: roles.role_of(child),
                side: Some(side),
                span: Some(slot),
                parent: Some(node.to_string()),
            });
            queue.push_back((child, side, slot));
        }
    }

    placement
}
