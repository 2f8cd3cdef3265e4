//! Two-sided hierarchy layout.
//!
//! The root is pinned at the top centre and the two branch roots at fixed
//! offsets either side of it. Every other node belongs to the side of the
//! branch root it is closer to and is placed inside a horizontal span that it
//! receives from its parent: a parent's span is split into equal slots, one
//! per child, starting at the centre line and moving outward. Each side's
//! canvas grows linearly once its widest row passes a threshold.

mod error;
mod levels;
mod placement;
mod sides;
pub(crate) mod types;

pub use error::LayoutError;
pub use levels::{Levels, classify_levels};
pub use sides::{Sides, partition_sides};
pub use types::*;

use crate::config::LayoutConfig;
use crate::ir::{Hierarchy, Roles};
use placement::{assign_positions, row_widths};
use std::collections::BTreeMap;

/// Lay out `tree` around the three distinguished nodes in `roles`.
#[tracing::instrument(skip_all, fields(root = %roles.root, nodes = tree.node_count()))]
pub fn compute_layout(
    tree: &Hierarchy,
    roles: &Roles,
    config: &LayoutConfig,
) -> Result<HierarchyLayout, LayoutError> {
    validate_roles(tree, roles)?;
    if tree.has_cycle() {
        return Err(LayoutError::NotATree);
    }

    let levels = classify_levels(tree, &roles.root)?;
    let sides = partition_sides(tree, roles, config.tie_side)?;

    let row_widths = row_widths(&levels, &sides);
    let canvas = CanvasSize {
        a: config.canvas_for_row_width(row_widths.0),
        b: config.canvas_for_row_width(row_widths.1),
    };
    tracing::debug!(
        row_width_a = row_widths.0,
        row_width_b = row_widths.1,
        canvas_a = canvas.a,
        canvas_b = canvas.b,
        depth = levels.depth(),
        "sized canvas"
    );

    let placement = assign_positions(tree, roles, &levels, &sides, canvas, config);
    Ok(HierarchyLayout {
        canvas,
        row_widths,
        nodes: placement.nodes,
        edges: placement.edges,
    })
}

/// Default-configured layout returned as `(canvas_a, canvas_b, positions)`.
pub fn layout(
    tree: &Hierarchy,
    root: &str,
    branch_a: &str,
    branch_b: &str,
) -> Result<(f32, f32, BTreeMap<String, NodePosition>), LayoutError> {
    let roles = Roles::new(root, branch_a, branch_b);
    let result = compute_layout(tree, &roles, &LayoutConfig::default())?;
    Ok((result.canvas.a, result.canvas.b, result.positions()))
}

fn validate_roles(tree: &Hierarchy, roles: &Roles) -> Result<(), LayoutError> {
    for (role, id) in [
        ("root", &roles.root),
        ("branch A", &roles.branch_a),
        ("branch B", &roles.branch_b),
    ] {
        if !tree.contains(id) {
            return Err(LayoutError::MissingNode {
                role,
                id: id.clone(),
            });
        }
    }
    if roles.root == roles.branch_a || roles.root == roles.branch_b {
        return Err(LayoutError::DuplicateRole {
            id: roles.root.clone(),
        });
    }
    if roles.branch_a == roles.branch_b {
        return Err(LayoutError::DuplicateRole {
            id: roles.branch_a.clone(),
        });
    }
    for branch in [&roles.branch_a, &roles.branch_b] {
        if !tree.are_adjacent(&roles.root, branch) {
            return Err(LayoutError::BranchNotAdjacent {
                branch: branch.clone(),
                root: roles.root.clone(),
            });
        }
    }
    Ok(())
}
