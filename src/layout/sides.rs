use std::collections::HashMap;

use crate::ir::{Hierarchy, Roles, Side};

use super::LayoutError;
use super::levels::distance_map;

/// Side membership of every node except the root.
#[derive(Debug, Clone, Default)]
pub struct Sides {
    side: HashMap<String, Side>,
    ties: Vec<String>,
}

impl Sides {
    pub fn side_of(&self, id: &str) -> Option<Side> {
        self.side.get(id).copied()
    }

    /// Nodes that were equally far from both branch roots, in enumeration order.
    pub fn ties(&self) -> &[String] {
        &self.ties
    }

    pub fn count(&self, side: Side) -> usize {
        self.side.values().filter(|s| **s == side).count()
    }
}

/// Assign every non-root node to the side whose branch root is strictly
/// closer; equal distances go to `tie`.
pub fn partition_sides(tree: &Hierarchy, roles: &Roles, tie: Side) -> Result<Sides, LayoutError> {
    for (role, id) in [("branch A", &roles.branch_a), ("branch B", &roles.branch_b)] {
        if !tree.contains(id) {
            return Err(LayoutError::MissingNode {
                role,
                id: id.clone(),
            });
        }
    }
    let from_a = distance_map(tree, &roles.branch_a)?;
    let from_b = distance_map(tree, &roles.branch_b)?;

    let mut sides = Sides::default();
    for node in tree.node_ids() {
        if node == roles.root {
            continue;
        }
        let side = if node == roles.branch_a {
            Side::A
        } else if node == roles.branch_b {
            Side::B
        } else {
            let (da, db) = (from_a[node], from_b[node]);
            if da < db {
                Side::A
            } else if db < da {
                Side::B
            } else {
                tracing::debug!(node, distance = da, ?tie, "equidistant from both branch roots");
                sides.ties.push(node.to_string());
                tie
            }
        };
        sides.side.insert(node.to_string(), side);
    }
    Ok(sides)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree_with_extra_top_node() -> Hierarchy {
        let mut tree = Hierarchy::new();
        for (parent, child) in [
            ("CA", "01"),
            ("CA", "02"),
            ("CA", "03"),
            ("01", "10"),
            ("02", "20"),
            ("20", "21"),
            ("03", "30"),
        ] {
            tree.add_edge(parent, child);
        }
        tree
    }

    #[test]
    fn nodes_follow_nearest_branch() {
        let sides = partition_sides(&tree_with_extra_top_node(), &Roles::default(), Side::B).unwrap();
        assert_eq!(sides.side_of("01"), Some(Side::A));
        assert_eq!(sides.side_of("10"), Some(Side::A));
        assert_eq!(sides.side_of("02"), Some(Side::B));
        assert_eq!(sides.side_of("21"), Some(Side::B));
        assert_eq!(sides.side_of("CA"), None);
    }

    #[test]
    fn ties_use_configured_side() {
        let tree = tree_with_extra_top_node();
        let sides = partition_sides(&tree, &Roles::default(), Side::B).unwrap();
        assert_eq!(sides.ties(), ["03", "30"]);
        assert_eq!(sides.side_of("03"), Some(Side::B));
        assert_eq!(sides.side_of("30"), Some(Side::B));

        let sides = partition_sides(&tree, &Roles::default(), Side::A).unwrap();
        assert_eq!(sides.side_of("03"), Some(Side::A));
        assert_eq!(sides.count(Side::A), 4);
    }

    #[test]
    fn missing_branch_is_reported() {
        let roles = Roles::new("CA", "01", "99");
        let err = partition_sides(&tree_with_extra_top_node(), &roles, Side::B).unwrap_err();
        assert!(matches!(err, LayoutError::MissingNode { role: "branch B", .. }));
    }
}
