use std::collections::{HashMap, VecDeque};

use crate::ir::Hierarchy;

use super::LayoutError;

/// Breadth-first hop counts from `source`, in discovery order.
pub(super) fn bfs_distances<'a>(tree: &'a Hierarchy, source: &str) -> Vec<(&'a str, usize)> {
    let Some(start) = tree.id(source) else {
        return Vec::new();
    };
    let mut seen: HashMap<&'a str, usize> = HashMap::new();
    let mut order = Vec::with_capacity(tree.node_count());
    let mut queue = VecDeque::new();
    seen.insert(start, 0);
    queue.push_back(start);
    while let Some(node) = queue.pop_front() {
        let dist = seen[node];
        order.push((node, dist));
        for next in tree.neighbors(node) {
            if !seen.contains_key(next) {
                seen.insert(next, dist + 1);
                queue.push_back(next);
            }
        }
    }
    order
}

/// Like [`bfs_distances`], but every node must be reached.
pub(super) fn distance_map<'a>(
    tree: &'a Hierarchy,
    source: &str,
) -> Result<HashMap<&'a str, usize>, LayoutError> {
    let map: HashMap<&'a str, usize> = bfs_distances(tree, source).into_iter().collect();
    ensure_reached(tree, source, &map)?;
    Ok(map)
}

fn ensure_reached(
    tree: &Hierarchy,
    source: &str,
    reached: &HashMap<&str, usize>,
) -> Result<(), LayoutError> {
    if reached.len() == tree.node_count() {
        return Ok(());
    }
    let node = tree
        .node_ids()
        .find(|id| !reached.contains_key(id))
        .unwrap_or_default();
    Err(LayoutError::Disconnected {
        node: node.to_string(),
        from: source.to_string(),
    })
}

/// Depth of every node, bucketed into rows.
#[derive(Debug, Clone, Default)]
pub struct Levels {
    level: HashMap<String, usize>,
    rows: Vec<Vec<String>>,
}

impl Levels {
    pub fn level_of(&self, id: &str) -> Option<usize> {
        self.level.get(id).copied()
    }

    /// Nodes at `level`, in breadth-first discovery order.
    pub fn nodes_at(&self, level: usize) -> &[String] {
        self.rows.get(level).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of rows, root row included.
    pub fn depth(&self) -> usize {
        self.rows.len()
    }

    pub fn len(&self) -> usize {
        self.level.len()
    }

    pub fn is_empty(&self) -> bool {
        self.level.is_empty()
    }
}

/// Classify every node by its hop distance from `root`.
pub fn classify_levels(tree: &Hierarchy, root: &str) -> Result<Levels, LayoutError> {
    if !tree.contains(root) {
        return Err(LayoutError::MissingNode {
            role: "root",
            id: root.to_string(),
        });
    }
    let order = bfs_distances(tree, root);
    let reached: HashMap<&str, usize> = order.iter().copied().collect();
    ensure_reached(tree, root, &reached)?;

    let mut levels = Levels::default();
    for (node, dist) in order {
        if levels.rows.len() <= dist {
            levels.rows.resize_with(dist + 1, Vec::new);
        }
        levels.rows[dist].push(node.to_string());
        levels.level.insert(node.to_string(), dist);
    }
    Ok(levels)
}
