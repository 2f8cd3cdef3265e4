use crate::ir::{NodeRole, Roles, Side};
use crate::layout::HierarchyLayout;
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

#[derive(Debug, Serialize)]
pub struct LayoutDump {
    pub root: String,
    pub branch_a: String,
    pub branch_b: String,
    pub canvas_a: f32,
    pub canvas_b: f32,
    pub row_width_a: usize,
    pub row_width_b: usize,
    pub nodes: Vec<NodeDump>,
    pub edges: Vec<EdgeDump>,
}

#[derive(Debug, Serialize)]
pub struct NodeDump {
    pub id: String,
    pub x: f32,
    pub y: f32,
    pub level: usize,
    pub role: NodeRole,
    pub side: Option<Side>,
    pub span: Option<[f32; 2]>,
}

#[derive(Debug, Serialize)]
pub struct EdgeDump {
    pub from: String,
    pub to: String,
    pub points: [[f32; 2]; 2],
}

impl LayoutDump {
    pub fn from_layout(layout: &HierarchyLayout, roles: &Roles) -> Self {
        let nodes = layout
            .nodes
            .values()
            .map(|node| NodeDump {
                id: node.id.clone(),
                x: node.x,
                y: node.y,
                level: node.level,
                role: node.role,
                side: node.side,
                span: node.span.map(|span| [span.min, span.max]),
            })
            .collect();

        let edges = layout
            .edges
            .iter()
            .filter_map(|edge| {
                let from = layout.nodes.get(&edge.from)?;
                let to = layout.nodes.get(&edge.to)?;
                Some(EdgeDump {
                    from: edge.from.clone(),
                    to: edge.to.clone(),
                    points: [[from.x, from.y], [to.x, to.y]],
                })
            })
            .collect();

        LayoutDump {
            root: roles.root.clone(),
            branch_a: roles.branch_a.clone(),
            branch_b: roles.branch_b.clone(),
            canvas_a: layout.canvas.a,
            canvas_b: layout.canvas.b,
            row_width_a: layout.row_widths.0,
            row_width_b: layout.row_widths.1,
            nodes,
            edges,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

pub fn write_layout_dump(path: &Path, layout: &HierarchyLayout, roles: &Roles) -> anyhow::Result<()> {
    let dump = LayoutDump::from_layout(layout, roles);
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, &dump)?;
    Ok(())
}
