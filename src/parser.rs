use crate::ir::Hierarchy;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

static FIELD_SPLIT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*[,;\t]\s*").unwrap());
static COMMENT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*(#|//)").unwrap());

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("table header must name a `Parent` and a `Child` column")]
    MissingColumns,

    #[error("line {line}: expected at least {expected} fields, found {found}")]
    ShortRow {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("invalid node-link JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("hierarchy has no nodes")]
    Empty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    /// Delimited parent/child table.
    Table,
    /// `{"nodes": [...], "links": [...]}` document.
    NodeLink,
}

impl InputFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension().and_then(|e| e.to_str())? {
            "csv" | "tsv" | "txt" => Some(Self::Table),
            "json" => Some(Self::NodeLink),
            _ => None,
        }
    }

    pub fn sniff(input: &str) -> Self {
        if input.trim_start().starts_with('{') {
            Self::NodeLink
        } else {
            Self::Table
        }
    }
}

pub fn parse_hierarchy(input: &str, format: InputFormat) -> Result<Hierarchy, ParseError> {
    let tree = match format {
        InputFormat::Table => parse_hierarchy_table(input)?,
        InputFormat::NodeLink => parse_node_link_json(input)?,
    };
    if tree.is_empty() {
        return Err(ParseError::Empty);
    }
    tracing::debug!(
        nodes = tree.node_count(),
        edges = tree.edge_count(),
        ?format,
        "parsed hierarchy"
    );
    Ok(tree)
}

/// Build a hierarchy from a parent/child table.
///
/// The first non-comment line is the header and must contain `Parent` and
/// `Child` columns (any case); other columns, such as an unnamed index column
/// or an `UP` column, are ignored. Rows linking a node to itself are skipped.
pub fn parse_hierarchy_table(input: &str) -> Result<Hierarchy, ParseError> {
    let mut lines = input
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty() && !COMMENT_RE.is_match(line));

    let Some((_, header)) = lines.next() else {
        return Ok(Hierarchy::new());
    };
    let columns = split_fields(header);
    let find = |name: &str| columns.iter().position(|c| c.eq_ignore_ascii_case(name));
    let (Some(parent_col), Some(child_col)) = (find("parent"), find("child")) else {
        return Err(ParseError::MissingColumns);
    };
    let needed = parent_col.max(child_col) + 1;

    let mut tree = Hierarchy::new();
    for (idx, line) in lines {
        let fields = split_fields(line);
        if fields.len() < needed {
            return Err(ParseError::ShortRow {
                line: idx + 1,
                expected: needed,
                found: fields.len(),
            });
        }
        let (parent, child) = (&fields[parent_col], &fields[child_col]);
        if parent.is_empty() || child.is_empty() {
            continue;
        }
        tree.ensure_node(parent);
        if !tree.add_edge(parent, child) && parent != child {
            tracing::trace!(parent = %parent, child = %child, "duplicate link ignored");
        }
    }
    Ok(tree)
}

fn split_fields(line: &str) -> Vec<String> {
    FIELD_SPLIT_RE
        .split(line.trim())
        .map(|field| field.trim_matches('"').to_string())
        .collect()
}

#[derive(Debug, Serialize, Deserialize)]
struct NodeLinkNode {
    id: serde_json::Value,
}

#[derive(Debug, Serialize, Deserialize)]
struct NodeLinkEdge {
    source: serde_json::Value,
    target: serde_json::Value,
}

#[derive(Debug, Serialize, Deserialize)]
struct NodeLinkDocument {
    #[serde(default)]
    directed: bool,
    #[serde(default)]
    multigraph: bool,
    #[serde(default)]
    graph: serde_json::Value,
    #[serde(default)]
    nodes: Vec<NodeLinkNode>,
    #[serde(default, alias = "edges")]
    links: Vec<NodeLinkEdge>,
}

fn node_id(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Build a hierarchy from a node-link document. Numeric ids become their
/// decimal text.
pub fn parse_node_link_json(input: &str) -> Result<Hierarchy, ParseError> {
    let doc: NodeLinkDocument = serde_json::from_str(input)?;
    let mut tree = Hierarchy::new();
    for node in &doc.nodes {
        tree.ensure_node(&node_id(&node.id));
    }
    for link in &doc.links {
        tree.add_edge(&node_id(&link.source), &node_id(&link.target));
    }
    Ok(tree)
}

/// Serialize a hierarchy as an undirected node-link document.
pub fn to_node_link_json(tree: &Hierarchy) -> Result<String, ParseError> {
    let doc = NodeLinkDocument {
        directed: false,
        multigraph: false,
        graph: serde_json::Value::Object(Default::default()),
        nodes: tree
            .node_ids()
            .map(|id| NodeLinkNode {
                id: serde_json::Value::String(id.to_string()),
            })
            .collect(),
        links: tree
            .edges()
            .into_iter()
            .map(|(source, target)| NodeLinkEdge {
                source: serde_json::Value::String(source.to_string()),
                target: serde_json::Value::String(target.to_string()),
            })
            .collect(),
    };
    Ok(serde_json::to_string(&doc)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_indexed_table() {
        let input = ",UP,Parent,Child\n0,CA,CA,01\n1,CA,CA,02\n7,CA,01,08\n2,CA,02,03\n";
        let tree = parse_hierarchy_table(input).unwrap();
        assert_eq!(tree.node_count(), 5);
        assert_eq!(tree.edge_count(), 4);
        assert_eq!(tree.neighbors("CA"), vec!["01", "02"]);
        assert!(tree.are_adjacent("02", "03"));
    }

    #[test]
    fn skips_self_links_and_comments() {
        let input = "# org chart\nparent;child\nCA;CA\nCA;01\n\nCA;02\n";
        let tree = parse_hierarchy_table(input).unwrap();
        assert_eq!(tree.node_count(), 3);
        assert_eq!(tree.edge_count(), 2);
    }

    #[test]
    fn header_without_columns_fails() {
        let err = parse_hierarchy_table("from,to\nCA,01\n").unwrap_err();
        assert!(matches!(err, ParseError::MissingColumns));
    }

    #[test]
    fn short_row_reports_line() {
        let err = parse_hierarchy_table("Parent,Child\nCA,01\nCA\n").unwrap_err();
        assert!(matches!(err, ParseError::ShortRow { line: 3, expected: 2, found: 1 }));
    }

    #[test]
    fn parses_node_link_json() {
        let input = r#"{"directed": false, "multigraph": false, "graph": {},
            "nodes": [{"id": "CA"}, {"id": "01"}, {"id": 2}],
            "links": [{"source": "CA", "target": "01"}, {"source": "CA", "target": 2}]}"#;
        let tree = parse_node_link_json(input).unwrap();
        assert_eq!(tree.neighbors("CA"), vec!["01", "2"]);
    }

    #[test]
    fn node_link_accepts_edges_key() {
        let input = r#"{"nodes": [], "edges": [{"source": "a", "target": "b"}]}"#;
        let tree = parse_node_link_json(input).unwrap();
        assert_eq!(tree.edge_count(), 1);
    }

    #[test]
    fn node_link_output_reads_back() {
        let tree = parse_hierarchy_table("Parent,Child\nCA,01\nCA,02\n01,08\n").unwrap();
        let json = to_node_link_json(&tree).unwrap();
        assert!(json.contains("\"links\""));
        let back = parse_node_link_json(&json).unwrap();
        assert_eq!(back.edges(), tree.edges());
    }

    #[test]
    fn sniffs_format() {
        assert_eq!(InputFormat::sniff("  {\"nodes\": []}"), InputFormat::NodeLink);
        assert_eq!(InputFormat::sniff("Parent,Child"), InputFormat::Table);
        assert_eq!(
            InputFormat::from_path(Path::new("hierarchy_table.csv")),
            Some(InputFormat::Table)
        );
    }

    #[test]
    fn empty_input_is_rejected() {
        assert!(matches!(
            parse_hierarchy("", InputFormat::Table),
            Err(ParseError::Empty)
        ));
    }
}
