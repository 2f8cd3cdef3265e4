use std::path::{Path, PathBuf};

use hierarchy_layout::config::parse_config;
use hierarchy_layout::layout::CanvasSize;
use hierarchy_layout::layout_dump::{LayoutDump, write_layout_dump};
use hierarchy_layout::{
    Hierarchy, HierarchyLayout, InputFormat, LayoutConfig, LayoutError, RenderConfig, Roles, Side,
    Theme, compute_layout, layout, parse_hierarchy, render_svg,
};

const EPS: f32 = 1e-5;

fn fixture_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn load_fixture(name: &str) -> Hierarchy {
    let path = fixture_path(name);
    let input = std::fs::read_to_string(&path).expect("fixture read failed");
    let format = InputFormat::from_path(&path).unwrap_or_else(|| InputFormat::sniff(&input));
    parse_hierarchy(&input, format).expect("parse failed")
}

fn assert_nested(layout: &HierarchyLayout) {
    for node in layout.nodes.values().filter(|node| node.level >= 2) {
        let parent = node.parent.as_ref().expect("descendant without parent");
        let span = layout.nodes[parent].span.expect("parent without span");
        assert!(
            span.contains(node.x),
            "{} at {} outside parent {parent} span {span:?}",
            node.id,
            node.x
        );
    }
}

fn assert_sides_separated(layout: &HierarchyLayout) {
    for node in layout.nodes.values() {
        match node.side {
            Some(Side::A) => assert!(node.x <= EPS, "{} should be left", node.id),
            Some(Side::B) => assert!(node.x >= -EPS, "{} should be right", node.id),
            None => assert_eq!(node.x, 0.0),
        }
    }
}

#[test]
fn table_fixture_lays_out() {
    let tree = load_fixture("hierarchy_table.csv");
    assert_eq!(tree.node_count(), 25);
    assert_eq!(tree.edge_count(), 24);

    let result = compute_layout(&tree, &Roles::default(), &LayoutConfig::default()).unwrap();
    assert_eq!(result.nodes.len(), 25);
    assert_eq!(result.edges.len(), 24);
    assert_eq!(result.row_widths, (4, 11));
    assert_eq!(result.canvas, CanvasSize { a: 1.0, b: 2.75 });
    assert_eq!(result.depth(), 5);
    assert_nested(&result);
    assert_sides_separated(&result);

    let side_b_extent = 0.5 * result.canvas.b;
    for node in result.nodes.values().filter(|node| node.level >= 2) {
        assert!(node.x.abs() <= side_b_extent + EPS);
    }
}

#[test]
fn both_input_formats_agree_on_structure() {
    let table = load_fixture("hierarchy_table.csv");
    let graph = load_fixture("hierarchy_graph.json");
    let mut table_ids: Vec<&str> = table.node_ids().collect();
    let mut graph_ids: Vec<&str> = graph.node_ids().collect();
    table_ids.sort_unstable();
    graph_ids.sort_unstable();
    assert_eq!(table_ids, graph_ids);

    let roles = Roles::default();
    let config = LayoutConfig::default();
    let from_table = compute_layout(&table, &roles, &config).unwrap();
    let from_graph = compute_layout(&graph, &roles, &config).unwrap();
    assert_eq!(from_table.canvas, from_graph.canvas);
    for (id, node) in &from_table.nodes {
        let other = &from_graph.nodes[id];
        assert_eq!(node.level, other.level, "{id}");
        assert_eq!(node.side, other.side, "{id}");
        assert!((node.y - other.y).abs() < EPS, "{id}");
    }
}

#[test]
fn graph_fixture_keeps_link_order() {
    let tree = load_fixture("hierarchy_graph.json");
    let (canvas_a, canvas_b, positions) = layout(&tree, "CA", "01", "02").unwrap();
    assert_eq!((canvas_a, canvas_b), (1.0, 2.75));

    // 01's children in link order: 08, 09, 18, 19, walking outward from -0.5.
    let xs: Vec<f32> = ["08", "09", "18", "19"]
        .iter()
        .map(|id| positions[*id].x)
        .collect();
    for (x, expected) in xs.iter().zip([-0.0625, -0.1875, -0.3125, -0.4375]) {
        assert!((x - expected).abs() < EPS, "{xs:?}");
    }
    assert!((positions["10"].x - positions["09"].x).abs() < EPS);
    assert!((positions["10"].y - -0.8).abs() < EPS);
}

#[test]
fn layout_is_deterministic() {
    let tree = load_fixture("hierarchy_table.csv");
    let first = layout(&tree, "CA", "01", "02").unwrap();
    let second = layout(&tree, "CA", "01", "02").unwrap();
    assert_eq!(first, second);
}

#[test]
fn config_file_drives_roles_and_ties() {
    let contents = std::fs::read_to_string(fixture_path("config.json5")).unwrap();
    let config = parse_config(&contents).unwrap();
    assert_eq!(config.roles, Roles::new("HQ", "west", "east"));
    assert_eq!(config.layout.tie_side, Side::A);
    assert_eq!(config.render.width, 900.0);

    let tree = load_fixture("regions.csv");
    let result = compute_layout(&tree, &config.roles, &config.layout).unwrap();
    let shared = &result.nodes["shared"];
    assert_eq!(shared.side, Some(Side::A));
    assert_eq!(shared.level, 1);
    assert!((shared.x - -0.75).abs() < EPS);
    assert!((result.nodes["w1"].x - -0.125).abs() < EPS);
    assert!((result.nodes["w2"].x - -0.375).abs() < EPS);
    assert!((result.nodes["e1"].x - 0.5).abs() < EPS);
    assert!((result.nodes["e1"].y - -0.4).abs() < EPS);

    let svg = render_svg(&result, &config.theme, &config.render);
    assert!(svg.contains("Regional offices"));
    assert!(svg.contains("#112233"));
    assert!(svg.contains("width=\"900\""));
}

#[test]
fn default_tie_side_is_b() {
    let tree = load_fixture("regions.csv");
    let roles = Roles::new("HQ", "west", "east");
    let result = compute_layout(&tree, &roles, &LayoutConfig::default()).unwrap();
    assert_eq!(result.nodes["shared"].side, Some(Side::B));
    assert!(result.nodes["shared"].x > 0.0);
}

#[test]
fn renders_fixture_svg() {
    let tree = load_fixture("hierarchy_table.csv");
    let result = compute_layout(&tree, &Roles::default(), &LayoutConfig::default()).unwrap();
    let svg = render_svg(&result, &Theme::classic(), &RenderConfig::default());
    assert!(svg.contains("<svg"), "missing <svg tag");
    assert!(svg.contains("</svg>"), "missing </svg tag");
    assert_eq!(svg.matches("<path").count(), 24);
    assert_eq!(svg.matches("<circle").count(), 22);
}

#[test]
fn writes_layout_dump() {
    let tree = load_fixture("hierarchy_table.csv");
    let roles = Roles::default();
    let result = compute_layout(&tree, &roles, &LayoutConfig::default()).unwrap();
    let path = std::env::temp_dir().join(format!("hierarchy-layout-dump-{}.json", std::process::id()));
    write_layout_dump(&path, &result, &roles).unwrap();

    let written: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    let _ = std::fs::remove_file(&path);
    let expected = serde_json::from_str::<serde_json::Value>(
        &LayoutDump::from_layout(&result, &roles).to_json().unwrap(),
    )
    .unwrap();
    assert_eq!(written, expected);
    assert_eq!(written["canvas_b"], 2.75);
    assert_eq!(written["row_width_b"], 11);
    assert_eq!(written["nodes"].as_array().unwrap().len(), 25);
}

#[test]
fn rejects_malformed_hierarchies() {
    let tree = load_fixture("hierarchy_table.csv");
    let err = layout(&tree, "CA", "01", "99").unwrap_err();
    assert!(matches!(err, LayoutError::MissingNode { id, .. } if id == "99"));

    let err = layout(&tree, "CA", "01", "03").unwrap_err();
    assert!(matches!(err, LayoutError::BranchNotAdjacent { .. }));

    let mut cyclic = load_fixture("hierarchy_table.csv");
    cyclic.add_edge("08", "10");
    assert_eq!(layout(&cyclic, "CA", "01", "02").unwrap_err(), LayoutError::NotATree);

    let mut islands = load_fixture("hierarchy_table.csv");
    islands.add_edge("x", "y");
    assert!(matches!(
        layout(&islands, "CA", "01", "02").unwrap_err(),
        LayoutError::Disconnected { .. }
    ));
}
