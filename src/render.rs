use crate::config::RenderConfig;
use crate::layout::HierarchyLayout;
use crate::theme::{MarkerShape, MarkerStyle, Theme};
use anyhow::Result;
use std::path::Path;

/// Maps layout units onto the SVG plot area.
#[derive(Debug, Clone, Copy)]
struct Viewport {
    x_min: f32,
    x_max: f32,
    y_min: f32,
    y_max: f32,
    left: f32,
    top: f32,
    plot_width: f32,
    plot_height: f32,
}

impl Viewport {
    fn new(layout: &HierarchyLayout, config: &RenderConfig, title_height: f32) -> Self {
        let (y_low, y_high) = layout.y_bounds();
        let pad = config.vertical_padding.max(0.0);
        let margin = config.margin.max(0.0);
        Self {
            x_min: -layout.canvas.a,
            x_max: layout.canvas.b,
            y_min: y_low - pad,
            y_max: y_high + pad,
            left: margin,
            top: margin + title_height,
            plot_width: (config.width - 2.0 * margin).max(1.0),
            plot_height: (config.height - 2.0 * margin - title_height).max(1.0),
        }
    }

    fn project(&self, x: f32, y: f32) -> (f32, f32) {
        let span_x = (self.x_max - self.x_min).max(f32::EPSILON);
        let span_y = (self.y_max - self.y_min).max(f32::EPSILON);
        (
            self.left + (x - self.x_min) / span_x * self.plot_width,
            self.top + (self.y_max - y) / span_y * self.plot_height,
        )
    }
}

pub fn render_svg(layout: &HierarchyLayout, theme: &Theme, config: &RenderConfig) -> String {
    let width = config.width.max(100.0);
    let height = config.height.max(100.0);
    let config = RenderConfig {
        width,
        height,
        ..config.clone()
    };
    let title_height = if config.title.is_some() {
        theme.font_size * 2.0
    } else {
        0.0
    };
    let view = Viewport::new(layout, &config, title_height);
    let mut svg = String::new();

    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">",
    ));
    svg.push_str(&format!(
        "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
        theme.background
    ));

    if let Some(title) = &config.title {
        svg.push_str(&format!(
            "<text x=\"{:.2}\" y=\"{:.2}\" font-family=\"{}\" font-size=\"{}\" font-weight=\"bold\" fill=\"{}\">{}</text>",
            view.left,
            config.margin.max(0.0) + theme.font_size * 1.2,
            escape_xml(&theme.font_family),
            theme.font_size * 1.2,
            theme.text_color,
            escape_xml(title)
        ));
    }

    if config.show_frame {
        svg.push_str(&format!(
            "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" fill=\"none\" stroke=\"{}\" stroke-width=\"{}\"/>",
            view.left,
            view.top,
            view.plot_width,
            view.plot_height,
            theme.frame_color,
            theme.frame_width
        ));
    }

    for edge in &layout.edges {
        let (Some(from), Some(to)) = (layout.nodes.get(&edge.from), layout.nodes.get(&edge.to)) else {
            continue;
        };
        let points = [view.project(from.x, from.y), view.project(to.x, to.y)];
        svg.push_str(&format!(
            "<path d=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"{}\"/>",
            points_to_path(&points),
            theme.line_color,
            theme.line_width
        ));
    }

    for node in layout.nodes.values() {
        let (cx, cy) = view.project(node.x, node.y);
        let style = theme.marker_for(node.role);
        // hover text carries the id and layout coordinates
        svg.push_str(&format!(
            "<g><title>{}, x,y=({:.3}, {:.3})</title>{}</g>",
            escape_xml(&node.id),
            node.x,
            node.y,
            marker_svg(cx, cy, style, theme)
        ));
        if config.show_labels {
            svg.push_str(&format!(
                "<text x=\"{cx:.2}\" y=\"{:.2}\" text-anchor=\"middle\" font-family=\"{}\" font-size=\"{}\" fill=\"{}\">{}</text>",
                cy + theme.marker_size / 2.0 + theme.font_size,
                escape_xml(&theme.font_family),
                theme.font_size,
                theme.text_color,
                escape_xml(&node.id)
            ));
        }
    }

    svg.push_str("</svg>");
    svg
}

fn marker_svg(cx: f32, cy: f32, style: &MarkerStyle, theme: &Theme) -> String {
    let radius = theme.marker_size / 2.0;
    let stroke = format!(
        "fill=\"{}\" stroke=\"{}\" stroke-width=\"{}\"",
        style.fill, theme.marker_border_color, theme.marker_border_width
    );
    match style.shape {
        MarkerShape::Circle => {
            format!("<circle cx=\"{cx:.2}\" cy=\"{cy:.2}\" r=\"{radius:.2}\" {stroke}/>")
        }
        MarkerShape::Square => format!(
            "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" {stroke}/>",
            cx - radius,
            cy - radius,
            radius * 2.0,
            radius * 2.0
        ),
        MarkerShape::Pentagon => polygon_svg(cx, cy, radius, 5, &stroke),
        MarkerShape::Hexagon => polygon_svg(cx, cy, radius, 6, &stroke),
    }
}

/// Regular polygon with one vertex pointing up.
fn polygon_svg(cx: f32, cy: f32, radius: f32, sides: usize, attrs: &str) -> String {
    let points: Vec<String> = (0..sides)
        .map(|idx| {
            let angle = -std::f32::consts::FRAC_PI_2
                + idx as f32 * std::f32::consts::TAU / sides as f32;
            format!("{:.2},{:.2}", cx + radius * angle.cos(), cy + radius * angle.sin())
        })
        .collect();
    format!("<polygon points=\"{}\" {attrs}/>", points.join(" "))
}

fn points_to_path(points: &[(f32, f32)]) -> String {
    if points.is_empty() {
        return String::new();
    }
    let mut d = String::new();
    d.push_str(&format!("M {:.2} {:.2}", points[0].0, points[0].1));
    for point in points.iter().skip(1) {
        d.push_str(&format!(" L {:.2} {:.2}", point.0, point.1));
    }
    d
}

/// Write rendered text to `output`, or stdout when no path is given.
pub fn write_output_text(text: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, text)?;
        }
        None => {
            print!("{}", text);
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
pub fn write_output_png(svg: &str, output: &Path, render_cfg: &RenderConfig, theme: &Theme) -> Result<()> {
    let mut opt = usvg::Options::default();
    if let Some(family) = theme.font_family.split(',').next() {
        opt.font_family = family.trim().trim_matches('"').to_string();
    }
    opt.default_size = usvg::Size::from_wh(render_cfg.width, render_cfg.height)
        .ok_or_else(|| anyhow::anyhow!("Invalid render size"))?;

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate pixmap"))?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap_mut);
    pixmap.save_png(output)?;
    Ok(())
}

#[cfg(not(feature = "png"))]
pub fn write_output_png(_svg: &str, _output: &Path, _render_cfg: &RenderConfig, _theme: &Theme) -> Result<()> {
    Err(anyhow::anyhow!("PNG output requires the `png` feature"))
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LayoutConfig;
    use crate::ir::{Hierarchy, Roles};
    use crate::layout::compute_layout;

    fn sample_layout() -> HierarchyLayout {
        let mut tree = Hierarchy::new();
        for (parent, child) in [("CA", "01"), ("CA", "02"), ("01", "08"), ("02", "<b>")] {
            tree.add_edge(parent, child);
        }
        compute_layout(&tree, &Roles::default(), &LayoutConfig::default()).unwrap()
    }

    #[test]
    fn render_svg_basic() {
        let layout = sample_layout();
        let svg = render_svg(&layout, &Theme::classic(), &RenderConfig::default());
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert_eq!(svg.matches("<path").count(), 4);
        assert_eq!(svg.matches("<circle").count(), 2);
        // root hexagon plus two branch pentagons
        assert_eq!(svg.matches("<polygon").count(), 3);
        assert!(svg.contains("&lt;b&gt;"));
        assert_eq!(svg.matches("<title>").count(), 5);
        assert!(svg.contains("<title>CA, x,y=(0.000, 0.800)</title>"));
        assert!(svg.contains("<title>01, x,y=(-0.500, 0.400)</title>"));
        assert!(svg.contains("<title>&lt;b&gt;, x,y="));
        assert!(svg.contains("#E5B50A"));
    }

    #[test]
    fn root_projects_to_horizontal_centre() {
        let layout = sample_layout();
        let config = RenderConfig::default();
        let view = Viewport::new(&layout, &config, 0.0);
        let (x, y) = view.project(0.0, layout.nodes["CA"].y);
        assert!((x - config.width / 2.0).abs() < 1e-3);
        assert!(y > config.margin);
        let (_, low) = view.project(0.0, layout.nodes["08"].y);
        assert!(low > y);
    }

    #[test]
    fn labels_and_frame_are_optional() {
        let layout = sample_layout();
        let config = RenderConfig {
            show_labels: false,
            show_frame: false,
            title: Some("Org & units".to_string()),
            ..RenderConfig::default()
        };
        let svg = render_svg(&layout, &Theme::modern(), &config);
        assert_eq!(svg.matches("<text").count(), 1);
        assert!(svg.contains("Org &amp; units"));
        assert_eq!(svg.matches("<rect").count(), 1);
    }
}
