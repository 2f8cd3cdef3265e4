use crate::ir::{Roles, Side};
use crate::theme::{MarkerShape, Theme};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Visual constants of the two-sided hierarchy layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Rows wider than this grow the side's canvas linearly.
    pub row_width_threshold: usize,
    /// Canvas units per node once a side's widest row exceeds the threshold.
    pub scale_factor: f32,
    /// Canvas of a side whose widest row stays within the threshold.
    pub min_canvas: f32,
    pub root_y: f32,
    pub branch_y: f32,
    pub branch_offset_x: f32,
    /// Height of the first descendant row (level 2).
    pub first_tier_y: f32,
    /// Vertical distance between consecutive descendant rows.
    pub level_height: f32,
    /// Fraction of a side's canvas given to its top slot, measured outward
    /// from the centre line.
    pub side_span_ratio: f32,
    /// Side assigned to nodes at equal distance from both branch roots.
    pub tie_side: Side,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            row_width_threshold: 4,
            scale_factor: 0.25,
            min_canvas: 1.0,
            root_y: 0.8,
            branch_y: 0.4,
            branch_offset_x: 0.5,
            first_tier_y: -0.4,
            level_height: 0.4,
            side_span_ratio: 0.5,
            tie_side: Side::B,
        }
    }
}

impl LayoutConfig {
    pub fn canvas_for_row_width(&self, row_width: usize) -> f32 {
        if row_width > self.row_width_threshold {
            self.scale_factor * row_width as f32
        } else {
            self.min_canvas
        }
    }

    /// Reject values that break canvas sizing, containment or row ordering.
    /// Keys are reported by their config-file names.
    pub fn validate(&self) -> anyhow::Result<()> {
        if !(self.scale_factor > 0.0) {
            anyhow::bail!("layout.scaleFactor must be positive, got {}", self.scale_factor);
        }
        if !(self.min_canvas > 0.0) {
            anyhow::bail!("layout.minCanvas must be positive, got {}", self.min_canvas);
        }
        if !(self.level_height > 0.0) {
            anyhow::bail!("layout.levelHeight must be positive, got {}", self.level_height);
        }
        if !(self.side_span_ratio > 0.0 && self.side_span_ratio <= 1.0) {
            anyhow::bail!(
                "layout.sideSpanRatio must be in (0, 1], got {}",
                self.side_span_ratio
            );
        }
        if !(self.branch_offset_x > 0.0 && self.branch_offset_x < self.min_canvas) {
            anyhow::bail!(
                "layout.branchOffsetX must be in (0, minCanvas), got {}",
                self.branch_offset_x
            );
        }
        Ok(())
    }

    /// Vertical band of a level.
    pub fn level_y(&self, level: usize) -> f32 {
        match level {
            0 => self.root_y,
            1 => self.branch_y,
            _ => self.first_tier_y - self.level_height * (level - 2) as f32,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    pub width: f32,
    pub height: f32,
    /// Padding around the plotted area, in pixels.
    pub margin: f32,
    /// Extra room above and below the outermost rows, in layout units.
    pub vertical_padding: f32,
    pub show_labels: bool,
    pub show_frame: bool,
    pub title: Option<String>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 800.0,
            margin: 40.0,
            vertical_padding: 0.2,
            show_labels: true,
            show_frame: true,
            title: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub theme: Theme,
    pub roles: Roles,
    pub layout: LayoutConfig,
    pub render: RenderConfig,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ThemeVariables {
    font_family: Option<String>,
    font_size: Option<f32>,
    text_color: Option<String>,
    background: Option<String>,
    line_color: Option<String>,
    line_width: Option<f32>,
    frame_color: Option<String>,
    marker_size: Option<f32>,
    marker_border_color: Option<String>,
    root_color: Option<String>,
    root_shape: Option<String>,
    branch_color: Option<String>,
    branch_shape: Option<String>,
    descendant_color: Option<String>,
    descendant_shape: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct LayoutConfigFile {
    row_width_threshold: Option<usize>,
    scale_factor: Option<f32>,
    min_canvas: Option<f32>,
    root_y: Option<f32>,
    branch_y: Option<f32>,
    branch_offset_x: Option<f32>,
    first_tier_y: Option<f32>,
    level_height: Option<f32>,
    side_span_ratio: Option<f32>,
    tie_side: Option<Side>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct RolesFile {
    root: Option<String>,
    branch_a: Option<String>,
    branch_b: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct RenderConfigFile {
    width: Option<f32>,
    height: Option<f32>,
    margin: Option<f32>,
    vertical_padding: Option<f32>,
    show_labels: Option<bool>,
    show_frame: Option<bool>,
    title: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<String>,
    theme_variables: Option<ThemeVariables>,
    roles: Option<RolesFile>,
    layout: Option<LayoutConfigFile>,
    render: Option<RenderConfigFile>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    parse_config(&contents).with_context(|| format!("parsing config {}", path.display()))
}

/// Parse a config document. Strict JSON is tried first, then JSON5 so files
/// may carry comments and trailing commas.
pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let parsed: ConfigFile = match serde_json::from_str(contents) {
        Ok(parsed) => parsed,
        Err(json_err) => json5::from_str(contents).map_err(|_| json_err)?,
    };
    let mut config = Config::default();

    if let Some(name) = parsed.theme.as_deref() {
        match Theme::from_name(name) {
            Some(theme) => config.theme = theme,
            None => tracing::warn!(theme = name, "unknown theme, keeping default"),
        }
    }

    if let Some(vars) = parsed.theme_variables {
        apply_theme_variables(&mut config.theme, vars);
    }

    if let Some(roles) = parsed.roles {
        if let Some(v) = roles.root {
            config.roles.root = v;
        }
        if let Some(v) = roles.branch_a {
            config.roles.branch_a = v;
        }
        if let Some(v) = roles.branch_b {
            config.roles.branch_b = v;
        }
    }

    if let Some(layout) = parsed.layout {
        if let Some(v) = layout.row_width_threshold {
            config.layout.row_width_threshold = v;
        }
        if let Some(v) = layout.scale_factor {
            config.layout.scale_factor = v;
        }
        if let Some(v) = layout.min_canvas {
            config.layout.min_canvas = v;
        }
        if let Some(v) = layout.root_y {
            config.layout.root_y = v;
        }
        if let Some(v) = layout.branch_y {
            config.layout.branch_y = v;
        }
        if let Some(v) = layout.branch_offset_x {
            config.layout.branch_offset_x = v;
        }
        if let Some(v) = layout.first_tier_y {
            config.layout.first_tier_y = v;
        }
        if let Some(v) = layout.level_height {
            config.layout.level_height = v;
        }
        if let Some(v) = layout.side_span_ratio {
            config.layout.side_span_ratio = v;
        }
        if let Some(v) = layout.tie_side {
            config.layout.tie_side = v;
        }
    }

    config.layout.validate()?;

    if let Some(render) = parsed.render {
        if let Some(v) = render.width {
            config.render.width = v;
        }
        if let Some(v) = render.height {
            config.render.height = v;
        }
        if let Some(v) = render.margin {
            config.render.margin = v;
        }
        if let Some(v) = render.vertical_padding {
            config.render.vertical_padding = v;
        }
        if let Some(v) = render.show_labels {
            config.render.show_labels = v;
        }
        if let Some(v) = render.show_frame {
            config.render.show_frame = v;
        }
        if render.title.is_some() {
            config.render.title = render.title;
        }
    }

    Ok(config)
}

fn apply_theme_variables(theme: &mut Theme, vars: ThemeVariables) {
    if let Some(v) = vars.font_family {
        theme.font_family = v;
    }
    if let Some(v) = vars.font_size {
        theme.font_size = v;
    }
    if let Some(v) = vars.text_color {
        theme.text_color = v;
    }
    if let Some(v) = vars.background {
        theme.background = v;
    }
    if let Some(v) = vars.line_color {
        theme.line_color = v;
    }
    if let Some(v) = vars.line_width {
        theme.line_width = v;
    }
    if let Some(v) = vars.frame_color {
        theme.frame_color = v;
    }
    if let Some(v) = vars.marker_size {
        theme.marker_size = v;
    }
    if let Some(v) = vars.marker_border_color {
        theme.marker_border_color = v;
    }
    if let Some(v) = vars.root_color {
        theme.root.fill = v;
    }
    if let Some(v) = vars.branch_color {
        theme.branch.fill = v;
    }
    if let Some(v) = vars.descendant_color {
        theme.descendant.fill = v;
    }
    if let Some(shape) = vars.root_shape.as_deref().and_then(MarkerShape::from_token) {
        theme.root.shape = shape;
    }
    if let Some(shape) = vars.branch_shape.as_deref().and_then(MarkerShape::from_token) {
        theme.branch.shape = shape;
    }
    if let Some(shape) = vars.descendant_shape.as_deref().and_then(MarkerShape::from_token) {
        theme.descendant.shape = shape;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canvas_grows_only_past_threshold() {
        let config = LayoutConfig::default();
        assert_eq!(config.canvas_for_row_width(0), 1.0);
        assert_eq!(config.canvas_for_row_width(4), 1.0);
        assert_eq!(config.canvas_for_row_width(5), 1.25);
        assert_eq!(config.canvas_for_row_width(8), 2.0);
    }

    #[test]
    fn level_bands_descend() {
        let config = LayoutConfig::default();
        assert_eq!(config.level_y(0), 0.8);
        assert_eq!(config.level_y(1), 0.4);
        assert!((config.level_y(2) + 0.4).abs() < 1e-6);
        assert!((config.level_y(3) + 0.8).abs() < 1e-6);
    }

    #[test]
    fn parses_partial_config() {
        let config = parse_config(
            r#"{
                "theme": "modern",
                "roles": { "root": "HQ" },
                "layout": { "scaleFactor": 0.3, "tieSide": "a" },
                "themeVariables": { "branchShape": "square" }
            }"#,
        )
        .unwrap();
        assert_eq!(config.roles.root, "HQ");
        assert_eq!(config.roles.branch_a, "01");
        assert_eq!(config.layout.scale_factor, 0.3);
        assert_eq!(config.layout.tie_side, Side::A);
        assert_eq!(config.layout.row_width_threshold, 4);
        assert_eq!(config.theme.branch.shape, MarkerShape::Square);
        assert_eq!(config.theme.line_color, Theme::modern().line_color);
    }

    #[test]
    fn accepts_json5_comments() {
        let config = parse_config(
            "{\n  // wider rows before scaling\n  layout: { rowWidthThreshold: 6, },\n}",
        )
        .unwrap();
        assert_eq!(config.layout.row_width_threshold, 6);
    }

    #[test]
    fn default_layout_config_is_valid() {
        assert!(LayoutConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_out_of_range_layout_values() {
        for (body, key) in [
            (r#"{"layout": {"sideSpanRatio": 1.5}}"#, "sideSpanRatio"),
            (r#"{"layout": {"sideSpanRatio": 0}}"#, "sideSpanRatio"),
            (r#"{"layout": {"levelHeight": 0}}"#, "levelHeight"),
            (r#"{"layout": {"levelHeight": -0.4}}"#, "levelHeight"),
            (r#"{"layout": {"scaleFactor": 0}}"#, "scaleFactor"),
            (r#"{"layout": {"minCanvas": -1}}"#, "minCanvas"),
            (r#"{"layout": {"branchOffsetX": 1.0}}"#, "branchOffsetX"),
        ] {
            let err = parse_config(body).unwrap_err();
            assert!(err.to_string().contains(key), "{body}: {err}");
        }
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_config("not a config").is_err());
    }
}
