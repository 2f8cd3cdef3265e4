use serde::{Deserialize, Serialize};

use crate::ir::NodeRole;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerShape {
    Circle,
    Pentagon,
    Hexagon,
    Square,
}

impl MarkerShape {
    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim().to_ascii_lowercase().as_str() {
            "circle" => Some(Self::Circle),
            "pentagon" => Some(Self::Pentagon),
            "hexagon" => Some(Self::Hexagon),
            "square" | "rect" | "rectangle" => Some(Self::Square),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkerStyle {
    pub fill: String,
    pub shape: MarkerShape,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    pub font_size: f32,
    pub text_color: String,
    pub background: String,
    pub line_color: String,
    pub line_width: f32,
    pub frame_color: String,
    pub frame_width: f32,
    pub marker_size: f32,
    pub marker_border_color: String,
    pub marker_border_width: f32,
    pub root: MarkerStyle,
    pub branch: MarkerStyle,
    pub descendant: MarkerStyle,
}

impl Theme {
    /// Grey hexagon root, amber pentagon branches, teal circles below.
    pub fn classic() -> Self {
        Self {
            font_family: "\"Open Sans\", verdana, arial, sans-serif".to_string(),
            font_size: 12.0,
            text_color: "#2A3F5F".to_string(),
            background: "#FFFFFF".to_string(),
            line_color: "#888888".to_string(),
            line_width: 0.75,
            frame_color: "#000000".to_string(),
            frame_width: 2.0,
            marker_size: 20.0,
            marker_border_color: "#FFFFFF".to_string(),
            marker_border_width: 2.0,
            root: MarkerStyle {
                fill: "#848686".to_string(),
                shape: MarkerShape::Hexagon,
            },
            branch: MarkerStyle {
                fill: "#E5B50A".to_string(),
                shape: MarkerShape::Pentagon,
            },
            descendant: MarkerStyle {
                fill: "#00AB95".to_string(),
                shape: MarkerShape::Circle,
            },
        }
    }

    pub fn modern() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            font_size: 11.0,
            text_color: "#1C2430".to_string(),
            background: "#FFFFFF".to_string(),
            line_color: "#7A8AA6".to_string(),
            line_width: 1.0,
            frame_color: "#D7E0F0".to_string(),
            frame_width: 1.0,
            marker_size: 18.0,
            marker_border_color: "#F8FAFF".to_string(),
            marker_border_width: 1.5,
            root: MarkerStyle {
                fill: "#1C2430".to_string(),
                shape: MarkerShape::Hexagon,
            },
            branch: MarkerStyle {
                fill: "#4C7DD9".to_string(),
                shape: MarkerShape::Pentagon,
            },
            descendant: MarkerStyle {
                fill: "#9DB7E8".to_string(),
                shape: MarkerShape::Circle,
            },
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "classic" | "default" | "plotly" => Some(Self::classic()),
            "modern" => Some(Self::modern()),
            _ => None,
        }
    }

    pub fn marker_for(&self, role: NodeRole) -> &MarkerStyle {
        match role {
            NodeRole::Root => &self.root,
            NodeRole::Branch => &self.branch,
            NodeRole::Descendant => &self.descendant,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::classic()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_map_to_their_markers() {
        let theme = Theme::classic();
        assert_eq!(theme.marker_for(NodeRole::Root).shape, MarkerShape::Hexagon);
        assert_eq!(theme.marker_for(NodeRole::Branch).fill, "#E5B50A");
        assert_eq!(theme.marker_for(NodeRole::Descendant).shape, MarkerShape::Circle);
    }

    #[test]
    fn named_presets() {
        assert!(Theme::from_name("plotly").is_some());
        assert!(Theme::from_name("neon").is_none());
    }
}
