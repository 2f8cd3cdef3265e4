#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod ir;
pub mod layout;
pub mod layout_dump;
#[cfg(feature = "cli")]
pub mod logging;
pub mod parser;
pub mod render;
pub mod theme;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{Config, LayoutConfig, RenderConfig, load_config};
pub use ir::{Hierarchy, NodeRole, Roles, Side};
pub use layout::{HierarchyLayout, LayoutError, NodePosition, compute_layout, layout};
pub use parser::{InputFormat, ParseError, parse_hierarchy};
pub use render::render_svg;
pub use theme::Theme;
