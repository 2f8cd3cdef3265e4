use crate::config::{Config, load_config};
use crate::ir::{Hierarchy, Side};
use crate::layout::compute_layout;
use crate::layout_dump::{LayoutDump, write_layout_dump};
use crate::logging::setup_logging;
use crate::parser::{InputFormat, parse_hierarchy, to_node_link_json};
use crate::render::{render_svg, write_output_png, write_output_text};
use anyhow::{Context, Result};
use clap::{ArgAction, Parser, ValueEnum};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "hlay", version, about = "Two-sided layout and rendering for hierarchy trees")]
pub struct Args {
    /// Input file (.csv parent/child table or .json node-link graph), or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file. Defaults to stdout for SVG and JSON output.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "svg")]
    pub output_format: OutputFormat,

    /// Config JSON file
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Root node id
    #[arg(long)]
    pub root: Option<String>,

    /// Branch root laid out on the left
    #[arg(long = "branch-a")]
    pub branch_a: Option<String>,

    /// Branch root laid out on the right
    #[arg(long = "branch-b")]
    pub branch_b: Option<String>,

    /// Side for nodes equally far from both branch roots
    #[arg(long = "tie-side", value_parser = parse_side)]
    pub tie_side: Option<Side>,

    /// Diagram title
    #[arg(short = 't', long)]
    pub title: Option<String>,

    /// Width
    #[arg(short = 'w', long = "width")]
    pub width: Option<f32>,

    /// Height
    #[arg(short = 'H', long = "height")]
    pub height: Option<f32>,

    /// Log verbosity, repeat for more (-d info, -dd debug, -ddd trace)
    #[arg(short = 'd', long = "debug", action = ArgAction::Count)]
    pub debug: u8,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Svg,
    Png,
    /// Computed positions, spans and canvas sizes
    Json,
    /// The input hierarchy as a node-link graph
    NodeLink,
}

fn parse_side(token: &str) -> Result<Side, String> {
    Side::from_token(token).ok_or_else(|| format!("expected `a` or `b`, got `{token}`"))
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    setup_logging(args.debug);

    let mut config = load_config(args.config.as_deref())?;
    apply_args(&mut config, &args);

    let tree = read_hierarchy(args.input.as_deref())?;
    let lay_out = || {
        let layout = compute_layout(&tree, &config.roles, &config.layout)
            .context("Failed to lay out hierarchy")?;
        tracing::info!(
            nodes = layout.nodes.len(),
            canvas_a = layout.canvas.a,
            canvas_b = layout.canvas.b,
            "layout complete"
        );
        anyhow::Ok(layout)
    };

    match args.output_format {
        OutputFormat::Svg => {
            let svg = render_svg(&lay_out()?, &config.theme, &config.render);
            write_output_text(&svg, args.output.as_deref())?;
        }
        OutputFormat::Png => {
            let output = ensure_output(&args.output, "png")?;
            let svg = render_svg(&lay_out()?, &config.theme, &config.render);
            write_output_png(&svg, &output, &config.render, &config.theme)?;
        }
        OutputFormat::Json => {
            let layout = lay_out()?;
            match args.output.as_deref() {
                Some(path) => write_layout_dump(path, &layout, &config.roles)?,
                None => println!("{}", LayoutDump::from_layout(&layout, &config.roles).to_json()?),
            }
        }
        OutputFormat::NodeLink => {
            let json = to_node_link_json(&tree)?;
            write_output_text(&json, args.output.as_deref())?;
        }
    }
    Ok(())
}

fn apply_args(config: &mut Config, args: &Args) {
    if let Some(root) = &args.root {
        config.roles.root = root.clone();
    }
    if let Some(branch) = &args.branch_a {
        config.roles.branch_a = branch.clone();
    }
    if let Some(branch) = &args.branch_b {
        config.roles.branch_b = branch.clone();
    }
    if let Some(side) = args.tie_side {
        config.layout.tie_side = side;
    }
    if let Some(title) = &args.title {
        config.render.title = Some(title.clone());
    }
    if let Some(width) = args.width {
        config.render.width = width;
    }
    if let Some(height) = args.height {
        config.render.height = height;
    }
}

fn read_hierarchy(path: Option<&Path>) -> Result<Hierarchy> {
    let (input, format) = match path {
        Some(path) if path != Path::new("-") => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let format = InputFormat::from_path(path).unwrap_or_else(|| InputFormat::sniff(&content));
            (content, format)
        }
        _ => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            let format = InputFormat::sniff(&buf);
            (buf, format)
        }
    };
    Ok(parse_hierarchy(&input, format)?)
}

fn ensure_output(output: &Option<PathBuf>, ext: &str) -> Result<PathBuf> {
    if let Some(path) = output {
        return Ok(path.clone());
    }
    Err(anyhow::anyhow!("Output path required for {} output", ext))
}
