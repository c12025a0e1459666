//! Hatch, outline and demo commands.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use serde::Serialize;

use hatchery::chain::{ChainStats, chain_segments};
use hatchery::svg::{assemble_scene_document, outline_paths};
use hatchery::{
    ChainConfig, ExportOptions, HatchMode, Line, OutlineStyle, Segment, Shape, StyleTag,
    SvgDocument, hatch_scene, silhouette,
};

use super::render::write_preview;
use super::scene::{Scene, demo_scene};

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Svg,
    Json,
}

impl OutputFormat {
    fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Svg => "svg",
            OutputFormat::Json => "json",
        }
    }
}

/// Hatch mode as a command-line value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    /// Hatch every shape fully, overlaps show both fills
    Layered,
    /// Hide what lies under later shapes
    Exclusive,
    /// Shared lines per style group, covered parts hidden
    Continuous,
}

impl From<ModeArg> for HatchMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Layered => HatchMode::Layered,
            ModeArg::Exclusive => HatchMode::Exclusive,
            ModeArg::Continuous => HatchMode::Continuous,
        }
    }
}

/// Outline layer as a command-line value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutlineArg {
    /// One line element per silhouette piece
    Lines,
    /// Pieces chained into paths
    Paths,
    /// No outline layer
    None,
}

impl From<OutlineArg> for OutlineStyle {
    fn from(outline: OutlineArg) -> Self {
        match outline {
            OutlineArg::Lines => OutlineStyle::Lines,
            OutlineArg::Paths => OutlineStyle::Paths,
            OutlineArg::None => OutlineStyle::None,
        }
    }
}

#[derive(Debug, Args)]
pub struct HatchArgs {
    /// Scene file (.yaml, .yml or .json)
    pub scene: PathBuf,

    /// Output file, `-` for stdout (default: plotter_hatching_<timestamp>.<ext>)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Hatch mode (overrides the scene)
    #[arg(short, long, value_enum)]
    pub mode: Option<ModeArg>,

    #[arg(short, long, value_enum, default_value_t = OutputFormat::Svg)]
    pub format: OutputFormat,

    /// Outline layer
    #[arg(long, value_enum, default_value_t = OutlineArg::Paths)]
    pub outline: OutlineArg,

    /// Clip each style group to its own shapes
    #[arg(long)]
    pub clip: bool,

    /// Also write a PNG preview of the SVG
    #[arg(long)]
    pub preview: Option<PathBuf>,

    /// Leave out the background rectangle
    #[arg(long)]
    pub no_background: bool,

    /// Max endpoint distance when chaining outline paths
    #[arg(long, default_value_t = 0.1)]
    pub chain_tolerance: f64,
}

#[derive(Debug, Args)]
pub struct OutlineArgs {
    /// Scene file (.yaml, .yml or .json)
    pub scene: PathBuf,

    /// Output file, `-` for stdout (default: plotter_hatching_<timestamp>.<ext>)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    #[arg(short, long, value_enum, default_value_t = OutputFormat::Svg)]
    pub format: OutputFormat,

    /// Write raw segments instead of chained paths
    #[arg(long)]
    pub raw: bool,

    /// Max endpoint distance when chaining
    #[arg(long, default_value_t = 0.1)]
    pub chain_tolerance: f64,
}

#[derive(Debug, Args)]
pub struct DemoArgs {
    /// Output file, `-` for stdout (default: plotter_hatching_<timestamp>.svg)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Hatch mode
    #[arg(short, long, value_enum)]
    pub mode: Option<ModeArg>,

    /// Also write a PNG preview
    #[arg(long)]
    pub preview: Option<PathBuf>,
}

// ============================================================================
// JSON OUTPUT
// ============================================================================

/// A line in JSON output format.
#[derive(Serialize)]
struct JsonLine {
    x1: f64,
    y1: f64,
    x2: f64,
    y2: f64,
}

impl From<&Line> for JsonLine {
    fn from(l: &Line) -> Self {
        JsonLine { x1: l.x1, y1: l.y1, x2: l.x2, y2: l.y2 }
    }
}

/// A point in JSON output format.
#[derive(Serialize)]
struct JsonPoint {
    x: f64,
    y: f64,
}

/// Hatch lines of one style tag.
#[derive(Serialize)]
struct JsonGroup {
    style: u32,
    pattern: String,
    angles: Vec<f64>,
    spacing: f64,
    lines: Vec<JsonLine>,
}

#[derive(Serialize)]
struct JsonHatchOutput {
    name: String,
    mode: &'static str,
    width: f64,
    height: f64,
    groups: Vec<JsonGroup>,
    outline: Vec<JsonLine>,
}

/// A silhouette piece, remembering the shape it came from.
#[derive(Serialize)]
struct JsonSegment {
    x1: f64,
    y1: f64,
    x2: f64,
    y2: f64,
    parent: usize,
}

impl From<&Segment> for JsonSegment {
    fn from(s: &Segment) -> Self {
        JsonSegment { x1: s.start.x, y1: s.start.y, x2: s.end.x, y2: s.end.y, parent: s.parent }
    }
}

/// Chaining statistics for JSON output.
#[derive(Serialize)]
struct JsonChainStats {
    input_lines: usize,
    output_chains: usize,
    reduction_percent: f64,
    avg_chain_length: f64,
}

#[derive(Serialize)]
struct JsonOutlineOutput {
    name: String,
    segments: Vec<JsonSegment>,
    chains: Vec<Vec<JsonPoint>>,
    chain_stats: JsonChainStats,
}

// ============================================================================
// COMMANDS
// ============================================================================

/// Settings shared by `hatch` and `demo`.
struct RenderSettings<'a> {
    mode: HatchMode,
    format: OutputFormat,
    outline: OutlineStyle,
    clip: bool,
    background: bool,
    chain_tolerance: f64,
    output: Option<&'a Path>,
    preview: Option<&'a Path>,
}

/// Execute the hatch command.
pub fn cmd_hatch(args: &HatchArgs) -> Result<()> {
    eprintln!("Loading: {}", args.scene.display());
    let scene = Scene::load(&args.scene)?;

    let mode = match args.mode {
        Some(mode) => mode.into(),
        None => scene.mode()?,
    };

    run_scene(
        &scene,
        &RenderSettings {
            mode,
            format: args.format,
            outline: args.outline.into(),
            clip: args.clip,
            background: !args.no_background,
            chain_tolerance: args.chain_tolerance,
            output: args.output.as_deref(),
            preview: args.preview.as_deref(),
        },
    )
}

/// Execute the demo command on the built-in five-shape scene.
pub fn cmd_demo(args: &DemoArgs) -> Result<()> {
    let scene = demo_scene();
    let mode = match args.mode {
        Some(mode) => mode.into(),
        None => scene.mode()?,
    };
    eprintln!("Demo scene: {} shapes", scene.shapes.len());

    run_scene(
        &scene,
        &RenderSettings {
            mode,
            format: OutputFormat::Svg,
            outline: OutlineStyle::Paths,
            clip: false,
            background: true,
            chain_tolerance: ChainConfig::default().tolerance,
            output: args.output.as_deref(),
            preview: args.preview.as_deref(),
        },
    )
}

fn run_scene(scene: &Scene, settings: &RenderSettings) -> Result<()> {
    let shapes = scene.to_shapes()?;
    scene.validate_patterns(&shapes)?;
    eprintln!(
        "Scene '{}': {} shapes, {} canvas {}x{}",
        scene.name,
        shapes.len(),
        settings.mode.name(),
        scene.canvas.width,
        scene.canvas.height
    );

    let start = Instant::now();
    let groups = hatch_scene(&shapes, settings.mode, |tag| scene.pattern_for(tag));
    let outline = match settings.outline {
        OutlineStyle::None => Vec::new(),
        OutlineStyle::Lines | OutlineStyle::Paths => silhouette(&shapes),
    };
    let total: usize = groups.iter().map(|(_, lines)| lines.len()).sum();
    eprintln!(
        "Generated {} hatch lines in {} groups in {:?}",
        total,
        groups.len(),
        start.elapsed()
    );

    let json = match settings.format {
        OutputFormat::Json => Some(hatch_json(scene, &groups, &outline, settings)?),
        OutputFormat::Svg => None,
    };

    // The SVG is only needed as output or as the preview source
    let svg = if json.is_none() || settings.preview.is_some() {
        let mut options = ExportOptions::new(scene.canvas.width, scene.canvas.height);
        options.mode = settings.mode;
        options.outline = settings.outline;
        options.clip_groups = settings.clip;
        options.chain = ChainConfig::with_tolerance(settings.chain_tolerance);
        options.background = settings.background.then(|| scene.canvas.background.clone());
        Some(assemble_scene_document(&shapes, groups, &outline, &options).render()?)
    } else {
        None
    };

    if let Some(content) = json.as_ref().or(svg.as_ref()) {
        write_output(content, settings.output, settings.format)?;
    }
    if let (Some(preview), Some(svg)) = (settings.preview, &svg) {
        write_preview(svg, preview)?;
    }
    Ok(())
}

fn hatch_json(
    scene: &Scene,
    groups: &[(StyleTag, Vec<Line>)],
    outline: &[Segment],
    settings: &RenderSettings,
) -> Result<String> {
    let groups = groups
        .iter()
        .map(|(tag, lines)| {
            let pattern = scene.pattern_for(*tag);
            JsonGroup {
                style: tag.0,
                pattern: pattern.name,
                angles: pattern.angles,
                spacing: pattern.spacing,
                lines: lines.iter().map(JsonLine::from).collect(),
            }
        })
        .collect();

    let output = JsonHatchOutput {
        name: scene.name.clone(),
        mode: settings.mode.name(),
        width: scene.canvas.width,
        height: scene.canvas.height,
        groups,
        outline: outline.iter().map(|s| JsonLine::from(&s.to_line())).collect(),
    };
    serde_json::to_string(&output).context("failed to serialize JSON")
}

/// Execute the outline command: silhouette only, no hatching.
pub fn cmd_outline(args: &OutlineArgs) -> Result<()> {
    eprintln!("Loading: {}", args.scene.display());
    let scene = Scene::load(&args.scene)?;
    let shapes = scene.to_shapes()?;

    let start = Instant::now();
    let segments = silhouette(&shapes);
    let config = ChainConfig::with_tolerance(args.chain_tolerance);
    eprintln!("Silhouette: {} segments in {:?}", segments.len(), start.elapsed());

    let content = match args.format {
        OutputFormat::Svg => {
            let mut doc = SvgDocument::new(scene.canvas.width, scene.canvas.height)
                .with_background(Some(scene.canvas.background.clone()));
            if args.raw {
                doc.set_outline_lines(segments.iter().map(Segment::to_line).collect());
            } else {
                doc.set_outline_paths(outline_paths(&segments, &config));
            }
            doc.render()?
        }
        OutputFormat::Json => {
            let lines: Vec<Line> = segments.iter().map(Segment::to_line).collect();
            let chains = chain_segments(&lines, &config);
            let stats = ChainStats::from_chains(lines.len(), &chains);
            eprintln!(
                "Chained {} segments into {} paths ({:.0}% fewer pen lifts)",
                stats.input_lines,
                stats.output_chains,
                stats.reduction_ratio * 100.0
            );

            let output = JsonOutlineOutput {
                name: scene.name.clone(),
                segments: segments.iter().map(JsonSegment::from).collect(),
                chains: chains
                    .iter()
                    .map(|c| c.iter().map(|p| JsonPoint { x: p.x, y: p.y }).collect())
                    .collect(),
                chain_stats: JsonChainStats {
                    input_lines: stats.input_lines,
                    output_chains: stats.output_chains,
                    reduction_percent: stats.reduction_ratio * 100.0,
                    avg_chain_length: stats.avg_chain_length,
                },
            };
            serde_json::to_string(&output).context("failed to serialize JSON")?
        }
    };

    write_output(&content, args.output.as_deref(), args.format)
}

// ============================================================================
// OUTPUT
// ============================================================================

/// `plotter_hatching_<YYYYMMDD_HHMMSS>.<ext>` in the working directory.
pub fn default_output_path(format: OutputFormat) -> PathBuf {
    let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    PathBuf::from(format!("plotter_hatching_{}.{}", stamp, format.extension()))
}

fn write_output(content: &str, output: Option<&Path>, format: OutputFormat) -> Result<()> {
    let path = match output {
        Some(p) if p == Path::new("-") => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(content.as_bytes()).context("failed to write to stdout")?;
            return stdout.flush().context("failed to write to stdout");
        }
        Some(p) => p.to_path_buf(),
        None => default_output_path(format),
    };

    fs::write(&path, content).with_context(|| format!("failed to write {}", path.display()))?;
    eprintln!("Wrote: {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_output_is_timestamped() {
        let path = default_output_path(OutputFormat::Svg);
        let name = path.to_str().unwrap();
        assert!(name.starts_with("plotter_hatching_"));
        assert!(name.ends_with(".svg"));
        // plotter_hatching_ + YYYYMMDD_HHMMSS + .svg
        assert_eq!(name.len(), "plotter_hatching_".len() + 15 + 4);
    }

    #[test]
    fn json_extension_follows_format() {
        assert!(default_output_path(OutputFormat::Json).to_str().unwrap().ends_with(".json"));
    }
}
