//! Scene files: declarative shape stacks in YAML or JSON.
//!
//! A scene names a canvas, a list of shapes bottom to top, and optional
//! per-style pattern overrides. Anything left out falls back to a default.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use hatchery::hatch::{DEFAULT_PADDING, hatch_line_count, style_tags};
use hatchery::{BoundingBox, HatchMode, HatchPattern, Point, Shape, StyleTag};

/// A complete scene description.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scene {
    /// Scene name/title
    #[serde(default = "default_name")]
    pub name: String,

    #[serde(default)]
    pub canvas: Canvas,

    #[serde(default)]
    pub defaults: SceneDefaults,

    /// Shapes in input order; later shapes sit on top unless `z` says otherwise.
    pub shapes: Vec<ShapeSpec>,

    /// Pattern overrides keyed by style tag
    #[serde(default)]
    pub patterns: BTreeMap<u32, PatternSpec>,
}

fn default_name() -> String {
    "untitled".to_string()
}

/// Canvas/output configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Canvas {
    #[serde(default = "default_width")]
    pub width: f64,

    #[serde(default = "default_height")]
    pub height: f64,

    /// Background color (default: white)
    #[serde(default = "default_background")]
    pub background: String,
}

impl Default for Canvas {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            background: default_background(),
        }
    }
}

fn default_width() -> f64 {
    1200.0
}

fn default_height() -> f64 {
    1800.0
}

fn default_background() -> String {
    "white".to_string()
}

/// Scene-wide fallbacks.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SceneDefaults {
    /// Spacing for every style without its own override
    #[serde(default)]
    pub spacing: Option<f64>,

    /// Hatch mode name (layered, exclusive, continuous)
    #[serde(default)]
    pub mode: Option<String>,
}

/// One shape entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShapeSpec {
    /// circle, square or triangle
    #[serde(rename = "type")]
    pub kind: String,

    pub x: f64,
    pub y: f64,

    /// Diameter, side length or circumradius depending on the type
    pub size: f64,

    /// Triangle rotation in radians
    #[serde(default)]
    pub rotation: f64,

    #[serde(default)]
    pub style: u32,

    /// Stacking order; defaults to the entry's position in the list
    #[serde(default)]
    pub z: Option<i32>,
}

/// Pattern override for one style tag.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PatternSpec {
    /// Start from a named preset instead of the style's default
    #[serde(default)]
    pub preset: Option<String>,

    #[serde(default)]
    pub angles: Option<Vec<f64>>,

    #[serde(default)]
    pub spacing: Option<f64>,
}

impl Scene {
    /// Load a scene, picking the parser from the file extension.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read scene {}", path.display()))?;

        let extension = path.extension().and_then(|e| e.to_str()).map(str::to_lowercase);
        let scene = match extension.as_deref() {
            Some("json") => Self::from_json(&content),
            Some("yaml") | Some("yml") => Self::from_yaml(&content),
            _ => anyhow::bail!(
                "unknown scene format for {} (use .yaml, .yml or .json)",
                path.display()
            ),
        };
        scene.with_context(|| format!("failed to parse scene {}", path.display()))
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Build the shape list. Errors name the offending entry.
    pub fn to_shapes(&self) -> Result<Vec<Shape>> {
        self.shapes
            .iter()
            .enumerate()
            .map(|(i, spec)| {
                let center = Point::new(spec.x, spec.y);
                let shape = Shape::from_tag(&spec.kind, center, spec.size, spec.rotation)
                    .with_context(|| format!("shape {} in scene", i))?;
                Ok(shape
                    .with_z_index(spec.z.unwrap_or(i as i32))
                    .with_style(StyleTag(spec.style)))
            })
            .collect()
    }

    /// Mode from the scene defaults, falling back to continuous.
    pub fn mode(&self) -> Result<HatchMode> {
        match &self.defaults.mode {
            Some(name) => parse_mode(name),
            None => Ok(HatchMode::default()),
        }
    }

    /// Resolved pattern for a style tag: preset, then scene spacing, then
    /// the style's own override.
    pub fn pattern_for(&self, style: StyleTag) -> HatchPattern {
        let spec = self.patterns.get(&style.0);

        let mut pattern = spec
            .and_then(|s| s.preset.as_deref())
            .and_then(HatchPattern::from_name)
            .unwrap_or_else(|| HatchPattern::for_style(style));

        if let Some(spacing) = self.defaults.spacing {
            pattern.spacing = spacing;
        }
        if let Some(spec) = spec {
            if let Some(angles) = &spec.angles {
                pattern.angles = angles.clone();
            }
            if let Some(spacing) = spec.spacing {
                pattern.spacing = spacing;
            }
        }
        pattern
    }

    /// Check every pattern before any work is done: presets must exist and
    /// each style used by `shapes` needs usable angles and a spacing that
    /// keeps its line count bounded.
    pub fn validate_patterns(&self, shapes: &[Shape]) -> Result<()> {
        for (style, spec) in &self.patterns {
            if let Some(name) = &spec.preset {
                if HatchPattern::from_name(name).is_none() {
                    anyhow::bail!("unknown pattern preset {:?} for style {}", name, style);
                }
            }
        }

        for tag in style_tags(shapes) {
            let pattern = self.pattern_for(tag);
            check_pattern(shapes, tag, &pattern)
                .with_context(|| format!("invalid pattern for style {}", tag.0))?;
        }
        Ok(())
    }
}

fn check_pattern(shapes: &[Shape], tag: StyleTag, pattern: &HatchPattern) -> Result<()> {
    let spacing = pattern.spacing;
    if !(spacing.is_finite() && spacing > 0.0) {
        anyhow::bail!("spacing must be a positive number, got {}", spacing);
    }
    if pattern.angles.is_empty() {
        anyhow::bail!("angles must not be empty");
    }
    if let Some(angle) = pattern.angles.iter().find(|a| !a.is_finite()) {
        anyhow::bail!("angle {} is not a finite number", angle);
    }

    // The group region covers every per-shape region of the style
    let boxes = shapes.iter().filter(|s| s.style == tag).map(Shape::bounding_box);
    if let Some(region) = BoundingBox::union_all(boxes) {
        if hatch_line_count(&region.padded(DEFAULT_PADDING), spacing).is_none() {
            anyhow::bail!("spacing {} is too small for shapes of this size", spacing);
        }
    }
    Ok(())
}

pub fn parse_mode(name: &str) -> Result<HatchMode> {
    HatchMode::from_name(name).with_context(|| {
        let known: Vec<&str> = HatchMode::ALL.iter().map(|m| m.name()).collect();
        format!("unknown hatch mode {:?} (expected one of: {})", name, known.join(", "))
    })
}

/// The fixed five-shape scenario: an overlapping stack with one of each
/// style tag 0..=4 and z-index following input order.
pub fn demo_scene() -> Scene {
    let entry = |kind: &str, x: f64, y: f64, size: f64, rotation: f64, i: u32| ShapeSpec {
        kind: kind.to_string(),
        x,
        y,
        size,
        rotation,
        style: i,
        z: Some(i as i32),
    };

    Scene {
        name: "demo".to_string(),
        canvas: Canvas::default(),
        defaults: SceneDefaults::default(),
        shapes: vec![
            entry("square", 300.0, 300.0, 400.0, 0.0, 0),
            entry("circle", 800.0, 300.0, 200.0, 0.0, 1),
            entry("circle", 350.0, 550.0, 100.0, 0.0, 2),
            entry("triangle", 800.0, 900.0, 350.0, 0.0, 3),
            entry("square", 800.0, 1200.0, 300.0, 0.0, 4),
        ],
        patterns: BTreeMap::new(),
    }
}

// ============================================================================
// TESTS
// ============================================================================
