//! Hatch line generation with z-order aware occlusion.
//!
//! A family of parallel lines is laid over a region, each line is cut into
//! chords where it crosses a shape's outline, and chords that sit underneath
//! a shape drawn later are dropped. The output is plain geometry, ready for a
//! plotter.

use std::f64::consts::PI;

use crate::clip::{line_polygon_intersections, point_in_polygon};
use crate::geometry::{BoundingBox, Line, Point, Polygon};
use crate::shape::{Shape, StyleTag};

/// Padding added around the hatch region so lines fully cross it.
pub const DEFAULT_PADDING: f64 = 100.0;

/// Hits closer than this along one line count as a single crossing.
/// A line through a vertex touches both adjacent edges.
pub const DEDUP_EPSILON: f64 = 1e-7;

/// Upper bound on candidate lines in one family. A spacing so small that a
/// region needs more than this yields no lines at all.
pub const MAX_HATCH_LINES: usize = 200_000;

/// Which box the line family is laid over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HatchRegion {
    /// Each shape gets its own family over its bounding box.
    #[default]
    PerShape,
    /// One family over the union box of all hatched shapes, so lines run
    /// continuously across every shape in the group.
    Group,
}

/// Parameters for one hatch pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HatchOptions {
    /// Line direction in degrees.
    pub angle_degrees: f64,
    /// Perpendicular distance between lines, in shape units.
    pub spacing: f64,
    /// Drop chords hidden under a shape with a higher z-index.
    pub occlusion: bool,
    pub region: HatchRegion,
    pub padding: f64,
}

impl HatchOptions {
    pub fn new(angle_degrees: f64, spacing: f64) -> Self {
        Self {
            angle_degrees,
            spacing,
            occlusion: true,
            region: HatchRegion::PerShape,
            padding: DEFAULT_PADDING,
        }
    }

    pub fn with_occlusion(mut self, occlusion: bool) -> Self {
        self.occlusion = occlusion;
        self
    }

    pub fn with_region(mut self, region: HatchRegion) -> Self {
        self.region = region;
        self
    }

    pub fn with_padding(mut self, padding: f64) -> Self {
        self.padding = padding;
        self
    }
}

/// Render modes of the original sketches, expressed as hatch configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HatchMode {
    /// Every shape hatched in full, overlaps stack up.
    Layered,
    /// Per-shape families, hidden chords removed.
    Exclusive,
    /// One family per style group, hidden chords removed.
    #[default]
    Continuous,
}

impl HatchMode {
    pub const ALL: [HatchMode; 3] =
        [HatchMode::Layered, HatchMode::Exclusive, HatchMode::Continuous];

    pub fn name(&self) -> &'static str {
        match self {
            HatchMode::Layered => "layered",
            HatchMode::Exclusive => "exclusive",
            HatchMode::Continuous => "continuous",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.name().eq_ignore_ascii_case(name.trim()))
    }

    pub fn description(&self) -> &'static str {
        match self {
            HatchMode::Layered => "hatch every shape fully, overlaps show both fills",
            HatchMode::Exclusive => "hatch each shape, hide what lies under later shapes",
            HatchMode::Continuous => "hatch style groups with shared lines, hide covered parts",
        }
    }

    /// Options for one angle of a pattern in this mode.
    pub fn options(&self, angle_degrees: f64, spacing: f64) -> HatchOptions {
        let base = HatchOptions::new(angle_degrees, spacing);
        match self {
            HatchMode::Layered => base.with_occlusion(false),
            HatchMode::Exclusive => base,
            HatchMode::Continuous => base.with_region(HatchRegion::Group),
        }
    }
}

/// A named set of hatch angles sharing one spacing.
#[derive(Debug, Clone, PartialEq)]
pub struct HatchPattern {
    pub name: String,
    /// Angles in degrees; one line family per angle.
    pub angles: Vec<f64>,
    pub spacing: f64,
}

/// Built-in presets: single angles in 15° steps, perpendicular grids,
/// mixed pairs and multi-angle fills.
const PRESETS: &[(&str, &[f64], f64)] = &[
    ("horizontal", &[0.0], 12.0),
    ("deg15", &[15.0], 12.0),
    ("deg30", &[30.0], 12.0),
    ("deg45", &[45.0], 12.0),
    ("deg60", &[60.0], 12.0),
    ("deg75", &[75.0], 12.0),
    ("vertical", &[90.0], 12.0),
    ("grid", &[0.0, 90.0], 12.0),
    ("grid15", &[15.0, 105.0], 12.0),
    ("grid30", &[30.0, 120.0], 12.0),
    ("crosshatch", &[45.0, 135.0], 12.0),
    ("mixed0-45", &[0.0, 45.0], 12.0),
    ("mixed30-75", &[30.0, 75.0], 12.0),
    ("mixed15-60", &[15.0, 60.0], 12.0),
    ("quad", &[0.0, 30.0, 60.0, 90.0], 20.0),
    ("triple", &[15.0, 45.0, 75.0], 18.0),
];

impl HatchPattern {
    pub fn new(name: impl Into<String>, angles: Vec<f64>, spacing: f64) -> Self {
        Self { name: name.into(), angles, spacing }
    }

    /// All built-in presets, in style-tag order.
    pub fn presets() -> Vec<HatchPattern> {
        PRESETS
            .iter()
            .map(|(name, angles, spacing)| HatchPattern::new(*name, angles.to_vec(), *spacing))
            .collect()
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::presets().into_iter().find(|p| p.name.eq_ignore_ascii_case(name.trim()))
    }

    /// Preset for a style tag, cycling through the list so the same tag
    /// always gets the same pattern.
    pub fn for_style(style: StyleTag) -> Self {
        let (name, angles, spacing) = PRESETS[style.0 as usize % PRESETS.len()];
        HatchPattern::new(name, angles.to_vec(), spacing)
    }
}

// ============================================================================
// LINE FAMILY
// ============================================================================

/// Number of candidate lines `generate_hatch_lines` lays over `region`,
/// or `None` if `spacing` is unusable or the family would be too large.
///
/// ## Rust Lesson #19: Integer Math
///
/// The count is worked out in f64 first: `as` casts saturate, so a huge
/// ratio must be rejected before it becomes an integer.
pub fn hatch_line_count(region: &BoundingBox, spacing: f64) -> Option<usize> {
    if !(spacing.is_finite() && spacing > 0.0) {
        return None;
    }

    let half = (region.diagonal() / spacing).ceil() + 1.0;
    let total = 2.0 * half + 1.0;
    if !total.is_finite() || total > MAX_HATCH_LINES as f64 {
        return None;
    }

    let half = half as usize;
    half.checked_mul(2)?.checked_add(1)
}

/// Parallel candidate lines covering a region.
///
/// Lines pass through the region center offset by whole multiples of
/// `spacing` along the perpendicular, and extend one diagonal each way so
/// they cross the region at any angle.
///
/// Returns nothing when `spacing` is not positive and finite, or when the
/// family would exceed [`MAX_HATCH_LINES`].
pub fn generate_hatch_lines(region: &BoundingBox, spacing: f64, angle_degrees: f64) -> Vec<Line> {
    let Some(count) = hatch_line_count(region, spacing) else {
        return Vec::new();
    };
    if !angle_degrees.is_finite() {
        return Vec::new();
    }

    let angle_rad = angle_degrees * PI / 180.0;
    let diagonal = region.diagonal();
    let center = region.center();

    let (dir_x, dir_y) = (angle_rad.cos(), angle_rad.sin());
    let (perp_x, perp_y) = ((angle_rad + PI / 2.0).cos(), (angle_rad + PI / 2.0).sin());

    // count = 2 * num_lines + 1, and the cap keeps both well inside i64
    let num_lines = (count / 2) as i64;

    let mut lines = Vec::with_capacity(count);

    for i in -num_lines..=num_lines {
        let offset = i as f64 * spacing;
        let cx = center.x + perp_x * offset;
        let cy = center.y + perp_y * offset;

        lines.push(Line::new(
            cx - dir_x * diagonal,
            cy - dir_y * diagonal,
            cx + dir_x * diagonal,
            cy + dir_y * diagonal,
        ));
    }

    lines
}

/// Entry/exit chords of a line through an outline.
///
/// Fewer than two distinct crossings (a tangent, a grazed vertex) gives no
/// chord; an odd leftover crossing is dropped.
fn chords(line: &Line, outline: &Polygon) -> Vec<Line> {
    let mut hits = line_polygon_intersections(line, outline);
    hits.dedup_by(|a, b| a.distance(*b) < DEDUP_EPSILON);

    if hits.len() < 2 {
        return Vec::new();
    }

    hits.chunks_exact(2)
        .map(|pair| Line::from_points(pair[0], pair[1]))
        .collect()
}

/// Does `above` draw on top of `below`? Higher z-index wins; equal
/// z-indices fall back to input order, so the later shape is on top.
#[inline]
fn stacks_above(scene: &[Shape], above: usize, below: usize) -> bool {
    (scene[above].z_index, above) > (scene[below].z_index, below)
}

/// Is `point` under any scene shape stacked above `owner`?
fn is_occluded(point: Point, owner: usize, scene: &[Shape], outlines: &[Polygon]) -> bool {
    outlines
        .iter()
        .enumerate()
        .any(|(i, outline)| stacks_above(scene, i, owner) && point_in_polygon(point, outline))
}

// ============================================================================
// HATCHING
// ============================================================================

/// Hatch every shape in `shapes`, occluding against the same slice.
pub fn hatch_lines(shapes: &[Shape], options: &HatchOptions) -> Vec<Line> {
    let members: Vec<usize> = (0..shapes.len()).collect();
    hatch_subset(shapes, &members, options)
}

/// Hatch the shapes at `members` (indices into `scene`).
///
/// Occlusion is checked against the whole scene, so a group's chords also
/// disappear under shapes of other groups.
pub fn hatch_subset(scene: &[Shape], members: &[usize], options: &HatchOptions) -> Vec<Line> {
    let members: Vec<usize> = members.iter().copied().filter(|&i| i < scene.len()).collect();
    if members.is_empty() {
        return Vec::new();
    }

    let outlines: Vec<Polygon> = scene.iter().map(Shape::outline).collect();

    let keep = |chord: &Line, owner: usize| {
        let mid = chord.midpoint();
        point_in_polygon(mid, &outlines[owner])
            && !(options.occlusion && is_occluded(mid, owner, scene, &outlines))
    };

    let mut result = Vec::new();

    match options.region {
        HatchRegion::PerShape => {
            for &owner in &members {
                let region = scene[owner].bounding_box().padded(options.padding);
                for line in generate_hatch_lines(&region, options.spacing, options.angle_degrees) {
                    result.extend(
                        chords(&line, &outlines[owner])
                            .into_iter()
                            .filter(|chord| keep(chord, owner)),
                    );
                }
            }
        }
        HatchRegion::Group => {
            let boxes = members.iter().map(|&i| scene[i].bounding_box());
            let Some(region) = BoundingBox::union_all(boxes) else {
                return Vec::new();
            };
            let region = region.padded(options.padding);

            for line in generate_hatch_lines(&region, options.spacing, options.angle_degrees) {
                for &owner in &members {
                    result.extend(
                        chords(&line, &outlines[owner])
                            .into_iter()
                            .filter(|chord| keep(chord, owner)),
                    );
                }
            }
        }
    }

    result
}

/// Hatch all shapes sharing `style` with every angle of `pattern`.
pub fn hatch_style_group(
    scene: &[Shape],
    style: StyleTag,
    pattern: &HatchPattern,
    mode: HatchMode,
) -> Vec<Line> {
    let members: Vec<usize> = scene
        .iter()
        .enumerate()
        .filter(|(_, s)| s.style == style)
        .map(|(i, _)| i)
        .collect();

    pattern
        .angles
        .iter()
        .flat_map(|&angle| hatch_subset(scene, &members, &mode.options(angle, pattern.spacing)))
        .collect()
}

/// Distinct style tags in a scene, sorted.
pub fn style_tags(scene: &[Shape]) -> Vec<StyleTag> {
    let mut tags: Vec<StyleTag> = scene.iter().map(|s| s.style).collect();
    tags.sort();
    tags.dedup();
    tags
}

/// Hatch a whole scene, one group per style tag.
///
/// `pattern_for` picks the pattern for each tag, typically
/// `HatchPattern::for_style`.
pub fn hatch_scene<F>(
    scene: &[Shape],
    mode: HatchMode,
    pattern_for: F,
) -> Vec<(StyleTag, Vec<Line>)>
where
    F: Fn(StyleTag) -> HatchPattern,
{
    style_tags(scene)
        .into_iter()
        .map(|tag| (tag, hatch_style_group(scene, tag, &pattern_for(tag), mode)))
        .collect()
}

// ============================================================================
// TESTS
// ============================================================================
