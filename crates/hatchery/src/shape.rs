//! Shape descriptors and the outline generator.
//!
//! ## Rust Lesson #10: Enums (Sum Types)
//!
//! A sketch script would write `{ type: 'circle', x, y, size }` and branch
//! on the string everywhere. Here the variant is a real enum: `match` must
//! handle every variant, so adding a shape is a compile error until every
//! consumer knows about it.

use std::f64::consts::{PI, TAU};

use crate::error::{GeometryError, Result};
use crate::geometry::{BoundingBox, Point, Polygon};
use crate::outline::Segment;

/// Number of vertices used to approximate a circle.
pub const CIRCLE_RESOLUTION: usize = 32;

/// Which primitive a shape is. Rotation only exists where it matters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShapeKind {
    Circle,
    Square,
    /// Equilateral triangle, rotation in radians.
    Triangle { rotation: f64 },
}

/// Opaque style tag (the sketch's color index). Never interpreted by the
/// geometry; used to group shapes for hatching and export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct StyleTag(pub u32);

/// A placed primitive.
///
/// `size` is the diameter for circles, the side length for squares and the
/// circumradius for triangles. Higher `z_index` draws later (on top).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shape {
    pub kind: ShapeKind,
    pub center: Point,
    pub size: f64,
    pub z_index: i32,
    pub style: StyleTag,
}

impl ShapeKind {
    /// Parse a shape tag such as `"circle"`. Case-insensitive.
    ///
    /// `rotation` is kept for triangles and ignored otherwise.
    pub fn from_tag(tag: &str, rotation: f64) -> Result<Self> {
        match tag.trim().to_lowercase().as_str() {
            "circle" => Ok(ShapeKind::Circle),
            "square" => Ok(ShapeKind::Square),
            "triangle" => Ok(ShapeKind::Triangle { rotation }),
            _ => Err(GeometryError::UnsupportedShapeType(tag.to_string())),
        }
    }

    /// Tag name, the inverse of `from_tag`.
    pub fn name(&self) -> &'static str {
        match self {
            ShapeKind::Circle => "circle",
            ShapeKind::Square => "square",
            ShapeKind::Triangle { .. } => "triangle",
        }
    }
}

impl Shape {
    /// Create a shape at `z_index` 0 with the default style.
    pub fn new(kind: ShapeKind, center: Point, size: f64) -> Result<Self> {
        if !(size.is_finite() && size > 0.0) {
            return Err(GeometryError::InvalidSize(size));
        }
        Ok(Self {
            kind,
            center,
            size,
            z_index: 0,
            style: StyleTag::default(),
        })
    }

    /// Build a shape from a string tag, the way scene files describe them.
    pub fn from_tag(tag: &str, center: Point, size: f64, rotation: f64) -> Result<Self> {
        Self::new(ShapeKind::from_tag(tag, rotation)?, center, size)
    }

    pub fn circle(x: f64, y: f64, diameter: f64) -> Result<Self> {
        Self::new(ShapeKind::Circle, Point::new(x, y), diameter)
    }

    pub fn square(x: f64, y: f64, side: f64) -> Result<Self> {
        Self::new(ShapeKind::Square, Point::new(x, y), side)
    }

    pub fn triangle(x: f64, y: f64, circumradius: f64, rotation: f64) -> Result<Self> {
        Self::new(ShapeKind::Triangle { rotation }, Point::new(x, y), circumradius)
    }

    pub fn with_z_index(mut self, z_index: i32) -> Self {
        self.z_index = z_index;
        self
    }

    pub fn with_style(mut self, style: StyleTag) -> Self {
        self.style = style;
        self
    }

    /// Polygon approximating the shape boundary.
    ///
    /// Circles start at angle 0 and step by `2π/N` in increasing angle;
    /// squares run TL, TR, BR, BL; triangles sit on their circumcircle.
    pub fn outline(&self) -> Polygon {
        let Point { x: cx, y: cy } = self.center;

        let points = match self.kind {
            ShapeKind::Circle => {
                let radius = self.size / 2.0;
                (0..CIRCLE_RESOLUTION)
                    .map(|i| {
                        let angle = TAU * i as f64 / CIRCLE_RESOLUTION as f64;
                        Point::new(cx + radius * angle.cos(), cy + radius * angle.sin())
                    })
                    .collect()
            }
            ShapeKind::Square => {
                let half = self.size / 2.0;
                vec![
                    Point::new(cx - half, cy - half),
                    Point::new(cx + half, cy - half),
                    Point::new(cx + half, cy + half),
                    Point::new(cx - half, cy + half),
                ]
            }
            ShapeKind::Triangle { rotation } => (0..3)
                .map(|k| {
                    let angle = rotation + k as f64 * (2.0 * PI / 3.0);
                    Point::new(cx + self.size * angle.cos(), cy + self.size * angle.sin())
                })
                .collect(),
        };

        Polygon::new(points)
    }

    /// Outline edges as segments owned by `parent` (this shape's index in
    /// the scene).
    pub fn outline_segments(&self, parent: usize) -> Vec<Segment> {
        self.outline()
            .edges()
            .map(|(start, end)| Segment::new(start, end, parent))
            .collect()
    }

    /// Bounding box of the outline polygon.
    pub fn bounding_box(&self) -> BoundingBox {
        let half = self.size / 2.0;
        // An outline always has vertices; the fallback is the nominal extent.
        self.outline().bounding_box().unwrap_or_else(|| {
            BoundingBox::new(self.center.x - half, self.center.y - half, self.size, self.size)
        })
    }
}

/// Outline for a string-tagged shape description.
///
/// Fails with `UnsupportedShapeType` for unknown tags instead of
/// returning an empty polygon.
pub fn outline_from_tag(tag: &str, center: Point, size: f64, rotation: f64) -> Result<Polygon> {
    Ok(Shape::from_tag(tag, center, size, rotation)?.outline())
}

// ============================================================================
// TESTS
// ============================================================================
