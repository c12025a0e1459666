//! Core geometry types for hatchery.
//!
//! ## Rust Lesson #3: Structs & Derives
//!
//! In JS a point is `{ x: 1.0, y: 2.0 }` and anything can be bolted on later.
//! In Rust, we define a `struct` with explicit types and derive the
//! behavior we want:
//! - `Debug` = printable with `{:?}`
//! - `Clone` / `Copy` = duplicated implicitly (small stack values only)
//! - `PartialEq` = comparable with `==`

/// A 2D point with x,y coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// A line segment defined by two endpoints.
///
/// This is the pure-geometry output type: hatch chords and exported
/// outline pieces carry no shape metadata.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

/// A closed polygon: an ordered vertex loop, the last vertex implicitly
/// connecting back to the first.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Polygon {
    pub points: Vec<Point>,
}

/// Axis-aligned bounding box stored as origin plus extent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub width: f64,
    pub height: f64,
}

// ============================================================================
// IMPLEMENTATIONS (methods)
// ============================================================================

impl Point {
    #[inline]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Distance to another point.
    #[inline]
    pub fn distance(&self, other: Point) -> f64 {
        self.distance_sq(other).sqrt()
    }

    /// Squared distance - enough for ordering, skips the sqrt.
    #[inline]
    pub fn distance_sq(&self, other: Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    /// Midpoint between this point and another.
    #[inline]
    pub fn midpoint(&self, other: Point) -> Point {
        Point::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }

    #[inline]
    pub fn translate(&self, dx: f64, dy: f64) -> Point {
        Point::new(self.x + dx, self.y + dy)
    }
}

impl Line {
    #[inline]
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Build a line from two points.
    #[inline]
    pub fn from_points(start: Point, end: Point) -> Self {
        Self::new(start.x, start.y, end.x, end.y)
    }

    /// Get the start point of the line.
    #[inline]
    pub fn start(&self) -> Point {
        Point::new(self.x1, self.y1)
    }

    /// Get the end point of the line.
    #[inline]
    pub fn end(&self) -> Point {
        Point::new(self.x2, self.y2)
    }

    /// Get the midpoint of the line.
    #[inline]
    pub fn midpoint(&self) -> Point {
        self.start().midpoint(self.end())
    }

    /// Length of the line segment.
    #[inline]
    pub fn length(&self) -> f64 {
        self.start().distance(self.end())
    }
}

impl Polygon {
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Iterate the closed edge loop as `(start, end)` pairs.
    ///
    /// ## Rust Lesson #6: impl Trait
    ///
    /// `impl Iterator<Item = ...>` hides the concrete iterator type.
    /// The caller gets something it can loop over; we keep the freedom
    /// to change how it is built.
    pub fn edges(&self) -> impl Iterator<Item = (Point, Point)> + '_ {
        let n = self.points.len();
        (0..n).map(move |i| (self.points[i], self.points[(i + 1) % n]))
    }

    /// Get the bounding box, or `None` for an empty polygon.
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        BoundingBox::from_points(&self.points)
    }

    /// Mean of the vertices. Matches the declared center for the
    /// regular outlines produced by `Shape::outline`.
    pub fn centroid(&self) -> Option<Point> {
        if self.points.is_empty() {
            return None;
        }
        let n = self.points.len() as f64;
        let sum_x: f64 = self.points.iter().map(|p| p.x).sum();
        let sum_y: f64 = self.points.iter().map(|p| p.y).sum();
        Some(Point::new(sum_x / n, sum_y / n))
    }

    /// A copy of this polygon moved by `(dx, dy)`.
    pub fn translated(&self, dx: f64, dy: f64) -> Polygon {
        Polygon::new(self.points.iter().map(|p| p.translate(dx, dy)).collect())
    }
}

impl BoundingBox {
    pub fn new(min_x: f64, min_y: f64, width: f64, height: f64) -> Self {
        Self { min_x, min_y, width, height }
    }

    /// Min/max reduction over a point set.
    pub fn from_points(points: &[Point]) -> Option<Self> {
        if points.is_empty() {
            return None;
        }

        let min_x = points.iter().map(|p| p.x).fold(f64::INFINITY, f64::min);
        let min_y = points.iter().map(|p| p.y).fold(f64::INFINITY, f64::min);
        let max_x = points.iter().map(|p| p.x).fold(f64::NEG_INFINITY, f64::max);
        let max_y = points.iter().map(|p| p.y).fold(f64::NEG_INFINITY, f64::max);

        Some(Self::new(min_x, min_y, max_x - min_x, max_y - min_y))
    }

    #[inline]
    pub fn max_x(&self) -> f64 {
        self.min_x + self.width
    }

    #[inline]
    pub fn max_y(&self) -> f64 {
        self.min_y + self.height
    }

    #[inline]
    pub fn center(&self) -> Point {
        Point::new(self.min_x + self.width / 2.0, self.min_y + self.height / 2.0)
    }

    /// Length of the box diagonal.
    #[inline]
    pub fn diagonal(&self) -> f64 {
        self.width.hypot(self.height)
    }

    /// Grow the box by `padding` on every side.
    pub fn padded(&self, padding: f64) -> Self {
        Self::new(
            self.min_x - padding,
            self.min_y - padding,
            self.width + padding * 2.0,
            self.height + padding * 2.0,
        )
    }

    /// Smallest box covering both boxes.
    pub fn union(&self, other: &BoundingBox) -> Self {
        let min_x = self.min_x.min(other.min_x);
        let min_y = self.min_y.min(other.min_y);
        let max_x = self.max_x().max(other.max_x());
        let max_y = self.max_y().max(other.max_y());
        Self::new(min_x, min_y, max_x - min_x, max_y - min_y)
    }

    /// Union of any number of boxes; `None` when there are none.
    pub fn union_all<I>(boxes: I) -> Option<Self>
    where
        I: IntoIterator<Item = BoundingBox>,
    {
        boxes.into_iter().reduce(|acc, b| acc.union(&b))
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn rect(w: f64, h: f64) -> Polygon {
        Polygon::new(vec![
            Point::new(0.0, 0.0),
            Point::new(w, 0.0),
            Point::new(w, h),
            Point::new(0.0, h),
        ])
    }

    #[test]
    fn point_distance() {
        let p1 = Point::new(0.0, 0.0);
        let p2 = Point::new(3.0, 4.0);
        assert_eq!(p1.distance(p2), 5.0); // 3-4-5 triangle
        assert_eq!(p1.distance_sq(p2), 25.0);
    }

    #[test]
    fn line_length_and_midpoint() {
        let line = Line::new(0.0, 0.0, 3.0, 4.0);
        assert_eq!(line.length(), 5.0);
        assert_eq!(line.midpoint(), Point::new(1.5, 2.0));
    }

    #[test]
    fn polygon_bbox() {
        let bbox = rect(10.0, 5.0).bounding_box().unwrap();
        assert_eq!(bbox, BoundingBox::new(0.0, 0.0, 10.0, 5.0));
        assert_eq!(bbox.max_x(), 10.0);
        assert_eq!(bbox.max_y(), 5.0);
    }

    #[test]
    fn empty_polygon_bbox() {
        assert_eq!(Polygon::new(vec![]).bounding_box(), None);
        assert_eq!(Polygon::new(vec![]).centroid(), None);
    }

    #[test]
    fn bbox_diagonal_and_center() {
        let bbox = rect(3.0, 4.0).bounding_box().unwrap();
        assert_eq!(bbox.diagonal(), 5.0);
        assert_eq!(bbox.center(), Point::new(1.5, 2.0));
    }

    #[test]
    fn bbox_padding_and_union() {
        let a = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        let b = BoundingBox::new(20.0, -5.0, 5.0, 5.0);

        assert_eq!(a.padded(2.0), BoundingBox::new(-2.0, -2.0, 14.0, 14.0));
        assert_eq!(a.union(&b), BoundingBox::new(0.0, -5.0, 25.0, 15.0));
        assert_eq!(BoundingBox::union_all([a, b]), Some(a.union(&b)));
        assert_eq!(BoundingBox::union_all(Vec::new()), None);
    }

    #[test]
    fn edges_close_the_loop() {
        let poly = rect(1.0, 1.0);
        let edges: Vec<_> = poly.edges().collect();
        assert_eq!(edges.len(), 4);
        assert_eq!(edges[3], (Point::new(0.0, 1.0), Point::new(0.0, 0.0)));
    }

    #[test]
    fn centroid_is_vertex_mean() {
        let c = rect(3.0, 1.0).translated(0.1, 0.2).centroid().unwrap();
        assert_relative_eq!(c.x, 1.6, epsilon = 1e-12);
        assert_relative_eq!(c.y, 0.7, epsilon = 1e-12);
    }

    #[test]
    fn translated_moves_every_vertex() {
        let moved = rect(2.0, 2.0).translated(5.0, -1.0);
        assert_eq!(moved.points[0], Point::new(5.0, -1.0));
        assert_eq!(moved.points[2], Point::new(7.0, 1.0));
    }
}
