//! Intersection and containment tests.
//!
//! This is the HOT PATH - every hatch line is tested against every outline
//! edge, and every candidate chord against every shape above it.

use crate::geometry::{Line, Point, Polygon};

/// Sine of the smallest angle at which two segments still count as crossing.
///
/// The determinant is compared against `|a|·|b|`, so the test does not
/// depend on segment length or canvas units.
pub const PARALLEL_EPSILON: f64 = 1e-9;

/// Floor applied to an edge's Y-span in the ray-casting test.
pub const HORIZONTAL_EPSILON: f64 = 1e-12;

// ============================================================================
// POINT IN POLYGON (Ray Casting Algorithm)
// ============================================================================
//
// ## Rust Lesson #8: References & Slices
//
// `&Polygon` is borrowed: we only look at the vertices, never take them.

/// Test if a point is inside a polygon using ray casting.
///
/// Casts a ray to +X and counts edge crossings: odd = inside.
/// Points exactly on the boundary may land on either side.
#[inline]
pub fn point_in_polygon(point: Point, polygon: &Polygon) -> bool {
    let pts = &polygon.points;
    let n = pts.len();
    if n < 3 {
        return false;
    }

    let Point { x: px, y: py } = point;
    let mut inside = false;
    let mut j = n - 1;

    for i in 0..n {
        let (xi, yi) = (pts[i].x, pts[i].y);
        let (xj, yj) = (pts[j].x, pts[j].y);

        if (yi > py) != (yj > py) {
            let span = guard_span(yj - yi);
            if px < (xj - xi) * (py - yi) / span + xi {
                inside = !inside;
            }
        }

        j = i;
    }

    inside
}

/// Keep the Y-span away from zero without flipping its sign.
#[inline]
fn guard_span(span: f64) -> f64 {
    if span.abs() < HORIZONTAL_EPSILON {
        HORIZONTAL_EPSILON.copysign(span)
    } else {
        span
    }
}

// ============================================================================
// SEGMENT-SEGMENT INTERSECTION
// ============================================================================

/// Parametric intersection of two finite segments.
///
/// Returns `(point, t_a, t_b)` where `t_a`/`t_b` are positions along `a`/`b`
/// in `[0, 1]`. The point is evaluated on `a`.
#[inline]
pub fn segment_intersection_params(
    a_start: Point,
    a_end: Point,
    b_start: Point,
    b_end: Point,
) -> Option<(Point, f64, f64)> {
    let (ax, ay) = (a_end.x - a_start.x, a_end.y - a_start.y);
    let (bx, by) = (b_end.x - b_start.x, b_end.y - b_start.y);

    let len_product = ax.hypot(ay) * bx.hypot(by);
    if len_product == 0.0 {
        return None; // zero-length segment
    }

    let denom = ax * by - ay * bx;

    // Parallel, coincident or near enough to not trust the solve
    if denom.abs() < PARALLEL_EPSILON * len_product {
        return None;
    }

    let (ox, oy) = (b_start.x - a_start.x, b_start.y - a_start.y);
    let t_a = (ox * by - oy * bx) / denom;
    let t_b = (ox * ay - oy * ax) / denom;

    if (0.0..=1.0).contains(&t_a) && (0.0..=1.0).contains(&t_b) {
        let point = Point::new(a_start.x + t_a * ax, a_start.y + t_a * ay);
        Some((point, t_a, t_b))
    } else {
        None
    }
}

/// Find the intersection point of two line segments, if they cross
/// within both segments' bounds.
#[inline]
pub fn segment_intersection(a: &Line, b: &Line) -> Option<Point> {
    segment_intersection_params(a.start(), a.end(), b.start(), b.end()).map(|(p, _, _)| p)
}

// ============================================================================
// LINE-POLYGON INTERSECTION
// ============================================================================

/// All crossings between a line and a polygon boundary, sorted by distance
/// from the line start. Points are evaluated on the polygon edge, so a
/// vertical or horizontal edge yields its exact coordinate.
pub fn line_polygon_intersections(line: &Line, polygon: &Polygon) -> Vec<Point> {
    if polygon.len() < 3 {
        return Vec::new();
    }

    let origin = line.start();

    // ## Rust Lesson #14: Iterators & Collecting
    //
    // filter_map = filter + map: return Some(x) to keep, None to skip.
    let mut hits: Vec<(f64, Point)> = polygon
        .edges()
        .filter_map(|(start, end)| segment_intersection_params(start, end, origin, line.end()))
        .map(|(point, _, _)| (origin.distance_sq(point), point))
        .collect();

    hits.sort_by(|a, b| a.0.total_cmp(&b.0));
    hits.into_iter().map(|(_, p)| p).collect()
}

// ============================================================================
// TESTS
// ============================================================================
