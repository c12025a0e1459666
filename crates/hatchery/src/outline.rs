//! Outline splitting and silhouette extraction.
//!
//! Overlapping shapes each contribute their full outline. To draw only the
//! visible perimeter of the stack, every outline edge is cut where it
//! crosses another shape's edge, and the pieces that lie inside some other
//! shape are thrown away.
//!
//! The pairwise test is O(n²) over all edges in the scene. That is fine for
//! tens of shapes; there is no spatial index.

use crate::clip::{point_in_polygon, segment_intersection_params};
use crate::geometry::{Line, Point, Polygon};
use crate::shape::Shape;

/// Pieces shorter than this are not emitted by the splitter.
pub const SPLIT_EPSILON: f64 = 1e-9;

/// A directed outline edge, remembering which shape it belongs to.
///
/// `parent` is the index of the owning shape in the scene slice.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub start: Point,
    pub end: Point,
    pub parent: usize,
}

impl Segment {
    #[inline]
    pub fn new(start: Point, end: Point, parent: usize) -> Self {
        Self { start, end, parent }
    }

    #[inline]
    pub fn midpoint(&self) -> Point {
        self.start.midpoint(self.end)
    }

    #[inline]
    pub fn length(&self) -> f64 {
        self.start.distance(self.end)
    }

    /// Drop the parent and keep the geometry.
    #[inline]
    pub fn to_line(&self) -> Line {
        Line::from_points(self.start, self.end)
    }
}

/// Outline segments for every shape, each tagged with its scene index.
pub fn scene_segments(shapes: &[Shape]) -> Vec<Segment> {
    shapes
        .iter()
        .enumerate()
        .flat_map(|(i, shape)| shape.outline_segments(i))
        .collect()
}

/// Cut each segment at every point where it crosses a segment of a
/// different parent.
///
/// Hits are ordered by distance from the segment start and the segment is
/// replaced by the chain start → hit → ... → end. The first piece starts
/// exactly at the original start and the last piece ends exactly at the
/// original end. Segments of the same parent are never tested against each
/// other.
pub fn split_at_intersections(segments: &[Segment]) -> Vec<Segment> {
    let mut result = Vec::with_capacity(segments.len());

    for (i, seg) in segments.iter().enumerate() {
        let mut hits: Vec<(f64, Point)> = segments
            .iter()
            .enumerate()
            .filter(|(j, other)| *j != i && other.parent != seg.parent)
            .filter_map(|(_, other)| {
                segment_intersection_params(seg.start, seg.end, other.start, other.end)
            })
            .map(|(point, t, _)| (t, point))
            .collect();

        if hits.is_empty() {
            result.push(*seg);
            continue;
        }

        // t is proportional to distance from the start along the segment
        hits.sort_by(|a, b| a.0.total_cmp(&b.0));

        let first_piece = result.len();
        let mut current = seg.start;
        for (_, hit) in hits {
            if current.distance(hit) < SPLIT_EPSILON {
                continue;
            }
            result.push(Segment::new(current, hit, seg.parent));
            current = hit;
        }

        if current.distance(seg.end) < SPLIT_EPSILON && result.len() > first_piece {
            // Last hit sits on the end point: stretch the final piece onto it
            if let Some(last) = result.last_mut() {
                last.end = seg.end;
            }
        } else {
            result.push(Segment::new(current, seg.end, seg.parent));
        }
    }

    result
}

/// Keep only segments whose midpoint is not inside any shape other than
/// the segment's own parent.
///
/// This is a per-segment midpoint classification, not a polygon union:
/// a piece straddling a boundary is judged by its midpoint alone.
pub fn filter_outer_segments(segments: &[Segment], shapes: &[Shape]) -> Vec<Segment> {
    let outlines: Vec<Polygon> = shapes.iter().map(Shape::outline).collect();

    segments
        .iter()
        .filter(|seg| {
            let mid = seg.midpoint();
            !outlines
                .iter()
                .enumerate()
                .any(|(i, outline)| i != seg.parent && point_in_polygon(mid, outline))
        })
        .copied()
        .collect()
}

/// Visible perimeter of a stack of shapes: outline → split → filter.
pub fn silhouette(shapes: &[Shape]) -> Vec<Segment> {
    let segments = scene_segments(shapes);
    let split = split_at_intersections(&segments);
    filter_outer_segments(&split, shapes)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn two_squares() -> Vec<Shape> {
        vec![
            Shape::square(100.0, 100.0, 100.0).unwrap(),
            Shape::square(150.0, 150.0, 100.0).unwrap().with_z_index(1),
        ]
    }

    #[test]
    fn isolated_segments_pass_through() {
        let shapes = vec![Shape::circle(0.0, 0.0, 10.0).unwrap()];
        let segments = scene_segments(&shapes);
        assert_eq!(split_at_intersections(&segments), segments);
    }

    #[test]
    fn same_parent_segments_are_not_split() {
        // Crossing edges, but both belong to shape 0
        let segments = vec![
            Segment::new(Point::new(0.0, 0.0), Point::new(10.0, 10.0), 0),
            Segment::new(Point::new(0.0, 10.0), Point::new(10.0, 0.0), 0),
        ];
        assert_eq!(split_at_intersections(&segments), segments);
    }

    #[test]
    fn crossing_segments_split_at_hit() {
        let segments = vec![
            Segment::new(Point::new(0.0, 0.0), Point::new(10.0, 10.0), 0),
            Segment::new(Point::new(0.0, 10.0), Point::new(10.0, 0.0), 1),
        ];
        let split = split_at_intersections(&segments);

        assert_eq!(split.len(), 4);
        assert_eq!(split.iter().filter(|s| s.parent == 0).count(), 2);
        assert_abs_diff_eq!(split[0].end.x, 5.0, epsilon = 1e-10);
        assert_abs_diff_eq!(split[0].end.y, 5.0, epsilon = 1e-10);
        assert_eq!(split[0].end, split[1].start);
    }

    #[test]
    fn split_pieces_reconstruct_original_endpoints() {
        let shapes = two_squares();
        let segments = scene_segments(&shapes);
        let split = split_at_intersections(&segments);

        // Squares overlap in a corner: two edges of each get cut once
        assert_eq!(split.len(), segments.len() + 4);

        let mut cursor = 0;
        for original in &segments {
            let first = split[cursor];
            assert_eq!(first.start, original.start);

            // Walk the contiguous chain belonging to this original segment
            let mut piece = first;
            while piece.end != original.end {
                cursor += 1;
                assert_eq!(split[cursor].start, piece.end, "pieces must chain");
                piece = split[cursor];
            }
            assert_eq!(piece.end, original.end);
            assert_eq!(piece.parent, original.parent);
            cursor += 1;
        }
        assert_eq!(cursor, split.len());
    }

    #[test]
    fn single_shape_keeps_every_segment() {
        let shapes = vec![Shape::triangle(50.0, 50.0, 20.0, 0.3).unwrap()];
        let segments = scene_segments(&shapes);
        assert_eq!(filter_outer_segments(&segments, &shapes), segments);
    }

    #[test]
    fn nested_shape_outline_is_hidden() {
        let shapes = vec![
            Shape::square(100.0, 100.0, 200.0).unwrap(),
            Shape::circle(100.0, 100.0, 50.0).unwrap().with_z_index(1),
        ];
        let outer = filter_outer_segments(&scene_segments(&shapes), &shapes);

        assert_eq!(outer.len(), 4);
        assert!(outer.iter().all(|s| s.parent == 0));
    }

    #[test]
    fn identical_shapes_never_gain_segments() {
        // Every midpoint sits exactly on the other outline, so which pieces
        // survive is boundary-dependent. Only the bound is stable.
        let shapes = vec![
            Shape::square(0.0, 0.0, 50.0).unwrap(),
            Shape::square(0.0, 0.0, 50.0).unwrap().with_z_index(1),
        ];
        let segments = scene_segments(&shapes);
        let outer = filter_outer_segments(&segments, &shapes);
        assert!(outer.len() <= segments.len());
    }

    #[test]
    fn overlap_interior_pieces_are_dropped() {
        let shapes = two_squares();
        let outline = silhouette(&shapes);

        // Union of the two squares is an 8-sided outline
        assert_eq!(outline.len(), 8);
        for seg in &outline {
            let mid = seg.midpoint();
            let other = &shapes[1 - seg.parent];
            assert!(!point_in_polygon(mid, &other.outline()));
        }

        let perimeter: f64 = outline.iter().map(Segment::length).sum();
        assert_abs_diff_eq!(perimeter, 600.0, epsilon = 1e-9);
    }

    #[test]
    fn empty_scene_is_empty() {
        assert!(scene_segments(&[]).is_empty());
        assert!(split_at_intersections(&[]).is_empty());
        assert!(silhouette(&[]).is_empty());
    }
}
