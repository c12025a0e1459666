//! # hatchery
//!
//! Pure 2-D geometry for pen-plotter hatching: shape outlines, segment
//! intersection, point-in-polygon, silhouette extraction and z-ordered
//! hatch fills, plus an SVG writer for the result.
//!
//! ## Rust Lesson #7: Modules
//!
//! Every module is declared here explicitly:
//! - `mod foo;` = load from `foo.rs` or `foo/mod.rs`
//! - `pub mod foo;` = also export it publicly
//! - `pub use foo::Bar;` = re-export Bar at this level
//!
//! Nothing in this crate does I/O. Callers hand in shapes and get back
//! lines, segments or an SVG string.

pub mod chain;
pub mod clip;
pub mod error;
pub mod geometry;
pub mod hatch;
pub mod outline;
pub mod shape;
pub mod svg;

// Re-export common types at crate root for convenience.
pub use chain::{Chain, ChainConfig, chain_segments, chain_to_path_data};
pub use clip::{line_polygon_intersections, point_in_polygon, segment_intersection};
pub use error::{GeometryError, Result};
pub use geometry::{BoundingBox, Line, Point, Polygon};
pub use hatch::{
    HatchMode, HatchOptions, HatchPattern, HatchRegion, generate_hatch_lines, hatch_lines,
    hatch_scene,
};
pub use outline::{Segment, filter_outer_segments, silhouette, split_at_intersections};
pub use shape::{Shape, ShapeKind, StyleTag, outline_from_tag};
pub use svg::{ExportOptions, OutlineStyle, SvgDocument, scene_to_svg};
