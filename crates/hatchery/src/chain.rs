//! Line chaining - connect line segments into continuous polylines.
//!
//! Silhouette pieces come out of the splitter as separate segments. Joining
//! the ones whose endpoints touch (within tolerance) turns a perimeter back
//! into a few closed paths, which means fewer pen lifts on a plotter.

use std::collections::HashMap;
use std::fmt::Write as _;

use crate::geometry::{Line, Point};

/// A chain of connected points forming a polyline.
pub type Chain = Vec<Point>;

/// Configuration for line chaining.
#[derive(Debug, Clone)]
pub struct ChainConfig {
    /// Maximum distance between endpoints to consider them connected.
    pub tolerance: f64,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self { tolerance: 0.1 }
    }
}

impl ChainConfig {
    pub fn with_tolerance(tolerance: f64) -> Self {
        Self { tolerance }
    }
}

type Grid = HashMap<(i64, i64), Vec<(usize, bool)>>;

/// Chain connected lines into polylines.
///
/// Extends each chain forward from its end and backward from its start,
/// taking any unused line with an endpoint within tolerance. A line may be
/// walked in either direction.
///
/// Endpoints live in a grid hash with `tolerance`-sized cells, so lookups
/// only scan the 3x3 neighborhood.
pub fn chain_segments(lines: &[Line], config: &ChainConfig) -> Vec<Chain> {
    if lines.is_empty() {
        return Vec::new();
    }

    let grid_size = config.tolerance.max(0.001); // Avoid division by zero
    let tolerance_sq = config.tolerance * config.tolerance;

    let mut grid: Grid = HashMap::new();
    for (i, line) in lines.iter().enumerate() {
        grid.entry(point_to_cell(line.start(), grid_size)).or_default().push((i, true));
        grid.entry(point_to_cell(line.end(), grid_size)).or_default().push((i, false));
    }

    let mut used = vec![false; lines.len()];
    let mut chains = Vec::new();

    for start_idx in 0..lines.len() {
        if used[start_idx] {
            continue;
        }

        used[start_idx] = true;
        let first = &lines[start_idx];
        let mut chain = vec![first.start(), first.end()];

        // Extend forward from the tail
        while let Some(tail) = chain.last().copied() {
            let found = find_connecting_line(tail, &grid, lines, &used, grid_size, tolerance_sq);
            let Some((idx, at_start)) = found else {
                break;
            };
            used[idx] = true;
            // Continue through the far endpoint
            chain.push(if at_start { lines[idx].end() } else { lines[idx].start() });
        }

        // Extend backward from the head
        while let Some(head) = chain.first().copied() {
            let found = find_connecting_line(head, &grid, lines, &used, grid_size, tolerance_sq);
            let Some((idx, at_start)) = found else {
                break;
            };
            used[idx] = true;
            chain.insert(0, if at_start { lines[idx].end() } else { lines[idx].start() });
        }

        chains.push(chain);
    }

    chains
}

/// Convert a point to a grid cell coordinate.
#[inline]
fn point_to_cell(p: Point, grid_size: f64) -> (i64, i64) {
    ((p.x / grid_size).floor() as i64, (p.y / grid_size).floor() as i64)
}

/// Find an unused line with an endpoint near `p`.
///
/// Returns the line index and whether the matching endpoint is its start.
fn find_connecting_line(
    p: Point,
    grid: &Grid,
    lines: &[Line],
    used: &[bool],
    grid_size: f64,
    tolerance_sq: f64,
) -> Option<(usize, bool)> {
    let cell = point_to_cell(p, grid_size);

    for dx in -1..=1 {
        for dy in -1..=1 {
            let Some(candidates) = grid.get(&(cell.0 + dx, cell.1 + dy)) else {
                continue;
            };
            for &(idx, is_start) in candidates {
                if used[idx] {
                    continue;
                }
                let endpoint = if is_start { lines[idx].start() } else { lines[idx].end() };
                if endpoint.distance_sq(p) <= tolerance_sq {
                    return Some((idx, is_start));
                }
            }
        }
    }

    None
}

/// Does the chain end where it began?
pub fn is_closed(chain: &Chain, tolerance: f64) -> bool {
    match (chain.first(), chain.last()) {
        (Some(a), Some(b)) if chain.len() > 2 => a.distance(*b) <= tolerance,
        _ => false,
    }
}

/// SVG path data for a chain: `M x,y L x,y ...`, closed with `Z` when the
/// chain returns to its start (the duplicate closing point is dropped).
///
/// Coordinates use the shortest exact `f64` representation.
pub fn chain_to_path_data(chain: &Chain, tolerance: f64) -> String {
    let closed = is_closed(chain, tolerance);
    let points = if closed { &chain[..chain.len() - 1] } else { &chain[..] };

    let mut d = String::new();
    for (i, p) in points.iter().enumerate() {
        let cmd = if i == 0 { 'M' } else { 'L' };
        if i > 0 {
            d.push(' ');
        }
        // Writing to a String cannot fail
        let _ = write!(d, "{}{},{}", cmd, p.x, p.y);
    }
    if closed {
        d.push_str(" Z");
    }
    d
}

/// Statistics about chaining results.
#[derive(Debug, Clone)]
pub struct ChainStats {
    /// Number of input line segments
    pub input_lines: usize,
    /// Number of output chains
    pub output_chains: usize,
    /// Average chain length (points per chain)
    pub avg_chain_length: f64,
    /// Longest chain (points)
    pub max_chain_length: usize,
    /// Reduction ratio (1.0 - chains/lines)
    pub reduction_ratio: f64,
}

impl ChainStats {
    pub fn from_chains(input_count: usize, chains: &[Chain]) -> Self {
        let output_chains = chains.len();
        let total_points: usize = chains.iter().map(|c| c.len()).sum();
        let max_chain_length = chains.iter().map(|c| c.len()).max().unwrap_or(0);

        Self {
            input_lines: input_count,
            output_chains,
            avg_chain_length: if output_chains > 0 {
                total_points as f64 / output_chains as f64
            } else {
                0.0
            },
            max_chain_length,
            reduction_ratio: if input_count > 0 {
                1.0 - (output_chains as f64 / input_count as f64)
            } else {
                0.0
            },
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outline::{silhouette, Segment};
    use crate::shape::Shape;

    #[test]
    fn chain_empty() {
        assert!(chain_segments(&[], &ChainConfig::default()).is_empty());
    }

    #[test]
    fn chain_two_connected_lines() {
        let lines = vec![
            Line::new(0.0, 0.0, 10.0, 10.0),
            Line::new(10.0, 10.0, 20.0, 10.0),
        ];
        let chains = chain_segments(&lines, &ChainConfig::default());

        assert_eq!(chains.len(), 1, "Should chain into 1 polyline");
        assert_eq!(chains[0].len(), 3);
    }

    #[test]
    fn chain_walks_reversed_lines() {
        let lines = vec![
            Line::new(0.0, 0.0, 10.0, 0.0),
            Line::new(20.0, 0.0, 10.0, 0.0), // points back at the first
        ];
        let chains = chain_segments(&lines, &ChainConfig::default());

        assert_eq!(chains.len(), 1);
        assert_eq!(
            chains[0],
            vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0), Point::new(20.0, 0.0)]
        );
    }

    #[test]
    fn chain_respects_tolerance() {
        let lines = vec![
            Line::new(0.0, 0.0, 10.0, 10.0),
            Line::new(10.05, 10.05, 20.0, 10.0),
        ];

        assert_eq!(chain_segments(&lines, &ChainConfig::with_tolerance(0.1)).len(), 1);
        assert_eq!(chain_segments(&lines, &ChainConfig::with_tolerance(0.01)).len(), 2);
    }

    #[test]
    fn chain_out_of_order() {
        let lines = vec![
            Line::new(20.0, 0.0, 30.0, 10.0),
            Line::new(0.0, 0.0, 10.0, 10.0),
            Line::new(10.0, 10.0, 20.0, 0.0),
        ];
        let chains = chain_segments(&lines, &ChainConfig::default());

        assert_eq!(chains.len(), 1, "Should chain despite order");
        assert_eq!(chains[0].len(), 4);
    }

    #[test]
    fn silhouette_chains_into_one_closed_path() {
        let shapes = vec![
            Shape::square(100.0, 100.0, 100.0).unwrap(),
            Shape::square(150.0, 150.0, 100.0).unwrap().with_z_index(1),
        ];
        let lines: Vec<Line> = silhouette(&shapes).iter().map(Segment::to_line).collect();
        let chains = chain_segments(&lines, &ChainConfig::default());

        assert_eq!(chains.len(), 1);
        assert!(is_closed(&chains[0], 0.1));

        let d = chain_to_path_data(&chains[0], 0.1);
        assert!(d.starts_with('M'));
        assert!(d.ends_with(" Z"));
        assert_eq!(d.matches('L').count(), 7, "8 corners: one M and seven L");
    }

    #[test]
    fn open_chain_has_no_close_command() {
        let chain = vec![Point::new(0.0, 0.0), Point::new(1.5, 0.0), Point::new(1.5, 2.25)];
        assert_eq!(chain_to_path_data(&chain, 0.1), "M0,0 L1.5,0 L1.5,2.25");
    }

    #[test]
    fn chain_stats() {
        let lines = vec![
            Line::new(0.0, 0.0, 10.0, 10.0),
            Line::new(10.0, 10.0, 20.0, 0.0),
            Line::new(100.0, 100.0, 110.0, 110.0),
        ];
        let chains = chain_segments(&lines, &ChainConfig::default());
        let stats = ChainStats::from_chains(lines.len(), &chains);

        assert_eq!(stats.input_lines, 3);
        assert_eq!(stats.output_chains, 2);
        assert_eq!(stats.max_chain_length, 3);
        assert!(stats.reduction_ratio > 0.3);
    }
}
