//! Marching-squares isolines.
//!
//! Each grid cell (the square between four neighbouring points) is classified
//! by which corners lie at or above the level. Crossing points are linearly
//! interpolated on the cell edges, and segments from neighbouring cells are
//! joined through the edges they share. Saddle cells are resolved with the
//! mean of their four corners.
//!
//! Open lines run from one grid border to another. Closed lines repeat their
//! first coordinate at the end.

use rayon::prelude::*;
use ridgeline_dem::{ElevationGrid, ElevationPoint};
use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

/// One polyline at a single elevation level.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Contour {
    /// Elevation of the isoline.
    pub level: f64,
    /// Vertices as `(lon, lat)` pairs.
    pub coordinates: Vec<(f64, f64)>,
}

impl Contour {
    /// Whether the line ends where it starts.
    pub fn is_closed(&self) -> bool {
        self.coordinates.len() > 2 && self.coordinates.first() == self.coordinates.last()
    }
}

/// Levels 600 to 1200 m every 100 m.
pub fn default_contour_levels() -> Vec<f64> {
    (6..=12).map(|k| k as f64 * 100.0).collect()
}

/// A cell edge, identified by its lower-index grid point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum EdgeKey {
    /// Between `(row, col)` and `(row, col + 1)`.
    Horizontal(usize, usize),
    /// Between `(row, col)` and `(row + 1, col)`.
    Vertical(usize, usize),
}

/// Trace every level. Output is grouped by level in the order given.
pub fn trace_contours(grid: &ElevationGrid, levels: &[f64]) -> Vec<Contour> {
    let per_level: Vec<Vec<Contour>> = levels.par_iter().map(|&level| trace_level(grid, level)).collect();
    let contours: Vec<Contour> = per_level.into_iter().flatten().collect();
    debug!(levels = levels.len(), contours = contours.len(), "Traced contours");
    contours
}

/// Trace a single level. No crossing yields an empty list.
pub fn trace_level(grid: &ElevationGrid, level: f64) -> Vec<Contour> {
    let n = grid.grid_size();
    if n < 2 || level.is_nan() {
        return Vec::new();
    }
    let tracer = Tracer {
        points: grid.points(),
        n,
        level,
    };
    let segments = tracer.segments();
    tracer.stitch(&segments)
}

struct Tracer<'a> {
    points: &'a [ElevationPoint],
    n: usize,
    level: f64,
}

impl Tracer<'_> {
    fn point(&self, row: usize, col: usize) -> &ElevationPoint {
        &self.points[row * self.n + col]
    }

    fn above(&self, row: usize, col: usize) -> bool {
        self.point(row, col).elevation >= self.level
    }

    /// All cell segments, in row-major cell order.
    fn segments(&self) -> Vec<(EdgeKey, EdgeKey)> {
        let mut segments = Vec::new();
        for i in 0..self.n - 1 {
            for j in 0..self.n - 1 {
                // Corners a=(i,j) b=(i,j+1) c=(i+1,j+1) d=(i+1,j)
                let a = self.above(i, j);
                let b = self.above(i, j + 1);
                let c = self.above(i + 1, j + 1);
                let d = self.above(i + 1, j);

                // Edges: e0 = a-b, e1 = b-c, e2 = d-c, e3 = a-d
                let e0 = EdgeKey::Horizontal(i, j);
                let e1 = EdgeKey::Vertical(i, j + 1);
                let e2 = EdgeKey::Horizontal(i + 1, j);
                let e3 = EdgeKey::Vertical(i, j);

                let mut crossed = Vec::with_capacity(4);
                if a != b {
                    crossed.push(e0);
                }
                if b != c {
                    crossed.push(e1);
                }
                if c != d {
                    crossed.push(e2);
                }
                if d != a {
                    crossed.push(e3);
                }

                match crossed.len() {
                    2 => segments.push((crossed[0], crossed[1])),
                    4 => {
                        let mean = (self.point(i, j).elevation
                            + self.point(i, j + 1).elevation
                            + self.point(i + 1, j + 1).elevation
                            + self.point(i + 1, j).elevation)
                            / 4.0;
                        let center = mean >= self.level;
                        // Corners that differ from the center are cut off on their own.
                        if b != center {
                            segments.push((e0, e1));
                            segments.push((e2, e3));
                        } else {
                            segments.push((e3, e0));
                            segments.push((e1, e2));
                        }
                    }
                    _ => {}
                }
            }
        }
        segments
    }

    /// Interpolated `(lon, lat)` where the level crosses an edge.
    fn crossing(&self, edge: EdgeKey) -> (f64, f64) {
        let (p, q) = match edge {
            EdgeKey::Horizontal(r, c) => (self.point(r, c), self.point(r, c + 1)),
            EdgeKey::Vertical(r, c) => (self.point(r, c), self.point(r + 1, c)),
        };
        let t = (self.level - p.elevation) / (q.elevation - p.elevation);
        (p.lon + t * (q.lon - p.lon), p.lat + t * (q.lat - p.lat))
    }

    /// Join segments sharing an edge into polylines.
    fn stitch(&self, segments: &[(EdgeKey, EdgeKey)]) -> Vec<Contour> {
        // Nodes in first-seen order so output is deterministic.
        let mut index: HashMap<EdgeKey, usize> = HashMap::new();
        let mut nodes: Vec<EdgeKey> = Vec::new();
        let mut adjacency: Vec<Vec<usize>> = Vec::new();

        let mut node_id = |edge: EdgeKey, nodes: &mut Vec<EdgeKey>, adjacency: &mut Vec<Vec<usize>>| {
            *index.entry(edge).or_insert_with(|| {
                nodes.push(edge);
                adjacency.push(Vec::with_capacity(2));
                nodes.len() - 1
            })
        };

        for &(from, to) in segments {
            let u = node_id(from, &mut nodes, &mut adjacency);
            let v = node_id(to, &mut nodes, &mut adjacency);
            adjacency[u].push(v);
            adjacency[v].push(u);
        }

        let mut visited = vec![false; nodes.len()];
        let mut contours = Vec::new();

        // Open lines start at border edges (a single segment).
        for start in 0..nodes.len() {
            if !visited[start] && adjacency[start].len() == 1 {
                let chain = walk(start, &adjacency, &mut visited);
                self.push_contour(&mut contours, &nodes, &chain, false);
            }
        }
        // What is left forms closed loops.
        for start in 0..nodes.len() {
            if !visited[start] {
                let chain = walk(start, &adjacency, &mut visited);
                self.push_contour(&mut contours, &nodes, &chain, true);
            }
        }
        contours
    }

    fn push_contour(&self, contours: &mut Vec<Contour>, nodes: &[EdgeKey], chain: &[usize], closed: bool) {
        let mut coordinates: Vec<(f64, f64)> = Vec::with_capacity(chain.len() + 1);
        for &id in chain {
            let xy = self.crossing(nodes[id]);
            // Crossings exactly on a grid point repeat across edges.
            if coordinates.last() != Some(&xy) {
                coordinates.push(xy);
            }
        }
        if closed && coordinates.len() > 1 && coordinates.first() != coordinates.last() {
            coordinates.push(coordinates[0]);
        }
        if coordinates.len() >= 2 {
            contours.push(Contour {
                level: self.level,
                coordinates,
            });
        }
    }
}

/// Follow unvisited neighbours from `start` until the chain ends.
fn walk(start: usize, adjacency: &[Vec<usize>], visited: &mut [bool]) -> Vec<usize> {
    let mut chain = vec![start];
    visited[start] = true;
    let mut current = start;
    while let Some(&next) = adjacency[current].iter().find(|&&v| !visited[v]) {
        visited[next] = true;
        chain.push(next);
        current = next;
    }
    chain
}
