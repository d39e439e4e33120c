//! Smart pathfinder (C6): a façade over A* with a direct L-shape fast
//! path, post-search path optimisation, and a result cache
//! (spec.md §4.4).
//!
//! The fast path and optimisation passes are new logic (the teacher has
//! no equivalent — it never detours around obstacles at all), built
//! directly from spec.md §4.4's three numbered rules. The cache wiring
//! is grounded on `pathfind::cache` (itself grounded as noted there).

use tracing::trace;

use crate::config::CostModel;
use crate::error::RenderError;
use crate::geometry::{Path, Point};
use crate::pathfind::astar;
use crate::pathfind::cache::{cache_key, PathCache};

/// Tries a horizontal-then-vertical or vertical-then-horizontal 3-point
/// L-path; returns it if every cell along the way is clear
/// (spec.md §4.4 rule 1).
fn direct_l_shape(start: Point, end: Point, blocked: &impl Fn(Point) -> bool) -> Option<Path> {
    if start == end {
        return Some(Path::new(vec![start], 0));
    }
    let corners = [Point::new(end.x, start.y), Point::new(start.x, end.y)];
    for corner in corners {
        if corner != start && corner != end && blocked(corner) {
            continue;
        }
        if line_clear(start, corner, blocked) && line_clear(corner, end, blocked) {
            let mut points = vec![start];
            if corner != start {
                points.push(corner);
            }
            if corner != end {
                points.push(end);
            }
            let cost = (start.manhattan(corner) + corner.manhattan(end)) * 10;
            return Some(Path::new(points, cost));
        }
    }
    None
}

fn line_clear(a: Point, b: Point, blocked: &impl Fn(Point) -> bool) -> bool {
    if a.x == b.x {
        let (lo, hi) = (a.y.min(b.y), a.y.max(b.y));
        (lo..=hi).all(|y| !blocked(Point::new(a.x, y)))
    } else if a.y == b.y {
        let (lo, hi) = (a.x.min(b.x), a.x.max(b.x));
        (lo..=hi).all(|x| !blocked(Point::new(x, a.y)))
    } else {
        false
    }
}

/// Collapses colinear runs into their endpoints (spec.md §4.4 rule 2,
/// "simplify").
fn simplify(points: &[Point]) -> Vec<Point> {
    if points.len() <= 2 {
        return points.to_vec();
    }
    let mut out = vec![points[0]];
    for i in 1..points.len() - 1 {
        let (prev, curr, next) = (points[i - 1], points[i], points[i + 1]);
        let d1 = (curr.x - prev.x, curr.y - prev.y);
        let d2 = (next.x - curr.x, next.y - curr.y);
        if d1 != d2 {
            out.push(curr);
        }
    }
    out.push(*points.last().unwrap());
    out
}

/// Scans triples `(a, b, c)` forming an L and replaces them with a
/// direct L-shape shortcut if one is clear (spec.md §4.4 rule 2,
/// "dog-leg reduction").
fn reduce_dog_legs(points: Vec<Point>, blocked: &impl Fn(Point) -> bool) -> Vec<Point> {
    if points.len() < 3 {
        return points;
    }
    let mut out = vec![points[0]];
    let mut i = 0;
    while i < points.len() - 1 {
        if i + 2 < points.len() {
            let (a, c) = (points[i], points[i + 2]);
            if let Some(shortcut) = direct_l_shape(a, c, blocked) {
                if shortcut.points.len() <= 3 {
                    out.extend(shortcut.points.iter().skip(1));
                    i += 2;
                    continue;
                }
            }
        }
        out.push(points[i + 1]);
        i += 1;
    }
    simplify(&out)
}

/// For `(p0, p1, p2, p3)` sharing an axis between `p0` and `p3` with a
/// small deviation, attempts to straighten the middle onto `p0`'s line
/// (spec.md §4.4 rule 2, "segment alignment").
fn align_segments(points: Vec<Point>, blocked: &impl Fn(Point) -> bool) -> Vec<Point> {
    if points.len() != 4 {
        return points;
    }
    let (p0, p1, p2, p3) = (points[0], points[1], points[2], points[3]);
    if p0.x == p3.x && (p1.x - p0.x).abs() <= 3 && (p2.x - p0.x).abs() <= 3 {
        let candidate = [p0, Point::new(p0.x, p3.y), p3];
        if line_clear(candidate[0], candidate[1], blocked) && line_clear(candidate[1], candidate[2], blocked) {
            return candidate.to_vec();
        }
    }
    if p0.y == p3.y && (p1.y - p0.y).abs() <= 3 && (p2.y - p0.y).abs() <= 3 {
        let candidate = [p0, Point::new(p3.x, p0.y), p3];
        if line_clear(candidate[0], candidate[1], blocked) && line_clear(candidate[1], candidate[2], blocked) {
            return candidate.to_vec();
        }
    }
    points
}

fn path_cost(points: &[Point]) -> i64 {
    points.windows(2).map(|w| w[0].manhattan(w[1]) * 10).sum()
}

fn optimize(path: Path, blocked: &impl Fn(Point) -> bool) -> Path {
    let simplified = simplify(&path.points);
    let reduced = reduce_dog_legs(simplified, blocked);
    let aligned = align_segments(reduced, blocked);
    let cost = path_cost(&aligned).min(path.cost);
    Path::new(aligned, cost)
}

/// The smart pathfinder (spec.md §4.4): owns its cache and delegates to
/// A* when the fast path and cache both miss.
pub struct SmartPathfinder {
    cache: PathCache,
    max_nodes: usize,
}

impl SmartPathfinder {
    /// `max_nodes` is the smart-mode A* expansion budget (spec.md §4.3:
    /// raised above `cost_model.max_nodes` for smart-mode searches).
    pub fn new(cache_capacity: usize, max_nodes: usize) -> Self {
        Self { cache: PathCache::new(cache_capacity), max_nodes }
    }

    pub fn cache(&self) -> &PathCache {
        &self.cache
    }

    pub fn find_path(
        &self,
        start: Point,
        end: Point,
        blocked: &impl Fn(Point) -> bool,
        cost_model: &CostModel,
    ) -> Result<Path, RenderError> {
        let key = cache_key(blocked, start, end);
        if let Some(cached) = self.cache.get(key) {
            return Ok(cached);
        }

        if let Some(path) = direct_l_shape(start, end, blocked) {
            trace!(start = ?start, end = ?end, "fast-path L-shape found, bypassing A*");
            self.cache.put(key, path.clone());
            return Ok(path);
        }

        let raw = astar::search_with_budget(start, end, blocked, cost_model, self.max_nodes)?;
        let optimized = optimize(raw, blocked);
        self.cache.put(key, optimized.clone());
        Ok(optimized)
    }

    pub fn find_path_to_area(
        &self,
        start: Point,
        target: crate::geometry::Bounds,
        blocked: &impl Fn(Point) -> bool,
        cost_model: &CostModel,
    ) -> Result<Path, RenderError> {
        let raw = astar::search_to_area_with_budget(start, target, blocked, cost_model, self.max_nodes)?;
        Ok(optimize(raw, blocked))
    }
}
