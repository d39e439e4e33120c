//! Path renderer (C9): draws a routed `Path` onto a `Canvas` as box-
//! drawing glyphs, resolving corners, junctions, and arrowheads
//! (spec.md §4.7).
//!
//! Grounded on the teacher's `renderers/ascii.rs` `paint_edge` (walk a
//! segment cell-by-cell, merge onto existing content, place an
//! arrowhead at the end), generalised into the spec's explicit 3-pass
//! algorithm: corner identification, segment drawing that skips corner
//! cells, then corner placement, plus the connection-endpoint
//! cross-to-tee downgrade the teacher's single-pass painter never did.

use std::collections::HashMap;

use crate::canvas::{CellStyle, Canvas};
use crate::charset::{LineStyle, UnicodeLevel};
use crate::geometry::{Direction, Path, Point};
use crate::junction::Arms;

/// Whether corner glyphs yield to or override the junction resolver
/// (spec.md §4.7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CornerMode {
    #[default]
    Standard,
    PreserveCorners,
}

/// Per-draw options (spec.md §4.7 inputs, plus the style/colour hints
/// spec.md §6 lets a connection carry).
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    pub draw_arrow_at_end: bool,
    pub draw_arrow_at_start: bool,
    pub is_connection: bool,
    pub mode: CornerMode,
    pub line_style: LineStyle,
    pub unicode_level: UnicodeLevel,
    pub style: CellStyle,
}

fn arrow_char(bc: &crate::charset::BoxChars, dir: Direction) -> char {
    match dir {
        Direction::North => bc.arrow_up,
        Direction::South => bc.arrow_down,
        Direction::East => bc.arrow_right,
        Direction::West => bc.arrow_left,
    }
}

/// All grid cells from `a` to `b` inclusive, in traversal order. `a` and
/// `b` must share exactly one axis (the renderer only ever sees
/// orthogonal segments).
fn segment_cells(a: Point, b: Point) -> Vec<Point> {
    if a.x == b.x {
        let step: i64 = if b.y >= a.y { 1 } else { -1 };
        let mut cells = Vec::new();
        let mut y = a.y;
        loop {
            cells.push(Point::new(a.x, y));
            if y == b.y {
                break;
            }
            y += step;
        }
        cells
    } else {
        let step: i64 = if b.x >= a.x { 1 } else { -1 };
        let mut cells = Vec::new();
        let mut x = a.x;
        loop {
            cells.push(Point::new(x, a.y));
            if x == b.x {
                break;
            }
            x += step;
        }
        cells
    }
}

/// The corner glyph for a vertex where the path turns from `incoming`
/// (direction of travel arriving at the vertex) to `outgoing`: an arm
/// pointing back the way it came, and one pointing onward.
fn corner_arms(incoming: Direction, outgoing: Direction) -> Arms {
    Arms::default().with(incoming.opposite(), true).with(outgoing, true)
}

/// The direction of travel from `a` to `b`, however many cells apart —
/// unlike `Direction::between`, this doesn't require unit adjacency,
/// since `optimize()` collapses straight runs into long segments.
fn segment_direction(a: Point, b: Point) -> Option<Direction> {
    if a.x == b.x && a.y != b.y {
        Some(if b.y > a.y { Direction::South } else { Direction::North })
    } else if a.y == b.y && a.x != b.x {
        Some(if b.x > a.x { Direction::East } else { Direction::West })
    } else {
        None
    }
}

/// Draws `path` onto `canvas` per spec.md §4.7's five-step algorithm.
pub fn draw_path(canvas: &mut Canvas, path: &Path, options: &RenderOptions) {
    let bc = *canvas.charset();

    if path.points.len() < 2 {
        if let Some(&p) = path.points.first() {
            if options.draw_arrow_at_end || options.draw_arrow_at_start {
                canvas.set_merge_point(p, bc.bullet);
                canvas.set_style(p.x, p.y, options.style.clone());
            }
        }
        return;
    }

    let closed = path.is_closed();
    let points: &[Point] = if closed { &path.points[..path.points.len() - 1] } else { &path.points };
    let n = points.len();

    let (line_h, line_v) = options.line_style.glyphs(options.unicode_level);

    // Pass 1: corner identification.
    let mut corners: HashMap<Point, Arms> = HashMap::new();
    if closed {
        for i in 0..n {
            let prev = points[(i + n - 1) % n];
            let next = points[(i + 1) % n];
            let (Some(incoming), Some(outgoing)) = (segment_direction(prev, points[i]), segment_direction(points[i], next)) else {
                continue;
            };
            if incoming != outgoing {
                corners.insert(points[i], corner_arms(incoming, outgoing));
            }
        }
    } else {
        for i in 1..n.saturating_sub(1) {
            let (Some(incoming), Some(outgoing)) = (segment_direction(points[i - 1], points[i]), segment_direction(points[i], points[i + 1])) else {
                continue;
            };
            if incoming != outgoing {
                corners.insert(points[i], corner_arms(incoming, outgoing));
            }
        }
    }

    // Pass 2: segment drawing, skipping corner cells.
    let segment_count = if closed { n } else { n - 1 };
    for seg in 0..segment_count {
        let a = points[seg];
        let b = points[(seg + 1) % n];
        let cells = segment_cells(a, b);
        let Some(direction) = Direction::between(cells[0], cells[1]) else {
            continue;
        };
        let line_char = if direction.is_horizontal() { line_h } else { line_v };
        let is_last_segment = !closed && seg == segment_count - 1;

        for (idx, &p) in cells.iter().enumerate() {
            if corners.contains_key(&p) {
                continue;
            }
            let is_terminal_cell = idx == cells.len() - 1 && is_last_segment;
            if is_terminal_cell && options.draw_arrow_at_end {
                canvas.set_merge_point(p, arrow_char(&bc, direction));
            } else if idx == 0 && seg == 0 && !closed && options.draw_arrow_at_start {
                canvas.set_merge_point(p, arrow_char(&bc, direction.opposite()));
            } else {
                canvas.set_merge_point(p, line_char);
            }
            canvas.set_style(p.x, p.y, options.style.clone());
        }
    }

    // Pass 3: corner placement.
    for (&p, &arms) in &corners {
        let glyph = arms.to_char(&bc);
        match options.mode {
            CornerMode::PreserveCorners => canvas.set_point(p, glyph),
            CornerMode::Standard => canvas.set_merge_point(p, glyph),
        }
        canvas.set_style(p.x, p.y, options.style.clone());
    }

    // Pass 4: connection endpoint post-pass.
    if options.is_connection && !closed {
        if let (Some(&first), Some(&second)) = (points.first(), points.get(1)) {
            if canvas.get_point(first) == bc.cross {
                if let Some(outgoing) = segment_direction(first, second) {
                    let arms = Arms::all().with(outgoing.opposite(), false);
                    canvas.set_point(first, arms.to_char(&bc));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charset::{BoxChars, UnicodeLevel};

    fn canvas() -> Canvas {
        Canvas::new(20, 20, BoxChars::for_level(UnicodeLevel::Full))
    }

    #[test]
    fn single_point_with_arrow_draws_bullet() {
        let mut c = canvas();
        let path = Path::new(vec![Point::new(5, 5)], 0);
        draw_path(&mut c, &path, &RenderOptions { draw_arrow_at_end: true, ..Default::default() });
        assert_eq!(c.get(5, 5), '●');
    }

    #[test]
    fn straight_horizontal_line_has_no_corners() {
        let mut c = canvas();
        let path = Path::new(vec![Point::new(1, 1), Point::new(5, 1)], 40);
        draw_path(&mut c, &path, &RenderOptions::default());
        for x in 1..=5 {
            assert_eq!(c.get(x, 1), '─');
        }
    }

    #[test]
    fn elbow_path_places_single_corner() {
        let mut c = canvas();
        let path = Path::new(vec![Point::new(1, 1), Point::new(1, 5), Point::new(5, 5)], 80);
        draw_path(&mut c, &path, &RenderOptions::default());
        assert_eq!(c.get(1, 5), '└');
        assert_eq!(c.get(1, 1), '│');
        assert_eq!(c.get(5, 5), '─');
    }

    #[test]
    fn arrow_drawn_at_open_path_end() {
        let mut c = canvas();
        let path = Path::new(vec![Point::new(1, 1), Point::new(5, 1)], 40);
        draw_path(&mut c, &path, &RenderOptions { draw_arrow_at_end: true, ..Default::default() });
        assert_eq!(c.get(5, 1), '▶');
    }

    #[test]
    fn closed_rectangle_renders_four_corners_no_junctions() {
        let mut c = canvas();
        let path = Path::new(
            vec![Point::new(2, 2), Point::new(6, 2), Point::new(6, 5), Point::new(2, 5), Point::new(2, 2)],
            1,
        );
        draw_path(&mut c, &path, &RenderOptions { mode: CornerMode::PreserveCorners, ..Default::default() });
        assert_eq!(c.get(2, 2), '┌');
        assert_eq!(c.get(6, 2), '┐');
        assert_eq!(c.get(6, 5), '┘');
        assert_eq!(c.get(2, 5), '└');
        assert_eq!(c.get(4, 2), '─');
        assert_eq!(c.get(2, 3), '│');
    }

    #[test]
    fn cross_at_connection_start_downgrades_to_tee() {
        let mut c = canvas();
        c.set_merge(5, 5, '│');
        c.set_merge(5, 5, '─');
        assert_eq!(c.get(5, 5), '┼');
        let path = Path::new(vec![Point::new(5, 5), Point::new(5, 8)], 30);
        draw_path(&mut c, &path, &RenderOptions { is_connection: true, ..Default::default() });
        assert_eq!(c.get(5, 5), '┬');
    }
}
