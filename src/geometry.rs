//! Geometry primitives — grid coordinates and axis-aligned rectangles (C1).

use std::ops::Add;

/// An integer cell coordinate on the routing grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Point {
    pub x: i64,
    pub y: i64,
}

impl Point {
    pub fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    /// Manhattan distance to another point.
    pub fn manhattan(self, other: Point) -> i64 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }
}

impl Add<(i64, i64)> for Point {
    type Output = Point;

    fn add(self, (dx, dy): (i64, i64)) -> Point {
        Point::new(self.x + dx, self.y + dy)
    }
}

/// A cardinal direction of travel on the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    /// The (dx, dy) unit step for this direction in screen coordinates
    /// (y grows downward).
    pub fn step(self) -> (i64, i64) {
        match self {
            Direction::North => (0, -1),
            Direction::South => (0, 1),
            Direction::East => (1, 0),
            Direction::West => (-1, 0),
        }
    }

    pub fn opposite(self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::South => Direction::North,
            Direction::East => Direction::West,
            Direction::West => Direction::East,
        }
    }

    /// The direction of travel from `from` to `to`, if they are
    /// orthogonally adjacent (differ by exactly one cell on one axis).
    pub fn between(from: Point, to: Point) -> Option<Direction> {
        match (to.x - from.x, to.y - from.y) {
            (0, -1) => Some(Direction::North),
            (0, 1) => Some(Direction::South),
            (1, 0) => Some(Direction::East),
            (-1, 0) => Some(Direction::West),
            _ => None,
        }
    }

    pub fn is_horizontal(self) -> bool {
        matches!(self, Direction::East | Direction::West)
    }
}

/// An axis-aligned rectangle `[min, max)` in cell space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub x: i64,
    pub y: i64,
    pub width: i64,
    pub height: i64,
}

impl Bounds {
    pub fn new(x: i64, y: i64, width: i64, height: i64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> i64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> i64 {
        self.y + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2, self.y + self.height / 2)
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x < self.right() && p.y >= self.y && p.y < self.bottom()
    }

    /// The ring of cells exactly one unit outside this rectangle.
    pub fn perimeter_ring(&self) -> impl Iterator<Item = Point> + '_ {
        let x0 = self.x - 1;
        let y0 = self.y - 1;
        let x1 = self.right();
        let y1 = self.bottom();
        (x0..=x1).flat_map(move |x| (y0..=y1).map(move |y| Point::new(x, y))).filter(move |p| {
            p.x == x0 || p.x == x1 || p.y == y0 || p.y == y1
        })
    }

    /// The midpoint opening on the given edge, one cell outside the
    /// rectangle, per spec.md §4.1: floor-division midpoints.
    pub fn edge_opening(&self, edge: Direction) -> Point {
        match edge {
            Direction::North => Point::new(self.x + self.width / 2, self.y - 1),
            Direction::South => Point::new(self.x + self.width / 2, self.bottom()),
            Direction::West => Point::new(self.x - 1, self.y + self.height / 2),
            Direction::East => Point::new(self.right(), self.y + self.height / 2),
        }
    }
}

/// An ordered sequence of grid points, continuous under the invariant
/// checked by `is_continuous`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Path {
    pub points: Vec<Point>,
    pub cost: i64,
}

impl Path {
    pub fn new(points: Vec<Point>, cost: i64) -> Self {
        Self { points, cost }
    }

    pub fn is_continuous(&self) -> bool {
        self.points.windows(2).all(|w| w[0].manhattan(w[1]) == 1)
    }

    pub fn is_closed(&self) -> bool {
        self.points.len() >= 3 && self.points.first() == self.points.last()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manhattan_distance() {
        assert_eq!(Point::new(0, 0).manhattan(Point::new(3, 4)), 7);
    }

    #[test]
    fn direction_between_adjacent() {
        assert_eq!(
            Direction::between(Point::new(2, 2), Point::new(3, 2)),
            Some(Direction::East)
        );
        assert_eq!(
            Direction::between(Point::new(2, 2), Point::new(2, 1)),
            Some(Direction::North)
        );
        assert_eq!(Direction::between(Point::new(2, 2), Point::new(4, 2)), None);
    }

    #[test]
    fn edge_openings_use_floor_division() {
        let b = Bounds::new(5, 5, 10, 5);
        assert_eq!(b.edge_opening(Direction::North), Point::new(10, 4));
        assert_eq!(b.edge_opening(Direction::South), Point::new(10, 10));
        assert_eq!(b.edge_opening(Direction::West), Point::new(4, 7));
        assert_eq!(b.edge_opening(Direction::East), Point::new(15, 7));
    }

    #[test]
    fn perimeter_ring_excludes_interior() {
        let b = Bounds::new(0, 0, 2, 2);
        let ring: Vec<Point> = b.perimeter_ring().collect();
        assert!(!ring.contains(&Point::new(0, 0)));
        assert!(ring.contains(&Point::new(-1, -1)));
        assert!(ring.contains(&Point::new(2, 2)));
        assert_eq!(ring.len(), 4 * 2 + 4); // perimeter of a 4x4 bounding ring
    }

    #[test]
    fn path_continuity() {
        let p = Path::new(
            vec![Point::new(0, 0), Point::new(1, 0), Point::new(1, 1)],
            2,
        );
        assert!(p.is_continuous());
        let bad = Path::new(vec![Point::new(0, 0), Point::new(2, 0)], 2);
        assert!(!bad.is_continuous());
    }

    #[test]
    fn path_closed_detection() {
        let closed = Path::new(
            vec![
                Point::new(0, 0),
                Point::new(1, 0),
                Point::new(1, 1),
                Point::new(0, 0),
            ],
            3,
        );
        assert!(closed.is_closed());
        let open = Path::new(vec![Point::new(0, 0), Point::new(1, 0)], 1);
        assert!(!open.is_closed());
    }
}
