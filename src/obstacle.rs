//! Obstacle predicate (C3): converts the node list plus per-connection
//! context into a pure `Point -> bool` blocking function (spec.md §4.1).
//!
//! No direct teacher analogue — the teacher has no obstacle-avoidance
//! routing at all (it draws straight/elbowed lines without detouring
//! around other nodes). Built from spec.md §4.1 and §9's guidance to keep
//! the predicate an owned, freeze-frame capability rather than a closure
//! over shared mutable state.

use crate::diagram::Node;
use crate::geometry::{Direction, Point};
use crate::ports::PortManager;

/// A physical or virtual obstacle, tagged as in spec.md §3 for debug
/// visualisation and predicate construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObstacleKind {
    Physical,
    VirtualPort,
    PortCorridor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObstacleZone {
    pub kind: ObstacleKind,
    pub node_id: u64,
    pub x: i64,
    pub y: i64,
    pub width: i64,
    pub height: i64,
}

impl ObstacleZone {
    fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x < self.x + self.width && p.y >= self.y && p.y < self.y + self.height
    }
}

const EDGES: [Direction; 4] = [
    Direction::North,
    Direction::South,
    Direction::East,
    Direction::West,
];

/// A freeze-frame obstacle list built for one connection's search, plus
/// the pure predicate derived from it.
pub struct ObstacleSet {
    zones: Vec<ObstacleZone>,
}

impl ObstacleSet {
    /// Builds the obstacle set for `active_connection`'s search.
    /// `port_manager`, if given, contributes port-corridor obstacles for
    /// ports already reserved by *other* connections (spec.md §4.1: "The
    /// active connection's own ports never contribute obstacles to its
    /// own search") — the only per-connection context the predicate
    /// actually needs, since node identity alone decides the physical
    /// and virtual-port rules.
    pub fn build(
        nodes: &[Node],
        active_connection: u64,
        port_manager: Option<&PortManager>,
        approach_zone_size: i64,
    ) -> Self {
        let mut zones = Vec::new();
        for node in nodes {
            zones.push(ObstacleZone {
                kind: ObstacleKind::Physical,
                node_id: node.id,
                x: node.x,
                y: node.y,
                width: node.width,
                height: node.height,
            });
            for edge in EDGES {
                let opening = node.bounds().edge_opening(edge);
                for p in node.bounds().perimeter_ring() {
                    if p == opening {
                        continue;
                    }
                    zones.push(ObstacleZone {
                        kind: ObstacleKind::VirtualPort,
                        node_id: node.id,
                        x: p.x,
                        y: p.y,
                        width: 1,
                        height: 1,
                    });
                }
            }
        }

        if let Some(pm) = port_manager {
            for node in nodes {
                for port in pm.occupied(node.id) {
                    if port.connection_id == active_connection as i64 {
                        continue;
                    }
                    // corridors from *other* connections still apply even at
                    // the active connection's own source/target node.
                    let (dx, dy) = port.edge.step();
                    let len = 2 * approach_zone_size;
                    let (w, h) = if port.edge.is_horizontal() {
                        (len, 1)
                    } else {
                        (1, len)
                    };
                    let ox = if dx < 0 { port.point.x - (w - 1) } else { port.point.x };
                    let oy = if dy < 0 { port.point.y - (h - 1) } else { port.point.y };
                    zones.push(ObstacleZone {
                        kind: ObstacleKind::PortCorridor,
                        node_id: node.id,
                        x: ox,
                        y: oy,
                        width: w,
                        height: h,
                    });
                }
            }
        }

        Self { zones }
    }

    pub fn zones(&self) -> &[ObstacleZone] {
        &self.zones
    }

    pub fn is_blocked(&self, p: Point) -> bool {
        self.zones.iter().any(|z| z.contains(p))
    }

    /// A boxed predicate, for call sites (the pathfinder) that want a
    /// plain `Fn(Point) -> bool` rather than a method on this type.
    pub fn predicate(&self) -> impl Fn(Point) -> bool + '_ {
        move |p| self.is_blocked(p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: u64, x: i64, y: i64, w: i64, h: i64) -> Node {
        Node::new(id, x, y, w, h)
    }

    #[test]
    fn blocks_interior_cells() {
        let nodes = vec![node(1, 0, 0, 4, 4)];
        let set = ObstacleSet::build(&nodes, 1, None, 2);
        assert!(set.is_blocked(Point::new(2, 2)));
    }

    #[test]
    fn perimeter_openings_are_free() {
        let nodes = vec![node(1, 0, 0, 4, 4)];
        let set = ObstacleSet::build(&nodes, 1, None, 2);
        let opening = nodes[0].bounds().edge_opening(Direction::North);
        assert!(!set.is_blocked(opening));
    }

    #[test]
    fn perimeter_non_opening_cells_are_blocked() {
        let nodes = vec![node(1, 0, 0, 4, 4)];
        let set = ObstacleSet::build(&nodes, 1, None, 2);
        // corner of the ring is never an opening.
        assert!(set.is_blocked(Point::new(-1, -1)));
    }

    #[test]
    fn far_away_cells_are_free() {
        let nodes = vec![node(1, 0, 0, 4, 4)];
        let set = ObstacleSet::build(&nodes, 1, None, 2);
        assert!(!set.is_blocked(Point::new(100, 100)));
    }
}
