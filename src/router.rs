//! Router (C7): per-connection driver that picks an exit edge, invokes
//! the pathfinder, adjusts endpoints onto node perimeters, and orders
//! and retries connections deterministically (spec.md §4.5).
//!
//! Grounded on the `orthogonal_router.rs` other-example's `OrthogonalRouter`
//! shape (a struct holding routing config, a `route` entry point that
//! tries candidate paths and falls back) and on spec.md §4.5's own
//! numbered algorithm for everything route-specific; that other-example
//! has no port manager or self-loop handling, both of which are new here.

use std::collections::HashMap;

use tracing::{debug, trace};

use crate::config::RenderSettings;
use crate::diagram::{Connection, Node};
use crate::error::RenderError;
use crate::geometry::{Direction, Path, Point};
use crate::obstacle::ObstacleSet;
use crate::pathfind::smart::SmartPathfinder;
use crate::ports::{Port, PortManager};

const ALL_EDGES: [Direction; 4] = [Direction::North, Direction::East, Direction::South, Direction::West];

/// A completed connection route with the metadata spec.md §3 requires:
/// source/target node ids, the ports used (if any), and the router name.
#[derive(Debug, Clone)]
pub struct RoutedPath {
    pub connection_id: u64,
    pub source_node: u64,
    pub target_node: u64,
    pub source_port: Option<Port>,
    pub target_port: Option<Port>,
    pub router_name: &'static str,
    pub path: Path,
}

pub struct Router<'a> {
    nodes: &'a [Node],
    nodes_by_id: HashMap<u64, &'a Node>,
    port_manager: PortManager,
    pathfinder: SmartPathfinder,
    settings: &'a RenderSettings,
}

impl<'a> Router<'a> {
    pub fn new(nodes: &'a [Node], settings: &'a RenderSettings) -> Self {
        let pm = &settings.port_model;
        Self {
            nodes,
            nodes_by_id: nodes.iter().map(|n| (n.id, n)).collect(),
            port_manager: PortManager::new(pm.margin, pm.port_width, pm.min_separation, pm.approach_zone_size),
            pathfinder: SmartPathfinder::new(settings.cache_capacity, settings.smart_max_nodes),
            settings,
        }
    }

    pub fn port_manager(&self) -> &PortManager {
        &self.port_manager
    }

    /// Routes every connection in spec.md §4.5's deterministic order,
    /// rolling back previously-reserved ports on any failure.
    pub fn route_all(&self, connections: &[Connection]) -> Result<Vec<RoutedPath>, RenderError> {
        let ordered = self.order_connections(connections);
        let mut routed = Vec::with_capacity(ordered.len());
        for conn in ordered {
            match self.route_one(conn) {
                Ok(r) => routed.push(r),
                Err(e) => {
                    for r in &routed {
                        if let Some(p) = r.source_port {
                            self.port_manager.release(p);
                        }
                        if let Some(p) = r.target_port {
                            self.port_manager.release(p);
                        }
                    }
                    return Err(e);
                }
            }
        }
        Ok(routed)
    }

    /// Deterministic ordering (spec.md §4.5): nearest-centre-first,
    /// grouped within ±1 distance unit; ties within a group favour
    /// shared targets (by source vertical centre, then source id), else
    /// fall back to target id then source vertical centre then id. The
    /// literal "source id then target id" tie-break for non-shared
    /// targets is approximated by sorting on target id first within a
    /// distance group — see DESIGN.md's Open Question decisions.
    fn order_connections<'c>(&self, connections: &'c [Connection]) -> Vec<&'c Connection> {
        let mut with_distance: Vec<(i64, &Connection)> = connections
            .iter()
            .filter_map(|c| {
                let source = self.nodes_by_id.get(&c.from)?;
                let target = self.nodes_by_id.get(&c.to)?;
                Some((source.center().manhattan(target.center()), c))
            })
            .chain(connections.iter().filter(|c| {
                !self.nodes_by_id.contains_key(&c.from) || !self.nodes_by_id.contains_key(&c.to)
            }).map(|c| (i64::MAX, c)))
            .collect();
        with_distance.sort_by_key(|(d, c)| (*d, c.id));

        let mut group_id = 0i64;
        let mut groups: Vec<(i64, i64, &Connection)> = Vec::with_capacity(with_distance.len());
        let mut prev_distance: Option<i64> = None;
        for (distance, conn) in with_distance {
            if let Some(prev) = prev_distance {
                if (distance - prev).abs() > 1 {
                    group_id += 1;
                }
            }
            prev_distance = Some(distance);
            groups.push((group_id, distance, conn));
        }

        groups.sort_by_key(|(group, _, conn)| {
            let source_y = self.nodes_by_id.get(&conn.from).map(|n| n.center().y).unwrap_or(0);
            (*group, conn.to, source_y, conn.id)
        });

        groups.into_iter().map(|(_, _, c)| c).collect()
    }

    fn route_one(&self, conn: &Connection) -> Result<RoutedPath, RenderError> {
        let source = *self.nodes_by_id.get(&conn.from).ok_or(RenderError::InputInvalid { connection_id: conn.id })?;
        let target = *self.nodes_by_id.get(&conn.to).ok_or(RenderError::InputInvalid { connection_id: conn.id })?;

        if conn.is_self_loop() {
            debug!(connection_id = conn.id, node = source.id, "routed self-loop");
            return Ok(RoutedPath {
                connection_id: conn.id,
                source_node: source.id,
                target_node: target.id,
                source_port: None,
                target_port: None,
                router_name: "self-loop",
                path: self_loop_path(source),
            });
        }

        let primary_edge = exit_edge(source, target);
        let mut candidates = vec![primary_edge];
        candidates.extend(ALL_EDGES.into_iter().filter(|e| *e != primary_edge));

        let cost_model = &self.settings.cost_model;
        let approach_zone = self.settings.port_model.approach_zone_size;

        for edge in candidates {
            trace!(connection_id = conn.id, source = source.id, target = target.id, edge = ?edge, "attempting route via exit edge");
            let exit_point = source.bounds().edge_opening(edge);
            let obstacles = ObstacleSet::build(self.nodes, conn.id, Some(&self.port_manager), approach_zone);
            let predicate = obstacles.predicate();
            let raw = match self.pathfinder.find_path_to_area(exit_point, target.bounds(), &predicate, cost_model) {
                Ok(p) => p,
                Err(_) => continue,
            };

            let terminus = *raw.points.last().unwrap();
            let Some(target_edge) = find_matching_edge(target, terminus) else { continue };

            let adjusted_first = step_inward(exit_point, edge);
            let adjusted_last = step_inward(terminus, target_edge);
            let mut points = Vec::with_capacity(raw.points.len() + 2);
            points.push(adjusted_first);
            points.extend(raw.points.iter().copied());
            points.push(adjusted_last);
            let cost = raw.cost + 2 * cost_model.straight_cost;

            let source_port = self.port_manager.reserve_with_hint(source, edge, conn.id, exit_point).ok();
            let target_port = self.port_manager.reserve_with_hint(target, target_edge, conn.id, terminus).ok();

            debug!(connection_id = conn.id, chosen_edge = ?edge, cost, "routed connection");
            return Ok(RoutedPath {
                connection_id: conn.id,
                source_node: source.id,
                target_node: target.id,
                source_port,
                target_port,
                router_name: "orthogonal",
                path: Path::new(points, cost),
            });
        }

        Err(RenderError::RoutingFailure { source_id: source.id, target_id: target.id })
    }
}

/// Picks the exit edge by comparing `|dx|` and `|dy|` of the
/// centre-to-centre vector (spec.md §4.5 step 3).
fn exit_edge(source: &Node, target: &Node) -> Direction {
    let dx = target.center().x - source.center().x;
    let dy = target.center().y - source.center().y;
    if dx.abs() >= dy.abs() {
        if dx >= 0 { Direction::East } else { Direction::West }
    } else if dy >= 0 {
        Direction::South
    } else {
        Direction::North
    }
}

fn find_matching_edge(node: &Node, point: Point) -> Option<Direction> {
    ALL_EDGES.into_iter().find(|&e| node.bounds().edge_opening(e) == point)
}

fn step_inward(point: Point, edge: Direction) -> Point {
    let (dx, dy) = edge.opposite().step();
    Point::new(point.x + dx, point.y + dy)
}

/// Canned self-loop path (spec.md §4.5 step 2): exit the right edge at
/// one-third height, a three-cell arm right, drop three rows, and
/// re-enter the bottom edge at one-third width.
fn self_loop_path(node: &Node) -> Path {
    let b = node.bounds();
    let exit_y = b.y + b.height / 3;
    let entry_x = b.x + b.width / 3;
    let p0 = Point::new(b.right(), exit_y);
    let p1 = Point::new(p0.x + 3, exit_y);
    let p2 = Point::new(p1.x, exit_y + 3);
    let p3 = Point::new(entry_x, p2.y);
    let p4 = Point::new(entry_x, b.bottom());
    let mut points = vec![p0, p1, p2, p3];
    if points.last() != Some(&p4) {
        points.push(p4);
    }
    let cost = points.windows(2).map(|w| w[0].manhattan(w[1]) * 10).sum();
    Path::new(points, cost)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RenderSettings;

    fn node(id: u64, x: i64, y: i64, w: i64, h: i64) -> Node {
        Node::new(id, x, y, w, h)
    }

    #[test]
    fn horizontally_aligned_boxes_route_left_to_right() {
        let nodes = vec![node(1, 5, 5, 10, 5), node(2, 25, 5, 10, 5)];
        let settings = RenderSettings::default();
        let router = Router::new(&nodes, &settings);
        let conn = Connection::new(1, 1, 2);
        let routed = router.route_all(&[conn]).unwrap();
        assert_eq!(routed.len(), 1);
        let path = &routed[0].path;
        assert!(path.is_continuous());
        assert_eq!(*path.points.first().unwrap(), Point::new(14, 7));
        assert_eq!(*path.points.last().unwrap(), Point::new(25, 7));
    }

    #[test]
    fn self_loop_produces_short_inverted_u() {
        let nodes = vec![node(1, 5, 5, 12, 4)];
        let settings = RenderSettings::default();
        let router = Router::new(&nodes, &settings);
        let conn = Connection::new(1, 1, 1);
        let routed = router.route_all(&[conn]).unwrap();
        assert!(routed[0].path.is_continuous());
        assert!(routed[0].path.len() >= 4);
    }

    #[test]
    fn missing_node_is_input_invalid() {
        let nodes = vec![node(1, 0, 0, 4, 4)];
        let settings = RenderSettings::default();
        let router = Router::new(&nodes, &settings);
        let conn = Connection::new(7, 1, 99);
        let err = router.route_all(&[conn]).unwrap_err();
        assert!(matches!(err, RenderError::InputInvalid { connection_id: 7 }));
    }

    #[test]
    fn detour_routes_around_middle_obstacle() {
        let nodes = vec![node(1, 2, 2, 6, 3), node(2, 40, 2, 6, 3), node(3, 20, 2, 8, 3)];
        let settings = RenderSettings::default();
        let router = Router::new(&nodes, &settings);
        let conn = Connection::new(1, 1, 2);
        let routed = router.route_all(&[conn]).unwrap();
        let obstacle = nodes[2].bounds();
        assert!(routed[0].path.points.iter().all(|&p| !obstacle.contains(p)));
    }
}
