//! Port manager (C4): allocates anchor points on node edges to
//! connections, with stacking fallback and minimum-separation rules
//! (spec.md §4.2).
//!
//! No direct teacher analogue (the teacher doesn't model ports at all —
//! it always exits at a fixed edge midpoint). Built from spec.md §4.2 and
//! §5's `RwLock`-guarded shared-state pattern; the map-of-vecs-behind-a-
//! lock shape mirrors how the teacher's own `port_manager`-adjacent idea
//! would be expressed in idiomatic Rust rather than anything copied.

use std::collections::HashMap;
use std::sync::RwLock;

use tracing::debug;

use crate::diagram::Node;
use crate::error::RenderError;
use crate::geometry::{Direction, Point};

pub const DEFAULT_MARGIN: i64 = 1;
pub const DEFAULT_PORT_WIDTH: i64 = 1;
pub const DEFAULT_MIN_SEPARATION: i64 = 3;
pub const DEFAULT_APPROACH_ZONE_SIZE: i64 = 2;

/// A reserved (or free) anchor point on a node's perimeter ring
/// (spec.md §3). `connection_id = -1` means free.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Port {
    pub node_id: u64,
    pub edge: Direction,
    pub position: i64,
    pub width: i64,
    pub point: Point,
    pub connection_id: i64,
    pub stack_level: u32,
}

impl Port {
    fn is_free(&self) -> bool {
        self.connection_id < 0
    }
}

struct EdgeState {
    candidates: Vec<Port>,
    /// how many ports have ever been allocated at a given base position,
    /// for stack-level bookkeeping.
    stack_counts: HashMap<i64, u32>,
}

struct NodeState {
    edges: HashMap<Direction, EdgeState>,
}

/// Candidate positions for one edge, spaced `port_width` apart from
/// `margin` to `edge_length - margin` (spec.md §4.2).
fn edge_length(node: &Node, edge: Direction) -> i64 {
    if edge.is_horizontal() {
        node.height
    } else {
        node.width
    }
}

fn point_for_position(node: &Node, edge: Direction, position: i64) -> Point {
    let bounds = node.bounds();
    match edge {
        Direction::North => Point::new(bounds.x + position, bounds.y - 1),
        Direction::South => Point::new(bounds.x + position, bounds.bottom()),
        Direction::West => Point::new(bounds.x - 1, bounds.y + position),
        Direction::East => Point::new(bounds.right(), bounds.y + position),
    }
}

fn offset_point(node: &Node, edge: Direction, point: Point, stack_level: u32) -> Point {
    if stack_level == 0 {
        return point;
    }
    let offset = (stack_level as i64 + 1) / 2;
    let offset = if stack_level % 2 == 1 { offset } else { -offset };
    let bounds = node.bounds();
    if edge.is_horizontal() {
        let y = point.y;
        let x = (point.x + offset).clamp(bounds.x - 2, bounds.right() + 1);
        Point::new(x, y)
    } else {
        let x = point.x;
        let y = (point.y + offset).clamp(bounds.y - 2, bounds.bottom() + 1);
        Point::new(x, y)
    }
}

fn build_node_state(node: &Node, margin: i64, port_width: i64) -> NodeState {
    let mut edges = HashMap::new();
    for edge in [Direction::North, Direction::South, Direction::East, Direction::West] {
        let len = edge_length(node, edge);
        let mut candidates = Vec::new();
        let mut position = margin;
        while position < len - margin {
            candidates.push(Port {
                node_id: node.id,
                edge,
                position,
                width: port_width,
                point: point_for_position(node, edge, position),
                connection_id: -1,
                stack_level: 0,
            });
            position += port_width;
        }
        edges.insert(
            edge,
            EdgeState {
                candidates,
                stack_counts: HashMap::new(),
            },
        );
    }
    NodeState { edges }
}

struct Inner {
    margin: i64,
    port_width: i64,
    min_separation: i64,
    approach_zone_size: i64,
    nodes: HashMap<u64, NodeState>,
}

impl Inner {
    fn node_mut(&mut self, node: &Node) -> &mut NodeState {
        let margin = self.margin;
        let port_width = self.port_width;
        self.nodes
            .entry(node.id)
            .or_insert_with(|| build_node_state(node, margin, port_width))
    }
}

/// The port manager, guarded by a single `RwLock` per spec.md §4.2/§5:
/// shared reads, exclusive writes.
pub struct PortManager {
    inner: RwLock<Inner>,
}

impl PortManager {
    pub fn new(margin: i64, port_width: i64, min_separation: i64, approach_zone_size: i64) -> Self {
        Self {
            inner: RwLock::new(Inner {
                margin,
                port_width,
                min_separation,
                approach_zone_size,
                nodes: HashMap::new(),
            }),
        }
    }

    pub fn approach_zone_size(&self) -> i64 {
        self.inner.read().unwrap().approach_zone_size
    }

    pub fn available(&self, node: &Node, edge: Direction) -> Vec<Port> {
        let mut guard = self.inner.write().unwrap();
        let state = guard.node_mut(node);
        state.edges[&edge]
            .candidates
            .iter()
            .filter(|p| p.is_free())
            .copied()
            .collect()
    }

    pub fn occupied(&self, node_id: u64) -> Vec<Port> {
        let guard = self.inner.read().unwrap();
        let Some(state) = guard.nodes.get(&node_id) else {
            return Vec::new();
        };
        state
            .edges
            .values()
            .flat_map(|e| e.candidates.iter().filter(|p| !p.is_free()).copied())
            .collect()
    }

    pub fn port_for(&self, node_id: u64, connection_id: u64) -> Option<Port> {
        let guard = self.inner.read().unwrap();
        let state = guard.nodes.get(&node_id)?;
        state
            .edges
            .values()
            .flat_map(|e| e.candidates.iter())
            .find(|p| p.connection_id == connection_id as i64)
            .copied()
    }

    /// Reserves the free candidate closest to the edge midpoint, subject
    /// to `min_separation` from already-reserved stack-level-0 ports;
    /// falls back to stacking when none qualify (spec.md §4.2).
    pub fn reserve(&self, node: &Node, edge: Direction, connection_id: u64) -> Result<Port, RenderError> {
        let mut guard = self.inner.write().unwrap();
        let min_sep = guard.min_separation;
        let state = guard.node_mut(node);
        let edge_state = state.edges.get_mut(&edge).unwrap();
        let len = if edge.is_horizontal() { node.height } else { node.width };
        let midpoint = len / 2;

        let occupied_base: Vec<i64> = edge_state
            .candidates
            .iter()
            .filter(|p| !p.is_free() && p.stack_level == 0)
            .map(|p| p.position)
            .collect();

        let mut best: Option<usize> = None;
        for (idx, port) in edge_state.candidates.iter().enumerate() {
            if !port.is_free() {
                continue;
            }
            if occupied_base.iter().any(|&o| (o - port.position).abs() < min_sep) {
                continue;
            }
            let better = match best {
                None => true,
                Some(b) => {
                    let bd = (edge_state.candidates[b].position - midpoint).abs();
                    let cd = (port.position - midpoint).abs();
                    cd < bd || (cd == bd && port.position < edge_state.candidates[b].position)
                }
            };
            if better {
                best = Some(idx);
            }
        }

        if let Some(idx) = best {
            edge_state.candidates[idx].connection_id = connection_id as i64;
            return Ok(edge_state.candidates[idx]);
        }

        drop(guard);
        self.reserve_via_stacking(node, edge, connection_id)
    }

    /// As `reserve`, but chooses the candidate minimising distance from
    /// `preferred_point` along the edge's tangent axis (spec.md §4.2).
    pub fn reserve_with_hint(
        &self,
        node: &Node,
        edge: Direction,
        connection_id: u64,
        preferred_point: Point,
    ) -> Result<Port, RenderError> {
        let mut guard = self.inner.write().unwrap();
        let min_sep = guard.min_separation;
        let state = guard.node_mut(node);
        let edge_state = state.edges.get_mut(&edge).unwrap();
        let target = if edge.is_horizontal() { preferred_point.y } else { preferred_point.x };

        let occupied_base: Vec<i64> = edge_state
            .candidates
            .iter()
            .filter(|p| !p.is_free() && p.stack_level == 0)
            .map(|p| p.position)
            .collect();

        let mut best: Option<usize> = None;
        for (idx, port) in edge_state.candidates.iter().enumerate() {
            if !port.is_free() {
                continue;
            }
            if occupied_base.iter().any(|&o| (o - port.position).abs() < min_sep) {
                continue;
            }
            let coord = if edge.is_horizontal() { port.point.y } else { port.point.x };
            let dist = (coord - target).abs();
            let better = match best {
                None => true,
                Some(b) => {
                    let bc = if edge.is_horizontal() { edge_state.candidates[b].point.y } else { edge_state.candidates[b].point.x };
                    dist < (bc - target).abs()
                }
            };
            if better {
                best = Some(idx);
            }
        }

        if let Some(idx) = best {
            edge_state.candidates[idx].connection_id = connection_id as i64;
            return Ok(edge_state.candidates[idx]);
        }

        drop(guard);
        self.reserve_via_stacking(node, edge, connection_id)
    }

    fn reserve_via_stacking(&self, node: &Node, edge: Direction, connection_id: u64) -> Result<Port, RenderError> {
        debug!(node_id = node.id, edge = ?edge, connection_id, "no free port candidate, falling back to stacking");
        let mut guard = self.inner.write().unwrap();
        let state = guard.node_mut(node);
        let edge_state = state.edges.get_mut(&edge).unwrap();
        if edge_state.candidates.is_empty() {
            return Err(RenderError::PortExhausted { node_id: node.id, edge });
        }
        let len = if edge.is_horizontal() { node.height } else { node.width };
        let midpoint = len / 2;

        // pick the base position with the lowest current stack count,
        // tie-break toward edge centre.
        let mut best_position = edge_state.candidates[0].position;
        let mut best_count = *edge_state.stack_counts.get(&best_position).unwrap_or(&0);
        for port in &edge_state.candidates {
            let count = *edge_state.stack_counts.get(&port.position).unwrap_or(&0);
            let better = count < best_count
                || (count == best_count && (port.position - midpoint).abs() < (best_position - midpoint).abs());
            if better {
                best_count = count;
                best_position = port.position;
            }
        }

        let stack_level = best_count + 1;
        edge_state.stack_counts.insert(best_position, stack_level);
        let base_point = point_for_position(node, edge, best_position);
        let point = offset_point(node, edge, base_point, stack_level);
        let port = Port {
            node_id: node.id,
            edge,
            position: best_position,
            width: 1,
            point,
            connection_id: connection_id as i64,
            stack_level,
        };
        edge_state.candidates.push(port);
        Ok(port)
    }

    /// Idempotent: releasing an already-free port is a no-op.
    pub fn release(&self, port: Port) {
        let mut guard = self.inner.write().unwrap();
        if let Some(state) = guard.nodes.get_mut(&port.node_id) {
            if let Some(edge_state) = state.edges.get_mut(&port.edge) {
                for p in edge_state.candidates.iter_mut() {
                    if p.point == port.point && p.stack_level == port.stack_level {
                        p.connection_id = -1;
                    }
                }
            }
        }
    }
}
