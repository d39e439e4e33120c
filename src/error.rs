//! Error taxonomy (spec.md §7, SPEC_FULL.md §7 supplement).
//!
//! Grounded on `oxidized`'s and `seiren`'s `thiserror` library error enum
//! shape, and on the Fyrox `astar.rs` other-example's idea of a dedicated
//! budget-exhaustion variant distinct from a generic "no path" failure.

use thiserror::Error;

use crate::geometry::Direction;

/// The single public error type for every fallible operation in the
/// pathfinding/port/router layers and for the top-level `render()`.
#[derive(Debug, Error)]
pub enum RenderError {
    /// A connection references a nonexistent node, or a node id is
    /// duplicated.
    #[error("connection {connection_id} references an invalid node")]
    InputInvalid { connection_id: u64 },

    /// No path exists between two node edges under the obstacle
    /// predicate, including retries from alternate source edges.
    #[error("no route found from node {source_id} to node {target_id}")]
    RoutingFailure { source_id: u64, target_id: u64 },

    /// A* exceeded its node-expansion budget.
    #[error("pathfinding exceeded its node-expansion budget of {max_nodes}")]
    BudgetExhausted { max_nodes: usize },

    /// The port manager could not allocate a port even with stacking.
    #[error("node {node_id} has no room for another port on its {edge:?} edge")]
    PortExhausted { node_id: u64, edge: Direction },

    /// An invariant was violated; should be unreachable.
    #[error("internal invariant violated: {0}")]
    Internal(String),

    /// The diagram's `type` tag names a collaborator this core doesn't
    /// implement (spec.md §1: sequence-diagram rendering is out of
    /// scope).
    #[error("diagram type {0:?} is not supported by this renderer")]
    Unsupported(crate::diagram::DiagramType),

    #[error("failed to read input: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to decode diagram JSON: {0}")]
    Decode(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_include_identifying_context() {
        let err = RenderError::RoutingFailure {
            source_id: 1,
            target_id: 2,
        };
        assert!(err.to_string().contains('1'));
        assert!(err.to_string().contains('2'));
    }
}
