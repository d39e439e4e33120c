//! Diagram data model (spec.md §3, §6): nodes, connections, and the
//! hints maps the router/renderer read, decoded from the external
//! layout collaborator's JSON description.
//!
//! Grounded on the teacher's `syntax/types.rs` struct/builder
//! conventions (`Node::new`, `Edge::new`), restructured around
//! pre-positioned nodes instead of a parsed AST, and on `oxidized`'s
//! serde-based structured decoding for the JSON ingestion boundary
//! (SPEC_FULL.md §6 supplement).

use std::collections::HashMap;

use serde::Deserialize;

use crate::geometry::{Bounds, Point};

/// The diagram-type tag (spec.md §1): only `Flowchart` is handled by the
/// core; `Sequence` is accepted here and rejected at `render()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagramType {
    Flowchart,
    Sequence,
}

pub type Hints = HashMap<String, String>;

/// A sized, positioned node (spec.md §3). The id is opaque but must be
/// unique within a diagram — duplicates are an `InputInvalid` error.
#[derive(Debug, Clone, Deserialize)]
pub struct Node {
    pub id: u64,
    pub x: i64,
    pub y: i64,
    pub width: i64,
    pub height: i64,
    #[serde(default)]
    pub text: Vec<String>,
    #[serde(default)]
    pub hints: Hints,
}

impl Node {
    pub fn new(id: u64, x: i64, y: i64, width: i64, height: i64) -> Self {
        Self {
            id,
            x,
            y,
            width,
            height,
            text: Vec::new(),
            hints: Hints::new(),
        }
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::new(self.x, self.y, self.width, self.height)
    }

    pub fn center(&self) -> Point {
        self.bounds().center()
    }

    pub fn hint(&self, key: &str) -> Option<&str> {
        self.hints.get(key).map(String::as_str)
    }

    pub fn hint_is(&self, key: &str, value: &str) -> bool {
        self.hint(key) == Some(value)
    }
}

/// A directed edge between two node ids (spec.md §3). `from == to`
/// denotes a self-loop.
#[derive(Debug, Clone, Deserialize)]
pub struct Connection {
    pub id: u64,
    pub from: u64,
    pub to: u64,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub hints: Hints,
}

impl Connection {
    pub fn new(id: u64, from: u64, to: u64) -> Self {
        Self {
            id,
            from,
            to,
            label: None,
            hints: Hints::new(),
        }
    }

    pub fn is_self_loop(&self) -> bool {
        self.from == self.to
    }

    pub fn hint(&self, key: &str) -> Option<&str> {
        self.hints.get(key).map(String::as_str)
    }

    pub fn hint_is(&self, key: &str, value: &str) -> bool {
        self.hint(key) == Some(value)
    }

    pub fn is_bidirectional(&self) -> bool {
        self.hint_is("bidirectional", "true")
    }

    pub fn is_bold(&self) -> bool {
        self.hint_is("bold", "true")
    }
}

/// The top-level input to a render pass: fully positioned nodes plus
/// the connections between them.
#[derive(Debug, Clone, Deserialize)]
pub struct Diagram {
    #[serde(rename = "type")]
    pub diagram_type: DiagramType,
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub connections: Vec<Connection>,
}

impl Diagram {
    pub fn node(&self, id: u64) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Finds a duplicate node id, if any (spec.md §7 `InputInvalid`).
    pub fn duplicate_node_id(&self) -> Option<u64> {
        let mut seen = std::collections::HashSet::new();
        for n in &self.nodes {
            if !seen.insert(n.id) {
                return Some(n.id);
            }
        }
        None
    }
}
