//! Render settings (SPEC_FULL.md §A3): every tunable named in spec.md
//! §4, collected into one struct with the spec's stated defaults and
//! optional TOML override.
//!
//! Grounded on the teacher's `config.rs` (`RenderConfig`, a plain struct
//! with a `Default` impl), extended to the full cost-model/port-manager/
//! cache tunables and TOML loading the way `oxidized` loads its editor
//! config.

use serde::Deserialize;

use crate::charset::UnicodeLevel;
use crate::error::RenderError;
use crate::ports::{DEFAULT_APPROACH_ZONE_SIZE, DEFAULT_MARGIN, DEFAULT_MIN_SEPARATION, DEFAULT_PORT_WIDTH};

/// The A* cost model (spec.md §4.3), every field independently tunable.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct CostModel {
    pub straight_cost: i64,
    pub turn_cost: i64,
    pub jitter_penalty: bool,
    pub proximity_cost: i64,
    pub direction_bias: i64,
    pub initial_direction_bonus: i64,
    pub max_nodes: usize,
}

impl Default for CostModel {
    fn default() -> Self {
        Self {
            straight_cost: 10,
            turn_cost: 20,
            jitter_penalty: true,
            proximity_cost: 0,
            direction_bias: 0,
            initial_direction_bonus: 0,
            max_nodes: 50_000,
        }
    }
}

/// Port manager tunables (spec.md §4.2).
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct PortModel {
    pub margin: i64,
    pub port_width: i64,
    pub min_separation: i64,
    pub approach_zone_size: i64,
}

impl Default for PortModel {
    fn default() -> Self {
        Self {
            margin: DEFAULT_MARGIN,
            port_width: DEFAULT_PORT_WIDTH,
            min_separation: DEFAULT_MIN_SEPARATION,
            approach_zone_size: DEFAULT_APPROACH_ZONE_SIZE,
        }
    }
}

/// Top-level render settings, loaded from defaults, optionally
/// overridden by a TOML file, optionally overridden again by CLI flags
/// (SPEC_FULL.md §A3: file overrides defaults, flags override file).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    pub unicode_level: UnicodeLevel,
    pub cost_model: CostModel,
    pub port_model: PortModel,
    /// Smart pathfinder's node-expansion budget (spec.md §4.3: "raised to
    /// 100 000 for smart mode").
    pub smart_max_nodes: usize,
    pub cache_capacity: usize,
    pub color: bool,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            unicode_level: UnicodeLevel::default(),
            cost_model: CostModel::default(),
            port_model: PortModel::default(),
            smart_max_nodes: 100_000,
            cache_capacity: 100,
            color: false,
        }
    }
}

impl RenderSettings {
    pub fn from_toml_str(s: &str) -> Result<Self, RenderError> {
        toml::from_str(s).map_err(|e| RenderError::Internal(format!("invalid config: {e}")))
    }
}
