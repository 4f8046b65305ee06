#![forbid(unsafe_code)]

//! Placeholder grid layout for parsed diagrams.
//!
//! Positions depend only on node insertion order and the declared direction;
//! edge topology is ignored. Exporters that need a real layout run their own.

use mg_core::{Edge, GraphDirection, Node};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub column_spacing: i64,
    pub row_spacing: i64,
    pub origin_x: i64,
    pub origin_y: i64,
    /// Cells along the wrapping axis before starting a new row (TD) or column (LR).
    pub wrap: usize,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            column_spacing: 200,
            row_spacing: 150,
            origin_x: 100,
            origin_y: 100,
            wrap: 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LayoutStats {
    pub node_count: usize,
    pub edge_count: usize,
    pub columns: usize,
    pub rows: usize,
}

/// Grid cell of the node at `index`, as `(column, row)`.
#[must_use]
pub fn grid_cell(index: usize, direction: GraphDirection, wrap: usize) -> (usize, usize) {
    let wrap = wrap.max(1);
    match direction {
        GraphDirection::LR => (index / wrap, index % wrap),
        GraphDirection::TD | GraphDirection::TB | GraphDirection::BT | GraphDirection::RL => {
            (index % wrap, index / wrap)
        }
    }
}

/// Assign grid positions to `nodes` in place.
pub fn layout_grid(
    nodes: &mut [Node],
    edges: &[Edge],
    direction: GraphDirection,
    config: &LayoutConfig,
) -> LayoutStats {
    let mut stats = LayoutStats {
        node_count: nodes.len(),
        edge_count: edges.len(),
        ..LayoutStats::default()
    };
    if nodes.is_empty() {
        return stats;
    }

    for (index, node) in nodes.iter_mut().enumerate() {
        let (column, row) = grid_cell(index, direction, config.wrap);
        node.position = (
            config
                .origin_x
                .saturating_add(config.column_spacing.saturating_mul(to_i64(column))),
            config
                .origin_y
                .saturating_add(config.row_spacing.saturating_mul(to_i64(row))),
        );
        stats.columns = stats.columns.max(column + 1);
        stats.rows = stats.rows.max(row + 1);
    }

    debug!(
        "Grid layout: direction={direction}, nodes={}, columns={}, rows={}",
        stats.node_count, stats.columns, stats.rows
    );

    stats
}

fn to_i64(value: usize) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}
