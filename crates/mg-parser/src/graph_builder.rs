use std::collections::BTreeMap;

use mg_core::{Edge, Node, ParseWarning, ShapeKind};
use tracing::warn;

/// Per-parse accumulator: insertion-ordered node map, edge list, warnings.
#[derive(Debug, Default)]
pub(crate) struct GraphBuilder {
    nodes: Vec<Node>,
    node_index_by_id: BTreeMap<String, usize>,
    edges: Vec<Edge>,
    warnings: Vec<ParseWarning>,
}

pub(crate) struct BuiltGraph {
    pub(crate) nodes: Vec<Node>,
    pub(crate) edges: Vec<Edge>,
    pub(crate) warnings: Vec<ParseWarning>,
}

impl GraphBuilder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a node. A replaced node keeps its original slot.
    pub(crate) fn upsert_node(&mut self, node: Node) {
        if let Some(&index) = self.node_index_by_id.get(&node.id) {
            self.nodes[index] = node;
            return;
        }
        self.node_index_by_id.insert(node.id.clone(), self.nodes.len());
        self.nodes.push(node);
    }

    /// Synthesize `id` with label = id unless it already exists.
    pub(crate) fn ensure_node(&mut self, id: &str, shape: ShapeKind) {
        if !self.node_index_by_id.contains_key(id) {
            self.upsert_node(Node::synthesized(id, shape));
        }
    }

    pub(crate) fn push_edge(&mut self, edge: Edge) {
        self.edges.push(edge);
    }

    pub(crate) fn add_warning(&mut self, warning: ParseWarning) {
        warn!("{}", warning.message);
        self.warnings.push(warning);
    }

    pub(crate) fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub(crate) fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub(crate) fn finish(self) -> BuiltGraph {
        BuiltGraph {
            nodes: self.nodes,
            edges: self.edges,
            warnings: self.warnings,
        }
    }
}
