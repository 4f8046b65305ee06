use mg_core::{
    DiagramMetadata, DiagramType, Edge, GraphDirection, LineFault, Node, ParseError, ParseResult,
    ParseWarning, ShapeKind,
};
use mg_layout::{LayoutConfig, layout_grid};
use tracing::debug;

use crate::SourceLine;
use crate::detect::{DetectionMethod, header_direction, names_flowchart};
use crate::graph_builder::GraphBuilder;
use crate::patterns::{LineClass, NodeToken, classify_statement, split_statements};

/// Parse flowchart lines; `lines[0]` is the declaration and is consumed.
pub(crate) fn parse_flowchart(
    lines: &[SourceLine<'_>],
    method: DetectionMethod,
    layout: &LayoutConfig,
) -> Result<ParseResult, ParseError> {
    let mut builder = GraphBuilder::new();
    let mut direction = GraphDirection::default();

    if let Some(header) = lines.first() {
        if let Some(declared) = header_direction(header.text) {
            direction = declared;
        }
        if method == DetectionMethod::Fallback {
            let warning = if names_flowchart(header.text) {
                ParseWarning::missing_direction(header.text)
            } else {
                ParseWarning::missing_declaration(header.text)
            };
            builder.add_warning(warning);
        }
    }

    for line in lines.iter().skip(1) {
        for statement in split_statements(line.text) {
            apply_statement(line.number, statement, &mut builder).map_err(|cause| {
                ParseError::Line {
                    line_number: line.number,
                    line: line.text.to_string(),
                    cause,
                }
            })?;
        }
    }

    let mut graph = builder.finish();
    let stats = layout_grid(&mut graph.nodes, &graph.edges, direction, layout);
    debug!(
        "Parsed flowchart: direction={direction}, nodes={}, edges={}, warnings={}",
        stats.node_count,
        stats.edge_count,
        graph.warnings.len()
    );

    Ok(ParseResult {
        diagram_type: DiagramType::Flowchart,
        metadata: DiagramMetadata::Flowchart {
            direction,
            node_count: graph.nodes.len(),
            edge_count: graph.edges.len(),
        },
        nodes: graph.nodes,
        edges: graph.edges,
        warnings: graph.warnings,
    })
}

fn apply_statement(
    line_number: usize,
    statement: &str,
    builder: &mut GraphBuilder,
) -> Result<(), LineFault> {
    match classify_statement(statement) {
        LineClass::Node(token) => resolve_endpoint(&token, builder),
        LineClass::Edges(links) => {
            for link in links {
                let label = link.pattern.resolve_label(&link.captures)?;
                resolve_endpoint(&link.captures.from, builder);
                resolve_endpoint(&link.captures.to, builder);
                builder.push_edge(Edge::new(
                    link.captures.from.id,
                    link.captures.to.id,
                    label,
                    link.pattern.kind,
                ));
            }
        }
        LineClass::Bare(id) => builder.ensure_node(id, ShapeKind::Rectangle),
        LineClass::Unparsed => {
            builder.add_warning(ParseWarning::unparsed_line(line_number, statement));
        }
    }
    Ok(())
}

/// Declared tokens overwrite; bare references are synthesized when absent.
fn resolve_endpoint(token: &NodeToken<'_>, builder: &mut GraphBuilder) {
    match token.declared() {
        Some((shape, label)) => builder.upsert_node(Node::new(token.id, label, shape)),
        None => builder.ensure_node(token.id, ShapeKind::Rectangle),
    }
}
