use mg_core::{DiagramMetadata, DiagramType, Edge, EdgeKind, Node, ParseResult, ShapeKind};
use tracing::debug;

use crate::SourceLine;
use crate::graph_builder::GraphBuilder;
use crate::patterns::split_identifier;

/// Parse sequence lines; `lines[0]` is the declaration and is consumed.
///
/// Lines that are neither participants nor messages are skipped without a
/// warning. Message endpoints that were never declared become participants.
pub(crate) fn parse_sequence(lines: &[SourceLine<'_>]) -> ParseResult {
    let mut builder = GraphBuilder::new();

    for line in lines.iter().skip(1) {
        if let Some((id, label)) = parse_participant(line.text) {
            builder.upsert_node(Node::new(id, label, ShapeKind::Participant));
            continue;
        }

        if let Some(message) = parse_message(line.text) {
            builder.ensure_node(message.from, ShapeKind::Participant);
            builder.ensure_node(message.to, ShapeKind::Participant);
            builder.push_edge(Edge::new(
                message.from,
                message.to,
                message.text,
                EdgeKind::Message,
            ));
        }
    }

    let participant_count = builder.node_count();
    let message_count = builder.edge_count();
    debug!("Parsed sequence diagram: participants={participant_count}, messages={message_count}");

    let graph = builder.finish();
    ParseResult {
        diagram_type: DiagramType::Sequence,
        nodes: graph.nodes,
        edges: graph.edges,
        metadata: DiagramMetadata::Sequence {
            participant_count,
            message_count,
        },
        warnings: graph.warnings,
    }
}

/// `participant ID` or `participant ID as Label`.
fn parse_participant(line: &str) -> Option<(&str, &str)> {
    let rest = line.strip_prefix("participant")?;
    let body = rest.trim_start();
    if body.len() == rest.len() {
        return None;
    }

    let (id, after_id) = split_identifier(body)?;
    let alias = after_id
        .starts_with(char::is_whitespace)
        .then(|| after_id.trim_start().strip_prefix("as"))
        .flatten()
        .filter(|after_as| after_as.starts_with(char::is_whitespace))
        .map(str::trim)
        .filter(|alias| !alias.is_empty());

    Some((id, alias.unwrap_or(id)))
}

#[derive(Debug, PartialEq, Eq)]
struct Message<'a> {
    from: &'a str,
    to: &'a str,
    text: &'a str,
}

/// `A->>B: text` or `A->B: text`.
fn parse_message(line: &str) -> Option<Message<'_>> {
    let (from, rest) = split_identifier(line)?;
    let rest = rest.trim_start().strip_prefix("->")?;
    let rest = rest.strip_prefix('>').unwrap_or(rest).trim_start();
    let (to, rest) = split_identifier(rest)?;
    let text = rest.trim_start().strip_prefix(':')?.trim();
    if text.is_empty() {
        return None;
    }
    Some(Message { from, to, text })
}

#[cfg(test)]
mod tests {
    use mg_core::{DiagramMetadata, EdgeKind, ShapeKind};

    use super::{Message, parse_message, parse_participant, parse_sequence};
    use crate::split_lines;

    #[test]
    fn participant_with_and_without_alias() {
        assert_eq!(parse_participant("participant A"), Some(("A", "A")));
        assert_eq!(
            parse_participant("participant A as Alice Smith"),
            Some(("A", "Alice Smith"))
        );
        assert_eq!(parse_participant("participant"), None);
        assert_eq!(parse_participant("participantA"), None);
        assert_eq!(parse_participant("participant A as"), Some(("A", "A")));
    }

    #[test]
    fn message_arrow_heads() {
        let expected = Some(Message {
            from: "A",
            to: "B",
            text: "hello there",
        });
        assert_eq!(parse_message("A->>B: hello there"), expected);
        assert_eq!(parse_message("A -> B : hello there"), expected);
        assert_eq!(parse_message("A->>B:"), None);
        assert_eq!(parse_message("A-->>B: dashed"), None);
    }

    #[test]
    fn declared_and_synthesized_participants() {
        let lines = split_lines("sequenceDiagram\nparticipant A as Alice\nA->>B: hello");
        let result = parse_sequence(&lines);

        assert_eq!(result.nodes.len(), 2);
        assert_eq!(result.nodes[0].label, "Alice");
        assert_eq!(result.nodes[1].id, "B");
        assert_eq!(result.nodes[1].label, "B");
        assert!(result
            .nodes
            .iter()
            .all(|node| node.shape_type == ShapeKind::Participant && node.position == (0, 0)));

        assert_eq!(result.edges.len(), 1);
        assert_eq!(result.edges[0].edge_type, EdgeKind::Message);
        assert_eq!(result.edges[0].label, "hello");
        assert_eq!(
            result.metadata,
            DiagramMetadata::Sequence {
                participant_count: 2,
                message_count: 1,
            }
        );
    }

    #[test]
    fn later_declaration_relabels_synthesized_participant() {
        let lines = split_lines("sequenceDiagram\nA->>B: hi\nparticipant B as Bob");
        let result = parse_sequence(&lines);
        let ids: Vec<&str> = result.nodes.iter().map(|node| node.id.as_str()).collect();
        assert_eq!(ids, vec!["A", "B"]);
        assert_eq!(result.nodes[1].label, "Bob");
    }

    #[test]
    fn unknown_lines_are_silently_ignored() {
        let lines = split_lines("sequenceDiagram\nNote over A: ignored\nloop forever\nend");
        let result = parse_sequence(&lines);
        assert!(result.nodes.is_empty());
        assert!(result.edges.is_empty());
        assert!(result.warnings.is_empty());
    }
}
