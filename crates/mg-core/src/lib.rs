#![forbid(unsafe_code)]

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use thiserror::Error;

/// Open style mapping carried by nodes and edges for downstream exporters.
pub type StyleMap = BTreeMap<String, Value>;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum DiagramType {
    #[serde(rename = "flowchart")]
    Flowchart,
    #[serde(rename = "sequenceDiagram")]
    Sequence,
    #[serde(rename = "classDiagram")]
    Class,
    #[serde(rename = "stateDiagram")]
    State,
    #[serde(rename = "gantt")]
    Gantt,
    #[serde(rename = "pie")]
    Pie,
    #[default]
    #[serde(rename = "unknown")]
    Unknown,
}

impl DiagramType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Flowchart => "flowchart",
            Self::Sequence => "sequenceDiagram",
            Self::Class => "classDiagram",
            Self::State => "stateDiagram",
            Self::Gantt => "gantt",
            Self::Pie => "pie",
            Self::Unknown => "unknown",
        }
    }

    /// Whether the parser has a line classifier for this diagram type.
    #[must_use]
    pub const fn is_supported(self) -> bool {
        matches!(self, Self::Flowchart | Self::Sequence)
    }
}

impl fmt::Display for DiagramType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum GraphDirection {
    #[default]
    TD,
    TB,
    BT,
    RL,
    LR,
}

impl GraphDirection {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TD => "TD",
            Self::TB => "TB",
            Self::BT => "BT",
            Self::RL => "RL",
            Self::LR => "LR",
        }
    }

    /// Parse a direction token such as `LR` or `td`.
    #[must_use]
    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim().to_ascii_uppercase().as_str() {
            "TD" => Some(Self::TD),
            "TB" => Some(Self::TB),
            "BT" => Some(Self::BT),
            "RL" => Some(Self::RL),
            "LR" => Some(Self::LR),
            _ => None,
        }
    }
}

impl fmt::Display for GraphDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum ShapeKind {
    #[default]
    Rectangle,
    Rounded,
    Diamond,
    Circle,
    Subroutine,
    Participant,
}

impl ShapeKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Rectangle => "rectangle",
            Self::Rounded => "rounded",
            Self::Diamond => "diamond",
            Self::Circle => "circle",
            Self::Subroutine => "subroutine",
            Self::Participant => "participant",
        }
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    #[default]
    Arrow,
    Line,
    DottedArrow,
    ThickArrow,
    Message,
}

impl EdgeKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Arrow => "arrow",
            Self::Line => "line",
            Self::DottedArrow => "dotted_arrow",
            Self::ThickArrow => "thick_arrow",
            Self::Message => "message",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Node {
    pub id: String,
    pub label: String,
    pub shape_type: ShapeKind,
    /// Grid position; `(0, 0)` until a layout pass assigns it.
    pub position: (i64, i64),
    #[serde(default)]
    pub style: StyleMap,
}

impl Node {
    #[must_use]
    pub fn new(id: impl Into<String>, label: impl Into<String>, shape_type: ShapeKind) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            shape_type,
            position: (0, 0),
            style: StyleMap::new(),
        }
    }

    /// A node created only because something referenced its identifier.
    #[must_use]
    pub fn synthesized(id: &str, shape_type: ShapeKind) -> Self {
        Self::new(id, id, shape_type)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Edge {
    pub source: String,
    pub target: String,
    #[serde(default)]
    pub label: String,
    pub edge_type: EdgeKind,
    #[serde(default)]
    pub style: StyleMap,
}

impl Edge {
    #[must_use]
    pub fn new(
        source: impl Into<String>,
        target: impl Into<String>,
        label: impl Into<String>,
        edge_type: EdgeKind,
    ) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            label: label.into(),
            edge_type,
            style: StyleMap::new(),
        }
    }
}

/// Per-type metadata; key names differ between flowcharts and sequence diagrams.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum DiagramMetadata {
    Flowchart {
        direction: GraphDirection,
        node_count: usize,
        edge_count: usize,
    },
    Sequence {
        participant_count: usize,
        message_count: usize,
    },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum WarningCode {
    #[default]
    #[serde(rename = "mermaid/warn/unparsed-line")]
    UnparsedLine,
    #[serde(rename = "mermaid/warn/missing-declaration")]
    MissingDeclaration,
    #[serde(rename = "mermaid/warn/missing-direction")]
    MissingDirection,
}

impl WarningCode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UnparsedLine => "mermaid/warn/unparsed-line",
            Self::MissingDeclaration => "mermaid/warn/missing-declaration",
            Self::MissingDirection => "mermaid/warn/missing-direction",
        }
    }
}

/// A recoverable diagnostic collected while classifying lines.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ParseWarning {
    pub code: WarningCode,
    /// Position among the non-blank lines, counting the declaration line as 1.
    pub line_number: usize,
    pub line: String,
    pub message: String,
}

impl ParseWarning {
    #[must_use]
    pub fn unparsed_line(line_number: usize, line: &str) -> Self {
        Self {
            code: WarningCode::UnparsedLine,
            line_number,
            line: line.to_string(),
            message: format!("Could not parse line {line_number}: {line}"),
        }
    }

    #[must_use]
    pub fn missing_declaration(line: &str) -> Self {
        Self {
            code: WarningCode::MissingDeclaration,
            line_number: 1,
            line: line.to_string(),
            message: format!(
                "Line 1 is not a diagram declaration; treating it as a flowchart header: {line}"
            ),
        }
    }

    /// A `flowchart` / `graph` header without a direction token.
    #[must_use]
    pub fn missing_direction(line: &str) -> Self {
        Self {
            code: WarningCode::MissingDirection,
            line_number: 1,
            line: line.to_string(),
            message: format!("Flowchart declaration has no direction; defaulting to TD: {line}"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ParseResult {
    #[serde(rename = "type")]
    pub diagram_type: DiagramType,
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    pub metadata: DiagramMetadata,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<ParseWarning>,
}

impl ParseResult {
    #[must_use]
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|node| node.id == id)
    }

    /// Counts-only summary, suitable for logs and history listings.
    #[must_use]
    pub fn summary_json(&self) -> String {
        json!({
            "type": self.diagram_type.as_str(),
            "node_count": self.nodes.len(),
            "edge_count": self.edges.len(),
            "warning_count": self.warnings.len(),
        })
        .to_string()
    }
}

/// Why a line that matched a pattern entry could not be turned into graph
/// elements. Lines that match nothing are warnings, never faults.
#[derive(Debug, Clone, Serialize, Deserialize, Error, PartialEq, Eq)]
pub enum LineFault {
    #[error("edge '{from}' -> '{to}' expects a label but none was captured")]
    UncapturedLabel { from: String, to: String },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ParseErrorCode {
    EmptyInput,
    NoContent,
    UnsupportedDiagramType,
    Line,
}

impl ParseErrorCode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::EmptyInput => "mermaid/error/empty-input",
            Self::NoContent => "mermaid/error/no-content",
            Self::UnsupportedDiagramType => "mermaid/error/unsupported",
            Self::Line => "mermaid/error/line",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("Empty Mermaid code provided")]
    EmptyInput,
    #[error("No valid content found")]
    NoContent,
    #[error("Diagram type {0} not yet supported")]
    UnsupportedDiagramType(DiagramType),
    #[error("Error parsing line {line_number}: {line}")]
    Line {
        line_number: usize,
        line: String,
        #[source]
        cause: LineFault,
    },
}

impl ParseError {
    #[must_use]
    pub const fn code(&self) -> ParseErrorCode {
        match self {
            Self::EmptyInput => ParseErrorCode::EmptyInput,
            Self::NoContent => ParseErrorCode::NoContent,
            Self::UnsupportedDiagramType(_) => ParseErrorCode::UnsupportedDiagramType,
            Self::Line { .. } => ParseErrorCode::Line,
        }
    }

    #[must_use]
    pub const fn line_number(&self) -> Option<usize> {
        match self {
            Self::Line { line_number, .. } => Some(*line_number),
            _ => None,
        }
    }

    #[must_use]
    pub fn details(&self) -> Option<String> {
        match self {
            Self::Line { cause, .. } => Some(cause.to_string()),
            _ => None,
        }
    }
}

/// JSON error body handed to callers when a parse fails.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorReport {
    pub success: bool,
    pub error: String,
    pub code: String,
    pub line: Option<usize>,
    pub details: Option<String>,
}

impl From<&ParseError> for ErrorReport {
    fn from(error: &ParseError) -> Self {
        Self {
            success: false,
            error: error.to_string(),
            code: error.code().as_str().to_string(),
            line: error.line_number(),
            details: error.details(),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{
        DiagramMetadata, DiagramType, Edge, EdgeKind, ErrorReport, GraphDirection, LineFault, Node,
        ParseError, ParseErrorCode, ParseResult, ParseWarning, ShapeKind, WarningCode,
    };

    fn sample_result() -> ParseResult {
        ParseResult {
            diagram_type: DiagramType::Flowchart,
            nodes: vec![
                Node::new("A", "Start", ShapeKind::Rectangle),
                Node::synthesized("B", ShapeKind::Rectangle),
            ],
            edges: vec![Edge::new("A", "B", "", EdgeKind::Arrow)],
            metadata: DiagramMetadata::Flowchart {
                direction: GraphDirection::TD,
                node_count: 2,
                edge_count: 1,
            },
            warnings: Vec::new(),
        }
    }

    #[test]
    fn diagram_type_uses_mermaid_keywords() {
        assert_eq!(DiagramType::Flowchart.as_str(), "flowchart");
        assert_eq!(DiagramType::Sequence.as_str(), "sequenceDiagram");
        assert_eq!(DiagramType::Gantt.to_string(), "gantt");
        assert_eq!(
            serde_json::to_value(DiagramType::Class).unwrap(),
            json!("classDiagram")
        );
    }

    #[test]
    fn only_flowchart_and_sequence_are_supported() {
        assert!(DiagramType::Flowchart.is_supported());
        assert!(DiagramType::Sequence.is_supported());
        assert!(!DiagramType::Pie.is_supported());
        assert!(!DiagramType::Unknown.is_supported());
    }

    #[test]
    fn direction_tokens_parse_case_insensitively() {
        assert_eq!(GraphDirection::from_token("LR"), Some(GraphDirection::LR));
        assert_eq!(GraphDirection::from_token("td"), Some(GraphDirection::TD));
        assert_eq!(GraphDirection::from_token("XY"), None);
        assert_eq!(GraphDirection::default(), GraphDirection::TD);
    }

    #[test]
    fn synthesized_node_uses_id_as_label() {
        let node = Node::synthesized("X", ShapeKind::Participant);
        assert_eq!(node.label, "X");
        assert_eq!(node.position, (0, 0));
        assert!(node.style.is_empty());
    }

    #[test]
    fn parse_result_serializes_to_exporter_shape() {
        let value = serde_json::to_value(sample_result()).unwrap();
        assert_eq!(
            value,
            json!({
                "type": "flowchart",
                "nodes": [
                    {"id": "A", "label": "Start", "shape_type": "rectangle", "position": [0, 0], "style": {}},
                    {"id": "B", "label": "B", "shape_type": "rectangle", "position": [0, 0], "style": {}}
                ],
                "edges": [
                    {"source": "A", "target": "B", "label": "", "edge_type": "arrow", "style": {}}
                ],
                "metadata": {"direction": "TD", "node_count": 2, "edge_count": 1}
            })
        );
    }

    #[test]
    fn sequence_metadata_uses_participant_keys() {
        let metadata = DiagramMetadata::Sequence {
            participant_count: 2,
            message_count: 1,
        };
        assert_eq!(
            serde_json::to_value(&metadata).unwrap(),
            json!({"participant_count": 2, "message_count": 1})
        );
        let decoded: DiagramMetadata =
            serde_json::from_value(json!({"participant_count": 2, "message_count": 1})).unwrap();
        assert_eq!(decoded, metadata);
    }

    #[test]
    fn warnings_are_serialized_only_when_present() {
        let mut result = sample_result();
        let value = serde_json::to_value(&result).unwrap();
        assert!(value.get("warnings").is_none());

        result.warnings.push(ParseWarning::unparsed_line(3, "???"));
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["warnings"][0]["line_number"], json!(3));
        assert_eq!(
            value["warnings"][0]["code"],
            json!(WarningCode::UnparsedLine.as_str())
        );
    }

    #[test]
    fn summary_json_reports_counts() {
        let summary = sample_result().summary_json();
        assert!(summary.contains("\"type\":\"flowchart\""));
        assert!(summary.contains("\"node_count\":2"));
        assert!(summary.contains("\"edge_count\":1"));
        assert!(summary.contains("\"warning_count\":0"));
    }

    #[test]
    fn node_lookup_by_id() {
        let result = sample_result();
        assert_eq!(result.node("A").map(|node| node.label.as_str()), Some("Start"));
        assert!(result.node("Z").is_none());
    }

    #[test]
    fn warning_codes_are_stable() {
        assert_eq!(WarningCode::UnparsedLine.as_str(), "mermaid/warn/unparsed-line");
        let warning = ParseWarning::missing_declaration("A --> B");
        assert_eq!(warning.code, WarningCode::MissingDeclaration);
        assert_eq!(warning.line_number, 1);

        let warning = ParseWarning::missing_direction("flowchart");
        assert_eq!(warning.code, WarningCode::MissingDirection);
        assert!(!warning.message.contains("not a diagram declaration"));
    }

    #[test]
    fn warning_codes_serialize_as_their_stable_strings() {
        for code in [
            WarningCode::UnparsedLine,
            WarningCode::MissingDeclaration,
            WarningCode::MissingDirection,
        ] {
            assert_eq!(serde_json::to_value(code).unwrap(), json!(code.as_str()));
            let decoded: WarningCode = serde_json::from_value(json!(code.as_str())).unwrap();
            assert_eq!(decoded, code);
        }
    }

    #[test]
    fn error_messages_and_codes() {
        assert_eq!(ParseError::EmptyInput.to_string(), "Empty Mermaid code provided");
        assert_eq!(ParseError::NoContent.to_string(), "No valid content found");
        let unsupported = ParseError::UnsupportedDiagramType(DiagramType::Gantt);
        assert_eq!(unsupported.to_string(), "Diagram type gantt not yet supported");
        assert_eq!(unsupported.code(), ParseErrorCode::UnsupportedDiagramType);
        assert_eq!(unsupported.line_number(), None);
    }

    #[test]
    fn line_error_carries_number_text_and_cause() {
        let error = ParseError::Line {
            line_number: 4,
            line: "A -->|x| B".to_string(),
            cause: LineFault::UncapturedLabel {
                from: "A".to_string(),
                to: "B".to_string(),
            },
        };
        assert_eq!(error.to_string(), "Error parsing line 4: A -->|x| B");
        assert_eq!(error.line_number(), Some(4));
        assert_eq!(
            error.details().as_deref(),
            Some("edge 'A' -> 'B' expects a label but none was captured")
        );
        assert!(std::error::Error::source(&error).is_some());
    }

    #[test]
    fn error_report_mirrors_error() {
        let error = ParseError::Line {
            line_number: 2,
            line: "A -- x --> B".to_string(),
            cause: LineFault::UncapturedLabel {
                from: "A".to_string(),
                to: "B".to_string(),
            },
        };
        let report = ErrorReport::from(&error);
        assert!(!report.success);
        assert_eq!(report.code, "mermaid/error/line");
        assert_eq!(report.line, Some(2));
        assert_eq!(
            report.details.as_deref(),
            Some("edge 'A' -> 'B' expects a label but none was captured")
        );

        let report = ErrorReport::from(&ParseError::EmptyInput);
        assert_eq!(report.line, None);
        assert_eq!(report.details, None);
    }
}
