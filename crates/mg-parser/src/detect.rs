use mg_core::{DiagramType, GraphDirection};
use serde::Serialize;

/// How a diagram type was decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DetectionMethod {
    /// The declaration line matched a known header.
    ExactKeyword,
    /// Nothing matched; flowchart assumed.
    Fallback,
}

impl DetectionMethod {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ExactKeyword => "explicit keyword match",
            Self::Fallback => "fallback to flowchart",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Detection {
    pub diagram_type: DiagramType,
    pub method: DetectionMethod,
}

#[derive(Debug, Clone, Copy)]
enum HeaderRule {
    /// Keyword followed by whitespace and a direction token.
    KeywordWithDirection(&'static str),
    Keyword(&'static str),
}

/// Declaration headers in match order; the first hit wins.
const HEADER_RULES: [(HeaderRule, DiagramType); 7] = [
    (
        HeaderRule::KeywordWithDirection("flowchart"),
        DiagramType::Flowchart,
    ),
    (
        HeaderRule::KeywordWithDirection("graph"),
        DiagramType::Flowchart,
    ),
    (HeaderRule::Keyword("sequencediagram"), DiagramType::Sequence),
    (HeaderRule::Keyword("classdiagram"), DiagramType::Class),
    (HeaderRule::Keyword("statediagram"), DiagramType::State),
    (HeaderRule::Keyword("gantt"), DiagramType::Gantt),
    (HeaderRule::Keyword("pie"), DiagramType::Pie),
];

impl HeaderRule {
    fn matches(self, lower: &str) -> bool {
        match self {
            Self::Keyword(keyword) => lower.starts_with(keyword),
            Self::KeywordWithDirection(keyword) => {
                let Some(rest) = lower.strip_prefix(keyword) else {
                    return false;
                };
                let after_ws = rest.trim_start();
                if after_ws.len() == rest.len() {
                    return false;
                }
                ["td", "tb", "bt", "rl", "lr"]
                    .iter()
                    .any(|token| after_ws.starts_with(token))
            }
        }
    }
}

/// Classify a diagram from its first significant line.
#[must_use]
pub fn detect(first_line: &str) -> DiagramType {
    detect_with_method(first_line).diagram_type
}

#[must_use]
pub fn detect_with_method(first_line: &str) -> Detection {
    let lower = first_line.trim().to_ascii_lowercase();
    HEADER_RULES
        .iter()
        .find(|(rule, _)| rule.matches(&lower))
        .map_or(
            Detection {
                diagram_type: DiagramType::Flowchart,
                method: DetectionMethod::Fallback,
            },
            |&(_, diagram_type)| Detection {
                diagram_type,
                method: DetectionMethod::ExactKeyword,
            },
        )
}

/// Whether a header opens with a flowchart keyword, direction or not.
pub(crate) fn names_flowchart(header: &str) -> bool {
    header
        .split_whitespace()
        .next()
        .map(|keyword| keyword.trim_end_matches(';').to_ascii_lowercase())
        .is_some_and(|keyword| keyword == "flowchart" || keyword == "graph")
}

/// Direction declared on a flowchart header, if any.
pub(crate) fn header_direction(header: &str) -> Option<GraphDirection> {
    header
        .split_whitespace()
        .skip(1)
        .find_map(|token| GraphDirection::from_token(token.trim_end_matches(';')))
}

#[cfg(test)]
mod tests {
    use mg_core::{DiagramType, GraphDirection};

    use super::{DetectionMethod, detect, detect_with_method, header_direction, names_flowchart};

    #[test]
    fn detects_declared_headers() {
        let cases = [
            ("flowchart TD", DiagramType::Flowchart),
            ("graph LR", DiagramType::Flowchart),
            ("sequenceDiagram", DiagramType::Sequence),
            ("classDiagram", DiagramType::Class),
            ("stateDiagram-v2", DiagramType::State),
            ("gantt", DiagramType::Gantt),
            ("pie title Pets", DiagramType::Pie),
        ];
        for (line, expected) in cases {
            let detection = detect_with_method(line);
            assert_eq!(detection.diagram_type, expected, "line: {line}");
            assert_eq!(detection.method, DetectionMethod::ExactKeyword);
        }
    }

    #[test]
    fn detection_is_case_insensitive_and_trims() {
        assert_eq!(detect("   SEQUENCEDIAGRAM  "), DiagramType::Sequence);
        assert_eq!(detect("FlowChart lr"), DiagramType::Flowchart);
        assert_eq!(detect("GANTT"), DiagramType::Gantt);
    }

    #[test]
    fn flowchart_without_direction_falls_back() {
        let detection = detect_with_method("flowchart");
        assert_eq!(detection.diagram_type, DiagramType::Flowchart);
        assert_eq!(detection.method, DetectionMethod::Fallback);
    }

    #[test]
    fn unknown_first_line_defaults_to_flowchart() {
        let detection = detect_with_method("A --> B");
        assert_eq!(detection.diagram_type, DiagramType::Flowchart);
        assert_eq!(detection.method, DetectionMethod::Fallback);
        assert_ne!(detect("journey"), DiagramType::Unknown);
    }

    #[test]
    fn graph_requires_whitespace_before_direction() {
        assert_eq!(
            detect_with_method("graphTD").method,
            DetectionMethod::Fallback
        );
    }

    #[test]
    fn header_direction_tokens() {
        assert_eq!(header_direction("flowchart LR"), Some(GraphDirection::LR));
        assert_eq!(header_direction("graph BT;"), Some(GraphDirection::BT));
        assert_eq!(header_direction("flowchart td"), Some(GraphDirection::TD));
        assert_eq!(header_direction("flowchart"), None);
        assert_eq!(header_direction("LR"), None);
    }

    #[test]
    fn flowchart_keyword_without_direction() {
        assert!(names_flowchart("flowchart"));
        assert!(names_flowchart("GRAPH;"));
        assert!(names_flowchart("flowchart XY"));
        assert!(!names_flowchart("graphTD"));
        assert!(!names_flowchart("A --> B"));
    }
}
