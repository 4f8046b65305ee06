#![forbid(unsafe_code)]

mod detect;
mod flowchart;
mod graph_builder;
mod patterns;
mod sequence;

use mg_core::DiagramType;
use mg_layout::LayoutConfig;
use tracing::debug;

pub use detect::{Detection, DetectionMethod, detect, detect_with_method};
pub use mg_core::{ParseError, ParseResult};

/// A trimmed, non-empty input line. `number` is its 1-based position among
/// the non-empty lines, so the declaration is always line 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SourceLine<'a> {
    pub(crate) number: usize,
    pub(crate) text: &'a str,
}

pub(crate) fn split_lines(input: &str) -> Vec<SourceLine<'_>> {
    input
        .lines()
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .enumerate()
        .map(|(index, text)| SourceLine {
            number: index + 1,
            text,
        })
        .collect()
}

/// Stateless parser: static pattern tables plus the layout grid settings.
///
/// Safe to share across threads; every call builds its own graph.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MermaidParser {
    layout: LayoutConfig,
}

impl MermaidParser {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn with_layout_config(layout: LayoutConfig) -> Self {
        Self { layout }
    }

    #[must_use]
    pub const fn layout_config(&self) -> &LayoutConfig {
        &self.layout
    }

    /// Parse diagram text into nodes, edges and metadata.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::EmptyInput`] / [`ParseError::NoContent`] for
    /// blank input, [`ParseError::UnsupportedDiagramType`] for diagram kinds
    /// without a line classifier, and [`ParseError::Line`] when a flowchart
    /// line matched a pattern entry that could not be applied.
    pub fn parse(&self, input: &str) -> Result<ParseResult, ParseError> {
        if input.trim().is_empty() {
            return Err(ParseError::EmptyInput);
        }

        let lines = split_lines(input);
        let Some(first) = lines.first() else {
            return Err(ParseError::NoContent);
        };

        let detection = detect_with_method(first.text);
        debug!(
            "Detected {} via {} from line {}",
            detection.diagram_type,
            detection.method.as_str(),
            first.number
        );

        match detection.diagram_type {
            DiagramType::Flowchart => {
                flowchart::parse_flowchart(&lines, detection.method, &self.layout)
            }
            DiagramType::Sequence => Ok(sequence::parse_sequence(&lines)),
            other => Err(ParseError::UnsupportedDiagramType(other)),
        }
    }
}

/// Parse with the default layout grid.
///
/// # Errors
///
/// See [`MermaidParser::parse`].
pub fn parse(input: &str) -> Result<ParseResult, ParseError> {
    MermaidParser::default().parse(input)
}
