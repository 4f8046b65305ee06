//! Ordered pattern tables and the line classifier built on them.
//!
//! Every table is evaluated top to bottom and the first matching entry wins.

use mg_core::{EdgeKind, LineFault, ShapeKind};

/// Bracket syntax for one node shape: `id<open>label<close>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ShapePattern {
    pub(crate) open: &'static str,
    pub(crate) close: &'static str,
    pub(crate) shape: ShapeKind,
}

/// Node-definition table. The label may not contain the first character of
/// the closing delimiter, so `A((x))` fails the rounded entry and reaches
/// the circle entry.
pub(crate) const NODE_PATTERNS: [ShapePattern; 5] = [
    ShapePattern {
        open: "[",
        close: "]",
        shape: ShapeKind::Rectangle,
    },
    ShapePattern {
        open: "(",
        close: ")",
        shape: ShapeKind::Rounded,
    },
    ShapePattern {
        open: "{",
        close: "}",
        shape: ShapeKind::Diamond,
    },
    ShapePattern {
        open: "((",
        close: "))",
        shape: ShapeKind::Circle,
    },
    ShapePattern {
        open: "[[",
        close: "]]",
        shape: ShapeKind::Subroutine,
    },
];

/// How an edge entry recognizes its connector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EdgeSyntax {
    /// `A <op> B`
    Plain(&'static str),
    /// `A --|label|--> B`
    PipeBeforeArrow,
    /// `A -- label --> B`
    DashLabel,
    /// `A -->|label| B`
    PipeAfterArrow,
}

/// Where an edge entry takes its label from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LabelSource {
    Constant(&'static str),
    Captured,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct EdgePattern {
    pub(crate) syntax: EdgeSyntax,
    pub(crate) kind: EdgeKind,
    pub(crate) label: LabelSource,
}

pub(crate) const EDGE_PATTERNS: [EdgePattern; 7] = [
    EdgePattern {
        syntax: EdgeSyntax::Plain("-->"),
        kind: EdgeKind::Arrow,
        label: LabelSource::Constant(""),
    },
    EdgePattern {
        syntax: EdgeSyntax::Plain("---"),
        kind: EdgeKind::Line,
        label: LabelSource::Constant(""),
    },
    EdgePattern {
        syntax: EdgeSyntax::PipeBeforeArrow,
        kind: EdgeKind::Arrow,
        label: LabelSource::Captured,
    },
    EdgePattern {
        syntax: EdgeSyntax::DashLabel,
        kind: EdgeKind::Arrow,
        label: LabelSource::Captured,
    },
    EdgePattern {
        syntax: EdgeSyntax::Plain("-.->"),
        kind: EdgeKind::DottedArrow,
        label: LabelSource::Constant(""),
    },
    EdgePattern {
        syntax: EdgeSyntax::Plain("==>"),
        kind: EdgeKind::ThickArrow,
        label: LabelSource::Constant(""),
    },
    EdgePattern {
        syntax: EdgeSyntax::PipeAfterArrow,
        kind: EdgeKind::Arrow,
        label: LabelSource::Captured,
    },
];

/// A node token (`id` or `id<open>label<close>`) as written in a statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct NodeToken<'a> {
    pub(crate) id: &'a str,
    pub(crate) shape: Option<(ShapeKind, &'a str)>,
}

impl NodeToken<'_> {
    /// Declared shape and label, or `None` for a bare reference.
    pub(crate) fn declared(&self) -> Option<(ShapeKind, String)> {
        self.shape
            .map(|(shape, raw)| (shape, clean_label(raw).to_string()))
    }
}

/// Labels are trimmed; a whitespace-only label is kept as written.
fn clean_label(raw: &str) -> &str {
    let trimmed = raw.trim();
    if trimmed.is_empty() { raw } else { trimmed }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct EdgeCaptures<'a> {
    pub(crate) from: NodeToken<'a>,
    pub(crate) to: NodeToken<'a>,
    pub(crate) label: Option<&'a str>,
}

/// One connector match. `target` starts at the target token so a chain can
/// continue from it; `rest` is whatever follows that token.
struct LinkMatch<'a> {
    captures: EdgeCaptures<'a>,
    target: &'a str,
    rest: &'a str,
}

impl EdgePattern {
    fn match_link<'a>(&self, text: &'a str) -> Option<LinkMatch<'a>> {
        let (from, rest) = split_node_token(text, is_connector_boundary)?;
        let rest = rest.trim_start();

        let (label, target) = match self.syntax {
            EdgeSyntax::Plain(operator) => (None, rest.strip_prefix(operator)?),
            EdgeSyntax::PipeBeforeArrow => {
                let body = rest.strip_prefix("--|")?;
                let (label, after) = body.split_once('|')?;
                (Some(label), after.strip_prefix("-->")?)
            }
            EdgeSyntax::DashLabel => {
                let body = rest.strip_prefix("--")?;
                if !body.starts_with(char::is_whitespace) {
                    return None;
                }
                let (label, after) = body.split_once("-->")?;
                (Some(label), after)
            }
            EdgeSyntax::PipeAfterArrow => {
                let body = rest.strip_prefix("-->")?.trim_start();
                let (label, after) = body.strip_prefix('|')?.split_once('|')?;
                (Some(label), after)
            }
        };
        if label.is_some_and(str::is_empty) {
            return None;
        }

        let target = target.trim_start();
        let (to, rest) = split_node_token(target, is_connector_boundary)?;
        Some(LinkMatch {
            captures: EdgeCaptures { from, to, label },
            target,
            rest: rest.trim(),
        })
    }

    pub(crate) fn resolve_label(&self, captures: &EdgeCaptures<'_>) -> Result<String, LineFault> {
        match self.label {
            LabelSource::Constant(text) => Ok(text.to_string()),
            LabelSource::Captured => captures
                .label
                .map(|raw| clean_label(raw).to_string())
                .ok_or_else(|| LineFault::UncapturedLabel {
                    from: captures.from.id.to_string(),
                    to: captures.to.id.to_string(),
                }),
        }
    }
}

/// One edge of a statement, with the table entry that matched it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct EdgeLink<'a> {
    pub(crate) pattern: &'static EdgePattern,
    pub(crate) captures: EdgeCaptures<'a>,
}

/// Match `A --> B`, or a chain such as `A --> B -.-> C` as one link per
/// connector. The whole statement must be consumed.
fn match_chain(statement: &str) -> Option<Vec<EdgeLink<'_>>> {
    let mut links = Vec::new();
    let mut text = statement;
    loop {
        let (pattern, link) = EDGE_PATTERNS
            .iter()
            .find_map(|pattern| pattern.match_link(text).map(|link| (pattern, link)))?;
        links.push(EdgeLink {
            pattern,
            captures: link.captures,
        });
        if link.rest.is_empty() {
            return Some(links);
        }
        text = link.target;
    }
}

/// Result of running one flowchart statement through the tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum LineClass<'a> {
    Node(NodeToken<'a>),
    Edges(Vec<EdgeLink<'a>>),
    Bare(&'a str),
    Unparsed,
}

/// Node definitions first, then edges, then bare identifiers.
pub(crate) fn classify_statement(statement: &str) -> LineClass<'_> {
    if let Some((token, rest)) = split_node_token(statement, str::is_empty)
        && token.shape.is_some()
        && rest.is_empty()
    {
        return LineClass::Node(token);
    }

    if let Some(links) = match_chain(statement) {
        return LineClass::Edges(links);
    }

    if is_identifier(statement) {
        return LineClass::Bare(statement);
    }

    LineClass::Unparsed
}

/// Split a line on `;` outside brackets and pipe labels. Empty statements
/// are dropped.
pub(crate) fn split_statements(line: &str) -> Vec<&str> {
    let mut statements = Vec::new();
    let mut depth = 0_usize;
    let mut in_pipe = false;
    let mut start = 0;

    for (index, ch) in line.char_indices() {
        match ch {
            '|' if depth == 0 => in_pipe = !in_pipe,
            '[' | '(' | '{' if !in_pipe => depth = depth.saturating_add(1),
            ']' | ')' | '}' if !in_pipe => depth = depth.saturating_sub(1),
            ';' if depth == 0 && !in_pipe => {
                let segment = line[start..index].trim();
                if !segment.is_empty() {
                    statements.push(segment);
                }
                start = index + 1;
            }
            _ => {}
        }
    }

    let remainder = line[start..].trim();
    if !remainder.is_empty() {
        statements.push(remainder);
    }
    statements
}

pub(crate) fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

pub(crate) fn is_identifier(text: &str) -> bool {
    !text.is_empty() && text.chars().all(is_word_char)
}

/// Leading `\w+` run of `text` and the remainder.
pub(crate) fn split_identifier(text: &str) -> Option<(&str, &str)> {
    let end = text
        .char_indices()
        .find(|&(_, ch)| !is_word_char(ch))
        .map_or(text.len(), |(index, _)| index);
    if end == 0 {
        return None;
    }
    Some(text.split_at(end))
}

/// Split a node token off the front of `text`.
///
/// A bracketed shape is accepted only when `accept_rest` approves what
/// follows it; shapes are tried in [`NODE_PATTERNS`] order.
fn split_node_token(text: &str, accept_rest: fn(&str) -> bool) -> Option<(NodeToken<'_>, &str)> {
    let (id, after_id) = split_identifier(text)?;
    if !after_id.starts_with(['[', '(', '{']) {
        return accept_rest(after_id).then_some((NodeToken { id, shape: None }, after_id));
    }

    NODE_PATTERNS.iter().find_map(|pattern| {
        let (label, rest) = match_shape(after_id, pattern)?;
        accept_rest(rest).then_some((
            NodeToken {
                id,
                shape: Some((pattern.shape, label)),
            },
            rest,
        ))
    })
}

/// Match `<open>label<close>` at the start of `text`.
fn match_shape<'a>(text: &'a str, pattern: &ShapePattern) -> Option<(&'a str, &'a str)> {
    let body = text.strip_prefix(pattern.open)?;
    let stop = pattern.close.chars().next()?;
    let end = body.find(stop)?;
    if end == 0 {
        return None;
    }
    let (label, after) = body.split_at(end);
    let rest = after.strip_prefix(pattern.close)?;
    Some((label, rest))
}

fn is_connector_boundary(rest: &str) -> bool {
    rest.is_empty() || rest.starts_with(|ch: char| ch.is_whitespace() || matches!(ch, '-' | '=' | '.'))
}
