// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Amredit-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Amredit and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;
use tracing::debug;

use super::ids::{IdError, Variable};

const DELIMITER: char = '#';

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ElementKind {
    Node,
    Edge,
    Literal,
}

impl ElementKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Node => "node",
            Self::Edge => "edge",
            Self::Literal => "literal",
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured reference to one clickable element of a rendered sentence graph.
///
/// Canonical format of the rendered element id:
/// - `node#<variable>#<concept>`
/// - `edge#<from>#<to>#<label>`
/// - `literal#<owner>#<edge label>#<text>`
///
/// The edge target is kept as plain text because edges may point at literals. Literal text is
/// everything after the third delimiter and may contain `#` itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GraphElementRef {
    Node {
        variable: Variable,
        concept: Option<String>,
    },
    Edge {
        from: Variable,
        to: String,
        label: String,
    },
    Literal {
        id: Variable,
        edge_label: String,
        text: String,
    },
}

impl GraphElementRef {
    pub fn node(variable: Variable) -> Self {
        Self::Node {
            variable,
            concept: None,
        }
    }

    pub fn node_with_concept(variable: Variable, concept: impl Into<String>) -> Self {
        Self::Node {
            variable,
            concept: Some(concept.into()),
        }
    }

    pub fn edge(from: Variable, to: impl Into<String>, label: impl Into<String>) -> Self {
        Self::Edge {
            from,
            to: to.into(),
            label: label.into(),
        }
    }

    pub fn literal(id: Variable, edge_label: impl Into<String>, text: impl Into<String>) -> Self {
        Self::Literal {
            id,
            edge_label: edge_label.into(),
            text: text.into(),
        }
    }

    pub fn kind(&self) -> ElementKind {
        match self {
            Self::Node { .. } => ElementKind::Node,
            Self::Edge { .. } => ElementKind::Edge,
            Self::Literal { .. } => ElementKind::Literal,
        }
    }

    pub fn parse(input: &str) -> Result<Self, ParseElementRefError> {
        let (kind, rest) = input.split_once(DELIMITER).ok_or(ParseElementRefError::MissingKind)?;

        match kind {
            "node" => {
                let (variable, concept) = match rest.split_once(DELIMITER) {
                    Some((variable, concept)) => (variable, Some(concept)),
                    None => (rest, None),
                };
                let variable = parse_variable(ElementKind::Node, "variable", variable)?;
                let concept = concept.filter(|c| !c.is_empty()).map(str::to_owned);
                Ok(Self::Node { variable, concept })
            }
            "edge" => {
                // Literal targets may contain the delimiter; relation labels never do.
                let (from, tail) = rest.split_once(DELIMITER).unwrap_or((rest, ""));
                let (to, label) = tail.rsplit_once(DELIMITER).unwrap_or((tail, ""));
                let from = parse_variable(ElementKind::Edge, "from", from)?;
                let to = required(ElementKind::Edge, "to", to)?;
                let label = required(ElementKind::Edge, "label", label)?;
                Ok(Self::Edge { from, to, label })
            }
            "literal" => {
                let mut parts = rest.splitn(3, DELIMITER);
                let id = parts.next().unwrap_or_default();
                let edge_label = parts.next().unwrap_or_default();
                let text = parts.next().ok_or(ParseElementRefError::MissingField {
                    kind: ElementKind::Literal,
                    field: "text",
                })?;
                let id = parse_variable(ElementKind::Literal, "id", id)?;
                let edge_label = required(ElementKind::Literal, "edge label", edge_label)?;
                Ok(Self::Literal {
                    id,
                    edge_label,
                    text: text.to_owned(),
                })
            }
            "" => Err(ParseElementRefError::MissingKind),
            other => Err(ParseElementRefError::UnknownKind(other.to_owned())),
        }
    }
}

fn required(
    kind: ElementKind,
    field: &'static str,
    value: &str,
) -> Result<String, ParseElementRefError> {
    if value.is_empty() {
        return Err(ParseElementRefError::MissingField { kind, field });
    }
    Ok(value.to_owned())
}

fn parse_variable(
    kind: ElementKind,
    field: &'static str,
    value: &str,
) -> Result<Variable, ParseElementRefError> {
    if value.is_empty() {
        return Err(ParseElementRefError::MissingField { kind, field });
    }
    Variable::new(value).map_err(|source| ParseElementRefError::InvalidVariable { kind, source })
}

impl fmt::Display for GraphElementRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Node { variable, concept: Some(concept) } => {
                write!(f, "node#{variable}#{concept}")
            }
            Self::Node { variable, concept: None } => write!(f, "node#{variable}"),
            Self::Edge { from, to, label } => write!(f, "edge#{from}#{to}#{label}"),
            Self::Literal { id, edge_label, text } => write!(f, "literal#{id}#{edge_label}#{text}"),
        }
    }
}

impl FromStr for GraphElementRef {
    type Err = ParseElementRefError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseElementRefError {
    #[error("element id is missing its kind prefix")]
    MissingKind,
    #[error("unknown element kind '{0}'")]
    UnknownKind(String),
    #[error("{kind} element id is missing its {field}")]
    MissingField {
        kind: ElementKind,
        field: &'static str,
    },
    #[error("{kind} element id has an invalid variable: {source}")]
    InvalidVariable { kind: ElementKind, source: IdError },
}

/// What a pointer press landed on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickTarget {
    Element(GraphElementRef),
    /// Background of the graph, or any element that is not part of the graph.
    Canvas,
}

impl From<GraphElementRef> for ClickTarget {
    fn from(element: GraphElementRef) -> Self {
        Self::Element(element)
    }
}

/// All clickable elements of one rendered graph, keyed by their rendered element id.
///
/// Built once per payload so click handlers receive a structured [`GraphElementRef`]
/// instead of re-parsing element ids on every click.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderedGraph {
    elements: BTreeMap<String, GraphElementRef>,
}

impl RenderedGraph {
    pub fn from_svg(svg: &str) -> Self {
        let mut elements = BTreeMap::new();
        for captures in element_id_regex().captures_iter(svg) {
            let raw = unescape_attribute(&captures[1]);
            match GraphElementRef::parse(&raw) {
                Ok(element) => {
                    elements.insert(raw, element);
                }
                Err(err) => {
                    debug!(element_id = %raw, error = %err, "skipping unparsable element id")
                }
            }
        }
        Self { elements }
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn get(&self, element_id: &str) -> Option<&GraphElementRef> {
        self.elements.get(element_id)
    }

    /// Maps the id of the element under the pointer to a click target.
    ///
    /// Unknown ids and presses outside any element resolve to [`ClickTarget::Canvas`].
    pub fn resolve(&self, element_id: Option<&str>) -> ClickTarget {
        element_id
            .and_then(|id| self.elements.get(id))
            .cloned()
            .map(ClickTarget::Element)
            .unwrap_or(ClickTarget::Canvas)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &GraphElementRef)> {
        self.elements.iter().map(|(id, element)| (id.as_str(), element))
    }

    pub fn concept_of(&self, variable: &str) -> Option<&str> {
        self.elements.values().find_map(|element| match element {
            GraphElementRef::Node { variable: v, concept } if v.as_str() == variable => {
                concept.as_deref()
            }
            _ => None,
        })
    }
}

fn element_id_regex() -> &'static Regex {
    static ELEMENT_ID: OnceLock<Regex> = OnceLock::new();
    ELEMENT_ID.get_or_init(|| {
        Regex::new(r#"\bid="((?:node|edge|literal)#[^"]*)""#).expect("element id regex is valid")
    })
}

fn unescape_attribute(value: &str) -> String {
    if !value.contains('&') {
        return value.to_owned();
    }
    value
        .replace("&quot;", "\"")
        .replace("&#34;", "\"")
        .replace("&apos;", "'")
        .replace("&#39;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}
