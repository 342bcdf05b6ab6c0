// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Amredit-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Amredit and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::io::{self, Write};

use tracing::warn;

use super::Renderer;
use crate::model::{alignment_spans, GraphElementRef, RenderPayload, RenderedGraph, ServerInfo};
use crate::selection::{EditForm, UiEffect};

/// Sentence list entries are cut to this many characters.
const SENTENCE_PREVIEW_LEN: usize = 150;

/// Plain-text renderer writing to any [`Write`] sink.
#[derive(Debug)]
pub struct TextRenderer<W> {
    out: W,
}

impl TextRenderer<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> TextRenderer<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn get_ref(&self) -> &W {
        &self.out
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, text: &str) {
        let result = self.out.write_all(text.as_bytes()).and_then(|()| self.out.flush());
        if let Err(err) = result {
            warn!(error = %err, "cannot write to output");
        }
    }
}

impl<W: Write> Renderer for TextRenderer<W> {
    fn render(&mut self, payload: &RenderPayload, graph: &RenderedGraph) {
        let mut text = String::new();
        let mut header = format!("[{}/{}]", payload.num, payload.numsent);
        if !payload.sentid.is_empty() {
            header.push(' ');
            header.push_str(&payload.sentid);
        }
        header.push_str(&format!("  undo:{} redo:{}", payload.undos, payload.redos));
        if payload.readonly {
            header.push_str("  [read-only]");
        }
        text.push_str(&header);
        text.push('\n');

        if !payload.text.is_empty() {
            text.push_str(&payload.text);
            text.push('\n');
        }
        if !payload.comments.is_empty() {
            text.push_str(payload.comments.trim_end());
            text.push('\n');
        }
        text.push_str(payload.penman.trim_end());
        text.push('\n');

        for warning in &payload.warning {
            text.push_str(&format!("warning: {warning}\n"));
        }

        let spans = alignment_spans(payload);
        for (variable, spans) in &spans {
            let spans = spans
                .iter()
                .map(|(start, end)| format!("{start}-{end}"))
                .collect::<Vec<_>>()
                .join(",");
            text.push_str(&format!("aligned {variable}: {spans}\n"));
        }

        if !graph.is_empty() {
            text.push_str("clickable:\n");
            for (_, element) in graph.iter() {
                text.push_str("  ");
                text.push_str(&describe(element));
                text.push('\n');
            }
        }

        if let Some(lastchanged) = &payload.lastchanged {
            text.push_str(&format!("last changed: {lastchanged}\n"));
        }
        self.emit(&text);
    }

    fn apply(&mut self, effect: &UiEffect) {
        let line = match effect {
            UiEffect::Highlight(element) => format!("> selected {}\n", describe(element)),
            UiEffect::ClearHighlight => "> selection cleared\n".to_owned(),
            UiEffect::OpenForm(form) => format!("> {}\n", describe_form(form)),
            UiEffect::CloseForm => "> form closed\n".to_owned(),
        };
        self.emit(&line);
    }

    fn show_error(&mut self, message: &str) {
        self.emit(&format!("error: {message}\n"));
    }

    fn notify(&mut self, message: &str) {
        self.emit(&format!("!! {message}\n"));
    }

    fn show_info(&mut self, info: &ServerInfo) {
        let mut text = format!("file {} with {} sentences", info.filename, info.numsent);
        if info.readonly {
            text.push_str(" (read-only)");
        }
        if !info.version.is_empty() {
            text.push_str(&format!(", server {}", info.version));
        }
        text.push('\n');

        if let Some(others) = &info.otherfilenames {
            for (index, name) in others.iter().enumerate() {
                text.push_str(&format!("compare file {}: {name}\n", index + 2));
            }
        }
        for (index, (id, sentence)) in info.sentences.iter().flatten().enumerate() {
            let entry = format!("{id}: {sentence}");
            text.push_str(&format!("{:>4} {}\n", index + 1, truncate_with_ellipsis(&entry)));
        }
        self.emit(&text);
    }
}

fn describe(element: &GraphElementRef) -> String {
    match element {
        GraphElementRef::Node { variable, concept: Some(concept) } => {
            format!("node {variable} / {concept}")
        }
        GraphElementRef::Node { variable, concept: None } => format!("node {variable}"),
        GraphElementRef::Edge { from, to, label } => format!("edge {from} {to} {label}"),
        GraphElementRef::Literal { id, edge_label, text } => {
            format!("literal {id} {edge_label} {text}")
        }
    }
}

fn describe_form(form: &EditForm) -> String {
    match form {
        EditForm::Concept { variable, concept } => format!("concept of {variable}: {concept}"),
        EditForm::Edge { from, to, label } => format!("edge {from} -{label}-> {to}"),
        EditForm::Literal { id, edge_label, text } => {
            format!("literal {edge_label} of {id}: {text}")
        }
    }
}

fn truncate_with_ellipsis(text: &str) -> String {
    if text.chars().count() <= SENTENCE_PREVIEW_LEN {
        return text.to_owned();
    }
    let mut out: String = text.chars().take(SENTENCE_PREVIEW_LEN - 1).collect();
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::{truncate_with_ellipsis, TextRenderer, SENTENCE_PREVIEW_LEN};
    use crate::model::{GraphElementRef, RenderPayload, RenderedGraph, ServerInfo, Variable};
    use crate::render::Renderer;
    use crate::selection::{EditForm, UiEffect};

    fn output(renderer: TextRenderer<Vec<u8>>) -> String {
        String::from_utf8(renderer.into_inner()).expect("utf8")
    }

    #[test]
    fn render_lists_header_graph_and_clickable_elements() {
        let payload = RenderPayload {
            num: 2,
            numsent: 3,
            sentid: "s2".to_owned(),
            text: "The dog barks.".to_owned(),
            penman: "(b / bark-01\n   :ARG0 (d / dog))".to_owned(),
            warning: vec!["unknown frame".to_owned()],
            undos: 1,
            ..RenderPayload::default()
        };
        let graph = RenderedGraph::from_svg(
            r#"<svg><g id="node#b#bark-01"/><g id="edge#b#d#ARG0"/></svg>"#,
        );

        let mut renderer = TextRenderer::new(Vec::new());
        renderer.render(&payload, &graph);
        let text = output(renderer);

        assert!(text.starts_with("[2/3] s2  undo:1 redo:0\n"));
        assert!(text.contains(":ARG0 (d / dog))\n"));
        assert!(text.contains("warning: unknown frame\n"));
        assert!(text.contains("  node b / bark-01\n"));
        assert!(text.contains("  edge b d ARG0\n"));
    }

    #[test]
    fn effects_and_errors_are_single_lines() {
        let variable = Variable::new("d").expect("variable");
        let mut renderer = TextRenderer::new(Vec::new());
        renderer.apply(&UiEffect::Highlight(GraphElementRef::node(variable.clone())));
        renderer.apply(&UiEffect::OpenForm(EditForm::Concept {
            variable,
            concept: "dog".to_owned(),
        }));
        renderer.apply(&UiEffect::CloseForm);
        renderer.show_error("bad relation");
        renderer.notify("No input text");

        assert_eq!(
            output(renderer),
            "> selected node d\n> concept of d: dog\n> form closed\nerror: bad relation\n\
             !! No input text\n"
        );
    }

    #[test]
    fn info_lists_sentences_truncated() {
        let long = "w ".repeat(100);
        let info = ServerInfo {
            filename: "corpus.amr".to_owned(),
            numsent: 2,
            readonly: true,
            sentences: Some(vec![("s1".to_owned(), "Short.".to_owned()), ("s2".to_owned(), long)]),
            ..ServerInfo::default()
        };

        let mut renderer = TextRenderer::new(Vec::new());
        renderer.show_info(&info);
        let text = output(renderer);

        assert!(text.starts_with("file corpus.amr with 2 sentences (read-only)\n"));
        assert!(text.contains("   1 s1: Short.\n"));
        let last = text.lines().last().expect("line");
        assert!(last.ends_with('…'));
    }

    #[test]
    fn truncation_keeps_short_text() {
        assert_eq!(truncate_with_ellipsis("abc"), "abc");
        let long = "x".repeat(SENTENCE_PREVIEW_LEN + 5);
        assert_eq!(truncate_with_ellipsis(&long).chars().count(), SENTENCE_PREVIEW_LEN);
    }
}
