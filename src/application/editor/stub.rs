//! Minimal surface used when the rich editor is unavailable.
//!
//! It keeps a flat node list with no formatting. Loaded markup is sanitized
//! and kept verbatim as a single node.

use ammonia::Builder;

use crate::domain::document::content_sanitizer;

use super::{EditorHost, ImageRequestHandler, Selection, ToolbarAction, normalize_quotes};

#[derive(Debug, Clone, PartialEq, Eq)]
enum StubNode {
    Markup(String),
    Text(char),
    Image(String),
}

pub struct StubEditor {
    nodes: Vec<StubNode>,
    selection: Option<Selection>,
    sanitizer: Builder<'static>,
    on_image_requested: Option<ImageRequestHandler>,
}

impl Default for StubEditor {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for StubEditor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StubEditor")
            .field("nodes", &self.nodes)
            .field("selection", &self.selection)
            .finish_non_exhaustive()
    }
}

impl StubEditor {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            selection: None,
            sanitizer: content_sanitizer(),
            on_image_requested: None,
        }
    }

    fn clamp(&self, index: usize) -> usize {
        index.min(self.nodes.len())
    }
}

impl EditorHost for StubEditor {
    fn get_content(&self) -> String {
        let mut out = String::new();
        for node in &self.nodes {
            match node {
                StubNode::Markup(markup) => out.push_str(markup),
                StubNode::Text(ch) => match ch {
                    '&' => out.push_str("&amp;"),
                    '<' => out.push_str("&lt;"),
                    '>' => out.push_str("&gt;"),
                    ch => out.push(*ch),
                },
                StubNode::Image(src) => {
                    out.push_str("<img src='");
                    out.push_str(&src.replace('&', "&amp;").replace('\'', "&#39;"));
                    out.push_str("'>");
                }
            }
        }
        normalize_quotes(&out)
    }

    fn set_content(&mut self, html: &str) {
        let clean = self.sanitizer.clean(html).to_string();
        self.nodes = if clean.is_empty() {
            Vec::new()
        } else {
            vec![StubNode::Markup(clean)]
        };
        self.selection = None;
    }

    fn insert_media_at_cursor(&mut self, url: &str) {
        let index = self.clamp(self.selection.map_or(0, |selection| selection.index));
        self.nodes.insert(index, StubNode::Image(url.to_string()));
        self.selection = Some(Selection::caret(index + 1));
    }

    fn selection(&self) -> Option<Selection> {
        self.selection
    }

    fn set_selection(&mut self, selection: Option<Selection>) {
        self.selection = selection.map(|selection| {
            let index = self.clamp(selection.index);
            Selection {
                index,
                length: selection.length.min(self.nodes.len() - index),
            }
        });
    }

    fn length(&self) -> usize {
        self.nodes.len() + 1
    }

    fn type_text(&mut self, text: &str) {
        let selection = self.selection.unwrap_or_default();
        let index = self.clamp(selection.index);
        let end = (index + selection.length).min(self.nodes.len());
        self.nodes.drain(index..end);

        let mut at = index;
        for ch in text.chars() {
            self.nodes.insert(at, StubNode::Text(ch));
            at += 1;
        }
        self.selection = Some(Selection::caret(at));
    }

    fn apply(&mut self, action: ToolbarAction) {
        match action {
            ToolbarAction::Image => {
                if let Some(handler) = self.on_image_requested.as_mut() {
                    handler();
                }
            }
            other => tracing::debug!(
                target = "postdesk::editor",
                action = ?other,
                "formatting is not supported by the stub surface"
            ),
        }
    }

    fn set_image_request_handler(&mut self, handler: ImageRequestHandler) {
        self.on_image_requested = Some(handler);
    }
}
