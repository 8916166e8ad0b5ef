//! Rich surface backed by the linear document model.

use crate::domain::document::{
    BlockKind, Document, Embed, HtmlImporter, InlineFormat, ListKind, MAX_INDENT,
};

use super::{EditorHost, ImageRequestHandler, Selection, ToolbarAction, normalize_quotes};

#[derive(Default)]
pub struct RichEditor {
    document: Document,
    selection: Option<Selection>,
    /// Format picked on a collapsed selection, applied to the next typed text.
    caret_format: Option<InlineFormat>,
    importer: HtmlImporter,
    on_image_requested: Option<ImageRequestHandler>,
}

impl std::fmt::Debug for RichEditor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RichEditor")
            .field("length", &self.document.len())
            .field("selection", &self.selection)
            .finish_non_exhaustive()
    }
}

impl RichEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Selection used by commands; focusing without one lands at the start.
    fn focused(&self) -> Selection {
        let selection = self.selection.unwrap_or_default();
        let index = self.document.clamp(selection.index);
        let length = selection.length.min(self.document.max_cursor() - index);
        Selection { index, length }
    }

    fn toggle_inline(
        &mut self,
        is_set: impl Fn(&InlineFormat) -> bool,
        set: impl Fn(&mut InlineFormat, bool),
    ) {
        let range = self.focused();
        if range.is_collapsed() {
            let mut format = self.pending_format(range.index);
            let enable = !is_set(&format);
            set(&mut format, enable);
            self.caret_format = Some(format);
            return;
        }
        let enable = !self.document.inline_matches(range.index, range.length, &is_set);
        self.document
            .format_text(range.index, range.length, |format| set(format, enable));
    }

    fn set_inline(&mut self, set: impl Fn(&mut InlineFormat)) {
        let range = self.focused();
        if range.is_collapsed() {
            let mut format = self.pending_format(range.index);
            set(&mut format);
            self.caret_format = Some(format);
        } else {
            self.document.format_text(range.index, range.length, set);
        }
    }

    fn toggle_block(&mut self, kind: BlockKind) {
        let range = self.focused();
        let already = self
            .document
            .lines_match(range.index, range.length, |line| line.kind == kind);
        let next = if already { BlockKind::Paragraph } else { kind };
        self.document
            .format_lines(range.index, range.length, |line| line.kind = next);
    }

    fn shift_indent(&mut self, delta: i8) {
        let range = self.focused();
        self.document
            .format_lines(range.index, range.length, |line| {
                line.indent = if delta > 0 {
                    line.indent.saturating_add(1).min(MAX_INDENT)
                } else {
                    line.indent.saturating_sub(1)
                };
            });
    }

    fn pending_format(&self, index: usize) -> InlineFormat {
        self.caret_format
            .clone()
            .unwrap_or_else(|| self.document.inline_format_at(index))
    }

    fn clean(&mut self) {
        let range = self.focused();
        if range.is_collapsed() {
            self.caret_format = Some(InlineFormat::default());
            return;
        }
        self.document
            .format_text(range.index, range.length, |format| {
                *format = InlineFormat::default()
            });
        self.document
            .format_lines(range.index, range.length, |line| *line = Default::default());
    }
}

impl EditorHost for RichEditor {
    fn get_content(&self) -> String {
        normalize_quotes(&self.document.to_html())
    }

    fn set_content(&mut self, html: &str) {
        self.document = match self.importer.import(html) {
            Ok(document) => document,
            Err(err) => {
                tracing::warn!(
                    target = "postdesk::editor",
                    error = %err,
                    "discarding markup that could not be imported"
                );
                Document::new()
            }
        };
        self.selection = None;
        self.caret_format = None;
    }

    fn insert_media_at_cursor(&mut self, url: &str) {
        let index = self.selection.map_or(0, |selection| selection.index);
        let next = self
            .document
            .insert_embed(index, Embed::Image(url.to_string()));
        self.selection = Some(Selection::caret(next));
    }

    fn selection(&self) -> Option<Selection> {
        self.selection
    }

    fn set_selection(&mut self, selection: Option<Selection>) {
        self.selection = selection.map(|selection| {
            let index = self.document.clamp(selection.index);
            Selection {
                index,
                length: selection.length.min(self.document.max_cursor() - index),
            }
        });
        self.caret_format = None;
    }

    fn length(&self) -> usize {
        self.document.len()
    }

    fn type_text(&mut self, text: &str) {
        let range = self.focused();
        let format = self.pending_format(range.index);
        if !range.is_collapsed() {
            self.document.delete(range.index, range.length);
        }
        let next = self.document.insert_text(range.index, text, &format);
        self.selection = Some(Selection::caret(next));
        self.caret_format = None;
    }

    fn apply(&mut self, action: ToolbarAction) {
        match action {
            ToolbarAction::Header(level) => {
                let range = self.focused();
                let kind = level.map_or(BlockKind::Paragraph, BlockKind::header);
                self.document
                    .format_lines(range.index, range.length, |line| line.kind = kind);
            }
            ToolbarAction::Font(font) => self.set_inline(|format| format.font = font),
            ToolbarAction::Size(size) => self.set_inline(|format| format.size = size),
            ToolbarAction::Bold => {
                self.toggle_inline(|format| format.bold, |format, on| format.bold = on)
            }
            ToolbarAction::Italic => {
                self.toggle_inline(|format| format.italic, |format, on| format.italic = on)
            }
            ToolbarAction::Underline => self.toggle_inline(
                |format| format.underline,
                |format, on| format.underline = on,
            ),
            ToolbarAction::Strike => {
                self.toggle_inline(|format| format.strike, |format, on| format.strike = on)
            }
            ToolbarAction::Blockquote => self.toggle_block(BlockKind::Blockquote),
            ToolbarAction::OrderedList => self.toggle_block(BlockKind::List(ListKind::Ordered)),
            ToolbarAction::BulletList => self.toggle_block(BlockKind::List(ListKind::Bullet)),
            ToolbarAction::Indent => self.shift_indent(1),
            ToolbarAction::Outdent => self.shift_indent(-1),
            ToolbarAction::Link(href) => {
                let range = self.focused();
                if !range.is_collapsed() {
                    self.document.format_text(range.index, range.length, |format| {
                        format.link = href.clone()
                    });
                }
            }
            ToolbarAction::Image => match self.on_image_requested.as_mut() {
                Some(handler) => handler(),
                None => tracing::debug!(
                    target = "postdesk::editor",
                    "image control used without a handler"
                ),
            },
            ToolbarAction::Video(src) => {
                let range = self.focused();
                let next = self.document.insert_embed(range.index, Embed::Video(src));
                self.selection = Some(Selection::caret(next));
            }
            ToolbarAction::Clean => self.clean(),
        }
    }

    fn set_image_request_handler(&mut self, handler: ImageRequestHandler) {
        self.on_image_requested = Some(handler);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn editor_with(text: &str) -> RichEditor {
        let mut editor = RichEditor::new();
        editor.type_text(text);
        editor
    }

    #[test]
    fn bold_toggles_on_then_off_over_a_range() {
        let mut editor = editor_with("hello");
        editor.set_selection(Some(Selection {
            index: 0,
            length: 5,
        }));
        editor.apply(ToolbarAction::Bold);
        assert_eq!(editor.get_content(), "<p><strong>hello</strong></p>");

        editor.apply(ToolbarAction::Bold);
        assert_eq!(editor.get_content(), "<p>hello</p>");
    }

    #[test]
    fn caret_format_applies_to_next_typed_text() {
        let mut editor = editor_with("a");
        editor.apply(ToolbarAction::Italic);
        editor.type_text("b");
        assert_eq!(editor.get_content(), "<p>a<em>b</em></p>");
    }

    #[test]
    fn typing_replaces_the_selected_range() {
        let mut editor = editor_with("hello world");
        editor.set_selection(Some(Selection {
            index: 6,
            length: 5,
        }));
        editor.type_text("there");
        assert_eq!(editor.get_content(), "<p>hello there</p>");
        assert_eq!(editor.selection(), Some(Selection::caret(11)));
    }

    #[test]
    fn list_and_indent_controls_shape_lines() {
        let mut editor = editor_with("one\ntwo");
        editor.set_selection(Some(Selection {
            index: 0,
            length: 5,
        }));
        editor.apply(ToolbarAction::OrderedList);
        editor.set_selection(Some(Selection::caret(5)));
        editor.apply(ToolbarAction::Indent);
        assert_eq!(
            editor.get_content(),
            "<ol><li>one</li><li class='ql-indent-1'>two</li></ol>"
        );

        editor.apply(ToolbarAction::Outdent);
        editor.apply(ToolbarAction::Outdent);
        assert_eq!(editor.get_content(), "<ol><li>one</li><li>two</li></ol>");
    }

    #[test]
    fn header_control_sets_and_clears_level() {
        let mut editor = editor_with("Title");
        editor.apply(ToolbarAction::Header(Some(2)));
        assert_eq!(editor.get_content(), "<h2>Title</h2>");
        editor.apply(ToolbarAction::Header(None));
        assert_eq!(editor.get_content(), "<p>Title</p>");
    }

    #[test]
    fn header_level_outside_markup_range_is_clamped() {
        let mut editor = editor_with("Title");
        editor.apply(ToolbarAction::Header(Some(0)));
        assert_eq!(editor.get_content(), "<h1>Title</h1>");
        editor.apply(ToolbarAction::Header(Some(9)));
        assert_eq!(editor.get_content(), "<h6>Title</h6>");
    }

    #[test]
    fn link_on_collapsed_selection_is_ignored() {
        let mut editor = editor_with("site");
        editor.apply(ToolbarAction::Link(Some("https://example.com".into())));
        assert_eq!(editor.get_content(), "<p>site</p>");

        editor.set_selection(Some(Selection {
            index: 0,
            length: 4,
        }));
        editor.apply(ToolbarAction::Link(Some("https://example.com".into())));
        assert!(editor.get_content().contains("<a href='https://example.com'"));
    }

    #[test]
    fn set_content_sanitizes_and_clears_selection() {
        let mut editor = editor_with("old");
        editor.set_content(r#"<p>new<script>x()</script></p>"#);
        assert_eq!(editor.get_content(), "<p>new</p>");
        assert_eq!(editor.selection(), None);
    }

    #[test]
    fn clean_resets_formats_in_range() {
        let mut editor = editor_with("x");
        editor.set_selection(Some(Selection {
            index: 0,
            length: 1,
        }));
        editor.apply(ToolbarAction::Underline);
        editor.apply(ToolbarAction::Blockquote);
        editor.apply(ToolbarAction::Clean);
        assert_eq!(editor.get_content(), "<p>x</p>");
    }

    #[test]
    fn video_control_inserts_frame_at_cursor() {
        let mut editor = editor_with("ab");
        editor.apply(ToolbarAction::Video("https://v.example/e".into()));
        let content = editor.get_content();
        assert!(content.starts_with("<p>ab</p><iframe class='ql-video'"), "{content}");
    }
}
