//! Markup serialization matching what the editing surface puts in its root
//! element's `innerHTML`.

use super::format::{BlockKind, InlineFormat, LineFormat, ListKind};
use super::{Document, Unit};

enum Block<'a> {
    Line {
        content: Vec<&'a Unit>,
        format: LineFormat,
    },
    Video(&'a str),
}

pub(super) fn render(doc: &Document) -> String {
    let mut out = String::new();
    let mut open_list: Option<ListKind> = None;

    for block in collect_blocks(doc) {
        match block {
            Block::Line { content, format } => {
                let list = match format.kind {
                    BlockKind::List(kind) => Some(kind),
                    _ => None,
                };
                if open_list != list {
                    if let Some(previous) = open_list {
                        push_close(&mut out, previous.container_tag());
                    }
                    if let Some(next) = list {
                        push_open(&mut out, next.container_tag(), &[]);
                    }
                    open_list = list;
                }

                let tag = format.kind.tag();
                let class = format.indent_class();
                let attrs: Vec<(&str, &str)> = class
                    .as_deref()
                    .map(|class| vec![("class", class)])
                    .unwrap_or_default();
                push_open(&mut out, &tag, &attrs);
                render_inline(&mut out, &content);
                push_close(&mut out, &tag);
            }
            Block::Video(src) => {
                if let Some(previous) = open_list.take() {
                    push_close(&mut out, previous.container_tag());
                }
                push_open(
                    &mut out,
                    "iframe",
                    &[
                        ("class", "ql-video"),
                        ("frameborder", "0"),
                        ("allowfullscreen", "true"),
                        ("src", src),
                    ],
                );
                push_close(&mut out, "iframe");
            }
        }
    }

    if let Some(previous) = open_list {
        push_close(&mut out, previous.container_tag());
    }
    out
}

fn collect_blocks(doc: &Document) -> Vec<Block<'_>> {
    let mut blocks = Vec::new();
    let mut content = Vec::new();

    for unit in doc.units() {
        match unit {
            Unit::Break(format) => blocks.push(Block::Line {
                content: std::mem::take(&mut content),
                format: *format,
            }),
            Unit::Video { src } => {
                if !content.is_empty() {
                    blocks.push(Block::Line {
                        content: std::mem::take(&mut content),
                        format: LineFormat::default(),
                    });
                }
                blocks.push(Block::Video(src));
            }
            Unit::Char(..) | Unit::Image { .. } => content.push(unit),
        }
    }

    blocks
}

fn render_inline(out: &mut String, content: &[&Unit]) {
    if content.is_empty() {
        out.push_str("<br>");
        return;
    }

    let mut index = 0;
    while index < content.len() {
        match content[index] {
            Unit::Char(_, format) => {
                let mut text = String::new();
                while let Some(Unit::Char(ch, next)) = content.get(index) {
                    if next != format {
                        break;
                    }
                    text.push(*ch);
                    index += 1;
                }
                wrap(out, format, |out| push_text(out, &text));
            }
            Unit::Image { src, format } => {
                wrap(out, format, |out| push_open(out, "img", &[("src", src.as_str())]));
                index += 1;
            }
            Unit::Video { .. } | Unit::Break(_) => index += 1,
        }
    }
}

fn wrap(out: &mut String, format: &InlineFormat, inner: impl FnOnce(&mut String)) {
    let span = format.span_classes();
    let mut closers: Vec<&str> = Vec::new();

    if format.bold {
        push_open(out, "strong", &[]);
        closers.push("strong");
    }
    if format.italic {
        push_open(out, "em", &[]);
        closers.push("em");
    }
    if format.strike {
        push_open(out, "s", &[]);
        closers.push("s");
    }
    if format.underline {
        push_open(out, "u", &[]);
        closers.push("u");
    }
    if let Some(href) = format.link.as_deref() {
        push_open(
            out,
            "a",
            &[
                ("href", href),
                ("rel", "noopener noreferrer"),
                ("target", "_blank"),
            ],
        );
        closers.push("a");
    }
    if let Some(classes) = span.as_deref() {
        push_open(out, "span", &[("class", classes)]);
        closers.push("span");
    }

    inner(out);

    for tag in closers.into_iter().rev() {
        push_close(out, tag);
    }
}

fn push_open(out: &mut String, tag: &str, attrs: &[(&str, &str)]) {
    out.push('<');
    out.push_str(tag);
    for (name, value) in attrs {
        out.push(' ');
        out.push_str(name);
        out.push_str("=\"");
        push_attribute(out, value);
        out.push('"');
    }
    out.push('>');
}

fn push_close(out: &mut String, tag: &str) {
    out.push_str("</");
    out.push_str(tag);
    out.push('>');
}

fn push_text(out: &mut String, text: &str) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            ch => out.push(ch),
        }
    }
}

fn push_attribute(out: &mut String, value: &str) {
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            ch => out.push(ch),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::{Document, Embed, Font, InlineFormat, LineFormat, ListKind, Size};
    use super::*;

    fn doc_with(text: &str) -> Document {
        let mut doc = Document::new();
        doc.insert_text(0, text, &InlineFormat::default());
        doc
    }

    #[test]
    fn escapes_text_but_keeps_double_quotes_raw() {
        let doc = doc_with(r#"a < b & "c""#);
        assert_eq!(doc.to_html(), r#"<p>a &lt; b &amp; "c"</p>"#);
    }

    #[test]
    fn attribute_quotes_are_entity_encoded() {
        let mut doc = Document::new();
        doc.insert_embed(0, Embed::Image(r#"https://x/a".png"#.into()));
        assert_eq!(doc.to_html(), r#"<p><img src="https://x/a&quot;.png"></p>"#);
    }

    #[test]
    fn nests_inline_wrappers_in_editor_order() {
        let mut doc = doc_with("hey");
        doc.format_text(0, 3, |format| {
            format.bold = true;
            format.italic = true;
            format.underline = true;
            format.link = Some("https://example.com".into());
            format.font = Some(Font::Monospace);
            format.size = Some(Size::Large);
        });
        insta::assert_snapshot!(
            doc.to_html(),
            @r#"<p><strong><em><u><a href="https://example.com" rel="noopener noreferrer" target="_blank"><span class="ql-font-monospace ql-size-large">hey</span></a></u></em></strong></p>"#
        );
    }

    #[test]
    fn switching_list_kinds_reopens_container() {
        let mut doc = doc_with("a\nb");
        doc.format_lines(0, 0, |line| line.kind = BlockKind::List(ListKind::Ordered));
        doc.format_lines(2, 0, |line| {
            *line = LineFormat {
                kind: BlockKind::List(ListKind::Bullet),
                indent: 1,
            }
        });
        assert_eq!(
            doc.to_html(),
            r#"<ol><li>a</li></ol><ul><li class="ql-indent-1">b</li></ul>"#
        );
    }

    #[test]
    fn empty_lines_render_break_placeholder() {
        let doc = doc_with("a\n\nb");
        assert_eq!(doc.to_html(), "<p>a</p><p><br></p><p>b</p>");
    }
}
