//! Markup import: sanitize, annotate structure, then rebuild the unit sequence.
//!
//! The sanitized markup is rewritten so that every element we understand is
//! replaced by private-use marker characters around its content. The marker
//! stream is then walked in one pass with explicit block, list and inline
//! stacks.

use std::collections::HashSet;

use ammonia::Builder as AmmoniaBuilder;
use lol_html::{RewriteStrSettings, element, html_content::ContentType, rewrite_str};
use thiserror::Error;

use super::format::{BlockKind, Font, InlineFormat, LineFormat, ListKind, Size, indent_from_classes};
use super::{Document, Unit};

const OPEN: char = '\u{E000}';
const CLOSE: char = '\u{E001}';
const SEP: char = '\u{E002}';
const END: char = '\u{E003}';

const CONTAINER_SELECTOR: &str = "p, div, h1, h2, h3, h4, h5, h6, blockquote, li, ol, ul, \
     strong, b, em, i, u, s, strike, del, a, span";

#[derive(Debug, Error)]
pub enum DocumentImportError {
    #[error("failed to annotate markup: {0}")]
    Rewrite(String),
}

/// Sanitizer applied to every piece of markup loaded into the editor.
pub fn content_sanitizer() -> AmmoniaBuilder<'static> {
    let mut builder = AmmoniaBuilder::default();

    let tags: HashSet<&'static str> = HashSet::from([
        "a",
        "b",
        "blockquote",
        "br",
        "del",
        "div",
        "em",
        "h1",
        "h2",
        "h3",
        "h4",
        "h5",
        "h6",
        "i",
        "iframe",
        "img",
        "li",
        "ol",
        "p",
        "s",
        "span",
        "strike",
        "strong",
        "u",
        "ul",
    ]);
    builder.tags(tags);
    builder.generic_attributes(HashSet::from(["class"]));
    builder.add_tag_attributes("a", &["target"]);
    builder.add_tag_attributes("img", &["src", "alt"]);
    builder.add_tag_attributes("iframe", &["src", "frameborder", "allowfullscreen"]);
    builder.url_schemes(HashSet::from(["http", "https", "mailto", "tel"]));

    builder
}

/// Sanitizing markup importer owned by an editor instance.
pub struct HtmlImporter {
    sanitizer: AmmoniaBuilder<'static>,
}

impl Default for HtmlImporter {
    fn default() -> Self {
        Self {
            sanitizer: content_sanitizer(),
        }
    }
}

impl std::fmt::Debug for HtmlImporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HtmlImporter").finish_non_exhaustive()
    }
}

impl HtmlImporter {
    pub fn import(&self, html: &str) -> Result<Document, DocumentImportError> {
        let sanitized = strip_markers(&self.sanitizer.clean(html).to_string());
        let annotated = annotate(&sanitized)?;
        Ok(Builder::default().run(&annotated))
    }
}

impl Document {
    /// Import markup with the default sanitizer.
    pub fn from_html(html: &str) -> Result<Self, DocumentImportError> {
        HtmlImporter::default().import(html)
    }
}

/// Marker code points in the input would be read back as structure.
fn strip_markers(sanitized: &str) -> String {
    sanitized.replace([OPEN, CLOSE, SEP, END], "")
}

fn marker(open: bool, kind: &str, payload: Option<&str>) -> String {
    let mut out = String::new();
    out.push(if open { OPEN } else { CLOSE });
    out.push_str(kind);
    if let Some(payload) = payload {
        out.push(SEP);
        out.push_str(payload);
    }
    out.push(END);
    out
}

fn annotate(sanitized: &str) -> Result<String, DocumentImportError> {
    rewrite_str(
        sanitized,
        RewriteStrSettings {
            element_content_handlers: vec![
                element!(CONTAINER_SELECTOR, |el| {
                    let tag = el.tag_name();
                    let payload = if tag == "a" {
                        el.get_attribute("href")
                    } else {
                        el.get_attribute("class")
                    };
                    el.before(&marker(true, &tag, payload.as_deref()), ContentType::Html);
                    el.after(&marker(false, &tag, None), ContentType::Html);
                    el.remove_and_keep_content();
                    Ok(())
                }),
                element!("img", |el| {
                    match el.get_attribute("src") {
                        Some(src) => el.replace(&marker(true, "img", Some(&src)), ContentType::Html),
                        None => el.remove(),
                    }
                    Ok(())
                }),
                element!("iframe", |el| {
                    match el.get_attribute("src") {
                        Some(src) => {
                            el.replace(&marker(true, "video", Some(&src)), ContentType::Html)
                        }
                        None => el.remove(),
                    }
                    Ok(())
                }),
                element!("br", |el| {
                    el.replace(&marker(true, "br", None), ContentType::Html);
                    Ok(())
                }),
            ],
            ..RewriteStrSettings::default()
        },
    )
    .map_err(|err| DocumentImportError::Rewrite(err.to_string()))
}

#[derive(Debug)]
struct BlockFrame {
    kind: BlockKind,
    indent: u8,
    emitted: bool,
}

#[derive(Debug, Clone)]
enum Mark {
    Bold,
    Italic,
    Underline,
    Strike,
    Link(String),
    Span {
        font: Option<Font>,
        size: Option<Size>,
    },
    Unknown,
}

#[derive(Default)]
struct Builder {
    units: Vec<Unit>,
    blocks: Vec<BlockFrame>,
    lists: Vec<ListKind>,
    marks: Vec<Mark>,
    line_has_content: bool,
}

impl Builder {
    fn run(mut self, annotated: &str) -> Document {
        let mut text = String::new();
        let mut chars = annotated.chars();

        while let Some(ch) = chars.next() {
            if ch != OPEN && ch != CLOSE {
                text.push(ch);
                continue;
            }

            self.push_text(&text);
            text.clear();

            let mut body = String::new();
            for next in chars.by_ref() {
                if next == END {
                    break;
                }
                body.push(next);
            }
            let (kind, payload) = match body.split_once(SEP) {
                Some((kind, payload)) => (kind.to_string(), Some(decode_entities(payload))),
                None => (body, None),
            };

            if ch == OPEN {
                self.open(&kind, payload);
            } else {
                self.close(&kind);
            }
        }
        self.push_text(&text);

        if self.line_has_content {
            self.end_line();
        }
        Document::from_units(self.units)
    }

    fn open(&mut self, kind: &str, payload: Option<String>) {
        match kind {
            "p" | "div" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "blockquote" | "li" => {
                if self.line_has_content {
                    self.end_line();
                }
                let block = match kind {
                    "blockquote" => BlockKind::Blockquote,
                    "li" => BlockKind::List(self.lists.last().copied().unwrap_or(ListKind::Bullet)),
                    heading if heading.starts_with('h') => heading[1..]
                        .parse::<u8>()
                        .map_or(BlockKind::Paragraph, BlockKind::header),
                    _ => BlockKind::Paragraph,
                };
                let indent = payload.as_deref().map_or(0, indent_from_classes);
                self.blocks.push(BlockFrame {
                    kind: block,
                    indent,
                    emitted: false,
                });
            }
            "ol" => self.lists.push(ListKind::Ordered),
            "ul" => self.lists.push(ListKind::Bullet),
            "strong" | "b" => self.marks.push(Mark::Bold),
            "em" | "i" => self.marks.push(Mark::Italic),
            "u" => self.marks.push(Mark::Underline),
            "s" | "strike" | "del" => self.marks.push(Mark::Strike),
            "a" => self
                .marks
                .push(payload.map_or(Mark::Unknown, Mark::Link)),
            "span" => {
                let classes = payload.unwrap_or_default();
                let mut font = None;
                let mut size = None;
                for class in classes.split_whitespace() {
                    if let Some(value) = class.strip_prefix("ql-font-") {
                        font = Font::parse(value).or(font);
                    }
                    if let Some(value) = class.strip_prefix("ql-size-") {
                        size = Size::parse(value).or(size);
                    }
                }
                self.marks.push(Mark::Span { font, size });
            }
            "img" => {
                if let Some(src) = payload {
                    let format = self.inline_format();
                    self.units.push(Unit::Image { src, format });
                    self.line_has_content = true;
                }
            }
            "video" => {
                if let Some(src) = payload {
                    if self.line_has_content {
                        self.end_line();
                    }
                    self.units.push(Unit::Video { src });
                    for frame in &mut self.blocks {
                        frame.emitted = true;
                    }
                }
            }
            "br" => {
                if self.line_has_content {
                    self.end_line();
                }
            }
            _ => {}
        }
    }

    fn close(&mut self, kind: &str) {
        match kind {
            "p" | "div" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "blockquote" | "li" => {
                let pending = self.blocks.last().is_some_and(|frame| !frame.emitted);
                if self.line_has_content || pending {
                    self.end_line();
                }
                self.blocks.pop();
            }
            "ol" | "ul" => {
                self.lists.pop();
            }
            "strong" | "b" | "em" | "i" | "u" | "s" | "strike" | "del" | "a" | "span" => {
                self.marks.pop();
            }
            _ => {}
        }
    }

    fn end_line(&mut self) {
        let format = self.line_format();
        self.units.push(Unit::Break(format));
        self.line_has_content = false;
        for frame in &mut self.blocks {
            frame.emitted = true;
        }
    }

    fn line_format(&self) -> LineFormat {
        let kind = self
            .blocks
            .iter()
            .rev()
            .map(|frame| frame.kind)
            .find(|kind| *kind != BlockKind::Paragraph)
            .unwrap_or_default();
        let indent = self
            .blocks
            .iter()
            .rev()
            .map(|frame| frame.indent)
            .find(|indent| *indent > 0)
            .unwrap_or(0);
        LineFormat { kind, indent }
    }

    fn inline_format(&self) -> InlineFormat {
        let mut format = InlineFormat::default();
        for mark in &self.marks {
            match mark {
                Mark::Bold => format.bold = true,
                Mark::Italic => format.italic = true,
                Mark::Underline => format.underline = true,
                Mark::Strike => format.strike = true,
                Mark::Link(href) => format.link = Some(href.clone()),
                Mark::Span { font, size } => {
                    format.font = font.or(format.font);
                    format.size = size.or(format.size);
                }
                Mark::Unknown => {}
            }
        }
        format
    }

    fn push_text(&mut self, raw: &str) {
        if raw.is_empty() {
            return;
        }
        let whitespace_only = raw.chars().all(char::is_whitespace);
        if whitespace_only && (self.blocks.is_empty() || raw.contains('\n')) {
            return;
        }

        let format = self.inline_format();
        for ch in decode_entities(raw).chars() {
            let ch = match ch {
                '\n' | '\r' | '\t' => ' ',
                ch => ch,
            };
            self.units.push(Unit::Char(ch, format.clone()));
        }
        self.line_has_content = true;
    }
}

fn decode_entities(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;

    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        let decoded = tail.find(';').and_then(|semi| {
            let name = &tail[1..semi];
            decode_entity(name).map(|ch| (ch, semi + 1))
        });
        match decoded {
            Some((ch, consumed)) => {
                out.push(ch);
                rest = &tail[consumed..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        numeric if numeric.starts_with("#x") || numeric.starts_with("#X") => {
            u32::from_str_radix(&numeric[2..], 16)
                .ok()
                .and_then(char::from_u32)
        }
        numeric if numeric.starts_with('#') => {
            numeric[1..].parse::<u32>().ok().and_then(char::from_u32)
        }
        _ => None,
    }
}
