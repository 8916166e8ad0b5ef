//! Inline and line formats understood by the document model.

use serde::{Deserialize, Serialize};

/// Deepest indent level the editor toolbar can reach.
pub const MAX_INDENT: u8 = 8;

/// Deepest header level markup can express.
pub const MAX_HEADER_LEVEL: u8 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Font {
    Serif,
    Monospace,
}

impl Font {
    pub fn as_str(self) -> &'static str {
        match self {
            Font::Serif => "serif",
            Font::Monospace => "monospace",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "serif" => Some(Font::Serif),
            "monospace" => Some(Font::Monospace),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Size {
    Small,
    Large,
    Huge,
}

impl Size {
    pub fn as_str(self) -> &'static str {
        match self {
            Size::Small => "small",
            Size::Large => "large",
            Size::Huge => "huge",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "small" => Some(Size::Small),
            "large" => Some(Size::Large),
            "huge" => Some(Size::Huge),
            _ => None,
        }
    }
}

/// Character-level formatting. Every text unit and inline embed carries one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InlineFormat {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub strike: bool,
    pub link: Option<String>,
    pub font: Option<Font>,
    pub size: Option<Size>,
}

impl InlineFormat {
    pub fn is_plain(&self) -> bool {
        *self == Self::default()
    }

    /// Classes carried on the innermost `span` wrapper.
    pub(crate) fn span_classes(&self) -> Option<String> {
        let mut classes = Vec::new();
        if let Some(font) = self.font {
            classes.push(format!("ql-font-{}", font.as_str()));
        }
        if let Some(size) = self.size {
            classes.push(format!("ql-size-{}", size.as_str()));
        }
        (!classes.is_empty()).then(|| classes.join(" "))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListKind {
    Ordered,
    Bullet,
}

impl ListKind {
    pub(crate) fn container_tag(self) -> &'static str {
        match self {
            ListKind::Ordered => "ol",
            ListKind::Bullet => "ul",
        }
    }
}

/// Block type of a line. A line has exactly one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BlockKind {
    #[default]
    Paragraph,
    Header(u8),
    Blockquote,
    List(ListKind),
}

impl BlockKind {
    /// Header block with the level pulled into `1..=MAX_HEADER_LEVEL`.
    pub fn header(level: u8) -> Self {
        BlockKind::Header(level.clamp(1, MAX_HEADER_LEVEL))
    }

    pub(crate) fn tag(self) -> String {
        match self {
            BlockKind::Paragraph => "p".to_string(),
            BlockKind::Header(level) => format!("h{}", level.clamp(1, MAX_HEADER_LEVEL)),
            BlockKind::Blockquote => "blockquote".to_string(),
            BlockKind::List(_) => "li".to_string(),
        }
    }
}

/// Formatting stored on the line break that terminates a line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LineFormat {
    pub kind: BlockKind,
    pub indent: u8,
}

impl LineFormat {
    pub(crate) fn indent_class(self) -> Option<String> {
        (self.indent > 0).then(|| format!("ql-indent-{}", self.indent))
    }
}

/// Pull the indent level out of a `class` attribute value.
pub(crate) fn indent_from_classes(classes: &str) -> u8 {
    classes
        .split_whitespace()
        .filter_map(|class| class.strip_prefix("ql-indent-"))
        .filter_map(|level| level.parse::<u8>().ok())
        .map(|level| level.min(MAX_INDENT))
        .last()
        .unwrap_or(0)
}
