//! Linear rich-text document.
//!
//! The document is a flat sequence of units, each of length one: characters,
//! inline images, block-level videos and line breaks. Line formats live on
//! the break that closes the line. The sequence always ends with a break, so
//! an empty document has length one. Indices address units directly, which
//! gives the same cursor arithmetic as Quill deltas.

mod format;
mod html;
mod import;

use std::ops::Range;

pub use format::{BlockKind, Font, InlineFormat, LineFormat, ListKind, MAX_HEADER_LEVEL, MAX_INDENT, Size};
pub use import::{DocumentImportError, HtmlImporter, content_sanitizer};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Unit {
    Char(char, InlineFormat),
    Image { src: String, format: InlineFormat },
    Video { src: String },
    Break(LineFormat),
}

impl Unit {
    fn is_line_boundary(&self) -> bool {
        matches!(self, Unit::Break(_) | Unit::Video { .. })
    }

    fn inline_format_mut(&mut self) -> Option<&mut InlineFormat> {
        match self {
            Unit::Char(_, format) | Unit::Image { format, .. } => Some(format),
            Unit::Video { .. } | Unit::Break(_) => None,
        }
    }
}

/// Embeddable media.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Embed {
    Image(String),
    Video(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    units: Vec<Unit>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        Self {
            units: vec![Unit::Break(LineFormat::default())],
        }
    }

    pub(crate) fn from_units(mut units: Vec<Unit>) -> Self {
        if !matches!(units.last(), Some(Unit::Break(_))) {
            units.push(Unit::Break(LineFormat::default()));
        }
        Self { units }
    }

    pub fn units(&self) -> &[Unit] {
        &self.units
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// A document holding a single empty line.
    pub fn is_empty(&self) -> bool {
        self.units.len() == 1
    }

    /// Highest index a cursor may occupy: just before the trailing break.
    pub fn max_cursor(&self) -> usize {
        self.units.len() - 1
    }

    pub fn clamp(&self, index: usize) -> usize {
        index.min(self.max_cursor())
    }

    pub fn to_html(&self) -> String {
        html::render(self)
    }

    pub fn plain_text(&self) -> String {
        self.units
            .iter()
            .map(|unit| match unit {
                Unit::Char(ch, _) => *ch,
                Unit::Break(_) | Unit::Video { .. } => '\n',
                Unit::Image { .. } => '\u{fffc}',
            })
            .collect()
    }

    /// Index of the break terminating the line that contains `index`.
    pub fn line_end(&self, index: usize) -> usize {
        let start = self.clamp(index);
        self.units[start..]
            .iter()
            .position(|unit| matches!(unit, Unit::Break(_)))
            .map_or(self.max_cursor(), |offset| start + offset)
    }

    /// Index of the first unit on the line that contains `index`.
    pub fn line_start(&self, index: usize) -> usize {
        let index = self.clamp(index);
        self.units[..index]
            .iter()
            .rposition(Unit::is_line_boundary)
            .map_or(0, |pos| pos + 1)
    }

    pub fn line_format_at(&self, index: usize) -> LineFormat {
        match &self.units[self.line_end(index)] {
            Unit::Break(format) => *format,
            _ => LineFormat::default(),
        }
    }

    /// Insert text at `index`; newlines split the line and copy its format.
    /// Returns the index just past the inserted text.
    pub fn insert_text(&mut self, index: usize, text: &str, format: &InlineFormat) -> usize {
        let mut at = self.clamp(index);
        for ch in text.chars() {
            let unit = match ch {
                '\r' => continue,
                '\n' => Unit::Break(self.line_format_at(at)),
                ch => Unit::Char(ch, format.clone()),
            };
            self.units.insert(at, unit);
            at += 1;
        }
        at
    }

    /// Insert an embed at `index` and return the index just past it.
    ///
    /// Images are inline. Videos occupy their own block, so the current line
    /// is split first when the cursor is mid-line.
    pub fn insert_embed(&mut self, index: usize, embed: Embed) -> usize {
        let mut at = self.clamp(index);
        match embed {
            Embed::Image(src) => {
                self.units.insert(
                    at,
                    Unit::Image {
                        src,
                        format: InlineFormat::default(),
                    },
                );
            }
            Embed::Video(src) => {
                if at > self.line_start(at) {
                    let line = self.line_format_at(at);
                    self.units.insert(at, Unit::Break(line));
                    at += 1;
                }
                self.units.insert(at, Unit::Video { src });
            }
        }
        at + 1
    }

    /// Remove `len` units starting at `index`. The trailing break survives.
    pub fn delete(&mut self, index: usize, len: usize) {
        let range = self.bounded(index, len);
        self.units.drain(range);
        if !matches!(self.units.last(), Some(Unit::Break(_))) {
            self.units.push(Unit::Break(LineFormat::default()));
        }
    }

    pub fn format_text(&mut self, index: usize, len: usize, apply: impl Fn(&mut InlineFormat)) {
        let range = self.bounded(index, len);
        for unit in &mut self.units[range] {
            if let Some(format) = unit.inline_format_mut() {
                apply(format);
            }
        }
    }

    /// Whether every formattable unit in the range satisfies `check`.
    /// An empty range inspects the unit just before `index`.
    pub fn inline_matches(
        &self,
        index: usize,
        len: usize,
        check: impl Fn(&InlineFormat) -> bool,
    ) -> bool {
        if len == 0 {
            return check(&self.inline_format_at(index));
        }
        let mut seen = false;
        for unit in &self.units[self.bounded(index, len)] {
            match unit {
                Unit::Char(_, format) | Unit::Image { format, .. } => {
                    seen = true;
                    if !check(format) {
                        return false;
                    }
                }
                Unit::Video { .. } | Unit::Break(_) => {}
            }
        }
        seen
    }

    /// Apply `apply` to every line touched by the range.
    pub fn format_lines(&mut self, index: usize, len: usize, apply: impl Fn(&mut LineFormat)) {
        for break_index in self.line_breaks_in(index, len) {
            if let Unit::Break(format) = &mut self.units[break_index] {
                apply(format);
            }
        }
    }

    pub fn lines_match(&self, index: usize, len: usize, check: impl Fn(&LineFormat) -> bool) -> bool {
        self.line_breaks_in(index, len)
            .into_iter()
            .all(|break_index| match &self.units[break_index] {
                Unit::Break(format) => check(format),
                _ => false,
            })
    }

    fn line_breaks_in(&self, index: usize, len: usize) -> Vec<usize> {
        let start = self.clamp(index);
        let last = self.line_end(start + len.saturating_sub(1));
        let mut breaks = Vec::new();
        let mut cursor = start;
        loop {
            let end = self.line_end(cursor);
            breaks.push(end);
            if end >= last || end >= self.max_cursor() {
                break;
            }
            cursor = end + 1;
        }
        breaks
    }

    fn bounded(&self, index: usize, len: usize) -> Range<usize> {
        let start = self.clamp(index);
        let end = start.saturating_add(len).min(self.max_cursor());
        start..end
    }

    /// Format that text typed at `index` inherits: the unit just before it,
    /// minus any link.
    pub fn inline_format_at(&self, index: usize) -> InlineFormat {
        let index = self.clamp(index);
        if index == 0 {
            return InlineFormat::default();
        }
        match &self.units[index - 1] {
            Unit::Char(_, format) | Unit::Image { format, .. } => InlineFormat {
                link: None,
                ..format.clone()
            },
            Unit::Video { .. } | Unit::Break(_) => InlineFormat::default(),
        }
    }
}
