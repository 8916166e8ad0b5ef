//! Editing surfaces behind a single host contract.
//!
//! The composer only talks to [`EditorHost`]. Which surface backs it is
//! decided when the [`EditorSlot`] mounts, not when it is created.

mod rich;
mod stub;

use std::fmt;
use std::str::FromStr;

use crate::domain::document::{Font, Size};

pub use rich::RichEditor;
pub use stub::StubEditor;

/// Callback fired when the toolbar's image control is used.
pub type ImageRequestHandler = Box<dyn FnMut()>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Selection {
    pub index: usize,
    pub length: usize,
}

impl Selection {
    pub fn caret(index: usize) -> Self {
        Self { index, length: 0 }
    }

    pub fn is_collapsed(&self) -> bool {
        self.length == 0
    }
}

/// Controls offered by the editor toolbar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolbarAction {
    /// `None` returns the line to a paragraph.
    Header(Option<u8>),
    Font(Option<Font>),
    Size(Option<Size>),
    Bold,
    Italic,
    Underline,
    Strike,
    Blockquote,
    OrderedList,
    BulletList,
    Indent,
    Outdent,
    /// `None` removes the link from the selection.
    Link(Option<String>),
    Image,
    Video(String),
    Clean,
}

/// Contract every editing surface satisfies.
pub trait EditorHost {
    /// Serialized markup with every double quote replaced by a single quote.
    fn get_content(&self) -> String;

    /// Replace the whole document with sanitized `html` and drop the selection.
    fn set_content(&mut self, html: &str);

    /// Insert an image at the selection, or at the start without one, then
    /// place the caret right after it.
    fn insert_media_at_cursor(&mut self, url: &str);

    fn selection(&self) -> Option<Selection>;

    fn set_selection(&mut self, selection: Option<Selection>);

    /// Length in units, including the trailing line break.
    fn length(&self) -> usize;

    /// Type `text` over the selection as a user would.
    fn type_text(&mut self, text: &str);

    fn apply(&mut self, action: ToolbarAction);

    fn set_image_request_handler(&mut self, handler: ImageRequestHandler);
}

/// Which surface the slot mounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditorSurface {
    #[default]
    Rich,
    Stub,
}

impl EditorSurface {
    pub fn as_str(self) -> &'static str {
        match self {
            EditorSurface::Rich => "rich",
            EditorSurface::Stub => "stub",
        }
    }
}

impl fmt::Display for EditorSurface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EditorSurface {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "rich" => Ok(EditorSurface::Rich),
            "stub" | "plain" => Ok(EditorSurface::Stub),
            other => Err(format!("unknown editor surface `{other}`")),
        }
    }
}

/// Lazily mounted editor.
pub struct EditorSlot {
    surface: EditorSurface,
    host: Option<Box<dyn EditorHost>>,
}

impl fmt::Debug for EditorSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditorSlot")
            .field("surface", &self.surface)
            .field("mounted", &self.host.is_some())
            .finish()
    }
}

impl EditorSlot {
    pub fn new(surface: EditorSurface) -> Self {
        Self {
            surface,
            host: None,
        }
    }

    pub fn surface(&self) -> EditorSurface {
        self.surface
    }

    pub fn is_mounted(&self) -> bool {
        self.host.is_some()
    }

    /// Mount the configured surface on first use and return it.
    pub fn mount(&mut self) -> &mut dyn EditorHost {
        let surface = self.surface;
        self.host
            .get_or_insert_with(|| {
                tracing::debug!(
                    target = "postdesk::editor",
                    surface = %surface,
                    "mounting editor surface"
                );
                let host: Box<dyn EditorHost> = match surface {
                    EditorSurface::Rich => Box::new(RichEditor::new()),
                    EditorSurface::Stub => Box::new(StubEditor::new()),
                };
                host
            })
            .as_mut()
    }

    pub fn get(&self) -> Option<&dyn EditorHost> {
        self.host.as_deref()
    }

    pub fn get_mut(&mut self) -> Option<&mut (dyn EditorHost + 'static)> {
        self.host.as_deref_mut()
    }
}

/// Replace double quotes the way stored content expects.
pub(crate) fn normalize_quotes(markup: &str) -> String {
    markup.replace('"', "'")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_mounts_once_on_demand() {
        let mut slot = EditorSlot::new(EditorSurface::Stub);
        assert!(!slot.is_mounted());
        assert!(slot.get().is_none());

        slot.mount().type_text("hi");
        assert!(slot.is_mounted());

        let again = slot.mount();
        assert_eq!(again.length(), 3);
    }

    #[test]
    fn surface_parses_from_config_values() {
        assert_eq!("rich".parse::<EditorSurface>(), Ok(EditorSurface::Rich));
        assert_eq!(" Stub ".parse::<EditorSurface>(), Ok(EditorSurface::Stub));
        assert!("canvas".parse::<EditorSurface>().is_err());
    }

    fn surfaces() -> Vec<Box<dyn EditorHost>> {
        vec![Box::new(RichEditor::new()), Box::new(StubEditor::new())]
    }

    #[test]
    fn every_surface_appends_consecutive_images_forward() {
        for mut editor in surfaces() {
            editor.type_text("ab");
            editor.set_selection(Some(Selection::caret(1)));
            editor.insert_media_at_cursor("https://x/1.png");
            editor.insert_media_at_cursor("https://x/2.png");

            let content = editor.get_content();
            let first = content.find("1.png").expect("first image");
            let second = content.find("2.png").expect("second image");
            assert!(first < second, "{content}");
            assert_eq!(editor.selection(), Some(Selection::caret(3)));
        }
    }

    #[test]
    fn every_surface_inserts_at_start_without_selection() {
        for mut editor in surfaces() {
            editor.type_text("text");
            editor.set_selection(None);
            editor.insert_media_at_cursor("https://x/a.png");

            let content = editor.get_content();
            assert!(
                content.find("a.png").expect("image") < content.find("text").expect("text"),
                "{content}"
            );
            assert_eq!(editor.selection(), Some(Selection::caret(1)));
        }
    }

    #[test]
    fn every_surface_emits_single_quotes_only() {
        for mut editor in surfaces() {
            editor.type_text(r#"say "hi""#);
            editor.insert_media_at_cursor("https://x/a.png");
            let content = editor.get_content();
            assert!(!content.contains('"'), "{content}");
            assert!(content.contains("say 'hi'"), "{content}");
        }
    }

    #[test]
    fn every_surface_routes_image_button_to_handler() {
        use std::cell::Cell;
        use std::rc::Rc;

        for mut editor in surfaces() {
            let calls = Rc::new(Cell::new(0));
            let seen = Rc::clone(&calls);
            editor.set_image_request_handler(Box::new(move || seen.set(seen.get() + 1)));
            editor.apply(ToolbarAction::Image);
            assert_eq!(calls.get(), 1);
        }
    }
}
