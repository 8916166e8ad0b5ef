//! Post composition surface: owns the draft and wires the editor to the
//! image insertion flow.

use std::cell::RefCell;
use std::rc::Rc;

use thiserror::Error;

use crate::application::editor::{EditorHost, EditorSlot, EditorSurface, Selection, ToolbarAction};
use crate::application::insertion::{ImageInsertionFlow, InsertionError};
use crate::application::notice::Notice;
use crate::application::submission::{SubmissionError, SubmissionPipeline, SuccessMessage};
use crate::domain::error::DomainError;
use crate::domain::identity::IdentityContext;
use crate::domain::posts::DraftPost;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ComposeError {
    #[error("composer is not open")]
    NotOpen,
    #[error("a submission is already in progress")]
    Pending,
    #[error(transparent)]
    Validation(#[from] DomainError),
    #[error(transparent)]
    Insertion(#[from] InsertionError),
    #[error(transparent)]
    Submission(#[from] SubmissionError),
}

pub struct Composer {
    slot: EditorSlot,
    flow: Rc<RefCell<ImageInsertionFlow>>,
    draft: Option<DraftPost>,
    pending: bool,
    notices: Vec<Notice>,
}

impl std::fmt::Debug for Composer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Composer")
            .field("slot", &self.slot)
            .field("draft", &self.draft)
            .field("pending", &self.pending)
            .finish_non_exhaustive()
    }
}

impl Composer {
    pub fn new(surface: EditorSurface) -> Self {
        Self {
            slot: EditorSlot::new(surface),
            flow: Rc::new(RefCell::new(ImageInsertionFlow::new())),
            draft: None,
            pending: false,
            notices: Vec::new(),
        }
    }

    pub fn is_open(&self) -> bool {
        self.draft.is_some()
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Start a fresh draft, mounting the editor on first use.
    pub fn open(&mut self) {
        let first_mount = !self.slot.is_mounted();
        let editor = self.slot.mount();
        if first_mount {
            let flow = Rc::clone(&self.flow);
            editor.set_image_request_handler(Box::new(move || flow.borrow_mut().open()));
        }
        editor.set_content("");
        self.flow.borrow_mut().cancel();
        self.draft = Some(DraftPost::default());
        self.pending = false;
    }

    /// Discard the draft and whatever the editor holds.
    pub fn close(&mut self) {
        if let Some(editor) = self.slot.get_mut() {
            editor.set_content("");
        }
        self.flow.borrow_mut().cancel();
        self.draft = None;
    }

    /// Current draft with the body refreshed from the editor.
    pub fn draft(&mut self) -> Option<&DraftPost> {
        let content = self.slot.get().map(|editor| editor.get_content());
        let draft = self.draft.as_mut()?;
        draft.body_markup = content.unwrap_or_default();
        Some(draft)
    }

    pub fn editor(&mut self) -> Result<&mut dyn EditorHost, ComposeError> {
        if self.draft.is_none() {
            return Err(ComposeError::NotOpen);
        }
        match self.slot.get_mut() {
            Some(editor) => Ok(editor),
            None => Err(ComposeError::NotOpen),
        }
    }

    pub fn set_title(&mut self, title: &str) -> Result<(), ComposeError> {
        let draft = self.draft.as_mut().ok_or(ComposeError::NotOpen)?;
        title.clone_into(&mut draft.title);
        Ok(())
    }

    pub fn select_category(&mut self, id: Option<String>) -> Result<(), ComposeError> {
        let draft = self.draft.as_mut().ok_or(ComposeError::NotOpen)?;
        draft.category_id = id;
        Ok(())
    }

    pub fn set_content(&mut self, html: &str) -> Result<(), ComposeError> {
        self.editor()?.set_content(html);
        Ok(())
    }

    pub fn type_text(&mut self, text: &str) -> Result<(), ComposeError> {
        self.editor()?.type_text(text);
        Ok(())
    }

    pub fn set_selection(&mut self, selection: Option<Selection>) -> Result<(), ComposeError> {
        self.editor()?.set_selection(selection);
        Ok(())
    }

    /// Place the caret after the last unit.
    pub fn move_to_end(&mut self) -> Result<(), ComposeError> {
        let editor = self.editor()?;
        let end = editor.length().saturating_sub(1);
        editor.set_selection(Some(Selection::caret(end)));
        Ok(())
    }

    pub fn apply_toolbar(&mut self, action: ToolbarAction) -> Result<(), ComposeError> {
        self.editor()?.apply(action);
        Ok(())
    }

    /// Same as pressing the toolbar's image control.
    pub fn request_image(&mut self) -> Result<(), ComposeError> {
        self.apply_toolbar(ToolbarAction::Image)
    }

    pub fn insertion_open(&self) -> bool {
        self.flow.borrow().is_open()
    }

    pub fn enter_image_url(&mut self, url: &str) -> Result<(), ComposeError> {
        self.flow.borrow_mut().set_input(url)?;
        Ok(())
    }

    pub fn confirm_image_url(&mut self) -> Result<String, ComposeError> {
        if self.draft.is_none() {
            return Err(ComposeError::NotOpen);
        }
        let editor = self.slot.get_mut().ok_or(ComposeError::NotOpen)?;
        let result = self.flow.borrow_mut().submit(editor);
        result.map_err(|err| {
            if let InsertionError::Validation(validation) = &err {
                self.notices.push(Notice::warning(validation.to_string()));
            }
            ComposeError::from(err)
        })
    }

    pub fn cancel_image_url(&mut self) {
        self.flow.borrow_mut().cancel();
    }

    /// Embed a known URL directly, bypassing the entry flow.
    pub fn insert_media(&mut self, url: &str) -> Result<(), ComposeError> {
        self.editor()?.insert_media_at_cursor(url);
        Ok(())
    }

    /// Validate the form and submit it. On success the composer closes; on
    /// failure the draft stays as it was.
    pub async fn submit(
        &mut self,
        pipeline: &SubmissionPipeline,
        identity: &IdentityContext,
    ) -> Result<SuccessMessage, ComposeError> {
        let Some(draft) = self.draft.as_ref() else {
            return Err(ComposeError::NotOpen);
        };
        if self.pending {
            return Err(ComposeError::Pending);
        }
        if draft.category_id.is_none() {
            let err = DomainError::validation("please select a category");
            self.notices.push(Notice::warning(err.to_string()));
            return Err(err.into());
        }
        if draft.title.trim().is_empty() {
            let err = DomainError::validation("please enter a title");
            self.notices.push(Notice::warning(err.to_string()));
            return Err(err.into());
        }
        let editor = self.slot.get().ok_or(ComposeError::NotOpen)?;

        let pending = PendingGuard::set(&mut self.pending);
        let outcome = pipeline.submit(editor, draft, identity).await;
        drop(pending);

        match outcome {
            Ok(message) => {
                self.notices.push(Notice::success(message.0.clone()));
                self.close();
                Ok(message)
            }
            Err(err) => {
                self.notices.push(Notice::from(&err));
                Err(err.into())
            }
        }
    }

    /// Notices raised since the last call.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }
}

/// Holds the in-flight flag for the duration of a submission. Clears it on
/// drop so an abandoned submit future does not lock the composer.
struct PendingGuard<'a>(&'a mut bool);

impl<'a> PendingGuard<'a> {
    fn set(flag: &'a mut bool) -> Self {
        *flag = true;
        Self(flag)
    }
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        *self.0 = false;
    }
}
