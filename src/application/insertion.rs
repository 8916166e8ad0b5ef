//! URL entry flow for embedding an image into the editor.

use thiserror::Error;
use url::Url;

use crate::application::editor::EditorHost;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("please enter image URL")]
    EmptyUrl,
    #[error("please enter a valid URL")]
    InvalidUrl,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InsertionError {
    #[error("image URL entry is not open")]
    NotOpen,
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum InsertionState {
    #[default]
    Closed,
    Open {
        input: String,
    },
}

#[derive(Debug, Clone, Default)]
pub struct ImageInsertionFlow {
    state: InsertionState,
}

impl ImageInsertionFlow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &InsertionState {
        &self.state
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, InsertionState::Open { .. })
    }

    /// Open with an empty input. Reopening keeps what was typed.
    pub fn open(&mut self) {
        if !self.is_open() {
            self.state = InsertionState::Open {
                input: String::new(),
            };
        }
    }

    pub fn set_input(&mut self, value: &str) -> Result<(), InsertionError> {
        match &mut self.state {
            InsertionState::Open { input } => {
                value.clone_into(input);
                Ok(())
            }
            InsertionState::Closed => Err(InsertionError::NotOpen),
        }
    }

    pub fn cancel(&mut self) {
        self.state = InsertionState::Closed;
    }

    /// Validate the input and hand it to the editor. The flow stays open on
    /// a validation failure.
    pub fn submit(&mut self, editor: &mut dyn EditorHost) -> Result<String, InsertionError> {
        let InsertionState::Open { input } = &self.state else {
            return Err(InsertionError::NotOpen);
        };

        let url = validate_image_url(input)?;
        editor.insert_media_at_cursor(&url);
        self.state = InsertionState::Closed;
        Ok(url)
    }
}

/// Accept any absolute URL. Surrounding whitespace is dropped.
pub fn validate_image_url(input: &str) -> Result<String, ValidationError> {
    if input.is_empty() {
        return Err(ValidationError::EmptyUrl);
    }
    let trimmed = input.trim();
    Url::parse(trimmed).map_err(|_| ValidationError::InvalidUrl)?;
    Ok(trimmed.to_string())
}
