use std::error::Error as StdError;

use thiserror::Error;

use crate::application::categories::CategoryAdminError;
use crate::application::composer::ComposeError;
use crate::application::media::MediaUploadError;
use crate::application::repos::{NetworkError, StorageError};
use crate::domain::error::DomainError;
use crate::infra::error::InfraError;

/// Error chain flattened for reporting: the error itself followed by each
/// of its sources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorReport {
    pub source: &'static str,
    pub messages: Vec<String>,
}

impl ErrorReport {
    pub fn from_error(source: &'static str, error: &dyn StdError) -> Self {
        let mut messages = vec![error.to_string()];
        let mut current = error.source();
        while let Some(inner) = current {
            messages.push(inner.to_string());
            current = inner.source();
        }
        Self { source, messages }
    }

    /// Messages joined with `: `, skipping sources that only repeat their parent.
    pub fn joined(&self) -> String {
        let mut out: Vec<&str> = Vec::new();
        for message in &self.messages {
            if out.last().is_none_or(|last| !last.contains(message.as_str())) {
                out.push(message);
            }
        }
        out.join(": ")
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Infra(#[from] InfraError),
    #[error("backend request failed: {0}")]
    Network(#[from] NetworkError),
    #[error("media storage failed: {0}")]
    Storage(#[from] StorageError),
    #[error("upload failed: {0}")]
    Upload(#[from] MediaUploadError),
    #[error(transparent)]
    CategoryAdmin(#[from] CategoryAdminError),
    #[error(transparent)]
    Compose(#[from] ComposeError),
    #[error("failed to read input file {path}: {source}")]
    InputFile {
        path: String,
        source: std::io::Error,
    },
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected(message.into())
    }

    pub fn report(&self) -> ErrorReport {
        ErrorReport::from_error("application::error::AppError", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_collects_source_chain() {
        let err = AppError::from(InfraError::Io(std::io::Error::other("disk gone")));
        let report = err.report();
        assert_eq!(report.messages[0], "io error: disk gone");
        assert_eq!(report.joined(), "io error: disk gone");
    }

    #[test]
    fn validation_errors_read_plainly() {
        let err = AppError::from(DomainError::validation("please enter a title"));
        assert_eq!(err.to_string(), "please enter a title");
    }
}
