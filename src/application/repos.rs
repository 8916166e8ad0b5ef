//! Adapter traits for the backend API and object storage.

use async_trait::async_trait;
use bytes::Bytes;
use postdesk_api_types::{
    CategoryRecord, CreateCategoryRequest, FateRecord, ListEnvelope, MessageResponse,
    PostBlogRequest,
};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NetworkError {
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("server responded with {status} {status_text}: {message}")]
    Status {
        status: u16,
        status_text: String,
        message: String,
    },
    #[error("failed to decode response: {0}")]
    Decode(String),
    #[error("response envelope reported status {status}")]
    Envelope { status: i64 },
}

impl NetworkError {
    pub fn transport(err: impl std::fmt::Display) -> Self {
        Self::Transport(err.to_string())
    }

    pub fn decode(err: impl std::fmt::Display) -> Self {
        Self::Decode(err.to_string())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StorageError {
    #[error("storage transport failure: {0}")]
    Transport(String),
    #[error("storage responded with {status}: {message}")]
    Status { status: u16, message: String },
    #[error("object `{path}` not found")]
    NotFound { path: String },
    #[error("object `{path}` has no download token")]
    MissingToken { path: String },
    #[error("invalid storage path `{path}`: {reason}")]
    InvalidPath { path: String, reason: String },
    #[error("storage io error: {0}")]
    Io(String),
    #[error("failed to decode storage response: {0}")]
    Decode(String),
}

impl StorageError {
    pub fn transport(err: impl std::fmt::Display) -> Self {
        Self::Transport(err.to_string())
    }

    pub fn io(err: impl std::fmt::Display) -> Self {
        Self::Io(err.to_string())
    }

    pub fn decode(err: impl std::fmt::Display) -> Self {
        Self::Decode(err.to_string())
    }
}

/// Opaque reference to a stored object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageHandle {
    /// Full object path, including the namespace.
    pub full_path: String,
    /// Last path component.
    pub name: String,
}

impl StorageHandle {
    pub fn from_path(full_path: impl Into<String>) -> Self {
        let full_path = full_path.into();
        let name = full_path
            .rsplit('/')
            .next()
            .unwrap_or(full_path.as_str())
            .to_string();
        Self { full_path, name }
    }
}

#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Every object directly under `namespace`, in storage order.
    async fn list(&self, namespace: &str) -> Result<Vec<StorageHandle>, StorageError>;

    async fn resolve_url(&self, handle: &StorageHandle) -> Result<String, StorageError>;

    async fn upload(
        &self,
        path: &str,
        bytes: Bytes,
        content_type: &str,
    ) -> Result<StorageHandle, StorageError>;
}

#[async_trait]
pub trait TaxonomyApi: Send + Sync {
    async fn categories(&self) -> Result<ListEnvelope<CategoryRecord>, NetworkError>;

    async fn fates(&self) -> Result<ListEnvelope<FateRecord>, NetworkError>;

    async fn create_category(
        &self,
        request: &CreateCategoryRequest,
    ) -> Result<MessageResponse, NetworkError>;
}

#[async_trait]
pub trait PostsApi: Send + Sync {
    async fn post_blog(&self, request: &PostBlogRequest) -> Result<MessageResponse, NetworkError>;
}
