//! Media library: catalog loading and uploads.

use std::sync::Arc;

use bytes::Bytes;
use futures::future::join_all;
use metrics::counter;
use thiserror::Error;

use crate::application::repos::{MediaStore, StorageError, StorageHandle};
use crate::domain::media::{MediaAsset, is_image_content_type, object_path};

const METRIC_CATALOG_LOAD: &str = "postdesk_catalog_load_total";
const METRIC_MEDIA_UPLOAD: &str = "postdesk_media_upload_total";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MediaUploadError {
    #[error("please select an image file")]
    NotAnImage { file_name: String },
    #[error("file `{file_name}` is empty")]
    Empty { file_name: String },
    #[error("file name must not be empty")]
    MissingName,
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Result of a successful upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadOutcome {
    pub handle: StorageHandle,
    /// Whether the follow-up catalog reload succeeded.
    pub reloaded: bool,
}

pub struct MediaCatalog {
    store: Arc<dyn MediaStore>,
    namespace: String,
    assets: Vec<MediaAsset>,
}

impl std::fmt::Debug for MediaCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaCatalog")
            .field("namespace", &self.namespace)
            .field("assets", &self.assets.len())
            .finish()
    }
}

impl MediaCatalog {
    pub fn new(store: Arc<dyn MediaStore>, namespace: impl Into<String>) -> Self {
        Self {
            store,
            namespace: namespace.into(),
            assets: Vec::new(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Last successfully loaded snapshot.
    pub fn assets(&self) -> &[MediaAsset] {
        &self.assets
    }

    pub fn find(&self, identifier: &str) -> Option<&MediaAsset> {
        self.assets
            .iter()
            .find(|asset| asset.identifier == identifier)
    }

    /// Replace the snapshot with a fresh listing. On failure the previous
    /// snapshot stays in place.
    pub async fn load(&mut self) -> Result<&[MediaAsset], StorageError> {
        match load_catalog(self.store.as_ref(), &self.namespace).await {
            Ok(assets) => {
                counter!(METRIC_CATALOG_LOAD, "outcome" => "ok").increment(1);
                tracing::info!(
                    target = "postdesk::media",
                    namespace = %self.namespace,
                    count = assets.len(),
                    "media catalog loaded"
                );
                self.assets = assets;
                Ok(&self.assets)
            }
            Err(err) => {
                counter!(METRIC_CATALOG_LOAD, "outcome" => "error").increment(1);
                tracing::error!(
                    target = "postdesk::media",
                    namespace = %self.namespace,
                    error = %err,
                    "failed to load media catalog"
                );
                Err(err)
            }
        }
    }

    /// Store `bytes` under the namespace, then reload the catalog.
    pub async fn upload(
        &mut self,
        file_name: &str,
        bytes: Bytes,
    ) -> Result<UploadOutcome, MediaUploadError> {
        let file_name = file_name.trim();
        if file_name.is_empty() {
            return Err(MediaUploadError::MissingName);
        }
        let content_type = mime_guess::from_path(file_name)
            .first_or_octet_stream()
            .essence_str()
            .to_string();
        if !is_image_content_type(&content_type) {
            tracing::warn!(
                target = "postdesk::media",
                file_name,
                content_type = %content_type,
                "rejected non-image upload"
            );
            return Err(MediaUploadError::NotAnImage {
                file_name: file_name.to_string(),
            });
        }
        if bytes.is_empty() {
            return Err(MediaUploadError::Empty {
                file_name: file_name.to_string(),
            });
        }

        let path = object_path(&self.namespace, file_name);
        let handle = match self.store.upload(&path, bytes, &content_type).await {
            Ok(handle) => handle,
            Err(err) => {
                counter!(METRIC_MEDIA_UPLOAD, "outcome" => "error").increment(1);
                tracing::error!(
                    target = "postdesk::media",
                    path = %path,
                    error = %err,
                    "upload failed"
                );
                return Err(err.into());
            }
        };
        counter!(METRIC_MEDIA_UPLOAD, "outcome" => "ok").increment(1);
        tracing::info!(target = "postdesk::media", path = %handle.full_path, "upload stored");

        let reloaded = self.load().await.is_ok();
        Ok(UploadOutcome { handle, reloaded })
    }
}

/// List the namespace and resolve every object to a URL. Nothing is
/// returned unless every resolution succeeds.
pub async fn load_catalog(
    store: &dyn MediaStore,
    namespace: &str,
) -> Result<Vec<MediaAsset>, StorageError> {
    let handles = store.list(namespace).await?;
    let urls = join_all(handles.iter().map(|handle| store.resolve_url(handle)))
        .await
        .into_iter()
        .collect::<Result<Vec<_>, _>>()?;

    Ok(handles
        .into_iter()
        .zip(urls)
        .map(|(handle, display_url)| MediaAsset {
            identifier: handle.name,
            display_url,
        })
        .collect())
}
