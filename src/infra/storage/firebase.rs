//! Firebase Storage over its JSON REST API.

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url, header};
use serde::Deserialize;

use crate::application::repos::{MediaStore, StorageError, StorageHandle};

pub const DEFAULT_ENDPOINT: &str = "https://firebasestorage.googleapis.com";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListResponse {
    #[serde(default)]
    items: Vec<ObjectItem>,
    #[serde(default)]
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ObjectItem {
    name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ObjectMetadata {
    name: String,
    #[serde(default)]
    download_tokens: Option<String>,
}

#[derive(Clone, Debug)]
pub struct FirebaseStorage {
    client: Client,
    endpoint: Url,
    bucket: String,
    auth_token: Option<String>,
}

impl FirebaseStorage {
    pub fn new(client: Client, endpoint: Url, bucket: impl Into<String>) -> Self {
        Self {
            client,
            endpoint,
            bucket: bucket.into(),
            auth_token: None,
        }
    }

    pub fn with_auth_token(mut self, token: Option<String>) -> Self {
        self.auth_token = token;
        self
    }

    /// `{endpoint}/v0/b/{bucket}/o`
    fn objects_url(&self) -> Result<Url, StorageError> {
        let mut url = self.endpoint.clone();
        url.path_segments_mut()
            .map_err(|()| StorageError::InvalidPath {
                path: self.endpoint.to_string(),
                reason: "endpoint cannot be a base url".into(),
            })?
            .pop_if_empty()
            .extend(["v0", "b", self.bucket.as_str(), "o"]);
        Ok(url)
    }

    /// Object names travel as one encoded segment, so `admin/a.png` becomes
    /// `admin%2Fa.png`.
    fn object_url(&self, full_path: &str) -> Result<Url, StorageError> {
        let mut url = self.objects_url()?;
        url.path_segments_mut()
            .map_err(|()| StorageError::InvalidPath {
                path: full_path.to_string(),
                reason: "endpoint cannot be a base url".into(),
            })?
            .push(full_path);
        Ok(url)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.auth_token.as_deref() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn checked(path: &str, response: Response) -> Result<Bytes, StorageError> {
        let status = response.status();
        let body = response.bytes().await.map_err(StorageError::transport)?;
        if status == StatusCode::NOT_FOUND {
            return Err(StorageError::NotFound {
                path: path.to_string(),
            });
        }
        if !status.is_success() {
            return Err(StorageError::Status {
                status: status.as_u16(),
                message: String::from_utf8_lossy(&body).trim().to_string(),
            });
        }
        Ok(body)
    }
}

#[async_trait]
impl MediaStore for FirebaseStorage {
    async fn list(&self, namespace: &str) -> Result<Vec<StorageHandle>, StorageError> {
        let prefix = format!("{}/", namespace.trim_matches('/'));
        let mut handles = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut url = self.objects_url()?;
            {
                let mut query = url.query_pairs_mut();
                query.append_pair("prefix", &prefix);
                query.append_pair("delimiter", "/");
                if let Some(token) = page_token.as_deref() {
                    query.append_pair("pageToken", token);
                }
            }

            let response = self
                .authorize(self.client.get(url))
                .send()
                .await
                .map_err(StorageError::transport)?;
            let body = Self::checked(&prefix, response).await?;
            let page: ListResponse = serde_json::from_slice(&body).map_err(StorageError::decode)?;

            handles.extend(
                page.items
                    .into_iter()
                    .map(|item| StorageHandle::from_path(item.name)),
            );

            match page.next_page_token.filter(|token| !token.is_empty()) {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        tracing::debug!(
            target = "postdesk::storage::firebase",
            prefix = %prefix,
            count = handles.len(),
            "listed objects"
        );
        Ok(handles)
    }

    async fn resolve_url(&self, handle: &StorageHandle) -> Result<String, StorageError> {
        let url = self.object_url(&handle.full_path)?;
        let response = self
            .authorize(self.client.get(url.clone()))
            .send()
            .await
            .map_err(StorageError::transport)?;
        let body = Self::checked(&handle.full_path, response).await?;
        let metadata: ObjectMetadata =
            serde_json::from_slice(&body).map_err(StorageError::decode)?;

        let token = metadata
            .download_tokens
            .as_deref()
            .and_then(|tokens| tokens.split(',').map(str::trim).find(|t| !t.is_empty()))
            .ok_or_else(|| StorageError::MissingToken {
                path: metadata.name.clone(),
            })?;

        let mut download = url;
        download
            .query_pairs_mut()
            .append_pair("alt", "media")
            .append_pair("token", token);
        Ok(download.to_string())
    }

    async fn upload(
        &self,
        path: &str,
        bytes: Bytes,
        content_type: &str,
    ) -> Result<StorageHandle, StorageError> {
        let mut url = self.objects_url()?;
        url.query_pairs_mut()
            .append_pair("uploadType", "media")
            .append_pair("name", path);

        let response = self
            .authorize(self.client.post(url))
            .header(header::CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await
            .map_err(StorageError::transport)?;
        let body = Self::checked(path, response).await?;
        let metadata: ObjectMetadata =
            serde_json::from_slice(&body).map_err(StorageError::decode)?;

        tracing::debug!(
            target = "postdesk::storage::firebase",
            path = %metadata.name,
            "object uploaded"
        );
        Ok(StorageHandle::from_path(metadata.name))
    }
}
