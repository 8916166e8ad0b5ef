use async_trait::async_trait;
use metrics::counter;
use postdesk_api_types::{
    CategoryRecord, CreateCategoryRequest, FateRecord, ListEnvelope, MessageResponse,
    PostBlogRequest,
};
use reqwest::{Client, Method, Response, Url};
use serde::{Serialize, de::DeserializeOwned};

use crate::application::repos::{NetworkError, PostsApi, TaxonomyApi};
use crate::infra::error::InfraError;

const METRIC_HTTP_REQUEST: &str = "postdesk_http_request_total";

/// JSON client for the content-site backend.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    base: Url,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self, InfraError> {
        let client = Client::builder()
            .user_agent(Self::user_agent())
            .build()
            .map_err(|err| InfraError::http_client(err.to_string()))?;
        Self::with_client(client, base_url)
    }

    pub fn with_client(client: Client, base_url: &str) -> Result<Self, InfraError> {
        let mut base = Url::parse(base_url)
            .map_err(|err| InfraError::configuration(format!("invalid api base url: {err}")))?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(Self { client, base })
    }

    pub fn user_agent() -> &'static str {
        concat!("postdesk/", env!("CARGO_PKG_VERSION"))
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    fn url(&self, path: &str) -> Result<Url, NetworkError> {
        self.base
            .join(path.trim_start_matches('/'))
            .map_err(|err| NetworkError::Transport(format!("invalid request url: {err}")))
    }

    async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<Response, NetworkError> {
        let url = self.url(path)?;
        let mut request = self.client.request(method.clone(), url);
        if let Some(body) = body {
            request = request.json(body);
        }

        tracing::debug!(target = "postdesk::http", %method, path, "sending request");
        request.send().await.map_err(|err| {
            counter!(METRIC_HTTP_REQUEST, "path" => path.to_string(), "outcome" => "transport")
                .increment(1);
            tracing::warn!(target = "postdesk::http", path, error = %err, "request failed");
            NetworkError::transport(err)
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, NetworkError> {
        let response = self.send::<()>(Method::GET, path, None).await?;
        let bytes = Self::success_body(path, response).await?;
        serde_json::from_slice(&bytes).map_err(NetworkError::decode)
    }

    /// POST that answers with `{message}`. A body that is not that JSON shape
    /// is taken verbatim as the message.
    async fn post_for_message<B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<MessageResponse, NetworkError> {
        let response = self.send(Method::POST, path, Some(body)).await?;
        let bytes = Self::success_body(path, response).await?;
        Ok(MessageResponse {
            message: message_from_body(&bytes),
        })
    }

    async fn success_body(path: &str, response: Response) -> Result<bytes::Bytes, NetworkError> {
        let status = response.status();
        let bytes = response.bytes().await.map_err(NetworkError::transport)?;
        if !status.is_success() {
            counter!(METRIC_HTTP_REQUEST, "path" => path.to_string(), "outcome" => "status")
                .increment(1);
            return Err(NetworkError::Status {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or_default().to_string(),
                message: message_from_body(&bytes),
            });
        }
        counter!(METRIC_HTTP_REQUEST, "path" => path.to_string(), "outcome" => "ok").increment(1);
        Ok(bytes)
    }
}

fn message_from_body(bytes: &[u8]) -> String {
    match serde_json::from_slice::<MessageResponse>(bytes) {
        Ok(parsed) if !parsed.message.is_empty() => parsed.message,
        _ => String::from_utf8_lossy(bytes).trim().to_string(),
    }
}

#[async_trait]
impl TaxonomyApi for ApiClient {
    async fn categories(&self) -> Result<ListEnvelope<CategoryRecord>, NetworkError> {
        self.get_json("categories").await
    }

    async fn fates(&self) -> Result<ListEnvelope<FateRecord>, NetworkError> {
        self.get_json("fates").await
    }

    async fn create_category(
        &self,
        request: &CreateCategoryRequest,
    ) -> Result<MessageResponse, NetworkError> {
        self.post_for_message("categories", request).await
    }
}

#[async_trait]
impl PostsApi for ApiClient {
    async fn post_blog(&self, request: &PostBlogRequest) -> Result<MessageResponse, NetworkError> {
        self.post_for_message("post-blog", request).await
    }
}
