//! Request and response shapes for the content-site backend.
//!
//! The backend wraps list responses in an envelope carrying its own `status`
//! field next to the HTTP status. Identifiers are documented as strings but
//! some deployments emit integers, so every id field accepts both and
//! normalizes to `String`.

use serde::{Deserialize, Deserializer, Serialize};

/// Envelope wrapping every list endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListEnvelope<T> {
    pub status: i64,
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
}

impl<T> ListEnvelope<T> {
    /// Whether the envelope itself reports success.
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }
}

/// Raw taxonomy record returned by `GET /categories`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryRecord {
    #[serde(deserialize_with = "flexible_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "Fate", default)]
    pub fates: Vec<FateRecord>,
}

/// Fate element returned by `GET /fates` and nested in category records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FateRecord {
    #[serde(deserialize_with = "flexible_id")]
    pub id: String,
    pub element: String,
}

/// Body of `POST /categories`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCategoryRequest {
    pub description: String,
    pub fate_id: Vec<String>,
    pub name: String,
}

/// Body of `POST /post-blog`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostBlogRequest {
    pub author_name: String,
    pub category_id: Option<String>,
    pub content: String,
    pub title: String,
    pub user_id: String,
}

/// Success body shared by the write endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: String,
}

fn flexible_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(text) => text,
        RawId::Number(number) => number.to_string(),
    })
}
