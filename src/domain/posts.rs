//! Draft and payload shapes for blog posts.

use postdesk_api_types::PostBlogRequest;
use serde::Serialize;

use super::identity::UserIdentity;

/// Form state owned by the composer while it is open.
///
/// `body_markup` mirrors the editor and is refreshed from it on every read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DraftPost {
    pub title: String,
    pub category_id: Option<String>,
    pub body_markup: String,
}

/// Body of a post submission, derived at submit time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmissionPayload {
    pub title: String,
    pub category_id: Option<String>,
    pub content: String,
    pub author_name: String,
    pub user_id: String,
}

impl SubmissionPayload {
    pub fn build(draft: &DraftPost, content: String, identity: &UserIdentity) -> Self {
        Self {
            title: draft.title.clone(),
            category_id: draft.category_id.clone(),
            content,
            author_name: identity.user_name.clone(),
            user_id: identity.id.clone(),
        }
    }
}

impl From<SubmissionPayload> for PostBlogRequest {
    fn from(payload: SubmissionPayload) -> Self {
        Self {
            author_name: payload.author_name,
            category_id: payload.category_id,
            content: payload.content,
            title: payload.title,
            user_id: payload.user_id,
        }
    }
}
