//! One-shot post submission.

use std::sync::Arc;

use metrics::counter;
use postdesk_api_types::PostBlogRequest;
use thiserror::Error;

use crate::application::editor::EditorHost;
use crate::application::notice::Notice;
use crate::application::repos::{NetworkError, PostsApi};
use crate::domain::identity::IdentityContext;
use crate::domain::posts::{DraftPost, SubmissionPayload};

const METRIC_SUBMISSION: &str = "postdesk_submission_total";

/// Confirmation text returned by the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuccessMessage(pub String);

impl std::fmt::Display for SuccessMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubmissionError {
    #[error("no signed-in author")]
    IdentityMissing,
    #[error("server rejected the post with {status} {status_text}: {message}")]
    Rejected {
        status: u16,
        status_text: String,
        message: String,
    },
    #[error("network error: {0}")]
    Transport(String),
    #[error("unexpected response: {0}")]
    Unexpected(String),
}

impl From<NetworkError> for SubmissionError {
    fn from(err: NetworkError) -> Self {
        match err {
            NetworkError::Status {
                status,
                status_text,
                message,
            } => Self::Rejected {
                status,
                status_text,
                message,
            },
            NetworkError::Transport(reason) => Self::Transport(reason),
            other @ (NetworkError::Decode(_) | NetworkError::Envelope { .. }) => {
                Self::Unexpected(other.to_string())
            }
        }
    }
}

impl SubmissionError {
    fn outcome_label(&self) -> &'static str {
        match self {
            SubmissionError::IdentityMissing => "identity_missing",
            SubmissionError::Rejected { .. } => "rejected",
            SubmissionError::Transport(_) => "transport",
            SubmissionError::Unexpected(_) => "unexpected",
        }
    }
}

impl From<&SubmissionError> for Notice {
    fn from(err: &SubmissionError) -> Self {
        match err {
            SubmissionError::IdentityMissing => {
                Notice::error("You must be signed in to submit a blog post.")
            }
            SubmissionError::Rejected {
                status,
                status_text,
                message,
            } if message.is_empty() => Notice::error(format!(
                "Failed to submit the blog post. Status: {status} - {status_text}"
            )),
            SubmissionError::Rejected {
                status,
                status_text,
                message,
            } => Notice::error(format!(
                "Failed to submit the blog post. Status: {status} - {status_text}: {message}"
            )),
            SubmissionError::Transport(_) => {
                Notice::error("Failed to submit the blog post due to a network error.")
            }
            SubmissionError::Unexpected(detail) => {
                Notice::error(format!("Failed to submit the blog post: {detail}"))
            }
        }
    }
}

#[derive(Clone)]
pub struct SubmissionPipeline {
    api: Arc<dyn PostsApi>,
}

impl SubmissionPipeline {
    pub fn new(api: Arc<dyn PostsApi>) -> Self {
        Self { api }
    }

    /// Read the editor, shape the payload and send it once.
    ///
    /// The draft is never modified; the caller decides what happens to it.
    pub async fn submit(
        &self,
        editor: &dyn EditorHost,
        draft: &DraftPost,
        identity: &IdentityContext,
    ) -> Result<SuccessMessage, SubmissionError> {
        let content = editor.get_content();

        let Some(author) = identity.current() else {
            counter!(METRIC_SUBMISSION, "outcome" => "identity_missing").increment(1);
            tracing::warn!(
                target = "postdesk::submission",
                "submission attempted without a signed-in author"
            );
            return Err(SubmissionError::IdentityMissing);
        };

        let request = PostBlogRequest::from(SubmissionPayload::build(draft, content, author));
        match self.api.post_blog(&request).await {
            Ok(response) => {
                counter!(METRIC_SUBMISSION, "outcome" => "success").increment(1);
                tracing::info!(
                    target = "postdesk::submission",
                    title = %request.title,
                    category_id = ?request.category_id,
                    "post submitted"
                );
                Ok(SuccessMessage(response.message))
            }
            Err(err) => {
                let err = SubmissionError::from(err);
                counter!(METRIC_SUBMISSION, "outcome" => err.outcome_label()).increment(1);
                tracing::error!(
                    target = "postdesk::submission",
                    title = %request.title,
                    error = %err,
                    "post submission failed"
                );
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use postdesk_api_types::MessageResponse;

    use super::*;
    use crate::application::editor::RichEditor;
    use crate::domain::identity::UserIdentity;

    struct RecordingApi {
        requests: Mutex<Vec<PostBlogRequest>>,
        response: Result<MessageResponse, NetworkError>,
    }

    impl RecordingApi {
        fn replying(response: Result<MessageResponse, NetworkError>) -> Self {
            Self {
                requests: Mutex::new(Vec::new()),
                response,
            }
        }
    }

    #[async_trait]
    impl PostsApi for RecordingApi {
        async fn post_blog(
            &self,
            request: &PostBlogRequest,
        ) -> Result<MessageResponse, NetworkError> {
            self.requests.lock().expect("lock").push(request.clone());
            self.response.clone()
        }
    }

    fn draft() -> DraftPost {
        DraftPost {
            title: "Hello".into(),
            category_id: Some("1".into()),
            body_markup: String::new(),
        }
    }

    fn signed_in() -> IdentityContext {
        IdentityContext::signed_in(UserIdentity {
            id: "7".into(),
            user_name: "ana".into(),
        })
    }

    fn editor() -> RichEditor {
        let mut editor = RichEditor::new();
        editor.type_text(r#"a "quoted" word"#);
        editor
    }

    #[tokio::test]
    async fn missing_identity_sends_nothing() {
        let api = Arc::new(RecordingApi::replying(Ok(MessageResponse {
            message: "ok".into(),
        })));
        let pipeline = SubmissionPipeline::new(api.clone());

        let err = pipeline
            .submit(&editor(), &draft(), &IdentityContext::new())
            .await
            .expect_err("no identity");

        assert_eq!(err, SubmissionError::IdentityMissing);
        assert!(api.requests.lock().expect("lock").is_empty());
    }

    #[tokio::test]
    async fn success_sends_editor_content_once() {
        let api = Arc::new(RecordingApi::replying(Ok(MessageResponse {
            message: "Blog post created".into(),
        })));
        let pipeline = SubmissionPipeline::new(api.clone());

        let message = pipeline
            .submit(&editor(), &draft(), &signed_in())
            .await
            .expect("submitted");

        assert_eq!(message, SuccessMessage("Blog post created".into()));
        let requests = api.requests.lock().expect("lock");
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].content, "<p>a 'quoted' word</p>");
        assert_eq!(requests[0].author_name, "ana");
        assert_eq!(requests[0].user_id, "7");
    }

    #[tokio::test]
    async fn rejection_carries_status_and_message() {
        let api = Arc::new(RecordingApi::replying(Err(NetworkError::Status {
            status: 400,
            status_text: "Bad Request".into(),
            message: "bad title".into(),
        })));
        let pipeline = SubmissionPipeline::new(api);
        let draft = draft();

        let err = pipeline
            .submit(&editor(), &draft, &signed_in())
            .await
            .expect_err("rejected");

        assert_eq!(
            err,
            SubmissionError::Rejected {
                status: 400,
                status_text: "Bad Request".into(),
                message: "bad title".into()
            }
        );
        let notice = Notice::from(&err);
        assert!(notice.text.contains("400"));
        assert!(notice.text.contains("bad title"));
        assert_eq!(draft.title, "Hello");
    }

    #[tokio::test]
    async fn transport_failure_maps_to_network_notice() {
        let api = Arc::new(RecordingApi::replying(Err(NetworkError::transport(
            "connection reset",
        ))));
        let err = SubmissionPipeline::new(api)
            .submit(&editor(), &draft(), &signed_in())
            .await
            .expect_err("transport");

        assert!(matches!(err, SubmissionError::Transport(_)));
        assert_eq!(
            Notice::from(&err).text,
            "Failed to submit the blog post due to a network error."
        );
    }
}
