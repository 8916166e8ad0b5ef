use std::sync::Arc;

use httpmock::MockServer;
use postdesk::application::categories::{CategoryDirectory, CategorySelector, load_categories};
use postdesk::application::repos::{NetworkError, PostsApi};
use postdesk::domain::categories::{Category, NewCategory};
use postdesk::infra::http::ApiClient;
use postdesk_api_types::PostBlogRequest;
use serde_json::json;

fn client(server: &MockServer) -> ApiClient {
    ApiClient::new(&format!("{}/api/v1", server.base_url())).expect("client")
}

#[tokio::test]
async fn taxonomy_envelope_maps_to_options() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method("GET").path("/api/v1/categories");
            then.status(200)
                .header("content-type", "application/json")
                .body(r#"{"status":200,"data":[{"id":"1","name":"Fire"}]}"#);
        })
        .await;

    let options = load_categories(&client(&server)).await.expect("options");

    assert_eq!(
        options,
        vec![Category {
            id: "1".into(),
            name: "Fire".into(),
        }]
    );
    mock.assert_async().await;
}

#[tokio::test]
async fn envelope_status_other_than_200_fails_and_keeps_old_options() {
    let server = MockServer::start_async().await;
    let mut ok = server
        .mock_async(|when, then| {
            when.method("GET").path("/api/v1/categories");
            then.status(200)
                .body(r#"{"status":200,"data":[{"id":2,"name":"Earth"}]}"#);
        })
        .await;

    let mut selector = CategorySelector::new(Arc::new(client(&server)));
    selector.load().await.expect("first load");
    ok.delete_async().await;

    server
        .mock_async(|when, then| {
            when.method("GET").path("/api/v1/categories");
            then.status(200).body(r#"{"status":500,"data":[]}"#);
        })
        .await;

    let err = selector.load().await.expect_err("envelope failure");
    assert_eq!(err, NetworkError::Envelope { status: 500 });
    assert_eq!(selector.options().len(), 1);
    assert_eq!(selector.options()[0].id, "2");
}

#[tokio::test]
async fn post_blog_sends_payload_and_surfaces_rejection() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method("POST")
                .path("/api/v1/post-blog")
                .header("content-type", "application/json")
                .json_body(json!({
                    "author_name": "ana",
                    "category_id": null,
                    "content": "<p>x</p>",
                    "title": "t",
                    "user_id": "42"
                }));
            then.status(400).body(r#"{"message":"bad title"}"#);
        })
        .await;

    let request = PostBlogRequest {
        author_name: "ana".into(),
        category_id: None,
        content: "<p>x</p>".into(),
        title: "t".into(),
        user_id: "42".into(),
    };
    let err = client(&server)
        .post_blog(&request)
        .await
        .expect_err("rejected");

    assert_eq!(
        err,
        NetworkError::Status {
            status: 400,
            status_text: "Bad Request".into(),
            message: "bad title".into(),
        }
    );
    mock.assert_async().await;
}

#[tokio::test]
async fn create_category_posts_trimmed_fields() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method("POST")
                .path("/api/v1/categories")
                .json_body(json!({
                    "description": "calm",
                    "fate_id": ["f1", "f2"],
                    "name": "Water"
                }));
            then.status(201).body("Category created");
        })
        .await;

    let directory = CategoryDirectory::new(Arc::new(client(&server)));
    let message = directory
        .create(NewCategory {
            name: " Water ".into(),
            description: "calm".into(),
            fate_ids: vec!["f1".into(), "f2".into()],
        })
        .await
        .expect("created");

    assert_eq!(message, "Category created");
    mock.assert_async().await;
}

#[tokio::test]
async fn fates_accept_numeric_ids() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method("GET").path("/api/v1/fates");
            then.status(200)
                .body(r#"{"status":200,"data":[{"id":5,"element":"Kim"}]}"#);
        })
        .await;

    let fates = CategoryDirectory::new(Arc::new(client(&server)))
        .fates()
        .await
        .expect("fates");

    assert_eq!(fates.len(), 1);
    assert_eq!(fates[0].id, "5");
    assert_eq!(fates[0].element, "Kim");
}
