use assert_cmd::Command;
use httpmock::MockServer;
use predicates::str::contains;
use serde_json::json;
use tempfile::TempDir;

const CATEGORIES: &str = r#"{"status":200,"data":[{"id":"3","name":"Fire","description":"hot","Fate":[{"id":"f1","element":"Hoa"}]}]}"#;

fn postdesk(workdir: &TempDir, server: &MockServer) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("postdesk"));
    cmd.current_dir(workdir.path())
        .env_remove("POSTDESK_CONFIG_FILE")
        .env("NO_COLOR", "1")
        .arg("--api-base-url")
        .arg(format!("{}/api/v1/", server.base_url()));
    cmd
}

fn mock_categories(server: &MockServer) -> httpmock::Mock<'_> {
    server.mock(|when, then| {
        when.method("GET").path("/api/v1/categories");
        then.status(200)
            .header("content-type", "application/json")
            .body(CATEGORIES);
    })
}

#[test]
fn compose_submits_editor_content_with_appended_image() {
    let server = MockServer::start();
    let categories = mock_categories(&server);
    let post = server.mock(|when, then| {
        when.method("POST")
            .path("/api/v1/post-blog")
            .json_body(json!({
                "author_name": "ana",
                "category_id": "3",
                "content": "<p>Hello<img src='https://example.com/a.png'></p>",
                "title": "First post",
                "user_id": "42"
            }));
        then.status(201)
            .header("content-type", "application/json")
            .body(r#"{"message":"Blog post created"}"#);
    });

    let workdir = TempDir::new().expect("tempdir");
    let assert = postdesk(&workdir, &server)
        .args(["posts", "compose", "--title", "First post", "--category", "3"])
        .args(["--body", "<p>Hello</p>"])
        .args(["--image-url", "https://example.com/a.png"])
        .args(["--user-id", "42", "--user-name", "ana"])
        .assert()
        .success()
        .stderr(contains("[success] Blog post created"));

    let output = String::from_utf8_lossy(&assert.get_output().stdout);
    assert!(output.contains("\"message\": \"Blog post created\""));
    categories.assert();
    post.assert();
}

#[test]
fn rejected_submission_reports_status_and_message() {
    let server = MockServer::start();
    mock_categories(&server);
    let post = server.mock(|when, then| {
        when.method("POST").path("/api/v1/post-blog");
        then.status(400)
            .header("content-type", "application/json")
            .body(r#"{"message":"bad title"}"#);
    });

    let workdir = TempDir::new().expect("tempdir");
    postdesk(&workdir, &server)
        .args(["posts", "compose", "--title", "x", "--category", "3"])
        .args(["--user-id", "42", "--user-name", "ana"])
        .assert()
        .failure()
        .stderr(contains("Status: 400 - Bad Request: bad title"));

    post.assert_hits(1);
}

#[test]
fn compose_without_identity_sends_nothing() {
    let server = MockServer::start();
    mock_categories(&server);
    let post = server.mock(|when, then| {
        when.method("POST").path("/api/v1/post-blog");
        then.status(201).body(r#"{"message":"nope"}"#);
    });

    let workdir = TempDir::new().expect("tempdir");
    postdesk(&workdir, &server)
        .args(["posts", "compose", "--title", "x", "--category", "3"])
        .assert()
        .failure()
        .stderr(contains("You must be signed in to submit a blog post."));

    post.assert_hits(0);
}

#[test]
fn compose_without_category_is_rejected_locally() {
    let server = MockServer::start();
    let post = server.mock(|when, then| {
        when.method("POST").path("/api/v1/post-blog");
        then.status(201).body(r#"{"message":"nope"}"#);
    });

    let workdir = TempDir::new().expect("tempdir");
    postdesk(&workdir, &server)
        .args(["posts", "compose", "--title", "x"])
        .args(["--user-id", "42", "--user-name", "ana"])
        .assert()
        .failure()
        .stderr(contains("[warning] please select a category"));

    post.assert_hits(0);
}

#[test]
fn invalid_image_url_fails_before_submission() {
    let server = MockServer::start();
    let workdir = TempDir::new().expect("tempdir");

    postdesk(&workdir, &server)
        .args(["posts", "compose", "--title", "x", "--dry-run"])
        .args(["--image-url", "not a url"])
        .assert()
        .failure()
        .stderr(contains("please enter a valid URL"));
}

#[test]
fn dry_run_prints_the_draft() {
    let server = MockServer::start();
    let workdir = TempDir::new().expect("tempdir");

    let assert = postdesk(&workdir, &server)
        .args(["posts", "compose", "--title", "Draft", "--dry-run"])
        .args(["--body", r#"<p>say "hi"</p>"#])
        .args(["--editor-surface", "stub"])
        .assert()
        .success();

    let output: serde_json::Value =
        serde_json::from_slice(&assert.get_output().stdout).expect("json output");
    assert_eq!(output["title"], "Draft");
    assert!(output["category_id"].is_null());
    assert_eq!(output["body_markup"], "<p>say 'hi'</p>");
}

#[test]
fn categories_options_lists_id_and_name() {
    let server = MockServer::start();
    let categories = mock_categories(&server);
    let workdir = TempDir::new().expect("tempdir");

    let assert = postdesk(&workdir, &server)
        .args(["categories", "options"])
        .assert()
        .success();

    let output: serde_json::Value =
        serde_json::from_slice(&assert.get_output().stdout).expect("json output");
    assert_eq!(output, json!([{ "id": "3", "name": "Fire" }]));
    categories.assert();
}

#[test]
fn categories_create_validates_before_sending() {
    let server = MockServer::start();
    let create = server.mock(|when, then| {
        when.method("POST").path("/api/v1/categories");
        then.status(201).body(r#"{"message":"created"}"#);
    });
    let workdir = TempDir::new().expect("tempdir");

    postdesk(&workdir, &server)
        .args(["categories", "create", "--name", "Water", "--description", " "])
        .args(["--fate-id", "f1"])
        .assert()
        .failure()
        .stderr(contains("category description is required"));

    create.assert_hits(0);
}

#[test]
fn media_list_reads_the_local_namespace() {
    let server = MockServer::start();
    let workdir = TempDir::new().expect("tempdir");
    let namespace = workdir.path().join("media").join("admin");
    std::fs::create_dir_all(&namespace).expect("namespace dir");
    std::fs::write(namespace.join("b.png"), b"png").expect("write b");
    std::fs::write(namespace.join("a.png"), b"png").expect("write a");

    let assert = postdesk(&workdir, &server)
        .args(["media", "list", "--storage-backend", "local"])
        .args(["--storage-directory", "media"])
        .assert()
        .success();

    let output: serde_json::Value =
        serde_json::from_slice(&assert.get_output().stdout).expect("json output");
    let identifiers: Vec<&str> = output
        .as_array()
        .expect("array")
        .iter()
        .filter_map(|asset| asset["identifier"].as_str())
        .collect();
    assert_eq!(identifiers, vec!["a.png", "b.png"]);
    assert!(
        output[0]["display_url"]
            .as_str()
            .is_some_and(|url| url.starts_with("file://"))
    );
}

#[test]
fn firebase_backend_without_bucket_fails_fast() {
    let server = MockServer::start();
    let workdir = TempDir::new().expect("tempdir");

    postdesk(&workdir, &server)
        .args(["media", "list", "--storage-backend", "firebase"])
        .assert()
        .failure()
        .stderr(contains("storage.bucket"));
}
