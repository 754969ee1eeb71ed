mod search_fixtures;

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use rxsearch::{
    config::{OverlapPolicy, ServiceConfig},
    search::{GithubClient, GithubRepo},
    SearchError,
};
use search_fixtures::{pipeline_with, results, Shown};
use serde_json::json;
use tokio::net::TcpListener;

type SeenAgents = Arc<Mutex<Vec<String>>>;

async fn user_repos(
    State(agents): State<SeenAgents>,
    Path(user): Path<String>,
    headers: HeaderMap,
) -> Response {
    if let Some(agent) = headers.get(header::USER_AGENT).and_then(|v| v.to_str().ok()) {
        agents.lock().unwrap().push(agent.to_string());
    }

    match user.as_str() {
        "octocat" => Json(json!([
            {
                "id": 1296269,
                "name": "Hello-World",
                "full_name": "octocat/Hello-World",
                "description": "My first repository on GitHub!",
                "html_url": "https://github.com/octocat/Hello-World",
                "fork": false
            },
            {
                "id": 1300192,
                "name": "Spoon-Knife",
                "full_name": "octocat/Spoon-Knife",
                "description": null,
                "html_url": "https://github.com/octocat/Spoon-Knife",
                "fork": false
            }
        ]))
        .into_response(),
        "ghost" => Json(json!([])).into_response(),
        "garbled" => (StatusCode::OK, "<html>definitely not json</html>").into_response(),
        _ => (StatusCode::NOT_FOUND, Json(json!({ "message": "Not Found" }))).into_response(),
    }
}

/// Serves a GitHub-shaped API on an ephemeral port and returns its base URL.
async fn spawn_mock_github() -> (String, SeenAgents) {
    let agents = SeenAgents::default();
    let app = Router::new()
        .route("/users/{user}/repos", get(user_repos))
        .with_state(Arc::clone(&agents));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}/"), agents)
}

async fn fetch(client: &GithubClient, user: &'static str) -> Result<Vec<GithubRepo>, SearchError> {
    let client = client.clone();
    tokio::task::spawn_blocking(move || client.repos_for_user(user))
        .await
        .unwrap()
}

#[tokio::test(flavor = "multi_thread")]
async fn lists_repositories_of_a_user() {
    let (base_url, agents) = spawn_mock_github().await;
    let client = GithubClient::new(ServiceConfig::new(base_url).unwrap()).unwrap();

    let repos = fetch(&client, "octocat").await.unwrap();

    assert_eq!(repos.len(), 2);
    assert_eq!(repos[0].full_name, "octocat/Hello-World");
    assert_eq!(
        repos[0].description.as_deref(),
        Some("My first repository on GitHub!")
    );
    assert_eq!(repos[1].description, None);
    assert!(agents.lock().unwrap()[0].starts_with("rxsearch/"));
}

#[tokio::test(flavor = "multi_thread")]
async fn missing_user_is_a_status_error() {
    let (base_url, _) = spawn_mock_github().await;
    let client = GithubClient::new(ServiceConfig::new(base_url).unwrap()).unwrap();

    match fetch(&client, "nobody").await {
        Err(SearchError::Status { status, body }) => {
            assert_eq!(status, 404);
            assert!(body.contains("Not Found"));
        }
        other => panic!("expected a 404 status error, got {other:?}"),
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn malformed_body_is_a_decode_error() {
    let (base_url, _) = spawn_mock_github().await;
    let client = GithubClient::new(ServiceConfig::new(base_url).unwrap()).unwrap();

    assert!(matches!(
        fetch(&client, "garbled").await,
        Err(SearchError::Decode(_))
    ));
}

#[tokio::test(flavor = "multi_thread")]
async fn refused_connection_is_a_transport_error() {
    // Grab a free port, then close it again.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let config = ServiceConfig::new(format!("http://{addr}"))
        .unwrap()
        .with_timeout(Duration::from_secs(2));
    let client = GithubClient::new(config).unwrap();

    let error = fetch(&client, "octocat").await.unwrap_err();
    assert!(error.is_transport(), "unexpected error: {error}");
}

#[tokio::test(flavor = "multi_thread")]
async fn pipeline_searches_user_names_against_the_api() {
    let (base_url, _) = spawn_mock_github().await;
    let client = GithubClient::new(ServiceConfig::new(base_url).unwrap()).unwrap();
    let (pipeline, sink) = pipeline_with(Arc::new(client), 50, OverlapPolicy::Switch);

    pipeline.push("octocat");
    tokio::time::sleep(Duration::from_millis(500)).await;
    pipeline.push("ghost");
    tokio::time::sleep(Duration::from_millis(500)).await;
    pipeline.push("nobody");
    tokio::time::sleep(Duration::from_millis(500)).await;

    let shown = sink.shown();
    assert_eq!(shown.len(), 3);
    assert_eq!(shown[0], results(&["Hello-World", "Spoon-Knife"]));
    assert_eq!(shown[1], Shown::Empty);
    assert!(matches!(
        &shown[2],
        Shown::Error(SearchError::Status { status: 404, .. })
    ));
    pipeline.release();
}

#[test]
fn switching_base_url_yields_a_new_config() {
    let github = ServiceConfig::default();
    let local = github.with_base_url("http://127.0.0.1:8080/api/").unwrap();

    assert_eq!(github.url_for("users/octocat/repos"), "https://api.github.com/users/octocat/repos");
    assert_eq!(local.url_for("/users/octocat/repos"), "http://127.0.0.1:8080/api/users/octocat/repos");
    assert!(github.with_base_url("ftp://example.com").is_err());
}
