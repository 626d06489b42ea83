//! API integration tests
//!
//! Each test boots the full application on an ephemeral port against a
//! fresh in-memory database and talks to it over HTTP.

use std::sync::Arc;

use reqwest::Client;
use serde_json::{json, Value};

use octavo_server::{api, config::AppConfig, repository::Repository, services::Services, AppState};

/// Spawn the application and return its base URL.
async fn spawn_app() -> String {
    // The default configuration targets an in-memory database, opened the
    // same way the binary opens it.
    let config = AppConfig::default();
    let pool = config
        .database
        .connect()
        .await
        .expect("Failed to open in-memory database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    let repository = Repository::new(pool);
    let services = Services::new(repository);
    let state = AppState {
        config: Arc::new(config),
        services: Arc::new(services),
    };

    let app = api::create_router(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("Failed to read listener addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Server crashed");
    });

    format!("http://{}", addr)
}

#[tokio::test]
async fn test_create_then_delete_roundtrip() {
    let base_url = spawn_app().await;
    let client = Client::new();

    let response = client
        .post(&base_url)
        .json(&json!({ "content": "test text" }))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    let books: Value = response.json().await.expect("Failed to parse response");
    let books = books.as_array().expect("Expected a JSON array");
    assert_eq!(books.len(), 2);

    // Both representations are the same row: bare first, then re-saved
    // with the default author attached.
    assert_eq!(books[0]["id"], books[1]["id"]);
    assert!(books[0]["id"].is_i64());
    assert_eq!(books[0]["content"], "test text");
    assert_eq!(books[1]["content"], "test text");
    assert_eq!(books[0]["genre"]["name"], "Undefined");
    assert_eq!(books[1]["genre"]["name"], "Undefined");
    assert_eq!(books[0]["authors"].as_array().unwrap().len(), 0);
    assert_eq!(books[1]["authors"].as_array().unwrap().len(), 1);

    for book in books {
        let id = book["id"].as_i64().expect("id not found");
        let response = client
            .delete(format!("{}/book/{}", base_url, id))
            .send()
            .await
            .expect("Failed to send request");
        assert_eq!(response.status(), 204);
    }

    let response = client
        .get(format!("{}/books", base_url))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    let remaining: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(remaining.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_create_without_content_is_rejected() {
    let base_url = spawn_app().await;
    let client = Client::new();

    for body in [json!({}), json!({ "data": "hello" })] {
        let response = client
            .post(&base_url)
            .json(&body)
            .send()
            .await
            .expect("Failed to send request");
        assert_eq!(response.status(), 400);

        let error: Value = response.json().await.expect("Failed to parse response");
        assert_eq!(error["error"], "Validation");
        assert_eq!(error["message"], "content parameter is required.");
    }

    // Nothing was created along the way
    let response = client
        .get(format!("{}/books", base_url))
        .send()
        .await
        .expect("Failed to send request");
    let books: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(books.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_get_book_returns_null_when_absent() {
    let base_url = spawn_app().await;
    let client = Client::new();

    let response = client
        .get(format!("{}/book/999", base_url))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body.is_null());

    let response = client
        .post(&base_url)
        .json(&json!({ "content": "findable" }))
        .send()
        .await
        .expect("Failed to send request");
    let created: Value = response.json().await.expect("Failed to parse response");
    let id = created[0]["id"].as_i64().expect("id not found");

    let response = client
        .get(format!("{}/book/{}", base_url, id))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    let book: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(book["id"].as_i64(), Some(id));
    assert_eq!(book["content"], "findable");
    assert!(book["aggregate_id"].is_string());
}

#[tokio::test]
async fn test_delete_missing_book_is_a_no_op() {
    let base_url = spawn_app().await;
    let client = Client::new();

    let response = client
        .delete(format!("{}/book/12345", base_url))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 204);
}

#[tokio::test]
async fn test_reference_entity_listings() {
    let base_url = spawn_app().await;
    let client = Client::new();

    for path in ["/genres", "/authors"] {
        let response = client
            .get(format!("{}{}", base_url, path))
            .send()
            .await
            .expect("Failed to send request");
        assert!(response.status().is_success());
        let list: Value = response.json().await.expect("Failed to parse response");
        assert_eq!(list.as_array().unwrap().len(), 0);
    }

    client
        .post(&base_url)
        .json(&json!({ "content": "with references" }))
        .send()
        .await
        .expect("Failed to send request");

    let response = client
        .get(format!("{}/genres", base_url))
        .send()
        .await
        .expect("Failed to send request");
    let genres: Value = response.json().await.expect("Failed to parse response");
    let genres = genres.as_array().unwrap();
    assert_eq!(genres.len(), 1);
    assert_eq!(genres[0]["name"], "Undefined");

    let response = client
        .get(format!("{}/authors", base_url))
        .send()
        .await
        .expect("Failed to send request");
    let authors: Value = response.json().await.expect("Failed to parse response");
    let authors = authors.as_array().unwrap();
    assert_eq!(authors.len(), 1);
    assert_eq!(authors[0]["name"], "me");
}

#[tokio::test]
async fn test_root_fallback_returns_book_list() {
    let base_url = spawn_app().await;
    let client = Client::new();

    // Any method other than POST on the root path falls back to the listing
    let response = client
        .get(&base_url)
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    let books: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(books.as_array().unwrap().len(), 0);

    client
        .post(&base_url)
        .json(&json!({ "content": "listed via fallback" }))
        .send()
        .await
        .expect("Failed to send request");

    let response = client
        .put(&base_url)
        .body("ignored")
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    let books: Value = response.json().await.expect("Failed to parse response");
    let books = books.as_array().unwrap();
    assert_eq!(books.len(), 1);
    assert_eq!(books[0]["content"], "listed via fallback");
}

#[tokio::test]
async fn test_unmatched_paths_are_not_found() {
    let base_url = spawn_app().await;
    let client = Client::new();

    let response = client
        .get(format!("{}/no/such/route", base_url))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn test_health_and_readiness() {
    let base_url = spawn_app().await;
    let client = Client::new();

    let response = client
        .get(format!("{}/health", base_url))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");

    let response = client
        .get(format!("{}/ready", base_url))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "ready");
}
