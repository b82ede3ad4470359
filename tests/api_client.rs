//! Integration tests for the backend client against a mock HTTP server.
//!
//! Each test starts its own wiremock server; the client talks to it exactly
//! as it would to the Flask backend under `/api`.

use std::time::Duration;

use pretty_assertions::assert_eq;
use secrecy::SecretString;
use serde_json::json;
use trendboard::api::{ApiClient, ApiError, BackoffPolicy, NewFavorite};
use trendboard::chart::chart_from_response;
use trendboard::sources::{Entry, Source};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fast_backoff() -> BackoffPolicy {
    BackoffPolicy {
        max_attempts: 3,
        base_delay: Duration::from_millis(1),
        max_jitter: Duration::from_millis(1),
    }
}

fn client_for(server: &MockServer) -> ApiClient {
    ApiClient::new(&server.uri(), Duration::from_secs(5))
        .unwrap()
        .with_backoff(fast_backoff())
}

// ============================================================================
// Lists
// ============================================================================

#[tokio::test]
async fn test_bare_array_list_is_decoded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/github"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"full_name": "rust-lang/rust", "url": "https://github.com/rust-lang/rust",
             "owner": "rust-lang", "stars": 90000, "watchers": "1,200"},
            {"full_name": "tokio-rs/tokio", "url": "https://github.com/tokio-rs/tokio"}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let entries = client_for(&server)
        .fetch_source(Source::Github, "")
        .await
        .unwrap();

    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].title(), "rust-lang/rust");
    assert_eq!(entries[1].natural_key(), "tokio-rs/tokio");
}

#[tokio::test]
async fn test_wrapped_list_is_decoded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/news"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "all_articles": [
                {"title": "Show HN: a thing", "url": "https://example.com/a",
                 "author": null, "source": "Hacker News", "category": "tech"}
            ]
        })))
        .mount(&server)
        .await;

    let entries = client_for(&server)
        .fetch_source(Source::News, "")
        .await
        .unwrap();

    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].url(), "https://example.com/a");
}

#[tokio::test]
async fn test_youtube_blank_country_uses_default() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/youtube/morocco"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .expect(1)
        .mount(&server)
        .await;

    let entries = client_for(&server)
        .fetch_source(Source::Youtube, "  ")
        .await
        .unwrap();
    assert!(entries.is_empty());
}

// ============================================================================
// Error mapping
// ============================================================================

#[tokio::test]
async fn test_unauthorized_maps_to_not_authenticated() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/favorites"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "login"})))
        .mount(&server)
        .await;

    let err = client_for(&server).favorites().await.unwrap_err();
    assert!(matches!(err, ApiError::Unauthorized));
    assert_eq!(err.to_string(), "Not authenticated");
}

#[tokio::test]
async fn test_error_status_uses_body_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/history"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({"message": "Database is down"})),
        )
        .mount(&server)
        .await;

    let err = client_for(&server).history().await.unwrap_err();
    assert_eq!(err.to_string(), "Database is down");
}

#[tokio::test]
async fn test_error_status_without_body_reports_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/reddit"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .fetch_source(Source::Reddit, "")
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Status { status: 503, .. }));
}

#[tokio::test]
async fn test_favorites_success_false_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/favorites"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "message": "Session expired"
        })))
        .mount(&server)
        .await;

    let err = client_for(&server).favorites().await.unwrap_err();
    assert!(matches!(err, ApiError::Rejected(ref m) if m == "Session expired"));
}

// ============================================================================
// Favorites writes
// ============================================================================

#[tokio::test]
async fn test_add_favorite_posts_payload() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/favorites"))
        .and(body_json(json!({
            "title": "rust-lang/rust",
            "url": "https://github.com/rust-lang/rust",
            "category": "github",
            "source": "github"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"success": true, "id": 42})))
        .expect(1)
        .mount(&server)
        .await;

    let reply = client_for(&server)
        .add_favorite(&NewFavorite {
            title: "rust-lang/rust".into(),
            url: "https://github.com/rust-lang/rust".into(),
            category: "github".into(),
            source: "github".into(),
        })
        .await
        .unwrap();
    assert_eq!(reply.id, Some(42));
}

#[tokio::test]
async fn test_remove_favorite_deletes_by_id() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/favorites/7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&server)
        .await;

    client_for(&server).remove_favorite(7).await.unwrap();
}

// ============================================================================
// Auth
// ============================================================================

#[tokio::test]
async fn test_login_does_not_retry_server_refusal() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/login"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"message": "Invalid credentials"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let password = SecretString::from("hunter2");
    let err = client_for(&server)
        .login("a@example.com", &password)
        .await
        .unwrap_err();
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn test_login_success_returns_identity() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/login"))
        .and(body_json(json!({"username": "a@example.com", "password": "hunter2"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&server)
        .await;

    let password = SecretString::from("hunter2");
    let auth = client_for(&server)
        .login("a@example.com", &password)
        .await
        .unwrap();
    assert!(auth.authenticated);
    assert_eq!(auth.identity.as_deref(), Some("a@example.com"));
}

#[tokio::test]
async fn test_login_unreachable_backend_is_network_error() {
    // Nothing listens on the discard port.
    let client = ApiClient::new("http://127.0.0.1:9", Duration::from_secs(1))
        .unwrap()
        .with_backoff(fast_backoff());
    let password = SecretString::from("pw");

    let err = client.login("a@example.com", &password).await.unwrap_err();
    assert!(matches!(err, ApiError::Network(_)));
}

#[tokio::test]
async fn test_check_session_reads_username() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/session_test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"username": "alice"})))
        .mount(&server)
        .await;

    let auth = client_for(&server).check_session().await.unwrap();
    assert!(auth.authenticated);
    assert_eq!(auth.identity.as_deref(), Some("alice"));
}

#[tokio::test]
async fn test_check_session_unauthorized_is_signed_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/session_test"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let auth = client_for(&server).check_session().await.unwrap();
    assert!(!auth.authenticated);
    assert_eq!(auth.identity, None);
}

// ============================================================================
// Global trends
// ============================================================================

#[tokio::test]
async fn test_global_trends_aggregate_by_category() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/trends/global"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": [
                {"date": "2024-03-01", "category": "github", "count": 10},
                {"date": "2024-03-02", "category": " github ", "count": "5"},
                {"date": "2024-03-01", "category": "reddit", "count": 0},
                {"date": "2024-03-01", "category": "news", "count": 3}
            ]
        })))
        .mount(&server)
        .await;

    let response = client_for(&server).global_trends().await;
    let chart = chart_from_response(response, trendboard::chart::random_blue).unwrap();

    assert_eq!(chart.labels, vec!["github".to_string(), "news".to_string()]);
    assert_eq!(chart.datasets[0].data, vec![15.0, 3.0]);
    assert_eq!(chart.total(), 18.0);
}

#[tokio::test]
async fn test_global_trends_unsuccessful_reply_is_invalid() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/trends/global"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": false})))
        .mount(&server)
        .await;

    let response = client_for(&server).global_trends().await;
    let err = chart_from_response(response, trendboard::chart::random_blue).unwrap_err();
    assert_eq!(err.to_string(), "Invalid or unsuccessful data received.");
}
