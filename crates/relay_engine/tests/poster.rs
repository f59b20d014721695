use std::time::Duration;

use relay_core::ErrorKind;
use relay_engine::{ExternalPoster, GraphPoster, PosterError, PosterSettings};
use serde_json::json;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn poster_for(server: &MockServer) -> GraphPoster {
    GraphPoster::new(PosterSettings {
        api_base: format!("{}/v19.0", server.uri()),
        ..PosterSettings::default()
    })
    .expect("poster")
}

#[tokio::test]
async fn poster_submits_comment_and_token_as_form() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v19.0/123_456/comments"))
        .and(body_string_contains("message=hello"))
        .and(body_string_contains("access_token=tok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "456_789"})))
        .expect(1)
        .mount(&server)
        .await;

    let receipt = poster_for(&server)
        .post("123_456", "hello", "tok")
        .await
        .expect("post ok");
    assert_eq!(receipt.target, "123_456");
    assert_eq!(receipt.comment_id.as_deref(), Some("456_789"));
}

#[tokio::test]
async fn success_without_id_still_counts() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v19.0/1/comments"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(&server)
        .await;

    let receipt = poster_for(&server).post("1", "c", "t").await.unwrap();
    assert_eq!(receipt.comment_id, None);
}

#[tokio::test]
async fn provider_errors_are_classified() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v19.0/bad-token/comments"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": {
                "message": "Invalid OAuth access token.",
                "type": "OAuthException",
                "code": 190
            }
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v19.0/missing/comments"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": {
                "message": "Unsupported post request. Object with ID 'missing' does not exist",
                "type": "GraphMethodException",
                "code": 100,
                "error_subcode": 33
            }
        })))
        .mount(&server)
        .await;

    let poster = poster_for(&server);

    let err = poster.post("bad-token", "c", "t").await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidToken);
    assert_eq!(err.message, "Invalid OAuth access token.");
    assert!(!err.transport);

    let err = poster.post("missing", "c", "t").await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::WrongPostId);
}

#[tokio::test]
async fn unparseable_error_body_is_unknown() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v19.0/1/comments"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>bad gateway</html>"))
        .mount(&server)
        .await;

    let err = poster_for(&server).post("1", "c", "t").await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Unknown);
    assert!(err.message.contains("502"));
    assert!(!err.transport);
}

#[tokio::test]
async fn slow_provider_is_a_transport_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v19.0/1/comments"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(250))
                .set_body_json(json!({"id": "x"})),
        )
        .mount(&server)
        .await;

    let poster = GraphPoster::new(PosterSettings {
        api_base: format!("{}/v19.0", server.uri()),
        request_timeout: Duration::from_millis(50),
        ..PosterSettings::default()
    })
    .unwrap();

    let err = poster.post("1", "c", "t").await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Unknown);
    assert!(err.transport);
}

#[tokio::test]
async fn unreachable_provider_is_a_transport_failure() {
    // A non-pooled server, so dropping it actually closes the listener.
    let server = MockServer::builder().start().await;
    let api_base = format!("{}/v19.0", server.uri());
    drop(server);

    let poster = GraphPoster::new(PosterSettings {
        api_base,
        connect_timeout: Duration::from_millis(200),
        request_timeout: Duration::from_millis(500),
    })
    .unwrap();

    let err = poster.post("1", "c", "t").await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Unknown);
    assert!(err.transport);
}

#[test]
fn rejects_unusable_base_urls() {
    for api_base in ["not a url", "mailto:someone@example.com"] {
        let err = GraphPoster::new(PosterSettings {
            api_base: api_base.to_string(),
            ..PosterSettings::default()
        })
        .unwrap_err();
        assert!(matches!(err, PosterError::InvalidBaseUrl { .. }), "{api_base}");
    }
}
