//! Mock HTTP server tests for `SlackApiClient`.
//!
//! Uses [`wiremock`] to emulate the Slack Web API so the full request and
//! response path runs without touching slack.com.
//!
//! Coverage:
//! - `auth.test` identity decoding
//! - cursor pagination of `conversations.list`
//! - history decoding and the `limit` parameter
//! - HTTP 429 with `Retry-After`
//! - `missing_scope`, `channel_not_found`, `not_in_channel`
//! - idempotent archive on `already_archived`
//! - gateway retry against a throttling server

use std::sync::Arc;
use std::time::Duration;

use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use chanward_slack::gateway::{GatedSlack, Gateway, RetryPolicy};
use chanward_slack::{SlackApi, SlackApiClient};
use chanward_types::{ChanwardError, SlackError};

fn client(server: &MockServer) -> SlackApiClient {
    SlackApiClient::with_base_url("xoxb-mock".into(), server.uri())
}

#[tokio::test]
async fn auth_test_returns_identity() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/auth.test"))
        .and(header("Authorization", "Bearer xoxb-mock"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "ok": true, "user_id": "U_BOT", "bot_id": "B_BOT", "team": "Acme"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let me = client(&server).auth_test().await.unwrap();
    assert_eq!(me.user_id, "U_BOT");
    assert_eq!(me.bot_id.as_deref(), Some("B_BOT"));
}

#[tokio::test]
async fn list_channels_follows_cursor() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/conversations.list"))
        .and(query_param("cursor", "page2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "ok": true,
            "channels": [{ "id": "C2", "name": "random", "created": 1_600_000_000, "num_members": 4 }],
            "response_metadata": { "next_cursor": "" }
        })))
        .with_priority(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/conversations.list"))
        .and(query_param("exclude_archived", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "ok": true,
            "channels": [{ "id": "C1", "name": "general", "created": 1_500_000_000, "num_members": 10, "is_member": true }],
            "response_metadata": { "next_cursor": "page2" }
        })))
        .mount(&server)
        .await;

    let api = client(&server);
    let first = api.list_channels(None).await.unwrap();
    assert_eq!(first.items.len(), 1);
    assert_eq!(first.items[0].id, "C1");
    assert!(first.items[0].is_member);
    assert_eq!(first.next_cursor.as_deref(), Some("page2"));

    let second = api.list_channels(Some("page2")).await.unwrap();
    assert_eq!(second.items[0].name, "random");
    assert_eq!(second.next_cursor, None);

    let gated = GatedSlack::new(Arc::new(client(&server)), Gateway::default());
    let all = gated.channels().await.unwrap();
    let names: Vec<_> = all.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["general", "random"]);
}

#[tokio::test]
async fn history_decodes_messages() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/conversations.history"))
        .and(query_param("channel", "C1"))
        .and(query_param("limit", "15"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "ok": true,
            "messages": [
                { "type": "message", "user": "U1", "text": "latest", "ts": "1700000100.000200" },
                { "type": "message", "subtype": "bot_message", "bot_id": "B9", "text": "beep", "ts": "1700000000.000100" },
                { "type": "message", "user": "U2", "text": "broken", "ts": "garbage" }
            ],
            "has_more": true
        })))
        .expect(1)
        .mount(&server)
        .await;

    let msgs = client(&server).history("C1", 15).await.unwrap();
    assert_eq!(msgs.len(), 2, "malformed ts is dropped");
    assert_eq!(msgs[0].text, "latest");
    assert_eq!(msgs[0].ts.timestamp(), 1_700_000_100);
    assert!(msgs[1].is_bot());
}

#[tokio::test]
async fn http_429_uses_retry_after_header() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/conversations.history"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "42"))
        .mount(&server)
        .await;

    let err = client(&server).history("C1", 15).await.unwrap_err();
    assert!(
        matches!(err, SlackError::RateLimited { retry_after_ms: 42_000 }),
        "got {err:?}"
    );
}

#[tokio::test]
async fn missing_scope_names_the_scope() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/conversations.history"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "ok": false, "error": "missing_scope", "needed": "channels:history", "provided": "chat:write"
        })))
        .mount(&server)
        .await;

    let err = client(&server).history("C1", 15).await.unwrap_err();
    match err {
        SlackError::MissingScope { method, needed } => {
            assert_eq!(method, "conversations.history");
            assert_eq!(needed, "channels:history");
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[tokio::test]
async fn not_in_channel_reports_channel() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/conversations.history"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "ok": false, "error": "not_in_channel" })),
        )
        .mount(&server)
        .await;

    let err = client(&server).history("C77", 15).await.unwrap_err();
    assert!(matches!(err, SlackError::NotInChannel { ref channel } if channel == "C77"));
}

#[tokio::test]
async fn post_message_sends_json_and_returns_ts() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat.postMessage"))
        .and(body_partial_json(serde_json::json!({ "channel": "C1", "text": "hello" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "ok": true, "channel": "C1", "ts": "1700000000.000900"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let ts = client(&server).post_message("C1", "hello").await.unwrap();
    assert_eq!(ts, "1700000000.000900");
}

#[tokio::test]
async fn join_unknown_channel_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/conversations.join"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "ok": false, "error": "channel_not_found"
        })))
        .mount(&server)
        .await;

    let err = client(&server).join("C404").await.unwrap_err();
    assert!(matches!(err, SlackError::NotFound { .. }));
}

#[tokio::test]
async fn archive_is_idempotent() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/conversations.archive"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "ok": false, "error": "already_archived"
        })))
        .mount(&server)
        .await;

    client(&server).archive("C1").await.unwrap();
}

#[tokio::test]
async fn server_error_is_http_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/auth.test"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream down"))
        .mount(&server)
        .await;

    let err = client(&server).auth_test().await.unwrap_err();
    assert!(matches!(err, SlackError::Http(ref m) if m.contains("503")));
}

#[tokio::test]
async fn gateway_gives_up_after_three_throttled_attempts() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/conversations.history"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "1"))
        .expect(3)
        .mount(&server)
        .await;

    let policy = RetryPolicy {
        max_attempts: 3,
        wait_for: |err| err.retry_after().map(|_| Duration::from_millis(1)),
        progress_interval: Duration::from_millis(1),
    };
    let gated = GatedSlack::new(Arc::new(client(&server)), Gateway::new(policy));

    let err = gated.history_of("C1", "#general", 15).await.unwrap_err();
    match err {
        ChanwardError::RateLimited {
            attempts,
            retry_after,
            operation,
        } => {
            assert_eq!(attempts, 3);
            assert_eq!(retry_after, Duration::from_secs(1));
            assert!(operation.contains("#general"));
        }
        other => panic!("unexpected {other:?}"),
    }
}
