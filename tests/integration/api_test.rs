//! Conversation API integration tests
//!
//! Drives the full router over an in-memory database: bearer principal
//! extraction, the JSON envelope, and the status-code mapping of every
//! error category.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use crate::common::test_app;

/// Issue one request against the app and decode the JSON envelope.
async fn call(
    app: &Router,
    method: &str,
    uri: &str,
    bearer: Option<Uuid>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(principal) = bearer {
        builder = builder.header("authorization", format!("Bearer {}", principal));
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

#[tokio::test]
async fn test_full_conversation_flow() {
    let app = test_app().await;
    let (a, b) = (Uuid::new_v4(), Uuid::new_v4());

    // A starts a conversation with B
    let (status, body) = call(
        &app,
        "POST",
        "/api/conversations",
        Some(a),
        Some(json!({ "participant_id": b })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    let conversation_id = body["data"]["id"].as_str().unwrap().to_string();

    // Starting it again returns the same conversation
    let (_, body) = call(
        &app,
        "POST",
        "/api/conversations",
        Some(b),
        Some(json!({ "participant_id": a })),
    )
    .await;
    assert_eq!(body["data"]["id"].as_str().unwrap(), conversation_id);

    // A sends a message; the server assigns sequence 1
    let (status, body) = call(
        &app,
        "POST",
        &format!("/api/conversations/{}/messages", conversation_id),
        Some(a),
        Some(json!({ "content": "Hello" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["sequence"], json!(1));

    // B polls the full history
    let (status, body) = call(
        &app,
        "GET",
        &format!("/api/conversations/{}/messages?since=0", conversation_id),
        Some(b),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let messages = body["data"]["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0]["content"], json!("Hello"));

    // B replies and marks the conversation read
    let (_, body) = call(
        &app,
        "POST",
        &format!("/api/conversations/{}/messages", conversation_id),
        Some(b),
        Some(json!({ "content": "Hi" })),
    )
    .await;
    assert_eq!(body["data"]["sequence"], json!(2));

    let (status, _) = call(
        &app,
        "PUT",
        &format!("/api/conversations/{}/read", conversation_id),
        Some(b),
        Some(json!({ "upto_sequence": 2 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // B has nothing unread; A has B's reply pending
    let (_, body) = call(&app, "GET", "/api/conversations/unread-count", Some(b), None).await;
    assert_eq!(body["data"]["unread"], json!(0));
    let (_, body) = call(&app, "GET", "/api/conversations/unread-count", Some(a), None).await;
    assert_eq!(body["data"]["unread"], json!(1));

    // The conversation list carries the summary for A
    let (_, body) = call(&app, "GET", "/api/conversations", Some(a), None).await;
    let conversations = body["data"]["conversations"].as_array().unwrap();
    assert_eq!(conversations.len(), 1);
    assert_eq!(
        conversations[0]["other_participant"].as_str().unwrap(),
        b.to_string()
    );
    assert_eq!(conversations[0]["unread_count"], json!(1));
    assert_eq!(conversations[0]["last_message"]["content"], json!("Hi"));

    // A polls the delta past its last seen sequence and catches up
    let (_, body) = call(
        &app,
        "GET",
        &format!("/api/conversations/{}/messages?since=1", conversation_id),
        Some(a),
        None,
    )
    .await;
    let delta = body["data"]["messages"].as_array().unwrap();
    assert_eq!(delta.len(), 1);
    assert_eq!(delta[0]["sequence"], json!(2));
}

#[tokio::test]
async fn test_missing_bearer_is_unauthorized() {
    let app = test_app().await;

    let (status, body) = call(&app, "GET", "/api/conversations", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], json!(false));
}

#[tokio::test]
async fn test_self_conversation_is_rejected() {
    let app = test_app().await;
    let a = Uuid::new_v4();

    let (status, body) = call(
        &app,
        "POST",
        "/api/conversations",
        Some(a),
        Some(json!({ "participant_id": a })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], json!(false));
}

#[tokio::test]
async fn test_stranger_cannot_send() {
    let app = test_app().await;
    let (a, b) = (Uuid::new_v4(), Uuid::new_v4());

    let (_, body) = call(
        &app,
        "POST",
        "/api/conversations",
        Some(a),
        Some(json!({ "participant_id": b })),
    )
    .await;
    let conversation_id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = call(
        &app,
        "POST",
        &format!("/api/conversations/{}/messages", conversation_id),
        Some(Uuid::new_v4()),
        Some(json!({ "content": "hi" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["success"], json!(false));
}

#[tokio::test]
async fn test_unknown_conversation_is_not_found() {
    let app = test_app().await;

    let (status, _) = call(
        &app,
        "GET",
        &format!("/api/conversations/{}/messages?since=0", Uuid::new_v4()),
        Some(Uuid::new_v4()),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_empty_content_is_rejected() {
    let app = test_app().await;
    let (a, b) = (Uuid::new_v4(), Uuid::new_v4());

    let (_, body) = call(
        &app,
        "POST",
        "/api/conversations",
        Some(a),
        Some(json!({ "participant_id": b })),
    )
    .await;
    let conversation_id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, _) = call(
        &app,
        "POST",
        &format!("/api/conversations/{}/messages", conversation_id),
        Some(a),
        Some(json!({ "content": "   " })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_conversation_scoped_to_service_request_context() {
    let app = test_app().await;
    let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
    let context = Uuid::new_v4();

    let (_, plain) = call(
        &app,
        "POST",
        "/api/conversations",
        Some(a),
        Some(json!({ "participant_id": b })),
    )
    .await;
    let (_, scoped) = call(
        &app,
        "POST",
        "/api/conversations",
        Some(a),
        Some(json!({ "participant_id": b, "context_id": context })),
    )
    .await;

    assert_ne!(plain["data"]["id"], scoped["data"]["id"]);
    assert_eq!(
        scoped["data"]["context_id"].as_str().unwrap(),
        context.to_string()
    );
}
