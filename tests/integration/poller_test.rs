//! Polling client integration tests
//!
//! Runs the API client and the sync poller against a scripted HTTP server.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use uuid::Uuid;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use servilink::client::{ApiClient, ClientConfig, PollOptions, PollerEvent, SyncPoller};
use servilink::shared::messaging::{ApiResponse, ListMessagesResponse, Message};
use servilink::shared::MessagingError;

fn message(conversation_id: Uuid, sequence: i64, content: &str) -> Message {
    Message {
        id: Uuid::new_v4(),
        conversation_id,
        sender_id: Uuid::new_v4(),
        content: content.to_string(),
        sequence,
        created_at: Utc::now(),
    }
}

fn delta_body(messages: Vec<Message>) -> ApiResponse<ListMessagesResponse> {
    ApiResponse::ok(ListMessagesResponse { messages })
}

fn client_for(server: &MockServer) -> Arc<ApiClient> {
    let config = ClientConfig::new(server.uri(), Uuid::new_v4().to_string())
        .with_poll_interval(Duration::from_millis(50));
    Arc::new(ApiClient::new(config))
}

#[tokio::test]
async fn test_poller_delivers_delta_and_marks_read() {
    let server = MockServer::start().await;
    let conversation_id = Uuid::new_v4();
    let messages_path = format!("/api/conversations/{}/messages", conversation_id);

    Mock::given(method("GET"))
        .and(path(messages_path.clone()))
        .and(query_param("since", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(delta_body(vec![
            message(conversation_id, 1, "Hello"),
            message(conversation_id, 2, "Hi"),
        ])))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(messages_path))
        .and(query_param("since", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(delta_body(Vec::new())))
        .mount(&server)
        .await;

    // The active view advances the watermark after each delta
    Mock::given(method("PUT"))
        .and(path(format!("/api/conversations/{}/read", conversation_id)))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(ApiResponse::ok(serde_json::Value::Null)),
        )
        .expect(1..)
        .mount(&server)
        .await;

    let poller = SyncPoller::new(client_for(&server));
    let mut handle = poller.start(conversation_id, PollOptions::default());

    let event = tokio::time::timeout(Duration::from_secs(5), handle.next_event())
        .await
        .expect("no event before timeout")
        .expect("poller ended unexpectedly");

    match event {
        PollerEvent::Delta(delta) => {
            let sequences: Vec<i64> = delta.iter().map(|m| m.sequence).collect();
            assert_eq!(sequences, vec![1, 2]);
        }
        other => panic!("expected delta, got {:?}", other),
    }
    assert_eq!(handle.last_seen_sequence(), 2);

    handle.stop();
}

#[tokio::test]
async fn test_failed_poll_retries_on_next_tick() {
    let server = MockServer::start().await;
    let conversation_id = Uuid::new_v4();
    let messages_path = format!("/api/conversations/{}/messages", conversation_id);

    // First tick fails, the schedule keeps running, the next tick succeeds
    Mock::given(method("GET"))
        .and(path(messages_path.clone()))
        .respond_with(ResponseTemplate::new(503).set_body_json(
            ApiResponse::<ListMessagesResponse>::error("storage offline"),
        ))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(messages_path))
        .respond_with(ResponseTemplate::new(200).set_body_json(delta_body(vec![message(
            conversation_id,
            1,
            "recovered",
        )])))
        .mount(&server)
        .await;

    let poller = SyncPoller::new(client_for(&server));
    let mut handle = poller.start(
        conversation_id,
        PollOptions {
            active_view: false,
            ..PollOptions::default()
        },
    );

    let first = tokio::time::timeout(Duration::from_secs(5), handle.next_event())
        .await
        .unwrap()
        .unwrap();
    assert!(matches!(first, PollerEvent::Failed(_)));

    let second = tokio::time::timeout(Duration::from_secs(5), handle.next_event())
        .await
        .unwrap()
        .unwrap();
    match second {
        PollerEvent::Delta(delta) => assert_eq!(delta[0].sequence, 1),
        other => panic!("expected delta after retry, got {:?}", other),
    }

    handle.stop();
}

#[tokio::test]
async fn test_stop_discards_in_flight_response() {
    let server = MockServer::start().await;
    let conversation_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path(format!("/api/conversations/{}/messages", conversation_id)))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(delta_body(vec![message(conversation_id, 1, "late")]))
                .set_delay(Duration::from_millis(400)),
        )
        .mount(&server)
        .await;

    let poller = SyncPoller::new(client_for(&server));
    let mut handle = poller.start(conversation_id, PollOptions::default());

    // The first tick's request is still in flight when we stop
    tokio::time::sleep(Duration::from_millis(100)).await;
    handle.stop();

    let event = tokio::time::timeout(Duration::from_secs(5), handle.next_event())
        .await
        .expect("poller did not wind down");
    assert_eq!(event, None, "in-flight result must be discarded after stop");
    assert_eq!(handle.last_seen_sequence(), 0);
}

#[tokio::test]
async fn test_send_failure_is_not_retried() {
    let server = MockServer::start().await;
    let conversation_id = Uuid::new_v4();

    Mock::given(method("POST"))
        .and(path(format!("/api/conversations/{}/messages", conversation_id)))
        .respond_with(
            ResponseTemplate::new(503)
                .set_body_json(ApiResponse::<Message>::error("storage offline")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client
        .send_message(conversation_id, "hello")
        .await
        .unwrap_err();

    assert!(err.is_transient());
    // Mock expectation: exactly one request, verified on server drop
}

#[tokio::test]
async fn test_client_maps_authorization_failures() {
    let server = MockServer::start().await;
    let conversation_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path(format!("/api/conversations/{}/messages", conversation_id)))
        .respond_with(ResponseTemplate::new(403).set_body_json(
            ApiResponse::<ListMessagesResponse>::error("not a participant"),
        ))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client
        .fetch_delta(conversation_id, 0, None)
        .await
        .unwrap_err();

    assert!(matches!(err, MessagingError::Authorization { .. }));
}

#[tokio::test]
async fn test_pollers_are_independent_per_conversation() {
    let server = MockServer::start().await;
    let (first, second) = (Uuid::new_v4(), Uuid::new_v4());

    Mock::given(method("GET"))
        .and(path(format!("/api/conversations/{}/messages", first)))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(delta_body(vec![message(first, 1, "one")])),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/api/conversations/{}/messages", second)))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(delta_body(vec![message(second, 1, "uno")])),
        )
        .mount(&server)
        .await;

    let client = client_for(&server);
    let poller = SyncPoller::new(client);
    let options = PollOptions {
        active_view: false,
        ..PollOptions::default()
    };
    let mut first_handle = poller.start(first, options.clone());
    let mut second_handle = poller.start(second, options);

    // Stopping the first session must not disturb the second
    first_handle.stop();

    let event = tokio::time::timeout(Duration::from_secs(5), second_handle.next_event())
        .await
        .unwrap()
        .unwrap();
    match event {
        PollerEvent::Delta(delta) => assert_eq!(delta[0].conversation_id, second),
        other => panic!("expected delta, got {:?}", other),
    }

    second_handle.stop();
    let _ = first_handle.next_event().await;
}
