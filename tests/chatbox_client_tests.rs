// tests/chatbox_client_tests.rs

use std::{
    collections::VecDeque,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
};
use math_ai::{
    chatbox::{ChatboxError, ChatboxTransport, HttpChatboxClient},
    config::{ChatboxConfig, DEFAULT_CHATBOX_USER_AGENT, RetryConfig},
    models::conversation::{Conversation, Message, Role},
};
use serde_json::{Value, json};
use url::Url;

/// Upstream that answers with a scripted list of status codes, then 200.
#[derive(Default)]
struct Scripted {
    statuses: Mutex<VecDeque<u16>>,
    hits: AtomicUsize,
    headers: Mutex<Vec<HeaderMap>>,
    bodies: Mutex<Vec<Value>>,
}

async fn chat(
    State(upstream): State<Arc<Scripted>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    upstream.hits.fetch_add(1, Ordering::SeqCst);
    upstream.headers.lock().unwrap().push(headers);
    upstream.bodies.lock().unwrap().push(body);

    let next = upstream.statuses.lock().unwrap().pop_front();
    match next {
        Some(code) => {
            let status = StatusCode::from_u16(code).unwrap();
            (status, format!("scripted {}", code)).into_response()
        }
        None => Json(json!({
            "message": "[]",
            "role": "assistant",
            "model": "mock-model",
            "finish_reason": "stop",
            "prompt_tokens": 1,
            "completion_tokens": 2,
            "total_tokens": 3
        }))
        .into_response(),
    }
}

async fn spawn_upstream(statuses: &[u16]) -> (Arc<Scripted>, Url) {
    let upstream = Arc::new(Scripted {
        statuses: Mutex::new(statuses.iter().copied().collect()),
        ..Default::default()
    });
    let app = Router::new()
        .route("/chat", post(chat))
        .with_state(upstream.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let url = Url::parse(&format!("http://{}/chat", listener.local_addr().unwrap())).unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (upstream, url)
}

fn config(url: Url, retry: Option<RetryConfig>) -> ChatboxConfig {
    let mut config = ChatboxConfig::new(url);
    config.timeout = Duration::from_secs(5);
    config.retry = retry;
    config
}

fn retry(max_retries: u32, retryable_codes: Vec<u16>) -> Option<RetryConfig> {
    Some(RetryConfig {
        max_retries,
        delay: Duration::from_millis(10),
        retryable_codes,
    })
}

fn conversation() -> Conversation {
    Conversation {
        messages: vec![Message::new(Role::User, "Create 3 questions")],
        system_prompt: Some("You are a math tutor.".to_string()),
        ..Default::default()
    }
}

#[tokio::test]
async fn retries_listed_status_then_succeeds() {
    let (upstream, url) = spawn_upstream(&[503, 503]).await;
    let client = HttpChatboxClient::new(&config(url, retry(3, vec![502, 503]))).unwrap();

    let reply = client.send(&conversation()).await.expect("should succeed");

    assert_eq!(reply.model, "mock-model");
    assert_eq!(reply.total_tokens, 3);
    assert_eq!(upstream.hits.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn gives_up_after_max_retries() {
    let (upstream, url) = spawn_upstream(&[503, 503, 503, 503]).await;
    let client = HttpChatboxClient::new(&config(url, retry(2, vec![503]))).unwrap();

    let err = client.send(&conversation()).await.unwrap_err();

    assert!(matches!(err, ChatboxError::Status { status: 503, .. }), "{:?}", err);
    // One attempt plus two retries
    assert_eq!(upstream.hits.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn client_errors_are_not_retried() {
    let (upstream, url) = spawn_upstream(&[400]).await;
    let client = HttpChatboxClient::new(&config(url, retry(3, vec![]))).unwrap();

    let err = client.send(&conversation()).await.unwrap_err();

    match err {
        ChatboxError::Status { status, body } => {
            assert_eq!(status, 400);
            assert_eq!(body, "scripted 400");
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(upstream.hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn empty_code_list_retries_any_5xx() {
    let (upstream, url) = spawn_upstream(&[500, 502]).await;
    let client = HttpChatboxClient::new(&config(url, retry(2, vec![]))).unwrap();

    client.send(&conversation()).await.expect("should succeed");

    assert_eq!(upstream.hits.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn no_retry_policy_means_single_attempt() {
    let (upstream, url) = spawn_upstream(&[503]).await;
    let client = HttpChatboxClient::new(&config(url, None)).unwrap();

    assert!(client.send(&conversation()).await.is_err());
    assert_eq!(upstream.hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn sends_identity_and_auth_headers() {
    let (upstream, url) = spawn_upstream(&[]).await;
    let mut config = config(url, None);
    config.api_key = Some("secret-key".to_string());
    config.default_model = Some("tutor-large".to_string());
    let client = HttpChatboxClient::new(&config).unwrap();

    client.send(&conversation()).await.expect("should succeed");

    let headers = upstream.headers.lock().unwrap()[0].clone();
    assert_eq!(headers["user-agent"], DEFAULT_CHATBOX_USER_AGENT);
    assert_eq!(headers["content-type"], "application/json");
    assert_eq!(headers["authorization"], "Bearer secret-key");

    let body = upstream.bodies.lock().unwrap()[0].clone();
    assert_eq!(body["model"], "tutor-large");
    assert_eq!(body["messages"][0]["role"], "system");
    assert_eq!(body["messages"][0]["content"], "You are a math tutor.");
    assert_eq!(body["messages"][1]["role"], "user");
}

#[tokio::test]
async fn undecodable_reply_is_a_decode_error() {
    let app = Router::new().route("/chat", post(|| async { "definitely not json" }));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = Url::parse(&format!("http://{}/chat", listener.local_addr().unwrap())).unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    let client = HttpChatboxClient::new(&config(url, None)).unwrap();

    let err = client.send(&conversation()).await.unwrap_err();

    assert!(matches!(err, ChatboxError::Decode(_)), "{:?}", err);
}
