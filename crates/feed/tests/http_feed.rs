//! HttpFeed against a minimal in-process HTTP/1.1 server.

use dispatch_core::{Applied, CallStore, Error};
use dispatch_feed::{CallFeed, HealthCheck, HttpFeed};
use futures::StreamExt;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

const CALLS: &str = r#"[
  {"id": "CA1", "priority": "P2", "status": "AI handling", "aiHandling": true,
   "transcript": [{"sender": "caller", "text": "Help", "time": "10:00"}]},
  {"id": "CA2", "priority": "P4", "status": "Dispatched", "transcript": []}
]"#;

const EVENTS: &str = concat!(
    ": keepalive\n\n",
    "data: {\"type\": \"new_message\", \"call_id\": \"CA1\", \"message\": {\"sender\": \"ai\", \"text\": \"On the way\", \"time\": \"10:01\"}}\n\n",
    "data: {\"type\": \"unknown_kind\"}\n\n",
    "data: {\"type\": \"summary_update\", \"call_id\": \"CA2\", \"summary\": \"Resolved\"}\n\n",
);

/// Serve one canned response per path, closing each connection after writing
async fn serve(routes: Vec<(&'static str, &'static str, &'static str, String)>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else { return };
            let routes = routes.clone();
            tokio::spawn(async move {
                let mut buf = vec![0u8; 4096];
                let n = socket.read(&mut buf).await.unwrap_or(0);
                let request = String::from_utf8_lossy(&buf[..n]);
                let path = request.split_whitespace().nth(1).unwrap_or("/").to_string();

                let response = match routes.iter().find(|(route, ..)| *route == path) {
                    Some((_, status, content_type, body)) => format!(
                        "HTTP/1.1 {}\r\ncontent-type: {}\r\nconnection: close\r\n\r\n{}",
                        status, content_type, body
                    ),
                    None => "HTTP/1.1 404 Not Found\r\ncontent-length: 0\r\nconnection: close\r\n\r\n".to_string(),
                };
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    format!("http://{}", addr)
}

fn backend_routes() -> Vec<(&'static str, &'static str, &'static str, String)> {
    vec![
        ("/api/calls", "200 OK", "application/json", CALLS.to_string()),
        ("/api/events", "200 OK", "text/event-stream", EVENTS.to_string()),
        (
            "/api/health",
            "200 OK",
            "application/json",
            r#"{"status": "ok", "message": "Backend connected"}"#.to_string(),
        ),
    ]
}

#[tokio::test]
async fn test_fetch_then_subscribe_into_store() {
    let base_url = serve(backend_routes()).await;
    let feed = HttpFeed::new(base_url, Duration::from_secs(5));

    let mut store = CallStore::new();
    store.initialize(feed.fetch_all().await.unwrap()).unwrap();
    assert_eq!(store.len(), 2);

    let events: Vec<_> = feed.subscribe(CancellationToken::new()).await.unwrap().collect().await;
    assert_eq!(events.len(), 2);

    let outcomes: Vec<Applied> = events.into_iter().map(|event| store.apply(event.unwrap())).collect();
    assert_eq!(outcomes, vec![Applied::Updated, Applied::Updated]);

    let first = store.get("CA1").unwrap();
    assert_eq!(first.transcript.len(), 2);
    assert_eq!(first.transcript[1].text, "On the way");
    assert_eq!(store.get("CA2").unwrap().summary, "Resolved");
}

#[tokio::test]
async fn test_server_error_is_transport() {
    let base_url = serve(vec![("/api/calls", "503 Service Unavailable", "text/plain", "down".to_string())]).await;
    let feed = HttpFeed::new(base_url, Duration::from_secs(5));

    let err = feed.fetch_all().await.unwrap_err();
    assert!(matches!(err, Error::Transport(ref msg) if msg.contains("503")));
}

#[tokio::test]
async fn test_invalid_payload_is_validation() {
    let base_url = serve(vec![(
        "/api/calls",
        "200 OK",
        "application/json",
        r#"[{"id": "CA1", "status": "AI handling", "transcript": []}]"#.to_string(),
    )])
    .await;
    let feed = HttpFeed::new(base_url, Duration::from_secs(5));

    let err = feed.fetch_all().await.unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
    assert!(!err.is_transient());
}

#[tokio::test]
async fn test_health_endpoint() {
    let base_url = serve(backend_routes()).await;
    let feed = HttpFeed::new(base_url, Duration::from_secs(5));

    let result = feed.check_health().await.unwrap();
    assert!(result.healthy);
    assert_eq!(result.message.as_deref(), Some("Backend connected"));
}
