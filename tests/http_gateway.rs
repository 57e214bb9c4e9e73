//! `HttpGateway` against a minimal local HTTP server.

use paywall_lite::application::ports::Gateway;
use paywall_lite::infrastructure::mocks::MockClock;
use paywall_lite::{
    AccessOutcome, CircuitBreakerConfig, CircuitState, Configuration, GatewayError, HttpGateway,
    Paywall,
};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// A request as seen by the test server.
#[derive(Debug, Clone)]
struct Received {
    path: String,
    body: serde_json::Value,
}

/// How the test server answers the next connections.
#[derive(Debug, Clone, Copy)]
enum Reply {
    Respond(u16, &'static str),
    /// Read the request and never answer.
    Hang,
}

/// Serve every connection with the same status and body.
async fn serve(status: u16, body: &'static str) -> (String, Arc<Mutex<Vec<Received>>>) {
    let (base, received, _) = serve_switchable(Reply::Respond(status, body)).await;
    (base, received)
}

/// Serve connections with whatever `Reply` is current when they arrive.
async fn serve_switchable(
    initial: Reply,
) -> (String, Arc<Mutex<Vec<Received>>>, Arc<Mutex<Reply>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let received = Arc::new(Mutex::new(Vec::new()));
    let reply = Arc::new(Mutex::new(initial));
    let log = received.clone();
    let current = reply.clone();

    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                return;
            };
            let log = log.clone();
            let current = current.clone();
            tokio::spawn(async move {
                let request = read_request(&mut socket).await;
                log.lock().unwrap().push(request);
                let reply = *current.lock().unwrap();
                let (status, body) = match reply {
                    Reply::Respond(status, body) => (status, body),
                    Reply::Hang => return std::future::pending::<()>().await,
                };
                let response = format!(
                    "HTTP/1.1 {} X\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    (format!("http://{}", addr), received, reply)
}

async fn read_request(socket: &mut tokio::net::TcpStream) -> Received {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];

    loop {
        let n = socket.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);

        let text = String::from_utf8_lossy(&buf);
        if let Some(split) = text.find("\r\n\r\n") {
            let content_length = text[..split]
                .lines()
                .find_map(|line| {
                    let (name, value) = line.split_once(':')?;
                    name.eq_ignore_ascii_case("content-length")
                        .then(|| value.trim().parse::<usize>().ok())
                        .flatten()
                })
                .unwrap_or(0);
            if buf.len() >= split + 4 + content_length {
                break;
            }
        }
    }

    let text = String::from_utf8_lossy(&buf).into_owned();
    let (head, body) = text.split_once("\r\n\r\n").unwrap_or((text.as_str(), ""));
    let path = head
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .unwrap_or_default()
        .to_string();

    Received {
        path,
        body: serde_json::from_str(body).unwrap_or(serde_json::Value::Null),
    }
}

fn gateway(base: &str) -> HttpGateway {
    HttpGateway::new(
        base,
        "gazette",
        Duration::from_secs(2),
        Arc::new(MockClock::new(Instant::now())),
    )
    .unwrap()
}

#[tokio::test]
async fn quota_check_posts_site_and_path() {
    let (base, received) = serve(200, r#"{"allowed":false}"#).await;

    let verdict = gateway(&base).check_quota("/world/story").await.unwrap();
    assert!(!verdict.allowed);

    let requests = received.lock().unwrap().clone();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].path, "/meter/check");
    assert_eq!(
        requests[0].body,
        serde_json::json!({"site": "gazette", "path": "/world/story"})
    );
}

#[tokio::test]
async fn missing_allowed_field_reads_as_allowed() {
    let (base, _) = serve(200, r#"{"remaining":2}"#).await;
    let verdict = gateway(&base).check_quota("/a").await.unwrap();
    assert!(verdict.allowed);
}

#[tokio::test]
async fn server_error_is_a_status_error() {
    let (base, _) = serve(500, r#"{"allowed":false}"#).await;
    assert_eq!(
        gateway(&base).check_quota("/a").await,
        Err(GatewayError::Status(500))
    );
}

#[tokio::test]
async fn garbage_body_is_a_decode_error() {
    let (base, _) = serve(200, "<html>maintenance</html>").await;
    assert!(matches!(
        gateway(&base).check_quota("/a").await,
        Err(GatewayError::Decode(_))
    ));
}

#[tokio::test]
async fn hit_and_registration_endpoints() {
    let (base, received) = serve(204, "").await;
    let gateway = gateway(&base);

    gateway.record_hit("/a").await.unwrap();
    gateway.register_email("reader@example.com", "/a").await.unwrap();

    let requests = received.lock().unwrap().clone();
    assert_eq!(requests[0].path, "/meter/hit");
    assert_eq!(requests[0].body, serde_json::json!({"site": "gazette", "path": "/a"}));
    assert_eq!(requests[1].path, "/register");
    assert_eq!(
        requests[1].body,
        serde_json::json!({"site": "gazette", "email": "reader@example.com", "path": "/a"})
    );
}

#[tokio::test]
async fn closed_port_is_a_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let result = gateway(&format!("http://{}", addr)).check_quota("/a").await;
    assert!(matches!(result, Err(GatewayError::Transport(_))));
}

#[tokio::test]
async fn repeated_failures_open_the_circuit() {
    let (base, received) = serve(503, "").await;
    let clock = MockClock::new(Instant::now());
    let gateway = HttpGateway::with_breaker_config(
        &base,
        "gazette",
        Duration::from_secs(2),
        CircuitBreakerConfig {
            failure_threshold: 2,
            recovery_timeout: Duration::from_secs(30),
        },
        Arc::new(clock.clone()),
    )
    .unwrap();

    assert_eq!(gateway.check_quota("/a").await, Err(GatewayError::Status(503)));
    assert_eq!(gateway.check_quota("/a").await, Err(GatewayError::Status(503)));
    assert_eq!(gateway.circuit_state(), CircuitState::Open);

    assert_eq!(gateway.check_quota("/a").await, Err(GatewayError::CircuitOpen));
    assert_eq!(received.lock().unwrap().len(), 2);

    clock.advance(Duration::from_secs(30));
    assert_eq!(gateway.check_quota("/a").await, Err(GatewayError::Status(503)));
    assert_eq!(received.lock().unwrap().len(), 3);
    assert_eq!(gateway.circuit_state(), CircuitState::Open);
}

#[tokio::test]
async fn paywall_talks_to_configured_api_base() {
    let (base, received) = serve(200, r#"{"allowed":true}"#).await;
    let config = Configuration::builder()
        .with_site_id("gazette")
        .with_api_base(format!("{}/", base))
        .build()
        .unwrap();
    let paywall = Paywall::builder().with_config(config).build().unwrap();

    let mut page = paywall.open_page("/story", "Mozilla/5.0 Firefox/128.0");
    assert_eq!(page.ready().await, AccessOutcome::Granted);

    // The hit report is detached; give it a moment to arrive.
    for _ in 0..50 {
        if received.lock().unwrap().len() >= 2 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    let paths: Vec<_> = received
        .lock()
        .unwrap()
        .iter()
        .map(|r| r.path.clone())
        .collect();
    assert_eq!(paths, vec!["/meter/check", "/meter/hit"]);
}

#[tokio::test]
async fn abandoned_calls_count_as_failures() {
    let (base, _, _) = serve_switchable(Reply::Hang).await;
    let gateway = HttpGateway::with_breaker_config(
        &base,
        "gazette",
        Duration::from_secs(5),
        CircuitBreakerConfig {
            failure_threshold: 2,
            recovery_timeout: Duration::from_secs(30),
        },
        Arc::new(MockClock::new(Instant::now())),
    )
    .unwrap();

    for _ in 0..2 {
        let bounded = tokio::time::timeout(Duration::from_millis(100), gateway.check_quota("/a")).await;
        assert!(bounded.is_err());
    }

    assert_eq!(gateway.circuit_state(), CircuitState::Open);
}

#[tokio::test]
async fn denial_honored_after_probe_times_out() {
    let (base, _, reply) = serve_switchable(Reply::Respond(503, "")).await;
    let clock = MockClock::new(Instant::now());
    let config = Configuration::builder()
        .with_site_id("gazette")
        .with_free_views(100)
        .with_api_base(base)
        .with_quota_timeout(Duration::from_millis(300))
        .with_request_timeout(Duration::from_secs(5))
        .build()
        .unwrap();
    let paywall = Paywall::builder()
        .with_config(config)
        .with_clock(Arc::new(clock.clone()))
        .build()
        .unwrap();
    let ua = "Mozilla/5.0 Firefox/128.0";

    // Five failing quota checks open the circuit; every view fails open.
    for _ in 0..5 {
        assert_eq!(paywall.open_page("/a", ua).ready().await, AccessOutcome::Granted);
    }
    // Let the detached hit reports finish before the clock moves.
    tokio::time::sleep(Duration::from_millis(100)).await;

    // The half-open probe hangs and is cut off by the quota bound.
    *reply.lock().unwrap() = Reply::Hang;
    clock.advance(Duration::from_secs(31));
    assert_eq!(paywall.open_page("/b", ua).ready().await, AccessOutcome::Granted);

    // Once the backend is healthy again its denial is honored.
    *reply.lock().unwrap() = Reply::Respond(200, r#"{"allowed":false}"#);
    clock.advance(Duration::from_secs(31));
    assert_eq!(paywall.open_page("/c", ua).ready().await, AccessOutcome::Denied);
}
