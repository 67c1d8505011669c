//! HTTP 后端请求测试

use ordertrack::domain::model::OrderStatus;
use ordertrack::infrastructure::config::{ApiConfig, CacheConfig};
use ordertrack::infrastructure::network::HttpTrackingBackend;
use ordertrack::{TrackError, TrackingBackend, TrackingService};
use reqwest::Client;
use std::collections::HashMap;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

/// One request as the server saw it
#[derive(Debug)]
struct Captured {
    method: String,
    path: String,
    headers: HashMap<String, String>,
    body: String,
}

impl Captured {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }

    fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).unwrap()
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

async fn read_request(stream: &mut TcpStream) -> Captured {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        let n = stream.read(&mut chunk).await.unwrap();
        assert!(n > 0, "connection closed before headers were sent");
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = find(&buf, b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8(buf[..header_end].to_vec()).unwrap();
    let mut lines = head.split("\r\n");
    let mut request_line = lines.next().unwrap().split(' ');
    let method = request_line.next().unwrap().to_string();
    let path = request_line.next().unwrap().to_string();
    let headers: HashMap<String, String> = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(name, value)| (name.trim().to_ascii_lowercase(), value.trim().to_string()))
        .collect();

    let length: usize = headers
        .get("content-length")
        .map(|v| v.parse().unwrap())
        .unwrap_or(0);
    while buf.len() < header_end + length {
        let n = stream.read(&mut chunk).await.unwrap();
        assert!(n > 0, "connection closed before body was sent");
        buf.extend_from_slice(&chunk[..n]);
    }
    let body = String::from_utf8(buf[header_end..header_end + length].to_vec()).unwrap();

    Captured {
        method,
        path,
        headers,
        body,
    }
}

/// Serve the canned `(status line, body)` responses one connection each,
/// returning what every request carried.
async fn serve(responses: Vec<(&'static str, &'static str)>) -> (String, JoinHandle<Vec<Captured>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = tokio::spawn(async move {
        let mut seen = Vec::new();
        for (status, body) in responses {
            let (mut stream, _) = listener.accept().await.unwrap();
            seen.push(read_request(&mut stream).await);

            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            stream.write_all(response.as_bytes()).await.unwrap();
            stream.shutdown().await.ok();
        }
        seen
    });

    (format!("http://{}/api", addr), handle)
}

fn backend(base_url: &str, token: Option<&str>) -> HttpTrackingBackend {
    let api = ApiConfig {
        base_url: base_url.to_string(),
        token: token.map(str::to_string),
        ..ApiConfig::default()
    };
    // Keep requests off any proxy set in the environment
    let client = Client::builder().no_proxy().build().unwrap();
    HttpTrackingBackend::new(client, &api).unwrap()
}

#[tokio::test]
async fn test_track_sends_get_with_bearer_and_request_id() {
    let (base_url, server) = serve(vec![(
        "200 OK",
        r#"{"data": {"orderId": "PC-1", "status": "SHIPPED", "carrier": "DHL"}}"#,
    )])
    .await;

    let summary = backend(&base_url, Some("api-token"))
        .track_order("PC-1")
        .await
        .unwrap();
    assert_eq!(summary.order_id, "PC-1");
    assert_eq!(summary.status, OrderStatus::Shipped);
    assert_eq!(summary.carrier.as_deref(), Some("DHL"));

    let seen = server.await.unwrap();
    assert_eq!(seen[0].method, "GET");
    assert_eq!(seen[0].path, "/api/orders/track/PC-1");
    assert_eq!(seen[0].header("authorization"), Some("Bearer api-token"));
    let request_id = seen[0].header("x-request-id").unwrap();
    assert!(uuid::Uuid::parse_str(request_id).is_ok());
}

#[tokio::test]
async fn test_no_token_sends_no_authorization() {
    let (base_url, server) = serve(vec![(
        "200 OK",
        r#"{"orderId": "PC-2", "status": "PENDING"}"#,
    )])
    .await;

    backend(&base_url, None).track_order("PC-2").await.unwrap();

    let seen = server.await.unwrap();
    assert_eq!(seen[0].header("authorization"), None);
    assert!(seen[0].header("x-request-id").is_some());
}

#[tokio::test]
async fn test_otp_calls_post_camel_case_bodies() {
    let (base_url, server) = serve(vec![
        (
            "200 OK",
            r#"{"message": "OTP sent", "maskedEmail": "j***@example.com", "expiresInSecs": 300}"#,
        ),
        (
            "200 OK",
            r#"{"data": {"accessToken": "tok-1", "expiresInSecs": 600}}"#,
        ),
    ])
    .await;
    let backend = backend(&base_url, Some("api-token"));

    let dispatch = backend
        .request_otp("PC-3", "jane@example.com")
        .await
        .unwrap();
    assert_eq!(dispatch.masked_email.as_deref(), Some("j***@example.com"));
    let verified = backend
        .verify_otp("PC-3", "jane@example.com", "123456")
        .await
        .unwrap();
    assert_eq!(verified.access_token, "tok-1");

    let seen = server.await.unwrap();
    assert_eq!(seen[0].method, "POST");
    assert_eq!(seen[0].path, "/api/orders/track/otp/request");
    assert!(seen[0]
        .header("content-type")
        .unwrap()
        .starts_with("application/json"));
    assert_eq!(
        seen[0].json(),
        serde_json::json!({"orderId": "PC-3", "email": "jane@example.com"})
    );

    assert_eq!(seen[1].method, "POST");
    assert_eq!(seen[1].path, "/api/orders/track/otp/verify");
    assert_eq!(
        seen[1].json(),
        serde_json::json!({"orderId": "PC-3", "email": "jane@example.com", "otp": "123456"})
    );

    // each request gets its own id
    assert_ne!(seen[0].header("x-request-id"), seen[1].header("x-request-id"));
}

#[tokio::test]
async fn test_details_bearer_is_access_token() {
    let (base_url, server) = serve(vec![(
        "200 OK",
        r#"{"data": {
            "orderId": "PC-4",
            "status": "DELIVERED",
            "items": [{"name": "RTX 4070", "quantity": 1, "unitPrice": 599.0}],
            "total": 599.0
        }}"#,
    )])
    .await;

    let details = backend(&base_url, Some("api-token"))
        .track_order_details("PC-4", "access-xyz")
        .await
        .unwrap();
    assert_eq!(details.summary.status, OrderStatus::Delivered);
    assert_eq!(details.items.len(), 1);

    let seen = server.await.unwrap();
    assert_eq!(seen[0].method, "GET");
    assert_eq!(seen[0].path, "/api/orders/track/PC-4/details");
    assert_eq!(seen[0].header("authorization"), Some("Bearer access-xyz"));
}

#[tokio::test]
async fn test_not_found_maps_to_api_error() {
    let (base_url, server) = serve(vec![(
        "404 Not Found",
        r#"{"message": "Order not found"}"#,
    )])
    .await;

    let err = backend(&base_url, None)
        .track_order("PC-404")
        .await
        .unwrap_err();
    match err {
        TrackError::Api { status, message } => {
            assert_eq!(status, 404);
            assert_eq!(message, "Order not found");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    server.await.unwrap();
}

#[tokio::test]
async fn test_order_id_is_path_encoded() {
    let (base_url, server) = serve(vec![(
        "200 OK",
        r#"{"orderId": "PC 5/6", "status": "CONFIRMED"}"#,
    )])
    .await;

    backend(&base_url, None).track_order("PC 5/6").await.unwrap();

    let seen = server.await.unwrap();
    assert_eq!(seen[0].path, "/api/orders/track/PC%205%2F6");
}

#[tokio::test]
async fn test_service_sends_one_request_for_concurrent_tracking() {
    let (base_url, server) = serve(vec![(
        "200 OK",
        r#"{"orderId": "PC-7", "status": "PROCESSING"}"#,
    )])
    .await;
    let service = TrackingService::new(backend(&base_url, None), &CacheConfig::default());

    let (a, b, c) = tokio::join!(
        service.track_order("PC-7"),
        service.track_order("PC-7"),
        service.track_order(" PC-7 ")
    );
    assert_eq!(a.unwrap(), b.unwrap());
    assert_eq!(c.unwrap().status, OrderStatus::Processing);

    let seen = server.await.unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(service.stats().hits, 2);
}
