use requestly::{Client, Form, NetError, Part};
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::Mutex;

/// One-shot server that captures the raw request and answers with `response`.
async fn capture_server(response: &'static str) -> (String, Arc<Mutex<String>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());
    let captured = Arc::new(Mutex::new(String::new()));
    let sink = captured.clone();

    tokio::spawn(async move {
        if let Ok((mut socket, _)) = listener.accept().await {
            let mut buf = vec![0u8; 16384];
            let mut total = 0;
            // Read until the headers and the declared body have arrived.
            loop {
                let n = socket.read(&mut buf[total..]).await.unwrap_or(0);
                if n == 0 {
                    break;
                }
                total += n;
                let text = String::from_utf8_lossy(&buf[..total]).to_string();
                if let Some(head_end) = text.find("\r\n\r\n") {
                    let length = text[..head_end]
                        .lines()
                        .find_map(|l| l.strip_prefix("content-length: "))
                        .and_then(|v| v.trim().parse::<usize>().ok())
                        .unwrap_or(0);
                    if total >= head_end + 4 + length {
                        break;
                    }
                }
            }
            *sink.lock().await = String::from_utf8_lossy(&buf[..total]).to_string();
            let _ = socket.write_all(response.as_bytes()).await;
        }
    });

    (base_url, captured)
}

#[tokio::test]
async fn test_json_round_trip() {
    let (base_url, captured) = capture_server(
        "HTTP/1.1 200 OK\r\nContent-Type: application/json; charset=utf-8\r\nContent-Length: 11\r\nConnection: close\r\n\r\n{\"ok\":true}",
    )
    .await;

    let client = Client::builder()
        .base_url(&base_url)
        .header("X-Client", "requestly")
        .build()
        .unwrap();
    let response = client
        .post("/items")
        .param("v", "2")
        .json(&serde_json::json!({"name": "x"}))
        .send()
        .await
        .unwrap();

    assert!(response.ok());
    assert_eq!(response.status_text(), "OK");
    assert_eq!(response.data().as_json(), Some(&serde_json::json!({"ok": true})));

    let request = captured.lock().await.clone();
    assert!(request.starts_with("POST /items?v=2 HTTP/1.1"));
    assert!(request.contains("x-client: requestly"));
    assert!(request.contains("content-type: application/json"));
    assert!(request.ends_with("{\"name\":\"x\"}"));
}

#[tokio::test]
async fn test_multipart_upload() {
    let (base_url, captured) = capture_server(
        "HTTP/1.1 201 Created\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
    )
    .await;

    let form = Form::new()
        .text("title", "report")
        .part("file", Part::bytes(b"abc".to_vec()).file_name("a.bin"));
    let boundary = form.boundary().to_string();

    let client = Client::with_base_url(&base_url).unwrap();
    let response = client.post("/upload").multipart(form).send().await.unwrap();
    assert_eq!(response.status().as_u16(), 201);

    let request = captured.lock().await.clone();
    assert!(request.contains(&format!("multipart/form-data; boundary={}", boundary)));
    assert!(request.contains("name=\"file\"; filename=\"a.bin\""));
    assert!(request.contains("report"));
}

#[tokio::test]
async fn test_non_success_status_is_not_an_error() {
    let (base_url, _) = capture_server(
        "HTTP/1.1 404 Nope\r\nContent-Type: text/plain\r\nContent-Length: 7\r\nConnection: close\r\n\r\nmissing",
    )
    .await;

    let client = Client::with_base_url(&base_url).unwrap();
    let response = client.get("/missing").send().await.unwrap();
    assert!(!response.ok());
    assert_eq!(response.status_text(), "Nope");
    assert_eq!(response.data().as_text(), Some("missing"));
}

#[test]
fn test_invalid_base_url() {
    assert!(matches!(
        Client::with_base_url("ftp://example.com"),
        Err(NetError::InvalidUrl(_))
    ));
}

#[test]
fn test_request_builder_defers_header_error() {
    let client = Client::with_base_url("https://example.com").unwrap();
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let result = runtime.block_on(client.get("/").header("bad\nname", "v").send());
    assert!(matches!(result, Err(NetError::InvalidHeader)));
}
