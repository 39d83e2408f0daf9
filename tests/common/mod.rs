#![allow(dead_code)]

use parking_lot::Mutex;
use requestly::base::neterror::NetError;
use requestly::http::transaction::{Performing, Transport, TransportRequest, TransportResponse};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

type Route = dyn Fn(&Url, &TransportRequest) -> Result<TransportResponse, NetError> + Send + Sync;

/// In-process transport: answers through a routing closure and records
/// every request it receives.
#[derive(Clone)]
pub struct MockTransport {
    route: Arc<Route>,
    seen: Arc<Mutex<Vec<(Url, TransportRequest)>>>,
    delay: Option<Duration>,
}

impl MockTransport {
    pub fn new<F>(route: F) -> Self
    where
        F: Fn(&Url, &TransportRequest) -> Result<TransportResponse, NetError> + Send + Sync + 'static,
    {
        Self {
            route: Arc::new(route),
            seen: Arc::new(Mutex::new(Vec::new())),
            delay: None,
        }
    }

    /// Answer every request with 200 and a JSON echo of method, URL and headers.
    pub fn echo() -> Self {
        Self::new(|url, req| {
            let headers: serde_json::Map<String, serde_json::Value> = req
                .headers
                .iter()
                .map(|(k, v)| {
                    (
                        k.as_str().to_string(),
                        serde_json::Value::String(v.to_str().unwrap_or("").to_string()),
                    )
                })
                .collect();
            let body = serde_json::json!({
                "method": req.method.as_str(),
                "url": url.as_str(),
                "headers": headers,
                "body": req.body.as_ref().map(|b| String::from_utf8_lossy(b).to_string()),
            });
            Ok(TransportResponse::new(url.clone(), http::StatusCode::OK)
                .with_header("Content-Type", "application/json")
                .with_body(body.to_string()))
        })
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn requests(&self) -> Vec<(Url, TransportRequest)> {
        self.seen.lock().clone()
    }

    pub fn request_count(&self) -> usize {
        self.seen.lock().len()
    }
}

impl Transport for MockTransport {
    fn perform(&self, url: &Url, request: TransportRequest) -> Performing {
        let result = (self.route)(url, &request);
        self.seen.lock().push((url.clone(), request));
        let delay = self.delay;
        Box::pin(async move {
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            result
        })
    }
}

pub fn redirect(url: &Url, status: u16, location: &str) -> TransportResponse {
    TransportResponse::new(url.clone(), http::StatusCode::from_u16(status).unwrap())
        .with_header("Location", location)
}

pub fn ok_text(url: &Url, body: &str) -> TransportResponse {
    TransportResponse::new(url.clone(), http::StatusCode::OK)
        .with_header("Content-Type", "text/plain")
        .with_body(body.to_string())
}
