use crate::base::loadstate::LoadState;
use crate::base::neterror::NetError;
use crate::http::streamfactory::{HttpStream, HttpStreamFactory};
use bytes::Bytes;
use futures::future::BoxFuture;
use http::header::{HeaderName, HeaderValue, HOST};
use http::{HeaderMap, Method, Request, Response, StatusCode};
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use std::sync::Arc;
use url::Url;

/// Future returned by [`Transport::perform`].
pub type Performing = BoxFuture<'static, Result<TransportResponse, NetError>>;

/// The network collaborator: performs exactly one HTTP exchange.
///
/// Implementations must not follow redirects; a 3xx comes back as-is.
pub trait Transport: Send + Sync {
    fn perform(&self, url: &Url, request: TransportRequest) -> Performing;
}

/// One outgoing exchange.
#[derive(Debug, Clone)]
pub struct TransportRequest {
    pub method: Method,
    pub headers: HeaderMap,
    pub body: Option<Bytes>,
}

/// A fully read response.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub url: Url,
    pub status: StatusCode,
    /// Reason phrase as sent by the server, when it differs from the
    /// canonical one.
    pub status_text: Option<String>,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TransportResponse {
    pub fn new(url: Url, status: StatusCode) -> Self {
        Self {
            url,
            status,
            status_text: None,
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }

    /// Append a header. Invalid names or values are ignored.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            self.headers.append(name, value);
        }
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Idle,
    CreateStream,
    SendRequest,
    ReadBody,
    Done,
}

impl State {
    fn to_load_state(self) -> LoadState {
        match self {
            State::Idle | State::Done => LoadState::Idle,
            State::CreateStream => LoadState::Connecting,
            State::SendRequest => LoadState::SendingRequest,
            State::ReadBody => LoadState::ReadingResponse,
        }
    }
}

/// Drives one request over a fresh HTTP/1.1 connection.
pub struct HttpNetworkTransaction {
    factory: Arc<HttpStreamFactory>,
    url: Url,
    request: Option<TransportRequest>,
    state: State,
    stream: Option<HttpStream>,
    pending: Option<Response<Incoming>>,
    response: Option<TransportResponse>,
}

impl HttpNetworkTransaction {
    pub fn new(factory: Arc<HttpStreamFactory>, url: Url, request: TransportRequest) -> Self {
        Self {
            factory,
            url,
            request: Some(request),
            state: State::Idle,
            stream: None,
            pending: None,
            response: None,
        }
    }

    pub fn get_load_state(&self) -> LoadState {
        self.state.to_load_state()
    }

    pub async fn start(&mut self) -> Result<(), NetError> {
        self.state = State::CreateStream;
        loop {
            match self.state {
                State::Idle | State::Done => return Ok(()),
                State::CreateStream => {
                    self.stream = Some(self.factory.create_stream(&self.url).await?);
                    self.state = State::SendRequest;
                }
                State::SendRequest => {
                    let req = self.build_request()?;
                    let stream = self.stream.as_mut().ok_or(NetError::ConnectionClosed)?;
                    self.pending = Some(stream.send_request(req).await?);
                    self.state = State::ReadBody;
                }
                State::ReadBody => {
                    let resp = self.pending.take().ok_or(NetError::EmptyResponse)?;
                    self.response = Some(self.read_response(resp).await?);
                    self.stream = None;
                    self.state = State::Done;
                }
            }
        }
    }

    fn build_request(&mut self) -> Result<Request<Full<Bytes>>, NetError> {
        let TransportRequest {
            method,
            mut headers,
            body,
        } = self.request.take().ok_or(NetError::ConnectionClosed)?;

        if !headers.contains_key(HOST) {
            let host = self
                .url
                .host_str()
                .ok_or_else(|| NetError::InvalidUrl(self.url.to_string()))?;
            let host = match self.url.port() {
                Some(port) => format!("{}:{}", host, port),
                None => host.to_string(),
            };
            let value = HeaderValue::from_str(&host).map_err(|_| NetError::InvalidHeader)?;
            headers.insert(HOST, value);
        }

        // HTTP/1.1 wants origin-form: path plus query.
        let target = match self.url.query() {
            Some(query) => format!("{}?{}", self.url.path(), query),
            None => self.url.path().to_string(),
        };

        let mut req = Request::builder()
            .method(method)
            .uri(target)
            .body(Full::new(body.unwrap_or_default()))
            .map_err(|_| NetError::InvalidUrl(self.url.to_string()))?;
        *req.headers_mut() = headers;
        Ok(req)
    }

    async fn read_response(&self, resp: Response<Incoming>) -> Result<TransportResponse, NetError> {
        let (parts, body) = resp.into_parts();
        let status_text = parts
            .extensions
            .get::<hyper::ext::ReasonPhrase>()
            .and_then(|r| std::str::from_utf8(r.as_bytes()).ok())
            .map(str::to_string);

        let body = body
            .collect()
            .await
            .map_err(|e| {
                tracing::debug!(url = %self.url, error = %e, "Failed to read response body");
                NetError::HttpBodyError
            })?
            .to_bytes();

        Ok(TransportResponse {
            url: self.url.clone(),
            status: parts.status,
            status_text,
            headers: parts.headers,
            body,
        })
    }

    pub fn take_response(&mut self) -> Option<TransportResponse> {
        self.response.take()
    }
}

/// Default [`Transport`]: HTTP/1.1 over TCP or BoringSSL, one connection
/// per exchange.
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    factory: Arc<HttpStreamFactory>,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Transport for HttpTransport {
    fn perform(&self, url: &Url, request: TransportRequest) -> Performing {
        let factory = Arc::clone(&self.factory);
        let url = url.clone();
        Box::pin(async move {
            let mut transaction = HttpNetworkTransaction::new(factory, url, request);
            transaction.start().await?;
            transaction.take_response().ok_or(NetError::EmptyResponse)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    async fn serve_once(reply: &'static str) -> (u16, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 4096];
            let mut received = Vec::new();
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                received.extend_from_slice(&buf[..n]);
                if n == 0 || received.windows(4).any(|w| w == b"\r\n\r\n") {
                    break;
                }
            }
            socket.write_all(reply.as_bytes()).await.unwrap();
            String::from_utf8_lossy(&received).into_owned()
        });
        (port, handle)
    }

    #[test]
    fn test_load_state_mapping() {
        assert_eq!(State::CreateStream.to_load_state(), LoadState::Connecting);
        assert_eq!(State::SendRequest.to_load_state(), LoadState::SendingRequest);
        assert_eq!(State::ReadBody.to_load_state(), LoadState::ReadingResponse);
        assert_eq!(State::Done.to_load_state(), LoadState::Idle);
    }

    #[test]
    fn test_transport_response_builder() {
        let url = Url::parse("http://example.com/").unwrap();
        let resp = TransportResponse::new(url, StatusCode::OK)
            .with_header("Set-Cookie", "a=1")
            .with_header("Set-Cookie", "b=2")
            .with_body("hi");
        assert_eq!(resp.headers.get_all("set-cookie").iter().count(), 2);
        assert_eq!(&resp.body[..], b"hi");
    }

    #[tokio::test]
    async fn test_exchange_over_tcp() {
        let (port, server) = serve_once(
            "HTTP/1.1 201 Made It\r\nContent-Length: 5\r\nConnection: close\r\n\r\nhello",
        )
        .await;

        let url = Url::parse(&format!("http://127.0.0.1:{}/path?q=1", port)).unwrap();
        let response = HttpTransport::new()
            .perform(
                &url,
                TransportRequest {
                    method: Method::GET,
                    headers: HeaderMap::new(),
                    body: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(response.status, StatusCode::CREATED);
        assert_eq!(response.status_text.as_deref(), Some("Made It"));
        assert_eq!(&response.body[..], b"hello");

        let request = server.await.unwrap();
        assert!(request.starts_with("GET /path?q=1 HTTP/1.1\r\n"));
        assert!(request.contains(&format!("host: 127.0.0.1:{}", port)));
    }
}
