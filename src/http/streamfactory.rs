use crate::base::context::HyperResultExt;
use crate::base::neterror::NetError;
use crate::socket::connectjob::ConnectJob;
use bytes::Bytes;
use http::{Request, Response};
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::client::conn::http1;
use hyper_util::rt::TokioIo;
use url::Url;

/// An HTTP/1.1 connection ready to carry one exchange.
pub struct HttpStream {
    sender: http1::SendRequest<Full<Bytes>>,
}

impl HttpStream {
    pub async fn send_request(
        &mut self,
        req: Request<Full<Bytes>>,
    ) -> Result<Response<Incoming>, NetError> {
        self.sender.send_request(req).await.exchange_context()
    }
}

/// Creates [`HttpStream`]s over fresh connections.
#[derive(Debug, Default)]
pub struct HttpStreamFactory;

impl HttpStreamFactory {
    pub fn new() -> Self {
        Self
    }

    pub async fn create_stream(&self, url: &Url) -> Result<HttpStream, NetError> {
        let socket = ConnectJob::connect(url).await?;
        let io = TokioIo::new(socket);

        let (sender, conn) = http1::handshake(io).await.exchange_context()?;

        let origin = url.origin().ascii_serialization();
        tokio::spawn(async move {
            if let Err(e) = conn.await {
                tracing::debug!(%origin, error = %e, "HTTP/1.1 connection ended with error");
            }
        });

        Ok(HttpStream { sender })
    }
}
