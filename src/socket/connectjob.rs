use crate::base::context::IoResultExt;
use crate::base::neterror::NetError;
use crate::socket::client::SocketType;
use boring::ssl::{SslConnector, SslMethod};
use tokio::net::{lookup_host, TcpStream};
use url::Url;

/// ALPN list: HTTP/1.1 only.
const ALPN_HTTP1: &[u8] = b"\x08http/1.1";

/// Opens a fresh connection for one request: DNS, then TCP, then TLS for
/// `https` URLs. Connections are never reused.
pub struct ConnectJob;

impl ConnectJob {
    pub async fn connect(url: &Url) -> Result<SocketType, NetError> {
        let host = url
            .host_str()
            .ok_or_else(|| NetError::InvalidUrl(url.to_string()))?;
        let port = url
            .port_or_known_default()
            .ok_or_else(|| NetError::InvalidUrl(url.to_string()))?;
        // `[::1]` -> `::1` for the resolver and for SNI.
        let host = host.trim_start_matches('[').trim_end_matches(']');

        let stream = Self::connect_tcp(host, port).await?;

        if url.scheme() == "https" {
            Self::handshake(host, stream).await.map(SocketType::Ssl)
        } else {
            Ok(SocketType::Tcp(stream))
        }
    }

    async fn connect_tcp(host: &str, port: u16) -> Result<TcpStream, NetError> {
        let addrs = lookup_host((host, port)).await.dns_context(host)?;

        let mut last_err = None;
        for addr in addrs {
            match TcpStream::connect(addr).await {
                Ok(stream) => {
                    tracing::debug!(%host, %addr, "TCP connected");
                    return Ok(stream);
                }
                Err(e) => {
                    tracing::debug!(%host, %addr, error = %e, "TCP connect attempt failed");
                    last_err = Some(e);
                }
            }
        }

        match last_err {
            Some(e) => Err::<TcpStream, _>(e).connection_context(host, port),
            None => Err(NetError::NameNotResolved),
        }
    }

    async fn handshake(
        host: &str,
        stream: TcpStream,
    ) -> Result<tokio_boring::SslStream<TcpStream>, NetError> {
        let mut builder =
            SslConnector::builder(SslMethod::tls()).map_err(|_| NetError::SslProtocolError)?;
        builder
            .set_alpn_protos(ALPN_HTTP1)
            .map_err(|_| NetError::SslProtocolError)?;

        let config = builder
            .build()
            .configure()
            .map_err(|_| NetError::SslProtocolError)?;

        tokio_boring::connect(config, host, stream)
            .await
            .map_err(|e| {
                tracing::debug!(%host, error = ?e, "TLS handshake failed");
                NetError::SslProtocolError
            })
    }
}
