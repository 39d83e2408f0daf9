use std::io;
use thiserror::Error;

/// Boxed error returned by user-supplied middleware hooks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum NetError {
    // Connection Errors
    #[error("Request aborted")]
    Aborted,
    #[error("Connection closed (TCP FIN)")]
    ConnectionClosed,
    #[error("Connection reset (TCP RST)")]
    ConnectionReset,
    #[error("Connection refused")]
    ConnectionRefused,
    #[error("Connection to {host}:{port} failed: {source}")]
    ConnectionFailedTo {
        host: String,
        port: u16,
        #[source]
        source: io::Error,
    },
    #[error("Name not resolved")]
    NameNotResolved,
    #[error("Failed to resolve {domain}: {source}")]
    NameNotResolvedFor {
        domain: String,
        #[source]
        source: io::Error,
    },
    #[error("Connection timed out")]
    ConnectionTimedOut,
    #[error("SSL protocol error")]
    SslProtocolError,

    // URL / Redirect Errors
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    #[error("Cannot make request with relative URL {0:?} without a base URL")]
    MissingBaseUrl(String),
    #[error("Invalid redirect to {0:?}")]
    InvalidRedirect(String),
    #[error("Too many redirects (limit {limit}), last location: {location}")]
    TooManyRedirects { limit: usize, location: String },

    // HTTP Errors
    #[error("Invalid header")]
    InvalidHeader,
    #[error("Invalid HTTP response")]
    InvalidHttpResponse,
    #[error("Empty response")]
    EmptyResponse,
    #[error("Failed to read response body")]
    HttpBodyError,
    #[error("Failed to encode JSON body: {0}")]
    JsonEncodeError(String),
    #[error("Failed to parse JSON body: {0}")]
    JsonParseError(String),

    // Cookie Errors
    #[error("Cookie domain {domain:?} does not match host {host:?}")]
    CookieDomainMismatch { domain: String, host: String },

    // Hook Errors
    #[error("Middleware hook failed: {0}")]
    Middleware(#[source] BoxError),
}

impl NetError {
    /// Build a connection failure carrying the target and the IO cause.
    pub fn connection_failed_to(host: impl Into<String>, port: u16, source: io::Error) -> Self {
        NetError::ConnectionFailedTo {
            host: host.into(),
            port,
            source,
        }
    }

    /// Build a DNS failure carrying the domain and the IO cause.
    pub fn dns_failed(domain: impl Into<String>, source: io::Error) -> Self {
        NetError::NameNotResolvedFor {
            domain: domain.into(),
            source,
        }
    }

    /// Whether this error came from the network collaborator rather than
    /// from URL composition, redirect policy, cookies or hooks.
    pub fn is_transport_failure(&self) -> bool {
        matches!(
            self,
            NetError::ConnectionClosed
                | NetError::ConnectionReset
                | NetError::ConnectionRefused
                | NetError::ConnectionFailedTo { .. }
                | NetError::NameNotResolved
                | NetError::NameNotResolvedFor { .. }
                | NetError::ConnectionTimedOut
                | NetError::SslProtocolError
                | NetError::InvalidHttpResponse
                | NetError::EmptyResponse
                | NetError::HttpBodyError
        )
    }

    pub fn as_i32(&self) -> i32 {
        match self {
            NetError::Aborted => -3,
            NetError::ConnectionClosed => -100,
            NetError::ConnectionReset => -101,
            NetError::ConnectionRefused => -102,
            NetError::ConnectionFailedTo { .. } => -104,
            NetError::NameNotResolved => -105,
            NetError::NameNotResolvedFor { .. } => -105,
            NetError::SslProtocolError => -107,
            NetError::ConnectionTimedOut => -118,

            NetError::InvalidUrl(_) => -300,
            NetError::InvalidRedirect(_) => -303,
            NetError::TooManyRedirects { .. } => -310,
            NetError::EmptyResponse => -324,
            NetError::InvalidHttpResponse => -370,

            // Custom codes, kept clear of Chromium's reserved ranges.
            NetError::MissingBaseUrl(_) => -10001,
            NetError::CookieDomainMismatch { .. } => -10002,
            NetError::Middleware(_) => -10003,
            NetError::HttpBodyError => -10004,
            NetError::JsonEncodeError(_) => -10005,
            NetError::JsonParseError(_) => -10006,
            NetError::InvalidHeader => -10007,
        }
    }
}
