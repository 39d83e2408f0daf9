//! Error context helpers.
//!
//! Extension traits that turn `io::Error` and `hyper::Error` results into
//! `NetError` values carrying the host or domain they concern.

use crate::base::neterror::NetError;
use std::io;

/// Extension trait for adding context to IO Results.
pub trait IoResultExt<T> {
    /// Add connection context to an IO error.
    ///
    /// # Example
    /// ```ignore
    /// use requestly::base::context::IoResultExt;
    ///
    /// let stream = TcpStream::connect(addr).await
    ///     .connection_context("example.com", 443)?;
    /// // Error: "Connection to example.com:443 failed: connection refused"
    /// ```
    fn connection_context(self, host: &str, port: u16) -> Result<T, NetError>;

    /// Add DNS resolution context to an IO error.
    fn dns_context(self, domain: &str) -> Result<T, NetError>;
}

impl<T> IoResultExt<T> for Result<T, io::Error> {
    fn connection_context(self, host: &str, port: u16) -> Result<T, NetError> {
        self.map_err(|e| match e.kind() {
            io::ErrorKind::ConnectionRefused => NetError::ConnectionRefused,
            io::ErrorKind::TimedOut => NetError::ConnectionTimedOut,
            _ => NetError::connection_failed_to(host, port, e),
        })
    }

    fn dns_context(self, domain: &str) -> Result<T, NetError> {
        self.map_err(|e| NetError::dns_failed(domain, e))
    }
}

/// Extension trait mapping hyper failures onto `NetError`.
pub trait HyperResultExt<T> {
    /// Classify a failure that happened while exchanging a request.
    fn exchange_context(self) -> Result<T, NetError>;
}

impl<T> HyperResultExt<T> for Result<T, hyper::Error> {
    fn exchange_context(self) -> Result<T, NetError> {
        self.map_err(|e| {
            tracing::debug!(error = %e, "HTTP exchange failed");
            if e.is_incomplete_message() || e.is_closed() || e.is_canceled() {
                NetError::ConnectionClosed
            } else if e.is_timeout() {
                NetError::ConnectionTimedOut
            } else if e.is_parse() || e.is_parse_status() {
                NetError::InvalidHttpResponse
            } else {
                NetError::ConnectionReset
            }
        })
    }
}
