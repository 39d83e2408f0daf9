/// The current state of a request pipeline.
///
/// One logical call moves through
/// `Building -> SendingRequest -> WaitingForResponse -> (Redirecting -> Building)* -> ReadingResponse -> Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadState {
    /// The request is idle (not started, or finished).
    #[default]
    Idle,

    /// Composing the URL, headers and body for the next hop.
    Building,

    /// Connecting to the host (TCP and TLS handshake).
    Connecting,

    /// Sending the HTTP request.
    SendingRequest,

    /// Waiting for the server response (TTFB).
    WaitingForResponse,

    /// Following a `Location` header to the next hop.
    Redirecting,

    /// Reading and decoding the response body.
    ReadingResponse,
}
