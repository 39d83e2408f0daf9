use crate::http::orderedheaders::OrderedHeaderMap;
use crate::http::requestbody::RequestBody;
use crate::urlrequest::compose::QueryParams;
use crate::urlrequest::middleware::RequestPatch;
use bytes::Bytes;
use http::Method;
use tokio_util::sync::CancellationToken;

/// Per-call arguments of a request.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Explicit headers; they override every other header source.
    pub headers: OrderedHeaderMap,
    /// Call-level query parameters, layered over the client defaults.
    pub params: QueryParams,
    /// Extra `Cookie` pairs sent after the jar's cookies.
    pub cookies: Vec<(String, String)>,
    pub body: RequestBody,
    /// Keep `Set-Cookie` cookies of this call out of the jar. They still
    /// show up in `Response::cookies`.
    pub ignore_cookies: bool,
    /// Cancelling the token aborts the call at its next suspension point.
    pub signal: Option<CancellationToken>,
}

/// The request as handed to the transport for one hop.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestInit {
    pub method: Method,
    pub headers: OrderedHeaderMap,
    pub body: Option<Bytes>,
}

impl RequestInit {
    /// Merge a middleware patch: headers key by key, method and body replaced.
    pub fn apply(&mut self, patch: RequestPatch) {
        if let Some(method) = patch.method {
            self.method = method;
        }
        self.headers.extend(&patch.headers);
        if let Some(body) = patch.body {
            self.body = body;
        }
    }
}

/// What a response remembers about the call that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestInfo {
    /// The path (or URL) as passed by the caller.
    pub url: String,
    pub method: Method,
    /// The last request sent, after middleware.
    pub init: RequestInit,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_patch() {
        let mut headers = OrderedHeaderMap::new();
        headers.insert("Accept", "*/*").unwrap();
        headers.insert("X-Keep", "1").unwrap();
        let mut init = RequestInit {
            method: Method::POST,
            headers,
            body: Some(Bytes::from_static(b"old")),
        };

        let mut patch = RequestPatch::default();
        patch.headers.insert("accept", "application/json").unwrap();
        patch.body = Some(None);
        init.apply(patch);

        assert_eq!(init.method, Method::POST);
        assert_eq!(init.headers.get_str("Accept"), Some("application/json"));
        assert_eq!(init.headers.get_str("X-Keep"), Some("1"));
        assert_eq!(init.body, None);
    }

    #[test]
    fn test_empty_patch_is_noop() {
        let init = RequestInit {
            method: Method::GET,
            headers: OrderedHeaderMap::new(),
            body: None,
        };
        let mut patched = init.clone();
        patched.apply(RequestPatch::default());
        assert_eq!(patched, init);
    }
}
