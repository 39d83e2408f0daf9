//! Request and response hooks.
//!
//! Any `Fn(Url, RequestInit) -> impl Future` closure is an [`OnRequest`]
//! hook, and any `Fn(Url, RequestInit, Response) -> impl Future` closure is
//! an [`OnResponse`] hook:
//!
//! ```
//! use requestly::urlrequest::middleware::{RequestPatch, ResponseOverride};
//! use requestly::urlrequest::request::RequestInit;
//! use requestly::http::response::Response;
//! use requestly::base::neterror::BoxError;
//! use url::Url;
//!
//! let client = requestly::Client::builder()
//!     .on_request(|_url: Url, _init: RequestInit| async move {
//!         let mut patch = RequestPatch::default();
//!         patch.headers.insert("X-Trace", "1")?;
//!         Ok::<_, BoxError>(Some(patch))
//!     })
//!     .on_response(|_url: Url, _init: RequestInit, resp: Response| async move {
//!         Ok::<_, BoxError>((!resp.ok()).then(|| ResponseOverride::Data("failed".into())))
//!     })
//!     .build();
//! ```

use crate::base::neterror::BoxError;
use crate::http::orderedheaders::OrderedHeaderMap;
use crate::http::response::Response;
use crate::http::responsebody::ResponseData;
use crate::urlrequest::request::RequestInit;
use bytes::Bytes;
use futures::future::BoxFuture;
use http::Method;
use std::future::Future;
use url::Url;

pub type HookFuture<T> = BoxFuture<'static, Result<T, BoxError>>;

/// Partial request returned by an [`OnRequest`] hook.
#[derive(Debug, Clone, Default)]
pub struct RequestPatch {
    pub method: Option<Method>,
    /// Merged over the built headers key by key.
    pub headers: OrderedHeaderMap,
    /// `Some(None)` removes the body.
    pub body: Option<Option<Bytes>>,
}

/// Replacement returned by an [`OnResponse`] hook.
#[derive(Debug, Clone)]
pub enum ResponseOverride {
    /// Returned as-is.
    Response(Response),
    /// Replaces only the decoded data of the original response.
    Data(ResponseData),
}

impl From<Response> for ResponseOverride {
    fn from(response: Response) -> Self {
        ResponseOverride::Response(response)
    }
}

impl From<ResponseData> for ResponseOverride {
    fn from(data: ResponseData) -> Self {
        ResponseOverride::Data(data)
    }
}

/// Called before every dispatched hop with the hop URL and built request.
pub trait OnRequest: Send + Sync {
    fn on_request(&self, url: &Url, init: &RequestInit) -> HookFuture<Option<RequestPatch>>;
}

/// Called once with the final response of a call.
pub trait OnResponse: Send + Sync {
    fn on_response(
        &self,
        url: &Url,
        init: &RequestInit,
        response: &Response,
    ) -> HookFuture<Option<ResponseOverride>>;
}

impl<F, Fut> OnRequest for F
where
    F: Fn(Url, RequestInit) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Option<RequestPatch>, BoxError>> + Send + 'static,
{
    fn on_request(&self, url: &Url, init: &RequestInit) -> HookFuture<Option<RequestPatch>> {
        Box::pin(self(url.clone(), init.clone()))
    }
}

impl<F, Fut> OnResponse for F
where
    F: Fn(Url, RequestInit, Response) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Option<ResponseOverride>, BoxError>> + Send + 'static,
{
    fn on_response(
        &self,
        url: &Url,
        init: &RequestInit,
        response: &Response,
    ) -> HookFuture<Option<ResponseOverride>> {
        Box::pin(self(url.clone(), init.clone(), response.clone()))
    }
}
