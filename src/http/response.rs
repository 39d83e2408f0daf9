//! The response descriptor returned by a call.

use crate::base::neterror::NetError;
use crate::http::responsebody::{ResponseBody, ResponseData};
use crate::urlrequest::job::URLRequestHttpJob;
use crate::urlrequest::request::RequestInfo;
use http::{HeaderMap, StatusCode};
use std::collections::HashMap;
use url::Url;

/// Final outcome of a call, after redirects and hooks.
///
/// Cloning is cheap enough for hooks: the body is reference counted.
#[derive(Debug, Clone)]
pub struct Response {
    url: Url,
    status: StatusCode,
    status_text: String,
    headers: HeaderMap,
    redirected: bool,
    cookies: HashMap<String, String>,
    body: ResponseBody,
    data: ResponseData,
    request: RequestInfo,
    replay: URLRequestHttpJob,
}

pub(crate) struct ResponseParts {
    pub url: Url,
    pub status: StatusCode,
    pub status_text: String,
    pub headers: HeaderMap,
    pub redirected: bool,
    pub cookies: HashMap<String, String>,
    pub body: ResponseBody,
    pub data: ResponseData,
    pub request: RequestInfo,
    pub replay: URLRequestHttpJob,
}

impl Response {
    pub(crate) fn from_parts(parts: ResponseParts) -> Self {
        Self {
            url: parts.url,
            status: parts.status,
            status_text: parts.status_text,
            headers: parts.headers,
            redirected: parts.redirected,
            cookies: parts.cookies,
            body: parts.body,
            data: parts.data,
            request: parts.request,
            replay: parts.replay,
        }
    }

    /// URL of the last hop.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// `true` for a 2xx status.
    pub fn ok(&self) -> bool {
        self.status.is_success()
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Reason phrase sent by the server, or the canonical one.
    pub fn status_text(&self) -> &str {
        &self.status_text
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn redirected(&self) -> bool {
        self.redirected
    }

    /// Cookies received through `Set-Cookie` during this call, across all hops.
    pub fn cookies(&self) -> &HashMap<String, String> {
        &self.cookies
    }

    pub fn body(&self) -> &ResponseBody {
        &self.body
    }

    pub fn data(&self) -> &ResponseData {
        &self.data
    }

    pub fn into_data(self) -> ResponseData {
        self.data
    }

    /// Deserialize the decoded data.
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T, NetError> {
        self.data.json()
    }

    pub fn request(&self) -> &RequestInfo {
        &self.request
    }

    /// Same response with `data` replaced.
    pub fn with_data(mut self, data: impl Into<ResponseData>) -> Self {
        self.data = data.into();
        self
    }

    /// Issue the original request again: original method, path, options and
    /// body, with the configuration the first attempt saw and a fresh
    /// redirect count.
    pub async fn retry(&self) -> Result<Response, NetError> {
        let mut job = self.replay.clone();
        job.start().await
    }
}
