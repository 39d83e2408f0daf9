//! HTTP client with builder pattern.
//!
//! # Example
//!
//! ```rust,no_run
//! use requestly::Client;
//!
//! # async fn run() -> Result<(), requestly::NetError> {
//! let client = Client::builder()
//!     .base_url("https://httpbin.org")
//!     .header("Accept", "application/json")
//!     .build()?;
//!
//! let resp = client
//!     .post("/anything")
//!     .param("page", "2")
//!     .json(&serde_json::json!({"name": "requestly"}))
//!     .send()
//!     .await?;
//! println!("{} {}", resp.status(), resp.status_text());
//! # Ok(())
//! # }
//! ```

use crate::base::neterror::NetError;
use crate::cookies::cookie::Cookie;
use crate::cookies::jar::{CookieJar, SetCookieOptions};
use crate::cookies::persistence::SerializedCookie;
use crate::http::multipart::Form;
use crate::http::orderedheaders::OrderedHeaderMap;
use crate::http::requestbody::RequestBody;
use crate::http::response::Response;
use crate::http::transaction::{HttpTransport, Transport};
use crate::urlrequest::compose::{create_url, normalize_base_url, QueryParams};
use crate::urlrequest::context::ClientConfig;
use crate::urlrequest::job::URLRequestHttpJob;
use crate::urlrequest::middleware::{OnRequest, OnResponse};
use crate::urlrequest::request::RequestOptions;
use http::Method;
use parking_lot::RwLock;
use serde::Serialize;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use url::Url;

/// HTTP client.
///
/// Cloning is cheap; clones share configuration, cookie jar and transport.
/// Configuration changes only affect calls started afterwards.
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    config: RwLock<Arc<ClientConfig>>,
    cookie_jar: Arc<CookieJar>,
    transport: Arc<dyn Transport>,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("config", &*self.inner.config.read())
            .field("cookies", &self.inner.cookie_jar.len())
            .finish()
    }
}

impl Default for Client {
    fn default() -> Self {
        Self::new()
    }
}

impl Client {
    /// A client without base URL, using the default transport.
    pub fn new() -> Self {
        Self::from_parts(
            ClientConfig::default(),
            Arc::new(CookieJar::new()),
            Arc::new(HttpTransport::new()),
        )
    }

    pub fn with_base_url(base_url: &str) -> Result<Self, NetError> {
        Self::builder().base_url(base_url).build()
    }

    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    fn from_parts(
        config: ClientConfig,
        cookie_jar: Arc<CookieJar>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            inner: Arc::new(ClientInner {
                config: RwLock::new(Arc::new(config)),
                cookie_jar,
                transport,
            }),
        }
    }

    /// Snapshot of the current configuration.
    pub fn config(&self) -> Arc<ClientConfig> {
        Arc::clone(&*self.inner.config.read())
    }

    fn update_config(&self, f: impl FnOnce(&mut ClientConfig)) {
        let mut guard = self.inner.config.write();
        f(Arc::make_mut(&mut *guard));
    }

    pub fn base_url(&self) -> String {
        self.inner.config.read().base_url.clone()
    }

    /// Replace the base URL. An empty string removes it.
    pub fn set_base_url(&self, base_url: &str) -> Result<(), NetError> {
        let normalized = normalize_base_url(base_url)?;
        self.update_config(|c| c.base_url = normalized);
        Ok(())
    }

    pub fn params(&self) -> QueryParams {
        self.inner.config.read().params.clone()
    }

    pub fn set_params(&self, params: QueryParams) {
        self.update_config(|c| c.params = params);
    }

    /// Default header value.
    pub fn header(&self, name: &str) -> Option<String> {
        self.inner
            .config
            .read()
            .headers
            .get_str(name)
            .map(str::to_string)
    }

    pub fn headers(&self) -> OrderedHeaderMap {
        self.inner.config.read().headers.clone()
    }

    pub fn set_header(&self, name: &str, value: &str) -> Result<(), NetError> {
        let mut headers = self.headers();
        headers.insert(name, value)?;
        self.update_config(|c| c.headers = headers);
        Ok(())
    }

    pub fn remove_header(&self, name: &str) {
        self.update_config(|c| c.headers.remove(name));
    }

    /// Add default headers that are not set yet; existing ones are kept.
    pub fn update_headers(&self, headers: &OrderedHeaderMap) {
        self.update_config(|c| {
            for (name, value) in headers.iter() {
                if !c.headers.contains(name.as_str()) {
                    c.headers.insert_typed(name.clone(), value.clone());
                }
            }
        });
    }

    pub fn on_request<H: OnRequest + 'static>(&self, hook: H) {
        let hook: Arc<dyn OnRequest> = Arc::new(hook);
        self.update_config(|c| c.on_request = Some(hook));
    }

    pub fn clear_on_request(&self) {
        self.update_config(|c| c.on_request = None);
    }

    pub fn on_response<H: OnResponse + 'static>(&self, hook: H) {
        let hook: Arc<dyn OnResponse> = Arc::new(hook);
        self.update_config(|c| c.on_response = Some(hook));
    }

    pub fn clear_on_response(&self) {
        self.update_config(|c| c.on_response = None);
    }

    pub fn cookies(&self) -> Cookies {
        Cookies {
            client: self.clone(),
        }
    }

    pub fn get(&self, path: &str) -> RequestBuilder {
        self.request(Method::GET, path)
    }

    pub fn post(&self, path: &str) -> RequestBuilder {
        self.request(Method::POST, path)
    }

    pub fn put(&self, path: &str) -> RequestBuilder {
        self.request(Method::PUT, path)
    }

    pub fn delete(&self, path: &str) -> RequestBuilder {
        self.request(Method::DELETE, path)
    }

    pub fn patch(&self, path: &str) -> RequestBuilder {
        self.request(Method::PATCH, path)
    }

    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        RequestBuilder {
            client: self.clone(),
            method,
            path: path.to_string(),
            options: RequestOptions::default(),
            error: None,
        }
    }

    /// Run one call. `path` is absolute or relative to the base URL.
    pub async fn execute(
        &self,
        method: Method,
        path: &str,
        options: RequestOptions,
    ) -> Result<Response, NetError> {
        let mut job = URLRequestHttpJob::new(
            self.config(),
            Arc::clone(&self.inner.cookie_jar),
            Arc::clone(&self.inner.transport),
            method,
            path,
            options,
        );
        job.start().await
    }

    fn resolve(&self, url: &str) -> Result<Url, NetError> {
        let composed = create_url(url, &self.base_url(), &QueryParams::new())?;
        Url::parse(&composed).map_err(|_| NetError::InvalidUrl(composed))
    }
}

/// Builder for a [`Client`].
#[derive(Default)]
pub struct ClientBuilder {
    config: ClientConfig,
    base_url: Option<String>,
    evict_expired_cookies: bool,
    cookie_jar: Option<Arc<CookieJar>>,
    transport: Option<Arc<dyn Transport>>,
    error: Option<NetError>,
}

impl ClientBuilder {
    pub fn base_url(mut self, base_url: &str) -> Self {
        self.base_url = Some(base_url.to_string());
        self
    }

    pub fn user_agent(mut self, user_agent: &str) -> Self {
        self.config.user_agent = user_agent.to_string();
        self
    }

    /// Add a default header. An invalid header fails [`build`](Self::build).
    pub fn header(mut self, name: &str, value: &str) -> Self {
        if let Err(e) = self.config.headers.insert(name, value) {
            self.error.get_or_insert(e);
        }
        self
    }

    pub fn param(mut self, key: &str, value: &str) -> Self {
        self.config.params.insert(key, value);
        self
    }

    pub fn store_cookies(mut self, enabled: bool) -> Self {
        self.config.store_cookies = enabled;
        self
    }

    pub fn strict_cookie_domains(mut self, enabled: bool) -> Self {
        self.config.strict_cookie_domains = enabled;
        self
    }

    /// Leave expired cookies out of requests. Applies to the jar the
    /// builder creates, not to one passed through [`cookie_jar`](Self::cookie_jar).
    pub fn evict_expired_cookies(mut self, enabled: bool) -> Self {
        self.evict_expired_cookies = enabled;
        self
    }

    pub fn max_redirects(mut self, max: usize) -> Self {
        self.config.max_redirects = max;
        self
    }

    pub fn on_request<H: OnRequest + 'static>(mut self, hook: H) -> Self {
        self.config.on_request = Some(Arc::new(hook));
        self
    }

    pub fn on_response<H: OnResponse + 'static>(mut self, hook: H) -> Self {
        self.config.on_response = Some(Arc::new(hook));
        self
    }

    pub fn cookie_jar(mut self, jar: Arc<CookieJar>) -> Self {
        self.cookie_jar = Some(jar);
        self
    }

    pub fn transport<T: Transport + 'static>(mut self, transport: T) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    pub fn build(mut self) -> Result<Client, NetError> {
        if let Some(e) = self.error {
            return Err(e);
        }
        if let Some(base_url) = &self.base_url {
            self.config.base_url = normalize_base_url(base_url)?;
        }

        let cookie_jar = self.cookie_jar.unwrap_or_else(|| {
            Arc::new(if self.evict_expired_cookies {
                CookieJar::with_expiry_eviction()
            } else {
                CookieJar::new()
            })
        });
        let transport = self
            .transport
            .unwrap_or_else(|| Arc::new(HttpTransport::new()));

        Ok(Client::from_parts(self.config, cookie_jar, transport))
    }
}

/// Builder for a single request.
#[must_use = "a request does nothing until sent"]
pub struct RequestBuilder {
    client: Client,
    method: Method,
    path: String,
    options: RequestOptions,
    error: Option<NetError>,
}

impl RequestBuilder {
    fn fail(&mut self, e: NetError) {
        self.error.get_or_insert(e);
    }

    /// Add a header. An invalid header fails [`send`](Self::send).
    pub fn header(mut self, name: &str, value: &str) -> Self {
        if let Err(e) = self.options.headers.insert(name, value) {
            self.fail(e);
        }
        self
    }

    pub fn headers(mut self, headers: &OrderedHeaderMap) -> Self {
        self.options.headers.extend(headers);
        self
    }

    pub fn param(mut self, key: &str, value: &str) -> Self {
        self.options.params.insert(key, value);
        self
    }

    /// Merge `params`; a `None` value suppresses a client default.
    pub fn params(mut self, params: &QueryParams) -> Self {
        for (key, value) in params.iter() {
            self.options
                .params
                .insert_opt(key, value.map(str::to_string));
        }
        self
    }

    /// Send an extra cookie with this call only.
    pub fn cookie(mut self, key: &str, value: &str) -> Self {
        self.options.cookies.push((key.to_string(), value.to_string()));
        self
    }

    pub fn json<T: Serialize + ?Sized>(mut self, value: &T) -> Self {
        match RequestBody::json(value) {
            Ok(body) => self.options.body = body,
            Err(e) => self.fail(e),
        }
        self
    }

    pub fn body(mut self, body: impl Into<RequestBody>) -> Self {
        self.options.body = body.into();
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.options.body = RequestBody::Text(text.into());
        self
    }

    /// URL-encoded form body.
    pub fn form<I, K, V>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.options.body =
            RequestBody::Form(pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect());
        self
    }

    pub fn multipart(mut self, form: Form) -> Self {
        self.options.body = RequestBody::Multipart(form);
        self
    }

    /// Do not store cookies received during this call.
    pub fn ignore_cookies(mut self, ignore: bool) -> Self {
        self.options.ignore_cookies = ignore;
        self
    }

    /// Abort the call when `token` is cancelled.
    pub fn signal(mut self, token: CancellationToken) -> Self {
        self.options.signal = Some(token);
        self
    }

    pub async fn send(self) -> Result<Response, NetError> {
        if let Some(e) = self.error {
            return Err(e);
        }
        self.client
            .execute(self.method, &self.path, self.options)
            .await
    }
}

/// Cookie operations on a client's jar.
///
/// URLs may be absolute or relative to the client's base URL.
#[derive(Clone)]
pub struct Cookies {
    client: Client,
}

impl Cookies {
    pub fn jar(&self) -> &Arc<CookieJar> {
        &self.client.inner.cookie_jar
    }

    /// Store `cookie` for `url`. A cookie without a domain keeps it unset
    /// and is sent to every host. A foreign domain is dropped, or rejected
    /// when the client uses strict cookie domains.
    pub fn set(&self, url: &str, cookie: Cookie) -> Result<(), NetError> {
        let url = self.client.resolve(url)?;
        let options = SetCookieOptions {
            ignore_error: !self.client.config().strict_cookie_domains,
        };
        self.jar().set_cookie(cookie, &url, options)
    }

    /// Value of the first cookie called `name`, among those sent to `url`
    /// or, without a URL, among all stored cookies.
    pub fn get(&self, name: &str, url: Option<&str>) -> Result<Option<String>, NetError> {
        let candidates = match url {
            Some(url) => self.get_all(url)?,
            None => self.jar().cookies(),
        };
        Ok(candidates
            .into_iter()
            .find(|c| c.key == name)
            .map(|c| c.value))
    }

    pub fn get_all(&self, url: &str) -> Result<Vec<Cookie>, NetError> {
        let url = self.client.resolve(url)?;
        Ok(self.jar().get_cookies(&url))
    }

    pub fn serialize(&self) -> Vec<SerializedCookie> {
        self.jar().serialize()
    }

    /// Replace the jar content with `records`.
    pub fn deserialize(&self, records: Vec<SerializedCookie>) {
        self.jar().replace_all(records);
    }

    pub fn clear(&self) {
        self.jar().clear();
    }
}
