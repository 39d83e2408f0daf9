use crate::base::loadstate::LoadState;
use crate::base::neterror::NetError;
use crate::cookies::cookie::Cookie;
use crate::cookies::jar::{CookieJar, SetCookieOptions};
use crate::cookies::parser::split_set_cookie_headers;
use crate::http::orderedheaders::OrderedHeaderMap;
use crate::http::response::{Response, ResponseParts};
use crate::http::responsebody::ResponseBody;
use crate::http::transaction::{Transport, TransportRequest, TransportResponse};
use crate::urlrequest::compose::create_url;
use crate::urlrequest::context::ClientConfig;
use crate::urlrequest::middleware::ResponseOverride;
use crate::urlrequest::request::{RequestInfo, RequestInit, RequestOptions};
use http::header::{CONTENT_TYPE, LOCATION, SET_COOKIE};
use http::{HeaderMap, Method, StatusCode};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use url::Url;

/// One logical call: compose the URL, dispatch, follow redirects, capture
/// cookies and run the hooks.
///
/// A job keeps its original arguments, so starting a clone replays the
/// call from scratch. That is how [`Response::retry`] works.
#[derive(Clone)]
pub struct URLRequestHttpJob {
    config: Arc<ClientConfig>,
    jar: Arc<CookieJar>,
    transport: Arc<dyn Transport>,
    method: Method,
    path: String,
    options: RequestOptions,
    state: LoadState,
}

impl fmt::Debug for URLRequestHttpJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("URLRequestHttpJob")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

/// Hop outcome that needs another dispatch.
struct Redirect {
    status: StatusCode,
    location: String,
}

impl URLRequestHttpJob {
    pub fn new(
        config: Arc<ClientConfig>,
        jar: Arc<CookieJar>,
        transport: Arc<dyn Transport>,
        method: Method,
        path: impl Into<String>,
        options: RequestOptions,
    ) -> Self {
        Self {
            config,
            jar,
            transport,
            method,
            path: path.into(),
            options,
            state: LoadState::Idle,
        }
    }

    pub fn load_state(&self) -> LoadState {
        self.state
    }

    fn set_state(&mut self, state: LoadState) {
        if self.state != state {
            tracing::trace!(from = ?self.state, to = ?state, path = %self.path, "Load state");
            self.state = state;
        }
    }

    pub async fn start(&mut self) -> Result<Response, NetError> {
        let result = self.run().await;
        self.set_state(LoadState::Idle);
        result
    }

    async fn run(&mut self) -> Result<Response, NetError> {
        self.set_state(LoadState::Building);
        let config = Arc::clone(&self.config);

        if config.base_url.is_empty() && self.path.starts_with('/') {
            return Err(NetError::MissingBaseUrl(self.path.clone()));
        }

        let params = self.options.params.merged_over(&config.params);
        let composed = create_url(&self.path, &config.base_url, &params)?;
        let composed_url =
            Url::parse(&composed).map_err(|_| NetError::InvalidUrl(composed.clone()))?;
        let mut url = composed_url.clone();

        let encoded = self.options.body.encode()?;
        let mut method = self.method.clone();
        let mut content_type = encoded.as_ref().and_then(|e| e.content_type.clone());
        let mut body = encoded.map(|e| e.bytes);

        let mut received_cookies = HashMap::new();
        let mut redirects = 0usize;

        loop {
            self.check_cancelled()?;

            let mut init = RequestInit {
                method: method.clone(),
                headers: self.build_headers(&config, &url, content_type.as_deref())?,
                body: body.clone(),
            };

            if let Some(hook) = &config.on_request {
                let patch = hook
                    .on_request(&url, &init)
                    .await
                    .map_err(NetError::Middleware)?;
                if let Some(patch) = patch {
                    init.apply(patch);
                }
                self.check_cancelled()?;
            }

            self.set_state(LoadState::SendingRequest);
            tracing::debug!(method = %init.method, url = %url, redirects, "Dispatching request");

            let request = TransportRequest {
                method: init.method.clone(),
                headers: init.headers.to_header_map(),
                body: init.body.clone(),
            };
            self.set_state(LoadState::WaitingForResponse);
            let response = self.dispatch(&url, request).await?;

            self.capture_cookies(&config, &url, &response.headers, &mut received_cookies);

            let Some(redirect) = redirect_target(&response) else {
                self.set_state(LoadState::ReadingResponse);
                let response = self.finalize(response, init, redirects > 0, received_cookies)?;
                return self.run_on_response(&config, &composed_url, response).await;
            };

            if redirects >= config.max_redirects {
                return Err(NetError::TooManyRedirects {
                    limit: config.max_redirects,
                    location: redirect.location,
                });
            }

            let next = url
                .join(&redirect.location)
                .ok()
                .filter(|next| matches!(next.scheme(), "http" | "https"))
                .ok_or_else(|| NetError::InvalidRedirect(redirect.location.clone()))?;

            self.set_state(LoadState::Redirecting);
            tracing::debug!(
                status = redirect.status.as_u16(),
                from = %url,
                to = %next,
                "Following redirect"
            );

            if redirect.status == StatusCode::SEE_OTHER {
                method = Method::GET;
                body = None;
                content_type = None;
            }
            url = next;
            redirects += 1;
        }
    }

    fn check_cancelled(&self) -> Result<(), NetError> {
        match &self.options.signal {
            Some(token) if token.is_cancelled() => {
                tracing::debug!(path = %self.path, "Request aborted");
                Err(NetError::Aborted)
            }
            _ => Ok(()),
        }
    }

    async fn dispatch(
        &self,
        url: &Url,
        request: TransportRequest,
    ) -> Result<TransportResponse, NetError> {
        let performing = self.transport.perform(url, request);
        match &self.options.signal {
            Some(token) => {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => {
                        tracing::debug!(url = %url, "Request aborted in flight");
                        Err(NetError::Aborted)
                    }
                    result = performing => result,
                }
            }
            None => performing.await,
        }
    }

    /// Defaults < jar cookies < body content type < explicit headers.
    fn build_headers(
        &self,
        config: &ClientConfig,
        url: &Url,
        content_type: Option<&str>,
    ) -> Result<OrderedHeaderMap, NetError> {
        let mut defaults = OrderedHeaderMap::new();
        if !config.user_agent.is_empty() {
            defaults.insert("User-Agent", &config.user_agent)?;
        }
        defaults.extend(&config.headers);

        let mut cookies = OrderedHeaderMap::new();
        let cookie_header = self.cookie_header(url);
        if !cookie_header.is_empty() {
            cookies.insert("Cookie", &cookie_header)?;
        }

        let mut computed = OrderedHeaderMap::new();
        if let Some(content_type) = content_type {
            computed.insert("Content-Type", content_type)?;
        }

        Ok(OrderedHeaderMap::merge([
            &defaults,
            &cookies,
            &computed,
            &self.options.headers,
        ]))
    }

    /// Jar cookies for `url`, then per-call cookies; a per-call cookie
    /// replaces a jar cookie of the same name.
    fn cookie_header(&self, url: &Url) -> String {
        let mut pairs: Vec<(String, String)> = self
            .jar
            .get_cookies(url)
            .into_iter()
            .map(|c| (c.key, c.value))
            .collect();

        for (key, value) in &self.options.cookies {
            match pairs.iter_mut().find(|(k, _)| k == key) {
                Some((_, v)) => v.clone_from(value),
                None => pairs.push((key.clone(), value.clone())),
            }
        }

        pairs
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("; ")
    }

    fn capture_cookies(
        &self,
        config: &ClientConfig,
        url: &Url,
        headers: &HeaderMap,
        received: &mut HashMap<String, String>,
    ) {
        let values = headers.get_all(SET_COOKIE).iter().filter_map(|v| {
            let decoded = std::str::from_utf8(v.as_bytes()).ok();
            if decoded.is_none() {
                tracing::debug!(url = %url, "Skipping Set-Cookie that is not UTF-8");
            }
            decoded
        });

        for raw in split_set_cookie_headers(values) {
            let Some(cookie) = Cookie::parse(&raw) else {
                tracing::trace!(url = %url, "Skipping malformed Set-Cookie");
                continue;
            };
            tracing::trace!(url = %url, cookie = %cookie.key, "Received cookie");
            received.insert(cookie.key.clone(), cookie.value.clone());

            if config.store_cookies && !self.options.ignore_cookies {
                // ignore_error turns a domain mismatch into a silent drop.
                let _ = self
                    .jar
                    .set_cookie(cookie, url, SetCookieOptions { ignore_error: true });
            }
        }
    }

    fn finalize(
        &self,
        response: TransportResponse,
        init: RequestInit,
        redirected: bool,
        cookies: HashMap<String, String>,
    ) -> Result<Response, NetError> {
        let content_type = response
            .headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok());
        let body = ResponseBody::new(response.body);
        let data = body.decode(content_type)?;

        let status_text = response
            .status_text
            .unwrap_or_else(|| response.status.canonical_reason().unwrap_or("").to_string());

        let mut replay = self.clone();
        replay.state = LoadState::Idle;

        Ok(Response::from_parts(ResponseParts {
            url: response.url,
            status: response.status,
            status_text,
            headers: response.headers,
            redirected,
            cookies,
            body,
            data,
            request: RequestInfo {
                url: self.path.clone(),
                method: self.method.clone(),
                init,
            },
            replay,
        }))
    }

    async fn run_on_response(
        &self,
        config: &ClientConfig,
        url: &Url,
        response: Response,
    ) -> Result<Response, NetError> {
        let Some(hook) = &config.on_response else {
            return Ok(response);
        };

        let replacement = hook
            .on_response(url, &response.request().init, &response)
            .await
            .map_err(NetError::Middleware)?;

        Ok(match replacement {
            Some(ResponseOverride::Response(replaced)) => replaced,
            Some(ResponseOverride::Data(data)) => response.with_data(data),
            None => response,
        })
    }
}

/// The `Location` of a redirect response, if it is one we follow.
fn redirect_target(response: &TransportResponse) -> Option<Redirect> {
    let status = response.status;
    if !matches!(status.as_u16(), 301 | 302 | 303 | 307 | 308) {
        return None;
    }
    let location = response.headers.get(LOCATION)?.to_str().ok()?;
    Some(Redirect {
        status,
        location: location.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::transaction::Performing;
    use parking_lot::Mutex;

    /// Answers every request with a fixed status and records what it saw.
    struct FixedTransport {
        status: StatusCode,
        seen: Mutex<Vec<(Url, TransportRequest)>>,
    }

    impl Transport for FixedTransport {
        fn perform(&self, url: &Url, request: TransportRequest) -> Performing {
            self.seen.lock().push((url.clone(), request));
            let response = TransportResponse::new(url.clone(), self.status)
                .with_header("Content-Type", "text/plain")
                .with_body("done");
            Box::pin(async move { Ok(response) })
        }
    }

    fn make_job(
        transport: Arc<FixedTransport>,
        path: &str,
        options: RequestOptions,
    ) -> URLRequestHttpJob {
        let config = ClientConfig {
            base_url: "https://api.example.com".to_string(),
            ..ClientConfig::default()
        };
        URLRequestHttpJob::new(
            Arc::new(config),
            Arc::new(CookieJar::new()),
            transport,
            Method::GET,
            path,
            options,
        )
    }

    #[tokio::test]
    async fn test_single_hop() {
        let transport = Arc::new(FixedTransport {
            status: StatusCode::OK,
            seen: Mutex::new(Vec::new()),
        });
        let mut job = make_job(transport.clone(), "/items", RequestOptions::default());

        let response = job.start().await.unwrap();
        assert!(response.ok());
        assert!(!response.redirected());
        assert_eq!(response.status_text(), "OK");
        assert_eq!(response.data().as_text(), Some("done"));
        assert_eq!(job.load_state(), LoadState::Idle);

        let seen = transport.seen.lock();
        assert_eq!(seen[0].0.as_str(), "https://api.example.com/items");
        assert!(seen[0].1.headers.contains_key("user-agent"));
    }

    #[tokio::test]
    async fn test_redirect_without_location_is_final() {
        let transport = Arc::new(FixedTransport {
            status: StatusCode::FOUND,
            seen: Mutex::new(Vec::new()),
        });
        let response = make_job(transport.clone(), "/r", RequestOptions::default())
            .start()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(transport.seen.lock().len(), 1);
    }

    #[tokio::test]
    async fn test_relative_path_without_base() {
        let transport = Arc::new(FixedTransport {
            status: StatusCode::OK,
            seen: Mutex::new(Vec::new()),
        });
        let mut job = URLRequestHttpJob::new(
            Arc::new(ClientConfig::default()),
            Arc::new(CookieJar::new()),
            transport,
            Method::GET,
            "/x",
            RequestOptions::default(),
        );
        assert!(matches!(job.start().await, Err(NetError::MissingBaseUrl(_))));
    }

    #[test]
    fn test_redirect_target_statuses() {
        let url = Url::parse("https://a.com/").unwrap();
        for code in [301u16, 302, 303, 307, 308] {
            let resp = TransportResponse::new(url.clone(), StatusCode::from_u16(code).unwrap())
                .with_header("Location", "/next");
            assert!(redirect_target(&resp).is_some(), "status {code}");
        }
        let resp = TransportResponse::new(url, StatusCode::from_u16(300).unwrap())
            .with_header("Location", "/next");
        assert!(redirect_target(&resp).is_none());
    }
}
