//! Client configuration.
//!
//! A call takes an `Arc` snapshot of [`ClientConfig`] when it starts, so
//! changing the client afterwards never affects an in-flight call or its
//! `retry()`.

use crate::http::orderedheaders::OrderedHeaderMap;
use crate::urlrequest::compose::QueryParams;
use crate::urlrequest::middleware::{OnRequest, OnResponse};
use std::sync::Arc;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
    (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Redirect hops followed before a call fails.
pub const DEFAULT_MAX_REDIRECTS: usize = 20;

#[derive(Clone)]
pub struct ClientConfig {
    /// Normalized base URL; empty when unset.
    pub base_url: String,
    pub user_agent: String,
    /// Default headers, below every per-call header source.
    pub headers: OrderedHeaderMap,
    /// Default query parameters; call-level parameters win.
    pub params: QueryParams,
    /// Store `Set-Cookie` cookies in the jar.
    pub store_cookies: bool,
    /// Make `Cookies::set` fail on a domain mismatch instead of dropping.
    pub strict_cookie_domains: bool,
    pub max_redirects: usize,
    pub on_request: Option<Arc<dyn OnRequest>>,
    pub on_response: Option<Arc<dyn OnResponse>>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            headers: OrderedHeaderMap::new(),
            params: QueryParams::new(),
            store_cookies: true,
            strict_cookie_domains: false,
            max_redirects: DEFAULT_MAX_REDIRECTS,
            on_request: None,
            on_response: None,
        }
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("user_agent", &self.user_agent)
            .field("headers", &self.headers)
            .field("params", &self.params)
            .field("store_cookies", &self.store_cookies)
            .field("strict_cookie_domains", &self.strict_cookie_domains)
            .field("max_redirects", &self.max_redirects)
            .field("on_request", &self.on_request.is_some())
            .field("on_response", &self.on_response.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert!(config.base_url.is_empty());
        assert!(config.user_agent.contains("Chrome/120"));
        assert!(config.store_cookies);
        assert!(!config.strict_cookie_domains);
        assert_eq!(config.max_redirects, 20);
    }

    #[test]
    fn test_debug_elides_hooks() {
        let debug = format!("{:?}", ClientConfig::default());
        assert!(debug.contains("on_request: false"));
    }
}
