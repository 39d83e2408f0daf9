use crate::base::neterror::NetError;
use crate::cookies::cookie::Cookie;
use crate::cookies::persistence::SerializedCookie;
use parking_lot::RwLock;
use time::OffsetDateTime;
use url::Url;

/// Options for [`CookieJar::set_cookie`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SetCookieOptions {
    /// Drop a cookie whose domain does not match instead of failing.
    pub ignore_error: bool,
}

#[derive(Debug, Clone)]
struct StoredCookie {
    cookie: Cookie,
    stored_at: OffsetDateTime,
}

/// In-memory cookie store.
///
/// Entries are kept in insertion order and are unique by `(key, domain)`:
/// setting a cookie with the same key and domain replaces the old entry and
/// moves it to the end. Every mutation happens under one write lock, so
/// concurrent writers of different keys never lose each other's updates.
#[derive(Debug, Default)]
pub struct CookieJar {
    entries: RwLock<Vec<StoredCookie>>,
    evict_expired: bool,
}

impl CookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    /// A jar that leaves expired cookies out of [`get_cookies`](Self::get_cookies)
    /// and drops them from storage while doing so.
    pub fn with_expiry_eviction() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
            evict_expired: true,
        }
    }

    pub fn evicts_expired(&self) -> bool {
        self.evict_expired
    }

    /// Store `cookie` as set by `url`.
    ///
    /// A cookie carrying a `domain` that is not a suffix of the URL host is
    /// rejected with [`NetError::CookieDomainMismatch`], or silently dropped
    /// when `options.ignore_error` is set.
    pub fn set_cookie(
        &self,
        cookie: Cookie,
        url: &Url,
        options: SetCookieOptions,
    ) -> Result<(), NetError> {
        let host = url.host_str().unwrap_or("").to_ascii_lowercase();

        if let Some(domain) = &cookie.domain {
            if !host.ends_with(domain.as_str()) {
                if options.ignore_error {
                    tracing::debug!(
                        cookie = %cookie.key,
                        domain = %domain,
                        host = %host,
                        "Dropping cookie for foreign domain"
                    );
                    return Ok(());
                }
                return Err(NetError::CookieDomainMismatch {
                    domain: domain.clone(),
                    host,
                });
            }
        }

        self.store(cookie, OffsetDateTime::now_utc());
        Ok(())
    }

    fn store(&self, cookie: Cookie, stored_at: OffsetDateTime) {
        let mut entries = self.entries.write();
        entries.retain(|e| e.cookie.key != cookie.key || e.cookie.domain != cookie.domain);
        entries.push(StoredCookie { cookie, stored_at });
    }

    /// Cookies whose domain is unset or a suffix of the URL host and whose
    /// path is unset or a prefix of the URL path, in insertion order.
    pub fn get_cookies(&self, url: &Url) -> Vec<Cookie> {
        let host = url.host_str().unwrap_or("").to_ascii_lowercase();
        let path = url.path();

        if self.evict_expired {
            self.evict_expired_at(OffsetDateTime::now_utc());
        }

        self.entries
            .read()
            .iter()
            .map(|e| &e.cookie)
            .filter(|c| c.domain.as_deref().map_or(true, |d| host.ends_with(d)))
            .filter(|c| c.path.as_deref().map_or(true, |p| path.starts_with(p)))
            .cloned()
            .collect()
    }

    /// Every stored cookie regardless of domain or path.
    pub fn cookies(&self) -> Vec<Cookie> {
        if self.evict_expired {
            self.evict_expired_at(OffsetDateTime::now_utc());
        }
        self.entries.read().iter().map(|e| e.cookie.clone()).collect()
    }

    /// `key=value` pairs for `url`, joined with `"; "`.
    pub fn get_cookie_string(&self, url: &Url) -> String {
        self.get_cookies(url)
            .iter()
            .map(|c| format!("{}={}", c.key, c.value))
            .collect::<Vec<_>>()
            .join("; ")
    }

    fn evict_expired_at(&self, now: OffsetDateTime) {
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|e| !e.cookie.is_expired(e.stored_at, now));
        let evicted = before - entries.len();
        if evicted > 0 {
            tracing::trace!(evicted, "Evicted expired cookies");
        }
    }

    /// Every stored cookie as a flat record, in insertion order.
    pub fn serialize(&self) -> Vec<SerializedCookie> {
        self.entries
            .read()
            .iter()
            .map(|e| SerializedCookie::from(&e.cookie))
            .collect()
    }

    /// Build a jar from records produced by [`serialize`](Self::serialize).
    pub fn deserialize(records: Vec<SerializedCookie>) -> CookieJar {
        let jar = CookieJar::new();
        jar.replace_all(records);
        jar
    }

    /// Replace the whole content of this jar with `records`.
    ///
    /// Records are stored without domain validation; a later record with the
    /// same `(key, domain)` replaces an earlier one.
    pub fn replace_all(&self, records: Vec<SerializedCookie>) {
        let now = OffsetDateTime::now_utc();
        let mut entries = self.entries.write();
        entries.clear();
        for record in records {
            let cookie = Cookie::from(record);
            entries.retain(|e| e.cookie.key != cookie.key || e.cookie.domain != cookie.domain);
            entries.push(StoredCookie {
                cookie,
                stored_at: now,
            });
        }
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}
