use std::fmt;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Duration, OffsetDateTime, UtcOffset};

/// `Wed, 09 Jun 2021 10:18:14 GMT`
const HTTP_DATE: &[time::format_description::BorrowedFormatItem<'static>] = format_description!(
    "[weekday repr:short], [day] [month repr:short] [year] [hour]:[minute]:[second] GMT"
);

/// A single cookie.
///
/// Every attribute has one canonical type; absent attributes are `None`
/// (or `false` for the flags).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cookie {
    pub key: String,
    pub value: String,
    pub expires: Option<OffsetDateTime>,
    /// Lifetime in seconds, as sent in `Max-Age`.
    pub max_age: Option<i64>,
    pub domain: Option<String>,
    pub path: Option<String>,
    pub secure: bool,
    pub http_only: bool,
}

impl Cookie {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            expires: None,
            max_age: None,
            domain: None,
            path: None,
            secure: false,
            http_only: false,
        }
    }

    pub fn with_expires(mut self, expires: OffsetDateTime) -> Self {
        self.expires = Some(expires);
        self
    }

    pub fn with_max_age(mut self, seconds: i64) -> Self {
        self.max_age = Some(seconds);
        self
    }

    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(normalize_domain(&domain.into())).filter(|d| !d.is_empty());
        self
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    pub fn with_http_only(mut self, http_only: bool) -> Self {
        self.http_only = http_only;
        self
    }

    /// Parse one `key=value; Attr=Val; ...` string.
    ///
    /// Attribute names are matched case-insensitively; unknown attributes
    /// are ignored. Returns `None` unless both key and value are non-empty.
    pub fn parse(cookie_line: &str) -> Option<Self> {
        let mut segments = cookie_line.split(';').map(str::trim);
        let (key, value) = segments.next()?.split_once('=')?;
        let (key, value) = (key.trim(), value.trim());
        if key.is_empty() || value.is_empty() {
            return None;
        }

        let mut cookie = Cookie::new(key, value);
        for attr in segments {
            let (name, attr_value) = match attr.split_once('=') {
                Some((name, attr_value)) => (name.trim(), attr_value.trim()),
                None => (attr, ""),
            };

            match name.to_ascii_lowercase().as_str() {
                "expires" => cookie.expires = parse_cookie_date(attr_value),
                "max-age" => cookie.max_age = attr_value.parse().ok(),
                "domain" => {
                    let domain = normalize_domain(attr_value);
                    cookie.domain = (!domain.is_empty()).then_some(domain);
                }
                "path" => cookie.path = (!attr_value.is_empty()).then(|| attr_value.to_string()),
                "secure" => cookie.secure = true,
                "httponly" => cookie.http_only = true,
                _ => {}
            }
        }

        Some(cookie)
    }

    /// Whether the cookie has expired at `now`.
    ///
    /// `Max-Age` wins over `Expires` and counts from `stored_at`.
    pub fn is_expired(&self, stored_at: OffsetDateTime, now: OffsetDateTime) -> bool {
        if let Some(max_age) = self.max_age {
            if max_age <= 0 {
                return true;
            }
            // Past the representable range: never expires.
            return stored_at
                .checked_add(Duration::seconds(max_age))
                .is_some_and(|deadline| deadline <= now);
        }
        self.expires.is_some_and(|expires| expires <= now)
    }
}

/// Renders the `Set-Cookie` form: `key=value` followed by `Expires`,
/// `Max-Age`, `Domain`, `Path`, `Secure` and `HttpOnly` when present.
impl fmt::Display for Cookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.key, self.value)?;
        if let Some(expires) = self.expires.and_then(format_http_date) {
            write!(f, "; Expires={}", expires)?;
        }
        if let Some(max_age) = self.max_age {
            write!(f, "; Max-Age={}", max_age)?;
        }
        if let Some(domain) = &self.domain {
            write!(f, "; Domain={}", domain)?;
        }
        if let Some(path) = &self.path {
            write!(f, "; Path={}", path)?;
        }
        if self.secure {
            f.write_str("; Secure")?;
        }
        if self.http_only {
            f.write_str("; HttpOnly")?;
        }
        Ok(())
    }
}

/// Leading dots are dropped and the domain is lowercased, so `.Example.com`
/// and `example.com` are the same jar key.
fn normalize_domain(domain: &str) -> String {
    domain.trim().trim_start_matches('.').to_ascii_lowercase()
}

pub(crate) fn format_http_date(date: OffsetDateTime) -> Option<String> {
    date.to_offset(UtcOffset::UTC).format(HTTP_DATE).ok()
}

/// Accepts the HTTP-date family (IMF-fixdate, RFC 850, asctime) and RFC 3339.
pub(crate) fn parse_cookie_date(value: &str) -> Option<OffsetDateTime> {
    if let Ok(date) = OffsetDateTime::parse(value, &Rfc3339) {
        return Some(date);
    }
    ::cookie::Cookie::parse(format!("x=y; Expires={}", value))
        .ok()
        .and_then(|c| c.expires_datetime())
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn test_parse_basic() {
        let cookie = Cookie::parse("session=abc123").unwrap();
        assert_eq!(cookie.key, "session");
        assert_eq!(cookie.value, "abc123");
        assert_eq!(cookie.domain, None);
        assert!(!cookie.secure);
        assert!(!cookie.http_only);
    }

    #[test]
    fn test_parse_all_attributes() {
        let cookie = Cookie::parse(
            "id=42; Expires=Wed, 09 Jun 2021 10:18:14 GMT; Max-Age=3600; Domain=.Example.com; Path=/app; Secure; HttpOnly",
        )
        .unwrap();

        assert_eq!(cookie.expires, Some(datetime!(2021-06-09 10:18:14 UTC)));
        assert_eq!(cookie.max_age, Some(3600));
        assert_eq!(cookie.domain.as_deref(), Some("example.com"));
        assert_eq!(cookie.path.as_deref(), Some("/app"));
        assert!(cookie.secure);
        assert!(cookie.http_only);
    }

    #[test]
    fn test_attribute_names_are_case_insensitive() {
        let cookie = Cookie::parse("a=b; SECURE; httponly; PATH=/x").unwrap();
        assert!(cookie.secure);
        assert!(cookie.http_only);
        assert_eq!(cookie.path.as_deref(), Some("/x"));
    }

    #[test]
    fn test_value_may_contain_equals() {
        let cookie = Cookie::parse("token=YWJj==; Path=/").unwrap();
        assert_eq!(cookie.value, "YWJj==");
    }

    #[test]
    fn test_unknown_attributes_are_ignored() {
        let cookie = Cookie::parse("a=b; SameSite=Lax; Priority=High").unwrap();
        assert_eq!(cookie, Cookie::new("a", "b"));
    }

    #[test]
    fn test_parse_rejects_missing_key_or_value() {
        assert!(Cookie::parse("").is_none());
        assert!(Cookie::parse("novalue").is_none());
        assert!(Cookie::parse("a=").is_none());
        assert!(Cookie::parse("=b").is_none());
        assert!(Cookie::parse("  =  ; Path=/").is_none());
    }

    #[test]
    fn test_bad_attribute_values_are_dropped() {
        let cookie = Cookie::parse("a=b; Max-Age=soon; Expires=never").unwrap();
        assert_eq!(cookie.max_age, None);
        assert_eq!(cookie.expires, None);
    }

    #[test]
    fn test_display_fixed_attribute_order() {
        let cookie = Cookie::new("id", "42")
            .with_http_only(true)
            .with_secure(true)
            .with_path("/")
            .with_domain("example.com")
            .with_max_age(60)
            .with_expires(datetime!(2021-06-09 10:18:14 UTC));

        assert_eq!(
            cookie.to_string(),
            "id=42; Expires=Wed, 09 Jun 2021 10:18:14 GMT; Max-Age=60; Domain=example.com; Path=/; Secure; HttpOnly"
        );
    }

    #[test]
    fn test_display_omits_absent_attributes() {
        assert_eq!(Cookie::new("a", "b").to_string(), "a=b");
    }

    #[test]
    fn test_display_then_parse() {
        let original = Cookie::new("k", "v")
            .with_path("/p")
            .with_domain("example.org")
            .with_expires(datetime!(2030-01-02 03:04:05 UTC));
        assert_eq!(Cookie::parse(&original.to_string()), Some(original));
    }

    #[test]
    fn test_huge_max_age_never_expires() {
        let cookie = Cookie::parse("a=1; Max-Age=9223372036854775807").unwrap();
        assert_eq!(cookie.max_age, Some(i64::MAX));
        let now = OffsetDateTime::now_utc();
        assert!(!cookie.is_expired(now, now));
    }

    #[test]
    fn test_expiry() {
        let stored = datetime!(2024-01-01 00:00:00 UTC);
        let later = datetime!(2024-01-01 00:10:00 UTC);

        assert!(!Cookie::new("a", "b").is_expired(stored, later));
        assert!(Cookie::new("a", "b").with_max_age(60).is_expired(stored, later));
        assert!(!Cookie::new("a", "b").with_max_age(3600).is_expired(stored, later));
        assert!(Cookie::new("a", "b").with_max_age(0).is_expired(stored, stored));
        assert!(Cookie::new("a", "b")
            .with_expires(datetime!(2024-01-01 00:05:00 UTC))
            .is_expired(stored, later));
        // Max-Age overrides Expires.
        assert!(!Cookie::new("a", "b")
            .with_expires(datetime!(2023-01-01 00:00:00 UTC))
            .with_max_age(3600)
            .is_expired(stored, later));
    }
}
