//! Absolute URL composition from a base URL, a call path and query
//! parameters.

use crate::base::neterror::NetError;
use url::Url;

/// Ordered query parameters. A `None` value is kept as a key but never
/// written, which lets a call suppress an instance default.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, Option<String>)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `key`, replacing an existing value in place.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.insert_opt(key, Some(value.into()));
    }

    pub fn insert_opt(&mut self, key: impl Into<String>, value: Option<String>) {
        let key = key.into();
        match self.pairs.iter_mut().find(|(k, _)| *k == key) {
            Some((_, v)) => *v = value,
            None => self.pairs.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .and_then(|(_, v)| v.as_deref())
    }

    pub fn remove(&mut self, key: &str) {
        self.pairs.retain(|(k, _)| k != key);
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_deref()))
    }

    /// `self` layered over `defaults`: defaults keep their order, keys
    /// present here override them, new keys are appended.
    pub fn merged_over(&self, defaults: &QueryParams) -> QueryParams {
        let mut merged = defaults.clone();
        for (key, value) in &self.pairs {
            merged.insert_opt(key.clone(), value.clone());
        }
        merged
    }

    /// `application/x-www-form-urlencoded` rendering, skipping `None` values.
    pub fn to_query_string(&self) -> String {
        let mut serializer = url::form_urlencoded::Serializer::new(String::new());
        for (key, value) in &self.pairs {
            if let Some(value) = value {
                serializer.append_pair(key, value);
            }
        }
        serializer.finish()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for QueryParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = QueryParams::new();
        for (k, v) in iter {
            params.insert(k, v);
        }
        params
    }
}

/// Normalize a base URL: trim, default to `https://`, collapse duplicate
/// slashes in the path, drop trailing slashes.
///
/// An empty (or blank) base is valid and stays empty.
pub fn normalize_base_url(base: &str) -> Result<String, NetError> {
    let trimmed = base.trim();
    if trimmed.is_empty() {
        return Ok(String::new());
    }

    let with_scheme = if scheme_len(trimmed).is_some() {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    };

    let normalized = clean_slashes(&with_scheme)
        .trim_end_matches('/')
        .to_string();
    validate(&normalized, base)?;
    Ok(normalized)
}

/// Compose the absolute URL for `path`.
///
/// An absolute `http(s)` path ignores `base` entirely. A protocol-relative
/// path (`//host/...`) is rejected.
pub fn create_url(path: &str, base: &str, params: &QueryParams) -> Result<String, NetError> {
    let base = normalize_base_url(base)?;
    let path = path.trim();

    let composed = if path.is_empty() {
        if base.is_empty() {
            return Err(NetError::InvalidUrl(String::new()));
        }
        base
    } else if is_http_url(path) {
        clean_slashes(path)
    } else if path.starts_with("//") {
        return Err(NetError::InvalidUrl(path.to_string()));
    } else {
        let relative = path.strip_prefix('/').unwrap_or(path);
        if base.is_empty() {
            clean_slashes(&format!("https://{}", relative))
        } else {
            clean_slashes(&format!("{}/{}", base, relative))
        }
    };

    let url = append_query(composed, &params.to_query_string());
    validate(&url, &url)?;
    Ok(url)
}

fn is_http_url(s: &str) -> bool {
    let lower = s.get(..8).unwrap_or(s).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Length of `scheme` in `scheme://...`, if the string has one.
fn scheme_len(s: &str) -> Option<usize> {
    let idx = s.find("://")?;
    let scheme = &s[..idx];
    let mut chars = scheme.chars();
    let valid = chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    valid.then_some(idx)
}

/// Collapse runs of `/` after `scheme://` up to the query or fragment.
fn clean_slashes(url: &str) -> String {
    let (prefix, rest) = match scheme_len(url) {
        Some(idx) => url.split_at(idx + 3),
        None => ("", url),
    };
    let split = rest.find(|c: char| c == '?' || c == '#').unwrap_or(rest.len());
    let (path, tail) = rest.split_at(split);

    let mut cleaned = String::with_capacity(url.len());
    cleaned.push_str(prefix);
    let mut prev_slash = !prefix.is_empty();
    for c in path.chars() {
        if c == '/' && prev_slash {
            continue;
        }
        prev_slash = c == '/';
        cleaned.push(c);
    }
    cleaned.push_str(tail);
    cleaned
}

fn append_query(url: String, query: &str) -> String {
    if query.is_empty() {
        return url;
    }
    let (head, fragment) = match url.find('#') {
        Some(idx) => url.split_at(idx),
        None => (url.as_str(), ""),
    };
    let sep = match head.find('?') {
        None => "?",
        Some(_) if head.ends_with('?') || head.ends_with('&') => "",
        Some(_) => "&",
    };
    format!("{}{}{}{}", head, sep, query, fragment)
}

fn validate(url: &str, original: &str) -> Result<(), NetError> {
    match Url::parse(url) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") && parsed.has_host() => Ok(()),
        _ => Err(NetError::InvalidUrl(original.to_string())),
    }
}
