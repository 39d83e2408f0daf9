//! Cookie records and disk persistence.
//!
//! [`SerializedCookie`] is the flat wire form of a cookie: camelCase field
//! names and `expires` as an RFC 3339 string. A jar file is a JSON object
//! `{"cookies": [...]}` holding those records.

use crate::cookies::cookie::{parse_cookie_date, Cookie};
use crate::cookies::jar::CookieJar;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::Path;
use time::format_description::well_known::Rfc3339;

/// Flat record form of a [`Cookie`].
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SerializedCookie {
    pub key: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_age: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secure: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_only: Option<bool>,
}

impl From<&Cookie> for SerializedCookie {
    fn from(cookie: &Cookie) -> Self {
        Self {
            key: cookie.key.clone(),
            value: cookie.value.clone(),
            expires: cookie.expires.and_then(|t| t.format(&Rfc3339).ok()),
            max_age: cookie.max_age,
            domain: cookie.domain.clone(),
            path: cookie.path.clone(),
            secure: cookie.secure.then_some(true),
            http_only: cookie.http_only.then_some(true),
        }
    }
}

impl From<SerializedCookie> for Cookie {
    fn from(record: SerializedCookie) -> Self {
        let expires = record.expires.as_deref().and_then(|raw| {
            let parsed = parse_cookie_date(raw);
            if parsed.is_none() {
                tracing::warn!(cookie = %record.key, expires = %raw, "Ignoring unparsable expiry");
            }
            parsed
        });

        let cookie = Cookie {
            key: record.key,
            value: record.value,
            expires,
            max_age: record.max_age,
            domain: None,
            path: record.path,
            secure: record.secure.unwrap_or(false),
            http_only: record.http_only.unwrap_or(false),
        };
        match record.domain {
            Some(domain) => cookie.with_domain(domain),
            None => cookie,
        }
    }
}

#[derive(Serialize, Deserialize)]
struct JarFile {
    cookies: Vec<SerializedCookie>,
}

/// Write every cookie of `jar` to `path`.
///
/// # Example
/// ```ignore
/// persistence::save_cookies(&jar, Path::new("/path/to/cookies.json"))?;
/// ```
pub fn save_cookies(jar: &CookieJar, path: &Path) -> io::Result<()> {
    let file = JarFile {
        cookies: jar.serialize(),
    };
    let json = serde_json::to_string_pretty(&file)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

    fs::write(path, json)?;
    tracing::debug!(path = %path.display(), count = file.cookies.len(), "Saved cookies");
    Ok(())
}

/// Read a jar written by [`save_cookies`].
///
/// Expired cookies are kept; filtering by time is the jar's business.
pub fn load_cookies(path: &Path) -> io::Result<CookieJar> {
    let json = fs::read_to_string(path)?;
    let file: JarFile =
        serde_json::from_str(&json).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

    tracing::debug!(path = %path.display(), count = file.cookies.len(), "Loaded cookies");
    Ok(CookieJar::deserialize(file.cookies))
}
