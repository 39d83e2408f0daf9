//! Cookie handling.
//!
//! | Type | Responsibility |
//! |------|----------------|
//! | [`parser`] | Split coalesced `Set-Cookie` values into single cookies |
//! | [`Cookie`](cookie::Cookie) | One cookie: parse and render |
//! | [`CookieJar`](jar::CookieJar) | In-memory store with domain/path matching |
//! | [`persistence`] | Flat records and JSON files |
//!
//! ```rust
//! use requestly::cookies::cookie::Cookie;
//! use requestly::cookies::jar::{CookieJar, SetCookieOptions};
//! use url::Url;
//!
//! let jar = CookieJar::new();
//! let url = Url::parse("https://sub.example.com/").unwrap();
//! let cookie = Cookie::parse("id=1; Domain=example.com; Path=/").unwrap();
//! jar.set_cookie(cookie, &url, SetCookieOptions::default()).unwrap();
//! assert_eq!(jar.get_cookie_string(&url), "id=1");
//! ```

pub mod cookie;
pub mod jar;
pub mod parser;
pub mod persistence;
