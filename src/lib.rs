//! # requestly
//!
//! A configurable HTTP client built around a base URL, an in-memory cookie
//! jar, manual redirect following and request/response middleware.
//!
//! ## Features
//!
//! - **URL composition**: base URL plus relative paths, merged query parameters
//! - **Cookies**: captured from every redirect hop, replayed on later calls
//! - **Redirects**: followed manually up to a configurable limit
//! - **Middleware**: patch outgoing requests, override responses
//! - **Bodies**: JSON, text, bytes, URL-encoded forms and multipart
//! - **Cancellation**: abort in-flight calls with a `CancellationToken`
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use requestly::Client;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), requestly::NetError> {
//!     let client = Client::with_base_url("https://httpbin.org")?;
//!     let response = client.get("/cookies/set?session=1").send().await?;
//!     println!("Status: {} redirected: {}", response.status(), response.redirected());
//!     println!("Jar: {:?}", client.cookies().get("session", None)?);
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`base`] - Errors and load states
//! - [`cookies`] - Cookie parsing, the jar and its persistence
//! - [`http`] - Bodies, headers, responses and the transport seam
//! - [`socket`] - TCP and TLS connection setup
//! - [`urlrequest`] - URL composition, configuration, middleware and the call pipeline

pub mod base;
pub mod client;
pub mod cookies;
pub mod http;
pub mod socket;
pub mod urlrequest;

pub use base::neterror::NetError;
pub use client::{Client, ClientBuilder, Cookies, RequestBuilder};
pub use cookies::cookie::Cookie;
pub use http::multipart::{Form, Part};
pub use http::{RequestBody, Response, ResponseData};
pub use urlrequest::compose::QueryParams;
pub use urlrequest::middleware::{RequestPatch, ResponseOverride};
pub use urlrequest::request::RequestInit;
