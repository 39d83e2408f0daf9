//! The call pipeline.
//!
//! - [`compose`]: base URL normalization and URL composition
//! - [`context`]: client configuration snapshot
//! - [`request`]: per-call options and the init seen by middleware
//! - [`middleware`]: request and response hooks
//! - [`job`]: one call, redirects included

pub mod compose;
pub mod context;
pub mod job;
pub mod middleware;
pub mod request;
