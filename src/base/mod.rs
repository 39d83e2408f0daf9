//! Base types and error handling.
//!
//! - [`NetError`](neterror::NetError): error codes for every fallible operation
//! - [`LoadState`](loadstate::LoadState): where a request currently is in its pipeline

pub mod context;
pub mod loadstate;
pub mod neterror;
