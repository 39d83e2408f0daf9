//! Connection setup for the default transport.
//!
//! - [`connectjob`]: DNS → TCP → TLS (BoringSSL)
//! - [`client`]: the resulting plain or TLS stream

pub mod client;
pub mod connectjob;
