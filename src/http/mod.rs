//! Request and response plumbing.
//!
//! [`transaction::Transport`] is the seam between the call pipeline and the
//! network; [`transaction::HttpTransport`] is the default HTTP/1.1 one.

pub mod multipart;
pub mod orderedheaders;
pub mod requestbody;
pub mod response;
pub mod responsebody;
pub mod streamfactory;
pub mod transaction;

// Re-exports for convenience
pub use orderedheaders::OrderedHeaderMap;
pub use requestbody::RequestBody;
pub use response::Response;
pub use responsebody::{ResponseBody, ResponseData};
