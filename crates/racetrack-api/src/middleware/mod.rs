//! HTTP middleware for request processing.
pub mod request_id;

pub use request_id::{inject_request_id, request_span, RequestId, REQUEST_ID_HEADER};
