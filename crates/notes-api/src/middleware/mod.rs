//! HTTP middleware shared by every route
//!
//! Author: hephaex@gmail.com

pub mod request_id;
pub mod response_headers;

pub use request_id::UuidRequestId;
pub use response_headers::response_headers_middleware;
