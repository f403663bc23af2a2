//! Response synthesis.
//!
//! - `builder`: fluent `ResponseBuilder` producing immutable responses
//! - `body`: conversion of heterogeneous body inputs into raw payloads

mod body;
mod builder;

pub use body::{IntoBody, Json};
pub use builder::ResponseBuilder;

use bytes::Bytes;
use hyper::Response;

/// The response returned when nothing else was configured: 200, empty body, no headers.
pub fn default_response() -> Response<Bytes> {
    ResponseBuilder::new().build()
}
