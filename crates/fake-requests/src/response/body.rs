//! Body conversion for synthesized responses.
//!
//! Strings and byte payloads are used verbatim; anything else is serialized
//! to JSON.

use bytes::Bytes;
use serde::Serialize;
use tracing::warn;

/// A value that can become a response body.
pub trait IntoBody {
    fn into_body(self) -> Bytes;
}

/// Wrapper that serializes any `Serialize` value as a JSON body.
///
/// ```
/// use fake_requests::response::{Json, ResponseBuilder};
/// use std::collections::BTreeMap;
///
/// let body = BTreeMap::from([("test", "value")]);
/// let response = ResponseBuilder::new().body(Json(body)).build();
/// assert_eq!(response.body().as_ref(), br#"{"test":"value"}"#);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Json<T>(pub T);

impl<T: Serialize> IntoBody for Json<T> {
    fn into_body(self) -> Bytes {
        match serde_json::to_vec(&self.0) {
            Ok(encoded) => Bytes::from(encoded),
            Err(e) => {
                warn!("Failed to serialize response body as JSON: {}", e);
                Bytes::new()
            }
        }
    }
}

impl IntoBody for serde_json::Value {
    fn into_body(self) -> Bytes {
        Json(self).into_body()
    }
}

impl IntoBody for &serde_json::Value {
    fn into_body(self) -> Bytes {
        Json(self).into_body()
    }
}

impl IntoBody for &str {
    fn into_body(self) -> Bytes {
        Bytes::copy_from_slice(self.as_bytes())
    }
}

impl IntoBody for String {
    fn into_body(self) -> Bytes {
        Bytes::from(self)
    }
}

impl IntoBody for &String {
    fn into_body(self) -> Bytes {
        Bytes::copy_from_slice(self.as_bytes())
    }
}

impl IntoBody for Bytes {
    fn into_body(self) -> Bytes {
        self
    }
}

impl IntoBody for Vec<u8> {
    fn into_body(self) -> Bytes {
        Bytes::from(self)
    }
}

impl IntoBody for &[u8] {
    fn into_body(self) -> Bytes {
        Bytes::copy_from_slice(self)
    }
}

impl IntoBody for () {
    fn into_body(self) -> Bytes {
        Bytes::new()
    }
}
