use super::body::IntoBody;
use crate::error::Result;
use bytes::Bytes;
use hyper::http::{HeaderName, HeaderValue};
use hyper::{HeaderMap, Response, StatusCode};
use std::str::FromStr;
use tracing::warn;

/// Fluent builder for the responses returned by expectations.
///
/// Defaults to status 200, no headers and an empty body.
#[derive(Debug, Clone)]
pub struct ResponseBuilder {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl Default for ResponseBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ResponseBuilder {
    pub fn new() -> Self {
        ResponseBuilder {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }

    /// Set the status code. Codes outside 100..=999 are ignored with a warning;
    /// use [`try_status`](Self::try_status) to reject them instead.
    pub fn status(mut self, status: u16) -> Self {
        match StatusCode::from_u16(status) {
            Ok(status) => self.status = status,
            Err(_) => warn!("Ignoring invalid status code {}", status),
        }
        self
    }

    /// Set the status code, failing on codes outside 100..=999.
    pub fn try_status(mut self, status: u16) -> Result<Self> {
        self.status = StatusCode::from_u16(status)?;
        Ok(self)
    }

    /// Replace all headers. Repeated names append additional values.
    pub fn headers<H, K, V>(mut self, headers: H) -> Self
    where
        H: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        self.headers.clear();
        for (name, value) in headers {
            self = self.header(name.as_ref(), value.as_ref());
        }
        self
    }

    /// Append a single header value.
    pub fn header(mut self, name: &str, value: &str) -> Self {
        match (HeaderName::from_str(name), HeaderValue::from_str(value)) {
            (Ok(name), Ok(value)) => {
                self.headers.append(name, value);
            }
            _ => warn!("Skipping invalid response header {}: {}", name, value),
        }
        self
    }

    /// Set the body. Strings and bytes are used as-is, other values are JSON encoded.
    pub fn body(mut self, body: impl IntoBody) -> Self {
        self.body = body.into_body();
        self
    }

    /// Snapshot the current state into a response.
    pub fn build(&self) -> Response<Bytes> {
        let mut response = Response::new(self.body.clone());
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers.clone();
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::Json;
    use hyper::header::CONTENT_TYPE;
    use serde_json::json;

    #[test]
    fn test_builder_defaults() {
        let response = ResponseBuilder::new().build();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().is_empty());
        assert!(response.body().is_empty());
    }

    #[test]
    fn test_builder_with_status_and_body() {
        let response = ResponseBuilder::new().status(404).body("missing").build();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.body(), "missing");
    }

    #[test]
    fn test_builder_ignores_invalid_status() {
        let response = ResponseBuilder::new().status(201).status(42).build();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    #[test]
    fn test_try_status_rejects_out_of_range_codes() {
        let err = ResponseBuilder::new().try_status(42).unwrap_err();
        assert!(matches!(err, crate::error::Error::InvalidStatus(_)));
        assert!(ResponseBuilder::new().try_status(1000).is_err());

        let response = ResponseBuilder::new().try_status(503).unwrap().build();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_builder_with_headers() {
        let response = ResponseBuilder::new()
            .headers([("X-Custom-Header", "test-value"), ("Content-Type", "application/json")])
            .build();

        assert_eq!(
            response.headers().get("X-Custom-Header"),
            Some(&HeaderValue::from_static("test-value"))
        );
        assert_eq!(
            response.headers().get(CONTENT_TYPE),
            Some(&HeaderValue::from_static("application/json"))
        );
    }

    #[test]
    fn test_headers_replace_previous_headers() {
        let response = ResponseBuilder::new()
            .header("x-first", "1")
            .headers([("x-second", "2")])
            .build();

        assert!(response.headers().get("x-first").is_none());
        assert_eq!(response.headers().get("x-second").unwrap(), "2");
    }

    #[test]
    fn test_repeated_header_names_keep_every_value() {
        let response = ResponseBuilder::new()
            .headers(vec![("set-cookie", "a=1"), ("set-cookie", "b=2")])
            .build();

        let values: Vec<_> = response.headers().get_all("set-cookie").iter().collect();
        assert_eq!(values, ["a=1", "b=2"]);
    }

    #[test]
    fn test_invalid_header_is_skipped() {
        let response = ResponseBuilder::new()
            .header("bad header", "value")
            .header("x-ok", "fine")
            .build();

        assert_eq!(response.headers().len(), 1);
    }

    #[test]
    fn test_structured_body_is_json_encoded() {
        let response = ResponseBuilder::new().body(json!({"test": "value"})).build();
        assert_eq!(response.body(), r#"{"test":"value"}"#);

        let response = ResponseBuilder::new().body(Json(vec![1, 2, 3])).build();
        assert_eq!(response.body(), "[1,2,3]");
    }

    #[test]
    fn test_build_is_a_snapshot() {
        let builder = ResponseBuilder::new().status(202);
        let first = builder.build();
        let second = builder.status(500).build();

        assert_eq!(first.status(), StatusCode::ACCEPTED);
        assert_eq!(second.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
