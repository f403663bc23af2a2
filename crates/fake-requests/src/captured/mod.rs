//! Read-only view over a request that an expectation consumed.
//!
//! The view delegates the usual accessors to the wrapped request and adds
//! assertion helpers for headers, the query string and the body. Assertion
//! failures panic, which the test harness reports as a failed test.

mod json_path;
mod query;

pub use query::QueryParams;

use crate::error::{Error, Result};
use assert_json_diff::{assert_json_matches_no_panic, CompareMode, Config};
use bytes::Bytes;
use hyper::{HeaderMap, Method, Request, Uri};
use once_cell::sync::OnceCell;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

/// A captured request with assertion helpers.
///
/// Cloning is cheap and clones share the cached JSON body.
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    request: Request<Bytes>,
    json_body: OnceCell<std::result::Result<Value, String>>,
}

impl From<Request<Bytes>> for CapturedRequest {
    fn from(request: Request<Bytes>) -> Self {
        CapturedRequest::new(request)
    }
}

impl CapturedRequest {
    pub fn new(request: Request<Bytes>) -> Self {
        CapturedRequest {
            inner: Arc::new(Inner {
                request,
                json_body: OnceCell::new(),
            }),
        }
    }

    /// The wrapped request.
    pub fn inner(&self) -> &Request<Bytes> {
        &self.inner.request
    }

    pub fn method(&self) -> &Method {
        self.inner.request.method()
    }

    pub fn uri(&self) -> &Uri {
        self.inner.request.uri()
    }

    pub fn path(&self) -> &str {
        self.uri().path()
    }

    /// Raw query component, without the leading `?`.
    pub fn query(&self) -> Option<&str> {
        self.uri().query()
    }

    pub fn query_params(&self) -> QueryParams {
        QueryParams::parse(self.query())
    }

    pub fn headers(&self) -> &HeaderMap {
        self.inner.request.headers()
    }

    /// All values sent for `name`, skipping values that are not visible ASCII.
    pub fn header_values(&self, name: &str) -> Vec<&str> {
        self.headers()
            .get_all(name)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .collect()
    }

    pub fn body(&self) -> &Bytes {
        self.inner.request.body()
    }

    pub fn body_str(&self) -> Option<&str> {
        std::str::from_utf8(self.body()).ok()
    }

    /// The body decoded as JSON. Decoding happens once per view.
    pub fn json_body(&self) -> Result<&Value> {
        self.inner
            .json_body
            .get_or_init(|| serde_json::from_slice(self.body()).map_err(|e| e.to_string()))
            .as_ref()
            .map_err(|e| Error::InvalidJsonBody(e.clone()))
    }

    #[track_caller]
    fn decoded_json(&self) -> &Value {
        match self.json_body() {
            Ok(value) => value,
            Err(e) => panic!("{e}"),
        }
    }

    // ===== Headers =====

    /// Assert the header is present, and when `value` is given, that it is one of the sent values.
    #[track_caller]
    pub fn assert_has_header<'a>(&self, name: &str, value: impl Into<Option<&'a str>>) {
        assert!(
            self.headers().contains_key(name),
            "The \"{name}\" header was not found."
        );

        if let Some(value) = value.into() {
            let values = self.header_values(name);
            assert!(
                values.contains(&value),
                "Failed asserting that the \"{name}\" header {values:?} contains \"{value}\"."
            );
        }
    }

    /// Assert the header is absent, or when `value` is given, that it is not one of the sent values.
    #[track_caller]
    pub fn assert_not_has_header<'a>(&self, name: &str, value: impl Into<Option<&'a str>>) {
        match value.into() {
            None => assert!(
                !self.headers().contains_key(name),
                "The \"{name}\" header was found."
            ),
            Some(value) => {
                let values = self.header_values(name);
                assert!(
                    !values.contains(&value),
                    "Failed asserting that the \"{name}\" header {values:?} does not contain \"{value}\"."
                );
            }
        }
    }

    // ===== Query string =====

    #[track_caller]
    pub fn assert_has_query_param<'a>(&self, key: &str, value: impl Into<Option<&'a str>>) {
        let params = self.query_params();
        assert!(
            params.contains_key(key),
            "The \"{key}\" query param was not found."
        );

        if let Some(expected) = value.into() {
            let actual = params.get(key).flatten();
            assert_eq!(
                actual,
                Some(expected),
                "The \"{key}\" query param does not have the expected value."
            );
        }
    }

    #[track_caller]
    pub fn assert_not_has_query_param<'a>(&self, key: &str, value: impl Into<Option<&'a str>>) {
        let params = self.query_params();
        match value.into() {
            None => assert!(
                !params.contains_key(key),
                "The \"{key}\" query param was found."
            ),
            Some(unexpected) => {
                let actual = params.get(key).flatten();
                assert_ne!(
                    actual,
                    Some(unexpected),
                    "The \"{key}\" query param has an unexpected value."
                );
            }
        }
    }

    /// Exact comparison against the raw query string (without `?`).
    #[track_caller]
    pub fn assert_query_equals(&self, query: &str) {
        assert_eq!(self.query().unwrap_or(""), query, "Query strings differ.");
    }

    // ===== Body =====

    #[track_caller]
    pub fn assert_body_equals(&self, body: &str) {
        assert_eq!(
            String::from_utf8_lossy(self.body()),
            body,
            "Request bodies differ."
        );
    }

    #[track_caller]
    pub fn assert_json_body_equals<T: Serialize>(&self, expected: T) {
        let expected = to_json(expected);
        if let Err(diff) =
            assert_json_matches_no_panic(self.decoded_json(), &expected, Config::new(CompareMode::Strict))
        {
            panic!("Failed asserting that the JSON body equals the expected value:\n\n{diff}\n");
        }
    }

    /// Every key and value in `subset` must appear in the body; extra body content is allowed.
    #[track_caller]
    pub fn assert_json_body_subset<T: Serialize>(&self, subset: T) {
        let subset = to_json(subset);
        if let Err(diff) = assert_json_matches_no_panic(
            self.decoded_json(),
            &subset,
            Config::new(CompareMode::Inclusive),
        ) {
            panic!("Failed asserting that the JSON body contains the expected subset:\n\n{diff}\n");
        }
    }

    #[track_caller]
    pub fn assert_json_body_has_key(&self, key: &str) {
        assert!(
            json_path::lookup(self.decoded_json(), key).is_some(),
            "Failed asserting that the JSON body has the key '{key}'."
        );
    }

    #[track_caller]
    pub fn assert_json_body_contains<T: Serialize>(&self, key: &str, value: T) {
        self.assert_json_body_has_key(key);
        let actual = json_path::lookup(self.decoded_json(), key);
        assert_eq!(
            actual,
            Some(&to_json(value)),
            "The JSON body key '{key}' does not have the expected value."
        );
    }
}

#[track_caller]
fn to_json<T: Serialize>(value: T) -> Value {
    match serde_json::to_value(value) {
        Ok(value) => value,
        Err(e) => panic!("Expected value cannot be represented as JSON: {e}"),
    }
}
