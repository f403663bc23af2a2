//! Per-request transfer options.
//!
//! Options are string keys mapped to JSON values, passed alongside every
//! request to handlers, predicates and inspectors. The client understands a
//! few well-known keys (`body`, `json`, `headers`, `query`, `http_errors`);
//! anything else is carried through untouched for predicates to look at.

use crate::client::{BoxHandler, Handler};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

pub const BODY: &str = "body";
pub const JSON: &str = "json";
pub const HEADERS: &str = "headers";
pub const QUERY: &str = "query";
pub const HTTP_ERRORS: &str = "http_errors";

#[derive(Clone, Default)]
pub struct RequestOptions {
    values: BTreeMap<String, Value>,
    /// Per-call handler; wins over the client's configured handler.
    handler: Option<BoxHandler>,
}

impl fmt::Debug for RequestOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestOptions")
            .field("values", &self.values)
            .field("handler", &self.handler.as_ref().map(|_| "<handler>"))
            .finish()
    }
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Raw request body.
    pub fn body(self, body: impl Into<String>) -> Self {
        self.with(BODY, body.into())
    }

    /// JSON request body; sets `content-type: application/json` when sent.
    pub fn json(self, value: Value) -> Self {
        self.with(JSON, value)
    }

    /// Raw query string, replacing any query present on the request URI.
    pub fn query(self, query: impl Into<String>) -> Self {
        self.with(QUERY, query.into())
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let headers = self
            .values
            .entry(HEADERS.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if let Value::Object(map) = headers {
            map.insert(name.into(), Value::String(value.into()));
        }
        self
    }

    /// Disable (or re-enable) turning 4xx/5xx responses into errors.
    pub fn http_errors(self, enabled: bool) -> Self {
        self.with(HTTP_ERRORS, enabled)
    }

    pub fn handler(&self) -> Option<&BoxHandler> {
        self.handler.as_ref()
    }

    pub fn with_handler(mut self, handler: impl Handler + 'static) -> Self {
        self.handler = Some(Arc::new(handler));
        self
    }

    /// Fill in keys (and the handler) missing from `self` with `defaults`.
    pub fn merged_with(mut self, defaults: &RequestOptions) -> Self {
        for (key, value) in &defaults.values {
            self.values
                .entry(key.clone())
                .or_insert_with(|| value.clone());
        }
        if self.handler.is_none() {
            self.handler = defaults.handler.clone();
        }
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }
}
