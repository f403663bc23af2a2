//! Synchronous HTTP client plumbing.
//!
//! - `handler`: the `Handler` trait every transport implements
//! - `stack`: `HandlerStack`, middleware around an innermost handler
//! - `middleware`: the default `http_errors` and `prepare_body` middleware
//! - `factory`: `ClientFactory`, which swaps in a transport override
//!
//! The `Client` itself only turns method, URI and options into a request
//! and passes it to its handler. Nothing here opens a socket.

mod factory;
mod handler;
mod middleware;
mod stack;

pub use factory::{ClientFactory, ClientHandler, ClientOptions};
pub use handler::{no_transport, BoxHandler, Handler};
pub use middleware::{http_errors, prepare_body};
pub use stack::{HandlerStack, Middleware};

use crate::error::Result;
use crate::options::{RequestOptions, BODY, HEADERS, JSON, QUERY};
use bytes::Bytes;
use hyper::header::{HeaderName, HeaderValue, CONTENT_TYPE};
use hyper::{HeaderMap, Method, Request, Response, Uri};
use serde_json::Value;
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct Client {
    base_uri: Option<Uri>,
    handler: ClientHandler,
    headers: HeaderMap,
    defaults: RequestOptions,
}

impl Default for Client {
    fn default() -> Self {
        Client::new(ClientOptions::default())
    }
}

impl Client {
    pub fn new(options: ClientOptions) -> Self {
        Client {
            base_uri: options.base_uri,
            handler: options
                .handler
                .unwrap_or_else(|| ClientHandler::Stack(HandlerStack::create())),
            headers: options.headers,
            defaults: options.defaults,
        }
    }

    /// The configured transport.
    pub fn handler(&self) -> &ClientHandler {
        &self.handler
    }

    pub fn handler_mut(&mut self) -> &mut ClientHandler {
        &mut self.handler
    }

    pub fn base_uri(&self) -> Option<&Uri> {
        self.base_uri.as_ref()
    }

    /// Build a request from `method`, `uri` and the well-known option keys, then send it.
    pub fn request(
        &self,
        method: Method,
        uri: &str,
        options: RequestOptions,
    ) -> Result<Response<Bytes>> {
        let options = options.merged_with(&self.defaults);
        let uri = self.resolve_uri(uri, query_option(&options))?;

        let mut request = Request::builder()
            .method(method)
            .uri(uri)
            .body(body_option(&options))?;

        if options.contains_key(JSON) && !request.headers().contains_key(CONTENT_TYPE) {
            request
                .headers_mut()
                .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }

        if let Some(Value::Object(headers)) = options.get(HEADERS) {
            for (name, value) in headers {
                let value = match value {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                match (
                    HeaderName::from_bytes(name.as_bytes()),
                    HeaderValue::from_str(&value),
                ) {
                    (Ok(name), Ok(value)) => {
                        request.headers_mut().insert(name, value);
                    }
                    _ => warn!("Skipping invalid request header {}: {}", name, value),
                }
            }
        }

        for (name, value) in &self.headers {
            if !request.headers().contains_key(name) {
                request.headers_mut().insert(name.clone(), value.clone());
            }
        }

        self.send(request, options)
    }

    /// Send a prepared request. A handler in `options` wins over the client's own.
    pub fn send(&self, request: Request<Bytes>, options: RequestOptions) -> Result<Response<Bytes>> {
        debug!("Sending {} {}", request.method(), request.uri());
        let handler = match options.handler() {
            Some(handler) => handler.clone(),
            None => self.handler.resolve(),
        };
        handler.call(request, &options)
    }

    pub fn get(&self, uri: &str) -> Result<Response<Bytes>> {
        self.request(Method::GET, uri, RequestOptions::default())
    }

    pub fn post(&self, uri: &str) -> Result<Response<Bytes>> {
        self.request(Method::POST, uri, RequestOptions::default())
    }

    pub fn put(&self, uri: &str) -> Result<Response<Bytes>> {
        self.request(Method::PUT, uri, RequestOptions::default())
    }

    pub fn patch(&self, uri: &str) -> Result<Response<Bytes>> {
        self.request(Method::PATCH, uri, RequestOptions::default())
    }

    pub fn delete(&self, uri: &str) -> Result<Response<Bytes>> {
        self.request(Method::DELETE, uri, RequestOptions::default())
    }

    pub fn head(&self, uri: &str) -> Result<Response<Bytes>> {
        self.request(Method::HEAD, uri, RequestOptions::default())
    }

    pub fn options(&self, uri: &str) -> Result<Response<Bytes>> {
        self.request(Method::OPTIONS, uri, RequestOptions::default())
    }

    /// Resolve `uri` against the base URI and apply a replacement query.
    fn resolve_uri(&self, uri: &str, query: Option<String>) -> Result<Uri> {
        let mut target = if uri.contains("://") {
            uri.to_string()
        } else if let Some(base) = &self.base_uri {
            let origin = match (base.scheme_str(), base.authority()) {
                (Some(scheme), Some(authority)) => format!("{scheme}://{authority}"),
                _ => String::new(),
            };
            if uri.starts_with('/') {
                format!("{origin}{uri}")
            } else {
                // Relative references replace the last segment of the base path
                let base_path = base.path();
                let directory = &base_path[..base_path.rfind('/').map_or(0, |i| i + 1)];
                let directory = if directory.is_empty() { "/" } else { directory };
                format!("{origin}{directory}{uri}")
            }
        } else if uri.starts_with('/') {
            uri.to_string()
        } else {
            format!("/{uri}")
        };

        if let Some(query) = query {
            if let Some(index) = target.find('?') {
                target.truncate(index);
            }
            if !query.is_empty() {
                target.push('?');
                target.push_str(&query);
            }
        }

        Ok(target.parse()?)
    }
}

fn body_option(options: &RequestOptions) -> Bytes {
    if let Some(json) = options.get(JSON) {
        return Bytes::from(json.to_string());
    }
    match options.get(BODY) {
        Some(Value::String(raw)) => Bytes::from(raw.clone()),
        Some(other) => Bytes::from(other.to_string()),
        None => Bytes::new(),
    }
}

fn query_option(options: &RequestOptions) -> Option<String> {
    match options.get(QUERY)? {
        Value::String(raw) => Some(raw.clone()),
        Value::Object(pairs) => Some(
            pairs
                .iter()
                .map(|(key, value)| match value {
                    Value::String(s) => format!("{key}={s}"),
                    Value::Null => key.clone(),
                    other => format!("{key}={other}"),
                })
                .collect::<Vec<_>>()
                .join("&"),
        ),
        _ => None,
    }
}
