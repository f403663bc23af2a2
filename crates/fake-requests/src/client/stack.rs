//! Handler stack: an innermost handler wrapped by named middleware.

use super::handler::{no_transport, BoxHandler, Handler};
use super::middleware;
use crate::error::Result;
use crate::options::RequestOptions;
use bytes::Bytes;
use hyper::{Request, Response};
use std::fmt;
use std::sync::Arc;

/// Wraps a handler into a new handler.
pub type Middleware = Arc<dyn Fn(BoxHandler) -> BoxHandler + Send + Sync>;

#[derive(Clone)]
pub struct HandlerStack {
    handler: BoxHandler,
    /// Outermost first.
    middleware: Vec<(String, Middleware)>,
}

impl fmt::Debug for HandlerStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerStack")
            .field("middleware", &self.names())
            .finish()
    }
}

impl Default for HandlerStack {
    fn default() -> Self {
        Self::create()
    }
}

impl HandlerStack {
    /// A stack without middleware around `handler`.
    pub fn new(handler: impl Handler + 'static) -> Self {
        HandlerStack {
            handler: Arc::new(handler),
            middleware: Vec::new(),
        }
    }

    /// The default stack: `http_errors` and `prepare_body` around a transport
    /// that refuses to send anything.
    pub fn create() -> Self {
        let mut stack = HandlerStack::new(no_transport);
        stack.push("http_errors", middleware::http_errors());
        stack.push("prepare_body", middleware::prepare_body());
        stack
    }

    pub fn set_handler(&mut self, handler: impl Handler + 'static) {
        self.handler = Arc::new(handler);
    }

    /// Replace the innermost handler with an already shared one.
    pub fn set_boxed_handler(&mut self, handler: BoxHandler) {
        self.handler = handler;
    }

    /// The innermost handler.
    pub fn handler(&self) -> &BoxHandler {
        &self.handler
    }

    /// Add middleware inside everything pushed before it.
    pub fn push(&mut self, name: impl Into<String>, middleware: Middleware) {
        self.middleware.push((name.into(), middleware));
    }

    /// Remove every middleware registered under `name`.
    pub fn remove(&mut self, name: &str) {
        self.middleware.retain(|(n, _)| n != name);
    }

    pub fn names(&self) -> Vec<&str> {
        self.middleware.iter().map(|(n, _)| n.as_str()).collect()
    }

    /// Compose the middleware around the innermost handler.
    pub fn resolve(&self) -> BoxHandler {
        self.middleware
            .iter()
            .rev()
            .fold(self.handler.clone(), |next, (_, wrap)| wrap(next))
    }
}

impl Handler for HandlerStack {
    fn call(&self, request: Request<Bytes>, options: &RequestOptions) -> Result<Response<Bytes>> {
        self.resolve().call(request, options)
    }
}
