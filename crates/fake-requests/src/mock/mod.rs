//! The dispatch engine.
//!
//! `MockHandler` keeps registered expectations in declaration order. Each
//! dispatched request is matched against them front to back; the first
//! expectation that accepts the request is removed and answers it. Several
//! expectations for the same method and path therefore answer successive
//! requests in the order they were declared.
//!
//! Clones of a `MockHandler` share the same registry, so one clone can be
//! handed to a client as its transport while the test keeps registering
//! expectations and checking `is_empty` on another.

use crate::client::Handler;
use crate::config::MockConfig;
use crate::decorator::{Decorator, Undecorated};
use crate::error::{Error, Result};
use crate::expectation::{normalize_method, Expectation, RequestHandler};
use crate::options::RequestOptions;
use crate::response::default_response;
use bytes::Bytes;
use hyper::{Request, Response};
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};


#[derive(Default)]
struct Registry {
    handlers: Vec<Arc<dyn RequestHandler>>,
    allow_unexpected: bool,
}

pub struct MockHandler<D = Undecorated> {
    registry: Arc<Mutex<Registry>>,
    decorator: Arc<D>,
}

impl<D> Clone for MockHandler<D> {
    fn clone(&self) -> Self {
        MockHandler {
            registry: self.registry.clone(),
            decorator: self.decorator.clone(),
        }
    }
}

impl<D> fmt::Debug for MockHandler<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let registry = self.registry.lock();
        f.debug_struct("MockHandler")
            .field("pending", &registry.handlers.len())
            .field("allow_unexpected", &registry.allow_unexpected)
            .finish()
    }
}

impl Default for MockHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl MockHandler {
    pub fn new() -> Self {
        MockHandler {
            registry: Arc::new(Mutex::new(Registry::default())),
            decorator: Arc::new(Undecorated),
        }
    }
}

impl<D> MockHandler<D> {
    /// Decorate every expectation registered from now on with `decorator`.
    ///
    /// The returned handler shares this handler's registry; expectations
    /// registered earlier keep their original type.
    pub fn set_decorator<N: Decorator>(self, decorator: N) -> MockHandler<N> {
        MockHandler {
            registry: self.registry,
            decorator: Arc::new(decorator),
        }
    }

    /// Answer unmatched requests with an empty 200 instead of failing.
    pub fn allow_unexpected_calls(&self) -> &Self {
        self.registry.lock().allow_unexpected = true;
        self
    }

    pub fn allows_unexpected_calls(&self) -> bool {
        self.registry.lock().allow_unexpected
    }

    /// True when no registered expectation is waiting for a request.
    pub fn is_empty(&self) -> bool {
        self.registry.lock().handlers.is_empty()
    }

    /// Number of expectations still waiting for a request.
    pub fn len(&self) -> usize {
        self.registry.lock().handlers.len()
    }

    /// `METHOD uri` of every pending expectation, in match order.
    pub fn pending(&self) -> Vec<String> {
        self.registry
            .lock()
            .handlers
            .iter()
            .map(|h| format!("{} {}", h.method(), h.uri()))
            .collect()
    }

    /// Match `request` against the registered expectations.
    ///
    /// The first expectation that accepts the request is removed from the
    /// registry before it handles it. Predicates run without the registry
    /// lock held, so they may inspect this handler (or a clone of it).
    pub fn dispatch(
        &self,
        request: Request<Bytes>,
        options: &RequestOptions,
    ) -> Result<Response<Bytes>> {
        let (candidates, allow_unexpected) = {
            let registry = self.registry.lock();
            (registry.handlers.clone(), registry.allow_unexpected)
        };

        let matched = match candidates
            .iter()
            .position(|h| h.should_handle(&request, options))
        {
            Some(index) => {
                let handler = candidates[index].clone();
                self.registry
                    .lock()
                    .handlers
                    .retain(|h| !Arc::ptr_eq(h, &handler));
                Ok((index, handler))
            }
            None => Err(allow_unexpected),
        };

        match matched {
            Ok((index, handler)) => {
                debug!(
                    "Matched {} {} with expectation #{} ({} {})",
                    request.method(),
                    request.uri(),
                    index,
                    handler.method(),
                    handler.uri()
                );
                Ok(handler.handle(request, options))
            }
            Err(true) => {
                warn!(
                    "No expectation for {} {}, answering with the default response",
                    request.method(),
                    request.uri()
                );
                Ok(default_response())
            }
            Err(false) => {
                let method = normalize_method(request.method().as_str())?;
                Err(Error::unhandled(&method, request.uri()))
            }
        }
    }
}

impl<D: Decorator> MockHandler<D> {
    /// Register an expectation for `method` and `uri`, returning a fallible result
    /// instead of panicking on an invalid method or URI.
    pub fn try_expects(&self, method: &str, uri: &str) -> Result<D::Output> {
        let expectation = Expectation::new(method, uri)?;
        debug!("Registered expectation {}", expectation.describe());

        let decorated = self.decorator.decorate(expectation);
        self.registry
            .lock()
            .handlers
            .push(Arc::new(decorated.clone()));
        Ok(decorated)
    }

    /// Register an expectation for `method` and `uri`.
    ///
    /// Expectations are matched in registration order. `uri` may be a bare
    /// path (`"users"`, `"/users"`) matching any host, or an absolute URI
    /// that additionally pins scheme and host.
    ///
    /// # Panics
    ///
    /// Panics if `method` is not a valid HTTP method or `uri` cannot be parsed.
    #[track_caller]
    pub fn expects(&self, method: &str, uri: &str) -> D::Output {
        match self.try_expects(method, uri) {
            Ok(handler) => handler,
            Err(e) => panic!("Cannot register expectation for {method} {uri}: {e}"),
        }
    }

    #[track_caller]
    pub fn get(&self, uri: &str) -> D::Output {
        self.expects("GET", uri)
    }

    #[track_caller]
    pub fn post(&self, uri: &str) -> D::Output {
        self.expects("POST", uri)
    }

    #[track_caller]
    pub fn put(&self, uri: &str) -> D::Output {
        self.expects("PUT", uri)
    }

    #[track_caller]
    pub fn patch(&self, uri: &str) -> D::Output {
        self.expects("PATCH", uri)
    }

    #[track_caller]
    pub fn delete(&self, uri: &str) -> D::Output {
        self.expects("DELETE", uri)
    }

    #[track_caller]
    pub fn head(&self, uri: &str) -> D::Output {
        self.expects("HEAD", uri)
    }

    #[track_caller]
    pub fn options(&self, uri: &str) -> D::Output {
        self.expects("OPTIONS", uri)
    }

    /// Register every expectation described by `config`, in order.
    pub fn apply_config(&self, config: &MockConfig) -> Result<Vec<D::Output>> {
        if config.allow_unexpected_calls {
            self.allow_unexpected_calls();
        }

        config
            .expectations
            .iter()
            .map(|entry| -> Result<D::Output> {
                let handler = self.try_expects(&entry.method, &entry.uri)?;
                Ok(handler.respond_with(entry.response.to_builder()))
            })
            .collect()
    }
}

impl<D: Send + Sync> Handler for MockHandler<D> {
    fn call(&self, request: Request<Bytes>, options: &RequestOptions) -> Result<Response<Bytes>> {
        self.dispatch(request, options)
    }
}
