//! Expectations: single-use rules describing a request and its canned response.
//!
//! An expectation matches on method, path and (optionally) scheme and host of
//! the registered URI, plus a caller-supplied predicate. Once it handles a
//! request it keeps that request for inspection and never matches again.

mod source;

pub use source::ResponseSource;

use crate::captured::CapturedRequest;
use crate::error::Result;
use crate::options::RequestOptions;
use crate::response::{default_response, ResponseBuilder};
use bytes::Bytes;
use hyper::{Method, Request, Response, Uri};
use once_cell::sync::OnceCell;
use parking_lot::{Mutex, RwLock};
use std::fmt;
use std::sync::Arc;
use tracing::{trace, warn};

/// Decides whether a request that already matched method and path should be handled.
pub type Predicate = Arc<dyn Fn(&Request<Bytes>, &RequestOptions) -> bool + Send + Sync>;

/// Observes the request an expectation consumes.
pub type Inspector = Arc<dyn Fn(&Request<Bytes>, &RequestOptions) + Send + Sync>;

/// Operations shared by expectations and their decorators.
///
/// The setter-style methods take `&self`: implementations share state
/// between the registry and the handle returned to the caller.
pub trait RequestHandler: Send + Sync {
    /// Upper-cased method this handler expects.
    fn method(&self) -> &Method;

    /// The URI the handler was registered with.
    fn uri(&self) -> &Uri;

    fn should_handle(&self, request: &Request<Bytes>, options: &RequestOptions) -> bool;

    /// Consume `request`: run the inspector, capture the request and return the response.
    fn handle(&self, request: Request<Bytes>, options: &RequestOptions) -> Response<Bytes>;

    fn set_predicate(&self, predicate: Predicate);

    fn set_inspector(&self, inspector: Inspector);

    fn set_response(&self, source: ResponseSource);

    /// The consumed request, if any.
    fn request(&self) -> Option<CapturedRequest>;

    fn is_consumed(&self) -> bool {
        self.request().is_some()
    }

    /// Only handle requests for which `predicate` returns true.
    fn when<F>(self, predicate: F) -> Self
    where
        F: Fn(&Request<Bytes>, &RequestOptions) -> bool + Send + Sync + 'static,
        Self: Sized,
    {
        self.set_predicate(Arc::new(predicate));
        self
    }

    /// Call `inspector` with the request when it is handled.
    fn inspect_request<F>(self, inspector: F) -> Self
    where
        F: Fn(&Request<Bytes>, &RequestOptions) + Send + Sync + 'static,
        Self: Sized,
    {
        self.set_inspector(Arc::new(inspector));
        self
    }

    /// Respond with a finished response, a status, or `(status, body[, headers])`.
    fn respond_with(self, source: impl Into<ResponseSource>) -> Self
    where
        Self: Sized,
    {
        self.set_response(source.into());
        self
    }

    /// Respond with whatever `build` produces from a fresh `ResponseBuilder`.
    fn respond_using<F>(self, build: F) -> Self
    where
        F: FnOnce(ResponseBuilder) -> ResponseBuilder + Send + 'static,
        Self: Sized,
    {
        self.set_response(ResponseSource::builder(build));
        self
    }
}

/// The base expectation. Clones are handles to the same expectation.
#[derive(Clone)]
pub struct Expectation {
    state: Arc<State>,
}

struct State {
    method: Method,
    uri: Uri,
    /// `uri` path without leading slashes.
    path: String,
    predicate: RwLock<Predicate>,
    inspector: RwLock<Option<Inspector>>,
    response: Mutex<Response<Bytes>>,
    captured: OnceCell<CapturedRequest>,
}

impl fmt::Debug for Expectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Expectation")
            .field("method", &self.state.method)
            .field("uri", &self.state.uri)
            .field("consumed", &self.is_consumed())
            .finish()
    }
}

impl Expectation {
    /// Create an expectation answering with 200 and an empty body to every
    /// request for `method` and `uri`.
    pub fn new(method: &str, uri: &str) -> Result<Self> {
        let method = normalize_method(method)?;
        let uri = parse_expected_uri(uri)?;
        let path = trim_path(uri.path()).to_string();
        let always: Predicate = Arc::new(|_: &Request<Bytes>, _: &RequestOptions| true);

        Ok(Expectation {
            state: Arc::new(State {
                method,
                uri,
                path,
                predicate: RwLock::new(always),
                inspector: RwLock::new(None),
                response: Mutex::new(default_response()),
                captured: OnceCell::new(),
            }),
        })
    }

    /// Normalized path used for matching.
    pub fn path(&self) -> &str {
        &self.state.path
    }

    /// Human readable `METHOD uri` description.
    pub fn describe(&self) -> String {
        format!("{} {}", self.state.method, self.state.uri)
    }
}

impl RequestHandler for Expectation {
    fn method(&self) -> &Method {
        &self.state.method
    }

    fn uri(&self) -> &Uri {
        &self.state.uri
    }

    fn should_handle(&self, request: &Request<Bytes>, options: &RequestOptions) -> bool {
        if self.is_consumed() {
            return false;
        }

        let expected = &self.state.uri;
        let actual = request.uri();

        if let Some(host) = expected.host() {
            if !actual.host().is_some_and(|h| h.eq_ignore_ascii_case(host)) {
                return false;
            }
        }

        if let Some(scheme) = expected.scheme_str() {
            if !actual.scheme_str().is_some_and(|s| s.eq_ignore_ascii_case(scheme)) {
                return false;
            }
        }

        if !request
            .method()
            .as_str()
            .eq_ignore_ascii_case(self.state.method.as_str())
        {
            return false;
        }

        if trim_path(actual.path()) != self.state.path {
            return false;
        }

        // Clone out of the lock so the predicate may touch this expectation
        let predicate = self.state.predicate.read().clone();
        let matched = predicate(request, options);
        if !matched {
            trace!("Predicate rejected {} {}", request.method(), actual);
        }
        matched
    }

    fn handle(&self, request: Request<Bytes>, options: &RequestOptions) -> Response<Bytes> {
        let inspector = self.state.inspector.read().clone();
        if let Some(inspector) = inspector {
            inspector(&request, options);
        }

        if self.state.captured.set(CapturedRequest::new(request)).is_err() {
            warn!(
                "Expectation {} handled more than one request; keeping the first",
                self.describe()
            );
        }

        clone_response(&self.state.response.lock())
    }

    fn set_predicate(&self, predicate: Predicate) {
        *self.state.predicate.write() = predicate;
    }

    fn set_inspector(&self, inspector: Inspector) {
        *self.state.inspector.write() = Some(inspector);
    }

    fn set_response(&self, source: ResponseSource) {
        let response = source.resolve();
        *self.state.response.lock() = response;
    }

    fn request(&self) -> Option<CapturedRequest> {
        self.state.captured.get().cloned()
    }
}

/// Upper-case and parse an HTTP method name.
pub fn normalize_method(method: &str) -> Result<Method> {
    Ok(Method::from_bytes(method.to_ascii_uppercase().as_bytes())?)
}

/// Parse a registered URI. Anything without `://` is taken as a path
/// (with optional query), so `"users"` and `"/users"` are equivalent.
pub fn parse_expected_uri(uri: &str) -> Result<Uri> {
    if uri.contains("://") {
        return Ok(uri.parse()?);
    }
    Ok(format!("/{}", uri.trim_start_matches('/')).parse()?)
}

pub(crate) fn trim_path(path: &str) -> &str {
    path.trim_start_matches('/')
}

/// `http::Response` is not `Clone`; copy everything but extensions.
fn clone_response(response: &Response<Bytes>) -> Response<Bytes> {
    let mut copy = Response::new(response.body().clone());
    *copy.status_mut() = response.status();
    *copy.version_mut() = response.version();
    *copy.headers_mut() = response.headers().clone();
    copy
}
