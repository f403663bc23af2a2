//! Decorators extend expectations with caller-defined behaviour.
//!
//! A decorator turns every newly registered `Expectation` into its own
//! handle type. That type implements [`Delegate`], which forwards the whole
//! [`RequestHandler`] contract to the wrapped handler and exposes two hook
//! points (`before_handle`, `also_handles`). Anything else the decorated type
//! offers, typically typed accessors over the captured request, lives in its
//! own inherent methods.
//!
//! ```
//! use fake_requests::{Decorator, Delegate, Expectation, MockHandler, RequestHandler};
//!
//! #[derive(Clone)]
//! struct Traced(Expectation);
//!
//! impl Delegate for Traced {
//!     fn delegate(&self) -> &dyn RequestHandler {
//!         &self.0
//!     }
//! }
//!
//! impl Traced {
//!     fn sent_body(&self) -> Option<String> {
//!         self.request().and_then(|r| r.body_str().map(str::to_string))
//!     }
//! }
//!
//! struct TraceDecorator;
//!
//! impl Decorator for TraceDecorator {
//!     type Output = Traced;
//!
//!     fn decorate(&self, expectation: Expectation) -> Traced {
//!         Traced(expectation)
//!     }
//! }
//!
//! let mock = MockHandler::new().set_decorator(TraceDecorator);
//! let expectation = mock.post("/events");
//! assert_eq!(expectation.sent_body(), None);
//! ```

use crate::captured::CapturedRequest;
use crate::expectation::{Expectation, Inspector, Predicate, RequestHandler, ResponseSource};
use crate::options::RequestOptions;
use bytes::Bytes;
use hyper::{Method, Request, Response, Uri};

/// Wraps a handler of type `H` into the decorator's own handle type.
///
/// Decorating must not have side effects; the wrapped handler keeps
/// ownership of matching and single consumption.
pub trait Decorator<H = Expectation>: Send + Sync {
    type Output: RequestHandler + Clone + 'static;

    fn decorate(&self, handler: H) -> Self::Output;

    /// Apply `next` on top of this decorator's output.
    fn and_then<N>(self, next: N) -> Chain<Self, N>
    where
        Self: Sized,
        N: Decorator<Self::Output>,
    {
        Chain { first: self, next }
    }
}

/// The default decorator: expectations are returned as they are.
#[derive(Debug, Clone, Copy, Default)]
pub struct Undecorated;

impl Decorator for Undecorated {
    type Output = Expectation;

    fn decorate(&self, handler: Expectation) -> Expectation {
        handler
    }
}

/// Two decorators applied one after the other.
#[derive(Debug, Clone, Copy)]
pub struct Chain<A, B> {
    first: A,
    next: B,
}

impl<H, A, B> Decorator<H> for Chain<A, B>
where
    A: Decorator<H>,
    B: Decorator<A::Output>,
{
    type Output = B::Output;

    fn decorate(&self, handler: H) -> Self::Output {
        self.next.decorate(self.first.decorate(handler))
    }
}

/// Forwarding base for decorated handle types.
pub trait Delegate: Send + Sync {
    /// The wrapped handler every operation is forwarded to.
    fn delegate(&self) -> &dyn RequestHandler;

    /// Runs before the wrapped handler consumes the request.
    fn before_handle(&self, _request: &Request<Bytes>, _options: &RequestOptions) {}

    /// Extra matching condition evaluated after the wrapped handler agreed.
    fn also_handles(&self, _request: &Request<Bytes>, _options: &RequestOptions) -> bool {
        true
    }
}

impl<T: Delegate> RequestHandler for T {
    fn method(&self) -> &Method {
        self.delegate().method()
    }

    fn uri(&self) -> &Uri {
        self.delegate().uri()
    }

    fn should_handle(&self, request: &Request<Bytes>, options: &RequestOptions) -> bool {
        self.delegate().should_handle(request, options) && self.also_handles(request, options)
    }

    fn handle(&self, request: Request<Bytes>, options: &RequestOptions) -> Response<Bytes> {
        self.before_handle(&request, options);
        self.delegate().handle(request, options)
    }

    fn set_predicate(&self, predicate: Predicate) {
        self.delegate().set_predicate(predicate)
    }

    fn set_inspector(&self, inspector: Inspector) {
        self.delegate().set_inspector(inspector)
    }

    fn set_response(&self, source: ResponseSource) {
        self.delegate().set_response(source)
    }

    fn request(&self) -> Option<CapturedRequest> {
        self.delegate().request()
    }

    fn is_consumed(&self) -> bool {
        self.delegate().is_consumed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hyper::StatusCode;
    use parking_lot::Mutex;
    use serde_json::Value;
    use std::sync::Arc;

    #[derive(Clone)]
    struct JsonExpectation {
        inner: Expectation,
    }

    impl Delegate for JsonExpectation {
        fn delegate(&self) -> &dyn RequestHandler {
            &self.inner
        }
    }

    impl JsonExpectation {
        fn decoded_request_body(&self) -> Option<Value> {
            self.request()
                .and_then(|request| request.json_body().ok().cloned())
        }
    }

    struct JsonDecorator;

    impl Decorator for JsonDecorator {
        type Output = JsonExpectation;

        fn decorate(&self, inner: Expectation) -> JsonExpectation {
            JsonExpectation { inner }
        }
    }

    /// Records every request it sees and refuses requests without a body.
    #[derive(Clone)]
    struct Audited<H> {
        inner: H,
        log: Arc<Mutex<Vec<String>>>,
    }

    impl<H: RequestHandler> Delegate for Audited<H> {
        fn delegate(&self) -> &dyn RequestHandler {
            &self.inner
        }

        fn before_handle(&self, request: &Request<Bytes>, _options: &RequestOptions) {
            self.log.lock().push(request.uri().to_string());
        }

        fn also_handles(&self, request: &Request<Bytes>, _options: &RequestOptions) -> bool {
            !request.body().is_empty()
        }
    }

    struct AuditDecorator(Arc<Mutex<Vec<String>>>);

    impl<H: RequestHandler + Clone + 'static> Decorator<H> for AuditDecorator {
        type Output = Audited<H>;

        fn decorate(&self, inner: H) -> Audited<H> {
            Audited {
                inner,
                log: self.0.clone(),
            }
        }
    }

    fn post(body: &'static str) -> Request<Bytes> {
        Request::builder()
            .method("POST")
            .uri("/events")
            .body(Bytes::from_static(body.as_bytes()))
            .unwrap()
    }

    #[test]
    fn test_decorated_handler_forwards_contract() {
        let decorated = JsonDecorator
            .decorate(Expectation::new("post", "events").unwrap())
            .respond_with(202);

        assert_eq!(decorated.method(), Method::POST);
        assert_eq!(decorated.uri().path(), "/events");
        assert!(decorated.should_handle(&post("{}"), &RequestOptions::default()));
        assert!(decorated.decoded_request_body().is_none());

        let response = decorated.handle(post(r#"{"id":1}"#), &RequestOptions::default());
        assert_eq!(response.status(), StatusCode::ACCEPTED);
        assert_eq!(decorated.decoded_request_body(), Some(serde_json::json!({"id": 1})));
        assert!(decorated.is_consumed());
    }

    #[test]
    fn test_consumption_lives_in_wrapped_expectation() {
        let base = Expectation::new("POST", "/events").unwrap();
        let decorated = JsonDecorator.decorate(base.clone());

        decorated.handle(post("{}"), &RequestOptions::default());

        assert!(base.is_consumed());
        assert!(!decorated.should_handle(&post("{}"), &RequestOptions::default()));
    }

    #[test]
    fn test_hooks_and_composition() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let decorator = JsonDecorator.and_then(AuditDecorator(log.clone()));
        let decorated = decorator.decorate(Expectation::new("POST", "/events").unwrap());

        // The outer decorator narrows matching
        assert!(!decorated.should_handle(&post(""), &RequestOptions::default()));
        assert!(decorated.should_handle(&post(r#"{"a":true}"#), &RequestOptions::default()));

        decorated.handle(post(r#"{"a":true}"#), &RequestOptions::default());

        assert_eq!(log.lock().as_slice(), ["/events"]);
        // Inner decorator's accessor is still reachable through the chain
        assert_eq!(
            decorated.inner.decoded_request_body(),
            Some(serde_json::json!({"a": true}))
        );
    }

    #[test]
    fn test_undecorated_is_identity() {
        let base = Expectation::new("GET", "/").unwrap();
        let same = Undecorated.decorate(base.clone());
        same.handle(
            Request::builder().uri("/").body(Bytes::new()).unwrap(),
            &RequestOptions::default(),
        );
        assert!(base.is_consumed());
    }
}
