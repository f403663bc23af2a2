use crate::error::{Error, Result};
use crate::options::RequestOptions;
use bytes::Bytes;
use hyper::{Request, Response};
use std::sync::Arc;
use tracing::warn;

/// Sends one request and produces its response.
///
/// Implemented for closures with the matching signature, for
/// [`HandlerStack`](super::HandlerStack) and for
/// [`MockHandler`](crate::MockHandler).
pub trait Handler: Send + Sync {
    fn call(&self, request: Request<Bytes>, options: &RequestOptions) -> Result<Response<Bytes>>;
}

pub type BoxHandler = Arc<dyn Handler>;

impl<F> Handler for F
where
    F: Fn(Request<Bytes>, &RequestOptions) -> Result<Response<Bytes>> + Send + Sync,
{
    fn call(&self, request: Request<Bytes>, options: &RequestOptions) -> Result<Response<Bytes>> {
        self(request, options)
    }
}

/// Default innermost handler: this crate never performs network I/O.
pub fn no_transport(request: Request<Bytes>, _options: &RequestOptions) -> Result<Response<Bytes>> {
    warn!(
        "Refusing to send {} {}: no transport configured",
        request.method(),
        request.uri()
    );
    Err(Error::NoTransport {
        method: request.method().clone(),
        uri: request.uri().clone(),
    })
}
