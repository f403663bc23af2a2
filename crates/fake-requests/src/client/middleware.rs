//! Default middleware installed by `HandlerStack::create`.

use super::handler::BoxHandler;
use super::stack::Middleware;
use crate::error::Error;
use crate::options::{RequestOptions, HTTP_ERRORS};
use bytes::Bytes;
use hyper::header::{HeaderValue, CONTENT_LENGTH};
use hyper::Request;
use serde_json::Value;
use std::sync::Arc;

/// Turn 4xx and 5xx responses into `Error::Status`, unless the request
/// options set `http_errors` to false.
pub fn http_errors() -> Middleware {
    Arc::new(|next: BoxHandler| {
        Arc::new(move |request: Request<Bytes>, options: &RequestOptions| {
            let uri = request.uri().clone();
            let response = next.call(request, options)?;

            let enabled = options.get(HTTP_ERRORS) != Some(&Value::Bool(false));
            let status = response.status();
            if enabled && (status.is_client_error() || status.is_server_error()) {
                return Err(Error::Status { status, uri });
            }
            Ok(response)
        }) as BoxHandler
    })
}

/// Add a `content-length` header to requests with a body when none is set.
pub fn prepare_body() -> Middleware {
    Arc::new(|next: BoxHandler| {
        Arc::new(move |mut request: Request<Bytes>, options: &RequestOptions| {
            if !request.body().is_empty() && !request.headers().contains_key(CONTENT_LENGTH) {
                let length = HeaderValue::from(request.body().len());
                request.headers_mut().insert(CONTENT_LENGTH, length);
            }
            next.call(request, options)
        }) as BoxHandler
    })
}
