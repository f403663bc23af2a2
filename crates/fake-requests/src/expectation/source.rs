//! The forms a canned response can be given in.

use crate::response::{IntoBody, ResponseBuilder};
use bytes::Bytes;
use hyper::Response;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

type BuildFn = Box<dyn FnOnce(ResponseBuilder) -> ResponseBuilder + Send>;

/// Response configuration accepted by `respond_with`.
///
/// Each variant is resolved into a concrete response as soon as it is
/// handed to an expectation.
pub enum ResponseSource {
    /// A finished response, returned as-is.
    Fixed(Response<Bytes>),
    /// A callback that configures a fresh `ResponseBuilder`.
    Builder(BuildFn),
    /// Status with optional body and headers.
    Parameters {
        status: u16,
        body: Bytes,
        headers: Vec<(String, String)>,
    },
}

impl fmt::Debug for ResponseSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResponseSource::Fixed(response) => f.debug_tuple("Fixed").field(response).finish(),
            ResponseSource::Builder(_) => f.write_str("Builder(<callback>)"),
            ResponseSource::Parameters {
                status,
                body,
                headers,
            } => f
                .debug_struct("Parameters")
                .field("status", status)
                .field("body", body)
                .field("headers", headers)
                .finish(),
        }
    }
}

impl ResponseSource {
    pub fn builder<F>(build: F) -> Self
    where
        F: FnOnce(ResponseBuilder) -> ResponseBuilder + Send + 'static,
    {
        ResponseSource::Builder(Box::new(build))
    }

    pub fn resolve(self) -> Response<Bytes> {
        match self {
            ResponseSource::Fixed(response) => response,
            ResponseSource::Builder(build) => build(ResponseBuilder::new()).build(),
            ResponseSource::Parameters {
                status,
                body,
                headers,
            } => ResponseBuilder::new()
                .status(status)
                .body(body)
                .headers(headers)
                .build(),
        }
    }
}

fn header_pairs<K: AsRef<str>, V: AsRef<str>>(
    headers: impl IntoIterator<Item = (K, V)>,
) -> Vec<(String, String)> {
    headers
        .into_iter()
        .map(|(k, v)| (k.as_ref().to_string(), v.as_ref().to_string()))
        .collect()
}

impl From<Response<Bytes>> for ResponseSource {
    fn from(response: Response<Bytes>) -> Self {
        ResponseSource::Fixed(response)
    }
}

impl From<ResponseBuilder> for ResponseSource {
    fn from(builder: ResponseBuilder) -> Self {
        ResponseSource::Fixed(builder.build())
    }
}

impl From<u16> for ResponseSource {
    fn from(status: u16) -> Self {
        ResponseSource::Parameters {
            status,
            body: Bytes::new(),
            headers: Vec::new(),
        }
    }
}

impl<B: IntoBody> From<(u16, B)> for ResponseSource {
    fn from((status, body): (u16, B)) -> Self {
        ResponseSource::Parameters {
            status,
            body: body.into_body(),
            headers: Vec::new(),
        }
    }
}

impl<B, K, V, const N: usize> From<(u16, B, [(K, V); N])> for ResponseSource
where
    B: IntoBody,
    K: AsRef<str>,
    V: AsRef<str>,
{
    fn from((status, body, headers): (u16, B, [(K, V); N])) -> Self {
        ResponseSource::Parameters {
            status,
            body: body.into_body(),
            headers: header_pairs(headers),
        }
    }
}

impl<B, K, V> From<(u16, B, Vec<(K, V)>)> for ResponseSource
where
    B: IntoBody,
    K: AsRef<str>,
    V: AsRef<str>,
{
    fn from((status, body, headers): (u16, B, Vec<(K, V)>)) -> Self {
        ResponseSource::Parameters {
            status,
            body: body.into_body(),
            headers: header_pairs(headers),
        }
    }
}

impl<B, K, V> From<(u16, B, HashMap<K, V>)> for ResponseSource
where
    B: IntoBody,
    K: AsRef<str>,
    V: AsRef<str>,
{
    fn from((status, body, headers): (u16, B, HashMap<K, V>)) -> Self {
        ResponseSource::Parameters {
            status,
            body: body.into_body(),
            headers: header_pairs(headers),
        }
    }
}

impl<B, K, V> From<(u16, B, BTreeMap<K, V>)> for ResponseSource
where
    B: IntoBody,
    K: AsRef<str>,
    V: AsRef<str>,
{
    fn from((status, body, headers): (u16, B, BTreeMap<K, V>)) -> Self {
        ResponseSource::Parameters {
            status,
            body: body.into_body(),
            headers: header_pairs(headers),
        }
    }
}
