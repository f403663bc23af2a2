//! A declarative fake HTTP transport for tests.
//!
//! Register expectations ("a GET to `/users` answers with this"), hand the
//! mock to the code under test as its transport, then inspect what was sent.
//! Every dispatched request consumes the first registered expectation that
//! accepts it; unmatched requests fail with [`Error::UnhandledRequest`].
//!
//! ```
//! use fake_requests::client::{Client, ClientOptions, HandlerStack};
//! use fake_requests::{MockHandler, RequestHandler};
//!
//! let mock = MockHandler::new();
//! let users = mock.get("/users").respond_with((200, r#"[{"id":1}]"#));
//!
//! let client = Client::new(ClientOptions::default().handler(HandlerStack::new(mock.clone())));
//! let response = client.get("/users?page=2").unwrap();
//!
//! assert_eq!(response.body(), r#"[{"id":1}]"#);
//! users.request().unwrap().assert_has_query_param("page", "2");
//! assert!(mock.is_empty());
//! ```
//!
//! ## Module Structure
//!
//! - `response`: response synthesizer (`ResponseBuilder`, body conversions)
//! - `captured`: read-only view and assertions over a consumed request
//! - `expectation`: a single matching rule and its response
//! - `decorator`: caller-defined handle types wrapping expectations
//! - `mock`: the dispatch engine (`MockHandler`)
//! - `config`: expectations loaded from YAML or JSON
//! - `client`: handler stacks and a client factory to thread the mock through
//! - `testing`: logging setup and the `fake_requests()` guard

// ===== Core =====
pub mod captured;
pub mod decorator;
pub mod expectation;
pub mod mock;
pub mod response;

// ===== Plumbing =====
pub mod client;
pub mod config;
pub mod error;
pub mod options;
pub mod testing;

pub use captured::{CapturedRequest, QueryParams};
pub use client::{Client, ClientFactory, ClientHandler, ClientOptions, Handler, HandlerStack};
pub use config::MockConfig;
pub use decorator::{Chain, Decorator, Delegate, Undecorated};
pub use error::{Error, Result};
pub use expectation::{Expectation, Inspector, Predicate, RequestHandler, ResponseSource};
pub use mock::MockHandler;
pub use options::RequestOptions;
pub use response::{IntoBody, Json, ResponseBuilder};
pub use testing::{fake_requests, FakeRequests};
