//! Test harness helpers.
//!
//! [`fake_requests`] wires a fresh [`MockHandler`] into a [`ClientFactory`]
//! and returns a guard that fails the test if any expectation is still
//! pending when it goes out of scope.

use crate::client::{Client, ClientFactory, ClientOptions};
use crate::mock::MockHandler;
use std::ops::Deref;
use tracing_subscriber::EnvFilter;

/// Install a `tracing` subscriber that writes through the test harness.
///
/// Honours `RUST_LOG`, defaulting to `fake_requests=debug`. Safe to call
/// from every test; only the first call installs anything.
pub fn init_test_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("fake_requests=debug"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

/// Create a mock transport and a factory whose clients send through it.
pub fn fake_requests() -> FakeRequests {
    let mock = MockHandler::new();
    let mut factory = ClientFactory::new();
    factory.set_handler(mock.clone());
    FakeRequests { mock, factory }
}

/// Owns a mock transport for the duration of a test.
///
/// Dereferences to the [`MockHandler`], so expectations are registered
/// directly on the guard. Dropping it outside of a panic asserts that every
/// expectation was consumed.
#[derive(Debug)]
pub struct FakeRequests {
    mock: MockHandler,
    factory: ClientFactory,
}

impl FakeRequests {
    pub fn mock(&self) -> &MockHandler {
        &self.mock
    }

    pub fn factory(&self) -> &ClientFactory {
        &self.factory
    }

    /// A client with the default stack sending through the mock.
    pub fn client(&self) -> Client {
        self.factory.make(ClientOptions::default())
    }

    /// A client built from `options` sending through the mock.
    pub fn client_with(&self, options: ClientOptions) -> Client {
        self.factory.make(options)
    }
}

impl Deref for FakeRequests {
    type Target = MockHandler;

    fn deref(&self) -> &MockHandler {
        &self.mock
    }
}

impl Drop for FakeRequests {
    fn drop(&mut self) {
        if std::thread::panicking() {
            return;
        }
        let pending = self.mock.pending();
        assert!(
            pending.is_empty(),
            "Not every expected request was made. Pending: {}",
            pending.join(", ")
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expectation::RequestHandler;

    #[test]
    fn test_client_sends_through_mock() {
        let fake = fake_requests();
        let expectation = fake.get("/ping").respond_with((200, "pong"));

        let response = fake.client().get("/ping").unwrap();
        assert_eq!(response.body(), "pong");
        assert!(expectation.is_consumed());
    }

    #[test]
    fn test_drop_with_consumed_expectations_passes() {
        let fake = fake_requests();
        fake.post("/events");
        fake.client().post("/events").unwrap();
        drop(fake);
    }

    #[test]
    #[should_panic(expected = "Not every expected request was made. Pending: GET /never")]
    fn test_drop_with_pending_expectation_panics() {
        let fake = fake_requests();
        fake.get("never");
    }

    #[test]
    fn test_guard_shares_registry_with_mock() {
        let fake = fake_requests();
        fake.mock().delete("/items/1");
        assert_eq!(fake.len(), 1);
        fake.client().delete("/items/1").unwrap();
        assert!(fake.is_empty());
    }
}
