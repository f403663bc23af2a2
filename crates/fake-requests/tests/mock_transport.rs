//! Integration tests driving the mock through real clients
//!
//! Each test plays the part of code under test that builds its HTTP client
//! from a `ClientFactory`, with the factory pointed at a `MockHandler`.

use fake_requests::client::http_errors;
use fake_requests::testing::init_test_logging;
use fake_requests::{
    fake_requests, ClientFactory, ClientOptions, Decorator, Delegate, Error, Expectation,
    HandlerStack, MockConfig, MockHandler, RequestHandler, RequestOptions,
};
use hyper::{Method, StatusCode};
use serde_json::{json, Value};

/// A tiny API client standing in for application code.
struct UserApi {
    client: fake_requests::Client,
}

impl UserApi {
    fn new(factory: &ClientFactory) -> Self {
        let options = ClientOptions::default().base_uri("https://users.example.com/api/".parse().unwrap());
        UserApi {
            client: factory.make(options),
        }
    }

    fn find(&self, id: u32) -> fake_requests::Result<Value> {
        let response = self.client.get(&format!("users/{id}"))?;
        Ok(serde_json::from_slice(response.body()).unwrap_or(Value::Null))
    }

    fn create(&self, name: &str) -> fake_requests::Result<StatusCode> {
        let response = self.client.request(
            Method::POST,
            "users",
            RequestOptions::new()
                .json(json!({ "name": name }))
                .header("x-request-id", "abc-123"),
        )?;
        Ok(response.status())
    }
}

#[test]
fn test_application_client_is_served_by_mock() {
    init_test_logging();

    let fake = fake_requests();
    fake.get("https://users.example.com/api/users/1")
        .respond_with((200, json!({ "id": 1, "name": "ada" })));
    let created = fake.post("/api/users").respond_with(201);

    let api = UserApi::new(fake.factory());
    assert_eq!(api.find(1).unwrap(), json!({ "id": 1, "name": "ada" }));
    assert_eq!(api.create("grace").unwrap(), StatusCode::CREATED);

    let request = created.request().unwrap();
    request.assert_has_header("content-type", "application/json");
    request.assert_has_header("x-request-id", "abc-123");
    request.assert_has_header("content-length", "16");
    request.assert_json_body_equals(json!({ "name": "grace" }));
}

#[test]
fn test_error_statuses_surface_through_default_stack() {
    init_test_logging();

    let fake = fake_requests();
    fake.get("/api/users/404").respond_with((404, "not found"));

    let err = UserApi::new(fake.factory()).find(404).unwrap_err();
    match err {
        Error::Status { status, uri } => {
            assert_eq!(status, StatusCode::NOT_FOUND);
            assert_eq!(uri.host(), Some("users.example.com"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_http_errors_can_be_disabled() {
    init_test_logging();

    let fake = fake_requests();
    fake.get("/a").respond_with(500);
    fake.get("/b").respond_with(500);

    let mut stack = HandlerStack::create();
    stack.remove("http_errors");
    let client = fake.client_with(ClientOptions::default().handler(stack));
    assert_eq!(client.get("/a").unwrap().status(), StatusCode::INTERNAL_SERVER_ERROR);

    let client = fake.client();
    let response = client
        .request(Method::GET, "/b", RequestOptions::new().http_errors(false))
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[test]
fn test_caller_middleware_wraps_mock() {
    init_test_logging();

    let mock = MockHandler::new();
    mock.get("/teapot").respond_with(418);

    let mut factory = ClientFactory::new();
    factory.set_handler(mock.clone());

    let mut stack = HandlerStack::create();
    stack.remove("http_errors");
    stack.push("errors_again", http_errors());
    let client = factory.make(ClientOptions::default().handler(stack));

    assert!(matches!(client.get("/teapot"), Err(Error::Status { .. })));
    assert!(mock.is_empty());
}

#[test]
fn test_unexpected_request_fails_the_call() {
    init_test_logging();

    let mock = MockHandler::new();
    let mut factory = ClientFactory::new();
    factory.set_handler(mock.clone());

    let err = factory
        .make(ClientOptions::default())
        .delete("/sessions/current")
        .unwrap_err();
    assert!(err.is_unhandled_request());
    assert_eq!(
        err.to_string(),
        "There was no response defined for the DELETE request to \"/sessions/current\"."
    );
}

#[test]
fn test_without_override_nothing_is_sent() {
    init_test_logging();

    let client = ClientFactory::new().make(ClientOptions::default());
    assert!(matches!(client.get("/anything"), Err(Error::NoTransport { .. })));
}

/// Exposes the decoded request body of the consumed request.
#[derive(Clone)]
struct JsonCall(Expectation);

impl Delegate for JsonCall {
    fn delegate(&self) -> &dyn RequestHandler {
        &self.0
    }
}

impl JsonCall {
    fn sent(&self) -> Value {
        self.request()
            .and_then(|r| r.json_body().ok().cloned())
            .unwrap_or(Value::Null)
    }
}

struct JsonCalls;

impl Decorator for JsonCalls {
    type Output = JsonCall;

    fn decorate(&self, expectation: Expectation) -> JsonCall {
        JsonCall(expectation)
    }
}

#[test]
fn test_decorated_expectations_through_client() {
    init_test_logging();

    let mock = MockHandler::new().set_decorator(JsonCalls);
    let call = mock.post("/events").respond_with(202);

    let mut factory = ClientFactory::new();
    factory.set_handler(mock.clone());
    let response = factory
        .make(ClientOptions::default())
        .request(
            Method::POST,
            "/events",
            RequestOptions::new().json(json!({ "kind": "signup" })),
        )
        .unwrap();

    assert_eq!(response.status(), StatusCode::ACCEPTED);
    assert_eq!(call.sent(), json!({ "kind": "signup" }));
    assert!(mock.is_empty());
}

#[test]
fn test_fixture_driven_expectations() {
    init_test_logging();

    let config = MockConfig::from_json_str(
        r#"{
            "expectations": [
                { "method": "GET", "uri": "/health", "response": { "body": "ok" } },
                { "method": "PUT", "uri": "/flags/beta", "response": { "status": 204 } }
            ]
        }"#,
    )
    .unwrap();

    let fake = fake_requests();
    fake.apply_config(&config).unwrap();

    let client = fake.client();
    assert_eq!(client.get("/health").unwrap().body(), "ok");
    assert_eq!(client.put("flags/beta").unwrap().status(), StatusCode::NO_CONTENT);
}
