//! Client construction with an optional transport override.
//!
//! Code under test builds its clients through a `ClientFactory`. Tests set a
//! handler override on the factory (usually a [`MockHandler`](crate::MockHandler)),
//! and every client made afterwards sends through it while keeping whatever
//! middleware the caller configured.

use super::handler::{BoxHandler, Handler};
use super::stack::HandlerStack;
use super::Client;
use crate::options::RequestOptions;
use hyper::{HeaderMap, Uri};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// The transport a client sends through.
#[derive(Clone)]
pub enum ClientHandler {
    /// Middleware around an innermost handler.
    Stack(HandlerStack),
    /// A bare handler with no middleware.
    Handler(BoxHandler),
}

impl fmt::Debug for ClientHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientHandler::Stack(stack) => f.debug_tuple("Stack").field(stack).finish(),
            ClientHandler::Handler(_) => f.write_str("Handler(<handler>)"),
        }
    }
}

impl ClientHandler {
    pub fn as_stack(&self) -> Option<&HandlerStack> {
        match self {
            ClientHandler::Stack(stack) => Some(stack),
            ClientHandler::Handler(_) => None,
        }
    }

    pub fn as_stack_mut(&mut self) -> Option<&mut HandlerStack> {
        match self {
            ClientHandler::Stack(stack) => Some(stack),
            ClientHandler::Handler(_) => None,
        }
    }

    pub fn as_handler(&self) -> Option<&BoxHandler> {
        match self {
            ClientHandler::Handler(handler) => Some(handler),
            ClientHandler::Stack(_) => None,
        }
    }

    pub(crate) fn resolve(&self) -> BoxHandler {
        match self {
            ClientHandler::Stack(stack) => stack.resolve(),
            ClientHandler::Handler(handler) => handler.clone(),
        }
    }
}

impl From<HandlerStack> for ClientHandler {
    fn from(stack: HandlerStack) -> Self {
        ClientHandler::Stack(stack)
    }
}

impl From<BoxHandler> for ClientHandler {
    fn from(handler: BoxHandler) -> Self {
        ClientHandler::Handler(handler)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ClientOptions {
    /// Base for relative request URIs.
    pub base_uri: Option<Uri>,
    /// Transport; `HandlerStack::create()` when absent.
    pub handler: Option<ClientHandler>,
    /// Headers added to every request that does not set them itself.
    pub headers: HeaderMap,
    /// Defaults merged into every request's options.
    pub defaults: RequestOptions,
}

impl ClientOptions {
    pub fn base_uri(mut self, base_uri: Uri) -> Self {
        self.base_uri = Some(base_uri);
        self
    }

    pub fn handler(mut self, handler: impl Into<ClientHandler>) -> Self {
        self.handler = Some(handler.into());
        self
    }
}

#[derive(Clone, Default)]
pub struct ClientFactory {
    handler: Option<BoxHandler>,
}

impl fmt::Debug for ClientFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientFactory")
            .field("has_handler", &self.handler.is_some())
            .finish()
    }
}

impl ClientFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every client created from now on send through `handler`.
    pub fn set_handler(&mut self, handler: impl Handler + 'static) {
        self.handler = Some(Arc::new(handler));
    }

    pub fn handler(&self) -> Option<&BoxHandler> {
        self.handler.as_ref()
    }

    /// Create a client.
    ///
    /// Without an override the options are used as given. With one, a
    /// caller-supplied stack (or the default stack) keeps its middleware and
    /// gets the override as its innermost handler, while a bare handler is
    /// replaced by the override.
    pub fn make(&self, mut options: ClientOptions) -> Client {
        if let Some(handler) = &self.handler {
            let wrapped = match options.handler.take() {
                Some(ClientHandler::Handler(_)) => {
                    debug!("Replacing client handler with the factory override");
                    ClientHandler::Handler(handler.clone())
                }
                Some(ClientHandler::Stack(mut stack)) => {
                    stack.set_boxed_handler(handler.clone());
                    ClientHandler::Stack(stack)
                }
                None => {
                    let mut stack = HandlerStack::create();
                    stack.set_boxed_handler(handler.clone());
                    ClientHandler::Stack(stack)
                }
            };
            options.handler = Some(wrapped);
        }

        Client::new(options)
    }
}
