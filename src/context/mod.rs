//! Per-request context handed down the middleware chain.

use crate::Request;

/// Per-request context.
///
/// Owns the [`Request`] for the lifetime of a single pass through the
/// pipeline. Each middleware receives it by value and forwards it with
/// [`Next::run`](crate::middleware::Next::run).
#[derive(Debug)]
pub struct Context {
    request: Request,
}

impl Context {
    /// Create a new context from a request
    pub fn new(request: Request) -> Self {
        Self { request }
    }

    pub fn request(&self) -> &Request {
        &self.request
    }

    pub fn into_request(self) -> Request {
        self.request
    }
}

impl From<Request> for Context {
    fn from(request: Request) -> Self {
        Self::new(request)
    }
}
