//! Incoming request as the pipeline sees it.

use super::{Headers, Method};

/// A request handed to the middleware chain by the server in front of it.
///
/// The target is kept split into path and query; [`target`](Self::target)
/// glues them back together, which is what the cache keys on.
///
/// # Examples
///
/// ```
/// use rttp_cache::http::Request;
///
/// let request = Request::get("/widgets?page=2").header("Host", "localhost");
///
/// assert_eq!(request.path(), "/widgets");
/// assert_eq!(request.query_string(), Some("page=2"));
/// assert_eq!(request.target(), "/widgets?page=2");
/// ```
#[derive(Debug, Clone)]
pub struct Request {
    method: Method,
    path: String,
    query: Option<String>,
    headers: Headers,
}

impl Request {
    /// Builds a request for `target` (path with an optional `?query`).
    pub fn new(method: Method, target: &str) -> Self {
        let (path, query) = split_target(target);
        Self {
            method,
            path,
            query,
            headers: Headers::new(),
        }
    }

    pub fn get(target: &str) -> Self {
        Self::new(Method::Get, target)
    }

    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Path without the query string.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Query string without the leading `?`, if the target had one.
    pub fn query_string(&self) -> Option<&str> {
        self.query.as_deref()
    }

    /// The path followed by `?query` when present.
    pub fn target(&self) -> String {
        match &self.query {
            Some(query) => format!("{}?{}", self.path, query),
            None => self.path.clone(),
        }
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }
}

// `?` with an empty query still counts as a query so the target is preserved verbatim.
fn split_target(target: &str) -> (String, Option<String>) {
    match target.split_once('?') {
        Some((path, query)) => (path.to_owned(), Some(query.to_owned())),
        None => (target.to_owned(), None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_path_has_no_query() {
        let req = Request::get("/").header("Host", "localhost");
        assert_eq!(req.method(), &Method::Get);
        assert_eq!(req.path(), "/");
        assert_eq!(req.query_string(), None);
        assert_eq!(req.target(), "/");
        assert_eq!(req.headers().get("host"), Some("localhost"));
    }

    #[test]
    fn target_keeps_query() {
        let req = Request::new(Method::Post, "/search?q=rust&page=2");
        assert_eq!(req.path(), "/search");
        assert_eq!(req.target(), "/search?q=rust&page=2");
    }

    #[test]
    fn empty_query_is_preserved() {
        let req = Request::get("/widgets?");
        assert_eq!(req.query_string(), Some(""));
        assert_eq!(req.target(), "/widgets?");
    }

    #[test]
    fn only_first_question_mark_splits() {
        let req = Request::get("/a?b?c");
        assert_eq!(req.path(), "/a");
        assert_eq!(req.query_string(), Some("b?c"));
    }
}
