//! Cache identity and the two physical store keys derived from it.

use std::fmt;

use super::CacheConfig;
use crate::Request;

/// The store address of one cached response.
///
/// The identity is the request target (path plus `?query`), so `/widgets`
/// and `/widgets?page=2` are cached separately.
///
/// # Examples
///
/// ```
/// use rttp_cache::Request;
/// use rttp_cache::cache::{CacheConfig, CacheKey};
///
/// let config = CacheConfig::default().with_prefixes("h_", "p_");
/// let key = CacheKey::from_request(&Request::get("/widgets?page=2"), &config);
///
/// assert_eq!(key.identity(), "/widgets?page=2");
/// assert_eq!(key.header_key(), "h_/widgets?page=2");
/// assert_eq!(key.payload_key(), "p_/widgets?page=2");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    identity: String,
    header_key: String,
    payload_key: String,
}

impl CacheKey {
    /// Builds the key for `identity` under the configured prefixes.
    pub fn new(identity: impl Into<String>, config: &CacheConfig) -> Self {
        let identity = identity.into();
        Self {
            header_key: format!("{}{}", config.header_prefix, identity),
            payload_key: format!("{}{}", config.payload_prefix, identity),
            identity,
        }
    }

    /// Builds the key for a request's target.
    pub fn from_request(request: &Request, config: &CacheConfig) -> Self {
        Self::new(request.target(), config)
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    /// Store key holding the serialized headers.
    pub fn header_key(&self) -> &str {
        &self.header_key
    }

    /// Store key holding the raw body.
    pub fn payload_key(&self) -> &str {
        &self.payload_key
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.identity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_prefixes() {
        let key = CacheKey::new("/", &CacheConfig::default());
        assert_eq!(key.header_key(), "header_/");
        assert_eq!(key.payload_key(), "payload_/");
    }

    #[test]
    fn query_strings_are_distinct_identities() {
        let config = CacheConfig::default();
        let plain = CacheKey::from_request(&Request::get("/widgets"), &config);
        let paged = CacheKey::from_request(&Request::get("/widgets?page=2"), &config);
        assert_ne!(plain, paged);
        assert_eq!(paged.to_string(), "/widgets?page=2");
    }

    #[test]
    fn method_does_not_change_identity() {
        let config = CacheConfig::default();
        let get = CacheKey::from_request(&Request::get("/a"), &config);
        let head = CacheKey::from_request(&Request::new(crate::Method::Head, "/a"), &config);
        assert_eq!(get, head);
    }
}
