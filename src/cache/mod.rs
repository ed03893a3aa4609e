//! Response caching backed by a shared key-value store.
//!
//! [`ResponseCache`] is a [`Middleware`](crate::middleware::Middleware) that
//! answers repeat requests from the store and writes fresh responses back
//! after the handler has produced them.
//!
//! Every cached resource occupies two store keys derived from the request
//! target: one for the serialized response headers and one for the raw body.
//! Both carry the same TTL, taken from the response's `cache-control:
//! max-age` when present and from [`CacheConfig::default_ttl_secs`]
//! otherwise. A resource whose keys are not both present is a miss.
//!
//! # Examples
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use rttp_cache::cache::{CacheConfig, ResponseCache};
//! use rttp_cache::context::Context;
//! use rttp_cache::middleware::{Next, endpoint, from_middleware};
//! use rttp_cache::{Request, Response, StatusCode};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let cache = ResponseCache::redis(CacheConfig::from_env())?;
//!
//! let chain = vec![
//!     from_middleware(Arc::new(cache)),
//!     endpoint(|_ctx| async {
//!         Response::new(StatusCode::Ok)
//!             .header("Content-Type", "application/json")
//!             .header("Cache-Control", "public, max-age=120")
//!             .body(r#"{"a":1}"#)
//!     }),
//! ];
//!
//! let response = Next::new(chain).run(Context::new(Request::get("/widgets"))).await;
//! assert_eq!(response.headers().get("x-cache"), Some("MISS"));
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod key;
pub mod middleware;
pub mod policy;
pub mod store;

pub use config::{CacheConfig, StoreOptions};
pub use error::{CacheError, StoreError};
pub use key::CacheKey;
pub use middleware::{
    CACHE_STATUS_HEADER, CacheStatus, CachedResponse, HandlerOutcome, Lookup, Persisted,
    ResponseCache,
};
pub use policy::{MAX_TTL_SECS, cache_ttl};
pub use store::{CacheStore, MemoryStore, RedisStore};
