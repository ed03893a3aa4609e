//! # rttp-cache
//!
//! Redis-backed HTTP response caching for the rttp middleware pipeline.
//!
//! Put a [`ResponseCache`](cache::ResponseCache) in front of your handlers.
//! Repeat requests for the same target are answered straight from the store
//! with `X-Cache: HIT`. Everything else runs the handler, goes out with
//! `X-Cache: MISS`, and is written back with a TTL taken from the
//! response's `cache-control: max-age` or the configured default.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use rttp_cache::cache::{CacheConfig, ResponseCache};
//! use rttp_cache::context::Context;
//! use rttp_cache::middleware::{Next, endpoint, from_middleware};
//! use rttp_cache::{Request, Response, StatusCode};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let cache = ResponseCache::redis(CacheConfig::default().with_ttl(60))?;
//!     let chain = vec![
//!         from_middleware(Arc::new(cache)),
//!         endpoint(|_ctx| async { Response::new(StatusCode::Ok).body("Hello, World!") }),
//!     ];
//!
//!     let response = Next::new(chain).run(Context::new(Request::get("/hello"))).await;
//!     println!("{:?}", response.headers().get("x-cache"));
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod context;
pub mod http;
pub mod middleware;

// ── Convenience re-exports ────────────────────────────────────────────────────
pub use cache::{CacheConfig, CacheError, ResponseCache};
pub use http::{Headers, Method, Request, Response, StatusCode};
