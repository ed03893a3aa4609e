//! The response cache middleware: lookup before the handler, write-back after.

use std::collections::BTreeMap;
use std::fmt;
use std::pin::Pin;
use std::sync::Arc;

use bytes::Bytes;
use tracing::{debug, warn};

use super::store::{CacheStore, RedisStore};
use super::{CacheConfig, CacheError, CacheKey, StoreError, policy};
use crate::context::Context;
use crate::http::Headers;
use crate::middleware::{Middleware, Next};
use crate::{Request, Response, StatusCode};

/// Marker header set on every response that went through a lookup.
pub const CACHE_STATUS_HEADER: &str = "X-Cache";

/// Value of the [`CACHE_STATUS_HEADER`] marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    Hit,
    Miss,
}

impl CacheStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hit => "HIT",
            Self::Miss => "MISS",
        }
    }
}

impl fmt::Display for CacheStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A complete entry read back from the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedResponse {
    headers: BTreeMap<String, String>,
    payload: Bytes,
}

impl CachedResponse {
    /// Header fields as they were captured.
    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    pub fn payload(&self) -> &Bytes {
        &self.payload
    }

    /// Rebuilds the response served on a hit: `200 OK`, every captured
    /// header, `X-Cache: HIT`, and the stored payload as the body.
    pub fn into_response(self) -> Response {
        let mut response = Response::new(StatusCode::Ok);
        for (name, value) in self.headers {
            response.add_header(name, value);
        }
        response.set_header(CACHE_STATUS_HEADER, CacheStatus::Hit.as_str());
        response.body_bytes(self.payload)
    }
}

/// Result of the lookup stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    Hit(CachedResponse),
    Miss,
}

impl Lookup {
    pub fn status(&self) -> CacheStatus {
        match self {
            Self::Hit(_) => CacheStatus::Hit,
            Self::Miss => CacheStatus::Miss,
        }
    }
}

/// What the downstream handler produced, as seen by the persistence stage.
#[derive(Debug, Clone)]
pub enum HandlerOutcome {
    /// The handler finished; its response may be cached.
    Completed(Response),
    /// The handler failed; nothing is cached.
    Failed { status: StatusCode },
}

impl HandlerOutcome {
    /// Classifies a finished response.
    ///
    /// A hit is always replayed as `200 OK`, so only a `200` counts as a
    /// completed handler. Redirects and client or server errors are failures
    /// and never reach the store.
    pub fn from_response(response: &Response) -> Self {
        match response.status() {
            StatusCode::Ok => Self::Completed(response.clone()),
            status => Self::Failed { status },
        }
    }
}

/// Report of a successful write-back: both halves stored and expiring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Persisted {
    pub header_key: String,
    pub payload_key: String,
    pub ttl_secs: u64,
}

type CompletionCallback = Arc<dyn Fn(&CacheKey, Result<Persisted, CacheError>) + Send + Sync>;

/// Redis-style response cache for the middleware pipeline.
///
/// Install it ahead of the handlers whose responses should be cached. For
/// each request it:
///
/// 1. reads both halves of the entry for the request target concurrently;
/// 2. on a hit, answers with the cached response and skips downstream;
/// 3. on a miss, runs downstream and marks the response `X-Cache: MISS`;
/// 4. after the response exists, writes it back on a spawned task.
///
/// A store failure during the lookup becomes a `500` response. Failures during
/// write-back never touch the response; they go to the completion callback
/// installed with [`on_complete`](Self::on_complete), or to the log.
///
/// `ResponseCache` is cheap to clone; clones share the store and callback.
#[derive(Clone)]
pub struct ResponseCache {
    config: Arc<CacheConfig>,
    store: Arc<dyn CacheStore>,
    on_complete: Option<CompletionCallback>,
}

impl ResponseCache {
    pub fn new(config: CacheConfig, store: Arc<dyn CacheStore>) -> Self {
        Self {
            config: Arc::new(config),
            store,
            on_complete: None,
        }
    }

    /// Builds a cache over a Redis store that connects on first use.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Redis`] if the configured address is unusable.
    pub fn redis(config: CacheConfig) -> Result<Self, StoreError> {
        let store = RedisStore::new(&config)?;
        Ok(Self::new(config, Arc::new(store)))
    }

    /// Installs a callback receiving the outcome of every write-back,
    /// including the refusal to cache a failed handler's response.
    #[must_use]
    pub fn on_complete<F>(mut self, callback: F) -> Self
    where
        F: Fn(&CacheKey, Result<Persisted, CacheError>) + Send + Sync + 'static,
    {
        self.on_complete = Some(Arc::new(callback));
        self
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub fn key_for(&self, request: &Request) -> CacheKey {
        CacheKey::from_request(request, &self.config)
    }

    /// Lookup stage for `request`.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Store`] if either read fails. Missing or
    /// unreadable data is a [`Lookup::Miss`], not an error.
    pub async fn before(&self, request: &Request) -> Result<Lookup, CacheError> {
        self.lookup(&self.key_for(request)).await
    }

    /// Reads both halves of `key` and decides hit or miss.
    ///
    /// Both reads always run to completion; if either fails the other's
    /// result is discarded.
    pub async fn lookup(&self, key: &CacheKey) -> Result<Lookup, CacheError> {
        let (headers, payload) = tokio::join!(
            self.store.get(key.header_key()),
            self.store.get(key.payload_key()),
        );
        let (headers, payload) = (headers?, payload?);

        let (Some(headers), Some(payload)) = (headers, payload) else {
            debug!(key = %key, "cache miss");
            return Ok(Lookup::Miss);
        };

        match serde_json::from_slice::<BTreeMap<String, String>>(&headers) {
            Ok(headers) => {
                debug!(key = %key, "cache hit");
                Ok(Lookup::Hit(CachedResponse {
                    headers,
                    payload: Bytes::from(payload),
                }))
            }
            Err(err) => {
                debug!(key = %key, error = %err, "cached headers unreadable, treating as miss");
                Ok(Lookup::Miss)
            }
        }
    }

    /// Persistence stage: writes `outcome` back under `key`.
    ///
    /// The header and payload halves are written by two independent
    /// `set` → `expire` chains running concurrently. Both chains run to
    /// completion; the header chain's error is reported first.
    ///
    /// # Errors
    ///
    /// - [`CacheError::Upstream`] — the handler failed or answered with
    ///   anything but `200 OK`; the store was not touched.
    /// - [`CacheError::Store`] — a `set` or `expire` failed.
    pub async fn after(
        &self,
        key: &CacheKey,
        outcome: HandlerOutcome,
    ) -> Result<Persisted, CacheError> {
        let response = match outcome {
            HandlerOutcome::Completed(response) if response.status() == StatusCode::Ok => response,
            HandlerOutcome::Completed(response) => {
                return Err(CacheError::Upstream {
                    status: response.status(),
                });
            }
            HandlerOutcome::Failed { status } => return Err(CacheError::Upstream { status }),
        };

        let ttl_secs = policy::cache_ttl(response.headers(), self.config.default_ttl_secs);
        let headers = serde_json::to_vec(&capture_headers(response.headers()))?;

        let (header_chain, payload_chain) = tokio::join!(
            self.write_half(key.header_key(), &headers, ttl_secs),
            self.write_half(key.payload_key(), response.body_ref(), ttl_secs),
        );
        header_chain?;
        payload_chain?;

        Ok(Persisted {
            header_key: key.header_key().to_owned(),
            payload_key: key.payload_key().to_owned(),
            ttl_secs,
        })
    }

    async fn write_half(&self, key: &str, value: &[u8], ttl_secs: u64) -> Result<(), StoreError> {
        self.store.set(key, value).await?;
        self.store.expire(key, ttl_secs).await
    }

    fn complete(&self, key: &CacheKey, result: Result<Persisted, CacheError>) {
        if let Some(callback) = &self.on_complete {
            callback(key, result);
            return;
        }

        match result {
            Ok(persisted) => debug!(key = %key, ttl = persisted.ttl_secs, "response cached"),
            Err(CacheError::Upstream { status }) => {
                debug!(key = %key, %status, "handler failed, response not cached");
            }
            Err(err) => warn!(key = %key, error = %err, "failed to cache response"),
        }
    }

    // Write-back runs detached so the response is never held up by the store.
    fn spawn_after(&self, key: CacheKey, outcome: HandlerOutcome) {
        let cache = self.clone();
        tokio::spawn(async move {
            let result = cache.after(&key, outcome).await;
            cache.complete(&key, result);
        });
    }
}

impl fmt::Debug for ResponseCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResponseCache")
            .field("config", &self.config)
            .field("on_complete", &self.on_complete.is_some())
            .finish_non_exhaustive()
    }
}

impl Middleware for ResponseCache {
    /// Serve from the cache or run downstream, then write the response back.
    ///
    /// A hit is written back as well, which refreshes the TTL of both halves
    /// on every hit.
    fn handle(&self, ctx: Context, next: Next) -> Pin<Box<dyn Future<Output = Response> + Send>> {
        let cache = self.clone();

        Box::pin(async move {
            let key = cache.key_for(ctx.request());

            let response = match cache.lookup(&key).await {
                Ok(Lookup::Hit(cached)) => cached.into_response(),
                Ok(Lookup::Miss) => {
                    let mut response = next.run(ctx).await;
                    response.set_header(CACHE_STATUS_HEADER, CacheStatus::Miss.as_str());
                    response
                }
                Err(err) => {
                    warn!(key = %key, error = %err, "cache lookup failed");
                    return Response::new(StatusCode::InternalServerError)
                        .body("Cache lookup failed");
                }
            };

            cache.spawn_after(key, HandlerOutcome::from_response(&response));
            response
        })
    }
}

// Never captured: the cache marker, and `Set-Cookie`, whose repeated values
// cannot be joined into one field without corrupting them.
const UNCAPTURED_HEADERS: [&str; 2] = [CACHE_STATUS_HEADER, "Set-Cookie"];

// Flattens headers into one value per name. Repeated names are joined with
// ", " under the first spelling seen.
fn capture_headers(headers: &Headers) -> BTreeMap<String, String> {
    let mut captured: BTreeMap<String, String> = BTreeMap::new();

    for (name, value) in headers.iter() {
        if UNCAPTURED_HEADERS
            .iter()
            .any(|skipped| name.eq_ignore_ascii_case(skipped))
        {
            continue;
        }
        match captured
            .iter_mut()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
        {
            Some((_, joined)) => {
                joined.push_str(", ");
                joined.push_str(value);
            }
            None => {
                captured.insert(name.to_owned(), value.to_owned());
            }
        }
    }

    captured
}
