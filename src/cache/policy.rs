//! TTL policy: how long a captured response stays in the store.

use tracing::warn;

use crate::http::Headers;

const MAX_AGE: &str = "max-age=";

/// Longest TTL the cache will ask a store for.
///
/// Redis keeps expiry as milliseconds since the epoch in an `i64`; half of
/// that range leaves room for the current time.
pub const MAX_TTL_SECS: u64 = i64::MAX as u64 / 2_000;

/// Returns the TTL in seconds for a response with the given headers.
///
/// Every `cache-control` field is scanned in order and the first
/// `max-age=<digits>` wins. Without one, or when the digits exceed
/// [`MAX_TTL_SECS`], `default_ttl` is used. The result never exceeds
/// [`MAX_TTL_SECS`].
///
/// # Examples
///
/// ```
/// use rttp_cache::cache::cache_ttl;
/// use rttp_cache::http::Headers;
///
/// let mut headers = Headers::new();
/// assert_eq!(cache_ttl(&headers, 3600), 3600);
///
/// headers.insert("Cache-Control", "public");
/// headers.insert("Cache-Control", "max-age=120");
/// assert_eq!(cache_ttl(&headers, 3600), 120);
/// ```
pub fn cache_ttl(headers: &Headers, default_ttl: u64) -> u64 {
    let default_ttl = default_ttl.min(MAX_TTL_SECS);
    let Some((field, digits)) = headers
        .get_all("cache-control")
        .find_map(|field| max_age(field).map(|digits| (field, digits)))
    else {
        return default_ttl;
    };

    match digits.parse::<u64>() {
        Ok(secs) if secs <= MAX_TTL_SECS => secs,
        Ok(secs) => {
            warn!(cache_control = field, secs, "max-age out of range, using default TTL");
            default_ttl
        }
        Err(err) => {
            warn!(cache_control = field, error = %err, "unusable max-age, using default TTL");
            default_ttl
        }
    }
}

// Case-sensitive literal match, no token boundary: `s-max-age=5` matches too.
fn max_age(cache_control: &str) -> Option<&str> {
    cache_control.match_indices(MAX_AGE).find_map(|(at, _)| {
        let rest = &cache_control[at + MAX_AGE.len()..];
        let end = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        (end > 0).then(|| &rest[..end])
    })
}
