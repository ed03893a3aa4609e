//! Cache configuration.
//!
//! A [`CacheConfig`] is built once at startup and handed to
//! [`ResponseCache`](super::ResponseCache). It can come from three places:
//! [`CacheConfig::default`], a deserialized config file section, or
//! [`CacheConfig::from_env`]. Fields missing from either source keep their
//! default value.

use std::env;

use serde::Deserialize;

/// Default store host.
pub const DEFAULT_HOST: &str = "localhost";
/// Default store port.
pub const DEFAULT_PORT: u16 = 6379;
/// Default TTL applied when a response carries no usable `max-age` (one hour).
pub const DEFAULT_TTL_SECS: u64 = 60 * 60;
/// Default prefix for the serialized-headers half of an entry.
pub const DEFAULT_HEADER_PREFIX: &str = "header_";
/// Default prefix for the body half of an entry.
pub const DEFAULT_PAYLOAD_PREFIX: &str = "payload_";

/// Response cache configuration.
///
/// # Examples
///
/// ```
/// use rttp_cache::cache::CacheConfig;
///
/// let config = CacheConfig::default()
///     .with_ttl(60)
///     .with_prefixes("h_", "p_");
///
/// assert_eq!(config.port, 6379);
/// assert_eq!(config.default_ttl_secs, 60);
/// assert_eq!(config.header_prefix, "h_");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Store host name or address.
    pub host: String,

    /// Store TCP port.
    pub port: u16,

    /// Connection options passed through to the store client.
    pub options: StoreOptions,

    /// TTL in seconds when the response does not declare `max-age`.
    pub default_ttl_secs: u64,

    /// Namespace prefix for header keys.
    pub header_prefix: String,

    /// Namespace prefix for payload keys.
    pub payload_prefix: String,
}

/// Store connection options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StoreOptions {
    /// Logical database index.
    pub database: i64,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            options: StoreOptions::default(),
            default_ttl_secs: DEFAULT_TTL_SECS,
            header_prefix: DEFAULT_HEADER_PREFIX.to_string(),
            payload_prefix: DEFAULT_PAYLOAD_PREFIX.to_string(),
        }
    }
}

impl CacheConfig {
    /// Load configuration from `RTTP_CACHE_*` environment variables.
    ///
    /// | Variable                    | Field              |
    /// |-----------------------------|--------------------|
    /// | `RTTP_CACHE_HOST`           | `host`             |
    /// | `RTTP_CACHE_PORT`           | `port`             |
    /// | `RTTP_CACHE_DB`             | `options.database` |
    /// | `RTTP_CACHE_USERNAME`       | `options.username` |
    /// | `RTTP_CACHE_PASSWORD`       | `options.password` |
    /// | `RTTP_CACHE_TTL`            | `default_ttl_secs` |
    /// | `RTTP_CACHE_HEADER_PREFIX`  | `header_prefix`    |
    /// | `RTTP_CACHE_PAYLOAD_PREFIX` | `payload_prefix`   |
    ///
    /// Unset or unparseable variables leave the default in place.
    pub fn from_env() -> Self {
        Self::from_source(|name| env::var(name).ok())
    }

    /// Like [`from_env`](Self::from_env), reading variables through `lookup`.
    pub fn from_source<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        Self {
            host: lookup("RTTP_CACHE_HOST").unwrap_or(defaults.host),
            port: lookup("RTTP_CACHE_PORT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.port),
            options: StoreOptions {
                database: lookup("RTTP_CACHE_DB")
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(defaults.options.database),
                username: lookup("RTTP_CACHE_USERNAME"),
                password: lookup("RTTP_CACHE_PASSWORD"),
            },
            default_ttl_secs: lookup("RTTP_CACHE_TTL")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.default_ttl_secs),
            header_prefix: lookup("RTTP_CACHE_HEADER_PREFIX").unwrap_or(defaults.header_prefix),
            payload_prefix: lookup("RTTP_CACHE_PAYLOAD_PREFIX")
                .unwrap_or(defaults.payload_prefix),
        }
    }

    /// Sets the store address.
    #[must_use]
    pub fn with_store(mut self, host: impl Into<String>, port: u16) -> Self {
        self.host = host.into();
        self.port = port;
        self
    }

    /// Sets the store connection options.
    #[must_use]
    pub fn with_options(mut self, options: StoreOptions) -> Self {
        self.options = options;
        self
    }

    /// Sets the fallback TTL in seconds.
    #[must_use]
    pub fn with_ttl(mut self, secs: u64) -> Self {
        self.default_ttl_secs = secs;
        self
    }

    /// Sets both key prefixes.
    #[must_use]
    pub fn with_prefixes(mut self, header: impl Into<String>, payload: impl Into<String>) -> Self {
        self.header_prefix = header.into();
        self.payload_prefix = payload.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = CacheConfig::default();
        assert_eq!(config.host, "localhost");
        assert_eq!(config.port, 6379);
        assert_eq!(config.default_ttl_secs, 3600);
        assert_eq!(config.header_prefix, "header_");
        assert_eq!(config.payload_prefix, "payload_");
        assert_eq!(config.options, StoreOptions::default());
    }

    #[test]
    fn source_overrides_and_ignores_garbage() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("RTTP_CACHE_HOST", "cache.internal"),
            ("RTTP_CACHE_PORT", "not-a-port"),
            ("RTTP_CACHE_DB", "3"),
            ("RTTP_CACHE_TTL", "60"),
            ("RTTP_CACHE_HEADER_PREFIX", "h_"),
        ]);
        let config = CacheConfig::from_source(|name| vars.get(name).map(|v| v.to_string()));

        assert_eq!(config.host, "cache.internal");
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.options.database, 3);
        assert_eq!(config.default_ttl_secs, 60);
        assert_eq!(config.header_prefix, "h_");
        assert_eq!(config.payload_prefix, DEFAULT_PAYLOAD_PREFIX);
    }

    #[test]
    fn partial_json_section_keeps_defaults() {
        let config: CacheConfig =
            serde_json::from_str(r#"{"port": 6380, "options": {"password": "s3cret"}}"#).unwrap();
        assert_eq!(config.host, DEFAULT_HOST);
        assert_eq!(config.port, 6380);
        assert_eq!(config.options.password.as_deref(), Some("s3cret"));
        assert_eq!(config.default_ttl_secs, DEFAULT_TTL_SECS);
    }
}
