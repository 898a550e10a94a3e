//! Cache-through wrapper for network fetches.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, trace};

use crate::cache::TtlCache;
use crate::error::Result;

/// Serializable request descriptor used to derive cache keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchOptions {
    /// HTTP method.
    pub method: String,

    /// Query parameters, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<Value>,

    /// JSON request body, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
}

impl FetchOptions {
    /// Options for a plain GET request.
    pub fn get() -> Self {
        Self {
            method: "GET".to_string(),
            query: None,
            body: None,
        }
    }

    /// Options for a POST request with a JSON body.
    pub fn post(body: Value) -> Self {
        Self {
            method: "POST".to_string(),
            query: None,
            body: Some(body),
        }
    }

    /// Attach query parameters.
    pub fn with_query(mut self, query: Value) -> Self {
        self.query = Some(query);
        self
    }
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self::get()
    }
}

/// A source of JSON payloads addressed by resource path.
///
/// Implemented by the HTTP client; test doubles count or script calls.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch `resource` with the given request options.
    ///
    /// A non-success upstream status is an error; an empty success body
    /// is `Value::Null`.
    async fn fetch(&self, resource: &str, options: &FetchOptions) -> Result<Value>;
}

/// Cache-through fetch layer.
///
/// Responses are cached under a key derived from the resource and a
/// canonical serialization of the request options, so identical
/// requests inside the TTL window hit the cache and requests that
/// differ in any option never share an entry.
///
/// Concurrent misses for the same key are not coalesced: each reaches
/// the upstream, and the last response to arrive owns the cache slot.
pub struct CachedFetch<F> {
    fetcher: F,
    cache: TtlCache<Value>,
}

impl<F: Fetcher> CachedFetch<F> {
    /// Create a new cache-through layer over `fetcher`.
    pub fn new(fetcher: F, cache: TtlCache<Value>) -> Self {
        Self { fetcher, cache }
    }

    /// Access the underlying cache.
    pub fn cache(&self) -> &TtlCache<Value> {
        &self.cache
    }

    /// Derive the cache key for a resource and options pair.
    pub fn cache_key(resource: &str, options: &FetchOptions) -> String {
        // Struct field order makes the serialization deterministic.
        let options = serde_json::to_string(options).unwrap_or_default();
        format!("{resource}:{options}")
    }

    /// Fetch with the cache's default TTL.
    pub async fn fetch<T: DeserializeOwned>(
        &self,
        resource: &str,
        options: &FetchOptions,
    ) -> Result<T> {
        self.fetch_with_ttl(resource, options, self.cache.config().default_ttl)
            .await
    }

    /// Fetch, caching a fresh response for `ttl`.
    pub async fn fetch_with_ttl<T: DeserializeOwned>(
        &self,
        resource: &str,
        options: &FetchOptions,
        ttl: Duration,
    ) -> Result<T> {
        let key = Self::cache_key(resource, options);

        if let Some(value) = self.cache.get(&key).await {
            trace!(resource = %resource, "fetch served from cache");
            return Ok(serde_json::from_value(value)?);
        }

        debug!(resource = %resource, "fetch cache miss");
        let value = self.fetcher.fetch(resource, options).await?;
        self.cache
            .insert_with_ttl(key, value.clone(), ttl)
            .await;

        Ok(serde_json::from_value(value)?)
    }

    /// Fetch from the upstream unconditionally, repopulating the cache.
    pub async fn force_fetch<T: DeserializeOwned>(
        &self,
        resource: &str,
        options: &FetchOptions,
    ) -> Result<T> {
        let key = Self::cache_key(resource, options);

        debug!(resource = %resource, "forced fetch, bypassing cache");
        let value = self.fetcher.fetch(resource, options).await?;
        self.cache
            .insert_with_ttl(key, value.clone(), self.cache.config().default_ttl)
            .await;

        Ok(serde_json::from_value(value)?)
    }
}
