//! TTL cache and cache-through fetch layer.
//!
//! This crate provides the in-memory caching core used by the Fortuna
//! client:
//! - A generic key/value cache with per-entry expiration
//! - Lazy eviction on read plus a periodic sweep for unread entries
//! - A cache-through wrapper that keys network requests by resource and
//!   request options
//!
//! # Example
//!
//! ```rust,ignore
//! use fortuna_cache::{CacheConfig, TtlCache};
//!
//! let cache: TtlCache<String> = TtlCache::new(CacheConfig::default());
//! cache.insert("greeting", "hello".to_string()).await;
//! ```

mod cache;
mod config;
mod error;
mod fetch;

pub use cache::{CacheEntry, TtlCache};
pub use config::CacheConfig;
pub use error::{Error, Result};
pub use fetch::{CachedFetch, FetchOptions, Fetcher};
