//! Fail-open verdict cache.
//!
//! `KvStore` is the narrow capability over whatever key/value backend is
//! wired in; `VerdictCache` is the decorator that namespaces keys,
//! (de)serializes pipeline results, and swallows every backend failure so
//! cache trouble can never change a verification outcome.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::CacheError;
use crate::types::PipelineResult;

pub const VERDICT_KEY_PREFIX: &str = "claim_verdict:";

/// Default verdict TTL: 7 days.
pub const DEFAULT_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

#[async_trait]
pub trait KvStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;
    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError>;
}

/// In-process store with per-entry expiry. Expired entries are dropped
/// lazily on read.
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, (String, Instant)>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KvStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                Some((value, expires)) if *expires > Instant::now() => {
                    return Ok(Some(value.clone()))
                }
                Some(_) => {}
                None => return Ok(None),
            }
        }
        self.entries.write().await.remove(key);
        Ok(None)
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError> {
        let expires = Instant::now() + ttl;
        self.entries.write().await.insert(key.to_string(), (value, expires));
        Ok(())
    }
}

/// Fingerprint -> PipelineResult cache, fail-open on every path.
#[derive(Clone)]
pub struct VerdictCache {
    store: Arc<dyn KvStore>,
    ttl: Duration,
}

impl VerdictCache {
    pub fn new(store: Arc<dyn KvStore>, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    pub fn in_memory(ttl: Duration) -> Self {
        Self::new(Arc::new(MemoryStore::new()), ttl)
    }

    /// Returns the cached result, or `None` on miss, empty fingerprint,
    /// backend failure, or corrupt payload.
    pub async fn get(&self, fingerprint: &str) -> Option<PipelineResult> {
        if fingerprint.is_empty() {
            return None;
        }
        let key = format!("{VERDICT_KEY_PREFIX}{fingerprint}");
        let raw = match self.store.get(&key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(err) => {
                debug!(%err, "verdict cache read failed, treating as miss");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(result) => Some(result),
            Err(err) => {
                debug!(%err, "corrupt cached verdict, treating as miss");
                None
            }
        }
    }

    /// Write-through; failures are dropped.
    pub async fn set(&self, fingerprint: &str, result: &PipelineResult) {
        if fingerprint.is_empty() {
            return;
        }
        let raw = match serde_json::to_string(result) {
            Ok(raw) => raw,
            Err(err) => {
                debug!(%err, "verdict serialization failed, skipping cache write");
                return;
            }
        };
        let key = format!("{VERDICT_KEY_PREFIX}{fingerprint}");
        if let Err(err) = self.store.set(&key, raw, self.ttl).await {
            debug!(%err, "verdict cache write failed, dropping");
        }
    }
}
