//! Advisory result cache for backtests
//!
//! The cache is a collaborator: the engine only sees [`ResultCache`], stores JSON
//! bytes under a content-derived key, and treats every cache failure as a miss.
//! Monte Carlo results are never cached.

use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use rustc_hash::FxHashMap;
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::backtest::BacktestPlan;
use crate::error::CacheError;
use crate::model::BacktestResult;

/// Prefix of every backtest cache key
pub const KEY_PREFIX: &str = "backtest:";

/// Hex digits of the SHA-256 digest kept in a key
pub const KEY_DIGEST_LEN: usize = 16;

/// Byte-oriented key/value store with per-entry time-to-live.
///
/// Implementations must be safe to share between concurrent runs and must never
/// expose a partially written value.
pub trait ResultCache: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError>;

    fn put(&self, key: &str, value: &[u8], ttl: Duration) -> Result<(), CacheError>;
}

/// Cache that stores nothing. Used when caching is disabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopCache;

impl ResultCache for NoopCache {
    fn get(&self, _key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        Ok(None)
    }

    fn put(&self, _key: &str, _value: &[u8], _ttl: Duration) -> Result<(), CacheError> {
        Ok(())
    }
}

#[derive(Debug, Clone)]
struct Entry {
    bytes: Arc<[u8]>,
    expires_at: Instant,
}

/// Process-local cache. Expired entries are dropped lazily on read or by
/// [`InMemoryCache::purge_expired`].
#[derive(Debug, Default)]
pub struct InMemoryCache {
    entries: RwLock<FxHashMap<String, Entry>>,
}

impl InMemoryCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries, expired ones included
    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every expired entry, returning how many were removed
    pub fn purge_expired(&self) -> Result<usize, CacheError> {
        let now = Instant::now();
        let mut entries = self.entries.write()?;
        let before = entries.len();
        entries.retain(|_, e| e.expires_at > now);
        Ok(before - entries.len())
    }
}

impl ResultCache for InMemoryCache {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        let now = Instant::now();
        {
            let entries = self.entries.read()?;
            match entries.get(key) {
                None => return Ok(None),
                Some(e) if e.expires_at > now => return Ok(Some(e.bytes.to_vec())),
                Some(_) => {}
            }
        }

        let mut entries = self.entries.write()?;
        // A concurrent put may have refreshed the entry since the read
        if entries.get(key).is_some_and(|e| e.expires_at <= now) {
            entries.remove(key);
        }
        Ok(None)
    }

    fn put(&self, key: &str, value: &[u8], ttl: Duration) -> Result<(), CacheError> {
        let entry = Entry {
            bytes: Arc::from(value),
            expires_at: Instant::now() + ttl,
        };
        self.entries.write()?.insert(key.to_string(), entry);
        Ok(())
    }
}

/// Cache key of a resolved backtest plan: `backtest:` + 16 hex digits of SHA-256
/// over the plan's JSON.
pub fn backtest_key(plan: &BacktestPlan) -> Result<String, CacheError> {
    let payload = serde_json::to_vec(plan)?;
    let digest = format!("{:x}", Sha256::digest(&payload));
    Ok(format!("{KEY_PREFIX}{}", &digest[..KEY_DIGEST_LEN]))
}

/// Typed front of a [`ResultCache`] for backtest results.
///
/// Errors are logged and folded into misses; nothing here can fail a request.
#[derive(Clone)]
pub struct BacktestCache {
    backend: Arc<dyn ResultCache>,
    ttl: Duration,
    enabled: bool,
}

impl BacktestCache {
    pub fn new(backend: Arc<dyn ResultCache>, ttl: Duration, enabled: bool) -> Self {
        Self {
            backend,
            ttl,
            enabled,
        }
    }

    pub fn lookup(&self, key: &str) -> Option<BacktestResult> {
        if !self.enabled {
            return None;
        }
        match self.backend.get(key) {
            Ok(Some(bytes)) => match serde_json::from_slice(&bytes) {
                Ok(result) => {
                    debug!(key, "backtest cache hit");
                    Some(result)
                }
                Err(err) => {
                    warn!(key, error = %err, "discarding undecodable cache entry");
                    None
                }
            },
            Ok(None) => {
                debug!(key, "backtest cache miss");
                None
            }
            Err(err) => {
                warn!(key, error = %err, "cache read failed; recomputing");
                None
            }
        }
    }

    pub fn store(&self, key: &str, result: &BacktestResult) {
        if !self.enabled {
            return;
        }
        let stored = serde_json::to_vec(result)
            .map_err(CacheError::from)
            .and_then(|bytes| self.backend.put(key, &bytes, self.ttl));
        if let Err(err) = stored {
            warn!(key, error = %err, "cache write failed");
        }
    }
}

impl std::fmt::Debug for BacktestCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BacktestCache")
            .field("ttl", &self.ttl)
            .field("enabled", &self.enabled)
            .finish_non_exhaustive()
    }
}
