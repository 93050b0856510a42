//! Per-credential bearer token cache.
//!
//! One entry per credential identity. An entry is served until its recorded
//! expiry or until the gateway observes a 401 for it, whichever comes first.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedToken {
    pub value: String,
    pub expires_at: DateTime<Utc>,
}

impl CachedToken {
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// Shared token store. Wrap in an `Arc` to share between gateways.
#[derive(Debug, Default)]
pub struct TokenCache {
    entries: Mutex<HashMap<String, CachedToken>>,
}

impl TokenCache {
    pub fn new() -> Self {
        Self::default()
    }

    // The map holds plain data, so a poisoned lock is still consistent.
    fn lock(&self) -> MutexGuard<'_, HashMap<String, CachedToken>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// The cached token for `identity` if it has not expired at `now`.
    pub fn valid_token(&self, identity: &str, now: DateTime<Utc>) -> Option<String> {
        self.lock()
            .get(identity)
            .filter(|t| t.is_valid_at(now))
            .map(|t| t.value.clone())
    }

    /// Record a token issued at `now`, replacing any previous entry.
    pub fn store(&self, identity: &str, value: String, now: DateTime<Utc>, ttl: Duration) -> CachedToken {
        let ttl = chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::MAX);
        let token = CachedToken {
            value,
            expires_at: now.checked_add_signed(ttl).unwrap_or(DateTime::<Utc>::MAX_UTC),
        };
        self.insert(identity, token.clone());
        token
    }

    pub fn insert(&self, identity: &str, token: CachedToken) {
        debug!(identity, expires_at = %token.expires_at, "caching auth token");
        self.lock().insert(identity.to_string(), token);
    }

    /// Drop the token for `identity`. Returns whether one was present.
    pub fn evict(&self, identity: &str) -> bool {
        let removed = self.lock().remove(identity).is_some();
        if removed {
            debug!(identity, "evicted auth token");
        }
        removed
    }

    pub fn get(&self, identity: &str) -> Option<CachedToken> {
        self.lock().get(identity).cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}
