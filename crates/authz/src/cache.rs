//! Per-process cache of validated principals
//!
//! Entries are keyed by a SHA-256 digest of the credential combined with the
//! requested scope, so one credential used against two scopes occupies two
//! entries. Unknown-credential markers are keyed by the digest alone since
//! an authentication failure does not depend on the scope.
//!
//! Expired entries are never swept. A lookup that finds one removes it and
//! reports a miss.

use crate::principal::Principal;
use bastion_config::CacheSettings;
use parking_lot::RwLock;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::time::Instant;

/// Result of a cache lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheLookup {
    /// A live principal for this credential and scope
    Hit(Arc<Principal>),
    /// The validator recently rejected this credential
    Unknown,
    /// Nothing usable cached
    Miss,
}

#[derive(Debug, Clone)]
enum CachedOutcome {
    Principal(Arc<Principal>),
    Unknown,
}

#[derive(Debug, Clone)]
struct CacheEntry {
    outcome: CachedOutcome,
    expires_at: Instant,
}

impl CacheEntry {
    fn is_live(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

/// Cache counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub unknown_hits: u64,
    pub expired: u64,
    pub entries: usize,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// TTL cache from credential (and scope) to principal
#[derive(Debug)]
pub struct PermissionCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
    settings: CacheSettings,
    hits: AtomicU64,
    misses: AtomicU64,
    unknown_hits: AtomicU64,
    expired: AtomicU64,
}

impl PermissionCache {
    pub fn new(settings: CacheSettings) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            settings,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            unknown_hits: AtomicU64::new(0),
            expired: AtomicU64::new(0),
        }
    }

    pub fn settings(&self) -> CacheSettings {
        self.settings
    }

    /// Look up `credential` for `scope`
    pub fn lookup(&self, credential: &str, scope: &str) -> CacheLookup {
        let digest = credential_digest(credential);
        let scoped_key = scoped_key(&digest, scope);
        let now = Instant::now();

        let mut stale = Vec::new();
        let found = {
            let entries = self.entries.read();
            let mut found = None;
            for key in [&scoped_key, &digest] {
                match entries.get(key.as_str()) {
                    Some(entry) if entry.is_live(now) => match &entry.outcome {
                        CachedOutcome::Principal(p) if p.is_expired() => stale.push(key.clone()),
                        outcome => {
                            found = Some(outcome.clone());
                            break;
                        }
                    },
                    Some(_) => stale.push(key.clone()),
                    None => {}
                }
            }
            found
        };

        if !stale.is_empty() {
            let mut entries = self.entries.write();
            for key in &stale {
                // Re-check under the write lock; a fresh entry may have landed
                if entries
                    .get(key.as_str())
                    .is_some_and(|e| !e.is_live(now) || matches!(&e.outcome, CachedOutcome::Principal(p) if p.is_expired()))
                {
                    entries.remove(key.as_str());
                    self.expired.fetch_add(1, Ordering::Relaxed);
                }
            }
        }

        match found {
            Some(CachedOutcome::Principal(principal)) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                CacheLookup::Hit(principal)
            }
            Some(CachedOutcome::Unknown) => {
                self.unknown_hits.fetch_add(1, Ordering::Relaxed);
                CacheLookup::Unknown
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                CacheLookup::Miss
            }
        }
    }

    /// Cache a validated principal for `credential` and `scope`
    pub fn store(&self, credential: &str, scope: &str, principal: Arc<Principal>) {
        let key = scoped_key(&credential_digest(credential), scope);
        let entry = CacheEntry {
            outcome: CachedOutcome::Principal(principal),
            expires_at: Instant::now() + self.settings.ttl,
        };
        self.entries.write().insert(key, entry);
    }

    /// Remember that the validator rejected `credential`
    pub fn store_unknown(&self, credential: &str) {
        if self.settings.negative_ttl.is_zero() {
            return;
        }
        let entry = CacheEntry {
            outcome: CachedOutcome::Unknown,
            expires_at: Instant::now() + self.settings.negative_ttl,
        };
        self.entries.write().insert(credential_digest(credential), entry);
    }

    /// Drop every entry for `credential`, across all scopes
    pub fn invalidate(&self, credential: &str) -> usize {
        let digest = credential_digest(credential);
        let prefix = format!("{digest}:");
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|key, _| *key != digest && !key.starts_with(&prefix));
        before - entries.len()
    }

    /// Drop everything
    pub fn clear(&self) {
        self.entries.write().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            unknown_hits: self.unknown_hits.load(Ordering::Relaxed),
            expired: self.expired.load(Ordering::Relaxed),
            entries: self.len(),
        }
    }
}

/// Hex SHA-256 of a credential; raw credentials are never stored
pub fn credential_digest(credential: &str) -> String {
    hex::encode(Sha256::digest(credential.as_bytes()))
}

/// Short credential identifier for log lines
pub fn fingerprint(credential: &str) -> String {
    let digest = credential_digest(credential);
    digest[..12].to_string()
}

fn scoped_key(digest: &str, scope: &str) -> String {
    format!("{digest}:{scope}")
}
