//! Run-level locking.
//!
//! The store exposes the two primitives the manager needs: an atomic
//! set-if-absent with TTL and a compare-and-delete. The TTL bounds the
//! blast radius of a crashed holder; compare-and-delete prevents a slow
//! caller from releasing a lock it no longer owns after expiry and
//! reacquisition by someone else.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::{debug, warn};
use uuid::Uuid;

/// Atomic lock-store primitives.
pub trait LockStore: Send + Sync {
    /// Store `token` under `key` only if no live token exists there.
    /// True on success.
    fn set_nx(&self, key: &str, token: &str, ttl: Duration) -> bool;

    /// Delete `key` only if it still holds a live `token`. True when deleted.
    fn compare_and_delete(&self, key: &str, token: &str) -> bool;
}

struct LockRow {
    token: String,
    expires_at: Instant,
}

/// In-process lock store with TTL expiry.
#[derive(Default)]
pub struct InMemoryLockStore {
    rows: DashMap<String, LockRow>,
}

impl InMemoryLockStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LockStore for InMemoryLockStore {
    fn set_nx(&self, key: &str, token: &str, ttl: Duration) -> bool {
        let now = Instant::now();
        let row = LockRow {
            token: token.to_string(),
            expires_at: now + ttl,
        };
        match self.rows.entry(key.to_string()) {
            Entry::Occupied(mut occupied) => {
                if occupied.get().expires_at > now {
                    return false;
                }
                occupied.insert(row);
                true
            }
            Entry::Vacant(vacant) => {
                vacant.insert(row);
                true
            }
        }
    }

    fn compare_and_delete(&self, key: &str, token: &str) -> bool {
        let now = Instant::now();
        self.rows
            .remove_if(key, |_, row| row.token == token && row.expires_at > now)
            .is_some()
    }
}

/// Acquires and releases locks on behalf of the orchestrator, minting a
/// random ownership token per acquisition.
pub struct LockManager<S> {
    store: Arc<S>,
}

impl<S: LockStore> LockManager<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// One acquisition attempt. Returns the owner token on success.
    pub fn acquire(&self, key: &str, ttl: Duration) -> Option<String> {
        let token = Uuid::new_v4().as_simple().to_string();
        self.store.set_nx(key, &token, ttl).then_some(token)
    }

    /// Retry with a fixed delay. Exhausting the attempt budget is a
    /// non-fatal `None`, not an error; the caller reports the run blocked.
    pub async fn acquire_with_retry(
        &self,
        key: &str,
        ttl: Duration,
        max_attempts: u32,
        delay: Duration,
    ) -> Option<String> {
        let attempts = max_attempts.max(1);
        for attempt in 1..=attempts {
            if let Some(token) = self.acquire(key, ttl) {
                debug!(key, attempt, "lock acquired");
                return Some(token);
            }
            if attempt < attempts {
                tokio::time::sleep(delay).await;
            }
        }
        warn!(key, max_attempts, "lock not acquired, run blocked");
        None
    }

    /// Release the lock if `token` still owns it. A stale release (TTL
    /// elapsed and someone else reacquired) is a `false` no-op.
    pub fn release(&self, key: &str, token: &str) -> bool {
        let released = self.store.compare_and_delete(key, token);
        if !released {
            debug!(key, "stale lock release ignored");
        }
        released
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> LockManager<InMemoryLockStore> {
        LockManager::new(Arc::new(InMemoryLockStore::new()))
    }

    #[test]
    fn test_second_caller_is_blocked() {
        let locks = manager();
        let ttl = Duration::from_secs(60);

        let token = locks.acquire("run", ttl).expect("first acquire");
        assert!(locks.acquire("run", ttl).is_none());
        assert!(locks.release("run", &token));
    }

    #[test]
    fn test_release_with_wrong_token_is_noop() {
        let locks = manager();
        let ttl = Duration::from_secs(60);
        let token = locks.acquire("run", ttl).unwrap();

        assert!(!locks.release("run", "not-the-owner"));
        // Still held by the real owner.
        assert!(locks.acquire("run", ttl).is_none());
        assert!(locks.release("run", &token));
    }

    #[test]
    fn test_expired_lock_can_be_reacquired() {
        let locks = manager();
        let old = locks.acquire("run", Duration::from_millis(10)).unwrap();
        std::thread::sleep(Duration::from_millis(25));

        let new = locks.acquire("run", Duration::from_secs(60)).unwrap();
        // The old holder's release must not steal the new holder's lock.
        assert!(!locks.release("run", &old));
        assert!(locks.release("run", &new));
    }

    #[tokio::test]
    async fn test_retry_budget_is_bounded() {
        let locks = manager();
        let ttl = Duration::from_secs(60);
        let _held = locks.acquire("run", ttl).unwrap();

        let blocked = locks
            .acquire_with_retry("run", ttl, 3, Duration::from_millis(5))
            .await;
        assert!(blocked.is_none());
    }

    #[tokio::test]
    async fn test_retry_succeeds_immediately_when_free() {
        let locks = manager();
        let token = locks
            .acquire_with_retry("run", Duration::from_secs(60), 3, Duration::from_millis(10))
            .await;
        assert!(token.is_some());
    }
}
