//! Per-key exclusive access

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};

/// Entries kept before idle locks are pruned.
const PRUNE_THRESHOLD: usize = 1024;

/// In-memory registry of per-account and per-owner locks.
///
/// At most one mutating operation runs per key at a time. Holding the guard
/// across provider calls is intended: the next caller waits and then sees the
/// committed state.
#[derive(Clone, Default)]
pub struct AccountLockRegistry {
    locks: Arc<RwLock<HashMap<String, Arc<Mutex<()>>>>>,
}

impl AccountLockRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to one account.
    pub async fn lock_account(&self, account_id: &str) -> OwnedMutexGuard<()> {
        self.acquire(format!("account:{account_id}")).await
    }

    /// Wait for exclusive access to an owner's account set (used by creation).
    pub async fn lock_owner(&self, owner_id: &str) -> OwnedMutexGuard<()> {
        self.acquire(format!("owner:{owner_id}")).await
    }

    async fn acquire(&self, key: String) -> OwnedMutexGuard<()> {
        let existing = self.locks.read().await.get(&key).cloned();
        let mutex = match existing {
            Some(mutex) => mutex,
            None => {
                let mut locks = self.locks.write().await;
                if locks.len() >= PRUNE_THRESHOLD {
                    // Only the map holds an idle lock.
                    locks.retain(|_, m| Arc::strong_count(m) > 1);
                }
                locks.entry(key).or_default().clone()
            }
        };
        mutex.lock_owned().await
    }

    /// Number of tracked keys.
    pub async fn len(&self) -> usize {
        self.locks.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.locks.read().await.is_empty()
    }
}
