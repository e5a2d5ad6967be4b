use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tokio::time::Instant;
use uuid::Uuid;

use hookwork_store::error::StoreError;
use hookwork_store::lock::{DistributedLock, LockGuard};

/// How often a waiting [`MemoryDistributedLock::acquire`] retries.
const POLL_INTERVAL: Duration = Duration::from_millis(10);

#[derive(Debug, Clone)]
struct Holder {
    owner: Uuid,
    expires_at: Instant,
}

impl Holder {
    fn expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

/// In-process [`DistributedLock`] keyed by lock name.
///
/// A holder whose TTL has passed is replaced by the next acquirer.
#[derive(Debug, Clone, Default)]
pub struct MemoryDistributedLock {
    holders: Arc<DashMap<String, Holder>>,
}

impl MemoryDistributedLock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live (unexpired) locks.
    pub fn held(&self) -> usize {
        self.holders.iter().filter(|h| !h.expired()).count()
    }
}

#[async_trait]
impl DistributedLock for MemoryDistributedLock {
    async fn try_acquire(
        &self,
        name: &str,
        ttl: Duration,
    ) -> Result<Option<Box<dyn LockGuard>>, StoreError> {
        let owner = Uuid::new_v4();
        let holder = Holder {
            owner,
            expires_at: Instant::now() + ttl,
        };
        match self.holders.entry(name.to_owned()) {
            Entry::Occupied(mut taken) => {
                if !taken.get().expired() {
                    return Ok(None);
                }
                taken.insert(holder);
            }
            Entry::Vacant(free) => {
                free.insert(holder);
            }
        }
        Ok(Some(Box::new(MemoryLockGuard {
            holders: Arc::clone(&self.holders),
            name: name.to_owned(),
            owner,
        })))
    }

    async fn acquire(
        &self,
        name: &str,
        ttl: Duration,
        timeout: Duration,
    ) -> Result<Box<dyn LockGuard>, StoreError> {
        let deadline = Instant::now() + timeout;
        loop {
            if let Some(guard) = self.try_acquire(name, ttl).await? {
                return Ok(guard);
            }
            if Instant::now() >= deadline {
                return Err(StoreError::Timeout(timeout));
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }
}

/// Guard for a lock taken from [`MemoryDistributedLock`].
#[derive(Debug)]
pub struct MemoryLockGuard {
    holders: Arc<DashMap<String, Holder>>,
    name: String,
    owner: Uuid,
}

#[async_trait]
impl LockGuard for MemoryLockGuard {
    async fn extend(&self, duration: Duration) -> Result<(), StoreError> {
        match self.holders.get_mut(&self.name) {
            Some(mut holder) if holder.owner == self.owner && !holder.expired() => {
                holder.expires_at = Instant::now() + duration;
                Ok(())
            }
            _ => Err(StoreError::LockExpired(self.name.clone())),
        }
    }

    async fn release(self: Box<Self>) -> Result<(), StoreError> {
        self.holders
            .remove_if(&self.name, |_, holder| holder.owner == self.owner);
        Ok(())
    }

    async fn is_held(&self) -> Result<bool, StoreError> {
        Ok(self
            .holders
            .get(&self.name)
            .is_some_and(|holder| holder.owner == self.owner && !holder.expired()))
    }
}
