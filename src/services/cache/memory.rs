use async_trait::async_trait;
use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
    time::{Duration, Instant},
};

use crate::services::cache::client::{CacheClient, CacheError, CacheResult};

/// Process-local cache client.
///
/// Entries carry their own deadline. An expired entry reads as a miss, and
/// every write sweeps out whatever has expired so keys that are never read
/// again do not pile up.
#[derive(Clone, Debug, Default)]
pub struct MemoryCache {
    entries: Arc<Mutex<HashMap<String, Entry>>>,
}

#[derive(Debug)]
struct Entry {
    value: String,
    deadline: Instant,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries, expired ones included until the next write.
    pub fn len(&self) -> usize {
        self.lock().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remaining lifetime of `key`, if it is present and not expired.
    pub fn ttl(&self, key: &str) -> Option<Duration> {
        let entries = self.lock().ok()?;
        let entry = entries.get(key)?;
        entry.deadline.checked_duration_since(Instant::now())
    }

    fn lock(&self) -> CacheResult<MutexGuard<'_, HashMap<String, Entry>>> {
        self.entries
            .lock()
            .map_err(|_| CacheError::BackendCommand("memory cache lock poisoned".to_string()))
    }
}

#[async_trait]
impl CacheClient for MemoryCache {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn get_string(&self, key: &str) -> CacheResult<Option<String>> {
        let mut entries = self.lock()?;
        match entries.get(key) {
            Some(entry) if entry.deadline > Instant::now() => Ok(Some(entry.value.clone())),
            Some(_) => {
                entries.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn set_with_ttl(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()> {
        let deadline = Instant::now()
            .checked_add(ttl)
            .ok_or_else(|| CacheError::InvalidValue(format!("ttl out of range: {ttl:?}")))?;

        let mut entries = self.lock()?;
        let now = Instant::now();
        entries.retain(|_, entry| entry.deadline > now);
        entries.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                deadline,
            },
        );
        Ok(())
    }

    async fn del(&self, key: &str) -> CacheResult<u64> {
        Ok(self.lock()?.remove(key).map_or(0, |_| 1))
    }
}
