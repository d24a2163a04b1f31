//! Per-repository mutual exclusion
//!
//! Clone, improve and commit on the same repository name run one at a time;
//! different names proceed in parallel. An entry lives only while someone
//! holds or waits for it.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

type LockMap = Arc<Mutex<HashMap<String, Arc<AsyncMutex<()>>>>>;

#[derive(Debug, Default)]
pub struct RepoLocks {
    locks: LockMap,
}

/// Exclusive access to one repository name. Releasing the last guard for a
/// name removes its map entry.
#[derive(Debug)]
pub struct RepoGuard {
    name: String,
    guard: Option<OwnedMutexGuard<()>>,
    locks: LockMap,
}

impl RepoLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `name`. Access lasts until the guard drops.
    pub async fn lock(&self, name: &str) -> RepoGuard {
        let lock = {
            let mut locks = self
                .locks
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            locks.entry(name.to_string()).or_default().clone()
        };
        tracing::debug!("Waiting for lock on {}", name);
        let guard = lock.lock_owned().await;

        RepoGuard {
            name: name.to_string(),
            guard: Some(guard),
            locks: self.locks.clone(),
        }
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.locks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }
}

impl Drop for RepoGuard {
    fn drop(&mut self) {
        // Release the mutex first so its Arc no longer counts as a holder
        drop(self.guard.take());

        let mut locks = self
            .locks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        // Only the map's own reference left: nobody holds or waits
        if locks
            .get(&self.name)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            locks.remove(&self.name);
        }
    }
}
