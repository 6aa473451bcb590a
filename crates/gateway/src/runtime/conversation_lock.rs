//! Per-conversation concurrency control.
//!
//! Two turns arriving for the same conversation id would otherwise
//! interleave their reads of the recent-message window, each building a
//! prompt that misses the other's pending write. Serializing turns per
//! conversation closes that race: the second turn waits until the first
//! has persisted both messages.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Manages per-conversation turn locks.
///
/// Each conversation id maps to a `Semaphore(1)`. Acquiring the permit
/// ensures exclusive access for one turn at a time; it auto-releases on
/// drop.
pub struct ConversationLockMap {
    locks: Mutex<HashMap<String, Arc<Semaphore>>>,
}

impl Default for ConversationLockMap {
    fn default() -> Self {
        Self::new()
    }
}

impl ConversationLockMap {
    pub fn new() -> Self {
        Self {
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Acquire the turn lock for a conversation, waiting until any
    /// in-flight turn on the same conversation completes.
    pub async fn acquire(&self, conversation_id: &str) -> OwnedSemaphorePermit {
        let sem = {
            let mut locks = self.locks.lock();
            locks
                .entry(conversation_id.to_owned())
                .or_insert_with(|| Arc::new(Semaphore::new(1)))
                .clone()
        };

        sem.acquire_owned()
            .await
            .expect("conversation semaphore never closed")
    }

    /// Number of tracked conversations (for monitoring).
    pub fn conversation_count(&self) -> usize {
        self.locks.lock().len()
    }

    /// Remove locks for conversations that aren't actively held.
    pub fn prune_idle(&self) {
        let mut locks = self.locks.lock();
        locks.retain(|_, sem| sem.available_permits() == 0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn sequential_access() {
        let map = ConversationLockMap::new();

        let permit1 = map.acquire("c1").await;
        drop(permit1);

        let permit2 = map.acquire("c1").await;
        drop(permit2);
    }

    #[tokio::test]
    async fn different_conversations_concurrent() {
        let map = Arc::new(ConversationLockMap::new());

        let p1 = map.acquire("c1").await;
        let p2 = map.acquire("c2").await;

        // Both acquired simultaneously.
        assert_eq!(map.conversation_count(), 2);

        drop(p1);
        drop(p2);
    }

    #[tokio::test]
    async fn same_conversation_waits() {
        let map = Arc::new(ConversationLockMap::new());
        let map2 = map.clone();

        let p1 = map.acquire("c1").await;

        let handle = tokio::spawn(async move {
            let _p2 = map2.acquire("c1").await;
            42
        });

        // Give the waiter a moment to queue.
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;

        drop(p1);

        let result = handle.await.unwrap();
        assert_eq!(result, 42);
    }

    #[tokio::test]
    async fn prune_removes_released_locks() {
        let map = ConversationLockMap::new();
        let permit = map.acquire("c1").await;
        let released = map.acquire("c2").await;
        drop(released);

        map.prune_idle();
        assert_eq!(map.conversation_count(), 1);
        drop(permit);
    }
}
