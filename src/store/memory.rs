//! In-memory document store.

use std::collections::HashMap;
use tokio::sync::{broadcast, RwLock};

use super::{Change, Collection, DocumentStore, StoreError, StoreEvent, StoreResult, Subscription};
use crate::record::{Credential, RecordId, UserId};

const EVENT_CAPACITY: usize = 256;

type Documents = HashMap<RecordId, Credential>;

/// Document store held in process memory.
///
/// All collections share one lock, so `transfer` removes and inserts under a
/// single write guard.
#[derive(Debug)]
pub struct MemoryStore {
    collections: RwLock<HashMap<(UserId, Collection), Documents>>,
    events: broadcast::Sender<StoreEvent>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            collections: RwLock::new(HashMap::new()),
            events,
        }
    }

    fn publish(&self, user: &UserId, collection: Collection, change: Change) {
        // no subscribers is fine
        let _ = self.events.send(StoreEvent {
            user: user.clone(),
            collection,
            change,
        });
    }
}

impl DocumentStore for MemoryStore {
    async fn create(&self, user: &UserId, collection: Collection, doc: Credential) -> StoreResult<RecordId> {
        // fresh v4 id, so no collision check
        let id = RecordId::new();
        {
            let mut guard = self.collections.write().await;
            guard.entry((user.clone(), collection)).or_default().insert(id, doc);
        }
        self.publish(user, collection, Change::Upserted(id));
        Ok(id)
    }

    async fn put(&self, user: &UserId, collection: Collection, id: RecordId, doc: Credential) -> StoreResult<()> {
        {
            let mut guard = self.collections.write().await;
            let other = collection.other();
            if guard.get(&(user.clone(), other)).is_some_and(|docs| docs.contains_key(&id)) {
                return Err(StoreError::AlreadyExists { collection: other, id });
            }
            guard.entry((user.clone(), collection)).or_default().insert(id, doc);
        }
        self.publish(user, collection, Change::Upserted(id));
        Ok(())
    }

    async fn replace(&self, user: &UserId, collection: Collection, id: RecordId, doc: Credential) -> StoreResult<()> {
        {
            let mut guard = self.collections.write().await;
            let slot = guard
                .get_mut(&(user.clone(), collection))
                .and_then(|docs| docs.get_mut(&id))
                .ok_or(StoreError::NotFound { collection, id })?;
            *slot = doc;
        }
        self.publish(user, collection, Change::Upserted(id));
        Ok(())
    }

    async fn get(&self, user: &UserId, collection: Collection, id: RecordId) -> StoreResult<Option<Credential>> {
        let guard = self.collections.read().await;
        Ok(guard
            .get(&(user.clone(), collection))
            .and_then(|docs| docs.get(&id))
            .cloned())
    }

    async fn delete(&self, user: &UserId, collection: Collection, id: RecordId) -> StoreResult<()> {
        {
            let mut guard = self.collections.write().await;
            let removed = guard
                .get_mut(&(user.clone(), collection))
                .and_then(|docs| docs.remove(&id));
            if removed.is_none() {
                return Err(StoreError::NotFound { collection, id });
            }
        }
        self.publish(user, collection, Change::Removed(id));
        Ok(())
    }

    async fn list(&self, user: &UserId, collection: Collection) -> StoreResult<Vec<(RecordId, Credential)>> {
        let guard = self.collections.read().await;
        Ok(guard
            .get(&(user.clone(), collection))
            .map(|docs| docs.iter().map(|(id, doc)| (*id, doc.clone())).collect())
            .unwrap_or_default())
    }

    async fn transfer(&self, user: &UserId, from: Collection, to: Collection, id: RecordId) -> StoreResult<()> {
        if from == to {
            return match self.get(user, from, id).await? {
                Some(_) => Ok(()),
                None => Err(StoreError::NotFound { collection: from, id }),
            };
        }

        {
            let mut guard = self.collections.write().await;
            let source_key = (user.clone(), from);
            let target_key = (user.clone(), to);

            if !guard.get(&source_key).is_some_and(|docs| docs.contains_key(&id)) {
                return Err(StoreError::NotFound { collection: from, id });
            }
            if guard.get(&target_key).is_some_and(|docs| docs.contains_key(&id)) {
                return Err(StoreError::AlreadyExists { collection: to, id });
            }

            let doc = guard
                .get_mut(&source_key)
                .and_then(|docs| docs.remove(&id))
                .ok_or(StoreError::NotFound { collection: from, id })?;
            guard.entry(target_key).or_default().insert(id, doc);
        }

        #[cfg(feature = "tracing")]
        tracing::debug!("transferred record {} from {} to {}", id, from, to);

        self.publish(user, from, Change::Removed(id));
        self.publish(user, to, Change::Upserted(id));
        Ok(())
    }

    fn subscribe(&self, user: &UserId, collection: Collection) -> Subscription {
        Subscription::new(self.events.subscribe(), user.clone(), collection)
    }
}
