//! Document store interface
//!
//! Records are scoped per user under two collections, `Active` and
//! `Deleted`. A record lives in at most one of them; moving between them
//! goes through [`DocumentStore::transfer`], which backends must apply
//! atomically.

mod memory;

pub use memory::MemoryStore;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use thiserror::Error;
use tokio::sync::broadcast;

use crate::record::{Credential, RecordId, UserId};

/// Logical collection a record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    Active,
    Deleted,
}

impl Collection {
    /// The collection a record leaves when it moves out of this one.
    pub fn other(self) -> Self {
        match self {
            Collection::Active => Collection::Deleted,
            Collection::Deleted => Collection::Active,
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Collection::Active => f.write_str("active"),
            Collection::Deleted => f.write_str("deleted"),
        }
    }
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Record {id} not found in {collection} collection")]
    NotFound { collection: Collection, id: RecordId },
    #[error("Record {id} already exists in {collection} collection")]
    AlreadyExists { collection: Collection, id: RecordId },
    #[error("Store backend error: {0}")]
    Backend(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// What happened to a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    Upserted(RecordId),
    Removed(RecordId),
    /// Notifications were missed; re-list the collection.
    Resync,
}

/// Change notification published by a store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreEvent {
    pub user: UserId,
    pub collection: Collection,
    pub change: Change,
}

/// Live change feed for one user's collection.
#[derive(Debug)]
pub struct Subscription {
    rx: broadcast::Receiver<StoreEvent>,
    user: UserId,
    collection: Collection,
}

impl Subscription {
    /// Wraps a store-wide event channel, keeping only events for
    /// `user`/`collection`.
    pub fn new(rx: broadcast::Receiver<StoreEvent>, user: UserId, collection: Collection) -> Self {
        Self { rx, user, collection }
    }

    /// Waits for the next change. `None` once the store is gone.
    pub async fn changed(&mut self) -> Option<Change> {
        loop {
            match self.rx.recv().await {
                Ok(event) if event.user == self.user && event.collection == self.collection => {
                    return Some(event.change);
                }
                Ok(_) => continue,
                Err(broadcast::error::RecvError::Lagged(_skipped)) => {
                    #[cfg(feature = "tracing")]
                    tracing::warn!("subscription to {} lagged by {} events", self.collection, _skipped);
                    return Some(Change::Resync);
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

/// Per-user credential document store.
pub trait DocumentStore: Send + Sync {
    /// Stores a new document and returns the id assigned to it.
    fn create(
        &self,
        user: &UserId,
        collection: Collection,
        doc: Credential,
    ) -> impl Future<Output = StoreResult<RecordId>> + Send;

    /// Creates or overwrites the document at `id`.
    ///
    /// `AlreadyExists` (naming the other collection) if `id` lives in the
    /// other collection; nothing changes in that case.
    fn put(
        &self,
        user: &UserId,
        collection: Collection,
        id: RecordId,
        doc: Credential,
    ) -> impl Future<Output = StoreResult<()>> + Send;

    /// Overwrites an existing document; `NotFound` if `id` is absent.
    fn replace(
        &self,
        user: &UserId,
        collection: Collection,
        id: RecordId,
        doc: Credential,
    ) -> impl Future<Output = StoreResult<()>> + Send;

    fn get(
        &self,
        user: &UserId,
        collection: Collection,
        id: RecordId,
    ) -> impl Future<Output = StoreResult<Option<Credential>>> + Send;

    /// Removes the document at `id`; `NotFound` if absent.
    fn delete(
        &self,
        user: &UserId,
        collection: Collection,
        id: RecordId,
    ) -> impl Future<Output = StoreResult<()>> + Send;

    fn list(
        &self,
        user: &UserId,
        collection: Collection,
    ) -> impl Future<Output = StoreResult<Vec<(RecordId, Credential)>>> + Send;

    /// Moves a document between collections in one step.
    ///
    /// `NotFound` if `id` is not in `from`, `AlreadyExists` if it is already
    /// in `to`; on error neither collection changes.
    fn transfer(
        &self,
        user: &UserId,
        from: Collection,
        to: Collection,
        id: RecordId,
    ) -> impl Future<Output = StoreResult<()>> + Send;

    fn subscribe(&self, user: &UserId, collection: Collection) -> Subscription;
}
