//! In-process store backed by a single JSON tree.

use super::{
    CHANGE_FEED_CAPACITY, Mutation, Store, StoreEvent, StorePath, Update,
    errors::StoreResult,
    tree,
};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;
use tokio::sync::{RwLock, broadcast};

/// Store keeping every document in memory.
///
/// Writers are serialized by the tree lock, so `multi_write` and `transact`
/// are atomic with respect to every other operation on the same store.
pub struct MemoryStore {
    root: RwLock<Value>,
    events: broadcast::Sender<StoreEvent>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_root(Value::Null)
    }

    /// Store seeded with an existing document tree.
    pub fn with_root(root: Value) -> Self {
        let (events, _) = broadcast::channel(CHANGE_FEED_CAPACITY);
        Self {
            root: RwLock::new(tree::normalize(root)),
            events,
        }
    }

    /// Copy of the whole document tree.
    pub async fn snapshot(&self) -> Value {
        self.root.read().await.clone()
    }

    fn publish(&self, paths: Vec<StorePath>) {
        // No subscribers is not an error.
        let _ = self.events.send(StoreEvent { paths });
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn read(&self, path: &StorePath) -> StoreResult<Option<Value>> {
        let root = self.root.read().await;
        Ok(tree::get(&root, path.segments()).cloned())
    }

    async fn write(&self, path: &StorePath, value: Value) -> StoreResult<()> {
        {
            let mut root = self.root.write().await;
            tree::set(&mut root, path.segments(), tree::normalize(value));
        }
        self.publish(vec![path.clone()]);
        Ok(())
    }

    async fn multi_write(&self, updates: BTreeMap<StorePath, Value>) -> StoreResult<()> {
        if updates.is_empty() {
            return Ok(());
        }

        let paths: Vec<StorePath> = updates.keys().cloned().collect();
        {
            let mut root = self.root.write().await;
            for (path, value) in updates {
                tree::set(&mut root, path.segments(), tree::normalize(value));
            }
        }
        self.publish(paths);
        Ok(())
    }

    async fn transact(&self, path: &StorePath, mutation: Mutation) -> StoreResult<bool> {
        {
            let mut root = self.root.write().await;
            let current = tree::get(&root, path.segments());
            match mutation(current) {
                Update::Keep => return Ok(false),
                Update::Set(value) => {
                    tree::set(&mut root, path.segments(), tree::normalize(value));
                }
            }
        }
        self.publish(vec![path.clone()]);
        Ok(true)
    }

    fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }
}
