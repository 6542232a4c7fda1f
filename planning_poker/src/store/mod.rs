//! Key-path addressed document store.
//!
//! Rooms and players live as JSON documents under slash-separated paths
//! (`rooms/{id}`, `players/{id}/estimate`, ...). The services in this crate only
//! depend on the [`Store`] trait, which offers:
//!
//! - `read` / `write` of a single path (writing null removes the node)
//! - `multi_write`, atomic across every listed path
//! - `transact`, an atomic read-modify-write of one path
//! - `subscribe`, a change feed of committed writes
//!
//! Two implementations are provided: [`MemoryStore`] and the PostgreSQL-backed
//! [`PgStore`].
//!
//! ## Example
//!
//! ```
//! use planning_poker::store::{MemoryStore, Store, StorePath};
//! use serde_json::json;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let store = MemoryStore::new();
//! let path: StorePath = "rooms/123456/revealEstimates".parse()?;
//!
//! store.write(&path, json!(true)).await?;
//! assert_eq!(store.read(&path).await?, Some(json!(true)));
//! # Ok(())
//! # }
//! ```

pub mod errors;
pub mod memory;
pub mod path;
pub mod postgres;
pub(crate) mod tree;

pub use errors::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use path::StorePath;
pub use postgres::PgStore;

use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;
use tokio::sync::broadcast;

/// Buffered change events per subscriber before it starts lagging.
pub const CHANGE_FEED_CAPACITY: usize = 256;

/// Paths written by one committed store operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreEvent {
    pub paths: Vec<StorePath>,
}

impl StoreEvent {
    /// Whether this change can affect the value at `path`.
    pub fn touches(&self, path: &StorePath) -> bool {
        self.paths.iter().any(|written| written.overlaps(path))
    }
}

/// Outcome of a [`Store::transact`] mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum Update {
    /// Replace the value (null removes it).
    Set(Value),
    /// Leave the value as it is; nothing is written.
    Keep,
}

/// Read-modify-write step run while the path is locked.
pub type Mutation = Box<dyn FnOnce(Option<&Value>) -> Update + Send>;

/// Key-path addressed read/write store.
#[async_trait]
pub trait Store: Send + Sync {
    /// Value at `path`, or `None` when absent.
    async fn read(&self, path: &StorePath) -> StoreResult<Option<Value>>;

    /// Full overwrite at `path`.
    async fn write(&self, path: &StorePath, value: Value) -> StoreResult<()>;

    /// Overwrites every listed path in one atomic step.
    async fn multi_write(&self, updates: BTreeMap<StorePath, Value>) -> StoreResult<()>;

    /// Atomically applies `mutation` to the value at `path`.
    ///
    /// Returns `true` when the mutation wrote a new value.
    async fn transact(&self, path: &StorePath, mutation: Mutation) -> StoreResult<bool>;

    /// Change feed of committed writes.
    fn subscribe(&self) -> broadcast::Receiver<StoreEvent>;

    /// Checks that the backing service answers.
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}
