//! PostgreSQL-backed store.
//!
//! Each document (`players/{id}`, `rooms/{id}`) is one row of the `documents`
//! table with its body as JSONB. Paths below a document are resolved in Rust
//! after locking the row, so every write is a short `SELECT ... FOR UPDATE`
//! followed by an upsert inside one transaction.

use super::{
    CHANGE_FEED_CAPACITY, Mutation, Store, StoreEvent, StorePath, Update,
    errors::{StoreError, StoreResult},
    tree,
};
use async_trait::async_trait;
use serde_json::Value;
use sqlx::{PgPool, Postgres, Row, Transaction};
use std::collections::BTreeMap;
use tokio::sync::broadcast;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS documents (
    collection TEXT NOT NULL,
    key TEXT NOT NULL,
    body JSONB NOT NULL,
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    PRIMARY KEY (collection, key)
)
"#;

/// Store persisting documents in PostgreSQL.
///
/// The change feed only carries writes made through this instance.
pub struct PgStore {
    pool: PgPool,
    events: broadcast::Sender<StoreEvent>,
}

/// A path split into its owning document and the path inside it.
struct DocumentKey<'a> {
    collection: &'a str,
    key: &'a str,
    rest: &'a [String],
}

fn document_key(path: &StorePath) -> StoreResult<DocumentKey<'_>> {
    match path.segments() {
        [collection, key, rest @ ..] => Ok(DocumentKey {
            collection,
            key,
            rest,
        }),
        _ => Err(StoreError::InvalidPath {
            path: path.to_string(),
            reason: "writes need a collection and a document key".to_string(),
        }),
    }
}

impl PgStore {
    /// Wraps a pool and makes sure the `documents` table exists.
    pub async fn new(pool: PgPool) -> StoreResult<Self> {
        let (events, _) = broadcast::channel(CHANGE_FEED_CAPACITY);
        let store = Self { pool, events };
        store.ensure_schema().await?;
        Ok(store)
    }

    pub async fn ensure_schema(&self) -> StoreResult<()> {
        sqlx::query(SCHEMA).execute(&self.pool).await?;
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    fn publish(&self, paths: Vec<StorePath>) {
        let _ = self.events.send(StoreEvent { paths });
    }

    /// Locks the document row and returns its body (null when missing).
    async fn lock_document(
        tx: &mut Transaction<'_, Postgres>,
        doc: &DocumentKey<'_>,
    ) -> StoreResult<Value> {
        let row = sqlx::query(
            "SELECT body FROM documents WHERE collection = $1 AND key = $2 FOR UPDATE",
        )
        .bind(doc.collection)
        .bind(doc.key)
        .fetch_optional(&mut **tx)
        .await?;

        Ok(row
            .map(|r| tree::normalize(r.get::<Value, _>("body")))
            .unwrap_or(Value::Null))
    }

    async fn save_document(
        tx: &mut Transaction<'_, Postgres>,
        doc: &DocumentKey<'_>,
        body: Value,
    ) -> StoreResult<()> {
        if body.is_null() {
            sqlx::query("DELETE FROM documents WHERE collection = $1 AND key = $2")
                .bind(doc.collection)
                .bind(doc.key)
                .execute(&mut **tx)
                .await?;
            return Ok(());
        }

        sqlx::query(
            "INSERT INTO documents (collection, key, body, updated_at)
             VALUES ($1, $2, $3, NOW())
             ON CONFLICT (collection, key)
             DO UPDATE SET body = EXCLUDED.body, updated_at = NOW()",
        )
        .bind(doc.collection)
        .bind(doc.key)
        .bind(body)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    async fn apply(
        tx: &mut Transaction<'_, Postgres>,
        path: &StorePath,
        value: Value,
    ) -> StoreResult<()> {
        let doc = document_key(path)?;
        let mut body = Self::lock_document(tx, &doc).await?;
        tree::set(&mut body, doc.rest, tree::normalize(value));
        Self::save_document(tx, &doc, body).await
    }
}

#[async_trait]
impl Store for PgStore {
    async fn read(&self, path: &StorePath) -> StoreResult<Option<Value>> {
        if let Ok(doc) = document_key(path) {
            let row = sqlx::query("SELECT body FROM documents WHERE collection = $1 AND key = $2")
                .bind(doc.collection)
                .bind(doc.key)
                .fetch_optional(&self.pool)
                .await?;

            return Ok(row.and_then(|r| {
                let body = tree::normalize(r.get::<Value, _>("body"));
                tree::get(&body, doc.rest).cloned()
            }));
        }

        // Root or whole collection: assemble the subtree from every row.
        let rows = match path.segments().first() {
            Some(collection) => {
                sqlx::query("SELECT collection, key, body FROM documents WHERE collection = $1")
                    .bind(collection)
                    .fetch_all(&self.pool)
                    .await?
            }
            None => {
                sqlx::query("SELECT collection, key, body FROM documents")
                    .fetch_all(&self.pool)
                    .await?
            }
        };

        let mut root = Value::Null;
        for row in rows {
            let segments = [row.get::<String, _>("collection"), row.get::<String, _>("key")];
            tree::set(&mut root, &segments, tree::normalize(row.get("body")));
        }

        Ok(tree::get(&root, path.segments()).cloned())
    }

    async fn write(&self, path: &StorePath, value: Value) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;
        Self::apply(&mut tx, path, value).await?;
        tx.commit().await?;

        self.publish(vec![path.clone()]);
        Ok(())
    }

    async fn multi_write(&self, updates: BTreeMap<StorePath, Value>) -> StoreResult<()> {
        if updates.is_empty() {
            return Ok(());
        }

        let paths: Vec<StorePath> = updates.keys().cloned().collect();

        // BTreeMap order doubles as a stable row lock order.
        let mut tx = self.pool.begin().await?;
        for (path, value) in updates {
            Self::apply(&mut tx, &path, value).await?;
        }
        tx.commit().await?;

        self.publish(paths);
        Ok(())
    }

    async fn transact(&self, path: &StorePath, mutation: Mutation) -> StoreResult<bool> {
        let doc = document_key(path)?;
        let mut tx = self.pool.begin().await?;

        // Materialize the row first so concurrent transactions queue on its lock.
        sqlx::query(
            "INSERT INTO documents (collection, key, body)
             VALUES ($1, $2, '{}'::jsonb)
             ON CONFLICT (collection, key) DO NOTHING",
        )
        .bind(doc.collection)
        .bind(doc.key)
        .execute(&mut *tx)
        .await?;

        let mut body = Self::lock_document(&mut tx, &doc).await?;
        let update = mutation(tree::get(&body, doc.rest));

        let Update::Set(value) = update else {
            tx.rollback().await?;
            return Ok(false);
        };

        tree::set(&mut body, doc.rest, tree::normalize(value));
        Self::save_document(&mut tx, &doc, body).await?;
        tx.commit().await?;

        self.publish(vec![path.clone()]);
        Ok(true)
    }

    fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
