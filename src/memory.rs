//! Long-term per-user memory
//!
//! A key-value store addressed by (namespace, key). The agent keeps one
//! free-text note per user under `("memory", user_id)`, read at the start
//! of a turn and rewritten wholesale at the end.

use crate::db::{Database, DbError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

/// Namespace holding per-user notes
pub const MEMORY_NAMESPACE: &str = "memory";

#[derive(Error, Debug)]
pub enum MemoryError {
    #[error(transparent)]
    Db(#[from] DbError),
    #[error("Malformed memory record: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Value stored for a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryRecord {
    pub memory: String,
}

impl MemoryRecord {
    pub fn new(memory: impl Into<String>) -> Self {
        Self {
            memory: memory.into(),
        }
    }
}

/// Key-value memory collaborator
#[async_trait]
pub trait MemoryStore: Send + Sync {
    async fn get(&self, namespace: &str, key: &str) -> Result<Option<Value>, MemoryError>;

    async fn put(&self, namespace: &str, key: &str, value: Value) -> Result<(), MemoryError>;
}

#[async_trait]
impl<T: MemoryStore + ?Sized> MemoryStore for Arc<T> {
    async fn get(&self, namespace: &str, key: &str) -> Result<Option<Value>, MemoryError> {
        (**self).get(namespace, key).await
    }

    async fn put(&self, namespace: &str, key: &str, value: Value) -> Result<(), MemoryError> {
        (**self).put(namespace, key, value).await
    }
}

/// Read the note stored for `user_id`, if any
pub async fn load_user_memory<M: MemoryStore + ?Sized>(
    store: &M,
    user_id: &str,
) -> Result<Option<MemoryRecord>, MemoryError> {
    match store.get(MEMORY_NAMESPACE, user_id).await? {
        Some(value) => Ok(Some(serde_json::from_value(value)?)),
        None => Ok(None),
    }
}

/// Replace the note stored for `user_id`
pub async fn store_user_memory<M: MemoryStore + ?Sized>(
    store: &M,
    user_id: &str,
    record: &MemoryRecord,
) -> Result<(), MemoryError> {
    store
        .put(MEMORY_NAMESPACE, user_id, serde_json::to_value(record)?)
        .await
}

/// Adapter to use `Database` as the memory store
#[derive(Clone)]
pub struct DatabaseMemory {
    db: Database,
}

impl DatabaseMemory {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl MemoryStore for DatabaseMemory {
    async fn get(&self, namespace: &str, key: &str) -> Result<Option<Value>, MemoryError> {
        Ok(self.db.get_memory(namespace, key)?.map(|item| item.value))
    }

    async fn put(&self, namespace: &str, key: &str, value: Value) -> Result<(), MemoryError> {
        self.db.put_memory(namespace, key, &value)?;
        Ok(())
    }
}
