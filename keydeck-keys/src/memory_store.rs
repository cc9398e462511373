//! In-process key store implementation
// Copyright 2025 Francisco F. Pinochet
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.


use crate::error::{KeyError, KeyResult};
use crate::store::KeyStoreBackend;
use async_trait::async_trait;
use keydeck_types::{ApiKeyChanges, ApiKeyRecord, KeyId, NewApiKey};
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

/// Stored row plus its insertion sequence, used to order equal timestamps
struct Row {
    seq: u64,
    record: ApiKeyRecord,
}

/// Key store that keeps the table in memory
pub struct MemoryKeyStore {
    rows: RwLock<Vec<Row>>,
    next_seq: std::sync::atomic::AtomicU64,
}

impl MemoryKeyStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(Vec::new()),
            next_seq: std::sync::atomic::AtomicU64::new(0),
        }
    }

    /// Create a store pre-populated with existing rows
    pub fn with_records(records: Vec<ApiKeyRecord>) -> Self {
        let mut store = Self::new();
        let rows = records
            .into_iter()
            .map(|record| Row {
                seq: store.bump_seq(),
                record,
            })
            .collect();
        store.rows = RwLock::new(rows);
        store
    }

    /// Number of rows currently stored
    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rows.read().await.is_empty()
    }

    fn bump_seq(&self) -> u64 {
        self.next_seq
            .fetch_add(1, std::sync::atomic::Ordering::Relaxed)
    }
}

impl Default for MemoryKeyStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KeyStoreBackend for MemoryKeyStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn insert(&self, new_key: &NewApiKey) -> KeyResult<ApiKeyRecord> {
        let record = ApiKeyRecord {
            id: Uuid::new_v4(),
            name: new_key.name.clone(),
            key: new_key.key.clone(),
            key_type: new_key.key_type,
            usage: new_key.usage.clone(),
            created_at: chrono::Utc::now(),
        };

        let mut rows = self.rows.write().await;
        rows.push(Row {
            seq: self.bump_seq(),
            record: record.clone(),
        });

        info!(key_id = %record.id, "Stored new key");
        Ok(record)
    }

    async fn list(&self) -> KeyResult<Vec<ApiKeyRecord>> {
        let rows = self.rows.read().await;
        let mut ordered: Vec<&Row> = rows.iter().collect();
        ordered.sort_by(|a, b| {
            b.record
                .created_at
                .cmp(&a.record.created_at)
                .then(b.seq.cmp(&a.seq))
        });

        debug!("Listed {} keys", ordered.len());
        Ok(ordered.into_iter().map(|row| row.record.clone()).collect())
    }

    async fn find_by_key(&self, key: &str) -> KeyResult<Vec<ApiKeyRecord>> {
        let rows = self.rows.read().await;
        Ok(rows
            .iter()
            .filter(|row| row.record.key == key)
            .map(|row| row.record.clone())
            .collect())
    }

    async fn update(&self, id: &KeyId, changes: &ApiKeyChanges) -> KeyResult<ApiKeyRecord> {
        let mut rows = self.rows.write().await;
        let row = rows
            .iter_mut()
            .find(|row| &row.record.id == id)
            .ok_or_else(|| KeyError::NotFound(id.to_string()))?;

        row.record.name = changes.name.clone();
        row.record.key = changes.key.clone();

        info!(key_id = %id, "Updated key");
        Ok(row.record.clone())
    }

    async fn delete(&self, id: &KeyId) -> KeyResult<()> {
        info!(key_id = %id, "Deleting key");

        let mut rows = self.rows.write().await;
        rows.retain(|row| &row.record.id != id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use keydeck_types::KeyType;

    #[tokio::test]
    async fn test_list_is_newest_first() {
        let store = MemoryKeyStore::new();
        let first = store
            .insert(&NewApiKey::new("first", "k1", KeyType::Dev).unwrap())
            .await
            .unwrap();
        let second = store
            .insert(&NewApiKey::new("second", "k2", KeyType::Prod).unwrap())
            .await
            .unwrap();

        let listed = store.list().await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, second.id);
        assert_eq!(listed[1].id, first.id);
    }

    #[tokio::test]
    async fn test_update_missing_row_is_not_found() {
        let store = MemoryKeyStore::new();
        let result = store
            .update(&Uuid::new_v4(), &ApiKeyChanges::new("a", "b"))
            .await;
        assert!(matches!(result, Err(KeyError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_find_by_key_returns_duplicates() {
        let store = MemoryKeyStore::new();
        for name in ["a", "b"] {
            store
                .insert(&NewApiKey::new(name, "same", KeyType::Test).unwrap())
                .await
                .unwrap();
        }

        assert_eq!(store.find_by_key("same").await.unwrap().len(), 2);
        assert!(store.find_by_key("other").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_missing_row_is_ok() {
        let store = MemoryKeyStore::new();
        assert!(store.delete(&Uuid::new_v4()).await.is_ok());
        assert!(store.is_empty().await);
    }
}
