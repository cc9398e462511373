//! Key store over a direct Postgres connection
//!
//! Uses the same `api_keys` table layout as the hosted store and creates it
//! on first connect if it is missing.
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
use keydeck_types::{ApiKeyChanges, ApiKeyRecord, KeyId, KeyType, NewApiKey};
use tokio_postgres::{Client, NoTls, Row};
use tracing::{error, info, warn};

const SELECT_COLUMNS: &str = "id, name, key, type, usage, created_at";

/// Postgres-backed key store
pub struct PostgresKeyStore {
    client: Option<Client>,
}

impl PostgresKeyStore {
    /// Connect to the database
    ///
    /// A missing URL or failed connection leaves the store disconnected, so
    /// every call fails instead of the process refusing to start.
    pub async fn connect(database_url: Option<&str>) -> Self {
        let database_url = match database_url {
            Some(url) if !url.trim().is_empty() => url,
            _ => {
                warn!("DATABASE_URL not configured, key store calls will fail");
                return Self { client: None };
            }
        };

        info!("Connecting to key database");

        let (client, connection) = match tokio_postgres::connect(database_url, NoTls).await {
            Ok(pair) => pair,
            Err(e) => {
                error!(error = %e, "Failed to connect to key database");
                return Self { client: None };
            }
        };

        // Spawn connection task
        tokio::spawn(async move {
            if let Err(e) = connection.await {
                error!(error = %e, "Database connection error");
            }
        });

        if let Err(e) = Self::run_migrations(&client).await {
            error!(error = %e, "Failed to prepare api_keys table");
        }

        info!("Key database connected and initialized");

        Self {
            client: Some(client),
        }
    }

    /// Create the `api_keys` table and its ordering index
    async fn run_migrations(client: &Client) -> KeyResult<()> {
        client
            .execute(
                r#"
                CREATE TABLE IF NOT EXISTS api_keys (
                    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                    name TEXT NOT NULL,
                    key TEXT NOT NULL,
                    type VARCHAR(8) NOT NULL CHECK (type IN ('dev', 'prod', 'test')),
                    usage TEXT NOT NULL DEFAULT '0',
                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
                )
                "#,
                &[],
            )
            .await?;

        client
            .execute(
                r#"
                CREATE INDEX IF NOT EXISTS idx_api_keys_created_at
                ON api_keys(created_at DESC)
                "#,
                &[],
            )
            .await?;

        // Lookups by secret happen on every gated request
        client
            .execute(
                r#"
                CREATE INDEX IF NOT EXISTS idx_api_keys_key
                ON api_keys(key)
                "#,
                &[],
            )
            .await?;

        Ok(())
    }

    /// Check if the database is connected
    pub fn is_available(&self) -> bool {
        self.client.is_some()
    }

    fn client(&self) -> KeyResult<&Client> {
        self.client
            .as_ref()
            .ok_or_else(|| KeyError::Configuration("Database not configured".to_string()))
    }
}

fn record_from_row(row: &Row) -> KeyResult<ApiKeyRecord> {
    let type_str: String = row.try_get(3)?;
    let key_type = type_str
        .parse::<KeyType>()
        .map_err(|e| KeyError::InvalidRecord(e.to_string()))?;

    Ok(ApiKeyRecord {
        id: row.try_get(0)?,
        name: row.try_get(1)?,
        key: row.try_get(2)?,
        key_type,
        usage: row.try_get(4)?,
        created_at: row.try_get(5)?,
    })
}

#[async_trait]
impl KeyStoreBackend for PostgresKeyStore {
    fn name(&self) -> &str {
        "postgres"
    }

    async fn insert(&self, new_key: &NewApiKey) -> KeyResult<ApiKeyRecord> {
        let row = self
            .client()?
            .query_one(
                &format!(
                    "INSERT INTO api_keys (name, key, type, usage) VALUES ($1, $2, $3, $4) RETURNING {}",
                    SELECT_COLUMNS
                ),
                &[
                    &new_key.name,
                    &new_key.key,
                    &new_key.key_type.as_str(),
                    &new_key.usage,
                ],
            )
            .await?;

        let record = record_from_row(&row)?;
        info!(key_id = %record.id, key_type = %record.key_type, "Inserted key");
        Ok(record)
    }

    async fn list(&self) -> KeyResult<Vec<ApiKeyRecord>> {
        let rows = self
            .client()?
            .query(
                &format!(
                    "SELECT {} FROM api_keys ORDER BY created_at DESC",
                    SELECT_COLUMNS
                ),
                &[],
            )
            .await?;

        rows.iter().map(record_from_row).collect()
    }

    async fn find_by_key(&self, key: &str) -> KeyResult<Vec<ApiKeyRecord>> {
        let rows = self
            .client()?
            .query(
                &format!("SELECT {} FROM api_keys WHERE key = $1", SELECT_COLUMNS),
                &[&key],
            )
            .await?;

        rows.iter().map(record_from_row).collect()
    }

    async fn update(&self, id: &KeyId, changes: &ApiKeyChanges) -> KeyResult<ApiKeyRecord> {
        let row = self
            .client()?
            .query_opt(
                &format!(
                    "UPDATE api_keys SET name = $1, key = $2 WHERE id = $3 RETURNING {}",
                    SELECT_COLUMNS
                ),
                &[&changes.name, &changes.key, id],
            )
            .await?
            .ok_or_else(|| KeyError::NotFound(id.to_string()))?;

        info!(key_id = %id, "Updated key");
        record_from_row(&row)
    }

    async fn delete(&self, id: &KeyId) -> KeyResult<()> {
        self.client()?
            .execute("DELETE FROM api_keys WHERE id = $1", &[id])
            .await?;

        info!(key_id = %id, "Deleted key");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[tokio::test]
    async fn test_unconfigured_store_fails_calls() {
        let store = PostgresKeyStore::connect(None).await;
        assert!(!store.is_available());

        assert!(matches!(store.list().await, Err(KeyError::Configuration(_))));
        assert!(matches!(
            store.delete(&Uuid::new_v4()).await,
            Err(KeyError::Configuration(_))
        ));
    }
}
